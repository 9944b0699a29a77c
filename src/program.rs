use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest and highest number that can be flashed
pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 10;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Shape {
    Square,
    Circle,
    Diamond,
    Triangle,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Square, Shape::Circle, Shape::Diamond, Shape::Triangle];

    /// Each shape is always painted in its own fill color
    pub fn fill_hexcode(&self) -> &'static str {
        match self {
            Shape::Square => "#FF0000",
            Shape::Triangle => "#00FF00",
            Shape::Circle => "#FFFF00",
            Shape::Diamond => "#0000FF",
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            Shape::Square => '■',
            Shape::Circle => '●',
            Shape::Diamond => '◆',
            Shape::Triangle => '▲',
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorName {
    Green,
    Yellow,
    Red,
    Blue,
}

impl ColorName {
    pub const ALL: [ColorName; 4] = [
        ColorName::Green,
        ColorName::Yellow,
        ColorName::Red,
        ColorName::Blue,
    ];

    pub fn hexcode(&self) -> &'static str {
        match self {
            ColorName::Green => "#00FF00",
            ColorName::Yellow => "#FFFF00",
            ColorName::Red => "#FF0000",
            ColorName::Blue => "#0000FF",
        }
    }

    pub fn option(&self) -> ColorOption {
        ColorOption {
            hexcode: self.hexcode().to_string(),
            name: *self,
        }
    }
}

/// A color stimulus: the whole surface is filled with `hexcode`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorOption {
    pub hexcode: String,
    pub name: ColorName,
}

impl ColorOption {
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        hex_to_rgb(&self.hexcode)
    }
}

/// Parse `#RRGGBB` into its components
pub fn hex_to_rgb(hexcode: &str) -> Option<(u8, u8, u8)> {
    let hex = hexcode.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// An uppercase ASCII letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Letter(char);

impl Letter {
    pub fn new(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        upper.is_ascii_uppercase().then_some(Letter(upper))
    }

    pub fn all() -> Vec<Letter> {
        ('A'..='Z').map(Letter).collect()
    }

    pub fn as_char(&self) -> char {
        self.0
    }

    /// Parse every letter in `s`, ignoring separators; duplicates are kept once
    pub fn parse_list(s: &str) -> Vec<Letter> {
        let mut letters: Vec<Letter> = Vec::new();
        for letter in s.chars().filter_map(Letter::new) {
            if !letters.contains(&letter) {
                letters.push(letter);
            }
        }
        letters
    }
}

impl TryFrom<char> for Letter {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Letter::new(c).ok_or_else(|| format!("'{c}' is not a letter"))
    }
}

impl From<Letter> for char {
    fn from(letter: Letter) -> char {
        letter.0
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// Candidate values per category. An empty category is never selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StimulusPool {
    pub shapes: Vec<Shape>,
    pub colors: Vec<ColorOption>,
    pub letters: Vec<Letter>,
    pub numbers: Vec<u8>,
}

impl StimulusPool {
    /// Every catalog value in every category
    pub fn full() -> Self {
        Self {
            shapes: Shape::ALL.to_vec(),
            colors: ColorName::ALL.iter().map(ColorName::option).collect(),
            letters: Letter::all(),
            numbers: (MIN_NUMBER..=MAX_NUMBER).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
            && self.colors.is_empty()
            && self.letters.is_empty()
            && self.numbers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#00FF00"), Some((0, 255, 0)));
        assert_eq!(hex_to_rgb("#0000ff"), Some((0, 0, 255)));
        assert_eq!(hex_to_rgb("00FF00"), None);
        assert_eq!(hex_to_rgb("#GG0000"), None);
        assert_eq!(hex_to_rgb("#FFF"), None);
    }

    #[test]
    fn test_letter_new_uppercases() {
        assert_eq!(Letter::new('a').map(|l| l.as_char()), Some('A'));
        assert_eq!(Letter::new('Z').map(|l| l.as_char()), Some('Z'));
        assert!(Letter::new('1').is_none());
        assert!(Letter::new('é').is_none());
    }

    #[test]
    fn test_letter_parse_list_dedupes() {
        let letters = Letter::parse_list("a,b, A c");
        let chars: String = letters.iter().map(|l| l.as_char()).collect();
        assert_eq!(chars, "ABC");
    }

    #[test]
    fn test_letter_serde_roundtrip_rejects_digits() {
        let json = serde_json::to_string(&Letter::new('q').unwrap()).unwrap();
        assert_eq!(json, "\"Q\"");
        assert!(serde_json::from_str::<Letter>("\"7\"").is_err());
    }

    #[test]
    fn test_color_option_serializes_stably() {
        let json = serde_json::to_string(&ColorName::Green.option()).unwrap();
        assert_eq!(json, r##"{"hexcode":"#00FF00","name":"GREEN"}"##);
    }

    #[test]
    fn test_shape_display() {
        assert_eq!(Shape::Triangle.to_string(), "TRIANGLE");
        assert_eq!(Difficulty::Advanced.to_string(), "Advanced");
    }

    #[test]
    fn test_full_pool() {
        let pool = StimulusPool::full();
        assert_eq!(pool.shapes.len(), 4);
        assert_eq!(pool.colors.len(), 4);
        assert_eq!(pool.letters.len(), 26);
        assert_eq!(pool.numbers, (1..=10).collect::<Vec<u8>>());
        assert!(!pool.is_empty());
        assert!(StimulusPool::default().is_empty());
    }
}
