use crate::math::MathProblem;
use crate::program::{ColorOption, Letter, Shape};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Category {
    Shapes,
    Colors,
    Letters,
    Numbers,
    Math,
}

/// A single value flashed on screen.
///
/// The rendering surface switches on the variant; nothing is inferred from
/// the shape of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stimulus {
    Shape(Shape),
    Color(ColorOption),
    Letter(Letter),
    Number(u8),
    Math(MathProblem),
    /// Several shapes at once, to be counted by the user
    ShapeGroup(Vec<Shape>),
}

impl Stimulus {
    pub fn category(&self) -> Category {
        match self {
            Stimulus::Shape(_) | Stimulus::ShapeGroup(_) => Category::Shapes,
            Stimulus::Color(_) => Category::Colors,
            Stimulus::Letter(_) => Category::Letters,
            Stimulus::Number(_) => Category::Numbers,
            Stimulus::Math(_) => Category::Math,
        }
    }

    /// Stable key under which this stimulus is counted.
    ///
    /// Colors are keyed by their JSON form so two equal colors collapse into
    /// one counter.
    pub fn count_key(&self) -> String {
        match self {
            Stimulus::Color(color) => {
                serde_json::to_string(color).unwrap_or_else(|_| color.hexcode.clone())
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stimulus::Shape(shape) => write!(f, "{shape}"),
            Stimulus::Color(color) => write!(f, "{}", color.hexcode),
            Stimulus::Letter(letter) => write!(f, "{letter}"),
            Stimulus::Number(n) => write!(f, "{n}"),
            Stimulus::Math(problem) => write!(f, "{problem}"),
            Stimulus::ShapeGroup(shapes) => {
                let glyphs: String = shapes.iter().map(Shape::glyph).collect();
                write!(f, "{glyphs}")
            }
        }
    }
}

/// Human-facing label for a count key: color keys show their hexcode
pub fn display_label(key: &str) -> String {
    match serde_json::from_str::<ColorOption>(key) {
        Ok(color) => color.hexcode,
        Err(_) => key.to_string(),
    }
}
