use crate::{
    math,
    occurrences::OccurrenceTable,
    program::{Shape, StimulusPool},
    stimulus::{display_label, Category, Stimulus},
    summary::ProgressRow,
};
use clap::ValueEnum;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

/// Policy for what a drill shows and how it is tallied
pub trait StimulusStrategy: Send {
    fn name(&self) -> &'static str;

    /// Pick the next stimulus; `None` means nothing is shown this cycle
    fn generate(&self, pool: &StimulusPool, rng: &mut dyn RngCore) -> Option<Stimulus>;

    /// Add an emitted stimulus to the occurrence table
    fn record(&self, stimulus: &Stimulus, table: &mut OccurrenceTable) {
        table.increment(&stimulus.count_key());
    }

    fn table_headers(&self) -> [&'static str; 2] {
        ["Stimulus", "Count"]
    }

    fn progress_rows(&self, table: &OccurrenceTable) -> Vec<ProgressRow> {
        table
            .iter()
            .map(|(key, count)| ProgressRow {
                label: display_label(key),
                count,
            })
            .collect()
    }
}

/// Pick a non-empty category uniformly, then a value from it uniformly
fn pick_from_pool(
    pool: &StimulusPool,
    include_math: bool,
    rng: &mut dyn RngCore,
) -> Option<Stimulus> {
    let mut categories = Vec::with_capacity(5);
    if !pool.shapes.is_empty() {
        categories.push(Category::Shapes);
    }
    if !pool.colors.is_empty() {
        categories.push(Category::Colors);
    }
    if !pool.letters.is_empty() {
        categories.push(Category::Letters);
    }
    if !pool.numbers.is_empty() {
        categories.push(Category::Numbers);
    }
    if include_math {
        categories.push(Category::Math);
    }

    match categories.choose(rng)? {
        Category::Shapes => pool.shapes.choose(rng).copied().map(Stimulus::Shape),
        Category::Colors => pool.colors.choose(rng).cloned().map(Stimulus::Color),
        Category::Letters => pool.letters.choose(rng).copied().map(Stimulus::Letter),
        Category::Numbers => pool.numbers.choose(rng).copied().map(Stimulus::Number),
        Category::Math => Some(Stimulus::Math(math::generate(rng))),
    }
}

/// Shapes, colors, letters and numbers from the configured pool
pub struct SimpleStrategy;

impl StimulusStrategy for SimpleStrategy {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn generate(&self, pool: &StimulusPool, rng: &mut dyn RngCore) -> Option<Stimulus> {
        pick_from_pool(pool, false, rng)
    }
}

/// The configured pool plus an always-available math category
pub struct MathMixedStrategy;

impl StimulusStrategy for MathMixedStrategy {
    fn name(&self) -> &'static str {
        "math-combo"
    }

    fn generate(&self, pool: &StimulusPool, rng: &mut dyn RngCore) -> Option<Stimulus> {
        pick_from_pool(pool, true, rng)
    }
}

/// Nothing but arithmetic problems
pub struct MathOnlyStrategy;

impl StimulusStrategy for MathOnlyStrategy {
    fn name(&self) -> &'static str {
        "math-only"
    }

    fn generate(&self, _pool: &StimulusPool, rng: &mut dyn RngCore) -> Option<Stimulus> {
        Some(Stimulus::Math(math::generate(rng)))
    }

    fn table_headers(&self) -> [&'static str; 2] {
        ["Problem", "Count"]
    }
}

/// A shuffled group of shapes: 2 to 4 kinds, 1 to 5 of each
pub struct ShapeCountStrategy;

impl ShapeCountStrategy {
    pub const MIN_KINDS: usize = 2;
    pub const MAX_KINDS: usize = 4;
    pub const MAX_PER_KIND: usize = 5;
}

impl StimulusStrategy for ShapeCountStrategy {
    fn name(&self) -> &'static str {
        "shape-count"
    }

    fn generate(&self, _pool: &StimulusPool, rng: &mut dyn RngCore) -> Option<Stimulus> {
        let mut kinds = Shape::ALL.to_vec();
        kinds.shuffle(rng);
        let kind_count = rng.gen_range(Self::MIN_KINDS..=Self::MAX_KINDS);

        let mut group = Vec::new();
        for shape in kinds.into_iter().take(kind_count) {
            let copies = rng.gen_range(1..=Self::MAX_PER_KIND);
            group.extend(std::iter::repeat(shape).take(copies));
        }
        group.shuffle(rng);

        Some(Stimulus::ShapeGroup(group))
    }

    /// Each shape kind is counted by how many times it appeared
    fn record(&self, stimulus: &Stimulus, table: &mut OccurrenceTable) {
        if let Stimulus::ShapeGroup(shapes) = stimulus {
            for shape in Shape::ALL {
                let n = shapes.iter().filter(|s| **s == shape).count() as u32;
                table.add(&shape.to_string(), n);
            }
        }
    }

    fn table_headers(&self) -> [&'static str; 2] {
        ["Shape", "Count"]
    }
}

/// Exercise flavours, named after the exercise type tags of the catalog
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExerciseType {
    #[default]
    Simple,
    LetterSequence,
    ShapeColorCombo,
    MathCombo,
    MathOnly,
    ShapeCount,
}

impl ExerciseType {
    /// Unknown tags fall back to the simple drill
    pub fn from_tag(tag: &str) -> Self {
        <Self as ValueEnum>::from_str(tag, true).unwrap_or_default()
    }

    pub fn strategy(&self) -> Box<dyn StimulusStrategy> {
        match self {
            ExerciseType::Simple | ExerciseType::LetterSequence | ExerciseType::ShapeColorCombo => {
                Box::new(SimpleStrategy)
            }
            ExerciseType::MathCombo => Box::new(MathMixedStrategy),
            ExerciseType::MathOnly => Box::new(MathOnlyStrategy),
            ExerciseType::ShapeCount => Box::new(ShapeCountStrategy),
        }
    }
}
