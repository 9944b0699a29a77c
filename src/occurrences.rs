/// Insertion-ordered counters keyed by stimulus key.
///
/// Tables stay small (a few dozen distinct values per run), so lookups are
/// linear scans over the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceTable {
    entries: Vec<(String, u32)>,
}

impl OccurrenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: &str, n: u32) {
        if n == 0 {
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, count)) => *count += n,
            None => self.entries.push((key.to_string(), n)),
        }
    }

    pub fn get(&self, key: &str) -> u32 {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(0, |(_, count)| *count)
    }

    /// Sum of every counter
    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
