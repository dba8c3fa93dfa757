use crate::core::ParkingLot;
use std::collections::VecDeque;

/// Case-insensitive substring match on lot names.
///
/// An empty or whitespace-only query returns the input unchanged. An empty
/// result is returned as-is; callers pick their own fallback.
pub fn filter_lots(lots: &[ParkingLot], query: &str) -> Vec<ParkingLot> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return lots.to_vec();
    }

    lots.iter()
        .filter(|lot| lot.name().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Owns the current search query.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    query: String,
}

impl SearchFilter {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn apply(&self, lots: &[ParkingLot]) -> Vec<ParkingLot> {
        filter_lots(lots, &self.query)
    }
}

/// Recent searches, most recent first.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl SearchHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// `seed` is given most recent first.
    pub fn with_entries<I, S>(capacity: usize, seed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::new(capacity);
        let seed: Vec<String> = seed.into_iter().map(Into::into).collect();
        for entry in seed.into_iter().rev() {
            history.record(&entry);
        }
        history
    }

    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() || self.capacity == 0 {
            return;
        }

        let folded = query.to_lowercase();
        self.entries.retain(|entry| entry.to_lowercase() != folded);
        self.entries.push_front(query.to_string());
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(5)
    }
}
