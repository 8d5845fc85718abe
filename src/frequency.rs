//! Frequency counting with first-seen ordering.
//!
//! Bar charts, goodness-of-fit tests and categorical summaries all enumerate
//! categories in the order they first appear in the column.

use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    entries: IndexMap<String, usize>,
    total: usize,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut table = Self::new();
        for value in values {
            table.record(value);
        }
        table
    }

    pub fn record(&mut self, value: &str) {
        self.total += 1;
        match self.entries.get_mut(value) {
            Some(count) => *count += 1,
            None => {
                self.entries.insert(value.to_string(), 1);
            }
        }
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded observations.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, value: &str) -> usize {
        self.entries.get(value).copied().unwrap_or(0)
    }

    /// Position of `value` in first-seen order.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.entries.get_index_of(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.entries.values().copied().collect()
    }

    /// Most frequent value; ties resolve to the value seen first.
    pub fn most_frequent(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (value, count) in self.iter() {
            match best {
                Some((_, current)) if current >= count => {}
                _ => best = Some((value, count)),
            }
        }
        best
    }

    /// Rows of `value, count, percent` sorted by descending count, limited to
    /// `top` entries when `top > 0`.
    pub fn render_rows(&self, top: usize) -> Vec<Vec<String>> {
        if self.total == 0 {
            return Vec::new();
        }
        let mut items = self.iter().collect::<Vec<_>>();
        items.sort_by(|a, b| b.1.cmp(&a.1));
        if top > 0 && items.len() > top {
            items.truncate(top);
        }
        items
            .into_iter()
            .map(|(value, count)| {
                let percent = (count as f64 / self.total as f64) * 100.0;
                vec![value.to_string(), count.to_string(), format!("{percent:.2}%")]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_first_seen_order() {
        let table = FrequencyTable::from_values(["b", "a", "b", "c", "a", "b"]);
        assert_eq!(table.labels(), vec!["b", "a", "c"]);
        assert_eq!(table.counts(), vec![3, 2, 1]);
        assert_eq!(table.total(), 6);
        assert_eq!(table.count("a"), 2);
        assert_eq!(table.count("z"), 0);
        assert_eq!(table.position("c"), Some(2));
        assert_eq!(table.position("z"), None);
    }

    #[test]
    fn most_frequent_prefers_first_seen_on_ties() {
        let table = FrequencyTable::from_values(["x", "y", "y", "x"]);
        assert_eq!(table.most_frequent(), Some(("x", 2)));
        assert_eq!(FrequencyTable::new().most_frequent(), None);
    }

    #[test]
    fn render_rows_sorts_by_count_and_truncates() {
        let table = FrequencyTable::from_values(["a", "b", "b", "c", "b", "c"]);
        let rows = table.render_rows(2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["b", "3", "50.00%"]);
        assert_eq!(rows[1][0], "c");
    }
}
