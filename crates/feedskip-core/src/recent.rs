/// Recently attempted queries, newest first.
///
/// Recorded before the tier chain starts, so a query shows up here even
/// when every channel fails - "the user searched for this" is true either
/// way.
#[derive(Debug, Default)]
pub struct RecentQueries {
    entries: Vec<String>,
}

/// Keep the list short enough to render as chips under a search bar.
const MAX_RECENT: usize = 10;

impl RecentQueries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front and cap the list. A repeated query keeps its
    /// existing position rather than jumping to the front.
    pub fn record(&mut self, query: &str) {
        if self.entries.iter().any(|q| q == query) {
            return;
        }
        self.entries.insert(0, query.to_string());
        self.entries.truncate(MAX_RECENT);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_query_goes_first() {
        let mut recent = RecentQueries::new();
        recent.record("first");
        recent.record("second");
        assert_eq!(recent.entries(), ["second", "first"]);
    }

    #[test]
    fn repeat_query_keeps_its_original_position() {
        let mut recent = RecentQueries::new();
        recent.record("a");
        recent.record("b");
        recent.record("a");
        assert_eq!(recent.entries(), ["b", "a"]);
    }

    #[test]
    fn list_caps_at_ten() {
        let mut recent = RecentQueries::new();
        for i in 0..15 {
            recent.record(&format!("query {i}"));
        }
        assert_eq!(recent.entries().len(), 10);
        assert_eq!(recent.entries()[0], "query 14");
        assert_eq!(recent.entries()[9], "query 5");
    }
}
