//! Run-wide deduplication of candidates by source identifier

use std::collections::HashSet;

use alongtrack_core::models::Candidate;

/// Drops candidates whose identifier was already seen during the run.
///
/// Order is preserved: batch order, then response order within a batch.
#[derive(Debug, Default)]
pub struct ResultDeduplicator {
    seen: HashSet<String>,
}

impl ResultDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only candidates with a previously unseen identifier
    pub fn admit(&mut self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(|c| self.seen.insert(c.id.clone()))
            .collect()
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alongtrack_core::models::Tags;

    fn candidate(id: &str) -> Candidate {
        Candidate::new(id, 0.0, 0.0, Tags::new())
    }

    #[test]
    fn test_repeated_id_across_batches() {
        let mut dedup = ResultDeduplicator::new();

        let first = dedup.admit(vec![candidate("N123"), candidate("W123")]);
        let second = dedup.admit(vec![candidate("N7"), candidate("N123")]);

        let ids: Vec<&str> = first.iter().chain(second.iter()).map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["N123", "W123", "N7"]);
        assert_eq!(dedup.seen_count(), 3);
    }

    #[test]
    fn test_repeated_id_within_batch() {
        let mut dedup = ResultDeduplicator::new();
        let admitted = dedup.admit(vec![candidate("N1"), candidate("N1")]);
        assert_eq!(admitted.len(), 1);
    }
}
