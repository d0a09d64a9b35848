//! Turn restrictions: vertex sequences forbidden as contiguous sub-paths.

use crate::network::VertexId;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// One forbidden sequence. Most restrictions span two or three vertices,
/// hence the inline capacity.
pub type Restriction = SmallVec<[VertexId; 4]>;

/// Restrictions for one profile, grouped by their first vertex so the
/// edge-based kernel only inspects sequences that could possibly start
/// inside its trailing window.
#[derive(Debug, Default, Clone)]
pub struct RestrictionIndex {
    by_first: FxHashMap<VertexId, Vec<Restriction>>,
    max_len: usize,
    count: usize,
}

impl RestrictionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a forbidden sequence. Sequences shorter than two vertices
    /// cannot describe a traversal and are ignored.
    pub fn add(&mut self, sequence: impl IntoIterator<Item = VertexId>) {
        let restriction = sequence.into_iter().collect::<Restriction>();
        if restriction.len() < 2 {
            return;
        }

        self.max_len = self.max_len.max(restriction.len());
        self.count += 1;
        self.by_first
            .entry(restriction[0])
            .or_default()
            .push(restriction);
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        self.count
    }

    /// Length of the longest restriction; the kernel's trailing window
    /// keeps one vertex less than this.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn restrictions_from(&self, first: VertexId) -> &[Restriction] {
        self.by_first.get(&first).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any restriction matches the tail of `sequence` exactly.
    ///
    /// A restriction completes at the step that appends its final
    /// vertex, so checking suffixes at every extension covers all
    /// contiguous occurrences.
    pub fn forbids_suffix(&self, sequence: &[VertexId]) -> bool {
        let longest = self.max_len.min(sequence.len());

        for len in 2..=longest {
            let suffix = &sequence[sequence.len() - len..];
            let candidates = self.restrictions_from(suffix[0]);

            if candidates.iter().any(|r| r.as_slice() == suffix) {
                return true;
            }
        }

        false
    }

    /// Whether `sequence` contains any restriction as a contiguous
    /// subsequence, anywhere.
    pub fn forbids(&self, sequence: &[VertexId]) -> bool {
        (2..=sequence.len()).any(|end| self.forbids_suffix(&sequence[..end]))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn v(id: u32) -> VertexId {
        VertexId(id)
    }

    #[test]
    fn suffix_matching() {
        let mut index = RestrictionIndex::new();
        index.add([v(1), v(2), v(3)]);

        assert!(!index.forbids_suffix(&[v(1), v(2)]));
        assert!(index.forbids_suffix(&[v(0), v(1), v(2), v(3)]));
        assert!(!index.forbids_suffix(&[v(1), v(2), v(3), v(4)]));

        assert!(index.forbids(&[v(1), v(2), v(3), v(4)]));
        assert!(!index.forbids(&[v(2), v(3), v(1)]));
    }

    #[test]
    fn short_sequences_are_rejected() {
        let mut index = RestrictionIndex::new();
        index.add([v(7)]);

        assert!(index.is_empty());
        assert_eq!(index.max_len(), 0);
    }
}
