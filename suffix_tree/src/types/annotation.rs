/// Per-node record used to answer cost-bounded longest-match queries.
///
/// `min_max` is the minimum, over the candidate text positions seen in this
/// node's subtree, of the maximal cost along the candidate's window (capped
/// at the bound), and `text_pos` is a position achieving it. The
/// `optimistic_*` pair may already reflect a better candidate known in a
/// descendant before this node's own pair is recomputed, so
/// `optimistic_min_max <= min_max` holds at all times after initialization,
/// with equality when no descendant has a strictly better candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    pub min_max: u32,
    pub text_pos: u32,
    pub optimistic_min_max: u32,
    pub optimistic_text_pos: u32,
}

impl Annotation {
    /// Marker for "no candidate known yet"; compares worse than any real
    /// capped cost.
    pub const UNSET: u32 = u32::MAX;

    pub(crate) fn cleared() -> Self {
        Annotation {
            min_max: Self::UNSET,
            text_pos: 0,
            optimistic_min_max: Self::UNSET,
            optimistic_text_pos: 0,
        }
    }
}
