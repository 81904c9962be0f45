use indicatif::ProgressBar;
use suffix_tree::SuffixTree;

use crate::error::EncodeError;
use crate::segment::SegmentTree;
use crate::Phrase;

/// Result of a longest-admissible-match query: an earlier occurrence and
/// the number of characters it is good for.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Match {
    pub length: u32,
    pub pos: u32,
}

pub(crate) struct Parser {
    pub(crate) tree: SuffixTree,
    pub(crate) cost_bound: u32,
    // costs[i]: reference-chain depth of the byte produced at position i.
    // Unassigned positions sit above every admissible value.
    pub(crate) costs: Vec<u32>,
    pub(crate) segments: SegmentTree,
    // walls[q]: distance from q to the next position whose cost hit the
    // bound; -1 while unknown. Farther from the wall is better when
    // breaking ties between equally expensive candidates.
    pub(crate) walls: Vec<i32>,
    position_of_previous_cap: u32,
    phrases: Vec<Phrase>,
}

impl Parser {
    pub(crate) fn new(tree: SuffixTree, cost_bound: u32) -> Parser {
        let length = tree.len();
        let costs = vec![length as u32; length + 1];
        let segments = SegmentTree::new(&costs);
        Parser {
            tree,
            cost_bound,
            costs,
            segments,
            walls: vec![-1; length + 1],
            position_of_previous_cap: 0,
            phrases: Vec::new(),
        }
    }

    /// Greedy loop: take the longest admissible match at the current
    /// position, settle the costs it induces, refresh the annotations and
    /// move past the following literal. The terminator position is
    /// consumed like any other, so the final phrase's literal is the
    /// terminator byte.
    pub(crate) fn parse(&mut self) -> Result<(), EncodeError> {
        let length = self.tree.len() as u32;
        let progress = ProgressBar::new(u64::from(length));
        progress.set_draw_delta(1024 * 1024);

        let mut text_pos: u32 = 1;
        while text_pos <= length {
            let found = self.find_longest(text_pos)?;

            let mut k: u32 = 0;
            for i in 0..found.length {
                let target = text_pos + i;
                let cost = self.costs[(found.pos + k) as usize] + 1;
                self.costs[target as usize] = cost;
                if cost == self.cost_bound {
                    // A new wall; every position since the previous one
                    // now knows its distance to it.
                    self.walls[target as usize] = 0;
                    let mut q = target - 1;
                    while q > self.position_of_previous_cap {
                        self.walls[q as usize] = self.walls[q as usize + 1] + 1;
                        q -= 1;
                    }
                    self.position_of_previous_cap = target;
                }
                self.segments.update(target as usize, cost);
                if cost > self.cost_bound {
                    return Err(EncodeError::CostExceeded { pos: target, cost });
                }
                k += 1;
                if found.pos + k == text_pos {
                    // The phrase may reference bytes it is itself
                    // producing; wrap back to the source start.
                    k = 0;
                }
            }

            let literal_pos = text_pos + found.length;
            self.costs[literal_pos as usize] = 0;
            self.segments.update(literal_pos as usize, 0);
            self.propagate_annotation(text_pos, found.length);

            self.phrases.push(Phrase {
                source: found.pos,
                length: found.length,
                literal: self.tree.byte_at(literal_pos),
            });
            text_pos = literal_pos + 1;
            progress.set_position(u64::from(literal_pos));
        }
        progress.finish_and_clear();
        Ok(())
    }

    pub(crate) fn into_phrases(self) -> Vec<Phrase> {
        self.phrases
    }
}
