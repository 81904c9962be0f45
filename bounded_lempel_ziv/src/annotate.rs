// Maintenance of the per-node cost annotations and the annotated search.
//
// A node's committed pair (min_max, text_pos) only reflects windows whose
// costs are fully settled, so it never lies. The optimistic pair may adopt
// a better candidate seen in a descendant before the node's own pair is
// recomputed; the search trusts it for pruning, never for claiming a
// shorter match than the truth.

use suffix_tree::{Annotation, NodeId};

use crate::error::EncodeError;
use crate::parse::{Match, Parser};

impl Parser {
    /// Longest admissible match for the suffix starting at `text_pos`,
    /// following the optimistic annotations down from the root. A subtree
    /// without any candidate ends the search; a saturated subtree can
    /// still contribute its candidate's run up to the next wall.
    pub(crate) fn find_longest(&self, text_pos: u32) -> Result<Match, EncodeError> {
        let pattern = self.tree.suffix(text_pos);
        let mut current = Match { length: 0, pos: 0 };
        let mut node = self.tree.find_child(NodeId::ROOT, pattern[0]);
        let mut j = 0usize;

        while !node.is_none() {
            let annot = *self.tree.annotation(node);
            if annot.optimistic_min_max == Annotation::UNSET {
                return Ok(current);
            }
            if annot.optimistic_min_max == self.cost_bound {
                let wall = self.walls[annot.optimistic_text_pos as usize];
                if wall > current.length as i32 {
                    current.length = wall as u32;
                    current.pos = annot.optimistic_text_pos;
                }
                return Ok(current);
            }

            let mut k = self.tree.node(node).edge_start();
            let end = self.tree.label_end(node);
            while j < pattern.len() && k <= end && self.tree.byte_at(k) == pattern[j] {
                j += 1;
                k += 1;
            }

            current.length = j as u32;
            if annot.optimistic_text_pos == 0 {
                return Err(EncodeError::UnsetSourcePosition { pos: text_pos });
            }
            current.pos = annot.optimistic_text_pos;

            if j == pattern.len() {
                return Ok(current);
            } else if k > end {
                node = self.tree.find_child(node, pattern[j]);
            } else {
                return Ok(current);
            }
        }
        Ok(current)
    }

    /// After a phrase settles the costs up to `text_pos + len`, feeds the
    /// new knowledge to every suffix whose leaf still reaches an ancestor
    /// covering `text_pos`. The running maximum over the scanned tail is
    /// what a leaf may adopt optimistically.
    pub(crate) fn propagate_annotation(&mut self, text_pos: u32, len: u32) {
        let final_pos = text_pos + len;
        let mut range_max = 0u32;
        let mut i = final_pos;
        while i > 0 {
            if self.costs[i as usize] > range_max {
                range_max = self.costs[i as usize];
            }
            if self.tree.max_str_depth(i) < text_pos {
                // No leaf with an earlier suffix start can have an
                // ancestor still spanning text_pos.
                break;
            }
            self.change_annotation_from_leaf(
                i,
                final_pos,
                i64::from(text_pos) - i64::from(i),
                range_max,
            );
            i -= 1;
        }
    }

    /// Walks from the leaf of the suffix at `text_pos` towards the root
    /// while the ancestors are deeper than `len`, folding the candidate
    /// into each one. `range_max` is the cost maximum observed over
    /// `text_pos..=final_pos`.
    fn change_annotation_from_leaf(
        &mut self,
        text_pos: u32,
        final_pos: u32,
        len: i64,
        range_max: u32,
    ) {
        let leaf = self.tree.leaf_for_suffix(text_pos);
        {
            let annot = self.tree.annotation_mut(leaf);
            if annot.min_max == Annotation::UNSET || range_max > annot.min_max {
                annot.min_max = range_max;
                annot.optimistic_min_max = range_max;
            }
        }

        let mut parent = self.tree.node(leaf).father();
        while !parent.is_none() && i64::from(self.tree.node(parent).str_depth()) > len {
            let best = self.best_child(parent);
            let best_annot = *self.tree.annotation(best);
            let depth = self.tree.node(parent).str_depth();

            // Only windows that fit inside the settled range may touch the
            // committed pair.
            if text_pos + depth - 1 <= final_pos {
                let cost = self.segments.capped_max(
                    text_pos as usize,
                    (text_pos + depth - 1) as usize,
                    self.cost_bound,
                );
                let committed = *self.tree.annotation(parent);
                let replace = if committed.min_max == self.cost_bound {
                    cost < self.cost_bound
                        || (self.walls[text_pos as usize] != -1
                            && self.walls[text_pos as usize]
                                > self.walls[committed.text_pos as usize])
                } else {
                    cost < committed.min_max
                };
                if replace {
                    let annot = self.tree.annotation_mut(parent);
                    annot.min_max = cost;
                    annot.text_pos = text_pos;
                }
            }

            let committed = *self.tree.annotation(parent);
            let (new_min_max, new_text_pos) = if committed.optimistic_min_max == Annotation::UNSET
            {
                (range_max, text_pos)
            } else if committed.optimistic_min_max == self.cost_bound {
                if best_annot.optimistic_min_max == self.cost_bound {
                    if self.walls[best_annot.optimistic_text_pos as usize]
                        > self.walls[committed.optimistic_text_pos as usize]
                    {
                        (
                            best_annot.optimistic_min_max,
                            best_annot.optimistic_text_pos,
                        )
                    } else {
                        (committed.min_max, committed.text_pos)
                    }
                } else {
                    (
                        best_annot.optimistic_min_max,
                        best_annot.optimistic_text_pos,
                    )
                }
            } else if best_annot.optimistic_min_max < committed.min_max {
                (
                    best_annot.optimistic_min_max,
                    best_annot.optimistic_text_pos,
                )
            } else {
                (committed.min_max, committed.text_pos)
            };
            let annot = self.tree.annotation_mut(parent);
            annot.optimistic_min_max = new_min_max;
            annot.optimistic_text_pos = new_text_pos;

            parent = self.tree.node(parent).father();
        }
    }

    /// Child with the smallest optimistic estimate, ties going to the
    /// candidate farther from its wall.
    fn best_child(&self, node: NodeId) -> NodeId {
        let mut result = self.tree.node(node).first_child();
        let mut current = result;
        while !current.is_none() {
            let r = self.tree.annotation(result);
            let c = self.tree.annotation(current);
            if r.optimistic_min_max > c.optimistic_min_max
                || (r.optimistic_min_max == c.optimistic_min_max
                    && self.walls[r.optimistic_text_pos as usize]
                        < self.walls[c.optimistic_text_pos as usize])
            {
                result = current;
            }
            current = self.tree.node(current).right_sibling();
        }
        result
    }
}
