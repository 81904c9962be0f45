// Online construction after Ukkonen. Phase p extends the tree to contain
// every suffix of the first p+1 text positions; leaves grow implicitly
// through the tree's virtual end `e`, so per phase only the extensions
// between the carried-over first explicit one and the first "already
// present" one (rule 3) do real work.

use crate::types::node::{Node, NodeId};
use crate::SuffixTree;

/// A position inside the tree: `node` and the offset of the last matched
/// character on its incoming edge.
#[derive(Debug, Clone, Copy)]
struct ActivePos {
    node: NodeId,
    edge_pos: u32,
}

/// Substring of the text, given as 1-based inclusive indices.
#[derive(Debug, Clone, Copy)]
struct Span {
    begin: u32,
    end: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Skip {
    // The traced string is known to exist, whole edges can be jumped over
    // by their length (skip/count trick).
    Count,
    // Compare character by character.
    Scan,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Rule {
    // A new leaf (and possibly a new internal node) was inserted.
    Two,
    // The extension was already present; the phase ends here.
    Three,
}

enum Insertion {
    NewSon,
    Split,
}

pub(crate) struct Builder<'t> {
    tree: &'t mut SuffixTree,
    pos: ActivePos,
    // The internal node created by the last split that still waits for its
    // suffix link. By Ukkonen it gets one before its phase ends.
    suffixless: NodeId,
    extension: u32,
    // Set when the previous phase ended with rule 3: the same extension is
    // repeated without following a suffix link first.
    repeated_extension: bool,
}

impl<'t> Builder<'t> {
    pub(crate) fn new(tree: &'t mut SuffixTree) -> Self {
        Builder {
            tree,
            pos: ActivePos {
                node: NodeId::ROOT,
                edge_pos: 0,
            },
            suffixless: NodeId::NONE,
            extension: 2,
            repeated_extension: false,
        }
    }

    pub(crate) fn run(&mut self) {
        let length = self.tree.len() as u32;
        for phase in 2..length {
            self.single_phase(phase);
        }
    }

    fn single_phase(&mut self, phase: u32) {
        // Implicit extensions 1..=phase: all leaf edges now reach phase+1.
        self.tree.e = phase + 1;

        while self.extension <= phase + 1 {
            let span = Span {
                begin: self.extension,
                end: phase + 1,
            };
            if self.single_extension(span) == Rule::Three {
                self.repeated_extension = true;
                return;
            }
            self.repeated_extension = false;
            self.extension += 1;
        }
    }

    /// Makes sure one suffix of the current prefix is in the tree, reporting
    /// which extension rule applied.
    fn single_extension(&mut self, mut span: Span) -> Rule {
        let path_pos = span.begin;
        let mut chars_found;

        if !self.repeated_extension {
            self.follow_suffix_link();
        }

        if self.pos.node == NodeId::ROOT {
            // No suffix link to exploit, trace the whole string down.
            let (node, edge_pos, found) = self.trace_string(NodeId::ROOT, span, Skip::Scan);
            self.pos.node = node;
            self.pos.edge_pos = edge_pos;
            chars_found = found;
        } else {
            // Everything but the last character is known to exist here, so
            // only that character needs tracing.
            span.begin = span.end;
            chars_found = 0;

            if self.is_last_char_in_edge(self.pos.node, self.pos.edge_pos) {
                // Last match ended its edge, look in the next one.
                let next = self
                    .tree
                    .find_child(self.pos.node, self.tree.byte_at(span.end));
                if !next.is_none() {
                    self.pos.node = next;
                    self.pos.edge_pos = 0;
                    chars_found = 1;
                }
            } else {
                // Still inside an edge.
                let probe = self.tree.node(self.pos.node).edge_start + self.pos.edge_pos + 1;
                if self.tree.byte_at(probe) == self.tree.byte_at(span.end) {
                    self.pos.edge_pos += 1;
                    chars_found = 1;
                }
            }
        }

        if chars_found == span.end - span.begin + 1 {
            // Rule 3: the suffix is already present. If an internal node
            // still waits for its suffix link, it points to the father of
            // the current position.
            if !self.suffixless.is_none() {
                let father = self.tree.node(self.pos.node).father;
                self.tree.nodes[self.suffixless.index()].suffix_link = father;
                self.suffixless = NodeId::NONE;
            }
            return Rule::Three;
        }

        if self.is_last_char_in_edge(self.pos.node, self.pos.edge_pos) || self.pos.node == NodeId::ROOT
        {
            if !self.tree.node(self.pos.node).first_child.is_none() {
                // Rule 2, new son appended to an existing node.
                self.insert(
                    self.pos.node,
                    span.begin + chars_found,
                    span.end,
                    path_pos,
                    0,
                    Insertion::NewSon,
                );
                if !self.suffixless.is_none() {
                    self.tree.nodes[self.suffixless.index()].suffix_link = self.pos.node;
                    self.suffixless = NodeId::NONE;
                }
            }
        } else {
            // Rule 2, split: a new internal node takes the matched part of
            // the edge, the new leaf becomes its second child.
            let internal = self.insert(
                self.pos.node,
                span.begin + chars_found,
                span.end,
                path_pos,
                self.pos.edge_pos,
                Insertion::Split,
            );
            if !self.suffixless.is_none() {
                self.tree.nodes[self.suffixless.index()].suffix_link = internal;
            }
            if self.label_length(internal) == 1 && self.tree.node(internal).father == NodeId::ROOT {
                // A single character below the root links straight back to
                // the root.
                self.tree.nodes[internal.index()].suffix_link = NodeId::ROOT;
                self.suffixless = NodeId::NONE;
            } else {
                self.suffixless = internal;
            }
            self.pos.node = internal;
        }
        Rule::Two
    }

    /// Moves the active position to the node representing its longest
    /// proper suffix, tracing down the remembered edge label with the
    /// skip/count trick when no direct link exists yet.
    fn follow_suffix_link(&mut self) {
        if self.pos.node == NodeId::ROOT {
            return;
        }
        let node = self.pos.node;
        let has_link = !self.tree.node(node).suffix_link.is_none();

        if !has_link || !self.is_last_char_in_edge(node, self.pos.edge_pos) {
            let father = self.tree.node(node).father;
            if father == NodeId::ROOT {
                // The root links to itself; the caller traces from scratch.
                self.pos.node = NodeId::ROOT;
                return;
            }
            // Remember the label between the father and the current
            // position, follow the father's link and walk it back down.
            let gama = Span {
                begin: self.tree.node(node).edge_start,
                end: self.tree.node(node).edge_start + self.pos.edge_pos,
            };
            let from = self.tree.node(father).suffix_link;
            let (dest, edge_pos, _) = self.trace_string(from, gama, Skip::Count);
            self.pos.node = dest;
            self.pos.edge_pos = edge_pos;
        } else {
            let link = self.tree.node(node).suffix_link;
            self.pos.node = link;
            self.pos.edge_pos = self.label_length(link) - 1;
        }
    }

    /// Traces `span` through the tree starting below `node`. Returns the
    /// node where tracing stopped, the edge offset of the last match and
    /// how many characters matched.
    fn trace_string(&self, mut node: NodeId, mut span: Span, skip: Skip) -> (NodeId, u32, u32) {
        let mut total_found = 0;
        loop {
            let (next, edge_pos, found, done) = self.trace_single_edge(node, span, skip);
            node = next;
            span.begin += found;
            total_found += found;
            if done {
                return (node, edge_pos, total_found);
            }
        }
    }

    /// One edge worth of `trace_string`. The `done` flag signals that
    /// either the whole span was consumed or a mismatch was found.
    fn trace_single_edge(&self, node: NodeId, span: Span, skip: Skip) -> (NodeId, u32, u32, bool) {
        let cont = self.tree.find_child(node, self.tree.byte_at(span.begin));
        if cont.is_none() {
            return (node, self.label_length(node) - 1, 0, true);
        }

        let node = cont;
        let length = self.label_length(node);
        let span_len = span.end - span.begin + 1;

        if skip == Skip::Count {
            // The string exists below, jumping by the edge length is safe.
            if length <= span_len {
                return (node, length - 1, length, length >= span_len);
            }
            return (node, span_len - 1, span_len, true);
        }

        let scan = length.min(span_len);
        let mut edge_pos = 1;
        let mut chars_found = 1;
        while edge_pos < scan {
            if self.tree.byte_at(self.tree.node(node).edge_start + edge_pos)
                != self.tree.byte_at(span.begin + edge_pos)
            {
                return (node, edge_pos - 1, chars_found, true);
            }
            chars_found += 1;
            edge_pos += 1;
        }
        (node, edge_pos - 1, chars_found, chars_found >= span_len)
    }

    fn insert(
        &mut self,
        node: NodeId,
        edge_begin: u32,
        edge_end: u32,
        path_pos: u32,
        edge_pos: u32,
        kind: Insertion,
    ) -> NodeId {
        match kind {
            Insertion::NewSon => {
                let leaf = self.new_node(node, edge_begin, edge_end, path_pos);
                let mut son = self.tree.node(node).first_child;
                while !self.tree.node(son).right_sibling.is_none() {
                    son = self.tree.node(son).right_sibling;
                }
                self.connect_siblings(son, leaf);
                leaf
            }
            Insertion::Split => {
                let father = self.tree.node(node).father;
                let old_start = self.tree.node(node).edge_start;
                let old_path = self.tree.node(node).path_position;

                let internal = self.new_node(father, old_start, old_start + edge_pos, old_path);
                self.tree.nodes[node.index()].edge_start += edge_pos + 1;

                let leaf = self.new_node(internal, edge_begin, edge_end, path_pos);

                // The internal node takes the split node's place among its
                // siblings and adopts it as first child, the leaf follows.
                let left = self.tree.node(node).left_sibling;
                let right = self.tree.node(node).right_sibling;
                self.connect_siblings(left, internal);
                self.connect_siblings(internal, right);
                self.tree.nodes[node.index()].left_sibling = NodeId::NONE;
                if self.tree.node(father).first_child == node {
                    self.tree.nodes[father.index()].first_child = internal;
                }
                self.tree.nodes[internal.index()].first_child = node;
                self.tree.nodes[node.index()].father = internal;
                self.connect_siblings(node, leaf);
                internal
            }
        }
    }

    fn new_node(&mut self, father: NodeId, edge_start: u32, edge_end: u32, path_pos: u32) -> NodeId {
        let id = NodeId(self.tree.nodes.len() as u32);
        self.tree
            .nodes
            .push(Node::new(father, edge_start, edge_end, path_pos));
        id
    }

    fn connect_siblings(&mut self, left: NodeId, right: NodeId) {
        if !left.is_none() {
            self.tree.nodes[left.index()].right_sibling = right;
        }
        if !right.is_none() {
            self.tree.nodes[right.index()].left_sibling = left;
        }
    }

    fn label_length(&self, node: NodeId) -> u32 {
        self.tree.label_length(node)
    }

    fn is_last_char_in_edge(&self, node: NodeId, edge_pos: u32) -> bool {
        edge_pos == self.label_length(node) - 1
    }
}
