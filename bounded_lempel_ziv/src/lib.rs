//! Bounded-cost Lempel-Ziv parsing.
//!
//! Encodes a byte string as phrases `(source, length, literal)` where every
//! phrase copies an earlier substring and the reference-chain depth of any
//! position never exceeds a chosen bound: decoding a byte may hop through
//! at most that many phrase sources. Matches come from a suffix tree whose
//! nodes carry cost annotations, so each query walks down once and returns
//! the longest extension still admissible under the bound.

mod analysis;
mod annotate;
mod error;
mod parse;
mod segment;

pub use analysis::Analysis;
pub use error::EncodeError;

use std::fmt;

use suffix_tree::{SuffixTree, TERMINATOR};

use parse::Parser;

/// One parsed phrase: `length` bytes copied from the 1-based `source`
/// position, followed by one literal byte. A `source` of 0 means the
/// phrase is only the literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phrase {
    pub source: u32,
    pub length: u32,
    pub literal: u8,
}

impl fmt::Display for Phrase {
    // Printed with a 0-based source position, so a bare literal shows -1.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({},{},{})",
            i64::from(self.source) - 1,
            self.length,
            self.literal
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct BoundedLempelZiv {
    phrases: Vec<Phrase>,
    text_len: usize,
    raw_len: usize,
    cost_bound: u32,
}

impl BoundedLempelZiv {
    /// Parses `text` under `cost_bound`. The terminator byte (0) is
    /// appended internally, gets consumed as the final phrase's literal
    /// and must not occur in `text` itself.
    pub fn encode(text: &[u8], cost_bound: u32) -> Result<Self, EncodeError> {
        if cost_bound == 0 {
            return Err(EncodeError::ZeroCostBound);
        }
        if let Some(offset) = text.iter().position(|&b| b == TERMINATOR) {
            return Err(EncodeError::TerminatorInInput { offset });
        }

        let tree = SuffixTree::new(text);
        if tree.leaf_count() as usize == tree.len() {
            eprintln!("dfs matches");
        } else {
            eprintln!(
                "text length = {}, suffix tree leaves = {}",
                tree.len(),
                tree.leaf_count()
            );
        }

        let mut parser = Parser::new(tree, cost_bound);
        parser.parse()?;
        Ok(BoundedLempelZiv {
            text_len: text.len() + 1,
            raw_len: text.len(),
            cost_bound,
            phrases: parser.into_phrases(),
        })
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    /// Length that was parsed, terminator included.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    pub fn cost_bound(&self) -> u32 {
        self.cost_bound
    }

    pub fn analysis<T: AsRef<str>>(&self, name: T) -> Analysis {
        Analysis::new(&self.phrases, self.raw_len, name)
    }
}

#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use rand::Rng;

    fn phrase(source: u32, length: u32, literal: u8) -> Phrase {
        Phrase {
            source,
            length,
            literal,
        }
    }

    // Replays a phrase list into the text it describes, resolving
    // self-referential copies byte by byte like the parser does.
    fn reconstruct(phrases: &[Phrase]) -> Vec<u8> {
        let mut out: Vec<u8> = vec![0]; // 1-based scratch
        for p in phrases {
            let start = out.len() as u32;
            let mut k = 0u32;
            for _ in 0..p.length {
                out.push(out[(p.source + k) as usize]);
                k += 1;
                if p.source + k == start {
                    k = 0;
                }
            }
            out.push(p.literal);
        }
        out.remove(0);
        out
    }

    // Replays the cost recurrence: copied bytes cost one more than their
    // source byte, literals cost nothing. Panics if a phrase references
    // text that was not produced yet, which is itself a defect.
    fn recompute_costs(phrases: &[Phrase]) -> Vec<u32> {
        let mut costs: Vec<u32> = vec![u32::MAX]; // costs[0] unused
        for p in phrases {
            let start = costs.len() as u32;
            let mut k = 0u32;
            for _ in 0..p.length {
                let c = costs[(p.source + k) as usize] + 1;
                costs.push(c);
                k += 1;
                if p.source + k == start {
                    k = 0;
                }
            }
            costs.push(0);
        }
        costs
    }

    fn terminated(text: &[u8]) -> Vec<u8> {
        let mut expected = text.to_vec();
        expected.push(0);
        expected
    }

    // Checks that no phrase could have been one byte longer, against the
    // padded 1-based text. Only valid when the bound never bites.
    fn all_matches_maximal(text: &[u8], phrases: &[Phrase]) -> bool {
        let mut padded = vec![0u8];
        padded.extend_from_slice(text);
        padded.push(0);
        let mut text_pos = 1usize;
        for p in phrases {
            let extended = p.length as usize + 1;
            if text_pos + extended - 1 < padded.len() {
                for q in 1..text_pos {
                    if padded[q..q + extended] == padded[text_pos..text_pos + extended] {
                        return false;
                    }
                }
            }
            text_pos += p.length as usize + 1;
        }
        true
    }

    #[test]
    fn abab_under_bound_two() {
        let encoded = BoundedLempelZiv::encode(b"abab", 2).unwrap();
        assert_eq!(encoded.text_len(), 5);
        assert_eq!(
            encoded.phrases(),
            &[
                phrase(0, 0, b'a'),
                phrase(0, 0, b'b'),
                phrase(1, 2, 0),
            ]
        );
        assert_eq!(reconstruct(encoded.phrases()), terminated(b"abab"));
    }

    #[test]
    fn runs_reference_their_own_prefix() {
        // "aaaa": after the first literal the whole rest is one phrase
        // copying out of the text it is producing.
        let encoded = BoundedLempelZiv::encode(b"aaaa", 2).unwrap();
        assert_eq!(
            encoded.phrases(),
            &[phrase(0, 0, b'a'), phrase(1, 3, 0)]
        );
        assert_eq!(reconstruct(encoded.phrases()), terminated(b"aaaa"));
        let costs = recompute_costs(encoded.phrases());
        assert!(costs[1..].iter().all(|&c| c <= 2));
    }

    #[test]
    fn repeated_block_is_one_phrase_while_cheap() {
        // The second "abab" costs at most 1 along its source window, so it
        // must come out as a single phrase referencing position 1.
        let encoded = BoundedLempelZiv::encode(b"ababcababd", 2).unwrap();
        assert_eq!(
            encoded.phrases(),
            &[
                phrase(0, 0, b'a'),
                phrase(0, 0, b'b'),
                phrase(1, 2, b'c'),
                phrase(1, 4, b'd'),
                phrase(0, 0, 0),
            ]
        );
        assert_eq!(reconstruct(encoded.phrases()), terminated(b"ababcababd"));
    }

    #[test]
    fn distinct_bytes_parse_into_bare_literals() {
        let text: Vec<u8> = (1..=16).collect();
        let encoded = BoundedLempelZiv::encode(&text, 5).unwrap();
        assert_eq!(encoded.phrases().len(), 17);
        assert!(encoded.phrases().iter().all(|p| p.length == 0));
        let literals: Vec<u8> = encoded.phrases().iter().map(|p| p.literal).collect();
        assert_eq!(literals, terminated(&text));
    }

    #[test]
    fn mississippi_respects_a_bound_of_three() {
        let encoded = BoundedLempelZiv::encode(b"mississippi", 3).unwrap();
        assert_eq!(
            encoded.phrases(),
            &[
                phrase(0, 0, b'm'),
                phrase(0, 0, b'i'),
                phrase(0, 0, b's'),
                phrase(3, 1, b'i'),
                phrase(3, 3, b'p'),
                phrase(9, 1, b'i'),
                phrase(0, 0, 0),
            ]
        );
        assert_eq!(reconstruct(encoded.phrases()), terminated(b"mississippi"));
        let costs = recompute_costs(encoded.phrases());
        assert!(costs[1..].iter().all(|&c| c <= 3));
    }

    #[test]
    fn long_periodic_text_is_covered_by_one_overlapping_phrase() {
        // Thanks to the self-overlap wrap every copied byte references the
        // two cheap literals, so the chain depth stays at one.
        let text: Vec<u8> = b"ab".iter().cloned().cycle().take(200).collect();
        let encoded = BoundedLempelZiv::encode(&text, 3).unwrap();
        assert_eq!(
            encoded.phrases(),
            &[
                phrase(0, 0, b'a'),
                phrase(0, 0, b'b'),
                phrase(1, 198, 0),
            ]
        );
        assert_eq!(reconstruct(encoded.phrases()), terminated(&text));
        let costs = recompute_costs(encoded.phrases());
        assert!(costs[1..].iter().all(|&c| c == 0 || c == 1));
    }

    #[test]
    fn bound_of_one_turns_every_copied_byte_into_a_wall() {
        let encoded = BoundedLempelZiv::encode(b"ababab", 1).unwrap();
        assert_eq!(
            encoded.phrases(),
            &[
                phrase(0, 0, b'a'),
                phrase(0, 0, b'b'),
                phrase(1, 4, 0),
            ]
        );
        assert_eq!(reconstruct(encoded.phrases()), terminated(b"ababab"));
        assert_eq!(recompute_costs(encoded.phrases())[1..], [0, 0, 1, 1, 1, 1, 0]);
    }

    #[test]
    fn single_byte_text_is_two_literals() {
        let encoded = BoundedLempelZiv::encode(b"q", 4).unwrap();
        assert_eq!(
            encoded.phrases(),
            &[phrase(0, 0, b'q'), phrase(0, 0, 0)]
        );
    }

    #[test]
    fn empty_text_is_one_terminator_phrase() {
        let encoded = BoundedLempelZiv::encode(b"", 5).unwrap();
        assert_eq!(encoded.text_len(), 1);
        assert_eq!(encoded.phrases(), &[phrase(0, 0, 0)]);
    }

    #[test]
    fn rejects_terminator_in_payload() {
        assert_eq!(
            BoundedLempelZiv::encode(&[1, 0, 2], 4),
            Err(EncodeError::TerminatorInInput { offset: 1 })
        );
    }

    #[test]
    fn rejects_zero_cost_bound() {
        assert_eq!(
            BoundedLempelZiv::encode(b"ab", 0),
            Err(EncodeError::ZeroCostBound)
        );
    }

    #[test]
    fn phrases_print_with_zero_based_sources() {
        assert_eq!(phrase(0, 0, b'a').to_string(), "(-1,0,97)");
        assert_eq!(phrase(1, 3, 0).to_string(), "(0,3,0)");
    }

    #[derive(Debug, Clone)]
    struct ArbText {
        bytes: Vec<u8>,
    }

    impl Arbitrary for ArbText {
        fn arbitrary<G: Gen>(g: &mut G) -> ArbText {
            // A small alphabet keeps repeats (and therefore real phrases)
            // likely.
            let mut rng = rand::thread_rng();
            let size = rng.gen_range(0, 120);
            let alphabet = [b'a', b'b', b'c'];
            let bytes = (0..size)
                .map(|_| alphabet[usize::arbitrary(g) % alphabet.len()])
                .collect();
            ArbText { bytes }
        }
    }

    #[quickcheck]
    fn qc_roundtrips_when_the_bound_never_bites(text: ArbText) -> bool {
        let bound = text.bytes.len() as u32 + 2;
        let encoded = BoundedLempelZiv::encode(&text.bytes, bound).unwrap();
        reconstruct(encoded.phrases()) == terminated(&text.bytes)
    }

    #[quickcheck]
    fn qc_matches_are_maximal_when_the_bound_never_bites(text: ArbText) -> bool {
        let bound = text.bytes.len() as u32 + 2;
        let encoded = BoundedLempelZiv::encode(&text.bytes, bound).unwrap();
        all_matches_maximal(&text.bytes, encoded.phrases())
    }

    #[quickcheck]
    fn qc_costs_stay_under_a_small_bound(text: ArbText) -> bool {
        let encoded = match BoundedLempelZiv::encode(&text.bytes, 3) {
            Ok(encoded) => encoded,
            Err(_) => return false,
        };
        let costs = recompute_costs(encoded.phrases());
        costs[1..].iter().all(|&c| c <= 3)
    }

    #[quickcheck]
    fn qc_phrases_cover_the_whole_text(text: ArbText) -> bool {
        let encoded = match BoundedLempelZiv::encode(&text.bytes, 4) {
            Ok(encoded) => encoded,
            Err(_) => return false,
        };
        let covered: usize = encoded
            .phrases()
            .iter()
            .map(|p| p.length as usize + 1)
            .sum();
        covered == text.bytes.len() + 1
    }
}
