//! Tolerant line-by-line equivalence of two captured session outputs.
//!
//! Two outputs are behaviorally equivalent even when process identifiers
//! (parenthesized substrings) differ and when a `/bin/ps a` listing block
//! varies in content. The engine walks both sequences in lockstep, masks
//! identifiers, skips listing blocks bounded by the next `tsh> ` prompt, and
//! reports the first position where equivalence cannot be established.

/// Echo line of the listing command; matched as a substring.
pub const LISTING_MARKER: &str = "tsh> /bin/ps a";
/// Prefix of every new command prompt line.
pub const PROMPT_PREFIX: &str = "tsh> ";

/// Working state while scanning one trace's outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    /// Inside a listing block; `seen` counts listing lines consumed so far.
    InListing { seen: usize },
}

/// Advisory emitted when the two outputs have different line counts. Does
/// not halt the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthNote {
    pub candidate: usize,
    pub reference: usize,
}

/// Outcome of comparing one trace's two output sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail {
        position: usize,
        candidate: String,
        /// `None` when the reference output had no line at this position.
        reference: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub length_note: Option<LengthNote>,
    pub verdict: Verdict,
}

/// Compare candidate output against reference output. Pure and
/// deterministic; the scan state lives only within this call.
pub fn compare(candidate: &[String], reference: &[String]) -> Comparison {
    let length_note = (candidate.len() != reference.len()).then_some(LengthNote {
        candidate: candidate.len(),
        reference: reference.len(),
    });

    let mut state = ScanState::Normal;
    for (position, line) in candidate.iter().enumerate() {
        let Some(expected) = reference.get(position) else {
            return Comparison {
                length_note,
                verdict: Verdict::Fail {
                    position,
                    candidate: line.clone(),
                    reference: None,
                },
            };
        };

        // The listing echo itself must match exactly, wherever it appears.
        if line.contains(LISTING_MARKER) {
            if line != expected {
                return fail(length_note, position, line, expected);
            }
            if state == ScanState::Normal {
                state = ScanState::InListing { seen: 0 };
            }
            continue;
        }

        if let ScanState::InListing { seen } = state {
            if line.starts_with(PROMPT_PREFIX) && seen > 0 {
                // Block over; this same line is re-evaluated under Normal.
                state = ScanState::Normal;
            } else {
                if expected.starts_with(PROMPT_PREFIX) && seen > 0 {
                    // Reference left its listing before the candidate did.
                    return fail(length_note, position, line, expected);
                }
                // Listing content is opaque; never compared.
                state = ScanState::InListing { seen: seen + 1 };
                continue;
            }
        }

        if mask_parenthesized(line) != mask_parenthesized(expected) {
            return fail(length_note, position, line, expected);
        }
    }

    Comparison {
        length_note,
        verdict: Verdict::Pass,
    }
}

fn fail(
    length_note: Option<LengthNote>,
    position: usize,
    candidate: &str,
    reference: &str,
) -> Comparison {
    Comparison {
        length_note,
        verdict: Verdict::Fail {
            position,
            candidate: candidate.to_string(),
            reference: Some(reference.to_string()),
        },
    }
}

/// Replace each parenthesized run (through the first `)`, or to end of line
/// when unterminated) with a fixed placeholder, so identifiers never take
/// part in the comparison.
pub fn mask_parenthesized(line: &str) -> String {
    let mut masked = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '(' {
            masked.push_str("(*)");
            for skipped in chars.by_ref() {
                if skipped == ')' {
                    break;
                }
            }
        } else {
            masked.push(c);
        }
    }
    masked
}
