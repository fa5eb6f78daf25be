// src/simulation/results.rs
use crate::core::{FsmError, FsmResult, OutputState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Measurement counts of one simulation run.
///
/// Keys are bitstrings of the classical register written high-to-low
/// (`c[n-1] ... c[0]`); only observed bitstrings are stored. The counts always
/// sum to `shots`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStateResult")]
pub struct StateResult {
    shots: u64,
    width: usize,
    counts: BTreeMap<String, u64>,
}

/// Unchecked wire form; deserialization goes through [`StateResult::from_counts`].
#[derive(Deserialize)]
struct RawStateResult {
    shots: u64,
    width: usize,
    counts: BTreeMap<String, u64>,
}

impl TryFrom<RawStateResult> for StateResult {
    type Error = FsmError;

    fn try_from(raw: RawStateResult) -> FsmResult<Self> {
        StateResult::from_counts(raw.shots, raw.width, raw.counts)
    }
}

impl StateResult {
    /// Builds a result from raw counts, checking the bitstring widths and the
    /// shot total.
    ///
    /// # Errors
    /// Returns `FsmError::InvalidInput` if `width` is zero or wider than the
    /// simulator's register limit, if any key is not a `width`-character
    /// binary string, or if the counts do not add up to `shots`.
    pub fn from_counts(shots: u64, width: usize, counts: BTreeMap<String, u64>) -> FsmResult<Self> {
        let result = Self { shots, width, counts };
        crate::validation::check_counts(&result)?;
        Ok(result)
    }

    /// Builds a result from a histogram indexed by outcome value. (Internal visibility)
    pub(crate) fn from_histogram(shots: u64, width: usize, histogram: &[u64]) -> Self {
        let counts = histogram
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(outcome, count)| (format_bitstring(outcome, width), *count))
            .collect();
        Self { shots, width, counts }
    }

    /// Number of shots the counts were accumulated over.
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Width in bits of every bitstring key.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Observed bitstrings and their counts, sorted by bitstring.
    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// Count for one bitstring; unobserved bitstrings report 0.
    pub fn count(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Sum of all counts. Equal to `shots()` for any result produced by the crate.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Relative frequency of a bitstring.
    pub fn probability(&self, bitstring: &str) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        self.count(bitstring) as f64 / self.shots as f64
    }

    /// The most frequent bitstring and its count. Ties resolve to the smallest
    /// bitstring. `None` only for an empty result.
    pub fn dominant(&self) -> Option<(&str, u64)> {
        let mut best: Option<(&str, u64)> = None;
        for (bitstring, count) in &self.counts {
            match best {
                Some((_, best_count)) if *count <= best_count => {}
                _ => best = Some((bitstring.as_str(), *count)),
            }
        }
        best
    }

    /// The dominant bitstring interpreted as a state machine output, for
    /// 3-bit results.
    pub fn dominant_state(&self) -> Option<OutputState> {
        self.dominant().and_then(|(bitstring, _)| OutputState::from_bitstring(bitstring))
    }

    /// Every bitstring of this result's width, in ascending order.
    pub fn all_bitstrings(&self) -> Vec<String> {
        all_bitstrings(self.width)
    }

    /// Serializes the counts as pretty JSON.
    pub fn to_json(&self) -> FsmResult<String> {
        serde_json::to_string_pretty(self).map_err(FsmError::from)
    }
}

/// Every bitstring of the given width, in ascending order. Callers keep
/// `width` within the simulator's register limit.
pub(crate) fn all_bitstrings(width: usize) -> Vec<String> {
    (0..1usize << width).map(|v| format_bitstring(v, width)).collect()
}

pub(crate) fn format_bitstring(value: usize, width: usize) -> String {
    format!("{:0width$b}", value, width = width)
}

impl fmt::Display for StateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (bitstring, count)) in self.counts.iter().enumerate() {
            write!(f, "{}'{}': {}", if i > 0 { ", " } else { "" }, bitstring, count)?;
        }
        write!(f, "}}")
    }
}
