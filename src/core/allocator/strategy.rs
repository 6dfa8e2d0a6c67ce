use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;

use super::error::UnknownStrategy;

lazy_static! {
    // Every spelling accepted for a strategy, lowercased.
    static ref STRATEGY_NAMES: HashMap<&'static str, FitStrategy> = HashMap::from([
        ("first-fit", FitStrategy::FirstFit),
        ("firstfit", FitStrategy::FirstFit),
        ("first", FitStrategy::FirstFit),
        ("ff", FitStrategy::FirstFit),
        ("best-fit", FitStrategy::BestFit),
        ("bestfit", FitStrategy::BestFit),
        ("best", FitStrategy::BestFit),
        ("bf", FitStrategy::BestFit),
        ("worst-fit", FitStrategy::WorstFit),
        ("worstfit", FitStrategy::WorstFit),
        ("worst", FitStrategy::WorstFit),
        ("wf", FitStrategy::WorstFit),
        ("next-fit", FitStrategy::NextFit),
        ("nextfit", FitStrategy::NextFit),
        ("next", FitStrategy::NextFit),
        ("nf", FitStrategy::NextFit),
    ]);
}

/// Policy used to pick the free block an allocation is carved
/// from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FitStrategy {
    /// First free block large enough, in address order.
    #[default]
    FirstFit,
    /// Smallest free block large enough.
    BestFit,
    /// Largest free block.
    WorstFit,
    /// Like first-fit, but resumes scanning after the block
    /// picked by the previous next-fit allocation.
    NextFit,
}

impl FitStrategy {
    pub const ALL: [FitStrategy; 4] = [
        FitStrategy::FirstFit,
        FitStrategy::BestFit,
        FitStrategy::WorstFit,
        FitStrategy::NextFit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FitStrategy::FirstFit => "First-Fit",
            FitStrategy::BestFit => "Best-Fit",
            FitStrategy::WorstFit => "Worst-Fit",
            FitStrategy::NextFit => "Next-Fit",
        }
    }

    /// Picks one of the candidates and returns its ledger
    /// index, or `None` if there are no candidates at all.
    ///
    /// Only next-fit reads and advances `cursor`. The cursor is
    /// a position in the candidate list, so it is reinterpreted
    /// against whatever the candidate list looks like on the
    /// next call.
    pub(super) fn select(self, candidates: &[Candidate], cursor: &mut usize) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }

        let chosen = match self {
            FitStrategy::FirstFit => candidates[0],
            // Strict comparisons: ties go to the candidate seen
            // first.
            FitStrategy::BestFit => candidates
                .iter()
                .copied()
                .reduce(|best, c| if c.size < best.size { c } else { best })?,
            FitStrategy::WorstFit => candidates
                .iter()
                .copied()
                .reduce(|worst, c| if c.size > worst.size { c } else { worst })?,
            FitStrategy::NextFit => {
                // Every candidate already fits, so the scan
                // from the cursor stops at its first step. The
                // cursor may point past the end of a shorter
                // list, hence the wrap.
                let position = *cursor % candidates.len();
                *cursor = (position + 1) % candidates.len();
                candidates[position]
            }
        };

        Some(chosen.index)
    }
}

impl fmt::Display for FitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FitStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        STRATEGY_NAMES
            .get(key.as_str())
            .copied()
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Free block that is large enough for the current request,
/// tagged with its position in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct Candidate {
    pub index: usize,
    pub size: u64,
}
