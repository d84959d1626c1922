use clap::ValueEnum;

use ptrs_core::dates::DayCountPolicy;
use ptrs_core::metrics::{ModeTieBreak, ReceivableTermComparison};

/// Day-count policy flag
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DayCountArg {
    /// Partial days rounded up, start date excluded
    Exclusive,
    /// Whole days plus one, both endpoints counted
    Inclusive,
}

impl From<DayCountArg> for DayCountPolicy {
    fn from(arg: DayCountArg) -> Self {
        match arg {
            DayCountArg::Exclusive => DayCountPolicy::ExclusiveCeiling,
            DayCountArg::Inclusive => DayCountPolicy::InclusiveFloor,
        }
    }
}

/// Mode tie-break flag
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TieBreakArg {
    Smallest,
    Largest,
    First,
}

impl From<TieBreakArg> for ModeTieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::Smallest => ModeTieBreak::Smallest,
            TieBreakArg::Largest => ModeTieBreak::Largest,
            TieBreakArg::First => ModeTieBreak::FirstEncountered,
        }
    }
}

/// Receivable term comparison flag
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ComparisonArg {
    Shorter,
    Same,
    Longer,
    NotAssessed,
}

impl From<ComparisonArg> for ReceivableTermComparison {
    fn from(arg: ComparisonArg) -> Self {
        match arg {
            ComparisonArg::Shorter => ReceivableTermComparison::Shorter,
            ComparisonArg::Same => ReceivableTermComparison::Same,
            ComparisonArg::Longer => ReceivableTermComparison::Longer,
            ComparisonArg::NotAssessed => ReceivableTermComparison::NotAssessed,
        }
    }
}
