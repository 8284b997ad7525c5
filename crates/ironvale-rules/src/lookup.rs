//! Ordered threshold tables.
//!
//! Several formulas map a number onto a step function: the PvP
//! intelligence modifier (by intelligence ratio) and the praying efficiency
//! tier (by stat total). Both are expressed as a [`ThresholdTable`], an
//! ordered list of `(threshold, value)` steps plus a value for everything
//! above the last step.
//!
//! # Tie-break rule
//!
//! The table is scanned front to back and the first step whose threshold is
//! strictly greater than the input wins. An input that lands exactly on a
//! threshold therefore falls into the *next* step: with steps
//! `[(1100, 3.5), (1300, 2.5)]`, `1099 -> 3.5` and `1100 -> 2.5`.

use rust_decimal::Decimal;

/// A step function over [`Decimal`] inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdTable<V> {
    steps: Vec<(Decimal, V)>,
    otherwise: V,
}

impl<V: Copy> ThresholdTable<V> {
    /// Build a table from `(threshold, value)` steps and the value used once
    /// the input reaches the last threshold. Steps are sorted by threshold.
    pub fn new(mut steps: Vec<(Decimal, V)>, otherwise: V) -> Self {
        steps.sort_by(|a, b| a.0.cmp(&b.0));
        Self { steps, otherwise }
    }

    /// Look up the value for `input`.
    pub fn lookup(&self, input: Decimal) -> V {
        self.steps
            .iter()
            .find(|(threshold, _)| input < *threshold)
            .map_or(self.otherwise, |(_, value)| *value)
    }
}
