use crate::{CellId, Hypergraph};

/// Allowed range of each side's aggregate size, as fractions of the total size.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct BalanceWindow {
    pub lower: f64,
    pub upper: f64,
}

impl BalanceWindow {
    /// Window of a plain 2-way run.
    pub const BISECTION: Self = Self::new(0.45, 0.55);
    /// Window of the first split of a 4-way run.
    pub const QUADRISECTION_ROOT: Self = Self::new(0.48, 0.52);
    /// Target share of each final group of a 4-way run, relative to the root total.
    pub const QUADRISECTION_LEAF: Self = Self::new(0.225, 0.275);

    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Inclusive integer size bounds `(ceil(lower * total), ceil(upper * total))`.
    ///
    /// For some totals the lower cap exceeds the upper one; no legal split exists then and
    /// every move is rejected.
    pub fn caps(&self, total_size: u64) -> (u64, u64) {
        (
            ratio_cap(self.lower, total_size),
            ratio_cap(self.upper, total_size),
        )
    }

    /// Rescales this window for a sub-hypergraph holding `fraction` of the root's total
    /// size, so that its sides map back onto the same shares of the root.
    pub fn rescaled(&self, fraction: f64) -> Self {
        Self::new(
            (self.lower / fraction).max(0.0),
            (self.upper / fraction).min(1.0),
        )
    }

    /// Whether moving `cx` to the opposite side keeps the side it leaves at or above the
    /// lower cap and the side it joins at or below the upper cap. Locked cells never move.
    pub fn feasible(&self, hg: &Hypergraph, cx: CellId) -> bool {
        let cell = &hg.cells[cx as usize];
        if cell.locked {
            return false;
        }

        let (lower, upper) = self.caps(hg.total_size);
        let from = cell.group as usize & 1;
        let size = cell.size as u64;
        let from_size = hg.side_size[from];
        let to_size = hg.side_size[1 - from];

        from_size >= size && from_size - size >= lower && to_size + size <= upper
    }
}

impl Default for BalanceWindow {
    fn default() -> Self {
        Self::BISECTION
    }
}

fn ratio_cap(ratio: f64, total_size: u64) -> u64 {
    (ratio * total_size as f64).ceil() as u64
}
