//! Reaction-order candidate grid.
//!
//! Orders are scanned on a fixed 0.01 grid over three disjoint ranges, in this order:
//!
//! 1. `[0, 1)`   (0.00 .. 0.99)
//! 2. `(1, 3]`   (1.01 .. 3.00)
//! 3. `[-1, 0)`  (-1.00 .. -0.01)
//!
//! `n = 1` is excluded: the `c^(1-n)` linearization degenerates there (use the
//! first-order model instead). Candidates are built from integer indices so the
//! grid carries no accumulated floating-point drift.

use std::ops::RangeInclusive;

/// Grid spacing of the order scan.
pub const ORDER_STEP: f64 = 0.01;

/// Index ranges (in units of [`ORDER_STEP`]) in scan order.
pub const SCAN_RANGES: [RangeInclusive<i32>; 3] = [0..=99, 101..=300, -100..=-1];

/// Orders for one index range, ascending.
pub fn order_range(indices: RangeInclusive<i32>) -> Vec<f64> {
    indices.map(|i| i as f64 * ORDER_STEP).collect()
}

/// The full candidate sequence, in scan order.
pub fn default_order_grid() -> Vec<f64> {
    SCAN_RANGES.iter().cloned().flat_map(order_range).collect()
}
