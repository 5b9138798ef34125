//! NNUE accumulator: one running feature-sum vector per perspective.

use ataxx_core::{Color, Position};

use super::network::{HalfAffine, Weights};

/// Accumulator width: the two half-affines project onto `BASE_DIM` values.
pub const BASE_DIM: usize = 32;

/// One side's running sum of active feature columns. Kept O(1) to query by
/// maintaining it incrementally across `make`/`unmake` instead of
/// recomputing from scratch per node.
#[derive(Clone, Copy)]
pub struct Accumulator {
    vals: [f32; BASE_DIM],
}

impl Accumulator {
    /// Reset to the affine's bias column — the "no stones" base case.
    pub fn clear(affine: &HalfAffine) -> Self {
        Accumulator { vals: affine.bias }
    }

    /// Add feature column `idx` (in `[0, 98)`).
    #[inline]
    pub fn insert(&mut self, idx: usize, affine: &HalfAffine) {
        for (v, w) in self.vals.iter_mut().zip(affine.column(idx)) {
            *v += w;
        }
    }

    /// Subtract feature column `idx`, the exact inverse of `insert`.
    #[inline]
    pub fn erase(&mut self, idx: usize, affine: &HalfAffine) {
        for (v, w) in self.vals.iter_mut().zip(affine.column(idx)) {
            *v -= w;
        }
    }

    #[inline]
    pub fn values(&self) -> &[f32; BASE_DIM] {
        &self.vals
    }
}

/// Index of a white stone at `sq`, as seen from the white-perspective half.
#[inline]
pub fn own_feature(sq_index: usize) -> usize {
    sq_index
}

/// Index of an enemy stone at `sq`, as seen from the opposing perspective half.
#[inline]
pub fn enemy_feature(sq_index: usize) -> usize {
    ataxx_core::NUM_SQUARES + sq_index
}

/// Recompute both accumulators from scratch for `pos`. Used when a position
/// is first set; thereafter both accumulators are maintained incrementally.
pub fn refresh(pos: &Position, weights: &Weights) -> (Accumulator, Accumulator) {
    let mut white_acc = Accumulator::clear(&weights.w);
    let mut black_acc = Accumulator::clear(&weights.b);

    let mut whites = pos.stones(Color::White);
    while let Some((sq, rest)) = whites.pop_lsb() {
        white_acc.insert(own_feature(sq.index()), &weights.w);
        black_acc.insert(enemy_feature(sq.index()), &weights.b);
        whites = rest;
    }

    let mut blacks = pos.stones(Color::Black);
    while let Some((sq, rest)) = blacks.pop_lsb() {
        black_acc.insert(own_feature(sq.index()), &weights.b);
        white_acc.insert(enemy_feature(sq.index()), &weights.w);
        blacks = rest;
    }

    (white_acc, black_acc)
}
