//! A board position with its NNUE accumulators kept in lockstep.
//!
//! [`ataxx_core::Position::make`]/`unmake` mutate the board alone; the
//! searcher additionally needs the feature-transformer accumulators for both
//! perspectives updated the same way, without a full refresh per node. This
//! wraps the two together, recording alongside its own undo stack exactly
//! which squares flipped so `unmake` can reverse the accumulator update
//! without asking the board to remember it twice.

use ataxx_core::{Bitboard, Color, Move, Position};

use crate::eval::nnue::accumulator::{self, Accumulator};
use crate::eval::nnue::Weights;

struct Undo {
    mv: Move,
    flips: Bitboard,
}

/// A position plus the white/black accumulators for `weights`.
pub struct SearchPosition<'w> {
    pos: Position,
    white_acc: Accumulator,
    black_acc: Accumulator,
    weights: &'w Weights,
    undo: Vec<Undo>,
}

impl<'w> SearchPosition<'w> {
    /// Build from a board position, computing fresh accumulators.
    pub fn new(pos: Position, weights: &'w Weights) -> Self {
        let (white_acc, black_acc) = accumulator::refresh(&pos, weights);
        SearchPosition { pos, white_acc, black_acc, weights, undo: Vec::new() }
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    pub fn weights(&self) -> &'w Weights {
        self.weights
    }

    /// Static evaluation from the side-to-move's perspective.
    pub fn evaluate(&self) -> i32 {
        crate::eval::nnue::evaluate(self.pos.side_to_move(), &self.white_acc, &self.black_acc, self.weights)
    }

    /// Play `mv`, updating the board and both accumulators in lockstep.
    /// See the incremental update protocol: on a stone move, `to` and every
    /// flipped enemy square become the mover's; on a leap, `from` also
    /// becomes vacant.
    pub fn make(&mut self, mv: Move) {
        let flips = self.pos.flips_for(mv);
        if !mv.is_null() {
            let mover = self.pos.side_to_move();
            let to = mv.to_square().index();

            self.set(mover, to);
            for sq in flips {
                self.clear(!mover, sq.index());
                self.set(mover, sq.index());
            }
            if mv.is_stone_move() && !mv.is_clone() {
                self.clear(mover, mv.from_square().index());
            }
        }
        self.pos.make(mv);
        self.undo.push(Undo { mv, flips });
    }

    /// Undo the most recent `make`, restoring both accumulators exactly.
    pub fn unmake(&mut self) {
        let Undo { mv, flips } = self.undo.pop().expect("unmake called without a matching make");
        self.pos.unmake();

        if !mv.is_null() {
            let mover = self.pos.side_to_move();
            let to = mv.to_square().index();

            if mv.is_stone_move() && !mv.is_clone() {
                self.set(mover, mv.from_square().index());
            }
            for sq in flips {
                self.clear(mover, sq.index());
                self.set(!mover, sq.index());
            }
            self.clear(mover, to);
        }
    }

    fn set(&mut self, owner: Color, sq_index: usize) {
        let own_feature = accumulator::own_feature(sq_index);
        let enemy_feature = accumulator::enemy_feature(sq_index);
        match owner {
            Color::White => {
                self.white_acc.insert(own_feature, &self.weights.w);
                self.black_acc.insert(enemy_feature, &self.weights.b);
            }
            Color::Black => {
                self.black_acc.insert(own_feature, &self.weights.b);
                self.white_acc.insert(enemy_feature, &self.weights.w);
            }
        }
    }

    fn clear(&mut self, owner: Color, sq_index: usize) {
        let own_feature = accumulator::own_feature(sq_index);
        let enemy_feature = accumulator::enemy_feature(sq_index);
        match owner {
            Color::White => {
                self.white_acc.erase(own_feature, &self.weights.w);
                self.black_acc.erase(enemy_feature, &self.weights.b);
            }
            Color::Black => {
                self.black_acc.erase(own_feature, &self.weights.b);
                self.white_acc.erase(enemy_feature, &self.weights.w);
            }
        }
    }
}
