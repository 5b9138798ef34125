//! Core Ataxx types: the 7x7 board, moves, and game rules, kept thin the way
//! a consumed board-library dependency would be.

mod bitboard;
mod board;
mod color;
mod error;
mod geometry;
mod mv;
mod square;
mod zobrist;

pub use bitboard::Bitboard;
pub use board::{Outcome, Position};
pub use color::Color;
pub use error::{BoardError, PositionError};
pub use mv::Move;
pub use square::{Square, NUM_SQUARES, SIDE};

/// The standard Ataxx starting position in notation form.
pub const STARTING_POSITION: &str = "x5o/7/7/7/7/7/o5x x";
