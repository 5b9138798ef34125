//! Static position evaluation.

pub mod nnue;

pub use nnue::{evaluate, NnueError, Weights};
