//! NNUE evaluation: incremental accumulators feeding a small 3-layer network.

pub mod accumulator;
pub mod network;

use ataxx_core::Color;

use self::accumulator::Accumulator;
pub use network::{NnueError, Weights};

/// Forward pass given the side to move's accumulator pair. Returns a
/// centipawn score from the mover's perspective (positive = good for mover).
pub fn evaluate(pov: Color, white_acc: &Accumulator, black_acc: &Accumulator, weights: &Weights) -> i32 {
    let (us, them) = match pov {
        Color::White => (white_acc, black_acc),
        Color::Black => (black_acc, white_acc),
    };

    let mut x0 = [0f32; 64];
    x0[..32].copy_from_slice(us.values());
    x0[32..].copy_from_slice(them.values());
    for v in x0.iter_mut() {
        *v = v.max(0.0);
    }

    let x1_raw = weights.fc0.forward(&x0);
    let mut x1 = [0f32; 32];
    for (dst, &src) in x1.iter_mut().zip(x1_raw.iter()) {
        *dst = src.max(0.0);
    }

    let x1_prime = weights.fc1.forward(&x1);
    let mut x2 = [0f32; 64];
    x2[..32].copy_from_slice(&x1);
    for (dst, &src) in x2[32..].iter_mut().zip(x1_prime.iter()) {
        *dst = src.max(0.0);
    }

    let score = weights.fc2.forward(&x2)[0];
    (600.0 * score) as i32
}
