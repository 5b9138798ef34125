//! NNUE weight tensors and the streaming loader that fills them.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use super::accumulator::BASE_DIM;

/// 49 squares times 2 stone colors, viewed from one side's perspective.
pub const NUM_FEATURES: usize = 98;

/// Errors loading a weights file.
#[derive(Debug, thiserror::Error)]
pub enum NnueError {
    /// The file could not be opened, or ran out of bytes mid-tensor.
    #[error("failed to read NNUE weights from \"{path}\": {source}")]
    Io { path: String, #[source] source: io::Error },
}

/// A row-major `OUT x IN` affine layer: `y = W x + b`.
#[derive(Clone)]
pub struct Affine<const IN: usize, const OUT: usize> {
    weights: Vec<f32>,
    bias: [f32; OUT],
}

impl<const IN: usize, const OUT: usize> Affine<IN, OUT> {
    #[cfg(test)]
    pub(crate) fn from_parts(weights: Vec<f32>, bias: [f32; OUT]) -> Self {
        assert_eq!(weights.len(), OUT * IN);
        Affine { weights, bias }
    }

    fn load(streamer: &mut WeightsStreamer<impl Read>) -> Result<Self, NnueError> {
        let mut weights = Vec::with_capacity(OUT * IN);
        for _ in 0..OUT * IN {
            weights.push(streamer.next_f32()?);
        }
        let mut bias = [0f32; OUT];
        for slot in bias.iter_mut() {
            *slot = streamer.next_f32()?;
        }
        Ok(Affine { weights, bias })
    }

    /// `y = W x + b`.
    pub fn forward(&self, x: &[f32; IN]) -> [f32; OUT] {
        let mut out = [0f32; OUT];
        for (o, slot) in out.iter_mut().enumerate() {
            let row = &self.weights[o * IN..(o + 1) * IN];
            let mut sum = self.bias[o];
            for (w, xi) in row.iter().zip(x.iter()) {
                sum += w * xi;
            }
            *slot = sum;
        }
        out
    }
}

/// The feature-transformer half-affine: `NUM_FEATURES -> BASE_DIM`, accessed
/// one column (one feature) at a time by the accumulator.
#[derive(Clone)]
pub struct HalfAffine {
    weights: Vec<f32>,
    pub(crate) bias: [f32; BASE_DIM],
}

impl HalfAffine {
    #[cfg(test)]
    pub(crate) fn from_parts(weights: Vec<f32>, bias: [f32; BASE_DIM]) -> Self {
        assert_eq!(weights.len(), BASE_DIM * NUM_FEATURES);
        HalfAffine { weights, bias }
    }

    fn load(streamer: &mut WeightsStreamer<impl Read>) -> Result<Self, NnueError> {
        let mut weights = Vec::with_capacity(BASE_DIM * NUM_FEATURES);
        for _ in 0..BASE_DIM * NUM_FEATURES {
            weights.push(streamer.next_f32()?);
        }
        let mut bias = [0f32; BASE_DIM];
        for slot in bias.iter_mut() {
            *slot = streamer.next_f32()?;
        }
        Ok(HalfAffine { weights, bias })
    }

    /// The weight column for `feature`, one value per output dimension.
    #[inline]
    pub(crate) fn column(&self, feature: usize) -> impl Iterator<Item = f32> + '_ {
        (0..BASE_DIM).map(move |o| self.weights[o * NUM_FEATURES + feature])
    }
}

/// The full set of NNUE weights: two feature-transformer halves (one per
/// perspective) and three stacked affines forming the evaluation head.
pub struct Weights {
    /// XOR of the first 4 bytes of every streamed element — a compatibility
    /// tag, not a cryptographic hash.
    pub signature: u32,
    pub(crate) w: HalfAffine,
    pub(crate) b: HalfAffine,
    pub(crate) fc0: Affine<64, 32>,
    pub(crate) fc1: Affine<32, 32>,
    pub(crate) fc2: Affine<64, 1>,
}

impl Weights {
    /// Stream weights from `path` in the fixed tensor order: `w` (weights
    /// then bias), `b`, `fc0`, `fc1`, `fc2`. No header, no length prefix.
    pub fn load(path: impl AsRef<Path>) -> Result<Weights, NnueError> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref).map_err(|source| NnueError::Io {
            path: path_ref.display().to_string(),
            source,
        })?;
        let mut streamer = WeightsStreamer::new(BufReader::new(file), path_ref.display().to_string());

        let w = HalfAffine::load(&mut streamer)?;
        let b = HalfAffine::load(&mut streamer)?;
        let fc0 = Affine::load(&mut streamer)?;
        let fc1 = Affine::load(&mut streamer)?;
        let fc2 = Affine::load(&mut streamer)?;

        Ok(Weights { signature: streamer.signature, w, b, fc0, fc1, fc2 })
    }
}

struct WeightsStreamer<R> {
    reader: R,
    path: String,
    signature: u32,
}

impl<R: Read> WeightsStreamer<R> {
    fn new(reader: R, path: String) -> Self {
        WeightsStreamer { reader, path, signature: 0 }
    }

    fn next_f32(&mut self) -> Result<f32, NnueError> {
        let mut buf = [0u8; 4];
        self.reader.read_exact(&mut buf).map_err(|source| NnueError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.signature ^= u32::from_le_bytes(buf);
        Ok(f32::from_le_bytes(buf))
    }
}
