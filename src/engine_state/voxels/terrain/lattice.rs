//! # Noise Lattice
//!
//! Evaluating the terrain noise for every block of a chunk is the dominant cost of
//! chunk generation. The lattice evaluates the noise only every `sampling_rate` blocks
//! along each axis and fills the remaining cells by trilinear interpolation between
//! the eight surrounding samples.
//!
//! The lattice covers `dimension + 1` cells per axis so that the cells on the far side
//! of the chunk still have an upper sample to interpolate towards. Those extra cells
//! are sampled but never interpolated.

use noise::NoiseFn;

use crate::engine_state::voxels::block::Block;

/// Linear interpolation of the value at `x` between `(x1, q0)` and `(x2, q1)`.
pub fn lerp(x: f32, x1: f32, x2: f32, q0: f32, q1: f32) -> f32 {
    ((x2 - x) / (x2 - x1)) * q0 + ((x - x1) / (x2 - x1)) * q1
}

/// Trilinear interpolation at `point` inside the cell spanned by `low` and `high`.
///
/// `corners[i][j][k]` is the known value at x = `low.x` (i = 0) or `high.x` (i = 1),
/// and likewise j for y and k for z. Interpolation runs along x first, then y, then z.
pub fn trilerp(point: [f32; 3], low: [f32; 3], high: [f32; 3], corners: [[[f32; 2]; 2]; 2]) -> f32 {
    let [x, y, z] = point;
    let [x1, y1, z1] = low;
    let [x2, y2, z2] = high;

    let q00 = lerp(x, x1, x2, corners[0][0][0], corners[1][0][0]);
    let q01 = lerp(x, x1, x2, corners[0][0][1], corners[1][0][1]);
    let q10 = lerp(x, x1, x2, corners[0][1][0], corners[1][1][0]);
    let q11 = lerp(x, x1, x2, corners[0][1][1], corners[1][1][1]);

    let q0 = lerp(y, y1, y2, q00, q10);
    let q1 = lerp(y, y1, y2, q01, q11);

    lerp(z, z1, z2, q0, q1)
}

/// Noise values for every block of one chunk, from a coarse set of samples.
pub struct NoiseLattice {
    /// Cells per axis, `dimension + 1`.
    size: usize,
    values: Vec<f32>,
}

impl NoiseLattice {
    /// Samples `noise` at block coordinates starting at `origin`.
    ///
    /// `sampling_rate` must be positive and divide `dimension`; the terrain generator
    /// validates both when it is constructed.
    pub fn sample<N: NoiseFn<f64, 3>>(
        noise: &N,
        origin: Block,
        dimension: usize,
        sampling_rate: usize,
    ) -> Self {
        let size = dimension + 1;
        let mut lattice = NoiseLattice {
            size,
            values: vec![0.0; size * size * size],
        };

        for x in (0..size).step_by(sampling_rate) {
            for y in (0..size).step_by(sampling_rate) {
                for z in (0..size).step_by(sampling_rate) {
                    let value = noise.get([
                        (origin.0.x + x as i32) as f64,
                        (origin.0.y + y as i32) as f64,
                        (origin.0.z + z as i32) as f64,
                    ]);
                    lattice.set(x, y, z, value as f32);
                }
            }
        }

        for x in 0..dimension {
            for y in 0..dimension {
                for z in 0..dimension {
                    if x % sampling_rate == 0 && y % sampling_rate == 0 && z % sampling_rate == 0 {
                        continue;
                    }

                    let (sx0, sy0, sz0) = (
                        x / sampling_rate * sampling_rate,
                        y / sampling_rate * sampling_rate,
                        z / sampling_rate * sampling_rate,
                    );
                    let (sx1, sy1, sz1) = (sx0 + sampling_rate, sy0 + sampling_rate, sz0 + sampling_rate);

                    let corners = [
                        [
                            [lattice.get(sx0, sy0, sz0), lattice.get(sx0, sy0, sz1)],
                            [lattice.get(sx0, sy1, sz0), lattice.get(sx0, sy1, sz1)],
                        ],
                        [
                            [lattice.get(sx1, sy0, sz0), lattice.get(sx1, sy0, sz1)],
                            [lattice.get(sx1, sy1, sz0), lattice.get(sx1, sy1, sz1)],
                        ],
                    ];
                    let value = trilerp(
                        [x as f32, y as f32, z as f32],
                        [sx0 as f32, sy0 as f32, sz0 as f32],
                        [sx1 as f32, sy1 as f32, sz1 as f32],
                        corners,
                    );
                    lattice.set(x, y, z, value);
                }
            }
        }

        lattice
    }

    /// Noise value of the cell at chunk-relative coordinates.
    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.values[self.index(x, y, z)]
    }

    fn set(&mut self, x: usize, y: usize, z: usize, value: f32) {
        let index = self.index(x, y, z);
        self.values[index] = value;
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.size + y) * self.size + z
    }
}
