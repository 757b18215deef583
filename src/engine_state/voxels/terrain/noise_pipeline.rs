//! # Terrain Noise Pipeline
//!
//! The terrain density field is built from a handful of Perlin sources:
//!
//! ```text
//! clamp(turbulence(scale(elevation + roughness * detail)), -1, 1)
//! ```
//!
//! * `elevation`, `roughness` and `detail` are single-octave Perlin fields with their
//!   own frequency and seed
//! * `scale` shrinks the input point so features span many blocks
//! * `turbulence` warps the input point with three more Perlin fields before the
//!   combined field is evaluated, which breaks up the regular Perlin lattice
//!
//! Every source derives its seed from the world seed by multiplying with a distinct
//! small prime, so the fields are decorrelated for any world seed.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::Deserialize;

use crate::error::{positive, ConfigError};

/// Parameters of one Perlin source.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PerlinParams {
    /// Multiplied (wrapping) with the world seed to get this source's seed.
    pub seed_multiplier: u32,
    /// Frequency of the first octave.
    pub frequency: f64,
    /// Amplitude falloff between octaves.
    pub persistence: f64,
    /// Number of octaves.
    pub octaves: usize,
}

impl PerlinParams {
    fn new(seed_multiplier: u32, frequency: f64, persistence: f64) -> Self {
        PerlinParams {
            seed_multiplier,
            frequency,
            persistence,
            octaves: 1,
        }
    }

    /// Checks that frequency, persistence and octave count are positive.
    pub fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        positive(name, self.frequency)?;
        positive(name, self.persistence)?;
        positive(name, self.octaves as f64)
    }

    fn build(&self, seed: u32) -> Fbm<Perlin> {
        Fbm::<Perlin>::new(seed.wrapping_mul(self.seed_multiplier))
            .set_octaves(self.octaves)
            .set_frequency(self.frequency)
            .set_persistence(self.persistence)
    }
}

/// Parameters of the domain-warping stage.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TurbulenceParams {
    /// Multiplied (wrapping) with the world seed; the three distortion fields use this
    /// seed plus 0, 1 and 2.
    pub seed_multiplier: u32,
    /// Frequency of the distortion fields.
    pub frequency: f64,
    /// Maximum displacement of a sample point, in blocks.
    pub power: f64,
    /// Octaves of the distortion fields.
    pub roughness: usize,
}

/// Parameters of the whole density field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Large scale hills.
    pub elevation: PerlinParams,
    /// Modulates the amplitude of `detail`.
    pub roughness: PerlinParams,
    /// Small scale variation.
    pub detail: PerlinParams,
    /// Factor applied to sample points before the combined field is evaluated.
    pub scale: f64,
    /// Domain warping of the sample points.
    pub turbulence: TurbulenceParams,
    /// Lower clamp bound of the final value.
    pub clamp_min: f64,
    /// Upper clamp bound of the final value.
    pub clamp_max: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        NoiseParams {
            elevation: PerlinParams::new(23, 0.2, 0.7),
            roughness: PerlinParams::new(29, 0.53, 0.9),
            detail: PerlinParams::new(17, 0.7, 0.7),
            scale: 0.06,
            turbulence: TurbulenceParams {
                seed_multiplier: 53,
                frequency: 0.01,
                power: 8.0,
                roughness: 1,
            },
            clamp_min: -1.0,
            clamp_max: 1.0,
        }
    }
}

impl NoiseParams {
    /// Checks every source and stage parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.elevation.validate("elevation noise")?;
        self.roughness.validate("roughness noise")?;
        self.detail.validate("detail noise")?;
        positive("noise scale", self.scale)?;
        positive("turbulence frequency", self.turbulence.frequency)?;
        positive("turbulence power", self.turbulence.power)?;
        positive("turbulence roughness", self.turbulence.roughness as f64)?;
        if self.clamp_min >= self.clamp_max {
            return Err(ConfigError::EmptyRange {
                name: "noise clamp",
                min: self.clamp_min,
                max: self.clamp_max,
            });
        }
        Ok(())
    }
}

/// Offsets added to the sample point before querying each distortion field, so the
/// three fields are not sampled at the same lattice phase.
const WARP_OFFSETS: [[f64; 3]; 3] = [
    [12414.0 / 65536.0, 65124.0 / 65536.0, 31337.0 / 65536.0],
    [26519.0 / 65536.0, 18128.0 / 65536.0, 60493.0 / 65536.0],
    [53820.0 / 65536.0, 11213.0 / 65536.0, 44845.0 / 65536.0],
];

/// Displaces sample points by three independent Perlin fields.
struct DomainWarp {
    fields: [Fbm<Perlin>; 3],
    power: f64,
}

impl DomainWarp {
    fn new(params: &TurbulenceParams, seed: u32) -> Self {
        let base = seed.wrapping_mul(params.seed_multiplier);
        let field = |offset: u32| {
            Fbm::<Perlin>::new(base.wrapping_add(offset))
                .set_octaves(params.roughness)
                .set_frequency(params.frequency)
        };
        DomainWarp {
            fields: [field(0), field(1), field(2)],
            power: params.power,
        }
    }

    fn displace(&self, point: [f64; 3]) -> [f64; 3] {
        let mut warped = point;
        for (axis, (field, offset)) in self.fields.iter().zip(WARP_OFFSETS.iter()).enumerate() {
            let probe = [
                point[0] + offset[0],
                point[1] + offset[1],
                point[2] + offset[2],
            ];
            warped[axis] += field.get(probe) * self.power;
        }
        warped
    }
}

/// The terrain density field for one world seed.
///
/// Values lie in `[clamp_min, clamp_max]`; the generator subtracts a height bias to
/// decide solidity.
pub struct TerrainNoise {
    elevation: Fbm<Perlin>,
    roughness: Fbm<Perlin>,
    detail: Fbm<Perlin>,
    scale: f64,
    warp: DomainWarp,
    clamp: (f64, f64),
}

impl TerrainNoise {
    /// Builds every source of the field for `seed`. `params` must already be validated.
    pub fn new(params: &NoiseParams, seed: u32) -> Self {
        TerrainNoise {
            elevation: params.elevation.build(seed),
            roughness: params.roughness.build(seed),
            detail: params.detail.build(seed),
            scale: params.scale,
            warp: DomainWarp::new(&params.turbulence, seed),
            clamp: (params.clamp_min, params.clamp_max),
        }
    }

    fn combined(&self, point: [f64; 3]) -> f64 {
        let scaled = [
            point[0] * self.scale,
            point[1] * self.scale,
            point[2] * self.scale,
        ];
        self.elevation.get(scaled) + self.roughness.get(scaled) * self.detail.get(scaled)
    }
}

impl NoiseFn<f64, 3> for TerrainNoise {
    fn get(&self, point: [f64; 3]) -> f64 {
        let warped = self.warp.displace(point);
        self.combined(warped).clamp(self.clamp.0, self.clamp.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_stay_within_clamp_bounds() {
        let noise = TerrainNoise::new(&NoiseParams::default(), 1234);
        for i in 0..200 {
            let point = [i as f64 * 3.7, 40.0 + i as f64 * 0.9, -(i as f64) * 5.3];
            let value = noise.get(point);
            assert!((-1.0..=1.0).contains(&value), "{value} out of range");
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = TerrainNoise::new(&NoiseParams::default(), 99);
        let b = TerrainNoise::new(&NoiseParams::default(), 99);
        for i in 0..50 {
            let point = [i as f64 * 1.5, 60.0, i as f64 * -2.5];
            assert_eq!(a.get(point).to_bits(), b.get(point).to_bits());
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = TerrainNoise::new(&NoiseParams::default(), 1);
        let b = TerrainNoise::new(&NoiseParams::default(), 2);
        let differs = (0..50).any(|i| {
            let point = [i as f64 * 7.3, 55.0, i as f64 * 3.1];
            a.get(point) != b.get(point)
        });
        assert!(differs);
    }

    #[test]
    fn validation_rejects_non_positive_parameters() {
        let mut params = NoiseParams::default();
        assert!(params.validate().is_ok());

        params.detail.frequency = 0.0;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NonPositive { name: "detail noise", .. })
        ));

        let mut params = NoiseParams::default();
        params.turbulence.power = -1.0;
        assert!(params.validate().is_err());

        let mut params = NoiseParams::default();
        params.elevation.persistence = f64::NAN;
        assert!(params.validate().is_err());

        let mut params = NoiseParams::default();
        params.clamp_min = 1.0;
        assert!(matches!(params.validate(), Err(ConfigError::EmptyRange { .. })));
    }
}
