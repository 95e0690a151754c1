//! Seeded pseudo-random source.
//!
//! Every random decision in the engine draws from one `SimRng` owned by the
//! simulation. Its full position in the stream can be captured and restored,
//! so a resumed run produces the same future as an uninterrupted one.

use biotorus_data::Vec3;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Serializable position of a `SimRng` in its stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
    pub word_pos: u128,
}

#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restarts the stream from a new seed.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    pub fn state(&self) -> RngState {
        RngState {
            seed: self.seed,
            stream: self.inner.get_stream(),
            word_pos: self.inner.get_word_pos(),
        }
    }

    pub fn from_state(state: RngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_stream(state.stream);
        inner.set_word_pos(state.word_pos);
        Self {
            seed: state.seed,
            inner,
        }
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    /// Uniform in `[min, max)`; returns `min` when the range is empty.
    ///
    /// # Panics
    /// Panics if either bound is non-finite or `min > max`.
    #[inline]
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        assert!(
            min.is_finite() && max.is_finite() && min <= max,
            "invalid random range [{min}, {max})"
        );
        min + self.next_f64() * (max - min)
    }

    /// Uniform integer in `[min, max]`.
    ///
    /// # Panics
    /// Panics if `min > max`.
    pub fn range_int(&mut self, min: i64, max: i64) -> i64 {
        assert!(min <= max, "invalid random integer range [{min}, {max}]");
        self.inner.gen_range(min..=max)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Either `-1.0` or `1.0`.
    pub fn sign(&mut self) -> f64 {
        if self.next_f64() < 0.5 {
            -1.0
        } else {
            1.0
        }
    }

    /// Picks one element uniformly.
    ///
    /// # Panics
    /// Panics if `items` is empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "cannot choose from an empty slice");
        let idx = (self.next_f64() * items.len() as f64) as usize;
        &items[idx.min(items.len() - 1)]
    }

    /// Uniformly distributed direction on the unit sphere.
    pub fn unit_vector(&mut self) -> Vec3 {
        let z = self.range(-1.0, 1.0);
        let theta = self.range(0.0, std::f64::consts::TAU);
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), r * theta.sin(), z)
    }

    /// Uniform point in the cube `[0, size)³`.
    pub fn point_in_cube(&mut self, size: f64) -> Vec3 {
        Vec3::new(
            self.range(0.0, size),
            self.range(0.0, size),
            self.range(0.0, size),
        )
    }
}
