//! Deterministic random number generation.
//!
//! RULE: Nothing in the synthetic data path may call any platform RNG.
//! All randomness flows through DrawStream instances derived from the
//! single master seed passed to the generator.
//!
//! Each feature column gets its own draw stream, seeded deterministically
//! from (master_seed XOR stream_index). This means:
//!   - Adding a new stream never changes existing streams' draws.
//!   - Each column's draws are fully reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic draw stream for a single feature column.
pub struct DrawStream {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl DrawStream {
    /// Create a draw stream from the master seed and a stable stream
    /// index. The index must never change once assigned.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from Normal(mean, std) via Box-Muller.
    /// Consumes two uniforms per draw; the second half is discarded so
    /// the stream position stays a pure function of the draw count.
    pub fn normal(&mut self, mean: f64, std: f64) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std * z
    }

    /// Sample from Exponential with the given mean (scale).
    pub fn exponential(&mut self, mean: f64) -> f64 {
        let u = self.next_f64();
        -mean * (1.0 - u).ln()
    }

    /// Sample from Gamma(shape k, scale theta) for small integer k,
    /// as a sum of k exponentials.
    pub fn gamma(&mut self, shape: u32, scale: f64) -> f64 {
        assert!(shape > 0, "shape must be > 0");
        (0..shape).map(|_| self.exponential(scale)).sum()
    }

    /// Sample from LogNormal(mu, sigma) on the log scale.
    pub fn lognormal(&mut self, mu: f64, sigma: f64) -> f64 {
        self.normal(mu, sigma).exp()
    }

    /// Sample from Beta(2, 2) via the gamma-ratio construction:
    /// X ~ Gamma(2), Y ~ Gamma(2), X / (X + Y).
    pub fn beta_2_2(&mut self) -> f64 {
        let x = self.gamma(2, 1.0);
        let y = self.gamma(2, 1.0);
        x / (x + y)
    }
}

/// All draw streams for a single generation run, indexed by stable slot.
pub struct StreamBank {
    master_seed: u64,
}

impl StreamBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stream(&self, slot: StreamSlot) -> DrawStream {
        DrawStream::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every stream's seed and breaks reproducibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Engagement = 0,
    Tenure = 1,
    SupportResponse = 2,
    Revenue = 3,
    Activity = 4,
    LabelNoise = 5,
    TrainSplit = 6,
    // Add new streams here — append only.
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Engagement => "engagement",
            Self::Tenure => "tenure",
            Self::SupportResponse => "support_response",
            Self::Revenue => "revenue",
            Self::Activity => "activity",
            Self::LabelNoise => "label_noise",
            Self::TrainSplit => "train_split",
        }
    }
}
