//! Deterministic random number generation for synthetic datasets.
//!
//! RULE: The generator never calls a platform RNG.
//! All randomness flows through FieldRng instances derived
//! from the single master seed passed to the generator.
//!
//! Each field family gets its own stream, seeded deterministically
//! from (master_seed XOR slot_index * golden-ratio constant). This means:
//!   - Adding a new field family never changes existing streams.
//!   - The same seed always produces the same member table.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single field family.
pub struct FieldRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl FieldRng {
    /// Create a field RNG from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
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
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). `n` must be > 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [low, high] (inclusive).
    pub fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        debug_assert!(low <= high);
        low + self.next_u64_below((high - low) as u64 + 1) as u32
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Poisson draw (Knuth). Fine for the small means used by the generator.
    pub fn poisson(&mut self, lambda: f64) -> u32 {
        let limit = (-lambda).exp();
        let mut k = 0u32;
        let mut p = 1.0;
        loop {
            p *= self.next_f64();
            if p <= limit {
                return k;
            }
            k += 1;
        }
    }

    /// Normal draw via Box–Muller.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Pick one element uniformly. Returns None on an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_u64_below(items.len() as u64) as usize)
    }
}

/// All field RNGs for a single generation run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_field(&self, slot: FieldSlot) -> FieldRng {
        FieldRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable field slot assignments.
/// NEVER reorder or remove entries. Append only.
/// Reordering changes every field's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum FieldSlot {
    Group = 0,
    Tenure = 1,
    Engagement = 2,
    Value = 3,
    Risk = 4,
    Status = 5,
    Profile = 6,
    // Add new field families here. Append only.
}

impl FieldSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Tenure => "tenure",
            Self::Engagement => "engagement",
            Self::Value => "value",
            Self::Risk => "risk",
            Self::Status => "status",
            Self::Profile => "profile",
        }
    }
}
