//! Deterministic random streams for synthetic call data.
//!
//! RULE: synthetic data never touches a platform RNG. Every stream is a
//! `Pcg64Mcg` seeded from one master seed plus a stable slot, so adding a
//! slot never changes what the existing ones produce.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub type SampleRng = Pcg64Mcg;

/// Share of calls that run past the usual short-call band.
const LONG_CALL_RATE: f64 = 0.08;

/// Stable stream assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Operator = 0,
    Calendar = 1,
    Duration = 2,
    Rating = 3,
    Defect = 4,
    Identity = 5,
}

/// The stream for `slot` under `master_seed`.
pub fn stream(master_seed: u64, slot: StreamSlot) -> SampleRng {
    let seed = master_seed.wrapping_mul(0x9e37_79b9_7f4a_7c15).wrapping_add(slot as u64);
    Pcg64Mcg::seed_from_u64(seed)
}

/// Call length in minutes: mostly short calls, with a thin band of long ones.
pub fn call_minutes<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen_bool(LONG_CALL_RATE) {
        rng.gen_range(12.0..90.0)
    } else {
        rng.gen_range(0.5..12.0)
    }
}

/// A whole-star rating on the 1..=5 scale.
pub fn rating<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.gen_range(1u8..=5))
}
