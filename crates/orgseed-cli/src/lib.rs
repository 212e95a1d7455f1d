pub mod config;
pub mod error;
pub mod logging;
pub mod org;
pub mod seed;
pub mod split;

use rand::SeedableRng;
use rand::rngs::StdRng;
use time::{Date, OffsetDateTime};

/// Today's date in the local timezone, falling back to UTC when the offset is unavailable.
pub fn local_today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// A seeded generator when `seed` is given, otherwise one seeded from OS entropy.
pub fn run_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
