use rand::Rng;
use uuid::Uuid;

use crate::RunId;

/// Generate a deterministic v4-format UUID from a seeded RNG.
pub fn generate_uuid(rng: &mut impl Rng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// Run ids are only meaningful for the lifetime of one run; seeding makes
/// them reproducible for tests and replays.
pub fn generate_run_id(rng: &mut impl Rng) -> RunId {
    RunId(format!("run_{}", generate_uuid(rng).simple()))
}
