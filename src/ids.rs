use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of characters in a paste id.
pub const ID_LENGTH: usize = 6;

/// Symbols a paste id is drawn from.
pub const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generates short public ids for pastes.
///
/// Not cryptographically secure; ids are only meant to be short and
/// URL-safe. Collisions are not checked here.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: Arc<Mutex<StdRng>>,
}

impl IdGenerator {
    /// Seed from the current wall-clock time.
    pub fn from_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        Self::from_seed(seed)
    }

    pub fn from_seed(seed: u64) -> Self {
        IdGenerator {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    pub fn generate(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }
}
