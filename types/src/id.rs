use std::{
    fmt::{Debug, Display},
    str::FromStr,
    sync::Mutex,
    time::SystemTime,
};

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::{Generator, Ulid};

/// Primary key of every persisted entity.
///
/// Renders as a 26 character Crockford base32 string whose lexical order
/// follows creation time at millisecond granularity.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(Ulid);

impl Identifier {
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}

impl FromStr for Identifier {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Identifier)
    }
}

impl From<Ulid> for Identifier {
    fn from(value: Ulid) -> Self {
        Self(value)
    }
}

impl From<Identifier> for Ulid {
    fn from(value: Identifier) -> Self {
        value.0
    }
}

#[derive(Error, Debug)]
pub enum IdError {
    #[error("Random tail overflowed within a single millisecond")]
    Overflow(#[from] ulid::MonotonicError),

    #[error("Identifier generator lock poisoned")]
    Poisoned,
}

struct GeneratorState {
    generator: Generator,
    rng: StdRng,
}

/// Process-wide source of [`Identifier`]s.
///
/// Identifiers handed out by one generator are strictly increasing, even
/// when several are requested within the same millisecond or the supplied
/// clock reading goes backwards.
pub struct IdGenerator {
    state: Mutex<GeneratorState>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GeneratorState {
                generator: Generator::new(),
                rng: StdRng::from_entropy(),
            }),
        }
    }

    pub fn generate(&self, now: DateTime<Utc>) -> Result<Identifier, IdError> {
        let mut state = self.state.lock().map_err(|_| IdError::Poisoned)?;
        let GeneratorState { generator, rng } = &mut *state;
        let ulid = generator.generate_from_datetime_with_source(SystemTime::from(now), rng)?;
        log::debug!("Generated identifier {ulid}");
        Ok(Identifier(ulid))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}
