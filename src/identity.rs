use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{Hash, Hasher},
};

use crate::math::Vec3;

/// Content-derived key of a trajectory, equal keys mean interchangeable trajectories.
///
/// The value is deterministic for a given build of the crate, it is meant for
/// in-process memoization and not for persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(u64);

impl IdentityKey {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

pub(crate) struct IdentityKeyBuilder {
    hasher: DefaultHasher,
}

impl IdentityKeyBuilder {
    /// `kind` keeps keys of different trajectory types apart
    pub fn new(kind: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        Self { hasher }
    }

    pub fn float(mut self, v: f64) -> Self {
        canonical_bits(v).hash(&mut self.hasher);
        self
    }

    pub fn vec3(self, v: Vec3) -> Self {
        self.float(v.x).float(v.y).float(v.z)
    }

    pub fn count(mut self, n: u64) -> Self {
        n.hash(&mut self.hasher);
        self
    }

    pub fn finish(self) -> IdentityKey {
        IdentityKey(self.hasher.finish())
    }
}

// 0.0 and -0.0 (and all NaNs) hash the same
fn canonical_bits(v: f64) -> u64 {
    if v == 0. {
        0
    } else if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}
