//! Device position state types.

use std::time::{Duration, Instant};

use crate::coord::LatLon;

/// Authorization state of the positioning subsystem.
///
/// The engine only observes this; prompting the user and reacting to
/// denial live in the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationState {
    /// The user has not been asked yet.
    #[default]
    NotDetermined,
    /// The user declined position access.
    Denied,
    /// Position access is granted.
    Authorized,
}

impl std::fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDetermined => write!(f, "Not determined"),
            Self::Denied => write!(f, "Denied"),
            Self::Authorized => write!(f, "Authorized"),
        }
    }
}

/// A single position reading from the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    /// Where the device was.
    pub location: LatLon,
    /// When the reading was taken.
    pub updated_at: Instant,
}

impl PositionFix {
    /// Create a fix stamped with the current time.
    pub fn new(location: LatLon) -> Self {
        Self {
            location,
            updated_at: Instant::now(),
        }
    }

    /// Time since this fix was taken.
    pub fn age(&self) -> Duration {
        self.updated_at.elapsed()
    }

    /// Whether this fix is older than the given duration.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age() > max_age
    }
}
