//! Provider traits and shared wrapper for the device position.
//!
//! This module defines the public interface for consumers of position
//! data:
//!
//! - [`PositionProvider`] - Query API (pull)
//! - [`PositionBroadcaster`] - Subscription API (push)
//! - [`SharedDevicePosition`] - Thread-safe wrapper combining both

use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;
use tracing::debug;

use super::state::{AuthorizationState, PositionFix};
use crate::coord::LatLon;

/// Broadcast channel capacity for position updates.
const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// Trait for querying the device position (pull API).
pub trait PositionProvider: Send + Sync {
    /// Get the positioning authorization state.
    fn authorization(&self) -> AuthorizationState;

    /// Get the most recent fix, if any.
    fn position(&self) -> Option<PositionFix>;

    /// Check whether any fix has been received.
    fn has_position(&self) -> bool;
}

/// Trait for subscribing to position updates (push API).
pub trait PositionBroadcaster: Send + Sync {
    /// Subscribe to position fixes.
    fn subscribe(&self) -> broadcast::Receiver<PositionFix>;
}

/// Shared device position - thread-safe aggregation point.
///
/// The platform positioning layer feeds fixes and authorization changes
/// in; the engine consumes them through [`PositionProvider`] and
/// [`PositionBroadcaster`].
#[derive(Clone)]
pub struct SharedDevicePosition {
    inner: Arc<PositionInner>,
}

struct PositionInner {
    fix: RwLock<Option<PositionFix>>,
    authorization: RwLock<AuthorizationState>,
    updates: broadcast::Sender<PositionFix>,
}

impl SharedDevicePosition {
    /// Create a shared position with no fix and undetermined authorization.
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(PositionInner {
                fix: RwLock::new(None),
                authorization: RwLock::new(AuthorizationState::default()),
                updates,
            }),
        }
    }

    /// Record a new fix and broadcast it to subscribers.
    pub fn receive_fix(&self, fix: PositionFix) {
        if let Ok(mut current) = self.inner.fix.write() {
            *current = Some(fix);
        }
        // No receivers is fine; the engine may not be running yet
        let _ = self.inner.updates.send(fix);
    }

    /// Record a fix for a bare coordinate, stamped now.
    pub fn receive_location(&self, location: LatLon) {
        self.receive_fix(PositionFix::new(location));
    }

    /// Record an authorization change.
    pub fn set_authorization(&self, state: AuthorizationState) {
        if let Ok(mut current) = self.inner.authorization.write() {
            if *current != state {
                debug!(from = %*current, to = %state, "Position authorization changed");
            }
            *current = state;
        }
    }
}

impl Default for SharedDevicePosition {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionProvider for SharedDevicePosition {
    fn authorization(&self) -> AuthorizationState {
        self.inner
            .authorization
            .read()
            .map(|a| *a)
            .unwrap_or_default()
    }

    fn position(&self) -> Option<PositionFix> {
        self.inner.fix.read().ok().and_then(|f| *f)
    }

    fn has_position(&self) -> bool {
        self.position().is_some()
    }
}

impl PositionBroadcaster for SharedDevicePosition {
    fn subscribe(&self) -> broadcast::Receiver<PositionFix> {
        self.inner.updates.subscribe()
    }
}

// Allow Arc<SharedDevicePosition> to be used as provider
impl PositionProvider for Arc<SharedDevicePosition> {
    fn authorization(&self) -> AuthorizationState {
        (**self).authorization()
    }

    fn position(&self) -> Option<PositionFix> {
        (**self).position()
    }

    fn has_position(&self) -> bool {
        (**self).has_position()
    }
}

impl PositionBroadcaster for Arc<SharedDevicePosition> {
    fn subscribe(&self) -> broadcast::Receiver<PositionFix> {
        (**self).subscribe()
    }
}
