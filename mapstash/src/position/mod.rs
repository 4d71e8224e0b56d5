//! Device position feed.
//!
//! The platform positioning layer pushes fixes into
//! [`SharedDevicePosition`]; the engine pulls current state through
//! [`PositionProvider`] and reacts to updates through
//! [`PositionBroadcaster`].

mod provider;
mod state;

pub use provider::{PositionBroadcaster, PositionProvider, SharedDevicePosition};
pub use state::{AuthorizationState, PositionFix};
