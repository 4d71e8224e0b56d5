//! Area-name resolution for the viewport center.

mod resolver;
mod throttle;

pub use resolver::{AreaNameResolver, GeocodeConfig, UNKNOWN_AREA};
pub use throttle::GeocodeThrottle;
