//! Offset Policy.
//!
//! Maps an approach [`Direction`] to a fixed displacement from the perceived
//! point to the poke point:
//!
//! | direction | Δx | Δy | Δz |
//! |---|---|---|---|
//! | `Left` | +0.09 | +0.09 | +0.06 |
//! | `Right` | +0.09 | −0.09 | +0.06 |
//! | anything else | +0.09 | +0.09 | +0.06 |
//!
//! Unrecognised directions fall back to the `Left` offset.  Callers coded
//! against the deployed service rely on that, so it is kept.

use knowledge_types::{Direction, Point3, Vector3};
use tracing::debug;

/// Forward reach past the perceived point (metres).
pub const OFFSET_X: f64 = 0.09;
/// Lateral reach; positive for `Left`, negated for `Right` (metres).
pub const OFFSET_Y: f64 = 0.09;
/// Height above the perceived point (metres).
pub const OFFSET_Z: f64 = 0.06;

/// Displacement applied for `direction`.
pub fn offset_for(direction: Direction) -> Vector3 {
    match direction {
        Direction::Left => Vector3::new(OFFSET_X, OFFSET_Y, OFFSET_Z),
        Direction::Right => Vector3::new(OFFSET_X, -OFFSET_Y, OFFSET_Z),
        Direction::Unspecified => {
            debug!("unrecognised poke direction, using the LEFT offset");
            Vector3::new(OFFSET_X, OFFSET_Y, OFFSET_Z)
        }
    }
}

/// The poke point for a perceived `point` approached from `direction`.
pub fn apply_offset(point: Point3, direction: Direction) -> Point3 {
    let d = offset_for(direction);
    Point3::new(point.x + d.x, point.y + d.y, point.z + d.z)
}
