//! Per-frame visualisation records, collected only with the `debug` feature.

use crate::math::Point2d;
use crate::ray_cast::RayHit;
#[cfg(feature = "debug")]
use serde_json::{json, Value};

#[cfg(feature = "debug")]
thread_local!(
    static FRAME_RECORDS: std::cell::RefCell<Vec<Value>> = Default::default();
);

#[cfg(feature = "debug")]
fn record(entry: Value) {
    FRAME_RECORDS.with(|records| records.borrow_mut().push(entry));
}

#[cfg(feature = "debug")]
fn coords(p: Point2d) -> [f64; 2] {
    [p.x, p.y]
}

/// Records a sensor ray cast from `origin`, and where it ended.
#[allow(unused)]
pub fn debug_ray(origin: Point2d, hit: &RayHit) {
    #[cfg(feature = "debug")]
    record(json!({
        "type": "ray",
        "origin": coords(origin),
        "end": coords(hit.point),
        "hit": hit.hit,
        "distance": hit.distance,
    }));
}

/// Records the outline of a car which left the track.
#[allow(unused)]
pub fn debug_crash(position: Point2d, corners: &[Point2d; 4]) {
    #[cfg(feature = "debug")]
    record(json!({
        "type": "crash",
        "position": coords(position),
        "corners": corners.map(coords),
    }));
}

/// Takes every record made on this thread since the previous call, as a JSON array.
#[cfg(feature = "debug")]
pub fn take_debug_frame() -> Value {
    Value::Array(FRAME_RECORDS.with(|records| records.take()))
}
