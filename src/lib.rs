pub use car::{Car, CarAttributes, Controls, PhysicsParams, NUM_RAYS};
pub use cgmath;
pub use collision::{
    car_corners, check_car_collision, check_car_collision_padded, COLLISION_PADDING,
    MAX_COLLISION_CHECKS,
};
pub use error::TrackError;
pub use quadtree::{
    Bounds, QuadTree, QuadTreeConfig, QuadTreeNode, MAX_DEPTH, MAX_SEGMENTS_PER_NODE,
};
pub use ray_cast::{cast_ray, RayHit};
pub use sensor::{sense, SensorConfig};
pub use simulation::{Simulation, SimulationConfig};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use track::{BoundarySegment, BoundarySide, Track};
pub use util::Interval;

mod car;
mod collision;
mod debug;
mod error;
pub mod math;
mod quadtree;
mod ray_cast;
mod sensor;
mod simulation;
mod track;
mod util;

new_key_type! {
    /// Unique ID of a [Car].
    pub struct CarId;
}

type CarSet = SlotMap<CarId, Car>;
