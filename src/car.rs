use crate::math::{normalize_angle, unit_vector, Point2d, Vector2d};
use crate::{CarId, Track};
use cgmath::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use physics::PhysicsParams;

mod physics;

/// The number of distance sensor rays on each car.
pub const NUM_RAYS: usize = 8;

/// Movements shorter than this in a single frame count as not moving, in m.
const IDLE_EPSILON: f64 = 1e-3;

/// A simulated car.
#[derive(Clone, Debug)]
pub struct Car {
    /// The car's ID
    pub(crate) id: CarId,
    /// Half the car's width in m.
    half_wid: f64,
    /// Half the car's length in m.
    half_len: f64,
    /// The world space coordinates of the centre of the car.
    position: Point2d,
    /// The velocity in m/s.
    velocity: Vector2d,
    /// The signed velocity along the car's heading in m/s.
    speed: f64,
    /// The current acceleration in m/s^2.
    acceleration: f64,
    /// The current steering angle in radians.
    steering_angle: f64,
    /// The direction the car faces in radians, in `[0, 2π)`.
    heading: f64,
    /// The rate of turning in rad/s.
    angular_velocity: f64,
    /// The distance measured by each sensor ray.
    ray_distances: [f64; NUM_RAYS],
    /// The index of the furthest centre line sample reached.
    furthest_point_index: usize,
    /// The total distance driven in m.
    total_distance_traveled: f64,
    /// The time since the car was created or reset in s.
    time_alive: f64,
    /// The number of consecutive frames the car has not moved.
    no_movement_frames: usize,
    /// Whether the car is still on the track.
    is_alive: bool,
}

/// The attributes of a simulated car.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CarAttributes {
    /// The car width in m.
    pub width: f64,
    /// The car length in m.
    pub length: f64,
}

/// The control inputs applied to a car for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Controls {
    /// The requested acceleration in m/s^2.
    pub acceleration: f64,
    /// The requested steering angle in radians.
    pub steering: f64,
}

impl Default for CarAttributes {
    fn default() -> Self {
        Self {
            width: 2.0,
            length: 4.0,
        }
    }
}

impl Car {
    /// Creates a new car at rest.
    pub fn new(attributes: &CarAttributes, position: Point2d, heading: f64) -> Self {
        Self {
            id: CarId::default(),
            half_wid: 0.5 * attributes.width,
            half_len: 0.5 * attributes.length,
            position,
            velocity: Vector2d::zero(),
            speed: 0.0,
            acceleration: 0.0,
            steering_angle: 0.0,
            heading: normalize_angle(heading),
            angular_velocity: 0.0,
            ray_distances: [0.0; NUM_RAYS],
            furthest_point_index: 0,
            total_distance_traveled: 0.0,
            time_alive: 0.0,
            no_movement_frames: 0,
            is_alive: true,
        }
    }

    /// Puts the car back at rest at the given position, and revives it.
    pub fn reset(&mut self, position: Point2d, heading: f64) {
        *self = Self {
            id: self.id,
            half_wid: self.half_wid,
            half_len: self.half_len,
            ..Self::new(&CarAttributes::default(), position, heading)
        };
    }

    /// Gets the car's ID.
    pub fn id(&self) -> CarId {
        self.id
    }

    /// The car's width in m.
    pub fn width(&self) -> f64 {
        2.0 * self.half_wid
    }

    /// The car's length in m.
    pub fn length(&self) -> f64 {
        2.0 * self.half_len
    }

    pub(crate) fn half_width(&self) -> f64 {
        self.half_wid
    }

    pub(crate) fn half_length(&self) -> f64 {
        self.half_len
    }

    /// The coordinates in world space of the centre of the car.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The car's velocity in m/s.
    pub fn velocity(&self) -> Vector2d {
        self.velocity
    }

    /// The car's signed speed along its heading in m/s. Negative when reversing.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The car's current acceleration in m/s^2.
    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    /// The car's current steering angle in radians.
    pub fn steering_angle(&self) -> f64 {
        self.steering_angle
    }

    /// The car's heading in radians, in `[0, 2π)`.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// A unit vector in world space aligned with the car's heading.
    pub fn direction(&self) -> Vector2d {
        unit_vector(self.heading)
    }

    /// The car's rate of turning in rad/s.
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// The distances measured by the car's sensor rays in the previous frame.
    pub fn ray_distances(&self) -> &[f64; NUM_RAYS] {
        &self.ray_distances
    }

    pub(crate) fn ray_distances_mut(&mut self) -> &mut [f64; NUM_RAYS] {
        &mut self.ray_distances
    }

    /// The index of the furthest centre line sample the car has reached.
    pub fn furthest_point_index(&self) -> usize {
        self.furthest_point_index
    }

    /// The total distance driven in m.
    pub fn total_distance_traveled(&self) -> f64 {
        self.total_distance_traveled
    }

    /// The time the car has been alive in s.
    pub fn time_alive(&self) -> f64 {
        self.time_alive
    }

    /// The number of consecutive frames the car has not moved.
    pub fn no_movement_frames(&self) -> usize {
        self.no_movement_frames
    }

    /// Whether the car is still on the track.
    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    /// Marks the car as having left the track.
    pub(crate) fn kill(&mut self) {
        self.is_alive = false;
    }

    /// The fraction of the track covered by the furthest point the car has reached.
    pub fn progress(&self, track: &Track) -> f64 {
        let total = track.total_length();
        if total <= 0.0 {
            return 0.0;
        }
        let reached = track
            .cumulative_length()
            .get(self.furthest_point_index)
            .copied()
            .unwrap_or(total);
        reached / total
    }

    /// Updates the distance travelled, idle counter and furthest progress
    /// after the car has moved from `previous` to its current position.
    pub fn update_progress(&mut self, track: &Track, previous: Point2d) {
        let moved = self.position.distance(previous);
        self.total_distance_traveled += moved;
        if moved < IDLE_EPSILON {
            self.no_movement_frames += 1;
        } else {
            self.no_movement_frames = 0;
        }
        let idx = track.nearest_point_index(self.position);
        self.furthest_point_index = usize::max(self.furthest_point_index, idx);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn straight() -> Track {
        let left = (0..=10).map(|i| Point2d::new(i as f64 * 10.0, 0.0)).collect();
        let right = (0..=10).map(|i| Point2d::new(i as f64 * 10.0, 6.0)).collect();
        Track::new(6.0, left, right, vec![]).unwrap()
    }

    #[test]
    fn new_car_is_alive_and_at_rest() {
        let car = Car::new(&CarAttributes::default(), Point2d::new(1.0, 2.0), -0.5);
        assert!(car.is_alive());
        assert_eq!(car.speed(), 0.0);
        assert_eq!(car.velocity(), Vector2d::zero());
        assert_eq!(car.width(), 2.0);
        assert_eq!(car.length(), 4.0);
        assert!(car.heading() >= 0.0);
    }

    #[test]
    fn reset_keeps_dimensions() {
        let attribs = CarAttributes {
            width: 1.0,
            length: 3.0,
        };
        let mut car = Car::new(&attribs, Point2d::new(0.0, 0.0), 0.0);
        car.kill();
        car.ray_distances_mut()[3] = 7.0;
        car.reset(Point2d::new(5.0, 5.0), 1.0);
        assert!(car.is_alive());
        assert_eq!(car.length(), 3.0);
        assert_eq!(car.position(), Point2d::new(5.0, 5.0));
        assert_eq!(car.heading(), 1.0);
        assert_eq!(car.ray_distances()[3], 0.0);
    }

    #[test]
    fn progress_bookkeeping() {
        let track = straight();
        let mut car = Car::new(&CarAttributes::default(), Point2d::new(1.0, 3.0), 0.0);

        let prev = car.position();
        car.position = Point2d::new(31.0, 3.0);
        car.update_progress(&track, prev);
        assert_approx_eq!(car.total_distance_traveled(), 30.0);
        assert_eq!(car.furthest_point_index(), 3);
        assert_eq!(car.no_movement_frames(), 0);
        assert_approx_eq!(car.progress(&track), 0.3);

        // Backing up does not lose progress
        let prev = car.position();
        car.position = Point2d::new(11.0, 3.0);
        car.update_progress(&track, prev);
        assert_eq!(car.furthest_point_index(), 3);
        assert_approx_eq!(car.total_distance_traveled(), 50.0);

        let prev = car.position();
        car.update_progress(&track, prev);
        car.update_progress(&track, prev);
        assert_eq!(car.no_movement_frames(), 2);
    }
}
