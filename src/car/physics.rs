use super::{Car, Controls};
use crate::math::{normalize_angle, rot90, unit_vector};
use crate::util::Interval;
use cgmath::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The parameters of the arcade physics model.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhysicsParams {
    /// The maximum magnitude of acceleration in m/s^2.
    pub max_acceleration: f64,
    /// The maximum change in acceleration per frame in m/s^2.
    pub max_delta_acceleration: f64,
    /// The maximum magnitude of the steering angle in radians.
    pub max_steering_angle: f64,
    /// The maximum change in steering angle per frame in radians.
    pub max_delta_steering: f64,
    /// The fraction of velocity kept each frame.
    pub drag_coefficient: f64,
    /// The fraction of sideways velocity kept each frame.
    pub friction_coefficient: f64,
    /// The maximum forward speed in m/s.
    pub max_forward_speed: f64,
    /// The maximum reversing speed in m/s, a positive number.
    pub max_reverse_speed: f64,
    /// Scales the rate of turning for a given steering angle and speed.
    pub turn_factor: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            max_acceleration: 10.0,
            max_delta_acceleration: 1.0,
            max_steering_angle: 0.6,
            max_delta_steering: 0.1,
            drag_coefficient: 0.99,
            friction_coefficient: 0.9,
            max_forward_speed: 30.0,
            max_reverse_speed: 5.0,
            turn_factor: 0.1,
        }
    }
}

/// Moves `current` towards `target` by at most `max_delta`,
/// then limits the result to `±limit`.
fn rate_limit(current: f64, target: f64, max_delta: f64, limit: f64) -> f64 {
    let delta = Interval::disc(0.0, max_delta).clamp(target - current);
    Interval::disc(0.0, limit).clamp(current + delta)
}

impl Car {
    /// Advances the car's motion by one frame. Does nothing if the car is dead.
    ///
    /// # Parameters
    /// * `controls` - The requested acceleration and steering angle
    /// * `params` - The physics model parameters
    /// * `dt` - The time step in seconds
    pub fn integrate(&mut self, controls: &Controls, params: &PhysicsParams, dt: f64) {
        if !self.is_alive {
            return;
        }

        self.acceleration = rate_limit(
            self.acceleration,
            controls.acceleration,
            params.max_delta_acceleration,
            params.max_acceleration,
        );
        self.steering_angle = rate_limit(
            self.steering_angle,
            controls.steering,
            params.max_delta_steering,
            params.max_steering_angle,
        );

        // Accelerate along the heading, then apply drag
        let fwd = unit_vector(self.heading);
        self.velocity = (self.velocity + self.acceleration * dt * fwd) * params.drag_coefficient;

        // Tyre grip bleeds off sideways velocity
        let lat = rot90(fwd);
        let v_fwd = self.velocity.dot(fwd);
        let v_lat = self.velocity.dot(lat) * params.friction_coefficient;
        self.velocity = v_fwd * fwd + v_lat * lat;

        // Limit the forward speed without touching the sideways velocity
        let speed_limits = Interval::new(-params.max_reverse_speed, params.max_forward_speed);
        let speed = speed_limits.clamp(v_fwd);
        self.velocity += (speed - v_fwd) * fwd;
        self.speed = speed;

        self.angular_velocity = self.steering_angle * self.speed * params.turn_factor;
        self.heading = normalize_angle(self.heading + self.angular_velocity * dt);

        self.position += self.velocity * dt;
        self.time_alive += dt;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::car::CarAttributes;
    use crate::math::{Point2d, Vector2d};
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::TAU;

    fn car() -> Car {
        Car::new(&CarAttributes::default(), Point2d::new(0.0, 0.0), 0.0)
    }

    #[test]
    fn acceleration_is_rate_limited() {
        let params = PhysicsParams::default();
        let mut car = car();
        let controls = Controls {
            acceleration: 100.0,
            steering: -5.0,
        };
        car.integrate(&controls, &params, 0.1);
        assert_approx_eq!(car.acceleration(), params.max_delta_acceleration);
        assert_approx_eq!(car.steering_angle(), -params.max_delta_steering);

        for _ in 0..100 {
            car.integrate(&controls, &params, 0.1);
        }
        assert_approx_eq!(car.acceleration(), params.max_acceleration);
        assert_approx_eq!(car.steering_angle(), -params.max_steering_angle);
    }

    #[test]
    fn full_throttle_converges_to_max_speed() {
        let params = PhysicsParams::default();
        let mut car = car();
        let controls = Controls {
            acceleration: params.max_acceleration,
            steering: 0.0,
        };
        let mut prev_x = car.position().x;
        for _ in 0..2000 {
            car.integrate(&controls, &params, 0.1);
            assert!(car.speed() <= params.max_forward_speed);
            assert!(car.position().x >= prev_x);
            prev_x = car.position().x;
        }
        assert_approx_eq!(car.speed(), params.max_forward_speed);
        assert_approx_eq!(car.velocity().magnitude(), params.max_forward_speed);
        assert_approx_eq!(car.time_alive(), 200.0, 1e-6);
    }

    #[test]
    fn reversing_is_limited() {
        let params = PhysicsParams::default();
        let mut car = car();
        let controls = Controls {
            acceleration: -params.max_acceleration,
            steering: 0.0,
        };
        for _ in 0..2000 {
            car.integrate(&controls, &params, 0.1);
            assert!(car.speed() >= -params.max_reverse_speed);
        }
        assert_approx_eq!(car.speed(), -params.max_reverse_speed);
        assert!(car.position().x < 0.0);
    }

    #[test]
    fn coasting_decays() {
        let params = PhysicsParams::default();
        let mut car = car();
        for _ in 0..50 {
            car.integrate(&Controls { acceleration: 5.0, steering: 0.0 }, &params, 0.1);
        }
        let speed = car.speed();
        // Release the throttle, letting acceleration ramp down to zero
        for _ in 0..10 {
            car.integrate(&Controls::default(), &params, 0.1);
        }
        let before = car.speed();
        for _ in 0..100 {
            car.integrate(&Controls::default(), &params, 0.1);
        }
        assert!(before > 0.0);
        assert!(car.speed() < before);
        assert!(speed > 0.0);
    }

    #[test]
    fn sideways_velocity_is_damped() {
        let params = PhysicsParams::default();
        let mut car = car();
        car.velocity = Vector2d::new(0.0, 5.0);
        let mut lat = 5.0;
        for _ in 0..5 {
            car.integrate(&Controls::default(), &params, 0.1);
            lat *= params.drag_coefficient * params.friction_coefficient;
            assert_approx_eq!(car.velocity().y, lat);
            assert_approx_eq!(car.velocity().x, 0.0);
            assert_approx_eq!(car.speed(), 0.0);
        }
    }

    #[test]
    fn speed_limit_keeps_sideways_velocity() {
        let params = PhysicsParams::default();
        let mut car = car();
        car.velocity = Vector2d::new(40.0, 2.0);
        car.integrate(&Controls::default(), &params, 0.1);
        let lat = 2.0 * params.drag_coefficient * params.friction_coefficient;
        assert_approx_eq!(car.speed(), params.max_forward_speed);
        assert_approx_eq!(car.velocity().x, params.max_forward_speed);
        assert_approx_eq!(car.velocity().y, lat);
        assert_approx_eq!(car.position().x, 0.1 * params.max_forward_speed);
        assert_approx_eq!(car.position().y, 0.1 * lat);
    }

    #[test]
    fn no_turning_at_rest() {
        let params = PhysicsParams::default();
        let mut car = car();
        for _ in 0..20 {
            car.integrate(&Controls { acceleration: 0.0, steering: 0.5 }, &params, 0.1);
        }
        assert_eq!(car.heading(), 0.0);
        assert_eq!(car.angular_velocity(), 0.0);
    }

    #[test]
    fn heading_stays_normalised() {
        let params = PhysicsParams::default();
        let mut car = car();
        for i in 0..3000 {
            let steering = if (i / 500) % 2 == 0 { 0.6 } else { -0.6 };
            car.integrate(&Controls { acceleration: 10.0, steering }, &params, 0.1);
            assert!(car.heading() >= 0.0 && car.heading() < TAU, "{}", car.heading());
        }
    }

    #[test]
    fn dead_car_does_not_move() {
        let params = PhysicsParams::default();
        let mut car = car();
        car.kill();
        car.integrate(&Controls { acceleration: 10.0, steering: 0.3 }, &params, 0.1);
        assert_eq!(car.position(), Point2d::new(0.0, 0.0));
        assert_eq!(car.acceleration(), 0.0);
        assert_eq!(car.time_alive(), 0.0);
    }
}
