//! The fan of distance sensors mounted on each car.

use crate::car::{Car, NUM_RAYS};
use crate::quadtree::QuadTree;
use crate::ray_cast::cast_ray;
use log::warn;
use rand::Rng;
use rand_distr::{Distribution, Normal};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configures the distance sensors.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// The angle between the outermost rays in radians, centred on the heading.
    pub spread: f64,
    /// The range of each sensor in m. Rays which hit nothing report this distance.
    pub max_distance: f64,
    /// The standard deviation of noise added to each reading in m. Zero disables noise.
    pub noise_stddev: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            spread: PI,
            max_distance: 100.0,
            noise_stddev: 0.0,
        }
    }
}

impl SensorConfig {
    /// Computes the world space direction of each ray, in radians,
    /// for a car with the given heading. Rays are ordered from right to left.
    pub fn ray_angles(&self, heading: f64) -> [f64; NUM_RAYS] {
        let step = self.spread / (NUM_RAYS - 1) as f64;
        std::array::from_fn(|i| heading - 0.5 * self.spread + i as f64 * step)
    }
}

/// Measures the distance to the track boundary along each of the car's sensor rays.
pub fn sense(car: &mut Car, tree: &QuadTree, config: &SensorConfig, rng: &mut impl Rng) {
    let noise = match config.noise_stddev {
        stddev if stddev == 0.0 => None,
        stddev if stddev.is_finite() && stddev > 0.0 => Normal::new(0.0, stddev).ok(),
        stddev => {
            warn!("Ignoring invalid sensor noise standard deviation {}", stddev);
            None
        }
    };
    let origin = car.position();

    for (angle, distance) in config
        .ray_angles(car.heading())
        .into_iter()
        .zip(car.ray_distances_mut().iter_mut())
    {
        let hit = cast_ray(tree, origin, angle, config.max_distance);
        *distance = match (hit.hit, &noise) {
            (false, _) => config.max_distance,
            (true, None) => hit.distance,
            (true, Some(noise)) => {
                (hit.distance + noise.sample(rng)).clamp(0.0, config.max_distance)
            }
        };
        #[cfg(feature = "debug")]
        crate::debug::debug_ray(origin, &hit);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::car::CarAttributes;
    use crate::math::Point2d;
    use crate::quadtree::QuadTreeConfig;
    use crate::Track;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// A 10 m wide straight between y = -5 and y = 5.
    fn tree() -> QuadTree {
        let left = (0..=2).map(|i| Point2d::new(i as f64 * 50.0, -5.0)).collect();
        let right = (0..=2).map(|i| Point2d::new(i as f64 * 50.0, 5.0)).collect();
        let track = Track::new(10.0, left, right, vec![]).unwrap();
        QuadTree::from_track(&track, &QuadTreeConfig::default())
    }

    #[test]
    fn ray_fan_is_centred_on_heading() {
        let config = SensorConfig::default();
        let angles = config.ray_angles(1.0);
        assert_approx_eq!(angles[0], 1.0 - 0.5 * PI);
        assert_approx_eq!(angles[NUM_RAYS - 1], 1.0 + 0.5 * PI);
        let mean = angles.iter().sum::<f64>() / NUM_RAYS as f64;
        assert_approx_eq!(mean, 1.0);
    }

    #[test]
    fn readings() {
        let tree = tree();
        let config = SensorConfig::default();
        let mut car = Car::new(&CarAttributes::default(), Point2d::new(10.0, 0.0), 0.0);
        sense(&mut car, &tree, &config, &mut StdRng::seed_from_u64(0));
        let d = car.ray_distances();
        // Rightmost ray points straight down at the left boundary
        assert_approx_eq!(d[0], 5.0);
        // Leftmost ray points straight up at the right boundary
        assert_approx_eq!(d[NUM_RAYS - 1], 5.0);
        assert!(d.iter().all(|d| *d > 0.0 && *d <= config.max_distance));
    }

    #[test]
    fn missed_rays_report_max_distance() {
        let tree = tree();
        let config = SensorConfig {
            max_distance: 3.0,
            ..Default::default()
        };
        let mut car = Car::new(&CarAttributes::default(), Point2d::new(10.0, 0.0), 0.0);
        sense(&mut car, &tree, &config, &mut StdRng::seed_from_u64(0));
        assert!(car.ray_distances().iter().all(|d| *d == 3.0));
    }

    #[test]
    fn invalid_noise_is_ignored() {
        let tree = tree();
        for noise_stddev in [f64::NAN, f64::INFINITY, -1.0] {
            let config = SensorConfig {
                noise_stddev,
                ..Default::default()
            };
            let mut car = Car::new(&CarAttributes::default(), Point2d::new(10.0, 0.0), 0.0);
            sense(&mut car, &tree, &config, &mut StdRng::seed_from_u64(0));
            assert_approx_eq!(car.ray_distances()[0], 5.0);
            assert_approx_eq!(car.ray_distances()[NUM_RAYS - 1], 5.0);
        }
    }

    #[test]
    fn noisy_readings_stay_in_range() {
        let tree = tree();
        let config = SensorConfig {
            noise_stddev: 1.0,
            max_distance: 20.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let mut car = Car::new(&CarAttributes::default(), Point2d::new(10.0, 0.0), 0.0);
        let mut total = 0.0;
        for _ in 0..200 {
            sense(&mut car, &tree, &config, &mut rng);
            assert!(car
                .ray_distances()
                .iter()
                .all(|d| (0.0..=config.max_distance).contains(d)));
            total += car.ray_distances()[0];
        }
        // The noise is unbiased
        assert_approx_eq!(total / 200.0, 5.0, 0.5);
    }
}
