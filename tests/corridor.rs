//! Tests against a small U-shaped corridor track.

use assert_approx_eq::assert_approx_eq;
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;
use track_sim::{
    cast_ray, check_car_collision, math::Point2d, Car, CarAttributes, QuadTree, QuadTreeConfig,
    Simulation, SimulationConfig, Track,
};

fn corridor() -> Track {
    let left = vec![
        Point2d::new(0.0, 0.0),
        Point2d::new(10.0, 0.0),
        Point2d::new(10.0, 10.0),
        Point2d::new(0.0, 10.0),
    ];
    let right = vec![
        Point2d::new(0.0, 3.0),
        Point2d::new(10.0, 3.0),
        Point2d::new(10.0, 7.0),
        Point2d::new(0.0, 7.0),
    ];
    Track::new(3.0, left, right, vec![]).unwrap()
}

fn tree() -> QuadTree {
    QuadTree::from_track(&corridor(), &QuadTreeConfig::default())
}

fn car_at(x: f64, y: f64, heading: f64) -> Car {
    Car::new(&CarAttributes::default(), Point2d::new(x, y), heading)
}

#[test]
fn ray_hits_inner_boundary() {
    let tree = tree();
    let hit = cast_ray(&tree, Point2d::new(5.0, 5.0), FRAC_PI_2, 100.0);
    assert!(hit.hit);
    assert_approx_eq!(hit.distance, 2.0);
    assert_approx_eq!(hit.point.x, 5.0);
    assert_approx_eq!(hit.point.y, 7.0);
}

#[test]
fn ray_out_of_range_misses() {
    let tree = tree();
    let hit = cast_ray(&tree, Point2d::new(5.0, 5.0), FRAC_PI_2, 1.5);
    assert!(!hit.hit);
}

#[test]
fn car_in_lane_survives() {
    let tree = tree();
    let mut car = car_at(5.0, 1.5, 0.0);
    assert!(check_car_collision(&mut car, &tree));
    assert!(car.is_alive());
}

#[test]
fn car_over_inner_boundary_dies() {
    let tree = tree();
    let mut car = car_at(5.0, 7.5, 0.0);
    assert!(!check_car_collision(&mut car, &tree));
    assert!(!car.is_alive());
}

#[test]
fn car_on_boundary_point_dies() {
    let tree = tree();
    let mut car = car_at(0.0, 0.0, 0.0);
    assert!(!check_car_collision(&mut car, &tree));
}

#[test]
fn tree_is_shared_between_threads() {
    let tree = Arc::new(tree());
    let origin = Point2d::new(5.0, 5.0);
    let expected: Vec<_> = (0..16)
        .map(|i| cast_ray(&tree, origin, i as f64 * 0.4, 100.0))
        .collect();

    std::thread::scope(|s| {
        for _ in 0..4 {
            let tree = Arc::clone(&tree);
            let expected = &expected;
            s.spawn(move || {
                for (i, hit) in expected.iter().enumerate() {
                    assert_eq!(cast_ray(&tree, origin, i as f64 * 0.4, 100.0), *hit);
                }
            });
        }
    });
}

#[test]
fn simulations_share_a_tree() {
    let track = Arc::new(corridor());
    let tree = Arc::new(QuadTree::from_track(&track, &QuadTreeConfig::default()));
    let config = SimulationConfig {
        seed: Some(1),
        ..Default::default()
    };
    let mut a = Simulation::with_tree(track.clone(), tree.clone(), config);
    let mut b = Simulation::with_tree(track, tree.clone(), config);
    assert!(Arc::ptr_eq(a.tree(), b.tree()));

    let car_a = a.add_car(Point2d::new(5.0, 1.5), 0.0);
    let car_b = b.add_car(Point2d::new(5.0, 8.5), 0.0);
    a.step(0.1);
    b.step(0.1);
    assert!(a.get_car(car_a).unwrap().is_alive());
    assert!(b.get_car(car_b).unwrap().is_alive());
    assert_eq!(Arc::strong_count(&tree), 3);
}
