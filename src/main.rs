use std::f64::consts::{FRAC_PI_2, TAU};
use std::sync::Arc;
use std::time::Instant;

use track_sim::math::Point2d;
use track_sim::{Controls, Simulation, SimulationConfig, Track, NUM_RAYS};

const NUM_POINTS: usize = 200;
const INNER_RADIUS: f64 = 100.0;
const OUTER_RADIUS: f64 = 105.0;
const NUM_CARS: usize = 500;

/// A circular track, driven anticlockwise.
fn ring() -> Track {
    let ring = |r: f64| {
        (0..=NUM_POINTS)
            .map(|i| {
                let a = TAU * i as f64 / NUM_POINTS as f64;
                Point2d::new(r * a.cos(), r * a.sin())
            })
            .collect()
    };
    let width = OUTER_RADIUS - INNER_RADIUS;
    match Track::new(width, ring(INNER_RADIUS), ring(OUTER_RADIUS), vec![]) {
        Ok(track) => track,
        Err(err) => panic!("Failed to build ring track: {}", err),
    }
}

/// Steers towards whichever side has more room.
fn drive(rays: &[f64; NUM_RAYS]) -> Controls {
    let (right, left) = rays.split_at(NUM_RAYS / 2);
    let balance = left.iter().sum::<f64>() - right.iter().sum::<f64>();
    Controls {
        acceleration: 4.0,
        steering: 0.05 * balance,
    }
}

fn main() {
    let track = ring();
    let mut sim = Simulation::new(
        Arc::new(track),
        SimulationConfig {
            seed: Some(0),
            ..Default::default()
        },
    );
    let mid = 0.5 * (INNER_RADIUS + OUTER_RADIUS);
    let ids: Vec<_> = (0..NUM_CARS)
        .map(|_| sim.add_car(Point2d::new(mid, 0.0), FRAC_PI_2))
        .collect();

    println!("Simulating...");
    const NUM_FRAMES: u32 = 1000;
    for _ in 0..10 {
        let start = Instant::now();
        for _ in 0..NUM_FRAMES {
            for id in &ids {
                let controls = match sim.get_car(*id) {
                    Some(car) => drive(car.ray_distances()),
                    None => continue,
                };
                sim.set_controls(*id, controls);
            }
            sim.step(0.05);
        }
        let frame = start.elapsed() / NUM_FRAMES;
        println!(
            "Avg. frame: {:?} --> {:.0}x realtime ({} of {} cars alive)",
            frame,
            0.05 / frame.as_secs_f64(),
            sim.alive_count(),
            NUM_CARS,
        );
        for id in &ids {
            if !sim.get_car(*id).map_or(false, |car| car.is_alive()) {
                sim.reset_car(*id, Point2d::new(mid, 0.0), FRAC_PI_2);
            }
        }
    }
}
