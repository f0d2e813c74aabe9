use crate::car::{Car, CarAttributes, Controls, PhysicsParams};
use crate::collision::{check_car_collision_padded, COLLISION_PADDING};
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::math::Point2d;
use crate::quadtree::{QuadTree, QuadTreeConfig};
use crate::sensor::{sense, SensorConfig};
use crate::{CarId, CarSet, Track};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use std::sync::Arc;

/// The configuration of a [Simulation].
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// The dimensions of newly added cars.
    pub car: CarAttributes,
    /// The physics model parameters.
    pub physics: PhysicsParams,
    /// The distance sensor configuration.
    pub sensors: SensorConfig,
    /// How the boundary quad-tree is subdivided.
    pub quadtree: QuadTreeConfig,
    /// How far around a car to search for boundary segments when checking for collisions.
    pub collision_padding: f64,
    /// If set, cars which have not moved for this many consecutive frames are killed.
    pub max_idle_frames: Option<usize>,
    /// Seed for the sensor noise. Seeded from entropy if not set.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            car: Default::default(),
            physics: Default::default(),
            sensors: Default::default(),
            quadtree: Default::default(),
            collision_padding: COLLISION_PADDING,
            max_idle_frames: None,
            seed: None,
        }
    }
}

#[cfg(feature = "serde")]
impl SimulationConfig {
    /// Reads a configuration from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A simulation of cars driving around a track.
pub struct Simulation {
    /// The track being driven on.
    track: Arc<Track>,
    /// The spatial index over the track's boundaries.
    tree: Arc<QuadTree>,
    /// The simulation parameters.
    config: SimulationConfig,
    /// The cars being simulated.
    cars: CarSet,
    /// The control inputs of each car.
    controls: SecondaryMap<CarId, Controls>,
    /// The source of sensor noise.
    rng: StdRng,
    /// The current frame of simulation.
    frame: usize,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new simulation, building a quad-tree over the track's boundaries.
    pub fn new(track: Arc<Track>, config: SimulationConfig) -> Self {
        let tree = Arc::new(QuadTree::from_track(&track, &config.quadtree));
        Self::with_tree(track, tree, config)
    }

    /// Creates a new simulation which shares an already built quad-tree.
    /// The tree must have been built from `track`.
    pub fn with_tree(track: Arc<Track>, tree: Arc<QuadTree>, config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            track,
            tree,
            config,
            cars: CarSet::default(),
            controls: SecondaryMap::new(),
            rng,
            frame: 0,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        }
    }

    /// Adds a car to the simulation, at rest at the given position.
    pub fn add_car(&mut self, position: Point2d, heading: f64) -> CarId {
        let car_id = self.cars.insert_with_key(|id| {
            let mut car = Car::new(&self.config.car, position, heading);
            car.id = id;
            car
        });
        self.controls.insert(car_id, Controls::default());
        let car = &mut self.cars[car_id];
        if check_car_collision_padded(car, &self.tree, self.config.collision_padding) {
            sense(car, &self.tree, &self.config.sensors, &mut self.rng);
        }
        car_id
    }

    /// Removes a car from the simulation.
    pub fn remove_car(&mut self, id: CarId) {
        self.cars.remove(id);
        self.controls.remove(id);
    }

    /// Puts a car back at rest at the given position and revives it,
    /// as at the start of a new episode.
    pub fn reset_car(&mut self, id: CarId, position: Point2d, heading: f64) {
        let Some(car) = self.cars.get_mut(id) else {
            warn!("Cannot reset unknown car {:?}", id);
            return;
        };
        car.reset(position, heading);
        if let Some(controls) = self.controls.get_mut(id) {
            *controls = Controls::default();
        }
        if check_car_collision_padded(car, &self.tree, self.config.collision_padding) {
            sense(car, &self.tree, &self.config.sensors, &mut self.rng);
        }
    }

    /// Sets the control inputs applied to a car on subsequent frames.
    pub fn set_controls(&mut self, id: CarId, controls: Controls) {
        match self.controls.get_mut(id) {
            Some(c) => *c = controls,
            None => warn!("Cannot set controls of unknown car {:?}", id),
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Each live car is moved, checked against the track boundaries,
    /// and then has its sensors updated for the next control decision.
    pub fn step(&mut self, dt: f64) {
        for (id, car) in &mut self.cars {
            if !car.is_alive() {
                continue;
            }
            let controls = self.controls.get(id).copied().unwrap_or_default();
            let previous = car.position();

            car.integrate(&controls, &self.config.physics, dt);
            if !check_car_collision_padded(car, &self.tree, self.config.collision_padding) {
                continue;
            }

            car.update_progress(&self.track, previous);
            if let Some(max_idle) = self.config.max_idle_frames {
                if car.no_movement_frames() >= max_idle {
                    debug!("Car {:?} stalled for {} frames", id, max_idle);
                    car.kill();
                    continue;
                }
            }

            sense(car, &self.tree, &self.config.sensors, &mut self.rng);
        }
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// The track being driven on.
    pub fn track(&self) -> &Arc<Track> {
        &self.track
    }

    /// The spatial index over the track's boundaries.
    pub fn tree(&self) -> &Arc<QuadTree> {
        &self.tree
    }

    /// The simulation parameters.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Returns an iterator over all the cars in the simulation.
    pub fn iter_cars(&self) -> impl Iterator<Item = &Car> {
        self.cars.values()
    }

    /// The number of cars still on the track.
    pub fn alive_count(&self) -> usize {
        self.cars.values().filter(|car| car.is_alive()).count()
    }

    /// Gets a reference to the car with the given ID, if it exists.
    pub fn get_car(&self, id: CarId) -> Option<&Car> {
        self.cars.get(id)
    }

    /// Gets the position of a car, or the origin if there is no such car.
    pub fn car_position(&self, id: CarId) -> Point2d {
        match self.cars.get(id) {
            Some(car) => car.position(),
            None => {
                warn!("Position requested for unknown car {:?}", id);
                Point2d::new(0.0, 0.0)
            }
        }
    }

    /// Gets the signed speed of a car, or zero if there is no such car.
    pub fn car_speed(&self, id: CarId) -> f64 {
        match self.cars.get(id) {
            Some(car) => car.speed(),
            None => {
                warn!("Speed requested for unknown car {:?}", id);
                0.0
            }
        }
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }
}
