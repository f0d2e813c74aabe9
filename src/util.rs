//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A closed interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: PartialOrd> Interval<T> {
    /// Returns true if this interval overlaps with the other.
    /// Intervals which merely touch at an end point are considered overlapping.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.max >= other.min && other.max >= self.min
    }

    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns true if the interval contains no values, i.e. `min > max`.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

impl<T: Float> Interval<T> {
    /// Creates an interval with the given centre and radius.
    pub fn disc(centre: T, radius: T) -> Self {
        Self {
            min: centre - radius,
            max: centre + radius,
        }
    }

    /// Creates the smallest interval containing both values.
    pub fn spanning(a: T, b: T) -> Self {
        Self {
            min: T::min(a, b),
            max: T::max(a, b),
        }
    }

    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }

    /// Returns the centre/mid-point of the interval.
    pub fn midpoint(&self) -> T {
        T::from(0.5).unwrap_or_else(T::zero) * (self.min + self.max)
    }

    /// Computes the intersection of two intervals.
    /// The result [is empty](Self::is_empty) if they do not overlap.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            min: T::max(self.min, other.min),
            max: T::min(self.max, other.max),
        }
    }

    /// Clamps a value so that it lies within the interval.
    pub fn clamp(&self, value: T) -> T {
        T::min(T::max(value, self.min), self.max)
    }

    /// Grows the interval by `amount` in both directions.
    pub fn inflate(&self, amount: T) -> Self {
        Self {
            min: self.min - amount,
            max: self.max + amount,
        }
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}
