//! Batch distance calculations with optional parallelism.
//!
//! Search annotates every candidate listing with its distance from the
//! searcher; this module does that in one pass and keeps input order.

use crate::{Coordinate, DistanceUnit};

/// Calculate distances from `origin` to each point.
///
/// Points that are `None` (a store without coordinates) or invalid yield
/// `None`. The output has the same length and order as `points`.
///
/// # Example
/// ```
/// use foodbridge_geo::{distances_from, Coordinate, DistanceUnit};
///
/// let origin = Coordinate::new(37.7749, -122.4194);
/// let points = vec![Some(Coordinate::new(37.7833, -122.4167)), None];
///
/// let distances = distances_from(&origin, &points, DistanceUnit::Miles);
/// assert!(distances[0].is_some());
/// assert!(distances[1].is_none());
/// ```
pub fn distances_from(
    origin: &Coordinate,
    points: &[Option<Coordinate>],
    unit: DistanceUnit,
) -> Vec<Option<f64>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        points
            .par_iter()
            .map(|point| single_distance(origin, point.as_ref(), unit))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        points
            .iter()
            .map(|point| single_distance(origin, point.as_ref(), unit))
            .collect()
    }
}

#[inline]
fn single_distance(origin: &Coordinate, point: Option<&Coordinate>, unit: DistanceUnit) -> Option<f64> {
    point
        .filter(|p| p.is_valid())
        .map(|p| unit.distance(origin, p))
}
