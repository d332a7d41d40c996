use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A value the registry can track: something with a 3D position and a
/// priority relative to other values of the same type.
pub trait Trackable: Clone {
    fn position(&self) -> Point3<f64>;

    /// Total order used to rank identities. `Ordering::Less` ranks earlier.
    fn priority_cmp(&self, other: &Self) -> Ordering;
}

/// A single detection result: an anonymous object position for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub size: f64,
}

impl Detection {
    pub fn new(x: f64, y: f64, z: f64, size: f64) -> Self {
        Self { x, y, z, size }
    }

    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, 0.0)
    }
}

impl Trackable for Detection {
    fn position(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    /// Larger objects rank first; ties fall back to position.
    fn priority_cmp(&self, other: &Self) -> Ordering {
        other
            .size
            .total_cmp(&self.size)
            .then_with(|| self.x.total_cmp(&other.x))
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.z.total_cmp(&other.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_larger_ranks_first() {
        let big = Detection::new(0.0, 0.0, 0.0, 9.0);
        let small = Detection::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(big.priority_cmp(&small), Ordering::Less);
        assert_eq!(small.priority_cmp(&big), Ordering::Greater);
    }

    #[test]
    fn test_ties_broken_by_position() {
        let a = Detection::new(1.0, 5.0, 0.0, 2.0);
        let b = Detection::new(1.0, 6.0, 0.0, 2.0);
        assert_eq!(a.priority_cmp(&b), Ordering::Less);
        assert_eq!(a.priority_cmp(&a), Ordering::Equal);
    }

    #[test]
    fn test_deserialize() {
        let det: Detection =
            serde_json::from_str(r#"{ "x": 10, "y": 10, "z": 0, "size": 5 }"#).unwrap();
        assert_eq!(det, Detection::new(10.0, 10.0, 0.0, 5.0));
        assert_eq!(det.position(), Point3::new(10.0, 10.0, 0.0));
    }
}
