use nalgebra::{DMatrix, Point3};

use crate::detection::Trackable;

/// Euclidean distance between two positions.
pub fn euclidean_distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    nalgebra::distance(a, b)
}

/// Build an `rows.len() x cols.len()` matrix of Euclidean distances between
/// the positions of `rows` and `cols`.
pub fn distance_matrix<'a, T, I>(rows: I, cols: &[T]) -> DMatrix<f64>
where
    T: Trackable + 'a,
    I: ExactSizeIterator<Item = &'a T>,
{
    let m = rows.len();
    let n = cols.len();
    let col_positions: Vec<Point3<f64>> = cols.iter().map(Trackable::position).collect();

    let mut matrix = DMatrix::<f64>::zeros(m, n);
    for (i, row) in rows.enumerate() {
        let p = row.position();
        for (j, q) in col_positions.iter().enumerate() {
            matrix[(i, j)] = euclidean_distance(&p, q);
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::Detection;
    use approx::assert_relative_eq;

    #[test]
    fn test_euclidean_distance() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(3.0, 4.0, 12.0);
        assert_relative_eq!(euclidean_distance(&a, &b), 13.0);
        assert_relative_eq!(euclidean_distance(&b, &a), 13.0);
    }

    #[test]
    fn test_distance_matrix_shape_and_values() {
        let tracked = vec![Detection::at(0.0, 0.0, 0.0), Detection::at(100.0, 0.0, 0.0)];
        let dets = vec![
            Detection::at(1.0, 0.0, 0.0),
            Detection::at(200.0, 0.0, 0.0),
            Detection::at(0.0, 2.0, 0.0),
        ];
        let matrix = distance_matrix(tracked.iter(), &dets);

        assert_eq!(matrix.nrows(), 2);
        assert_eq!(matrix.ncols(), 3);
        assert_relative_eq!(matrix[(0, 0)], 1.0);
        assert_relative_eq!(matrix[(0, 1)], 200.0);
        assert_relative_eq!(matrix[(1, 0)], 99.0);
        assert_relative_eq!(matrix[(1, 1)], 100.0);
        assert_relative_eq!(matrix[(0, 2)], 2.0);
    }
}
