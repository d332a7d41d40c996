//! Greedy frame-to-track assignment over a distance matrix.
//!
//! Rows are live identities, columns are the current frame's detections.
//! The result approximates an optimal bipartite assignment:
//!
//! 1. each row's columns are ordered by ascending distance,
//! 2. rows are ordered by their own nearest-candidate distance,
//! 3. rows take, in that order, the nearest column that is still free and
//!    strictly closer than the tolerance.
//!
//! All sorts are stable, so ties resolve by index and the result depends
//! only on the matrix contents.

use nalgebra::DMatrix;

/// Outcome of one assignment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    /// `(row, col)` pairs in the order the rows were processed.
    pub matches: Vec<(usize, usize)>,
    /// Rows left without a column, in processing order.
    pub unmatched_rows: Vec<usize>,
    /// Free columns, in the candidate order of the first processed row.
    pub unmatched_cols: Vec<usize>,
}

/// Ascending-distance column order for `row`.
fn candidate_order(distance_matrix: &DMatrix<f64>, row: usize) -> Vec<usize> {
    let mut cols: Vec<usize> = (0..distance_matrix.ncols()).collect();
    cols.sort_by(|&a, &b| distance_matrix[(row, a)].total_cmp(&distance_matrix[(row, b)]));
    cols
}

/// Assign columns to rows greedily. A pair is only accepted when its
/// distance is strictly below `tolerance`.
pub fn greedy_assign(distance_matrix: &DMatrix<f64>, tolerance: f64) -> Assignment {
    let m = distance_matrix.nrows();
    let n = distance_matrix.ncols();

    if m == 0 || n == 0 {
        return Assignment {
            matches: Vec::new(),
            unmatched_rows: (0..m).collect(),
            unmatched_cols: (0..n).collect(),
        };
    }

    let candidates: Vec<Vec<usize>> = (0..m)
        .map(|row| candidate_order(distance_matrix, row))
        .collect();

    // Most confident rows resolve first.
    let nearest = |row: usize| distance_matrix[(row, candidates[row][0])];
    let mut rows: Vec<usize> = (0..m).collect();
    rows.sort_by(|&a, &b| nearest(a).total_cmp(&nearest(b)));

    let mut consumed = vec![false; n];
    let mut matches = Vec::new();
    let mut unmatched_rows = Vec::new();

    for &row in &rows {
        let found = candidates[row]
            .iter()
            .copied()
            .find(|&col| !consumed[col] && distance_matrix[(row, col)] < tolerance);

        match found {
            Some(col) => {
                consumed[col] = true;
                matches.push((row, col));
            }
            None => unmatched_rows.push(row),
        }
    }

    let unmatched_cols = candidates[rows[0]]
        .iter()
        .copied()
        .filter(|&col| !consumed[col])
        .collect();

    Assignment {
        matches,
        unmatched_rows,
        unmatched_cols,
    }
}
