//! Dynamic program over the sub-ranges of a ring.
//!
//! `weight(i, k)` is the best objective value for triangulating the
//! sub-polygon on ring positions `i..=k`, and `split(i, k)` is the apex `m`
//! of the triangle `(i, m, k)` that achieves it. Sub-ranges are solved in
//! order of increasing span, so both halves of every candidate split are
//! already known when it is evaluated.

use nalgebra::DMatrix;

use super::objective::Objective;

/// Optimal weights and split points for every sub-range `i < k` of a ring.
///
/// Only the strict upper triangle is meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitTable {
    n: usize,
    weights: DMatrix<f64>,
    splits: DMatrix<Option<usize>>,
}

impl SplitTable {
    /// Ring length the table was solved for.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the table covers an empty ring.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Optimal value for the sub-polygon `i..=k`.
    #[inline]
    pub fn weight(&self, i: usize, k: usize) -> f64 {
        debug_assert!(i < k && k < self.n, "weight({}, {}) outside upper triangle", i, k);
        self.weights[(i, k)]
    }

    /// Optimal apex for the sub-polygon `i..=k`; `None` for adjacent corners.
    #[inline]
    pub fn split(&self, i: usize, k: usize) -> Option<usize> {
        debug_assert!(i < k && k < self.n, "split({}, {}) outside upper triangle", i, k);
        self.splits[(i, k)]
    }

    /// Optimal value for the whole ring, if it has at least two corners.
    pub fn optimum(&self) -> Option<f64> {
        (self.n >= 2).then(|| self.weight(0, self.n - 1))
    }

    /// Triangles of the optimal decomposition, as ring positions `(i, m, k)`,
    /// in the order the split tree is unwound.
    pub fn triangles(&self) -> Vec<(usize, usize, usize)> {
        let mut triangles = Vec::with_capacity(self.n.saturating_sub(2));
        if self.n < 3 {
            return triangles;
        }
        let mut todo = vec![(0, self.n - 1)];
        while let Some((start, end)) = todo.pop() {
            if end - start < 2 {
                continue;
            }
            if let Some(m) = self.split(start, end) {
                triangles.push((start, m, end));
                todo.push((start, m));
                todo.push((m, end));
            }
        }
        triangles
    }
}

/// Solve the optimal triangulation of an `n`-corner ring.
///
/// `score(i, m, k)` rates the triangle on ring positions `i < m < k`. For
/// every range the lowest `m` with the smallest combined value wins; if all
/// candidates of a range are infeasible the lowest `m` is kept, so the split
/// tree is always complete.
///
/// Runs in O(n³) time and O(n²) space.
pub fn solve<F>(n: usize, objective: Objective, mut score: F) -> SplitTable
where
    F: FnMut(usize, usize, usize) -> f64,
{
    let mut weights = DMatrix::from_element(n, n, f64::MAX);
    let mut splits = DMatrix::from_element(n, n, None);

    // 2-gons: a bare edge costs nothing.
    for i in 0..n.saturating_sub(1) {
        weights[(i, i + 1)] = 0.0;
    }

    for span in 2..n {
        for i in 0..n - span {
            let k = i + span;
            let mut best_m = i + 1;
            let mut best_w = f64::INFINITY;

            for m in i + 1..k {
                let w = objective.combine(weights[(i, m)], score(i, m, k), weights[(m, k)]);
                if w < best_w {
                    best_w = w;
                    best_m = m;
                }
            }

            weights[(i, k)] = best_w;
            splits[(i, k)] = Some(best_m);
        }
    }

    SplitTable { n, weights, splits }
}
