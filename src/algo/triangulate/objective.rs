//! Triangulation objectives and the per-triangle evaluator.

use nalgebra::Point3;

use super::ring::Ring;
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Score of a triangle that must not be produced.
pub const INFEASIBLE: f64 = f64::MAX;

/// What an optimal triangulation optimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Objective {
    /// Minimize the sum of squared triangle areas.
    #[default]
    MinArea,
    /// Maximize the smallest interior angle, i.e. minimize the largest
    /// corner cosine over all triangles.
    MaxAngle,
}

impl Objective {
    /// Score one triangle; lower is better.
    ///
    /// - `MinArea`: `|(b - a) x (c - a)|^2`, four times the squared area.
    /// - `MaxAngle`: the largest of the three corner cosines. The sharpest
    ///   corner has the largest cosine.
    ///
    /// Non-finite results (coincident points under `MaxAngle`, overflow) are
    /// reported as [`INFEASIBLE`].
    /// A zero-length side is not read as a right angle (cosine 0), so a
    /// triangle with coincident corners never wins under `MaxAngle`.
    pub fn triangle_score(self, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
        let score = match self {
            Objective::MinArea => (b - a).cross(&(c - a)).norm_squared(),
            Objective::MaxAngle => {
                let cos_a = (b - a).normalize().dot(&(c - a).normalize());
                let cos_b = (a - b).normalize().dot(&(c - b).normalize());
                let cos_c = (a - c).normalize().dot(&(b - c).normalize());
                // f64::max skips NaN, so a zero-length side must be caught here.
                if cos_a.is_nan() || cos_b.is_nan() || cos_c.is_nan() {
                    f64::NAN
                } else {
                    cos_a.max(cos_b).max(cos_c)
                }
            }
        };
        if score.is_finite() {
            score
        } else {
            INFEASIBLE
        }
    }

    /// Combine the optimal values of the two sub-polygons on either side of
    /// a triangle with the triangle's own score.
    #[inline]
    pub fn combine(self, left: f64, triangle: f64, right: f64) -> f64 {
        match self {
            Objective::MinArea => left + triangle + right,
            Objective::MaxAngle => left.max(triangle).max(right),
        }
    }
}

/// Scores candidate triangles of one ring against the mesh.
pub struct Evaluator<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    ring: &'a Ring<I>,
    objective: Objective,
}

impl<'a, I: MeshIndex> Evaluator<'a, I> {
    /// Create an evaluator for `ring`, which must have been collected from
    /// `mesh`.
    pub fn new(mesh: &'a HalfEdgeMesh<I>, ring: &'a Ring<I>, objective: Objective) -> Self {
        Self {
            mesh,
            ring,
            objective,
        }
    }

    /// Score the triangle on ring positions `i`, `m`, `k`.
    ///
    /// A triangle whose three edges all exist already would duplicate an
    /// existing face or close a tunnel, so it is [`INFEASIBLE`].
    pub fn score(&self, i: usize, m: usize, k: usize) -> f64 {
        let a = self.ring.vertex(i);
        let b = self.ring.vertex(m);
        let c = self.ring.vertex(k);

        if self.mesh.is_edge(a, b) && self.mesh.is_edge(b, c) && self.mesh.is_edge(c, a) {
            return INFEASIBLE;
        }

        self.objective.triangle_score(
            self.mesh.position(a),
            self.mesh.position(b),
            self.mesh.position(c),
        )
    }
}
