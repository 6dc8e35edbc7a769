//! One-dimensional integration meshes for through-thickness quadrature.
use crate::Real;
use itertools::izip;
use nalgebra::convert;

pub mod univariate;

/// A composite Gauss rule over a uniformly subdivided interval.
///
/// The interval is split into `interior_knots + 1` equal spans, analogous to a
/// uniform knot vector of a 1D B-spline basis, and each span carries a
/// `degree + 1`-point Gauss-Legendre rule. Such a rule integrates piecewise
/// polynomials of degree up to `2 * degree + 1` exactly.
///
/// Rules are cheap, ephemeral objects: the thickness integrators rebuild them per
/// integration call (per query point for variable thickness), and no caching is
/// performed across points.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalQuadrature<T> {
    weights: Vec<T>,
    points: Vec<T>,
}

impl<T: Real> IntervalQuadrature<T> {
    /// Builds the rule for the interval `[lower, upper]`.
    ///
    /// # Panics
    ///
    /// Panics if `lower >= upper`. A degenerate or inverted interval is a
    /// precondition failure, typically caused by a non-positive thickness.
    pub fn from_knot_span(lower: T, upper: T, interior_knots: usize, degree: usize) -> Self {
        assert!(
            lower < upper,
            "Invalid integration interval [{:?}, {:?}]",
            lower,
            upper
        );

        let num_spans = interior_knots + 1;
        let (ref_weights, ref_points) = univariate::gauss(degree + 1);

        let span_width = (upper - lower) / convert(num_spans as f64);
        let half_width = span_width * convert(0.5);

        let mut weights = Vec::with_capacity(num_spans * ref_weights.len());
        let mut points = Vec::with_capacity(num_spans * ref_points.len());
        for span in 0..num_spans {
            let midpoint = lower + span_width * convert(span as f64 + 0.5);
            for (w, x) in izip!(&ref_weights, &ref_points) {
                weights.push(half_width * convert(*w));
                points.push(midpoint + half_width * convert(*x));
            }
        }

        Self { weights, points }
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    pub fn points(&self) -> &[T] {
        &self.points
    }

    /// Approximates the integral of `f` over the interval covered by this rule.
    pub fn integrate(&self, f: impl Fn(T) -> T) -> T {
        let mut integral = T::zero();
        for (w, z) in izip!(&self.weights, &self.points) {
            integral += f(*z) * *w;
        }
        integral
    }
}
