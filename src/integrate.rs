//! Through-thickness integration of vector fields.
//!
//! The pipeline is built from two pieces: [`ZExtendedField`] augments a field with a
//! synthetic thickness coordinate so that only that coordinate varies, and the
//! integrators reduce a field's domain by one dimension by integrating over a
//! symmetric interval around the mid-surface with an [`IntervalQuadrature`].
use crate::field::Field;
use crate::quadrature::IntervalQuadrature;
use crate::Real;
use itertools::izip;
use log::debug;
use nalgebra::{convert, DMatrix};

/// Augments a field of domain dimension `d` with a synthetic last coordinate.
///
/// The adapter stores a fixed base point of dimension `d - 1` (the non-integrated
/// coordinates) and exposes a one-dimensional field in the remaining coordinate `z`:
/// evaluating it at `z` yields the wrapped field's value at `(base_point, z)`.
///
/// The base point may be changed between evaluations with
/// [`set_base_point`](Self::set_base_point), but not during a single evaluation call.
pub struct ZExtendedField<T: Real> {
    field: Box<dyn Field<T>>,
    base_point: DMatrix<T>,
}

impl<T: Real> ZExtendedField<T> {
    /// Wraps a clone of the given field. The base point starts out at the origin of
    /// the in-plane coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the field has domain dimension zero.
    pub fn new(field: &dyn Field<T>) -> Self {
        let d = field.domain_dim();
        assert!(d >= 1, "Wrapped field must have domain dimension >= 1");
        Self {
            field: field.clone_field(),
            base_point: DMatrix::zeros(d - 1, 1),
        }
    }

    /// Stores the in-plane coordinates that every subsequent evaluation completes
    /// with a `z` value. Must be a single-column matrix of dimension
    /// `field.domain_dim() - 1`; violations surface as panics on the next evaluation.
    pub fn set_base_point(&mut self, base_point: DMatrix<T>) {
        self.base_point = base_point;
    }

    pub fn base_point(&self) -> &DMatrix<T> {
        &self.base_point
    }
}

impl<T: Real> Clone for ZExtendedField<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            base_point: self.base_point.clone(),
        }
    }
}

impl<T: Real> Field<T> for ZExtendedField<T> {
    fn domain_dim(&self) -> usize {
        1
    }

    fn target_dim(&self) -> usize {
        self.field.target_dim()
    }

    fn eval_into(&self, points: &DMatrix<T>, result: &mut DMatrix<T>) -> eyre::Result<()> {
        assert_eq!(
            points.nrows(),
            1,
            "The number of rows for the 1D coordinate is not 1 but {}",
            points.nrows()
        );
        assert_eq!(
            self.field.domain_dim(),
            self.base_point.nrows() + 1,
            "The domain dimensions do not match: field.domain_dim() = {}, base point rows + 1 = {}",
            self.field.domain_dim(),
            self.base_point.nrows() + 1
        );
        assert_eq!(
            self.base_point.ncols(),
            1,
            "Multiple ({}) base points given, accepts only 1",
            self.base_point.ncols()
        );

        let m = self.base_point.nrows();
        let n = points.ncols();
        let mut full = DMatrix::zeros(m + 1, n);
        for mut column in full.columns_mut(0, n).column_iter_mut() {
            column.rows_mut(0, m).copy_from(&self.base_point);
        }
        full.row_mut(m).copy_from(&points.row(0));

        self.field.eval_into(&full, result)
    }

    fn clone_field(&self) -> Box<dyn Field<T>> {
        Box::new(self.clone())
    }
}

/// Integrates the `i`-th output component of a one-dimensional field over the rule.
fn integrate_component<T: Real>(
    field: &dyn Field<T>,
    rule: &IntervalQuadrature<T>,
    component: usize,
) -> eyre::Result<T> {
    let points = DMatrix::from_row_slice(1, rule.points().len(), rule.points());
    let values = field.eval(&points)?;
    let mut integral = T::zero();
    for (w, v) in izip!(rule.weights(), values.row(component).iter()) {
        integral += *v * *w;
    }
    Ok(integral)
}

/// Integrates a one-dimensional field over the fixed interval `[-t/2, t/2]`.
///
/// The result does not depend on the query points; like the field interface itself,
/// evaluation still produces one (identical) column per query point. A fresh
/// integration mesh (degree 1, one interior knot) is built for every output
/// component and query column. The repeated construction is an acknowledged
/// inefficiency, not a correctness issue.
pub struct IntegrateThickness<T: Real> {
    field: Box<dyn Field<T>>,
    thickness: T,
}

impl<T: Real> IntegrateThickness<T> {
    /// Wraps a clone of `field`, which must be one-dimensional (typically a
    /// [`ZExtendedField`]).
    ///
    /// # Panics
    ///
    /// Panics if `field.domain_dim() != 1`.
    pub fn new(field: &dyn Field<T>, thickness: T) -> Self {
        assert_eq!(
            field.domain_dim(),
            1,
            "Fixed-bound integration requires a 1D field, got domain dimension {}",
            field.domain_dim()
        );
        Self {
            field: field.clone_field(),
            thickness,
        }
    }
}

impl<T: Real> Clone for IntegrateThickness<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            thickness: self.thickness,
        }
    }
}

impl<T: Real> Field<T> for IntegrateThickness<T> {
    fn domain_dim(&self) -> usize {
        1
    }

    fn target_dim(&self) -> usize {
        self.field.target_dim()
    }

    fn eval_into(&self, points: &DMatrix<T>, result: &mut DMatrix<T>) -> eyre::Result<()> {
        assert_eq!(
            points.nrows(),
            1,
            "Expected 1D query points, got {} rows",
            points.nrows()
        );
        let n = points.ncols();
        result.resize_mut(self.target_dim(), n, T::zero());

        let half: T = convert(0.5);
        let half_thickness = self.thickness * half;
        for i in 0..self.target_dim() {
            for j in 0..n {
                let rule =
                    IntervalQuadrature::from_knot_span(-half_thickness, half_thickness, 1, 1);
                result[(i, j)] = integrate_component(self.field.as_ref(), &rule, i)?;
            }
        }
        Ok(())
    }

    fn clone_field(&self) -> Box<dyn Field<T>> {
        Box::new(self.clone())
    }
}

/// Integrates a field through the thickness, where the thickness itself varies over
/// the surface.
///
/// For every query point `u`, the local thickness is obtained from a scalar
/// thickness field, a [`ZExtendedField`] is anchored at `u`, and the wrapped field
/// is integrated over `[-t(u)/2, t(u)/2]` with a fresh degree-2 mesh with two
/// interior knots. The per-point rebuild is required behavior (the bounds differ at
/// every point), and the dominant cost of this evaluator.
pub struct IntegrateVariableThickness<T: Real> {
    field: Box<dyn Field<T>>,
    thickness: Box<dyn Field<T>>,
}

impl<T: Real> IntegrateVariableThickness<T> {
    /// Wraps clones of the integrated field and of the thickness field.
    ///
    /// # Panics
    ///
    /// Panics unless `field` has domain dimension at least 2 and `thickness` is a
    /// scalar field on the in-plane domain (`field.domain_dim() - 1`).
    pub fn new(field: &dyn Field<T>, thickness: &dyn Field<T>) -> Self {
        assert!(
            field.domain_dim() >= 2,
            "Variable-bound integration requires domain dimension >= 2, got {}",
            field.domain_dim()
        );
        assert_eq!(
            thickness.domain_dim(),
            field.domain_dim() - 1,
            "Thickness field domain dimension {} does not match in-plane dimension {}",
            thickness.domain_dim(),
            field.domain_dim() - 1
        );
        assert_eq!(
            thickness.target_dim(),
            1,
            "Thickness field must be scalar-valued, got target dimension {}",
            thickness.target_dim()
        );
        Self {
            field: field.clone_field(),
            thickness: thickness.clone_field(),
        }
    }
}

impl<T: Real> Clone for IntegrateVariableThickness<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            thickness: self.thickness.clone(),
        }
    }
}

impl<T: Real> Field<T> for IntegrateVariableThickness<T> {
    fn domain_dim(&self) -> usize {
        self.field.domain_dim() - 1
    }

    fn target_dim(&self) -> usize {
        self.field.target_dim()
    }

    fn eval_into(&self, points: &DMatrix<T>, result: &mut DMatrix<T>) -> eyre::Result<()> {
        assert_eq!(
            points.nrows(),
            self.domain_dim(),
            "Expected query points with {} rows, got {}",
            self.domain_dim(),
            points.nrows()
        );
        let n = points.ncols();
        let thickness = self.thickness.eval(points)?;
        result.resize_mut(self.target_dim(), n, T::zero());

        debug!(
            "variable-thickness integration of {} components at {} points (per-point quadrature rebuild)",
            self.target_dim(),
            n
        );

        let half: T = convert(0.5);
        let mut integrant = ZExtendedField::new(self.field.as_ref());
        for i in 0..self.target_dim() {
            for j in 0..n {
                let half_thickness = thickness[(0, j)] * half;
                let rule =
                    IntervalQuadrature::from_knot_span(-half_thickness, half_thickness, 2, 2);

                let mut base_point = DMatrix::zeros(points.nrows(), 1);
                base_point.column_mut(0).copy_from(&points.column(j));
                integrant.set_base_point(base_point);

                result[(i, j)] = integrate_component(&integrant, &rule, i)?;
            }
        }
        Ok(())
    }

    fn clone_field(&self) -> Box<dyn Field<T>> {
        Box::new(self.clone())
    }
}
