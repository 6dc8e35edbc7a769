//! Polymorphic vector fields evaluated point-by-point.
//!
//! A [`Field`] maps points in a `domain_dim()`-dimensional parametric domain to
//! `target_dim()`-dimensional values. Points and values are stored column-per-point,
//! so a batch of `n` points is a `domain_dim × n` matrix and the corresponding values
//! form a `target_dim × n` matrix.
use crate::Real;
use nalgebra::{convert, DMatrix, DVector};
use std::sync::Arc;

/// A vector-valued function of a parametric point.
///
/// Shape mismatches in the input are contract violations and cause a panic with a
/// descriptive message. Numerical degeneracy encountered *during* evaluation (for
/// example a singular local frame) is reported through the returned `Result` instead,
/// so that callers can distinguish caller bugs from bad data.
pub trait Field<T: Real> {
    /// Number of independent coordinates a point of this field has.
    fn domain_dim(&self) -> usize;

    /// Number of scalar outputs produced per point.
    fn target_dim(&self) -> usize;

    /// Evaluates the field at the given points, resizing `result` to
    /// `target_dim × points.ncols()`.
    ///
    /// # Panics
    ///
    /// Panics if `points` does not have exactly `domain_dim()` rows.
    fn eval_into(&self, points: &DMatrix<T>, result: &mut DMatrix<T>) -> eyre::Result<()>;

    /// Evaluates the field at the given points into a freshly allocated matrix.
    fn eval(&self, points: &DMatrix<T>) -> eyre::Result<DMatrix<T>> {
        let mut result = DMatrix::zeros(self.target_dim(), points.ncols());
        self.eval_into(points, &mut result)?;
        Ok(result)
    }

    /// The Jacobian of the field at a single point, as a `target_dim × domain_dim`
    /// matrix.
    ///
    /// The default implementation uses central finite differences. Implementors that
    /// know their exact derivatives should override this.
    fn jacobian(&self, x: &DVector<T>) -> eyre::Result<DMatrix<T>> {
        finite_difference_jacobian(self, x, convert(1e-6))
    }

    /// Polymorphic deep copy.
    ///
    /// Adapters clone the fields they wrap on construction, so that their lifetime
    /// does not depend on external mutation of the original field.
    fn clone_field(&self) -> Box<dyn Field<T>>;
}

impl<T: Real> Clone for Box<dyn Field<T>> {
    fn clone(&self) -> Self {
        self.clone_field()
    }
}

/// Approximates the Jacobian of `f` at `x` with central differences of step `step`.
pub fn finite_difference_jacobian<T, F>(f: &F, x: &DVector<T>, step: T) -> eyre::Result<DMatrix<T>>
where
    T: Real,
    F: Field<T> + ?Sized,
{
    let d = f.domain_dim();
    assert_eq!(
        x.nrows(),
        d,
        "Point dimension {} does not match field domain dimension {}",
        x.nrows(),
        d
    );

    // Two evaluation points per coordinate direction: x + h e_j and x - h e_j
    let mut stencil = DMatrix::zeros(d, 2 * d);
    for j in 0..d {
        stencil.column_mut(2 * j).copy_from(x);
        stencil.column_mut(2 * j + 1).copy_from(x);
        stencil[(j, 2 * j)] += step;
        stencil[(j, 2 * j + 1)] -= step;
    }

    let values = f.eval(&stencil)?;
    let two_h = step + step;
    let mut jacobian = DMatrix::zeros(f.target_dim(), d);
    for j in 0..d {
        let delta = (values.column(2 * j) - values.column(2 * j + 1)) / two_h;
        jacobian.column_mut(j).copy_from(&delta);
    }
    Ok(jacobian)
}

/// A field that takes the same value at every point of its domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantField<T: Real> {
    value: DVector<T>,
    domain_dim: usize,
}

impl<T: Real> ConstantField<T> {
    pub fn new(value: DVector<T>, domain_dim: usize) -> Self {
        Self { value, domain_dim }
    }

    /// A scalar-valued constant field.
    pub fn scalar(value: T, domain_dim: usize) -> Self {
        Self::new(DVector::from_element(1, value), domain_dim)
    }
}

impl<T: Real> Field<T> for ConstantField<T> {
    fn domain_dim(&self) -> usize {
        self.domain_dim
    }

    fn target_dim(&self) -> usize {
        self.value.nrows()
    }

    fn eval_into(&self, points: &DMatrix<T>, result: &mut DMatrix<T>) -> eyre::Result<()> {
        assert_eq!(
            points.nrows(),
            self.domain_dim,
            "Expected points with {} rows, got {}",
            self.domain_dim,
            points.nrows()
        );
        result.resize_mut(self.target_dim(), points.ncols(), T::zero());
        for mut column in result.column_iter_mut() {
            column.copy_from(&self.value);
        }
        Ok(())
    }

    fn jacobian(&self, x: &DVector<T>) -> eyre::Result<DMatrix<T>> {
        assert_eq!(x.nrows(), self.domain_dim);
        Ok(DMatrix::zeros(self.target_dim(), self.domain_dim))
    }

    fn clone_field(&self) -> Box<dyn Field<T>> {
        Box::new(self.clone())
    }
}

/// A field backed by a closure evaluated one point at a time.
///
/// Mostly useful for tests and examples, where writing out a dedicated `Field`
/// implementation would be noise.
#[derive(Clone)]
pub struct ClosureField<T: Real> {
    domain_dim: usize,
    target_dim: usize,
    function: Arc<dyn Fn(&DVector<T>) -> DVector<T>>,
}

impl<T: Real> ClosureField<T> {
    pub fn new<F>(domain_dim: usize, target_dim: usize, function: F) -> Self
    where
        F: Fn(&DVector<T>) -> DVector<T> + 'static,
    {
        Self {
            domain_dim,
            target_dim,
            function: Arc::new(function),
        }
    }
}

impl<T: Real> Field<T> for ClosureField<T> {
    fn domain_dim(&self) -> usize {
        self.domain_dim
    }

    fn target_dim(&self) -> usize {
        self.target_dim
    }

    fn eval_into(&self, points: &DMatrix<T>, result: &mut DMatrix<T>) -> eyre::Result<()> {
        assert_eq!(
            points.nrows(),
            self.domain_dim,
            "Expected points with {} rows, got {}",
            self.domain_dim,
            points.nrows()
        );
        result.resize_mut(self.target_dim, points.ncols(), T::zero());
        for (j, point) in points.column_iter().enumerate() {
            let value = (self.function)(&point.clone_owned());
            assert_eq!(
                value.nrows(),
                self.target_dim,
                "Closure produced a value of dimension {}, expected {}",
                value.nrows(),
                self.target_dim
            );
            result.column_mut(j).copy_from(&value);
        }
        Ok(())
    }

    fn clone_field(&self) -> Box<dyn Field<T>> {
        Box::new(self.clone())
    }
}
