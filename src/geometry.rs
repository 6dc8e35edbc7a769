//! Narrow interface to the (external) surface geometry representation.
use crate::field::Field;
use crate::Real;
use eyre::eyre;
use nalgebra::{DMatrix, DVector, Matrix3x2, Vector2, Vector3};

/// A parametrized surface embedded in three-dimensional space.
///
/// This is the only view of the geometry subsystem that the material evaluators
/// need: the surface Jacobian and normal at a parametric point. Normals are *not*
/// normalized here; callers normalize on demand.
pub trait SurfaceGeometry<T: Real> {
    /// The `3 × 2` Jacobian of the embedding at the parametric point `u`.
    fn jacobian(&self, u: &Vector2<T>) -> eyre::Result<Matrix3x2<T>>;

    /// A surface normal at `u`, not necessarily of unit length.
    fn normal(&self, u: &Vector2<T>) -> eyre::Result<Vector3<T>> {
        let jacobian = self.jacobian(u)?;
        let du = jacobian.column(0).clone_owned();
        let dv = jacobian.column(1).clone_owned();
        Ok(du.cross(&dv))
    }

    /// Restricts the geometry to the sub-patch with the given index.
    ///
    /// Single-patch geometries return a copy of themselves.
    fn piece(&self, index: usize) -> Box<dyn SurfaceGeometry<T>> {
        let _ = index;
        self.clone_geometry()
    }

    /// Polymorphic deep copy.
    fn clone_geometry(&self) -> Box<dyn SurfaceGeometry<T>>;
}

impl<T: Real> Clone for Box<dyn SurfaceGeometry<T>> {
    fn clone(&self) -> Self {
        self.clone_geometry()
    }
}

/// A surface defined by an embedding field `(u, v) ↦ (x, y, z)`.
///
/// The Jacobian is obtained from [`Field::jacobian`], so fields that do not override
/// the finite-difference default get an approximate (exact for affine embeddings)
/// Jacobian.
pub struct MappedSurface<T: Real> {
    map: Box<dyn Field<T>>,
}

impl<T: Real> MappedSurface<T> {
    /// Wraps the given embedding field, cloning it so that the surface owns an
    /// independent copy.
    ///
    /// # Panics
    ///
    /// Panics unless the field maps a two-dimensional domain into three dimensions.
    pub fn new(map: &dyn Field<T>) -> Self {
        assert_eq!(
            map.domain_dim(),
            2,
            "Surface embedding must have domain dimension 2, got {}",
            map.domain_dim()
        );
        assert_eq!(
            map.target_dim(),
            3,
            "Surface embedding must have target dimension 3, got {}",
            map.target_dim()
        );
        Self {
            map: map.clone_field(),
        }
    }
}

impl<T: Real> Clone for MappedSurface<T> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T: Real> SurfaceGeometry<T> for MappedSurface<T> {
    fn jacobian(&self, u: &Vector2<T>) -> eyre::Result<Matrix3x2<T>> {
        let point = DVector::from_column_slice(u.as_slice());
        let jacobian: DMatrix<T> = self.map.jacobian(&point)?;
        if jacobian.nrows() != 3 || jacobian.ncols() != 2 {
            return Err(eyre!(
                "Embedding Jacobian has shape {}x{}, expected 3x2",
                jacobian.nrows(),
                jacobian.ncols()
            ));
        }
        Ok(Matrix3x2::from_column_slice(jacobian.as_slice()))
    }

    fn clone_geometry(&self) -> Box<dyn SurfaceGeometry<T>> {
        Box::new(self.clone())
    }
}
