//! Material matrix evaluators for shells and laminates.
//!
//! Both evaluators implement [`Field`] with target dimension 9: each output column
//! is a flattened (column-major) `3 × 3` plane-stress stiffness tensor in local
//! coordinates.
use crate::field::Field;
use crate::geometry::SurfaceGeometry;
use crate::Real;
use eyre::eyre;
use itertools::izip;
use nalgebra::{DMatrix, Matrix3, Vector2};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LameParameters<T> {
    pub lambda: T,
    pub mu: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YoungPoisson<T> {
    pub young: T,
    pub poisson: T,
}

impl<T> From<YoungPoisson<T>> for LameParameters<T>
where
    T: Real,
{
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    fn from(params: YoungPoisson<T>) -> Self {
        let YoungPoisson { young, poisson } = params;
        let lambda = young * poisson / ((1.0 + poisson) * (1.0 - 2.0 * poisson));
        let mu = young / (2.0 * (1.0 + poisson));
        Self { lambda, mu }
    }
}

/// A single orthotropic layer of a laminate.
///
/// `phi` is the fiber angle in radians, measured in the laminate's in-plane
/// coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ply<T> {
    pub e1: T,
    pub e2: T,
    pub g12: T,
    pub nu12: T,
    pub nu21: T,
    pub thickness: T,
    pub phi: T,
}

/// Point-wise plane-stress stiffness tensor of an isotropic shell.
///
/// Constructed from a surface geometry and scalar Young's modulus and Poisson's
/// ratio fields defined on the two-dimensional parametric domain. The evaluator
/// itself is a [`Field`] with `domain_dim() == 3`: the first two coordinates of a
/// query point select the surface point, while the third is *not* integrated; it
/// only scales the resulting tensor (an externally supplied thickness-like factor).
/// Composing this evaluator with the thickness integrators is unverified behavior.
///
/// Per query point, the local frame `F0 = [J | n]` is built from the surface
/// Jacobian and unit normal, inverted and contracted to the contravariant metric
/// `F0⁻¹ · F0⁻ᵀ`, and the tensor is filled from the St. Venant-Kirchhoff
/// plane-stress closed form in terms of the metric entries.
pub struct IsotropicMaterialMatrix<T: Real> {
    geometry: Box<dyn SurfaceGeometry<T>>,
    young: Box<dyn Field<T>>,
    poisson: Box<dyn Field<T>>,
    piece: Option<Box<IsotropicMaterialMatrix<T>>>,
}

impl<T: Real> IsotropicMaterialMatrix<T> {
    /// Wraps clones of the geometry and the two material fields.
    ///
    /// # Panics
    ///
    /// Panics unless both material fields are scalar-valued on the two-dimensional
    /// parametric domain.
    pub fn new(
        geometry: &dyn SurfaceGeometry<T>,
        young: &dyn Field<T>,
        poisson: &dyn Field<T>,
    ) -> Self {
        for (name, field) in [("Young's modulus", young), ("Poisson's ratio", poisson)] {
            assert_eq!(
                field.domain_dim(),
                2,
                "{} field must be defined on the 2D parametric domain, got domain dimension {}",
                name,
                field.domain_dim()
            );
            assert_eq!(
                field.target_dim(),
                1,
                "{} field must be scalar-valued, got target dimension {}",
                name,
                field.target_dim()
            );
        }
        Self {
            geometry: geometry.clone_geometry(),
            young: young.clone_field(),
            poisson: poisson.clone_field(),
            piece: None,
        }
    }

    /// The evaluator restricted to the sub-patch with the given index.
    ///
    /// The piece is created lazily and stored in a single slot owned by this
    /// evaluator; each call replaces the previously created piece. Access is
    /// single-threaded by contract.
    pub fn piece(&mut self, index: usize) -> &IsotropicMaterialMatrix<T> {
        self.piece = Some(Box::new(Self {
            geometry: self.geometry.piece(index),
            young: self.young.clone_field(),
            poisson: self.poisson.clone_field(),
            piece: None,
        }));
        self.piece.as_deref().expect("slot was just filled")
    }
}

impl<T: Real> Clone for IsotropicMaterialMatrix<T> {
    fn clone(&self) -> Self {
        Self {
            geometry: self.geometry.clone(),
            young: self.young.clone(),
            poisson: self.poisson.clone(),
            piece: None,
        }
    }
}

impl<T: Real> Field<T> for IsotropicMaterialMatrix<T> {
    fn domain_dim(&self) -> usize {
        3
    }

    fn target_dim(&self) -> usize {
        9
    }

    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    fn eval_into(&self, points: &DMatrix<T>, result: &mut DMatrix<T>) -> eyre::Result<()> {
        assert_eq!(
            points.nrows(),
            3,
            "Expected query points with 3 rows (2 in-plane + thickness factor), got {}",
            points.nrows()
        );
        let n = points.ncols();
        let surface_points = points.rows(0, 2).into_owned();
        let young = self.young.eval(&surface_points)?;
        let poisson = self.poisson.eval(&surface_points)?;

        result.resize_mut(self.target_dim(), n, T::zero());
        for j in 0..n {
            let u = Vector2::new(points[(0, j)], points[(1, j)]);
            let jacobian = self.geometry.jacobian(&u)?;
            let normal = self
                .geometry
                .normal(&u)?
                .try_normalize(T::zero())
                .ok_or_else(|| eyre!("Degenerate surface geometry: vanishing normal at query point {}", j))?;

            let mut f0 = Matrix3::zeros();
            f0.fixed_view_mut::<3, 2>(0, 0).copy_from(&jacobian);
            f0.set_column(2, &normal);
            let f0 = f0
                .try_inverse()
                .ok_or_else(|| eyre!("Degenerate surface geometry: singular local frame at query point {}", j))?;
            let f0 = f0 * f0.transpose();

            let LameParameters { lambda, mu } = LameParameters::from(YoungPoisson {
                young: young[(0, j)],
                poisson: poisson[(0, j)],
            });
            let c_constant = 4.0 * lambda * mu / (lambda + 2.0 * mu);

            let mut c = Matrix3::zeros();
            c[(0, 0)] = c_constant * f0[(0, 0)] * f0[(0, 0)] + 2.0 * mu * (2.0 * f0[(0, 0)] * f0[(0, 0)]);
            c[(1, 1)] = c_constant * f0[(1, 1)] * f0[(1, 1)] + 2.0 * mu * (2.0 * f0[(1, 1)] * f0[(1, 1)]);
            c[(2, 2)] = c_constant * f0[(0, 1)] * f0[(0, 1)]
                + 2.0 * mu * (f0[(0, 0)] * f0[(1, 1)] + f0[(0, 1)] * f0[(0, 1)]);
            c[(0, 1)] = c_constant * f0[(0, 0)] * f0[(1, 1)] + 2.0 * mu * (2.0 * f0[(0, 1)] * f0[(0, 1)]);
            c[(1, 0)] = c[(0, 1)];
            c[(0, 2)] = c_constant * f0[(0, 0)] * f0[(0, 1)] + 2.0 * mu * (2.0 * f0[(0, 0)] * f0[(0, 1)]);
            c[(2, 0)] = c[(0, 2)];
            c[(1, 2)] = c_constant * f0[(0, 1)] * f0[(1, 1)] + 2.0 * mu * (2.0 * f0[(0, 1)] * f0[(1, 1)]);
            c[(2, 1)] = c[(1, 2)];

            // The third coordinate is a plain multiplicative scale, not an integration
            c *= points[(2, j)];

            result.column_mut(j).copy_from_slice(c.as_slice());
        }
        Ok(())
    }

    fn clone_field(&self) -> Box<dyn Field<T>> {
        Box::new(self.clone())
    }
}

/// Effective membrane stiffness of a laminated composite (classical laminate
/// theory, A-matrix only).
///
/// The laminate is described by five equal-length per-ply sequences. The response is
/// spatially uniform: the stiffness is computed once per evaluation and replicated
/// across all query columns. Bending (B) and coupling (D) terms are out of scope and
/// intentionally not accumulated.
#[derive(Clone, Debug, PartialEq)]
pub struct LaminateMaterialMatrix<T> {
    youngs_moduli: Vec<(T, T)>,
    shear_moduli: Vec<T>,
    poisson_ratios: Vec<(T, T)>,
    thickness: Vec<T>,
    phi: Vec<T>,
}

impl<T: Real> LaminateMaterialMatrix<T> {
    /// Builds the evaluator from per-ply property sequences: `(E1, E2)` pairs,
    /// `G12`, `(nu12, nu21)` pairs, thicknesses and fiber angles (radians).
    ///
    /// Length and symmetry violations are reported on evaluation, not here.
    pub fn new(
        youngs_moduli: Vec<(T, T)>,
        shear_moduli: Vec<T>,
        poisson_ratios: Vec<(T, T)>,
        thickness: Vec<T>,
        phi: Vec<T>,
    ) -> Self {
        Self {
            youngs_moduli,
            shear_moduli,
            poisson_ratios,
            thickness,
            phi,
        }
    }

    /// Convenience constructor from a sequence of [`Ply`] descriptions.
    pub fn from_plies(plies: &[Ply<T>]) -> Self {
        Self {
            youngs_moduli: plies.iter().map(|p| (p.e1, p.e2)).collect(),
            shear_moduli: plies.iter().map(|p| p.g12).collect(),
            poisson_ratios: plies.iter().map(|p| (p.nu12, p.nu21)).collect(),
            thickness: plies.iter().map(|p| p.thickness).collect(),
            phi: plies.iter().map(|p| p.phi).collect(),
        }
    }
}

impl<T: Real> Field<T> for LaminateMaterialMatrix<T> {
    fn domain_dim(&self) -> usize {
        2
    }

    fn target_dim(&self) -> usize {
        9
    }

    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    fn eval_into(&self, points: &DMatrix<T>, result: &mut DMatrix<T>) -> eyre::Result<()> {
        assert_eq!(
            points.nrows(),
            2,
            "Expected 2D query points, got {} rows",
            points.nrows()
        );
        assert_eq!(
            self.youngs_moduli.len(),
            self.poisson_ratios.len(),
            "Size of vectors of Young's moduli and Poisson ratios is not equal: {} & {}",
            self.youngs_moduli.len(),
            self.poisson_ratios.len()
        );
        assert_eq!(
            self.youngs_moduli.len(),
            self.shear_moduli.len(),
            "Size of vectors of Young's moduli and shear moduli is not equal: {} & {}",
            self.youngs_moduli.len(),
            self.shear_moduli.len()
        );
        assert_eq!(
            self.thickness.len(),
            self.phi.len(),
            "Size of vectors of thickness and angles is not equal: {} & {}",
            self.thickness.len(),
            self.phi.len()
        );
        assert_eq!(
            self.youngs_moduli.len(),
            self.thickness.len(),
            "Size of vectors of material properties and laminate properties is not equal: {} & {}",
            self.youngs_moduli.len(),
            self.thickness.len()
        );
        assert!(!self.youngs_moduli.is_empty(), "No plies defined");

        let t_tot = self.thickness.iter().fold(T::zero(), |sum, t| sum + *t);
        // Mid-plane height of the whole plate
        let z_mid = t_tot / 2.0;
        // Running thickness offset, accumulated ply by ply
        let mut t_temp = T::zero();

        let mut a = Matrix3::zeros();
        for (ply, (&(e1, e2), &g12, &(nu12, nu21), &t, &phi)) in izip!(
            &self.youngs_moduli,
            &self.shear_moduli,
            &self.poisson_ratios,
            &self.thickness,
            &self.phi
        )
        .enumerate()
        {
            assert!(
                nu21 * e1 == nu12 * e2,
                "No symmetry in material properties for ply {}: nu12*E2 != nu21*E1 \
                 (nu12 = {:?}, E2 = {:?}, nu12*E2 = {:?}; nu21 = {:?}, E1 = {:?}, nu21*E1 = {:?})",
                ply,
                nu12,
                e2,
                nu12 * e2,
                nu21,
                e1,
                nu21 * e1
            );

            let denom = 1.0 - nu12 * nu21;
            let mut d = Matrix3::zeros();
            d[(0, 0)] = e1 / denom;
            d[(1, 1)] = e2 / denom;
            d[(2, 2)] = g12;
            d[(0, 1)] = nu21 * e1 / denom;
            d[(1, 0)] = nu12 * e2 / denom;

            let (sin, cos) = (phi.sin(), phi.cos());
            let sc = sin * cos;
            let mut rot = Matrix3::zeros();
            rot[(0, 0)] = cos * cos;
            rot[(1, 1)] = cos * cos;
            rot[(0, 1)] = sin * sin;
            rot[(1, 0)] = sin * sin;
            rot[(0, 2)] = sc;
            rot[(2, 0)] = -2.0 * sc;
            rot[(1, 2)] = -sc;
            rot[(2, 1)] = 2.0 * sc;
            rot[(2, 2)] = cos * cos - sin * sin;

            let d = rot.transpose() * d * rot;

            // Distance from the plate mid-plane; needed once bending (B) and
            // coupling (D) terms are added
            let _z = (z_mid - (t / 2.0 + t_temp)).abs();

            a += d * t;
            t_temp += t;
        }

        assert!(
            t_tot == t_temp,
            "Total thickness after ply loop is wrong: accumulated {:?}, sum(thickness) = {:?}",
            t_temp,
            t_tot
        );

        // The laminate response is uniform over the domain
        let n = points.ncols();
        result.resize_mut(self.target_dim(), n, T::zero());
        for mut column in result.column_iter_mut() {
            column.copy_from_slice(a.as_slice());
        }
        Ok(())
    }

    fn clone_field(&self) -> Box<dyn Field<T>> {
        Box::new(self.clone())
    }
}
