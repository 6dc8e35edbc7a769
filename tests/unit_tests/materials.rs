use lamella::field::{ClosureField, ConstantField, Field};
use lamella::geometry::MappedSurface;
use lamella::materials::{IsotropicMaterialMatrix, LaminateMaterialMatrix, LameParameters, Ply, YoungPoisson};
use matrixcompare::assert_scalar_eq;
use nalgebra::{DMatrix, DVector, Matrix3};
use std::f64::consts::{FRAC_PI_2, PI};

fn flat_unit_patch() -> MappedSurface<f64> {
    // (u, v) -> (u, v, 0): identity in-plane Jacobian, normal e_z
    let embedding = ClosureField::new(2, 3, |p: &DVector<f64>| {
        DVector::from_column_slice(&[p[0], p[1], 0.0])
    });
    MappedSurface::new(&embedding)
}

fn tensor_at(values: &DMatrix<f64>, column: usize) -> Matrix3<f64> {
    Matrix3::from_iterator(values.column(column).iter().copied())
}

#[test]
fn lame_parameters_from_young_poisson() {
    let params = LameParameters::from(YoungPoisson {
        young: 1.0,
        poisson: 0.3,
    });
    assert_scalar_eq!(params.mu, 1.0 / 2.6, comp = abs, tol = 1e-15);
    assert_scalar_eq!(params.lambda, 0.3 / (1.3 * 0.4), comp = abs, tol = 1e-15);
}

#[test]
fn isotropic_matrix_on_flat_patch_matches_closed_form() {
    let (young, poisson) = (1.0, 0.3);
    let surface = flat_unit_patch();
    let young_field = ConstantField::scalar(young, 2);
    let poisson_field = ConstantField::scalar(poisson, 2);
    let material = IsotropicMaterialMatrix::new(&surface, &young_field, &poisson_field);
    assert_eq!(material.domain_dim(), 3);
    assert_eq!(material.target_dim(), 9);

    // Same surface point, two different scale factors in the third coordinate
    let points = DMatrix::from_column_slice(3, 2, &[0.25, 0.25, 1.0, 0.25, 0.25, 2.5]);
    let values = material.eval(&points).unwrap();

    let LameParameters { lambda, mu } = LameParameters::from(YoungPoisson { young, poisson });
    let c_constant = 4.0 * lambda * mu / (lambda + 2.0 * mu);
    // With the contravariant metric equal to the identity the tensor reduces to
    // a matrix with c_constant + 4 mu on the in-plane diagonal, c_constant on the
    // in-plane off-diagonal and 2 mu in the shear slot.
    let mut expected = Matrix3::zeros();
    expected[(0, 0)] = c_constant + 4.0 * mu;
    expected[(1, 1)] = c_constant + 4.0 * mu;
    expected[(2, 2)] = 2.0 * mu;
    expected[(0, 1)] = c_constant;
    expected[(1, 0)] = c_constant;

    for (j, scale) in [(0, 1.0), (1, 2.5)] {
        let tensor = tensor_at(&values, j);
        for i in 0..3 {
            for k in 0..3 {
                assert_scalar_eq!(tensor[(i, k)], scale * expected[(i, k)], comp = abs, tol = 1e-8);
            }
        }
    }
}

#[test]
fn isotropic_matrix_reports_degenerate_geometry() {
    // (u, v) -> (u, u, 0) collapses the surface onto a line: vanishing normal
    let embedding = ClosureField::new(2, 3, |p: &DVector<f64>| {
        DVector::from_column_slice(&[p[0], p[0], 0.0])
    });
    let surface = MappedSurface::new(&embedding);
    let young = ConstantField::scalar(1.0, 2);
    let poisson = ConstantField::scalar(0.0, 2);
    let material = IsotropicMaterialMatrix::new(&surface, &young, &poisson);

    let points = DMatrix::from_column_slice(3, 1, &[0.5, 0.5, 1.0]);
    assert!(material.eval(&points).is_err());
}

#[test]
fn isotropic_matrix_piece_matches_single_patch_parent() {
    let surface = flat_unit_patch();
    let young = ConstantField::scalar(2.0, 2);
    let poisson = ConstantField::scalar(0.25, 2);
    let mut material = IsotropicMaterialMatrix::new(&surface, &young, &poisson);

    let points = DMatrix::from_column_slice(3, 1, &[0.4, 0.6, 1.0]);
    let parent_values = material.eval(&points).unwrap();
    let piece_values = material.piece(0).eval(&points).unwrap();
    assert_eq!(parent_values, piece_values);
}

fn reference_ply() -> Ply<f64> {
    Ply {
        e1: 300.0,
        e2: 200.0,
        g12: 100.0,
        nu12: 0.3,
        nu21: 0.2,
        thickness: 0.1,
        phi: 0.0,
    }
}

fn laminate_tensor(plies: &[Ply<f64>]) -> Matrix3<f64> {
    let laminate = LaminateMaterialMatrix::from_plies(plies);
    let points = DMatrix::from_column_slice(2, 1, &[0.25, 0.25]);
    let values = laminate.eval(&points).unwrap();
    tensor_at(&values, 0)
}

#[test]
fn single_unrotated_ply_reduces_to_scaled_local_stiffness() {
    let ply = reference_ply();
    let a = laminate_tensor(&[ply]);

    let denom = 1.0 - ply.nu12 * ply.nu21;
    assert_scalar_eq!(a[(0, 0)], ply.e1 / denom * ply.thickness, comp = abs, tol = 1e-12);
    assert_scalar_eq!(a[(1, 1)], ply.e2 / denom * ply.thickness, comp = abs, tol = 1e-12);
    assert_scalar_eq!(a[(2, 2)], ply.g12 * ply.thickness, comp = abs, tol = 1e-12);
    assert_scalar_eq!(a[(0, 1)], ply.nu21 * ply.e1 / denom * ply.thickness, comp = abs, tol = 1e-12);
    assert_scalar_eq!(a[(1, 0)], ply.nu12 * ply.e2 / denom * ply.thickness, comp = abs, tol = 1e-12);
    assert_scalar_eq!(a[(0, 2)], 0.0, comp = abs, tol = 1e-12);
    assert_scalar_eq!(a[(1, 2)], 0.0, comp = abs, tol = 1e-12);

    // Spot-check the local stiffness itself: E1 / (1 - nu12 nu21) ~ 319.15
    assert_scalar_eq!(a[(0, 0)] / ply.thickness, 319.14893617021278, comp = abs, tol = 1e-10);
}

#[test]
fn quarter_turn_swaps_in_plane_diagonal() {
    let unrotated = laminate_tensor(&[reference_ply()]);
    let rotated = laminate_tensor(&[Ply {
        phi: FRAC_PI_2,
        ..reference_ply()
    }]);

    // cos^2(90 deg) = 0, sin^2(90 deg) = 1: the (0,0) and (1,1) entries swap,
    // the symmetric couplings stay in place
    assert_scalar_eq!(rotated[(0, 0)], unrotated[(1, 1)], comp = abs, tol = 1e-10);
    assert_scalar_eq!(rotated[(1, 1)], unrotated[(0, 0)], comp = abs, tol = 1e-10);
    assert_scalar_eq!(rotated[(0, 1)], unrotated[(0, 1)], comp = abs, tol = 1e-10);
    assert_scalar_eq!(rotated[(2, 2)], unrotated[(2, 2)], comp = abs, tol = 1e-10);
}

#[test]
fn half_turn_leaves_rotated_stiffness_unchanged() {
    for phi in [0.0, 0.3, 1.1, FRAC_PI_2] {
        let a = laminate_tensor(&[Ply { phi, ..reference_ply() }]);
        let b = laminate_tensor(&[Ply {
            phi: phi + PI,
            ..reference_ply()
        }]);
        for i in 0..3 {
            for k in 0..3 {
                assert_scalar_eq!(a[(i, k)], b[(i, k)], comp = abs, tol = 1e-9);
            }
        }
    }
}

#[test]
fn multi_ply_membrane_stiffness_accumulates() {
    let ply = reference_ply();
    let single = laminate_tensor(&[ply]);
    let double = laminate_tensor(&[ply, ply]);
    for i in 0..3 {
        for k in 0..3 {
            assert_scalar_eq!(double[(i, k)], 2.0 * single[(i, k)], comp = abs, tol = 1e-10);
        }
    }
}

#[test]
fn laminate_response_is_uniform_over_the_domain() {
    let laminate = LaminateMaterialMatrix::from_plies(&[reference_ply()]);
    let points = DMatrix::from_fn(2, 5, |i, j| 0.1 * (i + j) as f64);
    let values = laminate.eval(&points).unwrap();
    for j in 1..5 {
        assert_eq!(values.column(j), values.column(0));
    }
}

#[test]
#[should_panic]
fn broken_elastic_symmetry_aborts() {
    // nu21 * E1 = 63 while nu12 * E2 = 60
    let laminate = LaminateMaterialMatrix::from_plies(&[Ply {
        nu21: 0.21,
        ..reference_ply()
    }]);
    let points = DMatrix::from_column_slice(2, 1, &[0.0, 0.0]);
    let _ = laminate.eval(&points);
}

#[test]
#[should_panic]
fn empty_laminate_aborts() {
    let laminate = LaminateMaterialMatrix::<f64>::new(vec![], vec![], vec![], vec![], vec![]);
    let points = DMatrix::from_column_slice(2, 1, &[0.0, 0.0]);
    let _ = laminate.eval(&points);
}

#[test]
#[should_panic]
fn mismatched_ply_sequences_abort() {
    let laminate = LaminateMaterialMatrix::new(
        vec![(300.0, 200.0)],
        vec![100.0, 100.0],
        vec![(0.3, 0.2)],
        vec![0.1],
        vec![0.0],
    );
    let points = DMatrix::from_column_slice(2, 1, &[0.0, 0.0]);
    let _ = laminate.eval(&points);
}
