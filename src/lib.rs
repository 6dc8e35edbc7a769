//! Constitutive matrices and through-thickness integration for shell mechanics.
//!
//! `lamella` provides the material-matrix side of an isogeometric shell analysis:
//! composable [`Field`](field::Field) adapters that reduce a field's domain by one
//! dimension through quadrature along a synthetic thickness axis, and point-wise
//! evaluators for isotropic and laminated (composite) plane-stress stiffness tensors.
//!
//! The parametric geometry representation, basis machinery and global assembly are
//! external collaborators, consumed through the narrow interfaces in [`geometry`]
//! and [`field`].
use nalgebra::RealField;

pub mod field;
pub mod geometry;
pub mod integrate;
pub mod materials;
pub mod quadrature;

pub extern crate nalgebra;

/// A scalar type usable in all `lamella` routines.
///
/// Used as a trait alias so that generic code does not need to repeat the
/// `RealField + Copy` bound everywhere.
pub trait Real: RealField + Copy {}

impl<T> Real for T where T: RealField + Copy {}
