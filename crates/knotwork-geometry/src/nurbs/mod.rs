//! NURBS core algorithms: knot vectors, basis functions, evaluation, and knot insertion.

pub mod basis;
pub mod deboor;
pub mod insert;
pub mod knot;

use std::ops::{Add, Mul};

pub use basis::{
    basis_function_derivatives, basis_functions, clamp_param, find_span, find_span_binsearch,
    find_span_linear, FindSpanFn,
};
pub use deboor::SpanBasis;
pub use insert::Homogeneous;

/// Values that basis functions can blend: control points, weights, and
/// homogeneous points.
pub trait Blend: Copy + Add<Output = Self> + Mul<f64, Output = Self> {}

impl<T: Copy + Add<Output = T> + Mul<f64, Output = T>> Blend for T {}
