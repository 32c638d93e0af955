//! Level-1 linear algebra primitives.
//!
//! Plain loops over equal-length slices. Summation order is element order,
//! which keeps results bit-reproducible across calls.

/// Scaled accumulate: `y += alpha * x`.
///
/// # Panics
/// Panics if `x` and `y` have different lengths.
#[inline]
pub fn saxpy(alpha: f32, x: &[f32], y: &mut [f32]) {
    assert_eq!(x.len(), y.len(), "Vectors must have same dimension");
    for (yi, &xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// Scale in place: `x = alpha * x`.
#[inline]
pub fn sscal(alpha: f32, x: &mut [f32]) {
    for xi in x.iter_mut() {
        *xi *= alpha;
    }
}
