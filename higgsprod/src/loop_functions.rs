//! One-loop form factors of the scalar coupling to two gluons.
//!
//! The argument is `τ = 4 m_q² / m_H²`. Below the quark pair threshold
//! (`τ ≥ 1`) the function is real; above it (`τ < 1`) it picks up the
//! absorptive `−iπ` part.

use crate::constants::PI;
use num::Complex;

/// The scalar integral `f(τ)`.
pub fn f_tau(tau: f64) -> Complex<f64> {
    debug_assert!(tau > 0.);
    if tau < 1. {
        let beta = (1. - tau).sqrt();
        let arg = Complex::new(((1. + beta) / (1. - beta)).ln(), -PI);
        return -0.25 * arg * arg;
    }
    let arg = (1. / tau.sqrt()).asin();
    Complex::new(arg * arg, 0.)
}

/// Spin-½ triangle amplitude `τ [1 + (1 − τ) f(τ)]`.
///
/// Tends to `2/3` in the heavy-quark limit.
pub fn f_triangle(tau: f64) -> Complex<f64> {
    tau * (Complex::new(1., 0.) + (1. - tau) * f_tau(tau))
}
