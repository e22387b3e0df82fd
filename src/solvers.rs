use crate::{
    keplers_equation, keplers_equation_derivative, sinhcosh, B, PI_SQUARED,
};
use core::f64::consts::{PI, TAU};

/// Number of bisection halvings that take any bracket used here below
/// double precision resolution.
const BISECTION_ITERS: u32 = 200;

/// Finds the root of a monotonically increasing function inside `[lo, hi]`.
///
/// Newton steps are taken from `guess` while they stay inside the bracket;
/// a step that would leave it is replaced by a bisection step. The bracket
/// shrinks on every iteration, so this terminates even when Newton's method
/// alone would oscillate (the near-parabolic regime).
///
/// Returns the root and whether the step size dropped below `tolerance`
/// before `max_iters` ran out.
fn safeguarded_newton(
    f: impl Fn(f64) -> f64,
    fp: impl Fn(f64) -> f64,
    mut lo: f64,
    mut hi: f64,
    guess: f64,
    tolerance: f64,
    max_iters: u32,
) -> (f64, bool) {
    let mut x = guess.clamp(lo, hi);

    for _ in 0..max_iters {
        let fx = f(x);
        if fx == 0.0 {
            return (x, true);
        }
        if fx < 0.0 {
            lo = x;
        } else {
            hi = x;
        }

        let slope = fp(x);
        let newton = x - fx / slope;
        let next = if slope > 0.0 && newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        let delta = (next - x).abs();
        x = next;

        if delta < tolerance || hi - lo < tolerance {
            return (x, true);
        }
    }

    (x, false)
}

/// Plain bisection, used once the Newton iteration budget is exhausted.
fn bisect(f: impl Fn(f64) -> f64, mut lo: f64, mut hi: f64) -> f64 {
    for _ in 0..BISECTION_ITERS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if f(mid) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Gets the elliptic eccentric anomaly for a mean anomaly.
///
/// The result lies in [0, 2π).
///
/// # Unchecked Operation
/// This function does not check whether the orbit is actually elliptic (e < 1).
///
/// # Source
/// Starting guess from "Two fast and accurate routines for solving the
/// elliptic Kepler equation for all values of the eccentricity and mean
/// anomaly" by Daniele Tommasini and David N. Olivieri, section 2.1.2,
/// 'The "rational seed"'. <https://doi.org/10.1051/0004-6361/202141423>
pub(crate) fn get_elliptic_eccentric_anomaly(
    eccentricity: f64,
    mut mean_anomaly: f64,
    tolerance: f64,
    max_iters: u32,
) -> f64 {
    // Use the symmetry and periodicity of the eccentric anomaly
    // (equation 2 of the same paper) to solve on [0, pi] only.
    let mut sign = 1.0;
    mean_anomaly = mean_anomaly.rem_euclid(TAU);
    if mean_anomaly > PI {
        mean_anomaly -= TAU;
    }
    if mean_anomaly < 0.0 {
        mean_anomaly = -mean_anomaly;
        sign = -1.0;
    }

    // E_0 = M + (4beM(pi - M)) / (8eM + 4e(e-pi) + pi^2)
    let seed = mean_anomaly
        + (4.0 * eccentricity * B * mean_anomaly * (PI - mean_anomaly))
            / (8.0 * eccentricity * mean_anomaly
                + 4.0 * eccentricity * (eccentricity - PI)
                + PI_SQUARED);

    let f = |ea: f64| keplers_equation(mean_anomaly, ea, eccentricity);
    let fp = |ea: f64| keplers_equation_derivative(ea, eccentricity);

    let (mut eccentric_anomaly, converged) =
        safeguarded_newton(f, fp, 0.0, PI, seed, tolerance, max_iters);

    if !converged {
        log::warn!(
            "elliptic Kepler solver hit {max_iters} iterations (e = {eccentricity}, M = {mean_anomaly}); \
            falling back to bisection"
        );
        eccentric_anomaly = bisect(f, 0.0, PI);
    }

    // rem_euclid of a tiny negative value rounds up to TAU itself
    let eccentric_anomaly = (eccentric_anomaly * sign).rem_euclid(TAU);
    if eccentric_anomaly < TAU {
        eccentric_anomaly
    } else {
        0.0
    }
}

/// Gets the hyperbolic eccentric anomaly for a mean anomaly.
///
/// Solves `e sinh(H) - H = M`. The result has the sign of `M` and is not
/// bounded.
///
/// # Unchecked Operation
/// This function does not check whether the orbit is actually hyperbolic (e > 1).
///
/// # Bracket
/// Since `sinh(H) >= H` for `H >= 0`, `e sinh(H) - H >= (e - 1) sinh(H)`,
/// so the root for a positive mean anomaly is below `asinh(M / (e - 1))`.
pub(crate) fn get_hyperbolic_eccentric_anomaly(
    eccentricity: f64,
    mean_anomaly: f64,
    tolerance: f64,
    max_iters: u32,
) -> f64 {
    let sign = if mean_anomaly < 0.0 { -1.0 } else { 1.0 };
    let mean_anomaly = mean_anomaly.abs();

    if mean_anomaly == 0.0 {
        return 0.0;
    }

    let upper = (mean_anomaly / (eccentricity - 1.0)).asinh();
    // Danby's starting value
    let seed = (2.0 * mean_anomaly / eccentricity + 1.8).ln();

    let f = |h: f64| eccentricity * sinhcosh(h).0 - h - mean_anomaly;
    let fp = |h: f64| eccentricity * sinhcosh(h).1 - 1.0;

    let (mut ecc_anom, converged) =
        safeguarded_newton(f, fp, 0.0, upper, seed, tolerance, max_iters);

    if !converged {
        log::warn!(
            "hyperbolic Kepler solver hit {max_iters} iterations (e = {eccentricity}, M = {mean_anomaly}); \
            falling back to bisection"
        );
        ecc_anom = bisect(f, 0.0, upper);
    }

    ecc_anom * sign
}

/// Solves Barker's equation `D + D^3 / 3 = M` for `D = tan(nu / 2)`.
///
/// This is the parabolic counterpart of Kepler's equation and has a
/// closed-form solution:
///
/// ```text
/// W = 3M / 2
/// Y = cbrt(W + sqrt(W^2 + 1))
/// D = Y - 1 / Y
/// ```
pub(crate) fn get_parabolic_anomaly(mean_anomaly: f64) -> f64 {
    let w = 1.5 * mean_anomaly;
    let y = (w + (w * w + 1.0).sqrt()).cbrt();
    y - y.recip()
}
