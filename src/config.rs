//! Tunable numeric parameters for the propagation core.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{GRAVITATIONAL_CONSTANT, NUMERIC_MAX_ITERS};

/// Numeric settings shared by the elements engine and the cached orbits.
///
/// The defaults are suitable for solar-system scale orbits expressed in
/// metres and Modified Julian Dates. Hosts that load their settings from a
/// file can deserialize this struct with the `serde` feature.
///
/// # Example
/// ```
/// use orbit_frames::{OrbitalElements, PropagationConfig};
///
/// let config = PropagationConfig {
///     kepler_tolerance: 1e-10,
///     ..PropagationConfig::default()
/// };
///
/// let elements = OrbitalElements::default().with_config(config);
/// assert_eq!(elements.config().kepler_tolerance, 1e-10);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PropagationConfig {
    /// The gravitational constant, in m^3 kg^-1 s^-2.
    pub gravitational_constant: f64,

    /// Stop iterating Kepler's equation once successive eccentric
    /// anomalies differ by less than this, in radians.
    pub kepler_tolerance: f64,

    /// Hard cap on Kepler solver iterations.
    pub kepler_max_iterations: u32,

    /// Half-width of the symmetric finite difference used to derive
    /// velocities from positions, in days.
    pub velocity_step_days: f64,

    /// Magnitudes below this are treated as zero when deciding whether
    /// the node line or the periapsis direction is defined.
    pub degenerate_epsilon: f64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: GRAVITATIONAL_CONSTANT,
            kepler_tolerance: 1e-12,
            kepler_max_iterations: NUMERIC_MAX_ITERS,
            velocity_step_days: 1.0 / 1440.0,
            degenerate_epsilon: 1e-11,
        }
    }
}
