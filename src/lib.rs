//! # Orbital propagation and reference frames
//! This library crate is the orbit and frame core of a space-flight
//! simulator. Everything the renderer, camera and instrument panels need to
//! know about *where* things are goes through it.
//!
//! The crate is organised leaves first:
//! - [`series`]: evaluation of VSOP87-style trigonometric series, which give
//!   planetary positions as polynomials in time with periodic coefficients.
//! - [`OrbitalElements`]: a classical Keplerian element set. It propagates
//!   the elements forward with Kepler's equation and derives osculating
//!   elements back from a position and velocity.
//! - [`CachingOrbit`]: wraps any [`PositionSource`] with a single-slot cache
//!   keyed on time, so that several callers asking for the same instant in
//!   one simulation tick only pay for one evaluation.
//! - [`Frame`]: a tree of coordinate frames (ecliptic, equatorial, body
//!   mean equator, body-fixed and object-synchronous) that convert between
//!   local coordinates and the universal frame.
//! - [`PlayerFrame`]: picks a concrete frame for the camera from a
//!   [`CoordType`] and a center/target object pair.
//!
//! ## Units
//! Time is a Modified Julian Date everywhere. Lengths are metres and
//! velocities are metres per second. Series tables are evaluated in their
//! own units (AU, Julian millennia) and converted at the boundary.
//!
//! ## Example
//!
//! ```rust
//! use orbit_frames::{OrbitalElements, MJD_J2000, AU};
//!
//! # fn main() -> Result<(), orbit_frames::OrbitError> {
//! let mut earth = OrbitalElements::new(
//!     AU,
//!     0.0167,
//!     0.0,
//!     0.0,
//!     114.2f64.to_radians(),
//!     100.5f64.to_radians(),
//!     MJD_J2000,
//! );
//! earth.setup(5.972e24, 1.989e30, MJD_J2000)?;
//!
//! let r = earth.get_position_at_time(MJD_J2000 + 100.0)?.length();
//! assert!(r >= earth.get_periapsis() && r <= earth.get_apoapsis());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod caching_orbit;
mod config;
mod elements;
mod error;
pub mod frame;
pub mod object;
pub mod player_frame;
pub mod presets;
pub mod rotation;
pub mod series;
mod solvers;

use glam::{DVec2, DVec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use caching_orbit::{
    CachingOrbit, KeplerOrbit, Orbit, OrbitCache, PositionSource, Vsop87Orbit,
};
pub use config::PropagationConfig;
pub use elements::{ElementsMode, OrbitalElements};
pub use error::{OrbitError, Result};
pub use frame::{Frame, FrameHandle, FrameKind, ObjectStates};
pub use object::{CelestialObject, ObjectId, ObjectRegistry, Trajectory};
pub use player_frame::{CoordType, PlayerFrame};
pub use rotation::RotationModel;

/// A constant used to get the initial seed for the eccentric anomaly.
///
/// It's very arbitrary, but according to some testing, a value just
/// below 1 works better than exactly 1.
///
/// Source:
/// "Two fast and accurate routines for solving the elliptic Kepler
/// equation for all values of the eccentricity and mean anomaly"
/// by Daniele Tommasini and David N. Olivieri,
/// section 2.1.2, 'The "rational seed"'
///
/// <https://doi.org/10.1051/0004-6361/202141423>
const B: f64 = 0.999999;

/// The maximum number of iterations for the numerical approach algorithms.
///
/// This is used to prevent infinite loops in case the method fails to converge.
pub const NUMERIC_MAX_ITERS: u32 = 1000;

const PI_SQUARED: f64 = core::f64::consts::PI * core::f64::consts::PI;

/// The gravitational constant, in m^3 kg^-1 s^-2.
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

/// The astronomical unit, in metres.
pub const AU: f64 = 149_597_870_700.0;

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// The J2000.0 epoch (2000-01-01 12:00 TT) as a Modified Julian Date.
pub const MJD_J2000: f64 = 51_544.5;

/// Offset between Julian Day and Modified Julian Date.
pub const MJD_OFFSET: f64 = 2_400_000.5;

/// Mean obliquity of the ecliptic at J2000.0 (23.4392911 degrees), in radians.
pub const J2000_OBLIQUITY: f64 = 0.409_092_804_222_328_7;

/// Eccentricities this close to 1 are treated as parabolic.
pub const PARABOLIC_TOLERANCE: f64 = 1e-10;

/// A struct representing a 3x2 matrix.
///
/// This struct is used to store the transformation matrix
/// for transforming a 2D vector into a 3D vector.
///
/// Namely, it is used to tilt a position in the orbital plane
/// (perifocal coordinates) into the reference frame, using the
/// orbital elements.
///
/// Each element is named `eXY`, where `X` is the row and `Y` is the column.
///
/// # Example
/// ```
/// use glam::{DVec2, DVec3};
///
/// use orbit_frames::Matrix3x2;
///
/// let matrix = Matrix3x2 {
///    e11: 1.0, e12: 0.0,
///    e21: 0.0, e22: 1.0,
///    e31: 0.0, e32: 0.0,
/// };
///
/// let vec = DVec2::new(1.0, 2.0);
///
/// let result = matrix.dot_vec(vec);
///
/// assert_eq!(result, DVec3::new(1.0, 2.0, 0.0));
/// ```
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix3x2 {
    // Element XY
    pub e11: f64,
    pub e12: f64,
    pub e21: f64,
    pub e22: f64,
    pub e31: f64,
    pub e32: f64,
}

impl Matrix3x2 {
    /// The identity-like matrix that maps (x, y) to (x, y, 0).
    pub const IDENTITY: Self = Self {
        e11: 1.0,
        e12: 0.0,
        e21: 0.0,
        e22: 1.0,
        e31: 0.0,
        e32: 0.0,
    };

    /// Builds the perifocal-to-reference rotation for the given angles.
    ///
    /// This is the 3-1-3 composition `Rz(lan) * Rx(inc) * Rz(arg_pe)`,
    /// truncated to the two columns that in-plane vectors need.
    pub fn from_orbit_angles(inclination: f64, arg_pe: f64, long_asc_node: f64) -> Self {
        let (sin_inc, cos_inc) = inclination.sin_cos();
        let (sin_arg_pe, cos_arg_pe) = arg_pe.sin_cos();
        let (sin_lan, cos_lan) = long_asc_node.sin_cos();

        // https://downloads.rene-schwarz.com/download/M001-Keplerian_Orbit_Elements_to_Cartesian_State_Vectors.pdf
        Self {
            e11: cos_arg_pe * cos_lan - sin_arg_pe * cos_inc * sin_lan,
            e12: -(sin_arg_pe * cos_lan + cos_arg_pe * cos_inc * sin_lan),
            e21: cos_arg_pe * sin_lan + sin_arg_pe * cos_inc * cos_lan,
            e22: cos_arg_pe * cos_inc * cos_lan - sin_arg_pe * sin_lan,
            e31: sin_arg_pe * sin_inc,
            e32: cos_arg_pe * sin_inc,
        }
    }

    /// Computes a dot product between this matrix and a 2D vector.
    ///
    /// # Example
    /// ```
    /// use glam::{DVec2, DVec3};
    ///
    /// use orbit_frames::Matrix3x2;
    ///
    /// let matrix = Matrix3x2 {
    ///     e11: 1.0, e12: 0.0,
    ///     e21: 0.0, e22: 1.0,
    ///     e31: 1.0, e32: 1.0,
    /// };
    ///
    /// let vec = DVec2::new(1.0, 2.0);
    ///
    /// let result = matrix.dot_vec(vec);
    ///
    /// assert_eq!(result, DVec3::new(1.0, 2.0, 3.0));
    /// ```
    pub fn dot_vec(&self, vec: DVec2) -> DVec3 {
        DVec3::new(
            vec.x * self.e11 + vec.y * self.e12,
            vec.x * self.e21 + vec.y * self.e22,
            vec.x * self.e31 + vec.y * self.e32,
        )
    }
}

/// A struct representing a position and velocity at a point in the orbit.
///
/// The position vector is in metres, while the velocity vector is in
/// metres per second.
///
/// State vectors can be turned back into orbital elements, see
/// [`OrbitalElements::calculate`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateVectors {
    /// The 3D position at a point in the orbit, in metres.
    pub position: DVec3,
    /// The 3D velocity at a point in the orbit, in metres per second.
    pub velocity: DVec3,
}

/// Converts a Modified Julian Date to a Julian Day.
#[inline]
pub fn mjd_to_jd(mjd: f64) -> f64 {
    mjd + MJD_OFFSET
}

/// Converts a Julian Day to a Modified Julian Date.
#[inline]
pub fn jd_to_mjd(jd: f64) -> f64 {
    jd - MJD_OFFSET
}

#[cfg(test)]
mod tests;

#[inline]
fn keplers_equation(mean_anomaly: f64, eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - (eccentricity * eccentric_anomaly.sin()) - mean_anomaly
}
#[inline]
fn keplers_equation_derivative(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    1.0 - (eccentricity * eccentric_anomaly.cos())
}

/// Get the hyperbolic sine and cosine of a number.
///
/// Usually faster than calling `x.sinh()` and `x.cosh()` separately.
///
/// Returns a tuple which contains:
/// - 0: The hyperbolic sine of the number.
/// - 1: The hyperbolic cosine of the number.
pub fn sinhcosh(x: f64) -> (f64, f64) {
    let e_x = x.exp();
    let e_neg_x = (-x).exp();

    ((e_x - e_neg_x) * 0.5, (e_x + e_neg_x) * 0.5)
}
