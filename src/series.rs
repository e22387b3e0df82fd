//! VSOP87-style analytic series.
//!
//! A VSOP87 coordinate is a polynomial in time whose coefficients are
//! themselves sums of cosine terms:
//!
//! ```text
//! value(t) = S_0(t) + t S_1(t) + t^2 S_2(t) + ...
//! S_k(t)   = sum_i a_i cos(b_i + c_i t)
//! ```
//!
//! Each `S_k` is a *term group*. The tables are static and evaluation is
//! pure, so a series can be shared freely between orbits.
//!
//! Positions leave this module referred to the ecliptic and equinox of
//! J2000, whatever the tables themselves use.

pub mod earth;

use glam::{DQuat, DVec3};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{AU, MJD_J2000};

/// Days in a Julian century.
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

/// Days in a Julian millennium, the VSOP87 time unit.
pub const DAYS_PER_JULIAN_MILLENNIUM: f64 = 365_250.0;

/// One periodic term, contributing `amplitude * cos(phase + frequency * t)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SeriesTerm {
    /// Amplitude `a`, in the unit of the coordinate.
    pub amplitude: f64,
    /// Phase `b`, in radians.
    pub phase: f64,
    /// Frequency `c`, in radians per time unit.
    pub frequency: f64,
}

impl SeriesTerm {
    /// Creates a term from the `(a, b, c)` triple as printed in the tables.
    pub const fn new(amplitude: f64, phase: f64, frequency: f64) -> Self {
        Self {
            amplitude,
            phase,
            frequency,
        }
    }

    /// The contribution of this term at time `t`.
    #[inline]
    pub fn value(&self, t: f64) -> f64 {
        self.amplitude * (self.phase + self.frequency * t).cos()
    }
}

/// Sums one term group at time `t`.
#[inline]
pub fn evaluate_group(terms: &[SeriesTerm], t: f64) -> f64 {
    terms.iter().map(|term| term.value(t)).sum()
}

/// Evaluates a full series at time `t`.
///
/// `groups[k]` holds the terms multiplying `t^k`. Each group is summed
/// first, then the group sums are accumulated from the lowest power up,
/// which keeps the large constant terms from swamping the small secular
/// corrections. Empty groups contribute zero.
///
/// # Example
/// ```
/// use orbit_frames::series::{evaluate_series, SeriesTerm};
///
/// // 2 + t * (0.5 cos(0))
/// let constant = [SeriesTerm::new(2.0, 0.0, 0.0)];
/// let linear = [SeriesTerm::new(0.5, 0.0, 0.0)];
///
/// let value = evaluate_series(&[&constant, &linear], 4.0);
/// assert_eq!(value, 4.0);
/// ```
pub fn evaluate_series(groups: &[&[SeriesTerm]], t: f64) -> f64 {
    let mut value = 0.0;
    let mut t_power = 1.0;

    for group in groups {
        value += t_power * evaluate_group(group, t);
        t_power *= t;
    }

    value
}

/// How the three coordinate series of a [`Vsop87Series`] are to be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum SeriesCoordinates {
    /// Heliocentric ecliptic longitude and latitude in radians and the
    /// radius vector in AU (VSOP87 versions B and D).
    Spherical,
    /// Heliocentric rectangular X, Y, Z in AU (VSOP87 versions A and C).
    Rectangular,
}

/// The ecliptic and equinox a series' raw coordinates are referred to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum SeriesEquinox {
    /// Fixed ecliptic and equinox of J2000.0 (VSOP87 versions A and B).
    J2000,
    /// Mean ecliptic and equinox of date (VSOP87 versions C and D).
    OfDate,
}

/// A complete set of series for one body.
///
/// # Example
/// ```
/// use orbit_frames::series::{earth::EARTH, julian_millennia};
/// use orbit_frames::{AU, MJD_J2000};
///
/// let position = EARTH.position(MJD_J2000);
/// let distance = position.length() / AU;
/// assert!(distance > 0.98 && distance < 1.02);
/// assert_eq!(julian_millennia(MJD_J2000), 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Vsop87Series {
    /// The body these series describe.
    pub name: &'static str,
    /// The interpretation of the three coordinates.
    pub coordinates: SeriesCoordinates,
    /// The reference the three coordinates are measured in.
    pub equinox: SeriesEquinox,
    /// Term groups for longitude or X.
    pub first: &'static [&'static [SeriesTerm]],
    /// Term groups for latitude or Y.
    pub second: &'static [&'static [SeriesTerm]],
    /// Term groups for radius or Z.
    pub third: &'static [&'static [SeriesTerm]],
    /// Largest heliocentric distance reached, in AU.
    pub bounding_radius_au: f64,
    /// Sidereal period, in days.
    pub period_days: f64,
}

impl Vsop87Series {
    /// Evaluates the three raw coordinates at `t` Julian millennia from J2000.
    pub fn coordinates_at(&self, t: f64) -> DVec3 {
        DVec3::new(
            evaluate_series(self.first, t),
            evaluate_series(self.second, t),
            evaluate_series(self.third, t),
        )
    }

    /// Heliocentric position in AU at `t` Julian millennia from J2000,
    /// referred to the ecliptic and equinox of J2000.
    pub fn position_au(&self, t: f64) -> DVec3 {
        let raw = self.coordinates_at(t);
        let position = match self.coordinates {
            SeriesCoordinates::Rectangular => raw,
            SeriesCoordinates::Spherical => {
                let (longitude, latitude, radius) = (raw.x, raw.y, raw.z);
                let (sin_lon, cos_lon) = longitude.sin_cos();
                let (sin_lat, cos_lat) = latitude.sin_cos();
                DVec3::new(
                    radius * cos_lat * cos_lon,
                    radius * cos_lat * sin_lon,
                    radius * sin_lat,
                )
            }
        };

        match self.equinox {
            SeriesEquinox::J2000 => position,
            SeriesEquinox::OfDate => {
                precession_to_j2000(MJD_J2000 + t * DAYS_PER_JULIAN_MILLENNIUM) * position
            }
        }
    }

    /// Heliocentric position in metres at a Modified Julian Date, referred
    /// to the ecliptic and equinox of J2000.
    pub fn position(&self, mjd: f64) -> DVec3 {
        self.position_au(julian_millennia(mjd)) * AU
    }
}

/// Rotation taking ecliptic coordinates referred to the mean ecliptic and
/// equinox of date to the ecliptic and equinox of J2000.0.
///
/// Uses the IAU 1976 precession angles between two ecliptics: `η` is the
/// tilt between them, `Π` the longitude of its axis and `p` the general
/// precession in longitude. The reduction from ecliptic A to ecliptic B is
/// `Rz(p + Π) Rx(-η) Rz(-Π)`.
///
/// # Reference
/// Meeus, *Astronomical Algorithms*, 2nd ed., formula 21.5.
pub fn precession_to_j2000(mjd: f64) -> DQuat {
    // Start at the date (big_t) and go back to J2000 (t).
    let big_t = julian_centuries(mjd);
    let t = -big_t;
    let arcsec = |value: f64| (value / 3600.0).to_radians();

    let eta = arcsec(
        (47.0029 - 0.06603 * big_t + 0.000598 * big_t * big_t) * t
            + (-0.03302 + 0.000598 * big_t) * t * t
            + 0.000060 * t * t * t,
    );
    let node = 174.876_384_f64.to_radians()
        + arcsec(
            3289.4789 * big_t + 0.60622 * big_t * big_t - (869.8089 + 0.50491 * big_t) * t
                + 0.03536 * t * t,
        );
    let p = arcsec(
        (5029.0966 + 2.22226 * big_t - 0.000042 * big_t * big_t) * t
            + (1.11113 - 0.000042 * big_t) * t * t
            - 0.000006 * t * t * t,
    );

    DQuat::from_rotation_z(p + node) * DQuat::from_rotation_x(-eta) * DQuat::from_rotation_z(-node)
}

/// Julian centuries elapsed since J2000.0.
#[inline]
pub fn julian_centuries(mjd: f64) -> f64 {
    (mjd - MJD_J2000) / DAYS_PER_JULIAN_CENTURY
}

/// Julian millennia elapsed since J2000.0.
#[inline]
pub fn julian_millennia(mjd: f64) -> f64 {
    (mjd - MJD_J2000) / DAYS_PER_JULIAN_MILLENNIUM
}
