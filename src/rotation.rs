//! Rotation models for bodies with a spin axis.
//!
//! A model splits a body's attitude into a slowly moving part, the mean
//! equator, and a fast part, the daily spin with an optional small wobble
//! of the axis. Frames use the two parts separately: the mean equator
//! frame ignores the spin, the body-fixed frame includes it.

use core::f64::consts::TAU;

use glam::DQuat;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{OrbitError, Result};

/// Describes how a body turns.
///
/// All rotations here are expressed relative to the ecliptic frame. Angles
/// are in radians, periods in days and the epoch is a Modified Julian Date.
///
/// # Example
/// ```
/// use orbit_frames::{presets, MJD_J2000};
///
/// let earth = presets::earth_rotation();
/// let half_day = earth.sidereal_period * 0.5;
///
/// let angle = earth.rotation_angle(MJD_J2000 + half_day) - earth.rotation_angle(MJD_J2000);
/// let angle = angle.rem_euclid(core::f64::consts::TAU);
/// assert!((angle - core::f64::consts::PI).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RotationModel {
    /// Time for one turn relative to the stars, in days. Negative for
    /// retrograde rotation. Must be finite and non-zero; see
    /// [`check`][Self::check].
    pub sidereal_period: f64,
    /// Rotation angle of the prime meridian at `epoch`, measured from the
    /// equator's ascending node on the ecliptic.
    pub rotation_offset: f64,
    /// Reference time for the rotation angle and the precession.
    pub epoch: f64,
    /// Tilt of the mean equator against the ecliptic.
    pub obliquity: f64,
    /// Ecliptic longitude of the equator's ascending node at `epoch`.
    pub ascending_node: f64,
    /// Period of the node's precession, in days. Zero disables precession.
    pub precession_period: f64,
    /// Peak tilt of the axis wobble.
    pub wobble_amplitude: f64,
    /// Period of the axis wobble, in days. Zero disables the wobble.
    pub wobble_period: f64,
}

impl RotationModel {
    /// A uniform rotation without precession or wobble.
    pub fn uniform(
        sidereal_period: f64,
        rotation_offset: f64,
        epoch: f64,
        obliquity: f64,
        ascending_node: f64,
    ) -> Self {
        Self {
            sidereal_period,
            rotation_offset,
            epoch,
            obliquity,
            ascending_node,
            precession_period: 0.0,
            wobble_amplitude: 0.0,
            wobble_period: 0.0,
        }
    }

    /// Checks that the model produces finite angles.
    ///
    /// The registry runs this when an object is added, and body frames run
    /// it before using a model.
    ///
    /// # Errors
    /// [`OrbitError::InvalidRotation`] for a zero or non-finite sidereal
    /// period.
    pub fn check(&self) -> Result<()> {
        if self.sidereal_period.is_finite() && self.sidereal_period != 0.0 {
            Ok(())
        } else {
            Err(OrbitError::InvalidRotation(self.sidereal_period))
        }
    }

    /// The equator's ascending node at `mjd`, including precession.
    pub fn node_longitude(&self, mjd: f64) -> f64 {
        if self.precession_period == 0.0 {
            self.ascending_node
        } else {
            self.ascending_node + TAU * (mjd - self.epoch) / self.precession_period
        }
    }

    /// The prime meridian's angle from the node at `mjd`, in [0, 2π).
    pub fn rotation_angle(&self, mjd: f64) -> f64 {
        (self.rotation_offset + TAU * (mjd - self.epoch) / self.sidereal_period).rem_euclid(TAU)
    }

    /// Orientation of the mean equator relative to the ecliptic.
    ///
    /// The x axis points to the equator's ascending node and z along the
    /// mean spin axis.
    pub fn mean_equator(&self, mjd: f64) -> DQuat {
        DQuat::from_rotation_z(self.node_longitude(mjd)) * DQuat::from_rotation_x(self.obliquity)
    }

    /// Spin about the mean axis at `mjd`.
    pub fn spin(&self, mjd: f64) -> DQuat {
        DQuat::from_rotation_z(self.rotation_angle(mjd))
    }

    /// Small periodic tilt of the axis about the node line.
    pub fn wobble(&self, mjd: f64) -> DQuat {
        if self.wobble_period == 0.0 || self.wobble_amplitude == 0.0 {
            return DQuat::IDENTITY;
        }
        let phase = TAU * (mjd - self.epoch) / self.wobble_period;
        DQuat::from_rotation_x(self.wobble_amplitude * phase.sin())
    }

    /// Orientation of the body-fixed frame relative to the mean equator.
    pub fn body_fixed(&self, mjd: f64) -> DQuat {
        self.wobble(mjd) * self.spin(mjd)
    }
}
