//! Error types for orbit propagation and frame construction.

use thiserror::Error;

use crate::object::ObjectId;

/// Errors surfaced to the owning body or camera setup code.
///
/// Numerical trouble inside the solvers is never reported here; it is
/// recovered locally. These variants are all contract or configuration
/// violations that should halt further work on the object involved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitError {
    /// A mu-dependent quantity was requested before `setup`/`configure`.
    #[error("orbital elements queried before setup: masses and gravitational parameter unknown")]
    NotConfigured,

    /// The masses given to `setup` do not produce a positive gravitational parameter.
    #[error("invalid masses: orbiting {mass} kg, primary {primary_mass} kg")]
    InvalidMass {
        /// The orbiting mass, in kg.
        mass: f64,
        /// The primary's mass, in kg.
        primary_mass: f64,
    },

    /// The semi-major axis and eccentricity do not describe a conic.
    ///
    /// Closed orbits need `a > 0` and `0 <= e < 1`, parabolas keep the
    /// periapsis distance in `a > 0`, and hyperbolas need `a < 0`.
    #[error("invalid orbital elements: semi-major axis {semi_major_axis} m with eccentricity {eccentricity}")]
    InvalidElements {
        /// The semi-major axis, in metres.
        semi_major_axis: f64,
        /// The eccentricity.
        eccentricity: f64,
    },

    /// A rotation model with a zero or non-finite sidereal period.
    #[error("invalid sidereal period: {0} days")]
    InvalidRotation(f64),

    /// The state vectors cannot describe a two-body orbit.
    #[error("degenerate state vectors: {0}")]
    DegenerateState(&'static str),

    /// A frame type that needs a center object was requested without one.
    #[error("coordinate system '{0}' requires a center object")]
    MissingCenter(&'static str),

    /// A frame type that needs a target object was requested without one.
    #[error("coordinate system '{0}' requires a target object")]
    MissingTarget(&'static str),

    /// A body-relative frame was requested for an object without a rotation model.
    #[error("object {0:?} has no rotation model")]
    NoRotationModel(ObjectId),

    /// The object referenced by a frame or trajectory no longer exists.
    #[error("object {0:?} has been destroyed")]
    ObjectDestroyed(ObjectId),

    /// A body was added as a satellite of an object that does not exist.
    #[error("there was no object with id {0:?} to orbit")]
    ParentNotFound(ObjectId),

    /// Reparenting would make an object orbit one of its own satellites.
    #[error("object {object:?} cannot orbit {parent:?}, which is one of its satellites")]
    ParentCycle {
        /// The object being moved.
        object: ObjectId,
        /// The requested parent.
        parent: ObjectId,
    },
}

/// Result type for orbit and frame operations.
pub type Result<T> = core::result::Result<T, OrbitError>;
