//! Coordinate reference frames.
//!
//! Every frame except the universal root has a parent and a local rotation
//! relative to it. The universal frame's axes are the J2000 ecliptic and
//! equinox; its origin is wherever the object registry puts its root.
//!
//! ```text
//! Universal
//! └── Ecliptic              (translated to the center)
//!     ├── Equatorial        (tilted by the J2000 obliquity)
//!     ├── BodyMeanEquator   (target's mean equator)
//!     │   └── BodyFixed     (target's spin)
//!     └── ObjectSync        (x axis toward the target)
//! ```
//!
//! A frame's absolute orientation is the product of the local rotations
//! down from the root, so `to_universal(p) = Q p + c` where `c` is the
//! center's universal position.

use core::{fmt, ops::Deref};
use std::rc::Rc;

use glam::{DMat3, DQuat, DVec3};

use crate::{ObjectId, OrbitError, Result, RotationModel, J2000_OBLIQUITY};

/// What frames need to know about the objects they refer to.
///
/// Positions and velocities are absolute, in the universal frame.
pub trait ObjectStates {
    /// The position of an object at `mjd`, in metres.
    fn position(&self, id: ObjectId, mjd: f64) -> Result<DVec3>;

    /// The velocity of an object at `mjd`, in m/s.
    fn velocity(&self, id: ObjectId, mjd: f64) -> Result<DVec3>;

    /// The rotation model of an object, if it has one.
    fn rotation(&self, id: ObjectId) -> Result<Option<RotationModel>>;

    /// The display name of an object.
    fn name(&self, id: ObjectId) -> Result<&str>;
}

/// The kinds of frame there are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// The root frame. No center, no rotation.
    Universal,
    /// Ecliptic J2000 axes, centred on an object.
    Ecliptic,
    /// Earth mean equator and equinox of J2000, centred on an object.
    Equatorial,
    /// The mean equator of the target body.
    BodyMeanEquator,
    /// Axes that turn with the target body.
    BodyFixed,
    /// The x axis points from the center to the target, z along their
    /// relative orbital angular momentum.
    ObjectSync,
}

impl FrameKind {
    /// A short human readable label.
    pub fn label(self) -> &'static str {
        match self {
            FrameKind::Universal => "universal",
            FrameKind::Ecliptic => "ecliptic",
            FrameKind::Equatorial => "equatorial",
            FrameKind::BodyMeanEquator => "body mean equator",
            FrameKind::BodyFixed => "body-fixed",
            FrameKind::ObjectSync => "object sync",
        }
    }

    /// Whether frames of this kind need a center object.
    pub fn needs_center(self) -> bool {
        self != FrameKind::Universal
    }

    /// Whether frames of this kind need a target object.
    pub fn needs_target(self) -> bool {
        matches!(
            self,
            FrameKind::BodyMeanEquator | FrameKind::BodyFixed | FrameKind::ObjectSync
        )
    }

    /// The kind of the parent frame the factory builds, if any.
    pub fn parent_kind(self) -> Option<FrameKind> {
        match self {
            FrameKind::Universal => None,
            FrameKind::Ecliptic => Some(FrameKind::Universal),
            FrameKind::Equatorial | FrameKind::BodyMeanEquator | FrameKind::ObjectSync => {
                Some(FrameKind::Ecliptic)
            }
            FrameKind::BodyFixed => Some(FrameKind::BodyMeanEquator),
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A node of the frame tree.
#[derive(Debug)]
pub struct Frame {
    kind: FrameKind,
    center: Option<ObjectId>,
    target: Option<ObjectId>,
    parent: Option<FrameHandle>,
    name: String,
}

impl Frame {
    /// Builds a frame together with its chain of parents.
    ///
    /// # Errors
    /// - [`OrbitError::MissingCenter`] or [`OrbitError::MissingTarget`]
    ///   when `kind` needs an object that was not given.
    /// - [`OrbitError::NoRotationModel`] for body frames whose target does
    ///   not rotate.
    /// - [`OrbitError::ObjectDestroyed`] for ids that no longer resolve.
    pub fn create(
        kind: FrameKind,
        center: Option<ObjectId>,
        target: Option<ObjectId>,
        states: &impl ObjectStates,
    ) -> Result<FrameHandle> {
        let center = match (kind.needs_center(), center) {
            (false, _) => None,
            (true, Some(center)) => Some(center),
            (true, None) => return Err(OrbitError::MissingCenter(kind.label())),
        };
        let target = match (kind.needs_target(), target) {
            (false, _) => None,
            (true, Some(target)) => Some(target),
            (true, None) => return Err(OrbitError::MissingTarget(kind.label())),
        };

        if matches!(kind, FrameKind::BodyMeanEquator | FrameKind::BodyFixed) {
            if let Some(target) = target {
                states
                    .rotation(target)?
                    .ok_or(OrbitError::NoRotationModel(target))?
                    .check()?;
            }
        }

        let name = match (center, target) {
            (None, _) => "Universal".to_string(),
            (Some(center), None) => {
                format!("{} ({})", capitalize(kind.label()), states.name(center)?)
            }
            (Some(center), Some(target)) => format!(
                "{} ({}, {})",
                capitalize(kind.label()),
                states.name(center)?,
                states.name(target)?
            ),
        };

        let parent = match kind.parent_kind() {
            Some(parent_kind) => Some(Frame::create(parent_kind, center, target, states)?),
            None => None,
        };

        log::debug!("created {kind} frame '{name}'");

        Ok(FrameHandle(Rc::new(Frame {
            kind,
            center,
            target,
            parent,
            name,
        })))
    }

    /// Builds a universal root frame.
    pub fn universal() -> FrameHandle {
        FrameHandle(Rc::new(Frame {
            kind: FrameKind::Universal,
            center: None,
            target: None,
            parent: None,
            name: "Universal".to_string(),
        }))
    }

    /// The kind of this frame.
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// The object at this frame's origin. `None` for the universal frame.
    pub fn center(&self) -> Option<ObjectId> {
        self.center
    }

    /// The object this frame is oriented by, for body and sync frames.
    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    /// The parent frame. `None` only for the universal frame.
    pub fn parent(&self) -> Option<&FrameHandle> {
        self.parent.as_ref()
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn rotation_model(&self, states: &impl ObjectStates) -> Result<RotationModel> {
        let target = self
            .target
            .ok_or(OrbitError::MissingTarget(self.kind.label()))?;
        let model = states
            .rotation(target)?
            .ok_or(OrbitError::NoRotationModel(target))?;
        model.check()?;
        Ok(model)
    }

    /// The rotation of this frame relative to its parent at `mjd`.
    pub fn local_orientation(&self, mjd: f64, states: &impl ObjectStates) -> Result<DQuat> {
        match self.kind {
            FrameKind::Universal | FrameKind::Ecliptic => Ok(DQuat::IDENTITY),
            FrameKind::Equatorial => Ok(DQuat::from_rotation_x(J2000_OBLIQUITY)),
            FrameKind::BodyMeanEquator => Ok(self.rotation_model(states)?.mean_equator(mjd)),
            FrameKind::BodyFixed => Ok(self.rotation_model(states)?.body_fixed(mjd)),
            FrameKind::ObjectSync => self.sync_orientation(mjd, states),
        }
    }

    fn sync_orientation(&self, mjd: f64, states: &impl ObjectStates) -> Result<DQuat> {
        let (Some(center), Some(target)) = (self.center, self.target) else {
            return Err(OrbitError::MissingTarget(self.kind.label()));
        };

        let offset = states.position(target, mjd)? - states.position(center, mjd)?;
        let x_axis = offset
            .try_normalize()
            .ok_or(OrbitError::DegenerateState("sync target coincides with center"))?;
        let relative_velocity = states.velocity(target, mjd)? - states.velocity(center, mjd)?;

        // Prefer the orbital normal; fall back to the ecliptic pole, then
        // to the y axis when the target sits on the pole.
        let z_axis = x_axis
            .cross(relative_velocity)
            .try_normalize()
            .or_else(|| (DVec3::Z - x_axis * x_axis.z).try_normalize())
            .or_else(|| (DVec3::Y - x_axis * x_axis.y).try_normalize())
            .ok_or(OrbitError::DegenerateState("sync frame has no defined plane"))?;
        let y_axis = z_axis.cross(x_axis);

        Ok(DQuat::from_mat3(&DMat3::from_cols(x_axis, y_axis, z_axis)))
    }

    /// The rotation of this frame relative to the universal frame at `mjd`.
    pub fn orientation(&self, mjd: f64, states: &impl ObjectStates) -> Result<DQuat> {
        let local = self.local_orientation(mjd, states)?;
        match &self.parent {
            Some(parent) => Ok(parent.orientation(mjd, states)? * local),
            None => Ok(local),
        }
    }

    /// The universal position of this frame's origin at `mjd`.
    pub fn origin(&self, mjd: f64, states: &impl ObjectStates) -> Result<DVec3> {
        match self.center {
            Some(center) => states.position(center, mjd),
            None => Ok(DVec3::ZERO),
        }
    }

    /// Converts a position in this frame to the universal frame.
    pub fn to_universal(
        &self,
        position: DVec3,
        mjd: f64,
        states: &impl ObjectStates,
    ) -> Result<DVec3> {
        Ok(self.orientation(mjd, states)? * position + self.origin(mjd, states)?)
    }

    /// Converts a universal position into this frame.
    ///
    /// This is the exact inverse of [`to_universal`][Self::to_universal].
    pub fn from_universal(
        &self,
        position: DVec3,
        mjd: f64,
        states: &impl ObjectStates,
    ) -> Result<DVec3> {
        let orientation = self.orientation(mjd, states)?;
        Ok(orientation.inverse() * (position - self.origin(mjd, states)?))
    }

    /// Converts a direction (or any free vector) in this frame to the
    /// universal frame. Only the rotation applies.
    pub fn direction_to_universal(
        &self,
        direction: DVec3,
        mjd: f64,
        states: &impl ObjectStates,
    ) -> Result<DVec3> {
        Ok(self.orientation(mjd, states)? * direction)
    }

    /// Converts a universal direction into this frame.
    pub fn direction_from_universal(
        &self,
        direction: DVec3,
        mjd: f64,
        states: &impl ObjectStates,
    ) -> Result<DVec3> {
        Ok(self.orientation(mjd, states)?.inverse() * direction)
    }

    /// Converts an attitude relative to this frame into a universal attitude.
    pub fn orientation_to_universal(
        &self,
        attitude: DQuat,
        mjd: f64,
        states: &impl ObjectStates,
    ) -> Result<DQuat> {
        Ok(self.orientation(mjd, states)? * attitude)
    }

    /// Converts a universal attitude into one relative to this frame.
    pub fn orientation_from_universal(
        &self,
        attitude: DQuat,
        mjd: f64,
        states: &impl ObjectStates,
    ) -> Result<DQuat> {
        Ok(self.orientation(mjd, states)?.inverse() * attitude)
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A shared, reference-counted frame.
///
/// Frames are immutable once built, so any number of holders can share
/// one. The frame is dropped when the last handle is released.
#[derive(Clone, Debug)]
pub struct FrameHandle(Rc<Frame>);

impl FrameHandle {
    /// Takes another reference to the frame.
    pub fn lock(&self) -> FrameHandle {
        self.clone()
    }

    /// Gives up this reference, returning how many remain.
    ///
    /// Zero means the frame has been dropped.
    pub fn release(self) -> usize {
        Rc::strong_count(&self.0) - 1
    }

    /// How many handles currently share the frame.
    pub fn lock_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Whether two handles refer to the same frame.
    pub fn ptr_eq(&self, other: &FrameHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for FrameHandle {
    type Target = Frame;

    fn deref(&self) -> &Frame {
        &self.0
    }
}
