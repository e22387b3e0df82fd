//! The camera's choice of reference frame.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Frame, FrameHandle, FrameKind, ObjectId, ObjectStates, Result};

/// The coordinate systems a player can pick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CoordType {
    /// Fixed universal axes at the universal origin.
    Universal,
    /// Ecliptic axes following the center.
    Ecliptic,
    /// Equatorial axes following the center.
    Equatorial,
    /// Axes that turn with the target.
    BodyFixed,
    /// The target's mean equator, without its spin.
    BodyMeanEquator,
    /// Axes locked on the line from the center to the target.
    ObjectSync,
}

impl CoordType {
    /// The frame kind built for this coordinate system.
    pub fn frame_kind(self) -> FrameKind {
        match self {
            CoordType::Universal => FrameKind::Universal,
            CoordType::Ecliptic => FrameKind::Ecliptic,
            CoordType::Equatorial => FrameKind::Equatorial,
            CoordType::BodyFixed => FrameKind::BodyFixed,
            CoordType::BodyMeanEquator => FrameKind::BodyMeanEquator,
            CoordType::ObjectSync => FrameKind::ObjectSync,
        }
    }
}

impl fmt::Display for CoordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.frame_kind().fmt(f)
    }
}

/// Holds the frame the camera currently moves in.
///
/// Exactly one frame is active at a time. Switching the coordinate system
/// or the objects builds the new frame first; if that fails the previous
/// frame stays active and the error is returned.
///
/// # Example
/// ```
/// use orbit_frames::{presets, CoordType, PlayerFrame};
///
/// let (registry, bodies) = presets::sun_earth_moon().unwrap();
///
/// let mut player = PlayerFrame::create(
///     CoordType::Ecliptic,
///     Some(bodies.earth),
///     None,
///     &registry,
/// )
/// .unwrap();
/// assert_eq!(player.name(), "Ecliptic (Earth)");
///
/// player.set_coord_type(CoordType::BodyFixed, &registry).unwrap_err();
/// assert_eq!(player.coord_type(), CoordType::Ecliptic);
/// ```
#[derive(Debug)]
pub struct PlayerFrame {
    coord_type: CoordType,
    center: Option<ObjectId>,
    target: Option<ObjectId>,
    frame: FrameHandle,
}

impl PlayerFrame {
    /// Builds the frame for `coord_type` around the given objects.
    ///
    /// # Errors
    /// See [`Frame::create`].
    pub fn create(
        coord_type: CoordType,
        center: Option<ObjectId>,
        target: Option<ObjectId>,
        states: &impl ObjectStates,
    ) -> Result<Self> {
        let frame = Frame::create(coord_type.frame_kind(), center, target, states)?;
        log::debug!("player frame set to '{}'", frame.name());

        Ok(Self {
            coord_type,
            center,
            target,
            frame,
        })
    }

    /// Switches to another coordinate system, keeping the objects.
    pub fn set_coord_type(
        &mut self,
        coord_type: CoordType,
        states: &impl ObjectStates,
    ) -> Result<()> {
        self.rebuild(coord_type, self.center, self.target, states)
    }

    /// Switches to other objects, keeping the coordinate system.
    pub fn set_objects(
        &mut self,
        center: Option<ObjectId>,
        target: Option<ObjectId>,
        states: &impl ObjectStates,
    ) -> Result<()> {
        self.rebuild(self.coord_type, center, target, states)
    }

    fn rebuild(
        &mut self,
        coord_type: CoordType,
        center: Option<ObjectId>,
        target: Option<ObjectId>,
        states: &impl ObjectStates,
    ) -> Result<()> {
        let frame = Frame::create(coord_type.frame_kind(), center, target, states)?;

        let old = core::mem::replace(&mut self.frame, frame);
        let old_name = old.name().to_string();
        let remaining = old.release();
        log::debug!(
            "player frame switched from '{old_name}' ({remaining} other holders) to '{}'",
            self.frame.name()
        );

        self.coord_type = coord_type;
        self.center = center;
        self.target = target;
        Ok(())
    }

    /// The active frame.
    pub fn frame(&self) -> &FrameHandle {
        &self.frame
    }

    /// The center object.
    pub fn center(&self) -> Option<ObjectId> {
        self.center
    }

    /// The target object.
    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    /// The active coordinate system.
    pub fn coord_type(&self) -> CoordType {
        self.coord_type
    }

    /// The active frame's display name.
    pub fn name(&self) -> &str {
        self.frame.name()
    }
}
