//! Direction-sensitive wall contact.
//!
//! The mover reports contacts after each sweep. A contact only counts as a
//! wall while the character keeps heading into it and stays close; walking
//! away from it inside the cone forgets it.

use bevy::prelude::*;

/// Contacts moving down into the surface steeper than this are floors.
const FLOOR_MOVE_Y: f32 = -0.3;

/// What kind of body the mover ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactBody {
  /// Fixed world geometry, or a collider without a rigid body.
  Static,
  /// Anything simulated or script driven.
  Moving,
}

/// One contact reported by the capsule mover.
#[derive(Debug, Clone, Copy)]
pub struct MoverContact {
  pub point: Vec3,
  /// Direction the character was moving when it hit.
  pub move_direction: Vec3,
  pub body: ContactBody,
}

#[derive(Debug, Default, Clone)]
pub struct WallContact {
  point: Option<Vec3>,
}

impl WallContact {
  /// Records `contact` if it is a static, non-floor obstruction. The point is
  /// flattened to the height of `position`.
  pub fn record(&mut self, contact: &MoverContact, position: Vec3) -> bool {
    if contact.move_direction.y < FLOOR_MOVE_Y || contact.body != ContactBody::Static {
      return false;
    }
    self.point = Some(Vec3::new(contact.point.x, position.y, contact.point.z));
    true
  }

  pub fn point(&self) -> Option<Vec3> {
    self.point
  }

  /// Whether `position` moving along `heading` is pressing into the recorded
  /// point. Forgets the point when it is ahead but out of reach.
  pub fn is_blocking(
    &mut self,
    position: Vec3,
    heading: Vec3,
    angle_threshold: f32,
    distance_threshold: f32,
  ) -> bool {
    let Some(point) = self.point else {
      return false;
    };

    let to_point = (point - position).normalize_or_zero();
    if to_point.dot(heading.normalize_or_zero()) < angle_threshold {
      return false;
    }
    if position.distance(point) <= distance_threshold {
      return true;
    }
    self.point = None;
    false
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn wall_ahead(distance: f32) -> MoverContact {
    MoverContact {
      point: Vec3::new(0.0, 0.5, -distance),
      move_direction: Vec3::NEG_Z,
      body: ContactBody::Static,
    }
  }

  #[test]
  fn close_wall_dead_ahead_blocks() {
    let mut wall = WallContact::default();
    assert!(wall.record(&wall_ahead(0.1), Vec3::ZERO));
    assert!(wall.is_blocking(Vec3::ZERO, Vec3::NEG_Z, 0.9, 0.16));
    assert!(wall.point().is_some());
  }

  #[test]
  fn distant_wall_dead_ahead_is_forgotten() {
    let mut wall = WallContact::default();
    wall.record(&wall_ahead(0.2), Vec3::ZERO);
    assert!(!wall.is_blocking(Vec3::ZERO, Vec3::NEG_Z, 0.9, 0.16));
    assert!(wall.point().is_none());
    assert!(!wall.is_blocking(Vec3::ZERO, Vec3::NEG_Z, 0.9, 0.16));
  }

  #[test]
  fn wall_behind_is_kept_but_not_blocking() {
    let mut wall = WallContact::default();
    wall.record(&wall_ahead(0.1), Vec3::ZERO);
    assert!(!wall.is_blocking(Vec3::ZERO, Vec3::Z, 0.9, 0.16));
    assert!(wall.point().is_some());
  }

  #[test]
  fn point_is_flattened_to_character_height() {
    let mut wall = WallContact::default();
    wall.record(&wall_ahead(0.1), Vec3::new(0.0, 3.0, 0.0));
    assert_eq!(wall.point().map(|p| p.y), Some(3.0));
  }

  #[test]
  fn floors_and_props_are_ignored() {
    let mut wall = WallContact::default();
    let floor = MoverContact {
      move_direction: Vec3::new(0.0, -1.0, 0.0),
      ..wall_ahead(0.1)
    };
    let prop = MoverContact {
      body: ContactBody::Moving,
      ..wall_ahead(0.1)
    };
    assert!(!wall.record(&floor, Vec3::ZERO));
    assert!(!wall.record(&prop, Vec3::ZERO));
    assert!(wall.point().is_none());
  }
}
