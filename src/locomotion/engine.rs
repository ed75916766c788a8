//! Per-tick character locomotion.
//!
//! [`LocomotionEngine`] owns every piece of mutable movement state. It knows
//! nothing about the ECS or the physics backend: the ground probe result, the
//! camera heading and the elapsed time come in through [`TickInput`], and the
//! displacement for the capsule mover goes out through [`Motion`].
//!
//! Heading convention: yaw in radians about +Y, zero faces -Z. A movement
//! vector is `(right, forward)`.

use bevy::prelude::*;

use super::settings::{CapsuleDims, LocomotionSettings};
use super::smoothing::{lerp_clamped, round3, smooth_damp_angle};
use super::snapshot::AnimationSnapshot;
use super::wall::{MoverContact, WallContact};

/// Speed deviation under which the current speed snaps to the target.
pub const SPEED_DEAD_BAND: f32 = 0.1;
/// Published animation speed below this reads as standing still.
const ANIMATION_SPEED_EPSILON: f32 = 0.01;
/// Height above a wall contact where the climb probe starts.
const CLIMB_PROBE_HEIGHT: f32 = 5.0;

/// Everything the engine needs from the outside world for one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
  pub dt: f32,
  pub movement: Vec2,
  pub sprint: bool,
  pub grounded: bool,
  /// Feet position before this tick's move.
  pub position: Vec3,
  /// Heading of the viewing camera, if there is one.
  pub view_yaw: Option<f32>,
}

/// Output of one tick for the capsule mover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
  pub translation: Vec3,
  pub facing: f32,
}

/// Downward ray query used by the climb probe.
pub trait SurfaceProbe {
  /// First surface hit casting straight down from `origin`.
  fn cast_down(&self, origin: Vec3) -> Option<Vec3>;
}

impl<F> SurfaceProbe for F
where
  F: Fn(Vec3) -> Option<Vec3>,
{
  fn cast_down(&self, origin: Vec3) -> Option<Vec3> {
    self(origin)
  }
}

/// What the climb routine concluded about an obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum ClimbDecision {
  /// The obstacle was measured but no climb or vault action exists yet.
  /// `step_height` is the obstacle top minus the feet height, positive for a
  /// step up; `None` when the downward probe hit nothing.
  Undetermined { step_height: Option<f32> },
}

/// Why a jump request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpBlock {
  Strafing,
  Crouching,
  Cooldown,
  Airborne,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpOutcome {
  Launched { velocity: f32 },
  Blocked(JumpBlock),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpAttempt {
  pub outcome: JumpOutcome,
  /// Set when the request arrived while pressing into a wall.
  pub climb: Option<ClimbDecision>,
}

/// Mutable locomotion state. Only [`LocomotionEngine`] writes it.
#[derive(Debug, Clone, Default)]
pub struct LocomotionState {
  pub vertical_velocity: f32,
  pub horizontal_speed: f32,
  pub facing: f32,
  pub target_heading: f32,
  rotation_velocity: f32,
  animation_speed: f32,
  pub strafe_blend: Vec2,
  pub turn_in_place: f32,

  pub grounded: bool,
  pub strafing: bool,
  pub crouching: bool,
  pub sprinting: bool,
  pub idle: bool,
  pub wall_blocked: bool,

  pub jump_timeout_remaining: f32,
  pub fall_timeout_remaining: f32,

  pub wall: WallContact,
  pub movement: Vec2,
  pub position: Vec3,
}

#[derive(Component, Debug, Clone)]
pub struct LocomotionEngine {
  settings: LocomotionSettings,
  camera_relative: bool,
  capsule: CapsuleDims,
  state: LocomotionState,
  snapshot: AnimationSnapshot,
}

impl LocomotionEngine {
  pub fn new(settings: LocomotionSettings, camera_relative: bool) -> Self {
    let state = LocomotionState {
      jump_timeout_remaining: settings.jump_timeout,
      fall_timeout_remaining: settings.fall_timeout,
      idle: true,
      ..default()
    };
    Self {
      capsule: settings.capsule,
      settings,
      camera_relative,
      state,
      snapshot: AnimationSnapshot {
        motion_speed: 1.0,
        ..default()
      },
    }
  }

  pub fn settings(&self) -> &LocomotionSettings {
    &self.settings
  }

  /// Swaps in new settings, keeping all motion state.
  pub fn set_settings(&mut self, settings: LocomotionSettings) {
    self.capsule = settings.capsule;
    if self.state.crouching {
      self.capsule.height /= 2.0;
      self.capsule.center /= 2.0;
    }
    self.settings = settings;
  }

  pub fn state(&self) -> &LocomotionState {
    &self.state
  }

  pub fn snapshot(&self) -> &AnimationSnapshot {
    &self.snapshot
  }

  pub fn capsule(&self) -> CapsuleDims {
    self.capsule
  }

  /// Whether the character is currently pressing into a recorded wall.
  pub fn wall_blocked(&self) -> bool {
    self.state.wall_blocked
  }

  /// Desired horizontal speed before smoothing. The idle/wall gate is
  /// applied last so it always wins.
  pub fn target_speed(&self) -> f32 {
    let s = &self.settings;
    let state = &self.state;
    s.base_speed
      * if state.strafing { s.strafe_multiplier } else { 1.0 }
      * if state.sprinting { s.sprint_multiplier } else { 1.0 }
      * if state.crouching { s.crouch_multiplier } else { 1.0 }
      * if state.idle || state.wall_blocked { 0.0 } else { 1.0 }
  }

  /// Direction of travel for the current heading.
  pub fn heading_direction(&self) -> Vec3 {
    let local = if self.state.strafing {
      planar(self.state.movement)
    } else {
      Vec3::NEG_Z
    };
    (Quat::from_rotation_y(self.state.target_heading) * local).normalize_or_zero()
  }

  pub fn tick(&mut self, input: &TickInput) -> Motion {
    let dt = input.dt;
    self.state.grounded = input.grounded;
    self.state.position = input.position;
    self.state.movement = input.movement;
    self.state.idle = input.movement == Vec2::ZERO;
    self.state.sprinting = input.sprint && !self.state.crouching;

    self.apply_gravity(dt);
    self.refresh_wall_blocked();
    let target_speed = self.target_speed();
    self.update_animation(dt, target_speed);
    self.update_timeouts(dt);
    let motion = self.resolve_movement(dt, target_speed, input.view_yaw);

    trace!(
      "locomotion: speed={:.3} target={:.3} vy={:.2} grounded={} wall={}",
      self.state.horizontal_speed,
      target_speed,
      self.state.vertical_velocity,
      self.state.grounded,
      self.state.wall_blocked
    );
    motion
  }

  fn apply_gravity(&mut self, dt: f32) {
    let s = &self.settings;
    let vy = &mut self.state.vertical_velocity;
    // The clamping tick adds no gravity, so a resting character reports
    // exactly the resting velocity rather than resting + gravity * dt.
    if self.state.grounded && *vy < 0.0 {
      *vy = s.resting_velocity;
    } else if *vy > -s.terminal_velocity {
      *vy = (*vy + s.gravity * dt).max(-s.terminal_velocity);
    }
  }

  fn update_animation(&mut self, dt: f32, target_speed: f32) {
    let t = dt * self.settings.speed_change_rate;
    let state = &mut self.state;

    state.animation_speed = lerp_clamped(state.animation_speed, target_speed, t);
    if state.animation_speed < ANIMATION_SPEED_EPSILON {
      state.animation_speed = 0.0;
    }
    let blend_target = state.movement.normalize_or_zero() * target_speed;
    state.strafe_blend = state.strafe_blend.lerp(blend_target, t.clamp(0.0, 1.0));

    self.snapshot = AnimationSnapshot {
      speed: state.animation_speed,
      grounded: state.grounded,
      airborne: !state.grounded,
      free_fall: state.fall_timeout_remaining < 0.0,
      strafing: state.strafing,
      crouching: state.crouching,
      turn_in_place_delta: state.turn_in_place,
      motion_speed: 1.0,
      strafe_x: state.strafe_blend.x,
      strafe_y: state.strafe_blend.y,
    };
  }

  fn update_timeouts(&mut self, dt: f32) {
    let s = &self.settings;
    let state = &mut self.state;
    if state.grounded {
      state.fall_timeout_remaining = s.fall_timeout;
      if state.jump_timeout_remaining >= 0.0 {
        state.jump_timeout_remaining -= dt;
      }
    } else {
      state.jump_timeout_remaining = s.jump_timeout;
      if state.fall_timeout_remaining >= 0.0 {
        state.fall_timeout_remaining -= dt;
      }
    }
  }

  fn resolve_movement(&mut self, dt: f32, target_speed: f32, view_yaw: Option<f32>) -> Motion {
    let s = &self.settings;
    let state = &mut self.state;

    let current = state.horizontal_speed;
    state.horizontal_speed =
      if current < target_speed - SPEED_DEAD_BAND || current > target_speed + SPEED_DEAD_BAND {
        round3(lerp_clamped(current, target_speed, dt * s.speed_change_rate))
      } else {
        target_speed
      };

    if !state.idle {
      let mut heading = movement_yaw(state.movement);
      if self.camera_relative {
        heading += view_yaw.unwrap_or(0.0);
      }
      if state.strafing {
        heading = view_yaw.unwrap_or(state.target_heading);
      }
      state.target_heading = heading;
      state.facing = smooth_damp_angle(
        state.facing,
        heading,
        &mut state.rotation_velocity,
        s.rotation_smooth_time,
        dt,
      );
    }

    state.turn_in_place = 0.0;
    if state.idle && state.strafing {
      if let Some(view_yaw) = view_yaw {
        let view_forward = Quat::from_rotation_y(view_yaw) * Vec3::NEG_Z;
        let facing_forward = Quat::from_rotation_y(state.facing) * Vec3::NEG_Z;
        let delta = view_forward.cross(facing_forward).y;
        state.turn_in_place = delta;
        if delta.abs() > 0.0 {
          state.target_heading = view_yaw;
          state.facing = smooth_damp_angle(
            state.facing,
            view_yaw,
            &mut state.rotation_velocity,
            s.rotation_smooth_time,
            dt,
          );
        }
      }
    }

    let horizontal = self.heading_direction() * (self.state.horizontal_speed * dt);
    Motion {
      translation: horizontal + Vec3::Y * (self.state.vertical_velocity * dt),
      facing: self.state.facing,
    }
  }

  /// Re-evaluates the wall condition against the current heading. The
  /// distance threshold is measured from the capsule surface, since mover
  /// contacts lie on the skin, one radius out from the feet.
  pub fn refresh_wall_blocked(&mut self) -> bool {
    let heading = self.heading_direction();
    let s = &self.settings;
    self.state.wall_blocked = self.state.wall.is_blocking(
      self.state.position,
      heading,
      s.wall_angle_threshold,
      s.wall_distance_threshold + self.capsule.radius,
    );
    self.state.wall_blocked
  }

  /// Feeds a contact from the capsule mover.
  pub fn record_contact(&mut self, contact: &MoverContact, position: Vec3) {
    self.state.position = position;
    if self.state.wall.record(contact, position) {
      self.refresh_wall_blocked();
    }
  }

  /// Horizontal speed the mover actually achieved, so easing resumes from
  /// reality after a collision.
  pub fn observe_realized_speed(&mut self, speed: f32) {
    if speed.is_finite() {
      self.state.horizontal_speed = speed;
    }
  }

  /// Latest ground probe, for requests handled between ticks.
  pub fn observe_ground(&mut self, grounded: bool) {
    self.state.grounded = grounded;
  }

  pub fn jump(&mut self, probe: &impl SurfaceProbe) -> JumpAttempt {
    if self.state.strafing {
      return blocked(JumpBlock::Strafing, None);
    }
    if self.state.crouching {
      return blocked(JumpBlock::Crouching, None);
    }

    let climb = if self.refresh_wall_blocked() {
      Some(self.climb(probe))
    } else {
      None
    };

    if !self.state.grounded {
      return blocked(JumpBlock::Airborne, climb);
    }
    if self.state.jump_timeout_remaining > 0.0 {
      return blocked(JumpBlock::Cooldown, climb);
    }

    let velocity = self.settings.jump_velocity();
    self.state.vertical_velocity = velocity;
    debug!("jump: vy={:.3}", velocity);
    JumpAttempt {
      outcome: JumpOutcome::Launched { velocity },
      climb,
    }
  }

  /// Measures the obstacle in front. Deciding between a climb and a vault is
  /// not implemented, so this never moves the character.
  fn climb(&self, probe: &impl SurfaceProbe) -> ClimbDecision {
    let Some(point) = self.state.wall.point() else {
      return ClimbDecision::Undetermined { step_height: None };
    };
    let step_height = probe
      .cast_down(point + Vec3::Y * CLIMB_PROBE_HEIGHT)
      .map(|hit| hit.y - self.state.position.y);
    if let Some(height) = step_height {
      info!("climb probe: obstacle step height {:.3}", height);
    }
    ClimbDecision::Undetermined { step_height }
  }

  /// Flips crouching and halves or restores the capsule.
  pub fn toggle_crouch(&mut self) -> CapsuleDims {
    let state = &mut self.state;
    state.crouching = !state.crouching;
    if state.crouching {
      self.capsule.height /= 2.0;
      self.capsule.center /= 2.0;
      state.sprinting = false;
    } else {
      self.capsule.height *= 2.0;
      self.capsule.center *= 2.0;
    }
    debug!("crouch: {}", state.crouching);
    self.capsule
  }

  pub fn toggle_strafe(&mut self) -> bool {
    self.state.strafing = !self.state.strafing;
    debug!("strafe: {}", self.state.strafing);
    self.state.strafing
  }
}

fn blocked(reason: JumpBlock, climb: Option<ClimbDecision>) -> JumpAttempt {
  JumpAttempt {
    outcome: JumpOutcome::Blocked(reason),
    climb,
  }
}

/// Movement vector `(right, forward)` as a world-space planar direction.
pub fn planar(movement: Vec2) -> Vec3 {
  Vec3::new(movement.x, 0.0, -movement.y).normalize_or_zero()
}

/// Yaw that faces along `movement`.
pub fn movement_yaw(movement: Vec2) -> f32 {
  (-movement.x).atan2(movement.y)
}
