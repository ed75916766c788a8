use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::{CapsuleShape, CharacterHull, GroundContact, JumpStarted, MotionRequest};
use super::engine::{JumpOutcome, LocomotionEngine, TickInput};
use super::snapshot::AnimationSnapshot;
use super::wall::{ContactBody, MoverContact};
use crate::control::{ControlBinding, ControlIntent, ControlSignal, SignalKind, WallSense};
use crate::core::ViewHeading;
use crate::core::physics::mover_filter;

/// Hit normals steeper than this belong to floors and ceilings.
const FLOOR_NORMAL_Y: f32 = 0.7;

/// Sphere overlap just below the feet against the configured ground layers.
pub fn probe_ground(
  rapier: ReadRapierContext,
  mut characters: Query<(Entity, &Transform, &LocomotionEngine, &mut GroundContact)>,
) {
  let Ok(context) = rapier.single() else {
    return;
  };

  for (entity, transform, engine, mut ground) in &mut characters {
    let s = engine.settings();
    let center = transform.translation - Vec3::Y * s.grounded_offset;
    let filter = QueryFilter::new()
      .exclude_rigid_body(entity)
      .exclude_sensors()
      .groups(CollisionGroups::new(
        Group::ALL,
        Group::from_bits_truncate(s.ground_layers),
      ));
    let mut found = false;
    context.intersect_shape(
      center,
      Quat::IDENTITY,
      &*Collider::ball(s.grounded_radius).raw,
      filter,
      |_| {
        found = true;
        false
      },
    );

    if ground.0 != found {
      trace!("{:?} grounded={}", entity, found);
    }
    ground.set_if_neq(GroundContact(found));
  }
}

/// Routes discrete signals to every engine bound to their source.
pub fn deliver_signals(
  mut signals: MessageReader<ControlSignal>,
  rapier: ReadRapierContext,
  mut characters: Query<(
    Entity,
    &ControlBinding,
    &GroundContact,
    &mut LocomotionEngine,
    &mut CapsuleShape,
  )>,
  mut jumps: MessageWriter<JumpStarted>,
) {
  let context = rapier.single().ok();

  for signal in signals.read() {
    for (entity, binding, ground, mut engine, mut capsule) in &mut characters {
      if binding.source != signal.source {
        continue;
      }

      match signal.kind {
        SignalKind::Jump => {
          let probe = |origin: Vec3| -> Option<Vec3> {
            let context = context.as_ref()?;
            let filter = QueryFilter::new()
              .exclude_rigid_body(entity)
              .exclude_sensors()
              .groups(mover_filter());
            context
              .cast_ray(origin, Vec3::NEG_Y, f32::MAX, true, filter)
              .map(|(_, toi)| origin + Vec3::NEG_Y * toi)
          };

          engine.observe_ground(ground.0);
          let attempt = engine.jump(&probe);
          match attempt.outcome {
            JumpOutcome::Launched { .. } => {
              jumps.write(JumpStarted { entity });
            }
            JumpOutcome::Blocked(reason) => {
              trace!("{:?} jump blocked: {:?}", entity, reason);
            }
          }
        }
        SignalKind::StrafeToggle => {
          engine.toggle_strafe();
        }
        SignalKind::CrouchToggle => {
          capsule.0 = engine.toggle_crouch();
        }
      }
    }
  }
}

#[cfg_attr(feature = "tracy", tracing::instrument(skip_all))]
pub fn tick_locomotion(
  time: Res<Time>,
  heading: Option<Res<ViewHeading>>,
  intents: Query<&ControlIntent>,
  mut characters: Query<(
    &mut LocomotionEngine,
    &ControlBinding,
    &GroundContact,
    &mut Transform,
    &mut MotionRequest,
    &mut WallSense,
    &mut AnimationSnapshot,
  )>,
) {
  let dt = time.delta_secs();
  let view_yaw = heading.and_then(|heading| heading.0);

  for (mut engine, binding, ground, mut transform, mut request, mut wall, mut snapshot) in
    &mut characters
  {
    // A missing source reads as no input.
    let intent = intents.get(binding.source).copied().unwrap_or_default();
    let motion = engine.tick(&TickInput {
      dt,
      movement: intent.movement,
      sprint: intent.sprint,
      grounded: ground.0,
      position: transform.translation,
      view_yaw,
    });

    transform.rotation = Quat::from_rotation_y(motion.facing);
    request.0 = motion.translation;
    wall.set_if_neq(WallSense(engine.wall_blocked()));
    *snapshot = *engine.snapshot();
  }
}

pub fn apply_motion(mut movers: Query<(&MotionRequest, &mut KinematicCharacterController)>) {
  for (request, mut controller) in &mut movers {
    controller.translation = Some(request.0);
  }
}

/// Mirrors capsule changes onto the mover shape and the hull collider.
pub fn apply_capsule(
  mut characters: Query<
    (&CapsuleShape, &mut KinematicCharacterController, &Children),
    Changed<CapsuleShape>,
  >,
  mut hulls: Query<(&mut Collider, &mut Transform), With<CharacterHull>>,
) {
  for (shape, mut controller, children) in &mut characters {
    let dims = shape.0;
    let collider = Collider::capsule_y(dims.half_segment(), dims.radius);
    let offset = Vec3::Y * dims.center;
    controller.custom_shape = Some((collider.clone(), offset, Quat::IDENTITY));

    for child in children.iter() {
      if let Ok((mut hull, mut transform)) = hulls.get_mut(child) {
        *hull = collider.clone();
        transform.translation = offset;
      }
    }
  }
}

/// Feeds what the mover actually did back into the engine.
pub fn read_mover_output(
  time: Res<Time>,
  mut characters: Query<(
    &mut LocomotionEngine,
    &Transform,
    &KinematicCharacterControllerOutput,
    &mut WallSense,
  )>,
  bodies: Query<Option<&RigidBody>>,
  parents: Query<&ChildOf>,
) {
  let dt = time.delta_secs();
  if dt <= 0.0 {
    return;
  }

  for (mut engine, transform, output, mut wall) in &mut characters {
    let moved = output.effective_translation;
    engine.observe_realized_speed(Vec2::new(moved.x, moved.z).length() / dt);

    let radius = engine.capsule().radius;
    for collision in &output.collisions {
      let travel = collision.translation_applied + collision.translation_remaining;
      let flat = Vec3::new(travel.x, 0.0, travel.z).normalize_or_zero();
      if flat == Vec3::ZERO {
        continue;
      }

      // The sweep carries the resting fall velocity, so the raw travel
      // direction points down even when walking into a wall. Classify by the
      // hit normal when Rapier reports one.
      let move_direction = match &collision.hit.details {
        Some(details) if details.normal1.y.abs() > FLOOR_NORMAL_Y => continue,
        Some(_) => flat,
        None => travel.normalize_or_zero(),
      };
      let contact = MoverContact {
        point: collision.character_translation + flat * radius,
        move_direction,
        body: body_kind(collision.entity, &bodies, &parents),
      };
      engine.record_contact(&contact, transform.translation);
    }

    wall.set_if_neq(WallSense(engine.wall_blocked()));
  }
}

/// Colliders without a body, or on a fixed one, count as static.
fn body_kind(
  entity: Entity,
  bodies: &Query<Option<&RigidBody>>,
  parents: &Query<&ChildOf>,
) -> ContactBody {
  let body = bodies.get(entity).ok().flatten().or_else(|| {
    parents
      .get(entity)
      .ok()
      .and_then(|child_of| bodies.get(child_of.parent()).ok().flatten())
  });
  match body {
    None | Some(RigidBody::Fixed) => ContactBody::Static,
    Some(_) => ContactBody::Moving,
  }
}
