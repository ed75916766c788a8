use std::f32::consts::{PI, TAU};

/// Linear interpolation with `t` clamped to `[0, 1]`.
pub fn lerp_clamped(from: f32, to: f32, t: f32) -> f32 {
  from + (to - from) * t.clamp(0.0, 1.0)
}

/// Rounds to three decimal places.
pub fn round3(value: f32) -> f32 {
  (value * 1000.0).round() / 1000.0
}

/// Shortest signed difference `to - from`, wrapped into `[-PI, PI]`.
pub fn delta_angle(from: f32, to: f32) -> f32 {
  let mut delta = (to - from).rem_euclid(TAU);
  if delta > PI {
    delta -= TAU;
  }
  delta
}

/// Critically damped spring towards `target`, Game Programming Gems 4 style.
///
/// `velocity` carries state between calls and must be kept by the caller.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
  if dt <= 0.0 {
    return current;
  }
  let smooth_time = smooth_time.max(0.0001);
  let omega = 2.0 / smooth_time;
  let x = omega * dt;
  let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

  let change = current - target;
  let temp = (*velocity + omega * change) * dt;
  *velocity = (*velocity - omega * temp) * exp;
  let mut output = target + (change + temp) * exp;

  // Never overshoot.
  if (target - current > 0.0) == (output > target) {
    output = target;
    *velocity = (output - target) / dt;
  }
  output
}

/// [`smooth_damp`] for angles in radians, always turning the short way round.
pub fn smooth_damp_angle(
  current: f32,
  target: f32,
  velocity: &mut f32,
  smooth_time: f32,
  dt: f32,
) -> f32 {
  let target = current + delta_angle(current, target);
  smooth_damp(current, target, velocity, smooth_time, dt)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lerp_clamps_parameter() {
    assert_eq!(lerp_clamped(0.0, 10.0, 2.0), 10.0);
    assert_eq!(lerp_clamped(0.0, 10.0, -1.0), 0.0);
    assert_eq!(lerp_clamped(0.0, 10.0, 0.25), 2.5);
  }

  #[test]
  fn delta_angle_takes_short_way() {
    let d = delta_angle(170f32.to_radians(), (-170f32).to_radians());
    assert!((d - 20f32.to_radians()).abs() < 1e-4);
  }

  #[test]
  fn smooth_damp_angle_settles_without_overshoot() {
    let target = 90f32.to_radians();
    let mut angle = 0.0;
    let mut velocity = 0.0;
    for _ in 0..240 {
      angle = smooth_damp_angle(angle, target, &mut velocity, 0.12, 1.0 / 60.0);
      assert!(angle <= target + 1e-4);
    }
    assert!((angle - target).abs() < 1e-3);
  }

  #[test]
  fn smooth_damp_is_noop_without_time() {
    let mut velocity = 0.0;
    assert_eq!(smooth_damp(1.0, 5.0, &mut velocity, 0.1, 0.0), 1.0);
  }
}
