use bevy::prelude::*;
use bevy_enhanced_input::prelude::*;

#[derive(Component)]
pub struct PlayerInput;

#[derive(Debug, InputAction)]
#[action_output(Vec2)]
pub struct Move;

#[derive(Debug, InputAction)]
#[action_output(Vec2)]
pub struct Look;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Sprint;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Jump;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Strafe;

#[derive(Debug, InputAction)]
#[action_output(bool)]
pub struct Crouch;
