use bevy::prelude::*;

/// Which moment of a press/drag gesture a caller is asking about.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointerPhase {
    JustPressed,
    Pressed,
}

/// Unified mouse + touch position for the requested phase, in window
/// coordinates (logical pixels, origin at the top-left, y down).
pub fn pointer_position(
    phase: PointerPhase,
    mouse: &ButtonInput<MouseButton>,
    touches: &Touches,
    window: &Window,
) -> Option<Vec2> {
    match phase {
        PointerPhase::JustPressed => {
            if mouse.just_pressed(MouseButton::Left) {
                window.cursor_position()
            } else {
                touches.iter_just_pressed().next().map(|t| t.position())
            }
        }
        PointerPhase::Pressed => {
            if mouse.pressed(MouseButton::Left) {
                window.cursor_position()
            } else {
                touches.first_pressed_position()
            }
        }
    }
}

/// Whether the press gesture ended this frame. Deliberately ignores the
/// cursor position: the release still arrives when the pointer has left the
/// window mid-drag, and it must end the gesture either way.
pub fn pointer_released(mouse: &ButtonInput<MouseButton>, touches: &Touches) -> bool {
    mouse.just_released(MouseButton::Left) || touches.iter_just_released().next().is_some()
}
