// Key bindings
//
// Escape is the only binding: a press (not auto-repeat) asks the window to
// close. Everything else is ignored.

use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

pub fn closes_window(key: PhysicalKey, state: ElementState, repeat: bool) -> bool {
    matches!(key, PhysicalKey::Code(KeyCode::Escape)) && state == ElementState::Pressed && !repeat
}
