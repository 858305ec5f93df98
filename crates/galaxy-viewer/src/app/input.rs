use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy_egui::{egui, EguiInput};

/// Logical first-person navigation actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Forward,
    Back,
    Left,
    Right,
    Boost,
    Up,
    Down,
}

impl NavAction {
    const COUNT: usize = 7;

    pub fn from_key(key: KeyCode) -> Option<Self> {
        Some(match key {
            KeyCode::KeyW => NavAction::Forward,
            KeyCode::KeyS => NavAction::Back,
            KeyCode::KeyA => NavAction::Left,
            KeyCode::KeyD => NavAction::Right,
            KeyCode::ShiftLeft | KeyCode::ShiftRight => NavAction::Boost,
            KeyCode::Space => NavAction::Up,
            KeyCode::ControlLeft | KeyCode::ControlRight => NavAction::Down,
            _ => return None,
        })
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Held state of the navigation keys. Only listens while attached; detaching
/// forgets everything so a key released while detached can't stick.
#[derive(Resource, Debug, Default)]
pub struct NavKeys {
    attached: bool,
    held: [bool; NavAction::COUNT],
}

impl NavKeys {
    pub fn attach(&mut self) {
        if !self.attached {
            tracing::debug!("navigation keys attached");
        }
        self.attached = true;
    }

    pub fn detach(&mut self) {
        if self.attached {
            tracing::debug!("navigation keys detached");
        }
        self.attached = false;
        self.held = [false; NavAction::COUNT];
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Returns whether the key is a navigation key the tracker now holds.
    pub fn key_down(&mut self, key: KeyCode) -> bool {
        if !self.attached {
            return false;
        }
        let Some(action) = NavAction::from_key(key) else {
            return false;
        };
        self.held[action.slot()] = true;
        true
    }

    pub fn key_up(&mut self, key: KeyCode) {
        if let Some(action) = NavAction::from_key(key) {
            self.held[action.slot()] = false;
        }
    }

    pub fn is_held(&self, action: NavAction) -> bool {
        self.held[action.slot()]
    }
}

pub fn track_nav_keys(mut events: EventReader<KeyboardInput>, mut keys: ResMut<NavKeys>) {
    if !keys.is_attached() {
        events.clear();
        return;
    }
    for ev in events.read() {
        match ev.state {
            ButtonState::Pressed => {
                keys.key_down(ev.key_code);
            }
            ButtonState::Released => keys.key_up(ev.key_code),
        }
    }
}

/// Drops Space from egui's input so flying up can't press a focused button.
pub fn strip_space(events: &mut Vec<egui::Event>) {
    events.retain(|ev| match ev {
        egui::Event::Key { key, .. } => *key != egui::Key::Space,
        egui::Event::Text(text) => text != " ",
        _ => true,
    });
}

/// Runs between egui's input gathering and its frame start.
pub fn shield_egui_from_nav_keys(keys: Res<NavKeys>, mut inputs: Query<&mut EguiInput>) {
    if !keys.is_attached() {
        return;
    }
    for mut input in inputs.iter_mut() {
        strip_space(&mut input.events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_tracker_ignores_keys() {
        let mut keys = NavKeys::default();
        assert!(!keys.key_down(KeyCode::KeyW));
        assert!(!keys.is_held(NavAction::Forward));
    }

    #[test]
    fn press_and_release() {
        let mut keys = NavKeys::default();
        keys.attach();

        assert!(keys.key_down(KeyCode::KeyW));
        assert!(keys.key_down(KeyCode::ShiftRight));
        assert!(keys.is_held(NavAction::Forward));
        assert!(keys.is_held(NavAction::Boost));

        keys.key_up(KeyCode::KeyW);
        assert!(!keys.is_held(NavAction::Forward));
        assert!(!keys.key_down(KeyCode::KeyQ));
    }

    #[test]
    fn space_is_held_as_up() {
        let mut keys = NavKeys::default();
        keys.attach();
        assert!(keys.key_down(KeyCode::Space));
        assert!(keys.is_held(NavAction::Up));
    }

    fn key_event(key: egui::Key) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn space_never_reaches_egui() {
        let mut events = vec![
            key_event(egui::Key::Space),
            egui::Event::Text(" ".to_string()),
            key_event(egui::Key::Enter),
            egui::Event::Text("w".to_string()),
        ];
        strip_space(&mut events);
        assert_eq!(
            events,
            vec![key_event(egui::Key::Enter), egui::Event::Text("w".to_string())]
        );
    }

    #[test]
    fn detach_clears_held_state() {
        let mut keys = NavKeys::default();
        keys.attach();
        keys.key_down(KeyCode::KeyD);
        keys.key_down(KeyCode::ControlLeft);

        keys.detach();
        keys.attach();
        assert!(!keys.is_held(NavAction::Right));
        assert!(!keys.is_held(NavAction::Down));
    }
}
