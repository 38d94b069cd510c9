use crate::{
    core::{geo::ZoomDirection, view_state::Direction, view_state::Layer},
    input::events::{InputEvent, KeyCode, MouseButton},
};

/// A user intent, bound to its arguments at the point it is created
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Pan one span unit
    Move(Direction),
    /// Halve or double the span
    Zoom(ZoomDirection),
    /// Switch the rendered layer
    SetLayer(Layer),
    /// Drop the marker at a window position and reverse geocode it
    PlaceMarker { x: i32, y: i32 },
    /// Look up the organization nearest to a window position
    FindOrganization { x: i32, y: i32 },
    /// Geocode free text and jump to the first result
    Search(String),
    /// Remove the marker and the displayed address
    Clear,
    /// Show or hide the postal code in front of the address
    SetShowPostalCode(bool),
}

/// Translates raw input events into [`Action`]s
#[derive(Debug, Clone)]
pub struct InputHandler {
    keyboard: bool,
    mouse: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            keyboard: true,
            mouse: true,
        }
    }

    pub fn with_keyboard(mut self, enabled: bool) -> Self {
        self.keyboard = enabled;
        self
    }

    pub fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse = enabled;
        self
    }

    /// Maps an event to an action; unbound keys and buttons yield `None`
    pub fn handle(&self, event: &InputEvent) -> Option<Action> {
        match *event {
            InputEvent::KeyPress { key } if self.keyboard => Self::key_action(key),
            InputEvent::Click { x, y, button } if self.mouse => match button {
                MouseButton::Left => Some(Action::PlaceMarker { x, y }),
                MouseButton::Right => Some(Action::FindOrganization { x, y }),
                _ => None,
            },
            _ => None,
        }
    }

    fn key_action(key: KeyCode) -> Option<Action> {
        let action = match key {
            KeyCode::ArrowUp => Action::Move(Direction::Up),
            KeyCode::ArrowDown => Action::Move(Direction::Down),
            KeyCode::ArrowLeft => Action::Move(Direction::Left),
            KeyCode::ArrowRight => Action::Move(Direction::Right),
            // PageUp widens the view, PageDown narrows it
            KeyCode::PageUp | KeyCode::Minus => Action::Zoom(ZoomDirection::Out),
            KeyCode::PageDown | KeyCode::Plus => Action::Zoom(ZoomDirection::In),
            KeyCode::Escape => Action::Clear,
            KeyCode::Other(_) => return None,
        };
        Some(action)
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: KeyCode) -> InputEvent {
        InputEvent::KeyPress { key }
    }

    #[test]
    fn test_navigation_keys() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle(&key(KeyCode::ArrowUp)),
            Some(Action::Move(Direction::Up))
        );
        assert_eq!(
            handler.handle(&key(KeyCode::ArrowRight)),
            Some(Action::Move(Direction::Right))
        );
        assert_eq!(
            handler.handle(&key(KeyCode::PageUp)),
            Some(Action::Zoom(ZoomDirection::Out))
        );
        assert_eq!(
            handler.handle(&key(KeyCode::PageDown)),
            Some(Action::Zoom(ZoomDirection::In))
        );
        assert_eq!(handler.handle(&key(KeyCode::Other(42))), None);
    }

    #[test]
    fn test_zoom_and_clear_keys() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle(&key(KeyCode::Plus)),
            Some(Action::Zoom(ZoomDirection::In))
        );
        assert_eq!(
            handler.handle(&key(KeyCode::Minus)),
            Some(Action::Zoom(ZoomDirection::Out))
        );
        assert_eq!(handler.handle(&key(KeyCode::Escape)), Some(Action::Clear));
    }

    #[test]
    fn test_clicks() {
        let handler = InputHandler::new();
        let left = InputEvent::Click {
            x: 5,
            y: 6,
            button: MouseButton::Left,
        };
        let right = InputEvent::Click {
            x: 5,
            y: 6,
            button: MouseButton::Right,
        };
        let middle = InputEvent::Click {
            x: 5,
            y: 6,
            button: MouseButton::Middle,
        };

        assert_eq!(handler.handle(&left), Some(Action::PlaceMarker { x: 5, y: 6 }));
        assert_eq!(
            handler.handle(&right),
            Some(Action::FindOrganization { x: 5, y: 6 })
        );
        assert_eq!(handler.handle(&middle), None);
    }

    #[test]
    fn test_disabled_sources() {
        let handler = InputHandler::new().with_keyboard(false);
        assert_eq!(handler.handle(&key(KeyCode::ArrowUp)), None);

        let handler = InputHandler::new().with_mouse(false);
        let click = InputEvent::Click {
            x: 50,
            y: 50,
            button: MouseButton::Left,
        };
        assert_eq!(handler.handle(&click), None);
    }
}
