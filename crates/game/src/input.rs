/// A high-level player action produced by keys or on-screen buttons.
///
/// The game consumes actions, never raw input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    TogglePause,
    SpeedUp,
    SpeedDown,
    ToggleSpeed,
    OpenSettings,
}

impl InputAction {
    /// Map a key name (as reported by the host, e.g. `"Escape"`, `" "`).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Escape" | " " | "Space" => Some(Self::TogglePause),
            "ArrowUp" => Some(Self::SpeedUp),
            "ArrowDown" => Some(Self::SpeedDown),
            _ => None,
        }
    }

    /// Map an on-screen control button by id.
    pub fn from_button(id: &str) -> Option<Self> {
        match id {
            "pause-btn" => Some(Self::TogglePause),
            "speed-btn" => Some(Self::ToggleSpeed),
            "settings-btn" => Some(Self::OpenSettings),
            _ => None,
        }
    }
}
