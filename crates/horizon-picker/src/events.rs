//! Input commands from the presentation adapter.
//!
//! The picker core is framework-agnostic: whatever event system drives it
//! (DOM events, a native event loop, a test harness) maps its raw input into
//! these commands and the component's methods. Keyboard input funnels
//! through [`Key`] and [`Autocomplete::handle_key`](crate::Autocomplete::handle_key);
//! pointer and drag input use the dedicated methods on the component.

/// Keyboard commands the picker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Move the highlight up (opens the dropdown as a side effect).
    Up,
    /// Move the highlight down (opens the dropdown as a side effect).
    Down,
    /// Confirm the highlighted entry.
    Enter,
    /// Close the dropdown and refocus the input.
    Escape,
    /// Close the dropdown when open, then let focus move on.
    Tab,
    /// `Tab` with the shift modifier held.
    ShiftTab,
    /// In multi-select mode with empty text, unselect the last selection.
    Backspace,
}

impl Key {
    /// Map a DOM-style key name (`event.key`) to a command.
    ///
    /// Returns `None` for keys the picker does not handle; those should be
    /// forwarded to the input element unchanged.
    pub fn from_name(name: &str, shift: bool) -> Option<Self> {
        match name {
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            "Enter" => Some(Self::Enter),
            "Escape" => Some(Self::Escape),
            "Tab" if shift => Some(Self::ShiftTab),
            "Tab" => Some(Self::Tab),
            "Backspace" => Some(Self::Backspace),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Key::from_name("ArrowDown", false), Some(Key::Down));
        assert_eq!(Key::from_name("Tab", false), Some(Key::Tab));
        assert_eq!(Key::from_name("Tab", true), Some(Key::ShiftTab));
        assert_eq!(Key::from_name("a", false), None);
    }
}
