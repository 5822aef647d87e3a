//! Event kinds — the tags a client attaches to a synchronization call.
//!
//! DESIGN
//! ======
//! Kinds travel as small integers on the wire (`et` parameter) and map to a
//! DOM event name for client-side binding. `Change` is the value-committed
//! kind: the browser fires it when an edited input loses focus or on Enter,
//! so it is the default subscription for editable widgets. Keystroke-level
//! sync (`KeyUp`) is opt-in.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A classified client interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EventKind {
    Click,
    DblClick,
    MouseDown,
    MouseMove,
    MouseOver,
    MouseOut,
    MouseUp,
    KeyDown,
    KeyPress,
    KeyUp,
    Blur,
    Change,
    Focus,
}

impl EventKind {
    pub const ALL: [EventKind; 13] = [
        Self::Click,
        Self::DblClick,
        Self::MouseDown,
        Self::MouseMove,
        Self::MouseOver,
        Self::MouseOut,
        Self::MouseUp,
        Self::KeyDown,
        Self::KeyPress,
        Self::KeyUp,
        Self::Blur,
        Self::Change,
        Self::Focus,
    ];

    /// Wire code sent by the client script.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Click => 0,
            Self::DblClick => 1,
            Self::MouseDown => 2,
            Self::MouseMove => 3,
            Self::MouseOver => 4,
            Self::MouseOut => 5,
            Self::MouseUp => 6,
            Self::KeyDown => 7,
            Self::KeyPress => 8,
            Self::KeyUp => 9,
            Self::Blur => 10,
            Self::Change => 11,
            Self::Focus => 12,
        }
    }

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// DOM event name the client binds for this kind.
    #[must_use]
    pub fn dom_name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
            Self::MouseUp => "mouseup",
            Self::KeyDown => "keydown",
            Self::KeyPress => "keypress",
            Self::KeyUp => "keyup",
            Self::Blur => "blur",
            Self::Change => "change",
            Self::Focus => "focus",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_name())
    }
}

impl From<EventKind> for u8 {
    fn from(kind: EventKind) -> Self {
        kind.code()
    }
}

/// Rejected wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown event kind code: {0}")]
pub struct UnknownEventKind(pub u8);

impl TryFrom<u8> for EventKind {
    type Error = UnknownEventKind;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(UnknownEventKind(code))
    }
}

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;
