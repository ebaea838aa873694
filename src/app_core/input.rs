//! Runtime-agnostic input event types.
//!
//! The native (crossterm) and web (ratzilla) runtimes translate their own
//! events into these before handing them to the reducer.

/// Key codes the application reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKeyCode {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Tab,
    BackTab,
    Enter,
    Esc,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
}

#[derive(Debug, Clone, Copy)]
pub struct AppKeyEvent {
    pub code: AppKeyCode,
    pub ctrl: bool,
    pub alt: bool,
    /// `true` when the key was released; the reducer ignores these.
    pub is_release: bool,
}

impl AppKeyEvent {
    pub fn new(code: AppKeyCode) -> Self {
        Self {
            code,
            ctrl: false,
            alt: false,
            is_release: false,
        }
    }

    pub fn ctrl(code: AppKeyCode) -> Self {
        Self {
            ctrl: true,
            ..Self::new(code)
        }
    }

    pub fn alt(code: AppKeyCode) -> Self {
        Self {
            alt: true,
            ..Self::new(code)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMouseKind {
    LeftDown,
    ScrollUp,
    ScrollDown,
}

/// A mouse event already expressed in terminal cell coordinates.
///
/// Pixel to cell conversion belongs to the runtime adapter.
#[derive(Debug, Clone, Copy)]
pub struct AppMouseEvent {
    pub kind: AppMouseKind,
    pub column: u16,
    pub row: u16,
}

impl AppMouseEvent {
    pub fn new(kind: AppMouseKind, column: u16, row: u16) -> Self {
        Self { kind, column, row }
    }
}
