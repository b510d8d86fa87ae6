#![forbid(unsafe_code)]

//! Canonical input event types.
//!
//! Hosts translate their native input (DOM keyboard/pointer events, or
//! crossterm events behind the `crossterm` feature) into these types before
//! handing them to interactive components.
//!
//! # Design Notes
//!
//! - Pointer coordinates are logical pixels relative to the host viewport.
//! - `KeyEventKind` defaults to `Press` when the host cannot distinguish.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;
#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
use crossterm::event as cte;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A pointer (mouse, pen, touch) event.
    Pointer(PointerEvent),
}

impl Event {
    /// Convert a crossterm event into a canonical [`Event`].
    ///
    /// Only key presses and pointer presses/releases are mapped; everything
    /// else returns `None`.
    #[must_use]
    #[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        match event {
            cte::Event::Key(key) => map_key_event(key).map(Event::Key),
            cte::Event::Mouse(mouse) => map_mouse_event(mouse).map(Event::Pointer),
            _ => None,
        }
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with no modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Super/Meta/Cmd modifier is held.
    #[must_use]
    pub const fn super_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SUPER)
    }

    /// Check if a "command" chord is held: Ctrl on most hosts, Cmd on macOS.
    #[must_use]
    pub const fn command(&self) -> bool {
        self.ctrl() || self.super_key()
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Delete key.
    Delete,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// Press or release.
    pub kind: PointerEventKind,

    /// X coordinate in logical pixels.
    pub x: i32,

    /// Y coordinate in logical pixels.
    pub y: i32,
}

impl PointerEvent {
    /// A pointer-down at the given position.
    #[must_use]
    pub const fn down(x: i32, y: i32) -> Self {
        Self {
            kind: PointerEventKind::Down,
            x,
            y,
        }
    }

    /// A pointer-up at the given position.
    #[must_use]
    pub const fn up(x: i32, y: i32) -> Self {
        Self {
            kind: PointerEventKind::Up,
            x,
            y,
        }
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Primary button or touch went down.
    Down,
    /// Primary button or touch was released.
    Up,
}

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
fn map_key_event(event: cte::KeyEvent) -> Option<KeyEvent> {
    let code = map_key_code(event.code)?;
    Some(KeyEvent {
        code,
        modifiers: map_modifiers(event.modifiers),
        kind: match event.kind {
            cte::KeyEventKind::Press => KeyEventKind::Press,
            cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
            cte::KeyEventKind::Release => KeyEventKind::Release,
        },
    })
}

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
fn map_key_code(code: cte::KeyCode) -> Option<KeyCode> {
    match code {
        cte::KeyCode::Backspace => Some(KeyCode::Backspace),
        cte::KeyCode::Enter => Some(KeyCode::Enter),
        cte::KeyCode::Left => Some(KeyCode::Left),
        cte::KeyCode::Right => Some(KeyCode::Right),
        cte::KeyCode::Up => Some(KeyCode::Up),
        cte::KeyCode::Down => Some(KeyCode::Down),
        cte::KeyCode::Home => Some(KeyCode::Home),
        cte::KeyCode::End => Some(KeyCode::End),
        cte::KeyCode::PageUp => Some(KeyCode::PageUp),
        cte::KeyCode::PageDown => Some(KeyCode::PageDown),
        cte::KeyCode::Tab => Some(KeyCode::Tab),
        cte::KeyCode::Delete => Some(KeyCode::Delete),
        cte::KeyCode::Char(c) => Some(KeyCode::Char(c)),
        cte::KeyCode::Esc => Some(KeyCode::Escape),
        _ => None,
    }
}

#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.contains(cte::KeyModifiers::SUPER)
        || modifiers.contains(cte::KeyModifiers::HYPER)
        || modifiers.contains(cte::KeyModifiers::META)
    {
        mapped |= Modifiers::SUPER;
    }
    mapped
}

/// Terminal cells become one logical pixel each.
#[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
fn map_mouse_event(event: cte::MouseEvent) -> Option<PointerEvent> {
    let x = i32::from(event.column);
    let y = i32::from(event.row);
    match event.kind {
        cte::MouseEventKind::Down(_) => Some(PointerEvent::down(x, y)),
        cte::MouseEventKind::Up(_) => Some(PointerEvent::up(x, y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_builders() {
        let ev = KeyEvent::new(KeyCode::Char('k')).with_modifiers(Modifiers::CTRL);
        assert!(ev.is_char('k'));
        assert!(ev.ctrl());
        assert!(ev.command());
        assert!(!ev.super_key());
        assert_eq!(ev.kind, KeyEventKind::Press);
    }

    #[test]
    fn super_counts_as_command() {
        let ev = KeyEvent::new(KeyCode::Char('1')).with_modifiers(Modifiers::SUPER);
        assert!(ev.command());
    }

    #[test]
    fn key_event_from_code() {
        let ev: KeyEvent = KeyCode::Enter.into();
        assert_eq!(ev, KeyEvent::new(KeyCode::Enter));
    }

    #[cfg(all(feature = "crossterm", not(target_arch = "wasm32")))]
    mod crossterm_mapping {
        use super::super::*;
        use crossterm::event as ct_event;

        #[test]
        fn maps_key_with_modifiers() {
            let ct = ct_event::Event::Key(ct_event::KeyEvent {
                code: ct_event::KeyCode::Char('p'),
                modifiers: ct_event::KeyModifiers::CONTROL | ct_event::KeyModifiers::SHIFT,
                kind: ct_event::KeyEventKind::Press,
                state: ct_event::KeyEventState::NONE,
            });
            let mapped = Event::from_crossterm(ct).expect("should map");
            let Event::Key(key) = mapped else {
                panic!("expected key event");
            };
            assert!(key.is_char('p'));
            assert!(key.modifiers.contains(Modifiers::CTRL | Modifiers::SHIFT));
        }

        #[test]
        fn maps_escape() {
            let ct = ct_event::Event::Key(ct_event::KeyEvent::new(
                ct_event::KeyCode::Esc,
                ct_event::KeyModifiers::NONE,
            ));
            assert_eq!(
                Event::from_crossterm(ct),
                Some(Event::Key(KeyEvent::new(KeyCode::Escape)))
            );
        }

        #[test]
        fn maps_mouse_down_to_pointer() {
            let ct = ct_event::Event::Mouse(ct_event::MouseEvent {
                kind: ct_event::MouseEventKind::Down(ct_event::MouseButton::Left),
                column: 10,
                row: 5,
                modifiers: ct_event::KeyModifiers::NONE,
            });
            assert_eq!(
                Event::from_crossterm(ct),
                Some(Event::Pointer(PointerEvent::down(10, 5)))
            );
        }

        #[test]
        fn ignores_mouse_moves_and_resize() {
            let moved = ct_event::Event::Mouse(ct_event::MouseEvent {
                kind: ct_event::MouseEventKind::Moved,
                column: 1,
                row: 1,
                modifiers: ct_event::KeyModifiers::NONE,
            });
            assert_eq!(Event::from_crossterm(moved), None);
            assert_eq!(Event::from_crossterm(ct_event::Event::Resize(80, 24)), None);
        }
    }
}
