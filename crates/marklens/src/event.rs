#![forbid(unsafe_code)]

//! Input events.
//!
//! Mouse coordinates are 0-indexed cells. Key release events are dropped
//! at the session boundary, so every [`KeyEvent`] is a press or repeat.

use bitflags::bitflags;

/// Input delivered to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize { width: u16, height: u16 },
    /// The model asked to be woken and its deadline passed.
    Tick,
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }
}

/// Keys the app distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
    }
}

/// A mouse event at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: u16,
    pub y: u16,
}

impl MouseEvent {
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self { kind, x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    Moved,
    ScrollUp,
    ScrollDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl From<char> for Event {
    fn from(c: char) -> Self {
        Event::Key(KeyEvent::new(KeyCode::Char(c)))
    }
}

impl From<KeyCode> for Event {
    fn from(code: KeyCode) -> Self {
        Event::Key(KeyEvent::new(code))
    }
}

/// Map a crossterm event. Returns `None` for events the app ignores.
#[must_use]
pub fn from_crossterm(event: crossterm::event::Event) -> Option<Event> {
    use crossterm::event as ct;
    match event {
        ct::Event::Key(key) => {
            if key.kind == ct::KeyEventKind::Release {
                return None;
            }
            let code = map_key_code(key.code)?;
            Some(Event::Key(KeyEvent {
                code,
                modifiers: map_modifiers(key.modifiers),
            }))
        }
        ct::Event::Mouse(mouse) => {
            let kind = match mouse.kind {
                ct::MouseEventKind::Down(b) => MouseEventKind::Down(map_button(b)),
                ct::MouseEventKind::Up(b) => MouseEventKind::Up(map_button(b)),
                ct::MouseEventKind::Drag(b) => MouseEventKind::Drag(map_button(b)),
                ct::MouseEventKind::Moved => MouseEventKind::Moved,
                ct::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
                ct::MouseEventKind::ScrollDown => MouseEventKind::ScrollDown,
                ct::MouseEventKind::ScrollLeft | ct::MouseEventKind::ScrollRight => return None,
            };
            Some(Event::Mouse(MouseEvent::new(kind, mouse.column, mouse.row)))
        }
        ct::Event::Resize(width, height) => Some(Event::Resize { width, height }),
        ct::Event::Paste(_) | ct::Event::FocusGained | ct::Event::FocusLost => None,
    }
}

fn map_key_code(code: crossterm::event::KeyCode) -> Option<KeyCode> {
    use crossterm::event::KeyCode as K;
    Some(match code {
        K::Char(c) => KeyCode::Char(c),
        K::Enter => KeyCode::Enter,
        K::Esc => KeyCode::Escape,
        K::Backspace => KeyCode::Backspace,
        K::Tab => KeyCode::Tab,
        K::BackTab => KeyCode::BackTab,
        K::Up => KeyCode::Up,
        K::Down => KeyCode::Down,
        K::Left => KeyCode::Left,
        K::Right => KeyCode::Right,
        K::Home => KeyCode::Home,
        K::End => KeyCode::End,
        K::PageUp => KeyCode::PageUp,
        K::PageDown => KeyCode::PageDown,
        _ => return None,
    })
}

fn map_modifiers(modifiers: crossterm::event::KeyModifiers) -> Modifiers {
    use crossterm::event::KeyModifiers as M;
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(M::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(M::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(M::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    mapped
}

fn map_button(button: crossterm::event::MouseButton) -> MouseButton {
    match button {
        crossterm::event::MouseButton::Left => MouseButton::Left,
        crossterm::event::MouseButton::Right => MouseButton::Right,
        crossterm::event::MouseButton::Middle => MouseButton::Middle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event as ct;

    #[test]
    fn maps_ctrl_c() {
        let ev = ct::Event::Key(ct::KeyEvent::new(ct::KeyCode::Char('c'), ct::KeyModifiers::CONTROL));
        let Some(Event::Key(key)) = from_crossterm(ev) else {
            panic!("expected key");
        };
        assert!(key.is_char('c'));
        assert!(key.ctrl());
    }

    #[test]
    fn drops_releases_and_unknown_keys() {
        let mut release = ct::KeyEvent::new(ct::KeyCode::Char('a'), ct::KeyModifiers::NONE);
        release.kind = ct::KeyEventKind::Release;
        assert_eq!(from_crossterm(ct::Event::Key(release)), None);
        let f1 = ct::KeyEvent::new(ct::KeyCode::F(1), ct::KeyModifiers::NONE);
        assert_eq!(from_crossterm(ct::Event::Key(f1)), None);
    }

    #[test]
    fn maps_mouse_and_resize() {
        let ev = ct::Event::Mouse(ct::MouseEvent {
            kind: ct::MouseEventKind::Drag(ct::MouseButton::Left),
            column: 4,
            row: 7,
            modifiers: ct::KeyModifiers::NONE,
        });
        assert_eq!(
            from_crossterm(ev),
            Some(Event::Mouse(MouseEvent::new(
                MouseEventKind::Drag(MouseButton::Left),
                4,
                7
            )))
        );
        assert_eq!(
            from_crossterm(ct::Event::Resize(80, 24)),
            Some(Event::Resize {
                width: 80,
                height: 24
            })
        );
    }
}
