use crossterm::event::{poll, read, Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use log::warn;
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

/// map of keys on the left-hand side of a qwerty keyboard to the hex keypad
///
///   1 2 3 C        1 2 3 4
///   4 5 6 D   <=   q w e r
///   7 8 9 E        a s d f
///   A 0 B F        z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// terminals don't report key-up, so a press counts as held for this long
const KEY_HOLD: Duration = Duration::from_millis(150);

/// The 16-key hex keypad as the interpreter sees it
pub trait Keypad {
    /// is `key` held down right now; anything above 0xF never is
    fn is_pressed(&self, key: u8) -> bool;

    /// the most recent press not yet consumed, consuming it
    fn take_pressed(&mut self) -> Option<u8>;

    /// pick up pending events from the device
    fn poll(&mut self) -> Result<(), io::Error> {
        Ok(())
    }

    /// the user asked to leave
    fn quit_requested(&self) -> bool {
        false
    }
}

/// Key state built from press events only. A key stays down for
/// [`KEY_HOLD`] after its latest press.
#[derive(Debug, Default)]
struct KeyHold {
    held: [Option<Instant>; 16],
    last: Option<u8>,
}

impl KeyHold {
    fn press(&mut self, key: u8, now: Instant) {
        let key = key & 0xf;
        self.held[key as usize] = Some(now);
        self.last = Some(key);
    }

    /// release keys pressed more than KEY_HOLD before `now`; an unconsumed
    /// press of a released key goes with it
    fn expire(&mut self, now: Instant) {
        for (key, held) in self.held.iter_mut().enumerate() {
            if matches!(held, Some(t) if now.saturating_duration_since(*t) > KEY_HOLD) {
                *held = None;
                if self.last == Some(key as u8) {
                    self.last = None;
                }
            }
        }
    }

    fn is_pressed(&self, key: u8) -> bool {
        self.held.get(key as usize).map_or(false, |h| h.is_some())
    }

    fn take_pressed(&mut self) -> Option<u8> {
        self.last.take()
    }
}

/// simple implementation of Keypad, using terminal key events
pub struct StdinInput {
    keymap: HashMap<char, u8>,
    keys: KeyHold,
    quit: bool,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            keys: KeyHold::default(),
            quit: false,
        })
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Keypad for StdinInput {
    fn is_pressed(&self, key: u8) -> bool {
        self.keys.is_pressed(key)
    }

    fn take_pressed(&mut self) -> Option<u8> {
        self.keys.take_pressed()
    }

    fn poll(&mut self) -> Result<(), io::Error> {
        let now = Instant::now();
        self.keys.expire(now);
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.quit = true
                    }
                    KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                        Some(mapped_key) => self.keys.press(*mapped_key, now),
                        None => warn!("can't map {:?} to a COSMAC key", key),
                    },
                    KeyCode::Esc => self.quit = true,
                    other => warn!("unknown key event {:?}", other),
                },
                Event::Resize(..) => {}
                other => warn!("unknown event {:?}", other),
            }
        }
        Ok(())
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }
}

/// scriptable Keypad implementation for testing
#[derive(Debug, Default)]
pub struct DummyInput {
    keys: u16,
    last: Option<u8>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        let mut input = DummyInput::default();
        for k in keys {
            input.press(*k);
        }
        input
    }

    pub fn press(&mut self, key: u8) {
        self.keys |= 1 << (key & 0xf);
        self.last = Some(key & 0xf);
    }

    pub fn release(&mut self, key: u8) {
        self.keys &= !(1 << (key & 0xf));
        if self.last == Some(key & 0xf) {
            self.last = None;
        }
    }
}

impl Keypad for DummyInput {
    fn is_pressed(&self, key: u8) -> bool {
        key < 16 && self.keys & (1 << key) != 0
    }

    fn take_pressed(&mut self) -> Option<u8> {
        self.last.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keymap_covers_keypad() {
        let mut keys: Vec<u8> = CHIP8_CONVENTIONAL_KEYMAP.iter().map(|(_, k)| *k).collect();
        keys.sort();
        assert_eq!(keys, (0..16).collect::<Vec<u8>>());
    }

    #[test]
    fn test_take_pressed_is_one_shot() {
        let mut input = DummyInput::new(&[0x7]);
        assert_eq!(input.take_pressed(), Some(0x7));
        assert_eq!(input.take_pressed(), None);
        // still held though
        assert!(input.is_pressed(0x7));
    }

    #[test]
    fn test_release_forgets_unconsumed_press() {
        let mut input = DummyInput::default();
        input.press(0xa);
        input.release(0xa);
        assert!(!input.is_pressed(0xa));
        assert_eq!(input.take_pressed(), None);
    }

    #[test]
    fn test_out_of_range_key_never_pressed() {
        let input = DummyInput::new(&[0x0, 0xf]);
        assert!(input.is_pressed(0xf));
        assert!(!input.is_pressed(0x10));
        assert!(!input.is_pressed(0xff));
    }

    #[test]
    fn test_key_held_until_hold_expires() {
        let t0 = Instant::now();
        let mut keys = KeyHold::default();
        keys.press(0x5, t0);
        keys.expire(t0 + KEY_HOLD);
        assert!(keys.is_pressed(0x5));
        keys.expire(t0 + KEY_HOLD + Duration::from_millis(1));
        assert!(!keys.is_pressed(0x5));
    }

    #[test]
    fn test_expiry_drops_unconsumed_press() {
        let t0 = Instant::now();
        let mut keys = KeyHold::default();
        keys.press(0x3, t0);
        keys.expire(t0 + Duration::from_millis(200));
        assert_eq!(keys.take_pressed(), None);
    }

    #[test]
    fn test_expiry_keeps_press_of_other_key() {
        let t0 = Instant::now();
        let mut keys = KeyHold::default();
        keys.press(0x1, t0);
        keys.press(0x2, t0 + Duration::from_millis(100));
        keys.expire(t0 + Duration::from_millis(200));
        assert!(!keys.is_pressed(0x1));
        assert!(keys.is_pressed(0x2));
        assert_eq!(keys.take_pressed(), Some(0x2));
        assert_eq!(keys.take_pressed(), None);
    }

    #[test]
    fn test_repress_extends_hold() {
        let t0 = Instant::now();
        let mut keys = KeyHold::default();
        keys.press(0xc, t0);
        keys.press(0xc, t0 + Duration::from_millis(100));
        keys.expire(t0 + Duration::from_millis(200));
        assert!(keys.is_pressed(0xc));
        assert!(!keys.is_pressed(0x10));
    }
}
