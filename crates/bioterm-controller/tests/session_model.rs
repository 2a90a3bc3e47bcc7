//! Property tests: the session against a plain reference model of the
//! keypad state table.

use bioterm_controller::{Action, Mode, Session};
use bioterm_core::{AdminPin, SlotId};
use bioterm_hardware::Key;
use proptest::prelude::*;

/// The state table written out as directly as possible.
#[derive(Debug, Default)]
struct Model {
    mode: Option<Mode>,
    pin: String,
    id: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Effect {
    None,
    Enroll(u8),
    Delete(u8),
}

impl Model {
    fn mode(&self) -> Mode {
        self.mode.unwrap_or(Mode::Idle)
    }

    fn go(&mut self, mode: Mode) {
        self.mode = Some(mode);
        self.pin.clear();
        self.id.clear();
    }

    fn press(&mut self, key: Key) -> Effect {
        let legend = key.as_char();
        match self.mode() {
            Mode::Idle => {
                if legend == '#' {
                    self.go(Mode::AdminAuthenticating);
                }
            }
            Mode::AdminAuthenticating => {
                if legend.is_ascii_digit() && self.pin.len() < 4 {
                    self.pin.push(legend);
                } else if legend == '*' {
                    let next = if self.pin == "1234" {
                        Mode::AdminMenu
                    } else {
                        Mode::Idle
                    };
                    self.go(next);
                } else if legend == '#' {
                    self.go(Mode::Idle);
                }
            }
            Mode::AdminMenu => match legend {
                '1' => self.go(Mode::EnrollIdEntry),
                '2' => self.go(Mode::DeleteIdEntry),
                '0' => self.go(Mode::Idle),
                _ => {}
            },
            mode @ (Mode::EnrollIdEntry | Mode::DeleteIdEntry) => {
                if legend.is_ascii_digit() && self.id.len() < 3 {
                    self.id.push(legend);
                } else if legend == '*' {
                    let id: u32 = self.id.parse().unwrap_or(0);
                    self.go(Mode::AdminMenu);
                    if (1..=127).contains(&id) {
                        let id = id as u8;
                        return if mode == Mode::EnrollIdEntry {
                            Effect::Enroll(id)
                        } else {
                            Effect::Delete(id)
                        };
                    }
                } else if legend == '#' {
                    self.go(Mode::AdminMenu);
                }
            }
        }
        Effect::None
    }
}

fn effect_of(action: Action) -> Effect {
    match action {
        Action::Enroll(slot) => Effect::Enroll(slot.as_u8()),
        Action::Delete(slot) => Effect::Delete(slot.as_u8()),
        _ => Effect::None,
    }
}

/// Keys weighted towards the ones that move the state machine.
fn key() -> impl Strategy<Value = Key> {
    prop_oneof![
        4 => (0u8..10).prop_map(Key::Digit),
        2 => Just(Key::Star),
        2 => Just(Key::Hash),
        1 => prop_oneof![Just(Key::A), Just(Key::B), Just(Key::C), Just(Key::D)],
    ]
}

/// Sequences that usually get past the PIN prompt.
fn admin_session() -> impl Strategy<Value = Vec<Key>> {
    let login = Just(vec![
        Key::Hash,
        Key::Digit(1),
        Key::Digit(2),
        Key::Digit(3),
        Key::Digit(4),
        Key::Star,
    ]);
    (login, prop::collection::vec(key(), 0..60)).prop_map(|(mut keys, rest)| {
        keys.extend(rest);
        keys
    })
}

fn check(keys: Vec<Key>) -> Result<(), TestCaseError> {
    let pin = AdminPin::default();
    let mut session = Session::new();
    let mut model = Model::default();

    for key in keys {
        let action = session.apply(key, &pin).unwrap();
        let effect = model.press(key);

        prop_assert_eq!(session.mode(), model.mode(), "after {}", key);
        prop_assert_eq!(session.pin_buffer().as_str(), model.pin.as_str());
        prop_assert_eq!(session.id_buffer().as_str(), model.id.as_str());
        prop_assert_eq!(effect_of(action), effect);
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_session_matches_model(keys in prop::collection::vec(key(), 0..150)) {
        check(keys)?;
    }

    #[test]
    fn prop_admin_sessions_match_model(keys in admin_session()) {
        check(keys)?;
    }

    #[test]
    fn prop_slot_parse_matches_range(digits in "[0-9]{0,3}") {
        let expected = digits.parse::<u32>().ok().filter(|id| (1..=127).contains(id));
        let parsed = SlotId::parse(&digits).map(|slot| u32::from(slot.as_u8()));
        prop_assert_eq!(parsed, expected);
    }
}
