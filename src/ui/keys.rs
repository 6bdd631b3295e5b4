/// Keyboard mapping
///
/// Turns iced key events into user intents using the configured bindings.
use iced::keyboard::Key;
use std::collections::HashMap;

use crate::selection::MoveDirection;
use crate::state::config::KeyBindings;

/// Something the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Next,
    Previous,
    Grow,
    Shrink,
    Move(MoveDirection),
    Reset,
    ToggleOutline,
    Save,
    Undo,
    Help,
    Quit,
}

impl Intent {
    fn describe(self) -> &'static str {
        match self {
            Intent::Next => "Next image",
            Intent::Previous => "Previous image",
            Intent::Grow => "Grow selection",
            Intent::Shrink => "Shrink selection",
            Intent::Move(MoveDirection::Up) => "Move selection up",
            Intent::Move(MoveDirection::Down) => "Move selection down",
            Intent::Move(MoveDirection::Left) => "Move selection left",
            Intent::Move(MoveDirection::Right) => "Move selection right",
            Intent::Reset => "Reset selection",
            Intent::ToggleOutline => "Toggle outline color",
            Intent::Save => "Save crop",
            Intent::Undo => "Delete last saved crop",
            Intent::Help => "Show this help",
            Intent::Quit => "Quit",
        }
    }
}

fn bindings(keys: &KeyBindings) -> [(Intent, &Vec<String>); 14] {
    [
        (Intent::Next, &keys.next),
        (Intent::Previous, &keys.previous),
        (Intent::Grow, &keys.grow),
        (Intent::Shrink, &keys.shrink),
        (Intent::Move(MoveDirection::Up), &keys.up),
        (Intent::Move(MoveDirection::Down), &keys.down),
        (Intent::Move(MoveDirection::Left), &keys.left),
        (Intent::Move(MoveDirection::Right), &keys.right),
        (Intent::Reset, &keys.reset),
        (Intent::ToggleOutline, &keys.toggle_outline),
        (Intent::Save, &keys.save),
        (Intent::Undo, &keys.undo),
        (Intent::Help, &keys.help),
        (Intent::Quit, &keys.quit),
    ]
}

/// Lookup table from key name to intent
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    map: HashMap<String, Intent>,
    help: String,
}

impl KeyMap {
    /// Build from bindings. If a key is bound twice, the first binding wins.
    pub fn new(keys: &KeyBindings) -> Self {
        let mut map = HashMap::new();
        let mut help = String::new();

        for (intent, names) in bindings(keys) {
            for name in names {
                map.entry(name.clone()).or_insert(intent);
            }
            help.push_str(&format!("{:<12} {}\n", names.join(" "), intent.describe()));
        }

        Self { map, help }
    }

    /// Intent bound to a key name ("." or "ArrowUp")
    pub fn lookup(&self, name: &str) -> Option<Intent> {
        self.map.get(name).copied()
    }

    /// Intent bound to an iced key event
    pub fn intent_for(&self, key: &Key) -> Option<Intent> {
        match key {
            Key::Character(c) => self.lookup(c.as_str()),
            Key::Named(named) => self.lookup(&format!("{:?}", named)),
            Key::Unidentified => None,
        }
    }

    /// One line per intent, for the help dialog
    pub fn help(&self) -> &str {
        &self.help
    }
}
