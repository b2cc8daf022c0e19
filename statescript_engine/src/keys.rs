//! Key-name to key-code resolution for the keyboard listener actions.
//!
//! Codes follow the legacy DOM `event.which` values the authoring tool
//! emits, so graphs written against the editor keep working unchanged.

use std::collections::HashMap;

use once_cell::sync::Lazy;

pub const KEY_LEFT: u32 = 37;
pub const KEY_UP: u32 = 38;
pub const KEY_RIGHT: u32 = 39;
pub const KEY_DOWN: u32 = 40;

pub const KEY_W: u32 = 87;
pub const KEY_A: u32 = 65;
pub const KEY_S: u32 = 83;
pub const KEY_D: u32 = 68;

static KEY_CODES: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    let mut codes = HashMap::new();
    codes.insert("backspace", 8);
    codes.insert("tab", 9);
    codes.insert("enter", 13);
    codes.insert("shift", 16);
    codes.insert("ctrl", 17);
    codes.insert("alt", 18);
    codes.insert("pause", 19);
    codes.insert("capslock", 20);
    codes.insert("esc", 27);
    codes.insert("space", 32);
    codes.insert("pageup", 33);
    codes.insert("pagedown", 34);
    codes.insert("end", 35);
    codes.insert("home", 36);
    codes.insert("left", KEY_LEFT);
    codes.insert("up", KEY_UP);
    codes.insert("right", KEY_RIGHT);
    codes.insert("down", KEY_DOWN);
    codes.insert("insert", 45);
    codes.insert("delete", 46);
    for (offset, name) in [
        "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12",
    ]
    .into_iter()
    .enumerate()
    {
        codes.insert(name, 112 + offset as u32);
    }
    codes
});

/// Resolve a key name the editor emits ("A", "space", "Up") to its code.
/// Single alphanumeric characters map to their uppercase ASCII code.
pub fn key_code(name: &str) -> Option<u32> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch.is_ascii_alphanumeric() {
            return Some(ch.to_ascii_uppercase() as u32);
        }
    }
    KEY_CODES.get(trimmed.to_ascii_lowercase().as_str()).copied()
}
