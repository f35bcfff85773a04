//! Reversible escaping of folder and file names.
//!
//! A name becomes a *token* that never contains the path delimiter (`/`) or the
//! store-key separator (`.`), so tokens can be embedded both in composite paths and
//! in store keys. `~` introduces a two-character escape:
//!
//! | name char | token   |
//! |-----------|---------|
//! | `~`       | `~~`    |
//! | `/`       | `~s`    |
//! | `.`       | `~d`    |
//! | (empty)   | `~e`    |
//!
//! The empty name gets its own token because an empty segment would be
//! indistinguishable from "no segment".

/// Composite path delimiter.
pub const DELIMITER: char = '/';
/// Store-key separator.
pub const KEY_SEPARATOR: char = '.';
/// Escape character.
pub const ESCAPE: char = '~';

const EMPTY_TOKEN: &str = "~e";

/// Encodes `name` into a token free of reserved characters.
pub fn encode(name: &str) -> String {
    if name.is_empty() {
        return EMPTY_TOKEN.to_string();
    }
    let mut token = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            ESCAPE => token.push_str("~~"),
            DELIMITER => token.push_str("~s"),
            KEY_SEPARATOR => token.push_str("~d"),
            other => token.push(other),
        }
    }
    token
}

#[derive(Copy, Clone, PartialEq)]
enum State {
    Normal,
    Escaped,
}

/// Decodes a token produced by [`encode`] back into the original name.
///
/// Tokens that [`encode`] cannot produce are decoded best-effort: unknown escapes
/// and a dangling `~` are kept verbatim.
pub fn decode(token: &str) -> String {
    if token == EMPTY_TOKEN {
        return String::new();
    }
    let mut name = String::with_capacity(token.len());
    let mut state = State::Normal;
    for ch in token.chars() {
        state = match (state, ch) {
            (State::Normal, ESCAPE) => State::Escaped,
            (State::Normal, other) => {
                name.push(other);
                State::Normal
            }
            (State::Escaped, ESCAPE) => {
                name.push(ESCAPE);
                State::Normal
            }
            (State::Escaped, 's') => {
                name.push(DELIMITER);
                State::Normal
            }
            (State::Escaped, 'd') => {
                name.push(KEY_SEPARATOR);
                State::Normal
            }
            (State::Escaped, other) => {
                name.push(ESCAPE);
                name.push(other);
                State::Normal
            }
        };
    }
    if state == State::Escaped {
        name.push(ESCAPE);
    }
    name
}

/// Checks that `token` is exactly something [`encode`] could have returned.
pub fn is_token(token: &str) -> bool {
    if token == EMPTY_TOKEN {
        return true;
    }
    if token.is_empty() {
        return false;
    }
    let mut state = State::Normal;
    for ch in token.chars() {
        state = match (state, ch) {
            (State::Normal, ESCAPE) => State::Escaped,
            (State::Normal, DELIMITER | KEY_SEPARATOR) => return false,
            (State::Normal, _) => State::Normal,
            (State::Escaped, ESCAPE | 's' | 'd') => State::Normal,
            (State::Escaped, _) => return false,
        };
    }
    state == State::Normal
}
