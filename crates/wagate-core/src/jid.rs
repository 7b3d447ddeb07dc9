// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Address resolution from caller-entered phone numbers.
//!
//! A [`Jid`] can only be obtained through [`resolve`], so every address in
//! the system has passed the same validation. Resolution is pure and needs
//! no synchronization.

use std::fmt;

/// Server part used for individual user accounts.
pub const DEFAULT_USER_SERVER: &str = "s.whatsapp.net";

/// Legacy server alias still produced by older clients.
const LEGACY_USER_SERVER: &str = "c.us";

/// E.164 numbers carry at most 15 digits including the country code.
const MAX_DIGITS: usize = 15;

/// Shortest country code + subscriber number combination in use.
const MIN_DIGITS: usize = 7;

/// Canonical network address of a user account (`<user>@<server>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jid {
    user: String,
    server: String,
}

impl Jid {
    /// The user part, i.e. the digits of the phone number.
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn server(&self) -> &str {
        &self.server
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.server)
    }
}

/// Resolve a phone number into a user address.
///
/// Accepts an optional leading `+`, common separators (spaces, dashes, dots,
/// parentheses) and an explicit `@s.whatsapp.net` / `@c.us` suffix. Returns
/// `None` for anything else.
pub fn resolve(phone: &str) -> Option<Jid> {
    let phone = phone.trim();
    let (number, server) = match phone.split_once('@') {
        Some((user, server)) => (user, server),
        None => (phone, DEFAULT_USER_SERVER),
    };

    if server != DEFAULT_USER_SERVER && server != LEGACY_USER_SERVER {
        return None;
    }

    let user = normalize_number(number)?;
    Some(Jid {
        user,
        server: DEFAULT_USER_SERVER.to_string(),
    })
}

fn normalize_number(raw: &str) -> Option<String> {
    let raw = raw.strip_prefix('+').unwrap_or(raw);

    let mut digits = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return None,
        }
    }

    // Country codes never start with 0.
    if digits.starts_with('0') {
        return None;
    }
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        return None;
    }
    Some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn resolves_plain_digits() {
        let jid = resolve("5511888880000").unwrap();
        assert_eq!(jid.user(), "5511888880000");
        assert_eq!(jid.server(), DEFAULT_USER_SERVER);
        assert_eq!(jid.to_string(), "5511888880000@s.whatsapp.net");
    }

    #[test]
    fn strips_plus_and_separators() {
        let jid = resolve(" +55 (11) 98888-0000 ").unwrap();
        assert_eq!(jid.user(), "5511988880000");
    }

    #[test]
    fn accepts_explicit_server_suffix() {
        assert_eq!(
            resolve("5511888880000@s.whatsapp.net").unwrap().user(),
            "5511888880000"
        );
        let legacy = resolve("5511888880000@c.us").unwrap();
        assert_eq!(legacy.server(), DEFAULT_USER_SERVER);
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in [
            "",
            "   ",
            "+",
            "not-a-number",
            "5511abc80000",
            "++5511888880000",
            "0011888880000",
            "123",
            "1234567890123456",
            "5511888880000@g.us",
            "@s.whatsapp.net",
            "5511888880000@",
        ] {
            assert!(resolve(bad).is_none(), "expected {bad:?} to be rejected");
        }
    }

    proptest! {
        #[test]
        fn any_letter_is_rejected(prefix in "[0-9]{0,8}", letter in "[a-zA-Z]", suffix in "[0-9]{0,8}") {
            let phone = format!("{prefix}{letter}{suffix}");
            prop_assert!(resolve(&phone).is_none());
        }

        #[test]
        fn valid_numbers_resolve_to_their_digits(number in "[1-9][0-9]{6,14}") {
            let jid = resolve(&number).expect("valid number should resolve");
            prop_assert_eq!(jid.user(), number.as_str());
        }

        #[test]
        fn resolution_is_deterministic(input in "\\PC{0,20}") {
            prop_assert_eq!(resolve(&input), resolve(&input));
        }
    }
}
