//! School codes and slugs.
//!
//! A school code is the six-character identifier people type on the login
//! screen. Generated codes are three letters taken from the school name
//! followed by three digits, e.g. `SPR482` for "Springfield High".

use std::fmt;

use rand::Rng;

use crate::errors::CampusError;

pub const CODE_LEN: usize = 6;
const PREFIX_LEN: usize = 3;
const PREFIX_PAD: char = 'X';

/// A normalized (trimmed, upper-cased) six-character code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchoolCode(String);

impl SchoolCode {
    /// Normalize user input. Anything that is not exactly six ASCII
    /// alphanumerics is an invalid code.
    pub fn parse(input: &str) -> Result<Self, CampusError> {
        let code = input.trim().to_ascii_uppercase();
        if code.len() != CODE_LEN || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CampusError::InvalidCode);
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SchoolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First three letters of the name, upper-cased, padded with `X`.
pub fn code_prefix(name: &str) -> String {
    let mut prefix: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(PREFIX_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    while prefix.len() < PREFIX_LEN {
        prefix.push(PREFIX_PAD);
    }
    prefix
}

/// Generate a candidate code. Uniqueness is the caller's concern.
pub fn generate_code<R: Rng + ?Sized>(name: &str, rng: &mut R) -> SchoolCode {
    let suffix: u16 = rng.gen_range(100..=999);
    SchoolCode(format!("{}{suffix}", code_prefix(name)))
}

/// `"Springfield High!"` -> `"springfield-high"`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().map(|c| c.to_ascii_lowercase()) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}
