//! Stable keys for players, teams and divisions.
//!
//! Normalization trims, collapses internal whitespace and lowercases. It is
//! only used to build document ids; attendance matching still compares the
//! stored display names exactly, so two spellings of one player remain two
//! attendance identities.

pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `"{team}::{player}"` over normalized names.
pub fn player_key(team: &str, player: &str) -> String {
    format!("{}::{}", normalize_name(team), normalize_name(player))
}

/// Lowercase ascii-alphanumeric slug with single dashes.
pub fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut dash = false;
    for c in raw.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            dash = false;
        } else if !dash && !out.is_empty() {
            out.push('-');
            dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
