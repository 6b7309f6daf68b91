//! Chess opening identification.
//!
//! An [`OpeningBook`] maps numbered SAN move prefixes (e.g.
//! `"1.e4 e5 2.Nf3"`) to named openings with ECO codes. Lookup probes the
//! longest prefix first, so the most specific known variation wins.

mod builtin;
mod opening;

pub use opening::OpeningMatch;

use std::collections::HashMap;

use thiserror::Error;

/// Longest prefix considered during lookup, in plies. Openings are
/// decided within the first few moves; probing further only wastes work.
const MAX_LOOKUP_PLIES: usize = 10;

#[derive(Debug, Error)]
pub enum BookError {
    /// The custom book could not be deserialized.
    #[error("failed to parse opening book: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A prefix-keyed book of named openings.
#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    entries: HashMap<String, OpeningMatch>,
}

impl OpeningBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the built-in book of common openings.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: builtin::builtin_entries(),
        }
    }

    /// Loads a custom book from JSON, a map of prefix string to opening.
    ///
    /// Entries that do not repeat the prefix in their `moves` field get it
    /// filled in from the key.
    pub fn from_json(json: &str) -> Result<Self, BookError> {
        let mut entries: HashMap<String, OpeningMatch> = serde_json::from_str(json)?;
        for (prefix, opening) in &mut entries {
            if opening.moves.is_empty() {
                opening.moves = prefix.clone();
            }
        }
        Ok(Self { entries })
    }

    /// Number of known prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds or replaces an entry for a move prefix.
    pub fn add(&mut self, prefix: impl Into<String>, opening: OpeningMatch) {
        self.entries.insert(prefix.into(), opening);
    }

    /// Identifies the opening played in a game.
    ///
    /// Probes prefixes from the longest considered length down to a single
    /// move and returns the first hit, so `1.e4 e5 2.Nf3 Nc6 3.Bb5 a6`
    /// resolves to the Ruy Lopez rather than the King's Pawn Opening.
    /// Returns `None` for an empty game or a sequence the book has never
    /// seen any prefix of.
    #[must_use]
    pub fn lookup<S: AsRef<str>>(&self, moves: &[S]) -> Option<&OpeningMatch> {
        let limit = moves.len().min(MAX_LOOKUP_PLIES);
        for length in (1..=limit).rev() {
            let prefix = prefix_string(&moves[..length]);
            if let Some(opening) = self.entries.get(&prefix) {
                return Some(opening);
            }
        }
        None
    }
}

/// Builds the numbered prefix form of a SAN move list.
///
/// White moves carry the move number ("1.e4"), Black moves follow bare,
/// joined with single spaces: `["e4", "e5", "Nf3"]` becomes
/// `"1.e4 e5 2.Nf3"`.
#[must_use]
pub fn prefix_string<S: AsRef<str>>(moves: &[S]) -> String {
    let mut parts = Vec::with_capacity(moves.len());
    for (i, mv) in moves.iter().enumerate() {
        if i % 2 == 0 {
            parts.push(format!("{}.{}", i / 2 + 1, mv.as_ref()));
        } else {
            parts.push(mv.as_ref().to_string());
        }
    }
    parts.join(" ")
}
