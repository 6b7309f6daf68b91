//! Core opening types.

use serde::{Deserialize, Serialize};

/// A named opening matched against a game's move sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningMatch {
    /// The ECO code for this opening (e.g., "B20", "C44").
    pub eco: String,
    /// The name of the opening.
    pub name: String,
    /// Variation name, if the line is specific enough to have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    /// Canonical move prefix in numbered SAN, e.g. "1.e4 e5 2.Nf3".
    #[serde(default)]
    pub moves: String,
}

impl OpeningMatch {
    /// Creates a new opening match without a variation.
    #[must_use]
    pub fn new(
        eco: impl Into<String>,
        name: impl Into<String>,
        moves: impl Into<String>,
    ) -> Self {
        Self {
            eco: eco.into(),
            name: name.into(),
            variation: None,
            moves: moves.into(),
        }
    }

    /// Sets the variation name.
    #[must_use]
    pub fn with_variation(mut self, variation: impl Into<String>) -> Self {
        self.variation = Some(variation.into());
        self
    }

    /// Name with the variation appended, e.g. "Ruy Lopez: Spanish Opening".
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.variation {
            Some(variation) => format!("{}: {}", self.name, variation),
            None => self.name.clone(),
        }
    }

    /// Full description including the ECO code, e.g. "C60 - Ruy Lopez".
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} - {}", self.eco, self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_without_variation() {
        let opening = OpeningMatch::new("B20", "Sicilian Defense", "1.e4 c5");
        assert_eq!(opening.display_name(), "Sicilian Defense");
        assert_eq!(opening.description(), "B20 - Sicilian Defense");
    }

    #[test]
    fn display_name_with_variation() {
        let opening = OpeningMatch::new("C60", "Ruy Lopez", "1.e4 e5 2.Nf3 Nc6 3.Bb5")
            .with_variation("Spanish Opening");
        assert_eq!(opening.display_name(), "Ruy Lopez: Spanish Opening");
        assert_eq!(opening.description(), "C60 - Ruy Lopez: Spanish Opening");
    }

    #[test]
    fn serialization_skips_missing_variation() {
        let opening = OpeningMatch::new("A10", "English Opening", "1.c4");
        let json = serde_json::to_string(&opening).unwrap();
        assert!(!json.contains("variation"));
    }
}
