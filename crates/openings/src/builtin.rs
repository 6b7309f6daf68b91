//! Built-in opening data.
//!
//! Covers the common first moves of every major opening family, keyed by
//! the numbered SAN prefix the book looks up (e.g. "1.e4 e5 2.Nf3").

use std::collections::HashMap;

use crate::opening::OpeningMatch;

pub(crate) fn builtin_entries() -> HashMap<String, OpeningMatch> {
    let mut entries = HashMap::new();

    let mut add = |prefix: &str, eco: &str, name: &str, variation: Option<&str>| {
        let mut opening = OpeningMatch::new(eco, name, prefix);
        if let Some(variation) = variation {
            opening = opening.with_variation(variation);
        }
        entries.insert(prefix.to_string(), opening);
    };

    // King's Pawn openings
    add("1.e4", "B00", "King's Pawn Opening", None);
    add("1.e4 e5", "C20", "King's Pawn Game", None);
    add("1.e4 e5 2.Nf3", "C40", "King's Knight Opening", None);
    add("1.e4 e5 2.Nf3 Nc6", "C44", "King's Pawn Game", None);
    add(
        "1.e4 e5 2.Nf3 Nc6 3.Bb5",
        "C60",
        "Ruy Lopez",
        Some("Spanish Opening"),
    );
    add("1.e4 e5 2.Nf3 Nc6 3.Bc4", "C50", "Italian Game", None);
    add(
        "1.e4 e5 2.Nf3 Nc6 3.Bc4 Bc5",
        "C50",
        "Italian Game",
        Some("Giuoco Piano"),
    );
    add(
        "1.e4 e5 2.Nf3 Nc6 3.Bc4 Nf6",
        "C55",
        "Italian Game",
        Some("Two Knights Defense"),
    );
    add(
        "1.e4 e5 2.Nf3 Nf6",
        "C42",
        "Petrov's Defense",
        Some("Russian Game"),
    );
    add("1.e4 c5", "B20", "Sicilian Defense", None);
    add("1.e4 c5 2.Nf3", "B20", "Sicilian Defense", None);
    add("1.e4 c5 2.Nf3 d6", "B50", "Sicilian Defense", None);
    add(
        "1.e4 c5 2.Nf3 Nc6",
        "B30",
        "Sicilian Defense",
        Some("Old Sicilian"),
    );
    add(
        "1.e4 c5 2.Nf3 e6",
        "B40",
        "Sicilian Defense",
        Some("French Variation"),
    );
    add("1.e4 c6", "B10", "Caro-Kann Defense", None);
    add("1.e4 e6", "C00", "French Defense", None);
    add(
        "1.e4 d5",
        "B01",
        "Scandinavian Defense",
        Some("Center Counter"),
    );
    add("1.e4 Nf6", "B00", "Alekhine's Defense", None);

    // Queen's Pawn openings
    add("1.d4", "A40", "Queen's Pawn Opening", None);
    add("1.d4 d5", "D00", "Queen's Pawn Game", None);
    add("1.d4 d5 2.c4", "D06", "Queen's Gambit", None);
    add("1.d4 d5 2.c4 e6", "D30", "Queen's Gambit Declined", None);
    add("1.d4 d5 2.c4 c6", "D10", "Slav Defense", None);
    add("1.d4 d5 2.c4 dxc4", "D20", "Queen's Gambit Accepted", None);
    add("1.d4 Nf6", "A45", "Indian Defense", None);
    add("1.d4 Nf6 2.c4", "E00", "Indian Defense", None);
    add("1.d4 Nf6 2.c4 e6", "E00", "Indian Defense", None);
    add("1.d4 Nf6 2.c4 g6", "E60", "King's Indian Defense", None);
    add(
        "1.d4 Nf6 2.c4 e6 3.Nc3 Bb4",
        "E20",
        "Nimzo-Indian Defense",
        None,
    );
    add(
        "1.d4 Nf6 2.c4 e6 3.Nf3 b6",
        "E10",
        "Queen's Indian Defense",
        None,
    );

    // English Opening
    add("1.c4", "A10", "English Opening", None);
    add(
        "1.c4 e5",
        "A20",
        "English Opening",
        Some("Reversed Sicilian"),
    );
    add(
        "1.c4 Nf6",
        "A10",
        "English Opening",
        Some("Anglo-Indian Defense"),
    );
    add(
        "1.c4 c5",
        "A20",
        "English Opening",
        Some("Symmetrical Variation"),
    );

    // Flank and irregular openings
    add("1.b3", "A01", "Nimzo-Larsen Attack", None);
    add("1.Nf3", "A04", "Reti Opening", None);
    add("1.Nf3 d5", "A06", "Reti Opening", None);
    add("1.Nf3 d5 2.c4", "A09", "Reti Opening", None);
    add(
        "1.Nf3 Nf6",
        "A04",
        "Reti Opening",
        Some("King's Indian Attack"),
    );
    add("1.f4", "A02", "Bird's Opening", None);
    add(
        "1.g3",
        "A00",
        "Hungarian Opening",
        Some("King's Fianchetto"),
    );
    add("1.e3", "A00", "Van't Kruijs Opening", None);
    add("1.Nc3", "A00", "Dunst Opening", None);

    entries
}
