//! UCI (Universal Chess Interface) protocol codec.
//!
//! This crate provides types and parsing for the UCI protocol from the
//! GUI side: it parses lines an analysis engine prints and formats the
//! commands a driver sends to it.
//!
//! # Engine responses
//!
//! - `uciok` / `readyok` - Handshake and synchronization
//! - `info depth <d> score {cp <n>|mate <n>} ... pv <move>...` - Search info
//! - `bestmove <move> [ponder <move>]` - Search result
//!
//! # Driver commands
//!
//! - `uci` / `isready` - Initialize and synchronize
//! - `position fen <fen> [moves <move>...]` - Set position
//! - `setoption name <name> value <value>` - Engine options (e.g. MultiPV)
//! - `go [depth <d>] [movetime <ms>]` - Start search
//! - `stop` / `quit` - Stop search, exit engine

mod command;
mod info;

pub use command::{GoOptions, GuiCommand};
pub use info::{EngineInfo, Score};

/// Messages sent from engine to the driving GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Best move found.
    BestMove { mv: String, ponder: Option<String> },
}

impl EngineMessage {
    /// Parse one line of engine output.
    ///
    /// Returns `None` for blank lines and anything the codec does not
    /// recognize (`id`, `option`, banners, ...). A corrupt token inside a
    /// recognized line never fails the whole line; the affected field is
    /// simply left unset.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line.split_whitespace().next()? {
            "uciok" => Some(EngineMessage::UciOk),
            "readyok" => Some(EngineMessage::ReadyOk),
            "info" => EngineInfo::parse(line).map(EngineMessage::Info),
            "bestmove" => Self::parse_bestmove(line),
            _ => None,
        }
    }

    fn parse_bestmove(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let mv = parts.get(1)?.to_string();
        let ponder = parts
            .iter()
            .position(|&t| t == "ponder")
            .and_then(|i| parts.get(i + 1))
            .map(|s| s.to_string());
        Some(EngineMessage::BestMove { mv, ponder })
    }

    /// Format message as a UCI output line.
    pub fn to_uci(&self) -> String {
        match self {
            EngineMessage::UciOk => "uciok".to_string(),
            EngineMessage::ReadyOk => "readyok".to_string(),
            EngineMessage::Info(info) => info.to_uci(),
            EngineMessage::BestMove { mv, ponder } => match ponder {
                Some(p) => format!("bestmove {} ponder {}", mv, p),
                None => format!("bestmove {}", mv),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_handshake() {
        assert_eq!(EngineMessage::parse("uciok"), Some(EngineMessage::UciOk));
        assert_eq!(EngineMessage::parse("readyok"), Some(EngineMessage::ReadyOk));
    }

    #[test]
    fn parse_bestmove_with_ponder() {
        let msg = EngineMessage::parse("bestmove e2e4 ponder e7e5").unwrap();
        assert_eq!(
            msg,
            EngineMessage::BestMove {
                mv: "e2e4".to_string(),
                ponder: Some("e7e5".to_string()),
            }
        );
    }

    #[test]
    fn parse_bestmove_without_ponder() {
        let msg = EngineMessage::parse("bestmove g1f3").unwrap();
        assert_eq!(
            msg,
            EngineMessage::BestMove {
                mv: "g1f3".to_string(),
                ponder: None,
            }
        );
    }

    #[test]
    fn parse_bare_bestmove_is_dropped() {
        assert_eq!(EngineMessage::parse("bestmove"), None);
    }

    #[test]
    fn parse_info_line() {
        let msg = EngineMessage::parse("info depth 12 score cp 30 pv e2e4").unwrap();
        match msg {
            EngineMessage::Info(info) => {
                assert_eq!(info.depth, Some(12));
                assert_eq!(info.score, Some(Score::Cp(30)));
            }
            _ => panic!("Expected Info message"),
        }
    }

    #[test]
    fn unknown_lines_are_dropped() {
        assert_eq!(EngineMessage::parse("id name Stockfish 16"), None);
        assert_eq!(EngineMessage::parse("option name Hash type spin"), None);
        assert_eq!(EngineMessage::parse(""), None);
        assert_eq!(EngineMessage::parse("   "), None);
    }

    #[test]
    fn bestmove_roundtrip() {
        let msg = EngineMessage::BestMove {
            mv: "e2e4".to_string(),
            ponder: Some("e7e5".to_string()),
        };
        assert_eq!(EngineMessage::parse(&msg.to_uci()), Some(msg));
    }
}
