use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deepest minimax search accepted; larger requests are clamped.
pub const MAX_SEARCH_DEPTH: u32 = 8;

/// Search depth used when none is configured.
pub const DEFAULT_SEARCH_DEPTH: u32 = 3;

/// How an automated player picks its move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Uniformly random legal move
    Random,
    /// One-ply lookahead on pieces gained plus square weight
    Greedy,
    /// Depth-limited minimax with alpha-beta pruning
    #[default]
    Minimax,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy '{0}' (expected random, greedy or minimax)")]
pub struct ParseStrategyError(pub String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    /// Accepts the strategy names and the difficulty aliases
    /// `easy`, `medium` and `hard`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" | "easy" => Ok(Strategy::Random),
            "greedy" | "medium" => Ok(Strategy::Greedy),
            "minimax" | "hard" => Ok(Strategy::Minimax),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Random => "random",
            Strategy::Greedy => "greedy",
            Strategy::Minimax => "minimax",
        })
    }
}

/// Clamps a requested depth into `1..=MAX_SEARCH_DEPTH`.
pub fn clamp_depth(depth: u32) -> u32 {
    depth.clamp(1, MAX_SEARCH_DEPTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("easy".parse(), Ok(Strategy::Random));
        assert_eq!("Medium".parse(), Ok(Strategy::Greedy));
        assert_eq!("hard".parse(), Ok(Strategy::Minimax));
        assert_eq!(" minimax ".parse(), Ok(Strategy::Minimax));
        assert!("expert".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for strategy in [Strategy::Random, Strategy::Greedy, Strategy::Minimax] {
            assert_eq!(strategy.to_string().parse(), Ok(strategy));
        }
    }

    #[test]
    fn test_clamp_depth() {
        assert_eq!(clamp_depth(0), 1);
        assert_eq!(clamp_depth(4), 4);
        assert_eq!(clamp_depth(40), MAX_SEARCH_DEPTH);
    }
}
