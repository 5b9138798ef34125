//! Didactic baseline search variants selectable via the `search` option.
//!
//! Only `tryhard` ([`crate::search::Searcher`]) gets real engineering depth.
//! These six exist so the `search` combo option is observably functional for
//! every value it advertises, not because they play well.

use ataxx_core::{Move, Position};

/// Which non-`tryhard` variant the `search` option selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineKind {
    Random,
    MostCaptures,
    LeastCaptures,
    Minimax,
    Mcts,
    AlphaBeta,
}

impl BaselineKind {
    /// Parse one of the `search` combo's non-`tryhard` values.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "random" => Some(Self::Random),
            "mostcaptures" => Some(Self::MostCaptures),
            "leastcaptures" => Some(Self::LeastCaptures),
            "minimax" => Some(Self::Minimax),
            "mcts" => Some(Self::Mcts),
            "alphabeta" => Some(Self::AlphaBeta),
            _ => None,
        }
    }

    /// The combo value as printed by `uai`'s option registration and echoed
    /// back in info/bestmove bookkeeping.
    pub fn name(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::MostCaptures => "mostcaptures",
            Self::LeastCaptures => "leastcaptures",
            Self::Minimax => "minimax",
            Self::Mcts => "mcts",
            Self::AlphaBeta => "alphabeta",
        }
    }
}

/// Pick a move for `pos` under this baseline's (deliberately trivial) policy.
///
/// `mostcaptures`/`leastcaptures` rank by immediate flip count; the other
/// four always take the first move [`Position::legal_moves`] enumerates —
/// plain and deterministic except for `random`, which draws uniformly.
/// Never panics: `legal_moves` always yields at least the nullmove.
pub fn pick_move(kind: BaselineKind, pos: &Position) -> Move {
    let moves = pos.legal_moves();
    match kind {
        BaselineKind::MostCaptures => *moves
            .iter()
            .max_by_key(|mv| pos.flips_for(**mv).count())
            .expect("legal_moves is never empty"),
        BaselineKind::LeastCaptures => *moves
            .iter()
            .min_by_key(|mv| pos.flips_for(**mv).count())
            .expect("legal_moves is never empty"),
        BaselineKind::Random => {
            use rand::seq::SliceRandom;
            *moves
                .choose(&mut rand::thread_rng())
                .expect("legal_moves is never empty")
        }
        BaselineKind::Minimax | BaselineKind::Mcts | BaselineKind::AlphaBeta => moves[0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_through_name() {
        for kind in [
            BaselineKind::Random,
            BaselineKind::MostCaptures,
            BaselineKind::LeastCaptures,
            BaselineKind::Minimax,
            BaselineKind::Mcts,
            BaselineKind::AlphaBeta,
        ] {
            assert_eq!(BaselineKind::parse(kind.name()), Some(kind));
        }
    }

    #[test]
    fn unknown_name_does_not_parse() {
        assert_eq!(BaselineKind::parse("tryhard"), None);
        assert_eq!(BaselineKind::parse("bogus"), None);
    }

    #[test]
    fn most_captures_never_flips_fewer_than_least_captures() {
        let pos = Position::from_notation("7/x6/7/7/7/1x5/1o5 o").unwrap();
        let most = pick_move(BaselineKind::MostCaptures, &pos);
        let least = pick_move(BaselineKind::LeastCaptures, &pos);
        assert!(pos.flips_for(most).count() >= pos.flips_for(least).count());
    }

    #[test]
    fn deterministic_baselines_return_a_legal_move() {
        let pos = Position::starting_position();
        for kind in [BaselineKind::Minimax, BaselineKind::Mcts, BaselineKind::AlphaBeta] {
            let mv = pick_move(kind, &pos);
            assert!(pos.legal_moves().contains(&mv));
        }
    }

    #[test]
    fn random_returns_a_legal_move() {
        let pos = Position::starting_position();
        let mv = pick_move(BaselineKind::Random, &pos);
        assert!(pos.legal_moves().contains(&mv));
    }
}
