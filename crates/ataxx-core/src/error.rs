//! Error types for position notation parsing and board validation.

/// Errors from parsing an Ataxx position string (`board side`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// The position string does not have exactly 2 space-separated fields.
    #[error("expected 2 fields (board, side), found {found}")]
    WrongFieldCount { found: usize },
    /// The board section does not have exactly 7 ranks.
    #[error("expected 7 ranks, found {found}")]
    WrongRankCount { found: usize },
    /// A rank describes more or fewer than 7 squares.
    #[error("rank {rank_index} describes {length} squares, expected 7")]
    BadRankLength { rank_index: usize, length: usize },
    /// An unrecognized character appeared in the board section.
    #[error("invalid board character: '{character}'")]
    InvalidBoardChar { character: char },
    /// The side-to-move field is not "x" or "o".
    #[error("invalid side to move: \"{found}\"")]
    InvalidSide { found: String },
    /// The parsed board fails structural validation.
    #[error("invalid board: {source}")]
    InvalidBoard {
        #[from]
        source: BoardError,
    },
}

/// Errors from structural validation of a [`Position`](crate::board::Position)
/// or from resolving a textual square/move against it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The white and black stone bitboards overlap.
    #[error("white and black stone bitboards overlap")]
    OverlappingStones,
    /// A stone and a blocked square claim the same square.
    #[error("stone and blocked-square bitboards overlap")]
    StoneOnBlockedSquare,
    /// A square string was not a valid `a1`..`g7` algebraic square.
    #[error("invalid square: \"{square}\"")]
    InvalidSquare { square: String },
    /// A move string was not `from-to`, a clone, or `0000`.
    #[error("invalid move: \"{mv}\"")]
    InvalidMove { mv: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_error_display() {
        let err = PositionError::WrongFieldCount { found: 1 };
        assert_eq!(format!("{err}"), "expected 2 fields (board, side), found 1");
    }

    #[test]
    fn board_error_display() {
        let err = BoardError::OverlappingStones;
        assert_eq!(format!("{err}"), "white and black stone bitboards overlap");
    }

    #[test]
    fn position_error_from_board_error() {
        let board_err = BoardError::OverlappingStones;
        let pos_err: PositionError = board_err.into();
        assert!(matches!(pos_err, PositionError::InvalidBoard { .. }));
    }
}
