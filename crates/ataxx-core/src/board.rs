//! The Ataxx position: stone placement, side to move, and in-place make/unmake.

use std::fmt;

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::error::{BoardError, PositionError};
use crate::geometry::{NEIGHBORS1, NEIGHBORS2};
use crate::mv::Move;
use crate::square::{Square, NUM_SQUARES, SIDE};
use crate::zobrist;

/// Outcome of a finished game, from the perspective of the side named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Color),
    Draw,
}

/// One entry of the undo history, enough to reverse exactly one `make`.
#[derive(Clone, Copy)]
enum Undo {
    Null,
    Stone {
        mv: Move,
        flipped: Bitboard,
        was_leap: bool,
    },
}

/// A complete Ataxx position: stone bitboards, blocked squares, side to move,
/// Zobrist hash, and a stack-allocated undo history for in-place make/unmake.
#[derive(Clone)]
pub struct Position {
    stones: [Bitboard; Color::COUNT],
    blocked: Bitboard,
    side_to_move: Color,
    hash: u64,
    history: Vec<Undo>,
}

impl Position {
    /// The standard 7x7 Ataxx starting position: stones on opposite corners.
    pub fn starting_position() -> Position {
        let a1 = Square::new(0, 0);
        let g1 = Square::new(0, 6);
        let a7 = Square::new(6, 0);
        let g7 = Square::new(6, 6);

        let white = Bitboard::EMPTY.with(a1).with(g7);
        let black = Bitboard::EMPTY.with(g1).with(a7);

        let mut pos = Position {
            stones: [white, black],
            blocked: Bitboard::EMPTY,
            side_to_move: Color::White,
            hash: 0,
            history: Vec::new(),
        };
        pos.hash = pos.hash_from_scratch();
        pos
    }

    fn hash_from_scratch(&self) -> u64 {
        let mut hash = 0u64;
        for &color in &Color::ALL {
            let mut bb = self.stones[color.index()];
            while let Some((sq, rest)) = bb.pop_lsb() {
                hash ^= zobrist::stone_key(color, sq.index());
                bb = rest;
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= zobrist::side_key();
        }
        hash
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn stones(&self, color: Color) -> Bitboard {
        self.stones[color.index()]
    }

    #[inline]
    pub fn blocked(&self) -> Bitboard {
        self.blocked
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.stones[0] | self.stones[1] | self.blocked
    }

    fn empty_squares(&self) -> Bitboard {
        !self.occupied()
    }

    fn toggle_square(&mut self, color: Color, sq: Square) {
        self.stones[color.index()] = self.stones[color.index()].toggle(sq);
        self.hash ^= zobrist::stone_key(color, sq.index());
    }

    fn flip_side(&mut self) {
        self.side_to_move = !self.side_to_move;
        self.hash ^= zobrist::side_key();
    }

    /// All legal moves for the side to move. Non-empty whenever the position
    /// is not terminal: if no stone move exists, the sole legal move is the
    /// nullmove pass.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mover = self.side_to_move;
        let mine = self.stones[mover.index()];
        let empty = self.empty_squares();

        let mut moves = Vec::new();

        let mut clone_targets = Bitboard::EMPTY;
        let mut srcs = mine;
        while let Some((sq, rest)) = srcs.pop_lsb() {
            clone_targets |= NEIGHBORS1[sq.index()] & empty;
            srcs = rest;
        }
        let mut targets = clone_targets;
        while let Some((dst, rest)) = targets.pop_lsb() {
            moves.push(Move::clone_to(dst));
            targets = rest;
        }

        let mut srcs = mine;
        while let Some((src, rest)) = srcs.pop_lsb() {
            let mut leaps = NEIGHBORS2[src.index()] & empty;
            while let Some((dst, leap_rest)) = leaps.pop_lsb() {
                moves.push(Move::leap(src, dst));
                leaps = leap_rest;
            }
            srcs = rest;
        }

        if moves.is_empty() {
            moves.push(Move::NULLMOVE);
        }
        moves
    }

    fn has_stone_move(&self, color: Color) -> bool {
        let mine = self.stones[color.index()];
        let empty = self.empty_squares();
        let mut srcs = mine;
        while let Some((sq, rest)) = srcs.pop_lsb() {
            if (NEIGHBORS1[sq.index()] & empty).is_nonempty() {
                return true;
            }
            if (NEIGHBORS2[sq.index()] & empty).is_nonempty() {
                return true;
            }
            srcs = rest;
        }
        false
    }

    /// `true` once nobody can make a stone move, or one side has no stones left.
    pub fn is_terminal(&self) -> bool {
        let white = self.stones[0].count();
        let black = self.stones[1].count();
        if white == 0 || black == 0 {
            return true;
        }
        if self.empty_squares().is_empty() {
            return true;
        }
        !self.has_stone_move(Color::White) && !self.has_stone_move(Color::Black)
    }

    /// Terminal outcome, valid only when [`Position::is_terminal`] holds.
    pub fn outcome(&self) -> Outcome {
        let white = self.stones[0].count();
        let black = self.stones[1].count();
        match white.cmp(&black) {
            std::cmp::Ordering::Greater => Outcome::Win(Color::White),
            std::cmp::Ordering::Less => Outcome::Win(Color::Black),
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    /// Apply `mv`, mutating the position in place. Must be paired with a
    /// matching [`Position::unmake`] to restore the prior state exactly.
    pub fn make(&mut self, mv: Move) {
        if mv.is_null() {
            self.flip_side();
            self.history.push(Undo::Null);
            return;
        }

        let mover = self.side_to_move;
        let opp = !mover;
        let to = mv.to_square();
        let is_leap = !mv.is_clone();

        let flipped = NEIGHBORS1[to.index()] & self.stones[opp.index()];
        let mut rest = flipped;
        while let Some((sq, next)) = rest.pop_lsb() {
            self.toggle_square(opp, sq);
            self.toggle_square(mover, sq);
            rest = next;
        }

        self.toggle_square(mover, to);
        if is_leap {
            self.toggle_square(mover, mv.from_square());
        }

        self.flip_side();
        self.history.push(Undo::Stone { mv, flipped, was_leap: is_leap });
    }

    /// Reverse the most recent [`Position::make`].
    pub fn unmake(&mut self) {
        let undo = self.history.pop().expect("unmake called without a matching make");
        match undo {
            Undo::Null => self.flip_side(),
            Undo::Stone { mv, flipped, was_leap } => {
                self.flip_side();
                let mover = self.side_to_move;
                let opp = !mover;

                if was_leap {
                    self.toggle_square(mover, mv.from_square());
                }
                self.toggle_square(mover, mv.to_square());

                let mut rest = flipped;
                while let Some((sq, next)) = rest.pop_lsb() {
                    self.toggle_square(mover, sq);
                    self.toggle_square(opp, sq);
                    rest = next;
                }
            }
        }
    }

    /// Enemy stones that would flip if `mv` were played now — the
    /// `them_unset` set an NNUE accumulator needs to update in lockstep with
    /// [`Position::make`], computed without mutating the position.
    pub fn flips_for(&self, mv: Move) -> Bitboard {
        if !mv.is_stone_move() {
            return Bitboard::EMPTY;
        }
        let opp = !self.side_to_move;
        NEIGHBORS1[mv.to_square().index()] & self.stones[opp.index()]
    }

    /// Apply a sequence of legal moves in UAI notation, skipping (not aborting
    /// on) any move that fails to resolve against the position at the time
    /// it's applied.
    pub fn apply_uai_moves(&mut self, moves: &[&str]) {
        for text in moves {
            if let Ok(mv) = Move::from_uai(text) {
                if self.legal_moves().contains(&mv) {
                    self.make(mv);
                }
            }
        }
    }

    /// Parse an Ataxx position string: `<7 board rows separated by '/'> <side>`,
    /// e.g. the starting position is `x5o/7/7/7/7/7/o5x x`.
    pub fn from_notation(s: &str) -> Result<Position, PositionError> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(PositionError::WrongFieldCount { found: fields.len() });
        }
        let rows: Vec<&str> = fields[0].split('/').collect();
        if rows.len() != SIDE as usize {
            return Err(PositionError::WrongRankCount { found: rows.len() });
        }

        let mut white = Bitboard::EMPTY;
        let mut black = Bitboard::EMPTY;
        let mut blocked = Bitboard::EMPTY;

        for (row_from_top, row) in rows.iter().enumerate() {
            let rank = SIDE as usize - 1 - row_from_top;
            let mut file = 0usize;
            for ch in row.chars() {
                if file >= SIDE as usize {
                    return Err(PositionError::BadRankLength { rank_index: row_from_top, length: file + 1 });
                }
                match ch {
                    'x' | 'X' => {
                        black = black.with(Square::new(rank as u8, file as u8));
                        file += 1;
                    }
                    'o' | 'O' => {
                        white = white.with(Square::new(rank as u8, file as u8));
                        file += 1;
                    }
                    '-' => {
                        blocked = blocked.with(Square::new(rank as u8, file as u8));
                        file += 1;
                    }
                    '1'..='7' => {
                        file += (ch as u8 - b'0') as usize;
                    }
                    other => return Err(PositionError::InvalidBoardChar { character: other }),
                }
            }
            if file != SIDE as usize {
                return Err(PositionError::BadRankLength { rank_index: row_from_top, length: file });
            }
        }

        let side_to_move = match fields[1] {
            "x" => Color::Black,
            "o" => Color::White,
            other => return Err(PositionError::InvalidSide { found: other.to_string() }),
        };

        if (white & black).is_nonempty() {
            return Err(BoardError::OverlappingStones.into());
        }
        if ((white | black) & blocked).is_nonempty() {
            return Err(BoardError::StoneOnBlockedSquare.into());
        }

        let mut pos = Position {
            stones: [white, black],
            blocked,
            side_to_move,
            hash: 0,
            history: Vec::new(),
        };
        pos.hash = pos.hash_from_scratch();
        Ok(pos)
    }

    /// Render the position back to notation, inverse of [`Position::from_notation`].
    pub fn to_notation(&self) -> String {
        let mut rows = Vec::with_capacity(SIDE as usize);
        for rank in (0..SIDE).rev() {
            let mut row = String::new();
            let mut run = 0u8;
            for file in 0..SIDE {
                let sq = Square::new(rank, file);
                let ch = if self.stones[Color::Black.index()].contains(sq) {
                    Some('x')
                } else if self.stones[Color::White.index()].contains(sq) {
                    Some('o')
                } else if self.blocked.contains(sq) {
                    Some('-')
                } else {
                    None
                };
                match ch {
                    Some(c) => {
                        if run > 0 {
                            row.push((b'0' + run) as char);
                            run = 0;
                        }
                        row.push(c);
                    }
                    None => run += 1,
                }
            }
            if run > 0 {
                row.push((b'0' + run) as char);
            }
            rows.push(row);
        }
        let side = if self.side_to_move == Color::Black { "x" } else { "o" };
        format!("{} {}", rows.join("/"), side)
    }

    /// Recursive PERFT move-count: the number of leaf positions reached after
    /// `depth` plies of full move generation from this position.
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        if self.is_terminal() {
            return 1;
        }
        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0u64;
        for mv in moves {
            self.make(mv);
            nodes += self.perft(depth - 1);
            self.unmake();
        }
        nodes
    }

    /// Per-move PERFT split: node counts for each legal move at the root,
    /// used by the `split` debug command.
    pub fn split(&mut self, depth: u32) -> Vec<(Move, u64)> {
        let moves = self.legal_moves();
        let mut counts = Vec::with_capacity(moves.len());
        for mv in moves {
            self.make(mv);
            let nodes = if depth == 0 { 1 } else { self.perft(depth - 1) };
            self.unmake();
            counts.push((mv, nodes));
        }
        counts
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..SIDE).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..SIDE {
                let sq = Square::new(rank, file);
                let c = if self.stones[Color::White.index()].contains(sq) {
                    'o'
                } else if self.stones[Color::Black.index()].contains(sq) {
                    'x'
                } else if self.blocked.contains(sq) {
                    '-'
                } else {
                    '.'
                };
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for file in 0..SIDE {
            write!(f, "{} ", (b'a' + file) as char)?;
        }
        writeln!(f)?;
        write!(f, "side to move: {}", self.side_to_move)
    }
}

const _: () = assert!(NUM_SQUARES == 49);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_4_stones() {
        let pos = Position::starting_position();
        assert_eq!(pos.stones(Color::White).count(), 2);
        assert_eq!(pos.stones(Color::Black).count(), 2);
    }

    #[test]
    fn notation_roundtrip() {
        let pos = Position::starting_position();
        let notation = pos.to_notation();
        assert_eq!(notation, "x5o/7/7/7/7/7/o5x x");
        let parsed = Position::from_notation(&notation).unwrap();
        assert_eq!(parsed.hash(), pos.hash());
    }

    #[test]
    fn make_unmake_restores_hash_and_moves_and_turn() {
        let mut pos = Position::starting_position();
        let before_hash = pos.hash();
        let before_turn = pos.side_to_move();
        let before_moves = pos.legal_moves();

        let mv = before_moves[0];
        pos.make(mv);
        assert_ne!(pos.hash(), before_hash);
        pos.unmake();

        assert_eq!(pos.hash(), before_hash);
        assert_eq!(pos.side_to_move(), before_turn);
        assert_eq!(pos.legal_moves(), before_moves);
    }

    #[test]
    fn clone_move_does_not_remove_source() {
        let mut pos = Position::starting_position();
        let a1 = Square::new(0, 0);
        let b1 = Square::new(0, 1);
        pos.make(Move::clone_to(b1));
        assert!(pos.stones(Color::White).contains(a1));
        assert!(pos.stones(Color::White).contains(b1));
    }

    #[test]
    fn leap_move_empties_source() {
        let mut pos = Position::starting_position();
        let a1 = Square::new(0, 0);
        let c1 = Square::new(0, 2);
        pos.make(Move::leap(a1, c1));
        assert!(!pos.stones(Color::White).contains(a1));
        assert!(pos.stones(Color::White).contains(c1));
    }

    #[test]
    fn flips_for_matches_what_make_actually_flips() {
        let mut pos = Position::from_notation("7/7/7/7/7/1x5/o6 o").unwrap();
        let b1 = Square::new(0, 1);
        let mv = Move::clone_to(b1);
        let predicted = pos.flips_for(mv);
        assert!(predicted.contains(Square::new(1, 1)));
        pos.make(mv);
        assert!(pos.stones(Color::White).contains(Square::new(1, 1)));
    }

    #[test]
    fn adjacent_enemy_stones_are_flipped() {
        // White at a1 clones to b1; black's stone at b2 should flip to white.
        let mut pos = Position::from_notation("7/7/7/7/7/1x5/o6 o").unwrap();
        let b1 = Square::new(0, 1);
        pos.make(Move::clone_to(b1));
        assert!(pos.stones(Color::White).contains(Square::new(1, 1)));
        assert!(!pos.stones(Color::Black).contains(Square::new(1, 1)));
    }

    #[test]
    fn no_stone_moves_falls_back_to_nullmove() {
        // White's lone stone at a1 is boxed in by blockers at every clone and
        // leap destination; black (not to move) still has stones free to move.
        let pos = Position::from_notation("x6/7/7/7/---4/---4/o--4 o").unwrap();
        let moves = pos.legal_moves();
        assert_eq!(moves, vec![Move::NULLMOVE]);
        assert!(!pos.is_terminal());
    }

    #[test]
    fn terminal_when_board_full() {
        let pos = Position::from_notation("ooooooo/ooooooo/ooooooo/ooooooo/ooooooo/ooooooo/oooooox o").unwrap();
        assert!(pos.is_terminal());
        assert_eq!(pos.outcome(), Outcome::Win(Color::White));
    }

    #[test]
    fn perft_depth_1_matches_legal_move_count() {
        let mut pos = Position::starting_position();
        let count = pos.legal_moves().len() as u64;
        assert_eq!(pos.perft(1), count);
    }

    #[test]
    fn perft_depth_0_is_one() {
        let mut pos = Position::starting_position();
        assert_eq!(pos.perft(0), 1);
    }

    #[test]
    fn split_sums_to_perft() {
        let mut pos = Position::starting_position();
        let total = pos.perft(2);
        let split_total: u64 = pos.split(2).iter().map(|(_, n)| n).sum();
        assert_eq!(total, split_total);
    }
}
