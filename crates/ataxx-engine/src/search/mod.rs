//! Iterative-deepening alpha-beta negamax, the transposition table, and the
//! move-ordering heuristics that feed it.

pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod position;
pub mod tt;

use ataxx_core::{Move, Position};

use crate::eval::nnue::Weights;
use control::Controller;
use heuristics::{HistoryTable, KillerTable};
use negamax::{negamax, PvTable, SearchContext, INF};
use position::SearchPosition;
use tt::TranspositionTable;

/// Maximum ply the search stack and PV table are sized for.
pub const MAX_DEPTH: usize = 128;

/// Score assigned to an immediate win. A forced win in `k` plies is reported
/// as `MATE_SCORE - k`; a forced loss as `-(MATE_SCORE - k)`.
pub const MATE_SCORE: i32 = 10_000;

/// Result of one completed iterative-deepening iteration, handed to the
/// caller's `on_iter` callback so it can emit a protocol `info` line.
#[derive(Debug, Clone)]
pub struct IterationInfo {
    pub depth: u8,
    pub seldepth: u8,
    pub score: i32,
    pub nodes: u64,
    pub tt_hits: u64,
    pub hashfull: u32,
    pub elapsed: std::time::Duration,
    pub pv: Vec<Move>,
}

/// Result of a completed (or cooperatively stopped) search: the best move of
/// the last fully completed iteration, never a half-finished one.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_move: Move,
    pub pv: Vec<Move>,
    pub score: i32,
    pub nodes: u64,
    pub depth: u8,
}

/// Iterative-deepening negamax searcher: owns the transposition table and
/// the killer/history tables, which persist across `go`s within one game and
/// are only cleared on `uainewgame`.
pub struct Searcher {
    tt: TranspositionTable,
    killers: KillerTable,
    history: HistoryTable,
}

impl Searcher {
    /// Create a searcher with a transposition table sized to `tt_mb` megabytes.
    pub fn new(tt_mb: usize) -> Self {
        Searcher {
            tt: TranspositionTable::new(tt_mb),
            killers: KillerTable::new(),
            history: HistoryTable::new(),
        }
    }

    /// Resize the transposition table, discarding its contents.
    pub fn resize_tt(&mut self, tt_mb: usize) {
        self.tt = TranspositionTable::new(tt_mb);
    }

    /// Reset all search state: TT, killers, and history. Called on `uainewgame`.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.history.clear();
    }

    /// Static evaluation of `pos` from the side to move's perspective, for
    /// the `eval` command — no search, a single NNUE forward pass.
    pub fn static_eval(pos: &Position, weights: &Weights) -> i32 {
        SearchPosition::new(pos.clone(), weights).evaluate()
    }

    /// Root iterative-deepening protocol (spec §4.6): search depth 1, 2, 3…
    /// up to the controller's target depth, calling `on_iter` after each
    /// iteration that completed without being cut short by the controller.
    ///
    /// Depth 1 always completes and is reported — the engine never returns
    /// an empty PV unless the position is terminal.
    pub fn search<F>(
        &mut self,
        pos: &Position,
        weights: &Weights,
        controller: &Controller,
        mut on_iter: F,
    ) -> SearchResult
    where
        F: FnMut(&IterationInfo),
    {
        let mut sp = SearchPosition::new(pos.clone(), weights);

        let mut result = SearchResult {
            best_move: Move::NOMOVE,
            pv: Vec::new(),
            score: 0,
            nodes: 0,
            depth: 0,
        };

        // Depth 1 runs against a controller that never reports a stop, so an
        // already-elapsed deadline (`movetime 0` or similar) can't leave the
        // very first iteration half-finished with no PV to report.
        let unstoppable = Controller::infinite();

        for depth in 1..=controller.target_depth() {
            let iter_control = if depth == 1 { &unstoppable } else { controller };
            let mut ctx = SearchContext {
                nodes: 0,
                tt: &mut self.tt,
                pv: PvTable::new(),
                control: iter_control,
                killers: &mut self.killers,
                history: &mut self.history,
                seldepth: 0,
                tt_hits: 0,
            };

            let score = negamax(&mut sp, -INF, INF, depth as i32, 0, true, &mut ctx);

            // An iteration past the first that got cut short contributes
            // nothing — keep the previous iteration's result.
            if depth > 1 && controller.should_stop(ctx.nodes) {
                break;
            }

            let pv: Vec<Move> = ctx.pv.root_pv().iter().copied().filter(|m| !m.is_null()).collect();
            let best_move = pv.first().copied().unwrap_or(Move::NOMOVE);

            // Debug-only: release builds treat a broken search invariant as
            // unreachable rather than paying for the check (spec §7).
            if !best_move.is_none() {
                debug_assert!(pos.legal_moves().contains(&best_move), "root PV[0] must be legal");
                let root_probe = ctx.tt.probe(pos.hash(), 0);
                debug_assert!(root_probe.is_some(), "TT must hold the root position after a completed iteration");
                if let Some(probe) = root_probe {
                    debug_assert!(probe.depth as i32 >= depth as i32, "root TT depth must cover the completed iteration");
                }
            }

            result = SearchResult { best_move, pv: pv.clone(), score, nodes: ctx.nodes, depth: depth as u8 };

            on_iter(&IterationInfo {
                depth: depth as u8,
                seldepth: ctx.seldepth,
                score,
                nodes: ctx.nodes,
                tt_hits: ctx.tt_hits,
                hashfull: self.tt.hashfull(),
                elapsed: controller.elapsed(),
                pv,
            });

            if controller.should_stop(ctx.nodes) {
                break;
            }
        }

        result
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::nnue::test_support::tiny_weights;
    use ataxx_core::Position;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn depth_1_returns_a_legal_move() {
        let weights = tiny_weights();
        let pos = Position::starting_position();
        let mut searcher = Searcher::new(1);
        let control = Controller::new(control::GoSettings::Depth(1), Arc::new(AtomicBool::new(false)));
        let result = searcher.search(&pos, &weights, &control, |_| {});
        assert!(!result.best_move.is_none());
        assert!(pos.legal_moves().contains(&result.best_move));
    }

    #[test]
    fn iterative_deepening_calls_on_iter_for_every_depth() {
        let weights = tiny_weights();
        let pos = Position::starting_position();
        let mut searcher = Searcher::new(1);
        let control = Controller::new(control::GoSettings::Depth(4), Arc::new(AtomicBool::new(false)));
        let mut depths_seen = Vec::new();
        searcher.search(&pos, &weights, &control, |info| depths_seen.push(info.depth));
        assert_eq!(depths_seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn terminal_position_returns_nomove() {
        let weights = tiny_weights();
        let pos = Position::from_notation("ooooooo/ooooooo/ooooooo/ooooooo/ooooooo/ooooooo/oooooox o").unwrap();
        let mut searcher = Searcher::new(1);
        let control = Controller::new(control::GoSettings::Depth(2), Arc::new(AtomicBool::new(false)));
        let result = searcher.search(&pos, &weights, &control, |_| {});
        assert!(result.best_move.is_none());
    }

    #[test]
    fn root_tt_entry_exists_after_search() {
        let weights = tiny_weights();
        let pos = Position::starting_position();
        let mut searcher = Searcher::new(1);
        let control = Controller::new(control::GoSettings::Depth(3), Arc::new(AtomicBool::new(false)));
        let result = searcher.search(&pos, &weights, &control, |_| {});

        let probe = searcher.tt.probe(pos.hash(), 0).expect("root entry should be stored");
        assert!(probe.depth as u32 >= result.depth as u32);
        assert_eq!(probe.mv, result.best_move);
    }

    #[test]
    fn depth_1_completes_even_if_stop_is_already_set() {
        let weights = tiny_weights();
        let pos = Position::starting_position();
        let mut searcher = Searcher::new(1);
        let stop = Arc::new(AtomicBool::new(true));
        let control = Controller::new(control::GoSettings::Infinite, stop);

        let result = searcher.search(&pos, &weights, &control, |_| {});
        assert!(!result.best_move.is_none());
        assert!(pos.legal_moves().contains(&result.best_move));
    }

    #[test]
    fn search_stops_promptly_when_asked() {
        let weights = tiny_weights();
        let pos = Position::starting_position();
        let mut searcher = Searcher::new(1);
        let stop = Arc::new(AtomicBool::new(false));
        let control = Controller::new(control::GoSettings::Infinite, Arc::clone(&stop));

        let stop_clone = Arc::clone(&stop);
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(10));
            stop_clone.store(true, Ordering::Relaxed);
        });

        let result = searcher.search(&pos, &weights, &control, |_| {});
        assert!(result.depth < MAX_DEPTH as u8);
    }

    #[test]
    fn new_game_clears_tt_so_node_count_does_not_shrink_from_reuse() {
        let weights = tiny_weights();
        let pos = Position::starting_position();
        let mut searcher = Searcher::new(1);
        let control = Controller::new(control::GoSettings::Depth(3), Arc::new(AtomicBool::new(false)));
        searcher.search(&pos, &weights, &control, |_| {});
        searcher.new_game();
        let probe = searcher.tt.probe(pos.hash(), 0);
        assert!(probe.is_none());
    }

    #[test]
    fn repeated_search_on_warm_tt_uses_fewer_nodes() {
        let weights = tiny_weights();
        let pos = Position::starting_position();
        let mut searcher = Searcher::new(1);
        let control1 = Controller::new(control::GoSettings::Depth(4), Arc::new(AtomicBool::new(false)));
        let first = searcher.search(&pos, &weights, &control1, |_| {});

        let control2 = Controller::new(control::GoSettings::Depth(4), Arc::new(AtomicBool::new(false)));
        let second = searcher.search(&pos, &weights, &control2, |_| {});

        assert!(second.nodes <= first.nodes);
    }
}
