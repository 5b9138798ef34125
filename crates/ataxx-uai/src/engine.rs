//! Event-driven UAI engine: a protocol thread reads commands while at most
//! one search worker runs the iterative-deepening loop. No pondering.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use tracing::{debug, info, warn};

use ataxx_core::{Color, Position};
use ataxx_engine::{
    Controller, EngineVariant, GoSettings, IterationInfo, Searcher, SearchResult, Weights,
};

use crate::command::{parse_command, Command, GoParams};
use crate::error::UaiError;
use crate::options::Options;

/// Internal engine state — idle or mid-search. No pondering state exists.
enum EngineState {
    Idle,
    Searching,
}

/// Events processed by the main engine loop.
enum EngineEvent {
    Line(Result<Command, UaiError>),
    SearchDone(SearchDone),
    InputClosed,
}

/// Payload returned by the search worker when it finishes.
struct SearchDone {
    result: SearchResult,
    searcher: Searcher,
}

/// The UAI engine: current position, options, and a (possibly worker-owned)
/// searcher, driven by an event loop on the calling thread.
pub struct UaiEngine {
    position: Position,
    options: Options,
    searcher: Option<Searcher>,
    weights: Option<Arc<Weights>>,
    state: EngineState,
    stop_flag: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl UaiEngine {
    /// Create a new engine with the starting position and default options.
    pub fn new() -> Self {
        let options = Options::default();
        UaiEngine {
            position: Position::starting_position(),
            searcher: Some(Searcher::new(options.hash_mb as usize)),
            options,
            weights: None,
            state: EngineState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Run the UAI event loop, reading from stdin until `quit` or input closes.
    pub fn run(mut self) -> Result<(), UaiError> {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let stdin_tx = tx.clone();
        std::thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        let trimmed = line.trim().to_string();
                        if trimmed.is_empty() {
                            continue;
                        }
                        debug!(cmd = %trimmed, "received UAI command");
                        let cmd = parse_command(&trimmed);
                        if stdin_tx.send(EngineEvent::Line(cmd)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        let _ = stdin_tx.send(EngineEvent::InputClosed);
                        break;
                    }
                }
            }
            let _ = stdin_tx.send(EngineEvent::InputClosed);
        });

        for event in &rx {
            match event {
                EngineEvent::Line(Ok(cmd)) => match cmd {
                    Command::Uai => self.handle_uai(),
                    Command::IsReady => self.handle_isready(),
                    Command::SetOption { name, value } => self.handle_setoption(&name, &value),
                    Command::UaiNewGame => self.handle_newgame(),
                    Command::Position(pos) => self.position = pos,
                    Command::Moves(moves) => {
                        let refs: Vec<&str> = moves.iter().map(String::as_str).collect();
                        self.position.apply_uai_moves(&refs);
                    }
                    Command::Go(params) => self.handle_go(params, &tx, &rx),
                    Command::Stop => self.handle_stop(),
                    Command::Eval => self.handle_eval(),
                    Command::Perft(depth) => self.handle_perft(depth),
                    Command::Split(depth) => self.handle_split(depth),
                    Command::Display => println!("{}", self.position),
                    Command::Quit => {
                        if matches!(self.state, EngineState::Searching) {
                            self.stop_and_join_worker(&rx);
                        }
                        break;
                    }
                    Command::Unknown(tok) => {
                        if self.options.debug {
                            println!("info unknown UAI command \"{tok}\"");
                        }
                    }
                },
                EngineEvent::Line(Err(e)) => {
                    warn!(error = %e, "UAI parse error");
                    println!("info string {e}");
                }
                EngineEvent::SearchDone(done) => self.finish_search(done),
                EngineEvent::InputClosed => break,
            }
        }

        info!("ataxx engine shutting down");
        Ok(())
    }

    fn handle_uai(&self) {
        println!("id name ataxx");
        println!("id author the ataxx engine authors");
        self.options.print_registration();
        println!("uaiok");
    }

    /// Lazily loads the NNUE weights. Per §7, a missing or truncated weights
    /// file is fatal at load — the engine refuses `readyok` until it resolves.
    fn ensure_weights_loaded(&mut self) -> bool {
        if self.weights.is_some() {
            return true;
        }
        match Weights::load(&self.options.nnue_path) {
            Ok(w) => {
                self.weights = Some(Arc::new(w));
                true
            }
            Err(e) => {
                println!("info string fatal: {e}");
                false
            }
        }
    }

    fn handle_isready(&mut self) {
        if self.ensure_weights_loaded() {
            println!("readyok");
        }
    }

    fn handle_setoption(&mut self, name: &str, value: &str) {
        match self.options.set(name, value) {
            Ok(()) => match name {
                "hash" => {
                    if let Some(searcher) = self.searcher.as_mut() {
                        searcher.resize_tt(self.options.hash_mb as usize);
                    }
                }
                "nnue-path" => self.weights = None,
                _ => {}
            },
            Err(e) => println!("info string {e}"),
        }
    }

    fn handle_newgame(&mut self) {
        self.position = Position::starting_position();
        if let Some(searcher) = self.searcher.as_mut() {
            searcher.new_game();
        }
    }

    /// Per §5: a `go` received mid-search first signals stop and joins the
    /// prior worker, rather than being ignored or left to race a new one.
    fn stop_and_join_worker(&mut self, rx: &mpsc::Receiver<EngineEvent>) {
        self.handle_stop();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        for ev in rx {
            if let EngineEvent::SearchDone(done) = ev {
                self.finish_search(done);
                break;
            }
        }
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent>, rx: &mpsc::Receiver<EngineEvent>) {
        if matches!(self.state, EngineState::Searching) {
            self.stop_and_join_worker(rx);
        }

        if let EngineVariant::Baseline(kind) = self.options.search {
            let mv = ataxx_engine::pick_move(kind, &self.position);
            if mv.is_null() {
                println!("bestmove 0000");
            } else {
                println!("bestmove {mv}");
            }
            return;
        }

        if !self.ensure_weights_loaded() {
            println!("bestmove 0000");
            return;
        }

        self.stop_flag = Arc::new(AtomicBool::new(false));
        let settings = resolve_go_settings(&params, self.position.side_to_move());
        let controller = Controller::new(settings, Arc::clone(&self.stop_flag));

        let mut searcher = self.searcher.take().expect("searcher owned while idle");
        let pos = self.position.clone();
        let weights = Arc::clone(self.weights.as_ref().expect("checked above"));
        let tx = tx.clone();

        self.worker = Some(std::thread::spawn(move || {
            let result = searcher.search(&pos, &weights, &controller, |info| {
                print_info_line(info);
            });
            let _ = tx.send(EngineEvent::SearchDone(SearchDone { result, searcher }));
        }));

        self.state = EngineState::Searching;
    }

    fn handle_stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    fn handle_eval(&mut self) {
        if !self.ensure_weights_loaded() {
            return;
        }
        let weights = self.weights.as_ref().expect("checked above");
        let score = Searcher::static_eval(&self.position, weights);
        println!("info score cp {score}");
    }

    fn handle_perft(&mut self, depth: u32) {
        let mut pos = self.position.clone();
        let nodes = pos.perft(depth);
        println!("nodes searched: {nodes}");
    }

    fn handle_split(&mut self, depth: u32) {
        let mut pos = self.position.clone();
        let mut total = 0u64;
        for (mv, nodes) in pos.split(depth) {
            println!("{mv}: {nodes}");
            total += nodes;
        }
        println!();
        println!("nodes searched: {total}");
    }

    fn finish_search(&mut self, done: SearchDone) {
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        self.searcher = Some(done.searcher);
        self.state = EngineState::Idle;

        if done.result.best_move.is_none() {
            println!("bestmove 0000");
        } else {
            println!("bestmove {}", done.result.best_move);
        }
    }
}

impl Default for UaiEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn print_info_line(info: &IterationInfo) {
    let elapsed_ms = info.elapsed.as_millis().max(1) as u64;
    let nps = (info.nodes as u128 * 1000 / elapsed_ms as u128) as u64;
    let pv: String = info.pv.iter().map(|m| m.to_string()).collect::<Vec<_>>().join(" ");
    println!(
        "info depth {} seldepth {} score cp {} time {} nodes {} tthits {} hashfull {} nps {} pv {}",
        info.depth, info.seldepth, info.score, elapsed_ms, info.nodes, info.tt_hits, info.hashfull, nps, pv
    );
}

/// Resolve a `go`'s raw parameters into the settings `Controller::new` wants,
/// picking the clock belonging to the side to move for a `wtime`/`btime` go.
fn resolve_go_settings(params: &GoParams, side: Color) -> GoSettings {
    if params.infinite {
        return GoSettings::Infinite;
    }
    if let Some(depth) = params.depth {
        return GoSettings::Depth(depth);
    }
    if let Some(nodes) = params.nodes {
        return GoSettings::Nodes(nodes);
    }
    if let Some(ms) = params.movetime {
        return GoSettings::Movetime(ms);
    }
    let own_remaining_ms = match side {
        Color::White => params.wtime,
        Color::Black => params.btime,
    };
    if let Some(own_remaining_ms) = own_remaining_ms {
        return GoSettings::Time { own_remaining_ms };
    }
    GoSettings::Infinite
}
