//! UAI command parsing: the line-based protocol described in §6.

use ataxx_core::{Move, Position};

use crate::error::UaiError;

/// Raw `go` parameters, before they're resolved against the side to move
/// into a [`ataxx_engine::GoSettings`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GoParams {
    pub depth: Option<u8>,
    pub nodes: Option<u64>,
    pub movetime: Option<u64>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub infinite: bool,
}

/// A parsed line of UAI protocol input.
#[derive(Debug)]
pub enum Command {
    /// `uai` — identify the engine and list options.
    Uai,
    /// `isready` — synchronization ping.
    IsReady,
    /// `setoption name <k> value <v>`.
    SetOption { name: String, value: String },
    /// `uainewgame` — reset TT/search-stack/position to the start position.
    UaiNewGame,
    /// `position {startpos | fen <board> <side>} [moves m1 m2 …]`.
    Position(Position),
    /// `moves m1 m2 …` — apply further moves to the current position.
    Moves(Vec<String>),
    /// `go …` — start a search under the given budget.
    Go(GoParams),
    /// `stop` — cooperatively stop the worker.
    Stop,
    /// `eval` — print the static evaluation of the current position.
    Eval,
    /// `perft <depth>` — print the PERFT node count at `depth`.
    Perft(u32),
    /// `split <depth>` — print the per-root-move PERFT split.
    Split(u32),
    /// `display` / `print` — pretty-print the current position.
    Display,
    /// `quit` — shut down.
    Quit,
    /// Anything not recognized above — silently ignored unless `debug=true`.
    Unknown(String),
}

/// Parse a single line of input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UaiError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match head {
        "uai" => Ok(Command::Uai),
        "isready" => Ok(Command::IsReady),
        "uainewgame" => Ok(Command::UaiNewGame),
        "stop" => Ok(Command::Stop),
        "eval" => Ok(Command::Eval),
        "display" | "print" => Ok(Command::Display),
        "quit" => Ok(Command::Quit),
        "setoption" => parse_setoption(&tokens[1..]),
        "position" => parse_position(&tokens[1..]),
        "moves" => Ok(Command::Moves(tokens[1..].iter().map(|s| s.to_string()).collect())),
        "go" => Ok(Command::Go(parse_go(&tokens[1..])?)),
        "perft" => parse_depth_command(&tokens[1..]).map(Command::Perft),
        "split" => parse_depth_command(&tokens[1..]).map(Command::Split),
        other => Ok(Command::Unknown(other.to_string())),
    }
}

fn parse_depth_command(tokens: &[&str]) -> Result<u32, UaiError> {
    let text = tokens.first().ok_or_else(|| UaiError::InvalidDepth { value: String::new() })?;
    text.parse().map_err(|_| UaiError::InvalidDepth { value: text.to_string() })
}

/// `setoption name <k> value <v>`. The value may itself contain spaces
/// (e.g. a filesystem path); everything after `value` is joined verbatim.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UaiError> {
    let name_idx = tokens.iter().position(|&t| t == "name").map(|i| i + 1);
    let value_idx = tokens.iter().position(|&t| t == "value");

    let (Some(name_idx), Some(value_idx)) = (name_idx, value_idx) else {
        return Err(UaiError::UnknownOption { name: tokens.join(" ") });
    };
    if name_idx >= value_idx {
        return Err(UaiError::UnknownOption { name: tokens.join(" ") });
    }

    let name = tokens[name_idx..value_idx].join(" ");
    let value = tokens[value_idx + 1..].join(" ");
    Ok(Command::SetOption { name, value })
}

/// `position {startpos | fen <board> <side>} [moves m1 m2 …]`.
fn parse_position(tokens: &[&str]) -> Result<Command, UaiError> {
    if tokens.is_empty() {
        return Err(UaiError::MalformedPosition);
    }

    let (mut pos, rest) = if tokens[0] == "startpos" {
        (Position::starting_position(), &tokens[1..])
    } else if tokens[0] == "fen" {
        if tokens.len() < 3 {
            return Err(UaiError::MalformedPosition);
        }
        let notation = format!("{} {}", tokens[1], tokens[2]);
        let pos = Position::from_notation(&notation)?;
        (pos, &tokens[3..])
    } else {
        return Err(UaiError::MalformedPosition);
    };

    if !rest.is_empty() && rest[0] == "moves" {
        pos.apply_uai_moves(&rest[1..]);
    }

    Ok(Command::Position(pos))
}

/// `go [depth N | nodes N | movetime ms | wtime ms btime ms [winc … binc …] | infinite]`.
fn parse_go(tokens: &[&str]) -> Result<GoParams, UaiError> {
    let mut params = GoParams::default();
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            key @ ("depth" | "nodes" | "movetime" | "wtime" | "btime" | "winc" | "binc") => {
                let value = tokens.get(i + 1).ok_or_else(|| UaiError::MissingGoValue { param: key.to_string() })?;
                let parsed: u64 = value.parse().map_err(|_| UaiError::InvalidGoValue {
                    param: key.to_string(),
                    value: value.to_string(),
                })?;
                match key {
                    "depth" => params.depth = Some(parsed as u8),
                    "nodes" => params.nodes = Some(parsed),
                    "movetime" => params.movetime = Some(parsed),
                    "wtime" => params.wtime = Some(parsed),
                    "btime" => params.btime = Some(parsed),
                    "winc" => params.winc = Some(parsed),
                    "binc" => params.binc = Some(parsed),
                    _ => unreachable!(),
                }
                i += 2;
            }
            _ => i += 1,
        }
    }
    Ok(params)
}

/// Parse one move token in UAI notation.
pub fn parse_move(text: &str) -> Result<Move, UaiError> {
    Move::from_uai(text).map_err(|_| UaiError::InvalidMove { mv: text.to_string() })
}
