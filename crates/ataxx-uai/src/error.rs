//! UAI protocol errors.

/// Errors that can occur while parsing a line of UAI protocol input.
#[derive(Debug, thiserror::Error)]
pub enum UaiError {
    /// The `position` command is missing `startpos` or `fen`.
    #[error("malformed position command: missing startpos or fen keyword")]
    MalformedPosition,

    /// The `fen` keyword wasn't followed by a valid `<board> <side>` notation.
    #[error("invalid position notation: {source}")]
    InvalidNotation {
        #[from]
        source: ataxx_core::PositionError,
    },

    /// A move string could not be parsed as UAI move notation.
    #[error("invalid move: {mv}")]
    InvalidMove {
        /// The move text that failed to parse.
        mv: String,
    },

    /// A `go` parameter is missing its required numeric value.
    #[error("missing value for go parameter: {param}")]
    MissingGoValue {
        /// The parameter name (e.g. "wtime", "depth").
        param: String,
    },

    /// A `go` parameter's value could not be parsed as a number.
    #[error("invalid value for go parameter {param}: {value}")]
    InvalidGoValue {
        /// The parameter name.
        param: String,
        /// The value text that failed to parse.
        value: String,
    },

    /// `setoption` named an option this engine doesn't register.
    #[error("unknown option: {name}")]
    UnknownOption {
        /// The option name from the command line.
        name: String,
    },

    /// `setoption`'s value was outside the option's declared range or set.
    #[error("invalid value for option {name}: {value}")]
    InvalidOptionValue {
        /// The option name.
        name: String,
        /// The value text that was rejected.
        value: String,
    },

    /// A `perft`/`split` depth argument was missing or not a number.
    #[error("invalid depth argument: {value}")]
    InvalidDepth {
        /// The depth text that failed to parse.
        value: String,
    },

    /// An I/O error occurred while reading from stdin.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
