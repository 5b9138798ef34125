//! UAI protocol handling: command parsing, the option registry, and the
//! event-driven engine that ties them to an `ataxx_engine::Searcher`.

pub mod command;
pub mod engine;
pub mod error;
pub mod options;

pub use command::{Command, GoParams};
pub use engine::UaiEngine;
pub use error::UaiError;
pub use options::Options;
