//! Interactive prompt module
//!
//! Provides a line-edited REPL that streams each answer and lets a new
//! prompt replace the one still streaming.

mod editor;
mod repl;

pub use editor::Input;
pub use repl::{ChatRepl, LineAction};
