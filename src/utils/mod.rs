//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Command execution with error handling
//! - `io` - File I/O with consistent error handling
//! - `parser` - Lexical scanning of Go source text
//! - `template` - String template rendering

pub mod command;
pub mod io;
pub mod parser;
pub mod template;
