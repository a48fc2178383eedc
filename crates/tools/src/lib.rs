//! Built-in tool implementations for atomchat.
//!
//! Tools are narrowly scoped callables an agent can use to augment its
//! replies. The calculator can also be run directly from the command line.

pub mod calculator;

pub use calculator::{CalculatorTool, evaluate};
