//! Instruction language for Darwin species programs.
//!
//! A species program is a list of text instructions such as `MOVE 2` or
//! `IFENEMY 4`. Every individual owns its own copy of the program and steps
//! through it one instruction per tick. Instructions keep their raw argument
//! text; arguments are converted to integers when they execute, so a bad
//! argument only affects the individual running it.

pub mod instruction;
pub mod program;
pub mod validation;

pub use instruction::{Instruction, Opcode};
pub use program::Program;
pub use validation::validate_program;
