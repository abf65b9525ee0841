//! Program structure for Darwin species.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::instruction::Instruction;

/// An ordered list of instructions.
///
/// Species keep one template program; every individual holds its own clone,
/// so nothing an individual does can leak into the template or another
/// individual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instructions(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Parse program text, one instruction per line.
    pub fn parse(text: &str) -> Self {
        Self {
            instructions: text.lines().filter_map(Instruction::parse).collect(),
        }
    }

    pub fn add_instruction(&mut self, inst: Instruction) {
        self.instructions.push(inst);
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> + '_ {
        self.instructions.iter()
    }

    /// Index following `index`, wrapping to the start of the program.
    pub fn next_index(&self, index: usize) -> usize {
        if self.instructions.is_empty() {
            0
        } else {
            (index + 1) % self.instructions.len()
        }
    }
}

impl FromStr for Program {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for inst in &self.instructions {
            writeln!(f, "{}", inst)?;
        }
        Ok(())
    }
}
