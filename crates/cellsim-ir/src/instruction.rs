//! Instruction set for Darwin species programs.

use cellsim_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Darwin opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // Actions
    Move,   // Step forward up to N cells
    Left,   // Rotate counter-clockwise
    Right,  // Rotate clockwise
    Infect, // Convert the first enemy within N cells ahead

    // Control flow
    Go,       // Unconditional jump
    IfEmpty,  // Jump if a probed cell is empty
    IfWall,   // Jump if a probe leaves the grid
    IfSame,   // Jump if a probed cell holds the same species
    IfEnemy,  // Jump if a probed cell holds another species
    IfRandom, // Jump with probability 1/2
}

impl Opcode {
    pub const ALL: [Opcode; 10] = [
        Opcode::Move,
        Opcode::Left,
        Opcode::Right,
        Opcode::Infect,
        Opcode::Go,
        Opcode::IfEmpty,
        Opcode::IfWall,
        Opcode::IfSame,
        Opcode::IfEnemy,
        Opcode::IfRandom,
    ];

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::Left => "LEFT",
            Opcode::Right => "RIGHT",
            Opcode::Infect => "INFECT",
            Opcode::Go => "GO",
            Opcode::IfEmpty => "IFEMPTY",
            Opcode::IfWall => "IFWALL",
            Opcode::IfSame => "IFSAME",
            Opcode::IfEnemy => "IFENEMY",
            Opcode::IfRandom => "IFRANDOM",
        }
    }

    /// Returns true if this opcode is a control flow instruction
    pub fn is_control_flow(&self) -> bool {
        matches!(self, Opcode::Go) || self.is_conditional()
    }

    pub fn is_conditional(&self) -> bool {
        matches!(
            self,
            Opcode::IfEmpty | Opcode::IfWall | Opcode::IfSame | Opcode::IfEnemy | Opcode::IfRandom
        )
    }
}

impl FromStr for Opcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic() == upper)
            .ok_or_else(|| Error::UnknownOpcode(s.to_string()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A single instruction: an opcode word followed by raw argument words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub mnemonic: String,
    pub arguments: Vec<String>,
}

impl Instruction {
    pub fn new(mnemonic: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            arguments,
        }
    }

    pub fn with_argument(opcode: Opcode, argument: i32) -> Self {
        Self::new(opcode.mnemonic(), vec![argument.to_string()])
    }

    /// Parse one line of program text. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let mut words = line.split_whitespace();
        let mnemonic = words.next()?;
        Some(Self::new(mnemonic, words.map(str::to_string).collect()))
    }

    pub fn opcode(&self) -> Result<Opcode> {
        self.mnemonic.parse()
    }

    /// Integer argument at `index`.
    pub fn int_argument(&self, index: usize) -> Result<i32> {
        let raw = self.arguments.get(index).ok_or_else(|| {
            Error::InvalidArgument(format!("'{}' is missing argument {}", self, index + 1))
        })?;
        raw.parse().map_err(|_| {
            Error::InvalidArgument(format!("'{}' has non-numeric argument '{}'", self, raw))
        })
    }

    /// Integer argument at `index`, or `default` when the instruction has none.
    pub fn int_argument_or(&self, index: usize, default: i32) -> Result<i32> {
        if index < self.arguments.len() {
            self.int_argument(index)
        } else {
            Ok(default)
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mnemonic)?;
        for arg in &self.arguments {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
