//! Validation for species programs.

use crate::instruction::Opcode;
use crate::program::Program;
use cellsim_core::{Error, Result};

/// Validate that a program is well-formed.
///
/// Execution tolerates malformed instructions one individual at a time; this
/// check lets a caller reject a species program before any cell runs it.
pub fn validate_program(program: &Program) -> Result<()> {
    if program.is_empty() {
        return Err(Error::Validation("Program has no instructions".to_string()));
    }

    for (idx, inst) in program.iter().enumerate() {
        let opcode = inst
            .opcode()
            .map_err(|e| Error::Validation(format!("Instruction {}: {}", idx + 1, e)))?;

        for arg_idx in 0..inst.arguments.len() {
            inst.int_argument(arg_idx)
                .map_err(|e| Error::Validation(format!("Instruction {}: {}", idx + 1, e)))?;
        }

        if opcode.is_control_flow() {
            let target = inst
                .int_argument(0)
                .map_err(|e| Error::Validation(format!("Instruction {}: {}", idx + 1, e)))?;
            if target < 1 || target as usize > program.len() {
                return Err(Error::Validation(format!(
                    "Instruction {}: jump target {} outside 1..={}",
                    idx + 1,
                    target,
                    program.len()
                )));
            }
        } else if inst.int_argument_or(0, 1)? < 0 {
            return Err(Error::Validation(format!(
                "Instruction {}: negative argument",
                idx + 1
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_empty_program() {
        assert!(validate_program(&Program::new()).is_err());
    }

    #[test]
    fn test_validate_unknown_opcode() {
        let program = Program::parse("MOVE 1\nJUMP 1");
        assert!(validate_program(&program).is_err());
    }

    #[test]
    fn test_validate_jump_targets() {
        assert!(validate_program(&Program::parse("MOVE 1\nGO 3")).is_err());
        assert!(validate_program(&Program::parse("MOVE 1\nIFWALL 0")).is_err());
        assert!(validate_program(&Program::parse("MOVE 1\nGO x")).is_err());
    }

    #[test]
    fn test_validate_valid_program() {
        let program = Program::parse(
            "IFENEMY 4\nIFWALL 5\nMOVE 1\nGO 1\nINFECT 1\nRIGHT 90\nGO 1",
        );
        assert!(validate_program(&program).is_ok());
    }
}
