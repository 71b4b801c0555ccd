//! Error taxonomy. Faults are fatal: the run loop logs the banner and
//! exits non-zero, but `Cpu::step` itself returns a `Result` instead of
//! panicking so the fault can be reported cleanly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmuError {
    #[error("unknown opcode {opcode:#04x} at pc {pc:#06x}")]
    UnknownOpcode { opcode: u8, pc: u16 },

    #[error("unknown CB opcode {opcode:#04x} at pc {pc:#06x}")]
    UnknownCbOpcode { opcode: u8, pc: u16 },

    #[error("invalid TAC clock-select field in TAC {tac:#04x}")]
    InvalidTacClock { tac: u8 },

    #[error("failed to read ROM image")]
    RomRead(#[from] std::io::Error),

    #[error("failed to parse config file")]
    ConfigParse(#[from] serde_json::Error),
}

/// Prints the `\e[1m\e[101m … \e[0m` ANSI-wrapped fault banner to stderr.
pub fn print_fault_banner(err: &EmuError) {
    eprintln!("\x1b[1m\x1b[101m {err} \x1b[0m");
}
