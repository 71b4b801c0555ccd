//! Pre-instruction debugger hook: consulted before every opcode fetch,
//! with a stdin prompt loop backing the interactive commands.

use std::io::{self, BufRead, Write};

use crate::bus::Bus;
use crate::registers::Registers;

#[derive(Debug, PartialEq, Eq)]
enum DebugCommand {
    Nop,
    Cycle,
    StepByStep,
    Step,
    Quit,
    Dump,
    Mem,
}

/// Consulted once before every instruction. `enabled` gates the whole
/// hook so a run without `--debugger` pays only the cost of one branch.
pub struct Debugger {
    enabled: bool,
    cond_cycle_stop: Option<u64>,
    cond_step_by_step: bool,
    cond_step_counter: u64,
}

impl Debugger {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            cond_cycle_stop: None,
            cond_step_by_step: false,
            cond_step_counter: 0,
        }
    }

    pub fn reset(&mut self) {
        self.cond_cycle_stop = None;
        self.cond_step_by_step = false;
        self.cond_step_counter = 0;
    }

    /// Whether the dispatcher should pause before executing `opcode` at
    /// `pc`, having just reached total cycle count `cycle`.
    pub fn should_stop(&mut self, cycle: u64, _opcode: u8, _pc: u16) -> bool {
        if !self.enabled {
            return false;
        }
        if self.cond_cycle_stop == Some(cycle) {
            return true;
        }
        if self.cond_step_by_step {
            return true;
        }
        if self.cond_step_counter > 0 {
            self.cond_step_counter -= 1;
            if self.cond_step_counter == 0 {
                return true;
            }
        }
        false
    }

    /// Blocks on stdin, prints a `DBG>> ` prompt, and loops until a
    /// command resumes execution. Exits the process on `quit`.
    pub fn prompt(&mut self, regs: &Registers, bus: &Bus) {
        let stdin = io::stdin();
        loop {
            print!("DBG>> ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
                std::process::exit(0);
            }
            if self.handle_line(&line, regs, bus) {
                return;
            }
        }
    }

    /// The logic half of `prompt`, taking the line directly so it can be
    /// exercised without stdin. Returns whether to resume execution.
    fn handle_line(&mut self, line: &str, regs: &Registers, bus: &Bus) -> bool {
        let mut tokens = line.split_whitespace();
        let command = parse_command(tokens.next().unwrap_or(""));
        match command {
            DebugCommand::Quit => std::process::exit(0),
            DebugCommand::Cycle => {
                if let Some(n) = tokens.next().and_then(|s| s.parse::<u64>().ok()) {
                    self.cond_cycle_stop = Some(n);
                    println!("Cycle stop set at {n}");
                }
                false
            }
            DebugCommand::StepByStep => {
                self.cond_step_by_step = !self.cond_step_by_step;
                println!("Step by step is {}", if self.cond_step_by_step { "on" } else { "off" });
                false
            }
            DebugCommand::Step => {
                if let Some(n) = tokens.next().and_then(|s| s.parse::<u64>().ok()) {
                    self.cond_step_counter = n;
                    println!("Step {n}");
                }
                false
            }
            DebugCommand::Dump => {
                print_register_dump(regs);
                false
            }
            DebugCommand::Mem => {
                if let Some(addr) = tokens.next().and_then(|s| u16::from_str_radix(s.trim_start_matches("0x"), 16).ok()) {
                    let val = bus.read(addr);
                    println!("{addr:#06x}: {val:#010b} {val:#04x} {val}");
                }
                false
            }
            DebugCommand::Nop => true,
        }
    }
}

fn parse_command(token: &str) -> DebugCommand {
    match token {
        "q" | "quit" | "exit" => DebugCommand::Quit,
        "c" | "cycle" => DebugCommand::Cycle,
        "sbs" => DebugCommand::StepByStep,
        "s" | "step" => DebugCommand::Step,
        "d" => DebugCommand::Dump,
        "m" => DebugCommand::Mem,
        _ => DebugCommand::Nop,
    }
}

fn print_register_dump(regs: &Registers) {
    println!(
        "A={:02x} F={:02x} B={:02x} C={:02x} D={:02x} E={:02x} H={:02x} L={:02x} SP={:04x} PC={:04x}",
        regs.a, regs.f, regs.b, regs.c, regs.d, regs.e, regs.h, regs.l, regs.sp, regs.pc
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (Debugger, Registers, Bus) {
        (Debugger::new(true), Registers::default(), Bus::new(vec![0; crate::bus::ROM_SIZE]))
    }

    #[test]
    fn disabled_debugger_never_stops() {
        let mut dbg = Debugger::new(false);
        assert!(!dbg.should_stop(1000, 0x00, 0x00));
    }

    #[test]
    fn cycle_breakpoint_stops_exactly_once() {
        let mut dbg = Debugger::new(true);
        dbg.cond_cycle_stop = Some(100);
        assert!(!dbg.should_stop(99, 0, 0));
        assert!(dbg.should_stop(100, 0, 0));
    }

    #[test]
    fn step_counter_counts_down_to_a_single_stop() {
        let mut dbg = Debugger::new(true);
        dbg.cond_step_counter = 3;
        assert!(!dbg.should_stop(0, 0, 0));
        assert!(!dbg.should_stop(0, 0, 0));
        assert!(dbg.should_stop(0, 0, 0));
    }

    #[test]
    fn blank_line_resumes_execution() {
        let (mut dbg, regs, bus) = fresh();
        assert!(dbg.handle_line("\n", &regs, &bus));
    }

    #[test]
    fn cycle_command_sets_breakpoint_and_does_not_resume() {
        let (mut dbg, regs, bus) = fresh();
        assert!(!dbg.handle_line("c 42\n", &regs, &bus));
        assert_eq!(dbg.cond_cycle_stop, Some(42));
    }

    #[test]
    fn sbs_toggles_step_by_step_and_does_not_resume() {
        let (mut dbg, regs, bus) = fresh();
        assert!(!dbg.handle_line("sbs\n", &regs, &bus));
        assert!(dbg.cond_step_by_step);
        assert!(!dbg.handle_line("sbs\n", &regs, &bus));
        assert!(!dbg.cond_step_by_step);
    }

    #[test]
    fn unrecognized_command_is_treated_as_nop() {
        let (mut dbg, regs, bus) = fresh();
        assert!(dbg.handle_line("bogus\n", &regs, &bus));
    }
}
