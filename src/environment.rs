//! Owns CPU, bus, timer, debugger, and PPU hook; exposes `reset` and
//! `run`. Nothing outside `Environment` mutates any of these directly.

use log::{debug, info};

use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::debugger::Debugger;
use crate::error::{print_fault_banner, EmuError};
use crate::interrupts;
use crate::ppu::{NullPpu, PpuHook};
use crate::timer::Timer;

pub struct Environment {
    pub cpu: Cpu,
    pub bus: Bus,
    pub timer: Timer,
    pub debugger: Debugger,
    ppu: NullPpu,
    /// Free-running total cycle count.
    pub t: u64,
}

impl Environment {
    pub fn new(rom: Vec<u8>, debugger_enabled: bool) -> Self {
        Self {
            cpu: Cpu::new(),
            bus: Bus::new(rom),
            timer: Timer::default(),
            debugger: Debugger::new(debugger_enabled),
            ppu: NullPpu,
            t: 0,
        }
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.timer.reset();
        self.debugger.reset();
        self.ppu.reset();
        self.t = 0;
    }

    /// Runs until `max_cycles` total cycles have elapsed (if given), a
    /// debugger `quit` exits the process, or a fault occurs. A fault
    /// prints the ANSI banner and returns the error to the caller, which
    /// `main` converts into a nonzero exit code.
    pub fn run(&mut self, max_cycles: Option<u64>) -> Result<(), EmuError> {
        loop {
            if let Some(max) = max_cycles {
                if self.t >= max {
                    return Ok(());
                }
            }

            let pc = self.cpu.regs.pc;
            let next_opcode = self.bus.read(pc);
            if self.debugger.should_stop(self.t, next_opcode, pc) {
                self.debugger.prompt(&self.cpu.regs, &self.bus);
            }

            let dur = match self.cpu.step(&mut self.bus) {
                Ok(dur) => dur,
                Err(err) => {
                    print_fault_banner(&err);
                    return Err(err);
                }
            };
            debug!("pc={pc:#06x} opcode={next_opcode:#04x} dur={dur}");

            let service_cycles = interrupts::handle(&mut self.cpu, &mut self.bus);
            let total_dur = dur + service_cycles;

            self.timer.tick(&mut self.bus, total_dur)?;
            self.ppu.tick(&self.bus, total_dur);
            self.t += total_dur as u64;

            if service_cycles > 0 {
                info!("serviced interrupt, jumped to {:#06x}", self.cpu.regs.pc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_cycles_zero_returns_immediately_without_executing() {
        let mut env = Environment::new(vec![0x00; crate::bus::ROM_SIZE], false);
        env.run(Some(0)).unwrap();
        assert_eq!(env.cpu.regs.pc, 0);
    }

    #[test]
    fn run_stops_exactly_at_the_requested_cycle_budget() {
        let mut rom = vec![0x00; crate::bus::ROM_SIZE]; // NOP stream, 4 cycles each
        rom[0] = 0x00;
        let mut env = Environment::new(rom, false);
        env.run(Some(16)).unwrap();
        assert_eq!(env.t, 16);
        assert_eq!(env.cpu.regs.pc, 4);
    }

    #[test]
    fn unknown_opcode_fault_propagates_as_an_error() {
        let mut rom = vec![0u8; crate::bus::ROM_SIZE];
        rom[0] = 0xFC; // genuinely unassigned
        let mut env = Environment::new(rom, false);
        let err = env.run(None).unwrap_err();
        assert!(matches!(err, EmuError::UnknownOpcode { opcode: 0xFC, pc: 0 }));
    }

    #[test]
    fn reset_zeroes_cycle_total_and_pc() {
        let mut env = Environment::new(vec![0x00; crate::bus::ROM_SIZE], false);
        env.run(Some(8)).unwrap();
        env.reset();
        assert_eq!(env.t, 0);
        assert_eq!(env.cpu.regs.pc, 0);
    }
}
