//! The LR35902 instruction dispatcher.

mod alu;
mod cb;
mod ops;

use crate::bus::Bus;
use crate::error::EmuError;
use crate::registers::Registers;

pub struct Cpu {
    pub regs: Registers,
    pub ime: bool,
    pub halted: bool,
    /// `EI` takes effect only after the *next* instruction completes.
    ei_delay: bool,
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            regs: Registers::default(),
            ime: false,
            halted: false,
            ei_delay: false,
        }
    }

    pub fn reset(&mut self) {
        self.regs = Registers::default();
        self.ime = false;
        self.halted = false;
        self.ei_delay = false;
    }

    /// Fetches, decodes, and executes one instruction at `PC`, returning
    /// the number of machine cycles it consumed.
    pub fn step(&mut self, bus: &mut Bus) -> Result<u8, EmuError> {
        if self.ei_delay {
            self.ime = true;
            self.ei_delay = false;
        }

        if self.halted {
            return Ok(4);
        }

        let pc_at_fetch = self.regs.pc;
        let opcode = self.read_next(bus);
        ops::execute(self, bus, opcode, pc_at_fetch)
    }

    pub fn request_ei_delay(&mut self) {
        self.ei_delay = true;
    }

    pub(crate) fn read_next(&mut self, bus: &Bus) -> u8 {
        let val = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        val
    }

    pub(crate) fn read_next_u16(&mut self, bus: &Bus) -> u16 {
        let lo = self.read_next(bus) as u16;
        let hi = self.read_next(bus) as u16;
        (hi << 8) | lo
    }

    pub(crate) fn push_u8(&mut self, bus: &mut Bus, val: u8) {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, val);
    }

    pub(crate) fn push_u16(&mut self, bus: &mut Bus, val: u16) {
        self.push_u8(bus, (val >> 8) as u8);
        self.push_u8(bus, (val & 0xFF) as u8);
    }

    pub(crate) fn pop_u8(&mut self, bus: &Bus) -> u8 {
        let val = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        val
    }

    pub(crate) fn pop_u16(&mut self, bus: &Bus) -> u16 {
        let lo = self.pop_u8(bus) as u16;
        let hi = self.pop_u8(bus) as u16;
        (hi << 8) | lo
    }

    /// Register-index decoding shared by the `LD r,r'` block and every
    /// CB-page operation: 0..=5 are B,C,D,E,H,L; 6 is `(HL)`; 7 is A.
    pub(crate) fn reg_by_index(&mut self, bus: &Bus, idx: u8) -> u8 {
        match idx {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            6 => bus.read(self.regs.hl()),
            7 => self.regs.a,
            _ => unreachable!("register index is always masked to 3 bits"),
        }
    }

    pub(crate) fn set_reg_by_index(&mut self, bus: &mut Bus, idx: u8, val: u8) {
        match idx {
            0 => self.regs.b = val,
            1 => self.regs.c = val,
            2 => self.regs.d = val,
            3 => self.regs.e = val,
            4 => self.regs.h = val,
            5 => self.regs.l = val,
            6 => bus.write(self.regs.hl(), val),
            7 => self.regs.a = val,
            _ => unreachable!("register index is always masked to 3 bits"),
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;

    fn cpu_with_rom(bytes: &[u8]) -> (Cpu, Bus) {
        let mut rom = vec![0u8; crate::bus::ROM_SIZE];
        rom[..bytes.len()].copy_from_slice(bytes);
        (Cpu::new(), Bus::new(rom))
    }

    #[test]
    fn nop_advances_pc_by_one_and_takes_4_cycles() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0x00]);
        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cycles, 4);
        assert_eq!(cpu.regs.pc, 1);
        assert_eq!(cpu.regs.f, 0);
    }

    #[test]
    fn ld_hl_d16_loads_both_halves_and_takes_12_cycles() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0x21, 0x34, 0x12]);
        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.regs.h, 0x12);
        assert_eq!(cpu.regs.l, 0x34);
        assert_eq!(cpu.regs.pc, 3);
        assert_eq!(cycles, 12);
    }

    #[test]
    fn xor_a_zeroes_a_and_sets_only_zero_flag() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0xAF]);
        cpu.regs.a = 0x5A;
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.regs.a, 0);
        assert_eq!(cpu.regs.f, 0x80);
        assert_eq!(cpu.regs.pc, 1);
    }

    #[test]
    fn ld_b_then_dec_b_sets_zero_and_subtract() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0x06, 0x01, 0x05]);
        cpu.step(&mut bus).unwrap();
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.regs.b, 0);
        assert!(cpu.regs.zero());
        assert!(cpu.regs.subtract());
        assert_eq!(cpu.regs.pc, 3);
    }

    #[test]
    fn jr_nz_loops_back_when_zero_flag_clear() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0x20, 0xFE]);
        cpu.regs.set_flag(crate::registers::flag::Z, false);
        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.regs.pc, 0);
        assert_eq!(cycles, 12);
    }

    #[test]
    fn jr_nz_falls_through_when_zero_flag_set() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0x20, 0xFE]);
        cpu.regs.set_flag(crate::registers::flag::Z, true);
        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.regs.pc, 2);
        assert_eq!(cycles, 8);
    }

    #[test]
    fn unknown_opcode_is_reported_not_panicked() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0xFC]); // genuinely unassigned
        let err = cpu.step(&mut bus).unwrap_err();
        match err {
            EmuError::UnknownOpcode { opcode, pc } => {
                assert_eq!(opcode, 0xFC);
                assert_eq!(pc, 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn call_then_ret_round_trips_pc_and_sp() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0xCD, 0x05, 0x00, 0x00, 0x00, 0xC9]);
        cpu.regs.sp = 0xFFFE;
        cpu.step(&mut bus).unwrap(); // CALL 0x0005
        assert_eq!(cpu.regs.pc, 0x0005);
        cpu.step(&mut bus).unwrap(); // RET
        assert_eq!(cpu.regs.pc, 0x0003);
        assert_eq!(cpu.regs.sp, 0xFFFE);
    }

    #[test]
    fn push_pop_is_lifo_and_restores_sp() {
        let (mut cpu, mut bus) = cpu_with_rom(&[]);
        let sp0 = 0xFFFE;
        cpu.regs.sp = sp0;
        cpu.push_u16(&mut bus, 0x1111);
        cpu.push_u16(&mut bus, 0x2222);
        assert_eq!(cpu.pop_u16(&bus), 0x2222);
        assert_eq!(cpu.pop_u16(&bus), 0x1111);
        assert_eq!(cpu.regs.sp, sp0);
    }
}
