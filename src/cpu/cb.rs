//! CB-prefixed extended opcode page: 256 entries split into four
//! 64-wide bands (rotate/shift, BIT, RES, SET), each indexed by the
//! same 3-bit register selector `mod.rs::reg_by_index` already decodes
//! for the primary page.

use super::alu;
use super::Cpu;
use crate::bus::Bus;
use crate::error::EmuError;

pub(crate) fn execute(cpu: &mut Cpu, bus: &mut Bus, opcode: u8, pc_at_fetch: u16) -> Result<u8, EmuError> {
    let idx = opcode & 0x07;
    let is_hl = idx == 6;

    let dur = match opcode >> 6 {
        0b00 => {
            let f: fn(&mut crate::registers::Registers, u8) -> u8 = match (opcode >> 3) & 0x07 {
                0 => alu::rlc,
                1 => alu::rrc,
                2 => alu::rl,
                3 => alu::rr,
                4 => alu::sla,
                5 => alu::sra,
                6 => alu::swap,
                7 => alu::srl,
                _ => unreachable!("3-bit field"),
            };
            let v = cpu.reg_by_index(bus, idx);
            let res = f(&mut cpu.regs, v);
            cpu.set_reg_by_index(bus, idx, res);
            if is_hl {
                16
            } else {
                8
            }
        }
        0b01 => {
            let n = (opcode >> 3) & 0x07;
            let v = cpu.reg_by_index(bus, idx);
            alu::bit_test(&mut cpu.regs, v, n);
            if is_hl {
                16
            } else {
                8
            }
        }
        0b10 => {
            let n = (opcode >> 3) & 0x07;
            let v = cpu.reg_by_index(bus, idx);
            let res = alu::res_bit(v, n);
            cpu.set_reg_by_index(bus, idx, res);
            if is_hl {
                16
            } else {
                8
            }
        }
        0b11 => {
            let n = (opcode >> 3) & 0x07;
            let v = cpu.reg_by_index(bus, idx);
            let res = alu::set_bit(v, n);
            cpu.set_reg_by_index(bus, idx, res);
            if is_hl {
                16
            } else {
                8
            }
        }
        _ => {
            return Err(EmuError::UnknownCbOpcode {
                opcode,
                pc: pc_at_fetch,
            })
        }
    };
    Ok(dur)
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
    fn cb_rlc_b_rotates_and_sets_carry_from_bit7() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0xCB, 0x00]);
        cpu.regs.b = 0x85;
        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.regs.b, 0x0B);
        assert!(cpu.regs.carry());
        assert_eq!(cycles, 8);
    }

    #[test]
    fn cb_bit_on_hl_costs_sixteen_cycles_and_leaves_memory_untouched() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0xCB, 0x46]); // BIT 0,(HL)
        cpu.regs.set_hl(0xC000);
        bus.write(0xC000, 0x01);
        let cycles = cpu.step(&mut bus).unwrap();
        assert!(!cpu.regs.zero());
        assert_eq!(bus.read(0xC000), 0x01);
        assert_eq!(cycles, 16);
    }

    #[test]
    fn cb_res_clears_only_the_targeted_bit() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0xCB, 0xB8]); // RES 7,B
        cpu.regs.b = 0xFF;
        cpu.step(&mut bus).unwrap();
        assert_eq!(cpu.regs.b, 0x7F);
    }

    #[test]
    fn cb_set_on_hl_writes_back_through_the_bus() {
        let (mut cpu, mut bus) = cpu_with_rom(&[0xCB, 0xC6]); // SET 0,(HL)
        cpu.regs.set_hl(0xC000);
        bus.write(0xC000, 0x00);
        let cycles = cpu.step(&mut bus).unwrap();
        assert_eq!(bus.read(0xC000), 0x01);
        assert_eq!(cycles, 16);
    }
}
