//! SM83 CPU tests.
//!
//! Register-file unit tests live here; instruction-level tests are in
//! `instructions.rs`. Instruction tests drive a whole machine so that
//! fetches, bus traffic and cycle grants all take the real path.

use super::*;
use crate::gb::GameBoy;


/// Build a 32 KiB cartridge image with `program` at the entry point
/// (0x0100) and hand the machine to the test body.
fn with_program(program: &[u8], test: impl FnOnce(&mut GameBoy<'_>)) {
    let mut cart = vec![0x00u8; 0x8000];
    cart[0x0100..0x0100 + program.len()].copy_from_slice(program);

    let mut gb = GameBoy::new(&cart).expect("valid test cartridge");
    test(&mut gb);
}

#[test]
fn test_register_pair_aliasing() {
    let mut pair = RegisterPair::default();
    pair.set_hi(0x12);
    pair.set_lo(0x34);
    assert_eq!(pair.value, 0x1234);

    pair.value = 0xBEEF;
    assert_eq!(pair.hi(), 0xBE);
    assert_eq!(pair.lo(), 0xEF);
}

#[test]
fn test_register_pair_half_updates_are_independent() {
    let mut pair = RegisterPair { value: 0xAABB };
    pair.set_hi(0x11);
    assert_eq!(pair.value, 0x11BB);
    pair.set_lo(0x22);
    assert_eq!(pair.value, 0x1122);
}

#[test]
fn test_reset_loads_post_boot_state() {
    let mut cpu = Cpu::new();
    cpu.reset();

    assert_eq!(cpu.reg.af.value, 0x01B0);
    assert_eq!(cpu.reg.bc.value, 0x0013);
    assert_eq!(cpu.reg.de.value, 0x00D8);
    assert_eq!(cpu.reg.hl.value, 0x014D);
    assert_eq!(cpu.reg.sp.value, 0xFFFE);
    assert_eq!(cpu.reg.pc.value, 0x0100);
    assert_eq!(cpu.instruction, 0x00);
    assert!(cpu.fault.is_none());
}

#[test]
fn test_reset_clears_fault() {
    let mut cpu = Cpu::new();
    cpu.fault = Some(Fault::InvalidOpcode {
        opcode: 0xD3,
        pc: 0x1234,
    });
    cpu.reset();
    assert!(cpu.fault.is_none());
}
