//! Whole-program scenarios driven through the public API only: load an
//! image over the bus, run the CPU against a cycle budget, inspect the
//! resulting machine state.

use m6502::bus::Bus;
use m6502::cpu6502::{Cpu, StatusFlag};

fn machine_with_program(program: &[u8]) -> (Cpu, Bus) {
    let mut cpu = Cpu::new();
    let mut bus = Bus::new();
    cpu.reset(&mut bus);
    cpu.program_counter = 0x0200;
    bus.load(0x0200, program);
    (cpu, bus)
}

#[test]
fn load_then_add_leaves_all_result_flags_clear() {
    let (mut cpu, mut bus) = machine_with_program(&[0xA9, 0x20, 0x69, 0x22]);
    cpu.accumulator = 0x10;

    cpu.execute(&mut bus, 4);

    assert_eq!(cpu.accumulator, 0x42);
    assert!(!cpu.get_status_flag(StatusFlag::Carry));
    assert!(!cpu.get_status_flag(StatusFlag::Zero));
    assert!(!cpu.get_status_flag(StatusFlag::Overflow));
    assert!(!cpu.get_status_flag(StatusFlag::Negative));
}

#[test]
fn adding_one_to_0x7f_sets_overflow_and_negative() {
    let (mut cpu, mut bus) = machine_with_program(&[0x69, 0x01]);
    cpu.accumulator = 0x7F;

    cpu.execute(&mut bus, 2);

    assert_eq!(cpu.accumulator, 0x80);
    assert!(cpu.get_status_flag(StatusFlag::Overflow));
    assert!(cpu.get_status_flag(StatusFlag::Negative));
    assert!(!cpu.get_status_flag(StatusFlag::Carry));
}

#[test]
fn adding_one_to_0xff_wraps_with_carry() {
    let (mut cpu, mut bus) = machine_with_program(&[0x69, 0x01]);
    cpu.accumulator = 0xFF;

    cpu.execute(&mut bus, 2);

    assert_eq!(cpu.accumulator, 0x00);
    assert!(cpu.get_status_flag(StatusFlag::Carry));
    assert!(cpu.get_status_flag(StatusFlag::Zero));
    assert!(!cpu.get_status_flag(StatusFlag::Overflow));
}

#[test]
fn zero_page_indexed_load_wraps_into_page_zero() {
    let (mut cpu, mut bus) = machine_with_program(&[0xB5, 0xFF]); // LDA $FF,X
    cpu.x_register = 0x02;
    bus.write(0x0001, 0x77);

    cpu.execute(&mut bus, 4);

    assert_eq!(cpu.accumulator, 0x77);
}

#[test]
fn brk_pushes_return_state_and_takes_the_vector() {
    let (mut cpu, mut bus) = machine_with_program(&[0x00]); // BRK at 0x0200
    cpu.stack_pointer = 0xFF;
    bus.write_u16(0xFFFE, 0x1234);

    cpu.execute(&mut bus, 7);

    assert_eq!(cpu.program_counter, 0x1234);
    assert_eq!(cpu.stack_pointer, 0xFC);
    assert_eq!(bus.read(0x01FF), 0x02); // return address high
    assert_eq!(bus.read(0x01FE), 0x02); // return address low: 0x0202
    let stacked_status = bus.read(0x01FD);
    assert_ne!(stacked_status & (1 << (StatusFlag::BreakCommand as u8)), 0);
    assert!(cpu.get_status_flag(StatusFlag::InterruptDisable));
}

#[test]
fn bit_test_reports_memory_bits_without_touching_a() {
    let (mut cpu, mut bus) = machine_with_program(&[0x24, 0x10]); // BIT $10
    cpu.accumulator = 0x0F;
    bus.write(0x0010, 0xF0);

    cpu.execute(&mut bus, 3);

    assert_eq!(cpu.accumulator, 0x0F);
    assert!(cpu.get_status_flag(StatusFlag::Zero));
    assert!(cpu.get_status_flag(StatusFlag::Negative));
    assert!(cpu.get_status_flag(StatusFlag::Overflow));
}

#[test]
fn absolute_x_load_across_a_page_costs_five_cycles() {
    let (mut cpu, mut bus) = machine_with_program(&[0xBD, 0xFF, 0x03]);
    cpu.x_register = 0x01;
    bus.write(0x0400, 0xAB);

    cpu.execute(&mut bus, 4);

    assert_eq!(cpu.accumulator, 0xAB);
    assert_eq!(cpu.cycles, 5);
}

#[test]
fn indirect_x_pointer_wraps_at_the_top_of_page_zero() {
    let (mut cpu, mut bus) = machine_with_program(&[0xA1, 0xFE]); // LDA ($FE,X)
    cpu.x_register = 0x01;
    bus.write(0x00FF, 0x00); // pointer low at 0xFF
    bus.write(0x0000, 0x03); // pointer high wraps to 0x00
    bus.write(0x0300, 0x99);

    cpu.execute(&mut bus, 6);

    assert_eq!(cpu.accumulator, 0x99);
}

#[test]
fn taken_branch_crossing_a_page_costs_four_cycles() {
    let mut cpu = Cpu::new();
    let mut bus = Bus::new();
    cpu.reset(&mut bus);
    cpu.program_counter = 0x02FD;
    cpu.set_status_flag(StatusFlag::Zero, true);
    bus.load(0x02FD, &[0xF0, 0x01]); // BEQ +1 -> 0x0300

    cpu.execute(&mut bus, 2);

    assert_eq!(cpu.program_counter, 0x0300);
    assert_eq!(cpu.cycles, 4);
}

#[test]
fn reset_zeroes_the_whole_address_space() {
    let mut cpu = Cpu::new();
    let mut bus = Bus::new();
    bus.write(0x0000, 0x01);
    bus.write(0x7FFF, 0x02);
    bus.write(0xFFFF, 0x03);

    cpu.reset(&mut bus);

    for addr in 0..=0xFFFFu16 {
        assert_eq!(bus.read(addr), 0x00, "address 0x{:04X} not cleared", addr);
    }
}

#[test]
fn embedder_can_mutate_memory_between_execute_calls() {
    // The bus is borrowed per call, so the caller is free to poke at memory
    // while the CPU is paused. That stands in for external devices.
    let (mut cpu, mut bus) = machine_with_program(&[0xA5, 0x10, 0xA5, 0x10]); // LDA $10 twice
    bus.write(0x0010, 0x01);

    cpu.execute(&mut bus, 3);
    assert_eq!(cpu.accumulator, 0x01);

    bus.write(0x0010, 0x02);
    cpu.execute(&mut bus, 3);
    assert_eq!(cpu.accumulator, 0x02);
}

#[test]
fn unused_status_bit_reads_one_after_every_run() {
    let (mut cpu, mut bus) = machine_with_program(&[0xA9, 0x00, 0x85, 0x10]);
    cpu.status_register = 0x00; // even a hostile starting value

    cpu.execute(&mut bus, 5);

    assert!(cpu.get_status_flag(StatusFlag::Unused));
}
