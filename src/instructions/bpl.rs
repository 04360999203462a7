use crate::bus::Bus;
use crate::cpu6502::{Cpu, StatusFlag};

impl Cpu {
    pub(crate) fn handle_bpl(
        &mut self,
        _bus: &mut Bus,
        _opt_value: Option<u8>,
        opt_address: Option<u16>,
    ) -> u8 {
        let target = opt_address.expect("BUG: branch target of BPL should be present");
        self.branch(!self.get_status_flag(StatusFlag::Negative), target)
    }
}

#[cfg(test)]
mod tests {
    use crate::bus::Bus;
    use crate::cpu6502::{Cpu, StatusFlag};

    #[test]
    fn test_bpl_taken_when_negative_clear() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.program_counter = 0x0210;
        cpu.set_status_flag(StatusFlag::Negative, false);
        let cycles = cpu.handle_bpl(&mut bus, None, Some(0x0230));
        assert_eq!(cpu.program_counter, 0x0230);
        assert_eq!(cycles, 1);
    }

    #[test]
    fn test_bpl_not_taken_when_negative_set() {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.program_counter = 0x0210;
        cpu.set_status_flag(StatusFlag::Negative, true);
        let cycles = cpu.handle_bpl(&mut bus, None, Some(0x0230));
        assert_eq!(cpu.program_counter, 0x0210);
        assert_eq!(cycles, 0);
    }

    #[test]
    fn test_bpl_backward_loop_runs_until_negative() {
        // loop: ADC #$20 / BPL loop. A climbs 0x20 at a time and the loop
        // exits once bit 7 goes high.
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.program_counter = 0x0200;
        bus.load(0x0200, &[0x69, 0x20, 0x10, 0xFC]); // BPL -4

        // 4 adds (2 cycles each) + 3 taken branches (3 each) + 1 final
        // untaken branch (2) = 19 cycles.
        cpu.execute(&mut bus, 19);

        assert_eq!(cpu.accumulator, 0x80);
        assert!(cpu.get_status_flag(StatusFlag::Negative));
        assert_eq!(cpu.program_counter, 0x0204);
        assert_eq!(cpu.cycles, 19);
    }
}
