use crate::bus::Bus;
use crate::cpu6502::{Cpu, StatusFlag};

impl Cpu {
    pub(crate) fn handle_bit(
        &mut self,
        _bus: &mut Bus,
        opt_value: Option<u8>,
        _opt_address: Option<u16>,
    ) -> u8 {
        let value = opt_value.expect("BUG: memory value of BIT should be present");

        // Z comes from the masked result; N and V are copied straight from
        // bits 7 and 6 of the memory operand. The accumulator is not changed.
        self.set_status_flag(StatusFlag::Zero, self.accumulator & value == 0);
        self.set_status_flag(StatusFlag::Negative, value & 0x80 != 0);
        self.set_status_flag(StatusFlag::Overflow, value & 0x40 != 0);
        0
    }
}
