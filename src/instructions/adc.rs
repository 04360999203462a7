use crate::bus::Bus;
use crate::cpu6502::{Cpu, StatusFlag};

impl Cpu {
    pub(crate) fn handle_adc(
        &mut self,
        _bus: &mut Bus,
        opt_value: Option<u8>,
        _opt_address: Option<u16>,
    ) -> u8 {
        let value = opt_value.expect("BUG: memory value of ADC should be present");

        // Always binary addition, computed over 9 bits so the carry-out
        // survives. The decimal flag is storable but has no effect on the
        // arithmetic.
        let carry_in = if self.get_status_flag(StatusFlag::Carry) { 1 } else { 0 };
        let sum = u16::from(self.accumulator) + u16::from(value) + carry_in;
        let result = sum as u8;

        self.set_status_flag(StatusFlag::Carry, sum > 0xFF);

        // Signed overflow: both operands share a sign that differs from the
        // sign of the result.
        let overflow = (self.accumulator ^ result) & (value ^ result) & 0x80 != 0;
        self.set_status_flag(StatusFlag::Overflow, overflow);

        self.accumulator = result;
        self.update_zero_and_negative_flags(result);
        0
    }
}
