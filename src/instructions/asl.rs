use crate::bus::Bus;
use crate::cpu6502::{Cpu, StatusFlag};

impl Cpu {
    pub(crate) fn handle_asl(
        &mut self,
        bus: &mut Bus,
        opt_value: Option<u8>,
        opt_address: Option<u16>,
    ) -> u8 {
        let value = opt_value.expect("BUG: memory value of ASL should be present");
        let result = value << 1;

        // The bit shifted out of position 7 lands in the carry.
        self.set_status_flag(StatusFlag::Carry, (value & 0x80) != 0);
        self.update_zero_and_negative_flags(result);

        // Accumulator mode resolves without an address; everything else
        // writes the shifted value back where it came from.
        match opt_address {
            Some(address) => bus.write(address, result),
            None => self.accumulator = result,
        }
        0
    }
}
