use crate::bus::Bus;
use crate::cpu6502::Cpu;

impl Cpu {
    pub(crate) fn handle_and(
        &mut self,
        _bus: &mut Bus,
        opt_value: Option<u8>,
        _opt_address: Option<u16>,
    ) -> u8 {
        let value = opt_value.expect("BUG: memory value of AND should be present");

        self.accumulator &= value;
        self.update_zero_and_negative_flags(self.accumulator);
        0
    }
}
