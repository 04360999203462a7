use phf::phf_map;

use crate::bus::Bus;

// More info about the 6502 registers can be found here:
// https://www.nesdev.org/obelisk-6502-guide/registers.html
#[derive(Debug)]
pub struct Cpu {
    // The program counter is a 16 bit register that holds the memory address of
    // the next byte to fetch. It is advanced automatically as instructions are
    // fetched and can be rewritten by branches and BRK.
    pub program_counter: u16,

    // The stack pointer is an 8 bit register holding the low byte of the next
    // free stack location. The stack itself is fixed to page 1, memory
    // [0x0100 .. 0x01FF]; the pointer wraps modulo 256 with no overflow check.
    pub stack_pointer: u8,

    // The accumulator is an 8 bit register used for arithmetic and logical operations.
    pub accumulator: u8,

    // The X and Y index registers, mostly used as offsets by the indexed
    // addressing modes.
    pub x_register: u8,
    pub y_register: u8,

    // As instructions execute, a set of processor flags is set or cleared to
    // record the results. Each bit in the status register is one flag:
    // Bit 7: Negative (N)
    // Bit 6: Overflow (V)
    // Bit 5: Unused (U) (always reads as 1)
    // Bit 4: Break Command (B)
    // Bit 3: Decimal Mode (D) (storable, no arithmetic effect here)
    // Bit 2: Interrupt Disable (I)
    // Bit 1: Zero (Z)
    // Bit 0: Carry (C)
    pub status_register: u8,

    // Total cycles consumed across all execute calls since the last reset.
    pub cycles: u64,
}

// Each flag corresponds to a bit in the status register.
// Values are the bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    Carry = 0,
    Zero = 1,
    InterruptDisable = 2,
    DecimalMode = 3,
    BreakCommand = 4,
    Unused = 5,
    Overflow = 6,
    Negative = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Absolute,    // e.g. LDA $1234
    AbsoluteX,   // e.g. LDA $1234,X
    AbsoluteY,   // e.g. LDA $1234,Y
    Accumulator, // e.g. ASL A
    Immediate,   // e.g. LDA #$10
    Implicit,    // e.g. BRK (no operand)
    IndirectX,   // e.g. LDA ($10,X)
    IndirectY,   // e.g. LDA ($10),Y
    Relative,    // e.g. BEQ +5
    ZeroPage,    // e.g. LDA $10
    ZeroPageX,   // e.g. LDA $10,X
}

// Handlers receive the operand the addressing mode resolved for them: the
// value read at the effective address (when there is one to read), and the
// effective address itself (when the mode produces one). The return value is
// the number of cycles the instruction costs on top of its base count.
type Handler = fn(&mut Cpu, &mut Bus, Option<u8>, Option<u16>) -> u8;

pub(crate) struct Opcode {
    pub mnemonic: &'static str,
    pub mode: AddressingMode,
    // Total instruction length in bytes, opcode included. Only the trace
    // formatter consumes this; the dispatch loop advances the program counter
    // as it fetches.
    pub bytes: u8,
    pub cycles: u8,
    // Loads and other read instructions pay one extra cycle when an indexed
    // effective address lands on a different page than its base. Stores never
    // do; their base count already covers the worst case.
    pub page_penalty: bool,
    pub handler: Handler,
}

pub const STACK_BASE_ADDRESS: u16 = 0x0100;
pub const IRQ_VECTOR_ADDRESS: u16 = 0xFFFE;

// A real 6502 loads the program counter from the vector at 0xFFFC/D on reset.
// This core boots at a fixed address instead, so a caller can write a program
// into memory and run it without first wiring up a vector. Assign
// `program_counter` after reset to start somewhere else.
pub const BOOT_ADDRESS: u16 = 0x0100;
pub const STACK_POINTER_AFTER_RESET: u8 = 0xFD;
pub const STATUS_AFTER_RESET: u8 = 0b0010_0100; // I and U set

// List of all recognized opcodes and their decode entries. Every byte the
// table does not contain executes as a one-cycle no-op.
pub(crate) static OPCODE_MAP: phf::Map<u8, Opcode> = phf_map! {
    // LDA
    0xA9u8 => Opcode { mnemonic: "LDA", mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_penalty: false, handler: Cpu::handle_lda },
    0xA5u8 => Opcode { mnemonic: "LDA", mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_penalty: false, handler: Cpu::handle_lda },
    0xB5u8 => Opcode { mnemonic: "LDA", mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_penalty: false, handler: Cpu::handle_lda },
    0xADu8 => Opcode { mnemonic: "LDA", mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_penalty: false, handler: Cpu::handle_lda },
    0xBDu8 => Opcode { mnemonic: "LDA", mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_penalty: true, handler: Cpu::handle_lda },
    0xB9u8 => Opcode { mnemonic: "LDA", mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_penalty: true, handler: Cpu::handle_lda },
    0xA1u8 => Opcode { mnemonic: "LDA", mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_penalty: false, handler: Cpu::handle_lda },
    0xB1u8 => Opcode { mnemonic: "LDA", mode: AddressingMode::IndirectY, bytes: 2, cycles: 5, page_penalty: true, handler: Cpu::handle_lda },

    // STA
    0x85u8 => Opcode { mnemonic: "STA", mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_penalty: false, handler: Cpu::handle_sta },
    0x95u8 => Opcode { mnemonic: "STA", mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_penalty: false, handler: Cpu::handle_sta },
    0x8Du8 => Opcode { mnemonic: "STA", mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_penalty: false, handler: Cpu::handle_sta },
    0x9Du8 => Opcode { mnemonic: "STA", mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 5, page_penalty: false, handler: Cpu::handle_sta },
    0x99u8 => Opcode { mnemonic: "STA", mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 5, page_penalty: false, handler: Cpu::handle_sta },
    0x81u8 => Opcode { mnemonic: "STA", mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_penalty: false, handler: Cpu::handle_sta },
    0x91u8 => Opcode { mnemonic: "STA", mode: AddressingMode::IndirectY, bytes: 2, cycles: 6, page_penalty: false, handler: Cpu::handle_sta },

    // ADC (immediate only; the remaining modes are not recognized yet)
    0x69u8 => Opcode { mnemonic: "ADC", mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_penalty: false, handler: Cpu::handle_adc },

    // AND
    0x29u8 => Opcode { mnemonic: "AND", mode: AddressingMode::Immediate, bytes: 2, cycles: 2, page_penalty: false, handler: Cpu::handle_and },
    0x25u8 => Opcode { mnemonic: "AND", mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_penalty: false, handler: Cpu::handle_and },
    0x35u8 => Opcode { mnemonic: "AND", mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 4, page_penalty: false, handler: Cpu::handle_and },
    0x2Du8 => Opcode { mnemonic: "AND", mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_penalty: false, handler: Cpu::handle_and },
    0x3Du8 => Opcode { mnemonic: "AND", mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 4, page_penalty: true, handler: Cpu::handle_and },
    0x39u8 => Opcode { mnemonic: "AND", mode: AddressingMode::AbsoluteY, bytes: 3, cycles: 4, page_penalty: true, handler: Cpu::handle_and },
    0x21u8 => Opcode { mnemonic: "AND", mode: AddressingMode::IndirectX, bytes: 2, cycles: 6, page_penalty: false, handler: Cpu::handle_and },
    0x31u8 => Opcode { mnemonic: "AND", mode: AddressingMode::IndirectY, bytes: 2, cycles: 5, page_penalty: true, handler: Cpu::handle_and },

    // ASL
    0x0Au8 => Opcode { mnemonic: "ASL", mode: AddressingMode::Accumulator, bytes: 1, cycles: 2, page_penalty: false, handler: Cpu::handle_asl },
    0x06u8 => Opcode { mnemonic: "ASL", mode: AddressingMode::ZeroPage, bytes: 2, cycles: 5, page_penalty: false, handler: Cpu::handle_asl },
    0x16u8 => Opcode { mnemonic: "ASL", mode: AddressingMode::ZeroPageX, bytes: 2, cycles: 6, page_penalty: false, handler: Cpu::handle_asl },
    0x0Eu8 => Opcode { mnemonic: "ASL", mode: AddressingMode::Absolute, bytes: 3, cycles: 6, page_penalty: false, handler: Cpu::handle_asl },
    0x1Eu8 => Opcode { mnemonic: "ASL", mode: AddressingMode::AbsoluteX, bytes: 3, cycles: 7, page_penalty: false, handler: Cpu::handle_asl },

    // BIT
    0x24u8 => Opcode { mnemonic: "BIT", mode: AddressingMode::ZeroPage, bytes: 2, cycles: 3, page_penalty: false, handler: Cpu::handle_bit },
    0x2Cu8 => Opcode { mnemonic: "BIT", mode: AddressingMode::Absolute, bytes: 3, cycles: 4, page_penalty: false, handler: Cpu::handle_bit },

    // Branches: 2 cycles base, +1 when taken, +1 more when the taken target
    // crosses a page. The handler reports the extra cycles.
    0x90u8 => Opcode { mnemonic: "BCC", mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_penalty: false, handler: Cpu::handle_bcc },
    0xB0u8 => Opcode { mnemonic: "BCS", mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_penalty: false, handler: Cpu::handle_bcs },
    0xD0u8 => Opcode { mnemonic: "BNE", mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_penalty: false, handler: Cpu::handle_bne },
    0xF0u8 => Opcode { mnemonic: "BEQ", mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_penalty: false, handler: Cpu::handle_beq },
    0x10u8 => Opcode { mnemonic: "BPL", mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_penalty: false, handler: Cpu::handle_bpl },
    0x30u8 => Opcode { mnemonic: "BMI", mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_penalty: false, handler: Cpu::handle_bmi },
    0x50u8 => Opcode { mnemonic: "BVC", mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_penalty: false, handler: Cpu::handle_bvc },
    0x70u8 => Opcode { mnemonic: "BVS", mode: AddressingMode::Relative, bytes: 2, cycles: 2, page_penalty: false, handler: Cpu::handle_bvs },

    // BRK
    0x00u8 => Opcode { mnemonic: "BRK", mode: AddressingMode::Implicit, bytes: 1, cycles: 7, page_penalty: false, handler: Cpu::handle_brk },
};

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            program_counter: BOOT_ADDRESS,
            stack_pointer: STACK_POINTER_AFTER_RESET,
            accumulator: 0x00,
            x_register: 0x00,
            y_register: 0x00,
            status_register: STATUS_AFTER_RESET,
            cycles: 0,
        }
    }

    // Returns the CPU to its documented post-reset state and zero-fills the
    // memory behind the bus. Idempotent.
    pub fn reset(&mut self, bus: &mut Bus) {
        self.program_counter = BOOT_ADDRESS;
        self.stack_pointer = STACK_POINTER_AFTER_RESET;
        self.accumulator = 0x00;
        self.x_register = 0x00;
        self.y_register = 0x00;
        self.status_register = STATUS_AFTER_RESET;
        self.cycles = 0;
        bus.reset();
    }

    // Runs instructions until the cycle budget is exhausted. An instruction
    // always completes once started, even when its cost overshoots what is
    // left of the budget; the overshoot is simply swallowed. Bytes that do not
    // decode to a recognized instruction consume one cycle and do nothing
    // else.
    pub fn execute(&mut self, bus: &mut Bus, budget: u32) {
        let mut remaining = budget;
        while remaining > 0 {
            let opcode = self.fetch_u8(bus);
            let cost = match OPCODE_MAP.get(&opcode) {
                Some(op) => {
                    let (value, address, page_crossed) = self.resolve_operand(bus, op.mode);
                    let extra = (op.handler)(self, bus, value, address);
                    let mut cost = u32::from(op.cycles) + u32::from(extra);
                    if op.page_penalty && page_crossed {
                        cost += 1;
                    }
                    cost
                }
                None => 1,
            };
            self.cycles += u64::from(cost);
            // Bit 5 of the status register has no storage cell on the 6502 and
            // reads back as 1 regardless of what was written.
            self.status_register |= 1 << (StatusFlag::Unused as u8);
            remaining = remaining.saturating_sub(cost);
        }
    }

    // Reads the byte at the program counter and advances past it.
    pub(crate) fn fetch_u8(&mut self, bus: &mut Bus) -> u8 {
        let value = bus.read(self.program_counter);
        self.program_counter = self.program_counter.wrapping_add(1);
        value
    }

    // Fetches two bytes and assembles them little-endian.
    pub(crate) fn fetch_u16(&mut self, bus: &mut Bus) -> u16 {
        let low = self.fetch_u8(bus);
        let high = self.fetch_u8(bus);
        u16::from_le_bytes([low, high])
    }

    // Resolves one operand according to the addressing mode, fetching operand
    // bytes from the program stream as needed. Returns the value at the
    // effective address (when the mode yields one), the effective address
    // itself, and whether indexed address arithmetic crossed a page.
    //
    // Two hardware quirks live here and must not be "fixed": indexed zero-page
    // addresses wrap inside page 0 and never spill into page 1, and the
    // high pointer byte of both indirect modes is fetched with the same
    // page-0 wrap.
    fn resolve_operand(
        &mut self,
        bus: &mut Bus,
        mode: AddressingMode,
    ) -> (Option<u8>, Option<u16>, bool) {
        match mode {
            AddressingMode::Implicit => (None, None, false),

            AddressingMode::Accumulator => (Some(self.accumulator), None, false),

            AddressingMode::Immediate => {
                let addr = self.program_counter;
                let value = self.fetch_u8(bus);
                (Some(value), Some(addr), false)
            }

            AddressingMode::ZeroPage => {
                let addr = u16::from(self.fetch_u8(bus));
                (Some(bus.read(addr)), Some(addr), false)
            }

            AddressingMode::ZeroPageX => {
                let addr = u16::from(self.fetch_u8(bus).wrapping_add(self.x_register));
                (Some(bus.read(addr)), Some(addr), false)
            }

            AddressingMode::Absolute => {
                let addr = self.fetch_u16(bus);
                (Some(bus.read(addr)), Some(addr), false)
            }

            AddressingMode::AbsoluteX => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(u16::from(self.x_register));
                let crossed = (base ^ addr) & 0xFF00 != 0;
                (Some(bus.read(addr)), Some(addr), crossed)
            }

            AddressingMode::AbsoluteY => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(u16::from(self.y_register));
                let crossed = (base ^ addr) & 0xFF00 != 0;
                (Some(bus.read(addr)), Some(addr), crossed)
            }

            AddressingMode::IndirectX => {
                let pointer = self.fetch_u8(bus).wrapping_add(self.x_register);
                let low = bus.read(u16::from(pointer));
                let high = bus.read(u16::from(pointer.wrapping_add(1)));
                let addr = u16::from_le_bytes([low, high]);
                (Some(bus.read(addr)), Some(addr), false)
            }

            AddressingMode::IndirectY => {
                let pointer = self.fetch_u8(bus);
                let low = bus.read(u16::from(pointer));
                let high = bus.read(u16::from(pointer.wrapping_add(1)));
                let base = u16::from_le_bytes([low, high]);
                let addr = base.wrapping_add(u16::from(self.y_register));
                let crossed = (base ^ addr) & 0xFF00 != 0;
                (Some(bus.read(addr)), Some(addr), crossed)
            }

            AddressingMode::Relative => {
                // The operand is a signed offset relative to the address of
                // the next instruction, which the program counter already
                // points at once the offset byte is fetched.
                let offset = self.fetch_u8(bus) as i8;
                let target = self.program_counter.wrapping_add(offset as u16);
                (None, Some(target), false)
            }
        }
    }

    pub fn get_status_flag(&self, flag: StatusFlag) -> bool {
        (self.status_register & (1 << (flag as u8))) != 0
    }

    pub fn set_status_flag(&mut self, flag: StatusFlag, value: bool) {
        if value {
            self.status_register |= 1 << (flag as u8);
        } else {
            self.status_register &= !(1 << (flag as u8));
        }
        self.status_register |= 1 << (StatusFlag::Unused as u8);
    }

    pub fn toggle_status_flag(&mut self, flag: StatusFlag) {
        self.status_register ^= 1 << (flag as u8);
        self.status_register |= 1 << (StatusFlag::Unused as u8);
    }

    // These two flags are almost always set together, from the value an
    // instruction just produced.
    pub(crate) fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.set_status_flag(StatusFlag::Zero, value == 0);
        self.set_status_flag(StatusFlag::Negative, (value & 0x80) != 0);
    }

    /// Pushes a byte onto the stack in page 1, then lets the pointer grow down.
    pub fn push_u8(&mut self, bus: &mut Bus, value: u8) {
        let stack_addr = STACK_BASE_ADDRESS | u16::from(self.stack_pointer);
        bus.write(stack_addr, value);
        self.stack_pointer = self.stack_pointer.wrapping_sub(1);
    }

    /// Pushes a 16-bit word, high byte first, so that the two bytes sit
    /// little-endian in memory and two pops recover low then high.
    pub fn push_u16(&mut self, bus: &mut Bus, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.push_u8(bus, high);
        self.push_u8(bus, low);
    }

    pub fn pop_u8(&mut self, bus: &mut Bus) -> u8 {
        self.stack_pointer = self.stack_pointer.wrapping_add(1);
        bus.read(STACK_BASE_ADDRESS | u16::from(self.stack_pointer))
    }

    pub fn pop_u16(&mut self, bus: &mut Bus) -> u16 {
        let low = self.pop_u8(bus);
        let high = self.pop_u8(bus);
        u16::from_le_bytes([low, high])
    }

    // Branch helper shared by the eight conditional branches. `target` is the
    // already-resolved destination; the program counter still points at the
    // instruction after the branch, which is the address the page-cross
    // penalty is measured against.
    // Returns the additional cycles: 0 if not taken, 1 if taken, 2 if the
    // taken target sits on a different page.
    pub(crate) fn branch(&mut self, condition: bool, target: u16) -> u8 {
        if !condition {
            return 0;
        }
        let mut additional_cycles = 1;
        if (self.program_counter ^ target) & 0xFF00 != 0 {
            additional_cycles += 1;
        }
        self.program_counter = target;
        additional_cycles
    }
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu::new()
    }
}

// One-line state dump for the instruction the program counter points at,
// in the usual emulator log shape:
//   0200  A9 20     LDA  A:10 X:00 Y:00 P:24 SP:FD CYC:0
pub fn trace(cpu: &Cpu, bus: &Bus) -> String {
    let opcode = bus.read(cpu.program_counter);
    let (mnemonic, length) = match OPCODE_MAP.get(&opcode) {
        Some(op) => (op.mnemonic, op.bytes),
        None => ("???", 1),
    };
    let raw: Vec<String> = (0..length)
        .map(|i| format!("{:02X}", bus.read(cpu.program_counter.wrapping_add(u16::from(i)))))
        .collect();
    format!(
        "{:04X}  {:<8}  {}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        cpu.program_counter,
        raw.join(" "),
        mnemonic,
        cpu.accumulator,
        cpu.x_register,
        cpu.y_register,
        cpu.status_register,
        cpu.stack_pointer,
        cpu.cycles,
    )
}
