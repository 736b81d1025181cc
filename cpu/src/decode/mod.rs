//! The instruction decoder.
//!
//! Decoding is the central combinational mapping of the core: given
//! the fetched instruction word and the current register/flag values,
//! produce the per-unit command structure which the sequencer
//! commits.  Decode is pure; computing it has no side effects, so it
//! is safe to re-evaluate every tick, including stalled ones.
//!
//! The mapping is a prioritized list of (bit-pattern, mask, builder)
//! rules evaluated top to bottom; the first match wins and an
//! unmatched word produces the no-op template (every unit idle,
//! PC+1).  Each rule also carries the operand-address derivation for
//! its register fields as data ([`RegisterSelector`]), so the
//! derivations are not duplicated per instruction.
//!
//! Several instruction bodies are explicitly unimplemented (sleep,
//! break, watchdog reset, the return forms, store-program-memory);
//! their rules produce the no-op template tagged with a
//! [`ControlRequest`] so the sequencer can report them.  The two-word
//! forms (JMP/CALL/LDS/STS) fall outside the one-word-per-tick fetch
//! contract and intentionally have no rule.
use tracing::{event, Level};

use base::prelude::*;

use crate::agu::RampRegisters;
use crate::regfile::{RegisterFile, RegisterWrite};
use crate::sreg::SregUpdate;

mod op_arith;
mod op_bit;
mod op_branch;
mod op_loadstore;
mod op_mul;
mod op_system;
mod op_transfer;

#[cfg(test)]
mod tests;

/// Everything the decoder may read: the fetched word plus the
/// current architectural state.  Reads only; decode never mutates.
pub struct DecodeContext<'a> {
    pub word: InstructionWord,
    pub regs: &'a RegisterFile,
    pub sreg: Sreg,
    pub ramp: RampRegisters,
    /// Word address of the instruction being decoded.
    pub pc: u32,
    pub sp: u16,
}

/// Program-counter request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PcUpdate {
    /// Advance to the next instruction.
    Advance,
    /// Jump to a word address (masked to the configured width at
    /// commit).
    Jump(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemWidth {
    Byte,
    /// Two byte transactions in the same tick, little-endian; used by
    /// the call-class pushes.
    Word,
}

/// A load/store request for the data bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemCommand {
    pub write: bool,
    pub width: MemWidth,
    /// Byte address before masking to the configured data width.
    pub address: u32,
    pub data: u16,
    /// Register receiving the loaded byte.
    pub dest: Option<RegisterAddress>,
}

/// A program-memory data read (the LPM class).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramRead {
    /// Byte address into program memory (bit 0 selects the byte
    /// within the fetched word).
    pub byte_address: u32,
    pub dest: RegisterAddress,
    pub pointer_update: Option<RegisterWrite>,
}

/// What to do with the byte read from the I/O port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoReadAction {
    Store(RegisterAddress),
    SkipIfBitClear(u8),
    SkipIfBitSet(u8),
}

/// An I/O-port access request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoCommand {
    Read {
        address: u8,
        action: IoReadAction,
    },
    /// Masked write; `mask` selects the bits the peripheral should
    /// change.
    Write {
        address: u8,
        value: u8,
        mask: u8,
    },
}

/// Control requests whose instruction bodies are unimplemented
/// upstream.  The sequencer treats them as no-ops and reports them;
/// their semantics are deliberately not guessed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlRequest {
    Sleep,
    Break,
    WatchdogReset,
    Return,
    ReturnFromInterrupt,
    StoreProgramMemory,
}

/// The decode result: one record of per-unit commands, produced and
/// consumed within a single tick, never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commands {
    /// Rule name, for tracing.
    pub name: &'static str,
    /// Main register-file write request.
    pub reg: Option<RegisterWrite>,
    /// Pointer write-back from the address generator.  Never targets
    /// the same register as `reg`.
    pub pointer: Option<RegisterWrite>,
    pub flags: SregUpdate,
    pub pc: PcUpdate,
    /// Nullify the next fetched instruction.
    pub skip_next: bool,
    /// Stack-pointer adjustment in bytes.
    pub sp_delta: i8,
    pub mem: Option<MemCommand>,
    pub pmem_read: Option<ProgramRead>,
    pub io: Option<IoCommand>,
    pub control: Option<ControlRequest>,
}

impl Commands {
    /// The no-op template: every unit idle, no writes, PC+1.
    pub fn nop() -> Commands {
        Commands {
            name: "nop",
            reg: None,
            pointer: None,
            flags: SregUpdate::NONE,
            pc: PcUpdate::Advance,
            skip_next: false,
            sp_delta: 0,
            mem: None,
            pmem_read: None,
            io: None,
            control: None,
        }
    }
}

/// One resolved register operand: its address plus both views of the
/// current value.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Operand {
    pub address: RegisterAddress,
    pub byte: u8,
    pub word: u16,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ResolvedOperands {
    pub dst: Operand,
    pub src: Operand,
}

fn resolve_operand(address: RegisterAddress, regs: &RegisterFile) -> Operand {
    Operand {
        address,
        byte: regs.read_byte(address),
        word: regs.read_word(address),
    }
}

type Builder = fn(&DecodeContext, &ResolvedOperands) -> Commands;

/// One decode rule: bit pattern, significance mask, the operand
/// address derivations, and the command-template builder.
pub(crate) struct DecodeRule {
    pub name: &'static str,
    pub pattern: u16,
    pub mask: u16,
    pub dst: RegisterSelector,
    pub src: RegisterSelector,
    pub build: Builder,
}

const fn rule(
    name: &'static str,
    pattern: u16,
    mask: u16,
    dst: RegisterSelector,
    src: RegisterSelector,
    build: Builder,
) -> DecodeRule {
    DecodeRule {
        name,
        pattern,
        mask,
        dst,
        src,
        build,
    }
}

use RegisterSelector::{Full, HighHalf, IndexPair, ThirdQuarter, WordPair};

/// The rule table.  Evaluated top to bottom, first match wins.
/// Exact-word rules come first, then the fixed-prefix groups in
/// ascending opcode-space order.
pub(crate) const RULES: &[DecodeRule] = &[
    // Exact words.
    rule("nop", 0x0000, 0xffff, Full, Full, op_system::nop),
    rule("ijmp", 0x9409, 0xffff, Full, Full, op_branch::ijmp),
    rule("icall", 0x9509, 0xffff, Full, Full, op_branch::icall),
    rule("ret", 0x9508, 0xffff, Full, Full, op_system::ret),
    rule("reti", 0x9518, 0xffff, Full, Full, op_system::reti),
    rule("sleep", 0x9588, 0xffff, Full, Full, op_system::sleep),
    rule("break", 0x9598, 0xffff, Full, Full, op_system::brk),
    rule("wdr", 0x95a8, 0xffff, Full, Full, op_system::wdr),
    rule("lpm", 0x95c8, 0xffff, Full, Full, op_loadstore::lpm_r0),
    rule("spm", 0x95e8, 0xffff, Full, Full, op_system::spm),
    // Word move and the multiply family.
    rule("movw", 0x0100, 0xff00, WordPair, WordPair, op_transfer::movw),
    rule("muls", 0x0200, 0xff00, HighHalf, HighHalf, op_mul::muls),
    rule("mulsu", 0x0300, 0xff88, ThirdQuarter, ThirdQuarter, op_mul::mulsu),
    rule("fmul", 0x0308, 0xff88, ThirdQuarter, ThirdQuarter, op_mul::fmul),
    rule("fmuls", 0x0380, 0xff88, ThirdQuarter, ThirdQuarter, op_mul::fmuls),
    rule("fmulsu", 0x0388, 0xff88, ThirdQuarter, ThirdQuarter, op_mul::fmulsu),
    // Two-register ALU class.
    rule("cpc", 0x0400, 0xfc00, Full, Full, op_arith::cpc),
    rule("sbc", 0x0800, 0xfc00, Full, Full, op_arith::sbc),
    rule("add", 0x0c00, 0xfc00, Full, Full, op_arith::add),
    rule("cpse", 0x1000, 0xfc00, Full, Full, op_branch::cpse),
    rule("cp", 0x1400, 0xfc00, Full, Full, op_arith::cp),
    rule("sub", 0x1800, 0xfc00, Full, Full, op_arith::sub),
    rule("adc", 0x1c00, 0xfc00, Full, Full, op_arith::adc),
    rule("and", 0x2000, 0xfc00, Full, Full, op_arith::and),
    rule("eor", 0x2400, 0xfc00, Full, Full, op_arith::eor),
    rule("or", 0x2800, 0xfc00, Full, Full, op_arith::or),
    rule("mov", 0x2c00, 0xfc00, Full, Full, op_transfer::mov),
    // Immediate ALU class (high-half destinations).
    rule("cpi", 0x3000, 0xf000, HighHalf, HighHalf, op_arith::cpi),
    rule("sbci", 0x4000, 0xf000, HighHalf, HighHalf, op_arith::sbci),
    rule("subi", 0x5000, 0xf000, HighHalf, HighHalf, op_arith::subi),
    rule("ori", 0x6000, 0xf000, HighHalf, HighHalf, op_arith::ori),
    rule("andi", 0x7000, 0xf000, HighHalf, HighHalf, op_arith::andi),
    // Displaced loads and stores (q=0 gives the bare Y/Z forms).
    rule("ldd z+q", 0x8000, 0xd208, Full, Full, op_loadstore::ldd_z),
    rule("ldd y+q", 0x8008, 0xd208, Full, Full, op_loadstore::ldd_y),
    rule("std z+q", 0x8200, 0xd208, Full, Full, op_loadstore::std_z),
    rule("std y+q", 0x8208, 0xd208, Full, Full, op_loadstore::std_y),
    // Indirect loads and stores.  LDS/STS (0x9000/0x9200) are
    // two-word forms and deliberately have no rule here.
    rule("ld z+", 0x9001, 0xfe0f, Full, Full, op_loadstore::ld_z_inc),
    rule("ld -z", 0x9002, 0xfe0f, Full, Full, op_loadstore::ld_z_dec),
    rule("lpm z", 0x9004, 0xfe0f, Full, Full, op_loadstore::lpm),
    rule("lpm z+", 0x9005, 0xfe0f, Full, Full, op_loadstore::lpm_inc),
    rule("ld y+", 0x9009, 0xfe0f, Full, Full, op_loadstore::ld_y_inc),
    rule("ld -y", 0x900a, 0xfe0f, Full, Full, op_loadstore::ld_y_dec),
    rule("ld x", 0x900c, 0xfe0f, Full, Full, op_loadstore::ld_x),
    rule("ld x+", 0x900d, 0xfe0f, Full, Full, op_loadstore::ld_x_inc),
    rule("ld -x", 0x900e, 0xfe0f, Full, Full, op_loadstore::ld_x_dec),
    rule("pop", 0x900f, 0xfe0f, Full, Full, op_transfer::pop),
    rule("st z+", 0x9201, 0xfe0f, Full, Full, op_loadstore::st_z_inc),
    rule("st -z", 0x9202, 0xfe0f, Full, Full, op_loadstore::st_z_dec),
    rule("st y+", 0x9209, 0xfe0f, Full, Full, op_loadstore::st_y_inc),
    rule("st -y", 0x920a, 0xfe0f, Full, Full, op_loadstore::st_y_dec),
    rule("st x", 0x920c, 0xfe0f, Full, Full, op_loadstore::st_x),
    rule("st x+", 0x920d, 0xfe0f, Full, Full, op_loadstore::st_x_inc),
    rule("st -x", 0x920e, 0xfe0f, Full, Full, op_loadstore::st_x_dec),
    rule("push", 0x920f, 0xfe0f, Full, Full, op_transfer::push),
    // One-register ALU class.
    rule("com", 0x9400, 0xfe0f, Full, Full, op_arith::com),
    rule("neg", 0x9401, 0xfe0f, Full, Full, op_arith::neg),
    rule("swap", 0x9402, 0xfe0f, Full, Full, op_arith::swap),
    rule("inc", 0x9403, 0xfe0f, Full, Full, op_arith::inc),
    rule("asr", 0x9405, 0xfe0f, Full, Full, op_arith::asr),
    rule("lsr", 0x9406, 0xfe0f, Full, Full, op_arith::lsr),
    rule("ror", 0x9407, 0xfe0f, Full, Full, op_arith::ror),
    rule("dec", 0x940a, 0xfe0f, Full, Full, op_arith::dec),
    // Flag set/clear.
    rule("bset", 0x9408, 0xff8f, Full, Full, op_bit::bset),
    rule("bclr", 0x9488, 0xff8f, Full, Full, op_bit::bclr),
    // Word immediate add/subtract on the index pairs.
    rule("adiw", 0x9600, 0xff00, IndexPair, IndexPair, op_arith::adiw),
    rule("sbiw", 0x9700, 0xff00, IndexPair, IndexPair, op_arith::sbiw),
    // I/O bit manipulation and I/O skips.
    rule("cbi", 0x9800, 0xff00, Full, Full, op_bit::cbi),
    rule("sbic", 0x9900, 0xff00, Full, Full, op_bit::sbic),
    rule("sbi", 0x9a00, 0xff00, Full, Full, op_bit::sbi),
    rule("sbis", 0x9b00, 0xff00, Full, Full, op_bit::sbis),
    rule("mul", 0x9c00, 0xfc00, Full, Full, op_mul::mul),
    // I/O port transfer.
    rule("in", 0xb000, 0xf800, Full, Full, op_transfer::in_port),
    rule("out", 0xb800, 0xf800, Full, Full, op_transfer::out_port),
    // Relative jump and call.
    rule("rjmp", 0xc000, 0xf000, Full, Full, op_branch::rjmp),
    rule("rcall", 0xd000, 0xf000, Full, Full, op_branch::rcall),
    rule("ldi", 0xe000, 0xf000, HighHalf, HighHalf, op_transfer::ldi),
    // Conditional branches on a status flag.
    rule("brbs", 0xf000, 0xfc00, Full, Full, op_branch::brbs),
    rule("brbc", 0xf400, 0xfc00, Full, Full, op_branch::brbc),
    // Transfer-bit moves and register-bit skips.
    rule("bld", 0xf800, 0xfe08, Full, Full, op_bit::bld),
    rule("bst", 0xfa00, 0xfe08, Full, Full, op_bit::bst),
    rule("sbrc", 0xfc00, 0xfe08, Full, Full, op_bit::sbrc),
    rule("sbrs", 0xfe00, 0xfe08, Full, Full, op_bit::sbrs),
];

/// Decodes one instruction word against the rule table.
pub fn decode(ctx: &DecodeContext) -> Commands {
    let bits = ctx.word.bits();
    for rule in RULES {
        if bits & rule.mask == rule.pattern {
            let operands = ResolvedOperands {
                dst: resolve_operand(rule.dst.destination(ctx.word), ctx.regs),
                src: resolve_operand(rule.src.source(ctx.word), ctx.regs),
            };
            let commands = (rule.build)(ctx, &operands);
            event!(Level::TRACE, word = ?ctx.word, rule = rule.name, "decoded");
            return commands;
        }
    }
    event!(Level::TRACE, word = ?ctx.word, "no rule matches; decoding as no-op");
    Commands::nop()
}
