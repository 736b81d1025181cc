//! The sequencer: owns the architectural state and advances it by
//! one committed instruction per tick.
//!
//! Each call to [`Core::tick`] runs the fixed phase order: fetch,
//! interrupt-entry decision, decode, data-bus transactions, I/O
//! transaction, commit.  Commit is all or nothing.  If the data bus
//! withholds acknowledgement the tick is a stall: no register, flag,
//! pointer or counter changes at all, and the next tick re-derives
//! the identical requests from the unchanged state.
//!
//! A pending skip is applied by overriding the decode result with
//! the no-op template; the fetch itself still happens, so skipping
//! costs the one tick the nullified word occupies.
//!
//! Interrupt entry pre-empts the fetched instruction: the core
//! pushes the current program counter (the address of the pre-empted
//! instruction, so it is re-fetched on return), clears the global
//! enable flag, and jumps to the vector whose word address equals
//! the request line index.
use serde::Serialize;
use tracing::{event, Level};

use base::prelude::*;

use crate::agu::RampRegisters;
use crate::bus::{CoreBus, DataBus, DataBusRequest};
use crate::config::{ConfigurationError, CoreConfiguration};
use crate::decode::{
    decode, Commands, DecodeContext, IoCommand, IoReadAction, MemCommand, MemWidth, PcUpdate,
};
use crate::ioreg;
use crate::irq::InterruptController;
use crate::regfile::{RegisterFile, RegisterWrite};
use crate::sreg::SregUpdate;

/// The execution core.
pub struct Core {
    config: CoreConfiguration,
    regs: RegisterFile,
    sreg: Sreg,
    pc: u32,
    sp: u16,
    ramp: RampRegisters,
    skip_next: bool,
    stalled: bool,
    irq: InterruptController,
}

/// A copy of the architectural state, for dumps and assertions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CoreState {
    pub registers: [u8; 32],
    pub sreg: Sreg,
    pub pc: u32,
    pub sp: u16,
    pub ramp: RampRegisters,
    pub stalled: bool,
}

impl Core {
    pub fn new(config: CoreConfiguration) -> Result<Core, ConfigurationError> {
        config.validate()?;
        Ok(Core {
            config,
            regs: RegisterFile::new(),
            sreg: Sreg::ZERO,
            pc: 0,
            sp: 0,
            ramp: RampRegisters::default(),
            skip_next: false,
            stalled: false,
            irq: InterruptController::new(config.irq_mask()),
        })
    }

    /// Synchronous reset: control state is cleared, the register
    /// file and stack pointer keep whatever they held.
    pub fn reset(&mut self) {
        self.pc = 0;
        self.sreg = Sreg::ZERO;
        self.skip_next = false;
        self.stalled = false;
        self.ramp = RampRegisters::default();
        self.irq.reset();
        event!(Level::DEBUG, "core reset");
    }

    pub fn config(&self) -> &CoreConfiguration {
        &self.config
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn sp(&self) -> u16 {
        self.sp
    }

    pub fn sreg(&self) -> Sreg {
        self.sreg
    }

    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// True while the previous tick ended in a data-bus stall.
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// The one-hot interrupt acknowledge vector latched on the most
    /// recent tick.
    pub fn acknowledge(&self) -> u32 {
        self.irq.acknowledge()
    }

    pub fn set_stack_pointer(&mut self, sp: u16) {
        self.sp = sp;
    }

    /// External program-counter override for debug use.  Discards
    /// any pending skip, since the skip was aimed at the word after
    /// the old counter.
    pub fn jam_program_counter(&mut self, target: u32) {
        self.pc = target & self.config.pc_mask();
        self.skip_next = false;
        event!(Level::DEBUG, pc = self.pc, "program counter jammed");
    }

    pub fn state(&self) -> CoreState {
        CoreState {
            registers: self.regs.snapshot(),
            sreg: self.sreg,
            pc: self.pc,
            sp: self.sp,
            ramp: self.ramp,
            stalled: self.stalled,
        }
    }

    /// Advances the core by one tick.
    pub fn tick(&mut self, bus: &mut CoreBus) {
        let pending = bus.irq_pending & self.config.irq_mask();
        let word = InstructionWord::from(bus.pmem.fetch(self.pc & self.config.pc_mask()));

        // An interrupt may not pre-empt the shadow of a skip; the
        // nullified word must be consumed first.
        let take = if self.skip_next {
            None
        } else {
            self.irq.takeable(pending, self.sreg.get(Flag::I))
        };
        let commands = if let Some(line) = take {
            self.interrupt_entry(line)
        } else if self.skip_next {
            Commands::nop()
        } else {
            decode(&DecodeContext {
                word,
                regs: &self.regs,
                sreg: self.sreg,
                ramp: self.ramp,
                pc: self.pc,
                sp: self.sp,
            })
        };

        // Data-bus phase.  Withheld acknowledgement stalls the whole
        // tick before anything commits.
        let mut loaded = None;
        if let Some(mem) = &commands.mem {
            match self.data_phase(mem, bus.dmem) {
                Some(byte) => loaded = Some(byte),
                None => {
                    self.stalled = true;
                    event!(Level::DEBUG, address = mem.address, "data bus stall");
                    return;
                }
            }
        }
        self.stalled = false;

        if let Some(request) = &commands.control {
            event!(Level::DEBUG, ?request, "instruction class not implemented; treated as no-op");
        }

        // Program-memory data read (the LPM class).
        let mut program_byte = None;
        if let Some(read) = &commands.pmem_read {
            let fetched = bus.pmem.fetch((read.byte_address >> 1) & self.config.pc_mask());
            program_byte = Some(fetched.to_le_bytes()[(read.byte_address & 1) as usize]);
        }

        // I/O phase.  Accesses to the core-owned addresses are
        // satisfied here and never reach the peripheral bus.
        let mut io_store = None;
        let mut skip_next = commands.skip_next;
        let mut sreg_overwrite = None;
        if let Some(io) = &commands.io {
            match io {
                IoCommand::Read { address, action } => {
                    let byte = self.io_read(*address, bus);
                    match action {
                        IoReadAction::Store(dest) => {
                            io_store = Some(RegisterWrite::byte(*dest, byte));
                        }
                        IoReadAction::SkipIfBitClear(bit) => {
                            skip_next = byte & (1 << bit) == 0;
                        }
                        IoReadAction::SkipIfBitSet(bit) => {
                            skip_next = byte & (1 << bit) != 0;
                        }
                    }
                }
                IoCommand::Write { address, value, mask } => {
                    sreg_overwrite = self.io_write(*address, *value, *mask, bus);
                }
            }
        }

        // Commit phase.  The pointer write-back lands after the main
        // register write, so an instruction which targets its own
        // pointer register keeps the pointer arithmetic.
        if let Some(write) = &commands.reg {
            self.regs.apply(write);
        }
        if let Some(write) = &commands.pointer {
            self.regs.apply(write);
        }
        if let Some(mem) = &commands.mem {
            if let (Some(dest), Some(byte)) = (mem.dest, loaded) {
                self.regs.apply(&RegisterWrite::byte(dest, byte));
            }
        }
        if let (Some(read), Some(byte)) = (&commands.pmem_read, program_byte) {
            self.regs.apply(&RegisterWrite::byte(read.dest, byte));
            if let Some(update) = &read.pointer_update {
                self.regs.apply(update);
            }
        }
        if let Some(write) = &io_store {
            self.regs.apply(write);
        }

        // The delayed enable copy samples the flag as it stood during
        // the tick, before this instruction's own flag commit; that
        // is what guarantees one completed instruction after the
        // enable is set.
        let enable_during_tick = self.sreg.get(Flag::I);

        self.sreg = commands.flags.apply(self.sreg);
        // A direct I/O write to the flag register bypasses the merge.
        if let Some(value) = sreg_overwrite {
            self.sreg = value;
        }

        self.sp = self.sp.wrapping_add(i16::from(commands.sp_delta) as u16);
        self.pc = match commands.pc {
            PcUpdate::Advance => self.pc.wrapping_add(1),
            PcUpdate::Jump(target) => target,
        } & self.config.pc_mask();
        self.skip_next = skip_next;
        self.irq.commit(pending, enable_during_tick, take.is_some());
    }

    fn interrupt_entry(&self, line: u8) -> Commands {
        event!(Level::DEBUG, line, "taking interrupt");
        Commands {
            name: "irq",
            pc: PcUpdate::Jump(line.into()),
            mem: Some(MemCommand {
                write: true,
                width: MemWidth::Word,
                address: u32::from(self.sp.wrapping_sub(2)),
                data: self.pc as u16,
                dest: None,
            }),
            sp_delta: -2,
            flags: SregUpdate::single(Flag::I, false),
            ..Commands::nop()
        }
    }

    /// Issues the data-bus transaction(s) for this tick.  A word
    /// write is two byte transactions, low byte first; if either is
    /// withheld the whole pair is reissued next tick, so the device
    /// must acknowledge all-or-nothing within a tick.
    fn data_phase(&self, mem: &MemCommand, dmem: &mut dyn DataBus) -> Option<u8> {
        let mask = self.config.data_mask();
        match mem.width {
            MemWidth::Byte => {
                let request = if mem.write {
                    DataBusRequest::write(mem.address & mask, mem.data as u8)
                } else {
                    DataBusRequest::read(mem.address & mask)
                };
                dmem.access(&request)
            }
            MemWidth::Word => {
                let bytes = mem.data.to_le_bytes();
                dmem.access(&DataBusRequest::write(mem.address & mask, bytes[0]))?;
                dmem.access(&DataBusRequest::write(
                    mem.address.wrapping_add(1) & mask,
                    bytes[1],
                ))
            }
        }
    }

    fn io_read(&mut self, address: u8, bus: &mut CoreBus) -> u8 {
        match address {
            ioreg::SREG => self.sreg.bits(),
            ioreg::SPL => self.sp as u8,
            ioreg::SPH => (self.sp >> 8) as u8,
            ioreg::RAMPD => self.ramp.d,
            ioreg::RAMPX => self.ramp.x,
            ioreg::RAMPY => self.ramp.y,
            ioreg::RAMPZ => self.ramp.z,
            _ => bus.io.read(address),
        }
    }

    /// Returns the new flag register when the write targets it; that
    /// overwrite is applied at commit, after the merge.
    fn io_write(&mut self, address: u8, value: u8, mask: u8, bus: &mut CoreBus) -> Option<Sreg> {
        let merge = |current: u8| (value & mask) | (current & !mask);
        match address {
            ioreg::SREG => return Some(Sreg::from_bits(merge(self.sreg.bits()))),
            ioreg::SPL => self.sp = (self.sp & 0xff00) | u16::from(merge(self.sp as u8)),
            ioreg::SPH => self.sp = (self.sp & 0x00ff) | (u16::from(merge((self.sp >> 8) as u8)) << 8),
            ioreg::RAMPD => self.ramp.d = merge(self.ramp.d),
            ioreg::RAMPX => self.ramp.x = merge(self.ramp.x),
            ioreg::RAMPY => self.ramp.y = merge(self.ramp.y),
            ioreg::RAMPZ => self.ramp.z = merge(self.ramp.z),
            _ => {
                let accepted = bus.io.write(address, value, mask);
                let refused = mask & !accepted;
                if refused != 0 {
                    event!(Level::TRACE, address, refused, "peripheral refused write bits");
                }
            }
        }
        None
    }
}
