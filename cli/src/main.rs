//! Command-line harness: loads a raw program image, wires the core
//! to flat RAM and a bank of latch-style ports, runs a bounded
//! number of ticks and dumps the architectural state.
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::{event, Level};
use tracing_subscriber::prelude::*;

use cpu::{
    Core, CoreBus, CoreConfiguration, DataBus, DataBusRequest, IoBus, ProgramMemory,
};

#[derive(Parser, Debug)]
#[command(about = "Simulate an 8-bit AVR-compatible execution core")]
struct Cli {
    /// Program image: raw little-endian 16-bit words, loaded at
    /// word address zero.
    image: PathBuf,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 10_000)]
    ticks: u64,

    /// Program-counter width in bits (word addressing).
    #[arg(long, default_value_t = 14)]
    pmem_bits: u8,

    /// Data-address width in bits.
    #[arg(long, default_value_t = 16)]
    dmem_bits: u8,

    /// Number of interrupt request lines.
    #[arg(long, default_value_t = 8)]
    irq_lines: u8,

    /// Initial stack pointer.
    #[arg(long, default_value_t = 0x08ff)]
    sp: u16,

    /// Interrupt request lines to hold pending for the whole run,
    /// as a bit mask.
    #[arg(long, default_value_t = 0)]
    pending: u32,
}

struct ProgramImage {
    words: Vec<u16>,
}

impl ProgramImage {
    fn load(path: &PathBuf) -> Result<ProgramImage, std::io::Error> {
        let bytes = fs::read(path)?;
        let words = bytes
            .chunks(2)
            .map(|pair| u16::from_le_bytes([pair[0], *pair.get(1).unwrap_or(&0)]))
            .collect();
        Ok(ProgramImage { words })
    }
}

impl ProgramMemory for ProgramImage {
    fn fetch(&mut self, word_address: u32) -> u16 {
        self.words.get(word_address as usize).copied().unwrap_or(0)
    }
}

/// Sparse RAM; every access is acknowledged in the same tick.
struct Ram {
    bytes: HashMap<u32, u8>,
}

impl DataBus for Ram {
    fn access(&mut self, request: &DataBusRequest) -> Option<u8> {
        if request.write {
            self.bytes.insert(request.address, request.data);
            Some(0)
        } else {
            Some(self.bytes.get(&request.address).copied().unwrap_or(0))
        }
    }
}

/// 64 latch cells standing in for peripherals: writes land as given
/// and read back.
struct Ports {
    cells: [u8; 64],
}

impl IoBus for Ports {
    fn read(&mut self, address: u8) -> u8 {
        self.cells[address as usize]
    }

    fn write(&mut self, address: u8, value: u8, mask: u8) -> u8 {
        let cell = &mut self.cells[address as usize];
        *cell = (value & mask) | (*cell & !mask);
        mask
    }
}

fn dump_state(core: &Core, out: &mut StandardStream) -> Result<(), std::io::Error> {
    let state = core.state();
    let mut label = ColorSpec::new();
    label.set_fg(Some(Color::Cyan)).set_bold(true);

    out.set_color(&label)?;
    write!(out, "pc")?;
    out.reset()?;
    write!(out, "={:04x} ", state.pc)?;
    out.set_color(&label)?;
    write!(out, "sp")?;
    out.reset()?;
    write!(out, "={:04x} ", state.sp)?;
    out.set_color(&label)?;
    write!(out, "sreg")?;
    out.reset()?;
    writeln!(out, "={} ({:02x})", state.sreg, state.sreg.bits())?;

    for (i, value) in state.registers.iter().enumerate() {
        if i % 8 == 0 {
            out.set_color(&label)?;
            write!(out, "r{i:02}")?;
            out.reset()?;
            write!(out, ":")?;
        }
        write!(out, " {value:02x}")?;
        if i % 8 == 7 {
            writeln!(out)?;
        }
    }
    if state.stalled {
        writeln!(out, "(stalled on the data bus)")?;
    }
    Ok(())
}

fn run_simulator() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // See the tracing-subscriber documentation for how to select
    // which trace messages get printed; RUST_LOG=cpu=trace shows
    // every decoded instruction.
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let config = CoreConfiguration {
        pmem_addr_bits: cli.pmem_bits,
        dmem_addr_bits: cli.dmem_bits,
        irq_lines: cli.irq_lines,
    };
    let mut core = Core::new(config)?;
    core.set_stack_pointer(cli.sp);

    let mut pmem = ProgramImage::load(&cli.image)?;
    event!(
        Level::INFO,
        "loaded {} program words from {}",
        pmem.words.len(),
        cli.image.display()
    );
    let mut ram = Ram {
        bytes: HashMap::new(),
    };
    let mut ports = Ports { cells: [0; 64] };

    for _ in 0..cli.ticks {
        let mut bus = CoreBus {
            pmem: &mut pmem,
            dmem: &mut ram,
            io: &mut ports,
            irq_pending: cli.pending,
        };
        core.tick(&mut bus);
    }
    event!(Level::INFO, "ran {} ticks", cli.ticks);

    let choice = if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut out = StandardStream::stdout(choice);
    dump_state(&core, &mut out)?;
    Ok(())
}

fn main() {
    match run_simulator() {
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Ok(()) => {
            std::process::exit(0);
        }
    }
}
