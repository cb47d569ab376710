/*!
CLI front-end for exercising the core against a ROM file. Not part of the
library's public contract; `nescore` has no dependency on this binary.
*/

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use nescore::{Bus, CartridgeError, Cpu};

#[derive(Parser)]
#[command(name = "nescore", about = "6502/2A03 core exerciser")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a ROM, reset, then tick for a fixed cycle budget or until halted.
    Run {
        rom: PathBuf,
        #[arg(long, default_value_t = 100_000)]
        cycles: u64,
    },
    /// Disassemble a window of PRG-ROM bytes starting at a CPU address.
    Disasm {
        rom: PathBuf,
        #[arg(long)]
        at: String,
        #[arg(long)]
        len: usize,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { rom, cycles } => run(&rom, cycles),
        Command::Disasm { rom, at, len } => match parse_addr(&at) {
            Some(addr) => disasm(&rom, addr, len),
            None => {
                eprintln!("invalid --at address: {at}");
                return ExitCode::from(2);
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(1)
        }
    }
}

fn parse_addr(s: &str) -> Option<u16> {
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix('$')).unwrap_or(s);
    u16::from_str_radix(s, 16).ok()
}

fn run(rom: &PathBuf, cycles: u64) -> Result<(), CartridgeError> {
    let cart = nescore::Cartridge::from_ines_file(rom)?;
    log::debug!("loaded {} ({} cycle budget)", rom.display(), cycles);

    let mut bus = Bus::new();
    bus.attach_cartridge(cart);
    let mut cpu = Cpu::new();
    cpu.reset(&mut bus);

    let mut elapsed = 0u64;
    while elapsed < cycles && !cpu.is_halted() {
        cpu.tick(&mut bus);
        elapsed += 1;
    }

    println!(
        "A={:02X} X={:02X} Y={:02X} SP={:02X} PC={:04X} P={:02X} cycles={} halted={}",
        cpu.a(),
        cpu.x(),
        cpu.y(),
        cpu.sp(),
        cpu.pc(),
        cpu.status(),
        bus.total_ticks(),
        cpu.is_halted(),
    );
    Ok(())
}

fn disasm(rom: &PathBuf, at: u16, len: usize) -> Result<(), CartridgeError> {
    let cart = nescore::Cartridge::from_ines_file(rom)?;
    let mut bus = Bus::new();
    bus.attach_cartridge(cart);

    // Longest documented instruction is 3 bytes.
    let window_len = len.saturating_mul(3).min((0x10000 - at as usize).max(1));
    let mut bytes = Vec::with_capacity(window_len);
    for offset in 0..window_len {
        let addr = at.wrapping_add(offset as u16);
        bytes.push(bus.read(addr));
    }

    for line in nescore::disasm::disassemble(&bytes, at, len) {
        println!("{line}");
    }
    Ok(())
}
