#![doc = r#"
nescore: a cycle-accurate 6502/2A03 CPU core with a minimal supporting bus.

Modules:
- bus: CPU address space decoding (RAM, PPU register window, APU/IO stub,
  cartridge)
- cartridge: iNES v1 loader and cartridge metadata; constructs a Mapper
- cpu: 6502 CPU core with cycle-accurate timing for documented opcodes,
  interrupt dispatch, and the delayed I-flag commit
- error: ROM-loading error taxonomy
- mapper: Mapper trait and NROM (mapper 0) implementation
- mappers: additional mapper implementations (CNROM, MMC1, MMC3)
- ppu: PPU register window stub

In tests, shared iNES builders are available under `crate::test_utils`.
"#]

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod disasm;
pub mod error;
pub mod mapper;
pub mod mappers;
pub mod ppu;

pub use bus::Bus;
pub use cartridge::Cartridge;
pub use cpu::{Cpu, CpuStateSnapshot};
pub use error::CartridgeError;

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
