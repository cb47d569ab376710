/*!
error.rs - Cartridge loading error taxonomy.

Everything else the emulator can hit at runtime (open-bus reads, writes to
ROM, undocumented opcodes) is a normal, silently-handled condition and never
surfaces as a `Result`; those are logged at `warn!`/`trace!` instead (see
the call sites in `bus` and `cpu::dispatch`). The only operation in this
crate that can fail outright is loading a ROM image.
*/

use thiserror::Error;

/// Failure loading an iNES ROM image. The only `Result`-returning entry
/// point in the crate is `Cartridge::from_ines_bytes`/`from_ines_file`.
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("invalid iNES ROM: {reason}")]
    InvalidRom { reason: String },

    #[error("unsupported mapper id {mapper_id}")]
    UnsupportedMapper { mapper_id: u16 },
}
