/*!
bus - CPU address space decoding.

Address map:
- $0000-$1FFF: 2 KiB internal RAM, mirrored (`& 0x07FF`)
- $2000-$3FFF: PPU register window, mirrored every 8 bytes (`& 0x0007`)
- $4000-$401F: APU/IO register stub (latched, no audio/DMA side effects)
- $4020-$5FFF: cartridge expansion area, forwarded to the mapper
- $6000-$7FFF: cartridge PRG RAM
- $8000-$FFFF: cartridge PRG ROM

The bus does not own interrupt state: `irq_pending`/`nmi_pending` live on
the CPU (see `cpu::state::CpuState`) and are never read or written here.
*/

mod ram;

use ram::Ram;

use crate::cartridge::Cartridge;
use crate::ppu::Ppu;

/// CPU-visible bus: RAM, PPU register stub, APU/IO stub, and cartridge.
pub struct Bus {
    ram: Ram,
    ppu: Ppu,
    apu_io: [u8; 0x20],
    cartridge: Option<Cartridge>,
    total_ticks: u64,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            ram: Ram::new(),
            ppu: Ppu::new(),
            apu_io: [0; 0x20],
            cartridge: None,
            total_ticks: 0,
        }
    }

    pub fn reset(&mut self) {
        self.ram.reset();
        self.ppu.reset();
        self.apu_io.fill(0);
    }

    pub fn attach_cartridge(&mut self, cart: Cartridge) {
        self.cartridge = Some(cart);
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram.read(addr),
            0x2000..=0x3FFF => self.ppu.read_register(addr & 0x0007),
            0x4000..=0x401F => self.apu_io[(addr - 0x4000) as usize],
            0x4020..=0x5FFF => {
                log::trace!("open-bus read at ${addr:04X} (cartridge expansion area)");
                0
            }
            0x6000..=0x7FFF => match &self.cartridge {
                Some(cart) => cart.cpu_read_prg_ram(addr),
                None => {
                    log::warn!("PRG RAM read at ${addr:04X} with no cartridge attached");
                    0
                }
            },
            0x8000..=0xFFFF => match &self.cartridge {
                Some(cart) => cart.cpu_read_prg_rom(addr),
                None => {
                    log::warn!("PRG ROM read at ${addr:04X} with no cartridge attached");
                    0
                }
            },
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram.write(addr, value),
            0x2000..=0x3FFF => self.ppu.write_register(addr & 0x0007, value),
            0x4000..=0x401F => self.apu_io[(addr - 0x4000) as usize] = value,
            0x4020..=0x5FFF => {
                log::trace!("write to ${addr:04X} (cartridge expansion area) ignored");
            }
            0x6000..=0x7FFF => match &mut self.cartridge {
                Some(cart) => cart.cpu_write_prg_ram(addr, value),
                None => log::warn!("PRG RAM write at ${addr:04X} with no cartridge attached"),
            },
            0x8000..=0xFFFF => match &mut self.cartridge {
                Some(cart) => cart.cpu_write_prg_rom(addr, value),
                None => log::warn!("PRG ROM write at ${addr:04X} with no cartridge attached"),
            },
        }
    }

    pub fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// This stub never initiates OAM DMA; always false.
    pub fn dma_is_active(&self) -> bool {
        false
    }

    pub fn tick(&mut self, cycles: u32) {
        self.total_ticks += cycles as u64;
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }
}
