/*!
disasm - text disassembly for the `disasm` CLI subcommand.

This is formatting only, grounded in the addressing-mode table of
`cpu::addressing`: given a byte slice and a starting CPU address, produce
one line per instruction (mnemonic, addressing mode, raw bytes). It has
no bearing on CPU execution and is not part of the library's public
contract beyond this module.
*/

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Imp,
    Acc,
    Imm,
    Zp0,
    Zpx,
    Zpy,
    Rel,
    Abs,
    Abx,
    Aby,
    Ind,
    Izx,
    Izy,
}

impl Mode {
    fn operand_len(self) -> usize {
        match self {
            Mode::Imp | Mode::Acc => 0,
            Mode::Imm | Mode::Zp0 | Mode::Zpx | Mode::Zpy | Mode::Rel | Mode::Izx | Mode::Izy => 1,
            Mode::Abs | Mode::Abx | Mode::Aby | Mode::Ind => 2,
        }
    }
}

fn decode(opcode: u8) -> (&'static str, Mode) {
    use Mode::*;
    match opcode {
        0xA9 => ("LDA", Imm),
        0xA5 => ("LDA", Zp0),
        0xB5 => ("LDA", Zpx),
        0xAD => ("LDA", Abs),
        0xBD => ("LDA", Abx),
        0xB9 => ("LDA", Aby),
        0xA1 => ("LDA", Izx),
        0xB1 => ("LDA", Izy),
        0xA2 => ("LDX", Imm),
        0xA6 => ("LDX", Zp0),
        0xB6 => ("LDX", Zpy),
        0xAE => ("LDX", Abs),
        0xBE => ("LDX", Aby),
        0xA0 => ("LDY", Imm),
        0xA4 => ("LDY", Zp0),
        0xB4 => ("LDY", Zpx),
        0xAC => ("LDY", Abs),
        0xBC => ("LDY", Abx),
        0x85 => ("STA", Zp0),
        0x95 => ("STA", Zpx),
        0x8D => ("STA", Abs),
        0x9D => ("STA", Abx),
        0x99 => ("STA", Aby),
        0x81 => ("STA", Izx),
        0x91 => ("STA", Izy),
        0x86 => ("STX", Zp0),
        0x96 => ("STX", Zpy),
        0x8E => ("STX", Abs),
        0x84 => ("STY", Zp0),
        0x94 => ("STY", Zpx),
        0x8C => ("STY", Abs),
        0xAA => ("TAX", Imp),
        0xA8 => ("TAY", Imp),
        0x8A => ("TXA", Imp),
        0x98 => ("TYA", Imp),
        0xBA => ("TSX", Imp),
        0x9A => ("TXS", Imp),
        0x48 => ("PHA", Imp),
        0x68 => ("PLA", Imp),
        0x08 => ("PHP", Imp),
        0x28 => ("PLP", Imp),
        0xE8 => ("INX", Imp),
        0xC8 => ("INY", Imp),
        0xCA => ("DEX", Imp),
        0x88 => ("DEY", Imp),
        0xE6 => ("INC", Zp0),
        0xF6 => ("INC", Zpx),
        0xEE => ("INC", Abs),
        0xFE => ("INC", Abx),
        0xC6 => ("DEC", Zp0),
        0xD6 => ("DEC", Zpx),
        0xCE => ("DEC", Abs),
        0xDE => ("DEC", Abx),
        0x29 => ("AND", Imm),
        0x25 => ("AND", Zp0),
        0x35 => ("AND", Zpx),
        0x2D => ("AND", Abs),
        0x3D => ("AND", Abx),
        0x39 => ("AND", Aby),
        0x21 => ("AND", Izx),
        0x31 => ("AND", Izy),
        0x09 => ("ORA", Imm),
        0x05 => ("ORA", Zp0),
        0x15 => ("ORA", Zpx),
        0x0D => ("ORA", Abs),
        0x1D => ("ORA", Abx),
        0x19 => ("ORA", Aby),
        0x01 => ("ORA", Izx),
        0x11 => ("ORA", Izy),
        0x49 => ("EOR", Imm),
        0x45 => ("EOR", Zp0),
        0x55 => ("EOR", Zpx),
        0x4D => ("EOR", Abs),
        0x5D => ("EOR", Abx),
        0x59 => ("EOR", Aby),
        0x41 => ("EOR", Izx),
        0x51 => ("EOR", Izy),
        0x24 => ("BIT", Zp0),
        0x2C => ("BIT", Abs),
        0x0A => ("ASL", Acc),
        0x06 => ("ASL", Zp0),
        0x16 => ("ASL", Zpx),
        0x0E => ("ASL", Abs),
        0x1E => ("ASL", Abx),
        0x4A => ("LSR", Acc),
        0x46 => ("LSR", Zp0),
        0x56 => ("LSR", Zpx),
        0x4E => ("LSR", Abs),
        0x5E => ("LSR", Abx),
        0x2A => ("ROL", Acc),
        0x26 => ("ROL", Zp0),
        0x36 => ("ROL", Zpx),
        0x2E => ("ROL", Abs),
        0x3E => ("ROL", Abx),
        0x6A => ("ROR", Acc),
        0x66 => ("ROR", Zp0),
        0x76 => ("ROR", Zpx),
        0x6E => ("ROR", Abs),
        0x7E => ("ROR", Abx),
        0x18 => ("CLC", Imp),
        0x38 => ("SEC", Imp),
        0x58 => ("CLI", Imp),
        0x78 => ("SEI", Imp),
        0xD8 => ("CLD", Imp),
        0xF8 => ("SED", Imp),
        0xB8 => ("CLV", Imp),
        0xC9 => ("CMP", Imm),
        0xC5 => ("CMP", Zp0),
        0xD5 => ("CMP", Zpx),
        0xCD => ("CMP", Abs),
        0xDD => ("CMP", Abx),
        0xD9 => ("CMP", Aby),
        0xC1 => ("CMP", Izx),
        0xD1 => ("CMP", Izy),
        0xE0 => ("CPX", Imm),
        0xE4 => ("CPX", Zp0),
        0xEC => ("CPX", Abs),
        0xC0 => ("CPY", Imm),
        0xC4 => ("CPY", Zp0),
        0xCC => ("CPY", Abs),
        0x10 => ("BPL", Rel),
        0x30 => ("BMI", Rel),
        0x50 => ("BVC", Rel),
        0x70 => ("BVS", Rel),
        0x90 => ("BCC", Rel),
        0xB0 => ("BCS", Rel),
        0xD0 => ("BNE", Rel),
        0xF0 => ("BEQ", Rel),
        0x4C => ("JMP", Abs),
        0x6C => ("JMP", Ind),
        0x20 => ("JSR", Abs),
        0x60 => ("RTS", Imp),
        0x69 => ("ADC", Imm),
        0x65 => ("ADC", Zp0),
        0x75 => ("ADC", Zpx),
        0x6D => ("ADC", Abs),
        0x7D => ("ADC", Abx),
        0x79 => ("ADC", Aby),
        0x61 => ("ADC", Izx),
        0x71 => ("ADC", Izy),
        0xE9 => ("SBC", Imm),
        0xE5 => ("SBC", Zp0),
        0xF5 => ("SBC", Zpx),
        0xED => ("SBC", Abs),
        0xFD => ("SBC", Abx),
        0xF9 => ("SBC", Aby),
        0xE1 => ("SBC", Izx),
        0xF1 => ("SBC", Izy),
        0x00 => ("BRK", Imp),
        0x40 => ("RTI", Imp),
        0xEA => ("NOP", Imp),
        other => {
            let _ = other;
            ("???", Imp)
        }
    }
}

/// Disassemble `len` instructions from `bytes`, which must already be the
/// PRG-ROM window starting at CPU address `start`.
pub fn disassemble(bytes: &[u8], start: u16, len: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(len);
    let mut cursor = 0usize;
    let mut addr = start;
    for _ in 0..len {
        if cursor >= bytes.len() {
            break;
        }
        let opcode = bytes[cursor];
        let (mnemonic, mode) = decode(opcode);
        let operand_len = mode.operand_len();
        let end = (cursor + 1 + operand_len).min(bytes.len());
        let raw: Vec<String> = bytes[cursor..end].iter().map(|b| format!("{b:02X}")).collect();
        let operand_text = match (mode, end - cursor) {
            (Mode::Imp, _) => String::new(),
            (Mode::Acc, _) => " A".to_string(),
            (_, n) if n < 1 + operand_len => String::new(), // truncated at end of window
            (Mode::Imm, _) => format!(" #${:02X}", bytes[cursor + 1]),
            (Mode::Zp0, _) => format!(" ${:02X}", bytes[cursor + 1]),
            (Mode::Zpx, _) => format!(" ${:02X},X", bytes[cursor + 1]),
            (Mode::Zpy, _) => format!(" ${:02X},Y", bytes[cursor + 1]),
            (Mode::Rel, _) => {
                let disp = bytes[cursor + 1] as i8;
                let target = addr.wrapping_add(2).wrapping_add(disp as u16);
                format!(" ${target:04X}")
            }
            (Mode::Abs, _) => {
                let lo = bytes[cursor + 1] as u16;
                let hi = bytes[cursor + 2] as u16;
                format!(" ${:04X}", (hi << 8) | lo)
            }
            (Mode::Abx, _) => {
                let lo = bytes[cursor + 1] as u16;
                let hi = bytes[cursor + 2] as u16;
                format!(" ${:04X},X", (hi << 8) | lo)
            }
            (Mode::Aby, _) => {
                let lo = bytes[cursor + 1] as u16;
                let hi = bytes[cursor + 2] as u16;
                format!(" ${:04X},Y", (hi << 8) | lo)
            }
            (Mode::Ind, _) => {
                let lo = bytes[cursor + 1] as u16;
                let hi = bytes[cursor + 2] as u16;
                format!(" (${:04X})", (hi << 8) | lo)
            }
            (Mode::Izx, _) => format!(" (${:02X},X)", bytes[cursor + 1]),
            (Mode::Izy, _) => format!(" (${:02X}),Y", bytes[cursor + 1]),
        };
        lines.push(format!(
            "{addr:04X}  {:<8} {mnemonic}{operand_text}",
            raw.join(" ")
        ));
        let consumed = (end - cursor).max(1);
        cursor += consumed;
        addr = addr.wrapping_add(consumed as u16);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_lda_immediate() {
        let lines = disassemble(&[0xA9, 0x42, 0xEA], 0x8000, 2);
        assert_eq!(lines[0], "8000  A9 42    LDA #$42");
        assert_eq!(lines[1], "8002  EA       NOP");
    }

    #[test]
    fn decodes_absolute_jmp() {
        let lines = disassemble(&[0x4C, 0x00, 0x90], 0x8000, 1);
        assert_eq!(lines[0], "8000  4C 00 90 JMP $9000");
    }

    #[test]
    fn stops_at_end_of_window() {
        let lines = disassemble(&[0xEA], 0x8000, 5);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn unknown_opcode_decodes_as_placeholder() {
        let lines = disassemble(&[0x02], 0x8000, 1);
        assert_eq!(lines[0], "8000  02       ???");
    }
}
