//! 6800 decoding.
//!
//! addressing mode follows contiguous opcode ranges out of the data
//! sheet's machine-code table, with two literal exceptions that the
//! ranges get wrong: 0x8D is BSR (relative, not immediate), and 0x8E/0xCE
//! are LDS/LDX (16-bit immediate, not 8-bit). the decoding here is
//! deliberately incomplete, so an undefined opcode can still land in a
//! plausible mode; the hardware does incomplete decoding too, just not
//! necessarily the same incomplete decoding.

use core::fmt::Write;

use crate::display::read_u16be;
use crate::{DecodeState, InstructionDecode};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AddrMode {
    Inherent,
    Rel,
    Indexed,
    Imm8,
    Imm16,
    Direct,
    Extended,
}

static OPCODES_6800: [&str; 256] = [
    "?",    "NOP",  "?",    "?",    "?",    "?",    "TAP",  "TPA",
    "INX",  "DEX",  "CLV",  "SEV",  "CLC",  "SEC",  "CLI",  "SEI",
    "SBA",  "CBA",  "?",    "?",    "?",    "?",    "TAB",  "TBA",
    "?",    "DAA",  "?",    "ABA",  "?",    "?",    "?",    "?",
    "BRA",  "?",    "BHI",  "BLS",  "BCC",  "BCS",  "BNE",  "BEQ",
    "BVC",  "BVS",  "BPL",  "BMI",  "BGE",  "BLT",  "BGT",  "BLE",
    "TSX",  "INS",  "PULA", "PULB", "DES",  "TXS",  "PSHA", "PSHB",
    "?",    "RTS",  "?",    "RTI",  "?",    "?",    "WAI",  "SWI",
    "NEGA", "?",    "?",    "COMA", "LSRA", "?",    "RORA", "ASRA",
    "ASLA", "ROLA", "DECA", "?",    "INCA", "TSTA", "?",    "CLRA",
    "NEGB", "?",    "?",    "COMB", "LSRB", "?",    "RORB", "ASRB",
    "ASLB", "ROLB", "DECB", "?",    "INCB", "TSTB", "?",    "CLRB",
    "NEG",  "?",    "?",    "COM",  "LSR",  "?",    "ROR",  "ASR",
    "ASL",  "ROL",  "DEC",  "?",    "INC",  "TST",  "JMP",  "CLR",
    "NEG",  "?",    "?",    "COM",  "LSR",  "?",    "ROR",  "ASR",
    "ASL",  "ROL",  "DEC",  "?",    "INC",  "TST",  "JMP",  "CLR",
    "SUBA", "CMPA", "SBCA", "?",    "ANDA", "BITA", "LDAA", "?",
    "EORA", "ADCA", "ORAA", "ADDA", "CPX",  "BSR",  "LDS",  "?",
    "SUBA", "CMPA", "SBCA", "?",    "ANDA", "BITA", "LDAA", "STAA",
    "EORA", "ADCA", "ORAA", "ADDA", "CPX",  "?",    "LDS",  "STS",
    "SUBA", "CMPA", "SBCA", "?",    "ANDA", "BITA", "LDAA", "STAA",
    "EORA", "ADCA", "ORAA", "ADDA", "CPX",  "JSR",  "LDS",  "STS",
    "SUBA", "CMPA", "SBCA", "?",    "ANDA", "BITA", "LDAA", "STAA",
    "EORA", "ADCA", "ORAA", "ADDA", "CPX",  "JSR",  "LDS",  "STS",
    "SUBB", "CMPB", "SBCB", "?",    "ANDB", "BITB", "LDAB", "?",
    "EORB", "ADCB", "ORAB", "ADDB", "?",    "?",    "LDX",  "?",
    "SUBB", "CMPB", "SBCB", "?",    "ANDB", "BITB", "LDAB", "STAB",
    "EORB", "ADCB", "ORAB", "ADDB", "?",    "?",    "LDX",  "STX",
    "SUBB", "CMPB", "SBCB", "?",    "ANDB", "BITB", "LDAB", "STAB",
    "EORB", "ADCB", "ORAB", "ADDB", "?",    "?",    "LDX",  "STX",
    "SUBB", "CMPB", "SBCB", "?",    "ANDB", "BITB", "LDAB", "STAB",
    "EORB", "ADCB", "ORAB", "ADDB", "?",    "?",    "LDX",  "STX",
];

fn addr_mode(opc: u8) -> AddrMode {
    match opc {
        // BSR falls inside the immediate range but takes a branch offset.
        0x8d => AddrMode::Rel,
        // LDS and LDX load 16-bit registers, so their immediates are wide.
        0x8e | 0xce => AddrMode::Imm16,
        0x00..=0x1f | 0x30..=0x5f => AddrMode::Inherent,
        0x20..=0x2f => AddrMode::Rel,
        0x60..=0x6f | 0xa0..=0xaf | 0xe0..=0xef => AddrMode::Indexed,
        0x70..=0x7f | 0xb0..=0xbf | 0xf0..=0xff => AddrMode::Extended,
        0x80..=0x8f | 0xc0..=0xcf => AddrMode::Imm8,
        0x90..=0x9f | 0xd0..=0xdf => AddrMode::Direct,
    }
}

fn byte_count(mode: AddrMode) -> usize {
    match mode {
        AddrMode::Inherent => 1,
        AddrMode::Rel | AddrMode::Indexed | AddrMode::Imm8 | AddrMode::Direct => 2,
        AddrMode::Extended | AddrMode::Imm16 => 3,
    }
}

pub(crate) fn advance(id: &mut InstructionDecode) {
    if id.state != DecodeState::Fetching || id.bytes_fetched == 0 {
        return;
    }

    if id.bytes_required == 0 {
        // the full size is known right after the opcode fetch.
        let mode = addr_mode(id.bytes[0]);
        id.addrmode = crate::AddrMode::M6800(mode);
        id.bytes_required = byte_count(mode);
    }

    if id.bytes_fetched == id.bytes_required {
        format(id);
        id.state = DecodeState::Complete;
    }
}

fn format(id: &mut InstructionDecode) {
    let opc = OPCODES_6800[id.bytes[0] as usize];
    let mode = match id.addrmode {
        crate::AddrMode::M6800(mode) => mode,
        _ => {
            let _ = id.text.write_str("<?ADDRMODE?>");
            return;
        }
    };

    match mode {
        AddrMode::Inherent => {
            let _ = write!(id.text, "{}", opc);
        }
        AddrMode::Rel => {
            let off = id.bytes[1] as i8;
            let _ = write!(id.text, "{} {}", opc, off);
            id.resolved_address = id
                .insn_address
                .wrapping_add(2)
                .wrapping_add(off as i32 as u32);
            id.resolved_address_valid = true;
        }
        AddrMode::Indexed => {
            let _ = write!(id.text, "{} {},X", opc, id.bytes[1]);
        }
        AddrMode::Extended => {
            let _ = write!(id.text, "{} ${:04X}", opc, read_u16be(&id.bytes, 1));
        }
        AddrMode::Direct => {
            let _ = write!(id.text, "{} ${:02X}", opc, id.bytes[1]);
        }
        AddrMode::Imm8 => {
            let _ = write!(id.text, "{} #${:02X}", opc, id.bytes[1]);
        }
        AddrMode::Imm16 => {
            let _ = write!(id.text, "{} #${:04X}", opc, read_u16be(&id.bytes, 1));
        }
    }
}
