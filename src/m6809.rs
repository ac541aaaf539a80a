//! 6809/6809E decoding.
//!
//! this is the most involved of the supported families. page 2 and page 3
//! prefixes (0x10/0x11) push the opcode into a second byte, and the
//! indexed addressing modes hide behind a postbyte, so length
//! determination can take up to three fetched bytes before it settles.
//! mode assignment follows the machine-code and indexed-addressing tables
//! in the 6809 data sheet; as with the 6800 the range decoding is
//! deliberately incomplete, so an undefined opcode can still land in a
//! plausible mode.

use core::fmt::Write;

use crate::display::read_u16be;
use crate::{DecodeState, InstructionDecode};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AddrMode {
    Inherent,
    Direct,
    Extended,
    Rel8,
    Rel16,
    Imm8,
    Imm16,
    ZeroOff,
    ZeroOffInd,
    ConstOff5,
    ConstOff8,
    ConstOff8Ind,
    ConstOff16,
    ConstOff16Ind,
    AccOff,
    AccOffInd,
    PostInc1,
    PostInc2,
    PostInc2Ind,
    PreDec1,
    PreDec2,
    PreDec2Ind,
    PcRel8,
    PcRel8Ind,
    PcRel16,
    PcRel16Ind,
    ExtendedInd,
    ExgTfr,
    PshPul,
}

impl AddrMode {
    /// the `[...]` indirect forms.
    fn indirect(self) -> bool {
        match self {
            AddrMode::ZeroOffInd
            | AddrMode::ConstOff8Ind
            | AddrMode::ConstOff16Ind
            | AddrMode::AccOffInd
            | AddrMode::PostInc2Ind
            | AddrMode::PreDec2Ind
            | AddrMode::PcRel8Ind
            | AddrMode::PcRel16Ind
            | AddrMode::ExtendedInd => true,
            _ => false,
        }
    }

    /// bytes following the (unprefixed) opcode, postbytes and operands
    /// together.
    fn postbyte_count(self) -> usize {
        match self {
            AddrMode::Inherent => 0,
            AddrMode::Direct
            | AddrMode::Rel8
            | AddrMode::Imm8
            | AddrMode::ZeroOff
            | AddrMode::ZeroOffInd
            | AddrMode::ConstOff5
            | AddrMode::AccOff
            | AddrMode::AccOffInd
            | AddrMode::PostInc1
            | AddrMode::PostInc2
            | AddrMode::PostInc2Ind
            | AddrMode::PreDec1
            | AddrMode::PreDec2
            | AddrMode::PreDec2Ind
            | AddrMode::ExgTfr
            | AddrMode::PshPul => 1,
            AddrMode::Extended
            | AddrMode::Rel16
            | AddrMode::Imm16
            | AddrMode::ConstOff8
            | AddrMode::ConstOff8Ind
            | AddrMode::PcRel8
            | AddrMode::PcRel8Ind => 2,
            AddrMode::ConstOff16
            | AddrMode::ConstOff16Ind
            | AddrMode::PcRel16
            | AddrMode::PcRel16Ind
            | AddrMode::ExtendedInd => 3,
        }
    }
}

/// the outcome of a length-determination attempt. an instruction with a
/// prefix or an indexed postbyte may simply need more bytes before the
/// mode is knowable.
enum ModeLookup {
    NeedMore,
    Invalid,
    Mode(AddrMode),
}

static OPCODES_6809: [&str; 256] = [
    "NEG",  "?",    "?",    "COM",  "LSR",  "?",    "ROR",  "ASR",
    "ASL",  "ROL",  "DEC",  "?",    "INC",  "TST",  "JMP",  "CLR",
    "(pg2)","(pg3)","NOP",  "SYNC", "?",    "?",    "LBRA", "LBSR",
    "?",    "DAA",  "ORCC", "?",    "ANDCC","SEX",  "EXG",  "TFR",
    "BRA",  "BRN",  "BHI",  "BLS",  "BCC",  "BCS",  "BNE",  "BEQ",
    "BVC",  "BVS",  "BPL",  "BMI",  "BGE",  "BLT",  "BGT",  "BLE",
    "LEAX", "LEAY", "LEAS", "LEAU", "PSHS", "PULS", "PSHU", "PULU",
    "?",    "RTS",  "ABX",  "RTI",  "CWAI", "MUL",  "?",    "SWI",
    "NEGA", "?",    "?",    "COMA", "LSRA", "?",    "RORA", "ASRA",
    "ASLA", "ROLA", "DECA", "?",    "INCA", "TSTA", "?",    "CLRA",
    "NEGB", "?",    "?",    "COMB", "LSRB", "?",    "RORB", "ASRB",
    "ASLB", "ROLB", "DECB", "?",    "INCB", "TSTB", "?",    "CLRB",
    "NEG",  "?",    "?",    "COM",  "LSR",  "?",    "ROR",  "ASR",
    "ASL",  "ROL",  "DEC",  "?",    "INC",  "TST",  "JMP",  "CLR",
    "NEG",  "?",    "?",    "COM",  "LSR",  "?",    "ROR",  "ASR",
    "ASL",  "ROL",  "DEC",  "?",    "INC",  "TST",  "JMP",  "CLR",
    "SUBA", "CMPA", "SBCA", "SUBD", "ANDA", "BITA", "LDA",  "?",
    "EORA", "ADCA", "ORA",  "ADDA", "CMPX", "BSR",  "LDX",  "?",
    "SUBA", "CMPA", "SBCA", "SUBD", "ANDA", "BITA", "LDA",  "STA",
    "EORA", "ADCA", "ORA",  "ADDA", "CMPX", "JSR",  "LDX",  "STX",
    "SUBA", "CMPA", "SBCA", "SUBD", "ANDA", "BITA", "LDA",  "STA",
    "EORA", "ADCA", "ORA",  "ADDA", "CMPX", "JSR",  "LDX",  "STX",
    "SUBA", "CMPA", "SBCA", "SUBD", "ANDA", "BITA", "LDA",  "STA",
    "EORA", "ADCA", "ORA",  "ADDA", "CMPX", "JSR",  "LDX",  "STX",
    "SUBB", "CMPB", "SBCB", "ADDD", "ANDB", "BITB", "LDB",  "?",
    "EORB", "ADCB", "ORB",  "ADDB", "LDD",  "?",    "LDU",  "?",
    "SUBB", "CMPB", "SBCB", "ADDD", "ANDB", "BITB", "LDB",  "STB",
    "EORB", "ADCB", "ORB",  "ADDB", "LDD",  "STD",  "LDU",  "STU",
    "SUBB", "CMPB", "SBCB", "ADDD", "ANDB", "BITB", "LDB",  "STB",
    "EORB", "ADCB", "ORB",  "ADDB", "LDD",  "STD",  "LDU",  "STU",
    "SUBB", "CMPB", "SBCB", "ADDD", "ANDB", "BITB", "LDB",  "STB",
    "EORB", "ADCB", "ORB",  "ADDB", "LDD",  "STD",  "LDU",  "STU",
];

static LONG_BRANCHES: [&str; 16] = [
    "?",    "LBRN", "LBHI", "LBLS", "LBCC", "LBCS", "LBNE", "LBEQ",
    "LBVC", "LBVS", "LBPL", "LBMI", "LBGE", "LBLT", "LBGT", "LBLE",
];

static INDEX_REGNAMES: [&str; 4] = ["X", "Y", "U", "S"];

/// push/pull postbyte bits, in the order the registers are listed.
/// the 0b01000000 bit names the other stack pointer, so its spelling
/// depends on whether the opcode was the S or the U variant.
static PSH_PUL_REGNAMES: [(u8, Option<&str>); 8] = [
    (0b0000_0001, Some("CCR")),
    (0b0000_0010, Some("A")),
    (0b0000_0100, Some("B")),
    (0b0000_1000, Some("DPR")),
    (0b0001_0000, Some("X")),
    (0b0010_0000, Some("Y")),
    (0b0100_0000, None),
    (0b1000_0000, Some("PC")),
];

/// classify an indexed-mode postbyte, per "TABLE 2 - INDEXED ADDRESSING
/// MODE" in the data sheet. `None` for the reserved encodings.
fn addr_mode_indexed(pb: u8) -> Option<AddrMode> {
    // extended indirect is a slightly special case.
    if (pb & 0b1001_1111) == 0b1001_1111 {
        return Some(AddrMode::ExtendedInd);
    }

    // 5-bit constant offset also is a special case.
    if (pb & 0b1000_0000) == 0 {
        return Some(AddrMode::ConstOff5);
    }

    let am = match pb & 0b1000_1111 {
        0b1000_0100 => AddrMode::ZeroOff,
        0b1000_1000 => AddrMode::ConstOff8,
        0b1000_1001 => AddrMode::ConstOff16,
        0b1000_0110 | 0b1000_0101 | 0b1000_1011 => AddrMode::AccOff,
        0b1000_0000 => AddrMode::PostInc1,
        0b1000_0001 => AddrMode::PostInc2,
        0b1000_0010 => AddrMode::PreDec1,
        0b1000_0011 => AddrMode::PreDec2,
        0b1000_1100 => AddrMode::PcRel8,
        0b1000_1101 => AddrMode::PcRel16,
        _ => return None,
    };

    if pb & 0b0001_0000 != 0 {
        // indirect flag.
        return match am {
            AddrMode::ZeroOff => Some(AddrMode::ZeroOffInd),
            AddrMode::ConstOff8 => Some(AddrMode::ConstOff8Ind),
            AddrMode::ConstOff16 => Some(AddrMode::ConstOff16Ind),
            AddrMode::AccOff => Some(AddrMode::AccOffInd),
            AddrMode::PostInc2 => Some(AddrMode::PostInc2Ind),
            AddrMode::PreDec2 => Some(AddrMode::PreDec2Ind),
            AddrMode::PcRel8 => Some(AddrMode::PcRel8Ind),
            AddrMode::PcRel16 => Some(AddrMode::PcRel16Ind),
            // indirect not allowed for the 1-increment forms.
            _ => None,
        };
    }

    Some(am)
}

/// determine the addressing mode from the bytes fetched so far, per
/// "TABLE 9 - HEXADECIMAL VALUES OF MACHINE CODES" in the data sheet.
fn addr_mode(id: &InstructionDecode) -> ModeLookup {
    let opc = id.bytes[0];

    // page 2 / page 3 opcodes.
    if opc == 0x10 || opc == 0x11 {
        if id.bytes_fetched < 2 {
            return ModeLookup::NeedMore;
        }

        let extopc = u16::from(opc) << 8 | u16::from(id.bytes[1]);

        return match extopc & 0xfff0 {
            0x1020 => ModeLookup::Mode(AddrMode::Rel16),
            0x1030 | 0x1130 => ModeLookup::Mode(AddrMode::Inherent),
            0x1080 | 0x1180 | 0x10c0 => ModeLookup::Mode(AddrMode::Imm16),
            0x1090 | 0x1190 | 0x10d0 => ModeLookup::Mode(AddrMode::Direct),
            0x10a0 | 0x11a0 | 0x10e0 => {
                // indexed; the postbyte is the third byte.
                if id.bytes_fetched < 3 {
                    return ModeLookup::NeedMore;
                }
                match addr_mode_indexed(id.bytes[2]) {
                    Some(am) => ModeLookup::Mode(am),
                    None => ModeLookup::Invalid,
                }
            }
            0x10b0 | 0x11b0 | 0x10f0 => ModeLookup::Mode(AddrMode::Extended),
            _ => ModeLookup::NeedMore,
        };
    }

    match opc {
        0x00..=0x0f | 0x90..=0x9f | 0xd0..=0xdf => ModeLookup::Mode(AddrMode::Direct),

        // 0x10-0x1f is a bunch of special cases.
        0x12 | 0x13 | 0x19 | 0x1d => ModeLookup::Mode(AddrMode::Inherent),
        0x16 | 0x17 => ModeLookup::Mode(AddrMode::Rel16),
        0x1a | 0x1c => ModeLookup::Mode(AddrMode::Imm8),
        0x1e | 0x1f => ModeLookup::Mode(AddrMode::ExgTfr),
        0x10..=0x1f => ModeLookup::NeedMore,

        0x20..=0x2f => ModeLookup::Mode(AddrMode::Rel8),

        0x34..=0x37 => ModeLookup::Mode(AddrMode::PshPul),
        0x39..=0x3f => ModeLookup::Mode(AddrMode::Inherent),
        0x38 => ModeLookup::NeedMore,

        0x40..=0x5f => ModeLookup::Mode(AddrMode::Inherent),

        0x30..=0x33 | 0x60..=0x6f | 0xa0..=0xaf | 0xe0..=0xef => {
            // indexed; the postbyte is the second byte.
            if id.bytes_fetched < 2 {
                return ModeLookup::NeedMore;
            }
            match addr_mode_indexed(id.bytes[1]) {
                Some(am) => ModeLookup::Mode(am),
                None => ModeLookup::Invalid,
            }
        }

        0x70..=0x7f | 0xb0..=0xbf | 0xf0..=0xff => ModeLookup::Mode(AddrMode::Extended),

        0x8d => ModeLookup::Mode(AddrMode::Rel8),
        0x80..=0x8f | 0xc0..=0xcf => match opc & 0xf {
            0x3 | 0xc | 0xe => ModeLookup::Mode(AddrMode::Imm16),
            _ => ModeLookup::Mode(AddrMode::Imm8),
        },
    }
}

/// look up the mnemonic for a page 2 / page 3 opcode pair. the holes
/// (0x108F, 0x10CF, everything unassigned) stay `"?"`.
fn page23_mnemonic(extopc: u16) -> &'static str {
    let extopc_u3 = extopc & 0xfff0;
    let extopc_b1 = extopc & 0x000f;

    if (0x1020..=0x102f).contains(&extopc) {
        return LONG_BRANCHES[(extopc & 0xf) as usize];
    }
    if extopc == 0x103f {
        return "SWI2";
    }
    if extopc == 0x113f {
        return "SWI3";
    }
    match extopc_u3 {
        0x1080 | 0x1090 | 0x10a0 | 0x10b0 => {
            if extopc == 0x108f {
                // no STY #IMM
                "?"
            } else {
                match extopc_b1 {
                    0x3 => "CMPD",
                    0xc => "CMPY",
                    0xe => "LDY",
                    0xf => "STY",
                    _ => "?",
                }
            }
        }
        0x10c0 | 0x10d0 | 0x10e0 | 0x10f0 => {
            if extopc == 0x10cf {
                // no STS #IMM
                "?"
            } else {
                match extopc_b1 {
                    0xe => "LDS",
                    0xf => "STS",
                    _ => "?",
                }
            }
        }
        0x1180 | 0x1190 | 0x11a0 | 0x11b0 => match extopc_b1 {
            0x3 => "CMPU",
            0xc => "CMPS",
            _ => "?",
        },
        _ => "?",
    }
}

fn exg_tfr_regname(v: u8) -> &'static str {
    match v {
        0b0000 => "D",
        0b0001 => "X",
        0b0010 => "Y",
        0b0011 => "U",
        0b0100 => "S",
        0b0101 => "PC",
        0b1000 => "A",
        0b1001 => "B",
        0b1010 => "CCR",
        0b1011 => "DPR",
        _ => "?",
    }
}

pub(crate) fn advance(id: &mut InstructionDecode) {
    if id.state != DecodeState::Fetching || id.bytes_fetched == 0 {
        return;
    }

    if id.bytes_required == 0 {
        // determining the addressing mode can take multiple passes:
        // a page 2/3 prefix means the opcode isn't complete until the
        // second byte, and an indexed mode isn't knowable until its
        // postbyte arrives. once the mode is in hand the total length
        // follows from it.
        match addr_mode(id) {
            ModeLookup::NeedMore => {}
            ModeLookup::Invalid => {
                // the postbyte names no legal mode; there is nothing
                // more to wait for, so finish with the marker now.
                id.bytes_required = id.bytes_fetched;
            }
            ModeLookup::Mode(mode) => {
                id.addrmode = crate::AddrMode::M6809(mode);
                id.bytes_required = 1 + mode.postbyte_count();
                if id.bytes[0] == 0x10 || id.bytes[0] == 0x11 {
                    id.bytes_required += 1;
                }
            }
        }
    }

    if id.bytes_fetched == id.bytes_required {
        format(id);
        id.state = DecodeState::Complete;
    }
}

fn format(id: &mut InstructionDecode) {
    // i is the index of the first postbyte/operand byte.
    let mut i = 1;
    let opc = if id.bytes[0] == 0x10 || id.bytes[0] == 0x11 {
        i = 2;
        page23_mnemonic(u16::from(id.bytes[0]) << 8 | u16::from(id.bytes[1]))
    } else {
        OPCODES_6809[id.bytes[0] as usize]
    };

    let mode = match id.addrmode {
        crate::AddrMode::M6809(mode) => mode,
        _ => {
            let _ = id.text.write_str("<?ADDRMODE?>");
            return;
        }
    };

    let pb = id.bytes[i];
    let index_reg = INDEX_REGNAMES[((pb >> 5) & 3) as usize];
    let (ind_open, ind_close) = if mode.indirect() { ("[", "]") } else { ("", "") };

    // relative modes record their offset here and resolve below.
    let mut reloff: Option<i16> = None;

    match mode {
        AddrMode::Inherent => {
            let _ = write!(id.text, "{}", opc);
        }
        AddrMode::Direct => {
            let _ = write!(id.text, "{} < ${:02X}", opc, id.bytes[i]);
        }
        AddrMode::Extended | AddrMode::ExtendedInd => {
            // extended indirect is really an indexed mode; the address
            // follows the index postbyte.
            let at = if mode == AddrMode::ExtendedInd { i + 1 } else { i };
            let _ = write!(
                id.text,
                "{} {}${:04X}{}",
                opc,
                ind_open,
                read_u16be(&id.bytes, at),
                ind_close
            );
        }
        AddrMode::Rel8 | AddrMode::Rel16 => {
            let s16 = if mode == AddrMode::Rel8 {
                id.bytes[i] as i8 as i16
            } else {
                read_u16be(&id.bytes, i) as i16
            };
            let _ = write!(id.text, "{} {}", opc, s16);
            reloff = Some(s16);
        }
        AddrMode::Imm8 => {
            let _ = write!(id.text, "{} #${:02X}", opc, id.bytes[i]);
        }
        AddrMode::Imm16 => {
            let _ = write!(id.text, "{} #${:04X}", opc, read_u16be(&id.bytes, i));
        }
        AddrMode::ZeroOff | AddrMode::ZeroOffInd => {
            let _ = write!(id.text, "{} {},{}{}", opc, ind_open, index_reg, ind_close);
        }
        AddrMode::ConstOff5
        | AddrMode::ConstOff8
        | AddrMode::ConstOff8Ind
        | AddrMode::ConstOff16
        | AddrMode::ConstOff16Ind => {
            let s16 = match mode {
                AddrMode::ConstOff5 => {
                    // sign-extend the low 5 bits of the postbyte.
                    ((pb & 0x1f) as i16) << 11 >> 11
                }
                AddrMode::ConstOff8 | AddrMode::ConstOff8Ind => id.bytes[i + 1] as i8 as i16,
                _ => read_u16be(&id.bytes, i + 1) as i16,
            };
            let _ = write!(
                id.text,
                "{} {}{},{}{}",
                opc, ind_open, s16, index_reg, ind_close
            );
        }
        AddrMode::AccOff | AddrMode::AccOffInd => {
            let acc = match pb & 0b1111 {
                0b0110 => "A",
                0b0101 => "B",
                0b1011 => "D",
                _ => "?",
            };
            let _ = write!(
                id.text,
                "{} {}{},{}{}",
                opc, ind_open, acc, index_reg, ind_close
            );
        }
        AddrMode::PostInc1 => {
            let _ = write!(id.text, "{} ,{}+", opc, index_reg);
        }
        AddrMode::PostInc2 | AddrMode::PostInc2Ind => {
            let _ = write!(id.text, "{} {},{}++{}", opc, ind_open, index_reg, ind_close);
        }
        AddrMode::PreDec1 => {
            let _ = write!(id.text, "{} ,-{}", opc, index_reg);
        }
        AddrMode::PreDec2 | AddrMode::PreDec2Ind => {
            let _ = write!(id.text, "{} {},--{}{}", opc, ind_open, index_reg, ind_close);
        }
        AddrMode::PcRel8 | AddrMode::PcRel8Ind | AddrMode::PcRel16 | AddrMode::PcRel16Ind => {
            let s16 = if mode == AddrMode::PcRel8 || mode == AddrMode::PcRel8Ind {
                id.bytes[i + 1] as i8 as i16
            } else {
                read_u16be(&id.bytes, i + 1) as i16
            };
            let _ = write!(
                id.text,
                "{} {}{},PCR{}",
                opc, ind_open, s16, ind_close
            );
            reloff = Some(s16);
        }
        AddrMode::ExgTfr => {
            let _ = write!(
                id.text,
                "{} {},{}",
                opc,
                exg_tfr_regname(pb >> 4),
                exg_tfr_regname(pb & 0xf)
            );
        }
        AddrMode::PshPul => {
            let _ = write!(id.text, "{} ", opc);
            for &(bit, name) in PSH_PUL_REGNAMES.iter() {
                if pb & bit != 0 {
                    let name = name.unwrap_or(
                        // the other stack pointer: U for the S-stack
                        // opcodes, S for the U-stack ones.
                        if id.bytes[0] == 0x34 || id.bytes[0] == 0x35 {
                            "U"
                        } else {
                            "S"
                        },
                    );
                    if pb & (bit - 1) != 0 {
                        let _ = id.text.write_str(",");
                    }
                    let _ = id.text.write_str(name);
                }
            }
        }
    }

    if let Some(off) = reloff {
        id.resolved_address = id.insn_address.wrapping_add(off as i32 as u32);
        id.resolved_address_valid = true;
    }
}
