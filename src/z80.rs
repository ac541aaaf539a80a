//! Z80 decoding.
//!
//! the Z80's prefixed groups (CB, ED, DD, FD) are handled by building an
//! instruction template first: the base mnemonic with operand
//! placeholders still in it, possibly with `HL` rewritten to `IX`/`IY`
//! for the index-register groups. the placeholders then tell us the
//! total instruction length, and once the operand bytes are in they are
//! substituted into the template for the final rendering.

use core::fmt::Write;

use crate::display::{self, first_token, operand_bytes, Expansion, InsnString, OperandKind, TokenTable};
use crate::{DecodeState, InstructionDecode};

/// how the instruction's operand bytes (if any) are interpreted,
/// according to the first placeholder in its template.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AddrMode {
    Implied,
    Imm8,
    Imm16,
    Disp8,
    PcRel8,
}

/// placeholder spellings. `XXXXh` must come before `XXh`, and both carry
/// their `h` so that the `XX` inside `EXX` is never mistaken for one.
static TOKENS: TokenTable = &[
    ("XXXXh", OperandKind::U16HexH),
    ("XXh", OperandKind::U8HexH),
    ("+ddd", OperandKind::IndexDisp8),
    ("rrrr", OperandKind::PcRel8),
];

static OPCODES_Z80: [&str; 256] = [
    "NOP",          "LD BC,XXXXh",  "LD (BC),A",    "INC BC",       "INC B",        "DEC B",        "LD B,XXh",     "RLCA",
    "EX AF,AF'",    "ADD HL,BC",    "LD A,(BC)",    "DEC BC",       "INC C",        "DEC C",        "LD C,XXh",     "RRCA",
    "DJNZ rrrr",    "LD DE,XXXXh",  "LD (DE),A",    "INC DE",       "INC D",        "DEC D",        "LD D,XXh",     "RLA",
    "JR rrrr",      "ADD HL,DE",    "LD A,(DE)",    "DEC DE",       "INC E",        "DEC E",        "LD E,XXh",     "RRA",
    "JR NZ,rrrr",   "LD HL,XXXXh",  "LD (XXXXh),HL","INC HL",       "INC H",        "DEC H",        "LD H,XXh",     "DAA",
    "JR Z,rrrr",    "ADD HL,HL",    "LD HL,(XXXXh)","DEC HL",       "INC L",        "DEC L",        "LD L,XXh",     "CPL",
    "JR NC,rrrr",   "LD SP,XXXXh",  "LD (XXXXh),A", "INC SP",       "INC (HL)",     "DEC (HL)",     "LD (HL),XXh",  "SCF",
    "JR C,rrrr",    "ADD HL,SP",    "LD A,(XXXXh)", "DEC SP",       "INC A",        "DEC A",        "LD A,XXh",     "CCF",
    "LD B,B",       "LD B,C",       "LD B,D",       "LD B,E",       "LD B,H",       "LD B,L",       "LD B,(HL)",    "LD B,A",
    "LD C,B",       "LD C,C",       "LD C,D",       "LD C,E",       "LD C,H",       "LD C,L",       "LD C,(HL)",    "LD C,A",
    "LD D,B",       "LD D,C",       "LD D,D",       "LD D,E",       "LD D,H",       "LD D,L",       "LD D,(HL)",    "LD D,A",
    "LD E,B",       "LD E,C",       "LD E,D",       "LD E,E",       "LD E,H",       "LD E,L",       "LD E,(HL)",    "LD E,A",
    "LD H,B",       "LD H,C",       "LD H,D",       "LD H,E",       "LD H,H",       "LD H,L",       "LD H,(HL)",    "LD H,A",
    "LD L,B",       "LD L,C",       "LD L,D",       "LD L,E",       "LD L,H",       "LD L,L",       "LD L,(HL)",    "LD L,A",
    "LD (HL),B",    "LD (HL),C",    "LD (HL),D",    "LD (HL),E",    "LD (HL),H",    "LD (HL),L",    "HALT",         "LD (HL),A",
    "LD A,B",       "LD A,C",       "LD A,D",       "LD A,E",       "LD A,H",       "LD A,L",       "LD A,(HL)",    "LD A,A",
    "ADD B",        "ADD C",        "ADD D",        "ADD E",        "ADD H",        "ADD L",        "ADD (HL)",     "ADD A",
    "ADC B",        "ADC C",        "ADC D",        "ADC E",        "ADC H",        "ADC L",        "ADC (HL)",     "ADC A",
    "SUB B",        "SUB C",        "SUB D",        "SUB E",        "SUB H",        "SUB L",        "SUB (HL)",     "SUB A",
    "SBC B",        "SBC C",        "SBC D",        "SBC E",        "SBC H",        "SBC L",        "SBC (HL)",     "SBC A",
    "AND B",        "AND C",        "AND D",        "AND E",        "AND H",        "AND L",        "AND (HL)",     "AND A",
    "XOR B",        "XOR C",        "XOR D",        "XOR E",        "XOR H",        "XOR L",        "XOR (HL)",     "XOR A",
    "OR B",         "OR C",         "OR D",         "OR E",         "OR H",         "OR L",         "OR (HL)",      "OR A",
    "CP B",         "CP C",         "CP D",         "CP E",         "CP H",         "CP L",         "CP (HL)",      "CP A",
    "RET NZ",       "POP BC",       "JP NZ,XXXXh",  "JP XXXXh",     "CALL NZ,XXXXh","PUSH BC",      "ADD XXh",      "RST 00h",
    "RET Z",        "RET",          "JP Z,XXXXh",   "extCB",        "CALL Z,XXXXh", "CALL XXXXh",   "ADC XXh",      "RST 08h",
    "RET NC",       "POP DE",       "JP NC,XXXXh",  "OUT (XXh),A",  "CALL NC,XXXXh","PUSH DE",      "SUB XXh",      "RST 10h",
    "RET C",        "EXX",          "JP C,XXXXh",   "IN A,(XXh)",   "CALL C,XXXXh", "extDD",        "SBC XXh",      "RST 18h",
    "RET PO",       "POP HL",       "JP PO,XXXXh",  "EX (SP),HL",   "CALL PO,XXXXh","PUSH HL",      "AND XXh",      "RST 20h",
    "RET PE",       "JP (HL)",      "JP PE,XXXXh",  "EX DE,HL",     "CALL PE,XXXXh","extED",        "XOR XXh",      "RST 28h",
    "RET P",        "POP AF",       "JP P,XXXXh",   "DI",           "CALL P,XXXXh", "PUSH AF",      "OR XXh",       "RST 30h",
    "RET M",        "LD SP,HL",     "JP M,XXXXh",   "EI",           "CALL M,XXXXh", "extFD",        "CP XXh",       "RST 38h",
];

// register 6 is special; see the CB group.
static LD_REGS: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];
static IO_REGS: [&str; 8] = ["B", "C", "D", "E", "H", "L", "?", "A"];
static LD_REGS16: [&str; 4] = ["BC", "DE", "HL", "SP"];

/// rewrite the first `HL` in a template to `IX` or `IY` as indicated by
/// the prefix byte `which`. a memory reference `(HL)` gains a `+ddd`
/// displacement placeholder, except for JP (HL), which is defined as
/// "PC <- HL" and NOT "PC <- (HL)", and thus is about the only irregular
/// Z80 instruction syntax. a template with no `HL` is copied unchanged;
/// that is incomplete decoding, and whether real silicon does the same
/// is anyone's guess.
fn hl_to_index(out: &mut InsnString, tmpl: &str, opc: u8, which: u8) {
    match tmpl.find("HL") {
        None => {
            let _ = out.write_str(tmpl);
        }
        Some(pos) => {
            let mem_ref = pos > 0 && tmpl.as_bytes()[pos - 1] == b'(';
            let _ = out.write_str(&tmpl[..pos]);
            let _ = out.write_str(if which == 0xdd { "IX" } else { "IY" });
            if mem_ref && opc != 0xe9 {
                let _ = out.write_str("+ddd");
            }
            let _ = out.write_str(&tmpl[pos + 2..]);
        }
    }
}

/// build the instruction template into `id.text`, resolving any prefix
/// groups. returns false when more opcode bytes are needed first.
fn build_template(id: &mut InstructionDecode) -> bool {
    let opc = id.bytes[0];

    if (opc == 0xdd || opc == 0xfd)
        // the CB sub-group is handled below.
        && id.bytes_fetched >= 2
        && id.bytes[1] != 0xcb
    {
        // groups DD and FD are all about substituting Ir for HL or
        // (Ir+d) for (HL); the base instruction is the second opcode
        // byte. ADD HL,rr already has the index register as its
        // destination, so that one is built substituted and then run
        // through the HL rewrite anyway, which turns its HL source
        // into the index register too (ADD IX,IX).
        let sub = id.bytes[1];
        if sub & 0b1100_1111 == 0b0000_1001 {
            let mut tbuf = InsnString::new();
            let _ = write!(
                tbuf,
                "ADD I{},{}",
                if opc == 0xdd { 'X' } else { 'Y' },
                LD_REGS16[((sub >> 4) & 3) as usize]
            );
            hl_to_index(&mut id.text, tbuf.as_str(), sub, opc);
        } else {
            hl_to_index(&mut id.text, OPCODES_Z80[sub as usize], sub, opc);
        }
        return true;
    }

    if opc == 0xed {
        // this group is a handful of instruction additions.
        if id.bytes_fetched < 2 {
            return false;
        }
        let sub = id.bytes[1];
        let reg16 = LD_REGS16[((sub >> 4) & 3) as usize];
        let ioreg = ((sub >> 3) & 7) as usize;
        if sub & 0b1100_1111 == 0b0100_1011 {
            let _ = write!(id.text, "LD {},(XXXXh)", reg16);
        } else if sub & 0b1100_1111 == 0b0100_0011 {
            let _ = write!(id.text, "LD (XXXXh),{}", reg16);
        } else if sub & 0b1100_1111 == 0b0100_1010 {
            let _ = write!(id.text, "ADC HL,{}", reg16);
        } else if sub & 0b1100_1111 == 0b0100_0010 {
            let _ = write!(id.text, "SBC HL,{}", reg16);
        } else if sub & 0b1100_0111 == 0b0100_0000 {
            let _ = write!(
                id.text,
                "IN {},(C)",
                if ioreg == 6 { "Flags" } else { IO_REGS[ioreg] }
            );
        } else if sub & 0b1100_0111 == 0b0100_0001 {
            let _ = write!(id.text, "OUT (C),{}", IO_REGS[ioreg]);
        } else {
            let _ = id.text.write_str(match sub {
                0x57 => "LD A,I",
                0x5f => "LD A,R",
                0x47 => "LD I,A",
                0x4f => "LD R,A",
                0xa0 => "LDI",
                0xb0 => "LDIR",
                0xa8 => "LDD",
                0xb8 => "LDDR",
                0xa1 => "CPI",
                0xb1 => "CPIR",
                0xa9 => "CPD",
                0xb9 => "CPDR",
                0x44 => "NEG",
                0x46 => "IM 0",
                0x56 => "IM 1",
                0x5e => "IM 2",
                0x6f => "RLD",
                0x67 => "RRD",
                0x4d => "RETI",
                0x45 => "RETN",
                0xa2 => "INI",
                0xb2 => "INIR",
                0xaa => "IND",
                0xba => "INDR",
                0xa3 => "OUTI",
                0xb3 => "OUTIR",
                0xab => "OUTD",
                0xbb => "OTDR",
                _ => "?",
            });
        }
        return true;
    }

    if opc == 0xcb || ((opc == 0xdd || opc == 0xfd) && id.bytes_fetched >= 2 && id.bytes[1] == 0xcb) {
        // the bit/rotate group, including its DD/FD substitutions. for
        // the prefixed forms the remaining opcode byte comes after the
        // displacement operand, so the full four bytes are needed
        // before the template is knowable.
        static OPCODES_CB: [&str; 32] = [
            "RLC ",   "RRC ",   "RL ",    "RR ",    "SLA ",   "SRA ",   "? ",     "SRL ",
            "BIT 0,", "BIT 1,", "BIT 2,", "BIT 3,", "BIT 4,", "BIT 5,", "BIT 6,", "BIT 7,",
            "RES 0,", "RES 1,", "RES 2,", "RES 3,", "RES 4,", "RES 5,", "RES 6,", "RES 7,",
            "SET 0,", "SET 1,", "SET 2,", "SET 3,", "SET 4,", "SET 5,", "SET 6,", "SET 7,",
        ];
        let sub = if opc == 0xcb {
            if id.bytes_fetched < 2 {
                return false;
            }
            id.bytes[1]
        } else {
            if id.bytes_fetched < 4 {
                return false;
            }
            id.bytes[3]
        };
        let mut tbuf = InsnString::new();
        let _ = write!(
            tbuf,
            "{}{}",
            OPCODES_CB[((sub >> 3) & 0x1f) as usize],
            LD_REGS[(sub & 7) as usize]
        );
        if opc == 0xcb {
            let _ = id.text.write_str(tbuf.as_str());
        } else {
            hl_to_index(&mut id.text, tbuf.as_str(), sub, opc);
        }
        return true;
    }

    if opc == 0xdd || opc == 0xfd {
        return false;
    }

    let _ = id.text.write_str(OPCODES_Z80[opc as usize]);
    true
}

pub(crate) fn advance(id: &mut InstructionDecode) {
    if id.state != DecodeState::Fetching || id.bytes_fetched == 0 {
        return;
    }

    if id.bytes_required == 0 {
        // try to get the template; failure just means another opcode
        // byte has to arrive first.
        if !build_template(id) {
            return;
        }

        // the template's placeholders now give us the operand sizes, so
        // the full length is the opcode byte count plus the operands.
        let mut required = 1;
        if id.bytes[0] == 0xcb || id.bytes[0] == 0xed {
            required += 1;
        } else if id.bytes[0] == 0xdd || id.bytes[0] == 0xfd {
            required += 1;
            if id.bytes_fetched >= 2 && id.bytes[1] == 0xcb {
                required += 1;
            }
        }
        required += operand_bytes(id.text.as_str(), TOKENS);
        id.bytes_required = required;

        id.addrmode = crate::AddrMode::Z80(match first_token(id.text.as_str(), TOKENS) {
            Some(OperandKind::U16Hex) | Some(OperandKind::U16HexH) => AddrMode::Imm16,
            Some(OperandKind::U8Hex) | Some(OperandKind::U8HexH) => AddrMode::Imm8,
            Some(OperandKind::IndexDisp8) => AddrMode::Disp8,
            Some(OperandKind::PcRel8) => AddrMode::PcRel8,
            _ => AddrMode::Implied,
        });
    }

    if id.bytes_fetched == id.bytes_required {
        format(id);
        id.state = DecodeState::Complete;
    }
}

fn format(id: &mut InstructionDecode) {
    // all the heavy lifting happened while building the template; now
    // the operand bytes are substituted into it left to right. the one
    // two-operand pair, LD (Ir+d),XXh, conveniently keeps its operands
    // in the stream in the same order we read them.
    let opr_byte = match id.bytes[0] {
        // for the DD/FD CB sub-group the displacement comes before the
        // final opcode byte, so it is still the first operand.
        0xcb | 0xed | 0xdd | 0xfd => 2,
        _ => 1,
    };

    let template = id.text;
    id.text.clear();
    let resolved = display::expand(
        &mut id.text,
        Expansion {
            template: template.as_str(),
            tokens: TOKENS,
            operands: &id.bytes[opr_byte..],
            insn_address: id.insn_address,
            insn_length: id.bytes_required,
        },
    );
    if let Some(addr) = resolved {
        id.resolved_address = addr;
        id.resolved_address_valid = true;
    }
}
