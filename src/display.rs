//! the rendered-instruction string type and the operand substitution engine
//! shared by the template-driven architectures (6502/65C02 and Z80).
//!
//! the 6800 and 6809 modules format directly with `write!`; they only use
//! [`InsnString`] from here.

use core::fmt;
use core::ops::Deref;

/// capacity of a rendered instruction, including the optional
/// `" <XXXX>"` resolved-address suffix.
pub const MAX_STRING: usize = 28;

/// a fixed-capacity ASCII string holding one rendered instruction.
///
/// writes past the capacity are silently dropped rather than reported as
/// errors; a sampled bus can always hand us garbage, and a truncated
/// rendering is more useful in a capture listing than a decode abort.
#[derive(Copy, Clone)]
pub struct InsnString {
    buf: [u8; MAX_STRING],
    len: u8,
}

impl InsnString {
    pub const fn new() -> Self {
        InsnString {
            buf: [0; MAX_STRING],
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn as_str(&self) -> &str {
        // only ever populated from `&str` data, so this cannot fail; the
        // empty-string fallback keeps the accessor total anyway.
        core::str::from_utf8(&self.buf[..self.len as usize]).unwrap_or("")
    }

}

impl fmt::Write for InsnString {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = MAX_STRING - self.len as usize;
        let take = s.len().min(room);
        // all content is ASCII, so a byte boundary is a char boundary.
        self.buf[self.len as usize..self.len as usize + take]
            .copy_from_slice(&s.as_bytes()[..take]);
        self.len += take as u8;
        Ok(())
    }
}

impl Deref for InsnString {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for InsnString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for InsnString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        <str as fmt::Debug>::fmt(self.as_str(), f)
    }
}

/// an operand placeholder recognized in a mnemonic template. each kind
/// consumes a fixed number of instruction-stream bytes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum OperandKind {
    /// one byte, two uppercase hex digits. any `$` prefix lives in the
    /// template text.
    U8Hex,
    /// two little-endian bytes, four uppercase hex digits.
    U16Hex,
    /// like `U8Hex` but with the Z80's trailing `h`.
    U8HexH,
    /// like `U16Hex` but with the Z80's trailing `h`.
    U16HexH,
    /// one signed byte, rendered in decimal. resolves a branch target of
    /// `insn_address + insn_length + offset` (6502 family).
    Branch8,
    /// one signed byte index displacement, rendered `+N` or `-N` with no
    /// padding (Z80 `(IX+d)` forms).
    IndexDisp8,
    /// one signed byte PC-relative offset, stored in the stream as
    /// `target - 2`; display adds the 2 back (Z80 `JR`/`DJNZ`).
    PcRel8,
}

impl OperandKind {
    pub(crate) fn size(self) -> usize {
        match self {
            OperandKind::U16Hex | OperandKind::U16HexH => 2,
            _ => 1,
        }
    }
}

/// per-architecture table of placeholder spellings, most specific first.
pub(crate) type TokenTable = &'static [(&'static str, OperandKind)];

/// find the next placeholder in `tmpl` at or after byte offset `from`.
/// returns the placeholder's start, one-past-end, and kind. table order
/// breaks ties at a single position, so longer spellings must come first.
pub(crate) fn next_token(
    tmpl: &str,
    from: usize,
    table: TokenTable,
) -> Option<(usize, usize, OperandKind)> {
    for pos in from..tmpl.len() {
        for &(pat, kind) in table {
            if tmpl[pos..].starts_with(pat) {
                return Some((pos, pos + pat.len(), kind));
            }
        }
    }
    None
}

/// the kind of the first placeholder in `tmpl`, if any.
pub(crate) fn first_token(tmpl: &str, table: TokenTable) -> Option<OperandKind> {
    next_token(tmpl, 0, table).map(|(_, _, kind)| kind)
}

/// total instruction-stream bytes consumed by the placeholders in `tmpl`.
pub(crate) fn operand_bytes(tmpl: &str, table: TokenTable) -> usize {
    let mut total = 0;
    let mut at = 0;
    while let Some((_, end, kind)) = next_token(tmpl, at, table) {
        total += kind.size();
        at = end;
    }
    total
}

/// everything needed to turn a template into a final rendering.
pub(crate) struct Expansion<'a> {
    pub template: &'a str,
    pub tokens: TokenTable,
    /// instruction bytes starting at the first operand byte.
    pub operands: &'a [u8],
    pub insn_address: u32,
    pub insn_length: usize,
}

/// substitute each placeholder in the template with its rendered operand,
/// consuming operand bytes left to right. returns the resolved branch
/// target if one of the placeholders implied one.
pub(crate) fn expand(out: &mut InsnString, exp: Expansion) -> Option<u32> {
    use fmt::Write;

    let mut resolved = None;
    let mut at = 0;
    let mut opr = 0;
    while let Some((start, end, kind)) = next_token(exp.template, at, exp.tokens) {
        let _ = out.write_str(&exp.template[at..start]);
        match kind {
            OperandKind::U8Hex => {
                let _ = write!(out, "{:02X}", exp.operands[opr]);
            }
            OperandKind::U8HexH => {
                let _ = write!(out, "{:02X}h", exp.operands[opr]);
            }
            OperandKind::U16Hex => {
                let _ = write!(out, "{:04X}", read_u16le(exp.operands, opr));
            }
            OperandKind::U16HexH => {
                let _ = write!(out, "{:04X}h", read_u16le(exp.operands, opr));
            }
            OperandKind::Branch8 => {
                let off = exp.operands[opr] as i8;
                let _ = write!(out, "{}", off);
                resolved = Some(
                    exp.insn_address
                        .wrapping_add(exp.insn_length as u32)
                        .wrapping_add(off as i32 as u32),
                );
            }
            OperandKind::IndexDisp8 => {
                let disp = exp.operands[opr] as i8;
                if disp < 0 {
                    let _ = write!(out, "-{}", -(disp as i16));
                } else {
                    let _ = write!(out, "+{}", disp);
                }
            }
            OperandKind::PcRel8 => {
                // the stream holds `target - 2`; assemblers make the same
                // adjustment for display. the addition truncates to i8.
                let off = (exp.operands[opr] as i8).wrapping_add(2);
                let _ = write!(out, "{}", off);
                resolved = Some(exp.insn_address.wrapping_add(off as i32 as u32));
            }
        }
        opr += kind.size();
        at = end;
    }
    let _ = out.write_str(&exp.template[at..]);
    resolved
}

pub(crate) fn read_u16le(buf: &[u8], i: usize) -> u16 {
    u16::from(buf[i]) | u16::from(buf[i + 1]) << 8
}

pub(crate) fn read_u16be(buf: &[u8], i: usize) -> u16 {
    u16::from(buf[i]) << 8 | u16::from(buf[i + 1])
}
