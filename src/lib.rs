//! # `insndecode`, an incremental disassembler for sampled 8-bit bus traffic
//!
//! a logic analyzer watching a microprocessor's bus sees an instruction one
//! byte at a time, in fetch order, and usually wants to annotate the capture
//! with disassembly as the bytes arrive. `insndecode` is the decoder for that
//! job: a small state machine that is handed `(address, byte)` pairs and
//! produces the rendered mnemonic-plus-operands string the moment the last
//! byte of an instruction shows up.
//!
//! four instruction set families are supported, selected once per stream:
//! MOS 6502 and 65C02, Motorola 6800, Motorola 6809/6809E, and Zilog Z80.
//! the prefixed architectures (6809 pages 2/3, Z80 CB/ED/DD/FD) cannot know
//! an instruction's length from its first byte, so the decoder is happy to
//! report "not determined yet" for a few bytes before settling.
//!
//! decoding is purely syntactic. undefined opcodes render as `"?"` rather
//! than failing, just as the silicon happily fetches them; an operand
//! pattern with no legal addressing mode renders as `"<?ADDRMODE?>"`; and a
//! stream that never resolves runs into an 8-byte bound and renders as
//! `"<decode overflow>"`. a decode always terminates.
//!
//! ## usage
//!
//! feed bytes as they are sampled:
//! ```
//! use insndecode::{CpuFamily, InstructionDecode};
//!
//! let mut insn = InstructionDecode::new(CpuFamily::Mos6502);
//! insn.begin(0x1003, 0xac);
//! insn.push(0x00);
//! insn.push(0x30);
//! assert_eq!(insn.complete(), Some("LDY $3000"));
//! ```
//!
//! branch-style instructions carry a resolved target suffix:
//! ```
//! use insndecode::{CpuFamily, InstructionDecode};
//!
//! let mut insn = InstructionDecode::new(CpuFamily::Mos6502);
//! insn.begin(0x1006, 0x10);
//! insn.push(0x10);
//! assert_eq!(insn.complete(), Some("BPL 16 <1018>"));
//! ```
//!
//! or decode from a buffer through [`InstructionDecode::decode_slice`],
//! which drives the same state machine from a [`yaxpeax_arch::Reader`]:
//! ```
//! use insndecode::{CpuFamily, InstructionDecode};
//!
//! let mut insn = InstructionDecode::new(CpuFamily::Z80);
//! assert_eq!(insn.decode_slice(0x0100, &[0xdd, 0x21, 0x67, 0x45]), Ok("LD IX,4567h"));
//! ```
//!
//! the record is reusable: `begin` resets it for the next instruction, and
//! there is no allocation anywhere, so one long-lived `InstructionDecode`
//! per stream is all a capture loop needs.
//!
//! ## `#![no_std]`
//!
//! `insndecode` supports `no_std` usage; the rendered string lives in a
//! fixed buffer inside the record.

#![no_std]

mod display;
pub mod m6502;
pub mod m6800;
pub mod m6809;
pub mod z80;

pub use display::MAX_STRING;

use yaxpeax_arch::{Reader, ReadError, U8Reader};

use display::InsnString;

/// the number of instruction bytes the decoder will buffer before giving
/// up and completing with the `"<decode overflow>"` marker. no legal
/// instruction on any supported family is longer than this.
pub const MAX_BYTES: usize = 8;

/// which processor's instruction set a stream should be decoded as.
///
/// the 6502 and 65C02 differ only in opcode table; the 6809 and 6809E
/// differ only in bus signals the decoder never sees. all six are kept
/// distinct so a capture can record exactly what it was watching.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum CpuFamily {
    Mos6502,
    Mos65c02,
    M6800,
    M6809,
    M6809e,
    Z80,
}

impl core::fmt::Display for CpuFamily {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(match self {
            CpuFamily::Mos6502 => "6502",
            CpuFamily::Mos65c02 => "65C02",
            CpuFamily::M6800 => "6800",
            CpuFamily::M6809 => "6809",
            CpuFamily::M6809e => "6809E",
            CpuFamily::Z80 => "Z80",
        })
    }
}

/// where a decode stands. transitions are monotonic within one
/// instruction: `begin` moves Idle/Complete to Fetching, and the
/// architecture's advance step moves Fetching to Complete.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum DecodeState {
    /// no instruction in progress.
    Idle,
    /// bytes are accumulating; the total length may not be known yet.
    Fetching,
    /// the rendered string is ready.
    Complete,
}

/// the addressing mode resolved for the current instruction, wrapping the
/// per-family mode sets. this only records how operand bytes were
/// interpreted for display; it says nothing about execution semantics.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AddrMode {
    /// not determined yet, or determined to be no legal mode at all.
    Invalid,
    M6502(m6502::AddrMode),
    M6800(m6800::AddrMode),
    M6809(m6809::AddrMode),
    Z80(z80::AddrMode),
}

/// errors from the pull-style convenience API. the incremental
/// `begin`/`push` path never fails; this only reports a reader that ran
/// out of data mid-instruction.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DecodeError {
    /// the reader was exhausted before the instruction completed.
    ExhaustedInput,
}

impl From<ReadError> for DecodeError {
    fn from(_e: ReadError) -> Self {
        DecodeError::ExhaustedInput
    }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use yaxpeax_arch::DecodeError;
        f.write_str(self.description())
    }
}

impl yaxpeax_arch::DecodeError for DecodeError {
    fn data_exhausted(&self) -> bool {
        *self == DecodeError::ExhaustedInput
    }
    fn bad_opcode(&self) -> bool {
        false
    }
    fn bad_operand(&self) -> bool {
        false
    }
    fn description(&self) -> &'static str {
        match self {
            DecodeError::ExhaustedInput => "exhausted input",
        }
    }
}

/// one instruction decode stream.
///
/// the record owns everything about the instruction currently being
/// gathered: the state, the raw bytes so far, the resolved addressing
/// mode, and the rendered output. it has a fixed maximum size and is
/// reset in place by [`InstructionDecode::begin`], so a caller keeps one
/// per stream for the life of a capture. streams share nothing, so
/// decoding several buses concurrently is just several records.
#[derive(Clone, Debug)]
pub struct InstructionDecode {
    family: CpuFamily,
    state: DecodeState,
    insn_address: u32,
    resolved_address: u32,
    resolved_address_valid: bool,
    addrmode: AddrMode,
    /// total bytes this instruction needs; 0 means "not known yet".
    bytes_required: usize,
    bytes_fetched: usize,
    bytes: [u8; MAX_BYTES],
    text: InsnString,
}

impl InstructionDecode {
    pub fn new(family: CpuFamily) -> Self {
        InstructionDecode {
            family,
            state: DecodeState::Idle,
            insn_address: 0,
            resolved_address: 0,
            resolved_address_valid: false,
            addrmode: AddrMode::Invalid,
            bytes_required: 0,
            bytes_fetched: 0,
            bytes: [0; MAX_BYTES],
            text: InsnString::new(),
        }
    }

    pub fn family(&self) -> CpuFamily {
        self.family
    }

    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// the address the current (or last completed) instruction started at.
    pub fn instruction_address(&self) -> u32 {
        self.insn_address
    }

    pub fn bytes_fetched(&self) -> usize {
        self.bytes_fetched
    }

    /// the addressing mode resolved so far. [`AddrMode::Invalid`] while
    /// the mode is still undetermined.
    pub fn addr_mode(&self) -> AddrMode {
        self.addrmode
    }

    /// the computed branch/reference target, once a completed decode has
    /// one (relative branches and PC-relative operands).
    pub fn resolved_address(&self) -> Option<u32> {
        if self.resolved_address_valid {
            Some(self.resolved_address)
        } else {
            None
        }
    }

    /// abandon any instruction in progress and return to Idle. a capture
    /// loop uses this when it loses sync with the fetch qualifier.
    pub fn reset(&mut self) {
        self.state = DecodeState::Idle;
    }

    /// start decoding a new instruction whose first byte is `byte`,
    /// fetched from `addr`.
    ///
    /// valid from Idle or Complete; a call while Fetching is ignored, as
    /// an in-progress decode cannot be restarted mid-stream. one advance
    /// step runs immediately, so single-byte instructions complete here.
    pub fn begin(&mut self, addr: u32, byte: u8) {
        if self.state == DecodeState::Fetching {
            return;
        }
        self.state = DecodeState::Fetching;
        self.insn_address = addr;
        self.resolved_address = 0;
        self.resolved_address_valid = false;
        self.addrmode = AddrMode::Invalid;
        self.bytes_required = 0;
        self.bytes_fetched = 1;
        self.bytes[0] = byte;
        self.text.clear();
        self.step();
    }

    /// feed the next byte of the instruction begun with [`begin`].
    ///
    /// returns whether a fetching step was advanced. a call while not
    /// Fetching does nothing and returns false. if the byte buffer is
    /// already full the decode is forced Complete with the
    /// `"<decode overflow>"` marker, also returning false.
    ///
    /// [`begin`]: InstructionDecode::begin
    pub fn push(&mut self, byte: u8) -> bool {
        use core::fmt::Write;

        if self.state != DecodeState::Fetching {
            return false;
        }
        if self.bytes_fetched == MAX_BYTES {
            self.text.clear();
            let _ = self.text.write_str("<decode overflow>");
            self.state = DecodeState::Complete;
            return false;
        }
        self.bytes[self.bytes_fetched] = byte;
        self.bytes_fetched += 1;
        self.step()
    }

    /// the rendered instruction, once the decode is Complete. repeated
    /// calls return the same string; nothing is consumed.
    pub fn complete(&self) -> Option<&str> {
        if self.state == DecodeState::Complete {
            Some(self.text.as_str())
        } else {
            None
        }
    }

    /// decode one instruction starting at `addr` by pulling bytes from a
    /// reader until the state machine completes.
    ///
    /// overflow is not an error here: the marker string is a successful
    /// decode like any other. only reader exhaustion fails.
    pub fn decode<T: Reader<u32, u8>>(
        &mut self,
        addr: u32,
        words: &mut T,
    ) -> Result<&str, DecodeError> {
        // a failed decode can leave the record mid-fetch; a fresh pull
        // always starts a fresh instruction.
        self.reset();
        let byte = words.next()?;
        self.begin(addr, byte);
        while self.state == DecodeState::Fetching {
            let byte = words.next()?;
            self.push(byte);
        }
        Ok(self.text.as_str())
    }

    /// decode one instruction from the front of a byte slice.
    ///
    /// this is just [`InstructionDecode::decode`] over a
    /// [`yaxpeax_arch::U8Reader`].
    pub fn decode_slice(&mut self, addr: u32, data: &[u8]) -> Result<&str, DecodeError> {
        self.decode(addr, &mut U8Reader::new(data))
    }

    /// run one advance step of the selected architecture, then take care
    /// of the driver-level bookkeeping: when a step carries the decode to
    /// Complete with a resolved target in hand, the `" <XXXX>"` suffix is
    /// appended to the rendering.
    fn step(&mut self) -> bool {
        use core::fmt::Write;

        let was_fetching = self.state == DecodeState::Fetching;
        match self.family {
            CpuFamily::Mos6502 | CpuFamily::Mos65c02 => m6502::advance(self),
            CpuFamily::M6800 => m6800::advance(self),
            CpuFamily::M6809 | CpuFamily::M6809e => m6809::advance(self),
            CpuFamily::Z80 => z80::advance(self),
        }
        if was_fetching {
            if self.state == DecodeState::Complete && self.resolved_address_valid {
                let _ = write!(self.text, " <{:04X}>", self.resolved_address);
            }
            true
        } else {
            false
        }
    }
}
