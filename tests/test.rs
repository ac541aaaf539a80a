use insndecode::{CpuFamily, DecodeError, DecodeState, InstructionDecode, MAX_BYTES};

fn test_display(family: CpuFamily, addr: u32, data: &[u8], expected: &'static str) {
    let mut insn = InstructionDecode::new(family);
    match insn.decode_slice(addr, data) {
        Ok(text) => {
            assert_eq!(text, expected, "bytes {:02x?}", data);
        }
        Err(e) => {
            panic!("failed to decode {:02x?}: {}", data, e);
        }
    }
    assert_eq!(insn.bytes_fetched(), data.len(), "length of {:?}", expected);
}

#[test]
fn test_decoder_always_terminates() {
    let families = &[
        CpuFamily::Mos6502,
        CpuFamily::Mos65c02,
        CpuFamily::M6800,
        CpuFamily::M6809,
        CpuFamily::M6809e,
        CpuFamily::Z80,
    ];
    for &family in families {
        for first in 0..=0xffu8 {
            let mut insn = InstructionDecode::new(family);
            insn.begin(0x1000, first);
            let mut pushes = 0;
            while insn.state() == DecodeState::Fetching {
                insn.push(0x00);
                pushes += 1;
                assert!(
                    pushes <= MAX_BYTES,
                    "runaway decode: {} opcode {:02x}",
                    family,
                    first
                );
            }
            let text = insn.complete().unwrap();
            assert!(text.len() > 0, "{} opcode {:02x}", family, first);
        }
    }
}

#[test]
fn test_6502_disassembly() {
    let f = CpuFamily::Mos6502;
    test_display(f, 0x1000, &[0x00], "BRK");
    test_display(f, 0x1001, &[0x05, 0x20], "ORA $20");
    test_display(f, 0x1003, &[0xac, 0x00, 0x30], "LDY $3000");
    test_display(f, 0x1006, &[0x10, 0x10], "BPL 16 <1018>");
    test_display(f, 0x2000, &[0xf0, 0x80], "BEQ -128 <1F82>");
    test_display(f, 0x0000, &[0x20, 0x34, 0x12], "JSR $1234");
    test_display(f, 0x0000, &[0x6c, 0x34, 0x12], "JMP ($1234)");
    test_display(f, 0x0000, &[0xa9, 0xff], "LDA #$FF");
    test_display(f, 0x0000, &[0xb1, 0x80], "LDA ($80),Y");
    test_display(f, 0x0000, &[0xea], "NOP");
    test_display(f, 0x0000, &[0x02], "?");
    // NMOS-only quirk in the table: no $ on zero-page EOR.
    test_display(f, 0x0000, &[0x45, 0x12], "EOR 12");
}

#[test]
fn test_65c02_disassembly() {
    let f = CpuFamily::Mos65c02;
    test_display(f, 0x1000, &[0x80, 0x04], "BRA 4 <1006>");
    test_display(f, 0x0000, &[0x45, 0x12], "EOR $12");
    test_display(f, 0x0000, &[0x64, 0x12], "STZ $12");
    test_display(f, 0x0000, &[0x04, 0x12], "TSB $12");
    test_display(f, 0x0000, &[0x12, 0x34], "ORA ($34)");
    test_display(f, 0x0000, &[0xf2, 0x34], "SBC ($34)");
    test_display(f, 0x0000, &[0x07, 0x12], "RMB0 $12");
    test_display(f, 0x0000, &[0xff, 0x12], "BBS7 $12");
    test_display(f, 0x0000, &[0xcb], "WAI");
    test_display(f, 0x0000, &[0xdb], "STP");
    test_display(f, 0x0000, &[0xda], "PHX");
    test_display(f, 0x0000, &[0x7c, 0x34], "JMP ($34,X)");
}

#[test]
fn test_6800_disassembly() {
    let f = CpuFamily::M6800;
    test_display(f, 0x1000, &[0x01], "NOP");
    test_display(f, 0x1000, &[0x16], "TAB");
    test_display(f, 0x1000, &[0x32], "PULA");
    test_display(f, 0x1000, &[0x3e], "WAI");
    test_display(f, 0x1000, &[0x20, 0xfd], "BRA -3 <0FFF>");
    test_display(f, 0x1000, &[0x8d, 0x10], "BSR 16 <1012>");
    test_display(f, 0x1000, &[0x86, 0x55], "LDAA #$55");
    test_display(f, 0x1000, &[0x8e, 0x12, 0x34], "LDS #$1234");
    test_display(f, 0x1000, &[0xce, 0xca, 0xfe], "LDX #$CAFE");
    test_display(f, 0x1000, &[0x96, 0x12], "LDAA $12");
    test_display(f, 0x1000, &[0x97, 0x12], "STAA $12");
    test_display(f, 0x1000, &[0xa6, 0x10], "LDAA 16,X");
    test_display(f, 0x1000, &[0xe7, 0xff], "STAB 255,X");
    test_display(f, 0x1000, &[0x7e, 0xc0, 0x00], "JMP $C000");
    test_display(f, 0x1000, &[0xb0, 0xca, 0xfe], "SUBA $CAFE");
    test_display(f, 0x1000, &[0x03], "?");
}

// the 6809E addressing-mode shakedown, one instruction per mode.
#[test]
fn test_6809_disassembly() {
    let f = CpuFamily::M6809e;
    test_display(f, 0x1000, &[0x40], "NEGA");
    test_display(f, 0x1001, &[0x0c, 0x10], "INC < $10");
    test_display(f, 0x1003, &[0x20, 0xfd], "BRA -3 <1000>");
    test_display(f, 0x1005, &[0x77, 0xca, 0xfe], "ASR $CAFE");
    test_display(f, 0x1008, &[0x8a, 0x5a], "ORA #$5A");
    test_display(f, 0x100a, &[0x30, 0b1000_0100], "LEAX ,X");
    test_display(f, 0x100c, &[0x30, 0b1001_0100], "LEAX [,X]");
    test_display(f, 0x100e, &[0x31, 0b0010_0001], "LEAY 1,Y");
    test_display(f, 0x1010, &[0x32, 0b1110_1000, 0xc0], "LEAS -64,S");
    test_display(f, 0x1013, &[0x33, 0b1101_1000, 0xc0], "LEAU [-64,U]");
    test_display(f, 0x1016, &[0xa0, 0b1010_1001, 0x01, 0x80], "SUBA 384,Y");
    test_display(f, 0x101a, &[0xa6, 0b1001_1001, 0x04, 0x00], "LDA [1024,X]");
    test_display(f, 0x101e, &[0xa7, 0b1100_0110], "STA A,U");
    test_display(f, 0x1020, &[0xa7, 0b1101_0110], "STA [A,U]");
    test_display(f, 0x1022, &[0xaa, 0b1010_0101], "ORA B,Y");
    test_display(f, 0x1024, &[0xac, 0b1110_1011], "CMPX D,S");
    test_display(f, 0x1026, &[0xa6, 0b1000_0000], "LDA ,X+");
    test_display(f, 0x1028, &[0x10, 0xae, 0b1000_0001], "LDY ,X++");
    test_display(f, 0x102b, &[0x10, 0xae, 0b1001_0001], "LDY [,X++]");
    test_display(f, 0x102e, &[0xa6, 0b1000_0010], "LDA ,-X");
    test_display(f, 0x1030, &[0x10, 0xae, 0b1000_0011], "LDY ,--X");
    test_display(f, 0x1033, &[0x10, 0xae, 0b1001_0011], "LDY [,--X]");
    test_display(f, 0x1036, &[0xe6, 0b1000_1100, 0x0a], "LDB 10,PCR <1040>");
    test_display(f, 0x1039, &[0xe6, 0b1001_1100, 0x0a], "LDB [10,PCR] <1043>");
    test_display(f, 0x103c, &[0xe6, 0b1000_1101, 0x7f, 0xff], "LDB 32767,PCR <903B>");
    test_display(f, 0x1040, &[0xe6, 0b1001_1101, 0x7f, 0xff], "LDB [32767,PCR] <903F>");
    test_display(f, 0x1044, &[0xa5, 0b1001_1111, 0xca, 0xfe], "BITA [$CAFE]");
    test_display(f, 0x1049, &[0x1f, 0x03], "TFR D,U");
    test_display(f, 0x1051, &[0x1e, 0x1b], "EXG X,DPR");
    test_display(f, 0x1053, &[0x34, 0b0100_0110], "PSHS A,B,U");
    test_display(f, 0x1055, &[0x37, 0b0100_0000], "PULU S");
    test_display(f, 0x8000, &[0x17, 0x20, 0x00], "LBSR 8192 <A000>");
}

#[test]
fn test_6809_page2_page3() {
    let f = CpuFamily::M6809;
    test_display(f, 0x1000, &[0x10, 0x3f], "SWI2");
    test_display(f, 0x1000, &[0x11, 0x3f], "SWI3");
    test_display(f, 0x1004, &[0x10, 0x27, 0x00, 0x10], "LBEQ 16 <1014>");
    test_display(f, 0x1000, &[0x10, 0x21, 0xff, 0xfe], "LBRN -2 <0FFE>");
    test_display(f, 0x1000, &[0x10, 0x83, 0x12, 0x34], "CMPD #$1234");
    test_display(f, 0x1000, &[0x10, 0x8e, 0x12, 0x34], "LDY #$1234");
    test_display(f, 0x1000, &[0x10, 0x9f, 0x12], "STY < $12");
    test_display(f, 0x1000, &[0x10, 0xbf, 0xca, 0xfe], "STY $CAFE");
    test_display(f, 0x1000, &[0x10, 0xce, 0x12, 0x34], "LDS #$1234");
    test_display(f, 0x1000, &[0x11, 0x83, 0x12, 0x34], "CMPU #$1234");
    test_display(f, 0x1000, &[0x11, 0x8c, 0x12, 0x34], "CMPS #$1234");
    // there is no STY immediate; the slot renders as unknown.
    test_display(f, 0x1000, &[0x10, 0x8f, 0x12, 0x34], "? #$1234");
}

#[test]
fn test_6809_invalid_postbyte() {
    let f = CpuFamily::M6809;
    // a reserved indexed postbyte encoding.
    test_display(f, 0x1000, &[0x30, 0b1000_1110], "<?ADDRMODE?>");
    // auto increment/decrement by 1 does not allow indirect.
    test_display(f, 0x1000, &[0xa6, 0b1001_0000], "<?ADDRMODE?>");
    test_display(f, 0x1000, &[0xa6, 0b1001_0010], "<?ADDRMODE?>");
}

#[test]
fn test_6809_undetermined_length_overflows() {
    // 0x10 0x00 never maps to an instruction, so the length stays
    // unknown until the byte buffer fills and the decode is forced to
    // complete with the overflow marker.
    let mut insn = InstructionDecode::new(CpuFamily::M6809);
    insn.begin(0x1000, 0x10);
    insn.push(0x00);
    for _ in 0..MAX_BYTES - 2 {
        assert!(insn.push(0x00));
        assert_eq!(insn.state(), DecodeState::Fetching);
    }
    assert!(!insn.push(0x00));
    assert_eq!(insn.complete(), Some("<decode overflow>"));
}

#[test]
fn test_z80_disassembly() {
    let f = CpuFamily::Z80;
    test_display(f, 0x1000, &[0x78], "LD A,B");
    test_display(f, 0x1001, &[0x0e, 0x55], "LD C,55h");
    test_display(f, 0x1003, &[0x56], "LD D,(HL)");
    test_display(f, 0x1004, &[0xdd, 0x5e, 5], "LD E,(IX+5)");
    test_display(f, 0x1007, &[0xfd, 0x66, 0xf6], "LD H,(IY-10)");
    test_display(f, 0x100a, &[0x77], "LD (HL),A");
    test_display(f, 0x100b, &[0xdd, 0x75, 127], "LD (IX+127),L");
    test_display(f, 0x100e, &[0xfd, 0x77, 0x9c], "LD (IY-100),A");
    test_display(f, 0x1011, &[0x36, 0xff], "LD (HL),FFh");
    test_display(f, 0x1013, &[0xdd, 0x36, 10, 0xa5], "LD (IX+10),A5h");
    test_display(f, 0x1017, &[0x0a], "LD A,(BC)");
    test_display(f, 0x1019, &[0x3a, 0x34, 0x12], "LD A,(1234h)");
    test_display(f, 0x101e, &[0x32, 0x67, 0x45], "LD (4567h),A");
    test_display(f, 0x1021, &[0xed, 0x57], "LD A,I");
    test_display(f, 0x1027, &[0xed, 0x4f], "LD R,A");
    test_display(f, 0x1029, &[0x01, 0x34, 0x12], "LD BC,1234h");
    test_display(f, 0x102c, &[0xdd, 0x21, 0x67, 0x45], "LD IX,4567h");
    test_display(f, 0x1030, &[0xfd, 0x21, 0xfe, 0xca], "LD IY,CAFEh");
    test_display(f, 0x1034, &[0x2a, 0xfe, 0xca], "LD HL,(CAFEh)");
    // the alternate HL encoding via the ED group.
    test_display(f, 0x1037, &[0xed, 0x6b, 0xbe, 0xba], "LD HL,(BABEh)");
    test_display(f, 0x103b, &[0xdd, 0x2a, 0x34, 0x12], "LD IX,(1234h)");
    test_display(f, 0x1043, &[0x22, 0x34, 0x12], "LD (1234h),HL");
    test_display(f, 0x1046, &[0xed, 0x73, 0x67, 0x45], "LD (4567h),SP");
    test_display(f, 0x104a, &[0xdd, 0x22, 0xfe, 0xca], "LD (CAFEh),IX");
    test_display(f, 0x1052, &[0xf9], "LD SP,HL");
    test_display(f, 0x1053, &[0xdd, 0xf9], "LD SP,IX");
    test_display(f, 0x1057, &[0xc5], "PUSH BC");
    test_display(f, 0x1058, &[0xdd, 0xe5], "PUSH IX");
    test_display(f, 0x105c, &[0xf1], "POP AF");
    test_display(f, 0x105d, &[0xdd, 0xe1], "POP IX");
    test_display(f, 0x1061, &[0xeb], "EX DE,HL");
    test_display(f, 0x1062, &[0x08], "EX AF,AF'");
    test_display(f, 0x1063, &[0xd9], "EXX");
    test_display(f, 0x1064, &[0xe3], "EX (SP),HL");
    test_display(f, 0x1065, &[0xdd, 0xe3], "EX (SP),IX");
    test_display(f, 0x1069, &[0xed, 0xa0], "LDI");
    test_display(f, 0x106b, &[0xed, 0xb0], "LDIR");
    test_display(f, 0x1073, &[0xed, 0xb1], "CPIR");
    test_display(f, 0x1079, &[0x80], "ADD B");
    test_display(f, 0x107a, &[0xc6, 0x10], "ADD 10h");
    test_display(f, 0x107c, &[0x86], "ADD (HL)");
    test_display(f, 0x107d, &[0xdd, 0x86, 100], "ADD (IX+100)");
    test_display(f, 0x1082, &[0xfd, 0x9e, 8], "SBC (IY+8)");
    test_display(f, 0x1085, &[0x39], "ADD HL,SP");
    test_display(f, 0x1086, &[0xed, 0x7a], "ADC HL,SP");
    test_display(f, 0x1088, &[0xed, 0x72], "SBC HL,SP");
    test_display(f, 0x108a, &[0xdd, 0x29], "ADD IX,IX");
    test_display(f, 0x108c, &[0xfd, 0x29], "ADD IY,IY");
    test_display(f, 0x108e, &[0x03], "INC BC");
    test_display(f, 0x108f, &[0xfd, 0x23], "INC IY");
    test_display(f, 0x0191, &[0x07], "RLCA");
    test_display(f, 0x1092, &[0xcb, 0x00], "RLC B");
    test_display(f, 0x1094, &[0xdd, 0xcb, 10, 0x06], "RLC (IX+10)");
    test_display(f, 0x1098, &[0xcb, 0b0100_1101], "BIT 1,L");
    test_display(f, 0x109a, &[0xdd, 0xcb, 0, 0b0111_0110], "BIT 6,(IX+0)");
    test_display(f, 0x109e, &[0xc3, 0xef, 0xbe], "JP BEEFh");
    test_display(f, 0x10a1, &[0xca, 0xad, 0xde], "JP Z,DEADh");
    test_display(f, 0x10a4, &[0x18, 0x00], "JR 2 <10A6>");
    test_display(f, 0x10a6, &[0x18, 0xfe], "JR 0 <10A6>");
    test_display(f, 0x10a8, &[0x18, 0xfc], "JR -2 <10A6>");
    test_display(f, 0x1000, &[0x10, 0x05], "DJNZ 7 <1007>");
    test_display(f, 0x10aa, &[0xe9], "JP (HL)");
    // JP (HL) is "PC <- HL", so the indexed form takes no displacement.
    test_display(f, 0x10ab, &[0xdd, 0xe9], "JP (IX)");
    test_display(f, 0x10ad, &[0xed, 0x4d], "RETI");
    test_display(f, 0x10af, &[0xdf], "RST 18h");
    test_display(f, 0x10b0, &[0xdb, 0x10], "IN A,(10h)");
    test_display(f, 0x10b2, &[0xed, 0x48], "IN C,(C)");
    test_display(f, 0x10b4, &[0xed, 0x61], "OUT (C),H");
    test_display(f, 0x10b6, &[0xed, 0x70], "IN Flags,(C)");
    test_display(f, 0x10b8, &[0xd3, 0x10], "OUT (10h),A");
    test_display(f, 0x10ba, &[0xed, 0x00], "?");
}

#[test]
fn test_resolved_address() {
    let mut insn = InstructionDecode::new(CpuFamily::Mos6502);
    insn.begin(0x1006, 0x10);
    assert_eq!(insn.resolved_address(), None);
    insn.push(0x10);
    assert_eq!(insn.resolved_address(), Some(0x1018));

    // a fresh instruction clears the old target.
    insn.begin(0x2000, 0xea);
    assert_eq!(insn.complete(), Some("NOP"));
    assert_eq!(insn.resolved_address(), None);
}

#[test]
fn test_begin_is_ignored_while_fetching() {
    let mut insn = InstructionDecode::new(CpuFamily::Mos6502);
    insn.begin(0x1003, 0xac);
    insn.begin(0x2000, 0x00);
    insn.push(0x00);
    insn.push(0x30);
    assert_eq!(insn.complete(), Some("LDY $3000"));
    assert_eq!(insn.instruction_address(), 0x1003);
}

#[test]
fn test_complete_is_idempotent() {
    let mut insn = InstructionDecode::new(CpuFamily::Mos6502);
    insn.begin(0x1000, 0xea);
    assert_eq!(insn.state(), DecodeState::Complete);
    assert_eq!(insn.complete(), Some("NOP"));
    assert_eq!(insn.complete(), Some("NOP"));
    // extra bytes while complete are not consumed.
    assert!(!insn.push(0x00));
    assert_eq!(insn.complete(), Some("NOP"));
}

#[test]
fn test_reset_abandons_fetch() {
    let mut insn = InstructionDecode::new(CpuFamily::Mos6502);
    insn.begin(0x1000, 0xac);
    assert_eq!(insn.state(), DecodeState::Fetching);
    insn.reset();
    assert_eq!(insn.state(), DecodeState::Idle);
    assert!(!insn.push(0x00));
    assert_eq!(insn.complete(), None);

    insn.begin(0x1000, 0xea);
    assert_eq!(insn.complete(), Some("NOP"));
}

#[test]
fn test_multi_pass_length_determination() {
    // page 2, then an indexed opcode, then the postbyte; the length is
    // only knowable once all three are in.
    let mut insn = InstructionDecode::new(CpuFamily::M6809);
    insn.begin(0x1000, 0x10);
    assert_eq!(insn.state(), DecodeState::Fetching);
    assert_eq!(insn.addr_mode(), insndecode::AddrMode::Invalid);
    insn.push(0xae);
    assert_eq!(insn.state(), DecodeState::Fetching);
    insn.push(0b1000_0100);
    assert_eq!(insn.complete(), Some("LDY ,X"));
    assert_eq!(
        insn.addr_mode(),
        insndecode::AddrMode::M6809(insndecode::m6809::AddrMode::ZeroOff)
    );
}

#[test]
fn test_exhausted_input() {
    let mut insn = InstructionDecode::new(CpuFamily::Z80);
    assert_eq!(
        insn.decode_slice(0x0100, &[0xdd]),
        Err(DecodeError::ExhaustedInput)
    );
    assert_eq!(
        insn.decode_slice(0x0100, &[]),
        Err(DecodeError::ExhaustedInput)
    );
    // the record is still usable afterwards.
    assert_eq!(
        insn.decode_slice(0x0100, &[0xdd, 0x21, 0x67, 0x45]),
        Ok("LD IX,4567h")
    );
}

#[test]
fn test_decode_reads_only_what_it_needs() {
    let mut insn = InstructionDecode::new(CpuFamily::Mos6502);
    let stream = [0xea, 0xac, 0x00, 0x30];
    assert_eq!(insn.decode_slice(0x1000, &stream), Ok("NOP"));
    assert_eq!(insn.bytes_fetched(), 1);
    assert_eq!(insn.decode_slice(0x1001, &stream[1..]), Ok("LDY $3000"));
    assert_eq!(insn.bytes_fetched(), 3);
}
