//! Decoder tests: each checks that one encoding selects the intended
//! rule and produces the intended command record.
use base::prelude::*;

use crate::agu::RampRegisters;
use crate::decode::{
    decode, Commands, ControlRequest, DecodeContext, IoCommand, IoReadAction, MemWidth, PcUpdate,
};
use crate::regfile::{RegisterFile, RegisterWrite};
use crate::sreg::SregUpdate;

struct Fixture {
    regs: RegisterFile,
    sreg: Sreg,
    ramp: RampRegisters,
    pc: u32,
    sp: u16,
}

impl Fixture {
    fn new() -> Fixture {
        Fixture {
            regs: RegisterFile::new(),
            sreg: Sreg::ZERO,
            ramp: RampRegisters::default(),
            pc: 0x100,
            sp: 0x08ff,
        }
    }

    fn set_reg(&mut self, n: u8, value: u8) {
        self.regs
            .apply(&RegisterWrite::byte(RegisterAddress::new(n), value));
    }

    fn set_pair(&mut self, n: u8, value: u16) {
        self.regs
            .apply(&RegisterWrite::word(RegisterAddress::new(n), value));
    }

    fn decode(&self, bits: u16) -> Commands {
        decode(&DecodeContext {
            word: InstructionWord::from(bits),
            regs: &self.regs,
            sreg: self.sreg,
            ramp: self.ramp,
            pc: self.pc,
            sp: self.sp,
        })
    }
}

#[test]
fn test_unmatched_word_decodes_as_nop() {
    let fixture = Fixture::new();
    // LDS and JMP are two-word forms with no rule.
    for bits in [0x9000, 0x940c, 0x940e, 0x9200] {
        let commands = fixture.decode(bits);
        assert_eq!(commands, Commands::nop(), "{bits:04x}");
    }
}

#[test]
fn test_nop_advances_only() {
    let commands = Fixture::new().decode(0x0000);
    assert_eq!(commands.pc, PcUpdate::Advance);
    assert_eq!(commands.reg, None);
    assert_eq!(commands.flags, SregUpdate::NONE);
}

#[test]
fn test_add_selects_full_operands() {
    let mut fixture = Fixture::new();
    fixture.set_reg(16, 0x20);
    fixture.set_reg(17, 0x22);
    // add r16, r17
    let commands = fixture.decode(0x0f01);
    assert_eq!(commands.name, "add");
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::byte(RegisterAddress::new(16), 0x42))
    );
}

#[test]
fn test_adc_uses_the_carry_flag() {
    let mut fixture = Fixture::new();
    fixture.set_reg(16, 1);
    fixture.sreg = Sreg::ZERO.with(Flag::C, true);
    // adc r16, r16 (also the ROL encoding)
    let commands = fixture.decode(0x1f00);
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::byte(RegisterAddress::new(16), 3))
    );
}

#[test]
fn test_cp_writes_no_register() {
    let mut fixture = Fixture::new();
    fixture.set_reg(1, 5);
    fixture.set_reg(2, 5);
    // cp r1, r2
    let commands = fixture.decode(0x1412);
    assert_eq!(commands.name, "cp");
    assert_eq!(commands.reg, None);
    assert!(commands.flags.value.get(Flag::Z));
}

#[test]
fn test_cpc_zero_flag_is_sticky() {
    let mut fixture = Fixture::new();
    // Equal operands, but a previous cleared Z must keep Z cleared.
    fixture.set_reg(1, 5);
    fixture.set_reg(2, 5);
    fixture.sreg = Sreg::ZERO;
    let commands = fixture.decode(0x0412);
    assert!(!commands.flags.value.get(Flag::Z));
    assert!(commands.flags.mask.get(Flag::Z));

    fixture.sreg = Sreg::ZERO.with(Flag::Z, true);
    let commands = fixture.decode(0x0412);
    assert!(commands.flags.value.get(Flag::Z));
}

#[test]
fn test_subi_reads_the_high_half() {
    let mut fixture = Fixture::new();
    fixture.set_reg(16, 0x30);
    // subi r16, 0x23
    let commands = fixture.decode(0x5203);
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::byte(RegisterAddress::new(16), 0x0d))
    );
}

#[test]
fn test_ldi_loads_the_immediate() {
    let fixture = Fixture::new();
    // ldi r31, 0xff
    let commands = fixture.decode(0xefff);
    assert_eq!(commands.name, "ldi");
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::byte(RegisterAddress::new(31), 0xff))
    );
}

#[test]
fn test_com_forces_carry() {
    let mut fixture = Fixture::new();
    fixture.set_reg(0, 0x0f);
    // com r0
    let commands = fixture.decode(0x9400);
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::byte(RegisterAddress::new(0), 0xf0))
    );
    assert!(commands.flags.value.get(Flag::C));
    assert!(commands.flags.mask.get(Flag::C));
}

#[test]
fn test_inc_leaves_carry_alone() {
    let mut fixture = Fixture::new();
    fixture.set_reg(0, 0xff);
    // inc r0: wraps to zero but must not touch C or H.
    let commands = fixture.decode(0x9403);
    assert!(commands.flags.value.get(Flag::Z));
    assert!(!commands.flags.mask.get(Flag::C));
    assert!(!commands.flags.mask.get(Flag::H));
}

#[test]
fn test_swap_exchanges_nibbles_without_flags() {
    let mut fixture = Fixture::new();
    fixture.set_reg(20, 0xa5);
    // swap r20
    let commands = fixture.decode(0x9542);
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::byte(RegisterAddress::new(20), 0x5a))
    );
    assert_eq!(commands.flags, SregUpdate::NONE);
}

#[test]
fn test_adiw_operates_on_the_index_pair() {
    let mut fixture = Fixture::new();
    fixture.set_pair(24, 0x01ff);
    // adiw r25:r24, 1
    let commands = fixture.decode(0x9601);
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::word(RegisterAddress::new(24), 0x0200))
    );
}

#[test]
fn test_mul_writes_the_product_pair() {
    let mut fixture = Fixture::new();
    fixture.set_reg(3, 200);
    fixture.set_reg(4, 200);
    // mul r3, r4
    let commands = fixture.decode(0x9c34);
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::word(RegisterAddress::PRODUCT, 40000))
    );
}

#[test]
fn test_muls_selects_high_half_operands() {
    let mut fixture = Fixture::new();
    fixture.set_reg(16, 0xff); // -1
    fixture.set_reg(17, 2);
    // muls r16, r17
    let commands = fixture.decode(0x0201);
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::word(RegisterAddress::PRODUCT, 0xfffe))
    );
}

#[test]
fn test_fmul_selects_third_quarter_operands() {
    let mut fixture = Fixture::new();
    fixture.set_reg(16, 0x40); // 0.5 in Q7
    fixture.set_reg(17, 0x40);
    // fmul r16, r17
    let commands = fixture.decode(0x0309);
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::word(RegisterAddress::PRODUCT, 0x2000))
    );
}

#[test]
fn test_mov_and_movw() {
    let mut fixture = Fixture::new();
    fixture.set_reg(2, 0x7b);
    // mov r1, r2
    let commands = fixture.decode(0x2c12);
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::byte(RegisterAddress::new(1), 0x7b))
    );

    fixture.set_pair(30, 0x1234);
    // movw r1:r0, r31:r30
    let commands = fixture.decode(0x010f);
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::word(RegisterAddress::new(0), 0x1234))
    );
}

#[test]
fn test_push_predecrements() {
    let mut fixture = Fixture::new();
    fixture.set_reg(2, 0x99);
    // push r2
    let commands = fixture.decode(0x922f);
    let mem = commands.mem.unwrap();
    assert!(mem.write);
    assert_eq!(mem.address, u32::from(fixture.sp) - 1);
    assert_eq!(mem.data, 0x99);
    assert_eq!(commands.sp_delta, -1);
}

#[test]
fn test_pop_postincrements() {
    let fixture = Fixture::new();
    // pop r2
    let commands = fixture.decode(0x902f);
    let mem = commands.mem.unwrap();
    assert!(!mem.write);
    assert_eq!(mem.address, u32::from(fixture.sp));
    assert_eq!(mem.dest, Some(RegisterAddress::new(2)));
    assert_eq!(commands.sp_delta, 1);
}

#[test]
fn test_ld_x_postincrement_updates_the_pointer() {
    let mut fixture = Fixture::new();
    fixture.set_pair(26, 0x0800);
    // ld r4, X+
    let commands = fixture.decode(0x904d);
    let mem = commands.mem.unwrap();
    assert_eq!(mem.address, 0x0800);
    assert_eq!(mem.dest, Some(RegisterAddress::new(4)));
    assert_eq!(
        commands.pointer,
        Some(RegisterWrite::word(RegisterAddress::X, 0x0801))
    );
}

#[test]
fn test_ld_ramp_extends_the_address() {
    let mut fixture = Fixture::new();
    fixture.set_pair(26, 0x0800);
    fixture.ramp.x = 0x02;
    // ld r4, X
    let commands = fixture.decode(0x904c);
    assert_eq!(commands.mem.unwrap().address, 0x02_0800);
}

#[test]
fn test_std_uses_the_displacement() {
    let mut fixture = Fixture::new();
    fixture.set_pair(30, 0x0100);
    fixture.set_reg(3, 0x42);
    // std Z+5, r3
    let commands = fixture.decode(0x8235);
    let mem = commands.mem.unwrap();
    assert!(mem.write);
    assert_eq!(mem.address, 0x0105);
    assert_eq!(mem.data, 0x42);
    // The displaced form never writes the pointer back.
    assert_eq!(commands.pointer, None);
}

#[test]
fn test_displacement_zero_is_the_bare_form() {
    let mut fixture = Fixture::new();
    fixture.set_pair(28, 0x0200);
    // ld r1, Y
    let commands = fixture.decode(0x8018);
    assert_eq!(commands.mem.unwrap().address, 0x0200);
}

#[test]
fn test_lpm_addresses_code_space() {
    let mut fixture = Fixture::new();
    fixture.set_pair(30, 0x0123);
    // lpm r5, Z+
    let commands = fixture.decode(0x9055);
    let read = commands.pmem_read.unwrap();
    assert_eq!(read.byte_address, 0x0123);
    assert_eq!(read.dest, RegisterAddress::new(5));
    assert_eq!(
        read.pointer_update,
        Some(RegisterWrite::word(RegisterAddress::Z, 0x0124))
    );
    assert_eq!(commands.mem, None);
}

#[test]
fn test_bare_lpm_targets_r0() {
    let mut fixture = Fixture::new();
    fixture.set_pair(30, 0x0040);
    let commands = fixture.decode(0x95c8);
    let read = commands.pmem_read.unwrap();
    assert_eq!(read.dest, RegisterAddress::new(0));
    assert_eq!(read.pointer_update, None);
}

#[test]
fn test_rjmp_is_pc_relative() {
    let fixture = Fixture::new();
    // rjmp .-2 (k = -1): target is the same instruction.
    let commands = fixture.decode(0xcfff);
    assert_eq!(commands.pc, PcUpdate::Jump(fixture.pc));
    // rjmp .+4 (k = 2)
    let commands = fixture.decode(0xc002);
    assert_eq!(commands.pc, PcUpdate::Jump(fixture.pc + 3));
}

#[test]
fn test_rcall_pushes_the_return_address() {
    let fixture = Fixture::new();
    // rcall .+0
    let commands = fixture.decode(0xd000);
    assert_eq!(commands.pc, PcUpdate::Jump(fixture.pc + 1));
    let mem = commands.mem.unwrap();
    assert!(mem.write);
    assert_eq!(mem.width, MemWidth::Word);
    assert_eq!(mem.address, u32::from(fixture.sp) - 2);
    assert_eq!(mem.data, (fixture.pc + 1) as u16);
    assert_eq!(commands.sp_delta, -2);
}

#[test]
fn test_ijmp_jumps_to_z() {
    let mut fixture = Fixture::new();
    fixture.set_pair(30, 0x0456);
    let commands = fixture.decode(0x9409);
    assert_eq!(commands.name, "ijmp");
    assert_eq!(commands.pc, PcUpdate::Jump(0x0456));
    assert_eq!(commands.mem, None);
}

#[test]
fn test_branch_on_flag_state() {
    let mut fixture = Fixture::new();
    // brbs Z, .+4 (k = 2)
    fixture.sreg = Sreg::ZERO.with(Flag::Z, true);
    let commands = fixture.decode(0xf011);
    assert_eq!(commands.pc, PcUpdate::Jump(fixture.pc + 3));

    fixture.sreg = Sreg::ZERO;
    let commands = fixture.decode(0xf011);
    assert_eq!(commands.pc, PcUpdate::Advance);
    // brbc Z with Z clear takes the branch.
    let commands = fixture.decode(0xf411);
    assert_eq!(commands.pc, PcUpdate::Jump(fixture.pc + 3));
}

#[test]
fn test_branch_offset_is_signed() {
    let mut fixture = Fixture::new();
    // brbs C, .-2 (k = -1)
    fixture.sreg = Sreg::ZERO.with(Flag::C, true);
    let commands = fixture.decode(0xf3f8);
    assert_eq!(commands.pc, PcUpdate::Jump(fixture.pc));
}

#[test]
fn test_cpse_requests_a_skip_on_equality() {
    let mut fixture = Fixture::new();
    fixture.set_reg(1, 7);
    fixture.set_reg(2, 7);
    // cpse r1, r2
    let commands = fixture.decode(0x1012);
    assert!(commands.skip_next);
    assert_eq!(commands.flags, SregUpdate::NONE);

    fixture.set_reg(2, 8);
    assert!(!fixture.decode(0x1012).skip_next);
}

#[test]
fn test_sbrc_tests_the_register_bit() {
    let mut fixture = Fixture::new();
    fixture.set_reg(5, 0b0000_1000);
    // sbrc r5, 3: bit set, no skip.
    assert!(!fixture.decode(0xfc53).skip_next);
    // sbrs r5, 3: bit set, skip.
    assert!(fixture.decode(0xfe53).skip_next);
}

#[test]
fn test_bst_and_bld_move_the_t_flag() {
    let mut fixture = Fixture::new();
    fixture.set_reg(7, 0b0000_0100);
    // bst r7, 2
    let commands = fixture.decode(0xfa72);
    assert_eq!(commands.flags, SregUpdate::single(Flag::T, true));

    fixture.sreg = Sreg::ZERO.with(Flag::T, true);
    fixture.set_reg(8, 0);
    // bld r8, 0
    let commands = fixture.decode(0xf880);
    assert_eq!(
        commands.reg,
        Some(RegisterWrite::byte(RegisterAddress::new(8), 1))
    );
}

#[test]
fn test_bset_and_bclr_select_one_flag() {
    let fixture = Fixture::new();
    // sec (bset 0)
    let commands = fixture.decode(0x9408);
    assert_eq!(commands.flags, SregUpdate::single(Flag::C, true));
    // cli (bclr 7)
    let commands = fixture.decode(0x94f8);
    assert_eq!(commands.flags, SregUpdate::single(Flag::I, false));
}

#[test]
fn test_in_reads_the_port() {
    let fixture = Fixture::new();
    // in r0, 0x3f
    let commands = fixture.decode(0xb60f);
    assert_eq!(
        commands.io,
        Some(IoCommand::Read {
            address: 0x3f,
            action: IoReadAction::Store(RegisterAddress::new(0)),
        })
    );
}

#[test]
fn test_out_writes_the_port() {
    let mut fixture = Fixture::new();
    fixture.set_reg(16, 0xaa);
    // out 0x3f, r16
    let commands = fixture.decode(0xbf0f);
    assert_eq!(
        commands.io,
        Some(IoCommand::Write {
            address: 0x3f,
            value: 0xaa,
            mask: 0xff,
        })
    );
}

#[test]
fn test_sbi_writes_a_one_bit_mask() {
    let fixture = Fixture::new();
    // sbi 0x05, 2
    let commands = fixture.decode(0x9a2a);
    assert_eq!(
        commands.io,
        Some(IoCommand::Write {
            address: 0x05,
            value: 0b100,
            mask: 0b100,
        })
    );
    // cbi 0x05, 2
    let commands = fixture.decode(0x982a);
    assert_eq!(
        commands.io,
        Some(IoCommand::Write {
            address: 0x05,
            value: 0,
            mask: 0b100,
        })
    );
}

#[test]
fn test_sbic_defers_the_skip_to_the_port_read() {
    let fixture = Fixture::new();
    // sbic 0x09, 1
    let commands = fixture.decode(0x9949);
    assert_eq!(
        commands.io,
        Some(IoCommand::Read {
            address: 0x09,
            action: IoReadAction::SkipIfBitClear(1),
        })
    );
    assert!(!commands.skip_next);
}

#[test]
fn test_unimplemented_classes_are_tagged_noops() {
    let fixture = Fixture::new();
    let cases = [
        (0x9508, ControlRequest::Return),
        (0x9518, ControlRequest::ReturnFromInterrupt),
        (0x9588, ControlRequest::Sleep),
        (0x9598, ControlRequest::Break),
        (0x95a8, ControlRequest::WatchdogReset),
        (0x95e8, ControlRequest::StoreProgramMemory),
    ];
    for (bits, request) in cases {
        let commands = fixture.decode(bits);
        assert_eq!(commands.control, Some(request), "{bits:04x}");
        assert_eq!(commands.reg, None);
        assert_eq!(commands.mem, None);
        assert_eq!(commands.pc, PcUpdate::Advance);
    }
}

#[test]
fn test_rule_table_is_unambiguous_for_exact_words() {
    // Every exact-word rule must be reachable: no earlier wider rule
    // may shadow it.
    for (i, rule) in super::RULES.iter().enumerate() {
        if rule.mask != 0xffff {
            continue;
        }
        for earlier in &super::RULES[..i] {
            assert_ne!(
                rule.pattern & earlier.mask,
                earlier.pattern,
                "{} shadows {}",
                earlier.name,
                rule.name
            );
        }
    }
}

#[test]
fn test_every_pattern_is_within_its_mask() {
    for rule in super::RULES {
        assert_eq!(rule.pattern & rule.mask, rule.pattern, "{}", rule.name);
    }
}
