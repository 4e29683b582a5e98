use x87_dump::{decode, RawEnvironment, Tag, FSAVE_IMAGE_SIZE};

fn patterned_register(seed: u8) -> [u8; 10] {
    let mut reg = [0u8; 10];
    for (i, b) in reg.iter_mut().enumerate() {
        *b = seed.wrapping_add(i as u8);
    }
    reg
}

#[test]
fn fsave_image_fields_sit_at_documented_offsets() {
    let mut image = [0u8; FSAVE_IMAGE_SIZE];
    image[0..2].copy_from_slice(&0x1234u16.to_le_bytes());
    image[4..6].copy_from_slice(&0x4567u16.to_le_bytes());
    image[8..10].copy_from_slice(&0x89ABu16.to_le_bytes());
    image[12..16].copy_from_slice(&0x1122_3344u32.to_le_bytes());
    image[16..18].copy_from_slice(&0x5566u16.to_le_bytes());
    image[18..20].copy_from_slice(&0x0765u16.to_le_bytes());
    image[20..24].copy_from_slice(&0x7788_99AAu32.to_le_bytes());
    image[24..26].copy_from_slice(&0xBBCCu16.to_le_bytes());
    for i in 0..8 {
        let start = 28 + i * 10;
        image[start..start + 10].copy_from_slice(&patterned_register(0x10 + i as u8));
    }

    let env = RawEnvironment::from_fsave_image(&image);
    assert_eq!(env.control, 0x1234);
    assert_eq!(env.status, 0x4567);
    assert_eq!(env.tag, 0x89AB);
    assert_eq!(env.instruction_offset, 0x1122_3344);
    assert_eq!(env.instruction_selector, 0x5566);
    assert_eq!(env.opcode, 0x0765);
    assert_eq!(env.operand_offset, 0x7788_99AA);
    assert_eq!(env.operand_selector, 0xBBCC);
    // This status word has TOP = 0, so stack and physical order coincide.
    for i in 0..8 {
        assert_eq!(env.registers[i], patterned_register(0x10 + i as u8));
    }
}

#[test]
fn fsave_register_slots_are_derotated_into_physical_order() {
    // FNSAVE stores ST0 first; with TOP = 7 that slot is physical R7.
    let mut image = [0u8; FSAVE_IMAGE_SIZE];
    image[4..6].copy_from_slice(&(7u16 << 11).to_le_bytes());
    for slot in 0..8 {
        let start = 28 + slot * 10;
        image[start..start + 10].copy_from_slice(&patterned_register(0x10 + slot as u8));
    }

    let env = RawEnvironment::from_fsave_image(&image);
    for slot in 0..8 {
        assert_eq!(env.registers[(slot + 7) & 7], patterned_register(0x10 + slot as u8));
    }

    // The inverse rotation puts each register back into its image slot.
    assert_eq!(env.to_fsave_image()[28..], image[28..]);
}

#[test]
fn nonzero_top_image_decodes_st0_from_the_first_register_slot() {
    let mut image = [0u8; FSAVE_IMAGE_SIZE];
    image[0..2].copy_from_slice(&0x037Fu16.to_le_bytes());
    image[4..6].copy_from_slice(&(7u16 << 11).to_le_bytes());
    image[8..10].copy_from_slice(&0x3FFFu16.to_le_bytes()); // R7 valid, rest empty
    // Slot 0 (ST0) holds 1.0.
    image[28..36].copy_from_slice(&(1u64 << 63).to_le_bytes());
    image[36..38].copy_from_slice(&0x3FFFu16.to_le_bytes());

    let state = decode(&RawEnvironment::from_fsave_image(&image));
    let st0 = state.registers[0];
    assert_eq!(state.status.top, 7);
    assert_eq!(st0.physical_index, 7);
    assert_eq!(st0.tag, Tag::Valid);
    assert_eq!(st0.value, 1.0);
    assert_eq!(st0.sign_exponent, 0x3FFF);
}

#[test]
fn fsave_image_round_trips_through_the_codec() {
    let mut env = RawEnvironment {
        control: 0x027F,
        status: (6 << 11) | 0x00C5,
        tag: 0x5AA5,
        instruction_offset: 0xDEAD_BEEF,
        instruction_selector: 0x0008,
        opcode: 0x05D9,
        operand_offset: 0xCAFE_F00D,
        operand_selector: 0x0010,
        registers: [[0u8; 10]; 8],
    };
    for i in 0..8 {
        env.registers[i] = patterned_register(0x40 + i as u8);
    }

    let restored = RawEnvironment::from_fsave_image(&env.to_fsave_image());
    assert_eq!(restored, env);
}

#[test]
fn reserved_image_bytes_are_written_as_zero() {
    let env = RawEnvironment::default();
    let image = env.to_fsave_image();
    // Upper halves of the seven environment dwords plus the pad after the
    // operand selector.
    for off in [2usize, 3, 6, 7, 10, 11, 26, 27] {
        assert_eq!(image[off], 0, "offset {off}");
    }
}
