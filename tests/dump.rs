use x87_dump::{dump_with, RawEnvironment, Result, SnapshotSource};

/// Replays a fixed environment and records the restore calls.
#[derive(Default)]
struct RecordingSource {
    env: RawEnvironment,
    captures: usize,
    restores: Vec<RawEnvironment>,
}

impl SnapshotSource for RecordingSource {
    fn capture(&mut self) -> Result<RawEnvironment> {
        self.captures += 1;
        Ok(self.env)
    }

    fn restore(&mut self, env: &RawEnvironment) -> Result<()> {
        self.restores.push(*env);
        Ok(())
    }
}

#[test]
fn dump_with_captures_once_and_restores_the_captured_image() {
    let mut source = RecordingSource {
        env: RawEnvironment {
            control: 0x027F,
            status: 4 << 11,
            tag: 0x00FF,
            ..RawEnvironment::default()
        },
        ..RecordingSource::default()
    };

    let text = dump_with(&mut source, false).unwrap();

    assert_eq!(source.captures, 1);
    assert_eq!(source.restores, vec![source.env]);
    assert!(text.contains("FCW 027F"));
}

#[test]
fn dump_with_labels_the_report_with_the_call_site() {
    let mut source = RecordingSource::default();
    let text = dump_with(&mut source, true).unwrap();
    assert!(
        text.contains(&format!("From {} line", file!())),
        "unexpected label in:\n{text}"
    );
}

#[cfg(target_arch = "x86_64")]
#[test]
fn live_capture_pairs_stack_values_with_their_physical_registers() {
    use x87_dump::{decode, LiveFpu, Tag};

    // Push pi onto an empty stack: TOP becomes 7, so ST0 is physical R7 and
    // FNSAVE's first register slot must land there after de-rotation.
    unsafe {
        core::arch::asm!("fninit", "fldpi", options(nomem, nostack));
    }
    let mut source = LiveFpu;
    let env = source.capture().unwrap();
    let state = decode(&env);
    source.restore(&env).unwrap();

    let st0 = state.registers[0];
    assert_eq!(state.status.top, 7);
    assert_eq!(st0.physical_index, 7);
    assert_eq!(st0.tag, Tag::Valid);
    assert!(
        (st0.value - std::f64::consts::PI).abs() < 1e-15,
        "ST0 = {}",
        st0.value
    );
    for st in 1..8 {
        assert_eq!(state.registers[st].tag, Tag::Empty);
    }

    // Leave the unit with an empty stack.
    unsafe {
        core::arch::asm!("fninit", options(nomem, nostack));
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
#[test]
fn live_capture_reports_unsupported_hosts() {
    use x87_dump::{LiveFpu, SnapshotError};

    let err = dump_with(&mut LiveFpu, false).unwrap_err();
    assert!(matches!(err, SnapshotError::Unsupported { .. }));
}
