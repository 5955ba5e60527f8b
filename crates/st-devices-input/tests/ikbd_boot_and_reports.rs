use st_devices_input::{IkbdController, JoystickMode, MouseMode, ResetKind};

fn drain(ctrl: &mut IkbdController) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(byte) = ctrl.pop_output() {
        out.push(byte);
    }
    out
}

fn booted() -> IkbdController {
    let mut ctrl = IkbdController::new();
    for _ in 0..40 {
        ctrl.tick();
    }
    assert_eq!(drain(&mut ctrl), [0xF1]);
    ctrl
}

fn send(ctrl: &mut IkbdController, bytes: &[u8]) {
    for &byte in bytes {
        ctrl.receive_byte(byte);
    }
}

#[test]
fn boot_countdown_announces_rom_version_once() {
    let mut ctrl = IkbdController::new();
    for _ in 0..39 {
        ctrl.tick();
        assert!(!ctrl.has_output(), "no output until the countdown expires");
    }
    ctrl.tick();
    assert_eq!(drain(&mut ctrl), [0xF1]);

    ctrl.tick();
    assert_eq!(drain(&mut ctrl), Vec::<u8>::new());
}

#[test]
fn defaults_after_boot() {
    let ctrl = booted();
    assert_eq!(ctrl.mouse_mode(), MouseMode::Relative);
    assert_eq!(ctrl.joystick_mode(), JoystickMode::Auto);
    assert_eq!(ctrl.abs_position(), (0, 0));
    assert!(!ctrl.output_paused());
}

#[test]
fn status_report_packets() {
    let mut ctrl = booted();

    ctrl.receive_byte(0x87);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x07, 0, 0, 0, 0, 0, 0]);

    // Relative mode (the boot default).
    ctrl.receive_byte(0x88);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x08, 0, 0, 0, 0, 0, 0]);

    // Absolute mode reports its maxima back.
    send(&mut ctrl, &[0x09, 0x01, 0x40, 0x00, 0xC8]);
    ctrl.receive_byte(0x89);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x09, 0x01, 0x40, 0x00, 0xC8, 0, 0]);

    // Keycode mode reports its step distances.
    send(&mut ctrl, &[0x0A, 0x03, 0x04]);
    ctrl.receive_byte(0x8A);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x0A, 0x03, 0x04, 0, 0, 0, 0]);

    ctrl.receive_byte(0x8B);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x0B, 0x01, 0x01, 0, 0, 0, 0]);

    send(&mut ctrl, &[0x0C, 0x02, 0x03]);
    ctrl.receive_byte(0x8C);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x0C, 0x02, 0x03, 0, 0, 0, 0]);

    ctrl.receive_byte(0x8F);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x10, 0, 0, 0, 0, 0, 0]);
    ctrl.receive_byte(0x0F);
    ctrl.receive_byte(0x90);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x0F, 0, 0, 0, 0, 0, 0]);

    // Mouse currently in keycode mode, so it is "available".
    ctrl.receive_byte(0x92);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x00, 0, 0, 0, 0, 0, 0]);
    ctrl.receive_byte(0x12);
    ctrl.receive_byte(0x92);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x12, 0, 0, 0, 0, 0, 0]);

    ctrl.receive_byte(0x94);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x14, 0, 0, 0, 0, 0, 0]);
    ctrl.receive_byte(0x1A);
    ctrl.receive_byte(0x95);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x15, 0, 0, 0, 0, 0, 0]);

    ctrl.receive_byte(0x9A);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x1A, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn status_reports_are_idempotent() {
    let mut ctrl = booted();
    for opcode in [0x87, 0x88, 0x8B, 0x8C, 0x8F, 0x92, 0x94, 0x9A] {
        ctrl.receive_byte(opcode);
        let first = drain(&mut ctrl);
        ctrl.receive_byte(opcode);
        let second = drain(&mut ctrl);
        assert_eq!(first, second, "report {opcode:#04x} must be stable");
    }
}

#[test]
fn mouse_off_mode_report_is_just_the_header() {
    let mut ctrl = booted();
    ctrl.receive_byte(0x12);
    ctrl.receive_byte(0x88);
    // The ROM's mode report has no branch for the disabled mouse and sends
    // the bare status header.
    assert_eq!(drain(&mut ctrl), [0xF6]);
}

#[test]
fn unknown_commands_are_silent_noops() {
    let mut ctrl = booted();
    for byte in [0x00, 0x01, 0x42, 0x7F, 0x81, 0xF0, 0xFF] {
        ctrl.receive_byte(byte);
    }
    assert_eq!(drain(&mut ctrl), Vec::<u8>::new());

    // Dispatch still works afterwards.
    ctrl.receive_byte(0x87);
    assert_eq!(drain(&mut ctrl), [0xF6, 0x07, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn clock_set_and_read_round_trip() {
    let mut ctrl = booted();

    send(&mut ctrl, &[0x1B, 0x99, 0x12, 0x31, 0x23, 0x59, 0x58]);
    ctrl.receive_byte(0x1C);
    assert_eq!(drain(&mut ctrl), [0xFC, 0x99, 0x12, 0x31, 0x23, 0x59, 0x58]);
}

#[test]
fn clock_set_drops_invalid_bcd_bytes_individually() {
    let mut ctrl = booted();

    send(&mut ctrl, &[0x1B, 0x99, 0x12, 0x31, 0x23, 0x59, 0x58]);
    drain(&mut ctrl);

    // Only the month and hour bytes are valid BCD here; the rest keep
    // their previous values. No range check happens beyond that: month
    // 0x13 is stored as-is.
    send(&mut ctrl, &[0x1B, 0xAB, 0x13, 0x3A, 0x24, 0x5B, 0xFF]);
    ctrl.receive_byte(0x1C);
    assert_eq!(drain(&mut ctrl), [0xFC, 0x99, 0x13, 0x31, 0x24, 0x59, 0x58]);
}

#[test]
fn clock_does_not_advance_on_its_own() {
    let mut ctrl = booted();
    send(&mut ctrl, &[0x1B, 0x25, 0x08, 0x06, 0x12, 0x00, 0x30]);
    drain(&mut ctrl);

    for _ in 0..500 {
        ctrl.tick();
        ctrl.update_clock();
    }
    drain(&mut ctrl);

    ctrl.receive_byte(0x1C);
    assert_eq!(drain(&mut ctrl), [0xFC, 0x25, 0x08, 0x06, 0x12, 0x00, 0x30]);
}

#[test]
fn warm_reset_keeps_the_clock_cold_reset_clears_it() {
    let mut ctrl = booted();
    send(&mut ctrl, &[0x1B, 0x25, 0x08, 0x06, 0x12, 0x00, 0x30]);
    drain(&mut ctrl);

    ctrl.reset(ResetKind::Warm);
    ctrl.receive_byte(0x1C);
    assert_eq!(drain(&mut ctrl), [0xFC, 0x25, 0x08, 0x06, 0x12, 0x00, 0x30]);

    ctrl.reset(ResetKind::Cold);
    ctrl.receive_byte(0x1C);
    assert_eq!(drain(&mut ctrl), [0xFC, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn pause_mutes_reports_but_state_still_updates() {
    let mut ctrl = booted();

    ctrl.receive_byte(0x13);
    assert!(ctrl.output_paused());

    ctrl.inject_mouse_motion(5, 0);
    ctrl.tick();
    assert_eq!(drain(&mut ctrl), Vec::<u8>::new(), "reports are muted");
    // The muted cycle still consumed the delta and moved the internal
    // absolute position.
    assert_eq!(ctrl.abs_position(), (5, 0));

    // Any recognized command lifts the pause.
    ctrl.receive_byte(0x11);
    assert!(!ctrl.output_paused());

    ctrl.inject_mouse_motion(5, 0);
    ctrl.tick();
    assert_eq!(drain(&mut ctrl), [0xF8, 5, 0]);
}

#[test]
fn any_recognized_command_lifts_a_pause() {
    let mut ctrl = booted();

    ctrl.receive_byte(0x13);
    assert!(ctrl.output_paused());

    // Not just RESUME: an unrelated query does it too.
    ctrl.receive_byte(0x8B);
    assert!(!ctrl.output_paused());
    assert_eq!(drain(&mut ctrl), [0xF6, 0x0B, 0x01, 0x01, 0, 0, 0, 0]);
}
