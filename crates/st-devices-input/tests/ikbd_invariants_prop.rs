#![cfg(not(target_arch = "wasm32"))]

use proptest::prelude::*;
use st_devices_input::IkbdController;

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
    drain(&mut ctrl);
    ctrl
}

fn send(ctrl: &mut IkbdController, bytes: &[u8]) {
    for &byte in bytes {
        ctrl.receive_byte(byte);
    }
}

/// Complete commands that mutate reporting state but never enter the
/// memory-load phase, so a sequence of them always leaves the controller in
/// standard dispatch.
fn safe_command() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(vec![0x08]),
        proptest::collection::vec(any::<u8>(), 4).prop_map(|p| [vec![0x09], p].concat()),
        proptest::collection::vec(any::<u8>(), 2).prop_map(|p| [vec![0x0A], p].concat()),
        proptest::collection::vec(any::<u8>(), 2).prop_map(|p| [vec![0x0B], p].concat()),
        proptest::collection::vec(any::<u8>(), 2).prop_map(|p| [vec![0x0C], p].concat()),
        proptest::collection::vec(any::<u8>(), 5).prop_map(|p| [vec![0x0E], p].concat()),
        Just(vec![0x0F]),
        Just(vec![0x10]),
        Just(vec![0x11]),
        Just(vec![0x12]),
        Just(vec![0x14]),
        Just(vec![0x15]),
        Just(vec![0x16]),
        any::<u8>().prop_map(|a| vec![0x17, a]),
        Just(vec![0x1A]),
        any::<u8>().prop_map(|a| vec![0x07, a]),
    ]
}

proptest! {
    /// The internal absolute position can never leave its configured box,
    /// whatever motion the host reports.
    #[test]
    fn absolute_position_stays_clamped(
        moves in proptest::collection::vec((-5000i32..5000, -5000i32..5000), 0..64),
    ) {
        let mut ctrl = booted();
        send(&mut ctrl, &[0x09, 0x01, 0x40, 0x00, 0xC8]); // 320 x 200

        for (dx, dy) in moves {
            ctrl.inject_mouse_motion(dx, dy);
            ctrl.tick();
            drain(&mut ctrl);

            let (x, y) = ctrl.abs_position();
            prop_assert!((0..=320).contains(&x), "x = {x}");
            prop_assert!((0..=200).contains(&y), "y = {y}");
        }
    }

    /// Asking for the same setting twice with no state change in between
    /// yields byte-identical answers, whatever configuration preceded it.
    #[test]
    fn status_reports_are_idempotent_after_any_configuration(
        prefix in proptest::collection::vec(safe_command(), 0..16),
        opcode in proptest::sample::select(vec![
            0x87u8, 0x88, 0x89, 0x8A, 0x8B, 0x8C, 0x8F, 0x90, 0x92, 0x94, 0x95, 0x99, 0x9A,
        ]),
    ) {
        let mut ctrl = booted();
        for cmd in &prefix {
            send(&mut ctrl, cmd);
        }
        drain(&mut ctrl);

        ctrl.receive_byte(opcode);
        let first = drain(&mut ctrl);
        ctrl.receive_byte(opcode);
        let second = drain(&mut ctrl);
        prop_assert_eq!(first, second);
    }

    /// Arbitrary byte soup never wedges the engine: after flushing any
    /// pending load payload with filler, commands answer again.
    #[test]
    fn arbitrary_bytes_never_wedge_dispatch(
        soup in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let mut ctrl = booted();
        for byte in soup {
            ctrl.receive_byte(byte);
        }
        drain(&mut ctrl);

        // A memory-load payload is at most 255 bytes; unknown bytes are
        // NOPs in standard dispatch.
        for _ in 0..300 {
            ctrl.receive_byte(0x00);
        }
        drain(&mut ctrl);

        ctrl.receive_byte(0x87);
        let reply = drain(&mut ctrl);
        prop_assert_eq!(reply.len(), 8);
        prop_assert_eq!(reply[0], 0xF6);
        prop_assert_eq!(reply[1], 0x07);
    }

    /// Clock writes validate each byte independently; a read returns the
    /// valid bytes verbatim and keeps the old value where a byte was
    /// malformed.
    #[test]
    fn clock_accepts_and_drops_bytes_individually(bytes in proptest::collection::vec(any::<u8>(), 6)) {
        let is_bcd = |v: u8| v & 0x0F <= 0x09 && v & 0xF0 <= 0x90;

        let mut ctrl = booted();
        send(&mut ctrl, &[0x1B]);
        send(&mut ctrl, &bytes);

        let expected: Vec<u8> = bytes
            .iter()
            .map(|&v| if is_bcd(v) { v } else { 0 })
            .collect();

        ctrl.receive_byte(0x1C);
        let mut reply = drain(&mut ctrl);
        prop_assert_eq!(reply.remove(0), 0xFC);
        prop_assert_eq!(reply, expected);
    }
}
