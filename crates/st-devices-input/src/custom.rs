//! Behavioral emulation of programs uploaded into the controller's RAM.
//!
//! A handful of titles bypass the documented command set: they load a small
//! relocator with the memory-load command, execute it, stream in a main
//! program, and then talk a private protocol over the serial line. Instead
//! of emulating the 6301 itself, uploads are fingerprinted by checksum and
//! replaced with handlers that reproduce each known program's observable
//! byte behavior. Unrecognized uploads are inert.
//!
//! Execution runs in two stages: the common boot stage checksums the
//! incoming main program until it matches a registry entry, then that
//! entry's steady-state read/write behavior takes over. The only exits are
//! a hardware reset or a program-specific terminate byte, both of which
//! re-run the ROM boot path.

use crate::ikbd::{ButtonSource, IkbdController};

pub(crate) const CRC_SEED: u32 = 0xFFFF_FFFF;
const CRC_POLY: u32 = 0x04C1_1DB7;

/// Fold one byte into the running checksum, MSB first. This reproduces the
/// original fold exactly: the polynomial is applied whenever the data MSB
/// or the checksum MSB is set (both-set included), which is not the
/// textbook definition. The registry constants below were computed with
/// this fold, so it must not be "corrected".
pub(crate) fn crc32_add_byte(crc: &mut u32, byte: u8) {
    let mut c = byte;
    for _ in 0..8 {
        if u32::from(c & 0x80) ^ (*crc & 0x8000_0000) != 0 {
            *crc = (*crc << 1) ^ CRC_POLY;
        } else {
            *crc <<= 1;
        }
        c <<= 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProgramKind {
    FroggiesMenu,
    Transbeauce2Menu,
    DragonnelsMenu,
    ChaosAd,
    AudioSculptureColor,
    AudioSculptureMono,
}

impl ProgramKind {
    fn initial_state(self) -> ProgramState {
        match self {
            ProgramKind::FroggiesMenu => ProgramState::Froggies,
            ProgramKind::Transbeauce2Menu => ProgramState::Transbeauce2,
            ProgramKind::DragonnelsMenu => ProgramState::Dragonnels,
            ProgramKind::ChaosAd => ProgramState::ChaosAd {
                ignore_remaining: CHAOS_AD_KEY.len() as u8,
                key_index: 0,
                decoded: 0,
                ready_sent: false,
            },
            ProgramKind::AudioSculptureColor => ProgramState::AudioSculpture {
                mono: false,
                magic: false,
                reads: 0,
            },
            ProgramKind::AudioSculptureMono => ProgramState::AudioSculpture {
                mono: true,
                magic: false,
                reads: 0,
            },
        }
    }
}

#[derive(Debug)]
pub(crate) struct CustomProgram {
    /// Checksum of the bytes streamed by the memory-load command.
    pub load_crc: u32,
    /// Byte count and checksum of the main program streamed afterwards.
    pub main_len: u32,
    pub main_crc: u32,
    pub kind: ProgramKind,
    pub name: &'static str,
}

pub(crate) const CUSTOM_PROGRAMS: &[CustomProgram] = &[
    CustomProgram {
        load_crc: 0x2efb_11b1,
        main_len: 167,
        main_crc: 0xe711_0b6d,
        kind: ProgramKind::FroggiesMenu,
        name: "Froggies Over The Fence main menu",
    },
    CustomProgram {
        load_crc: 0xadb6_b503,
        main_len: 165,
        main_crc: 0x5617_c33c,
        kind: ProgramKind::Transbeauce2Menu,
        name: "Transbeauce 2 main menu",
    },
    CustomProgram {
        load_crc: 0x33c2_3cdf,
        main_len: 83,
        main_crc: 0xdf3e_5a88,
        kind: ProgramKind::DragonnelsMenu,
        name: "Dragonnels main menu",
    },
    CustomProgram {
        load_crc: 0x9ad7_fcdf,
        main_len: 109,
        main_crc: 0xa11d_8be5,
        kind: ProgramKind::ChaosAd,
        name: "Chaos A.D.",
    },
    CustomProgram {
        load_crc: 0xbc0c_206d,
        main_len: 91,
        main_crc: 0x119b_26ed,
        kind: ProgramKind::AudioSculptureColor,
        name: "Audio Sculpture (color)",
    },
    CustomProgram {
        load_crc: 0xbc0c_206d,
        main_len: 91,
        main_crc: 0x63b5_f4df,
        kind: ProgramKind::AudioSculptureMono,
        name: "Audio Sculpture (mono)",
    },
];

/// Byte-routing phase. This is the single source of truth: whatever phase
/// is active decides where every inbound byte goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecPhase {
    /// Normal command processing.
    Standard,
    /// A memory-load command is consuming raw payload bytes.
    Loading { dest: u16, remaining: u8, crc: u32 },
    /// A finished upload matched a known loader; waiting for Execute.
    BootMatched { entry: usize },
    /// A custom program owns the byte stream.
    Executing(ExecStage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecStage {
    /// The common relocator: checksums the incoming main program until
    /// length and checksum match a registry entry.
    Boot { crc: u32, count: u32 },
    /// The matched program's steady-state protocol.
    Main { entry: usize, program: ProgramState },
}

/// Per-program runtime state, the behavioral stand-in for the uploaded
/// code's RAM variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProgramState {
    Froggies,
    Transbeauce2,
    Dragonnels,
    ChaosAd {
        /// Key bytes echoed by the CPU that the decoder skips over.
        ignore_remaining: u8,
        key_index: u8,
        decoded: u32,
        ready_sent: bool,
    },
    AudioSculpture {
        mono: bool,
        magic: bool,
        reads: u8,
    },
}

impl IkbdController {
    /// Name of the custom program currently running its steady-state
    /// protocol, if any.
    pub fn running_program(&self) -> Option<&'static str> {
        match self.exec {
            ExecPhase::Executing(ExecStage::Main { entry, .. }) => Some(CUSTOM_PROGRAMS[entry].name),
            _ => None,
        }
    }
}

/// One raw payload byte of a pending memory load: written through the
/// memory map, folded into the checksum, and matched against the registry
/// when the transfer completes.
pub(crate) fn load_memory_byte(ctrl: &mut IkbdController, byte: u8) {
    let ExecPhase::Loading {
        mut dest,
        mut remaining,
        mut crc,
    } = ctrl.exec
    else {
        return;
    };

    crc32_add_byte(&mut crc, byte);
    if let Some(slot) = ctrl.maps.resolve_mut(dest) {
        *slot = byte;
    }
    dest = dest.wrapping_add(1);
    remaining -= 1;

    ctrl.exec = if remaining == 0 {
        match CUSTOM_PROGRAMS.iter().position(|p| p.load_crc == crc) {
            Some(entry) => ExecPhase::BootMatched { entry },
            None => ExecPhase::Standard,
        }
    } else {
        ExecPhase::Loading {
            dest,
            remaining,
            crc,
        }
    };
}

/// A byte written to the serial line while a custom program executes.
pub(crate) fn exec_write(ctrl: &mut IkbdController, byte: u8) {
    match ctrl.exec {
        ExecPhase::Executing(ExecStage::Boot { mut crc, mut count }) => {
            crc32_add_byte(&mut crc, byte);
            count += 1;

            let matched = CUSTOM_PROGRAMS
                .iter()
                .position(|p| p.main_len == count && p.main_crc == crc);
            ctrl.exec = match matched {
                Some(entry) => ExecPhase::Executing(ExecStage::Main {
                    entry,
                    program: CUSTOM_PROGRAMS[entry].kind.initial_state(),
                }),
                // Keep accumulating until a known program shows up.
                None => ExecPhase::Executing(ExecStage::Boot { crc, count }),
            };
        }
        ExecPhase::Executing(ExecStage::Main { entry, program }) => match program {
            ProgramState::Froggies => froggies_write(ctrl, byte),
            ProgramState::Transbeauce2 => {}
            ProgramState::Dragonnels => dragonnels_write(ctrl, byte),
            ProgramState::ChaosAd { .. } => chaos_ad_write(ctrl, entry, program, byte),
            ProgramState::AudioSculpture { .. } => {
                audio_sculpture_write(ctrl, entry, program, byte);
            }
        },
        _ => {}
    }
}

/// Give an executing program's read side a chance to emit. Called at the
/// end of every report cycle and after every key event, in addition to the
/// standard processing, never instead of it.
pub(crate) fn exec_read(ctrl: &mut IkbdController) {
    let ExecPhase::Executing(ExecStage::Main { entry, program }) = ctrl.exec else {
        return;
    };
    match program {
        ProgramState::Froggies | ProgramState::Dragonnels => {}
        ProgramState::Transbeauce2 => transbeauce2_read(ctrl),
        ProgramState::ChaosAd { .. } => chaos_ad_read(ctrl, entry, program),
        ProgramState::AudioSculpture { .. } => audio_sculpture_read(ctrl, entry, program),
    }
}

/// Froggies Over The Fence menu. Each request byte asks for a readback of
/// the program's RAM mirror: 1 = the vertical-axis byte, 4 = four bytes
/// ending with it. A byte with the top bit set terminates the program.
fn froggies_write(ctrl: &mut IkbdController, byte: u8) {
    if byte & 0x80 != 0 {
        ctrl.boot_rom(false);
        return;
    }

    let mut res80 = 0u8; // vertical axis
    let mut res81 = 0u8; // horizontal axis
    let mut res82 = 0u8; // left button in bit 7
    let res83 = 0xFC; // fixed filler, never interpreted

    if ctrl.mouse.delta_y < 0 {
        res80 = 0x7A;
    }
    if ctrl.mouse.delta_y > 0 {
        res80 = 0x06;
    }
    if ctrl.mouse.delta_x < 0 {
        res81 = 0x7A;
    }
    if ctrl.mouse.delta_x > 0 {
        res81 = 0x06;
    }
    if ctrl.left_button.contains(ButtonSource::MOUSE) {
        res82 |= 0x80;
    }

    // Cursor keys and keypad-0 alias the mouse.
    if ctrl.key_state[0x48] {
        res80 |= 0x7A;
    }
    if ctrl.key_state[0x50] {
        res80 |= 0x06;
    }
    if ctrl.key_state[0x4B] {
        res81 |= 0x7A;
    }
    if ctrl.key_state[0x4D] {
        res81 |= 0x06;
    }
    if ctrl.key_state[0x70] {
        res82 |= 0x80;
    }

    res80 |= res82;
    res81 |= res82;

    if byte == 1 {
        ctrl.queue(res80);
    } else if byte == 4 {
        ctrl.queue(res83);
        ctrl.queue(res82);
        ctrl.queue(res81);
        ctrl.queue(res80);
    }
}

/// Transbeauce II menu: one byte per report cycle with the joystick state,
/// cursor keys aliased onto the same bits, Help and Space on top.
fn transbeauce2_read(ctrl: &mut IkbdController) {
    let mut res = 0u8;

    if ctrl.key_state[0x48] {
        res |= 0x01;
    }
    if ctrl.key_state[0x50] {
        res |= 0x02;
    }
    if ctrl.key_state[0x4B] {
        res |= 0x04;
    }
    if ctrl.key_state[0x4D] {
        res |= 0x08;
    }
    if ctrl.key_state[0x62] {
        res |= 0x40;
    }
    if ctrl.key_state[0x39] {
        res |= 0x80;
    }

    res |= ctrl.joy.data[1].bits() & 0x8F;

    ctrl.queue(res);
}

/// Dragonnels menu: any written byte is answered with the vertical mouse
/// direction, or the left button.
fn dragonnels_write(ctrl: &mut IkbdController, _byte: u8) {
    let mut res = 0u8;

    if ctrl.mouse.delta_y < 0 {
        res = 0xFC;
    }
    if ctrl.mouse.delta_y > 0 {
        res = 0x04;
    }
    if ctrl.left_button.contains(ButtonSource::MOUSE) {
        res = 0x80;
    }

    ctrl.queue(res);
}

const CHAOS_AD_KEY: [u8; 8] = [0xCA, 0x0A, 0xBC, 0x00, 0xDE, 0xDE, 0xFE, 0xCA];
const CHAOS_AD_PAYLOAD_LEN: u32 = 6081;

/// Chaos A.D. protection decoder: announces readiness with 0xFE, skips the
/// echoed key block, then XOR-decodes a fixed-length payload byte by byte.
/// Once the payload is through, 0x08 terminates the program.
fn chaos_ad_write(ctrl: &mut IkbdController, entry: usize, program: ProgramState, byte: u8) {
    let ProgramState::ChaosAd {
        mut ignore_remaining,
        mut key_index,
        mut decoded,
        ready_sent,
    } = program
    else {
        return;
    };

    if ignore_remaining > 0 {
        ignore_remaining -= 1;
    } else if decoded < CHAOS_AD_PAYLOAD_LEN {
        decoded += 1;
        let plain = byte ^ CHAOS_AD_KEY[usize::from(key_index)];
        key_index = (key_index + 1) & 0x07;
        ctrl.queue(plain);
    } else {
        if byte == 0x08 {
            ctrl.boot_rom(false);
        }
        return;
    }

    ctrl.exec = ExecPhase::Executing(ExecStage::Main {
        entry,
        program: ProgramState::ChaosAd {
            ignore_remaining,
            key_index,
            decoded,
            ready_sent,
        },
    });
}

fn chaos_ad_read(ctrl: &mut IkbdController, entry: usize, program: ProgramState) {
    let ProgramState::ChaosAd {
        ignore_remaining,
        key_index,
        decoded,
        ready_sent,
    } = program
    else {
        return;
    };

    if !ready_sent {
        ctrl.queue(0xFE);
        ctrl.exec = ExecPhase::Executing(ExecStage::Main {
            entry,
            program: ProgramState::ChaosAd {
                ignore_remaining,
                key_index,
                decoded,
                ready_sent: true,
            },
        });
    }
}

/// Audio Sculpture key extraction: the magic byte 0x42 is answered with the
/// two key bytes, after which the program rides out two more read cycles
/// and terminates itself.
fn audio_sculpture_write(ctrl: &mut IkbdController, entry: usize, program: ProgramState, byte: u8) {
    let ProgramState::AudioSculpture { mono, magic, reads } = program else {
        return;
    };

    if byte == 0x42 {
        ctrl.queue(0x4B);
        ctrl.queue(0x13);
        ctrl.exec = ExecPhase::Executing(ExecStage::Main {
            entry,
            program: ProgramState::AudioSculpture {
                mono,
                magic: true,
                reads,
            },
        });
    }
}

/// The intro part waits for Space in color mode, or for any key in mono
/// mode (and still answers with the Space scancode).
fn audio_sculpture_read(ctrl: &mut IkbdController, entry: usize, program: ProgramState) {
    let ProgramState::AudioSculpture {
        mono,
        magic,
        mut reads,
    } = program
    else {
        return;
    };

    if magic {
        reads += 1;
        if reads == 2 {
            ctrl.boot_rom(false);
            return;
        }
        ctrl.exec = ExecPhase::Executing(ExecStage::Main {
            entry,
            program: ProgramState::AudioSculpture { mono, magic, reads },
        });
        return;
    }

    let any_key = ctrl.key_state.iter().any(|&down| down);
    if (mono && any_key) || ctrl.key_state[0x39] {
        ctrl.queue(0x39);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ikbd::{JoystickMode, MouseButton, MouseMode, RESET_BOOT_TICKS};
    use crate::joypad::JoyReg;

    fn booted_controller() -> IkbdController {
        let mut ctrl = IkbdController::new();
        for _ in 0..RESET_BOOT_TICKS {
            ctrl.tick();
        }
        drain(&mut ctrl);
        ctrl
    }

    fn drain(ctrl: &mut IkbdController) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(byte) = ctrl.pop_output() {
            out.push(byte);
        }
        out
    }

    fn install_main(ctrl: &mut IkbdController, kind: ProgramKind) {
        let entry = CUSTOM_PROGRAMS
            .iter()
            .position(|p| p.kind == kind)
            .expect("registered program");
        ctrl.exec = ExecPhase::Executing(ExecStage::Main {
            entry,
            program: kind.initial_state(),
        });
    }

    #[test]
    fn crc_fold_is_deterministic_and_order_sensitive() {
        let mut a = CRC_SEED;
        let mut b = CRC_SEED;
        for byte in [0x10u8, 0x80, 0xFF, 0x00, 0x37] {
            crc32_add_byte(&mut a, byte);
        }
        for byte in [0x37u8, 0x00, 0xFF, 0x80, 0x10] {
            crc32_add_byte(&mut b, byte);
        }
        assert_ne!(a, b);

        let mut a2 = CRC_SEED;
        for byte in [0x10u8, 0x80, 0xFF, 0x00, 0x37] {
            crc32_add_byte(&mut a2, byte);
        }
        assert_eq!(a, a2);
    }

    #[test]
    fn unrecognized_upload_is_inert_and_commands_resume() {
        let mut ctrl = booted_controller();

        // Load three arbitrary bytes into pad 0's scancode map.
        for byte in [0x20, 0xB0, 0x00, 3] {
            ctrl.receive_byte(byte);
        }
        for byte in [0x11, 0x22, 0x33] {
            ctrl.receive_byte(byte);
        }

        assert_eq!(ctrl.exec, ExecPhase::Standard);
        assert_eq!(ctrl.maps.pads[0].scancode_map[..3], [0x11, 0x22, 0x33]);

        // Execute with nothing staged is a NOP, and dispatch still works.
        for byte in [0x22, 0x00, 0x00] {
            ctrl.receive_byte(byte);
        }
        assert_eq!(ctrl.exec, ExecPhase::Standard);

        ctrl.receive_byte(0x87);
        assert_eq!(drain(&mut ctrl), [0xF6, 0x07, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn execute_enters_boot_stage_and_wrong_program_never_matches() {
        let mut ctrl = booted_controller();
        ctrl.exec = ExecPhase::BootMatched { entry: 2 };

        for byte in [0x22, 0x00, 0x80] {
            ctrl.receive_byte(byte);
        }
        assert!(matches!(
            ctrl.exec,
            ExecPhase::Executing(ExecStage::Boot { count: 0, .. })
        ));

        // 83 bytes of the wrong content: the Dragonnels length passes by
        // without a checksum match, so the boot stage keeps accumulating.
        for i in 0..83u8 {
            ctrl.receive_byte(i);
        }
        match ctrl.exec {
            ExecPhase::Executing(ExecStage::Boot { count, .. }) => assert_eq!(count, 83),
            other => panic!("expected boot stage, got {other:?}"),
        }
        assert_eq!(ctrl.running_program(), None);
        assert_eq!(drain(&mut ctrl), Vec::<u8>::new());
    }

    #[test]
    fn froggies_reports_mouse_and_keys_and_exits_on_negative_byte() {
        let mut ctrl = booted_controller();
        // The menu runs with the mouse reports off, so sampled deltas
        // survive the report cycle for the program to read.
        ctrl.receive_byte(0x12);
        install_main(&mut ctrl, ProgramKind::FroggiesMenu);

        // No movement, nothing pressed.
        ctrl.receive_byte(1);
        assert_eq!(drain(&mut ctrl), [0x00]);

        // Mouse moving up-left with the left button held.
        ctrl.inject_mouse_motion(-3, -2);
        ctrl.inject_mouse_button(MouseButton::Left, true);
        ctrl.tick();
        drain(&mut ctrl);

        ctrl.receive_byte(4);
        assert_eq!(drain(&mut ctrl), [0xFC, 0x80, 0xFA, 0xFA]);

        // Top bit set: program terminates and the ROM boots again.
        ctrl.receive_byte(0x80);
        assert_eq!(ctrl.running_program(), None);
        assert_eq!(ctrl.exec, ExecPhase::Standard);
        assert!(ctrl.mouse_mode() == MouseMode::Relative);
        assert!(ctrl.joystick_mode() == JoystickMode::Auto);
    }

    #[test]
    fn transbeauce2_read_merges_keys_and_joystick() {
        let mut ctrl = booted_controller();

        ctrl.inject_key(0x48); // cursor up pressed
        ctrl.inject_key(0x39); // space pressed
        ctrl.set_joy_register(JoyReg::Joy1, 0x0001); // fire
        drain(&mut ctrl);

        install_main(&mut ctrl, ProgramKind::Transbeauce2Menu);
        ctrl.tick();

        let out = drain(&mut ctrl);
        let reply = *out.last().expect("read handler should emit");
        assert_eq!(reply, 0x01 | 0x80);
    }

    #[test]
    fn dragonnels_answers_every_write_with_vertical_direction() {
        let mut ctrl = booted_controller();
        ctrl.receive_byte(0x12); // mouse reports off, deltas survive the cycle
        install_main(&mut ctrl, ProgramKind::DragonnelsMenu);

        ctrl.receive_byte(0x55);
        assert_eq!(drain(&mut ctrl), [0x00]);

        ctrl.inject_mouse_motion(0, -1);
        ctrl.tick();
        drain(&mut ctrl);
        ctrl.receive_byte(0x55);
        assert_eq!(drain(&mut ctrl), [0xFC]);

        ctrl.inject_mouse_button(MouseButton::Left, true);
        ctrl.tick();
        drain(&mut ctrl);
        ctrl.receive_byte(0x55);
        assert_eq!(drain(&mut ctrl), [0x80]);
    }

    #[test]
    fn chaos_ad_announces_skips_key_block_then_decodes() {
        let mut ctrl = booted_controller();
        install_main(&mut ctrl, ProgramKind::ChaosAd);

        // First read cycle announces readiness, later ones stay quiet.
        ctrl.tick();
        assert_eq!(drain(&mut ctrl), [0xFE]);
        ctrl.tick();
        assert_eq!(drain(&mut ctrl), Vec::<u8>::new());

        // The eight echoed key bytes are swallowed.
        for byte in CHAOS_AD_KEY {
            ctrl.receive_byte(byte);
        }
        assert_eq!(drain(&mut ctrl), Vec::<u8>::new());

        // Payload decodes against the rotating key.
        let cipher = [0xCA ^ 0x41, 0x0A ^ 0x42, 0xBC ^ 0x43];
        for byte in cipher {
            ctrl.receive_byte(byte);
        }
        assert_eq!(drain(&mut ctrl), [0x41, 0x42, 0x43]);
    }

    #[test]
    fn chaos_ad_terminates_on_exit_byte_after_payload() {
        let mut ctrl = booted_controller();
        let entry = CUSTOM_PROGRAMS
            .iter()
            .position(|p| p.kind == ProgramKind::ChaosAd)
            .expect("registered");
        ctrl.exec = ExecPhase::Executing(ExecStage::Main {
            entry,
            program: ProgramState::ChaosAd {
                ignore_remaining: 0,
                key_index: 0,
                decoded: CHAOS_AD_PAYLOAD_LEN,
                ready_sent: true,
            },
        });

        // Non-magic bytes after the payload do nothing.
        ctrl.receive_byte(0x55);
        assert_eq!(ctrl.running_program(), Some("Chaos A.D."));
        assert_eq!(drain(&mut ctrl), Vec::<u8>::new());

        ctrl.receive_byte(0x08);
        assert_eq!(ctrl.exec, ExecPhase::Standard);
        assert_eq!(ctrl.reset_countdown, RESET_BOOT_TICKS);
    }

    #[test]
    fn audio_sculpture_replies_to_magic_then_rides_out_two_reads() {
        let mut ctrl = booted_controller();
        install_main(&mut ctrl, ProgramKind::AudioSculptureColor);

        ctrl.receive_byte(0x41);
        assert_eq!(drain(&mut ctrl), Vec::<u8>::new());

        ctrl.receive_byte(0x42);
        assert_eq!(drain(&mut ctrl), [0x4B, 0x13]);

        ctrl.tick();
        assert_ne!(ctrl.exec, ExecPhase::Standard);
        ctrl.tick();
        assert_eq!(ctrl.exec, ExecPhase::Standard, "second read exits");
        assert_eq!(ctrl.reset_countdown, RESET_BOOT_TICKS);
    }

    #[test]
    fn audio_sculpture_intro_waits_for_space_or_any_key() {
        // Color build: only Space triggers the reply.
        let mut color = booted_controller();
        color.inject_key(0x1E);
        drain(&mut color);
        install_main(&mut color, ProgramKind::AudioSculptureColor);
        color.tick();
        assert_eq!(drain(&mut color), Vec::<u8>::new());

        color.exec = ExecPhase::Standard;
        color.inject_key(0x39);
        drain(&mut color);
        install_main(&mut color, ProgramKind::AudioSculptureColor);
        color.tick();
        assert_eq!(drain(&mut color), [0x39]);

        // Mono build: any pressed key does.
        let mut mono = booted_controller();
        mono.inject_key(0x1E);
        drain(&mut mono);
        install_main(&mut mono, ProgramKind::AudioSculptureMono);
        mono.tick();
        assert_eq!(drain(&mut mono), [0x39]);
    }
}
