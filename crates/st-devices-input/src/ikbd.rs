use std::collections::VecDeque;

use bitflags::bitflags;

use crate::custom::{self, ExecPhase, ExecStage, CRC_SEED};
use crate::joypad::{InputMaps, JoyReg, JoyState};

/// Commands park incoming bytes here until their parameter count is met.
/// Bytes arriving while the buffer is full are lost.
pub(crate) const INPUT_BUFFER_LEN: usize = 8;

/// Report cycles between a reset and the boot-complete byte. Commands
/// received inside this window trigger the compatibility quirks handled in
/// the individual command handlers.
pub(crate) const RESET_BOOT_TICKS: u16 = 40;

/// ROM version byte emitted once the post-reset self test completes. Only
/// very early units reported 0xF0; software waits for 0xF1.
pub(crate) const ROM_VERSION: u8 = 0xF1;

/// Seed for the absolute-mouse button edge memory so that neither button
/// reports an "up" edge on the first interrogation.
const ABS_PREV_BUTTONS: u8 = 0x02 | 0x08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseMode {
    Off,
    /// Signed 3-byte delta packets.
    Relative,
    /// Position tracked internally, reported only on interrogation.
    Absolute,
    /// Movement translated to cursor-key press/release pairs.
    Cursor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoystickMode {
    Off,
    /// 2-byte change packets per lane.
    Auto,
    /// Compact 2-byte state packet every cycle, all other reports muted.
    Monitoring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    /// Power-on reset; also clears the time-of-day clock.
    Cold,
    /// Reset line or reset command; the clock survives.
    Warm,
}

/// Host mouse buttons. Middle/Side/Extra only ever report as key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Side,
    Extra,
}

impl MouseButton {
    fn mask(self) -> u8 {
        match self {
            MouseButton::Right => 0x01,
            MouseButton::Left => 0x02,
            MouseButton::Middle => 0x04,
            MouseButton::Side => 0x08,
            MouseButton::Extra => 0x10,
        }
    }
}

bitflags! {
    /// Which input source holds a logical mouse button down. The sources
    /// combine with OR so the duplicated joystick-1 fire button can press
    /// the same logical button as the pointer device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct ButtonSource: u8 {
        const MOUSE = 0x01;
        const JOYSTICK = 0x02;
    }
}

bitflags! {
    /// Mouse button action configuration (command 0x07).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct MouseAction: u8 {
        /// Button press emits an absolute position report.
        const REPORT_PRESS = 0x01;
        /// Button release emits an absolute position report.
        const REPORT_RELEASE = 0x02;
        /// Buttons report as key codes instead.
        const BUTTONS_AS_KEYS = 0x04;
    }
}

impl ButtonSource {
    pub(crate) fn down(self) -> bool {
        !self.is_empty()
    }
}

#[derive(Debug)]
pub(crate) struct AbsMouse {
    pub x: i32,
    pub y: i32,
    pub max_x: i32,
    pub max_y: i32,
    /// Button mask from the previous interrogation, for the edge nibble.
    pub prev_buttons: u8,
}

impl Default for AbsMouse {
    fn default() -> Self {
        // The limits are placeholders: software must issue the
        // absolute-mode command (which sets real maxima) before they are
        // ever used.
        Self {
            x: 0,
            y: 0,
            max_x: 320,
            max_y: 200,
            prev_buttons: ABS_PREV_BUTTONS,
        }
    }
}

#[derive(Debug)]
pub(crate) struct MouseState {
    /// Delta sampled from the host at the last report cycle.
    pub delta_x: i32,
    pub delta_y: i32,
    /// Movement units per reported coordinate; 0 and 1 mean unscaled.
    pub x_scale: u8,
    pub y_scale: u8,
    /// Minimum per-packet delta magnitude in relative mode.
    pub x_threshold: u8,
    pub y_threshold: u8,
    /// Movement units per synthesized cursor keystroke.
    pub keycode_delta_x: u8,
    pub keycode_delta_y: u8,
    /// +1 = origin at top, -1 = origin at bottom.
    pub y_axis: i32,
    pub action: MouseAction,
}

impl Default for MouseState {
    fn default() -> Self {
        Self {
            delta_x: 0,
            delta_y: 0,
            x_scale: 0,
            y_scale: 0,
            x_threshold: 1,
            y_threshold: 1,
            keycode_delta_x: 1,
            keycode_delta_y: 1,
            y_axis: 1,
            action: MouseAction::empty(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct JoyLanes {
    /// Current lane masks, refreshed every report cycle.
    pub data: [JoyState; 2],
    /// Last masks sent as auto packets, for change detection.
    pub prev: [JoyState; 2],
}

impl Default for JoyLanes {
    fn default() -> Self {
        Self {
            data: [JoyState::empty(); 2],
            prev: [JoyState::empty(); 2],
        }
    }
}

/// Raw host input accumulated between report cycles. The host owns this
/// side: none of it is touched by a controller reset.
#[derive(Debug, Default)]
pub(crate) struct HostInput {
    pub pending_dx: i32,
    pub pending_dy: i32,
    pub pending_wheel: i32,
    /// Bit 0 right, bit 1 left, bits 2-4 middle/side/extra.
    pub buttons: u8,
    /// Previous button mask, for the extra-button key-code edges.
    pub prev_buttons: u8,
    pub joy_registers: [u16; 2],
}

type Handler = fn(&mut IkbdController);

/// Known commands with their total byte count, opcode included. Scanned
/// linearly, first match wins; any other first byte is treated as a NOP and
/// never answered.
const COMMANDS: &[(u8, usize, Handler)] = &[
    (0x80, 2, IkbdController::cmd_reset),
    (0x07, 2, IkbdController::cmd_set_mouse_action),
    (0x08, 1, IkbdController::cmd_set_relative_mouse),
    (0x09, 5, IkbdController::cmd_set_absolute_mouse),
    (0x0A, 3, IkbdController::cmd_set_mouse_keycodes),
    (0x0B, 3, IkbdController::cmd_set_mouse_threshold),
    (0x0C, 3, IkbdController::cmd_set_mouse_scale),
    (0x0D, 1, IkbdController::cmd_interrogate_mouse_position),
    (0x0E, 6, IkbdController::cmd_set_internal_mouse_position),
    (0x0F, 1, IkbdController::cmd_set_y_axis_down),
    (0x10, 1, IkbdController::cmd_set_y_axis_up),
    (0x11, 1, IkbdController::cmd_resume_output),
    (0x12, 1, IkbdController::cmd_disable_mouse),
    (0x13, 1, IkbdController::cmd_pause_output),
    (0x14, 1, IkbdController::cmd_set_joystick_event_reporting),
    (0x15, 1, IkbdController::cmd_set_joystick_interrogation),
    (0x16, 1, IkbdController::cmd_interrogate_joystick),
    (0x17, 2, IkbdController::cmd_set_joystick_monitoring),
    (0x18, 1, IkbdController::cmd_set_fire_button_monitoring),
    (0x19, 7, IkbdController::cmd_set_joystick_keycodes),
    (0x1A, 1, IkbdController::cmd_disable_joysticks),
    (0x1B, 7, IkbdController::cmd_set_clock),
    (0x1C, 1, IkbdController::cmd_read_clock),
    (0x20, 4, IkbdController::cmd_load_memory),
    (0x21, 3, IkbdController::cmd_read_memory),
    (0x22, 3, IkbdController::cmd_execute),
    // Status inquiries (command opcode with the top bit set).
    (0x87, 1, IkbdController::cmd_report_mouse_action),
    (0x88, 1, IkbdController::cmd_report_mouse_mode),
    (0x89, 1, IkbdController::cmd_report_mouse_mode),
    (0x8A, 1, IkbdController::cmd_report_mouse_mode),
    (0x8B, 1, IkbdController::cmd_report_mouse_threshold),
    (0x8C, 1, IkbdController::cmd_report_mouse_scale),
    (0x8F, 1, IkbdController::cmd_report_y_axis),
    (0x90, 1, IkbdController::cmd_report_y_axis),
    (0x92, 1, IkbdController::cmd_report_mouse_availability),
    (0x94, 1, IkbdController::cmd_report_joystick_mode),
    (0x95, 1, IkbdController::cmd_report_joystick_mode),
    (0x99, 1, IkbdController::cmd_report_joystick_mode),
    (0x9A, 1, IkbdController::cmd_report_joystick_availability),
];

/// Atari ST keyboard controller (HD6301) protocol model.
#[derive(Debug)]
pub struct IkbdController {
    pub(crate) mouse_mode: MouseMode,
    pub(crate) joystick_mode: JoystickMode,
    pub(crate) abs: AbsMouse,
    pub(crate) mouse: MouseState,
    pub(crate) joy: JoyLanes,
    /// Monitoring sample rate parameter (command 0x17). The report cadence
    /// is host-driven, so this only records what was requested.
    pub(crate) monitoring_rate: u8,

    pub(crate) input_buffer: [u8; INPUT_BUFFER_LEN],
    pub(crate) input_len: usize,
    pub(crate) paused: bool,

    pub(crate) left_button: ButtonSource,
    pub(crate) right_button: ButtonSource,
    pub(crate) old_left_button: ButtonSource,
    pub(crate) old_right_button: ButtonSource,

    /// Time-of-day clock: packed-BCD year/month/day/hour/minute/second.
    pub(crate) clock: [u8; 6],
    /// Last known press state per key code.
    pub(crate) key_state: [bool; 128],

    pub(crate) reset_countdown: u16,
    pub(crate) critical_window: bool,
    pub(crate) mouse_disabled: bool,
    pub(crate) joystick_disabled: bool,
    pub(crate) both_mouse_and_joy: bool,
    pub(crate) mouse_enabled_during_reset: bool,

    pub(crate) maps: InputMaps,
    pub(crate) host: HostInput,
    pub(crate) exec: ExecPhase,

    pub(crate) out: VecDeque<u8>,
}

impl IkbdController {
    pub fn new() -> Self {
        let mut ctrl = Self {
            mouse_mode: MouseMode::Relative,
            joystick_mode: JoystickMode::Auto,
            abs: AbsMouse::default(),
            mouse: MouseState::default(),
            joy: JoyLanes::default(),
            monitoring_rate: 0,
            input_buffer: [0; INPUT_BUFFER_LEN],
            input_len: 0,
            paused: false,
            left_button: ButtonSource::empty(),
            right_button: ButtonSource::empty(),
            old_left_button: ButtonSource::empty(),
            old_right_button: ButtonSource::empty(),
            clock: [0; 6],
            key_state: [false; 128],
            reset_countdown: 0,
            critical_window: false,
            mouse_disabled: false,
            joystick_disabled: false,
            both_mouse_and_joy: false,
            mouse_enabled_during_reset: false,
            maps: InputMaps::new(),
            host: HostInput::default(),
            exec: ExecPhase::Standard,
            out: VecDeque::new(),
        };
        ctrl.boot_rom(true);
        ctrl
    }

    /// Hardware reset. A cold reset additionally clears the clock bytes; a
    /// warm reset (reset line, reset command) keeps them.
    pub fn reset(&mut self, kind: ResetKind) {
        self.boot_rom(kind == ResetKind::Cold);
    }

    /// Re-run the ROM boot path: restore every reporting default, re-arm
    /// the boot countdown and tear down any custom-program state. The
    /// host-side pending input and the uploadable tables are not touched;
    /// the real controller never reinitializes those either.
    pub(crate) fn boot_rom(&mut self, clear_all_ram: bool) {
        if clear_all_ram {
            self.clock = [0; 6];
        }

        self.mouse_mode = MouseMode::Relative;
        self.joystick_mode = JoystickMode::Auto;
        self.abs = AbsMouse::default();
        self.mouse = MouseState::default();
        self.joy.prev = [JoyState::empty(); 2];
        self.monitoring_rate = 0;

        self.key_state = [false; 128];
        self.input_len = 0;
        self.paused = false;

        self.left_button = ButtonSource::empty();
        self.right_button = ButtonSource::empty();
        self.old_left_button = ButtonSource::empty();
        self.old_right_button = ButtonSource::empty();

        self.mouse_disabled = false;
        self.joystick_disabled = false;
        self.reset_countdown = RESET_BOOT_TICKS;
        self.critical_window = true;
        self.both_mouse_and_joy = false;
        self.mouse_enabled_during_reset = false;

        self.exec = ExecPhase::Standard;
    }

    /// Feed one byte received from the CPU side of the serial line.
    pub fn receive_byte(&mut self, byte: u8) {
        match self.exec {
            // An executing custom program owns the byte stream outright.
            ExecPhase::Executing(_) => custom::exec_write(self, byte),
            // A pending memory load consumes raw payload bytes.
            ExecPhase::Loading { .. } => custom::load_memory_byte(self, byte),
            _ => self.run_command(byte),
        }
    }

    /// Host key event: the low 7 bits select the key, the high bit set
    /// means release.
    pub fn inject_key(&mut self, scancode: u8) {
        self.press_key(scancode);
    }

    /// Accumulate host pointer movement; consumed at the next report cycle.
    pub fn inject_mouse_motion(&mut self, dx: i32, dy: i32) {
        self.host.pending_dx += dx;
        self.host.pending_dy += dy;
    }

    /// Accumulate wheel detents; consumed one per emitted sequence.
    pub fn inject_wheel(&mut self, delta: i32) {
        self.host.pending_wheel += delta;
    }

    pub fn inject_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.host.buttons |= button.mask();
        } else {
            self.host.buttons &= !button.mask();
        }
    }

    /// Update one of the two digital joystick input registers; sampled at
    /// the next report cycle.
    pub fn set_joy_register(&mut self, reg: JoyReg, value: u16) {
        self.host.joy_registers[reg.index()] = value;
    }

    /// The hardware increments the time-of-day clock once per second. This
    /// model leaves the clock frozen between explicit set-clock commands;
    /// the entry point exists so hosts can wire their VBL hook without
    /// special-casing this device.
    pub fn update_clock(&mut self) {}

    pub fn has_output(&self) -> bool {
        !self.out.is_empty()
    }

    pub fn pop_output(&mut self) -> Option<u8> {
        self.out.pop_front()
    }

    pub fn mouse_mode(&self) -> MouseMode {
        self.mouse_mode
    }

    pub fn joystick_mode(&self) -> JoystickMode {
        self.joystick_mode
    }

    pub fn abs_position(&self) -> (i32, i32) {
        (self.abs.x, self.abs.y)
    }

    pub fn output_paused(&self) -> bool {
        self.paused
    }

    /// Unconditional emission: command replies and the boot-complete byte.
    pub(crate) fn queue(&mut self, byte: u8) {
        self.out.push_back(byte);
    }

    /// Report-path emission; silenced while output is paused.
    pub(crate) fn report(&mut self, byte: u8) {
        if !self.paused {
            self.out.push_back(byte);
        }
    }

    /// Record and report a key press/release, then let an executing custom
    /// program observe it. Keys are not reported in joystick-monitoring
    /// mode.
    pub(crate) fn press_key(&mut self, code: u8) {
        if self.joystick_mode == JoystickMode::Monitoring {
            return;
        }
        self.key_state[usize::from(code & 0x7F)] = code & 0x80 == 0;
        self.report(code);
        custom::exec_read(self);
    }

    /// Buffer one command byte and dispatch once a known command is
    /// complete. Unknown first bytes clear the buffer silently; a
    /// completed command always clears it and lifts an output pause.
    fn run_command(&mut self, byte: u8) {
        if self.input_len < INPUT_BUFFER_LEN {
            self.input_buffer[self.input_len] = byte;
            self.input_len += 1;
        }

        for &(opcode, total_len, handler) in COMMANDS {
            if opcode == self.input_buffer[0] {
                if total_len == self.input_len {
                    self.paused = false;
                    handler(self);
                    self.input_len = 0;
                }
                return;
            }
        }

        self.input_len = 0;
    }

    fn param(&self, index: usize) -> u8 {
        self.input_buffer[index]
    }

    fn param_u16(&self, index: usize) -> u16 {
        u16::from(self.input_buffer[index]) << 8 | u16::from(self.input_buffer[index + 1])
    }

    /// 0x80 0x01 — RESET. Warm-boots the ROM; any other second byte is
    /// ignored entirely.
    fn cmd_reset(&mut self) {
        if self.param(1) == 0x01 {
            self.boot_rom(false);
        }
    }

    /// 0x07 — SET MOUSE BUTTON ACTION.
    fn cmd_set_mouse_action(&mut self) {
        self.mouse.action = MouseAction::from_bits_retain(self.param(1));
        self.abs.prev_buttons = ABS_PREV_BUTTONS;
    }

    /// 0x08 — SET RELATIVE MOUSE POSITION REPORTING.
    fn cmd_set_relative_mouse(&mut self) {
        self.mouse_mode = MouseMode::Relative;

        // Software that enables the mouse right after a reset and then
        // enables joystick events expects both to stay live; remember the
        // enable so the joystick command can honor that.
        if self.critical_window {
            self.mouse_enabled_during_reset = true;
        }
    }

    /// 0x09 — SET ABSOLUTE MOUSE POSITIONING, with inclusive X/Y maxima.
    fn cmd_set_absolute_mouse(&mut self) {
        self.mouse_mode = MouseMode::Absolute;
        self.abs.max_x = i32::from(self.param_u16(1));
        self.abs.max_y = i32::from(self.param_u16(3));
    }

    /// 0x0A — SET MOUSE KEYCODE MODE, with X/Y step distances.
    fn cmd_set_mouse_keycodes(&mut self) {
        self.mouse_mode = MouseMode::Cursor;
        self.mouse.keycode_delta_x = self.param(1);
        self.mouse.keycode_delta_y = self.param(2);
    }

    /// 0x0B — SET MOUSE THRESHOLD.
    fn cmd_set_mouse_threshold(&mut self) {
        self.mouse.x_threshold = self.param(1);
        self.mouse.y_threshold = self.param(2);
    }

    /// 0x0C — SET MOUSE SCALE.
    fn cmd_set_mouse_scale(&mut self) {
        self.mouse.x_scale = self.param(1);
        self.mouse.y_scale = self.param(2);
    }

    /// 0x0D — INTERROGATE MOUSE POSITION.
    fn cmd_interrogate_mouse_position(&mut self) {
        self.send_abs_mouse_report();
    }

    /// Absolute position packet: header, button edge nibble, X, Y. The
    /// nibble reports transitions since the previous interrogation.
    pub(crate) fn send_abs_mouse_report(&mut self) {
        let mut buttons = 0u8;
        buttons |= if self.right_button.down() { 0x01 } else { 0x02 };
        buttons |= if self.left_button.down() { 0x04 } else { 0x08 };

        let prev = self.abs.prev_buttons;
        self.abs.prev_buttons = buttons;
        buttons &= !prev;

        self.report(0xF7);
        self.report(buttons);
        self.report((self.abs.x as u16 >> 8) as u8);
        self.report(self.abs.x as u8);
        self.report((self.abs.y as u16 >> 8) as u8);
        self.report(self.abs.y as u8);
    }

    /// 0x0E — LOAD MOUSE POSITION. Not clipped here; the next report cycle
    /// clamps against the maxima.
    fn cmd_set_internal_mouse_position(&mut self) {
        self.abs.x = i32::from(self.param_u16(2));
        self.abs.y = i32::from(self.param_u16(4));
    }

    /// 0x0F — SET Y=0 AT BOTTOM.
    fn cmd_set_y_axis_down(&mut self) {
        self.mouse.y_axis = -1;
    }

    /// 0x10 — SET Y=0 AT TOP.
    fn cmd_set_y_axis_up(&mut self) {
        self.mouse.y_axis = 1;
    }

    /// 0x11 — RESUME. Redundant in practice: any valid command already
    /// lifts the pause.
    fn cmd_resume_output(&mut self) {
        self.paused = false;
    }

    /// 0x12 — DISABLE MOUSE.
    fn cmd_disable_mouse(&mut self) {
        self.mouse_mode = MouseMode::Off;
        self.mouse_disabled = true;
        self.check_reset_disable_quirk();
    }

    /// 0x13 — PAUSE OUTPUT. Ignored during the post-reset window (several
    /// loaders pause blindly right after reset and would otherwise never
    /// see the boot byte's follow-up reports).
    fn cmd_pause_output(&mut self) {
        if self.critical_window {
            return;
        }
        self.paused = true;
    }

    /// 0x14 — SET JOYSTICK EVENT REPORTING. Also turns the mouse off,
    /// except for the post-reset combinations that historically leave both
    /// devices live.
    fn cmd_set_joystick_event_reporting(&mut self) {
        self.joystick_mode = JoystickMode::Auto;
        self.mouse_mode = MouseMode::Off;

        if self.critical_window && self.mouse_enabled_during_reset {
            self.mouse_mode = MouseMode::Relative;
            self.both_mouse_and_joy = true;
        } else if self.critical_window && self.mouse_disabled {
            self.mouse_mode = MouseMode::Relative;
            self.both_mouse_and_joy = true;
        }

        self.joy.prev = [JoyState::empty(); 2];

        // Send one sample immediately: some games poll for joystick data
        // right after this command without waiting for it to be announced.
        self.sample_joypads();
        self.send_auto_joystick_packets();
    }

    /// 0x15 — SET JOYSTICK INTERROGATION MODE.
    fn cmd_set_joystick_interrogation(&mut self) {
        self.joystick_mode = JoystickMode::Off;
    }

    /// 0x16 — JOYSTICK INTERROGATE.
    fn cmd_interrogate_joystick(&mut self) {
        self.queue(0xFD);
        self.queue(self.joy.data[0].bits());
        self.queue(self.joy.data[1].bits());
    }

    /// 0x17 — SET JOYSTICK MONITORING. The requested rate is recorded, but
    /// the actual cadence belongs to whoever drives the report cycle.
    fn cmd_set_joystick_monitoring(&mut self) {
        let mut rate = self.param(1);
        if rate == 0 {
            rate = 1;
        }
        self.monitoring_rate = rate;
        self.joystick_mode = JoystickMode::Monitoring;
        self.mouse_mode = MouseMode::Off;
    }

    /// 0x18 — SET FIRE BUTTON MONITORING. Accepted, not implemented.
    fn cmd_set_fire_button_monitoring(&mut self) {}

    /// 0x19 — SET JOYSTICK KEYCODE MODE. Accepted, not implemented.
    fn cmd_set_joystick_keycodes(&mut self) {}

    /// 0x1A — DISABLE JOYSTICKS.
    fn cmd_disable_joysticks(&mut self) {
        self.joystick_mode = JoystickMode::Off;
        self.joystick_disabled = true;
        self.check_reset_disable_quirk();
    }

    /// Disabling both the mouse and the joysticks inside the post-reset
    /// window turns both back on. Games rely on this to receive mouse and
    /// joystick packets at the same time.
    fn check_reset_disable_quirk(&mut self) {
        if self.mouse_disabled && self.joystick_disabled && self.critical_window {
            self.mouse_mode = MouseMode::Relative;
            self.joystick_mode = JoystickMode::Auto;
            self.both_mouse_and_joy = true;
        }
    }

    /// 0x1B — TIME-OF-DAY CLOCK SET. Each byte is validated as packed BCD
    /// independently; invalid bytes are dropped, the rest are stored. No
    /// range checks beyond BCD well-formedness.
    fn cmd_set_clock(&mut self) {
        for i in 1..=6 {
            let val = self.param(i);
            if is_bcd(val) {
                self.clock[i - 1] = val;
            }
        }
    }

    /// 0x1C — INTERROGATE TIME-OF-DAY CLOCK.
    fn cmd_read_clock(&mut self) {
        self.queue(0xFC);
        for i in 0..6 {
            self.queue(self.clock[i]);
        }
    }

    /// 0x20 — MEMORY LOAD. The following `count` raw bytes are written to
    /// controller memory and checksummed; see `custom.rs` for what happens
    /// when the checksum matches a known upload.
    fn cmd_load_memory(&mut self) {
        let dest = self.param_u16(1);
        let count = self.param(3);
        if count > 0 {
            self.exec = ExecPhase::Loading {
                dest,
                remaining: count,
                crc: CRC_SEED,
            };
        }
    }

    /// 0x21 — MEMORY READ: status header plus six bytes from controller
    /// memory. Unmapped addresses read as zero.
    fn cmd_read_memory(&mut self) {
        self.queue(0xF6);
        self.queue(0x20);
        let mut addr = self.param_u16(1);
        for _ in 0..6 {
            let byte = self.maps.read(addr);
            self.queue(byte);
            addr = addr.wrapping_add(1);
        }
    }

    /// 0x22 — CONTROLLER EXECUTE. Only meaningful when a recognized upload
    /// is staged; otherwise nothing happens.
    fn cmd_execute(&mut self) {
        if matches!(self.exec, ExecPhase::BootMatched { .. }) {
            self.exec = ExecPhase::Executing(ExecStage::Boot {
                crc: CRC_SEED,
                count: 0,
            });
        }
    }

    /// 0x87 — REPORT MOUSE BUTTON ACTION.
    fn cmd_report_mouse_action(&mut self) {
        let action = self.mouse.action.bits();
        self.queue(0xF6);
        self.queue(0x07);
        self.queue(action);
        for _ in 0..5 {
            self.queue(0);
        }
    }

    /// 0x88/0x89/0x8A — REPORT MOUSE MODE.
    fn cmd_report_mouse_mode(&mut self) {
        self.queue(0xF6);
        match self.mouse_mode {
            MouseMode::Relative => {
                self.queue(0x08);
                for _ in 0..6 {
                    self.queue(0);
                }
            }
            MouseMode::Absolute => {
                self.queue(0x09);
                self.queue((self.abs.max_x as u16 >> 8) as u8);
                self.queue(self.abs.max_x as u8);
                self.queue((self.abs.max_y as u16 >> 8) as u8);
                self.queue(self.abs.max_y as u8);
                self.queue(0);
                self.queue(0);
            }
            MouseMode::Cursor => {
                self.queue(0x0A);
                self.queue(self.mouse.keycode_delta_x);
                self.queue(self.mouse.keycode_delta_y);
                for _ in 0..4 {
                    self.queue(0);
                }
            }
            // With the mouse disabled the ROM answers with the bare status
            // header and nothing else.
            MouseMode::Off => {}
        }
    }

    /// 0x8B — REPORT MOUSE THRESHOLD.
    fn cmd_report_mouse_threshold(&mut self) {
        let (xt, yt) = (self.mouse.x_threshold, self.mouse.y_threshold);
        self.queue(0xF6);
        self.queue(0x0B);
        self.queue(xt);
        self.queue(yt);
        for _ in 0..4 {
            self.queue(0);
        }
    }

    /// 0x8C — REPORT MOUSE SCALE.
    fn cmd_report_mouse_scale(&mut self) {
        let (xs, ys) = (self.mouse.x_scale, self.mouse.y_scale);
        self.queue(0xF6);
        self.queue(0x0C);
        self.queue(xs);
        self.queue(ys);
        for _ in 0..4 {
            self.queue(0);
        }
    }

    /// 0x8F/0x90 — REPORT MOUSE VERTICAL COORDINATES.
    fn cmd_report_y_axis(&mut self) {
        self.queue(0xF6);
        self.queue(if self.mouse.y_axis == -1 { 0x0F } else { 0x10 });
        for _ in 0..6 {
            self.queue(0);
        }
    }

    /// 0x92 — REPORT MOUSE AVAILABILITY.
    fn cmd_report_mouse_availability(&mut self) {
        self.queue(0xF6);
        self.queue(if self.mouse_mode == MouseMode::Off {
            0x12
        } else {
            0x00
        });
        for _ in 0..6 {
            self.queue(0);
        }
    }

    /// 0x94/0x95/0x99 — REPORT JOYSTICK MODE.
    fn cmd_report_joystick_mode(&mut self) {
        self.queue(0xF6);
        self.queue(if self.joystick_mode == JoystickMode::Auto {
            0x14
        } else {
            0x15
        });
        for _ in 0..6 {
            self.queue(0);
        }
    }

    /// 0x9A — REPORT JOYSTICK AVAILABILITY.
    fn cmd_report_joystick_availability(&mut self) {
        self.queue(0xF6);
        self.queue(if self.joystick_mode == JoystickMode::Off {
            0x1A
        } else {
            0x00
        });
        for _ in 0..6 {
            self.queue(0);
        }
    }
}

impl Default for IkbdController {
    fn default() -> Self {
        Self::new()
    }
}

fn is_bcd(val: u8) -> bool {
    val & 0x0F <= 0x09 && val & 0xF0 <= 0x90
}
