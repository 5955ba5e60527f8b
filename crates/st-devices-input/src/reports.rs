//! Per-cycle automatic report generation.
//!
//! The host drives [`IkbdController::tick`] once per report cycle
//! (historically every VBL). Everything here reads the input state sampled
//! at the top of the cycle and turns it into report packets; pausing the
//! output mutes the packets but never the state updates.

use crate::custom;
use crate::ikbd::{
    ButtonSource, IkbdController, JoystickMode, MouseAction, MouseMode, ROM_VERSION,
};
use crate::joypad::JoyState;
use crate::scancode;

impl IkbdController {
    /// Advance one report cycle.
    pub fn tick(&mut self) {
        // While the boot countdown runs, nothing else happens; its expiry
        // announces the ROM version and closes the post-reset window.
        if self.reset_countdown > 0 {
            self.reset_countdown -= 1;
            if self.reset_countdown == 0 {
                self.critical_window = false;
                self.mouse_enabled_during_reset = false;
                self.queue(ROM_VERSION);
            }
            return;
        }

        self.left_button = if self.host.buttons & 0x02 != 0 {
            ButtonSource::MOUSE
        } else {
            ButtonSource::empty()
        };
        self.right_button = if self.host.buttons & 0x01 != 0 {
            ButtonSource::MOUSE
        } else {
            ButtonSource::empty()
        };

        self.sample_joypads();
        self.duplicate_fire_buttons();

        let buttons_as_keys = self.send_mouse_action_reports();

        self.update_absolute_position();

        // Buttons-as-keys replaces the packet-style joystick reports for
        // this cycle.
        if !buttons_as_keys {
            if self.joystick_mode == JoystickMode::Monitoring {
                self.send_monitoring_packet();
                return;
            }
            if self.joystick_mode == JoystickMode::Auto {
                self.send_auto_joystick_packets();
            }
        }

        match self.mouse_mode {
            MouseMode::Relative => self.send_relative_packets(),
            MouseMode::Cursor => self.send_cursor_packets(),
            MouseMode::Off | MouseMode::Absolute => {}
        }

        self.old_left_button = self.left_button;
        self.old_right_button = self.right_button;

        self.process_wheel_and_extra_buttons();

        // An executing custom program gets to observe the cycle last.
        custom::exec_read(self);
    }

    /// Sample both joypads from their raw registers: decode the lane masks
    /// through the joystick maps and emit key codes for mapped buttons that
    /// changed. Lane 0 doubles as the mouse connector, so its mask only
    /// reaches the wire when the mouse is off (or the post-reset quirk
    /// forced both devices live).
    pub(crate) fn sample_joypads(&mut self) {
        for idx in 0..2 {
            let raw = self.host.joy_registers[self.maps.pads[idx].source.index()];
            let pad = &mut self.maps.pads[idx];
            let changed = pad.last_raw ^ raw;
            pad.last_raw = raw;

            let mut state = JoyState::empty();
            let mut scans = [0u8; 16];
            let mut scan_count = 0;
            for bit in 0..16 {
                let mask = 1u16 << bit;
                if raw & mask != 0 {
                    state |= JoyState::from_bits_retain(pad.joystick_map[bit]);
                }
                if changed & mask != 0 && pad.scancode_map[bit] != 0 {
                    let mut scan = pad.scancode_map[bit];
                    if raw & mask == 0 {
                        scan |= 0x80;
                    }
                    scans[scan_count] = scan;
                    scan_count += 1;
                }
            }
            pad.state = state;

            for &scan in &scans[..scan_count] {
                self.report(scan);
            }
        }

        self.joy.data[1] = self.maps.pads[1].state;
        self.joy.data[0] = if self.mouse_mode == MouseMode::Off
            || (self.both_mouse_and_joy && self.mouse_mode == MouseMode::Relative)
        {
            self.maps.pads[0].state
        } else {
            JoyState::empty()
        };
    }

    /// With the mouse off, the mouse buttons stand in for the fire buttons;
    /// with the mouse on, joystick-1 fire and the right mouse button become
    /// the same button (either source presses both).
    fn duplicate_fire_buttons(&mut self) {
        if self.mouse_mode == MouseMode::Off {
            if self.right_button.contains(ButtonSource::MOUSE) {
                self.joy.data[1].insert(JoyState::FIRE);
            }
            if self.left_button.contains(ButtonSource::MOUSE) {
                self.joy.data[0].insert(JoyState::FIRE);
            }
        } else {
            let pressed = self.joy.data[1].contains(JoyState::FIRE)
                || self.right_button.contains(ButtonSource::MOUSE);
            if pressed {
                self.joy.data[1].insert(JoyState::FIRE);
                self.right_button.insert(ButtonSource::JOYSTICK);
            } else {
                self.joy.data[1].remove(JoyState::FIRE);
                self.right_button.remove(ButtonSource::JOYSTICK);
            }
        }
    }

    /// Apply the configured button action. Returns true when the
    /// buttons-as-keys path ran, which mutes the packet-style joystick
    /// reports for this cycle.
    fn send_mouse_action_reports(&mut self) -> bool {
        let left = self.left_button.down();
        let left_was = self.old_left_button.down();
        let right = self.right_button.down();
        let right_was = self.old_right_button.down();

        if self.mouse.action.contains(MouseAction::BUTTONS_AS_KEYS) {
            if left && !left_was {
                self.report(scancode::KEY_MOUSE_LEFT);
            } else if left_was && !left {
                self.report(scancode::KEY_MOUSE_LEFT | 0x80);
            }
            if right && !right_was {
                self.report(scancode::KEY_MOUSE_RIGHT);
            } else if right_was && !right {
                self.report(scancode::KEY_MOUSE_RIGHT | 0x80);
            }
            return true;
        }

        if self
            .mouse
            .action
            .intersects(MouseAction::REPORT_PRESS | MouseAction::REPORT_RELEASE)
        {
            let mut report_position = false;

            if self.mouse.action.contains(MouseAction::REPORT_PRESS) {
                if left && !left_was {
                    report_position = true;
                    self.abs.prev_buttons = (self.abs.prev_buttons & !0x04) | 0x02;
                }
                if right && !right_was {
                    report_position = true;
                    self.abs.prev_buttons = (self.abs.prev_buttons & !0x01) | 0x08;
                }
            }
            if self.mouse.action.contains(MouseAction::REPORT_RELEASE) {
                if left_was && !left {
                    report_position = true;
                    self.abs.prev_buttons = (self.abs.prev_buttons & !0x08) | 0x01;
                }
                if right_was && !right {
                    report_position = true;
                    self.abs.prev_buttons = (self.abs.prev_buttons & !0x02) | 0x04;
                }
            }

            // Only absolute mode reports positions on button edges.
            if report_position && self.mouse_mode == MouseMode::Absolute {
                self.send_abs_mouse_report();
            }
        }

        false
    }

    /// Consume the pending host delta and track the internal absolute
    /// position, scaled and clamped to the inclusive maxima.
    fn update_absolute_position(&mut self) {
        let dx = self.host.pending_dx;
        let dy = self.host.pending_dy;
        self.host.pending_dx = 0;
        self.host.pending_dy = 0;
        self.mouse.delta_x = dx;
        self.mouse.delta_y = dy;

        let x_step = if self.mouse.x_scale > 1 {
            dx * i32::from(self.mouse.x_scale)
        } else {
            dx
        };
        self.abs.x = (self.abs.x + x_step).clamp(0, self.abs.max_x);

        let y_step = if self.mouse.y_scale > 1 {
            dy * self.mouse.y_axis * i32::from(self.mouse.y_scale)
        } else {
            dy * self.mouse.y_axis
        };
        self.abs.y = (self.abs.y + y_step).clamp(0, self.abs.max_y);
    }

    /// Monitoring packet: fire bits, then both lane nibbles packed.
    fn send_monitoring_packet(&mut self) {
        let joy0 = self.joy.data[0].bits();
        let joy1 = self.joy.data[1].bits();
        let fire = ((joy0 & 0x80) >> 6) | ((joy1 & 0x80) >> 7);
        let sticks = ((joy0 & 0x0F) << 4) | (joy1 & 0x0F);
        self.report(fire);
        self.report(sticks);
    }

    /// Per-lane 2-byte change packets (header 0xFE for lane 0, 0xFF for
    /// lane 1); a lane is only reported when its mask changed.
    pub(crate) fn send_auto_joystick_packets(&mut self) {
        for lane in 0..2 {
            let data = self.joy.data[lane];
            if data != self.joy.prev[lane] {
                self.report(0xFE + lane as u8);
                self.report(data.bits());
                self.joy.prev[lane] = data;
            }
        }
    }

    /// Signed 3-byte relative packets. Deltas beyond one byte are split
    /// over several packets; the loop runs until the residual is below the
    /// threshold on both axes and the buttons are stable.
    fn send_relative_packets(&mut self) {
        loop {
            let rel_x = self.mouse.delta_x as i8;
            let rel_y = self.mouse.delta_y as i8;
            let xt = i32::from(self.mouse.x_threshold);
            let yt = i32::from(self.mouse.y_threshold);

            let over_x = (rel_x < 0 && i32::from(rel_x) <= -xt)
                || (rel_x > 0 && i32::from(rel_x) >= xt);
            let over_y = (rel_y < 0 && i32::from(rel_y) <= -yt)
                || (rel_y > 0 && i32::from(rel_y) >= yt);
            let left_changed = self.left_button.down() != self.old_left_button.down();
            let right_changed = self.right_button.down() != self.old_right_button.down();

            if !(over_x || over_y || left_changed || right_changed) {
                break;
            }

            let mut header = 0xF8;
            if self.left_button.down() {
                header |= 0x02;
            }
            if self.right_button.down() {
                header |= 0x01;
            }
            self.report(header);
            self.report(rel_x as u8);
            self.report((i32::from(rel_y) * self.mouse.y_axis) as u8);

            self.mouse.delta_x -= i32::from(rel_x);
            self.mouse.delta_y -= i32::from(rel_y);
            self.old_left_button = self.left_button;
            self.old_right_button = self.right_button;
        }
    }

    /// Cursor-keycode mode: movement becomes press/release pairs of the
    /// cursor keys, buttons become their pseudo key codes. Host pointers
    /// can report much larger per-cycle deltas than the original hardware,
    /// so the translation is capped per cycle.
    fn send_cursor_packets(&mut self) {
        let mut rounds = 0;
        while rounds < 10
            && (self.mouse.delta_x != 0
                || self.mouse.delta_y != 0
                || self.left_button.down() != self.old_left_button.down()
                || self.right_button.down() != self.old_right_button.down())
        {
            let kdx = i32::from(self.mouse.keycode_delta_x);
            let kdy = i32::from(self.mouse.keycode_delta_y);

            if self.mouse.delta_x != 0 {
                if self.mouse.delta_x <= -kdx {
                    self.report(scancode::CURSOR_LEFT);
                    self.report(scancode::CURSOR_LEFT | 0x80);
                    self.mouse.delta_x += kdx;
                }
                if self.mouse.delta_x >= kdx {
                    self.report(scancode::CURSOR_RIGHT);
                    self.report(scancode::CURSOR_RIGHT | 0x80);
                    self.mouse.delta_x -= kdx;
                }
            }

            if self.mouse.delta_y != 0 {
                if self.mouse.delta_y <= -kdy {
                    self.report(scancode::CURSOR_UP);
                    self.report(scancode::CURSOR_UP | 0x80);
                    self.mouse.delta_y += kdy;
                }
                if self.mouse.delta_y >= kdy {
                    self.report(scancode::CURSOR_DOWN);
                    self.report(scancode::CURSOR_DOWN | 0x80);
                    self.mouse.delta_y -= kdy;
                }
            }

            let left = self.left_button.down();
            let left_was = self.old_left_button.down();
            let right = self.right_button.down();
            let right_was = self.old_right_button.down();
            if left && !left_was {
                self.report(scancode::KEY_MOUSE_LEFT);
            } else if left_was && !left {
                self.report(scancode::KEY_MOUSE_LEFT | 0x80);
            }
            if right && !right_was {
                self.report(scancode::KEY_MOUSE_RIGHT);
            } else if right_was && !right {
                self.report(scancode::KEY_MOUSE_RIGHT | 0x80);
            }

            self.old_left_button = self.left_button;
            self.old_right_button = self.right_button;
            rounds += 1;
        }
    }

    /// Wheel detents and the extra mouse buttons report as key events, so
    /// they reach the key table and an executing custom program like any
    /// other key.
    fn process_wheel_and_extra_buttons(&mut self) {
        while self.host.pending_wheel > 0 {
            for byte in scancode::WHEEL_UP_SEQUENCE {
                self.press_key(byte);
            }
            self.host.pending_wheel -= 1;
        }
        while self.host.pending_wheel < 0 {
            for byte in scancode::WHEEL_DOWN_SEQUENCE {
                self.press_key(byte);
            }
            self.host.pending_wheel += 1;
        }

        let diff = self.host.buttons ^ self.host.prev_buttons;
        if diff & 0x04 != 0 {
            let release = if self.host.buttons & 0x04 != 0 { 0 } else { 0x80 };
            self.press_key(scancode::KEY_MOUSE_MIDDLE | release);
        }
        if diff & 0x08 != 0 {
            let release = if self.host.buttons & 0x08 != 0 { 0 } else { 0x80 };
            self.press_key(scancode::KEY_MOUSE_SIDE | release);
        }
        if diff & 0x10 != 0 {
            let release = if self.host.buttons & 0x10 != 0 { 0 } else { 0x80 };
            self.press_key(scancode::KEY_MOUSE_EXTRA | release);
        }
        self.host.prev_buttons = self.host.buttons;
    }
}
