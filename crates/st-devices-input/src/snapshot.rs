//! Snapshot support: every field that influences future outputs is
//! persisted, including the pending output queue, so a restored controller
//! is byte-for-byte indistinguishable from the original.

use st_io_snapshot::codec::{Decoder, Encoder};
use st_io_snapshot::{IoSnapshot, SnapshotError, SnapshotReader, SnapshotResult, SnapshotVersion, SnapshotWriter};

use crate::custom::{ExecPhase, ExecStage, ProgramState, CUSTOM_PROGRAMS};
use crate::ikbd::{ButtonSource, IkbdController, JoystickMode, MouseAction, MouseMode};
use crate::joypad::{JoyReg, JoyState};

const TAG_MOUSE_MODE: u16 = 1;
const TAG_JOYSTICK_MODE: u16 = 2;
const TAG_MONITORING_RATE: u16 = 3;
const TAG_ABS: u16 = 4;
const TAG_MOUSE: u16 = 5;
const TAG_JOY: u16 = 6;
const TAG_BUTTONS: u16 = 7;
const TAG_INPUT_BUFFER: u16 = 8;
const TAG_PAUSED: u16 = 9;
const TAG_CLOCK: u16 = 10;
const TAG_RESET: u16 = 11;
const TAG_KEY_STATE: u16 = 12;
const TAG_SCANCODE_TABLE: u16 = 13;
const TAG_JOYPADS: u16 = 14;
const TAG_HOST: u16 = 15;
const TAG_EXEC: u16 = 16;
const TAG_OUTPUT: u16 = 17;

fn mouse_mode_to_u8(mode: MouseMode) -> u8 {
    match mode {
        MouseMode::Off => 0,
        MouseMode::Relative => 1,
        MouseMode::Absolute => 2,
        MouseMode::Cursor => 3,
    }
}

fn mouse_mode_from_u8(raw: u8) -> SnapshotResult<MouseMode> {
    match raw {
        0 => Ok(MouseMode::Off),
        1 => Ok(MouseMode::Relative),
        2 => Ok(MouseMode::Absolute),
        3 => Ok(MouseMode::Cursor),
        _ => Err(SnapshotError::InvalidValue),
    }
}

fn joystick_mode_to_u8(mode: JoystickMode) -> u8 {
    match mode {
        JoystickMode::Off => 0,
        JoystickMode::Auto => 1,
        JoystickMode::Monitoring => 2,
    }
}

fn joystick_mode_from_u8(raw: u8) -> SnapshotResult<JoystickMode> {
    match raw {
        0 => Ok(JoystickMode::Off),
        1 => Ok(JoystickMode::Auto),
        2 => Ok(JoystickMode::Monitoring),
        _ => Err(SnapshotError::InvalidValue),
    }
}

fn encode_exec(exec: ExecPhase) -> Vec<u8> {
    match exec {
        ExecPhase::Standard => Encoder::new().u8(0).finish(),
        ExecPhase::Loading {
            dest,
            remaining,
            crc,
        } => Encoder::new().u8(1).u16(dest).u8(remaining).u32(crc).finish(),
        ExecPhase::BootMatched { entry } => Encoder::new().u8(2).u8(entry as u8).finish(),
        ExecPhase::Executing(ExecStage::Boot { crc, count }) => {
            Encoder::new().u8(3).u32(crc).u32(count).finish()
        }
        ExecPhase::Executing(ExecStage::Main { entry, program }) => {
            let enc = Encoder::new().u8(4).u8(entry as u8);
            match program {
                ProgramState::Froggies => enc.u8(0),
                ProgramState::Transbeauce2 => enc.u8(1),
                ProgramState::Dragonnels => enc.u8(2),
                ProgramState::ChaosAd {
                    ignore_remaining,
                    key_index,
                    decoded,
                    ready_sent,
                } => enc
                    .u8(3)
                    .u8(ignore_remaining)
                    .u8(key_index)
                    .u32(decoded)
                    .bool(ready_sent),
                ProgramState::AudioSculpture { mono, magic, reads } => {
                    enc.u8(4).bool(mono).bool(magic).u8(reads)
                }
            }
            .finish()
        }
    }
}

fn decode_entry(raw: u8) -> SnapshotResult<usize> {
    let entry = usize::from(raw);
    if entry >= CUSTOM_PROGRAMS.len() {
        return Err(SnapshotError::InvalidValue);
    }
    Ok(entry)
}

fn decode_exec(buf: &[u8]) -> SnapshotResult<ExecPhase> {
    let mut d = Decoder::new(buf);
    let exec = match d.u8()? {
        0 => ExecPhase::Standard,
        1 => ExecPhase::Loading {
            dest: d.u16()?,
            remaining: d.u8()?,
            crc: d.u32()?,
        },
        2 => ExecPhase::BootMatched {
            entry: decode_entry(d.u8()?)?,
        },
        3 => ExecPhase::Executing(ExecStage::Boot {
            crc: d.u32()?,
            count: d.u32()?,
        }),
        4 => {
            let entry = decode_entry(d.u8()?)?;
            let program = match d.u8()? {
                0 => ProgramState::Froggies,
                1 => ProgramState::Transbeauce2,
                2 => ProgramState::Dragonnels,
                3 => ProgramState::ChaosAd {
                    ignore_remaining: d.u8()?,
                    key_index: d.u8()?,
                    decoded: d.u32()?,
                    ready_sent: d.bool()?,
                },
                4 => ProgramState::AudioSculpture {
                    mono: d.bool()?,
                    magic: d.bool()?,
                    reads: d.u8()?,
                },
                _ => return Err(SnapshotError::InvalidValue),
            };
            ExecPhase::Executing(ExecStage::Main { entry, program })
        }
        _ => return Err(SnapshotError::InvalidValue),
    };
    d.finish()?;
    Ok(exec)
}

impl IoSnapshot for IkbdController {
    const DEVICE_ID: [u8; 4] = *b"IKBD";
    const DEVICE_VERSION: SnapshotVersion = SnapshotVersion::new(1, 0);

    fn save_state(&self) -> Vec<u8> {
        let mut w = SnapshotWriter::new(Self::DEVICE_ID, Self::DEVICE_VERSION);

        w.field_u8(TAG_MOUSE_MODE, mouse_mode_to_u8(self.mouse_mode));
        w.field_u8(TAG_JOYSTICK_MODE, joystick_mode_to_u8(self.joystick_mode));
        w.field_u8(TAG_MONITORING_RATE, self.monitoring_rate);

        let abs = Encoder::new()
            .i32(self.abs.x)
            .i32(self.abs.y)
            .i32(self.abs.max_x)
            .i32(self.abs.max_y)
            .u8(self.abs.prev_buttons)
            .finish();
        w.field_bytes(TAG_ABS, abs);

        let mouse = Encoder::new()
            .i32(self.mouse.delta_x)
            .i32(self.mouse.delta_y)
            .u8(self.mouse.x_scale)
            .u8(self.mouse.y_scale)
            .u8(self.mouse.x_threshold)
            .u8(self.mouse.y_threshold)
            .u8(self.mouse.keycode_delta_x)
            .u8(self.mouse.keycode_delta_y)
            .i32(self.mouse.y_axis)
            .u8(self.mouse.action.bits())
            .finish();
        w.field_bytes(TAG_MOUSE, mouse);

        let joy = Encoder::new()
            .u8(self.joy.data[0].bits())
            .u8(self.joy.data[1].bits())
            .u8(self.joy.prev[0].bits())
            .u8(self.joy.prev[1].bits())
            .finish();
        w.field_bytes(TAG_JOY, joy);

        let buttons = Encoder::new()
            .u8(self.left_button.bits())
            .u8(self.right_button.bits())
            .u8(self.old_left_button.bits())
            .u8(self.old_right_button.bits())
            .finish();
        w.field_bytes(TAG_BUTTONS, buttons);

        let input = Encoder::new()
            .u8(self.input_len as u8)
            .bytes(&self.input_buffer)
            .finish();
        w.field_bytes(TAG_INPUT_BUFFER, input);

        w.field_bool(TAG_PAUSED, self.paused);
        w.field_bytes(TAG_CLOCK, self.clock.to_vec());

        let reset = Encoder::new()
            .u16(self.reset_countdown)
            .bool(self.critical_window)
            .bool(self.mouse_disabled)
            .bool(self.joystick_disabled)
            .bool(self.both_mouse_and_joy)
            .bool(self.mouse_enabled_during_reset)
            .finish();
        w.field_bytes(TAG_RESET, reset);

        let keys: Vec<u8> = self.key_state.iter().map(|&down| u8::from(down)).collect();
        w.field_bytes(TAG_KEY_STATE, keys);

        w.field_bytes(TAG_SCANCODE_TABLE, self.maps.scancodes.to_vec());

        let mut pads = Encoder::new();
        for pad in &self.maps.pads {
            pads = pads
                .bytes(&pad.scancode_map)
                .bytes(&pad.joystick_map)
                .u8(pad.source.index() as u8)
                .u16(pad.last_raw)
                .u8(pad.state.bits());
        }
        w.field_bytes(TAG_JOYPADS, pads.finish());

        let host = Encoder::new()
            .i32(self.host.pending_dx)
            .i32(self.host.pending_dy)
            .i32(self.host.pending_wheel)
            .u8(self.host.buttons)
            .u8(self.host.prev_buttons)
            .u16(self.host.joy_registers[0])
            .u16(self.host.joy_registers[1])
            .finish();
        w.field_bytes(TAG_HOST, host);

        w.field_bytes(TAG_EXEC, encode_exec(self.exec));

        let out: Vec<u8> = self.out.iter().copied().collect();
        w.field_bytes(TAG_OUTPUT, out);

        w.finish()
    }

    fn load_state(&mut self, bytes: &[u8]) -> SnapshotResult<()> {
        let r = SnapshotReader::parse(bytes, Self::DEVICE_ID)?;
        r.ensure_device_major(Self::DEVICE_VERSION.major)?;

        if let Some(v) = r.u8(TAG_MOUSE_MODE)? {
            self.mouse_mode = mouse_mode_from_u8(v)?;
        }
        if let Some(v) = r.u8(TAG_JOYSTICK_MODE)? {
            self.joystick_mode = joystick_mode_from_u8(v)?;
        }
        if let Some(v) = r.u8(TAG_MONITORING_RATE)? {
            self.monitoring_rate = v;
        }

        if let Some(buf) = r.bytes(TAG_ABS) {
            let mut d = Decoder::new(buf);
            self.abs.x = d.i32()?;
            self.abs.y = d.i32()?;
            self.abs.max_x = d.i32()?;
            self.abs.max_y = d.i32()?;
            self.abs.prev_buttons = d.u8()?;
            d.finish()?;
        }

        if let Some(buf) = r.bytes(TAG_MOUSE) {
            let mut d = Decoder::new(buf);
            self.mouse.delta_x = d.i32()?;
            self.mouse.delta_y = d.i32()?;
            self.mouse.x_scale = d.u8()?;
            self.mouse.y_scale = d.u8()?;
            self.mouse.x_threshold = d.u8()?;
            self.mouse.y_threshold = d.u8()?;
            self.mouse.keycode_delta_x = d.u8()?;
            self.mouse.keycode_delta_y = d.u8()?;
            self.mouse.y_axis = d.i32()?;
            self.mouse.action = MouseAction::from_bits_retain(d.u8()?);
            d.finish()?;
        }

        if let Some(buf) = r.bytes(TAG_JOY) {
            let mut d = Decoder::new(buf);
            self.joy.data[0] = JoyState::from_bits_retain(d.u8()?);
            self.joy.data[1] = JoyState::from_bits_retain(d.u8()?);
            self.joy.prev[0] = JoyState::from_bits_retain(d.u8()?);
            self.joy.prev[1] = JoyState::from_bits_retain(d.u8()?);
            d.finish()?;
        }

        if let Some(buf) = r.bytes(TAG_BUTTONS) {
            let mut d = Decoder::new(buf);
            self.left_button = ButtonSource::from_bits_retain(d.u8()?);
            self.right_button = ButtonSource::from_bits_retain(d.u8()?);
            self.old_left_button = ButtonSource::from_bits_retain(d.u8()?);
            self.old_right_button = ButtonSource::from_bits_retain(d.u8()?);
            d.finish()?;
        }

        if let Some(buf) = r.bytes(TAG_INPUT_BUFFER) {
            let mut d = Decoder::new(buf);
            let len = usize::from(d.u8()?);
            if len > self.input_buffer.len() {
                return Err(SnapshotError::InvalidValue);
            }
            self.input_len = len;
            let buf_len = self.input_buffer.len();
            self.input_buffer.copy_from_slice(d.bytes(buf_len)?);
            d.finish()?;
        }

        if let Some(v) = r.bool(TAG_PAUSED)? {
            self.paused = v;
        }

        if let Some(buf) = r.bytes(TAG_CLOCK) {
            let clock: [u8; 6] = buf.try_into().map_err(|_| SnapshotError::InvalidValue)?;
            self.clock = clock;
        }

        if let Some(buf) = r.bytes(TAG_RESET) {
            let mut d = Decoder::new(buf);
            self.reset_countdown = d.u16()?;
            self.critical_window = d.bool()?;
            self.mouse_disabled = d.bool()?;
            self.joystick_disabled = d.bool()?;
            self.both_mouse_and_joy = d.bool()?;
            self.mouse_enabled_during_reset = d.bool()?;
            d.finish()?;
        }

        if let Some(buf) = r.bytes(TAG_KEY_STATE) {
            if buf.len() != self.key_state.len() {
                return Err(SnapshotError::InvalidValue);
            }
            for (state, &raw) in self.key_state.iter_mut().zip(buf) {
                *state = raw != 0;
            }
        }

        if let Some(buf) = r.bytes(TAG_SCANCODE_TABLE) {
            let table: [u8; 128] = buf.try_into().map_err(|_| SnapshotError::InvalidValue)?;
            self.maps.scancodes = table;
        }

        if let Some(buf) = r.bytes(TAG_JOYPADS) {
            let mut d = Decoder::new(buf);
            for pad in &mut self.maps.pads {
                let scancode_len = pad.scancode_map.len();
                pad.scancode_map.copy_from_slice(d.bytes(scancode_len)?);
                let joystick_len = pad.joystick_map.len();
                pad.joystick_map.copy_from_slice(d.bytes(joystick_len)?);
                pad.source = match d.u8()? {
                    0 => JoyReg::Joy0,
                    1 => JoyReg::Joy1,
                    _ => return Err(SnapshotError::InvalidValue),
                };
                pad.last_raw = d.u16()?;
                pad.state = JoyState::from_bits_retain(d.u8()?);
            }
            d.finish()?;
        }

        if let Some(buf) = r.bytes(TAG_HOST) {
            let mut d = Decoder::new(buf);
            self.host.pending_dx = d.i32()?;
            self.host.pending_dy = d.i32()?;
            self.host.pending_wheel = d.i32()?;
            self.host.buttons = d.u8()?;
            self.host.prev_buttons = d.u8()?;
            self.host.joy_registers[0] = d.u16()?;
            self.host.joy_registers[1] = d.u16()?;
            d.finish()?;
        }

        if let Some(buf) = r.bytes(TAG_EXEC) {
            self.exec = decode_exec(buf)?;
        }

        if let Some(buf) = r.bytes(TAG_OUTPUT) {
            self.out.clear();
            self.out.extend(buf.iter().copied());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ikbd::ResetKind;

    #[test]
    fn fresh_controller_round_trips() {
        let a = IkbdController::new();
        let snap = a.save_state();

        let mut b = IkbdController::new();
        b.reset(ResetKind::Warm);
        b.load_state(&snap).expect("restore should succeed");
        assert_eq!(snap, b.save_state());
    }

    #[test]
    fn truncated_snapshot_is_rejected() {
        let mut ctrl = IkbdController::new();
        let err = ctrl.load_state(b"XXXX").unwrap_err();
        assert_eq!(err, SnapshotError::Truncated);
    }

    #[test]
    fn foreign_device_snapshot_is_rejected() {
        let other = SnapshotWriter::new(*b"OTHR", SnapshotVersion::new(1, 0)).finish();
        let mut ctrl = IkbdController::new();
        let err = ctrl.load_state(&other).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::DeviceIdMismatch {
                expected: *b"IKBD",
                found: *b"OTHR",
            }
        );
    }
}
