//! Fixed key codes the controller emits on its own behalf.

/// Key codes for host mouse movement reported in cursor-keycode mode.
pub(crate) const CURSOR_UP: u8 = 0x48;
pub(crate) const CURSOR_DOWN: u8 = 0x50;
pub(crate) const CURSOR_LEFT: u8 = 0x4B;
pub(crate) const CURSOR_RIGHT: u8 = 0x4D;

/// Pseudo key codes for the mouse buttons when they are reported as keys.
pub(crate) const KEY_MOUSE_LEFT: u8 = 0x74;
pub(crate) const KEY_MOUSE_RIGHT: u8 = 0x75;

/// Key codes for the extra host mouse buttons (middle, side, extra).
pub(crate) const KEY_MOUSE_MIDDLE: u8 = 0x37;
pub(crate) const KEY_MOUSE_SIDE: u8 = 0x5E;
pub(crate) const KEY_MOUSE_EXTRA: u8 = 0x5F;

/// One wheel detent is reported as an Eiffel-style extended sequence ending
/// in the wheel-up/wheel-down key code.
pub(crate) const WHEEL_UP_SEQUENCE: [u8; 8] = [0xF6, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x59];
pub(crate) const WHEEL_DOWN_SEQUENCE: [u8; 8] = [0xF6, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x5A];

/// Default host-keycode to scancode translation table, uploaded-over via the
/// load-memory command at controller address 0xA000.
pub(crate) const DEFAULT_SCANCODES: [u8; 128] = [
    0x5b, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, //
    0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x29, 0x00, 0x70, //
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, //
    0x18, 0x19, 0x1a, 0x1b, 0x00, 0x6d, 0x6e, 0x6f, //
    0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23, 0x24, 0x25, //
    0x26, 0x27, 0x28, 0x2b, 0x00, 0x6a, 0x6b, 0x6c, //
    0x60, 0x2c, 0x2d, 0x2e, 0x2f, 0x30, 0x31, 0x32, //
    0x33, 0x34, 0x35, 0x00, 0x71, 0x67, 0x68, 0x69, //
    0x39, 0x0e, 0x0f, 0x72, 0x1c, 0x01, 0x53, 0x00, //
    0x00, 0x00, 0x4a, 0x62, 0x48, 0x50, 0x4d, 0x4b, //
    0x3b, 0x3c, 0x3d, 0x3e, 0x3f, 0x40, 0x41, 0x42, //
    0x43, 0x44, 0x63, 0x64, 0x65, 0x66, 0x4e, 0x62, //
    0x2a, 0x36, 0x3a, 0x1d, 0x38, 0x4c, 0x56, 0x57, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x61, //
    0x47, 0x52, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x59, 0x5a, 0x5c, 0x5d, 0x37, 0x00, //
];
