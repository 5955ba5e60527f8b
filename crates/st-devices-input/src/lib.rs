//! Atari ST intelligent keyboard (IKBD) controller model.
//!
//! The IKBD is an HD6301 microcontroller that owns the keyboard matrix, the
//! mouse and the joystick ports, and talks to the main CPU over a serial
//! line (through the ACIA). This crate models the controller at the protocol
//! level: the documented command set, the reporting modes those commands
//! select, the periodic event reports, and the handful of known programs
//! that games uploaded into the controller's RAM (reproduced by behavior,
//! not by 6301 instruction emulation).
//!
//! The model is a pure state machine with two host-driven entry points:
//! [`IkbdController::receive_byte`] for each byte the CPU sends down the
//! serial line, and [`IkbdController::tick`] for each report cycle
//! (historically once per VBL). Controller-to-CPU bytes accumulate in an
//! internal queue drained with [`IkbdController::pop_output`].

mod custom;
mod ikbd;
mod joypad;
mod reports;
mod scancode;
mod snapshot;

pub use ikbd::{IkbdController, JoystickMode, MouseButton, MouseMode, ResetKind};
pub use joypad::{JoyReg, JoyState};
