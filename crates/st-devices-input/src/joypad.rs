//! Joypad bindings and the controller-address memory map.
//!
//! Each of the four virtual pads carries two 16-entry tables: a scancode map
//! (raw register bit -> key code emitted on edges, 0 = no key) and a
//! joystick map (raw register bit -> direction/fire mask contribution).
//! Both tables, plus the global scancode translation table, are exposed to
//! the CPU through a 16-bit controller address space so that the
//! load-memory/read-memory commands can patch them.

use bitflags::bitflags;

use crate::scancode::DEFAULT_SCANCODES;

bitflags! {
    /// Direction/fire mask of one joystick lane, as reported on the wire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct JoyState: u8 {
        const UP = 0x01;
        const DOWN = 0x02;
        const LEFT = 0x04;
        const RIGHT = 0x08;
        const FIRE = 0x80;
    }
}

/// The two 16-bit digital input registers the pads sample from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoyReg {
    Joy0,
    Joy1,
}

impl JoyReg {
    pub(crate) fn index(self) -> usize {
        match self {
            JoyReg::Joy0 => 0,
            JoyReg::Joy1 => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Joypad {
    /// Raw-register bit -> key code (0 = none). Kept as raw bytes so the
    /// memory-map resolver can hand out mutable references into it.
    pub scancode_map: [u8; 16],
    /// Raw-register bit -> joystick mask contribution.
    pub joystick_map: [u8; 16],
    pub source: JoyReg,
    /// Last raw sample, for edge detection.
    pub last_raw: u16,
    /// Decoded direction/fire state from the last sample.
    pub state: JoyState,
}

impl Joypad {
    fn fire_only(source: JoyReg) -> Self {
        let mut joystick_map = [0u8; 16];
        joystick_map[0] = JoyState::FIRE.bits();
        joystick_map[12] = JoyState::DOWN.bits();
        joystick_map[13] = JoyState::RIGHT.bits();
        joystick_map[14] = JoyState::UP.bits();
        joystick_map[15] = JoyState::LEFT.bits();
        Self {
            scancode_map: [0; 16],
            joystick_map,
            source,
            last_raw: 0,
            state: JoyState::empty(),
        }
    }

    fn with_buttons(source: JoyReg) -> Self {
        let mut pad = Self::fire_only(source);
        // The face/shoulder buttons double as key codes and as fire/direction
        // combinations.
        pad.scancode_map[4..12].copy_from_slice(&[20, 21, 22, 23, 24, 25, 30, 31]);
        pad.joystick_map[1] = JoyState::UP.bits();
        pad.joystick_map[2] = (JoyState::FIRE | JoyState::UP).bits();
        pad.joystick_map[3] = (JoyState::FIRE | JoyState::DOWN).bits();
        pad
    }
}

/// Base of the global scancode translation table in controller address space.
const SCANCODE_TABLE_BASE: u16 = 0xA000;
/// Base of the per-pad map block; each pad occupies a 0x100-aligned slot
/// holding its scancode map at +0x00 and its joystick map at +0x10.
const PAD_TABLE_BASE: u16 = 0xB000;

/// Host-visible controller tables addressed by the memory commands.
#[derive(Debug, Clone)]
pub(crate) struct InputMaps {
    pub scancodes: [u8; 128],
    pub pads: [Joypad; 4],
}

impl InputMaps {
    pub fn new() -> Self {
        Self {
            scancodes: DEFAULT_SCANCODES,
            pads: [
                Joypad::fire_only(JoyReg::Joy0),
                Joypad::with_buttons(JoyReg::Joy1),
                Joypad::fire_only(JoyReg::Joy0),
                Joypad::with_buttons(JoyReg::Joy1),
            ],
        }
    }

    /// Resolve a controller address to one of the mapped table bytes.
    /// Unmapped addresses return `None`: reads yield zero, writes are
    /// discarded by the callers.
    pub fn resolve_mut(&mut self, addr: u16) -> Option<&mut u8> {
        if (SCANCODE_TABLE_BASE..SCANCODE_TABLE_BASE + 0x80).contains(&addr) {
            return Some(&mut self.scancodes[usize::from(addr - SCANCODE_TABLE_BASE)]);
        }
        for (i, pad) in self.pads.iter_mut().enumerate() {
            let base = PAD_TABLE_BASE + 0x100 * i as u16;
            if (base..base + 0x10).contains(&addr) {
                return Some(&mut pad.scancode_map[usize::from(addr - base)]);
            }
            if (base + 0x10..base + 0x20).contains(&addr) {
                return Some(&mut pad.joystick_map[usize::from(addr - base - 0x10)]);
            }
        }
        None
    }

    pub fn read(&self, addr: u16) -> u8 {
        if (SCANCODE_TABLE_BASE..SCANCODE_TABLE_BASE + 0x80).contains(&addr) {
            return self.scancodes[usize::from(addr - SCANCODE_TABLE_BASE)];
        }
        for (i, pad) in self.pads.iter().enumerate() {
            let base = PAD_TABLE_BASE + 0x100 * i as u16;
            if (base..base + 0x10).contains(&addr) {
                return pad.scancode_map[usize::from(addr - base)];
            }
            if (base + 0x10..base + 0x20).contains(&addr) {
                return pad.joystick_map[usize::from(addr - base - 0x10)];
            }
        }
        0
    }
}
