//! Deterministic snapshot encoding for emulated device models.
//!
//! The snapshot format uses a small tag-length-value (TLV) encoding to provide:
//! - deterministic byte output (fields are written in a fixed order)
//! - forward compatibility (unknown tags are skipped on load)
//! - explicit versioning (major/minor) at both format and device level

pub mod codec;
mod tlv;

pub use tlv::{
    SnapshotError, SnapshotReader, SnapshotResult, SnapshotVersion, SnapshotWriter,
    FORMAT_VERSION,
};

/// Snapshotting contract for emulated device models.
///
/// Implementations must keep `DEVICE_ID` stable forever and only perform
/// forward-compatible additions within the same major version by adding new
/// TLV fields.
pub trait IoSnapshot {
    const DEVICE_ID: [u8; 4];
    const DEVICE_VERSION: SnapshotVersion;

    fn save_state(&self) -> Vec<u8>;
    fn load_state(&mut self, bytes: &[u8]) -> SnapshotResult<()>;
}
