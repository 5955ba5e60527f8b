use std::collections::BTreeMap;

use thiserror::Error;

/// Version of the outer TLV container itself. Device payloads carry their own
/// independent version next to it.
pub const FORMAT_VERSION: SnapshotVersion = SnapshotVersion::new(1, 0);

/// Header size: 4-byte device id + format major/minor + device major/minor.
const HEADER_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotVersion {
    pub major: u16,
    pub minor: u16,
}

impl SnapshotVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot truncated")]
    Truncated,
    #[error("snapshot is for device {found:?}, expected {expected:?}")]
    DeviceIdMismatch { expected: [u8; 4], found: [u8; 4] },
    #[error("unsupported snapshot format major version {0}")]
    UnsupportedFormat(u16),
    #[error("unsupported device snapshot major version {0}")]
    UnsupportedDeviceVersion(u16),
    #[error("field {tag} has length {found}, expected {expected}")]
    FieldLength {
        tag: u16,
        expected: usize,
        found: usize,
    },
    #[error("field value out of range")]
    InvalidValue,
    #[error("trailing bytes after decoded value")]
    TrailingBytes,
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Serializes one device snapshot: a fixed header followed by
/// `tag (u16) | len (u32) | value` fields, all little-endian.
#[derive(Debug)]
pub struct SnapshotWriter {
    buf: Vec<u8>,
}

impl SnapshotWriter {
    pub fn new(device_id: [u8; 4], device_version: SnapshotVersion) -> Self {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&device_id);
        buf.extend_from_slice(&FORMAT_VERSION.major.to_le_bytes());
        buf.extend_from_slice(&FORMAT_VERSION.minor.to_le_bytes());
        buf.extend_from_slice(&device_version.major.to_le_bytes());
        buf.extend_from_slice(&device_version.minor.to_le_bytes());
        Self { buf }
    }

    fn field(&mut self, tag: u16, value: &[u8]) {
        self.buf.extend_from_slice(&tag.to_le_bytes());
        self.buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(value);
    }

    pub fn field_u8(&mut self, tag: u16, value: u8) {
        self.field(tag, &[value]);
    }

    pub fn field_u16(&mut self, tag: u16, value: u16) {
        self.field(tag, &value.to_le_bytes());
    }

    pub fn field_u32(&mut self, tag: u16, value: u32) {
        self.field(tag, &value.to_le_bytes());
    }

    pub fn field_u64(&mut self, tag: u16, value: u64) {
        self.field(tag, &value.to_le_bytes());
    }

    pub fn field_i32(&mut self, tag: u16, value: i32) {
        self.field(tag, &value.to_le_bytes());
    }

    pub fn field_bool(&mut self, tag: u16, value: bool) {
        self.field(tag, &[u8::from(value)]);
    }

    pub fn field_bytes(&mut self, tag: u16, value: Vec<u8>) {
        self.field(tag, &value);
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Parses a snapshot produced by [`SnapshotWriter`]. Fields are looked up by
/// tag; a tag written twice resolves to its last occurrence.
#[derive(Debug)]
pub struct SnapshotReader<'a> {
    device_version: SnapshotVersion,
    fields: BTreeMap<u16, &'a [u8]>,
}

impl<'a> SnapshotReader<'a> {
    pub fn parse(bytes: &'a [u8], expected_id: [u8; 4]) -> SnapshotResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(SnapshotError::Truncated);
        }
        let found = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if found != expected_id {
            return Err(SnapshotError::DeviceIdMismatch {
                expected: expected_id,
                found,
            });
        }
        let format_major = u16::from_le_bytes([bytes[4], bytes[5]]);
        if format_major != FORMAT_VERSION.major {
            return Err(SnapshotError::UnsupportedFormat(format_major));
        }
        let device_version = SnapshotVersion::new(
            u16::from_le_bytes([bytes[8], bytes[9]]),
            u16::from_le_bytes([bytes[10], bytes[11]]),
        );

        let mut fields = BTreeMap::new();
        let mut pos = HEADER_LEN;
        while pos < bytes.len() {
            if bytes.len() - pos < 6 {
                return Err(SnapshotError::Truncated);
            }
            let tag = u16::from_le_bytes([bytes[pos], bytes[pos + 1]]);
            let len = u32::from_le_bytes([
                bytes[pos + 2],
                bytes[pos + 3],
                bytes[pos + 4],
                bytes[pos + 5],
            ]) as usize;
            pos += 6;
            if bytes.len() - pos < len {
                return Err(SnapshotError::Truncated);
            }
            fields.insert(tag, &bytes[pos..pos + len]);
            pos += len;
        }

        Ok(Self {
            device_version,
            fields,
        })
    }

    pub fn device_version(&self) -> SnapshotVersion {
        self.device_version
    }

    pub fn ensure_device_major(&self, major: u16) -> SnapshotResult<()> {
        if self.device_version.major != major {
            return Err(SnapshotError::UnsupportedDeviceVersion(
                self.device_version.major,
            ));
        }
        Ok(())
    }

    pub fn bytes(&self, tag: u16) -> Option<&'a [u8]> {
        self.fields.get(&tag).copied()
    }

    fn fixed<const N: usize>(&self, tag: u16) -> SnapshotResult<Option<[u8; N]>> {
        match self.fields.get(&tag) {
            None => Ok(None),
            Some(raw) => {
                let arr: [u8; N] =
                    (*raw)
                        .try_into()
                        .map_err(|_| SnapshotError::FieldLength {
                            tag,
                            expected: N,
                            found: raw.len(),
                        })?;
                Ok(Some(arr))
            }
        }
    }

    pub fn u8(&self, tag: u16) -> SnapshotResult<Option<u8>> {
        Ok(self.fixed::<1>(tag)?.map(|b| b[0]))
    }

    pub fn u16(&self, tag: u16) -> SnapshotResult<Option<u16>> {
        Ok(self.fixed::<2>(tag)?.map(u16::from_le_bytes))
    }

    pub fn u32(&self, tag: u16) -> SnapshotResult<Option<u32>> {
        Ok(self.fixed::<4>(tag)?.map(u32::from_le_bytes))
    }

    pub fn u64(&self, tag: u16) -> SnapshotResult<Option<u64>> {
        Ok(self.fixed::<8>(tag)?.map(u64::from_le_bytes))
    }

    pub fn i32(&self, tag: u16) -> SnapshotResult<Option<i32>> {
        Ok(self.fixed::<4>(tag)?.map(i32::from_le_bytes))
    }

    pub fn bool(&self, tag: u16) -> SnapshotResult<Option<bool>> {
        Ok(self.fixed::<1>(tag)?.map(|b| b[0] != 0))
    }
}
