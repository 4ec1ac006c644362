//! Bounds-checked reads and writes of fixed-width words at byte offsets.
//!
//! Every multi-byte access made by the codecs goes through this module, so a
//! short buffer always surfaces as [`TruncatedBuffer`] instead of a panic or
//! a silently shortened matrix.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::error::Error;
use std::fmt;
use std::ops::Range;

/// Byte order of the words in a buffer.
///
/// The legacy tools that produce these files disagree on byte order, so it is
/// always passed explicitly rather than assumed from the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endian {
    /// Least significant byte first. The convention of every x86 tool, and
    /// therefore the default.
    Little,
    /// Most significant byte first.
    Big,
}

impl Default for Endian {
    fn default() -> Self {
        Endian::Little
    }
}

impl Endian {
    /// Byte order of the host.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endian::Little => write!(f, "little-endian"),
            Endian::Big => write!(f, "big-endian"),
        }
    }
}

/// A read or write would have gone past the end of the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TruncatedBuffer {
    /// Offset of the first byte of the attempted access.
    pub offset: usize,
    /// Number of bytes the access needed.
    pub needed: usize,
    /// Length of the buffer.
    pub len: usize,
}

impl Error for TruncatedBuffer {}

impl fmt::Display for TruncatedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "buffer truncated: needed {} bytes at offset {}, but buffer is only {} bytes long",
            self.needed, self.offset, self.len
        )
    }
}

/// Returns the byte range `offset..offset + needed` iff it lies within a
/// buffer of length `len`.
pub fn check_bounds(len: usize, offset: usize, needed: usize) -> Result<Range<usize>, TruncatedBuffer> {
    let err = TruncatedBuffer {
        offset,
        needed,
        len,
    };
    match offset.checked_add(needed) {
        Some(end) if end <= len => Ok(offset..end),
        _ => Err(err),
    }
}

/// Byte range of `count` words of `width` bytes starting at `offset`.
fn span(len: usize, offset: usize, width: usize, count: usize) -> Result<Range<usize>, TruncatedBuffer> {
    let needed = width.checked_mul(count).ok_or(TruncatedBuffer {
        offset,
        needed: usize::MAX,
        len,
    })?;
    check_bounds(len, offset, needed)
}

macro_rules! impl_primitive {
    ($ty:ty, $width:expr, $read:ident, $write:ident, $read_into:ident, $write_from:ident) => {
        #[doc = concat!("Reads one `", stringify!($ty), "` at `offset`.")]
        pub fn $read(buf: &[u8], offset: usize, endian: Endian) -> Result<$ty, TruncatedBuffer> {
            let bytes = &buf[check_bounds(buf.len(), offset, $width)?];
            Ok(match endian {
                Endian::Little => LittleEndian::$read(bytes),
                Endian::Big => BigEndian::$read(bytes),
            })
        }

        #[doc = concat!("Writes one `", stringify!($ty), "` at `offset`.")]
        pub fn $write(buf: &mut [u8], offset: usize, value: $ty, endian: Endian) -> Result<(), TruncatedBuffer> {
            let range = check_bounds(buf.len(), offset, $width)?;
            let bytes = &mut buf[range];
            match endian {
                Endian::Little => LittleEndian::$write(bytes, value),
                Endian::Big => BigEndian::$write(bytes, value),
            }
            Ok(())
        }

        #[doc = concat!("Fills `out` with consecutive `", stringify!($ty), "` words starting at `offset`.")]
        pub fn $read_into(buf: &[u8], offset: usize, endian: Endian, out: &mut [$ty]) -> Result<(), TruncatedBuffer> {
            let bytes = &buf[span(buf.len(), offset, $width, out.len())?];
            match endian {
                Endian::Little => LittleEndian::$read_into(bytes, out),
                Endian::Big => BigEndian::$read_into(bytes, out),
            }
            Ok(())
        }

        #[doc = concat!("Writes `values` as consecutive `", stringify!($ty), "` words starting at `offset`.")]
        pub fn $write_from(buf: &mut [u8], offset: usize, values: &[$ty], endian: Endian) -> Result<(), TruncatedBuffer> {
            let range = span(buf.len(), offset, $width, values.len())?;
            let bytes = &mut buf[range];
            match endian {
                Endian::Little => LittleEndian::$write_from(values, bytes),
                Endian::Big => BigEndian::$write_from(values, bytes),
            }
            Ok(())
        }
    };
}

impl_primitive!(u32, 4, read_u32, write_u32, read_u32_into, write_u32_into);
impl_primitive!(i32, 4, read_i32, write_i32, read_i32_into, write_i32_into);
impl_primitive!(f32, 4, read_f32, write_f32, read_f32_into, write_f32_into);
impl_primitive!(f64, 8, read_f64, write_f64, read_f64_into, write_f64_into);
