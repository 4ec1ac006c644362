//! Byte sources and sinks the codecs read from and write to.
//!
//! A region is borrowed for the duration of a single decode or encode call;
//! no codec keeps a reference to it afterwards.

use crate::primitive::{check_bounds, TruncatedBuffer};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// An addressable source of bytes with a known length.
pub trait ReadRegion {
    /// Total length of the region in bytes.
    fn len(&self) -> io::Result<u64>;

    /// Returns `true` iff the region contains no bytes.
    fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Fills `buf` with the bytes starting at `offset`.
    ///
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if the region ends before
    /// `buf` is full.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()>;
}

/// An addressable sink of bytes.
pub trait WriteRegion {
    /// Writes all of `bytes` starting at `offset`.
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()>;

    /// Drops any bytes past `len`.
    ///
    /// Called by the writers of whole files once the file is written, so a
    /// shorter file doesn't keep the tail of whatever the region held
    /// before. Regions of fixed length, such as slices and windows, keep
    /// their length.
    fn truncate_to(&mut self, _len: u64) -> io::Result<()> {
        Ok(())
    }
}

fn to_usize(value: u64) -> io::Result<usize> {
    usize::try_from(value)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "offset exceeds address space"))
}

fn truncated(err: TruncatedBuffer) -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, err)
}

impl ReadRegion for [u8] {
    fn len(&self) -> io::Result<u64> {
        Ok(<[u8]>::len(self) as u64)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let range = check_bounds(<[u8]>::len(self), to_usize(offset)?, <[u8]>::len(buf)).map_err(truncated)?;
        buf.copy_from_slice(&self[range]);
        Ok(())
    }
}

impl ReadRegion for Vec<u8> {
    fn len(&self) -> io::Result<u64> {
        ReadRegion::len(self.as_slice())
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.as_slice().read_at(offset, buf)
    }
}

impl WriteRegion for [u8] {
    /// Writes into the existing bytes; a slice cannot grow, so writing past
    /// the end fails.
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        let range = check_bounds(<[u8]>::len(self), to_usize(offset)?, bytes.len()).map_err(truncated)?;
        self[range].copy_from_slice(bytes);
        Ok(())
    }
}

impl WriteRegion for Vec<u8> {
    /// Grows the vector as needed, zero-filling any gap before `offset`.
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        let start = to_usize(offset)?;
        let end = start
            .checked_add(bytes.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "write extends past address space"))?;
        if Vec::len(self) < end {
            self.resize(end, 0);
        }
        self[start..end].copy_from_slice(bytes);
        Ok(())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        if let Ok(len) = usize::try_from(len) {
            Vec::truncate(self, len);
        }
        Ok(())
    }
}

impl ReadRegion for File {
    fn len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let mut file = self;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }
}

impl WriteRegion for File {
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        self.write_all(bytes)
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        if ReadRegion::len(&*self)? > len {
            File::set_len(self, len)?;
        }
        Ok(())
    }
}

impl<'a, R: ReadRegion + ?Sized> ReadRegion for &'a R {
    fn len(&self) -> io::Result<u64> {
        (**self).len()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_at(offset, buf)
    }
}

impl<'a, R: ReadRegion + ?Sized> ReadRegion for &'a mut R {
    fn len(&self) -> io::Result<u64> {
        (**self).len()
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_at(offset, buf)
    }
}

impl<'a, W: WriteRegion + ?Sized> WriteRegion for &'a mut W {
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        (**self).write_at(offset, bytes)
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        (**self).truncate_to(len)
    }
}

/// A fixed-length window into a larger region, such as one matrix inside a
/// database container.
///
/// Offsets passed to the window are relative to its start, and its length is
/// the window length, so a codec reading through a `SubRegion` cannot see
/// the neighbouring bytes of the container.
///
/// # Example
///
/// ```
/// use matrix_converters::{ReadRegion, SubRegion};
///
/// let container: Vec<u8> = (0..16).collect();
/// let window = SubRegion::new(&container[..], 4, 8);
/// let mut buf = [0u8; 2];
/// window.read_at(0, &mut buf)?;
/// assert_eq!(buf, [4, 5]);
/// assert_eq!(window.len()?, 8);
/// assert!(window.read_at(7, &mut buf).is_err());
/// # Ok::<_, std::io::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SubRegion<R> {
    inner: R,
    start: u64,
    len: u64,
}

impl<R> SubRegion<R> {
    /// Creates a window of `len` bytes starting at `start` within `inner`.
    pub fn new(inner: R, start: u64, len: u64) -> Self {
        SubRegion { inner, start, len }
    }

    /// Returns the wrapped region.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn absolute(&self, offset: u64, count: usize) -> io::Result<u64> {
        match offset.checked_add(count as u64) {
            Some(end) if end <= self.len => Ok(self.start + offset),
            _ => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "access of {} bytes at offset {} exceeds sub-region of {} bytes",
                    count, offset, self.len
                ),
            )),
        }
    }
}

impl<R: ReadRegion> ReadRegion for SubRegion<R> {
    fn len(&self) -> io::Result<u64> {
        Ok(self.len)
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let absolute = self.absolute(offset, <[u8]>::len(buf))?;
        self.inner.read_at(absolute, buf)
    }
}

impl<W: WriteRegion> WriteRegion for SubRegion<W> {
    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> io::Result<()> {
        let absolute = self.absolute(offset, bytes.len())?;
        self.inner.write_at(absolute, bytes)
    }
}

/// Reads `len` bytes starting at `offset`, or reports how short the region is.
pub(crate) fn read_span<R: ReadRegion + ?Sized>(
    region: &R,
    offset: u64,
    len: usize,
) -> Result<Vec<u8>, crate::ReadMatrixError> {
    let region_len = region.len()?;
    let end = offset.checked_add(len as u64);
    match end {
        Some(end) if end <= region_len => {}
        _ => {
            return Err(TruncatedBuffer {
                offset: offset as usize,
                needed: len,
                len: region_len as usize,
            }
            .into())
        }
    }
    let mut buf = vec![0; len];
    region.read_at(offset, &mut buf)?;
    Ok(buf)
}
