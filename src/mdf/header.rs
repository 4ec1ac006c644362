use crate::elements::ElementType;
use crate::primitive::{self, check_bounds, Endian};
use crate::{ReadMatrixError, WriteMatrixError};

/// Magic number identifying an official binary matrix file. It is written
/// in the file's own byte order, which is how the byte order is detected.
pub(crate) const MAGIC: u32 = 0xC4D4_F1B2;

/// Bit of the type word set when the file carries no index tables and its
/// zones are `0..n` on every axis.
pub(crate) const IMPLICIT_INDEX: u32 = 0x0001_0000;

const ELEMENT_CODE_MASK: u32 = 0x0000_FFFF;

/// Most dimensions a file may have: a matrix.
const MAX_NDIM: u32 = 2;

/// Length of the part of the header before the axis lengths: magic,
/// version, type word, and ndim.
const PREFIX_LEN: usize = 4 * 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Version {
    V1,
}

impl Version {
    fn from_u32(version: u32) -> Result<Self, ReadMatrixError> {
        match version {
            1 => Ok(Version::V1),
            other => Err(ReadMatrixError::UnsupportedVersion(other)),
        }
    }

    fn as_u32(self) -> u32 {
        match self {
            Version::V1 => 1,
        }
    }
}

/// Parsed header of an official binary file.
///
/// Only lives for the duration of one read or write.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Header {
    pub endian: Endian,
    pub element_type: ElementType,
    /// Axis lengths: one for a vector, rows and columns for a matrix.
    pub shape: Vec<usize>,
    /// One table of zone identifiers per axis, or `None` for the implicit
    /// index.
    pub index: Option<Vec<Vec<i32>>>,
}

fn invalid(msg: impl Into<String>) -> ReadMatrixError {
    ReadMatrixError::InvalidHeader(msg.into())
}

/// Reads an axis length, which must be positive and usable as an `i32` zone
/// position.
fn read_axis_len(buf: &[u8], offset: usize, endian: Endian, axis: usize) -> Result<usize, ReadMatrixError> {
    let len = primitive::read_u32(buf, offset, endian)?;
    if len == 0 {
        return Err(invalid(format!("axis {} has length 0", axis)));
    }
    if len > i32::MAX as u32 {
        return Err(invalid(format!("axis {} length {} is too large", axis, len)));
    }
    usize::try_from(len).map_err(|_| invalid(format!("axis {} length {} is too large", axis, len)))
}

impl Header {
    /// Offset of the first index table, or of the data if there is none.
    fn shape_end(&self) -> usize {
        PREFIX_LEN + 4 * self.shape.len()
    }

    /// Number of bytes the header occupies in the file.
    pub fn byte_len(&self) -> usize {
        let tables: usize = match &self.index {
            Some(tables) => tables.iter().map(|table| 4 * table.len()).sum(),
            None => 0,
        };
        self.shape_end() + tables
    }

    /// Number of elements in the data block.
    pub fn element_count(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |count, &len| count.checked_mul(len))
    }

    /// Number of bytes of the data block that follows the header.
    pub fn data_len(&self) -> Option<usize> {
        self.element_count()?.checked_mul(self.element_type.width())
    }

    /// Parses the header at the start of `buf`.
    ///
    /// Checks only the header itself; comparing the declared size with the
    /// length of the file is up to the caller.
    pub fn parse(buf: &[u8]) -> Result<Header, ReadMatrixError> {
        // Detect the byte order from the magic number.
        let endian = if primitive::read_u32(buf, 0, Endian::Little)? == MAGIC {
            Endian::Little
        } else if primitive::read_u32(buf, 0, Endian::Big)? == MAGIC {
            Endian::Big
        } else {
            let mut magic = [0; 4];
            magic.copy_from_slice(&buf[..4]);
            return Err(ReadMatrixError::UnrecognizedFormat { magic });
        };

        let version = Version::from_u32(primitive::read_u32(buf, 4, endian)?)?;
        debug_assert_eq!(version, Version::V1);

        let type_word = primitive::read_u32(buf, 8, endian)?;
        let code = type_word & ELEMENT_CODE_MASK;
        let flags = type_word & !ELEMENT_CODE_MASK;
        if flags & !IMPLICIT_INDEX != 0 {
            return Err(invalid(format!("unknown flags {:#010x}", flags)));
        }
        let element_type = ElementType::from_code(code)
            .ok_or_else(|| invalid(format!("unknown element type code {}", code)))?;

        let ndim = primitive::read_u32(buf, 12, endian)?;
        if ndim == 0 || ndim > MAX_NDIM {
            return Err(invalid(format!(
                "expected 1 to {} dimensions, found {}",
                MAX_NDIM, ndim
            )));
        }
        let shape = (0..ndim as usize)
            .map(|axis| read_axis_len(buf, PREFIX_LEN + 4 * axis, endian, axis))
            .collect::<Result<Vec<_>, _>>()?;
        let mut header = Header {
            endian,
            element_type,
            shape,
            index: None,
        };
        if header.data_len().is_none() {
            return Err(invalid(format!(
                "{:?} array of {} overflows the address space",
                header.shape, element_type
            )));
        }

        if flags & IMPLICIT_INDEX == 0 {
            // Check the whole span up front so a corrupt axis length can't
            // trigger a huge allocation.
            let tables_len = header
                .shape
                .iter()
                .try_fold(0usize, |total, &len| total.checked_add(len))
                .and_then(|n| n.checked_mul(4))
                .ok_or_else(|| invalid("index tables overflow the address space"))?;
            let mut offset = header.shape_end();
            check_bounds(buf.len(), offset, tables_len)?;
            let mut tables = Vec::with_capacity(header.shape.len());
            for &len in &header.shape {
                let mut table = vec![0; len];
                primitive::read_i32_into(buf, offset, endian, &mut table)?;
                offset += 4 * len;
                tables.push(table);
            }
            header.index = Some(tables);
        }
        Ok(header)
    }

    /// Formats the header as bytes, ready to be followed by the data block.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WriteMatrixError> {
        let shape_error = || match self.shape[..] {
            [rows, cols] => WriteMatrixError::InvalidShape { rows, cols },
            [len] => WriteMatrixError::InvalidShape { rows: len, cols: 1 },
            _ => WriteMatrixError::InvalidShape { rows: 0, cols: 0 },
        };
        if self.shape.is_empty() || self.shape.len() > MAX_NDIM as usize {
            return Err(shape_error());
        }
        let mut words = Vec::with_capacity(4 + self.shape.len());
        let mut type_word = self.element_type.code();
        if self.index.is_none() {
            type_word |= IMPLICIT_INDEX;
        }
        words.extend_from_slice(&[MAGIC, Version::V1.as_u32(), type_word, self.shape.len() as u32]);
        for &len in &self.shape {
            let word = u32::try_from(len)
                .ok()
                .filter(|&word| word > 0 && word <= i32::MAX as u32)
                .ok_or_else(shape_error)?;
            words.push(word);
        }

        let mut out = vec![0; self.byte_len()];
        let endian = self.endian;
        primitive::write_u32_into(&mut out, 0, &words, endian)?;
        if let Some(tables) = &self.index {
            debug_assert_eq!(tables.len(), self.shape.len());
            let mut offset = self.shape_end();
            for (table, &len) in tables.iter().zip(&self.shape) {
                debug_assert_eq!(table.len(), len);
                primitive::write_i32_into(&mut out, offset, table, endian)?;
                offset += 4 * table.len();
            }
        }
        Ok(out)
    }
}
