use crate::elements::ElementType;
use crate::primitive::TruncatedBuffer;
use crate::zones::ZoneError;
use std::error::Error;
use std::fmt;
use std::io;

/// An error reading a matrix from a byte region.
#[derive(Debug)]
pub enum ReadMatrixError {
    /// An error caused by I/O on the underlying region.
    Io(io::Error),
    /// The region ended before all required bytes were read.
    TruncatedBuffer(TruncatedBuffer),
    /// The magic number at the start of an official binary file was not
    /// recognized at either byte order.
    UnrecognizedFormat {
        /// The first four bytes of the region.
        magic: [u8; 4],
    },
    /// The file declares a format version this crate cannot read.
    UnsupportedVersion(u32),
    /// A header field is structurally invalid.
    InvalidHeader(String),
    /// The region length disagrees with the length implied by the header.
    SizeMismatch {
        /// Byte length implied by the header.
        expected: u64,
        /// Actual byte length of the region.
        found: u64,
    },
    /// A FORTRAN record-length marker doesn't match the record it brackets.
    InvalidRecordMarker {
        /// Zero-based record number.
        record: usize,
        /// Byte length of the record payload.
        expected: u32,
        /// Value of the marker.
        found: u32,
    },
    /// A FORTRAN line number word doesn't match the line it precedes.
    InvalidLineNumber {
        /// Zero-based line number.
        line: usize,
        /// The 1-based number the word should contain.
        expected: i32,
        /// Value of the word.
        found: i32,
    },
    /// Bytes remain in the region after the matrix.
    ExtraBytes(u64),
    /// No square matrix fits the region length exactly.
    NotSquare {
        /// Byte length of the region.
        len: u64,
    },
    /// The stored element type is not the requested one.
    WrongElementType {
        /// The element type of the requested Rust type.
        expected: ElementType,
        /// The element type recorded in the file.
        found: ElementType,
    },
    /// The requested dimensions are zero or too large to address.
    InvalidShape {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },
    /// An error in the zone index stored in the file.
    Zone(ZoneError),
}

impl Error for ReadMatrixError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReadMatrixError::Io(err) => Some(err),
            ReadMatrixError::TruncatedBuffer(err) => Some(err),
            ReadMatrixError::Zone(err) => Some(err),
            ReadMatrixError::UnrecognizedFormat { .. }
            | ReadMatrixError::UnsupportedVersion(_)
            | ReadMatrixError::InvalidHeader(_)
            | ReadMatrixError::SizeMismatch { .. }
            | ReadMatrixError::InvalidRecordMarker { .. }
            | ReadMatrixError::InvalidLineNumber { .. }
            | ReadMatrixError::ExtraBytes(_)
            | ReadMatrixError::NotSquare { .. }
            | ReadMatrixError::WrongElementType { .. }
            | ReadMatrixError::InvalidShape { .. } => None,
        }
    }
}

impl fmt::Display for ReadMatrixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReadMatrixError::Io(err) => write!(f, "I/O error: {}", err),
            ReadMatrixError::TruncatedBuffer(err) => write!(f, "{}", err),
            ReadMatrixError::UnrecognizedFormat { magic } => write!(
                f,
                "unrecognized magic number: {:02x} {:02x} {:02x} {:02x}",
                magic[0], magic[1], magic[2], magic[3]
            ),
            ReadMatrixError::UnsupportedVersion(version) => write!(f, "unsupported format version: {}", version),
            ReadMatrixError::InvalidHeader(msg) => write!(f, "invalid header: {}", msg),
            ReadMatrixError::SizeMismatch { expected, found } => write!(
                f,
                "header implies {} bytes, but region is {} bytes long",
                expected, found
            ),
            ReadMatrixError::InvalidRecordMarker {
                record,
                expected,
                found,
            } => write!(
                f,
                "record marker of record {} is {}, but record is {} bytes long",
                record, found, expected
            ),
            ReadMatrixError::InvalidLineNumber {
                line,
                expected,
                found,
            } => write!(
                f,
                "line {} is numbered {}, expected {}",
                line, found, expected
            ),
            ReadMatrixError::ExtraBytes(num_extra_bytes) => {
                write!(f, "{} bytes remain after the matrix", num_extra_bytes)
            }
            ReadMatrixError::NotSquare { len } => write!(
                f,
                "region of {} bytes does not hold a square matrix",
                len
            ),
            ReadMatrixError::WrongElementType { expected, found } => write!(
                f,
                "expected elements of type {}, but file contains {}",
                expected, found
            ),
            ReadMatrixError::InvalidShape { rows, cols } => write!(f, "invalid matrix shape: {} x {}", rows, cols),
            ReadMatrixError::Zone(err) => write!(f, "zone index error: {}", err),
        }
    }
}

impl From<io::Error> for ReadMatrixError {
    fn from(err: io::Error) -> ReadMatrixError {
        ReadMatrixError::Io(err)
    }
}

impl From<TruncatedBuffer> for ReadMatrixError {
    fn from(err: TruncatedBuffer) -> ReadMatrixError {
        ReadMatrixError::TruncatedBuffer(err)
    }
}

impl From<ZoneError> for ReadMatrixError {
    fn from(err: ZoneError) -> ReadMatrixError {
        ReadMatrixError::Zone(err)
    }
}

/// An error writing a matrix to a byte region.
#[derive(Debug)]
pub enum WriteMatrixError {
    /// An error caused by I/O on the underlying region.
    Io(io::Error),
    /// A fixed-size buffer was too small for the encoded matrix.
    TruncatedBuffer(TruncatedBuffer),
    /// The matrix has a zero-length axis or is too large for the format.
    InvalidShape {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },
    /// The format requires a square matrix.
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },
    /// The zone index doesn't have one zone per row or column.
    ZoneCountMismatch {
        /// Number of zones in the index.
        zones: usize,
        /// Length of the matrix axis.
        len: usize,
    },
}

impl Error for WriteMatrixError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WriteMatrixError::Io(err) => Some(err),
            WriteMatrixError::TruncatedBuffer(err) => Some(err),
            WriteMatrixError::InvalidShape { .. }
            | WriteMatrixError::NotSquare { .. }
            | WriteMatrixError::ZoneCountMismatch { .. } => None,
        }
    }
}

impl fmt::Display for WriteMatrixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WriteMatrixError::Io(err) => write!(f, "I/O error: {}", err),
            WriteMatrixError::TruncatedBuffer(err) => write!(f, "{}", err),
            WriteMatrixError::InvalidShape { rows, cols } => {
                write!(f, "invalid matrix shape: {} x {}", rows, cols)
            }
            WriteMatrixError::NotSquare { rows, cols } => {
                write!(f, "matrix must be square, but is {} x {}", rows, cols)
            }
            WriteMatrixError::ZoneCountMismatch { zones, len } => write!(
                f,
                "zone index has {} zones, but matrix axis has length {}",
                zones, len
            ),
        }
    }
}

impl From<io::Error> for WriteMatrixError {
    fn from(err: io::Error) -> WriteMatrixError {
        WriteMatrixError::Io(err)
    }
}

impl From<TruncatedBuffer> for WriteMatrixError {
    fn from(err: TruncatedBuffer) -> WriteMatrixError {
        WriteMatrixError::TruncatedBuffer(err)
    }
}
