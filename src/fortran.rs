//! Headerless matrices written by FORTRAN programs.
//!
//! The file is a dense block of elements, one *line* (a row in row-major
//! order, a column in column-major order) after another. Depending on the
//! program that wrote it, the block may also contain
//!
//! * record-length markers: a 4-byte byte count before and after each
//!   record, where a record is either the whole block or a single line
//!   (the layout of FORTRAN unformatted sequential files), and
//! * line numbers: a 4-byte `i32` holding the 1-based line number in front
//!   of each line.
//!
//! Nothing in the file says which of these it uses, or what its shape is,
//! so the caller has to. Markers and line numbers are verified when reading.

use crate::elements::Element;
use crate::order::{flatten, isqrt, unflatten, Order};
use crate::primitive::{self, Endian};
use crate::region::{read_span, ReadRegion, WriteRegion};
use crate::{ReadMatrixError, WriteMatrixError};
use log::{debug, trace};
use ndarray::prelude::*;
use ndarray::Data;

/// Width of a record marker or line number word.
const WORD: usize = 4;

/// Which parts of the block are bracketed by record-length markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordMarkers {
    /// No markers (stream/direct-access output).
    None,
    /// One record holding the whole matrix.
    Whole,
    /// One record per line.
    PerLine,
}

impl Default for RecordMarkers {
    fn default() -> Self {
        RecordMarkers::None
    }
}

/// Reader/writer for FORTRAN-convention matrix files.
///
/// Defaults to column-major, little-endian, with no record markers and no
/// line numbers. Note that this differs from [`EmxCodec`](crate::EmxCodec),
/// which defaults to row-major.
///
/// # Example
///
/// ```
/// use matrix_converters::{FortranCodec, RecordMarkers};
/// use ndarray::array;
///
/// let codec = FortranCodec::new().with_markers(RecordMarkers::Whole);
/// let m = array![[1f32, 2.], [3., 4.]];
/// let mut file = Vec::<u8>::new();
/// codec.encode(&m, &mut file)?;
/// assert_eq!(file.len(), 4 + 16 + 4);
/// assert_eq!(codec.decode::<f32, _>(&file, (2, 2))?, m);
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FortranCodec {
    /// Cell order.
    pub order: Order,
    /// Byte order of elements, markers, and line numbers.
    pub endian: Endian,
    /// Record-length markers.
    pub markers: RecordMarkers,
    /// Whether each line is preceded by its 1-based line number.
    pub line_numbers: bool,
}

impl Default for FortranCodec {
    fn default() -> Self {
        FortranCodec {
            order: Order::ColumnMajor,
            endian: Endian::Little,
            markers: RecordMarkers::None,
            line_numbers: false,
        }
    }
}

/// Byte layout of a block with a given shape.
#[derive(Clone, Copy, Debug)]
struct Layout {
    lines: usize,
    line_len: usize,
    /// Bytes in one line including its line number, excluding markers.
    line_bytes: usize,
    total: usize,
}

impl FortranCodec {
    /// Creates a codec with the default settings.
    pub fn new() -> Self {
        FortranCodec::default()
    }

    /// The `.bin` convention of Bill Davidson's FORTRAN tools: row-major
    /// little-endian lines, each preceded by its row number, no markers.
    pub fn davidson() -> Self {
        FortranCodec {
            order: Order::RowMajor,
            endian: Endian::Little,
            markers: RecordMarkers::None,
            line_numbers: true,
        }
    }

    /// Sets the cell order.
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Sets the byte order.
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Sets the record markers.
    pub fn with_markers(mut self, markers: RecordMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Sets whether lines are numbered.
    pub fn with_line_numbers(mut self, line_numbers: bool) -> Self {
        self.line_numbers = line_numbers;
        self
    }

    fn layout(&self, shape: (usize, usize), width: usize) -> Option<Layout> {
        if shape.0 == 0 || shape.1 == 0 {
            return None;
        }
        let (lines, line_len) = self.order.lines(shape);
        if self.line_numbers && lines > i32::MAX as usize {
            return None;
        }
        let number_bytes = if self.line_numbers { WORD } else { 0 };
        let line_bytes = line_len.checked_mul(width)?.checked_add(number_bytes)?;
        let total = match self.markers {
            RecordMarkers::None => lines.checked_mul(line_bytes)?,
            RecordMarkers::Whole => lines.checked_mul(line_bytes)?.checked_add(2 * WORD)?,
            RecordMarkers::PerLine => lines.checked_mul(line_bytes.checked_add(2 * WORD)?)?,
        };
        // Every marker must fit in a 4-byte word.
        let record_bytes = match self.markers {
            RecordMarkers::None => 0,
            RecordMarkers::Whole => total - 2 * WORD,
            RecordMarkers::PerLine => line_bytes,
        };
        if record_bytes > u32::MAX as usize {
            return None;
        }
        Some(Layout {
            lines,
            line_len,
            line_bytes,
            total,
        })
    }

    fn check_marker(
        &self,
        bytes: &[u8],
        pos: usize,
        record: usize,
        expected: usize,
    ) -> Result<(), ReadMatrixError> {
        let found = primitive::read_u32(bytes, pos, self.endian)?;
        trace!("record {} marker at {}: {}", record, pos, found);
        if found as usize != expected {
            return Err(ReadMatrixError::InvalidRecordMarker {
                record,
                expected: expected as u32,
                found,
            });
        }
        Ok(())
    }

    /// Reads a `rows × cols` matrix filling the whole region.
    ///
    /// **Errors** with [`ReadMatrixError::TruncatedBuffer`] if the region is
    /// shorter than the shape requires, [`ReadMatrixError::ExtraBytes`] if it
    /// is longer, and [`ReadMatrixError::InvalidRecordMarker`] or
    /// [`ReadMatrixError::InvalidLineNumber`] if a marker or line number
    /// disagrees with the layout.
    pub fn decode<A, R>(&self, region: &R, shape: (usize, usize)) -> Result<Array2<A>, ReadMatrixError>
    where
        A: Element,
        R: ReadRegion + ?Sized,
    {
        let layout = self
            .layout(shape, A::ELEMENT_TYPE.width())
            .ok_or(ReadMatrixError::InvalidShape {
                rows: shape.0,
                cols: shape.1,
            })?;
        debug!(
            "reading {}x{} {} FORTRAN matrix ({}, {}, {:?} markers, line numbers {})",
            shape.0,
            shape.1,
            A::ELEMENT_TYPE,
            self.order,
            self.endian,
            self.markers,
            self.line_numbers
        );
        let region_len = region.len()?;
        if region_len > layout.total as u64 {
            return Err(ReadMatrixError::ExtraBytes(region_len - layout.total as u64));
        }
        let bytes = read_span(region, 0, layout.total)?;

        let width = A::ELEMENT_TYPE.width();
        let mut data = vec![A::zero(); layout.lines * layout.line_len];
        let mut pos = 0;
        if self.markers == RecordMarkers::Whole {
            self.check_marker(&bytes, pos, 0, layout.total - 2 * WORD)?;
            pos += WORD;
        }
        for (line, out) in data.chunks_exact_mut(layout.line_len).enumerate() {
            if self.markers == RecordMarkers::PerLine {
                self.check_marker(&bytes, pos, line, layout.line_bytes)?;
                pos += WORD;
            }
            if self.line_numbers {
                let expected = line as i32 + 1;
                let found = primitive::read_i32(&bytes, pos, self.endian)?;
                if found != expected {
                    return Err(ReadMatrixError::InvalidLineNumber {
                        line,
                        expected,
                        found,
                    });
                }
                pos += WORD;
            }
            A::read_slice(&bytes, pos, self.endian, out)?;
            pos += layout.line_len * width;
            if self.markers == RecordMarkers::PerLine {
                self.check_marker(&bytes, pos, line, layout.line_bytes)?;
                pos += WORD;
            }
        }
        if self.markers == RecordMarkers::Whole {
            self.check_marker(&bytes, pos, 0, layout.total - 2 * WORD)?;
            pos += WORD;
        }
        debug_assert_eq!(pos, layout.total);
        unflatten(shape, self.order, data)
    }

    /// Reads a square matrix filling the whole region, inferring the number
    /// of zones from the region length.
    ///
    /// **Errors** with [`ReadMatrixError::NotSquare`] if no square shape has
    /// exactly the region's length under this layout.
    pub fn decode_square<A, R>(&self, region: &R) -> Result<Array2<A>, ReadMatrixError>
    where
        A: Element,
        R: ReadRegion + ?Sized,
    {
        let len = region.len()?;
        let n = self
            .infer_square(len, A::ELEMENT_TYPE.width())
            .ok_or(ReadMatrixError::NotSquare { len })?;
        self.decode(region, (n, n))
    }

    /// Solves `width * n² + per_line * n + fixed == len` for a positive `n`.
    fn infer_square(&self, len: u64, width: usize) -> Option<usize> {
        let width = width as u64;
        let number_bytes = if self.line_numbers { WORD as u64 } else { 0 };
        let (per_line, fixed) = match self.markers {
            RecordMarkers::None => (number_bytes, 0),
            RecordMarkers::Whole => (number_bytes, 2 * WORD as u64),
            RecordMarkers::PerLine => (number_bytes + 2 * WORD as u64, 0),
        };
        let rest = len.checked_sub(fixed)?;
        let discriminant = (4 * width)
            .checked_mul(rest)?
            .checked_add(per_line * per_line)?;
        let n = (isqrt(discriminant).checked_sub(per_line)?) / (2 * width);
        let n = usize::try_from(n).ok().filter(|&n| n > 0)?;
        match self.layout((n, n), width as usize) {
            Some(layout) if layout.total as u64 == len => Some(n),
            _ => None,
        }
    }

    /// Writes `matrix` as a complete file at the start of `region`, cutting
    /// growable regions to the file's length.
    pub fn encode<A, S, W>(&self, matrix: &ArrayBase<S, Ix2>, region: &mut W) -> Result<(), WriteMatrixError>
    where
        A: Element,
        S: Data<Elem = A>,
        W: WriteRegion + ?Sized,
    {
        let shape = matrix.dim();
        let width = A::ELEMENT_TYPE.width();
        let layout = self
            .layout(shape, width)
            .ok_or(WriteMatrixError::InvalidShape {
                rows: shape.0,
                cols: shape.1,
            })?;
        debug!(
            "writing {}x{} {} FORTRAN matrix ({}, {}, {:?} markers, line numbers {}), {} bytes",
            shape.0,
            shape.1,
            A::ELEMENT_TYPE,
            self.order,
            self.endian,
            self.markers,
            self.line_numbers,
            layout.total
        );
        let flat = flatten(matrix, self.order);
        let mut bytes = vec![0; layout.total];
        let mut pos = 0;
        // `layout` guarantees every marker fits in a u32.
        let whole_marker = (layout.total - 2 * WORD) as u32;
        let line_marker = layout.line_bytes as u32;
        if self.markers == RecordMarkers::Whole {
            primitive::write_u32(&mut bytes, pos, whole_marker, self.endian)?;
            pos += WORD;
        }
        for (line, values) in flat.chunks_exact(layout.line_len).enumerate() {
            if self.markers == RecordMarkers::PerLine {
                primitive::write_u32(&mut bytes, pos, line_marker, self.endian)?;
                pos += WORD;
            }
            if self.line_numbers {
                primitive::write_i32(&mut bytes, pos, line as i32 + 1, self.endian)?;
                pos += WORD;
            }
            A::write_slice(&mut bytes, pos, values, self.endian)?;
            pos += values.len() * width;
            if self.markers == RecordMarkers::PerLine {
                primitive::write_u32(&mut bytes, pos, line_marker, self.endian)?;
                pos += WORD;
            }
        }
        if self.markers == RecordMarkers::Whole {
            primitive::write_u32(&mut bytes, pos, whole_marker, self.endian)?;
            pos += WORD;
        }
        debug_assert_eq!(pos, layout.total);
        region.write_at(0, &bytes)?;
        region.truncate_to(bytes.len() as u64)?;
        Ok(())
    }
}
