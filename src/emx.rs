//! Internal matrix records, as stored inside an Emme database (`.emx` files
//! under `emmemat/`).
//!
//! A record is nothing but `rows * cols` elements with no header, so the
//! shape and byte offset have to come from the enclosing container. Reading
//! with the wrong shape or offset can't be detected here beyond running out
//! of bytes; it silently produces a garbled matrix. Callers must take the
//! dimensions from the container's own metadata.

use crate::elements::Element;
use crate::order::{flatten, isqrt, unflatten, Order};
use crate::primitive::Endian;
use crate::region::{read_span, ReadRegion, WriteRegion};
use crate::zones::resize_square;
use crate::{ReadMatrixError, WriteMatrixError};
use log::{debug, warn};
use ndarray::prelude::*;
use ndarray::Data;

/// Reader/writer for headerless internal matrix records.
///
/// Defaults to row-major, little-endian records.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use matrix_converters::EmxCodec;
///
/// let m = array![[0f32, 1.5], [2.5, 0.]];
/// let mut record = Vec::<u8>::new();
/// EmxCodec::new().encode(&m, &mut record, 0)?;
/// assert_eq!(record.len(), 16);
/// let back = EmxCodec::new().decode::<f32, _>(&record, 0, (2, 2))?;
/// assert_eq!(back, m);
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EmxCodec {
    /// Cell order of the record.
    pub order: Order,
    /// Byte order of the elements.
    pub endian: Endian,
}

impl Default for EmxCodec {
    fn default() -> Self {
        EmxCodec {
            order: Order::RowMajor,
            endian: Endian::Little,
        }
    }
}

impl EmxCodec {
    /// Creates a codec for row-major, little-endian records.
    pub fn new() -> Self {
        EmxCodec::default()
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

    /// Reads a `rows × cols` record starting at `byte_offset`.
    ///
    /// **Errors** with [`ReadMatrixError::TruncatedBuffer`] if the region
    /// holds fewer than `byte_offset + rows * cols * width` bytes. Bytes after
    /// the record are ignored, since they normally belong to the container.
    pub fn decode<A, R>(
        &self,
        region: &R,
        byte_offset: u64,
        shape: (usize, usize),
    ) -> Result<Array2<A>, ReadMatrixError>
    where
        A: Element,
        R: ReadRegion + ?Sized,
    {
        let (rows, cols) = shape;
        let width = A::ELEMENT_TYPE.width();
        let count = rows
            .checked_mul(cols)
            .filter(|&count| count > 0)
            .ok_or(ReadMatrixError::InvalidShape { rows, cols })?;
        let len = count
            .checked_mul(width)
            .ok_or(ReadMatrixError::InvalidShape { rows, cols })?;
        debug!(
            "reading {}x{} {} internal record at offset {} ({}, {})",
            rows,
            cols,
            A::ELEMENT_TYPE,
            byte_offset,
            self.order,
            self.endian
        );
        let bytes = read_span(region, byte_offset, len)?;
        let mut data = vec![A::zero(); count];
        A::read_slice(&bytes, 0, self.endian, &mut data)?;
        unflatten(shape, self.order, data)
    }

    /// Reads a square record that fills the whole region, inferring the
    /// number of zones from the region length.
    ///
    /// This is how `.emx` files are sized: the container is dimensioned for a
    /// fixed number of zones, and every record holds that many rows and
    /// columns.
    ///
    /// **Errors** with [`ReadMatrixError::NotSquare`] if the region length is
    /// not `n * n * width` for any positive `n`.
    pub fn decode_square<A, R>(&self, region: &R) -> Result<Array2<A>, ReadMatrixError>
    where
        A: Element,
        R: ReadRegion + ?Sized,
    {
        let len = region.len()?;
        let width = A::ELEMENT_TYPE.width() as u64;
        let not_square = ReadMatrixError::NotSquare { len };
        if len == 0 || len % width != 0 {
            return Err(not_square);
        }
        let count = len / width;
        let n = isqrt(count);
        if n * n != count {
            return Err(not_square);
        }
        let n = usize::try_from(n).map_err(|_| ReadMatrixError::NotSquare { len })?;
        self.decode(region, 0, (n, n))
    }

    /// Writes `matrix` as a record starting at `byte_offset`.
    pub fn encode<A, S, W>(
        &self,
        matrix: &ArrayBase<S, Ix2>,
        region: &mut W,
        byte_offset: u64,
    ) -> Result<(), WriteMatrixError>
    where
        A: Element,
        S: Data<Elem = A>,
        W: WriteRegion + ?Sized,
    {
        let (rows, cols) = matrix.dim();
        let len = rows
            .checked_mul(cols)
            .filter(|&count| count > 0)
            .and_then(|count| count.checked_mul(A::ELEMENT_TYPE.width()))
            .ok_or(WriteMatrixError::InvalidShape { rows, cols })?;
        debug!(
            "writing {}x{} {} internal record at offset {} ({}, {})",
            rows,
            cols,
            A::ELEMENT_TYPE,
            byte_offset,
            self.order,
            self.endian
        );
        let mut bytes = vec![0; len];
        A::write_slice(&mut bytes, 0, &flatten(matrix, self.order), self.endian)?;
        region.write_at(byte_offset, &bytes)?;
        Ok(())
    }

    /// Writes a square `matrix` resized to the `dimensioned_zones` the
    /// container was built for.
    ///
    /// Smaller matrices are padded with zero rows and columns. Larger ones
    /// are truncated, which loses data and is logged as a warning.
    pub fn encode_padded<A, S, W>(
        &self,
        matrix: &ArrayBase<S, Ix2>,
        region: &mut W,
        byte_offset: u64,
        dimensioned_zones: usize,
    ) -> Result<(), WriteMatrixError>
    where
        A: Element,
        S: Data<Elem = A>,
        W: WriteRegion + ?Sized,
    {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(WriteMatrixError::NotSquare { rows, cols });
        }
        if dimensioned_zones == 0 {
            return Err(WriteMatrixError::InvalidShape { rows: 0, cols: 0 });
        }
        if rows > dimensioned_zones {
            warn!(
                "truncating {}x{} matrix to the {} zones the container is dimensioned for",
                rows, cols, dimensioned_zones
            );
        }
        let resized = resize_square(matrix, dimensioned_zones);
        self.encode(&resized, region, byte_offset)
    }
}
