//! Official binary matrix files, as written by Emme's
//! `MatrixData.save()` (usually `.mdf`, sometimes `.emxd`).
//!
//! # Layout
//!
//! All words are 4 bytes, in the byte order the magic number was written in.
//!
//! ```text
//! magic        0xC4D4F1B2
//! version      1
//! type word    element code (1 = f32, 2 = f64, 3 = i32, 4 = u32)
//!              | 0x0001_0000 if the zones are implicit
//! ndim         1 for a vector, 2 for a matrix
//! shape        one length per axis: len, or rows, cols
//! index        one table of i32 zones per axis
//!              (absent if the zones are implicit)
//! data         all elements, row-major
//! ```
//!
//! Files written by Emme always carry index tables, and Emme rejects any
//! type word other than a bare element code. The implicit flag is this
//! crate's own extension: files written with [`IndexTables::Auto`] (the
//! default) and trivial zones are not loadable by Emme. Set
//! [`IndexTables::Always`] when writing files for Emme to load.

mod header;

use self::header::Header;
use crate::elements::{Element, ElementType};
use crate::order::{flatten, unflatten, Order};
use crate::primitive::Endian;
use crate::region::{read_span, ReadRegion, WriteRegion};
use crate::zones::{LabeledMatrix, ZoneIndex};
use crate::{ReadMatrixError, WriteMatrixError};
use log::debug;
use ndarray::prelude::*;
use ndarray::Data;

/// Header and raw data block of a file whose length has been checked
/// against its header.
struct Checked {
    header: Header,
    bytes: Vec<u8>,
}

fn read_checked<R: ReadRegion + ?Sized>(region: &R) -> Result<Checked, ReadMatrixError> {
    let found = region.len()?;
    let len = usize::try_from(found).map_err(|_| ReadMatrixError::SizeMismatch {
        expected: usize::MAX as u64,
        found,
    })?;
    let bytes = read_span(region, 0, len)?;
    let header = Header::parse(&bytes)?;
    let expected = header
        .data_len()
        .and_then(|data_len| data_len.checked_add(header.byte_len()))
        .ok_or_else(|| ReadMatrixError::InvalidHeader("file size overflows".into()))?;
    debug!(
        "official binary header: {:?} {}, {}, {} index, {} bytes",
        header.shape,
        header.element_type,
        header.endian,
        if header.index.is_some() {
            "explicit"
        } else {
            "implicit"
        },
        found
    );
    if expected as u64 != found {
        return Err(ReadMatrixError::SizeMismatch {
            expected: expected as u64,
            found,
        });
    }
    Ok(Checked { header, bytes })
}

/// Reads the data block as a flat row-major vector of `A`.
fn read_data<A: Element>(Checked { header, bytes }: &Checked) -> Result<Vec<A>, ReadMatrixError> {
    if header.element_type != A::ELEMENT_TYPE {
        return Err(ReadMatrixError::WrongElementType {
            expected: A::ELEMENT_TYPE,
            found: header.element_type,
        });
    }
    let count = header
        .element_count()
        .ok_or_else(|| ReadMatrixError::InvalidHeader("file size overflows".into()))?;
    let mut data = vec![A::zero(); count];
    A::read_slice(bytes, header.byte_len(), header.endian, &mut data)?;
    Ok(data)
}

/// Zones labelling `axis`, counting from zero if the file has no tables.
fn axis_zones(header: &Header, axis: usize) -> Result<ZoneIndex, ReadMatrixError> {
    Ok(match &header.index {
        Some(tables) => ZoneIndex::new(tables[axis].clone())?,
        None => ZoneIndex::implicit(header.shape[axis]),
    })
}

fn decode_labeled<A: Element>(checked: Checked) -> Result<LabeledMatrix<A>, ReadMatrixError> {
    let shape = match checked.header.shape[..] {
        [rows, cols] => (rows, cols),
        _ => {
            return Err(ReadMatrixError::InvalidHeader(
                "file holds a vector, not a matrix".into(),
            ))
        }
    };
    let data = unflatten(shape, Order::RowMajor, read_data(&checked)?)?;
    let row_zones = axis_zones(&checked.header, 0)?;
    let col_zones = axis_zones(&checked.header, 1)?;
    Ok(LabeledMatrix::new(data, row_zones, col_zones)?)
}

/// Reads an official binary file whose rows and columns are labelled by the
/// same zones.
///
/// **Errors** if the file is malformed, its element type is not `A`, or its
/// row and column indices differ (use [`read_mdf_labeled`] for those).
///
/// # Example
///
/// ```no_run
/// use matrix_converters::read_mdf;
/// use std::fs::File;
///
/// let (_demand, zones) = read_mdf::<f32, _>(&File::open("demand.mdf")?)?;
/// println!("{} zones, first is {}", zones.len(), zones.zone_at(0)?);
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn read_mdf<A, R>(region: &R) -> Result<(Array2<A>, ZoneIndex), ReadMatrixError>
where
    A: Element,
    R: ReadRegion + ?Sized,
{
    let (data, rows, cols) = read_mdf_labeled::<A, R>(region)?.into_parts();
    if rows != cols {
        return Err(ReadMatrixError::InvalidHeader(
            "row and column zone indices differ".into(),
        ));
    }
    Ok((data, rows))
}

/// Reads an official binary file, keeping the row and column indices
/// separately.
pub fn read_mdf_labeled<A, R>(region: &R) -> Result<LabeledMatrix<A>, ReadMatrixError>
where
    A: Element,
    R: ReadRegion + ?Sized,
{
    decode_labeled(read_checked(region)?)
}

/// Reads a one-dimensional official binary file, such as a zone attribute
/// or an origin total.
///
/// **Errors** if the file is malformed, holds a matrix, or its element type
/// is not `A`.
///
/// # Example
///
/// ```
/// use matrix_converters::{read_mdf_vector, MdfWriter, ZoneIndex};
/// use ndarray::array;
///
/// let zones = ZoneIndex::new(vec![101, 102, 103])?;
/// let population = array![1200u32, 800, 45];
/// let mut file = Vec::<u8>::new();
/// MdfWriter::new().write_vector(&population, &zones, &mut file)?;
/// assert_eq!(read_mdf_vector::<u32, _>(&file)?, (population, zones));
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn read_mdf_vector<A, R>(region: &R) -> Result<(Array1<A>, ZoneIndex), ReadMatrixError>
where
    A: Element,
    R: ReadRegion + ?Sized,
{
    let checked = read_checked(region)?;
    if checked.header.shape.len() != 1 {
        return Err(ReadMatrixError::InvalidHeader(
            "file holds a matrix, not a vector".into(),
        ));
    }
    let data = Array1::from(read_data(&checked)?);
    let zones = axis_zones(&checked.header, 0)?;
    Ok((data, zones))
}

/// A matrix of whichever element type the file stores.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyMatrix {
    /// `f32` cells.
    F32(LabeledMatrix<f32>),
    /// `f64` cells.
    F64(LabeledMatrix<f64>),
    /// `i32` cells.
    I32(LabeledMatrix<i32>),
    /// `u32` cells.
    U32(LabeledMatrix<u32>),
}

impl AnyMatrix {
    /// The stored element type.
    pub fn element_type(&self) -> ElementType {
        match self {
            AnyMatrix::F32(_) => ElementType::F32,
            AnyMatrix::F64(_) => ElementType::F64,
            AnyMatrix::I32(_) => ElementType::I32,
            AnyMatrix::U32(_) => ElementType::U32,
        }
    }

    /// Shape of the matrix.
    pub fn dim(&self) -> (usize, usize) {
        match self {
            AnyMatrix::F32(m) => m.data().dim(),
            AnyMatrix::F64(m) => m.data().dim(),
            AnyMatrix::I32(m) => m.data().dim(),
            AnyMatrix::U32(m) => m.data().dim(),
        }
    }
}

/// Reads an official binary matrix file of any element type.
///
/// One-dimensional files are rejected; read those with [`read_mdf_vector`].
pub fn read_mdf_any<R: ReadRegion + ?Sized>(region: &R) -> Result<AnyMatrix, ReadMatrixError> {
    let checked = read_checked(region)?;
    let element_type = checked.header.element_type;
    Ok(match element_type {
        ElementType::F32 => AnyMatrix::F32(decode_labeled(checked)?),
        ElementType::F64 => AnyMatrix::F64(decode_labeled(checked)?),
        ElementType::I32 => AnyMatrix::I32(decode_labeled(checked)?),
        ElementType::U32 => AnyMatrix::U32(decode_labeled(checked)?),
    })
}

/// Whether a written file carries zone index tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexTables {
    /// Omit the tables when every axis is labelled `0..n`, setting the
    /// implicit flag in the type word instead. Emme can't load such files.
    Auto,
    /// Always write the tables. Emme requires this.
    Always,
}

impl Default for IndexTables {
    fn default() -> Self {
        IndexTables::Auto
    }
}

/// Writer for official binary files.
///
/// Defaults to little-endian with [`IndexTables::Auto`], which gives files
/// Emme can't load when the zones are implicit.
///
/// The written file starts at offset 0 and the region is cut to its length,
/// so overwriting a larger file leaves nothing of it behind. Regions of fixed
/// length, such as slices, keep their trailing bytes.
///
/// # Example
///
/// ```
/// use matrix_converters::{read_mdf, IndexTables, MdfWriter, ZoneIndex};
/// use ndarray::array;
///
/// let zones = ZoneIndex::new(vec![101, 102])?;
/// let m = array![[0.5f32, 1.], [2., 0.]];
/// let mut file = Vec::<u8>::new();
/// MdfWriter::new()
///     .with_index_tables(IndexTables::Always)
///     .write(&m, &zones, &mut file)?;
/// assert_eq!(read_mdf::<f32, _>(&file)?, (m, zones));
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MdfWriter {
    /// Byte order of the whole file.
    pub endian: Endian,
    /// Whether to write zone index tables.
    pub index_tables: IndexTables,
}

impl MdfWriter {
    /// Creates a writer with the default settings.
    pub fn new() -> Self {
        MdfWriter::default()
    }

    /// Sets the byte order.
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Sets whether to write zone index tables.
    pub fn with_index_tables(mut self, index_tables: IndexTables) -> Self {
        self.index_tables = index_tables;
        self
    }

    /// Writes `matrix`, with rows and columns both labelled by `zones`, as a
    /// complete file at the start of `region`.
    pub fn write<A, S, W>(
        &self,
        matrix: &ArrayBase<S, Ix2>,
        zones: &ZoneIndex,
        region: &mut W,
    ) -> Result<(), WriteMatrixError>
    where
        A: Element,
        S: Data<Elem = A>,
        W: WriteRegion + ?Sized,
    {
        self.write_parts(matrix, zones, zones, region)
    }

    /// Writes a labelled matrix as a complete file at the start of `region`.
    pub fn write_labeled<A, W>(
        &self,
        matrix: &LabeledMatrix<A>,
        region: &mut W,
    ) -> Result<(), WriteMatrixError>
    where
        A: Element,
        W: WriteRegion + ?Sized,
    {
        self.write_parts(matrix.data(), matrix.row_zones(), matrix.col_zones(), region)
    }

    fn write_parts<A, S, W>(
        &self,
        matrix: &ArrayBase<S, Ix2>,
        row_zones: &ZoneIndex,
        col_zones: &ZoneIndex,
        region: &mut W,
    ) -> Result<(), WriteMatrixError>
    where
        A: Element,
        S: Data<Elem = A>,
        W: WriteRegion + ?Sized,
    {
        let (rows, cols) = matrix.dim();
        if row_zones.len() != rows {
            return Err(WriteMatrixError::ZoneCountMismatch {
                zones: row_zones.len(),
                len: rows,
            });
        }
        if col_zones.len() != cols {
            return Err(WriteMatrixError::ZoneCountMismatch {
                zones: col_zones.len(),
                len: cols,
            });
        }
        let tables = self.tables_for(&[row_zones, col_zones]);
        self.write_file(vec![rows, cols], tables, &flatten(matrix, Order::RowMajor), region)
    }

    /// Writes `vector`, labelled by `zones`, as a complete one-dimensional
    /// file at the start of `region`.
    pub fn write_vector<A, S, W>(
        &self,
        vector: &ArrayBase<S, Ix1>,
        zones: &ZoneIndex,
        region: &mut W,
    ) -> Result<(), WriteMatrixError>
    where
        A: Element,
        S: Data<Elem = A>,
        W: WriteRegion + ?Sized,
    {
        if zones.len() != vector.len() {
            return Err(WriteMatrixError::ZoneCountMismatch {
                zones: zones.len(),
                len: vector.len(),
            });
        }
        let tables = self.tables_for(&[zones]);
        match vector.as_slice() {
            Some(values) => self.write_file(vec![vector.len()], tables, values, region),
            None => {
                let values: Vec<A> = vector.iter().copied().collect();
                self.write_file(vec![vector.len()], tables, &values, region)
            }
        }
    }

    /// Index tables to write for axes labelled by `zones`.
    fn tables_for(&self, zones: &[&ZoneIndex]) -> Option<Vec<Vec<i32>>> {
        let implicit = zones.iter().all(|zones| zones.is_implicit());
        match self.index_tables {
            IndexTables::Auto if implicit => None,
            IndexTables::Auto | IndexTables::Always => {
                Some(zones.iter().map(|zones| zones.as_slice().to_vec()).collect())
            }
        }
    }

    fn write_file<A, W>(
        &self,
        shape: Vec<usize>,
        index: Option<Vec<Vec<i32>>>,
        values: &[A],
        region: &mut W,
    ) -> Result<(), WriteMatrixError>
    where
        A: Element,
        W: WriteRegion + ?Sized,
    {
        let header = Header {
            endian: self.endian,
            element_type: A::ELEMENT_TYPE,
            shape,
            index,
        };
        let mut bytes = header.to_bytes()?;
        let data_start = bytes.len();
        let data_len = values.len() * A::ELEMENT_TYPE.width();
        debug_assert_eq!(header.data_len(), Some(data_len));
        debug!(
            "writing official binary {:?} {}, {}, {} bytes",
            header.shape,
            A::ELEMENT_TYPE,
            self.endian,
            data_start + data_len
        );
        bytes.resize(data_start + data_len, 0);
        A::write_slice(&mut bytes, data_start, values, self.endian)?;
        region.write_at(0, &bytes)?;
        region.truncate_to(bytes.len() as u64)?;
        Ok(())
    }
}

/// Writes `matrix` labelled by `zones` with the default [`MdfWriter`].
pub fn write_mdf<A, S, W>(
    matrix: &ArrayBase<S, Ix2>,
    zones: &ZoneIndex,
    region: &mut W,
) -> Result<(), WriteMatrixError>
where
    A: Element,
    S: Data<Elem = A>,
    W: WriteRegion + ?Sized,
{
    MdfWriter::new().write(matrix, zones, region)
}
