//! This crate reads and writes the binary matrix formats of travel demand
//! modelling software as [`ndarray`]'s `Array2` type.
//!
//! [`ndarray`]: https://github.com/rust-ndarray/ndarray
//!
//! Three families of formats are supported:
//!
//! * Internal records of an Emme database (`.emx`), which have no header at
//!   all. See [`EmxCodec`].
//!
//! * Official binary files (`.mdf`), which carry a header with the element
//!   type, shape, and zone identifiers. See [`read_mdf`], [`write_mdf`], and
//!   [`MdfWriter`]. One-dimensional files, such as zone attributes, are read
//!   with [`read_mdf_vector`] and written with [`MdfWriter::write_vector`].
//!
//! * Files written by FORTRAN programs (`.bin`, `.dat`), which have no
//!   header but may carry record-length markers and line numbers. See
//!   [`FortranCodec`].
//!
//! All codecs read from a [`ReadRegion`] and write to a [`WriteRegion`].
//! These are implemented for byte slices, `Vec<u8>`, and `File`; use
//! [`SubRegion`] for a matrix embedded in a larger container. A memory map
//! is read through its `&[u8]`.
//!
//! Zone labels live in a [`ZoneIndex`]. The [`cells`] and
//! [`matrix_from_cells`] functions convert between the dense form and the
//! long form of `(origin, destination, value)` triples.
//!
//! # Limitations
//!
//! * Elements are `f32`, `f64`, `i32`, or `u32`. Reading an official binary
//!   file as a different element type than the one stored is an error rather
//!   than a conversion; use [`read_mdf_any`] if the type isn't known ahead of
//!   time.
//!
//! * Official binary files written with [`IndexTables::Auto`] (the default)
//!   and implicit zones use a flag Emme doesn't know. Write with
//!   [`IndexTables::Always`] for files Emme will load.
//!
//! * Headerless formats can't be validated beyond their length. Reading a
//!   record with the wrong shape or offset produces a garbled matrix.

mod elements;
mod emx;
mod error;
mod fortran;
mod mdf;
mod order;
pub mod primitive;
mod region;
mod zones;

pub use crate::elements::{Element, ElementType};
pub use crate::emx::EmxCodec;
pub use crate::error::{ReadMatrixError, WriteMatrixError};
pub use crate::fortran::{FortranCodec, RecordMarkers};
pub use crate::mdf::{
    read_mdf, read_mdf_any, read_mdf_labeled, read_mdf_vector, write_mdf, AnyMatrix, IndexTables,
    MdfWriter,
};
pub use crate::order::Order;
pub use crate::primitive::{Endian, TruncatedBuffer};
pub use crate::region::{ReadRegion, SubRegion, WriteRegion};
pub use crate::zones::{
    cells, matrix_from_cells, resize_square, LabeledCell, LabeledCells, LabeledMatrix, ZoneError,
    ZoneIndex,
};
