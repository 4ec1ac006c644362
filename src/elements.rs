//! Matrix element types and their on-disk encodings.

use crate::primitive::{self, Endian, TruncatedBuffer};
use num_traits::Zero;
use std::fmt;

/// The stored representation of a matrix cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementType {
    /// 32-bit IEEE 754 float. The default of every format handled here.
    F32,
    /// 64-bit IEEE 754 float.
    F64,
    /// 32-bit two's complement integer.
    I32,
    /// 32-bit unsigned integer.
    U32,
}

impl Default for ElementType {
    fn default() -> Self {
        ElementType::F32
    }
}

impl ElementType {
    /// Size of one element in bytes.
    pub fn width(self) -> usize {
        match self {
            ElementType::F32 | ElementType::I32 | ElementType::U32 => 4,
            ElementType::F64 => 8,
        }
    }

    /// Numeric code used in the official binary header.
    pub(crate) fn code(self) -> u32 {
        match self {
            ElementType::F32 => 1,
            ElementType::F64 => 2,
            ElementType::I32 => 3,
            ElementType::U32 => 4,
        }
    }

    pub(crate) fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(ElementType::F32),
            2 => Some(ElementType::F64),
            3 => Some(ElementType::I32),
            4 => Some(ElementType::U32),
            _ => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ElementType::F32 => write!(f, "f32"),
            ElementType::F64 => write!(f, "f64"),
            ElementType::I32 => write!(f, "i32"),
            ElementType::U32 => write!(f, "u32"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A Rust type that can be read from and written to a matrix file.
///
/// The element type of the file must match `Self::ELEMENT_TYPE` exactly;
/// values are never converted between representations.
///
/// This trait is sealed and implemented for `f32`, `f64`, `i32`, and `u32`.
pub trait Element: Copy + PartialEq + Zero + fmt::Debug + sealed::Sealed + 'static {
    /// Stored representation of `Self`.
    const ELEMENT_TYPE: ElementType;

    /// Fills `out` with consecutive elements starting at `offset`.
    fn read_slice(
        buf: &[u8],
        offset: usize,
        endian: Endian,
        out: &mut [Self],
    ) -> Result<(), TruncatedBuffer>;

    /// Writes `values` as consecutive elements starting at `offset`.
    fn write_slice(
        buf: &mut [u8],
        offset: usize,
        values: &[Self],
        endian: Endian,
    ) -> Result<(), TruncatedBuffer>;
}

macro_rules! impl_element {
    ($elem:ty, $element_type:expr, $read_into:ident, $write_from:ident) => {
        impl sealed::Sealed for $elem {}

        impl Element for $elem {
            const ELEMENT_TYPE: ElementType = $element_type;

            fn read_slice(
                buf: &[u8],
                offset: usize,
                endian: Endian,
                out: &mut [Self],
            ) -> Result<(), TruncatedBuffer> {
                primitive::$read_into(buf, offset, endian, out)
            }

            fn write_slice(
                buf: &mut [u8],
                offset: usize,
                values: &[Self],
                endian: Endian,
            ) -> Result<(), TruncatedBuffer> {
                primitive::$write_from(buf, offset, values, endian)
            }
        }
    };
}

impl_element!(f32, ElementType::F32, read_f32_into, write_f32_into);
impl_element!(f64, ElementType::F64, read_f64_into, write_f64_into);
impl_element!(i32, ElementType::I32, read_i32_into, write_i32_into);
impl_element!(u32, ElementType::U32, read_u32_into, write_u32_into);
