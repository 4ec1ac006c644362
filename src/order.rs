use crate::elements::Element;
use crate::ReadMatrixError;
use ndarray::prelude::*;
use ndarray::{Data, ShapeBuilder};
use std::fmt;

/// Order in which the cells of a matrix are laid out in a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Order {
    /// Each row is stored contiguously (C order).
    RowMajor,
    /// Each column is stored contiguously (Fortran order).
    ColumnMajor,
}

impl Order {
    /// Number of lines (rows or columns) and the length of each line for a
    /// matrix of `shape`.
    pub(crate) fn lines(self, (rows, cols): (usize, usize)) -> (usize, usize) {
        match self {
            Order::RowMajor => (rows, cols),
            Order::ColumnMajor => (cols, rows),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Order::RowMajor => write!(f, "row-major"),
            Order::ColumnMajor => write!(f, "column-major"),
        }
    }
}

/// Returns the elements of `matrix` in `order`.
///
/// Borrows the underlying data when it is already contiguous in that order.
pub(crate) fn flatten<A, S>(matrix: &ArrayBase<S, Ix2>, order: Order) -> std::borrow::Cow<'_, [A]>
where
    A: Element,
    S: Data<Elem = A>,
{
    let contiguous = match order {
        Order::RowMajor if matrix.is_standard_layout() => matrix.as_slice_memory_order(),
        Order::ColumnMajor if matrix.t().is_standard_layout() => matrix.as_slice_memory_order(),
        _ => None,
    };
    match contiguous {
        Some(slice) => std::borrow::Cow::Borrowed(slice),
        None => std::borrow::Cow::Owned(match order {
            Order::RowMajor => matrix.iter().copied().collect(),
            Order::ColumnMajor => matrix.t().iter().copied().collect(),
        }),
    }
}

/// Builds a matrix of `shape` from elements stored in `order`.
pub(crate) fn unflatten<A>(
    shape: (usize, usize),
    order: Order,
    data: Vec<A>,
) -> Result<Array2<A>, ReadMatrixError> {
    let result = match order {
        Order::RowMajor => Array2::from_shape_vec(shape, data),
        Order::ColumnMajor => Array2::from_shape_vec(shape.f(), data),
    };
    result.map_err(|_| ReadMatrixError::InvalidShape {
        rows: shape.0,
        cols: shape.1,
    })
}

/// Integer square root: the largest `r` with `r * r <= n`.
pub(crate) fn isqrt(n: u64) -> u64 {
    let mut r = (n as f64).sqrt() as u64;
    while r.checked_mul(r).map_or(true, |sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).map_or(false, |sq| sq <= n) {
        r += 1;
    }
    r
}
