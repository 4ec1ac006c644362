//! Zone labels for matrix rows and columns, and the long (labeled-cell) form
//! of a matrix.

use crate::elements::Element;
use ndarray::prelude::*;
use ndarray::{s, Data};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::iter::FusedIterator;

/// An error looking up or building a [`ZoneIndex`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ZoneError {
    /// The zone is not in the index.
    UnknownZone(i32),
    /// The zone appears more than once in the sequence the index was built
    /// from.
    DuplicateZone(i32),
    /// The position is not less than the number of zones.
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// Number of zones in the index.
        len: usize,
    },
    /// The same origin-destination pair appears more than once in the long
    /// form.
    DuplicateCell {
        /// Origin zone of the pair.
        origin: i32,
        /// Destination zone of the pair.
        destination: i32,
    },
    /// The matrix doesn't have one row and one column per zone.
    ShapeMismatch {
        /// Number of zones in the index.
        zones: usize,
        /// Shape of the matrix.
        shape: (usize, usize),
    },
}

impl Error for ZoneError {}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ZoneError::UnknownZone(zone) => write!(f, "unknown zone: {}", zone),
            ZoneError::DuplicateZone(zone) => write!(f, "duplicate zone: {}", zone),
            ZoneError::DuplicateCell {
                origin,
                destination,
            } => write!(f, "duplicate cell: {} -> {}", origin, destination),
            ZoneError::IndexOutOfRange { index, len } => write!(
                f,
                "position {} is out of range for an index of {} zones",
                index, len
            ),
            ZoneError::ShapeMismatch { zones, shape } => write!(
                f,
                "index of {} zones cannot label a {} x {} matrix",
                zones, shape.0, shape.1
            ),
        }
    }
}

/// An ordered sequence of unique zone identifiers.
///
/// Position `i` in the sequence labels row `i` and column `i` of a matrix.
///
/// # Example
///
/// ```
/// use matrix_converters::{ZoneError, ZoneIndex};
///
/// let zones = ZoneIndex::new(vec![101, 102, 205])?;
/// assert_eq!(zones.position_of(205)?, 2);
/// assert_eq!(zones.zone_at(0)?, 101);
/// assert_eq!(
///     ZoneIndex::new(vec![10, 20, 10]),
///     Err(ZoneError::DuplicateZone(10)),
/// );
/// # Ok::<_, ZoneError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ZoneIndex {
    zones: Vec<i32>,
    positions: HashMap<i32, usize>,
}

impl PartialEq for ZoneIndex {
    fn eq(&self, other: &ZoneIndex) -> bool {
        self.zones == other.zones
    }
}

impl Eq for ZoneIndex {}

impl ZoneIndex {
    /// Builds an index from zone identifiers in row/column order.
    ///
    /// **Errors** with [`ZoneError::DuplicateZone`] naming the first repeated
    /// identifier.
    pub fn new(zones: Vec<i32>) -> Result<ZoneIndex, ZoneError> {
        let mut positions = HashMap::with_capacity(zones.len());
        for (position, &zone) in zones.iter().enumerate() {
            if positions.insert(zone, position).is_some() {
                return Err(ZoneError::DuplicateZone(zone));
            }
        }
        Ok(ZoneIndex { zones, positions })
    }

    /// The index `0, 1, ..., n - 1`, used when a file carries no zone labels.
    ///
    /// **Panics** if `n` exceeds `i32::MAX as usize + 1`.
    pub fn implicit(n: usize) -> ZoneIndex {
        assert!(
            n <= i32::MAX as usize + 1,
            "implicit index of {} zones does not fit in i32",
            n
        );
        let zones: Vec<i32> = (0..n).map(|i| i as i32).collect();
        let positions = (0..n).map(|i| (i as i32, i)).collect();
        ZoneIndex { zones, positions }
    }

    /// Returns `true` iff the identifiers are exactly `0, 1, ..., n - 1`.
    pub fn is_implicit(&self) -> bool {
        self.zones
            .iter()
            .enumerate()
            .all(|(i, &zone)| zone >= 0 && zone as usize == i)
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns `true` iff the index contains no zones.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Row/column position of `zone`.
    pub fn position_of(&self, zone: i32) -> Result<usize, ZoneError> {
        self.positions
            .get(&zone)
            .copied()
            .ok_or(ZoneError::UnknownZone(zone))
    }

    /// Zone identifier at row/column position `index`.
    pub fn zone_at(&self, index: usize) -> Result<i32, ZoneError> {
        self.zones
            .get(index)
            .copied()
            .ok_or(ZoneError::IndexOutOfRange {
                index,
                len: self.zones.len(),
            })
    }

    /// Returns `true` iff `zone` is in the index.
    pub fn contains(&self, zone: i32) -> bool {
        self.positions.contains_key(&zone)
    }

    /// The zone identifiers in order.
    pub fn as_slice(&self) -> &[i32] {
        &self.zones
    }

    /// Iterates over the zone identifiers in order.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, i32>> {
        self.zones.iter().copied()
    }

    /// Returns the zone identifiers.
    pub fn into_vec(self) -> Vec<i32> {
        self.zones
    }

    pub(crate) fn check_labels(&self, shape: (usize, usize)) -> Result<(), ZoneError> {
        if shape.0 == self.len() && shape.1 == self.len() {
            Ok(())
        } else {
            Err(ZoneError::ShapeMismatch {
                zones: self.len(),
                shape,
            })
        }
    }
}

impl<'a> IntoIterator for &'a ZoneIndex {
    type Item = i32;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, i32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One cell of a matrix in long form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabeledCell<A> {
    /// Zone labelling the cell's row.
    pub origin: i32,
    /// Zone labelling the cell's column.
    pub destination: i32,
    /// The cell value.
    pub value: A,
}

/// Iterator over the cells of a matrix in long form, in row-major order.
///
/// Created by [`cells`] or [`LabeledMatrix::cells`].
#[derive(Clone, Debug)]
pub struct LabeledCells<'a, A> {
    matrix: ArrayView2<'a, A>,
    rows: &'a ZoneIndex,
    cols: &'a ZoneIndex,
    next: usize,
}

impl<'a, A: Copy> Iterator for LabeledCells<'a, A> {
    type Item = LabeledCell<A>;

    fn next(&mut self) -> Option<LabeledCell<A>> {
        let ncols = self.matrix.ncols();
        if self.next >= self.matrix.len() {
            return None;
        }
        let (i, j) = (self.next / ncols, self.next % ncols);
        self.next += 1;
        Some(LabeledCell {
            origin: self.rows.as_slice()[i],
            destination: self.cols.as_slice()[j],
            value: self.matrix[[i, j]],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.matrix.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl<'a, A: Copy> ExactSizeIterator for LabeledCells<'a, A> {}

impl<'a, A: Copy> FusedIterator for LabeledCells<'a, A> {}

/// Returns an iterator over every cell of a square matrix labelled by
/// `zones`, including zero cells.
///
/// Each call starts a fresh traversal.
///
/// **Errors** if the matrix is not `zones.len() × zones.len()`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use matrix_converters::{cells, LabeledCell, ZoneIndex};
///
/// let zones = ZoneIndex::new(vec![7, 9])?;
/// let m = array![[1f32, 2.], [3., 4.]];
/// let long: Vec<_> = cells(&m, &zones)?.collect();
/// assert_eq!(long[1], LabeledCell { origin: 7, destination: 9, value: 2. });
/// # Ok::<_, matrix_converters::ZoneError>(())
/// ```
pub fn cells<'a, A, S>(
    matrix: &'a ArrayBase<S, Ix2>,
    zones: &'a ZoneIndex,
) -> Result<LabeledCells<'a, A>, ZoneError>
where
    A: Copy,
    S: Data<Elem = A>,
{
    zones.check_labels(matrix.dim())?;
    Ok(LabeledCells {
        matrix: matrix.view(),
        rows: zones,
        cols: zones,
        next: 0,
    })
}

/// Builds a dense square matrix from long-form cells.
///
/// Pairs that don't appear in `cells` are zero.
///
/// **Errors** with [`ZoneError::UnknownZone`] if a cell names a zone that is
/// not in `zones`, and with [`ZoneError::DuplicateCell`] if a pair appears
/// more than once.
pub fn matrix_from_cells<A, I>(cells: I, zones: &ZoneIndex) -> Result<Array2<A>, ZoneError>
where
    A: Element,
    I: IntoIterator<Item = LabeledCell<A>>,
{
    let n = zones.len();
    let mut out = Array2::zeros((n, n));
    let mut seen = vec![false; n * n];
    for cell in cells {
        let i = zones.position_of(cell.origin)?;
        let j = zones.position_of(cell.destination)?;
        if std::mem::replace(&mut seen[i * n + j], true) {
            return Err(ZoneError::DuplicateCell {
                origin: cell.origin,
                destination: cell.destination,
            });
        }
        out[[i, j]] = cell.value;
    }
    Ok(out)
}

/// Truncates or zero-pads a square matrix to `n × n`.
///
/// Rows and columns beyond `n` are dropped; new rows and columns are zero.
pub fn resize_square<A, S>(matrix: &ArrayBase<S, Ix2>, n: usize) -> Array2<A>
where
    A: Element,
    S: Data<Elem = A>,
{
    let mut out = Array2::zeros((n, n));
    let rows = matrix.nrows().min(n);
    let cols = matrix.ncols().min(n);
    out.slice_mut(s![..rows, ..cols])
        .assign(&matrix.slice(s![..rows, ..cols]));
    out
}

/// A matrix together with the zone labels of its rows and columns.
///
/// Official binary files label each axis separately, so the two indices may
/// differ (and have different lengths for rectangular matrices).
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledMatrix<A> {
    data: Array2<A>,
    rows: ZoneIndex,
    cols: ZoneIndex,
}

impl<A> LabeledMatrix<A> {
    /// Labels `data` with `rows` and `cols`.
    ///
    /// **Errors** with [`ZoneError::ShapeMismatch`] if the index lengths
    /// don't match the matrix shape.
    pub fn new(data: Array2<A>, rows: ZoneIndex, cols: ZoneIndex) -> Result<Self, ZoneError> {
        if data.dim() != (rows.len(), cols.len()) {
            return Err(ZoneError::ShapeMismatch {
                zones: if data.nrows() != rows.len() {
                    rows.len()
                } else {
                    cols.len()
                },
                shape: data.dim(),
            });
        }
        Ok(LabeledMatrix { data, rows, cols })
    }

    /// Labels a square matrix with the same index on both axes.
    pub fn square(data: Array2<A>, zones: ZoneIndex) -> Result<Self, ZoneError> {
        zones.check_labels(data.dim())?;
        Ok(LabeledMatrix {
            data,
            rows: zones.clone(),
            cols: zones,
        })
    }

    /// The matrix values.
    pub fn data(&self) -> &Array2<A> {
        &self.data
    }

    /// Zone labels of the rows.
    pub fn row_zones(&self) -> &ZoneIndex {
        &self.rows
    }

    /// Zone labels of the columns.
    pub fn col_zones(&self) -> &ZoneIndex {
        &self.cols
    }

    /// The shared index, if rows and columns are labelled identically.
    pub fn zones(&self) -> Option<&ZoneIndex> {
        if self.rows == self.cols {
            Some(&self.rows)
        } else {
            None
        }
    }

    /// Value of the cell labelled `(origin, destination)`.
    pub fn get(&self, origin: i32, destination: i32) -> Result<&A, ZoneError> {
        let i = self.rows.position_of(origin)?;
        let j = self.cols.position_of(destination)?;
        Ok(&self.data[[i, j]])
    }

    /// Splits into the matrix and the row and column indices.
    pub fn into_parts(self) -> (Array2<A>, ZoneIndex, ZoneIndex) {
        (self.data, self.rows, self.cols)
    }

    /// Iterates over every cell in long form, in row-major order.
    pub fn cells(&self) -> LabeledCells<'_, A>
    where
        A: Copy,
    {
        LabeledCells {
            matrix: self.data.view(),
            rows: &self.rows,
            cols: &self.cols,
            next: 0,
        }
    }
}
