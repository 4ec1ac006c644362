//! Property tests: written matrices read back unchanged, and no proper prefix
//! of a written file reads back at all.

use matrix_converters::{
    cells, matrix_from_cells, read_mdf, EmxCodec, Endian, FortranCodec, IndexTables, MdfWriter,
    Order, ReadMatrixError, RecordMarkers, ZoneIndex,
};
use ndarray::prelude::*;
use proptest::prelude::*;

fn arb_matrix<A: Arbitrary + Clone>(max: usize) -> impl Strategy<Value = Array2<A>> {
    (1..=max, 1..=max).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(any::<A>(), rows * cols)
            .prop_map(move |data| Array2::from_shape_vec((rows, cols), data).unwrap())
    })
}

fn arb_finite_matrix(max: usize) -> impl Strategy<Value = Array2<f64>> {
    (1..=max, 1..=max).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(-1e12f64..1e12, rows * cols)
            .prop_map(move |data| Array2::from_shape_vec((rows, cols), data).unwrap())
    })
}

fn arb_endian() -> impl Strategy<Value = Endian> {
    prop_oneof![Just(Endian::Little), Just(Endian::Big)]
}

fn arb_order() -> impl Strategy<Value = Order> {
    prop_oneof![Just(Order::RowMajor), Just(Order::ColumnMajor)]
}

fn arb_fortran() -> impl Strategy<Value = FortranCodec> {
    (
        arb_order(),
        arb_endian(),
        prop_oneof![
            Just(RecordMarkers::None),
            Just(RecordMarkers::Whole),
            Just(RecordMarkers::PerLine)
        ],
        any::<bool>(),
    )
        .prop_map(|(order, endian, markers, line_numbers)| FortranCodec {
            order,
            endian,
            markers,
            line_numbers,
        })
}

/// Distinct zone identifiers, in arbitrary order.
fn arb_zones(n: usize) -> impl Strategy<Value = ZoneIndex> {
    prop::collection::hash_set(any::<i32>(), n)
        .prop_map(|set| ZoneIndex::new(set.into_iter().collect()).unwrap())
}

proptest! {
    #[test]
    fn emx_round_trip(m in arb_matrix::<i32>(8), order in arb_order(), endian in arb_endian()) {
        let codec = EmxCodec { order, endian };
        let mut record = Vec::<u8>::new();
        codec.encode(&m, &mut record, 3).unwrap();
        prop_assert_eq!(record.len(), 3 + m.len() * 4);
        prop_assert_eq!(codec.decode::<i32, _>(&record, 3, m.dim()).unwrap(), m);
    }

    #[test]
    fn emx_is_byte_order_independent(m in arb_matrix::<u32>(6), order in arb_order()) {
        let mut little = Vec::<u8>::new();
        let mut big = Vec::<u8>::new();
        EmxCodec { order, endian: Endian::Little }.encode(&m, &mut little, 0).unwrap();
        EmxCodec { order, endian: Endian::Big }.encode(&m, &mut big, 0).unwrap();
        let swapped: Vec<u8> = big.chunks_exact(4).flat_map(|w| w.iter().rev().copied()).collect();
        prop_assert_eq!(little, swapped);
    }

    #[test]
    fn fortran_round_trip(m in arb_finite_matrix(6), codec in arb_fortran()) {
        let mut file = Vec::<u8>::new();
        codec.encode(&m, &mut file).unwrap();
        prop_assert_eq!(codec.decode::<f64, _>(&file, m.dim()).unwrap(), m);
    }

    #[test]
    fn fortran_prefix_is_truncated(m in arb_matrix::<i32>(5), codec in arb_fortran(), cut in 1usize..64) {
        let mut file = Vec::<u8>::new();
        codec.encode(&m, &mut file).unwrap();
        let len = file.len().saturating_sub(cut);
        let res = codec.decode::<i32, _>(&file[..len], m.dim());
        prop_assert!(matches!(res, Err(ReadMatrixError::TruncatedBuffer(_))), "{:?}", res);
    }

    #[test]
    fn mdf_round_trip(
        (m, zones) in (1usize..8).prop_flat_map(|n| (arb_matrix_square(n), arb_zones(n))),
        endian in arb_endian(),
        always in any::<bool>(),
    ) {
        let writer = MdfWriter {
            endian,
            index_tables: if always { IndexTables::Always } else { IndexTables::Auto },
        };
        let mut file = Vec::<u8>::new();
        writer.write(&m, &zones, &mut file).unwrap();
        prop_assert_eq!(read_mdf::<i32, _>(&file).unwrap(), (m, zones));
    }

    #[test]
    fn mdf_prefix_is_rejected(m in arb_matrix_square(4), cut in 1usize..200) {
        let mut file = Vec::<u8>::new();
        MdfWriter::new()
            .with_index_tables(IndexTables::Always)
            .write(&m, &ZoneIndex::implicit(m.nrows()), &mut file)
            .unwrap();
        let len = file.len().saturating_sub(cut);
        let res = read_mdf::<i32, _>(&file[..len]);
        prop_assert!(
            matches!(
                res,
                Err(ReadMatrixError::TruncatedBuffer(_)) | Err(ReadMatrixError::SizeMismatch { .. })
            ),
            "{:?}",
            res
        );
    }

    #[test]
    fn long_form_round_trip(
        (m, zones) in (1usize..8).prop_flat_map(|n| (arb_matrix_square(n), arb_zones(n))),
    ) {
        let long: Vec<_> = cells(&m, &zones).unwrap().collect();
        prop_assert_eq!(long.len(), m.len());
        prop_assert_eq!(matrix_from_cells(long, &zones).unwrap(), m);
    }
}

fn arb_matrix_square(n: usize) -> impl Strategy<Value = Array2<i32>> {
    prop::collection::vec(any::<i32>(), n * n)
        .prop_map(move |data| Array2::from_shape_vec((n, n), data).unwrap())
}
