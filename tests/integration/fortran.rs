//! FORTRAN-convention files.

use matrix_converters::{Endian, FortranCodec, Order, ReadMatrixError, RecordMarkers};
use ndarray::prelude::*;

fn all_layouts() -> Vec<FortranCodec> {
    let mut out = Vec::new();
    for &order in &[Order::RowMajor, Order::ColumnMajor] {
        for &endian in &[Endian::Little, Endian::Big] {
            for &markers in &[RecordMarkers::None, RecordMarkers::Whole, RecordMarkers::PerLine] {
                for &line_numbers in &[false, true] {
                    out.push(FortranCodec {
                        order,
                        endian,
                        markers,
                        line_numbers,
                    });
                }
            }
        }
    }
    out
}

#[test]
fn every_layout_round_trips() {
    let m = array![[1.5f64, -2., 0.], [4., 1e300, -0.25]];
    for codec in all_layouts() {
        let mut file = Vec::<u8>::new();
        codec.encode(&m, &mut file).unwrap();
        assert_eq!(codec.decode::<f64, _>(&file, (2, 3)).unwrap(), m, "{:?}", codec);
    }
}

#[test]
fn every_square_layout_infers_size() {
    let m = Array2::from_shape_fn((5, 5), |(i, j)| (10 * i + j) as i32);
    for codec in all_layouts() {
        let mut file = Vec::<u8>::new();
        codec.encode(&m, &mut file).unwrap();
        assert_eq!(codec.decode_square::<i32, _>(&file).unwrap(), m, "{:?}", codec);
    }
}

#[test]
fn wrong_order_reads_transpose() {
    let m = array![[1f32, 2.], [3., 4.]];
    let mut file = Vec::<u8>::new();
    FortranCodec::new()
        .with_order(Order::RowMajor)
        .encode(&m, &mut file)
        .unwrap();
    let read = FortranCodec::new().decode::<f32, _>(&file, (2, 2)).unwrap();
    assert_eq!(read, m.t());
}

#[test]
fn line_numbers_follow_order() {
    // Column-major numbering counts columns.
    let m = array![[1i32, 2, 3], [4, 5, 6]];
    let codec = FortranCodec::new().with_line_numbers(true);
    let mut file = Vec::<u8>::new();
    codec.encode(&m, &mut file).unwrap();
    let words: Vec<i32> = file
        .chunks_exact(4)
        .map(|w| i32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .collect();
    assert_eq!(words, [1, 1, 4, 2, 2, 5, 3, 3, 6]);
}

#[test]
fn misread_markers_are_detected() {
    let m = array![[1f32, 2.], [3., 4.]];
    let mut file = Vec::<u8>::new();
    FortranCodec::new()
        .with_markers(RecordMarkers::PerLine)
        .encode(&m, &mut file)
        .unwrap();
    // Read back as if the whole block were one record.
    let res = FortranCodec::new()
        .with_markers(RecordMarkers::Whole)
        .decode::<f32, _>(&file, (2, 2));
    assert!(
        matches!(res, Err(ReadMatrixError::ExtraBytes(8))),
        "{:?}",
        res
    );
    // Same length, wrong record size.
    let res = FortranCodec::new()
        .with_markers(RecordMarkers::PerLine)
        .decode::<f32, _>(&file, (6, 1));
    assert!(matches!(
        res,
        Err(ReadMatrixError::InvalidRecordMarker {
            record: 0,
            expected: 24,
            found: 8
        })
    ));
}

#[test]
fn big_endian_markers() {
    let m = array![[7u32]];
    let mut file = Vec::<u8>::new();
    FortranCodec::new()
        .with_endian(Endian::Big)
        .with_markers(RecordMarkers::Whole)
        .encode(&m, &mut file)
        .unwrap();
    assert_eq!(file, [0, 0, 0, 4, 0, 0, 0, 7, 0, 0, 0, 4]);
    let res = FortranCodec::new()
        .with_markers(RecordMarkers::Whole)
        .decode::<u32, _>(&file, (1, 1));
    assert!(matches!(
        res,
        Err(ReadMatrixError::InvalidRecordMarker {
            expected: 4,
            found: 0x0400_0000,
            ..
        })
    ));
}

#[test]
fn davidson_size_inference() {
    // n * (n + 1) words.
    for n in 1..20 {
        let file = vec![0u8; 4 * n * (n + 1)];
        let res = FortranCodec::davidson().decode_square::<f32, _>(&file);
        // Line numbers are zero, so the size is accepted but the first
        // line number is not.
        assert!(matches!(
            res,
            Err(ReadMatrixError::InvalidLineNumber {
                line: 0,
                expected: 1,
                found: 0
            })
        ));
    }
    let res = FortranCodec::davidson().decode_square::<f32, _>(&vec![0u8; 4 * 7]);
    assert!(matches!(res, Err(ReadMatrixError::NotSquare { len: 28 })));
}

#[test]
fn empty_file() {
    let file = Vec::<u8>::new();
    for codec in all_layouts() {
        assert!(matches!(
            codec.decode_square::<f32, _>(&file),
            Err(ReadMatrixError::NotSquare { len: 0 })
        ));
        assert!(matches!(
            codec.decode::<f32, _>(&file, (1, 1)),
            Err(ReadMatrixError::TruncatedBuffer(_))
        ));
    }
}
