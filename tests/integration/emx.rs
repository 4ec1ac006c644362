//! Internal records embedded in a larger container.

use matrix_converters::{EmxCodec, Endian, Order, ReadMatrixError, SubRegion, WriteRegion};
use ndarray::prelude::*;

/// Lays out `records` back to back after a 16-byte container header, the way
/// an Emme database stores matrices dimensioned for the same zone count.
fn container(records: &[Array2<f32>]) -> Vec<u8> {
    let mut out = vec![0xEE; 16];
    let mut offset = 16;
    for record in records {
        EmxCodec::new().encode(record, &mut out, offset).unwrap();
        offset += (record.len() * 4) as u64;
    }
    out
}

#[test]
fn records_at_offsets() {
    let a = array![[1f32, 2.], [3., 4.]];
    let b = array![[5f32, 6.], [7., 8.]];
    let db = container(&[a.clone(), b.clone()]);
    assert_eq!(db.len(), 16 + 2 * 16);
    assert_eq!(&db[..16], &[0xEE; 16]);

    let codec = EmxCodec::new();
    assert_eq!(codec.decode::<f32, _>(&db, 16, (2, 2)).unwrap(), a);
    assert_eq!(codec.decode::<f32, _>(&db, 32, (2, 2)).unwrap(), b);

    // Same records through a window on the container.
    let second = SubRegion::new(&db, 32, 16);
    assert_eq!(codec.decode_square::<f32, _>(&second).unwrap(), b);
}

#[test]
fn overwrite_one_record() {
    let a = array![[1f32, 2.], [3., 4.]];
    let b = array![[5f32, 6.], [7., 8.]];
    let mut db = container(&[a.clone(), b]);
    let replacement = array![[-1f32, -2.], [-3., -4.]];
    {
        let mut window = SubRegion::new(&mut db, 32, 16);
        EmxCodec::new().encode(&replacement, &mut window, 0).unwrap();
    }
    assert_eq!(db.len(), 48);
    assert_eq!(EmxCodec::new().decode::<f32, _>(&db, 16, (2, 2)).unwrap(), a);
    assert_eq!(
        EmxCodec::new().decode::<f32, _>(&db, 32, (2, 2)).unwrap(),
        replacement
    );
}

#[test]
fn window_does_not_grow() {
    let mut db = vec![0u8; 32];
    let mut window = SubRegion::new(&mut db, 16, 8);
    assert!(window.write_at(4, &[1; 8]).is_err());
    let big = array![[1f32, 2.], [3., 4.]];
    assert!(EmxCodec::new().encode(&big, &mut window, 0).is_err());
    assert_eq!(db, vec![0u8; 32]);
}

#[test]
fn wrong_order_reads_transpose() {
    let m = array![[1i32, 2, 3], [4, 5, 6], [7, 8, 9]];
    let mut record = Vec::<u8>::new();
    EmxCodec::new().encode(&m, &mut record, 0).unwrap();
    let transposed = EmxCodec::new()
        .with_order(Order::ColumnMajor)
        .decode::<i32, _>(&record, 0, (3, 3))
        .unwrap();
    assert_eq!(transposed, m.t());
}

#[test]
fn wrong_endian_reads_garbage() {
    let m = array![[1u32, 2], [3, 4]];
    let mut record = Vec::<u8>::new();
    EmxCodec::new().encode(&m, &mut record, 0).unwrap();
    let swapped = EmxCodec::new()
        .with_endian(Endian::Big)
        .decode::<u32, _>(&record, 0, (2, 2))
        .unwrap();
    assert_eq!(swapped, m.mapv(u32::swap_bytes));
}

#[test]
fn record_past_end_of_container() {
    let db = container(&[array![[1f32, 2.], [3., 4.]]]);
    match EmxCodec::new().decode::<f32, _>(&db, 32, (2, 2)) {
        Err(ReadMatrixError::TruncatedBuffer(err)) => {
            assert_eq!(err.offset, 32);
            assert_eq!(err.needed, 16);
            assert_eq!(err.len, 32);
        }
        other => panic!("expected truncation, got {:?}", other),
    }
}
