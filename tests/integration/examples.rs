//! Reading and writing the sample files in `resources/`.

use matrix_converters::{
    read_mdf, read_mdf_any, read_mdf_labeled, read_mdf_vector, write_mdf, AnyMatrix, ElementType,
    EmxCodec, Endian, FortranCodec, IndexTables, LabeledMatrix, MdfWriter, RecordMarkers, ZoneIndex,
};
use ndarray::prelude::*;
use std::fs::{self, File};

fn counting<A: Clone + From<u8>>(shape: (usize, usize)) -> Array2<A> {
    let mut arr = Array2::from_elem(shape, A::from(0));
    for (i, elem) in arr.iter_mut().enumerate() {
        *elem = A::from(i as u8);
    }
    arr
}

#[test]
fn read_f32_little_endian_mdf() {
    let file = File::open("resources/example_f32_little_endian.mdf").unwrap();
    let (arr, zones) = read_mdf::<f32, _>(&file).unwrap();
    assert_eq!(arr, counting::<f32>((3, 3)));
    assert_eq!(zones.as_slice(), &[101, 102, 103]);
    assert!(!zones.is_implicit());
}

#[test]
fn write_f32_little_endian_mdf() {
    let correct = fs::read("resources/example_f32_little_endian.mdf").unwrap();
    let zones = ZoneIndex::new(vec![101, 102, 103]).unwrap();
    let mut written = Vec::<u8>::new();
    write_mdf(&counting::<f32>((3, 3)), &zones, &mut written).unwrap();
    assert_eq!(correct, written);
}

#[test]
fn read_f32_vector_mdf() {
    let file = File::open("resources/example_f32_vector.mdf").unwrap();
    let (arr, zones) = read_mdf_vector::<f32, _>(&file).unwrap();
    assert_eq!(arr, array![0.5, 1.5, 2.5]);
    assert_eq!(zones.as_slice(), &[11, 12, 13]);
}

#[test]
fn write_f32_vector_mdf() {
    let correct = fs::read("resources/example_f32_vector.mdf").unwrap();
    let zones = ZoneIndex::new(vec![11, 12, 13]).unwrap();
    let mut written = Vec::<u8>::new();
    MdfWriter::new()
        .write_vector(&array![0.5f32, 1.5, 2.5], &zones, &mut written)
        .unwrap();
    assert_eq!(correct, written);
}

#[test]
fn read_f64_big_endian_rectangular_mdf() {
    let bytes = fs::read("resources/example_f64_big_endian_rectangular.mdf").unwrap();
    let labeled = read_mdf_labeled::<f64, _>(&bytes).unwrap();
    assert_eq!(labeled.data(), &array![[0., 0.5, 1.], [1.5, 2., 2.5]]);
    assert_eq!(labeled.row_zones().as_slice(), &[1, 2]);
    assert_eq!(labeled.col_zones().as_slice(), &[10, 20, 30]);
    assert_eq!(labeled.zones(), None);
    assert_eq!(*labeled.get(2, 20).unwrap(), 2.);
}

#[test]
fn write_f64_big_endian_rectangular_mdf() {
    let correct = fs::read("resources/example_f64_big_endian_rectangular.mdf").unwrap();
    let labeled = LabeledMatrix::new(
        array![[0., 0.5, 1.], [1.5, 2., 2.5]],
        ZoneIndex::new(vec![1, 2]).unwrap(),
        ZoneIndex::new(vec![10, 20, 30]).unwrap(),
    )
    .unwrap();
    let mut written = Vec::<u8>::new();
    MdfWriter::new()
        .with_endian(Endian::Big)
        .write_labeled(&labeled, &mut written)
        .unwrap();
    assert_eq!(correct, written);
}

#[test]
fn implicit_index_mdf() {
    let correct = fs::read("resources/example_i32_implicit.mdf").unwrap();
    let arr = array![[1, -2], [3, -4]];

    let (read, zones) = read_mdf::<i32, _>(&correct).unwrap();
    assert_eq!(read, arr);
    assert_eq!(zones, ZoneIndex::implicit(2));

    let mut written = Vec::<u8>::new();
    write_mdf(&arr, &ZoneIndex::implicit(2), &mut written).unwrap();
    assert_eq!(correct, written);

    // Emme's own loader needs the tables.
    let mut written = Vec::<u8>::new();
    MdfWriter::new()
        .with_index_tables(IndexTables::Always)
        .write(&arr, &ZoneIndex::implicit(2), &mut written)
        .unwrap();
    assert_eq!(written.len(), correct.len() + 4 * 4);
    assert_eq!(read_mdf::<i32, _>(&written).unwrap(), (arr, zones));
}

#[test]
fn any_element_type() {
    let bytes = fs::read("resources/example_f64_big_endian_rectangular.mdf").unwrap();
    let any = read_mdf_any(&bytes).unwrap();
    assert_eq!(any.element_type(), ElementType::F64);
    assert_eq!(any.dim(), (2, 3));
    assert!(matches!(any, AnyMatrix::F64(_)));

    let bytes = fs::read("resources/example_i32_implicit.mdf").unwrap();
    match read_mdf_any(&bytes).unwrap() {
        AnyMatrix::I32(labeled) => assert_eq!(labeled.data(), &array![[1, -2], [3, -4]]),
        other => panic!("expected i32 cells, got {:?}", other.element_type()),
    }
}

#[test]
fn read_emx() {
    let file = File::open("resources/example_f32.emx").unwrap();
    let arr = EmxCodec::new().decode_square::<f32, _>(&file).unwrap();
    assert_eq!(arr, counting::<f32>((4, 4)));
}

#[test]
fn write_emx() {
    let correct = fs::read("resources/example_f32.emx").unwrap();
    let mut written = Vec::<u8>::new();
    EmxCodec::new()
        .encode(&counting::<f32>((4, 4)), &mut written, 0)
        .unwrap();
    assert_eq!(correct, written);
}

#[test]
fn read_davidson() {
    let file = File::open("resources/example_davidson.bin").unwrap();
    let arr = FortranCodec::davidson().decode_square::<f32, _>(&file).unwrap();
    assert_eq!(arr, counting::<f32>((3, 3)));
}

#[test]
fn write_davidson() {
    let correct = fs::read("resources/example_davidson.bin").unwrap();
    let mut written = Vec::<u8>::new();
    FortranCodec::davidson()
        .encode(&counting::<f32>((3, 3)), &mut written)
        .unwrap();
    assert_eq!(correct, written);
}

#[test]
fn whole_record_fortran() {
    let correct = fs::read("resources/example_f64_whole_record.dat").unwrap();
    let codec = FortranCodec::new().with_markers(RecordMarkers::Whole);
    let arr = codec.decode::<f64, _>(&correct, (2, 3)).unwrap();
    assert_eq!(arr, counting::<f64>((2, 3)));
    assert!(arr.t().is_standard_layout());

    let mut written = Vec::<u8>::new();
    codec.encode(&arr, &mut written).unwrap();
    assert_eq!(correct, written);
}
