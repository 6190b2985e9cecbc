//! End-to-end scenarios exercised through the public API only: read/build a
//! coordinate stream, pack it, and check the materialized arrays and values.

use {
    pretty_assertions::assert_eq,
    tensorpack_core::{
        format::{Format, ModeEncoding},
        pack::{pack, CoordinateStream},
        read_coo, write_coo, VALUE_WIDTH,
    },
    test_log::test,
};

fn buffer_values(buf: &tensorpack_core::TypedIndexBuffer) -> Vec<i128> {
    (0..buf.len()).map(|k| buf.get(k)).collect()
}

fn read_values(values: &[u8]) -> Vec<f64> {
    values
        .chunks_exact(VALUE_WIDTH)
        .map(|chunk| {
            let mut bytes = [0u8; VALUE_WIDTH];
            bytes.copy_from_slice(chunk);
            f64::from_ne_bytes(bytes)
        })
        .collect()
}

#[test]
fn s1_sparse_sparse_2d() {
    let rows = [0i64, 0, 2];
    let cols = [0i64, 2, 1];
    let vals = [1.0, 2.0, 3.0];
    let stream = CoordinateStream::new(&[3, 3], vec![&rows, &cols], &vals);
    let format = Format::new(vec![ModeEncoding::sparse(), ModeEncoding::sparse()]);

    let storage = pack(&stream, &format).unwrap();

    assert_eq!(buffer_values(&storage.get_index(0).pos), vec![0, 2]);
    assert_eq!(buffer_values(&storage.get_index(0).idx), vec![0, 2]);
    assert_eq!(buffer_values(&storage.get_index(1).pos), vec![0, 2, 3]);
    assert_eq!(buffer_values(&storage.get_index(1).idx), vec![0, 2, 1]);
    assert_eq!(read_values(storage.get_values()), vec![1.0, 2.0, 3.0]);
}

#[test]
fn s2_dense_sparse_csr() {
    let rows = [0i64, 0, 2];
    let cols = [0i64, 2, 1];
    let vals = [1.0, 2.0, 3.0];
    let stream = CoordinateStream::new(&[3, 3], vec![&rows, &cols], &vals);
    let format = Format::new(vec![ModeEncoding::dense(), ModeEncoding::sparse()]);

    let storage = pack(&stream, &format).unwrap();

    assert_eq!(buffer_values(&storage.get_index(1).pos), vec![0, 2, 2, 3]);
    assert_eq!(buffer_values(&storage.get_index(1).idx), vec![0, 2, 1]);
    assert_eq!(read_values(storage.get_values()), vec![1.0, 2.0, 3.0]);
}

#[test]
fn s3_dense_dense_2d() {
    let rows = [0i64, 0, 2];
    let cols = [0i64, 2, 1];
    let vals = [1.0, 2.0, 3.0];
    let stream = CoordinateStream::new(&[3, 3], vec![&rows, &cols], &vals);
    let format = Format::new(vec![ModeEncoding::dense(), ModeEncoding::dense()]);

    let storage = pack(&stream, &format).unwrap();

    assert_eq!(
        read_values(storage.get_values()),
        vec![1.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0]
    );
}

#[test]
fn s4_fixed_inner() {
    let rows = [0i64, 0, 1];
    let cols = [0i64, 2, 1];
    let vals = [1.0, 2.0, 3.0];
    let stream = CoordinateStream::new(&[2, 3], vec![&rows, &cols], &vals);
    let format = Format::new(vec![ModeEncoding::dense(), ModeEncoding::fixed()]);

    let storage = pack(&stream, &format).unwrap();

    assert_eq!(storage.get_index(1).pos.get(0), 2);
    assert_eq!(buffer_values(&storage.get_index(1).idx), vec![0, 2, 1, 1]);
    assert_eq!(read_values(storage.get_values()), vec![1.0, 2.0, 3.0, 0.0]);
}

#[test]
fn s5_round_trip_text() {
    let input = "1 1 1.0\n1 3 2.0\n3 2 3.0\n";
    let tensor = read_coo(input.as_bytes()).unwrap();
    let format = Format::new(vec![ModeEncoding::sparse(), ModeEncoding::sparse()]);
    let stream = CoordinateStream::new(&tensor.dimensions, tensor.coord_slices(), &tensor.vals);
    let storage = pack(&stream, &format).unwrap();

    let mut out = Vec::new();
    write_coo(&mut out, &storage).unwrap();

    // Value formatting may differ (e.g. "1" vs "1.0"); compare the
    // round-tripped tensor's content instead of the raw bytes.
    let roundtripped = read_coo(out.as_slice()).unwrap();
    assert_eq!(roundtripped.dimensions, tensor.dimensions);
    assert_eq!(roundtripped.coords, tensor.coords);
    assert_eq!(roundtripped.vals, tensor.vals);
}

#[test]
fn s6_empty_tensor() {
    let stream = CoordinateStream::new(&[0, 0], vec![&[], &[]], &[]);
    let format = Format::new(vec![ModeEncoding::sparse(), ModeEncoding::sparse()]);

    let storage = pack(&stream, &format).unwrap();

    assert_eq!(storage.get_values().len(), 0);
    assert_eq!(buffer_values(&storage.get_index(0).pos), vec![0]);
    assert_eq!(buffer_values(&storage.get_index(1).pos), vec![0]);
}
