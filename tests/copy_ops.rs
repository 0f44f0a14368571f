#![cfg(all(feature = "stub", not(feature = "cuda")))]

mod common;

use blasq::device::{
    device_free, device_getmatrix, device_getvector, device_malloc, device_memcpy,
    device_setmatrix, device_setvector,
};
use blasq::{Error, MemcpyKind};

#[test]
fn contiguous_matrix_transfer_is_one_copy() {
    let queue = common::queue();
    let (m, n) = (4usize, 3usize);
    let host: Vec<f64> = (0..m * n).map(|i| i as f64).collect();
    let dev = device_malloc::<f64>(m * n).unwrap();

    device_setmatrix(m, n, &host, m, dev, m, &queue).unwrap();

    let ops = queue.recorded_ops();
    let copies: Vec<_> = ops.iter().filter(|op| op.name == "memcpy").collect();
    assert_eq!(copies.len(), 1);
    assert_eq!(copies[0].bytes, m * n * std::mem::size_of::<f64>());

    device_free(dev).unwrap();
}

#[test]
fn padded_matrix_transfer_copies_per_column() {
    let queue = common::queue();
    let (m, n, ldh, ldd) = (4usize, 3usize, 6usize, 5usize);
    let host = vec![1.0f64; ldh * n];
    let dev = device_malloc::<f64>(ldd * n).unwrap();

    device_setmatrix(m, n, &host, ldh, dev, ldd, &queue).unwrap();

    let copies = common::count_ops(&queue, "memcpy");
    assert_eq!(copies, n);
    for op in queue.recorded_ops().iter().filter(|op| op.name == "memcpy") {
        assert_eq!(op.bytes, m * std::mem::size_of::<f64>());
    }

    device_free(dev).unwrap();
}

#[test]
fn matrix_roundtrip_preserves_data_through_padding() {
    let queue = common::queue();
    let (m, n, ldh, ldd) = (3usize, 2usize, 4usize, 5usize);

    let mut host = vec![0.0f64; ldh * n];
    for j in 0..n {
        for i in 0..m {
            host[j * ldh + i] = (10 * j + i) as f64;
        }
    }
    let dev = device_malloc::<f64>(ldd * n).unwrap();

    device_setmatrix(m, n, &host, ldh, dev, ldd, &queue).unwrap();
    queue.sync().unwrap();

    let mut back = vec![-1.0f64; ldh * n];
    device_getmatrix(m, n, dev, ldd, &mut back, ldh, &queue).unwrap();
    queue.sync().unwrap();

    for j in 0..n {
        for i in 0..m {
            assert_eq!(back[j * ldh + i], host[j * ldh + i]);
        }
    }
    // Padding rows were never written.
    assert_eq!(back[m], -1.0);

    device_free(dev).unwrap();
}

#[test]
fn unit_stride_vector_transfer_is_one_copy() {
    let queue = common::queue();
    let host: Vec<f32> = (0..16).map(|i| i as f32).collect();
    let dev = device_malloc::<f32>(16).unwrap();

    device_setvector(16, &host, 1, dev, 1, &queue).unwrap();
    assert_eq!(common::count_ops(&queue, "memcpy"), 1);

    device_free(dev).unwrap();
}

#[test]
fn strided_vector_transfer_copies_per_element() {
    let queue = common::queue();
    let n = 5usize;
    let host = vec![2.0f32; 2 * n];
    let dev = device_malloc::<f32>(3 * n).unwrap();

    device_setvector(n, &host, 2, dev, 3, &queue).unwrap();

    assert_eq!(common::count_ops(&queue, "memcpy"), n);
    for op in queue.recorded_ops().iter().filter(|op| op.name == "memcpy") {
        assert_eq!(op.bytes, std::mem::size_of::<f32>());
    }

    device_free(dev).unwrap();
}

#[test]
fn strided_vector_roundtrip_preserves_data() {
    let queue = common::queue();
    let n = 4usize;
    let host: Vec<f32> = (0..2 * n).map(|i| i as f32).collect();
    let dev = device_malloc::<f32>(n).unwrap();

    // Gather every other host element onto the device, then read back
    // densely.
    device_setvector(n, &host, 2, dev, 1, &queue).unwrap();
    queue.sync().unwrap();

    let mut back = vec![0.0f32; n];
    device_getvector(n, dev, 1, &mut back, 1, &queue).unwrap();
    queue.sync().unwrap();

    assert_eq!(back, vec![0.0, 2.0, 4.0, 6.0]);

    device_free(dev).unwrap();
}

#[test]
fn leading_dimension_below_row_count_is_rejected() {
    let queue = common::queue();
    let host = vec![0.0f64; 12];
    let err = device_setmatrix(4, 3, &host, 3, 0, 4, &queue).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "ldh", .. }));
}

#[test]
fn undersized_host_buffer_is_rejected() {
    let queue = common::queue();
    let host = vec![0.0f64; 5];
    let err = device_setmatrix(4, 3, &host, 4, 0, 4, &queue).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "host", .. }));
}

#[test]
fn raw_memcpy_moves_device_data() {
    let queue = common::queue();
    let src = device_malloc::<f32>(8).unwrap();
    let dst = device_malloc::<f32>(8).unwrap();

    let host: Vec<f32> = (0..8).map(|i| i as f32).collect();
    device_setvector(8, &host, 1, src, 1, &queue).unwrap();
    device_memcpy::<f32>(dst, src, 8, MemcpyKind::DeviceToDevice, &queue).unwrap();
    queue.sync().unwrap();

    let mut back = vec![0.0f32; 8];
    device_getvector(8, dst, 1, &mut back, 1, &queue).unwrap();
    queue.sync().unwrap();
    assert_eq!(back, host);

    device_free(src).unwrap();
    device_free(dst).unwrap();
}

#[test]
fn freeing_an_unknown_pointer_is_an_error() {
    let _queue = common::queue();
    let err = device_free(0xdead_beef).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "ptr", .. }));
}

#[test]
fn zero_sized_transfers_are_noops() {
    let queue = common::queue();
    let host: Vec<f64> = Vec::new();
    device_setmatrix(0, 0, &host, 1, 0, 1, &queue).unwrap();
    device_setvector(0, &host, 1, 0, 1, &queue).unwrap();
    assert_eq!(common::count_ops(&queue, "memcpy"), 0);
}
