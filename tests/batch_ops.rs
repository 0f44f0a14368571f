#![cfg(all(feature = "stub", not(feature = "cuda")))]

mod common;

use blasq::{batch, Device, Diag, Error, Layout, Op, Queue, Side, StreamId, Uplo};

/// Issue a batched gemm where everything except `m` and `info` is
/// broadcast; device pointers are opaque to the stub.
fn gemm_with_m(queue: &mut Queue, m: &[i64], batch: usize, info: &mut [i64]) -> blasq::Result<()> {
    batch::gemm(
        Layout::ColMajor,
        &[Op::NoTrans],
        &[Op::NoTrans],
        m,
        &[8],
        &[8],
        &[1.0f32],
        &[0],
        &[64],
        &[0],
        &[8],
        &[0.0f32],
        &[0],
        &[64],
        batch,
        info,
        queue,
    )
}

#[test]
fn info_length_must_be_zero_one_or_batch() {
    let mut queue = common::queue();
    let mut info = [0i64; 2];
    let err = gemm_with_m(&mut queue, &[8], 3, &mut info).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "info", .. }));
    // Nothing was dispatched.
    assert_eq!(common::count_ops(&queue, "gemm"), 0);
}

#[test]
fn argument_slices_must_broadcast_or_match_batch() {
    let mut queue = common::queue();
    let mut info = [0i64; 3];
    let err = gemm_with_m(&mut queue, &[8, 8], 3, &mut info).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "m", .. }));
}

#[test]
fn malformed_item_is_skipped_and_siblings_still_run() {
    let mut queue = common::queue();
    let mut info = [0i64; 3];
    gemm_with_m(&mut queue, &[8, -1, 8], 3, &mut info).unwrap();

    // m is argument 4 of the signature, layout counted as 1.
    assert_eq!(info, [0, -4, 0]);
    assert_eq!(common::count_ops(&queue, "gemm"), 2);
}

#[test]
fn shared_info_slot_reports_first_failure() {
    let mut queue = common::queue();
    let mut info = [0i64; 1];
    gemm_with_m(&mut queue, &[8, -1, -1, 8], 4, &mut info).unwrap();
    assert_eq!(info[0], -4);
    assert_eq!(common::count_ops(&queue, "gemm"), 2);
}

#[test]
fn empty_info_skips_validation_entirely() {
    let mut queue = common::queue();
    let mut info = [0i64; 0];
    // A negative m would be rejected under validation; with no info the
    // item is forwarded as-is.
    gemm_with_m(&mut queue, &[8, -1], 2, &mut info).unwrap();
    assert_eq!(common::count_ops(&queue, "gemm"), 2);
}

#[test]
fn broadcast_and_per_item_scalars_both_reach_items() {
    let mut queue = common::queue();
    let mut info = [0i64; 3];
    batch::gemm(
        Layout::ColMajor,
        &[Op::NoTrans],
        &[Op::NoTrans],
        &[8],
        &[8],
        &[8],
        &[2.5f32],
        &[0],
        &[8],
        &[0],
        &[8],
        &[0.0f32],
        &[0],
        &[8],
        3,
        &mut info,
        &mut queue,
    )
    .unwrap();

    let broadcast: Vec<String> = queue
        .recorded_ops()
        .into_iter()
        .filter(|op| op.name == "gemm")
        .map(|op| op.detail)
        .collect();
    assert_eq!(broadcast.len(), 3);
    assert!(broadcast.iter().all(|d| d.contains("alpha=2.5")));

    queue.clear_recorded_ops();
    let mut info = [0i64; 3];
    batch::gemm(
        Layout::ColMajor,
        &[Op::NoTrans],
        &[Op::NoTrans],
        &[8],
        &[8],
        &[8],
        &[1.0f32, 2.0, 3.0],
        &[0],
        &[8],
        &[0],
        &[8],
        &[0.0f32],
        &[0],
        &[8],
        3,
        &mut info,
        &mut queue,
    )
    .unwrap();

    let per_item: Vec<String> = queue
        .recorded_ops()
        .into_iter()
        .filter(|op| op.name == "gemm")
        .map(|op| op.detail)
        .collect();
    assert!(per_item[0].contains("alpha=1"));
    assert!(per_item[1].contains("alpha=2"));
    assert!(per_item[2].contains("alpha=3"));
}

#[test]
fn items_round_robin_over_the_stream_pool() {
    let mut queue = common::queue();
    let mut info = [0i64; 25];
    gemm_with_m(&mut queue, &[8], 25, &mut info).unwrap();

    let ops = queue.recorded_ops();
    assert_eq!(ops.first().unwrap().name, "fork");
    assert_eq!(ops.last().unwrap().name, "join");

    let streams: Vec<StreamId> = ops
        .iter()
        .filter(|op| op.name == "gemm")
        .map(|op| op.stream)
        .collect();
    assert_eq!(streams.len(), 25);
    // Pool of 10: items 0, 10, 20 land on the same stream.
    assert_eq!(streams[0], streams[10]);
    assert_eq!(streams[10], streams[20]);
    assert_ne!(streams[0], streams[1]);
    // After join, new work goes back to the default stream.
    assert!(!queue.is_forked());
}

#[test]
fn batch_limit_is_enforced() {
    let mut queue = Queue::with_batch_limit(Device::new(0), 4).unwrap();
    let mut info = [0i64; 5];
    let err = gemm_with_m(&mut queue, &[8], 5, &mut info).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "batch", .. }));
}

#[test]
fn zero_batch_is_a_noop() {
    let mut queue = common::queue();
    let mut info = [0i64; 0];
    gemm_with_m(&mut queue, &[8], 0, &mut info).unwrap();
    assert!(queue.recorded_ops().is_empty());
}

#[test]
fn dimensions_beyond_the_32_bit_interface_are_rejected() {
    let mut queue = common::queue();
    let too_big = (1i64 << 32) + 5;

    // Single-call layer: refused before anything is issued, instead of
    // silently narrowing to the low 32 bits.
    let err = blasq::blas::gemm(
        Layout::ColMajor,
        Op::NoTrans,
        Op::NoTrans,
        too_big,
        8,
        8,
        1.0f32,
        0,
        8,
        0,
        8,
        0.0f32,
        0,
        8,
        &queue,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "m", .. }));
    assert_eq!(common::count_ops(&queue, "gemm"), 0);

    // Batched path, validation disabled: the guard still fires at the
    // forwarding layer; the well-formed item before it was issued.
    let mut info = [0i64; 0];
    let err = gemm_with_m(&mut queue, &[8, too_big], 2, &mut info).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "m", .. }));
    assert_eq!(common::count_ops(&queue, "gemm"), 1);
    // The pool was rejoined on the error path.
    assert!(!queue.is_forked());
}

#[test]
fn trsm_validates_leading_dimensions_per_item() {
    let mut queue = common::queue();
    let mut info = [0i64; 2];
    // Right side means A is n-by-n, so lda = 4 is too small for n = 6.
    batch::trsm(
        Layout::ColMajor,
        &[Side::Left, Side::Right],
        &[Uplo::Lower],
        &[Op::NoTrans],
        &[Diag::NonUnit],
        &[4],
        &[6],
        &[1.0f64],
        &[0],
        &[4],
        &[0],
        &[4],
        2,
        &mut info,
        &mut queue,
    )
    .unwrap();

    // lda is argument 10 of the trsm signature.
    assert_eq!(info, [0, -10]);
    assert_eq!(common::count_ops(&queue, "trsm"), 1);
}

#[test]
fn herk_takes_real_scalars_for_complex_elements() {
    use num_complex::Complex;

    let mut queue = common::queue();
    let mut info = [0i64; 2];
    batch::herk::<Complex<f32>>(
        Layout::ColMajor,
        &[Uplo::Upper],
        &[Op::NoTrans],
        &[4],
        &[3],
        &[1.5f32],
        &[0],
        &[4],
        &[0.0f32],
        &[0],
        &[4],
        2,
        &mut info,
        &mut queue,
    )
    .unwrap();

    assert_eq!(info, [0, 0]);
    assert_eq!(common::count_ops(&queue, "herk"), 2);
}
