#![cfg(not(any(feature = "stub", feature = "cuda")))]

use blasq::device::{device_count, device_malloc, device_memcpy};
use blasq::{set_device, Device, Error, MemcpyKind, Queue};

#[test]
fn device_calls_fail_without_a_backend() {
    let err = set_device(Device::new(0)).unwrap_err();
    assert!(matches!(err, Error::NotAvailable { .. }));

    let err = device_count().unwrap_err();
    assert!(matches!(err, Error::NotAvailable { .. }));

    let err = device_malloc::<f32>(16).unwrap_err();
    assert!(matches!(err, Error::NotAvailable { .. }));
}

#[test]
fn queue_state_machine_works_but_device_work_is_refused() {
    // Construction and the mode/cursor state machine are pure host
    // state; only calls that would touch a device fail.
    let mut queue = Queue::new(Device::new(0)).unwrap();
    assert!(!queue.is_forked());
    assert_eq!(queue.num_active_streams(), 1);

    queue.fork().unwrap();
    assert!(queue.is_forked());
    queue.revolve().unwrap();
    queue.join().unwrap();
    assert!(!queue.is_forked());

    let err = device_memcpy::<f32>(0, 0, 4, MemcpyKind::Default, &queue).unwrap_err();
    assert!(matches!(err, Error::NotAvailable { .. }));

    let err = blasq::blas::gemm(
        blasq::Layout::ColMajor,
        blasq::Op::NoTrans,
        blasq::Op::NoTrans,
        4,
        4,
        4,
        1.0f32,
        0,
        4,
        0,
        4,
        0.0f32,
        0,
        4,
        &queue,
    )
    .unwrap_err();
    assert!(matches!(err, Error::NotAvailable { func: "gemm" }));
}
