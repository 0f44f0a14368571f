#![cfg(all(feature = "stub", not(feature = "cuda")))]

mod common;

use blasq::device::{device_free, device_malloc, device_memset};
use blasq::{StreamId, FORK_POOL_SIZE};

#[test]
fn fork_and_join_round_trip() {
    let mut queue = common::queue();
    assert!(!queue.is_forked());
    assert_eq!(queue.num_active_streams(), 1);

    queue.fork().unwrap();
    assert!(queue.is_forked());
    assert_eq!(queue.num_active_streams(), FORK_POOL_SIZE);

    // Idempotent: a second fork neither re-forks nor resets the cursor.
    queue.revolve().unwrap();
    queue.fork().unwrap();
    assert_eq!(common::count_ops(&queue, "fork"), 1);
    assert_eq!(queue.num_active_streams(), FORK_POOL_SIZE);

    queue.join().unwrap();
    assert!(!queue.is_forked());
    assert_eq!(queue.num_active_streams(), 1);
    assert_eq!(common::count_ops(&queue, "join"), 1);
}

#[test]
fn revolve_outside_fork_is_a_noop() {
    let mut queue = common::queue();
    let ptr = device_malloc::<f32>(16).unwrap();

    queue.revolve().unwrap();
    device_memset::<f32>(ptr, 0, 16, &queue).unwrap();

    let ops = queue.recorded_ops();
    let memset = ops.iter().find(|op| op.name == "memset").unwrap();
    assert_eq!(memset.stream, StreamId::Default);

    queue.sync().unwrap();
    device_free(ptr).unwrap();
}

#[test]
fn revolve_cycles_through_the_pool() {
    let mut queue = common::queue();
    let ptr = device_malloc::<f32>(16).unwrap();

    queue.fork().unwrap();
    // One memset per revolution, one full lap plus one step.
    for _ in 0..FORK_POOL_SIZE + 1 {
        device_memset::<f32>(ptr, 0, 16, &queue).unwrap();
        queue.revolve().unwrap();
    }
    queue.join().unwrap();

    let streams: Vec<StreamId> = queue
        .recorded_ops()
        .into_iter()
        .filter(|op| op.name == "memset")
        .map(|op| op.stream)
        .collect();
    assert_eq!(streams.len(), FORK_POOL_SIZE + 1);
    assert_eq!(streams[0], StreamId::Parallel(0));
    assert_eq!(streams[FORK_POOL_SIZE], streams[0]);
    for i in 0..FORK_POOL_SIZE {
        assert_eq!(streams[i], StreamId::Parallel(i));
    }

    device_free(ptr).unwrap();
}

#[test]
fn workspace_grows_monotonically() {
    let mut queue = common::queue();
    assert_eq!(queue.work(), 0);
    assert_eq!(queue.work_size::<f64>(), 0);

    queue.work_resize::<f64>(100).unwrap();
    let first = queue.work();
    assert_ne!(first, 0);
    assert_eq!(queue.work_size::<f64>(), 100);

    // Smaller request: same buffer, same capacity.
    queue.work_resize::<f64>(40).unwrap();
    assert_eq!(queue.work(), first);
    assert_eq!(queue.work_size::<f64>(), 100);

    // Capacity is in bytes, so element counts convert across types.
    assert_eq!(queue.work_size::<f32>(), 200);

    queue.clear_recorded_ops();
    queue.work_resize::<f64>(250).unwrap();
    assert_eq!(queue.work_size::<f64>(), 250);
    // The realloc path drains in-flight work before freeing.
    assert_eq!(common::count_ops(&queue, "sync"), 1);
}

#[test]
fn workspace_resize_rejects_overflowing_requests() {
    let mut queue = common::queue();
    let err = queue.work_resize::<f64>(usize::MAX).unwrap_err();
    assert!(matches!(
        err,
        blasq::Error::InvalidArgument { arg: "len", .. }
    ));
    // Nothing was allocated or freed on the failure path.
    assert_eq!(queue.work(), 0);
    assert_eq!(queue.work_size::<f64>(), 0);
}

#[test]
fn batch_limit_is_configurable() {
    use blasq::{Device, Queue, DEFAULT_BATCH_LIMIT};

    let queue = common::queue();
    assert_eq!(queue.batch_limit(), DEFAULT_BATCH_LIMIT);

    let queue = Queue::with_batch_limit(Device::new(0), 8).unwrap();
    assert_eq!(queue.batch_limit(), 8);
}
