#![allow(dead_code)]

use blasq::{set_device, Device, Queue};

/// Bind the process to stub device 0 and build a fresh queue.
pub fn queue() -> Queue {
    set_device(Device::new(0)).expect("stub device 0 exists");
    Queue::new(Device::new(0)).expect("queue construction on stub backend")
}

/// Count recorded operations with the given name.
pub fn count_ops(queue: &Queue, name: &str) -> usize {
    queue
        .recorded_ops()
        .iter()
        .filter(|op| op.name == name)
        .count()
}
