//! Fallback when no accelerator backend is compiled in
//!
//! The public API keeps its shape; queue construction and the pure state
//! machine still work, but every call that would touch a device fails
//! with [`Error::NotAvailable`] naming the function.

use crate::batch::Routine;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::types::MemcpyKind;

pub(crate) fn set_device(_device: Device) -> Result<()> {
    Err(Error::NotAvailable { func: "set_device" })
}

pub(crate) fn get_device() -> Result<Device> {
    Err(Error::NotAvailable { func: "get_device" })
}

pub(crate) fn device_count() -> Result<usize> {
    Err(Error::NotAvailable {
        func: "device_count",
    })
}

pub(crate) fn malloc(_bytes: usize) -> Result<u64> {
    Err(Error::NotAvailable {
        func: "device_malloc",
    })
}

pub(crate) fn malloc_pinned(_bytes: usize) -> Result<u64> {
    Err(Error::NotAvailable {
        func: "device_malloc_pinned",
    })
}

pub(crate) fn free(_ptr: u64) -> Result<()> {
    Err(Error::NotAvailable {
        func: "device_free",
    })
}

pub(crate) fn free_pinned(_ptr: u64) -> Result<()> {
    Err(Error::NotAvailable {
        func: "device_free_pinned",
    })
}

pub(crate) fn fork_allowed(_routine: Routine) -> bool {
    false
}

/// Queue internals with no backing device: the mode/cursor state machine
/// is handled by `Queue` itself, so nothing is stored here.
pub(crate) struct NullQueue;

pub(crate) use NullQueue as QueueImpl;

impl NullQueue {
    pub(crate) fn new(_device: Device) -> Result<Self> {
        Ok(NullQueue)
    }

    pub(crate) fn sync_all(&self) -> Result<()> {
        Ok(())
    }

    pub(crate) fn fork_streams(&mut self) -> Result<()> {
        Ok(())
    }

    pub(crate) fn join_streams(&mut self) -> Result<()> {
        Ok(())
    }

    pub(crate) fn activate_stream(&mut self, _index: Option<usize>) -> Result<()> {
        Ok(())
    }

    pub(crate) fn memcpy_async(
        &self,
        _dst: u64,
        _src: u64,
        _bytes: usize,
        _kind: MemcpyKind,
    ) -> Result<()> {
        Err(Error::NotAvailable {
            func: "device_memcpy",
        })
    }

    pub(crate) fn memset_async(&self, _ptr: u64, _value: u8, _bytes: usize) -> Result<()> {
        Err(Error::NotAvailable {
            func: "device_memset",
        })
    }

    pub(crate) fn malloc(&self, _bytes: usize) -> Result<u64> {
        Err(Error::NotAvailable {
            func: "device_malloc",
        })
    }

    pub(crate) fn free(&self, _ptr: u64) -> Result<()> {
        Err(Error::NotAvailable {
            func: "device_free",
        })
    }
}
