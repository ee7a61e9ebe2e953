//! Native handle wrapper
//!
//! A [`NativeHandle`] owns one pointer handed out by FANN. The pointer is
//! released exactly once, either explicitly or when the owning Lua userdata
//! is collected, and is null from then on.

use std::cell::Cell;
use std::fmt;
use std::ptr;
use std::sync::Arc;

use crate::error::{BindingError, BindingResult};
use crate::ffi::{Fann, FannApi, FannTrainData};

/// A FANN object type with a destructor
pub trait NativeResource: 'static {
    /// Class tag shown to Lua in type errors
    const CLASS: &'static str;

    /// Free `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be a live object of this type created through `api`, and
    /// must not be used again afterwards.
    unsafe fn destroy(api: &FannApi, ptr: *mut Self);
}

impl NativeResource for Fann {
    const CLASS: &'static str = "fann.net";

    unsafe fn destroy(api: &FannApi, ptr: *mut Self) {
        (api.destroy)(ptr)
    }
}

impl NativeResource for FannTrainData {
    const CLASS: &'static str = "fann.train";

    unsafe fn destroy(api: &FannApi, ptr: *mut Self) {
        (api.destroy_train)(ptr)
    }
}

/// Owned native pointer with a released state
pub struct NativeHandle<T: NativeResource> {
    ptr: Cell<*mut T>,
    api: Arc<FannApi>,
}

impl<T: NativeResource> NativeHandle<T> {
    /// Take ownership of `ptr`; `None` if the constructor returned null.
    pub fn new(api: Arc<FannApi>, ptr: *mut T) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }
        Some(Self {
            ptr: Cell::new(ptr),
            api,
        })
    }

    /// The library this handle was created with
    pub fn api(&self) -> &FannApi {
        &self.api
    }

    /// The live pointer, or `Released` once the handle has been freed
    pub fn get(&self) -> BindingResult<*mut T> {
        let ptr = self.ptr.get();
        if ptr.is_null() {
            return Err(BindingError::Released { class: T::CLASS });
        }
        Ok(ptr)
    }

    pub fn is_released(&self) -> bool {
        self.ptr.get().is_null()
    }

    /// Free the native object. Returns `false` if it was already released.
    pub fn release(&self) -> bool {
        let ptr = self.ptr.replace(ptr::null_mut());
        if ptr.is_null() {
            return false;
        }
        tracing::debug!(class = T::CLASS, "releasing native handle");
        // Safety: `ptr` came from `api` and was live until the swap above
        // nulled the only copy.
        unsafe { T::destroy(&self.api, ptr) };
        true
    }
}

impl<T: NativeResource> Drop for NativeHandle<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: NativeResource> fmt::Debug for NativeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("class", &T::CLASS)
            .field("released", &self.is_released())
            .finish()
    }
}
