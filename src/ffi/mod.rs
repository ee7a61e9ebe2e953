//! FFI Module for luafann
//!
//! Everything the binding knows about the native FANN library: its opaque
//! types, its enum identifiers and the table of entry points.
//!
//! # Architecture
//!
//! ```text
//! luafann.toml / LUAFANN_LIBRARY
//!       │
//!       ▼
//! LibraryLoader (search paths, platform file names)
//!       │
//!       ▼
//! libloading::Library ──► FannFunctions (typed symbols)
//!       │
//!       ▼
//! FannApi (shared, outlives every handle)
//! ```
//!
//! A `FannApi` does not have to come from a shared library: any set of
//! `extern "C"` functions with FANN's signatures can be wrapped with
//! [`FannApi::from_functions`].

mod api;
mod loader;
mod types;

pub use api::{FannApi, FannFunctions, FfiError};
pub use loader::LibraryLoader;
pub use types::{
    ActivationFunction, Fann, FannEnum, FannTrainData, FannType, StopFunction, TrainingAlgorithm,
};
