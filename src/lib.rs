//! Luafann - Lua bindings for the FANN neural network library
//!
//! Exposes FANN (Fast Artificial Neural Network) to Lua 5.4 as a `fann`
//! module: factories that build networks and load training data, methods on
//! the resulting handles, and the FANN enum identifiers as integer constants.
//!
//! # Features
//!
//! - **Networks**: standard and sparse topologies, or loaded from a saved file
//! - **Training data**: read, save and rescale FANN training files
//! - **Training**: on a file or an in-memory set, with MSE testing
//! - **Deterministic release**: `close()` or `<close>` variables free native
//!   memory immediately; collection frees whatever is left
//!
//! # Example
//!
//! ```lua
//! local fann = require("fann")
//!
//! local ann = fann.create_standard(3, 2, 3, 1)
//! ann:set_activation_function_hidden(fann.FANN_SIGMOID_SYMMETRIC)
//! ann:train_on_file("xor.data", 1000, 100, 0.001)
//! print(ann:run(-1, 1))
//! ann:save("xor.net")
//! ```
//!
//! Embedding from Rust:
//!
//! ```no_run
//! let lua = mlua::Lua::new();
//! luafann::register(&lua).unwrap();
//! lua.load("print(fann.create_standard(2, 2, 1))").exec().unwrap();
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Lua script    │  fann.create_standard(...), net:run(...)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Operation table │  arity check, then handler
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   Marshaling    │  Lua values → unsigned / fann_type / path / handle
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    FannApi      │  libfann entry points, loaded at runtime
//! └─────────────────┘
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod logging;
pub mod marshal;
pub mod module;
pub mod network;
pub mod train_data;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use mlua::{Lua, Table};

pub use config::{ConfigError, LibraryConfig, LoggingConfig, LuafannConfig};
pub use error::{BindingError, BindingResult};
pub use ffi::{
    ActivationFunction, FannApi, FannFunctions, FfiError, LibraryLoader, StopFunction,
    TrainingAlgorithm,
};
pub use handle::NativeHandle;
pub use module::MODULE_NAME;
pub use network::Network;
pub use train_data::TrainingSet;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve configuration, set up logging and load libfann.
fn shared_api() -> Result<Arc<FannApi>, BindingError> {
    let config = LuafannConfig::resolve()?;
    if logging::init(&config.logging) {
        tracing::debug!(version = VERSION, "verbose logging enabled");
    }
    Ok(FannApi::shared(&config.library)?)
}

/// Build the `fann` module table against the process-wide libfann.
pub fn open(lua: &Lua) -> mlua::Result<Table> {
    let api = shared_api()?;
    module::build(lua, api)
}

/// Build the `fann` module table against a specific library.
pub fn open_with(lua: &Lua, api: Arc<FannApi>) -> mlua::Result<Table> {
    module::build(lua, api)
}

/// Register `fann` as a global and in `package.loaded`.
pub fn register(lua: &Lua) -> mlua::Result<Table> {
    let api = shared_api()?;
    module::register(lua, api)
}

/// Register `fann` against a specific library.
pub fn register_with(lua: &Lua, api: Arc<FannApi>) -> mlua::Result<Table> {
    module::register(lua, api)
}

/// Entry point for `require("fann")` when built as a loadable module.
#[cfg(feature = "module")]
#[mlua::lua_module]
fn fann(lua: &Lua) -> mlua::Result<Table> {
    open(lua)
}
