//! Binding errors
//!
//! Every failure of a Lua-facing operation is a [`BindingError`]. They reach
//! Lua as runtime errors carrying the message, so `pcall` sees plain strings.

use thiserror::Error;

use crate::config::ConfigError;
use crate::ffi::FfiError;

/// Errors raised by marshaling, validation and native calls.
#[derive(Debug, Error)]
pub enum BindingError {
    /// Fewer arguments than the operation's minimum arity
    #[error("insufficient parameters to {function} (expected at least {expected}, got {got})")]
    InsufficientParameters {
        function: String,
        expected: usize,
        got: usize,
    },

    /// Wrong Lua type or wrong handle class
    #[error("bad argument #{position} to '{function}' ({expected} expected, got {got})")]
    ArgType {
        function: String,
        position: usize,
        expected: String,
        got: String,
    },

    /// Right type, value outside what the native signature can carry
    #[error("bad argument #{position} to '{function}' ({message})")]
    ArgRange {
        function: String,
        position: usize,
        message: String,
    },

    #[error("neural network must have at least one layer (got {layers})")]
    LayerCount { layers: i64 },

    /// Variadic topology factories need exactly one argument per layer
    #[error("neural net has {layers} layers, so {function}() must have {expected} parameters (got {got})")]
    TopologyArity {
        function: String,
        layers: usize,
        expected: usize,
        got: usize,
    },

    /// Zero-based layer index
    #[error("layer {index} must have at least 1 neuron (got {neurons})")]
    LayerSize { index: usize, neurons: i64 },

    #[error("wrong number of inputs: expected {expected}, got {got}")]
    InputCount { expected: usize, got: usize },

    #[error("{value} is not a valid {kind}")]
    InvalidEnum { kind: &'static str, value: i64 },

    #[error("attempt to use a released {class}")]
    Released { class: &'static str },

    /// The native library reported failure
    #[error("{0}")]
    Native(String),

    #[error("out of memory")]
    OutOfMemory,

    #[error(transparent)]
    Library(#[from] FfiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lua(#[from] mlua::Error),
}

/// Result type for binding operations
pub type BindingResult<T> = Result<T, BindingError>;

impl From<BindingError> for mlua::Error {
    fn from(e: BindingError) -> Self {
        match e {
            BindingError::Lua(inner) => inner,
            other => mlua::Error::RuntimeError(other.to_string()),
        }
    }
}
