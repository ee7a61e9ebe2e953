//! FANN Function Table
//!
//! Typed function pointers for every FANN entry point the binding calls,
//! resolved from a loaded shared library or supplied directly.

use std::fmt;
use std::ops::Deref;
use std::os::raw::{c_char, c_float, c_int, c_uint};
use std::path::Path;
use std::sync::Arc;

use libloading::{Library, Symbol};
use once_cell::sync::OnceCell;

use super::loader::LibraryLoader;
use super::types::{Fann, FannTrainData, FannType};
use crate::config::LibraryConfig;

/// Error type for library loading
#[derive(Debug, Clone)]
pub enum FfiError {
    /// Failed to load a library
    LoadError(String),
    /// Symbol not found in library
    SymbolNotFound(String),
    /// No candidate library could be loaded
    LibraryNotFound { name: String, tried: Vec<String> },
}

impl fmt::Display for FfiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiError::LoadError(msg) => write!(f, "Load error: {}", msg),
            FfiError::SymbolNotFound(msg) => write!(f, "Symbol not found: {}", msg),
            FfiError::LibraryNotFound { name, tried } => {
                write!(f, "Library '{}' not found", name)?;
                if !tried.is_empty() {
                    write!(f, " (tried: {})", tried.join("; "))?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for FfiError {}

/// FANN entry points, one field per C function
///
/// Every field has the exact C signature of the float build of FANN
/// (`fann_type` = `float`). Enum parameters are passed as `unsigned int`.
#[derive(Clone, Copy)]
pub struct FannFunctions {
    pub create_standard_array: unsafe extern "C" fn(c_uint, *const c_uint) -> *mut Fann,
    pub create_sparse_array: unsafe extern "C" fn(c_float, c_uint, *const c_uint) -> *mut Fann,
    pub create_from_file: unsafe extern "C" fn(*const c_char) -> *mut Fann,
    pub destroy: unsafe extern "C" fn(*mut Fann),
    pub get_num_input: unsafe extern "C" fn(*mut Fann) -> c_uint,
    pub get_num_output: unsafe extern "C" fn(*mut Fann) -> c_uint,
    pub get_total_neurons: unsafe extern "C" fn(*mut Fann) -> c_uint,
    pub print_connections: unsafe extern "C" fn(*mut Fann),
    pub print_parameters: unsafe extern "C" fn(*mut Fann),
    pub set_training_algorithm: unsafe extern "C" fn(*mut Fann, c_uint),
    pub get_training_algorithm: unsafe extern "C" fn(*mut Fann) -> c_uint,
    pub set_learning_rate: unsafe extern "C" fn(*mut Fann, c_float),
    pub get_learning_rate: unsafe extern "C" fn(*mut Fann) -> c_float,
    pub set_activation_function_hidden: unsafe extern "C" fn(*mut Fann, c_uint),
    pub set_activation_function_output: unsafe extern "C" fn(*mut Fann, c_uint),
    pub set_activation_steepness_hidden: unsafe extern "C" fn(*mut Fann, FannType),
    pub set_activation_steepness_output: unsafe extern "C" fn(*mut Fann, FannType),
    pub set_train_stop_function: unsafe extern "C" fn(*mut Fann, c_uint),
    pub get_train_stop_function: unsafe extern "C" fn(*mut Fann) -> c_uint,
    pub set_bit_fail_limit: unsafe extern "C" fn(*mut Fann, FannType),
    pub get_bit_fail_limit: unsafe extern "C" fn(*mut Fann) -> FannType,
    pub init_weights: unsafe extern "C" fn(*mut Fann, *mut FannTrainData),
    pub test_data: unsafe extern "C" fn(*mut Fann, *mut FannTrainData) -> c_float,
    pub run: unsafe extern "C" fn(*mut Fann, *mut FannType) -> *mut FannType,
    pub save: unsafe extern "C" fn(*mut Fann, *const c_char) -> c_int,
    pub train_on_file: unsafe extern "C" fn(*mut Fann, *const c_char, c_uint, c_uint, c_float),
    pub train_on_data: unsafe extern "C" fn(*mut Fann, *mut FannTrainData, c_uint, c_uint, c_float),
    pub read_train_from_file: unsafe extern "C" fn(*const c_char) -> *mut FannTrainData,
    pub destroy_train: unsafe extern "C" fn(*mut FannTrainData),
    pub save_train: unsafe extern "C" fn(*mut FannTrainData, *const c_char) -> c_int,
    pub scale_input_train_data: unsafe extern "C" fn(*mut FannTrainData, FannType, FannType),
    pub scale_output_train_data: unsafe extern "C" fn(*mut FannTrainData, FannType, FannType),
    pub scale_train_data: unsafe extern "C" fn(*mut FannTrainData, FannType, FannType),
}

impl FannFunctions {
    /// Resolve every entry point from a loaded library
    pub fn resolve(library: &Library, path: &Path) -> Result<Self, FfiError> {
        Ok(Self {
            create_standard_array: symbol(library, path, "fann_create_standard_array")?,
            create_sparse_array: symbol(library, path, "fann_create_sparse_array")?,
            create_from_file: symbol(library, path, "fann_create_from_file")?,
            destroy: symbol(library, path, "fann_destroy")?,
            get_num_input: symbol(library, path, "fann_get_num_input")?,
            get_num_output: symbol(library, path, "fann_get_num_output")?,
            get_total_neurons: symbol(library, path, "fann_get_total_neurons")?,
            print_connections: symbol(library, path, "fann_print_connections")?,
            print_parameters: symbol(library, path, "fann_print_parameters")?,
            set_training_algorithm: symbol(library, path, "fann_set_training_algorithm")?,
            get_training_algorithm: symbol(library, path, "fann_get_training_algorithm")?,
            set_learning_rate: symbol(library, path, "fann_set_learning_rate")?,
            get_learning_rate: symbol(library, path, "fann_get_learning_rate")?,
            set_activation_function_hidden: symbol(
                library,
                path,
                "fann_set_activation_function_hidden",
            )?,
            set_activation_function_output: symbol(
                library,
                path,
                "fann_set_activation_function_output",
            )?,
            set_activation_steepness_hidden: symbol(
                library,
                path,
                "fann_set_activation_steepness_hidden",
            )?,
            set_activation_steepness_output: symbol(
                library,
                path,
                "fann_set_activation_steepness_output",
            )?,
            set_train_stop_function: symbol(library, path, "fann_set_train_stop_function")?,
            get_train_stop_function: symbol(library, path, "fann_get_train_stop_function")?,
            set_bit_fail_limit: symbol(library, path, "fann_set_bit_fail_limit")?,
            get_bit_fail_limit: symbol(library, path, "fann_get_bit_fail_limit")?,
            init_weights: symbol(library, path, "fann_init_weights")?,
            test_data: symbol(library, path, "fann_test_data")?,
            run: symbol(library, path, "fann_run")?,
            save: symbol(library, path, "fann_save")?,
            train_on_file: symbol(library, path, "fann_train_on_file")?,
            train_on_data: symbol(library, path, "fann_train_on_data")?,
            read_train_from_file: symbol(library, path, "fann_read_train_from_file")?,
            destroy_train: symbol(library, path, "fann_destroy_train")?,
            save_train: symbol(library, path, "fann_save_train")?,
            scale_input_train_data: symbol(library, path, "fann_scale_input_train_data")?,
            scale_output_train_data: symbol(library, path, "fann_scale_output_train_data")?,
            scale_train_data: symbol(library, path, "fann_scale_train_data")?,
        })
    }
}

/// Copy a typed symbol out of a library
///
/// The returned function pointer is only valid while `library` stays loaded;
/// `FannApi` keeps the library alongside the table for that reason.
fn symbol<T: Copy>(library: &Library, path: &Path, name: &str) -> Result<T, FfiError> {
    // Safety: the caller supplies the C signature of `name` as `T`.
    let symbol: Symbol<T> = unsafe {
        library.get(name.as_bytes()).map_err(|e| {
            FfiError::SymbolNotFound(format!(
                "Symbol '{}' not found in '{}': {}",
                name,
                path.display(),
                e
            ))
        })?
    };
    Ok(*symbol)
}

/// A usable FANN: the function table plus whatever keeps it valid
pub struct FannApi {
    functions: FannFunctions,
    origin: String,
    _library: Option<Library>,
}

static SHARED: OnceCell<Arc<FannApi>> = OnceCell::new();

impl FannApi {
    /// Wrap a function table whose functions live for the whole process
    /// (statically linked FANN, or an in-process implementation)
    pub fn from_functions(origin: impl Into<String>, functions: FannFunctions) -> Self {
        Self {
            functions,
            origin: origin.into(),
            _library: None,
        }
    }

    /// Wrap a function table resolved from `library`
    pub fn from_library(origin: impl Into<String>, library: Library, functions: FannFunctions) -> Self {
        Self {
            functions,
            origin: origin.into(),
            _library: Some(library),
        }
    }

    /// Locate and load FANN according to `config`
    pub fn load(config: &LibraryConfig) -> Result<Self, FfiError> {
        LibraryLoader::from_config(config).load()
    }

    /// The process-wide FANN, loaded on first use and shared afterwards
    pub fn shared(config: &LibraryConfig) -> Result<Arc<Self>, FfiError> {
        if let Some(api) = SHARED.get() {
            tracing::debug!(origin = %api.origin, "reusing loaded FANN library");
            return Ok(Arc::clone(api));
        }
        SHARED
            .get_or_try_init(|| FannApi::load(config).map(Arc::new))
            .map(Arc::clone)
    }

    /// Where the functions came from (library path or a description)
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl Deref for FannApi {
    type Target = FannFunctions;

    fn deref(&self) -> &FannFunctions {
        &self.functions
    }
}

impl fmt::Debug for FannApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FannApi")
            .field("origin", &self.origin)
            .field("dynamic", &self._library.is_some())
            .finish()
    }
}
