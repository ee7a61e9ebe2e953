//! Dynamic Library Loader
//!
//! Finds the FANN shared library and resolves its entry points.

use std::path::{Path, PathBuf};

use libloading::Library;

use super::api::{FannApi, FannFunctions, FfiError};
use crate::config::LibraryConfig;

/// Versioned soname the FANN 2.x packages install
const FANN_SONAME_VERSION: &str = "2";

/// Library loader with search paths
pub struct LibraryLoader {
    /// Base library name (`fann` → `libfann.so`)
    name: String,
    /// Explicit library file, tried first
    explicit: Option<PathBuf>,
    /// Search paths for libraries
    search_paths: Vec<PathBuf>,
}

impl LibraryLoader {
    /// Create a loader for `name` with the platform search paths
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            explicit: None,
            search_paths: default_search_paths(),
        }
    }

    /// Create a loader from the `[library]` config section
    pub fn from_config(config: &LibraryConfig) -> Self {
        let mut loader = Self::new(config.name.clone());
        loader.explicit = config.path.as_ref().map(PathBuf::from);
        let mut paths: Vec<PathBuf> = config.search_paths.iter().map(PathBuf::from).collect();
        paths.append(&mut loader.search_paths);
        loader.search_paths = paths;
        loader
    }

    /// Every file the loader will try, in order
    ///
    /// Files found on disk come first; the bare file names at the end are
    /// handed to the system loader, which applies its own search rules.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(explicit) = &self.explicit {
            candidates.push(explicit.clone());
        }

        let filenames = library_filenames(&self.name);
        for search_path in &self.search_paths {
            for filename in &filenames {
                let full_path = search_path.join(filename);
                if full_path.exists() && !candidates.contains(&full_path) {
                    candidates.push(full_path);
                }
            }
        }

        for filename in filenames {
            let bare = PathBuf::from(filename);
            if !candidates.contains(&bare) {
                candidates.push(bare);
            }
        }

        candidates
    }

    /// Load the first candidate that opens and exports every FANN symbol
    pub fn load(&self) -> Result<FannApi, FfiError> {
        let mut tried = Vec::new();

        for candidate in self.candidates() {
            match open_library(&candidate) {
                Ok(api) => {
                    tracing::info!(path = %candidate.display(), "loaded FANN library");
                    return Ok(api);
                }
                Err(e) => {
                    tracing::debug!(path = %candidate.display(), error = %e, "FANN candidate rejected");
                    tried.push(e.to_string());
                }
            }
        }

        tracing::warn!(name = %self.name, "no usable FANN library found");
        Err(FfiError::LibraryNotFound {
            name: self.name.clone(),
            tried,
        })
    }
}

/// Open one library file and resolve the function table from it
fn open_library(path: &Path) -> Result<FannApi, FfiError> {
    // Safety: loading a shared library runs its initialisers. The path comes
    // from the user's configuration or the platform library directories.
    let library = unsafe {
        Library::new(path).map_err(|e| {
            FfiError::LoadError(format!(
                "Failed to load library '{}': {}",
                path.display(),
                e
            ))
        })?
    };

    let functions = FannFunctions::resolve(&library, path)?;
    Ok(FannApi::from_library(
        path.display().to_string(),
        library,
        functions,
    ))
}

/// Get the default library search paths for this platform
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // Current directory
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd);
    }

    // Standard system paths
    #[cfg(target_os = "linux")]
    {
        paths.push(PathBuf::from("/usr/lib"));
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/usr/lib/x86_64-linux-gnu"));
        paths.push(PathBuf::from("/usr/lib/aarch64-linux-gnu"));
        paths.push(PathBuf::from("/lib"));
        paths.push(PathBuf::from("/lib64"));
        paths.push(PathBuf::from("/usr/lib64"));

        // LD_LIBRARY_PATH
        if let Ok(ld_path) = std::env::var("LD_LIBRARY_PATH") {
            for p in ld_path.split(':').filter(|p| !p.is_empty()) {
                paths.push(PathBuf::from(p));
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        paths.push(PathBuf::from("/usr/lib"));
        paths.push(PathBuf::from("/usr/local/lib"));
        paths.push(PathBuf::from("/opt/homebrew/lib"));

        // DYLD_LIBRARY_PATH
        if let Ok(dyld_path) = std::env::var("DYLD_LIBRARY_PATH") {
            for p in dyld_path.split(':').filter(|p| !p.is_empty()) {
                paths.push(PathBuf::from(p));
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        // PATH
        if let Ok(path) = std::env::var("PATH") {
            for p in path.split(';').filter(|p| !p.is_empty()) {
                paths.push(PathBuf::from(p));
            }
        }
    }

    paths
}

/// Platform-specific file names for a library, unversioned first
pub(crate) fn library_filenames(name: &str) -> Vec<String> {
    #[cfg(target_os = "linux")]
    {
        if name.contains(".so") {
            vec![name.to_string()]
        } else {
            vec![
                format!("lib{}.so", name),
                format!("lib{}.so.{}", name, FANN_SONAME_VERSION),
            ]
        }
    }

    #[cfg(target_os = "macos")]
    {
        if name.ends_with(".dylib") {
            vec![name.to_string()]
        } else {
            vec![
                format!("lib{}.dylib", name),
                format!("lib{}.{}.dylib", name, FANN_SONAME_VERSION),
            ]
        }
    }

    #[cfg(target_os = "windows")]
    {
        let _ = FANN_SONAME_VERSION;
        if name.ends_with(".dll") {
            vec![name.to_string()]
        } else {
            vec![format!("{}.dll", name)]
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        let _ = FANN_SONAME_VERSION;
        vec![name.to_string()]
    }
}
