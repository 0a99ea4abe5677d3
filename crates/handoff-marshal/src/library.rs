//! Native library handle
//!
//! The marshaller never calls a native symbol by name. It goes through a
//! [`Symbols`] table held by a [`NativeLibrary`], which is created once,
//! either by loading a cdylib through `libloading` or from the statically
//! linked entry points.

use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};

use libloading::Library;

use crate::config::LibraryConfig;
use crate::error::{MarshalError, Result};
use crate::records::{RawSite, RawSuggestion, RawUser};

/// Library file naming rule for one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    /// Value of `std::env::consts::OS`
    pub os: &'static str,
    pub prefix: &'static str,
    pub extension: &'static str,
}

impl Platform {
    /// File name for a library called `name`
    pub fn file_name(&self, name: &str) -> String {
        format!("{}{}.{}", self.prefix, name, self.extension)
    }
}

const PLATFORMS: &[Platform] = &[
    Platform {
        os: "linux",
        prefix: "lib",
        extension: "so",
    },
    Platform {
        os: "macos",
        prefix: "lib",
        extension: "dylib",
    },
    Platform {
        os: "windows",
        prefix: "",
        extension: "dll",
    },
];

/// Look up the naming rule for a platform identifier
pub fn platform(os: &str) -> Result<&'static Platform> {
    PLATFORMS
        .iter()
        .find(|p| p.os == os)
        .ok_or_else(|| MarshalError::UnsupportedPlatform(os.to_string()))
}

/// Naming rule for the platform this process runs on
pub fn current_platform() -> Result<&'static Platform> {
    platform(std::env::consts::OS)
}

/// Typed entry points, one field per exported function
///
/// Every field carries the exact argument and return kinds of the native
/// export it stands for.
#[derive(Clone, Copy)]
pub struct Symbols {
    pub version: unsafe extern "C" fn() -> *const c_char,
    pub last_error: unsafe extern "C" fn() -> *const c_char,
    pub factorial: unsafe extern "C" fn(c_int) -> c_int,
    pub greet: unsafe extern "C" fn(*const c_char) -> *mut c_char,
    pub string_free: unsafe extern "C" fn(*mut c_char),
    pub fib_sequence: unsafe extern "C" fn(c_int) -> *mut c_int,
    pub free_int_array: unsafe extern "C" fn(*mut c_int, c_int),
    pub multiply_string: unsafe extern "C" fn(*const c_char, c_int) -> *mut *mut c_char,
    pub free_string_array: unsafe extern "C" fn(*mut *mut c_char, c_int),
    pub create_user: unsafe extern "C" fn(*const c_char, c_int, *const c_char) -> *mut RawUser,
    pub create_random_user: unsafe extern "C" fn() -> *mut RawUser,
    pub create_random_users: unsafe extern "C" fn(c_int) -> *mut RawUser,
    pub free_user: unsafe extern "C" fn(*mut RawUser),
    pub free_users: unsafe extern "C" fn(*mut RawUser, c_int),
    pub spellcheck: unsafe extern "C" fn(*const c_char) -> *mut RawSuggestion,
    pub spellcheck_levenshtein: unsafe extern "C" fn(*const c_char) -> *mut RawSuggestion,
    pub spellcheck_words: unsafe extern "C" fn(*const *const c_char, c_int) -> *mut RawSuggestion,
    pub free_suggestion: unsafe extern "C" fn(*mut RawSuggestion),
    pub free_suggestions: unsafe extern "C" fn(*mut RawSuggestion, c_int),
    pub scrape_site: unsafe extern "C" fn(*const c_char) -> *mut RawSite,
    pub scrape_sites: unsafe extern "C" fn(*const *const c_char, c_int) -> *mut RawSite,
    pub free_site: unsafe extern "C" fn(*mut RawSite),
    pub free_sites: unsafe extern "C" fn(*mut RawSite, c_int),
}

macro_rules! load_symbols {
    ($library:expr, $path:expr, { $($field:ident => $symbol:literal),* $(,)? }) => {
        Symbols {
            $( $field: symbol($library, $path, $symbol)?, )*
        }
    };
}

/// Look up one exported function by name
///
/// # Safety
/// `T` must match the export's real signature.
unsafe fn symbol<T: Copy>(library: &Library, path: &Path, name: &'static str) -> Result<T> {
    let mut bytes = name.as_bytes().to_vec();
    bytes.push(0);

    library
        .get::<T>(&bytes)
        .map(|found| *found)
        .map_err(|_| MarshalError::SymbolNotFound {
            path: path.to_path_buf(),
            symbol: name,
        })
}

impl Symbols {
    /// Resolve every entry point from a loaded library
    ///
    /// # Safety
    /// The library must export these symbols with the declared signatures.
    unsafe fn resolve(library: &Library, path: &Path) -> Result<Self> {
        Ok(load_symbols!(library, path, {
            version => "handoff_version",
            last_error => "handoff_last_error",
            factorial => "handoff_factorial",
            greet => "handoff_greet",
            string_free => "handoff_string_free",
            fib_sequence => "handoff_fib_sequence",
            free_int_array => "handoff_free_int_array",
            multiply_string => "handoff_multiply_string",
            free_string_array => "handoff_free_string_array",
            create_user => "handoff_create_user",
            create_random_user => "handoff_create_random_user",
            create_random_users => "handoff_create_random_users",
            free_user => "handoff_free_user",
            free_users => "handoff_free_users",
            spellcheck => "handoff_spellcheck",
            spellcheck_levenshtein => "handoff_spellcheck_levenshtein",
            spellcheck_words => "handoff_spellcheck_words",
            free_suggestion => "handoff_free_suggestion",
            free_suggestions => "handoff_free_suggestions",
            scrape_site => "handoff_scrape_site",
            scrape_sites => "handoff_scrape_sites",
            free_site => "handoff_free_site",
            free_sites => "handoff_free_sites",
        }))
    }
}

/// Where a handle's entry points came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Loaded from a cdylib at this path
    Loaded(PathBuf),
    /// Statically linked into this binary
    Linked,
    /// Supplied directly by the caller
    Custom,
}

/// An explicit handle on the native entry points
///
/// Holds the loaded library, if any, for as long as the symbols are
/// reachable.
pub struct NativeLibrary {
    symbols: Symbols,
    origin: Origin,
    _library: Option<Library>,
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary").field("origin", &self.origin).finish()
    }
}

impl NativeLibrary {
    /// Wrap an existing symbol table
    pub fn from_symbols(symbols: Symbols) -> Self {
        Self {
            symbols,
            origin: Origin::Custom,
            _library: None,
        }
    }

    /// Use the entry points linked into this binary
    #[cfg(feature = "linked")]
    pub fn linked() -> Self {
        Self {
            symbols: crate::linked::symbols(),
            origin: Origin::Linked,
            _library: None,
        }
    }

    /// Load the cdylib named in `config`
    ///
    /// An explicit `path` wins. Otherwise the platform file name for
    /// `name` is searched for in `search_paths`, then the working
    /// directory.
    pub fn load(config: &LibraryConfig) -> Result<Self> {
        let path = match &config.path {
            Some(path) => path.clone(),
            None => resolve(&config.name, &config.search_paths)?,
        };
        Self::load_path(&path)
    }

    /// Load a cdylib from an exact path
    pub fn load_path(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "loading native library");

        let library = unsafe { Library::new(path) }.map_err(|e| MarshalError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let symbols = unsafe { Symbols::resolve(&library, path)? };

        Ok(Self {
            symbols,
            origin: Origin::Loaded(path.to_path_buf()),
            _library: Some(library),
        })
    }

    /// Open the handle `config` describes
    ///
    /// Without an explicit path or search paths, the linked entry points
    /// are used when available.
    pub fn open(config: &LibraryConfig) -> Result<Self> {
        #[cfg(feature = "linked")]
        if config.path.is_none() && config.search_paths.is_empty() {
            return Ok(Self::linked());
        }

        Self::load(config)
    }

    /// The typed entry points
    pub fn symbols(&self) -> &Symbols {
        &self.symbols
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}

/// Find the platform file for `name` in `search_paths`, then the working
/// directory
pub fn resolve(name: &str, search_paths: &[PathBuf]) -> Result<PathBuf> {
    let file_name = current_platform()?.file_name(name);

    let mut searched: Vec<PathBuf> = search_paths.to_vec();
    if let Ok(cwd) = std::env::current_dir() {
        searched.push(cwd);
    }

    searched
        .iter()
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
        .ok_or(MarshalError::LibraryNotFound {
            name: file_name,
            searched,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_table() {
        assert_eq!(platform("linux").unwrap().file_name("handoff_native"), "libhandoff_native.so");
        assert_eq!(platform("macos").unwrap().file_name("handoff_native"), "libhandoff_native.dylib");
        assert_eq!(platform("windows").unwrap().file_name("handoff_native"), "handoff_native.dll");
        assert_eq!(
            platform("plan9"),
            Err(MarshalError::UnsupportedPlatform("plan9".to_string()))
        );
    }

    #[cfg(feature = "linked")]
    #[test]
    fn test_open_defaults_to_linked() {
        let library = NativeLibrary::open(&LibraryConfig::default()).unwrap();
        assert_eq!(library.origin(), &Origin::Linked);
    }
}
