//! Configuration Options
//!
//! Drivers can be configured at runtime using environment variables or by
//! using functions in this module. Options set by calling functions in this
//! module override options set in environment variables.
//!
//! There are three scopes, looked up in this order by [`get_config_option`]:
//!
//! 1. options set with [`set_thread_local_config_option`], visible to the calling thread only;
//! 2. options set with [`set_config_option`], shared by the whole process;
//! 3. environment variables of the same name.
//!
//! ```
//! use geoaccess::config::*;
//!
//! // Increase the cache size to 1024Mb
//! set_config_option("GDAL_CACHEMAX", Some("1024")).unwrap();
//!
//! // Get the size of the cache
//! assert_eq!(get_config_option("GDAL_CACHEMAX").unwrap().as_deref(), Some("1024"));
//!
//! // Set the cache size back to default
//! set_config_option("GDAL_CACHEMAX", None).unwrap();
//!
//! // Check the option has been cleared
//! assert_eq!(get_config_option_or("GDAL_CACHEMAX", "XXX").unwrap(), "XXX");
//! ```
//!
//! Code that should not depend on process-wide state can own a [`ConfigOptions`]
//! instead.
//!
//! Refer to [GDAL `ConfigOptions`](https://gdal.org/user/configoptions.html) for
//! a full list of options.

use std::cell::RefCell;
use std::collections::btree_map::{self, BTreeMap};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::trace;
use once_cell::sync::Lazy;

use crate::errors::{GdalError, Result};

/// Section header of a configuration file that holds options.
const CONFIG_OPTIONS_SECTION: &str = "[configoptions]";

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(GdalError::BadArgument(
            "config option name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// A set of configuration options.
///
/// Setting an option to `None` removes it, so an option that was never set and
/// one that was cleared look the same to [`get`](Self::get).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigOptions {
    options: BTreeMap<String, String>,
}

impl ConfigOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts, overwrites (`Some`) or clears (`None`) the option `name`.
    pub fn set(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        check_name(name)?;
        match value {
            Some(value) => {
                self.options.insert(name.to_string(), value.to_string());
            }
            None => {
                self.options.remove(name);
            }
        }
        Ok(())
    }

    /// The value of `name`, or `None` if it was never set or has been cleared.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        check_name(name)?;
        Ok(self.options.get(name).cloned())
    }

    /// The value of `name`, or `default` if it is not set.
    pub fn get_or(&self, name: &str, default: &str) -> Result<String> {
        Ok(self.get(name)?.unwrap_or_else(|| default.to_string()))
    }

    pub fn clear(&mut self, name: &str) -> Result<()> {
        self.set(name, None)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Iterates over the set options, ordered by name.
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.options.iter())
    }

    /// Parses a configuration file.
    ///
    /// Only `KEY=VALUE` lines within the `[configoptions]` section are read;
    /// other sections, blank lines and lines starting with `#` are skipped.
    /// Surrounding whitespace is trimmed from keys and values.
    ///
    /// ```
    /// use geoaccess::config::ConfigOptions;
    ///
    /// let options = ConfigOptions::parse_config_file(
    ///     "[configoptions]\n# tune the block cache\nGDAL_CACHEMAX=512\n",
    /// ).unwrap();
    /// assert_eq!(options.get("GDAL_CACHEMAX").unwrap().as_deref(), Some("512"));
    /// ```
    pub fn parse_config_file(contents: &str) -> Result<Self> {
        let mut options = ConfigOptions::new();
        let mut in_options_section = false;
        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_options_section = line.eq_ignore_ascii_case(CONFIG_OPTIONS_SECTION);
                continue;
            }
            if !in_options_section {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(GdalError::BadArgument(format!(
                    "line {}: expected KEY=VALUE, got '{line}'",
                    line_no + 1
                )));
            };
            options.set(key.trim(), Some(value.trim()))?;
        }
        Ok(options)
    }

    /// Reads and parses a configuration file, see [`parse_config_file`](Self::parse_config_file).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| GdalError::ConfigFile {
            path: path.display().to_string(),
            msg: e.to_string(),
        })?;
        Self::parse_config_file(&contents).map_err(|e| GdalError::ConfigFile {
            path: path.display().to_string(),
            msg: e.to_string(),
        })
    }
}

/// Iterator over `(name, value)` pairs of a [`ConfigOptions`].
pub struct Iter<'a>(btree_map::Iter<'a, String, String>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a ConfigOptions {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Process-wide options. Writers are last-writer-wins.
static GLOBAL_CONFIG: Lazy<RwLock<ConfigOptions>> = Lazy::new(Default::default);

thread_local! {
    static THREAD_LOCAL_CONFIG: RefCell<ConfigOptions> = RefCell::new(ConfigOptions::new());
}

// Poisoning could only come from a panic while a `BTreeMap` insert/remove was
// in flight on another thread, which leaves the map itself intact.
fn global_read() -> RwLockReadGuard<'static, ConfigOptions> {
    match GLOBAL_CONFIG.read() {
        Ok(guard) => guard,
        Err(poison_error) => poison_error.into_inner(),
    }
}

fn global_write() -> RwLockWriteGuard<'static, ConfigOptions> {
    match GLOBAL_CONFIG.write() {
        Ok(guard) => guard,
        Err(poison_error) => poison_error.into_inner(),
    }
}

/// Set (`Some`) or clear (`None`) a process-wide configuration option.
///
/// Refer to [GDAL `ConfigOptions`](https://gdal.org/user/configoptions.html) for
/// a full list of options.
pub fn set_config_option(name: &str, value: Option<&str>) -> Result<()> {
    check_name(name)?;
    #[cfg(feature = "gdal")]
    crate::gdal::forward_config_option(name, value, false)?;
    trace!("config option {name} = {value:?}");
    global_write().set(name, value)
}

/// Get the value of a configuration option.
///
/// Thread-local options take precedence over process-wide ones, which take
/// precedence over the environment. Returns `None` if the option is set in
/// none of them.
pub fn get_config_option(name: &str) -> Result<Option<String>> {
    check_name(name)?;
    if let Some(value) = get_thread_local_config_option(name)? {
        return Ok(Some(value));
    }
    if let Some(value) = global_read().get(name)? {
        return Ok(Some(value));
    }
    Ok(std::env::var(name).ok())
}

/// Get the value of a configuration option.
///
/// If the config option specified by `name` is not found, the value passed in
/// the `default` parameter is returned.
pub fn get_config_option_or(name: &str, default: &str) -> Result<String> {
    Ok(get_config_option(name)?.unwrap_or_else(|| default.to_string()))
}

/// Clear the value of a process-wide configuration option.
pub fn clear_config_option(name: &str) -> Result<()> {
    set_config_option(name, None)
}

/// Merges `options` into the process-wide options, overwriting duplicates.
pub fn apply_config_options(options: &ConfigOptions) -> Result<()> {
    for (name, value) in options {
        set_config_option(name, Some(value))?;
    }
    Ok(())
}

/// Clears every process-wide option set through this module.
///
/// Environment variables and thread-local options are left alone.
pub fn reset_config_options() -> Result<()> {
    let names: Vec<String> = global_read().iter().map(|(k, _)| k.to_string()).collect();
    for name in names {
        clear_config_option(&name)?;
    }
    Ok(())
}

/// Runs `f` against a read-locked view of the process-wide options.
pub fn with_config_options<R>(f: impl FnOnce(&ConfigOptions) -> R) -> R {
    f(&global_read())
}

/// Set (`Some`) or clear (`None`) a configuration option
/// with **thread local** scope
pub fn set_thread_local_config_option(name: &str, value: Option<&str>) -> Result<()> {
    check_name(name)?;
    #[cfg(feature = "gdal")]
    crate::gdal::forward_config_option(name, value, true)?;
    THREAD_LOCAL_CONFIG.with(|config| config.borrow_mut().set(name, value))
}

/// Get the value of a configuration option
/// with **thread local** scope
///
/// Process-wide options and the environment are not consulted.
pub fn get_thread_local_config_option(name: &str) -> Result<Option<String>> {
    THREAD_LOCAL_CONFIG.with(|config| config.borrow().get(name))
}

/// Clear the value of a configuration option
/// with **thread local** scope
pub fn clear_thread_local_config_option(name: &str) -> Result<()> {
    set_thread_local_config_option(name, None)
}
