//! Driver probes backed by the GDAL library.
//!
//! ```no_run
//! # fn main() -> geoaccess::errors::Result<()> {
//! use geoaccess::gdal::default_registry;
//!
//! let registry = default_registry();
//! let dataset = geoaccess::open(&registry, "fixtures/roads.geojson", "r")?;
//! println!("opened with {}", dataset.driver_short_name());
//! # Ok(())
//! # }
//! ```

use std::ffi::{c_char, c_int, CStr, CString, NulError};
use std::path::Path;
use std::ptr;
use std::sync::Once;

use gdal_sys::{GDALAccess, GDALDatasetH};
use log::debug;

use crate::driver::{DriverProbe, DriverRegistry};
use crate::errors::{GdalError, Result};
use crate::options::{AccessMode, OpenOptions};

static START: Once = Once::new();

pub(crate) fn _register_drivers() {
    START.call_once(|| unsafe {
        gdal_sys::GDALAllRegister();
    });
}

fn _string(raw_ptr: *const c_char) -> Option<String> {
    if raw_ptr.is_null() {
        return None;
    }
    let c_str = unsafe { CStr::from_ptr(raw_ptr) };
    Some(c_str.to_string_lossy().into_owned())
}

fn _last_error_msg() -> String {
    let msg = _string(unsafe { gdal_sys::CPLGetLastErrorMsg() }).unwrap_or_default();
    unsafe { gdal_sys::CPLErrorReset() };
    msg
}

pub(crate) fn _last_null_pointer_err(method_name: &'static str) -> GdalError {
    GdalError::NullPointer {
        method_name,
        msg: _last_error_msg(),
    }
}

fn _path_to_c_string(path: &Path) -> Result<CString> {
    let path_str = path.to_string_lossy();
    CString::new(path_str.as_ref()).map_err(Into::into)
}

/// Mirrors an option set through [`crate::config`] into GDAL's own table so
/// that drivers see it.
pub(crate) fn forward_config_option(
    name: &str,
    value: Option<&str>,
    thread_local: bool,
) -> Result<()> {
    let c_key = CString::new(name.as_bytes())?;
    let c_val = value.map(|v| CString::new(v.as_bytes())).transpose()?;
    let c_val_ptr = c_val.as_ref().map_or(ptr::null(), |v| v.as_ptr());
    unsafe {
        if thread_local {
            gdal_sys::CPLSetThreadLocalConfigOption(c_key.as_ptr(), c_val_ptr);
        } else {
            gdal_sys::CPLSetConfigOption(c_key.as_ptr(), c_val_ptr);
        }
    }
    Ok(())
}

/// A null-terminated `char **` built from Rust strings. The `CString`s are
/// kept alive for as long as the pointer array.
struct CStringArray {
    _strings: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl CStringArray {
    fn new(values: &[&str]) -> std::result::Result<Self, NulError> {
        let strings = values
            .iter()
            .map(|&s| CString::new(s))
            .collect::<std::result::Result<Vec<CString>, NulError>>()?;
        let mut ptrs: Vec<*const c_char> = strings.iter().map(|s| s.as_ptr()).collect();
        ptrs.push(ptr::null());
        Ok(CStringArray {
            _strings: strings,
            ptrs,
        })
    }

    fn as_ptr(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }
}

fn optional_array(values: Option<&[&str]>) -> Result<Option<CStringArray>> {
    Ok(values.map(CStringArray::new).transpose()?)
}

/// An open GDAL dataset. Closed on drop.
#[derive(Debug)]
pub struct GdalDataset {
    c_dataset: GDALDatasetH,
}

// GDAL Docs state: The returned dataset should only be accessed by one thread at a time.
// See: https://gdal.org/api/raster_c_api.html#_CPPv48GDALOpenPKc10GDALAccess
unsafe impl Send for GdalDataset {}

impl GdalDataset {
    /// Creates a new dataset by wrapping a C pointer
    ///
    /// # Safety
    /// `c_dataset` must be a valid, non-null handle that nothing else closes.
    pub unsafe fn from_c_dataset(c_dataset: GDALDatasetH) -> GdalDataset {
        GdalDataset { c_dataset }
    }

    /// Returns the wrapped C pointer
    ///
    /// # Safety
    /// This method returns a raw C pointer
    pub unsafe fn c_dataset(&self) -> GDALDatasetH {
        self.c_dataset
    }

    /// The dataset description, usually the path it was opened from.
    pub fn description(&self) -> String {
        _string(unsafe { gdal_sys::GDALGetDescription(self.c_dataset) }).unwrap_or_default()
    }

    pub fn driver_short_name(&self) -> String {
        let c_driver = unsafe { gdal_sys::GDALGetDatasetDriver(self.c_dataset) };
        if c_driver.is_null() {
            return String::new();
        }
        _string(unsafe { gdal_sys::GDALGetDriverShortName(c_driver) }).unwrap_or_default()
    }
}

impl Drop for GdalDataset {
    fn drop(&mut self) {
        unsafe {
            gdal_sys::GDALClose(self.c_dataset);
        }
    }
}

fn wrap_handle(c_dataset: GDALDatasetH, method_name: &'static str) -> Option<GdalDataset> {
    if c_dataset.is_null() {
        debug!("{}", _last_null_pointer_err(method_name));
        return None;
    }
    Some(unsafe { GdalDataset::from_c_dataset(c_dataset) })
}

fn c_path(path: &Path) -> Option<CString> {
    match _path_to_c_string(path) {
        Ok(c_path) => Some(c_path),
        Err(e) => {
            debug!("cannot pass {} to GDAL: {e}", path.display());
            None
        }
    }
}

/// Opens through `GDALOpenEx`, which covers raster and vector drivers in one
/// call. Allowed drivers and open options are handed to GDAL.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenExProbe;

impl DriverProbe for OpenExProbe {
    type Dataset = GdalDataset;

    fn name(&self) -> &str {
        "GDALOpenEx"
    }

    fn accepts(&self, _options: &OpenOptions) -> bool {
        true
    }

    fn try_open(&self, path: &Path, options: &OpenOptions) -> Option<GdalDataset> {
        _register_drivers();
        let c_filename = c_path(path)?;
        let (c_drivers, c_open_options) = match (
            optional_array(options.allowed_drivers),
            optional_array(options.open_options),
        ) {
            (Ok(drivers), Ok(open_options)) => (drivers, open_options),
            (Err(e), _) | (_, Err(e)) => {
                debug!("invalid GDALOpenEx arguments: {e}");
                return None;
            }
        };

        let c_dataset = unsafe {
            gdal_sys::GDALOpenEx(
                c_filename.as_ptr(),
                options.open_flags().bits(),
                c_drivers.as_ref().map_or(ptr::null(), |d| d.as_ptr()),
                c_open_options.as_ref().map_or(ptr::null(), |o| o.as_ptr()),
                ptr::null(),
            )
        };
        wrap_handle(c_dataset, "GDALOpenEx")
    }
}

/// Opens through the OGR driver registrar only (`OGROpen`).
#[derive(Clone, Copy, Debug, Default)]
pub struct LegacyVectorProbe;

impl DriverProbe for LegacyVectorProbe {
    type Dataset = GdalDataset;

    fn name(&self) -> &str {
        "OGR"
    }

    fn try_open(&self, path: &Path, options: &OpenOptions) -> Option<GdalDataset> {
        _register_drivers();
        let c_filename = c_path(path)?;
        let update = (options.access == AccessMode::Update) as c_int;
        // An OGR data source is a GDAL dataset since GDAL 2.0.
        let c_dataset =
            unsafe { gdal_sys::OGROpen(c_filename.as_ptr(), update, ptr::null_mut()) };
        wrap_handle(c_dataset as GDALDatasetH, "OGROpen")
    }
}

/// Opens through the raster-only `GDALOpen`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LegacyRasterProbe;

impl DriverProbe for LegacyRasterProbe {
    type Dataset = GdalDataset;

    fn name(&self) -> &str {
        "GDAL"
    }

    fn try_open(&self, path: &Path, options: &OpenOptions) -> Option<GdalDataset> {
        _register_drivers();
        let c_filename = c_path(path)?;
        let access = match options.access {
            AccessMode::ReadOnly => GDALAccess::GA_ReadOnly,
            AccessMode::Update => GDALAccess::GA_Update,
        };
        let c_dataset = unsafe { gdal_sys::GDALOpen(c_filename.as_ptr(), access) };
        wrap_handle(c_dataset, "GDALOpen")
    }
}

/// The unified `GDALOpenEx` strategy.
pub fn default_registry() -> DriverRegistry<GdalDataset> {
    DriverRegistry::new().with_probe(OpenExProbe)
}

/// Vector drivers first, then raster drivers, each through its own call.
pub fn legacy_registry() -> DriverRegistry<GdalDataset> {
    DriverRegistry::new()
        .with_probe(LegacyVectorProbe)
        .with_probe(LegacyRasterProbe)
}
