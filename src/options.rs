use std::ffi::c_uint;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use bitflags::bitflags;

use crate::errors::{GdalError, Result};

/// Whether an opened dataset permits only reads or also updates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AccessMode {
    #[default]
    ReadOnly,
    Update,
}

impl AccessMode {
    /// The mode token accepted by [`crate::open`]: `"r"` or `"r+"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "r",
            AccessMode::Update => "r+",
        }
    }
}

impl FromStr for AccessMode {
    type Err = GdalError;

    fn from_str(mode: &str) -> Result<Self> {
        match mode {
            "r" => Ok(AccessMode::ReadOnly),
            "r+" => Ok(AccessMode::Update),
            _ => Err(GdalError::BadArgument(format!(
                "Invalid open mode '{mode}'. Must be \"r\" or \"r+\""
            ))),
        }
    }
}

impl Display for AccessMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Values match gdal.h so they can be handed to `GDALOpenEx` unchanged.
bitflags! {
    /// Extended open flags, as used in the `nOpenFlags` argument to [`GDALOpenEx`].
    ///
    /// `GDAL_OF_SHARED` is deliberately absent: a shared handle may be handed out
    /// to several owners, which does not fit a dataset that is moved to the caller.
    ///
    /// [`GDALOpenEx`]: https://gdal.org/doxygen/gdal_8h.html#a9cb8585d0b3c16726b08e25bcc94274a
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct GdalOpenFlags: c_uint {
        /// Open in read-only mode (default).
        const GDAL_OF_READONLY = 0x00;
        /// Open in update mode.
        const GDAL_OF_UPDATE = 0x01;
        /// Allow raster and vector drivers to be used.
        const GDAL_OF_ALL = 0x00;
        /// Allow raster drivers to be used.
        const GDAL_OF_RASTER = 0x02;
        /// Allow vector drivers to be used.
        const GDAL_OF_VECTOR = 0x04;
        /// Allow gnm drivers to be used.
        const GDAL_OF_GNM = 0x08;
        /// Emit error message in case of failed open.
        const GDAL_OF_VERBOSE_ERROR = 0x40;
        /// Open as internal dataset.
        const GDAL_OF_INTERNAL = 0x80;
    }
}

impl Default for GdalOpenFlags {
    fn default() -> GdalOpenFlags {
        GdalOpenFlags::GDAL_OF_READONLY
    }
}

impl From<AccessMode> for GdalOpenFlags {
    fn from(access: AccessMode) -> GdalOpenFlags {
        match access {
            AccessMode::ReadOnly => GdalOpenFlags::GDAL_OF_READONLY,
            AccessMode::Update => GdalOpenFlags::GDAL_OF_UPDATE,
        }
    }
}

impl GdalOpenFlags {
    pub fn access_mode(&self) -> AccessMode {
        if self.contains(GdalOpenFlags::GDAL_OF_UPDATE) {
            AccessMode::Update
        } else {
            AccessMode::ReadOnly
        }
    }
}

/// Open options handed to every [`crate::DriverProbe`].
#[derive(Clone, Debug, Default)]
pub struct OpenOptions<'a> {
    pub access: AccessMode,
    /// Driver family bits (`GDAL_OF_RASTER`, `GDAL_OF_VECTOR`, ...). Any access
    /// bits set here are ignored in favour of `access`.
    pub kinds: GdalOpenFlags,
    /// Restricts probing to the named drivers.
    pub allowed_drivers: Option<&'a [&'a str]>,
    /// `KEY=VALUE` driver open options, passed through untouched.
    pub open_options: Option<&'a [&'a str]>,
}

impl<'a> OpenOptions<'a> {
    pub fn new(access: AccessMode) -> Self {
        OpenOptions {
            access,
            ..Default::default()
        }
    }

    /// The combined access and driver-family flags.
    pub fn open_flags(&self) -> GdalOpenFlags {
        (self.kinds - GdalOpenFlags::GDAL_OF_UPDATE) | GdalOpenFlags::from(self.access)
    }

    pub fn allows_driver(&self, name: &str) -> bool {
        match self.allowed_drivers {
            Some(drivers) => drivers.iter().any(|d| d.eq_ignore_ascii_case(name)),
            None => true,
        }
    }
}
