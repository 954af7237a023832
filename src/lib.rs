//! Dataset access building blocks on top of [GDAL](http://gdal.org/).
//!
//! * [`open`]: resolves a path and a `"r"`/`"r+"` mode token to a dataset by
//!   trying an ordered [`DriverRegistry`] of [`DriverProbe`]s;
//! * [`GeoTransform`]: applies and inverts affine pixel/line ↔ georeferenced transforms;
//! * [`config`]: process-wide, thread-local and standalone configuration options;
//! * [`dms`]: formats decimal degrees as degrees, minutes and seconds.
//!
//! The GDAL-backed probes live in the [`gdal`] module behind the `gdal` feature.
//!
//! ## Use
//!
//! ```
//! use geoaccess::{dms, open, probe_fn, DriverRegistry, GeoTransform, GeoTransformEx};
//!
//! let registry = DriverRegistry::new()
//!     .with_probe(probe_fn("Mem", |path, _| (path.to_str() == Some("mem.tif")).then_some(42)));
//! assert_eq!(open(&registry, "mem.tif", "r").unwrap(), 42);
//! assert!(open(&registry, "other.tif", "r").is_err());
//!
//! let gt: GeoTransform = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
//! assert_eq!(gt.apply(3.0, 4.0), (3.0, 4.0));
//!
//! assert_eq!(dms::dec_to_dms_str(-45.5, "long", 0).unwrap(), " 45d30'  0\"W");
//! ```

#![crate_name = "geoaccess"]
#![crate_type = "lib"]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
mod dataset;
pub mod dms;
mod driver;
pub mod errors;
#[cfg(feature = "gdal")]
#[cfg_attr(docsrs, doc(cfg(feature = "gdal")))]
pub mod gdal;
mod geo_transform;
mod options;

pub use dataset::{open, open_ex, open_read_only};
pub use driver::{probe_fn, DriverProbe, DriverRegistry, FnProbe};
pub use errors::GdalError;
pub use geo_transform::{
    apply_geo_transform, inv_geo_transform, GeoTransform, GeoTransformEx, InvertedGeoTransform,
    DEGENERATE_DET_EPSILON,
};
pub use options::{AccessMode, GdalOpenFlags, OpenOptions};

#[cfg(test)]
mod test_utils;
