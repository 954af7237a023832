use std::path::Path;

use log::debug;

use crate::driver::DriverRegistry;
use crate::errors::{GdalError, Result};
use crate::options::{AccessMode, OpenOptions};

/// Open a dataset with a `"r"` (read-only) or `"r+"` (update) mode token.
///
/// The registry's probes are tried in order and the first dataset opened is
/// returned. Invalid arguments are rejected before any probe is consulted:
///
/// * an empty `path` or a `mode` other than `"r"` / `"r+"` fails with
///   [`GdalError::BadArgument`];
/// * if no probe opens the path, the result is a single
///   [`GdalError::OpenFailed`], whatever the individual probes reported.
///
/// ```
/// use geoaccess::{open, probe_fn, DriverRegistry, GdalError};
///
/// let registry = DriverRegistry::new()
///     .with_probe(probe_fn("Echo", |path, _| Some(path.to_path_buf())));
///
/// assert!(open(&registry, "roads.geojson", "r").is_ok());
/// assert!(matches!(
///     open(&registry, "roads.geojson", "w"),
///     Err(GdalError::BadArgument(_))
/// ));
/// ```
pub fn open<D>(registry: &DriverRegistry<D>, path: &str, mode: &str) -> Result<D> {
    check_path(path)?;
    let access: AccessMode = mode.parse()?;
    open_ex(registry, path, &OpenOptions::new(access))
}

/// [`open`] with the default `"r"` mode.
pub fn open_read_only<D>(registry: &DriverRegistry<D>, path: &str) -> Result<D> {
    open(registry, path, AccessMode::ReadOnly.as_str())
}

/// Open a dataset with explicit [`OpenOptions`].
///
/// Same protocol as [`open`]: first success wins, otherwise one
/// [`GdalError::OpenFailed`].
pub fn open_ex<D>(
    registry: &DriverRegistry<D>,
    path: &str,
    options: &OpenOptions,
) -> Result<D> {
    check_path(path)?;
    debug!(
        "opening {path} (mode {}, flags {:?}) with {} probe(s)",
        options.access,
        options.open_flags(),
        registry.len()
    );

    match registry.first_success(Path::new(path), options) {
        Some((_, dataset)) => Ok(dataset),
        None => Err(GdalError::OpenFailed {
            path: path.to_string(),
            access: options.access,
        }),
    }
}

fn check_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(GdalError::BadArgument("path must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::GdalOpenFlags;
    use crate::probe_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn recording_registry(
        calls: Arc<AtomicUsize>,
        opens: bool,
    ) -> DriverRegistry<GdalOpenFlags> {
        DriverRegistry::new().with_probe(probe_fn("Recorder", move |_, options| {
            calls.fetch_add(1, Ordering::SeqCst);
            opens.then(|| options.open_flags())
        }))
    }

    #[test]
    fn test_invalid_mode_never_probes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = recording_registry(calls.clone(), true);
        for mode in ["x", "", "w", "rw", "R+"] {
            assert!(matches!(
                open(&registry, "some/path.tif", mode),
                Err(GdalError::BadArgument(_))
            ));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_path_never_probes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = recording_registry(calls.clone(), true);
        assert!(matches!(
            open(&registry, "", "r"),
            Err(GdalError::BadArgument(_))
        ));
        assert!(matches!(
            open_ex(&registry, "", &OpenOptions::default()),
            Err(GdalError::BadArgument(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_mode_maps_to_access_flags() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = recording_registry(calls, true);
        assert_eq!(
            open(&registry, "a.tif", "r").unwrap(),
            GdalOpenFlags::GDAL_OF_READONLY
        );
        assert_eq!(
            open_read_only(&registry, "a.tif").unwrap(),
            GdalOpenFlags::GDAL_OF_READONLY
        );
        assert_eq!(
            open(&registry, "a.tif", "r+").unwrap(),
            GdalOpenFlags::GDAL_OF_UPDATE
        );
    }

    #[test]
    fn test_single_open_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = recording_registry(calls.clone(), false)
            .with_probe(probe_fn("Never", |_, _| None));
        let err = open(&registry, "missing.shp", "r+").unwrap_err();
        assert_eq!(
            err,
            GdalError::OpenFailed {
                path: "missing.shp".to_string(),
                access: AccessMode::Update,
            }
        );
        assert_eq!(err.to_string(), "Error opening dataset 'missing.shp' (r+)");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
