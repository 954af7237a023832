use std::fs::File;
use std::io::Write;
use std::sync::{Arc, Mutex};

use geoaccess::{
    open, open_ex, open_read_only, probe_fn, AccessMode, DriverRegistry, GdalError,
    GdalOpenFlags, OpenOptions,
};

/// A registry whose only driver opens plain files, in write mode for `"r+"`.
fn file_registry(requests: Arc<Mutex<Vec<GdalOpenFlags>>>) -> DriverRegistry<File> {
    DriverRegistry::new()
        .with_probe(probe_fn("Vector", |_, _| None))
        .with_probe(probe_fn("File", move |path, options| {
            requests.lock().unwrap().push(options.open_flags());
            std::fs::OpenOptions::new()
                .read(true)
                .write(options.access == AccessMode::Update)
                .open(path)
                .ok()
        }))
}

#[test]
fn test_open_existing_file() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "P2 1 1 255 0").unwrap();
    let path = tmp.path().to_str().unwrap().to_string();

    let requests = Arc::new(Mutex::new(Vec::new()));
    let registry = file_registry(requests.clone());

    let mut file = open(&registry, &path, "r+").unwrap();
    writeln!(file, "appended").unwrap();
    assert!(open_read_only(&registry, &path).is_ok());

    assert_eq!(
        *requests.lock().unwrap(),
        vec![
            GdalOpenFlags::GDAL_OF_UPDATE,
            GdalOpenFlags::GDAL_OF_READONLY
        ]
    );
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.tif");
    let path = path.to_str().unwrap();

    let requests = Arc::new(Mutex::new(Vec::new()));
    let registry = file_registry(requests.clone());

    assert_eq!(
        open(&registry, path, "r").unwrap_err(),
        GdalError::OpenFailed {
            path: path.to_string(),
            access: AccessMode::ReadOnly,
        }
    );
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[test]
fn test_invalid_mode() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let registry = file_registry(requests.clone());
    let err = open(&registry, "anything.tif", "x").unwrap_err();
    assert!(matches!(err, GdalError::BadArgument(_)));
    assert!(requests.lock().unwrap().is_empty());
}

#[test]
fn test_open_ex_kinds_and_allowed_drivers() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let path = tmp.path().to_str().unwrap();

    let requests = Arc::new(Mutex::new(Vec::new()));
    let registry = file_registry(requests.clone());

    let drivers = ["file"];
    let options = OpenOptions {
        access: AccessMode::ReadOnly,
        kinds: GdalOpenFlags::GDAL_OF_RASTER,
        allowed_drivers: Some(&drivers),
        open_options: None,
    };
    assert!(open_ex(&registry, path, &options).is_ok());
    assert_eq!(
        *requests.lock().unwrap(),
        vec![GdalOpenFlags::GDAL_OF_RASTER]
    );

    let drivers = ["Vector"];
    let options = OpenOptions {
        allowed_drivers: Some(&drivers),
        ..Default::default()
    };
    assert!(matches!(
        open_ex(&registry, path, &options),
        Err(GdalError::OpenFailed { .. })
    ));
}
