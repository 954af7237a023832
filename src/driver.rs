use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::path::Path;

use log::debug;

use crate::options::OpenOptions;

/// One way of opening a dataset, e.g. a single driver or a family of drivers
/// behind one library call.
///
/// A probe either returns an opened dataset or declines. Why it declined is
/// its own business: the caller of [`DriverRegistry::first_success`] only ever
/// learns that nothing could open the path.
pub trait DriverProbe {
    type Dataset;

    /// Short name, used for logging and matched against
    /// [`OpenOptions::allowed_drivers`].
    fn name(&self) -> &str;

    /// Whether this probe takes part in an open with `options`.
    ///
    /// By default a probe is skipped when `options` restricts the allowed
    /// drivers and its [`name`](Self::name) is not among them. Probes that hand
    /// the list on to the underlying library override this.
    fn accepts(&self, options: &OpenOptions) -> bool {
        options.allows_driver(self.name())
    }

    fn try_open(&self, path: &Path, options: &OpenOptions) -> Option<Self::Dataset>;
}

/// A [`DriverProbe`] backed by a closure. See [`probe_fn`].
pub struct FnProbe<F, D> {
    name: String,
    open: F,
    _dataset: PhantomData<fn() -> D>,
}

/// Wraps a closure into a [`DriverProbe`] named `name`.
///
/// ```
/// use geoaccess::{probe_fn, DriverRegistry, OpenOptions};
///
/// let registry = DriverRegistry::new()
///     .with_probe(probe_fn("Memory", |path, _| (path.to_str() == Some("mem://a")).then_some(1)));
/// assert_eq!(registry.probe_names(), vec!["Memory"]);
/// ```
pub fn probe_fn<D, F>(name: &str, open: F) -> FnProbe<F, D>
where
    F: Fn(&Path, &OpenOptions) -> Option<D>,
{
    FnProbe {
        name: name.to_string(),
        open,
        _dataset: PhantomData,
    }
}

impl<D, F> DriverProbe for FnProbe<F, D>
where
    F: Fn(&Path, &OpenOptions) -> Option<D>,
{
    type Dataset = D;

    fn name(&self) -> &str {
        &self.name
    }

    fn try_open(&self, path: &Path, options: &OpenOptions) -> Option<D> {
        (self.open)(path, options)
    }
}

/// An ordered list of [`DriverProbe`]s producing datasets of type `D`.
///
/// Probes are tried in insertion order and the first one to open the path wins.
pub struct DriverRegistry<D> {
    probes: Vec<Box<dyn DriverProbe<Dataset = D> + Send + Sync>>,
}

impl<D> DriverRegistry<D> {
    pub fn new() -> Self {
        DriverRegistry { probes: Vec::new() }
    }

    /// Appends `probe`, builder style.
    pub fn with_probe<P>(mut self, probe: P) -> Self
    where
        P: DriverProbe<Dataset = D> + Send + Sync + 'static,
    {
        self.push(probe);
        self
    }

    /// Appends `probe` after the already registered ones.
    pub fn push<P>(&mut self, probe: P)
    where
        P: DriverProbe<Dataset = D> + Send + Sync + 'static,
    {
        self.probes.push(Box::new(probe));
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Names of the registered probes, in probing order.
    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    /// Tries every probe allowed by `options` in order and returns the name of
    /// the first one that opened `path`, together with its dataset.
    pub fn first_success(&self, path: &Path, options: &OpenOptions) -> Option<(&str, D)> {
        for probe in &self.probes {
            let name = probe.name();
            if !probe.accepts(options) {
                debug!("skipping driver {name}: not in allowed drivers");
                continue;
            }
            match probe.try_open(path, options) {
                Some(dataset) => {
                    debug!("driver {name} opened {}", path.display());
                    return Some((name, dataset));
                }
                None => debug!("driver {name} declined {}", path.display()),
            }
        }
        None
    }
}

impl<D> Default for DriverRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Debug for DriverRegistry<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("probes", &self.probe_names())
            .finish()
    }
}
