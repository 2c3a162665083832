use {
    crate::{
        DeviceDescriptor, DeviceEnumerator, DeviceError, DeviceSnapshot,
        create_suitable_enumerator, reconcile,
    },
    base::{CancelToken, ExecutionContext},
    std::{
        sync::{
            Arc, Mutex, MutexGuard, RwLock,
            atomic::{AtomicBool, Ordering},
        },
        thread::{self, JoinHandle},
        time::Duration,
    },
};

/// Registry polling configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    poll_interval: Duration,
    placeholder_name: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            placeholder_name: crate::NO_DEVICE.to_string(),
        }
    }
}

impl RegistryConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Display name of the "no device" entry.
    pub fn with_placeholder_name(mut self, name: impl Into<String>) -> Self {
        self.placeholder_name = name.into();
        self
    }

    // Getters
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn placeholder_name(&self) -> &str {
        &self.placeholder_name
    }
}

type NameListener = Arc<dyn Fn(&str) + Send + Sync>;
type CurrentListener = Arc<dyn Fn(&DeviceDescriptor) + Send + Sync>;

enum Selection {
    Keep,
    Named(String),
}

struct Shared {
    context: Arc<dyn ExecutionContext>,
    placeholder: DeviceDescriptor,
    enumerator: Mutex<Box<dyn DeviceEnumerator>>,
    snapshot: RwLock<Arc<DeviceSnapshot>>,
    current: Mutex<DeviceDescriptor>,
    added: Mutex<Vec<NameListener>>,
    removed: Mutex<Vec<NameListener>>,
    current_changed: Mutex<Vec<CurrentListener>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Shared {
    fn snapshot(&self) -> Arc<DeviceSnapshot> {
        let snapshot = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*snapshot)
    }

    /// Enumerate, and if the device set changed, swap the snapshot and post
    /// notifications. Polls are serialized by the enumerator lock.
    fn poll(self: &Arc<Self>) -> Result<bool, DeviceError> {
        let mut enumerator = lock(&self.enumerator);
        let next = Arc::new(DeviceSnapshot::new(
            self.placeholder.clone(),
            enumerator.enumerate()?,
        ));

        let previous = {
            let mut slot = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
            if **slot == *next {
                return Ok(false);
            }
            std::mem::replace(&mut *slot, Arc::clone(&next))
        };

        self.post_reconcile(Selection::Keep);

        let (added, removed) = next.diff_names(&previous);
        for name in &added {
            log::info!("device attached: {name}");
        }
        for name in &removed {
            log::info!("device detached: {name}");
        }
        if !added.is_empty() || !removed.is_empty() {
            let shared = Arc::clone(self);
            self.context.post(Box::new(move || {
                let listeners = lock(&shared.added).clone();
                for name in &added {
                    listeners.iter().for_each(|listener| listener(name));
                }
                let listeners = lock(&shared.removed).clone();
                for name in &removed {
                    listeners.iter().for_each(|listener| listener(name));
                }
            }));
        }
        Ok(true)
    }

    fn post_reconcile(self: &Arc<Self>, selection: Selection) {
        let shared = Arc::clone(self);
        self.context
            .post(Box::new(move || shared.apply_selection(selection)));
    }

    /// Runs on the execution context.
    fn apply_selection(&self, selection: Selection) {
        let snapshot = self.snapshot();
        let next = {
            let mut current = lock(&self.current);
            let next = match &selection {
                Selection::Keep => reconcile(Some(&*current), &snapshot),
                Selection::Named(name) => reconcile(snapshot.find_by_name(name), &snapshot),
            };
            if next == *current {
                return;
            }
            *current = next.clone();
            next
        };

        log::debug!("current device is now {} ({})", next.name, next.identifier);
        let listeners = lock(&self.current_changed).clone();
        for listener in &listeners {
            listener(&next);
        }
    }
}

/// Live, deduplicated view of attached capture devices.
///
/// A background thread named `device-poll` enumerates devices once per poll
/// interval. Notifications never run on that thread: they are posted to the
/// execution context given at construction, added names before removed names
/// for any one poll.
pub struct DeviceRegistry {
    shared: Arc<Shared>,
    cancel: CancelToken,
    poller: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("devices", &self.device_names())
            .field("current", &self.current())
            .field("disposed", &self.disposed.load(Ordering::SeqCst))
            .finish()
    }
}

impl DeviceRegistry {
    /// Start a registry with the platform's enumeration strategy.
    pub fn new(
        context: Arc<dyn ExecutionContext>,
        config: RegistryConfig,
    ) -> Result<Self, DeviceError> {
        Self::with_enumerator(context, create_suitable_enumerator()?, config)
    }

    /// Start a registry on a caller-supplied enumerator.
    pub fn with_enumerator(
        context: Arc<dyn ExecutionContext>,
        enumerator: Box<dyn DeviceEnumerator>,
        config: RegistryConfig,
    ) -> Result<Self, DeviceError> {
        let placeholder = DeviceDescriptor::new(config.placeholder_name(), "");
        let shared = Arc::new(Shared {
            context,
            snapshot: RwLock::new(Arc::new(DeviceSnapshot::new(
                placeholder.clone(),
                Vec::new(),
            ))),
            current: Mutex::new(placeholder.clone()),
            placeholder,
            enumerator: Mutex::new(enumerator),
            added: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
            current_changed: Mutex::new(Vec::new()),
        });

        let cancel = CancelToken::new();
        let poller = {
            let shared = Arc::clone(&shared);
            let cancel = cancel.clone();
            let interval = config.poll_interval();
            thread::Builder::new()
                .name("device-poll".to_string())
                .spawn(move || {
                    while !cancel.is_cancelled() {
                        if let Err(err) = shared.poll() {
                            log::warn!("device poll failed: {err}");
                        }
                        if cancel.sleep(interval) {
                            break;
                        }
                    }
                })?
        };

        Ok(Self {
            shared,
            cancel,
            poller: Mutex::new(Some(poller)),
            disposed: AtomicBool::new(false),
        })
    }

    /// The latest snapshot, placeholder first.
    pub fn devices(&self) -> Arc<DeviceSnapshot> {
        self.shared.snapshot()
    }

    pub fn device_names(&self) -> Vec<String> {
        self.shared
            .snapshot()
            .names()
            .map(str::to_string)
            .collect()
    }

    /// The selected device, or the placeholder.
    pub fn current(&self) -> DeviceDescriptor {
        lock(&self.shared.current).clone()
    }

    /// Ask for the device called `name`. Applied on the execution context;
    /// an unknown name selects the last device of the snapshot.
    pub fn select(&self, name: impl Into<String>) {
        self.shared.post_reconcile(Selection::Named(name.into()));
    }

    /// Poll immediately on the calling thread. Returns whether the device set
    /// changed.
    pub fn poll_now(&self) -> Result<bool, DeviceError> {
        self.shared.poll()
    }

    pub fn on_device_added(&self, listener: impl Fn(&str) + Send + Sync + 'static) {
        lock(&self.shared.added).push(Arc::new(listener));
    }

    pub fn on_device_removed(&self, listener: impl Fn(&str) + Send + Sync + 'static) {
        lock(&self.shared.removed).push(Arc::new(listener));
    }

    /// Called on the execution context whenever reconciliation picks a
    /// different device.
    pub fn on_current_changed(
        &self,
        listener: impl Fn(&DeviceDescriptor) + Send + Sync + 'static,
    ) {
        lock(&self.shared.current_changed).push(Arc::new(listener));
    }

    /// Stop polling and drop every subscriber. Idempotent.
    ///
    /// Cameras opened on a device from this registry keep running.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();
        let poller = lock(&self.poller).take();
        if let Some(handle) = poller {
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                log::error!("device poll thread panicked");
            }
        }
        lock(&self.shared.added).clear();
        lock(&self.shared.removed).clear();
        lock(&self.shared.current_changed).clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl Drop for DeviceRegistry {
    fn drop(&mut self) {
        self.dispose();
    }
}
