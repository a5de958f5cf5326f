/// Observer told about every key dropped to make room for a new one.
///
/// Any `Fn(&K) + Send + 'static` closure is a listener.
pub trait EvictionListener<K>: Send + 'static {
    fn on_evicted(&self, key: &K);
}

impl<K, F> EvictionListener<K> for F
where
    F: Fn(&K) + Send + 'static,
{
    fn on_evicted(&self, key: &K) {
        self(key)
    }
}

/// Append-only list of listeners, notified in registration order.
pub(crate) struct Listeners<K> {
    registered: Vec<Box<dyn EvictionListener<K>>>,
}

impl<K: 'static> Listeners<K> {
    pub(crate) fn new() -> Self {
        Listeners {
            registered: Vec::new(),
        }
    }

    pub(crate) fn register(&mut self, listener: Box<dyn EvictionListener<K>>) {
        self.registered.push(listener);
    }

    pub(crate) fn len(&self) -> usize {
        self.registered.len()
    }

    /// Calls every listener with `key`. A panicking listener stops the
    /// remaining ones and unwinds to the caller.
    pub(crate) fn notify(&self, key: &K) {
        for listener in &self.registered {
            listener.on_evicted(key);
        }
    }
}
