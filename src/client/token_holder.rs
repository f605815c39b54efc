use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

type Subscriber = Arc<dyn Fn(Option<&str>) + Send + Sync>;

#[derive(Default)]
struct HolderInner {
    slot: RwLock<Option<String>>,
    subscribers: RwLock<Vec<Subscriber>>,
}

/// In-memory slot for the current access token
///
/// Starts empty and is never restored from storage, so a reload always begins
/// without an access token and has to go through silent refresh. Clones share
/// the same slot. Subscribers run synchronously, in subscription order, after
/// every change.
#[derive(Clone, Default)]
pub struct AccessTokenHolder {
    inner: Arc<HolderInner>,
}

impl AccessTokenHolder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.inner
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn set_access_token(&self, token: impl Into<String>) {
        let token = token.into();
        *self
            .inner
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        self.notify(Some(&token));
    }

    pub fn clear(&self) {
        self.inner
            .slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.notify(None);
    }

    /// Lifecycle hook for page reload and logout
    pub fn reset(&self) {
        self.clear();
    }

    pub fn subscribe<F>(&self, subscriber: F)
    where
        F: Fn(Option<&str>) + Send + Sync + 'static,
    {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(subscriber));
    }

    // Runs on a snapshot with no lock held, so subscribers may read the
    // holder or subscribe again
    fn notify(&self, token: Option<&str>) {
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for subscriber in &subscribers {
            subscriber(token);
        }
    }
}

impl fmt::Debug for AccessTokenHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenHolder")
            .field("has_token", &self.has_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_starts_empty() {
        let holder = AccessTokenHolder::new();
        assert!(!holder.has_token());
        assert_eq!(holder.access_token(), None);
    }

    #[test]
    fn test_clones_share_slot() {
        let holder = AccessTokenHolder::new();
        let other = holder.clone();
        holder.set_access_token("AT1");
        assert_eq!(other.access_token().as_deref(), Some("AT1"));

        other.reset();
        assert!(!holder.has_token());
    }

    #[test]
    fn test_subscribers_notified_in_order() {
        let holder = AccessTokenHolder::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for id in 1..=2 {
            let seen = Arc::clone(&seen);
            holder.subscribe(move |token| {
                seen.lock()
                    .unwrap()
                    .push(format!("{id}:{}", token.unwrap_or("-")));
            });
        }

        holder.set_access_token("AT1");
        holder.clear();

        assert_eq!(*seen.lock().unwrap(), vec!["1:AT1", "2:AT1", "1:-", "2:-"]);
    }

    #[test]
    fn test_subscriber_can_read_holder() {
        let holder = AccessTokenHolder::new();
        let observed = Arc::new(Mutex::new(None));
        let reader = holder.clone();
        let sink = Arc::clone(&observed);
        holder.subscribe(move |_| {
            *sink.lock().unwrap() = reader.access_token();
        });

        holder.set_access_token("AT7");
        assert_eq!(observed.lock().unwrap().as_deref(), Some("AT7"));
    }

    #[test]
    fn test_debug_hides_token() {
        let holder = AccessTokenHolder::new();
        holder.set_access_token("secret-token");
        assert!(!format!("{holder:?}").contains("secret-token"));
    }

    #[test]
    fn test_subscriber_may_subscribe_again() {
        let holder = AccessTokenHolder::new();
        let late_calls = Arc::new(Mutex::new(Vec::new()));

        let registrar = holder.clone();
        let sink = Arc::clone(&late_calls);
        let registered = Arc::new(std::sync::atomic::AtomicBool::new(false));
        holder.subscribe(move |_| {
            if !registered.swap(true, std::sync::atomic::Ordering::SeqCst) {
                let sink = Arc::clone(&sink);
                registrar.subscribe(move |token| {
                    sink.lock().unwrap().push(token.map(ToString::to_string));
                });
            }
        });

        holder.set_access_token("AT1");
        holder.set_access_token("AT2");
        assert_eq!(*late_calls.lock().unwrap(), vec![Some("AT2".to_string())]);
    }
}
