//! Asset loading bookkeeping
//!
//! The platform does the actual fetching; this tracks which keys are in
//! flight, stores finished assets and tells listeners about progress.
//! `LoadedAll` fires whenever the in-flight count drops back to zero,
//! failures included.

use std::collections::HashMap;

use crate::error::AssetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadEventKind {
    Loading,
    LoadedOne,
    LoadedAll,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Loading { key: String },
    LoadedOne { key: String },
    LoadedAll,
    Error(AssetError),
}

impl LoadEvent {
    pub fn kind(&self) -> LoadEventKind {
        match self {
            LoadEvent::Loading { .. } => LoadEventKind::Loading,
            LoadEvent::LoadedOne { .. } => LoadEventKind::LoadedOne,
            LoadEvent::LoadedAll => LoadEventKind::LoadedAll,
            LoadEvent::Error(_) => LoadEventKind::Error,
        }
    }
}

type Listener = Box<dyn FnMut(&LoadEvent)>;

/// Typed and global listeners, notified in registration order.
#[derive(Default)]
pub struct EventEmitter {
    listeners: HashMap<LoadEventKind, Vec<Listener>>,
    global: Vec<Listener>,
}

impl EventEmitter {
    pub fn on(&mut self, kind: LoadEventKind, listener: impl FnMut(&LoadEvent) + 'static) {
        self.listeners.entry(kind).or_default().push(Box::new(listener));
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&LoadEvent) + 'static) {
        self.global.push(Box::new(listener));
    }

    pub fn emit(&mut self, event: &LoadEvent) {
        if let Some(listeners) = self.listeners.get_mut(&event.kind()) {
            for listener in listeners.iter_mut() {
                listener(event);
            }
        }
        for listener in self.global.iter_mut() {
            listener(event);
        }
    }
}

/// Key -> asset store. `A` is whatever the platform decodes into.
pub struct Loader<A> {
    /// In-flight keys and the source they come from
    loading: HashMap<String, String>,
    loaded: HashMap<String, A>,
    events: EventEmitter,
}

impl<A> Default for Loader<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Loader<A> {
    pub fn new() -> Self {
        Self {
            loading: HashMap::new(),
            loaded: HashMap::new(),
            events: EventEmitter::default(),
        }
    }

    pub fn on(&mut self, kind: LoadEventKind, listener: impl FnMut(&LoadEvent) + 'static) {
        self.events.on(kind, listener);
    }

    pub fn add_listener(&mut self, listener: impl FnMut(&LoadEvent) + 'static) {
        self.events.add_listener(listener);
    }

    /// Mark `key` as in flight from `source`.
    pub fn request(&mut self, key: &str, source: &str) {
        self.loading.insert(key.to_owned(), source.to_owned());
        self.events.emit(&LoadEvent::Loading { key: key.to_owned() });
    }

    /// Store a finished asset. Returns true once nothing is in flight.
    pub fn complete(&mut self, key: &str, asset: A) -> bool {
        self.loading.remove(key);
        self.loaded.insert(key.to_owned(), asset);
        log::debug!("Loaded asset {key}");
        self.events.emit(&LoadEvent::LoadedOne { key: key.to_owned() });
        self.finish_if_idle()
    }

    /// Record a failed fetch. Returns true once nothing is in flight.
    pub fn fail(&mut self, key: &str) -> bool {
        let source_url = self.loading.remove(key).unwrap_or_default();
        let error = AssetError::Failed {
            key: key.to_owned(),
            source_url,
        };
        log::warn!("{error}");
        self.events.emit(&LoadEvent::Error(error));
        self.finish_if_idle()
    }

    fn finish_if_idle(&mut self) -> bool {
        if !self.loading.is_empty() {
            return false;
        }
        log::info!("All assets loaded ({})", self.loaded.len());
        self.events.emit(&LoadEvent::LoadedAll);
        true
    }

    pub fn get(&self, key: &str) -> Result<&A, AssetError> {
        if let Some(asset) = self.loaded.get(key) {
            return Ok(asset);
        }
        if self.loading.contains_key(key) {
            Err(AssetError::NotLoaded(key.to_owned()))
        } else {
            Err(AssetError::NotFound(key.to_owned()))
        }
    }

    pub fn pending(&self) -> usize {
        self.loading.len()
    }

    pub fn is_idle(&self) -> bool {
        self.loading.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_get_distinguishes_loading_and_missing() {
        let mut loader: Loader<u8> = Loader::new();
        loader.request("ball", "assets/ball.png");

        assert_eq!(loader.get("ball"), Err(AssetError::NotLoaded("ball".into())));
        assert_eq!(loader.get("paddle"), Err(AssetError::NotFound("paddle".into())));

        loader.complete("ball", 7);
        assert_eq!(loader.get("ball"), Ok(&7));
    }

    #[test]
    fn test_loaded_all_fires_after_last_request() {
        let mut loader: Loader<()> = Loader::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let log = events.clone();
        loader.on(LoadEventKind::LoadedAll, move |e| log.borrow_mut().push(e.clone()));

        loader.request("a", "a.png");
        loader.request("b", "b.png");
        assert!(!loader.complete("a", ()));
        assert!(events.borrow().is_empty());
        assert!(loader.fail("b"));
        assert_eq!(*events.borrow(), vec![LoadEvent::LoadedAll]);
        assert!(loader.is_idle());
    }

    #[test]
    fn test_error_event_carries_key_and_source() {
        let mut loader: Loader<()> = Loader::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        loader.add_listener(move |e| log.borrow_mut().push(e.kind()));
        let errors = Rc::new(RefCell::new(Vec::new()));
        let err_log = errors.clone();
        loader.on(LoadEventKind::Error, move |e| err_log.borrow_mut().push(e.clone()));

        loader.request("bg", "assets/bg.jpg");
        loader.fail("bg");

        assert_eq!(
            *errors.borrow(),
            vec![LoadEvent::Error(AssetError::Failed {
                key: "bg".into(),
                source_url: "assets/bg.jpg".into(),
            })]
        );
        assert_eq!(
            *seen.borrow(),
            vec![LoadEventKind::Loading, LoadEventKind::Error, LoadEventKind::LoadedAll]
        );
        assert_eq!(loader.get("bg"), Err(AssetError::NotFound("bg".into())));
    }
}
