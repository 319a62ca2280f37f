//! Font fetching and asynchronous loading
//!
//! A [`FontSource`] turns a resource location into bytes. A [`FontLoader`]
//! runs fetch-and-parse outside the caller's control flow and hands results
//! back through `poll`, tagged with the [`LoadTicket`] of the request.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::catalog::FontDescriptor;
use super::font::{FontData, FontError, FontResult};

/// Where font bytes come from
pub trait FontSource: Send + Sync + 'static {
    /// Read the raw bytes at `location`
    fn fetch(&self, location: &str) -> FontResult<Vec<u8>>;

    /// Fetch and parse the font a descriptor points at
    fn load(&self, descriptor: &FontDescriptor) -> FontResult<FontData> {
        let bytes = self.fetch(descriptor.source_location)?;
        FontData::parse(descriptor.source_location, &bytes)
    }
}

/// Reads fonts from files below an asset root
#[derive(Debug, Clone)]
pub struct FsFontSource {
    root: PathBuf,
}

impl FsFontSource {
    /// Source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FontSource for FsFontSource {
    fn fetch(&self, location: &str) -> FontResult<Vec<u8>> {
        let path = self.root.join(location);
        log::debug!("Reading font file {}", path.display());
        std::fs::read(&path).map_err(|source| FontError::Io {
            location: location.to_string(),
            source,
        })
    }
}

/// Serves fonts registered in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryFontSource {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFontSource {
    /// Empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under `location`
    pub fn insert(&mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(location.into(), bytes.into());
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_file(mut self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(location, bytes);
        self
    }
}

impl FontSource for MemoryFontSource {
    fn fetch(&self, location: &str) -> FontResult<Vec<u8>> {
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| FontError::NotFound(location.to_string()))
    }
}

/// Identifies one load request; generations increase monotonically per controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket {
    /// Request sequence number
    pub generation: u64,
}

/// Finished load, successful or not
#[derive(Debug)]
pub struct FontLoadCompletion {
    /// Ticket passed to [`FontLoader::begin`]
    pub ticket: LoadTicket,
    /// Font that was requested
    pub descriptor: &'static FontDescriptor,
    /// Parsed font or the reason it failed
    pub result: FontResult<FontData>,
}

/// Runs font loads and reports their completion
pub trait FontLoader {
    /// Start loading `descriptor`; the result comes back from a later `poll`
    fn begin(&mut self, ticket: LoadTicket, descriptor: &'static FontDescriptor);

    /// Drain completions that finished since the last call, without blocking
    fn poll(&mut self) -> Vec<FontLoadCompletion>;

    /// Requests begun but not yet returned by `poll`
    fn in_flight(&self) -> usize;
}

/// Loads each font on its own worker thread
///
/// Results cross back over a channel, so parsing never blocks the caller.
/// Nothing is cached; every request re-fetches.
pub struct ThreadedFontLoader<S: FontSource> {
    source: Arc<S>,
    sender: Sender<FontLoadCompletion>,
    receiver: Receiver<FontLoadCompletion>,
    in_flight: usize,
}

impl<S: FontSource> ThreadedFontLoader<S> {
    /// Loader reading from `source`
    pub fn new(source: S) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            source: Arc::new(source),
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Block until at least one completion arrives or `timeout` passes
    pub fn wait(&mut self, timeout: Duration) -> Vec<FontLoadCompletion> {
        let deadline = Instant::now() + timeout;
        let mut completions = self.poll();
        while completions.is_empty() && self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            if let Ok(completion) = self.receiver.recv_timeout(remaining) {
                self.in_flight -= 1;
                completions.push(completion);
                completions.extend(self.poll());
            }
        }
        completions
    }
}

impl<S: FontSource> FontLoader for ThreadedFontLoader<S> {
    fn begin(&mut self, ticket: LoadTicket, descriptor: &'static FontDescriptor) {
        let source = Arc::clone(&self.source);
        let sender = self.sender.clone();
        self.in_flight += 1;

        let spawned = thread::Builder::new()
            .name(format!("font-load-{}", descriptor.name))
            .spawn(move || {
                let result = source.load(descriptor);
                // Receiver gone means the loader was dropped; nobody wants the result
                let _ = sender.send(FontLoadCompletion { ticket, descriptor, result });
            });

        if let Err(e) = spawned {
            log::error!("Failed to spawn font loader thread for '{}': {}", descriptor.name, e);
            let _ = self.sender.send(FontLoadCompletion {
                ticket,
                descriptor,
                result: Err(FontError::Io {
                    location: descriptor.source_location.to_string(),
                    source: e,
                }),
            });
        }
    }

    fn poll(&mut self) -> Vec<FontLoadCompletion> {
        let completions: Vec<_> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(completions.len());
        completions
    }

    fn in_flight(&self) -> usize {
        self.in_flight
    }
}

/// Loads synchronously inside `begin` and reports on the next `poll`
///
/// Keeps the deferred-completion contract without threads, for headless
/// hosts and deterministic tests.
pub struct ImmediateFontLoader<S: FontSource> {
    source: S,
    ready: Vec<FontLoadCompletion>,
}

impl<S: FontSource> ImmediateFontLoader<S> {
    /// Loader reading from `source`
    pub fn new(source: S) -> Self {
        Self {
            source,
            ready: Vec::new(),
        }
    }
}

impl<S: FontSource> FontLoader for ImmediateFontLoader<S> {
    fn begin(&mut self, ticket: LoadTicket, descriptor: &'static FontDescriptor) {
        let result = self.source.load(descriptor);
        self.ready.push(FontLoadCompletion { ticket, descriptor, result });
    }

    fn poll(&mut self) -> Vec<FontLoadCompletion> {
        std::mem::take(&mut self.ready)
    }

    fn in_flight(&self) -> usize {
        self.ready.len()
    }
}
