//! Media references and display handle bookkeeping.
//!
//! A [`MediaRef`] pairs an owned binary payload ([`Blob`]) with a transient
//! [`DisplayHandle`]. Payloads are persisted; display handles are issued per
//! session by a [`DisplayHandles`] implementation and must be released before
//! the media they belong to is replaced or dropped from a project.

use std::{collections::HashSet, fmt, sync::Arc};

use log::trace;

/// Owned binary payload of an image or audio clip.
///
/// Cloning is cheap: the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Arc<[u8]>,
    mime: Option<String>,
}

impl Blob {
    /// Creates a blob from raw bytes.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            mime: None,
        }
    }

    /// Sets the MIME type reported by the source of the payload.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Returns the payload bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the MIME type, if known.
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// Returns the payload size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("len", &self.bytes.len())
            .field("mime", &self.mime)
            .finish()
    }
}

/// A transient handle used by renderers to display a [`Blob`].
///
/// Handles are never persisted; they are regenerated whenever a project is
/// loaded or hydrated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayHandle(String);

impl DisplayHandle {
    /// Wraps an existing handle value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the handle value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of display handles.
///
/// Every handle returned by [`acquire`](DisplayHandles::acquire) must
/// eventually be passed to [`release`](DisplayHandles::release).
pub trait DisplayHandles {
    /// Issues a new display handle for `blob`.
    fn acquire(&mut self, blob: &Blob) -> DisplayHandle;

    /// Releases a handle previously issued for some blob.
    fn release(&mut self, handle: &DisplayHandle);
}

/// In-memory [`DisplayHandles`] implementation.
///
/// Tracks which handles are live and counts releases, which makes leaks
/// visible in long editing sessions and in tests.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    issued: u64,
    live: HashSet<DisplayHandle>,
    released: u64,
}

impl HandleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of handles issued and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if `handle` was issued by this registry and is still live.
    pub fn is_live(&self, handle: &DisplayHandle) -> bool {
        self.live.contains(handle)
    }

    /// Returns how many times [`DisplayHandles::release`] has been called.
    pub fn released_count(&self) -> u64 {
        self.released
    }
}

impl DisplayHandles for HandleRegistry {
    fn acquire(&mut self, blob: &Blob) -> DisplayHandle {
        self.issued += 1;
        let handle = DisplayHandle(format!("blob:roleplay-{}", self.issued));
        trace!(handle:% = handle, len = blob.len(); "Display handle acquired");
        self.live.insert(handle.clone());
        handle
    }

    fn release(&mut self, handle: &DisplayHandle) {
        if !self.live.remove(handle) {
            trace!(handle:% = handle; "Releasing a handle this registry did not issue");
        }
        self.released += 1;
    }
}

/// A freshly selected media file, before it is attached to a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    /// Original file name.
    pub name: String,
    /// File contents.
    pub blob: Blob,
}

impl MediaSource {
    /// Creates a media source from a file name and its contents.
    pub fn new(name: impl Into<String>, blob: Blob) -> Self {
        Self {
            name: name.into(),
            blob,
        }
    }

    /// Attaches the media, acquiring a display handle for it.
    pub fn attach(self, handles: &mut dyn DisplayHandles) -> MediaRef {
        MediaRef::attach(self.name, self.blob, handles)
    }
}

/// Reference to an image or audio asset held by a scene or dialogue line.
///
/// Equality compares the name and payload only; the display handle is
/// session state.
#[derive(Debug, Clone)]
pub struct MediaRef {
    /// Original file name.
    pub name: String,
    /// Binary payload. `None` for media imported without its binary.
    pub blob: Option<Blob>,
    /// Transient display handle, present only while a payload is attached.
    pub display: Option<DisplayHandle>,
}

impl MediaRef {
    /// Creates a reference without a payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blob: None,
            display: None,
        }
    }

    /// Creates a reference with a payload and a freshly acquired display handle.
    pub fn attach(name: impl Into<String>, blob: Blob, handles: &mut dyn DisplayHandles) -> Self {
        let display = handles.acquire(&blob);
        Self {
            name: name.into(),
            blob: Some(blob),
            display: Some(display),
        }
    }

    /// Releases the display handle, if any.
    pub fn release(&self, handles: &mut dyn DisplayHandles) {
        if let Some(display) = &self.display {
            handles.release(display);
        }
    }
}

impl PartialEq for MediaRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.blob == other.blob
    }
}
