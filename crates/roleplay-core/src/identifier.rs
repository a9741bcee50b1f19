//! Identifier management using string interning.
//!
//! This module provides the [`Id`] type used for scene and choice identifiers,
//! and the per-prefix counters behind [`Id::fresh`].

use std::{
    collections::HashMap,
    convert::Infallible,
    fmt,
    sync::{LazyLock, Mutex, MutexGuard, PoisonError},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
static INTERNER: LazyLock<Mutex<DefaultStringInterner>> =
    LazyLock::new(|| Mutex::new(DefaultStringInterner::new()));

/// Per-prefix sequence counters used by [`Id::fresh`].
static COUNTERS: LazyLock<Mutex<HashMap<String, u32>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Identifier type using string interning.
///
/// `Id` is `Copy`, so scene graphs can key maps and sets by it without
/// cloning strings. It serializes as the plain string it was created from.
///
/// # Examples
///
/// ```
/// use roleplay_core::identifier::Id;
///
/// let start = Id::new("start");
/// assert_eq!(start, "start");
/// assert_eq!(start.to_string(), "start");
///
/// let generated = Id::fresh("doc-example");
/// assert_eq!(generated, "doc-example-0001");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string slice.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates a new identifier from a monotonically increasing per-prefix
    /// counter: `prefix-0001`, `prefix-0002`, …
    ///
    /// Uniqueness holds for the lifetime of the process only. Identifiers
    /// restored from saved projects are reused verbatim and may coincide
    /// with generated ones; callers adding to an existing project should
    /// skip identifiers that are already taken.
    pub fn fresh(prefix: &str) -> Self {
        let seq = {
            let mut counters = COUNTERS.lock().unwrap_or_else(PoisonError::into_inner);
            let seq = counters.entry(prefix.to_owned()).or_insert(0);
            *seq += 1;
            *seq
        };
        Self::new(&format!("{prefix}-{seq:04}"))
    }

    /// Calls `f` with the string this identifier was created from.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.with_str(str::to_owned);
        f.write_str(&value)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.with_str(str::to_owned);
        f.debug_tuple("Id").field(&value).finish()
    }
}

impl std::str::FromStr for Id {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Id {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "start"`
    fn eq(&self, other: &str) -> bool {
        self.with_str(|value| value == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.with_str(|value| serializer.serialize_str(value))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(&value))
    }
}
