//! Operation markers dispatched through a [`Handler`].
//!
//! A storage backend implements [`Handler`] once per operation it supports,
//! e.g. `Handler<Select<By<Page, Selector>>>` for selecting a page of listings
//! by a pagination selector.
//!
//! [`Handler`]: crate::Handler

use std::marker::PhantomData;

/// Inserts a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Updates (or upserts) an existing value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Selects a value described by the wrapped selector.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Selector of a `W` value by a `B` key.
///
/// `W` only disambiguates [`Handler`] implementations selecting different
/// values by the same key type.
///
/// [`Handler`]: crate::Handler
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected value.
    _what: PhantomData<W>,

    /// Key to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector out of the provided key.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the key of this [`By`] selector.
    #[must_use]
    pub fn inner(&self) -> &B {
        &self.by
    }

    /// Unwraps the key of this [`By`] selector.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
