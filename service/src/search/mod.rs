//! [`Listing`] search flow.
//!
//! A search goes through the following stages:
//! 1. [`build()`] translates search [`Criteria`] into a native
//!    [`list::Selector`];
//! 2. the storage selects a single [`list::Page`] by it;
//! 3. [`refine()`] drops the [`Listing`]s not matching the [`Criteria`];
//! 4. [`Flow`] records the pagination cursor and publishes the results.

mod builder;
mod refine;

use std::{
    mem,
    sync::atomic::{self, AtomicU64, AtomicUsize},
};

use tokio::sync::{watch, Mutex};
use tracing as log;

use crate::{
    domain::Listing,
    read::listing::{
        list,
        search::{Criteria, Refined},
    },
};

pub use self::{builder::build, refine::refine};

/// Shared state of [`Listing`] searches, publishing their results to
/// subscribers.
///
/// There is a single writer of the published values: the [`Flow`] itself.
#[derive(Debug)]
pub struct Flow {
    /// Latest published search results.
    results: watch::Sender<Vec<Listing>>,

    /// Indicator whether any search fetch is in flight.
    in_progress: watch::Sender<bool>,

    /// Number of search fetches in flight.
    ///
    /// Only modified under the [`Flow::in_progress`] lock.
    outstanding: AtomicUsize,

    /// Generation of the most recently started [`Ticket::New`] search.
    generation: AtomicU64,

    /// State of the last completed [`Ticket::New`] search, if any.
    current: Mutex<Option<Current>>,
}

/// State of the last completed search.
#[derive(Debug)]
struct Current {
    /// Generation of the search.
    generation: u64,

    /// [`Criteria`] of the search.
    criteria: Criteria,

    /// Cursor of the last fetched [`list::Page`].
    cursor: Option<list::Cursor>,

    /// Indicator whether the storage has more [`Listing`]s to fetch.
    has_more: bool,
}

/// Permission to fetch a single [`list::Page`] of a search.
#[derive(Clone, Debug)]
pub enum Ticket {
    /// First [`list::Page`] of a new search.
    New {
        /// Generation of the new search.
        generation: u64,

        /// [`Criteria`] of the new search.
        criteria: Criteria,
    },

    /// Next [`list::Page`] of the current search.
    More {
        /// Generation of the continued search.
        generation: u64,

        /// [`Criteria`] of the continued search.
        criteria: Criteria,

        /// Cursor to continue the search after.
        after: Option<list::Cursor>,
    },
}

impl Ticket {
    /// Returns the [`Criteria`] of the search.
    #[must_use]
    pub fn criteria(&self) -> &Criteria {
        match self {
            Self::New { criteria, .. } | Self::More { criteria, .. } => criteria,
        }
    }

    /// Returns the cursor to fetch the [`list::Page`] after, if any.
    #[must_use]
    pub fn after(&self) -> Option<list::Cursor> {
        match self {
            Self::New { .. } => None,
            Self::More { after, .. } => *after,
        }
    }
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

impl Flow {
    /// Creates a new idle [`Flow`] with no results.
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: watch::Sender::new(Vec::new()),
            in_progress: watch::Sender::new(false),
            outstanding: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// Subscribes to the published search results.
    ///
    /// The latest results are immediately available to the subscriber.
    #[must_use]
    pub fn results(&self) -> watch::Receiver<Vec<Listing>> {
        self.results.subscribe()
    }

    /// Subscribes to the search progress indicator.
    #[must_use]
    pub fn in_progress(&self) -> watch::Receiver<bool> {
        self.in_progress.subscribe()
    }

    /// Indicates whether any search fetch is in flight at the moment.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        *self.in_progress.borrow()
    }

    /// Returns the pagination cursor of the current search, if any.
    pub async fn cursor(&self) -> Option<list::Cursor> {
        self.current.lock().await.as_ref().and_then(|c| c.cursor)
    }

    /// Starts a new search with the provided [`Criteria`], superseding all the
    /// searches started before.
    #[must_use]
    pub fn begin(&self, criteria: Criteria) -> Ticket {
        let generation =
            self.generation.fetch_add(1, atomic::Ordering::AcqRel) + 1;
        log::debug!("search #{generation} started: {criteria:?}");
        Ticket::New {
            generation,
            criteria,
        }
    }

    /// Continues the current search.
    ///
    /// [`None`] is returned if there is no current search, or it has no more
    /// [`Listing`]s to fetch.
    pub async fn resume(&self) -> Option<Ticket> {
        let current = self.current.lock().await;
        let current = current.as_ref().filter(|c| c.has_more)?;
        Some(Ticket::More {
            generation: current.generation,
            criteria: current.criteria.clone(),
            after: current.cursor,
        })
    }

    /// Marks a search fetch as being in flight until the returned [`Fetching`]
    /// guard is dropped.
    #[must_use]
    pub fn fetching(&self) -> Fetching<'_> {
        _ = self.in_progress.send_if_modified(|busy| {
            _ = self.outstanding.fetch_add(1, atomic::Ordering::Relaxed);
            !mem::replace(busy, true)
        });
        Fetching { flow: self }
    }

    /// Publishes the [`Refined`] page fetched by the provided [`Ticket`].
    ///
    /// A [`Ticket::New`] page replaces the published results, while a
    /// [`Ticket::More`] page is appended to them. Pages of superseded searches
    /// are discarded.
    ///
    /// Returns whether the page has been published.
    pub async fn publish(&self, ticket: Ticket, refined: &Refined) -> bool {
        let mut current = self.current.lock().await;

        match ticket {
            Ticket::New {
                generation,
                criteria,
            } => {
                let latest = self.generation.load(atomic::Ordering::Acquire);
                if generation != latest {
                    log::debug!(
                        "search #{generation} result discarded: superseded by \
                         search #{latest}",
                    );
                    return false;
                }
                *current = Some(Current {
                    generation,
                    criteria,
                    cursor: refined.cursor,
                    has_more: refined.has_more,
                });
                _ = self.results.send_replace(refined.listings.clone());
            }
            Ticket::More {
                generation, after, ..
            } => {
                let Some(current) = current
                    .as_mut()
                    .filter(|c| c.generation == generation && c.cursor == after)
                else {
                    log::debug!(
                        "search #{generation} page discarded: search has moved",
                    );
                    return false;
                };
                // Empty page leaves the cursor unchanged.
                if refined.cursor.is_some() {
                    current.cursor = refined.cursor;
                }
                current.has_more = refined.has_more;
                self.results.send_modify(|results| {
                    results.extend(refined.listings.iter().cloned());
                });
            }
        }

        true
    }
}

/// Guard marking a search fetch as being in flight.
#[derive(Debug)]
pub struct Fetching<'f> {
    /// [`Flow`] the fetch belongs to.
    flow: &'f Flow,
}

impl Drop for Fetching<'_> {
    fn drop(&mut self) {
        let Flow {
            in_progress,
            outstanding,
            ..
        } = self.flow;
        _ = in_progress.send_if_modified(|busy| {
            let left = outstanding.fetch_sub(1, atomic::Ordering::Relaxed) - 1;
            left == 0 && mem::replace(busy, false)
        });
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::listing,
        read::listing::search::{Criteria, Refined},
    };

    use super::{Flow, Ticket};

    fn refined(cursor: Option<listing::Id>, has_more: bool) -> Refined {
        Refined {
            listings: Vec::new(),
            cursor,
            has_more,
        }
    }

    #[test]
    fn in_progress_is_held_while_any_fetch_is_in_flight() {
        let flow = Flow::new();
        let rx = flow.in_progress();
        assert!(!*rx.borrow());

        let first = flow.fetching();
        let second = flow.fetching();
        assert!(flow.is_in_progress());

        drop(first);
        assert!(flow.is_in_progress());

        drop(second);
        assert!(!flow.is_in_progress());
        assert!(!*rx.borrow());
    }

    #[tokio::test]
    async fn new_search_resets_cursor() {
        let flow = Flow::new();
        let cursor = listing::Id::new();

        let ticket = flow.begin(Criteria::default());
        assert!(flow.publish(ticket, &refined(Some(cursor), true)).await);
        assert_eq!(flow.cursor().await, Some(cursor));

        let ticket = flow.begin(Criteria::default());
        assert!(flow.publish(ticket, &refined(None, false)).await);
        assert_eq!(flow.cursor().await, None);
    }

    #[tokio::test]
    async fn stale_search_is_discarded() {
        let flow = Flow::new();

        let stale = flow.begin(Criteria::default());
        let fresh = flow.begin(Criteria::default());
        let cursor = listing::Id::new();

        assert!(flow.publish(fresh, &refined(Some(cursor), true)).await);
        assert!(!flow.publish(stale, &refined(None, false)).await);
        assert_eq!(flow.cursor().await, Some(cursor));
    }

    #[tokio::test]
    async fn empty_more_page_keeps_cursor() {
        let flow = Flow::new();
        let cursor = listing::Id::new();

        let ticket = flow.begin(Criteria::default());
        assert!(flow.publish(ticket, &refined(Some(cursor), true)).await);

        let ticket = flow.resume().await.unwrap();
        assert_eq!(ticket.after(), Some(cursor));
        assert!(flow.publish(ticket, &refined(None, false)).await);
        assert_eq!(flow.cursor().await, Some(cursor));
    }

    #[tokio::test]
    async fn exhausted_search_is_not_resumed() {
        let flow = Flow::new();
        assert!(flow.resume().await.is_none());

        let ticket = flow.begin(Criteria::default());
        assert!(flow.publish(ticket, &refined(None, false)).await);
        assert!(flow.resume().await.is_none());
    }

    #[tokio::test]
    async fn concurrent_more_pages_are_not_duplicated() {
        let flow = Flow::new();
        let ticket = flow.begin(Criteria::default());
        assert!(
            flow.publish(ticket, &refined(Some(listing::Id::new()), true))
                .await
        );

        let first = flow.resume().await.unwrap();
        let second = flow.resume().await.unwrap();
        assert!(matches!(first, Ticket::More { .. }));

        assert!(
            flow.publish(first, &refined(Some(listing::Id::new()), true))
                .await
        );
        assert!(
            !flow
                .publish(second, &refined(Some(listing::Id::new()), true))
                .await
        );
    }
}
