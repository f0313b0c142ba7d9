//! GraphQL [`Subscription`]s definitions.

use futures::stream::{self, BoxStream, StreamExt as _};
use juniper::graphql_subscription;
use tokio::sync::watch;

use crate::{api, Context, Error};

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Subscription to the `Listing`s found by the current search.
    ///
    /// Emits the whole accumulated list: the current one right away, and a
    /// new one every time `search` replaces it or `searchMore` extends it.
    pub async fn search_results(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<Vec<api::Listing>, Error>>, Error>
    {
        Ok(changes(ctx.service().search().results())
            .map(|listings| Ok(listings.into_iter().map(Into::into).collect()))
            .boxed())
    }

    /// Subscription to the indicator whether a search page is being fetched.
    pub async fn search_in_progress(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<bool, Error>>, Error> {
        Ok(changes(ctx.service().search().in_progress()).map(Ok).boxed())
    }
}

/// Turns the provided [`watch::Receiver`] into a [`Stream`] of its values,
/// starting with the current one.
///
/// Ends once the [`watch::Sender`] is dropped.
///
/// [`Stream`]: futures::Stream
fn changes<T>(rx: watch::Receiver<T>) -> BoxStream<'static, T>
where
    T: Clone + Send + Sync + 'static,
{
    stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first {
            rx.changed().await.ok()?;
        }
        let value = rx.borrow_and_update().clone();
        Some((value, (rx, false)))
    })
    .boxed()
}
