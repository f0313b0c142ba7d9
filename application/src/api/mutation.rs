//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{
    command, domain::listing, query, read::listing::search, Command as _,
    Query as _,
};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Starts a new `Listing` search with the provided criteria.
    ///
    /// The first page replaces the results published by the `searchResults`
    /// subscription.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_ROOMS_FILTER` - rooms filter is neither a number nor `3+`.
    #[tracing::instrument(
        skip_all,
        fields(
            criteria = ?criteria,
            gql.name = "search",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn search(
        criteria: Option<api::listing::Criteria>,
        ctx: &Context,
    ) -> Result<api::listing::list::Connection, Error> {
        let criteria = search::Criteria::try_from(criteria.unwrap_or_default())
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(query::listings::Search { criteria })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the next page of the current `Listing` search.
    ///
    /// The page is appended to the results published by the `searchResults`
    /// subscription. Once the search is exhausted, an empty page is returned.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "searchMore",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn search_more(
        ctx: &Context,
    ) -> Result<api::listing::list::Connection, Error> {
        ctx.service()
            .execute(query::listings::SearchMore)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Publishes a new `Listing` out of the provided draft.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized by an
    ///                              administrator;
    /// - `INVALID_LISTING` - the draft misses required fields;
    /// - `INVALID_NUMBER` - number of rooms is out of range.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "publishListing",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn publish_listing(
        draft: api::listing::Draft,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let admin = ctx.current_session().await?;
        let draft = listing::Draft::try_from(draft)
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        tracing::info!(admin = %admin.subject, "publishing a listing");
        ctx.service()
            .execute(command::PublishListing { draft })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the contents of an existing `Listing` with the provided draft.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized by an
    ///                              administrator;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `INVALID_LISTING` - the draft misses required fields;
    /// - `INVALID_NUMBER` - number of rooms is out of range.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "editListing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn edit_listing(
        id: api::listing::Id,
        draft: api::listing::Draft,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let admin = ctx.current_session().await?;
        let draft = listing::Draft::try_from(draft)
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        tracing::info!(admin = %admin.subject, "editing a listing");
        ctx.service()
            .execute(command::EditListing {
                id: id.into(),
                draft,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::publish_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::IncompleteDraft(_) => {
                Some(api::listing::ListingError::Invalid.into())
            }
        }
    }
}

impl AsError for command::edit_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::listing::ListingError as E;

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::IncompleteDraft(_) => Some(E::Invalid.into()),
            Self::ListingNotExists(_) => Some(E::NotExists.into()),
        }
    }
}
