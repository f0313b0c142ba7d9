//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

/// Builds [`read::listing::list::Arguments`] out of the provided GraphQL
/// pagination arguments, defaulting to the `page_size`.
///
/// [`None`] is returned if `first` is not a positive number.
fn arguments(
    first: Option<i32>,
    after: Option<api::listing::list::Cursor>,
    page_size: usize,
) -> Option<read::listing::list::Arguments> {
    let page_size = i32::try_from(page_size).unwrap_or(i32::MAX);
    read::listing::list::Arguments::new(first, after.map(Into::into), page_size)
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Listing` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "listing",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        ctx.service()
            .execute(query::listing::ById(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::listing::ListingError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches a page of `Listing`s matching the provided criteria.
    ///
    /// Unlike the `search` mutation, doesn't affect the published search
    /// results, so may be paginated freely by the `after` cursor.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PAGINATION_ARGUMENTS` - `first` is not a positive number;
    /// - `INVALID_ROOMS_FILTER` - rooms filter is neither a number nor `3+`.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            criteria = ?criteria,
            first = ?first,
            gql.name = "listings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listings(
        criteria: Option<api::listing::Criteria>,
        first: Option<i32>,
        after: Option<api::listing::list::Cursor>,
        ctx: &Context,
    ) -> Result<api::listing::list::Connection, Error> {
        let arguments =
            arguments(first, after, ctx.service().config().page_size)
                .ok_or_else(|| api::PaginationError::Invalid.into())
                .map_err(ctx.error())?;
        let criteria = read::listing::search::Criteria::try_from(
            criteria.unwrap_or_default(),
        )
        .map_err(AsError::into_error)
        .map_err(ctx.error())?;

        ctx.service()
            .execute(query::listings::Paginate {
                criteria,
                arguments,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches a page of all the `Listing`s, newest first, regardless of
    /// their purpose.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized by an
    ///                              administrator;
    /// - `INVALID_PAGINATION_ARGUMENTS` - `first` is not a positive number.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            first = ?first,
            gql.name = "allListings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn all_listings(
        first: Option<i32>,
        after: Option<api::listing::list::Cursor>,
        ctx: &Context,
    ) -> Result<api::listing::list::Connection, Error> {
        _ = ctx.current_session().await?;
        let arguments =
            arguments(first, after, ctx.service().config().page_size)
                .ok_or_else(|| api::PaginationError::Invalid.into())
                .map_err(ctx.error())?;

        ctx.service()
            .execute(query::listings::Latest { arguments })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Suggests the known `Listing` locations containing the provided input,
    /// regardless of letter case and diacritics.
    ///
    /// Omitted or blank input suggests every known location.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "locations",
            input = ?input,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn locations(
        input: Option<String>,
        ctx: &Context,
    ) -> Result<Vec<api::listing::Location>, Error> {
        ctx.service()
            .execute(query::locations::Suggestions {
                input: input.unwrap_or_default(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|locations| locations.into_iter().map(Into::into).collect())
    }

    /// Indicates whether a search page is being fetched at the moment.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "searchInProgress",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub fn search_in_progress(ctx: &Context) -> bool {
        ctx.service().search().is_in_progress()
    }
}
