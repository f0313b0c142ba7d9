//! GraphQL API definitions.

pub mod listing;
mod mutation;
mod query;
pub mod scalar;
mod subscription;

use crate::define_error;

pub use self::{
    listing::Listing, mutation::Mutation, query::Query,
    subscription::Subscription,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum PaginationError {
        #[code = "INVALID_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "`first` must be a positive number"]
        Invalid,
    }
}
