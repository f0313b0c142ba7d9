//! [`Command`] definition.

pub mod authorize_admin;
pub mod edit_listing;
pub mod publish_listing;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_admin::AuthorizeAdmin, edit_listing::EditListing,
    publish_listing::PublishListing,
};
