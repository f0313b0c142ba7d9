//! [`Query`] definition.

pub mod listing;
pub mod listings;
pub mod locations;

use common::operations::{By, Select};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        listing::{CoverImage, StoragePath},
        Listing,
    },
    infra::{storage, Storage},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

impl<Db, St> Service<Db, St>
where
    St: Storage<
        Select<By<CoverImage, StoragePath>>,
        Ok = CoverImage,
        Err = Traced<storage::Error>,
    >,
{
    /// Resolves [`Listing::cover_image`]s of the provided [`Listing`]s out of
    /// their [`StoragePath`]s.
    ///
    /// Failures are logged and leave the [`Listing::cover_image`] empty.
    async fn resolve_cover_images(&self, listings: &mut [Listing]) {
        for listing in listings {
            let Some(path) = listing.storage_path.clone() else {
                continue;
            };
            listing.cover_image = self
                .storage()
                .execute(Select(By::new(path)))
                .await
                .map_err(|e| {
                    log::warn!(
                        "failed to resolve cover image of `Listing(id: {})`: \
                         {e}",
                        listing.id,
                    );
                })
                .ok();
        }
    }
}
