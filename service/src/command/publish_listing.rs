//! [`Command`] for publishing a new [`Listing`].

use common::{operations::Insert, DateTime};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        listing::{self, Draft, IncompleteDraft},
        Listing,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for publishing a new [`Listing`] out of a [`Draft`].
#[derive(Clone, Debug, From)]
pub struct PublishListing {
    /// [`Draft`] of the new [`Listing`].
    pub draft: Draft,
}

impl<Db, St> Command<PublishListing> for Service<Db, St>
where
    Db: Database<Insert<Listing>, Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: PublishListing,
    ) -> Result<Self::Ok, Self::Err> {
        let PublishListing { draft } = cmd;

        let listing = draft
            .into_listing(listing::Id::new(), DateTime::now().coerce())
            .map_err(tracerr::from_and_wrap!(=> ExecutionError))?;

        self.database()
            .execute(Insert(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
            .map(drop)?;

        log::info!("`Listing(id: {})` published", listing.id);
        Ok(listing)
    }
}

/// Error of [`PublishListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Draft`] lacks required fields.
    #[display("Incomplete `Draft`: {_0}")]
    IncompleteDraft(IncompleteDraft),
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeSet;

    use common::{
        operations::{By, Select},
        Currency,
    };

    use crate::{
        domain::listing::{
            Category, Description, Draft, IncompleteDraft, Location, Purpose,
            StoragePath,
        },
        infra::{Database as _, Firebase, Memory},
        Command as _, Config, Service,
    };

    use super::{ExecutionError, PublishListing};

    fn service() -> Service<Memory, Firebase> {
        Service::new(
            Config {
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"s"),
                page_size: 6,
            },
            Memory::new(),
            Firebase {
                host: "storage.example.com".into(),
                bucket: "bucket".into(),
                cover_image: "0".into(),
            },
        )
    }

    fn draft() -> Draft {
        Draft {
            title: None,
            description: Description::new("Quiet street, big garden"),
            category: Some(Category::Townhouse),
            purpose: Some(Purpose::ForSale),
            location: Location::new("Hue"),
            price: Some(2_500_000.into()),
            currency: None,
            property_size: Some(180.into()),
            bedrooms: Some(3),
            bathrooms: Some(2),
            amenities: BTreeSet::new(),
            storage_path: StoragePath::new("listings/hue-townhouse"),
        }
    }

    #[tokio::test]
    async fn stores_new_listing() {
        let svc = service();
        let listing = svc
            .execute(PublishListing { draft: draft() })
            .await
            .unwrap();
        assert_eq!(listing.price.currency, Currency::Vnd);

        let stored = svc
            .database()
            .execute(Select(By::new(listing.id)))
            .await
            .unwrap();
        assert_eq!(stored, Some(listing));
    }

    #[tokio::test]
    async fn rejects_incomplete_draft() {
        let err = service()
            .execute(PublishListing {
                draft: Draft {
                    storage_path: None,
                    ..draft()
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::IncompleteDraft(IncompleteDraft::Images),
        ));
    }
}
