//! [`Command`] for editing an existing [`Listing`].

use common::operations::{By, Select, Update};
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

/// [`Command`] for replacing the contents of an existing [`Listing`] with a
/// [`Draft`].
///
/// The [`listing::Id`] and creation time of the [`Listing`] are preserved.
#[derive(Clone, Debug)]
pub struct EditListing {
    /// ID of the [`Listing`] to edit.
    pub id: listing::Id,

    /// New contents of the [`Listing`].
    pub draft: Draft,
}

impl<Db, St> Command<EditListing> for Service<Db, St>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Update<Listing>, Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: EditListing) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let EditListing { id, draft } = cmd;

        let existing = self
            .database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(id))
            .map_err(tracerr::wrap!())?;

        let listing = draft
            .into_listing(existing.id, existing.created_at)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        self.database()
            .execute(Update(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Listing(id: {id})` edited");
        Ok(listing)
    }
}

/// Error of [`EditListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Draft`] lacks required fields.
    #[display("Incomplete `Draft`: {_0}")]
    IncompleteDraft(IncompleteDraft),

    /// [`Listing`] with the provided [`listing::Id`] does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeSet;

    use common::{
        operations::{By, Select},
        Currency,
    };

    use crate::{
        command::PublishListing,
        domain::listing::{
            self, Category, Description, Draft, Location, Purpose, StoragePath,
        },
        infra::{Database as _, Firebase, Memory},
        Command as _, Config, Service,
    };

    use super::{EditListing, ExecutionError};

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
            description: Description::new("Close to the river"),
            category: Some(Category::Apartment),
            purpose: Some(Purpose::ForRent),
            location: Location::new("Ho Chi Minh City"),
            price: Some(800.into()),
            currency: None,
            property_size: Some(75.into()),
            bedrooms: Some(2),
            bathrooms: Some(1),
            amenities: BTreeSet::new(),
            storage_path: StoragePath::new("listings/hcmc-flat"),
        }
    }

    #[tokio::test]
    async fn keeps_id_and_creation_time() {
        let svc = service();
        let published = svc
            .execute(PublishListing { draft: draft() })
            .await
            .unwrap();

        let edited = svc
            .execute(EditListing {
                id: published.id,
                draft: Draft {
                    purpose: Some(Purpose::ForSale),
                    price: Some(3_000_000_000_u32.into()),
                    ..draft()
                },
            })
            .await
            .unwrap();
        assert_eq!(edited.id, published.id);
        assert_eq!(edited.created_at, published.created_at);
        assert_eq!(edited.price.currency, Currency::Vnd);

        let stored = svc
            .database()
            .execute(Select(By::new(published.id)))
            .await
            .unwrap();
        assert_eq!(stored, Some(edited));
    }

    #[tokio::test]
    async fn fails_for_unknown_listing() {
        let id = listing::Id::new();
        let err = service()
            .execute(EditListing { id, draft: draft() })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::ListingNotExists(missing) if *missing == id,
        ));
    }
}
