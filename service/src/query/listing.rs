//! [`Query`] collection related to a single [`Listing`].

use common::operations::{By, Select};
use derive_more::From;
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, CoverImage, StoragePath},
        Listing,
    },
    infra::{database, storage, Database, Storage},
    Service,
};

use super::Query;

/// Queries a [`Listing`] by its [`listing::Id`], with its cover image
/// resolved.
#[derive(Clone, Copy, Debug, From)]
pub struct ById(pub listing::Id);

impl<Db, St> Query<ById> for Service<Db, St>
where
    Db: Database<
        Select<By<Option<Listing>, listing::Id>>,
        Ok = Option<Listing>,
        Err = Traced<database::Error>,
    >,
    St: Storage<
        Select<By<CoverImage, StoragePath>>,
        Ok = CoverImage,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(&self, ById(id): ById) -> Result<Self::Ok, Self::Err> {
        let Some(listing) = self
            .database()
            .execute(Select(By::new(id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let mut listings = [listing];
        self.resolve_cover_images(&mut listings).await;
        let [listing] = listings;
        Ok(Some(listing))
    }
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeSet;

    use common::{operations::Insert, Currency, DateTime, Money};

    use crate::{
        domain::{
            listing::{self, Category, Description, Location, Purpose, StoragePath},
            Listing,
        },
        infra::{Database as _, Firebase, Memory},
        Config, Query as _, Service,
    };

    use super::ById;

    fn service(host: &str) -> Service<Memory, Firebase> {
        Service::new(
            Config {
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"s"),
                page_size: 6,
            },
            Memory::new(),
            Firebase {
                host: host.into(),
                bucket: "bucket".into(),
                cover_image: "0".into(),
            },
        )
    }

    fn listing() -> Listing {
        Listing {
            id: listing::Id::new(),
            title: None,
            description: Description::new("Nice place").unwrap(),
            category: Category::Villa,
            purpose: Purpose::ForSale,
            location: Location::new("Hoi An").unwrap(),
            price: Money {
                amount: 1_000_000.into(),
                currency: Currency::Vnd,
            },
            property_size: 250.into(),
            bedrooms: 4,
            bathrooms: 3,
            amenities: BTreeSet::new(),
            storage_path: StoragePath::new("listings/villa"),
            cover_image: None,
            created_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn resolves_cover_image() {
        let svc = service("storage.example.com");
        let listing = listing();
        svc.database().execute(Insert(listing.clone())).await.unwrap();

        let found = svc.execute(ById(listing.id)).await.unwrap().unwrap();
        assert_eq!(found.id, listing.id);
        assert_eq!(
            found.cover_image.unwrap().to_string(),
            "https://storage.example.com/v0/b/bucket/o/listings%2Fvilla%2F0\
             ?alt=media",
        );
    }

    #[tokio::test]
    async fn leaves_cover_image_empty_on_storage_failure() {
        let svc = service("bad host");
        let listing = listing();
        svc.database().execute(Insert(listing.clone())).await.unwrap();

        let found = svc.execute(ById(listing.id)).await.unwrap().unwrap();
        assert!(found.cover_image.is_none());
    }

    #[tokio::test]
    async fn returns_none_when_absent() {
        let svc = service("storage.example.com");
        assert!(svc.execute(ById(listing::Id::new())).await.unwrap().is_none());
    }
}
