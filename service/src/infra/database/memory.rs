//! In-memory [`Database`] implementation.

use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
    sync::{
        atomic::{self, AtomicBool},
        Arc,
    },
};

use common::operations::{By, Insert, Select, Update};
use derive_more::{Display, Error as StdError};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{listing, Listing},
    infra::{database, Database},
    read::listing::{list, location},
};

/// In-memory [`Database`] of [`Listing`]s.
///
/// Orders and paginates [`Listing`]s the same way [`Postgres`] does.
///
/// [`Postgres`]: super::Postgres
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored [`Listing`]s.
    listings: Arc<RwLock<HashMap<listing::Id, Listing>>>,

    /// Indicator whether this [`Memory`] simulates an outage.
    unavailable: Arc<AtomicBool>,
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following operation fail with [`Error::Unavailable`] until
    /// switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable
            .store(unavailable, atomic::Ordering::Release);
    }

    /// Fails if this [`Memory`] simulates an outage.
    fn check(&self) -> Result<(), Traced<database::Error>> {
        if self.unavailable.load(atomic::Ordering::Acquire) {
            return Err(tracerr::new!(database::Error::from(Error::Unavailable)));
        }
        Ok(())
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Memory`] database simulates an outage.
    #[display("`Memory` database is unavailable")]
    Unavailable,
}

/// Compares two [`Listing`]s in the provided [`list::Sort`] order.
fn compare(sort: Option<list::Sort>, a: &Listing, b: &Listing) -> Ordering {
    match sort {
        None => a.id.cmp(&b.id),
        Some(list::Sort::PriceAscending) => a
            .price
            .amount
            .cmp(&b.price.amount)
            .then_with(|| a.id.cmp(&b.id)),
        Some(list::Sort::CreatedDescending) => b
            .created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id)),
    }
}

impl Database<Select<By<list::Page, list::Selector>>> for Memory {
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Page, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check().map_err(tracerr::wrap!())?;

        let list::Selector {
            arguments,
            filter,
            order,
        } = by.into_inner();

        let listings = self.listings.read().await;

        let after = match arguments.cursor() {
            None => None,
            Some(id) => match listings.get(id) {
                Some(l) => Some(l),
                // Nothing can follow a vanished cursor.
                None => return Ok(list::Page::empty()),
            },
        };

        let mut selected = listings
            .values()
            .filter(|l| filter.matches(l))
            .filter(|l| {
                after.map_or(true, |a| {
                    compare(order, l, a) == Ordering::Greater
                })
            })
            .collect::<Vec<_>>();
        selected.sort_by(|a, b| compare(order, a, b));

        let has_more = selected.len() > arguments.limit();
        Ok(list::Page::new(
            selected
                .into_iter()
                .take(arguments.limit())
                .map(|l| (l.id, l.clone())),
            has_more,
        ))
    }
}

impl Database<Select<By<Option<Listing>, listing::Id>>> for Memory {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check().map_err(tracerr::wrap!())?;

        Ok(self.listings.read().await.get(by.inner()).cloned())
    }
}

impl Database<Select<By<Vec<listing::Location>, location::Known>>> for Memory {
    type Ok = Vec<listing::Location>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<listing::Location>, location::Known>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check().map_err(tracerr::wrap!())?;

        Ok(self
            .listings
            .read()
            .await
            .values()
            .map(|l| l.location.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect())
    }
}

impl Database<Insert<Listing>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(listing))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Update<Listing>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(mut listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.check().map_err(tracerr::wrap!())?;

        listing.cover_image = None;
        drop(self.listings.write().await.insert(listing.id, listing));
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use std::{collections::BTreeSet, time::Duration};

    use common::{
        operations::{By, Insert, Select},
        pagination::Arguments,
        Currency, DateTime, Money,
    };

    use crate::{
        domain::{
            listing::{self, Category, Description, Location, Purpose},
            Listing,
        },
        infra::Database as _,
        read::listing::{list, location},
    };

    use super::Memory;

    fn located(location: &str) -> Listing {
        Listing {
            location: Location::new(location).unwrap(),
            ..listing(Purpose::ForRent, 100, 1)
        }
    }

    fn listing(purpose: Purpose, price: u32, age_secs: u64) -> Listing {
        let now = DateTime::from_unix_timestamp(1_700_000_000).unwrap();
        Listing {
            id: listing::Id::new(),
            title: None,
            description: Description::new("Nice place").unwrap(),
            category: Category::Apartment,
            purpose,
            location: Location::new("Da Nang").unwrap(),
            price: Money {
                amount: price.into(),
                currency: Currency::Usd,
            },
            property_size: 100.into(),
            bedrooms: 1,
            bathrooms: 1,
            amenities: BTreeSet::new(),
            storage_path: None,
            cover_image: None,
            created_at: (now + Duration::from_secs(1_000 - age_secs)).coerce(),
        }
    }

    async fn seeded(listings: &[Listing]) -> Memory {
        let db = Memory::new();
        for l in listings {
            db.execute(Insert(l.clone())).await.unwrap();
        }
        db
    }

    fn selector(
        first: usize,
        after: Option<listing::Id>,
        order: Option<list::Sort>,
    ) -> list::Selector {
        list::Selector {
            arguments: Arguments { first, after },
            filter: list::Filter::default(),
            order,
        }
    }

    async fn select(db: &Memory, selector: list::Selector) -> list::Page {
        db.execute(Select(By::new(selector))).await.unwrap()
    }

    fn ids(page: &list::Page) -> Vec<listing::Id> {
        page.edges.iter().map(|e| e.cursor).collect()
    }

    #[tokio::test]
    async fn filters_by_purpose() {
        let rent = listing(Purpose::ForRent, 100, 1);
        let sale = listing(Purpose::ForSale, 100, 1);
        let db = seeded(&[rent.clone(), sale]).await;

        let page = select(
            &db,
            list::Selector {
                filter: list::Filter {
                    purpose: Some(Purpose::ForRent),
                    ..list::Filter::default()
                },
                ..selector(10, None, None)
            },
        )
        .await;
        assert_eq!(ids(&page), vec![rent.id]);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn unconstrained_filter_selects_every_purpose() {
        let rent = listing(Purpose::ForRent, 100, 500);
        let sale = listing(Purpose::ForSale, 100, 5);
        let db = seeded(&[rent.clone(), sale.clone()]).await;

        let page =
            select(&db, selector(10, None, Some(list::Sort::CreatedDescending)))
                .await;
        assert_eq!(ids(&page), vec![sale.id, rent.id]);
    }

    #[tokio::test]
    async fn filters_by_exact_location_text() {
        let db = seeded(&[located("Da Nang")]).await;
        let by_location = |location: String| list::Selector {
            filter: list::Filter {
                location: Some(location),
                ..list::Filter::default()
            },
            ..selector(10, None, None)
        };

        let page = select(&db, by_location("Da Nang".into())).await;
        assert_eq!(page.edges.len(), 1);

        let page = select(&db, by_location("X".repeat(600))).await;
        assert!(page.edges.is_empty());
    }

    #[tokio::test]
    async fn lists_distinct_known_locations() {
        let db = seeded(&[
            located("Hue"),
            located("Da Nang"),
            located("Hue"),
        ])
        .await;

        let known = db
            .execute(Select(By::<Vec<Location>, _>::new(location::Known)))
            .await
            .unwrap();
        assert_eq!(
            known,
            vec![Location::new("Da Nang").unwrap(), Location::new("Hue").unwrap()],
        );
    }

    #[tokio::test]
    async fn paginates_by_price_after_cursor() {
        let listings = [
            listing(Purpose::ForRent, 300, 1),
            listing(Purpose::ForRent, 100, 1),
            listing(Purpose::ForRent, 200, 1),
        ];
        let db = seeded(&listings).await;
        let order = Some(list::Sort::PriceAscending);

        let first = select(&db, selector(2, None, order)).await;
        assert_eq!(ids(&first), vec![listings[1].id, listings[2].id]);
        assert!(first.has_more);

        let after = first.end_cursor().copied();
        let second = select(&db, selector(2, after, order)).await;
        assert_eq!(ids(&second), vec![listings[0].id]);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn orders_most_recent_first() {
        let old = listing(Purpose::ForRent, 100, 500);
        let new = listing(Purpose::ForRent, 100, 5);
        let db = seeded(&[old.clone(), new.clone()]).await;

        let page =
            select(&db, selector(10, None, Some(list::Sort::CreatedDescending)))
                .await;
        assert_eq!(ids(&page), vec![new.id, old.id]);
    }

    #[tokio::test]
    async fn fails_when_unavailable() {
        let db = seeded(&[listing(Purpose::ForRent, 100, 1)]).await;
        db.set_unavailable(true);
        assert!(db
            .execute(Select(By::new(selector(10, None, None))))
            .await
            .is_err());

        db.set_unavailable(false);
        assert_eq!(select(&db, selector(10, None, None)).await.edges.len(), 1);
    }
}
