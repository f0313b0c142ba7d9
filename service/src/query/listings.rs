//! [`Query`] collection related to multiple [`Listing`]s.

use common::operations::{By, Select};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::search::Flow;
use crate::{
    domain::{
        listing::{CoverImage, StoragePath},
        Listing,
    },
    infra::{database, storage, Database, Storage},
    read::listing::{
        list,
        search::{Criteria, Refined},
    },
    search::{self, Ticket},
    Service,
};

use super::Query;

/// Queries a single [`Refined`] page of [`Listing`]s matching the provided
/// [`Criteria`], without publishing it.
#[derive(Clone, Debug)]
pub struct Paginate {
    /// [`Criteria`] to match [`Listing`]s against.
    pub criteria: Criteria,

    /// [`list::Arguments`] of the page.
    pub arguments: list::Arguments,
}

/// Queries a page of all the [`Listing`]s, newest first, whatever their
/// [`Purpose`] is.
///
/// [`Purpose`]: crate::domain::listing::Purpose
#[derive(Clone, Copy, Debug)]
pub struct Latest {
    /// [`list::Arguments`] of the page.
    pub arguments: list::Arguments,
}

/// Starts a new search of [`Listing`]s matching the provided [`Criteria`].
///
/// The first [`Refined`] page replaces the results published by the
/// [`Flow`], and the pagination cursor is reset to this page.
#[derive(Clone, Debug)]
pub struct Search {
    /// [`Criteria`] of the new search.
    pub criteria: Criteria,
}

/// Continues the current search from its pagination cursor.
///
/// The next [`Refined`] page is appended to the results published by the
/// [`Flow`]. Once the storage has no more [`Listing`]s to offer, an empty page
/// is returned without querying it.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchMore;

impl<Db, St> Service<Db, St>
where
    Db: Database<
        Select<By<list::Page, list::Selector>>,
        Ok = list::Page,
        Err = Traced<database::Error>,
    >,
    St: Storage<
        Select<By<CoverImage, StoragePath>>,
        Ok = CoverImage,
        Err = Traced<storage::Error>,
    >,
{
    /// Fetches and refines a single page of [`Listing`]s.
    async fn fetch(
        &self,
        criteria: &Criteria,
        arguments: list::Arguments,
    ) -> Result<Refined, Traced<database::Error>> {
        let selector = search::build(criteria, arguments.first, arguments.after);
        let page = self
            .database()
            .execute(Select(By::new(selector)))
            .await
            .map_err(tracerr::wrap!())?;

        let mut refined = search::refine(&page, criteria);
        self.resolve_cover_images(&mut refined.listings).await;
        Ok(refined)
    }

    /// Fetches the page permitted by the provided [`Ticket`], tracking the
    /// progress and publishing the results in the [`Flow`].
    async fn fetch_published(
        &self,
        ticket: Ticket,
    ) -> Result<Refined, Traced<database::Error>> {
        let flow = self.search();
        let _fetching = flow.fetching();

        let arguments = list::Arguments {
            first: self.config().page_size,
            after: ticket.after(),
        };
        let mut refined = self
            .fetch(ticket.criteria(), arguments)
            .await
            .map_err(tracerr::wrap!())?;
        if refined.cursor.is_none() {
            refined.cursor = ticket.after();
        }

        _ = flow.publish(ticket, &refined).await;
        Ok(refined)
    }
}

impl<Db, St> Query<Paginate> for Service<Db, St>
where
    Db: Database<
        Select<By<list::Page, list::Selector>>,
        Ok = list::Page,
        Err = Traced<database::Error>,
    >,
    St: Storage<
        Select<By<CoverImage, StoragePath>>,
        Ok = CoverImage,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Refined;
    type Err = Traced<database::Error>;

    async fn execute(&self, query: Paginate) -> Result<Self::Ok, Self::Err> {
        let Paginate {
            criteria,
            arguments,
        } = query;

        self.fetch(&criteria, arguments)
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<Db, St> Query<Latest> for Service<Db, St>
where
    Db: Database<
        Select<By<list::Page, list::Selector>>,
        Ok = list::Page,
        Err = Traced<database::Error>,
    >,
    St: Storage<
        Select<By<CoverImage, StoragePath>>,
        Ok = CoverImage,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Refined;
    type Err = Traced<database::Error>;

    async fn execute(&self, query: Latest) -> Result<Self::Ok, Self::Err> {
        let Latest { arguments } = query;

        let page = self
            .database()
            .execute(Select(By::new(list::Selector {
                arguments,
                filter: list::Filter::default(),
                order: Some(list::Sort::CreatedDescending),
            })))
            .await
            .map_err(tracerr::wrap!())?;

        let cursor = page.end_cursor().copied();
        let mut listings =
            page.edges.into_iter().map(|e| e.node).collect::<Vec<_>>();
        self.resolve_cover_images(&mut listings).await;
        Ok(Refined {
            listings,
            cursor,
            has_more: page.has_more,
        })
    }
}

impl<Db, St> Query<Search> for Service<Db, St>
where
    Db: Database<
        Select<By<list::Page, list::Selector>>,
        Ok = list::Page,
        Err = Traced<database::Error>,
    >,
    St: Storage<
        Select<By<CoverImage, StoragePath>>,
        Ok = CoverImage,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Refined;
    type Err = Traced<database::Error>;

    async fn execute(&self, query: Search) -> Result<Self::Ok, Self::Err> {
        let Search { criteria } = query;

        log::info!("searching listings: {criteria:?}");
        let ticket = self.search().begin(criteria);
        self.fetch_published(ticket)
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<Db, St> Query<SearchMore> for Service<Db, St>
where
    Db: Database<
        Select<By<list::Page, list::Selector>>,
        Ok = list::Page,
        Err = Traced<database::Error>,
    >,
    St: Storage<
        Select<By<CoverImage, StoragePath>>,
        Ok = CoverImage,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Refined;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: SearchMore) -> Result<Self::Ok, Self::Err> {
        let Some(ticket) = self.search().resume().await else {
            return Ok(Refined {
                listings: Vec::new(),
                cursor: self.search().cursor().await,
                has_more: false,
            });
        };

        self.fetch_published(ticket)
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use std::{collections::BTreeSet, time::Duration};

    use common::{operations::Insert, pagination::Arguments, Currency, DateTime, Money};

    use crate::{
        domain::{
            listing::{self, Category, Description, Location, Purpose},
            Listing,
        },
        infra::{Database as _, Firebase, Memory},
        read::listing::search::{Criteria, OrderBy, Rooms, SizeBucket},
        Config, Query as _, Service,
    };

    use super::{Latest, Paginate, Search, SearchMore};

    fn service(page_size: usize) -> Service<Memory, Firebase> {
        Service::new(
            Config {
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"s"),
                page_size,
            },
            Memory::new(),
            Firebase {
                host: "storage.example.com".into(),
                bucket: "bucket".into(),
                cover_image: "0".into(),
            },
        )
    }

    fn listing(
        price: u32,
        size: u32,
        bedrooms: u16,
        bathrooms: u16,
        age_secs: u64,
    ) -> Listing {
        let now = DateTime::from_unix_timestamp(1_700_000_000).unwrap();
        Listing {
            id: listing::Id::new(),
            title: None,
            description: Description::new("Nice place").unwrap(),
            category: Category::Apartment,
            purpose: Purpose::ForRent,
            location: Location::new("Da Nang").unwrap(),
            price: Money {
                amount: price.into(),
                currency: Currency::Usd,
            },
            property_size: size.into(),
            bedrooms,
            bathrooms,
            amenities: BTreeSet::new(),
            storage_path: None,
            cover_image: None,
            created_at: (now + Duration::from_secs(1_000 - age_secs)).coerce(),
        }
    }

    async fn seed(svc: &Service<Memory, Firebase>, listings: &[Listing]) {
        for l in listings {
            svc.database().execute(Insert(l.clone())).await.unwrap();
        }
    }

    fn ids(listings: &[Listing]) -> Vec<listing::Id> {
        listings.iter().map(|l| l.id).collect()
    }

    fn by_price() -> Criteria {
        Criteria {
            order_by: Some(OrderBy::MostAffordable),
            ..Criteria::default()
        }
    }

    #[tokio::test]
    async fn search_publishes_refined_first_page() {
        let svc = service(6);
        let four_baths = listing(500, 150, 2, 4, 1);
        let two_baths = listing(500, 150, 2, 2, 2);
        seed(&svc, &[four_baths.clone(), two_baths]).await;
        let results = svc.search().results();

        let refined = svc
            .execute(Search {
                criteria: Criteria {
                    purpose: Some(Purpose::ForRent),
                    location: Some("Da Nang".into()),
                    property_size: Some(SizeBucket::From100To200),
                    min_price: Some(0.into()),
                    max_price: Some(0.into()),
                    bedrooms: Some(Rooms::Exact(2)),
                    bathrooms: Some(Rooms::ThreeOrMore),
                    order_by: None,
                    category: None,
                },
            })
            .await
            .unwrap();

        assert_eq!(ids(&refined.listings), vec![four_baths.id]);
        assert_eq!(ids(&results.borrow()), vec![four_baths.id]);
        assert!(!svc.search().is_in_progress());
    }

    #[tokio::test]
    async fn search_more_appends_next_pages() {
        let svc = service(2);
        let listings = [
            listing(100, 60, 1, 1, 1),
            listing(200, 60, 1, 1, 1),
            listing(300, 60, 1, 1, 1),
        ];
        seed(&svc, &listings).await;

        let first = svc.execute(Search { criteria: by_price() }).await.unwrap();
        assert_eq!(ids(&first.listings), ids(&listings[..2]));
        assert_eq!(first.cursor, Some(listings[1].id));
        assert!(first.has_more);

        let second = svc.execute(SearchMore).await.unwrap();
        assert_eq!(ids(&second.listings), ids(&listings[2..]));
        assert_eq!(second.cursor, Some(listings[2].id));
        assert!(!second.has_more);

        assert_eq!(ids(&svc.search().results().borrow()), ids(&listings));
        assert_eq!(svc.search().cursor().await, Some(listings[2].id));
    }

    #[tokio::test]
    async fn cursor_follows_filtered_out_records() {
        let svc = service(2);
        let listings = [
            listing(100, 60, 1, 1, 1),
            listing(200, 500, 1, 1, 1),
            listing(300, 60, 1, 1, 1),
        ];
        seed(&svc, &listings).await;

        let first = svc
            .execute(Search {
                criteria: Criteria {
                    property_size: Some(SizeBucket::From50To100),
                    ..by_price()
                },
            })
            .await
            .unwrap();
        assert_eq!(ids(&first.listings), vec![listings[0].id]);
        assert_eq!(svc.search().cursor().await, Some(listings[1].id));
    }

    #[tokio::test]
    async fn exhausted_search_more_does_not_hit_store() {
        let svc = service(6);
        seed(&svc, &[listing(100, 60, 1, 1, 1)]).await;

        let first = svc.execute(Search { criteria: by_price() }).await.unwrap();
        assert!(!first.has_more);

        svc.database().set_unavailable(true);
        let more = svc.execute(SearchMore).await.unwrap();
        assert!(more.listings.is_empty());
        assert!(!more.has_more);
        assert_eq!(more.cursor, first.cursor);
    }

    #[tokio::test]
    async fn empty_page_keeps_cursor_and_toggles_progress() {
        let svc = service(1);
        let first = listing(100, 60, 1, 1, 1);
        let second = listing(200, 60, 1, 1, 1);
        seed(&svc, &[first.clone(), second.clone()]).await;

        let page = svc.execute(Search { criteria: by_price() }).await.unwrap();
        assert!(page.has_more);
        assert_eq!(page.cursor, Some(first.id));

        // Make the rest of the list not match natively anymore.
        let sold = Listing {
            purpose: Purpose::ForSale,
            ..second
        };
        seed(&svc, &[sold]).await;

        let mut progress = svc.search().in_progress();
        assert!(!*progress.borrow_and_update());

        let more = svc.execute(SearchMore).await.unwrap();
        assert!(more.listings.is_empty());
        assert_eq!(more.cursor, Some(first.id));
        assert!(progress.has_changed().unwrap());
        assert!(!*progress.borrow_and_update());
        assert_eq!(svc.search().cursor().await, Some(first.id));
        assert_eq!(ids(&svc.search().results().borrow()), vec![first.id]);
    }

    #[tokio::test]
    async fn failed_search_keeps_published_state() {
        let svc = service(6);
        let kept = listing(100, 60, 1, 1, 1);
        seed(&svc, &[kept.clone()]).await;

        _ = svc.execute(Search { criteria: by_price() }).await.unwrap();
        let cursor = svc.search().cursor().await;

        svc.database().set_unavailable(true);
        assert!(svc.execute(Search { criteria: by_price() }).await.is_err());
        assert!(!svc.search().is_in_progress());
        assert_eq!(svc.search().cursor().await, cursor);
        assert_eq!(ids(&svc.search().results().borrow()), vec![kept.id]);
    }

    #[tokio::test]
    async fn paginate_does_not_publish() {
        let svc = service(6);
        seed(&svc, &[listing(100, 60, 1, 1, 1)]).await;

        let page = svc
            .execute(Paginate {
                criteria: Criteria::default(),
                arguments: Arguments::new(Some(10), None, 6).unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(page.listings.len(), 1);
        assert!(svc.search().results().borrow().is_empty());
        assert_eq!(svc.search().cursor().await, None);
    }

    #[tokio::test]
    async fn over_long_location_matches_nothing() {
        let svc = service(6);
        seed(&svc, &[listing(100, 60, 1, 1, 1)]).await;

        let refined = svc
            .execute(Search {
                criteria: Criteria {
                    location: Some("X".repeat(600)),
                    ..Criteria::default()
                },
            })
            .await
            .unwrap();
        assert!(refined.listings.is_empty());
        assert!(svc.search().results().borrow().is_empty());
    }

    #[tokio::test]
    async fn latest_lists_every_purpose_newest_first() {
        let svc = service(6);
        let old_rent = listing(100, 60, 1, 1, 500);
        let new_sale = Listing {
            purpose: Purpose::ForSale,
            ..listing(900, 60, 1, 1, 5)
        };
        seed(&svc, &[old_rent.clone(), new_sale.clone()]).await;

        let first = svc
            .execute(Latest {
                arguments: Arguments::new(Some(1), None, 6).unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(ids(&first.listings), vec![new_sale.id]);
        assert!(first.has_more);

        let second = svc
            .execute(Latest {
                arguments: Arguments::new(Some(1), first.cursor, 6).unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(ids(&second.listings), vec![old_rent.id]);
        assert!(!second.has_more);
        assert!(svc.search().results().borrow().is_empty());
    }
}
