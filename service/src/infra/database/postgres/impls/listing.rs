//! [`Listing`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select, Update},
    pagination::Order,
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        listing::{self, NumRooms},
        Listing,
    },
    infra::{
        database::{self, postgres, Postgres},
        Database,
    },
    read::listing::{list, location},
};

/// Columns of the `listings` table selected into a [`Listing`].
const COLUMNS: &str = "\
    id, title, description, category, purpose, location, \
    price, currency, property_size, bedrooms, bathrooms, \
    amenities, storage_path, created_at";

/// Decodes a number of rooms stored as `INT4`.
fn num_rooms(stored: i32) -> Result<NumRooms, postgres::Error> {
    NumRooms::try_from(stored).map_err(Into::into)
}

/// Builds a [`Listing`] out of the provided [`Row`] selected with [`COLUMNS`].
///
/// # Errors
///
/// If the [`Row`] holds a number of rooms out of [`NumRooms`] range.
fn listing_from_row(row: &Row) -> Result<Listing, postgres::Error> {
    Ok(Listing {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        category: row.get("category"),
        purpose: row.get("purpose"),
        location: row.get("location"),
        price: Money {
            amount: row.get("price"),
            currency: row.get("currency"),
        },
        property_size: row.get("property_size"),
        bedrooms: num_rooms(row.get("bedrooms"))?,
        bathrooms: num_rooms(row.get("bathrooms"))?,
        amenities: row
            .get::<_, Vec<listing::Amenity>>("amenities")
            .into_iter()
            .collect(),
        storage_path: row.get("storage_path"),
        cover_image: None,
        created_at: row.get("created_at"),
    })
}

/// Returns the keyset columns and their [`Order`] for the provided
/// [`list::Sort`].
const fn keyset(sort: Option<list::Sort>) -> (&'static str, Order) {
    match sort {
        None => ("id", Order::Ascending),
        Some(list::Sort::PriceAscending) => ("price, id", Order::Ascending),
        Some(list::Sort::CreatedDescending) => {
            ("created_at, id", Order::Descending)
        }
    }
}

impl Database<Select<By<list::Page, list::Selector>>> for Postgres {
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Page, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector {
            arguments,
            filter:
                list::Filter {
                    purpose,
                    location,
                    category,
                },
            order,
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit())
            .unwrap_or(i32::MAX - 1)
            .saturating_add(1);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let purpose_idx = purpose.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let location_idx = location.as_ref().map(|l| {
            ps.push(l);
            ps.len()
        });
        let category_idx = category.as_ref().map(|c| {
            ps.push(c);
            ps.len()
        });
        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });

        let (keys, direction) = keyset(order);
        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             WHERE TRUE \
                   {purpose_filtering} \
                   {location_filtering} \
                   {category_filtering} \
                   {cursor} \
             ORDER BY {ordering} \
             LIMIT $1::INT4",
            purpose_filtering =
                purpose_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND purpose = ${idx}::INT2"))
                }),
            location_filtering =
                location_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND location = ${idx}::VARCHAR"))
                }),
            category_filtering =
                category_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND category = ${idx}::INT2"))
                }),
            // Vanished cursor row yields `NULL` comparison, selecting nothing.
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = direction.operator();
                f(&format_args!(
                    "AND ({keys}) {op} (SELECT {keys} \
                                        FROM listings \
                                        WHERE id = ${idx}::UUID)"
                ))
            }),
            ordering = keys
                .split(", ")
                .format_with(", ", |key, f| {
                    f(&format_args!("{key} {}", direction.sql()))
                }),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let listings = rows
            .iter()
            .take(arguments.limit())
            .map(listing_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        Ok(list::Page::new(
            listings.into_iter().map(|l| (l.id, l)),
            has_more,
        ))
    }
}

impl Database<Select<By<Option<Listing>, listing::Id>>> for Postgres {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM listings \
             WHERE id = $1::UUID \
             LIMIT 1"
        );
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(listing_from_row)
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}

impl Database<Select<By<Vec<listing::Location>, location::Known>>>
    for Postgres
{
    type Ok = Vec<listing::Location>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<listing::Location>, location::Known>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT DISTINCT location \
            FROM listings \
            ORDER BY location";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| row.get("location"))
            .collect())
    }
}

impl Database<Insert<Listing>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(listing)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Listing>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        let Listing {
            id,
            title,
            description,
            category,
            purpose,
            location,
            price: Money { amount, currency },
            property_size,
            bedrooms,
            bathrooms,
            amenities,
            storage_path,
            // Resolved on every read, so never persisted.
            cover_image: _,
            created_at,
        } = listing;

        let bedrooms = i32::from(bedrooms);
        let bathrooms = i32::from(bathrooms);
        let amenities = amenities.into_iter().collect::<Vec<_>>();

        const SQL: &str = "\
            INSERT INTO listings (\
                id, title, description, \
                category, purpose, location, \
                price, currency, property_size, \
                bedrooms, bathrooms, \
                amenities, storage_path, \
                created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, \
                $4::INT2, $5::INT2, $6::VARCHAR, \
                $7::NUMERIC, $8::INT2, $9::NUMERIC, \
                $10::INT4, $11::INT4, \
                $12::VARCHAR[], $13::VARCHAR, \
                $14::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                category = EXCLUDED.category, \
                purpose = EXCLUDED.purpose, \
                location = EXCLUDED.location, \
                price = EXCLUDED.price, \
                currency = EXCLUDED.currency, \
                property_size = EXCLUDED.property_size, \
                bedrooms = EXCLUDED.bedrooms, \
                bathrooms = EXCLUDED.bathrooms, \
                amenities = EXCLUDED.amenities, \
                storage_path = EXCLUDED.storage_path";
        self.exec(
            SQL,
            &[
                &id,
                &title,
                &description,
                &category,
                &purpose,
                &location,
                &amount,
                &currency,
                &property_size,
                &bedrooms,
                &bathrooms,
                &amenities,
                &storage_path,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
