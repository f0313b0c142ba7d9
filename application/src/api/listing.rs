//! [`Listing`]-related definitions.

use std::num::TryFromIntError;

use common::{Amount, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar};
use service::{domain, read::listing::search};
use uuid::Uuid;

use crate::{api::scalar, define_error, Context};

/// A published property listing.
#[derive(Clone, Debug, From)]
pub struct Listing(domain::Listing);

/// A published property listing.
#[graphql_object(context = Context)]
impl Listing {
    /// Unique identifier of this `Listing`.
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Title of this `Listing`, if any.
    pub fn title(&self) -> Option<Title> {
        self.0.title.clone().map(Into::into)
    }

    /// Description of this `Listing`.
    pub fn description(&self) -> Description {
        self.0.description.clone().into()
    }

    /// Category of the listed property.
    pub fn category(&self) -> Category {
        self.0.category.into()
    }

    /// Purpose of this `Listing`.
    pub fn purpose(&self) -> Purpose {
        self.0.purpose.into()
    }

    /// Location of the listed property.
    pub fn location(&self) -> Location {
        self.0.location.clone().into()
    }

    /// Asked price.
    pub fn price(&self) -> Money {
        self.0.price
    }

    /// Size of the listed property, in square meters.
    pub fn property_size(&self) -> Amount {
        self.0.property_size
    }

    /// Number of bedrooms.
    pub fn bedrooms(&self) -> i32 {
        self.0.bedrooms.into()
    }

    /// Number of bathrooms.
    pub fn bathrooms(&self) -> i32 {
        self.0.bathrooms.into()
    }

    /// Amenities of the listed property.
    pub fn amenities(&self) -> Vec<Amenity> {
        self.0.amenities.iter().cloned().map(Into::into).collect()
    }

    /// Path of the folder the images of this `Listing` are stored in.
    pub fn storage_path(&self) -> Option<StoragePath> {
        self.0.storage_path.clone().map(Into::into)
    }

    /// Download URL of the cover image of this `Listing`.
    ///
    /// `null` if there are no images, or the cover image cannot be resolved.
    pub fn cover_image_url(&self) -> Option<String> {
        self.0.cover_image.as_ref().map(ToString::to_string)
    }

    /// `DateTime` when this `Listing` was published.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Listing`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::listing::Id)]
#[into(domain::listing::Id)]
#[graphql(name = "ListingId", transparent)]
pub struct Id(Uuid);

/// Title of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingTitle",
    with = scalar::Via::<domain::listing::Title>,
)]
pub struct Title(domain::listing::Title);

/// Description of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingDescription",
    with = scalar::Via::<domain::listing::Description>,
)]
pub struct Description(domain::listing::Description);

/// Location of a `Listing`, a city or a district usually.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingLocation",
    with = scalar::Via::<domain::listing::Location>,
)]
pub struct Location(domain::listing::Location);

/// Amenity of a listed property.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingAmenity",
    with = scalar::Via::<domain::listing::Amenity>,
)]
pub struct Amenity(domain::listing::Amenity);

/// Path of a folder in the object storage holding the images of a `Listing`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ListingStoragePath",
    with = scalar::Via::<domain::listing::StoragePath>,
)]
pub struct StoragePath(domain::listing::StoragePath);

/// Category of a listed property.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ListingCategory")]
pub enum Category {
    /// An apartment in a building.
    Apartment,

    /// A townhouse.
    Townhouse,

    /// A detached villa.
    Villa,

    /// A commercial property.
    Commercial,
}

impl From<domain::listing::Category> for Category {
    fn from(category: domain::listing::Category) -> Self {
        use domain::listing::Category as C;
        match category {
            C::Apartment => Self::Apartment,
            C::Townhouse => Self::Townhouse,
            C::Villa => Self::Villa,
            C::Commercial => Self::Commercial,
        }
    }
}

impl From<Category> for domain::listing::Category {
    fn from(category: Category) -> Self {
        match category {
            Category::Apartment => Self::Apartment,
            Category::Townhouse => Self::Townhouse,
            Category::Villa => Self::Villa,
            Category::Commercial => Self::Commercial,
        }
    }
}

/// Purpose of a `Listing`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ListingPurpose")]
pub enum Purpose {
    /// The property is offered for rent.
    ForRent,

    /// The property is offered for sale.
    ForSale,
}

impl From<domain::listing::Purpose> for Purpose {
    fn from(purpose: domain::listing::Purpose) -> Self {
        use domain::listing::Purpose as P;
        match purpose {
            P::ForRent => Self::ForRent,
            P::ForSale => Self::ForSale,
        }
    }
}

impl From<Purpose> for domain::listing::Purpose {
    fn from(purpose: Purpose) -> Self {
        match purpose {
            Purpose::ForRent => Self::ForRent,
            Purpose::ForSale => Self::ForSale,
        }
    }
}

/// Currency of a `Listing` price.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ListingCurrency")]
pub enum Currency {
    /// US Dollar.
    Usd,

    /// Vietnamese Dong.
    Vnd,
}

impl From<Currency> for common::Currency {
    fn from(currency: Currency) -> Self {
        match currency {
            Currency::Usd => Self::Usd,
            Currency::Vnd => Self::Vnd,
        }
    }
}

/// Ordering of `Listing` search results.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ListingOrderBy")]
pub enum OrderBy {
    /// Cheapest first.
    MostAffordable,

    /// Newest first.
    MostRecent,
}

impl From<OrderBy> for search::OrderBy {
    fn from(order_by: OrderBy) -> Self {
        match order_by {
            OrderBy::MostAffordable => Self::MostAffordable,
            OrderBy::MostRecent => Self::MostRecent,
        }
    }
}

/// Criteria of a `Listing` search.
///
/// Every omitted field imposes no constraint.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
#[graphql(name = "ListingSearchCriteria")]
pub struct Criteria {
    /// Purpose to search for. `FOR_RENT` when omitted.
    pub purpose: Option<Purpose>,

    /// Category to search for.
    pub category: Option<Category>,

    /// Location to search for. Surrounding whitespace is ignored.
    pub location: Option<String>,

    /// Property size range: `_050to100`, `_100to200`, `_200to300`,
    /// `_300to400` or `_400plus`. Unknown values impose no constraint.
    pub property_size: Option<String>,

    /// Minimal price, inclusive.
    pub min_price: Option<Amount>,

    /// Maximal price, inclusive. Zero means no upper bound.
    pub max_price: Option<Amount>,

    /// Number of bedrooms, or `3+` for more than three. Blank imposes no
    /// constraint.
    pub bedrooms: Option<String>,

    /// Number of bathrooms, or `3+` for more than three. Blank imposes no
    /// constraint.
    pub bathrooms: Option<String>,

    /// Ordering of the results.
    pub order_by: Option<OrderBy>,
}

impl TryFrom<Criteria> for search::Criteria {
    type Error = search::InvalidRooms;

    fn try_from(criteria: Criteria) -> Result<Self, Self::Error> {
        let Criteria {
            purpose,
            category,
            location,
            property_size,
            min_price,
            max_price,
            bedrooms,
            bathrooms,
            order_by,
        } = criteria;

        Ok(Self {
            purpose: purpose.map(Into::into),
            category: category.map(Into::into),
            location,
            property_size: property_size
                .as_deref()
                .and_then(search::SizeBucket::parse_lenient),
            min_price,
            max_price,
            bedrooms: bedrooms
                .as_deref()
                .map_or(Ok(None), search::Rooms::parse_filter)?,
            bathrooms: bathrooms
                .as_deref()
                .map_or(Ok(None), search::Rooms::parse_filter)?,
            order_by: order_by.map(Into::into),
        })
    }
}

/// Data of a `Listing` to publish.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "ListingDraft")]
pub struct Draft {
    /// Title of the `Listing`.
    pub title: Option<Title>,

    /// Description of the `Listing`. Required.
    pub description: Option<Description>,

    /// Category of the listed property. Required.
    pub category: Option<Category>,

    /// Purpose of the `Listing`. Required.
    pub purpose: Option<Purpose>,

    /// Location of the listed property. Required.
    pub location: Option<Location>,

    /// Asked price. Required.
    pub price: Option<Amount>,

    /// Currency of the price.
    ///
    /// `USD` for rent and `VND` for sale when omitted.
    pub currency: Option<Currency>,

    /// Size of the listed property, in square meters.
    pub property_size: Option<Amount>,

    /// Number of bedrooms. Required.
    pub bedrooms: Option<i32>,

    /// Number of bathrooms. Required.
    pub bathrooms: Option<i32>,

    /// Amenities of the listed property.
    pub amenities: Option<Vec<Amenity>>,

    /// Path of the folder the uploaded images are stored in. Required.
    pub storage_path: Option<StoragePath>,
}

impl TryFrom<Draft> for domain::listing::Draft {
    type Error = TryFromIntError;

    fn try_from(draft: Draft) -> Result<Self, Self::Error> {
        let Draft {
            title,
            description,
            category,
            purpose,
            location,
            price,
            currency,
            property_size,
            bedrooms,
            bathrooms,
            amenities,
            storage_path,
        } = draft;

        Ok(Self {
            title: title.map(Into::into),
            description: description.map(Into::into),
            category: category.map(Into::into),
            purpose: purpose.map(Into::into),
            location: location.map(Into::into),
            price,
            currency: currency.map(Into::into),
            property_size,
            bedrooms: bedrooms.map(TryInto::try_into).transpose()?,
            bathrooms: bathrooms.map(TryInto::try_into).transpose()?,
            amenities: amenities
                .into_iter()
                .flatten()
                .map(Into::into)
                .collect(),
            storage_path: storage_path.map(Into::into),
        })
    }
}

define_error! {
    enum ListingError {
        #[code = "LISTING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Listing` with the specified ID does not exist"]
        NotExists,

        #[code = "INVALID_LISTING"]
        #[status = BAD_REQUEST]
        #[message = "`ListingDraft` misses required fields"]
        Invalid,
    }
}

pub mod list {
    //! Definitions related to the [`Listing`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::read::listing::{list, search::Refined};

    use super::{Id, Listing};
    use crate::{api::scalar, Context};

    /// Cursor for the `Listing` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, list::Cursor)]
    #[graphql(
        name = "ListingListCursor",
        with = scalar::Via::<list::Cursor>,
    )]
    pub struct Cursor(pub list::Cursor);

    /// Edge in the [`Listing`] list.
    #[derive(Clone, Debug)]
    pub struct Edge {
        /// Cursor of this [`Edge`].
        cursor: Cursor,

        /// Node of this [`Edge`].
        node: Listing,
    }

    /// Edge in the `Listing` list.
    #[graphql_object(name = "ListingListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `ListingListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.cursor
        }

        /// Node of this `ListingListEdge`.
        #[must_use]
        pub fn node(&self) -> &Listing {
            &self.node
        }
    }

    /// Connection of the [`Listing`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct Connection(Refined);

    /// Connection of the `Listing` list.
    #[graphql_object(name = "ListingListConnection", context = Context)]
    impl Connection {
        /// Edges of this `ListingListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.0
                .listings
                .iter()
                .map(|l| Edge {
                    cursor: l.id.into(),
                    node: l.clone().into(),
                })
                .collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                end_cursor: self.0.cursor.map(Into::into),
                has_next_page: self.0.has_more,
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Cursor to continue the list after.
        end_cursor: Option<Cursor>,

        /// Indicator whether there is a next page.
        has_next_page: bool,
    }

    /// Information about a `ListingListConnection` page.
    #[graphql_object(name = "ListingListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.has_next_page
        }

        /// Cursor to continue the list after.
        ///
        /// May point past the last edge, as listings not matching the search
        /// criteria are skipped while still being paginated over.
        #[must_use]
        pub fn end_cursor(&self) -> &Option<Cursor> {
            &self.end_cursor
        }
    }
}
