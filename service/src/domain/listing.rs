//! [`Listing`] definitions.

use std::{collections::BTreeSet, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Amount, Currency, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Property listed for rent or sale.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// [`Title`] of this [`Listing`], if any.
    pub title: Option<Title>,

    /// [`Description`] of this [`Listing`].
    pub description: Description,

    /// [`Category`] of the listed property.
    pub category: Category,

    /// [`Purpose`] of this [`Listing`].
    pub purpose: Purpose,

    /// [`Location`] of the listed property.
    pub location: Location,

    /// Asked price.
    pub price: Money,

    /// [`PropertySize`] of the listed property.
    pub property_size: PropertySize,

    /// Number of bedrooms.
    pub bedrooms: NumRooms,

    /// Number of bathrooms.
    pub bathrooms: NumRooms,

    /// [`Amenity`]s of the listed property.
    pub amenities: BTreeSet<Amenity>,

    /// [`StoragePath`] of the folder holding images of this [`Listing`].
    pub storage_path: Option<StoragePath>,

    /// Download URL of the cover image, once resolved.
    ///
    /// Never persisted: resolved from the [`StoragePath`] on every read.
    pub cover_image: Option<CoverImage>,

    /// [`DateTime`] when this [`Listing`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Listing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Defines a trimmed, non-empty, length-limited text value.
macro_rules! define_text {
    ($(#[doc = $doc:literal])* $name:ident, max = $max:literal) => {
        $(#[doc = $doc])*
        #[derive(
            AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
        )]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent),
        )]
        #[as_ref(forward)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!(
                "Creates a new [`", stringify!($name),
                "`] if the given `value` is valid.",
            )]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                Self::check(&value).then_some(Self(value))
            }

            /// Checks whether the given `value` is trimmed, non-empty and
            /// short enough.
            fn check(value: impl AsRef<str>) -> bool {
                let value = value.as_ref();
                value.trim() == value
                    && !value.is_empty()
                    && value.chars().count() <= $max
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

define_text! {
    /// Title of a [`Listing`].
    Title, max = 512
}

define_text! {
    /// Free-text description of a [`Listing`].
    Description, max = 8192
}

define_text! {
    /// Free-text location of a [`Listing`] (a city or a district, usually).
    Location, max = 512
}

define_text! {
    /// Amenity of a listed property (`Pool`, `Parking`, etc.).
    Amenity, max = 128
}

/// Path of a folder in an object storage, relative to its bucket root.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[as_ref(forward)]
pub struct StoragePath(String);

impl StoragePath {
    /// Creates a new [`StoragePath`] if the given `path` is valid.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        Self::check(&path).then_some(Self(path))
    }

    /// Returns a path of the `file` inside this [`StoragePath`] folder.
    #[must_use]
    pub fn join(&self, file: &str) -> String {
        format!("{}/{file}", self.0)
    }

    /// Checks whether the given `path` is a valid [`StoragePath`].
    fn check(path: impl AsRef<str>) -> bool {
        /// Regular expression checking [`StoragePath`] invariants:
        /// - Must consist of `/`-separated non-empty segments;
        /// - Must not start or end with `/`;
        /// - Segments contain letters, digits, `-`, `_` and `.` only;
        /// - Must be at most 1024 characters long.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[\w.\-]+(/[\w.\-]+)*$").expect("valid regex")
        });

        let path = path.as_ref();
        path.len() <= 1024
            && REGEX.is_match(path)
            && !path.split('/').any(|s| s == "." || s == "..")
    }
}

impl FromStr for StoragePath {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `StoragePath`")
    }
}

/// Download URL of a [`Listing`] cover image.
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(forward)]
pub struct CoverImage(url::Url);

/// Size of a listed property, in square meters.
pub type PropertySize = Amount;

/// Number of rooms of some kind.
pub type NumRooms = u16;

define_kind! {
    #[doc = "Category of a listed property."]
    enum Category {
        #[doc = "An apartment in a building."]
        #[value = "Apartment"]
        Apartment = 1,

        #[doc = "A townhouse."]
        #[value = "Townhouse"]
        Townhouse = 2,

        #[doc = "A detached villa."]
        #[value = "Villa"]
        Villa = 3,

        #[doc = "A commercial property."]
        #[value = "Commercial"]
        Commercial = 4,
    }
}

define_kind! {
    #[doc = "Purpose of a [`Listing`]."]
    enum Purpose {
        #[doc = "The property is offered for rent."]
        #[value = "For Rent"]
        ForRent = 1,

        #[doc = "The property is offered for sale."]
        #[value = "For Sale"]
        ForSale = 2,
    }
}

impl Default for Purpose {
    fn default() -> Self {
        Self::ForRent
    }
}

impl Purpose {
    /// Returns the [`Currency`] prices of this [`Purpose`] are quoted in by
    /// default.
    #[must_use]
    pub const fn default_currency(self) -> Currency {
        match self {
            Self::ForRent => Currency::Usd,
            Self::ForSale => Currency::Vnd,
        }
    }
}

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

/// Unvalidated [`Listing`] data provided by an administrator.
#[derive(Clone, Debug, Default)]
pub struct Draft {
    /// [`Title`] of the [`Listing`].
    pub title: Option<Title>,

    /// [`Description`] of the [`Listing`].
    pub description: Option<Description>,

    /// [`Category`] of the [`Listing`].
    pub category: Option<Category>,

    /// [`Purpose`] of the [`Listing`].
    pub purpose: Option<Purpose>,

    /// [`Location`] of the [`Listing`].
    pub location: Option<Location>,

    /// Asked price.
    pub price: Option<Amount>,

    /// [`Currency`] of the price.
    ///
    /// Defaults to the [`Purpose::default_currency()`].
    pub currency: Option<Currency>,

    /// [`PropertySize`] of the [`Listing`].
    pub property_size: Option<PropertySize>,

    /// Number of bedrooms.
    pub bedrooms: Option<NumRooms>,

    /// Number of bathrooms.
    pub bathrooms: Option<NumRooms>,

    /// [`Amenity`]s of the [`Listing`].
    pub amenities: BTreeSet<Amenity>,

    /// [`StoragePath`] of the uploaded images folder.
    pub storage_path: Option<StoragePath>,
}

impl Draft {
    /// Validates this [`Draft`] and turns it into a [`Listing`] with the
    /// provided [`Id`] and [`CreationDateTime`].
    ///
    /// # Errors
    ///
    /// If any field required for publishing is missing.
    pub fn into_listing(
        self,
        id: Id,
        created_at: CreationDateTime,
    ) -> Result<Listing, IncompleteDraft> {
        use IncompleteDraft as E;

        let Self {
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
        } = self;

        let purpose = purpose.ok_or(E::Purpose)?;
        let category = category.ok_or(E::Category)?;
        let location = location.ok_or(E::Location)?;
        let bedrooms = bedrooms.ok_or(E::Bedrooms)?;
        let bathrooms = bathrooms.ok_or(E::Bathrooms)?;
        let price = price.ok_or(E::Price)?;
        let description = description.ok_or(E::Description)?;
        let storage_path = storage_path.ok_or(E::Images)?;

        Ok(Listing {
            id,
            title,
            description,
            category,
            purpose,
            location,
            price: Money {
                amount: price,
                currency: currency
                    .unwrap_or_else(|| purpose.default_currency()),
            },
            property_size: property_size.unwrap_or(Amount::ZERO),
            bedrooms,
            bathrooms,
            amenities,
            storage_path: Some(storage_path),
            cover_image: None,
            created_at,
        })
    }
}

/// Field required for publishing a [`Listing`] missing from a [`Draft`].
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum IncompleteDraft {
    /// [`Purpose`] is missing.
    #[display("`purpose` is required")]
    Purpose,

    /// [`Category`] is missing.
    #[display("`category` is required")]
    Category,

    /// [`Location`] is missing.
    #[display("`location` is required")]
    Location,

    /// Number of bedrooms is missing.
    #[display("`bedrooms` is required")]
    Bedrooms,

    /// Number of bathrooms is missing.
    #[display("`bathrooms` is required")]
    Bathrooms,

    /// Price is missing.
    #[display("`price` is required")]
    Price,

    /// [`Description`] is missing.
    #[display("`description` is required")]
    Description,

    /// No images were uploaded.
    #[display("at least one image is required")]
    Images,
}
