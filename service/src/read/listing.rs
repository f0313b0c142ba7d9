//! [`Listing`]-related read definitions.

#[cfg(doc)]
use crate::domain::Listing;

pub mod list {
    //! [`Listing`] list definitions, as selected natively by a storage.

    use common::{define_pagination, pagination::Order};

    use crate::domain::{
        listing::{self, Category, Purpose},
        Listing,
    };

    define_pagination!(Cursor, Node, Filter, Sort);

    /// Node in a [`Page`].
    pub type Node = Listing;

    /// Cursor pointing to a specific [`Listing`] in a list.
    pub type Cursor = listing::Id;

    /// Equality constraints a storage evaluates natively.
    ///
    /// [`Filter::default()`] selects every [`Listing`].
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Filter {
        /// [`Purpose`] every selected [`Listing`] must have, if any.
        pub purpose: Option<Purpose>,

        /// Exact location text every selected [`Listing`] must have, if any.
        ///
        /// Not a [`Location`], as any text is a valid constraint, even the one
        /// no stored [`Listing`] can match.
        ///
        /// [`Location`]: listing::Location
        pub location: Option<String>,

        /// [`Category`] every selected [`Listing`] must have, if any.
        pub category: Option<Category>,
    }

    impl Filter {
        /// Checks whether the provided [`Listing`] satisfies this [`Filter`].
        #[must_use]
        pub fn matches(&self, listing: &Listing) -> bool {
            let Self {
                purpose,
                location,
                category,
            } = self;

            purpose.map_or(true, |p| listing.purpose == p)
                && location.as_deref().map_or(true, |l| {
                    AsRef::<str>::as_ref(&listing.location) == l
                })
                && category.map_or(true, |c| listing.category == c)
        }
    }

    /// Native ordering of a [`Listing`] list.
    ///
    /// Ties are always broken by [`listing::Id`] in the same direction.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub enum Sort {
        /// Cheapest first.
        PriceAscending,

        /// Newest first.
        CreatedDescending,
    }

    impl Sort {
        /// Returns the [`Order`] of this [`Sort`].
        #[must_use]
        pub const fn order(self) -> Order {
            match self {
                Self::PriceAscending => Order::Ascending,
                Self::CreatedDescending => Order::Descending,
            }
        }
    }
}

pub mod location {
    //! Locations of stored [`Listing`]s.
    //!
    //! [`Listing`]: crate::domain::Listing

    /// Selector of every distinct location the stored [`Listing`]s have,
    /// in lexicographic order.
    ///
    /// [`Listing`]: crate::domain::Listing
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Known;
}

pub mod search {
    //! Search criteria of a [`Listing`] list.

    use std::{fmt, str::FromStr};

    use common::{define_kind, Amount};
    use derive_more::{Display, Error};

    use crate::domain::{
        listing::{Category, NumRooms, PropertySize, Purpose},
        Listing,
    };

    use super::list;

    /// Criteria of a [`Listing`] search.
    ///
    /// Every absent field imposes no constraint on its dimension.
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Criteria {
        /// [`Purpose`] to search for. Defaults to [`Purpose::ForRent`].
        pub purpose: Option<Purpose>,

        /// [`Category`] to search for.
        pub category: Option<Category>,

        /// Raw location text to search for, as entered by a user.
        pub location: Option<String>,

        /// [`SizeBucket`] the property size must fall into.
        pub property_size: Option<SizeBucket>,

        /// Minimal price, inclusive.
        pub min_price: Option<Amount>,

        /// Maximal price, inclusive. Zero means unbounded.
        pub max_price: Option<Amount>,

        /// [`Rooms`] constraint on the number of bedrooms.
        pub bedrooms: Option<Rooms>,

        /// [`Rooms`] constraint on the number of bathrooms.
        pub bathrooms: Option<Rooms>,

        /// [`OrderBy`] of the results, if any.
        pub order_by: Option<OrderBy>,
    }

    define_kind! {
        #[doc = "Range of property sizes a search is narrowed to."]
        enum SizeBucket {
            #[doc = "From 50 to 100 square meters."]
            #[value = "_050to100"]
            From50To100 = 1,

            #[doc = "From 100 to 200 square meters."]
            #[value = "_100to200"]
            From100To200 = 2,

            #[doc = "From 200 to 300 square meters."]
            #[value = "_200to300"]
            From200To300 = 3,

            #[doc = "From 300 to 400 square meters."]
            #[value = "_300to400"]
            From300To400 = 4,

            #[doc = "Over 400 square meters."]
            #[value = "_400plus"]
            From400 = 5,
        }
    }

    impl SizeBucket {
        /// Upper bound of the widest size range.
        pub const MAX: u32 = 9999;

        /// Returns inclusive `[min, max]` bounds of the optional
        /// [`SizeBucket`].
        ///
        /// No bucket means the widest range of `[0, 9999]`.
        #[must_use]
        pub fn bounds(bucket: Option<Self>) -> (PropertySize, PropertySize) {
            let (min, max) = match bucket {
                Some(Self::From50To100) => (50, 100),
                Some(Self::From100To200) => (100, 200),
                Some(Self::From200To300) => (200, 300),
                Some(Self::From300To400) => (300, 400),
                Some(Self::From400) => (400, Self::MAX),
                None => (0, Self::MAX),
            };
            (min.into(), max.into())
        }

        /// Parses the provided text into a [`SizeBucket`], treating unknown
        /// values as no bucket at all.
        #[must_use]
        pub fn parse_lenient(text: &str) -> Option<Self> {
            text.trim().parse().ok()
        }
    }

    define_kind! {
        #[doc = "Ordering of search results."]
        enum OrderBy {
            #[doc = "Cheapest first."]
            #[value = "Most Affordable"]
            MostAffordable = 1,

            #[doc = "Newest first."]
            #[value = "Most Recent"]
            MostRecent = 2,
        }
    }

    impl From<OrderBy> for list::Sort {
        fn from(order_by: OrderBy) -> Self {
            match order_by {
                OrderBy::MostAffordable => Self::PriceAscending,
                OrderBy::MostRecent => Self::CreatedDescending,
            }
        }
    }

    /// Constraint on a number of rooms.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub enum Rooms {
        /// Exactly the specified number of rooms.
        Exact(NumRooms),

        /// More than three rooms.
        ///
        /// Exactly three rooms do NOT satisfy this constraint.
        ThreeOrMore,
    }

    impl Rooms {
        /// Textual form of [`Rooms::ThreeOrMore`].
        pub const THREE_OR_MORE: &'static str = "3+";

        /// Checks whether the provided number of rooms satisfies this
        /// constraint.
        #[must_use]
        pub fn matches(self, rooms: NumRooms) -> bool {
            match self {
                Self::Exact(n) => rooms == n,
                Self::ThreeOrMore => rooms > 3,
            }
        }
    }

    impl Rooms {
        /// Parses the provided filter text into a [`Rooms`] constraint.
        ///
        /// Blank text imposes no constraint.
        ///
        /// # Errors
        ///
        /// If the non-blank text is neither a number of rooms nor `3+`.
        pub fn parse_filter(text: &str) -> Result<Option<Self>, InvalidRooms> {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse().map(Some)
        }
    }

    impl fmt::Display for Rooms {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Exact(n) => write!(f, "{n}"),
                Self::ThreeOrMore => f.write_str(Self::THREE_OR_MORE),
            }
        }
    }

    impl FromStr for Rooms {
        type Err = InvalidRooms;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let s = s.trim();
            if s == Self::THREE_OR_MORE {
                return Ok(Self::ThreeOrMore);
            }
            s.parse().map(Self::Exact).map_err(|_| InvalidRooms)
        }
    }

    /// Error of parsing [`Rooms`] from a string.
    #[derive(Clone, Copy, Debug, Display, Error)]
    #[display("expected a number of rooms or `3+`")]
    pub struct InvalidRooms;

    /// One refined page of a [`Listing`] search.
    #[derive(Clone, Debug, Default)]
    pub struct Refined {
        /// [`Listing`]s matching the search [`Criteria`], in native order.
        pub listings: Vec<Listing>,

        /// Cursor of the last [`Listing`] selected natively for this page,
        /// regardless of whether it matched the [`Criteria`].
        pub cursor: Option<list::Cursor>,

        /// Indicator whether the storage has more [`Listing`]s after this
        /// page.
        pub has_more: bool,
    }

    #[cfg(test)]
    mod spec {
        use super::{InvalidRooms, Rooms, SizeBucket};

        #[test]
        fn size_bucket_table() {
            let cases = [
                ("_050to100", (50, 100)),
                ("_100to200", (100, 200)),
                ("_200to300", (200, 300)),
                ("_300to400", (300, 400)),
                ("_400plus", (400, 9999)),
                ("", (0, 9999)),
                ("_500to600", (0, 9999)),
                ("50 to 100", (0, 9999)),
            ];
            for (text, (min, max)) in cases {
                assert_eq!(
                    SizeBucket::bounds(SizeBucket::parse_lenient(text)),
                    (min.into(), max.into()),
                    "bucket: {text:?}",
                );
            }
        }

        #[test]
        fn rooms_parse() {
            assert_eq!("3+".parse::<Rooms>().unwrap(), Rooms::ThreeOrMore);
            assert_eq!(" 2 ".parse::<Rooms>().unwrap(), Rooms::Exact(2));
            assert!(matches!("two".parse::<Rooms>(), Err(InvalidRooms)));
            assert!("-1".parse::<Rooms>().is_err());
            assert_eq!(Rooms::ThreeOrMore.to_string(), "3+");
        }

        #[test]
        fn blank_rooms_filter_is_no_constraint() {
            for blank in ["", "  ", "\t"] {
                assert_eq!(Rooms::parse_filter(blank).unwrap(), None);
            }
            assert_eq!(
                Rooms::parse_filter(" 3+ ").unwrap(),
                Some(Rooms::ThreeOrMore),
            );
            assert!(Rooms::parse_filter("many").is_err());
        }

        #[test]
        fn three_or_more_is_strictly_greater_than_three() {
            assert!(!Rooms::ThreeOrMore.matches(3));
            assert!(Rooms::ThreeOrMore.matches(4));
            assert!(!Rooms::ThreeOrMore.matches(0));
        }

        #[test]
        fn exact_rooms_match_equal_only() {
            assert!(Rooms::Exact(2).matches(2));
            assert!(!Rooms::Exact(2).matches(3));
        }
    }
}
