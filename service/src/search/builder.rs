//! Translation of search [`Criteria`] into a native [`list::Selector`].

use common::pagination::Arguments;

#[cfg(doc)]
use crate::{domain::listing::Purpose, read::listing::search::SizeBucket};
use crate::read::listing::{list, search::Criteria};

/// Builds a [`list::Selector`] of at most `limit` [`Listing`]s matching the
/// equality constraints of the provided [`Criteria`], starting strictly after
/// the `after` cursor (if any).
///
/// Range constraints ([`SizeBucket`], price, rooms) are left out, as they're
/// applied by [`refine()`] afterwards.
///
/// [`Listing`]: crate::domain::Listing
/// [`refine()`]: super::refine()
#[must_use]
pub fn build(
    criteria: &Criteria,
    limit: usize,
    after: Option<list::Cursor>,
) -> list::Selector {
    let Criteria {
        purpose,
        category,
        location,
        order_by,
        ..
    } = criteria;

    list::Selector {
        arguments: Arguments {
            first: limit,
            after,
        },
        filter: list::Filter {
            // `Purpose::ForRent` is assumed when absent.
            purpose: Some(purpose.unwrap_or_default()),
            location: location
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(ToOwned::to_owned),
            category: *category,
        },
        order: order_by.map(Into::into),
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::listing::{self, Category, Purpose},
        read::listing::{
            list,
            search::{Criteria, OrderBy},
        },
    };

    use super::build;

    #[test]
    fn purpose_defaults_to_for_rent() {
        let selector = build(&Criteria::default(), 6, None);
        assert_eq!(selector.filter.purpose, Some(Purpose::ForRent));

        let selector = build(
            &Criteria {
                purpose: Some(Purpose::ForSale),
                ..Criteria::default()
            },
            6,
            None,
        );
        assert_eq!(selector.filter.purpose, Some(Purpose::ForSale));
    }

    #[test]
    fn location_is_trimmed() {
        let selector = build(
            &Criteria {
                location: Some("  Da Nang ".into()),
                ..Criteria::default()
            },
            6,
            None,
        );
        assert_eq!(selector.filter.location.as_deref(), Some("Da Nang"));
    }

    #[test]
    fn over_long_location_is_still_constrained() {
        let long = "X".repeat(600);
        let selector = build(
            &Criteria {
                location: Some(format!(" {long} ")),
                ..Criteria::default()
            },
            6,
            None,
        );
        assert_eq!(selector.filter.location, Some(long));
    }

    #[test]
    fn blank_location_is_ignored() {
        for blank in ["", "   ", "\t"] {
            let selector = build(
                &Criteria {
                    location: Some(blank.into()),
                    ..Criteria::default()
                },
                6,
                None,
            );
            assert_eq!(selector.filter.location, None, "location: {blank:?}");
        }
    }

    #[test]
    fn category_is_constrained_when_present() {
        let selector = build(
            &Criteria {
                category: Some(Category::Villa),
                ..Criteria::default()
            },
            6,
            None,
        );
        assert_eq!(selector.filter.category, Some(Category::Villa));
        assert_eq!(build(&Criteria::default(), 6, None).filter.category, None);
    }

    #[test]
    fn ordering() {
        let order = |order_by| {
            build(
                &Criteria {
                    order_by,
                    ..Criteria::default()
                },
                6,
                None,
            )
            .order
        };

        assert_eq!(
            order(Some(OrderBy::MostAffordable)),
            Some(list::Sort::PriceAscending),
        );
        assert_eq!(
            order(Some(OrderBy::MostRecent)),
            Some(list::Sort::CreatedDescending),
        );
        assert_eq!(order(None), None);
    }

    #[test]
    fn limit_and_cursor_are_passed_through() {
        let cursor = listing::Id::new();
        let selector = build(&Criteria::default(), 10, Some(cursor));
        assert_eq!(selector.arguments.limit(), 10);
        assert_eq!(selector.arguments.cursor(), Some(&cursor));
    }
}
