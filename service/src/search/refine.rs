//! Refinement of a natively selected [`list::Page`] by search [`Criteria`].

use common::Amount;

use crate::{
    domain::Listing,
    read::listing::{
        list,
        search::{Criteria, Refined, SizeBucket},
    },
};

/// Applies the range constraints of the provided [`Criteria`] the storage
/// can't express natively to the [`list::Page`].
///
/// Matching [`Listing`]s keep the [`list::Page`] order. The resulting cursor
/// points to the last [`Listing`] of the [`list::Page`], whether it matched or
/// not, and is [`None`] for an empty [`list::Page`].
#[must_use]
pub fn refine(page: &list::Page, criteria: &Criteria) -> Refined {
    let (min_size, max_size) = SizeBucket::bounds(criteria.property_size);
    let min_price = criteria.min_price.unwrap_or(Amount::ZERO);
    // Zero maximal price means no upper bound.
    let max_price = criteria.max_price.filter(|p| !p.is_zero());

    let matches = |l: &Listing| {
        (min_size..=max_size).contains(&l.property_size)
            && l.price.amount >= min_price
            && max_price.map_or(true, |max| l.price.amount <= max)
            && criteria.bathrooms.map_or(true, |r| r.matches(l.bathrooms))
            && criteria.bedrooms.map_or(true, |r| r.matches(l.bedrooms))
    };

    Refined {
        listings: page
            .edges
            .iter()
            .map(|e| &e.node)
            .filter(|l| matches(l))
            .cloned()
            .collect(),
        cursor: page.end_cursor().copied(),
        has_more: page.has_more,
    }
}
