//! [`Query`] collection related to [`Location`]s of stored [`Listing`]s.
//!
//! [`Listing`]: crate::domain::Listing

use common::operations::{By, Select};
use tracerr::Traced;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization as _};

use crate::{
    domain::listing::Location,
    infra::{database, Database},
    read::listing::location,
    Service,
};

use super::Query;

/// Suggests the known [`Location`]s containing the provided input, regardless
/// of letter case and diacritics.
///
/// Blank input suggests every known [`Location`].
#[derive(Clone, Debug, Default)]
pub struct Suggestions {
    /// Text entered by a user so far.
    pub input: String,
}

/// Folds the provided text for comparison: lowercases it and strips
/// diacritics off.
fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

impl<Db, St> Query<Suggestions> for Service<Db, St>
where
    Db: Database<
        Select<By<Vec<Location>, location::Known>>,
        Ok = Vec<Location>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Location>;
    type Err = Traced<database::Error>;

    async fn execute(&self, query: Suggestions) -> Result<Self::Ok, Self::Err> {
        let input = fold(query.input.trim());

        let known = self
            .database()
            .execute(Select(By::new(location::Known)))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(known
            .into_iter()
            .filter(|l| fold(AsRef::<str>::as_ref(l)).contains(&input))
            .collect())
    }
}
