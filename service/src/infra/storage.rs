//! [`Storage`]-related implementations.

use common::operations::{By, Select};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;
use url::Url;

#[cfg(doc)]
use crate::domain::Listing;
use crate::domain::listing::{CoverImage, StoragePath};

/// Object storage operation.
pub use common::Handler as Storage;

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Download URL of an object cannot be built.
    #[display("Invalid download URL: {_0}")]
    Url(url::ParseError),

    /// [`Firebase`] was configured with a host that can't carry a path.
    #[display("`{_0}` cannot be a base of a download URL")]
    #[from(ignore)]
    CannotBeBase(#[error(not(source))] String),
}

/// [Firebase Storage] resolving download URLs of publicly readable objects.
///
/// [Firebase Storage]: https://firebase.google.com/docs/storage
#[derive(Clone, Debug)]
pub struct Firebase {
    /// Host serving the download URLs.
    pub host: String,

    /// Bucket the objects are stored in.
    pub bucket: String,

    /// Name of the cover image file inside a [`Listing`] images folder.
    pub cover_image: String,
}

impl Firebase {
    /// Builds a download URL of the object at the provided `path`:
    /// `https://{host}/v0/b/{bucket}/o/{path}?alt=media`, with the `path`
    /// being percent-encoded as a single segment.
    ///
    /// # Errors
    ///
    /// If the configured `host` doesn't form a valid URL.
    pub fn download_url(&self, path: &str) -> Result<Url, Traced<Error>> {
        let mut url = Url::parse(&format!("https://{}", self.host))
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        _ = url
            .path_segments_mut()
            .map_err(|()| tracerr::new!(Error::CannotBeBase(self.host.clone())))?
            .clear()
            .extend(["v0", "b", self.bucket.as_str(), "o", path]);
        url.set_query(Some("alt=media"));
        Ok(url)
    }
}

impl Storage<Select<By<CoverImage, StoragePath>>> for Firebase {
    type Ok = CoverImage;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Select(by): Select<By<CoverImage, StoragePath>>,
    ) -> Result<Self::Ok, Self::Err> {
        let path = by.into_inner().join(&self.cover_image);
        self.download_url(&path)
            .map(CoverImage::from)
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{domain::listing::StoragePath, infra::Storage as _};

    use super::Firebase;

    fn firebase(host: &str) -> Firebase {
        Firebase {
            host: host.into(),
            bucket: "estate-agency.appspot.com".into(),
            cover_image: "0".into(),
        }
    }

    #[test]
    fn percent_encodes_object_path() {
        let url = firebase("firebasestorage.googleapis.com")
            .download_url("listings/abc 1/0")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://firebasestorage.googleapis.com/v0/b/\
             estate-agency.appspot.com/o/listings%2Fabc%201%2F0?alt=media",
        );
    }

    #[tokio::test]
    async fn resolves_cover_image_inside_folder() {
        let cover = firebase("firebasestorage.googleapis.com")
            .execute(Select(By::new(StoragePath::new("listings/abc").unwrap())))
            .await
            .unwrap();
        assert_eq!(
            cover.to_string(),
            "https://firebasestorage.googleapis.com/v0/b/\
             estate-agency.appspot.com/o/listings%2Fabc%2F0?alt=media",
        );
    }

    #[test]
    fn rejects_invalid_host() {
        assert!(firebase("bad host").download_url("listings/abc").is_err());
    }
}
