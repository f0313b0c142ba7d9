//! Timestamps of marketplace events.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{
    cmp::Ordering, fmt, marker::PhantomData, ops, str::FromStr, time::Duration,
};

use derive_more::Debug;
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime, UtcOffset};

/// Timestamp not tied to any particular kind of event.
pub type DateTime = DateTimeOf;

/// UTC timestamp of microsecond precision, tagged with the kind of event it
/// marks: a listing creation or a session expiration.
///
/// Microseconds are the finest precision PostgreSQL stores, so a timestamp
/// reads back from the database exactly as it was written.
#[derive(Debug)]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// UTC moment, with nanoseconds truncated to microseconds.
    inner: OffsetDateTime,

    /// Kind of the event.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Normalizes the provided [`OffsetDateTime`] to UTC with microsecond
    /// precision.
    fn normalized(dt: OffsetDateTime) -> Self {
        let dt = dt.to_offset(UtcOffset::UTC);
        let sub_micros = i64::from(dt.nanosecond() % 1_000);
        Self {
            inner: dt - time::Duration::nanoseconds(sub_micros),
            _of: PhantomData,
        }
    }

    /// Returns the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self::normalized(OffsetDateTime::now_utc())
    }

    /// Creates a new [`DateTimeOf`] from the provided Unix timestamp (in
    /// seconds).
    ///
    /// [`None`] is returned if the timestamp is out of range.
    #[must_use]
    pub fn from_unix_timestamp(secs: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(secs)
            .ok()
            .map(Self::normalized)
    }

    /// Returns the Unix timestamp (in seconds) of this [`DateTimeOf`].
    #[must_use]
    pub fn unix_timestamp(&self) -> i64 {
        self.inner.unix_timestamp()
    }

    /// Re-tags this [`DateTimeOf`] with another kind of event.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

/// Formats as [RFC 3339].
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
impl<Of: ?Sized> fmt::Display for DateTimeOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.inner.format(&Rfc3339).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

/// Parses from [RFC 3339] with any offset.
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
impl<Of: ?Sized> FromStr for DateTimeOf<Of> {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OffsetDateTime::parse(s, &Rfc3339).map(Self::normalized)
    }
}

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> ops::Add<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self::normalized(self.inner + rhs)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        OffsetDateTime::from_sql(ty, raw).map(Self::normalized)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    //! [`serde`] representations of [`DateTimeOf`].

    pub mod unix_timestamp {
        //! [`DateTimeOf`] as a number of seconds since the Unix epoch, the way
        //! [JWT] claims (`exp`, `iat`, `nbf`) carry it.
        //!
        //! [`DateTimeOf`]: crate::DateTimeOf
        //! [JWT]: https://datatracker.ietf.org/doc/html/rfc7519#section-2

        use serde::{de, Deserialize as _, Deserializer, Serializer};

        use crate::DateTimeOf;

        /// Serializes the provided [`DateTimeOf`] as Unix seconds.
        ///
        /// # Errors
        ///
        /// Only if the [`Serializer`] fails.
        pub fn serialize<Of, S>(
            dt: &DateTimeOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            Of: ?Sized,
            S: Serializer,
        {
            serializer.serialize_i64(dt.unix_timestamp())
        }

        /// Deserializes a [`DateTimeOf`] from Unix seconds.
        ///
        /// # Errors
        ///
        /// If the value is not an integer, or is out of range.
        pub fn deserialize<'de, Of, D>(
            deserializer: D,
        ) -> Result<DateTimeOf<Of>, D::Error>
        where
            Of: ?Sized,
            D: Deserializer<'de>,
        {
            let secs = i64::deserialize(deserializer)?;
            DateTimeOf::from_unix_timestamp(secs).ok_or_else(|| {
                de::Error::custom(format!("timestamp `{secs}` is out of range"))
            })
        }
    }
}

#[cfg(feature = "juniper")]
mod graphql {
    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Timestamp in [RFC 3339] format, in UTC with microsecond precision.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[graphql_scalar(
        with = rfc3339,
        parse_token(String),
        specified_by_url = "https://tools.ietf.org/html/rfc3339",
    )]
    type DateTime = crate::DateTime;

    mod rfc3339 {
        use super::{DateTime, InputValue, ScalarValue, Value};

        pub(super) fn to_output<S: ScalarValue>(dt: &DateTime) -> Value<S> {
            Value::scalar(dt.to_string())
        }

        pub(super) fn from_input<S: ScalarValue>(
            v: &InputValue<S>,
        ) -> Result<DateTime, String> {
            let s = v.as_string_value().ok_or_else(|| {
                format!("Expected RFC 3339 `String` for `DateTime`, found: {v}")
            })?;
            s.parse()
                .map_err(|e| format!("Invalid `DateTime` `{s}`: {e}"))
        }
    }
}
