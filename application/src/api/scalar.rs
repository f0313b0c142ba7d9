//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute.
///
/// Converts the target type to/from a GraphQL string scalar through the
/// [`FromStr`]/[`Display`] impls of the domain type `As` it wraps, so the
/// domain validation applies to the API input as well.
///
/// Target type must implement [`TryFrom`] and [`AsRef`] for `As` type.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Converts the target type into scalar [`Value`].
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Constructs the target type from scalar [`Value`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the input value is not a string;
    /// - the input value cannot be parsed into `As` type;
    /// - the parsed value cannot be converted into the target type.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr + fmt::Display,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = T::name(&()).unwrap_or("<unnamed>");
        let s = input.as_string_value().ok_or_else(|| {
            format!(
                "Cannot parse input scalar `{name}`: expected string input \
                 value, found: {input}",
            )
        })?;
        s.parse::<As>()
            .map_err(|e| {
                format!("Cannot parse input scalar `{name}` from \"{s}\": {e}")
            })?
            .try_into()
            .map_err(|e| format!("Cannot parse input scalar `{name}`: {e}"))
    }

    /// Parse the provided [`ScalarToken`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be parsed as [`String`].
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue, Value};
    use service::domain::listing;

    use super::Via;
    use crate::api::listing::{Location, StoragePath};

    #[test]
    fn parses_through_domain_validation() {
        let location: Location =
            Via::<listing::Location>::from_input::<_, DefaultScalarValue>(
                &InputValue::scalar("Da Nang"),
            )
            .unwrap();
        assert_eq!(location.to_string(), "Da Nang");
        assert_eq!(
            Via::<listing::Location>::to_output::<_, DefaultScalarValue>(
                &location,
            ),
            Value::scalar("Da Nang"),
        );

        assert!(Via::<listing::Location>::from_input::<
            Location,
            DefaultScalarValue,
        >(&InputValue::scalar(" Da Nang"))
        .is_err());
        assert!(Via::<listing::StoragePath>::from_input::<
            StoragePath,
            DefaultScalarValue,
        >(&InputValue::scalar("../secrets"))
        .is_err());
    }

    #[test]
    fn rejects_non_string_input() {
        assert!(Via::<listing::Location>::from_input::<
            Location,
            DefaultScalarValue,
        >(&InputValue::scalar(42))
        .is_err());
    }
}
