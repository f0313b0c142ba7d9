//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use derive_more::Into;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use crate::define_kind;

/// Non-negative decimal amount.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Amount(Decimal);

impl Amount {
    /// Zero [`Amount`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Amount`] if the provided value is not negative.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (val >= Decimal::ZERO).then_some(Self(val))
    }

    /// Returns the underlying [`Decimal`] value.
    #[must_use]
    pub const fn get(self) -> Decimal {
        self.0
    }

    /// Indicates whether this [`Amount`] is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl From<u32> for Amount {
    fn from(val: u32) -> Self {
        Self(Decimal::from(val))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(int) = self.0.is_integer().then(|| self.0.to_i128()).flatten()
        {
            write!(f, "{int}")
        } else {
            write!(f, "{}", self.0.normalize())
        }
    }
}

impl FromStr for Amount {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .ok()
            .and_then(Self::new)
            .ok_or("invalid amount")
    }
}

/// [`Amount`] of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Amount,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        write!(f, "{amount}{currency}")
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Amount::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "US Dollar."]
        #[value = "USD"]
        Usd = 1,

        #[doc = "Vietnamese Dong."]
        #[value = "VND"]
        Vnd = 2,
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{major}.{minor}{currency}` format, where:
    /// - `major` is a non-negative integer;
    /// - `minor` is an optional integer;
    /// - `currency` is a three-letter currency code (`USD` or `VND`).
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }

    /// Non-negative decimal amount, e.g. `150` or `99.5`.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Amount = super::Amount;

    impl Amount {
        fn to_output<S: ScalarValue>(a: &Amount) -> Value<S> {
            Value::scalar(a.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Amount` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Amount` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Amount, Currency, Money};

    fn amount(s: &str) -> Amount {
        Amount::new(s.parse::<Decimal>().unwrap()).unwrap()
    }

    #[test]
    fn amount_rejects_negative() {
        assert!(Amount::new(Decimal::from(-1)).is_none());
        assert!(Amount::from_str("-0.5").is_err());
        assert_eq!(Amount::from_str(" 0 ").unwrap(), Amount::ZERO);
        assert!(Amount::from_str("abc").is_err());
    }

    #[test]
    fn amount_orders_by_value() {
        assert!(amount("99.5") < amount("100"));
        assert!(amount("100") <= amount("100.00"));
        assert_eq!(amount("100"), amount("100.00"));
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45USD").unwrap(),
            Money {
                amount: amount("123.45"),
                currency: Currency::Usd,
            },
        );

        assert_eq!(
            Money::from_str("1500000VND").unwrap(),
            Money {
                amount: amount("1500000"),
                currency: Currency::Vnd,
            },
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Us").is_err());
        assert!(Money::from_str("123.45EUR").is_err());
        assert!(Money::from_str("-5USD").is_err());
        assert!(Money::from_str("123USD").is_ok());
    }

    #[test]
    fn to_string() {
        assert_eq!(
            Money {
                amount: amount("123.45"),
                currency: Currency::Usd,
            }
            .to_string(),
            "123.45USD",
        );

        assert_eq!(
            Money {
                amount: amount("500.00"),
                currency: Currency::Vnd,
            }
            .to_string(),
            "500VND",
        );

        assert_eq!(
            Money {
                amount: amount("99.50"),
                currency: Currency::Usd,
            }
            .to_string(),
            "99.5USD",
        );
    }

    #[test]
    fn currency_text_form() {
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::Vnd.to_string(), "VND");
        assert_eq!(Currency::Vnd.as_str(), "VND");
        assert_eq!(Currency::ALL, &[Currency::Usd, Currency::Vnd]);
    }
}
