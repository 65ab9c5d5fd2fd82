//! [`Area`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

/// Number of square feet in a square meter.
const SQFT_PER_SQM: Decimal = Decimal::from_parts(107_639_104, 0, 0, false, 7);

/// Floor area measured in some [`AreaUnit`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Area {
    /// Amount of this [`Area`].
    pub amount: Decimal,

    /// [`AreaUnit`] of this [`Area`].
    pub unit: AreaUnit,
}

impl Area {
    /// Zero square meters.
    pub const ZERO: Self = Self {
        amount: Decimal::ZERO,
        unit: AreaUnit::SquareMeters,
    };

    /// Creates a new [`Area`] in square meters.
    #[must_use]
    pub const fn sqm(amount: Decimal) -> Self {
        Self {
            amount,
            unit: AreaUnit::SquareMeters,
        }
    }

    /// Creates a new [`Area`] in square feet.
    #[must_use]
    pub const fn sqft(amount: Decimal) -> Self {
        Self {
            amount,
            unit: AreaUnit::SquareFeet,
        }
    }

    /// Converts this [`Area`] into the provided [`AreaUnit`], rounding the
    /// amount to two decimal places.
    #[must_use]
    pub fn to(self, unit: AreaUnit) -> Self {
        let amount = match (self.unit, unit) {
            (AreaUnit::SquareMeters, AreaUnit::SquareMeters)
            | (AreaUnit::SquareFeet, AreaUnit::SquareFeet) => self.amount,
            (AreaUnit::SquareMeters, AreaUnit::SquareFeet) => {
                self.amount * SQFT_PER_SQM
            }
            (AreaUnit::SquareFeet, AreaUnit::SquareMeters) => {
                self.amount / SQFT_PER_SQM
            }
        };
        Self {
            amount: amount.round_dp(2).normalize(),
            unit,
        }
    }

    /// Returns the amount of this [`Area`] in square meters.
    #[must_use]
    pub fn in_sqm(self) -> Decimal {
        self.to(AreaUnit::SquareMeters).amount
    }
}

impl Default for Area {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, unit } = self;
        if amount.is_integer() {
            write!(f, "{} {unit}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{} {unit}", amount.normalize())
        }
    }
}

impl FromStr for Area {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or("missing unit")?;

        let (amount, unit) = s.split_at(split);
        let amount =
            Decimal::from_str(amount.trim()).map_err(|_| "invalid amount")?;
        if amount.is_sign_negative() {
            return Err("negative amount");
        }
        let unit = AreaUnit::from_str(unit).map_err(|_| "invalid unit")?;

        Ok(Self { amount, unit })
    }
}

/// Unit of an [`Area`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "lowercase")
)]
pub enum AreaUnit {
    /// Square meters.
    #[default]
    #[strum(serialize = "sqm")]
    #[cfg_attr(feature = "serde", serde(rename = "sqm"))]
    SquareMeters,

    /// Square feet.
    #[strum(serialize = "sqft")]
    #[cfg_attr(feature = "serde", serde(rename = "sqft"))]
    SquareFeet,
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Area, AreaUnit};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn converts_between_units() {
        assert_eq!(
            Area::sqm(decimal("100")).to(AreaUnit::SquareFeet),
            Area::sqft(decimal("1076.39")),
        );
        assert_eq!(
            Area::sqft(decimal("1076.39104")).to(AreaUnit::SquareMeters),
            Area::sqm(decimal("100")),
        );
        assert_eq!(
            Area::sqm(decimal("42.5")).to(AreaUnit::SquareMeters),
            Area::sqm(decimal("42.5")),
        );
        assert_eq!(Area::sqft(decimal("10.7639104")).in_sqm(), decimal("1"));
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Area::from_str("120sqm").unwrap(),
            Area::sqm(decimal("120")),
        );
        assert_eq!(
            Area::from_str("95.5 sqft").unwrap(),
            Area::sqft(decimal("95.5")),
        );

        assert!(Area::from_str("120").is_err());
        assert!(Area::from_str("sqm").is_err());
        assert!(Area::from_str("12acres").is_err());
        assert!(Area::from_str("-5sqm").is_err());
    }

    #[test]
    fn to_string() {
        assert_eq!(Area::sqm(decimal("120.00")).to_string(), "120 sqm");
        assert_eq!(Area::sqft(decimal("95.50")).to_string(), "95.5 sqft");
        assert_eq!(Area::ZERO.to_string(), "0 sqm");
    }
}
