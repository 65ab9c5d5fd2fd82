//! Date and time utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, fmt, marker::PhantomData, ops, time::Duration};

use derive_more::{Debug, Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::well_known::Rfc3339, Month, UtcOffset};

/// Untyped date and time.
pub type DateTime = DateTimeOf;

/// Years representable in [RFC 3339].
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
const YEARS: ops::RangeInclusive<i32> = 0..=9999;

/// UTC date and time with a microsecond precision.
///
/// The `Of` parameter tags what this [`DateTime`] describes, so the creation
/// time of one entity cannot be mixed up with the expiration time of another.
#[derive(Debug)]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// Inner representation of the date and time.
    inner: time::OffsetDateTime,

    /// Type parameter describing the kind of date and time.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// A [`DateTime`] representing the Unix epoch.
    pub const UNIX_EPOCH: Self = Self {
        inner: time::OffsetDateTime::UNIX_EPOCH,
        _of: PhantomData,
    };

    /// Creates a new [`DateTime`] representing the current date and time.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn now() -> Self {
        let inner = time::OffsetDateTime::now_utc();
        Self {
            _of: PhantomData,
            inner: inner
                .replace_microsecond(inner.microsecond())
                .expect("infallible"),
        }
    }

    /// Creates a new [`DateTime`] from the provided [`UNIX_EPOCH`] timestamp
    /// in seconds.
    ///
    /// [`None`] is returned if the timestamp is out of range.
    ///
    /// [`UNIX_EPOCH`]: Self::UNIX_EPOCH
    #[must_use]
    pub fn from_unix_timestamp(timestamp: i64) -> Option<Self> {
        Self::checked(
            time::OffsetDateTime::from_unix_timestamp(timestamp).ok()?,
        )
    }

    /// Creates a new [`DateTime`] from the provided [`UNIX_EPOCH`] timestamp
    /// in milliseconds.
    ///
    /// [`None`] is returned if the timestamp is out of range.
    ///
    /// [`UNIX_EPOCH`]: Self::UNIX_EPOCH
    #[must_use]
    pub fn from_unix_timestamp_millis(millis: i64) -> Option<Self> {
        let nanos = i128::from(millis) * 1_000_000;
        Self::checked(
            time::OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?,
        )
    }

    /// Creates a new [`DateTime`] pointing to the midnight (UTC) of the
    /// provided calendar date.
    ///
    /// [`None`] is returned if the date doesn't exist.
    #[must_use]
    pub fn from_calendar_date(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        let date = time::Date::from_calendar_date(year, month, day).ok()?;
        Self::checked(date.midnight().assume_utc())
    }

    /// Wraps the provided UTC [`time::OffsetDateTime`], unless its year is
    /// out of the [RFC 3339] range.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    fn checked(inner: time::OffsetDateTime) -> Option<Self> {
        YEARS.contains(&inner.year()).then_some(Self {
            inner,
            _of: PhantomData,
        })
    }

    /// Returns the [`UNIX_EPOCH`] timestamp of this [`DateTime`] in seconds.
    ///
    /// [`UNIX_EPOCH`]: Self::UNIX_EPOCH
    #[must_use]
    pub fn unix_timestamp(&self) -> i64 {
        self.inner.unix_timestamp()
    }

    /// Creates a new [`DateTime`] from the provided [RFC 3339] string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid [RFC 3339] date and time.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn from_rfc3339(input: &str) -> Result<Self, ParseError> {
        use ParseError as E;

        let dt: Self = time::OffsetDateTime::parse(input, &Rfc3339)
            .map_err(E::Parse)?
            .try_into()
            .map_err(E::ComponentRange)?;
        Self::checked(dt.inner).ok_or(E::YearOutOfRange)
    }

    /// Returns the [`DateTime`] as an [RFC 3339] string.
    ///
    /// Constructors keep the year in the [RFC 3339] range.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.inner.format(&Rfc3339).unwrap_or_else(|e| {
            panic!("cannot format `DateTime` as RFC 3339: {e}")
        })
    }

    /// Coerces one kind of [`DateTime`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateTimeOf<NewOf> {
        DateTimeOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

/// Error of parsing [`DateTime`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ParseError {
    /// Failed to parse the string into a [`DateTime`].
    Parse(time::error::Parse),

    /// Parsed [`DateTime`] has an out of range component.
    ComponentRange(time::error::ComponentRange),

    /// Parsed [`DateTime`] falls out of the `0..=9999` years in UTC.
    #[display("year is out of the `0..=9999` range")]
    YearOutOfRange,
}

impl<Of: ?Sized> fmt::Display for DateTimeOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
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

impl<Of: ?Sized> TryFrom<time::OffsetDateTime> for DateTimeOf<Of> {
    type Error = time::error::ComponentRange;

    fn try_from(dt: time::OffsetDateTime) -> Result<Self, Self::Error> {
        dt.to_offset(UtcOffset::UTC)
            .replace_microsecond(dt.microsecond())
            .map(|inner| Self {
                inner,
                _of: PhantomData,
            })
    }
}

impl<Of: ?Sized> From<DateTimeOf<Of>> for time::OffsetDateTime {
    fn from(dt: DateTimeOf<Of>) -> Self {
        dt.inner
    }
}

impl<Of: ?Sized> ops::Add<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self {
            inner: self.inner + rhs,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> ops::Sub<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self {
            inner: self.inner - rhs,
            _of: PhantomData,
        }
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::OffsetDateTime::from_sql(ty, raw)?
            .try_into()
            .map_err(Box::from)
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

#[cfg(test)]
mod spec {
    use super::DateTime;

    #[test]
    fn parses_and_formats_rfc3339() {
        let dt = DateTime::from_rfc3339("2024-03-01T10:20:30Z").unwrap();

        assert_eq!(dt.to_rfc3339(), "2024-03-01T10:20:30Z");
        assert_eq!(dt.unix_timestamp(), 1_709_288_430);
    }

    #[test]
    fn normalizes_offset_to_utc() {
        let dt = DateTime::from_rfc3339("2024-03-01T18:20:30+08:00").unwrap();

        assert_eq!(dt.to_rfc3339(), "2024-03-01T10:20:30Z");
    }

    #[test]
    fn creates_from_millis() {
        let dt = DateTime::from_unix_timestamp_millis(1_709_288_430_000)
            .unwrap();

        assert_eq!(dt.to_rfc3339(), "2024-03-01T10:20:30Z");
    }

    #[test]
    fn creates_from_calendar_date() {
        assert_eq!(
            DateTime::from_calendar_date(2024, 2, 29)
                .unwrap()
                .to_rfc3339(),
            "2024-02-29T00:00:00Z",
        );
        assert!(DateTime::from_calendar_date(2023, 2, 29).is_none());
        assert!(DateTime::from_calendar_date(2023, 13, 1).is_none());
    }

    #[test]
    fn rejects_years_rfc3339_cannot_hold() {
        assert!(
            DateTime::from_unix_timestamp_millis(-100_000_000_000_000)
                .is_none(),
        );
        assert!(DateTime::from_unix_timestamp(-62_167_219_201).is_none());
        assert!(DateTime::from_calendar_date(-1, 1, 1).is_none());
        assert!(
            DateTime::from_rfc3339("0000-01-01T00:00:00+01:00").is_err(),
        );
        assert_eq!(
            DateTime::from_unix_timestamp(-62_167_219_200)
                .unwrap()
                .to_rfc3339(),
            "0000-01-01T00:00:00Z",
        );
    }
}
