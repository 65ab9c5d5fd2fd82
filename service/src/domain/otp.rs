//! [`Otp`] definitions.

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One-time password issued for an [`Email`].
#[derive(Clone, Debug)]
pub struct Otp {
    /// ID of this [`Otp`].
    pub id: Id,

    /// [`Email`] this [`Otp`] was issued for.
    pub email: Email,

    /// [`Code`] of this [`Otp`].
    pub code: Code,

    /// [`DateTime`] when this [`Otp`] expires.
    pub expires_at: ExpirationDateTime,

    /// Indicator whether this [`Otp`] has been used already.
    pub used: bool,

    /// Number of verification attempts made against this [`Otp`].
    pub attempts: u16,

    /// [`DateTime`] when this [`Otp`] was created.
    pub created_at: CreationDateTime,
}

impl Otp {
    /// Verifies the provided [`Code`] against this [`Otp`] at the provided
    /// [`DateTime`], allowing at most `max_attempts` verification attempts.
    ///
    /// Every attempt, except the ones beyond the `max_attempts`, is counted
    /// regardless of its outcome, and so should be persisted.
    ///
    /// # Errors
    ///
    /// See [`VerificationError`] for details.
    pub fn verify(
        &mut self,
        code: &Code,
        now: ExpirationDateTime,
        max_attempts: u16,
    ) -> Result<(), VerificationError> {
        use VerificationError as E;

        if self.attempts >= max_attempts {
            return Err(E::TooManyAttempts);
        }
        self.attempts += 1;

        if self.used {
            return Err(E::AlreadyUsed);
        }
        if self.expires_at <= now {
            return Err(E::Expired);
        }
        if &self.code != code {
            return Err(E::WrongCode);
        }

        self.used = true;
        Ok(())
    }
}

/// Error of [`Otp::verify()`].
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum VerificationError {
    /// Maximum number of verification attempts is reached.
    #[display("too many verification attempts")]
    TooManyAttempts,

    /// [`Otp`] has been used already.
    #[display("one-time password has been used already")]
    AlreadyUsed,

    /// [`Otp`] has expired.
    #[display("one-time password has expired")]
    Expired,

    /// Provided [`Code`] doesn't match.
    #[display("one-time password code is wrong")]
    WrongCode,
}

/// ID of an [`Otp`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// E-mail address an [`Otp`] is issued for.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `email` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Creates a new [`Email`] if the given `email` is valid.
    ///
    /// The address is lowercased, so the same mailbox always gets the same
    /// [`Email`].
    #[must_use]
    pub fn new(email: impl AsRef<str>) -> Option<Self> {
        let email = email.as_ref().to_lowercase();
        Self::check(&email).then_some(Self(email))
    }

    /// Checks whether the given `email` is a valid [`Email`].
    fn check(email: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] invariants:
        /// - Must contain exactly one `@`;
        /// - Must not contain whitespace;
        /// - Domain part must contain at least one `.`.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
        });

        let email = email.as_ref();
        email.len() <= 254 && REGEX.is_match(email)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Six-digit code of an [`Otp`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Code(String);

impl Code {
    /// Number of digits in a [`Code`].
    pub const LEN: usize = 6;

    /// Generates a new random [`Code`].
    #[must_use]
    pub fn generate() -> Self {
        let n = Uuid::new_v4().as_u128() % 1_000_000;
        Self(format!("{n:06}"))
    }

    /// Creates a new [`Code`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`Code`].
    fn check(code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        code.len() == Self::LEN && code.bytes().all(|b| b.is_ascii_digit())
    }
}

impl FromStr for Code {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Code`")
    }
}

/// [`DateTime`] when an [`Otp`] expires.
pub type ExpirationDateTime = DateTimeOf<(Otp, unit::Expiration)>;

/// [`DateTime`] when an [`Otp`] was created.
pub type CreationDateTime = DateTimeOf<(Otp, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use super::{Code, Email, ExpirationDateTime, Id, Otp, VerificationError};

    fn otp(now: ExpirationDateTime) -> Otp {
        Otp {
            id: Id::new(),
            email: Email::new("buyer@example.com").unwrap(),
            code: Code::new("123456").unwrap(),
            expires_at: now + Duration::from_secs(600),
            used: false,
            attempts: 0,
            created_at: now.coerce(),
        }
    }

    fn now() -> ExpirationDateTime {
        DateTime::now().coerce()
    }

    #[test]
    fn accepts_right_code_once() {
        let now = now();
        let mut otp = otp(now);
        let code = Code::new("123456").unwrap();

        assert_eq!(otp.verify(&code, now, 5), Ok(()));
        assert!(otp.used);
        assert_eq!(otp.attempts, 1);

        assert_eq!(
            otp.verify(&code, now, 5),
            Err(VerificationError::AlreadyUsed),
        );
        assert_eq!(otp.attempts, 2);
    }

    #[test]
    fn counts_wrong_codes() {
        let now = now();
        let mut otp = otp(now);
        let wrong = Code::new("000000").unwrap();

        for attempt in 1..=3 {
            assert_eq!(
                otp.verify(&wrong, now, 3),
                Err(VerificationError::WrongCode),
            );
            assert_eq!(otp.attempts, attempt);
        }

        let right = Code::new("123456").unwrap();
        assert_eq!(
            otp.verify(&right, now, 3),
            Err(VerificationError::TooManyAttempts),
        );
        assert_eq!(otp.attempts, 3);
        assert!(!otp.used);
    }

    #[test]
    fn limits_attempts_before_expiry() {
        let now = now();
        let mut otp = otp(now);
        otp.attempts = 5;
        let code = otp.code.clone();

        let later = now + Duration::from_secs(3600);
        assert_eq!(
            otp.verify(&code, later, 5),
            Err(VerificationError::TooManyAttempts),
        );
    }

    #[test]
    fn rejects_expired() {
        let now = now();
        let mut otp = otp(now);
        let code = otp.code.clone();

        let later = now + Duration::from_secs(601);
        assert_eq!(
            otp.verify(&code, later, 5),
            Err(VerificationError::Expired),
        );
        assert_eq!(otp.attempts, 1);
    }

    #[test]
    fn validates_email() {
        assert_eq!(
            Email::new("Buyer@Example.COM").unwrap().to_string(),
            "buyer@example.com",
        );
        assert!(Email::new("buyer@example").is_none());
        assert!(Email::new("buyer example@x.com").is_none());
        assert!(Email::new("").is_none());
    }

    #[test]
    fn generates_six_digits() {
        for _ in 0..32 {
            let code = Code::generate();
            assert!(Code::new(code.to_string()).is_some(), "{code}");
        }
    }
}
