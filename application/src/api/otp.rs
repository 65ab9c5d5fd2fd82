//! One-time password endpoints.

use axum::{extract::rejection::JsonRejection, Json};
use common::wire::{self, Envelope};
use service::{
    command::{verify_otp, Command as _, RequestOtp, VerifyOtp},
    domain::otp::{self, VerificationError},
};

use crate::{api, define_error, AsError, Context, Error};

/// Parses the provided `email` as an [`otp::Email`].
fn email(email: &str) -> Result<otp::Email, Error> {
    otp::Email::new(email)
        .ok_or_else(|| Error::invalid_field("email", &"Invalid email address"))
}

/// Issues a new one-time password for an e-mail address.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - the e-mail address is invalid.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "requestOtp",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn request(
    ctx: Context,
    req: Result<Json<wire::OtpRequest>, JsonRejection>,
) -> Result<Json<Envelope>, Error> {
    let Json(wire::OtpRequest { email: raw }) =
        req.map_err(AsError::into_error)?;
    let email = email(&raw)?;

    let otp = ctx
        .service()
        .execute(RequestOtp { email })
        .await
        .map_err(AsError::into_error)?;
    tracing::info!("issued `Otp(id: {})` for `{}`", otp.id, otp.email);

    Ok(Json(Envelope {
        expires_at: Some(otp.expires_at.to_rfc3339()),
        ..Envelope::ok("One-time password has been sent")
    }))
}

/// Verifies a one-time password issued for an e-mail address.
///
/// # Errors
///
/// Possible error codes:
/// - `VALIDATION_ERROR` - the e-mail address or the code is malformed;
/// - `OTP_NOT_REQUESTED` - no password has been issued;
/// - `OTP_EXPIRED` - the password has expired;
/// - `OTP_ALREADY_USED` - the password has been used already;
/// - `OTP_WRONG_CODE` - the code doesn't match;
/// - `OTP_TOO_MANY_ATTEMPTS` - the attempts are exhausted.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "verifyOtp",
        otel.name = api::SPAN_NAME,
    ),
)]
pub async fn verify(
    ctx: Context,
    req: Result<Json<wire::OtpVerification>, JsonRejection>,
) -> Result<Json<Envelope>, Error> {
    let Json(wire::OtpVerification { email: raw, code }) =
        req.map_err(AsError::into_error)?;
    let email = email(&raw)?;
    let code = otp::Code::new(code)
        .ok_or_else(|| Error::invalid_field("code", &"Invalid code"))?;

    ctx.service()
        .execute(VerifyOtp { email, code })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Envelope::ok("One-time password verified")))
}

define_error! {
    enum OtpError {
        #[code = "OTP_NOT_REQUESTED"]
        #[status = BAD_REQUEST]
        #[message = "One-time password has not been requested"]
        NotRequested,

        #[code = "OTP_EXPIRED"]
        #[status = BAD_REQUEST]
        #[message = "One-time password has expired"]
        Expired,

        #[code = "OTP_ALREADY_USED"]
        #[status = BAD_REQUEST]
        #[message = "One-time password has been used already"]
        AlreadyUsed,

        #[code = "OTP_WRONG_CODE"]
        #[status = BAD_REQUEST]
        #[message = "One-time password code is wrong"]
        WrongCode,

        #[code = "OTP_TOO_MANY_ATTEMPTS"]
        #[status = TOO_MANY_REQUESTS]
        #[message = "Too many verification attempts"]
        TooManyAttempts,
    }
}

impl AsError for verify_otp::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotRequested(_) => Some(OtpError::NotRequested.into()),
            Self::Verification(e) => Some(
                match e {
                    VerificationError::TooManyAttempts => {
                        OtpError::TooManyAttempts
                    }
                    VerificationError::AlreadyUsed => OtpError::AlreadyUsed,
                    VerificationError::Expired => OtpError::Expired,
                    VerificationError::WrongCode => OtpError::WrongCode,
                }
                .into(),
            ),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{command::verify_otp::ExecutionError, domain::otp};

    use crate::AsError as _;

    use super::{email, VerificationError};

    #[test]
    fn maps_verification_failures() {
        for (err, code, status) in [
            (
                VerificationError::WrongCode,
                "OTP_WRONG_CODE",
                http::StatusCode::BAD_REQUEST,
            ),
            (
                VerificationError::Expired,
                "OTP_EXPIRED",
                http::StatusCode::BAD_REQUEST,
            ),
            (
                VerificationError::TooManyAttempts,
                "OTP_TOO_MANY_ATTEMPTS",
                http::StatusCode::TOO_MANY_REQUESTS,
            ),
        ] {
            let e = ExecutionError::Verification(err).as_error();
            assert_eq!(e.code, code);
            assert_eq!(e.status_code, status);
        }

        let e = ExecutionError::NotRequested(
            otp::Email::new("a@b.co").unwrap(),
        )
        .as_error();
        assert_eq!(e.code, "OTP_NOT_REQUESTED");
    }

    #[test]
    fn rejects_malformed_email() {
        assert!(email("agent@example.com").is_ok());
        assert_eq!(
            email("nope").unwrap_err().errors["email"],
            "Invalid email address",
        );
    }
}
