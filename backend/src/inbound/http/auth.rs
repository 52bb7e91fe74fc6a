//! Bearer-token extractors for HTTP handlers.
//!
//! [`BearerUser`] gates protected routes: it reads the `Authorization`
//! header, verifies the token through the codec on [`HttpState`], and hands
//! the handler verified claims. [`MaybeBearerUser`] serves routes where
//! authentication is optional; an absent header yields `None`, but a
//! present-and-invalid token is still rejected.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};

use crate::domain::ports::TokenError;
use crate::domain::{Error, TokenClaims};

use super::error::ApiError;
use super::state::HttpState;

const AUTH_REQUIRED: &str = "authentication required";

/// Verified claims of an authenticated request.
#[derive(Debug, Clone)]
pub struct BearerUser(pub TokenClaims);

/// Claims of an optionally authenticated request.
#[derive(Debug, Clone)]
pub struct MaybeBearerUser(pub Option<TokenClaims>);

fn bearer_token(req: &HttpRequest) -> Result<Option<&str>, Error> {
    let Some(header) = req.headers().get(actix_web::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("invalid token"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthorized("invalid token"))?;
    Ok(Some(token))
}

fn verify(req: &HttpRequest, token: &str) -> Result<TokenClaims, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state missing"))?;
    state.tokens.verify(token).map_err(|err| match err {
        TokenError::Expired => Error::unauthorized("token has expired"),
        _ => Error::unauthorized("invalid token"),
    })
}

fn extract_required(req: &HttpRequest) -> Result<BearerUser, ApiError> {
    let token =
        bearer_token(req)?.ok_or_else(|| ApiError::from(Error::unauthorized(AUTH_REQUIRED)))?;
    Ok(BearerUser(verify(req, token)?))
}

fn extract_optional(req: &HttpRequest) -> Result<MaybeBearerUser, ApiError> {
    match bearer_token(req)? {
        None => Ok(MaybeBearerUser(None)),
        Some(token) => Ok(MaybeBearerUser(Some(verify(req, token)?))),
    }
}

impl FromRequest for BearerUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_required(req))
    }
}

impl FromRequest for MaybeBearerUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_optional(req))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;

    #[rstest::rstest]
    fn missing_header_is_none_for_optional_flows() {
        let req = TestRequest::default().to_http_request();
        let token = bearer_token(&req).expect("no header is not an error");
        assert_eq!(token, None);
    }

    #[rstest::rstest]
    #[case("Basic dXNlcjpwdw==")]
    #[case("bearer lowercase-scheme")]
    #[case("Token abc")]
    fn non_bearer_schemes_are_rejected(#[case] header: &str) {
        let req = TestRequest::default()
            .insert_header(("Authorization", header))
            .to_http_request();
        let err = bearer_token(&req).expect_err("non-bearer scheme must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest::rstest]
    fn bearer_scheme_yields_the_token() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .to_http_request();
        let token = bearer_token(&req).expect("valid header");
        assert_eq!(token, Some("abc.def.ghi"));
    }
}
