//! Token authentication extractor.
//!
//! Handlers that take an [`AuthenticatedAccount`] only run for requests that
//! carry `Authorization: Token <key>` (or `Bearer <key>`) naming an active
//! account. Everything else is rejected with 401 before the handler body.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::error;

use crate::domain::{Account, AccountId, ApiToken, Error};

use super::state::HttpState;

const SCHEMES: [&str; 2] = ["Token", "Bearer"];

/// The account resolved from the request's API token.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount(Account);

impl AuthenticatedAccount {
    /// Identifier of the caller.
    pub fn id(&self) -> AccountId {
        self.0.id
    }

    /// The full account record.
    pub fn account(&self) -> &Account {
        &self.0
    }
}

/// Pull the token out of the `Authorization` header.
///
/// The scheme is matched case-insensitively and the key must be a single
/// non-empty word.
pub(crate) fn presented_token(headers: &HeaderMap) -> Result<ApiToken, Error> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("authentication credentials were not provided"))?
        .to_str()
        .map_err(|_| Error::unauthorized("invalid token header"))?;

    let mut parts = raw.split_whitespace();
    let (Some(scheme), Some(key), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::unauthorized("invalid token header"));
    };
    if !SCHEMES
        .iter()
        .any(|expected| scheme.eq_ignore_ascii_case(expected))
    {
        return Err(Error::unauthorized(
            "authentication credentials were not provided",
        ));
    }
    Ok(ApiToken::from_presented(key))
}

impl FromRequest for AuthenticatedAccount {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = presented_token(req.headers());
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let token = token?;
            let Some(state) = state else {
                error!("HttpState missing from app data");
                return Err(Error::internal("authentication is not configured"));
            };
            let account = state.authenticator.authenticate(&token).await?;
            Ok(Self(account))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::http::header::HeaderValue;
    use rstest::rstest;

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(value) = value {
            map.insert(
                AUTHORIZATION,
                HeaderValue::from_str(value).expect("valid header value"),
            );
        }
        map
    }

    #[rstest]
    #[case("Token abc123")]
    #[case("token abc123")]
    #[case("Bearer abc123")]
    #[case("  Token   abc123  ")]
    fn accepts_token_and_bearer_schemes(#[case] header: &str) {
        let token = presented_token(&headers(Some(header))).expect("token parsed");
        assert_eq!(token.expose(), "abc123");
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("Token"))]
    #[case(Some("Basic dXNlcjpwdw=="))]
    #[case(Some("Token abc 123"))]
    fn rejects_missing_or_malformed_headers(#[case] header: Option<&str>) {
        let err = presented_token(&headers(header)).expect_err("header rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
