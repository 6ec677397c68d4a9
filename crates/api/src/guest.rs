//! Guest identity from the `GuestId` cookie.
//!
//! The cart engine only ever receives an optional guest id. Issuing the
//! cookie happens here, in a middleware on the cart routes.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use cart_store::GuestId;

/// Name of the cookie carrying the guest id.
pub const GUEST_COOKIE: &str = "GuestId";

/// Lifetime of an issued guest cookie (two days).
pub const GUEST_COOKIE_MAX_AGE_SECS: u64 = 2 * 24 * 60 * 60;

/// Extracts the guest id if the request carries one.
///
/// Never rejects: a missing or blank cookie simply means there is no cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeGuest(pub Option<GuestId>);

impl MaybeGuest {
    pub fn guest_id(&self) -> Option<&GuestId> {
        self.0.as_ref()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeGuest {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeGuest(guest_from_headers(&parts.headers)))
    }
}

/// Finds the guest id among the request's cookies.
pub fn guest_from_headers(headers: &HeaderMap) -> Option<GuestId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == GUEST_COOKIE)
        .and_then(|(_, value)| GuestId::parse(value))
}

/// Builds the `Set-Cookie` value for a newly issued guest id.
pub fn guest_cookie(guest_id: &GuestId) -> String {
    format!(
        "{GUEST_COOKIE}={guest_id}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={GUEST_COOKIE_MAX_AGE_SECS}"
    )
}

/// Issues a fresh guest cookie on responses to requests that carried none.
///
/// The current request still counts as cookieless; the id takes effect from
/// the browser's next request.
pub async fn issue_guest_cookie(request: Request, next: Next) -> Response {
    let has_guest = guest_from_headers(request.headers()).is_some();
    let mut response = next.run(request).await;

    if !has_guest {
        let guest_id = GuestId::generate();
        match HeaderValue::from_str(&guest_cookie(&guest_id)) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
                tracing::debug!(%guest_id, "issued guest cookie");
            }
            Err(error) => tracing::warn!(%error, "could not encode guest cookie"),
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn finds_guest_among_other_cookies() {
        let found = guest_from_headers(&headers(&["theme=dark; GuestId=abc-123; lang=en"]));
        assert_eq!(found, GuestId::parse("abc-123"));
    }

    #[test]
    fn searches_every_cookie_header() {
        let found = guest_from_headers(&headers(&["theme=dark", "GuestId=xyz"]));
        assert_eq!(found, GuestId::parse("xyz"));
    }

    #[test]
    fn missing_or_blank_cookie_is_no_guest() {
        assert_eq!(guest_from_headers(&headers(&[])), None);
        assert_eq!(guest_from_headers(&headers(&["GuestId="])), None);
        assert_eq!(guest_from_headers(&headers(&["guestid=abc"])), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = guest_cookie(&GuestId::parse("abc").unwrap());
        assert_eq!(
            cookie,
            "GuestId=abc; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=172800"
        );
    }
}
