use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorBadRequest};
use futures::future::{Ready, ready};

use crate::config::ServiceProps;

pub const BUSINESS_ID_HEADER: &str = "X-Business-Id";
pub const STAFF_ID_HEADER: &str = "X-Staff-Id";

/// Tenant binding of a request, taken from the `X-Business-Id` and optional
/// `X-Staff-Id` headers.
pub struct TenantContext {
    pub props: ServiceProps,
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl FromRequest for TenantContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let business_id = match header(req, BUSINESS_ID_HEADER) {
            Some(id) => id,
            None => return ready(Err(ErrorBadRequest("Missing X-Business-Id header"))),
        };
        let staff_id = header(req, STAFF_ID_HEADER);

        ready(Ok(TenantContext {
            props: ServiceProps::new(business_id, staff_id),
        }))
    }
}
