//! Requester identity.
//!
//! Callers identify themselves with an `X-User-Id` header carrying their
//! UUID. No header means an anonymous request.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use fr_core::AppError;
use futures_util::future::{ready, Ready};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "X-User-Id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester(pub Option<Uuid>);

impl Requester {
    /// The requester's id, or `Unauthorized` for anonymous callers.
    pub fn require(&self) -> Result<Uuid, AppError> {
        self.0
            .ok_or_else(|| AppError::Unauthorized("You must be logged in.".to_string()))
    }
}

impl FromRequest for Requester {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse(req).map(Requester).map_err(ApiError))
    }
}

fn parse(req: &HttpRequest) -> Result<Option<Uuid>, AppError> {
    let Some(raw) = req.headers().get(USER_ID_HEADER) else {
        return Ok(None);
    };
    raw.to_str()
        .ok()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .map(Some)
        .ok_or_else(|| AppError::ValidationError(format!("{USER_ID_HEADER} must be a UUID.")))
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn header_is_optional_but_must_parse() {
        let id = Uuid::now_v7();

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, id.to_string()))
            .to_http_request();
        assert_eq!(parse(&req).unwrap(), Some(id));

        let req = TestRequest::default().to_http_request();
        assert_eq!(parse(&req).unwrap(), None);

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "alice"))
            .to_http_request();
        assert!(matches!(parse(&req), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn anonymous_requesters_are_unauthorized() {
        assert!(matches!(Requester(None).require(), Err(AppError::Unauthorized(_))));
        let id = Uuid::now_v7();
        assert_eq!(Requester(Some(id)).require().unwrap(), id);
    }
}
