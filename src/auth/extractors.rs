use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Identity;
use crate::error::AppError;

/// Hands the identity resolved by `AuthMiddleware` to a handler as an explicit parameter.
///
/// Handlers never look at the `Authorization` header themselves. If the middleware did not
/// run for this route the extension is absent and the request is rejected.
impl FromRequest for Identity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>().cloned() {
            Some(identity) => ready(Ok(identity)),
            None => {
                log::error!("no resolved identity for {}", req.path());
                let err = AppError::Unauthorized("Authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use uuid::Uuid;

    #[actix_rt::test]
    async fn test_identity_extractor_success() {
        let who = Identity {
            user_id: Uuid::new_v4(),
            key: "a@x.com".to_string(),
        };
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(who.clone());

        let mut payload = Payload::None;
        let extracted = Identity::from_request(&req, &mut payload).await;
        assert_eq!(extracted.unwrap(), who);
    }

    #[actix_rt::test]
    async fn test_identity_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = Identity::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
