use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, header::HeaderMap, Method},
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{Identity, TokenService};
use crate::error::AppError;

/// Explicit allow-list of routes that skip authentication.
///
/// Matching is exact on method and path. Anything not listed requires a valid token,
/// including paths that do not exist.
#[derive(Debug, Default, Clone)]
pub struct PublicRoutes {
    entries: Vec<(Method, String)>,
}

impl PublicRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, method: Method, path: &str) -> Self {
        self.entries.push((method, path.to_string()));
        self
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        self.entries
            .iter()
            .any(|(m, p)| m == method && p == path)
    }
}

/// Resolves the caller's identity from the bearer token before any handler runs.
///
/// On success the [`Identity`] is stored in the request extensions. On failure the request
/// is answered with a uniform 401 and the inner service is never called.
#[derive(Clone)]
pub struct AuthMiddleware {
    tokens: Arc<TokenService>,
    public: Arc<PublicRoutes>,
}

impl AuthMiddleware {
    pub fn new(tokens: Arc<TokenService>, public: PublicRoutes) -> Self {
        Self {
            tokens,
            public: Arc::new(public),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            tokens: Arc::clone(&self.tokens),
            public: Arc::clone(&self.public),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    tokens: Arc<TokenService>,
    public: Arc<PublicRoutes>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.public.is_public(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        match resolve_identity(&self.tokens, req.headers()) {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                let fut = self.service.call(req);
                Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
            }
            Err(app_err) => {
                let response = req
                    .into_response(app_err.error_response())
                    .map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

fn resolve_identity(tokens: &TokenService, headers: &HeaderMap) -> Result<Identity, AppError> {
    let token = bearer_token(headers).ok_or_else(|| {
        log::debug!("request rejected: missing bearer token");
        unauthorized()
    })?;

    tokens.validate(token).map_err(|reason| {
        log::info!("request rejected: {}", reason);
        unauthorized()
    })
}

/// Extracts `<token>` from `Authorization: Bearer <token>`. The scheme is case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("Invalid or missing token".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test as actix_test, web, App, HttpResponse};
    use chrono::Duration;
    use uuid::Uuid;

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(b"middleware-test-secret", Duration::hours(1)))
    }

    async fn whoami(identity: Identity) -> HttpResponse {
        HttpResponse::Ok().body(identity.user_id.to_string())
    }

    async fn open() -> HttpResponse {
        HttpResponse::Ok().body("open")
    }

    #[test]
    fn test_public_routes_match_exactly() {
        let public = PublicRoutes::new().allow(Method::POST, "/auth/login");

        assert!(public.is_public(&Method::POST, "/auth/login"));
        assert!(!public.is_public(&Method::GET, "/auth/login"));
        assert!(!public.is_public(&Method::POST, "/auth/login/extra"));
        assert!(!public.is_public(&Method::POST, "/todos"));
        assert!(!PublicRoutes::new().is_public(&Method::GET, "/"));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, "bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[actix_rt::test]
    async fn test_middleware_resolves_and_rejects() {
        let tokens = tokens();
        let who = Identity {
            user_id: Uuid::new_v4(),
            key: "a@x.com".to_string(),
        };
        let valid = tokens.issue_default(&who).unwrap();
        let expired = tokens.issue(&who, Duration::seconds(-5)).unwrap();

        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(
                    Arc::clone(&tokens),
                    PublicRoutes::new().allow(Method::GET, "/open"),
                ))
                .route("/open", web::get().to(open))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/open").to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = actix_test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", valid)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(resp).await, who.user_id.to_string());

        let rejected = [
            None,
            Some(format!("Bearer {}", expired)),
            Some("Bearer not-a-token".to_string()),
            Some(format!("Token {}", valid)),
        ];
        let mut bodies = Vec::new();
        for header_value in rejected {
            let mut req = actix_test::TestRequest::get().uri("/me");
            if let Some(value) = header_value {
                req = req.insert_header((header::AUTHORIZATION, value));
            }
            let resp = actix_test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            bodies.push(actix_test::read_body(resp).await);
        }
        // Every failure looks the same to the client.
        assert!(bodies.windows(2).all(|w| w[0] == w[1]));
    }

    #[actix_rt::test]
    async fn test_unlisted_route_fails_closed() {
        let app = actix_test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(tokens(), PublicRoutes::new()))
                .route("/open", web::get().to(open)),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/open").to_request();
        assert_eq!(
            actix_test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
