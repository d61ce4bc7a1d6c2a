use crate::config::{AuthConfig, IdentityMode};
use crate::error::app_error::AppError;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;
use std::sync::Arc;

/// Resolves the identity provider's subject id for a request.
///
/// Sign-in, session lifetime and credential checks all live in the external
/// identity service; this service only asks "who is calling".
pub trait IdentityProvider: Send + Sync {
    fn current_user_id(&self, request: &Request<'_>) -> Option<String>;
}

/// Reads the subject id from an encrypted private cookie.
pub struct CookieSessionIdentity {
    cookie_name: String,
}

impl CookieSessionIdentity {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self { cookie_name: cookie_name.into() }
    }
}

impl IdentityProvider for CookieSessionIdentity {
    fn current_user_id(&self, request: &Request<'_>) -> Option<String> {
        let cookie = request.cookies().get_private(&self.cookie_name)?;
        normalize_subject(cookie.value())
    }
}

/// Trusts a header set by an authenticating gateway. Only safe when the
/// service is not reachable except through that gateway.
pub struct TrustedHeaderIdentity {
    header: String,
}

impl TrustedHeaderIdentity {
    pub fn new(header: impl Into<String>) -> Self {
        Self { header: header.into() }
    }
}

impl IdentityProvider for TrustedHeaderIdentity {
    fn current_user_id(&self, request: &Request<'_>) -> Option<String> {
        request.headers().get_one(&self.header).and_then(normalize_subject)
    }
}

/// Managed-state handle to the configured provider.
#[derive(Clone)]
pub struct Identity(pub Arc<dyn IdentityProvider>);

impl Identity {
    pub fn from_config(config: &AuthConfig) -> Self {
        match config.mode {
            IdentityMode::Cookie => Identity(Arc::new(CookieSessionIdentity::new(config.cookie_name.clone()))),
            IdentityMode::Header => Identity(Arc::new(TrustedHeaderIdentity::new(config.trusted_header.clone()))),
        }
    }
}

pub(crate) fn normalize_subject(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// The authenticated caller. Every owner-scoped operation takes its id.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: String,
}

pub(crate) fn resolve_user_id(req: &Request<'_>) -> Option<String> {
    let identity = req.rocket().state::<Identity>()?;
    identity.0.current_user_id(req)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        match resolve_user_id(req) {
            Some(id) => {
                let current_user = CurrentUser { id };
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            None => Outcome::Error((Status::Unauthorized, AppError::Unauthorized)),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Session issued by the identity provider (private cookie, or gateway header when configured).".to_string()),
            data: SecuritySchemeData::ApiKey {
                name: "session".to_string(),
                location: "cookie".to_string(),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("sessionAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("sessionAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - Authentication required".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::{Cookie, Header};
    use rocket::local::asynchronous::Client;
    use rocket::routes;

    #[rocket::get("/whoami")]
    fn whoami(user: CurrentUser) -> String {
        user.id
    }

    async fn client_with(identity: Identity) -> Client {
        let rocket = rocket::build().manage(identity).mount("/", routes![whoami]);
        Client::tracked(rocket).await.expect("valid rocket instance")
    }

    #[test]
    fn normalize_subject_rejects_blank() {
        assert_eq!(normalize_subject("   "), None);
        assert_eq!(normalize_subject(""), None);
        assert_eq!(normalize_subject(" user_2abc "), Some("user_2abc".to_string()));
    }

    #[rocket::async_test]
    async fn header_identity_resolves_caller() {
        let client = client_with(Identity(Arc::new(TrustedHeaderIdentity::new("X-Authenticated-User")))).await;
        let response = client.get("/whoami").header(Header::new("X-Authenticated-User", "user_42")).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.as_deref(), Some("user_42"));
    }

    #[rocket::async_test]
    async fn missing_identity_is_unauthorized() {
        let client = client_with(Identity(Arc::new(TrustedHeaderIdentity::new("X-Authenticated-User")))).await;
        let response = client.get("/whoami").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn cookie_identity_reads_private_cookie() {
        let client = client_with(Identity(Arc::new(CookieSessionIdentity::new("session")))).await;
        let response = client.get("/whoami").private_cookie(Cookie::new("session", "user_cookie")).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.as_deref(), Some("user_cookie"));
    }

    #[rocket::async_test]
    async fn plain_cookie_is_not_trusted() {
        let client = client_with(Identity(Arc::new(CookieSessionIdentity::new("session")))).await;
        let response = client.get("/whoami").cookie(Cookie::new("session", "forged")).dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }
}
