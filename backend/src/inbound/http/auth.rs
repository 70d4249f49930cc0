//! Bearer-token authentication extractor.
//!
//! Handlers that require a caller identity take [`Identity`] as an argument;
//! extraction fails with `401 Unauthorized` before the handler body runs.

use std::future::{Ready, ready};

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};

use crate::domain::account::UserId;
use crate::domain::ports::TokenError;
use crate::domain::Error;

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// The authenticated caller, resolved from the `Authorization` header.
#[derive(Debug, Clone, Copy)]
pub struct Identity(pub UserId);

fn identity_from_request(req: &HttpRequest) -> Result<Identity, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state not configured"))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| Error::unauthorized("authentication required"))?;

    match state.tokens.resolve(token) {
        Ok(user_id) => Ok(Identity(user_id)),
        Err(TokenError::Expired) => Err(Error::unauthorized("token has expired")),
        Err(_) => Err(Error::unauthorized("invalid token")),
    }
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{test_state, token_for};
    use actix_web::{App, HttpResponse, test as actix_test};

    async fn whoami(identity: Identity) -> HttpResponse {
        HttpResponse::Ok().body(identity.0.to_string())
    }

    fn app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
                actix_web::dev::ServiceRequest,
                Config = (),
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
                InitError = (),
            >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .route("/whoami", web::get().to(whoami))
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorised() {
        let app = actix_test::init_service(app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/whoami").to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn malformed_scheme_is_unauthorised() {
        let app = actix_test::init_service(app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header((header::AUTHORIZATION, "Token abc"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn valid_bearer_token_resolves_the_identity() {
        let app = actix_test::init_service(app(test_state())).await;
        let identity = UserId::random();
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/whoami")
                .insert_header((header::AUTHORIZATION, token_for(&identity)))
                .to_request(),
        )
        .await;
        assert!(response.status().is_success());
        let body = actix_test::read_body(response).await;
        assert_eq!(body, identity.to_string().as_bytes());
    }
}
