//! Account endpoints: signup, login, profile, password change, and account
//! deletion.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::account::{Password, UserAccount};
use crate::domain::{Error, ProfileUpdate};

use super::auth::Identity;
use super::error::ApiResult;
use super::listings::ListingDto;
use super::state::HttpState;
use super::uploads::{ImagePayload, decode_image};

/// External representation of an account; never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    /// Account identifier.
    pub id: String,
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Optional contact number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    /// Optional profile picture reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&UserAccount> for ProfileDto {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.id.to_string(),
            full_name: account.full_name.as_ref().to_owned(),
            email: account.email.as_ref().to_owned(),
            contact_number: account
                .contact_number
                .as_ref()
                .map(|number| number.as_ref().to_owned()),
            profile_picture: account
                .profile_picture
                .as_ref()
                .map(|reference| reference.as_ref().to_owned()),
            created_at: account.created_at,
        }
    }
}

/// Request body for `POST /api/v1/signup`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password; hashed before storage.
    pub password: String,
    /// Optional contact number.
    #[serde(default)]
    pub contact_number: Option<String>,
}

/// Request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Request body for `PUT /api/v1/profile`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Replacement full name.
    pub full_name: Option<String>,
    /// Replacement contact number.
    pub contact_number: Option<String>,
    /// Replacement profile picture.
    pub profile_picture: Option<ImagePayload>,
}

/// Request body for `POST /api/v1/change-password`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// The caller's current password.
    pub current_password: String,
    /// The replacement password.
    pub new_password: String,
}

/// Response body for signup and login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Signed identity token.
    pub token: String,
    /// The authenticated account.
    pub user: ProfileDto,
}

/// Response body for the profile endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// The caller's account.
    pub user: ProfileDto,
    /// Listings the caller owns.
    pub cars: Vec<ListingDto>,
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation failure", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["accounts"],
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let password = Password::new(body.password).map_err(Error::from)?;
    let authenticated = state
        .accounts
        .signup(crate::domain::SignupRequest {
            full_name: body.full_name,
            email: body.email,
            password,
            contact_number: body.contact_number,
        })
        .await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "Signup successful".into(),
        token: authenticated.token,
        user: ProfileDto::from(&authenticated.account),
    }))
}

/// Authenticate and obtain a fresh token.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["accounts"],
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let password = Password::new(body.password).map_err(Error::from)?;
    let authenticated = state.accounts.login(body.email, password).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".into(),
        token: authenticated.token,
        user: ProfileDto::from(&authenticated.account),
    }))
}

/// Fetch the caller's profile and listings.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile and owned listings", body = ProfileResponse),
        (status = 401, description = "Authentication required", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["accounts"],
    security(("BearerToken" = []))
)]
#[get("/profile")]
pub async fn profile(
    identity: Identity,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let (account, listings) = state.accounts.profile(&identity.0).await?;
    Ok(web::Json(ProfileResponse {
        user: ProfileDto::from(&account),
        cars: listings.iter().map(ListingDto::from).collect(),
    }))
}

/// Update the caller's profile fields or picture.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileDto),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Authentication required", body = Error)
    ),
    tags = ["accounts"],
    security(("BearerToken" = []))
)]
#[put("/profile")]
pub async fn update_profile(
    identity: Identity,
    state: web::Data<HttpState>,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<ProfileDto>> {
    let body = payload.into_inner();
    let picture = body.profile_picture.map(decode_image).transpose()?;
    let account = state
        .accounts
        .update_profile(
            &identity.0,
            ProfileUpdate {
                full_name: body.full_name,
                contact_number: body.contact_number,
                picture,
            },
        )
        .await?;
    Ok(web::Json(ProfileDto::from(&account)))
}

/// Change the caller's password after re-verifying the current one.
#[utoipa::path(
    post,
    path = "/api/v1/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Wrong current password or missing token", body = Error)
    ),
    tags = ["accounts"],
    security(("BearerToken" = []))
)]
#[post("/change-password")]
pub async fn change_password(
    identity: Identity,
    state: web::Data<HttpState>,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let current = Password::new(body.current_password).map_err(Error::from)?;
    let new = Password::new(body.new_password).map_err(Error::from)?;
    state
        .accounts
        .change_password(&identity.0, current, new)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Password changed successfully" })))
}

/// Delete the caller's account, their listings, and all stored files.
#[utoipa::path(
    delete,
    path = "/api/v1/account",
    responses(
        (status = 200, description = "Account deleted"),
        (status = 401, description = "Authentication required", body = Error)
    ),
    tags = ["accounts"],
    security(("BearerToken" = []))
)]
#[delete("/account")]
pub async fn delete_account(
    identity: Identity,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    state.accounts.delete_account(&identity.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Account deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::UserId;
    use crate::inbound::http::test_utils::{test_state, token_for};
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

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
            .service(
                web::scope("/api/v1")
                    .service(signup)
                    .service(login)
                    .service(profile)
                    .service(update_profile)
                    .service(change_password)
                    .service(delete_account),
            )
    }

    fn signup_body() -> Value {
        json!({
            "fullName": "Ayesha Khan",
            "email": "ayesha@example.test",
            "password": "secret123",
            "contactNumber": "03001234567"
        })
    }

    #[actix_web::test]
    async fn signup_returns_a_token_and_the_profile() {
        let app = actix_test::init_service(app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/signup")
                .set_json(signup_body())
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = serde_json::from_slice(&actix_test::read_body(response).await)
            .expect("response JSON");
        assert!(body["token"].as_str().is_some_and(|token| !token.is_empty()));
        assert_eq!(body["user"]["email"], "ayesha@example.test");
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[rstest]
    #[case(json!({ "email": "not-an-email" }), "email")]
    #[case(json!({ "password": "five5" }), "password")]
    #[case(json!({ "contactNumber": "12345" }), "contactNumber")]
    #[case(json!({ "fullName": "  " }), "fullName")]
    #[actix_web::test]
    async fn signup_rejects_invalid_fields(#[case] patch: Value, #[case] field: &str) {
        let mut body = signup_body();
        for (key, value) in patch.as_object().expect("patch object") {
            body[key] = value.clone();
        }

        let app = actix_test::init_service(app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/signup")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: Value = serde_json::from_slice(&actix_test::read_body(response).await)
            .expect("error JSON");
        assert_eq!(error["details"]["field"], field);
    }

    #[actix_web::test]
    async fn login_with_unknown_email_yields_a_generic_error() {
        let app = actix_test::init_service(app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "email": "ghost@example.test", "password": "whatever1" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error: Value = serde_json::from_slice(&actix_test::read_body(response).await)
            .expect("error JSON");
        assert_eq!(error["message"], "invalid credentials");
    }

    #[rstest]
    #[case::profile_get("GET", "/api/v1/profile")]
    #[case::profile_put("PUT", "/api/v1/profile")]
    #[case::change_password("POST", "/api/v1/change-password")]
    #[case::delete_account("DELETE", "/api/v1/account")]
    #[actix_web::test]
    async fn protected_endpoints_require_a_token(#[case] method: &str, #[case] uri: &str) {
        let app = actix_test::init_service(app(test_state())).await;
        let request = match method {
            "GET" => actix_test::TestRequest::get(),
            "PUT" => actix_test::TestRequest::put(),
            "POST" => actix_test::TestRequest::post(),
            _ => actix_test::TestRequest::delete(),
        }
        .uri(uri)
        .set_json(json!({}))
        .to_request();

        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }

    #[actix_web::test]
    async fn update_profile_rejects_an_empty_body() {
        let app = actix_test::init_service(app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri("/api/v1/profile")
                .insert_header((header::AUTHORIZATION, token_for(&UserId::random())))
                .set_json(json!({}))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn change_password_enforces_the_eight_character_minimum() {
        let app = actix_test::init_service(app(test_state())).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/change-password")
                .insert_header((header::AUTHORIZATION, token_for(&UserId::random())))
                .set_json(json!({ "currentPassword": "secret123", "newPassword": "seven77" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
