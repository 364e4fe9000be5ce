//! Authentication routes: signup, signin, and the caller's avatar.

use axum::{
    Json, Router,
    extract::{Multipart, State, multipart::Field},
    middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::info;
use vouch_core::account::{CredentialStore, UploadedFile};
use vouch_shared::auth::{AvatarResponse, SigninRequest, TokenResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::{AuthUser, auth_middleware};

/// Multipart part carrying the signup profile image.
const SIGNUP_IMAGE_FIELD: &str = "profileImage";
/// Multipart part carrying the new avatar.
const AVATAR_FIELD: &str = "file";

/// Creates the auth router. Avatar routes require a bearer token.
pub fn routes<S: CredentialStore + 'static>(state: AppState<S>) -> Router<AppState<S>> {
    let protected = Router::new()
        .route("/avatar", get(get_avatar::<S>).put(update_avatar::<S>))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware::<S>));

    Router::new()
        .route("/signup", post(signup::<S>))
        .route("/signin", post(signin::<S>))
        .merge(protected)
}

/// POST /api/auth/signup - Register with email, password, and an optional image.
async fn signup<S: CredentialStore>(
    State(state): State<AppState<S>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut email = String::new();
    let mut password = String::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("email") => email = field.text().await?,
            Some("password") => password = field.text().await?,
            Some(SIGNUP_IMAGE_FIELD) => image = Some(read_file(field).await?),
            _ => {}
        }
    }

    let user = state.accounts.signup(&email, &password, image).await?;
    info!(user_id = %user.id, "Signup completed");

    Ok(Json(json!({})))
}

/// POST /api/auth/signin - Exchange credentials for a bearer token.
async fn signin<S: CredentialStore>(
    State(state): State<AppState<S>>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state
        .accounts
        .signin(&payload.email, &payload.password)
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// GET /api/auth/avatar - Current avatar reference of the caller.
async fn get_avatar<S: CredentialStore>(
    State(state): State<AppState<S>>,
    user: AuthUser,
) -> Result<Json<AvatarResponse>, ApiError> {
    let avatar_url = state.accounts.get_avatar(Some(&user.identity())).await?;
    Ok(Json(AvatarResponse { avatar_url }))
}

/// PUT /api/auth/avatar - Replace the caller's avatar.
async fn update_avatar<S: CredentialStore>(
    State(state): State<AppState<S>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, ApiError> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(AVATAR_FIELD) {
            file = Some(read_file(field).await?);
        }
    }

    let update = state
        .accounts
        .update_avatar(Some(&user.identity()), file)
        .await?;

    Ok(Json(AvatarResponse {
        avatar_url: update.avatar_url,
    }))
}

async fn read_file(field: Field<'_>) -> Result<UploadedFile, ApiError> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let content_type = field.content_type().map(str::to_owned);
    let bytes = field.bytes().await?;
    Ok(UploadedFile::new(file_name, content_type, bytes))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use vouch_core::account::{AccountService, InMemoryCredentialStore};
    use vouch_core::storage::{StorageConfig, StorageProvider, StorageService};
    use vouch_shared::JwtService;
    use vouch_shared::config::{AvatarConfig, JwtConfig};

    use super::*;

    const BASE_URL: &str = "https://cdn.example.com/media";
    const BOUNDARY: &str = "vouch-test-boundary";
    const EMAIL: &str = "a@x.com";
    const PASSWORD: &str = "P@ssw0rd1";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File {
            name: &'a str,
            file_name: &'a str,
            content_type: &'a str,
            bytes: &'a [u8],
        },
    }

    fn test_state() -> AppState<InMemoryCredentialStore> {
        state_with_storage(StorageConfig::new(StorageProvider::Memory, BASE_URL))
    }

    fn state_with_storage(config: StorageConfig) -> AppState<InMemoryCredentialStore> {
        let storage = Arc::new(
            StorageService::from_config(config).expect("should create storage"),
        );
        let jwt_service = Arc::new(
            JwtService::new(&JwtConfig {
                secret: Some("api-test-secret".into()),
                issuer: "vouch-test".into(),
            })
            .expect("should create jwt service"),
        );
        let accounts = Arc::new(AccountService::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::clone(&storage),
            Arc::clone(&jwt_service),
            &AvatarConfig::default(),
        ));

        AppState {
            accounts,
            jwt_service,
            storage,
        }
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                ),
                Part::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(
        method: &str,
        uri: &str,
        token: Option<&str>,
        parts: &[Part<'_>],
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(multipart_body(parts))).unwrap()
    }

    fn signin_request(email: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/auth/signin")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap()
    }

    fn avatar_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri("/api/auth/avatar");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn signup_and_signin(app: &Router) -> String {
        let (status, _) = send(
            app,
            multipart_request(
                "POST",
                "/api/auth/signup",
                None,
                &[Part::Text("email", EMAIL), Part::Text("password", PASSWORD)],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(app, signin_request(EMAIL, PASSWORD)).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    fn jpeg<'a>(name: &'a str, file_name: &'a str) -> Part<'a> {
        Part::File {
            name,
            file_name,
            content_type: "image/jpeg",
            bytes: b"\xff\xd8\xff\xe0 jpeg bytes",
        }
    }

    #[tokio::test]
    async fn test_health() {
        let app = crate::create_router(test_state());
        let (status, body) = send(
            &app,
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["storage"], "memory");
    }

    #[tokio::test]
    async fn test_signup_then_signin_returns_valid_token() {
        let state = test_state();
        let jwt = Arc::clone(&state.jwt_service);
        let app = crate::create_router(state);

        let token = signup_and_signin(&app).await;
        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.email, EMAIL);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[tokio::test]
    async fn test_signup_response_is_empty_object() {
        let app = crate::create_router(test_state());
        let (status, body) = send(
            &app,
            multipart_request(
                "POST",
                "/api/auth/signup",
                None,
                &[Part::Text("email", EMAIL), Part::Text("password", PASSWORD)],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn test_signup_weak_password_lists_reasons() {
        let app = crate::create_router(test_state());
        let (status, body) = send(
            &app,
            multipart_request(
                "POST",
                "/api/auth/signup",
                None,
                &[Part::Text("email", "not-an-email"), Part::Text("password", "abc")],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_INPUT");
        assert_eq!(body["reasons"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_signup_with_profile_image() {
        let state = test_state();
        let storage = Arc::clone(&state.storage);
        let app = crate::create_router(state);

        let (status, _) = send(
            &app,
            multipart_request(
                "POST",
                "/api/auth/signup",
                None,
                &[
                    Part::Text("email", EMAIL),
                    Part::Text("password", PASSWORD),
                    jpeg("profileImage", "face.jpg"),
                ],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, signin_request(EMAIL, PASSWORD)).await;
        let token = body["token"].as_str().unwrap();
        let (status, body) = send(&app, avatar_request(Some(token))).await;

        assert_eq!(status, StatusCode::OK);
        let url = body["avatarUrl"].as_str().unwrap();
        assert!(url.starts_with(BASE_URL));
        assert!(url.ends_with("/face.jpg"));
        assert_eq!(storage.list_keys("profile-images").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_local_fs_avatar_url_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_storage(StorageConfig::new(
            StorageProvider::LocalFs {
                root: dir.path().to_path_buf(),
            },
            "http://localhost:8080/media",
        ));
        let app = crate::create_router(state);

        let (status, _) = send(
            &app,
            multipart_request(
                "POST",
                "/api/auth/signup",
                None,
                &[
                    Part::Text("email", EMAIL),
                    Part::Text("password", PASSWORD),
                    jpeg("profileImage", "face.jpg"),
                ],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, signin_request(EMAIL, PASSWORD)).await;
        let token = body["token"].as_str().unwrap().to_string();
        let (_, body) = send(&app, avatar_request(Some(&token))).await;
        let url = body["avatarUrl"].as_str().unwrap();
        let path = url.strip_prefix("http://localhost:8080").unwrap();
        assert!(path.starts_with("/media/profile-images/"));

        let response = app
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"\xff\xd8\xff\xe0 jpeg bytes");
    }

    #[tokio::test]
    async fn test_media_route_only_exists_for_local_fs() {
        let app = crate::create_router(test_state());
        let (status, _) = send(
            &app,
            Request::builder()
                .uri("/media/profile-images/x.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_signin_failures_look_identical() {
        let app = crate::create_router(test_state());
        signup_and_signin(&app).await;

        let wrong_password = send(&app, signin_request(EMAIL, "Wr0ng!pass")).await;
        let unknown_email = send(&app, signin_request("b@x.com", PASSWORD)).await;

        assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password, unknown_email);
    }

    #[tokio::test]
    async fn test_avatar_requires_valid_token() {
        let app = crate::create_router(test_state());

        let (status, _) = send(&app, avatar_request(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, avatar_request(Some("not.a.token"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");

        let (status, _) = send(
            &app,
            multipart_request("PUT", "/api/auth/avatar", None, &[jpeg("file", "pic.jpg")]),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_then_get_avatar() {
        let app = crate::create_router(test_state());
        let token = signup_and_signin(&app).await;

        let (status, body) = send(&app, avatar_request(Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["avatarUrl"], AvatarConfig::default().default_url);

        let (status, body) = send(
            &app,
            multipart_request(
                "PUT",
                "/api/auth/avatar",
                Some(&token),
                &[jpeg("file", "pic.jpg")],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let new_url = body["avatarUrl"].as_str().unwrap().to_string();
        assert!(new_url.ends_with("pic.jpg"));

        let (_, body) = send(&app, avatar_request(Some(&token))).await;
        assert_eq!(body["avatarUrl"], new_url);
    }

    #[tokio::test]
    async fn test_update_without_file_is_invalid() {
        let app = crate::create_router(test_state());
        let token = signup_and_signin(&app).await;

        let (status, body) = send(
            &app,
            multipart_request(
                "PUT",
                "/api/auth/avatar",
                Some(&token),
                &[Part::Text("note", "no file here")],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reasons"], json!(["No file uploaded."]));
    }

    #[tokio::test]
    async fn test_update_rejects_non_image() {
        let app = crate::create_router(test_state());
        let token = signup_and_signin(&app).await;

        let (status, body) = send(
            &app,
            multipart_request(
                "PUT",
                "/api/auth/avatar",
                Some(&token),
                &[Part::File {
                    name: "file",
                    file_name: "cv.pdf",
                    content_type: "application/pdf",
                    bytes: b"%PDF-1.7",
                }],
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_INPUT");
    }
}
