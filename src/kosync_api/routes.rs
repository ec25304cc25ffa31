use std::sync::Arc;

use poem_openapi::{
    OpenApi,
    param::{Header, Path},
    payload::{Json, PlainText},
};

use super::models::{
    AuthResponseDto, CreateUserRequestDto, CreateUserResponseDto, HealthResponseDto,
    ProgressGetResponseDto, ProgressPutResponseDto, ProgressUpdateDto,
};
use super::services::{
    error_json, health::HealthService, progress::ProgressService, run_blocking,
    users::UserService,
};
use crate::sync::SyncService;

pub struct KosyncApi {
    pub sync: Arc<SyncService>,
}

#[OpenApi]
impl KosyncApi {
    #[oai(path = "/", method = "get")]
    async fn index(&self) -> PlainText<String> {
        HealthService.banner()
    }

    #[oai(path = "/healthcheck", method = "get")]
    #[tracing::instrument(level = "debug", skip(self))]
    async fn healthcheck(&self) -> HealthResponseDto {
        HealthService.health()
    }

    // ===== Users =====

    /// Register a new user
    #[oai(path = "/users/create", method = "post")]
    #[tracing::instrument(level = "debug", skip(self, body))]
    async fn create_user(&self, body: Json<CreateUserRequestDto>) -> CreateUserResponseDto {
        let sync = self.sync.clone();
        run_blocking(
            move || UserService::new(&sync).create(body.0),
            || CreateUserResponseDto::InternalError(error_json("Internal Error")),
        )
        .await
    }

    /// Check a user's credentials
    #[oai(path = "/users/auth", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, auth_user, auth_key))]
    async fn auth_user(
        &self,
        #[oai(name = "x-auth-user")] auth_user: Header<Option<String>>,
        #[oai(name = "x-auth-key")] auth_key: Header<Option<String>>,
    ) -> AuthResponseDto {
        let sync = self.sync.clone();
        let (user, key) = (auth_user.0, auth_key.0);
        run_blocking(
            move || UserService::new(&sync).auth(user.as_deref(), key.as_deref()),
            || AuthResponseDto::InternalError(error_json("Internal Error")),
        )
        .await
    }

    // ===== Progress =====

    /// Store reading progress for a document
    #[oai(path = "/syncs/progress", method = "put")]
    #[tracing::instrument(level = "debug", skip(self, auth_user, auth_key, body))]
    async fn update_progress(
        &self,
        #[oai(name = "x-auth-user")] auth_user: Header<Option<String>>,
        #[oai(name = "x-auth-key")] auth_key: Header<Option<String>>,
        body: Json<ProgressUpdateDto>,
    ) -> ProgressPutResponseDto {
        let sync = self.sync.clone();
        let (user, key) = (auth_user.0, auth_key.0);
        run_blocking(
            move || ProgressService::new(&sync).update(user.as_deref(), key.as_deref(), body.0),
            || ProgressPutResponseDto::InternalError(error_json("Internal Error")),
        )
        .await
    }

    /// Fetch the latest reading progress for a document
    #[oai(path = "/syncs/progress/:document", method = "get")]
    #[tracing::instrument(level = "debug", skip(self, auth_user, auth_key, document))]
    async fn get_progress(
        &self,
        #[oai(name = "x-auth-user")] auth_user: Header<Option<String>>,
        #[oai(name = "x-auth-key")] auth_key: Header<Option<String>>,
        document: Path<String>,
    ) -> ProgressGetResponseDto {
        let sync = self.sync.clone();
        let (user, key) = (auth_user.0, auth_key.0);
        run_blocking(
            move || ProgressService::new(&sync).get(user.as_deref(), key.as_deref(), &document.0),
            || ProgressGetResponseDto::InternalError(error_json("Internal Error")),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use poem::{Route, http::StatusCode, test::TestClient};
    use poem_openapi::OpenApiService;
    use serde_json::json;

    use super::*;
    use crate::{
        domain::{CredentialHasher, clock::FixedClock},
        storage::FileStore,
    };

    const USER: &str = "arst";
    const PASSWORD: &str = "arstarst";
    const DOCUMENT: &str = "arstarstarstarst";
    const NOW: i64 = 1_750_000_000;

    fn client_with(registration: bool) -> (TestClient<Route>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let sync = SyncService::new(Arc::new(store), Arc::new(FixedClock::new(NOW)))
            .with_hasher(CredentialHasher::fast())
            .with_registration(registration);
        let api = OpenApiService::new(
            KosyncApi {
                sync: Arc::new(sync),
            },
            "test",
            "0",
        );
        (TestClient::new(Route::new().nest("/", api)), dir)
    }

    fn client() -> (TestClient<Route>, tempfile::TempDir) {
        client_with(true)
    }

    async fn register(cli: &TestClient<Route>) {
        cli.post("/users/create")
            .body_json(&json!({ "username": USER, "password": PASSWORD }))
            .send()
            .await
            .assert_status(StatusCode::CREATED);
    }

    async fn push_progress(cli: &TestClient<Route>, key: &str) -> poem::test::TestResponse {
        cli.put("/syncs/progress")
            .header("x-auth-user", USER)
            .header("x-auth-key", key)
            .body_json(&json!({
                "device": "snake",
                "progress": "30",
                "document": DOCUMENT,
                "percentage": 0.1,
                "device_id": "1234",
                "timestamp": 1711992660
            }))
            .send()
            .await
    }

    #[tokio::test]
    async fn create_returns_token() {
        let (cli, _dir) = client();
        let resp = cli
            .post("/users/create")
            .body_json(&json!({ "username": USER, "password": PASSWORD }))
            .send()
            .await;
        resp.assert_status(StatusCode::CREATED);
        let body = resp.json().await;
        let body = body.value().object();
        body.get("username").assert_string(USER);
        body.get("authKey").assert_string(PASSWORD);
        body.get("password").assert_string(PASSWORD);
    }

    #[tokio::test]
    async fn create_duplicate_is_rejected() {
        let (cli, _dir) = client();
        register(&cli).await;
        cli.post("/users/create")
            .body_json(&json!({ "username": USER, "password": "other" }))
            .send()
            .await
            .assert_status(StatusCode::PAYMENT_REQUIRED);
    }

    #[tokio::test]
    async fn create_when_registration_disabled() {
        let (cli, _dir) = client_with(false);
        let resp = cli
            .post("/users/create")
            .body_json(&json!({ "username": USER, "password": PASSWORD }))
            .send()
            .await;
        resp.assert_status(StatusCode::UNAUTHORIZED);
        resp.assert_json(json!({ "message": "Registration disabled" }))
            .await;
    }

    #[tokio::test]
    async fn auth_accepts_token_and_rejects_mutations() {
        let (cli, _dir) = client();
        register(&cli).await;

        let resp = cli
            .get("/users/auth")
            .header("x-auth-user", USER)
            .header("x-auth-key", PASSWORD)
            .send()
            .await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({ "authorized": "OK" })).await;

        cli.get("/users/auth")
            .header("x-auth-user", USER)
            .header("x-auth-key", format!("bad_{PASSWORD}"))
            .send()
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        cli.get("/users/auth")
            .send()
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn progress_round_trip_uses_server_time() {
        let (cli, _dir) = client();
        register(&cli).await;

        let resp = push_progress(&cli, PASSWORD).await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({ "document": DOCUMENT, "timestamp": NOW }))
            .await;

        let resp = cli
            .get(format!("/syncs/progress/{DOCUMENT}"))
            .header("x-auth-user", USER)
            .header("x-auth-key", PASSWORD)
            .send()
            .await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({
            "document": DOCUMENT,
            "percentage": 0.1,
            "progress": "30",
            "device": "snake",
            "device_id": "1234",
            "timestamp": NOW
        }))
        .await;
    }

    #[tokio::test]
    async fn progress_requires_auth() {
        let (cli, _dir) = client();
        register(&cli).await;

        push_progress(&cli, &format!("{PASSWORD}_bad"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        cli.get(format!("/syncs/progress/{DOCUMENT}"))
            .header("x-auth-user", USER)
            .header("x-auth-key", format!("{PASSWORD}_bad"))
            .send()
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_document_is_not_found() {
        let (cli, _dir) = client();
        register(&cli).await;
        push_progress(&cli, PASSWORD).await.assert_status_is_ok();

        cli.get(format!("/syncs/progress/{DOCUMENT}_fake"))
            .header("x-auth-user", USER)
            .header("x-auth-key", PASSWORD)
            .send()
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn colon_in_username_or_document_is_bad_request() {
        let (cli, _dir) = client();
        register(&cli).await;

        cli.post("/users/create")
            .body_json(&json!({ "username": "arst:document:doc1", "password": PASSWORD }))
            .send()
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        cli.put("/syncs/progress")
            .header("x-auth-user", USER)
            .header("x-auth-key", PASSWORD)
            .body_json(&json!({
                "document": "doc1:key",
                "percentage": 0.1,
                "progress": "30",
                "device": "snake",
                "device_id": "1234"
            }))
            .send()
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn healthcheck_and_banner() {
        let (cli, _dir) = client();
        let resp = cli.get("/healthcheck").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({ "state": "OK" })).await;

        let resp = cli.get("/").send().await;
        resp.assert_status_is_ok();
        resp.assert_text(crate::kosync_api::services::health::BANNER)
            .await;
    }
}
