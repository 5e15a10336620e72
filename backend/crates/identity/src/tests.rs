//! Scenario tests for the identity crate
//! End-to-end flows over the in-memory store, plus the HTTP surface

#[cfg(test)]
mod scenario_tests {
    use std::sync::Arc;

    use crate::application::{AuthConfig, AuthEvent, AuthOrchestrator, AuthOutcome};
    use crate::domain::repository::FederatedCredentialRepository;
    use crate::domain::value_object::{Provider, Subject};
    use crate::error::{AuthError, AuthFailure, INVALID_CREDENTIALS, RegisterFailure};
    use crate::infra::memory::InMemoryCredentialStore;

    fn setup() -> (Arc<InMemoryCredentialStore>, AuthOrchestrator<InMemoryCredentialStore>) {
        let store = Arc::new(InMemoryCredentialStore::new());
        let orchestrator = AuthOrchestrator::new(store.clone(), Arc::new(AuthConfig::testing()));
        (store, orchestrator)
    }

    fn local_login(username: &str, password: &str) -> AuthEvent {
        AuthEvent::LocalLogin {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn local_register(username: &str, password: &str) -> AuthEvent {
        AuthEvent::LocalRegister {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn google(subject: &str, display_name: Option<&str>) -> AuthEvent {
        AuthEvent::FederatedLogin {
            provider: Provider::Google,
            subject: subject.to_string(),
            display_name: display_name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_alice_registers_and_logs_in() {
        let (_store, orchestrator) = setup();

        orchestrator
            .handle(local_register("alice", "secret123"))
            .await
            .unwrap();

        let AuthOutcome::SignedIn { user, .. } = orchestrator
            .handle(local_login("alice", "secret123"))
            .await
            .unwrap()
        else {
            panic!("expected SignedIn");
        };
        assert_eq!(user.username.as_str(), "alice");

        let err = orchestrator
            .handle(local_login("alice", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Login(AuthFailure::BadPassword)));
        assert_eq!(err.to_app_error().message(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_the_same() {
        let (_store, orchestrator) = setup();
        orchestrator
            .handle(local_register("alice", "secret123"))
            .await
            .unwrap();

        let unknown = orchestrator
            .handle(local_login("nobody", "secret123"))
            .await
            .unwrap_err();
        let wrong = orchestrator
            .handle(local_login("alice", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(unknown.status_code(), wrong.status_code());
        assert_eq!(
            unknown.to_app_error().message(),
            wrong.to_app_error().message()
        );
        assert!(matches!(unknown, AuthError::Login(AuthFailure::UnknownUser)));
        assert!(matches!(wrong, AuthError::Login(AuthFailure::BadPassword)));
    }

    #[tokio::test]
    async fn test_register_twice_keeps_one_row() {
        let (store, orchestrator) = setup();

        orchestrator
            .handle(local_register("alice", "secret123"))
            .await
            .unwrap();
        let err = orchestrator
            .handle(local_register("alice", "secret123"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AuthError::Register(RegisterFailure::UsernameTaken)
        ));
        assert_eq!(store.count_users_named("alice").await, 1);
    }

    #[tokio::test]
    async fn test_google_first_and_repeat_login() {
        let (store, orchestrator) = setup();

        let AuthOutcome::SignedIn { user: first, .. } = orchestrator
            .handle(google("ext-42", Some("Alice G.")))
            .await
            .unwrap()
        else {
            panic!("expected SignedIn");
        };
        assert_eq!(first.username.as_str(), "ext-42");
        assert_eq!(first.display_name.as_deref(), Some("Alice G."));

        let credential = store
            .find_federated_credential(Provider::Google, &Subject::new("ext-42").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credential.user_id, first.user_id);

        let AuthOutcome::SignedIn { user: again, .. } = orchestrator
            .handle(google("ext-42", Some("Renamed")))
            .await
            .unwrap()
        else {
            panic!("expected SignedIn");
        };
        assert_eq!(again.user_id, first.user_id);
        assert_eq!(store.count_credentials().await, 1);
    }

    #[tokio::test]
    async fn test_federated_user_cannot_password_login() {
        let (_store, orchestrator) = setup();
        orchestrator.handle(google("ext-42", None)).await.unwrap();

        let err = orchestrator
            .handle(local_login("ext-42", "anything"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Login(AuthFailure::NoPasswordSet)));
        assert_eq!(err.to_app_error().message(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_sessions_from_both_paths_decode_the_same_way() {
        let (_store, orchestrator) = setup();

        for event in [local_register("alice", "secret123"), google("ext-42", None)] {
            let AuthOutcome::SignedIn { user, session } = orchestrator.handle(event).await.unwrap()
            else {
                panic!("expected SignedIn");
            };
            let decoded = orchestrator.authenticate_session(&session).await.unwrap();
            assert_eq!(decoded, user);
        }
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::application::AuthConfig;
    use crate::infra::memory::InMemoryCredentialStore;
    use crate::presentation::dto::UserResponse;
    use crate::presentation::router::auth_router_generic;

    fn app() -> Router {
        let store = Arc::new(InMemoryCredentialStore::new());
        Router::new().nest(
            "/auth",
            auth_router_generic(store, Arc::new(AuthConfig::testing())),
        )
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// `name=value` part of a Set-Cookie header
    fn session_cookie(response: &axum::response::Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_register_sets_cookie_and_me_returns_user() {
        let app = app();

        let response = app
            .clone()
            .oneshot(json_post(
                "/auth/register",
                r#"{"username":"alice","password":"secret123"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = session_cookie(&response);
        assert!(cookie.starts_with("identity_session="));

        let response = app
            .oneshot(
                Request::get("/auth/me")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let user: UserResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.has_password);
    }

    #[tokio::test]
    async fn test_login_failures_share_body() {
        let app = app();
        app.clone()
            .oneshot(json_post(
                "/auth/register",
                r#"{"username":"alice","password":"secret123"}"#,
            ))
            .await
            .unwrap();

        let wrong = app
            .clone()
            .oneshot(json_post(
                "/auth/login/password",
                r#"{"username":"alice","password":"wrong"}"#,
            ))
            .await
            .unwrap();
        let unknown = app
            .oneshot(json_post(
                "/auth/login/password",
                r#"{"username":"bob","password":"secret123"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        assert!(wrong.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_json(wrong).await, body_json(unknown).await);
    }

    #[tokio::test]
    async fn test_duplicate_register_is_conflict() {
        let app = app();
        let body = r#"{"username":"alice","password":"secret123"}"#;

        let first = app
            .clone()
            .oneshot(json_post("/auth/register", body))
            .await
            .unwrap();
        let second = app.oneshot(json_post("/auth/register", body)).await.unwrap();

        assert_eq!(first.status(), StatusCode::CREATED);
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_me_without_cookie_is_unauthorized() {
        let response = app()
            .oneshot(Request::get("/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_me_with_forged_cookie_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::get("/auth/me")
                    .header(header::COOKIE, "identity_session=forged.value.sig")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let response = app()
            .oneshot(
                Request::post("/auth/logout")
                    .header(header::COOKIE, "identity_session=whatever")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
