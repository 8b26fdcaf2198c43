// Token manager against a mocked authorization endpoint, with a manual clock:
//  - first call fetches, calls inside the validity window are served from cache
//  - calls inside the refresh buffer fetch exactly once more
//  - failures leave the slot untouched and are never masked by a stale token

#[cfg(test)]
mod test {

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::Form;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use httpmock::Method::POST;
    use httpmock::MockServer;

    use crate::auth::error::AuthError;
    use crate::auth::provider::TokenProvider;
    use crate::config::booking_api::BookingApiConfig;
    use crate::tests::common::{
        booking_api, closed_port_url, json, mock_token, spawn_axum, token_manager, ManualClock,
    };

    const HOUR_MS: i64 = 3_600_000;

    #[tokio::test]
    async fn first_call_fetches_and_second_call_uses_cache() {
        let server = MockServer::start_async().await;
        let token_mock = mock_token(&server, "tok1", 3600);
        let clock = ManualClock::at(0);
        let manager = token_manager(booking_api(&server.base_url()), clock.clone());

        // t=0: one exchange
        assert_eq!(manager.get_token().await.unwrap(), "tok1");
        assert_eq!(token_mock.hits(), 1);

        let cached = manager.slot().get().await.unwrap();
        assert_eq!(cached.expires_at_ms, HOUR_MS);

        // t=1_000_000: well inside the window, no exchange
        clock.set(1_000_000);
        assert_eq!(manager.get_token().await.unwrap(), "tok1");
        assert_eq!(token_mock.hits(), 1);
    }

    #[tokio::test]
    async fn call_inside_refresh_buffer_fetches_new_token() {
        let server = MockServer::start_async().await;
        let mut first = mock_token(&server, "tok1", 3600);
        let clock = ManualClock::at(0);
        let manager = token_manager(booking_api(&server.base_url()), clock.clone());

        assert_eq!(manager.get_token().await.unwrap(), "tok1");
        first.delete();

        let second = mock_token(&server, "tok2", 3600);
        let now = HOUR_MS - 250_000;
        clock.set(now);

        assert_eq!(manager.get_token().await.unwrap(), "tok2");
        assert_eq!(second.hits(), 1);

        let cached = manager.slot().get().await.unwrap();
        assert_eq!(cached.access_token, "tok2");
        assert_eq!(cached.expires_at_ms, now + HOUR_MS);
        assert!(cached.expires_at_ms > HOUR_MS);

        // the fresh token is served from cache again
        assert_eq!(manager.get_token().await.unwrap(), "tok2");
        assert_eq!(second.hits(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_cache_and_retries_on_next_call() {
        let server = MockServer::start_async().await;
        let mut first = mock_token(&server, "tok1", 3600);
        let clock = ManualClock::at(0);
        let manager = token_manager(booking_api(&server.base_url()), clock.clone());
        assert_eq!(manager.get_token().await.unwrap(), "tok1");
        first.delete();

        let failing = server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(500).body("upstream down");
        });
        clock.set(HOUR_MS - 100_000);

        let err = manager.get_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Upstream { status: 500, .. }), "{err}");
        assert_eq!(failing.hits(), 1);

        // slot untouched, but the stale token is never handed out
        let cached = manager.slot().get().await.unwrap();
        assert_eq!(cached.access_token, "tok1");
        assert_eq!(cached.expires_at_ms, HOUR_MS);

        let err = manager.get_token().await.unwrap_err();
        assert_eq!(err.reason(), "upstream");
        assert_eq!(failing.hits(), 2);
    }

    #[tokio::test]
    async fn missing_client_secret_fails_without_network_call() {
        let server = MockServer::start_async().await;
        let token_mock = mock_token(&server, "tok1", 3600);
        let api = BookingApiConfig {
            client_secret: None,
            ..booking_api(&server.base_url())
        };
        let manager = token_manager(api, ManualClock::at(0));

        let err = manager.get_token().await.unwrap_err();
        match err {
            AuthError::Configuration(missing) => assert_eq!(missing.missing, vec!["client_secret"]),
            other => panic!("expected configuration error, got {other}"),
        }
        assert_eq!(token_mock.hits(), 0);
        assert!(manager.slot().get().await.is_none());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let manager = token_manager(booking_api(&closed_port_url().await), ManualClock::at(0));

        let err = manager.get_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)), "{err}");
        assert!(manager.slot().get().await.is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_an_upstream_error() {
        let server = MockServer::start_async().await;
        let token_mock = server.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(200).body("not json");
        });
        let manager = token_manager(booking_api(&server.base_url()), ManualClock::at(0));

        let err = manager.get_token().await.unwrap_err();
        assert!(matches!(err, AuthError::Upstream { status: 200, .. }), "{err}");
        assert_eq!(token_mock.hits(), 1);
        assert!(manager.slot().get().await.is_none());
    }

    #[tokio::test]
    async fn lifetime_shorter_than_buffer_is_rejected() {
        let server = MockServer::start_async().await;
        let token_mock = mock_token(&server, "short", 60);
        let manager = token_manager(booking_api(&server.base_url()), ManualClock::at(0));

        let err = manager.get_token().await.unwrap_err();
        assert_eq!(err.reason(), "upstream");
        assert_eq!(token_mock.hits(), 1);
        assert!(manager.slot().get().await.is_none());
    }

    #[tokio::test]
    async fn returned_tokens_are_always_outside_the_buffer() {
        let server = MockServer::start_async().await;
        let _token_mock = mock_token(&server, "tok1", 3600);
        let clock = ManualClock::at(0);
        let manager = token_manager(booking_api(&server.base_url()), clock.clone());

        for now in (0..4 * HOUR_MS).step_by(450_000) {
            clock.set(now);
            manager.get_token().await.unwrap();
            let cached = manager.slot().get().await.unwrap();
            assert!(cached.expires_at_ms - manager.refresh_buffer_ms() > now, "stale token at {now}");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_may_race_but_all_get_a_token() {
        let server = MockServer::start_async().await;
        let token_mock = mock_token(&server, "tok1", 3600);
        let manager = Arc::new(token_manager(booking_api(&server.base_url()), ManualClock::at(0)));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.get_token().await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "tok1");
        }

        let hits = token_mock.hits();
        assert!((1..=8).contains(&hits), "hits: {hits}");
        assert_eq!(manager.slot().get().await.unwrap().access_token, "tok1");
    }

    #[tokio::test]
    async fn exchange_sends_form_encoded_client_credentials() {
        type Seen = Arc<Mutex<Vec<(HeaderMap, HashMap<String, String>)>>>;
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let router = Router::new().route(
            "/token",
            post(move |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| {
                let seen = seen_clone.clone();
                async move {
                    seen.lock().unwrap().push((headers, form));
                    Json(json!({ "access_token": "form-tok", "expires_in": 3600 }))
                }
            }),
        );
        let (handle, addr) = spawn_axum(router).await;

        let manager = token_manager(booking_api(&format!("http://{}/", addr)), ManualClock::at(0));
        assert_eq!(manager.get_token().await.unwrap(), "form-tok");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (headers, form) = &seen[0];
        assert_eq!(headers["x-subscription-key"], "sub-key");
        assert_eq!(headers["content-type"], "application/x-www-form-urlencoded");
        assert_eq!(headers["accept"], "application/json");
        assert_eq!(form["grant_type"], "client_credentials");
        assert_eq!(form["client_id"], "client");
        assert_eq!(form["client_secret"], "secret");

        handle.abort();
    }
}
