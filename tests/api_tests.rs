//! Integration tests for trakt-rs
//!
//! Most tests run the client against an in-process transport that records
//! every request and replays canned responses, so they need no network.
//!
//! The `live_tests` module talks to the real API and is ignored by default.
//! It needs:
//! - TRAKT_CLIENT_ID: OAuth client id
//! - TRAKT_CLIENT_SECRET: OAuth client secret
//!
//! Run with: cargo test --test api_tests -- --ignored --test-threads=1

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use trakt_rs::client::BoxFuture;
use trakt_rs::prelude::*;
use trakt_rs::{HttpResponse, MemoryTokenStore, PreparedRequest, RetryConfig, Transport};

static INIT: Once = Once::new();

/// Initialize logging for tests
fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// ============================================================================
// Test transport
// ============================================================================

/// Replays queued responses in order and records every request.
#[derive(Default)]
struct MockTransport {
    responses: Mutex<VecDeque<trakt_rs::Result<HttpResponse>>>,
    requests: Mutex<Vec<PreparedRequest>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn respond(&self, status: u16, body: Value) -> &Self {
        let body = if body.is_null() {
            Vec::new()
        } else {
            serde_json::to_vec(&body).unwrap()
        };
        self.push(HttpResponse::new(StatusCode::from_u16(status).unwrap(), body))
    }

    fn push(&self, response: HttpResponse) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    fn fail(&self, error: trakt_rs::Error) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last(&self) -> PreparedRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: PreparedRequest) -> BoxFuture<'_, trakt_rs::Result<HttpResponse>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::new(StatusCode::NOT_FOUND, Vec::new())))
        })
    }
}

/// Never answers.
struct StalledTransport;

impl Transport for StalledTransport {
    fn execute(&self, _request: PreparedRequest) -> BoxFuture<'_, trakt_rs::Result<HttpResponse>> {
        Box::pin(futures_util::future::pending())
    }
}

fn credentials() -> Credentials {
    Credentials::new("client-id", "client-secret").with_application_id("1234")
}

fn config() -> ClientConfig {
    ClientConfig::default().with_retry(
        RetryConfig::default()
            .with_initial_backoff(Duration::from_millis(1))
            .with_max_backoff(Duration::from_millis(5)),
    )
}

fn client_with(transport: Arc<dyn Transport>, store: Arc<MemoryTokenStore>) -> TraktClient {
    init_logging();
    TraktClient::with_parts(credentials(), config(), transport, store).unwrap()
}

fn anonymous(transport: &Arc<MockTransport>) -> TraktClient {
    client_with(transport.clone(), Arc::new(MemoryTokenStore::new()))
}

fn authenticated(transport: &Arc<MockTransport>) -> TraktClient {
    let token = Token::new("access-123", 7200).with_refresh_token("refresh-456");
    client_with(transport.clone(), Arc::new(MemoryTokenStore::with_token(token)))
}

fn header(request: &PreparedRequest, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .map(|v| v.to_str().unwrap().to_string())
}

fn movie(trakt: u64) -> Movie {
    Movie::from_json(&json!({"title": "Tron: Legacy", "year": 2010, "ids": {"trakt": trakt}})).unwrap()
}

// ============================================================================
// Submit
// ============================================================================

mod submit_tests {
    use super::*;

    #[tokio::test]
    async fn test_authorization_required_sends_nothing() {
        let transport = MockTransport::new();
        let client = anonymous(&transport);

        let result = client.sync().watchlist(MediaType::Movies).await;
        assert!(matches!(
            result,
            Err(Error::AuthorizationRequired { route: "Watchlist" })
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_public_route_has_api_headers_without_bearer() {
        let transport = MockTransport::new();
        transport.respond(200, json!([]));
        let client = authenticated(&transport);

        client
            .discover()
            .trending(MediaType::Movies, None)
            .await
            .unwrap();

        let request = transport.last();
        assert_eq!(header(&request, "trakt-api-version").as_deref(), Some("2"));
        assert_eq!(header(&request, "trakt-api-key").as_deref(), Some("client-id"));
        assert_eq!(
            header(&request, "content-type").as_deref(),
            Some("application/json")
        );
        assert!(header(&request, "user-agent").unwrap().starts_with("trakt-rs/"));
        assert!(header(&request, "authorization").is_none());
    }

    #[tokio::test]
    async fn test_private_route_carries_bearer() {
        let transport = MockTransport::new();
        transport.respond(200, json!([]));
        let client = authenticated(&transport);

        client.sync().collection(MediaType::Shows).await.unwrap();

        let request = transport.last();
        assert_eq!(request.path(), "/sync/collection/shows");
        assert_eq!(
            header(&request, "authorization").as_deref(),
            Some("Bearer access-123")
        );
    }

    #[tokio::test]
    async fn test_api_error_carries_status_and_body() {
        let transport = MockTransport::new();
        transport.respond(404, Value::Null);
        let client = anonymous(&transport);

        match client.media().movie("does-not-exist").await {
            Err(Error::Api { status, message, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Resource not found");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_failure() {
        let transport = MockTransport::new();
        transport.push(HttpResponse::new(StatusCode::OK, "<html>"));
        let client = anonymous(&transport);

        assert!(matches!(
            client.submit(&Route::Movie(TraktId::from(1u64))).await,
            Err(Error::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let transport = MockTransport::new();
        transport.respond(200, Value::Null);
        let client = anonymous(&transport);

        let value = client.submit(&Route::Show(TraktId::from(1u64))).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let transport = MockTransport::new();
        transport
            .respond(503, Value::Null)
            .fail(Error::Timeout)
            .respond(200, json!({"title": "The Wire", "ids": {"trakt": 1429, "slug": "the-wire"}}));
        let client = anonymous(&transport);

        let show = client.media().show("the-wire").await.unwrap();
        assert_eq!(show.title, "The Wire");
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let transport = MockTransport::new();
        for _ in 0..5 {
            transport.respond(502, Value::Null);
        }
        let client = anonymous(&transport);

        let result = client.media().show("the-wire").await;
        assert!(matches!(result, Err(Error::Api { status: 502, .. })));
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let transport = MockTransport::new();
        transport.respond(401, json!({"error": "invalid_token"}));
        let client = authenticated(&transport);

        assert!(client.users().profile(None).await.unwrap_err().is_auth_error());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let transport = MockTransport::new();
        for _ in 0..3 {
            transport.push(
                HttpResponse::new(StatusCode::TOO_MANY_REQUESTS, Vec::new())
                    .with_header("retry-after", "3"),
            );
        }
        let client = anonymous(&transport);

        assert!(matches!(
            client.search().search("tron", None, None, None).await,
            Err(Error::RateLimited { retry_after_secs: 3 })
        ));
    }

    #[tokio::test]
    async fn test_profile_defaults_to_me() {
        let transport = MockTransport::new();
        transport.respond(200, json!({"username": "sean", "private": false}));
        let client = authenticated(&transport);

        let profile = client.users().profile(None).await.unwrap();
        assert_eq!(profile["username"], "sean");
        assert_eq!(transport.last().path(), "/users/me");
    }
}

// ============================================================================
// Authorization
// ============================================================================

mod auth_tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn token_body(access: &str) -> Value {
        json!({
            "access_token": access,
            "token_type": "bearer",
            "expires_in": 7776000,
            "refresh_token": "fresh-refresh",
            "scope": "public",
            "created_at": 1487889741
        })
    }

    fn device_code(expires_in: u64) -> DeviceCode {
        DeviceCode {
            device_code: "device-abc".into(),
            user_code: "5055CC52".into(),
            verification_url: "https://trakt.tv/activate".into(),
            expires_in,
            interval: 5,
        }
    }

    #[tokio::test]
    async fn test_stored_token_is_loaded_on_construction() {
        let transport = MockTransport::new();
        assert!(authenticated(&transport).is_authenticated().await);
        assert!(!anonymous(&transport).is_authenticated().await);
    }

    #[tokio::test]
    async fn test_exchange_pin_stores_and_persists_token() {
        let transport = MockTransport::new();
        transport.respond(200, token_body("new-access"));
        let store = Arc::new(MemoryTokenStore::new());
        let client = client_with(transport.clone(), store.clone());

        client.auth().exchange_pin("PIN42").await.unwrap();

        let body = transport.last().json_body().unwrap();
        assert_eq!(body["code"], "PIN42");
        assert_eq!(body["grant_type"], "authorization_code");
        assert_eq!(body["redirect_uri"], "urn:ietf:wg:oauth:2.0:oob");
        assert!(header(&transport.last(), "authorization").is_none());

        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.access_token().expose_secret(), "new-access");
        assert!(client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_new_token_is_used_by_later_requests() {
        let transport = MockTransport::new();
        transport
            .respond(200, token_body("new-access"))
            .respond(200, json!([]));
        let client = anonymous(&transport);

        client.auth().exchange_pin("PIN42").await.unwrap();
        client.sync().watchlist(MediaType::Shows).await.unwrap();

        assert_eq!(
            header(&transport.last(), "authorization").as_deref(),
            Some("Bearer new-access")
        );
    }

    #[tokio::test]
    async fn test_refresh_uses_refresh_token() {
        let transport = MockTransport::new();
        transport.respond(200, token_body("refreshed"));
        let client = authenticated(&transport);

        client.auth().refresh().await.unwrap();

        let body = transport.last().json_body().unwrap();
        assert_eq!(body["refresh_token"], "refresh-456");
        assert_eq!(body["grant_type"], "refresh_token");
        let token = client.token().await.unwrap();
        assert_eq!(token.access_token().expose_secret(), "refreshed");
    }

    #[tokio::test]
    async fn test_refresh_without_token_fails_locally() {
        let transport = MockTransport::new();
        let client = anonymous(&transport);
        assert!(matches!(
            client.auth().refresh().await,
            Err(Error::Authentication(_))
        ));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_token() {
        let transport = MockTransport::new();
        let store = Arc::new(MemoryTokenStore::with_token(Token::new("t", 60)));
        let client = client_with(transport.clone(), store.clone());

        client.clear_token().await.unwrap();
        assert!(!client.is_authenticated().await);
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_device_code() {
        let transport = MockTransport::new();
        transport.respond(
            200,
            json!({
                "device_code": "device-abc",
                "user_code": "5055CC52",
                "verification_url": "https://trakt.tv/activate",
                "expires_in": 600,
                "interval": 5
            }),
        );
        let client = anonymous(&transport);

        let code = client.auth().device_code().await.unwrap();
        assert_eq!(code, device_code(600));
        assert_eq!(transport.last().json_body().unwrap(), json!({"client_id": "client-id"}));
    }

    #[tokio::test]
    async fn test_poll_device_pending_then_token() {
        let transport = MockTransport::new();
        transport
            .respond(400, Value::Null)
            .respond(429, Value::Null)
            .respond(200, token_body("device-access"));
        let client = anonymous(&transport);
        let code = device_code(600);

        assert!(client.auth().poll_device(&code).await.unwrap().is_none());
        assert!(client.auth().poll_device(&code).await.unwrap().is_none());
        assert!(client.auth().poll_device(&code).await.unwrap().is_some());
        assert!(client.is_authenticated().await);

        let body = transport.last().json_body().unwrap();
        assert_eq!(body["code"], "device-abc");
        assert_eq!(body["client_secret"], "client-secret");
    }

    #[tokio::test]
    async fn test_poll_device_rejections() {
        for status in [404u16, 409, 410, 418] {
            let transport = MockTransport::new();
            transport.respond(status, Value::Null);
            let client = anonymous(&transport);

            let result = client.auth().poll_device(&device_code(600)).await;
            assert!(
                matches!(result, Err(Error::Authentication(_))),
                "status {} gave {:?}",
                status,
                result
            );
        }
    }

    #[tokio::test]
    async fn test_poll_device_is_not_retried() {
        let transport = MockTransport::new();
        transport.respond(503, Value::Null).respond(200, token_body("x"));
        let client = anonymous(&transport);

        assert!(client.auth().poll_device(&device_code(600)).await.is_err());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_device_polls_until_approved() {
        let transport = MockTransport::new();
        transport
            .respond(400, Value::Null)
            .respond(400, Value::Null)
            .respond(200, token_body("device-access"));
        let client = anonymous(&transport);

        let token = client.auth().wait_for_device(&device_code(600)).await.unwrap();
        assert_eq!(token.access_token().expose_secret(), "device-access");
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_device_expires() {
        let transport = MockTransport::new();
        for _ in 0..10 {
            transport.respond(400, Value::Null);
        }
        let client = anonymous(&transport);

        let result = client.auth().wait_for_device(&device_code(12)).await;
        assert!(matches!(result, Err(Error::Authentication(_))));
        assert!(transport.request_count() <= 3);
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_pin_flow() {
        let transport = MockTransport::new();
        transport
            .respond(401, json!({"error": "invalid_grant"}))
            .respond(200, token_body("pin-access"));
        let client = anonymous(&transport);
        let flow = client.auth().pin_flow().unwrap();

        assert_eq!(flow.authorize_url().as_str(), "https://trakt.tv/pin/1234");

        let signin = url::Url::parse("https://trakt.tv/auth/signin").unwrap();
        assert_eq!(flow.decide(&signin), NavigationDecision::Allow);

        let done = url::Url::parse("https://trakt.tv/oauth/authorize/ABC123").unwrap();
        let NavigationDecision::Intercept(pin) = flow.decide(&done) else {
            panic!("pin page should be intercepted");
        };
        assert_eq!(pin, "ABC123");

        assert_eq!(
            flow.complete(&pin).await,
            PinOutcome::Reload(flow.authorize_url().clone())
        );
        assert_eq!(flow.complete(&pin).await, PinOutcome::Authenticated);
        assert!(client.is_authenticated().await);
        assert_eq!(flow.cancel(), PinOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_pin_flow_needs_application_id() {
        let transport = MockTransport::new();
        let client = TraktClient::with_parts(
            Credentials::new("id", "secret"),
            config(),
            transport,
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap();
        assert!(matches!(client.auth().pin_flow(), Err(Error::Config(_))));
    }
}

// ============================================================================
// Sync
// ============================================================================

mod sync_tests {
    use super::*;
    use trakt_rs::api::SyncList;

    #[tokio::test]
    async fn test_add_to_watchlist_sets_flag() {
        let transport = MockTransport::new();
        transport.respond(
            201,
            json!({"added": {"movies": 1, "shows": 0}, "existing": {"movies": 0}}),
        );
        let client = authenticated(&transport);
        let mut item = movie(12601);

        client.sync().add_to_watchlist(&mut item).await.unwrap();

        assert!(item.watchlist);
        let request = transport.last();
        assert_eq!(request.path(), "/sync/watchlist");
        assert_eq!(
            request.json_body().unwrap(),
            json!({"movies": [{"ids": {"trakt": 12601}}]})
        );
    }

    #[tokio::test]
    async fn test_zero_count_is_no_effect() {
        let transport = MockTransport::new();
        transport.respond(200, json!({"added": {"movies": 0}}));
        let client = authenticated(&transport);
        let mut item = movie(1);

        let result = client.sync().mark_watched(&mut item).await;
        assert!(matches!(
            result,
            Err(Error::NoEffect {
                media_type: MediaType::Movies,
                ..
            })
        ));
        assert!(!item.watched);
    }

    #[tokio::test]
    async fn test_missing_counter_map_is_decode_error() {
        let transport = MockTransport::new();
        transport.respond(200, json!({"added": {"movies": 1}}));
        let client = authenticated(&transport);
        let mut item = movie(1);
        item.watchlist = true;

        let result = client.sync().remove_from_watchlist(&mut item).await;
        assert!(matches!(result, Err(Error::Decode(_))));
        assert!(item.watchlist);
    }

    #[tokio::test]
    async fn test_unwatch_clears_flag() {
        let transport = MockTransport::new();
        transport.respond(200, json!({"deleted": {"movies": 1, "episodes": 0}}));
        let client = authenticated(&transport);
        let mut item = movie(1);
        item.watched = true;

        client.sync().unwatch(&mut item).await.unwrap();
        assert!(!item.watched);
        assert_eq!(transport.last().path(), "/sync/history/remove");
    }

    #[tokio::test]
    async fn test_rate() {
        let transport = MockTransport::new();
        transport.respond(201, json!({"added": {"movies": 1}}));
        let client = authenticated(&transport);

        client.sync().rate(&movie(7), 9).await.unwrap();
        assert_eq!(
            transport.last().json_body().unwrap(),
            json!({"movies": [{"rating": 9, "ids": {"trakt": 7}}]})
        );
    }

    #[tokio::test]
    async fn test_rate_out_of_range_sends_nothing() {
        let transport = MockTransport::new();
        let client = authenticated(&transport);

        for rating in [0u8, 11] {
            assert!(matches!(
                client.sync().rate(&movie(7), rating).await,
                Err(Error::InvalidInput(_))
            ));
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_groups_by_type() {
        let transport = MockTransport::new();
        transport.respond(
            201,
            json!({"added": {"movies": 2, "shows": 1}, "not_found": {"movies": []}}),
        );
        let client = authenticated(&transport);

        let response = client
            .sync()
            .add_batch(
                SyncList::History,
                vec![
                    MediaRef::new(MediaType::Movies, 1u64),
                    MediaRef::new(MediaType::Shows, 2u64),
                    MediaRef::new(MediaType::Movies, 3u64),
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            transport.last().json_body().unwrap(),
            json!({
                "movies": [{"ids": {"trakt": 1}}, {"ids": {"trakt": 3}}],
                "shows": [{"ids": {"trakt": 2}}]
            })
        );
        assert_eq!(response.added.unwrap()["movies"], 2);
    }

    #[tokio::test]
    async fn test_watchlist_flags_items() {
        let transport = MockTransport::new();
        transport.respond(
            200,
            json!([
                {"rank": 1, "type": "show", "show": {"title": "Scandal", "ids": {"trakt": 39105}}},
                {"rank": 2, "type": "show", "show": {"title": "The Wire", "ids": {"trakt": 1429}}}
            ]),
        );
        let client = authenticated(&transport);

        let items = client.sync().watchlist(MediaType::Shows).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .all(|m| m.as_watchable().unwrap().in_watchlist()));
        assert_eq!(
            transport
                .last()
                .query_pairs()
                .into_iter()
                .find(|(k, _)| k == "extended"),
            Some(("extended".to_string(), "full,images".to_string()))
        );
    }

    #[tokio::test]
    async fn test_watched_entries() {
        let transport = MockTransport::new();
        transport.respond(
            200,
            json!([
                {"plays": 4, "last_watched_at": "2014-10-11T17:00:54.000Z",
                 "movie": {"title": "Batman Begins", "ids": {"trakt": 6}}},
                {"plays": 1, "movie": {"title": "Missing date", "ids": {"trakt": 7}}}
            ]),
        );
        let client = authenticated(&transport);

        let watched = client.sync().watched(MediaType::Movies).await.unwrap();
        assert_eq!(watched.len(), 1);
        assert_eq!(watched[0].plays, 4);
        assert!(watched[0].media.as_watchable().unwrap().is_watched());
    }
}

// ============================================================================
// Discover and search
// ============================================================================

mod discover_tests {
    use super::*;

    #[tokio::test]
    async fn test_trending_default_pagination() {
        let transport = MockTransport::new();
        transport.respond(
            200,
            json!([{"watchers": 9, "show": {"title": "Scandal", "ids": {"trakt": 39105}}}]),
        );
        let client = anonymous(&transport);

        let shows = client.discover().trending(MediaType::Shows, None).await.unwrap();
        assert_eq!(shows[0].title(), Some("Scandal"));

        let pairs = transport.last().query_pairs();
        assert!(pairs.contains(&("page".to_string(), "1".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "100".to_string())));
    }

    #[tokio::test]
    async fn test_trending_stream_follows_headers() {
        let transport = MockTransport::new();
        let page = |n: u32, ids: &[u64]| {
            let items: Vec<Value> = ids
                .iter()
                .map(|id| json!({"movie": {"title": format!("Movie {}", id), "ids": {"trakt": id}}}))
                .collect();
            HttpResponse::new(StatusCode::OK, serde_json::to_vec(&items).unwrap())
                .with_header("x-pagination-page", &n.to_string())
                .with_header("x-pagination-limit", "2")
                .with_header("x-pagination-page-count", "2")
                .with_header("x-pagination-item-count", "3")
        };
        transport.push(page(1, &[1, 2])).push(page(2, &[3]));
        let client = anonymous(&transport);

        let titles: Vec<String> = client
            .discover()
            .trending_stream(MediaType::Movies, 2)
            .map(|m| m.unwrap().title().unwrap().to_string())
            .collect()
            .await;

        assert_eq!(titles, vec!["Movie 1", "Movie 2", "Movie 3"]);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1]
            .query_pairs()
            .contains(&("page".to_string(), "2".to_string())));
    }

    #[tokio::test]
    async fn test_recommendations_need_token() {
        let transport = MockTransport::new();
        let client = anonymous(&transport);
        assert!(client
            .discover()
            .recommendations(MediaType::Movies, None)
            .await
            .unwrap_err()
            .is_auth_error());
    }

    #[tokio::test]
    async fn test_hide_recommendation_needs_204() {
        let transport = MockTransport::new();
        transport.respond(204, Value::Null).respond(200, json!({}));
        let client = authenticated(&transport);

        client.discover().hide_recommendation(&movie(3)).await.unwrap();
        assert_eq!(transport.last().method(), reqwest::Method::DELETE);
        assert_eq!(transport.last().path(), "/recommendations/movies/3");

        assert!(matches!(
            client.discover().hide_recommendation(&movie(3)).await,
            Err(Error::Api { status: 200, .. })
        ));
    }

    #[tokio::test]
    async fn test_search_parameters_and_results() {
        let transport = MockTransport::new();
        transport.respond(
            200,
            json!([
                {"type": "movie", "score": 26.0, "movie": {"title": "Tron: Legacy", "year": 2010, "ids": {"trakt": 12601}}},
                {"type": "episode", "score": 2.0,
                 "episode": {"season": 1, "number": 1, "title": "Pilot", "ids": {"trakt": 73640}},
                 "show": {"title": "Scandal", "ids": {"trakt": 39105}}}
            ]),
        );
        let client = anonymous(&transport);

        let results = client
            .search()
            .search("tron", Some(MediaType::Movies), Some(2010), None)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        match &results[1] {
            Media::Episode(episode) => assert_eq!(episode.show_id, Some(TraktId::from(39105u64))),
            other => panic!("expected episode, got {:?}", other),
        }

        let pairs = transport.last().query_pairs();
        assert!(pairs.contains(&("query".to_string(), "tron".to_string())));
        assert!(pairs.contains(&("type".to_string(), "movie".to_string())));
        assert!(pairs.contains(&("year".to_string(), "2010".to_string())));
    }
}

// ============================================================================
// Media
// ============================================================================

mod media_tests {
    use super::*;

    fn episode_body() -> Value {
        json!({
            "season": 1,
            "number": 1,
            "title": "Sweet Baby",
            "overview": "A political fixer takes a case.",
            "ids": {"trakt": 73640, "tvdb": 4279474}
        })
    }

    fn unloaded_episode() -> Episode {
        let mut episode = Episode::new(1, 1);
        episode.show_id = Some(TraktId::from(39105u64));
        episode
    }

    #[tokio::test]
    async fn test_load_episode_once() {
        let transport = MockTransport::new();
        transport.respond(200, episode_body());
        let client = anonymous(&transport);
        let mut episode = unloaded_episode();

        assert!(client.media().load_episode(&mut episode).await.unwrap());
        assert_eq!(episode.load_state(), LoadState::Loaded);
        assert_eq!(episode.title.as_deref(), Some("Sweet Baby"));
        assert_eq!(transport.last().path(), "/shows/39105/seasons/1/episodes/1");

        assert!(client.media().load_episode(&mut episode).await.unwrap());
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_can_be_retried() {
        let transport = MockTransport::new();
        transport.respond(404, Value::Null).respond(200, episode_body());
        let client = anonymous(&transport);
        let mut episode = unloaded_episode();

        assert!(client.media().load_episode(&mut episode).await.is_err());
        assert_eq!(episode.load_state(), LoadState::Failed);

        assert!(client.media().load_episode(&mut episode).await.unwrap());
        assert_eq!(episode.load_state(), LoadState::Loaded);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_reset_allows_reload() {
        let transport = MockTransport::new();
        transport.respond(200, episode_body()).respond(200, episode_body());
        let client = anonymous(&transport);
        let mut episode = unloaded_episode();

        client.media().load_episode(&mut episode).await.unwrap();
        episode.reset_load_state();
        assert_eq!(episode.load_state(), LoadState::NotRequested);
        client.media().load_episode(&mut episode).await.unwrap();
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_load_is_failed() {
        init_logging();
        let client = TraktClient::with_parts(
            credentials(),
            config(),
            Arc::new(StalledTransport),
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap();
        let mut episode = unloaded_episode();

        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            client.media().load_episode(&mut episode),
        )
        .await;
        assert!(outcome.is_err());
        assert_eq!(episode.load_state(), LoadState::Failed);
    }

    #[tokio::test]
    async fn test_load_episode_without_show_fails_locally() {
        let transport = MockTransport::new();
        let client = anonymous(&transport);
        let mut episode = Episode::new(2, 3);

        assert!(matches!(
            client.media().load_episode(&mut episode).await,
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(episode.load_state(), LoadState::Failed);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_progress_builds_show_tree() {
        let transport = MockTransport::new();
        transport
            .respond(200, json!({"title": "Scandal", "ids": {"trakt": 39105, "slug": "scandal"}}))
            .respond(
                200,
                json!({
                    "aired": 3,
                    "completed": 2,
                    "seasons": [
                        {"number": 1, "aired": 3, "completed": 2, "episodes": [
                            {"number": 1, "completed": true, "last_watched_at": "2015-03-21T19:03:58.000Z"},
                            {"number": 2, "completed": true, "last_watched_at": "2015-03-22T19:03:58.000Z"},
                            {"number": 3, "completed": false, "last_watched_at": null}
                        ]}
                    ],
                    "next_episode": {"season": 2, "number": 1, "title": "White Hat's Back On", "ids": {"trakt": 73650}}
                }),
            );
        let client = authenticated(&transport);

        let mut show = client.media().show("scandal").await.unwrap();
        client.media().progress(&mut show).await.unwrap();

        assert_eq!(transport.last().path(), "/shows/39105/progress/watched");

        let season = show.season(1).unwrap();
        assert_eq!(season.episodes.len(), 3);
        assert!(season.episode(1).unwrap().watched);
        assert!(!season.episode(3).unwrap().watched);
        assert_eq!(season.episode(2).unwrap().season_number, 1);
        assert_eq!(season.episode(2).unwrap().show_id, Some(TraktId::from(39105u64)));

        let next = show.next_episode.as_ref().unwrap();
        assert_eq!((next.season_number, next.number), (2, 1));
        assert_eq!(
            show.season(2).unwrap().episode(1).unwrap().title.as_deref(),
            Some("White Hat's Back On")
        );
    }

    #[tokio::test]
    async fn test_releases_stored_on_movie() {
        let transport = MockTransport::new();
        transport.respond(
            200,
            json!([
                {"country": "us", "certification": "PG", "release_date": "2010-12-17", "release_type": "theatrical", "note": null},
                {"country": "gb", "certification": "", "release_date": "2010-12-17", "release_type": "theatrical", "note": null}
            ]),
        );
        let client = authenticated(&transport);
        let mut item = movie(12601);

        let releases = client.media().releases(&mut item, None).await.unwrap();
        assert_eq!(releases.len(), 2);
        assert_eq!(item.releases[0].certification.as_deref(), Some("PG"));
        assert_eq!(item.releases[1].certification, None);
        assert_eq!(transport.last().path(), "/movies/12601/releases");
    }

    #[tokio::test]
    async fn test_seasons_and_episodes() {
        let transport = MockTransport::new();
        transport
            .respond(200, json!([{"number": 0, "ids": {"trakt": 1}}, {"number": 1, "ids": {"trakt": 2}}]))
            .respond(200, json!([episode_body()]));
        let client = anonymous(&transport);

        let seasons = client.media().seasons(39105u64).await.unwrap();
        assert_eq!(seasons.len(), 2);
        assert_eq!(transport.last().path(), "/shows/39105/seasons");

        let episodes = client.media().episodes(39105u64, 1).await.unwrap();
        assert_eq!(episodes[0].show_id, Some(TraktId::from(39105u64)));
        assert_eq!(transport.last().path(), "/shows/39105/seasons/1");
    }

    #[tokio::test]
    async fn test_cast_and_credits() {
        let transport = MockTransport::new();
        transport
            .respond(
                200,
                json!({
                    "cast": [{"character": "Olivia Pope", "person": {"name": "Kerry Washington", "ids": {"trakt": 1}}}],
                    "crew": {"production": [{"job": "Executive Producer", "person": {"name": "Shonda Rhimes", "ids": {"trakt": 2}}}]}
                }),
            )
            .respond(
                200,
                json!({"cast": [{"character": "Max", "movie": {"title": "Mad Max", "ids": {"trakt": 9}}}]}),
            );
        let client = anonymous(&transport);
        let show = Show::from_json(&json!({"title": "Scandal", "ids": {"trakt": 39105}})).unwrap();

        let people = client.people().cast(&show).await.unwrap();
        assert_eq!(people.cast[0].person.name, "Kerry Washington");
        assert_eq!(people.department("production")[0].job, "Executive Producer");
        assert_eq!(transport.last().path(), "/shows/39105/people");

        let credits = client
            .people()
            .credits("mel-gibson", MediaType::Movies)
            .await
            .unwrap();
        assert_eq!(credits.cast[0].media.title(), Some("Mad Max"));
        assert_eq!(transport.last().path(), "/people/mel-gibson/movies");
    }
}

// ============================================================================
// Response shape
// ============================================================================

mod shape_tests {
    use super::*;

    fn object_body() -> Arc<MockTransport> {
        let transport = MockTransport::new();
        transport.respond(200, json!({"error": "not a list"}));
        transport
    }

    fn assert_decode<T: std::fmt::Debug>(result: trakt_rs::Result<T>, what: &str) {
        match result {
            Err(Error::Decode(message)) => assert!(message.contains("not a list"), "{}", message),
            other => panic!("{}: expected decode error, got {:?}", what, other),
        }
    }

    #[tokio::test]
    async fn test_discover_lists_reject_objects() {
        let client = authenticated(&object_body());
        assert_decode(client.discover().trending(MediaType::Movies, None).await, "trending");

        let client = authenticated(&object_body());
        assert_decode(
            client.discover().recommendations(MediaType::Shows, None).await,
            "recommendations",
        );
    }

    #[tokio::test]
    async fn test_trending_stream_yields_decode_error() {
        let client = anonymous(&object_body());
        let items: Vec<_> = client
            .discover()
            .trending_stream(MediaType::Movies, 10)
            .collect()
            .await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(Error::Decode(_))));
    }

    #[tokio::test]
    async fn test_sync_lists_reject_objects() {
        let client = authenticated(&object_body());
        assert_decode(client.sync().watchlist(MediaType::Movies).await, "watchlist");

        let client = authenticated(&object_body());
        assert_decode(client.sync().collection(MediaType::Movies).await, "collection");

        let client = authenticated(&object_body());
        assert_decode(client.sync().watched(MediaType::Shows).await, "watched");
    }

    #[tokio::test]
    async fn test_search_rejects_object() {
        let client = anonymous(&object_body());
        assert_decode(
            client.search().search("tron", None, None, None).await,
            "search",
        );
    }

    #[tokio::test]
    async fn test_releases_reject_object_and_keep_previous() {
        let client = authenticated(&object_body());
        let mut item = movie(12601);
        item.releases = vec![];

        let result = client.media().releases(&mut item, Some("US")).await.map(|r| r.len());
        assert_decode(result, "releases");
        assert!(item.releases.is_empty());
    }

    #[tokio::test]
    async fn test_empty_list_is_not_an_error() {
        let transport = MockTransport::new();
        transport.respond(200, json!([]));
        let client = anonymous(&transport);
        assert!(client
            .discover()
            .trending(MediaType::Movies, None)
            .await
            .unwrap()
            .is_empty());
    }
}

// ============================================================================
// Live API (ignored by default)
// ============================================================================

mod live_tests {
    use super::*;

    fn live_client() -> TraktClient {
        init_logging();
        TraktClient::from_env().expect("TRAKT_CLIENT_ID and TRAKT_CLIENT_SECRET must be set")
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_trending() {
        let client = live_client();
        let movies = client
            .discover()
            .trending(MediaType::Movies, Some(Pagination::new(1, 5).unwrap()))
            .await
            .unwrap();
        tracing::info!("Trending: {:?}", movies.iter().map(Media::title).collect::<Vec<_>>());
        assert!(!movies.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_episode() {
        let client = live_client();
        let episode = client.media().episode("game-of-thrones", 1, 1).await.unwrap();
        assert_eq!(episode.title.as_deref(), Some("Winter Is Coming"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_search() {
        let client = live_client();
        let results = client
            .search()
            .search("tron", Some(MediaType::Movies), None, None)
            .await
            .unwrap();
        assert!(results.iter().any(|m| m.media_type() == MediaType::Movies));
    }
}
