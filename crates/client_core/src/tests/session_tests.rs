use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone)]
struct CognitoMock {
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
    reject: bool,
}

async fn handle_get_id(
    State(state): State<CognitoMock>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let call = state.calls.fetch_add(1, Ordering::SeqCst) + 1;
    let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    state.requests.lock().await.push((headers, parsed));
    if state.reject {
        return (
            StatusCode::BAD_REQUEST,
            json!({"__type": "NotAuthorizedException", "message": "Invalid login token."})
                .to_string(),
        );
    }
    (
        StatusCode::OK,
        json!({"IdentityId": format!("us-east-1:identity-{call}")}).to_string(),
    )
}

async fn spawn_cognito(reject: bool) -> anyhow::Result<(Url, CognitoMock)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = CognitoMock {
        calls: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
        reject,
    };
    let app = Router::new()
        .route("/", post(handle_get_id))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((Url::parse(&format!("http://{addr}/"))?, state))
}

fn provider(endpoint: Url, id_token: Option<&str>) -> CognitoIdentityProvider {
    CognitoIdentityProvider::new(
        Client::new(),
        endpoint,
        "us-east-1:pool",
        Some("cognito-idp.us-east-1.amazonaws.com/us-east-1_users".to_string()),
        id_token.map(str::to_string),
    )
}

#[tokio::test]
async fn get_id_sends_amz_json_request_with_logins() {
    let (endpoint, mock) = spawn_cognito(false).await.expect("spawn cognito");
    let provider = provider(endpoint, Some("id-token"));

    let session = provider.get_session(false).await.expect("session");
    assert_eq!(session.namespace_id.as_str(), "us-east-1:identity-1");
    assert_eq!(session.token.as_deref(), Some("id-token"));

    let requests = mock.requests.lock().await;
    let (headers, body) = &requests[0];
    assert_eq!(
        headers.get("x-amz-target").and_then(|v| v.to_str().ok()),
        Some("AWSCognitoIdentityService.GetId")
    );
    assert_eq!(
        headers.get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/x-amz-json-1.1")
    );
    assert_eq!(
        body,
        &json!({
            "IdentityPoolId": "us-east-1:pool",
            "Logins": {"cognito-idp.us-east-1.amazonaws.com/us-east-1_users": "id-token"}
        })
    );
}

#[tokio::test]
async fn guest_request_omits_logins() {
    let (endpoint, mock) = spawn_cognito(false).await.expect("spawn cognito");
    let provider = provider(endpoint, None);

    provider.get_session(false).await.expect("session");

    let requests = mock.requests.lock().await;
    assert_eq!(requests[0].1, json!({"IdentityPoolId": "us-east-1:pool"}));
}

#[tokio::test]
async fn cached_identity_is_reused_until_forced() {
    let (endpoint, mock) = spawn_cognito(false).await.expect("spawn cognito");
    let provider = provider(endpoint, Some("id-token"));

    let first = provider.get_session(false).await.expect("first");
    let second = provider.get_session(false).await.expect("second");
    assert_eq!(first, second);
    assert_eq!(mock.calls.load(Ordering::SeqCst), 1);

    let refreshed = provider.get_session(true).await.expect("refresh");
    assert_eq!(refreshed.namespace_id.as_str(), "us-east-1:identity-2");
    assert_eq!(mock.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn service_error_is_reported_with_type() {
    let (endpoint, _mock) = spawn_cognito(true).await.expect("spawn cognito");
    let provider = provider(endpoint, Some("stale"));

    let err = provider.get_session(false).await.expect_err("rejected");
    let message = format!("{err:#}");
    assert!(message.contains("400"), "{message}");
    assert!(message.contains("NotAuthorizedException"), "{message}");
}

#[tokio::test]
async fn resolver_maps_failures_to_unauthenticated() {
    let (endpoint, _mock) = spawn_cognito(true).await.expect("spawn cognito");
    let resolver = SessionResolver::new(Arc::new(provider(endpoint, Some("stale"))));

    assert_eq!(resolver.check_session().await, SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn unreachable_identity_service_is_unauthenticated() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let endpoint = Url::parse(&format!("http://{addr}/")).expect("url");
    let resolver = SessionResolver::new(Arc::new(provider(endpoint, None)));

    assert!(!resolver.check_session().await.is_authenticated());
}

#[tokio::test]
async fn sign_out_invalidates_cognito_session() {
    let (endpoint, mock) = spawn_cognito(false).await.expect("spawn cognito");
    let resolver = SessionResolver::new(Arc::new(provider(endpoint, Some("id-token"))));

    assert!(resolver.check_session().await.is_authenticated());
    resolver.sign_out().await.expect("sign out");

    assert_eq!(resolver.check_session().await, SessionStatus::Unauthenticated);
    assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn static_provider_yields_configured_namespace() {
    let resolver = SessionResolver::new(Arc::new(StaticIdentityProvider::new("us-east-1:fixed")));

    let status = resolver.check_session().await;
    assert_eq!(
        status.namespace_id().map(NamespaceId::as_str),
        Some("us-east-1:fixed")
    );

    resolver.sign_out().await.expect("sign out");
    assert!(!resolver.check_session().await.is_authenticated());
}
