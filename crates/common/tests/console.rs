//! Console workflows: validation, single backend call, toast outcome

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

use vyconsole_common::{
    BackendClient, ClientConfig, Console, Error, FirewallChain, FirewallRule, NewInstance,
    PowerAction, Protocol, RuleAction, ToastVariant,
};

type Seen = Arc<Mutex<Vec<(Method, String, Value)>>>;

async fn record(State(seen): State<Seen>, method: Method, uri: Uri, body: Bytes) -> Response {
    let parsed = serde_json::from_slice(&body).unwrap_or(Value::Null);
    seen.lock().push((method.clone(), uri.path().to_string(), parsed.clone()));

    match (method, uri.path()) {
        (Method::POST, "/session/firewall/chains") if parsed["name"] == "TAKEN" => (
            StatusCode::CONFLICT,
            Json(json!({"message": "chain TAKEN already exists on router"})),
        )
            .into_response(),
        (Method::POST, "/session/firewall/chains") => (StatusCode::CREATED, Json(parsed)).into_response(),
        (Method::POST, "/session/firewall/chains/WAN_IN/rules") => Json(parsed).into_response(),
        (Method::DELETE, _) => StatusCode::NO_CONTENT.into_response(),
        (Method::POST, path) if path.ends_with("/disconnect") => {
            Json(json!({"connected": false})).into_response()
        }
        (Method::POST, path) if path.starts_with("/session/power/") => {
            Json(json!({"status": "scheduled"})).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn connect(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"id": id, "name": format!("router-{id}"), "host": "192.0.2.1", "port": 443}))
}

async fn spawn_backend() -> (SocketAddr, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/session/instances/:id/connect", post(connect))
        .route(
            "/session/onboarding-status",
            get(|| async { Json(json!({"completed": true, "instance_count": 2})) }),
        )
        .route(
            "/session/dhcp/leases/export",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/csv"), (header::CONTENT_DISPOSITION, "attachment; filename=\"leases.csv\"")],
                    "ip,mac\n",
                )
            }),
        )
        .fallback(record)
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

fn console_for(addr: SocketAddr) -> Console {
    Console::new(BackendClient::new(ClientConfig {
        base_url: format!("http://{addr}"),
        ..ClientConfig::default()
    }))
}

fn chain(name: &str) -> FirewallChain {
    FirewallChain {
        name: name.to_string(),
        default_action: RuleAction::Drop,
        description: None,
        rule_count: 0,
    }
}

#[tokio::test]
async fn test_invalid_chain_never_reaches_backend() {
    let (addr, seen) = spawn_backend().await;
    let console = console_for(addr);

    let err = console.create_chain(chain("input"), &[]).await.unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));

    let err = console
        .create_chain(chain("wan_in"), &["WAN_IN".to_string()])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    assert!(seen.lock().is_empty());
    assert!(console.toasts().visible().is_empty());
}

#[tokio::test]
async fn test_create_chain_success_toast() {
    let (addr, seen) = spawn_backend().await;
    let console = console_for(addr);

    let created = console.create_chain(chain(" WAN_IN "), &[]).await.unwrap();
    assert_eq!(created.name, "WAN_IN");

    let calls = seen.lock().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "/session/firewall/chains");
    assert_eq!(calls[0].2["name"], "WAN_IN");
    assert_eq!(calls[0].2["default_action"], "drop");

    let toasts = console.toasts().visible();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].variant, ToastVariant::Success);
    assert_eq!(toasts[0].title, "Chain WAN_IN created");
}

#[tokio::test]
async fn test_backend_rejection_surfaces_message() {
    let (addr, _seen) = spawn_backend().await;
    let console = console_for(addr);

    let err = console.create_chain(chain("TAKEN"), &[]).await.unwrap_err();
    assert_eq!(err.user_message(), "chain TAKEN already exists on router");

    let toasts = console.toasts().visible();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].variant, ToastVariant::Destructive);
    assert_eq!(
        toasts[0].description.as_deref(),
        Some("chain TAKEN already exists on router")
    );
}

#[tokio::test]
async fn test_add_rule_posts_to_chain() {
    let (addr, seen) = spawn_backend().await;
    let console = console_for(addr);

    let rule = FirewallRule {
        number: 10,
        action: RuleAction::Accept,
        protocol: Protocol::Tcp,
        source: Some("192.168.1.0/24".into()),
        destination: None,
        destination_port: Some("22".into()),
        jump_target: None,
        description: Some("ssh from lan".into()),
    };
    let added = console
        .add_rule("WAN_IN", rule.clone(), &[20], &["WAN_IN".to_string()])
        .await
        .unwrap();
    assert_eq!(added, rule);
    assert_eq!(seen.lock()[0].1, "/session/firewall/chains/WAN_IN/rules");

    let duplicate = console.add_rule("WAN_IN", rule, &[10], &[]).await;
    assert!(matches!(duplicate, Err(Error::Validation { .. })));
    assert_eq!(seen.lock().len(), 1);
}

#[tokio::test]
async fn test_connect_power_and_disconnect() {
    let (addr, seen) = spawn_backend().await;
    let console = console_for(addr);

    assert!(matches!(
        console.power(PowerAction::Reboot).await,
        Err(Error::NoActiveInstance)
    ));

    let active = console.connect("i-7").await.unwrap();
    assert_eq!(active.instance.name, "router-i-7");
    assert_eq!(console.active().current().unwrap().instance.id, "i-7");

    let result = console.power(PowerAction::Reboot).await.unwrap();
    assert_eq!(result["status"], "scheduled");
    {
        let calls = seen.lock();
        let (method, path, body) = calls.last().unwrap();
        assert_eq!(*method, Method::POST);
        assert_eq!(path, "/session/power/reboot");
        assert_eq!(body["instance_id"], "i-7");
    }

    console.disconnect().await.unwrap();
    assert!(console.active().current().is_none());
    assert_eq!(seen.lock().last().unwrap().1, "/session/instances/i-7/disconnect");
}

#[tokio::test]
async fn test_delete_active_instance_clears_record() {
    let (addr, _seen) = spawn_backend().await;
    let console = console_for(addr);

    console.connect("i-1").await.unwrap();
    console.delete_instance("i-2").await.unwrap();
    assert!(console.active().is_connected());

    console.delete_instance("i-1").await.unwrap();
    assert!(!console.active().is_connected());
}

#[tokio::test]
async fn test_create_instance_validation() {
    let (addr, seen) = spawn_backend().await;
    let console = console_for(addr);

    let err = console
        .create_instance(
            NewInstance {
                name: "edge".into(),
                host: "".into(),
                port: 443,
                api_key: None,
                description: None,
            },
            &[],
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("host"));
    assert!(seen.lock().is_empty());
}

#[tokio::test]
async fn test_onboarding_and_export() {
    let (addr, _seen) = spawn_backend().await;
    let console = console_for(addr);

    let status = console.onboarding_status().await.unwrap();
    assert!(status.completed);
    assert_eq!(status.instance_count, 2);

    let export = console.export_leases().await.unwrap();
    assert_eq!(export.filename.as_deref(), Some("leases.csv"));
    assert_eq!(console.toasts().visible()[0].title, "Leases exported");
}
