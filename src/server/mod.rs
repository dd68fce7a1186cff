//! HTTP 服务器模块
//!
//! 为外部渲染器提供 JSON API：编辑网络、运行算法、获取步骤序列

use crate::algorithm::Algorithm;
use crate::config::{ServerConfig, SessionConfig};
use crate::error::{Error, Result};
use crate::graph::{Edge, EdgeId, Node, NodeId};
use crate::import::GraphDocument;
use crate::session::Session;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
}

/// 构建路由
pub fn router(session: Arc<Session>) -> Router {
    let state = AppState { session };

    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 网络
        .route("/graph", get(get_graph).put(import_graph))
        .route("/nodes", post(add_node))
        .route("/nodes/:id", patch(update_node).delete(remove_node))
        .route("/edges", post(add_edge))
        .route("/edges/:id", patch(update_edge).delete(remove_edge))
        // 配置
        .route("/config", get(get_config).put(put_config))
        // 算法运行
        .route("/run", post(run))
        .route("/trace", get(get_trace))
        .route("/apply", post(apply_trace))
        .route("/reset", post(reset))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 启动服务器
pub async fn start_server(config: ServerConfig, session: Arc<Session>) -> Result<()> {
    let app = router(session);
    let addr = config.addr();

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::ServerError(format!("绑定地址失败: {}", e)))?;
    info!("flowtrace 服务器启动于 http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::ServerError(format!("服务器错误: {}", e)))?;

    Ok(())
}

// ==================== 处理器 ====================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 网络视图
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphView {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub source: NodeId,
    pub sink: NodeId,
    pub algorithm: Algorithm,
}

/// 获取当前网络
async fn get_graph(State(state): State<AppState>) -> Response {
    let network = state.session.network();
    let view = GraphView {
        nodes: network.nodes().cloned().collect(),
        edges: network.edge_snapshot(),
        source: network.source(),
        sink: network.sink(),
        algorithm: state.session.config().algorithm,
    };
    (StatusCode::OK, Json(ApiResponse::success(view))).into_response()
}

/// 导入图文档，替换当前网络
async fn import_graph(
    State(state): State<AppState>,
    Json(document): Json<GraphDocument>,
) -> Response {
    respond(state.session.import(document))
}

/// 新节点请求
#[derive(Debug, Deserialize)]
pub struct NodeRequest {
    #[serde(default)]
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
}

async fn add_node(State(state): State<AppState>, Json(req): Json<NodeRequest>) -> Response {
    respond(
        state
            .session
            .edit(|network| network.add_node(req.label, req.x, req.y)),
    )
}

/// 节点修改请求
#[derive(Debug, Deserialize)]
pub struct NodeUpdate {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

async fn update_node(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<NodeUpdate>,
) -> Response {
    let id = NodeId::new(id);
    respond(state.session.edit(|network| {
        if let Some(label) = req.label.as_deref() {
            network.rename_node(id, label)?;
        }
        if req.x.is_some() || req.y.is_some() {
            let (x, y) = network
                .node(id)
                .map(|node| node.position())
                .ok_or(Error::NodeNotFound(id.as_u64()))?;
            network.move_node(id, req.x.unwrap_or(x), req.y.unwrap_or(y))?;
        }
        network
            .node(id)
            .cloned()
            .ok_or(Error::NodeNotFound(id.as_u64()))
    }))
}

async fn remove_node(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    respond(
        state
            .session
            .edit(|network| network.remove_node(NodeId::new(id))),
    )
}

/// 新边请求
#[derive(Debug, Deserialize)]
pub struct EdgeRequest {
    pub from: u64,
    pub to: u64,
    pub capacity: u64,
}

async fn add_edge(State(state): State<AppState>, Json(req): Json<EdgeRequest>) -> Response {
    respond(state.session.edit(|network| {
        network.add_edge(NodeId::new(req.from), NodeId::new(req.to), req.capacity)
    }))
}

/// 容量修改请求
#[derive(Debug, Deserialize)]
pub struct EdgeUpdate {
    pub capacity: u64,
}

async fn update_edge(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<EdgeUpdate>,
) -> Response {
    let id = EdgeId::new(id);
    respond(state.session.edit(|network| {
        network.set_capacity(id, req.capacity)?;
        network
            .edge(id)
            .cloned()
            .ok_or(Error::EdgeNotFound(id.as_u64()))
    }))
}

async fn remove_edge(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    respond(
        state
            .session
            .edit(|network| network.remove_edge(EdgeId::new(id))),
    )
}

async fn get_config(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(state.session.config()))).into_response()
}

async fn put_config(
    State(state): State<AppState>,
    Json(config): Json<SessionConfig>,
) -> Response {
    respond(state.session.set_config(config).map(|_| config))
}

/// 运行请求，未给出的字段沿用会话当前值
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub algorithm: Option<Algorithm>,
    #[serde(default)]
    pub source: Option<u64>,
    #[serde(default)]
    pub sink: Option<u64>,
}

async fn run(State(state): State<AppState>, Json(req): Json<RunRequest>) -> Response {
    respond(state.session.run_with(
        req.algorithm,
        req.source.map(NodeId::new),
        req.sink.map(NodeId::new),
    ))
}

/// 最近一次运行的结果（含完整步骤序列）
async fn get_trace(State(state): State<AppState>) -> Response {
    match state.session.outcome() {
        Some(outcome) => (StatusCode::OK, Json(ApiResponse::success(outcome))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("尚未运行算法")),
        )
            .into_response(),
    }
}

async fn apply_trace(State(state): State<AppState>) -> Response {
    respond(state.session.apply_trace())
}

async fn reset(State(state): State<AppState>) -> Response {
    respond(state.session.reset())
}

fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(e: Error) -> Response {
    let status = match e {
        Error::NodeNotFound(_) | Error::EdgeNotFound(_) | Error::NoEdgeBetween { .. } => {
            StatusCode::NOT_FOUND
        }
        Error::RunInProgress => StatusCode::CONFLICT,
        Error::IoError(_) | Error::SerializationError(_) | Error::ServerError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(ApiResponse::<()>::error(&e.to_string()))).into_response()
}

/// API 响应
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn demo_app() -> Router {
        router(Session::demo())
    }

    #[tokio::test]
    async fn test_health() {
        let app = demo_app();
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_get_graph() {
        let app = demo_app();
        let (status, body) = call(&app, Method::GET, "/graph", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["nodes"].as_array().map(Vec::len), Some(6));
        assert_eq!(body["data"]["edges"].as_array().map(Vec::len), Some(8));
        assert_eq!(body["data"]["source"], 0);
        assert_eq!(body["data"]["sink"], 4);
        assert_eq!(body["data"]["algorithm"], "bfs");
    }

    #[tokio::test]
    async fn test_run_and_fetch_trace() {
        let app = demo_app();

        let (status, _) = call(&app, Method::GET, "/trace", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(
            &app,
            Method::POST,
            "/run",
            Some(json!({"algorithm": "edmondsKarp"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["kind"], "maxFlow");
        assert_eq!(body["data"]["value"], 20);

        let (status, body) = call(&app, Method::GET, "/trace", None).await;
        assert_eq!(status, StatusCode::OK);
        let steps = body["data"]["steps"].as_array().unwrap();
        assert_eq!(steps[0], json!({"type": "visit", "node": 0, "queue": [0], "visited": [0], "parent": {}}));
        assert_eq!(steps[1], json!({"type": "edgeProbe", "from": 0, "to": 1}));
    }

    #[tokio::test]
    async fn test_run_rejects_equal_endpoints() {
        let app = demo_app();
        let (status, body) = call(
            &app,
            Method::POST,
            "/run",
            Some(json!({"source": 2, "sink": 2})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_rejected_run_keeps_selection_and_trace() {
        let app = demo_app();
        let (status, _) = call(
            &app,
            Method::POST,
            "/run",
            Some(json!({"algorithm": "edmondsKarp"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &app,
            Method::POST,
            "/run",
            Some(json!({"algorithm": "dfs", "source": 2, "sink": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&app, Method::GET, "/graph", None).await;
        assert_eq!(body["data"]["source"], 0);
        assert_eq!(body["data"]["sink"], 4);
        assert_eq!(body["data"]["algorithm"], "edmondsKarp");

        let (status, body) = call(&app, Method::GET, "/trace", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["value"], 20);
    }

    #[tokio::test]
    async fn test_edit_endpoints() {
        let app = demo_app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/nodes",
            Some(json!({"x": 10.0, "y": 20.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], 6);

        let (status, body) = call(
            &app,
            Method::POST,
            "/edges",
            Some(json!({"from": 4, "to": 6, "capacity": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], 8);

        let (status, _) = call(
            &app,
            Method::POST,
            "/edges",
            Some(json!({"from": 4, "to": 6, "capacity": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &app,
            Method::PATCH,
            "/nodes/6",
            Some(json!({"label": "Z", "y": 99.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["label"], "Z");
        assert_eq!(body["data"]["x"], 10.0);
        assert_eq!(body["data"]["y"], 99.0);

        let (status, body) = call(
            &app,
            Method::PATCH,
            "/edges/8",
            Some(json!({"capacity": 11})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["capacity"], 11);

        let (status, _) = call(&app, Method::DELETE, "/nodes/6", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, Method::DELETE, "/edges/8", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_import_and_reset() {
        let app = demo_app();
        let document = json!({
            "nodes": [
                {"id": 0, "label": "S", "x": 0.0, "y": 0.0},
                {"id": 1, "label": "T", "x": 50.0, "y": 0.0}
            ],
            "edges": [{"id": 0, "from": 0, "to": 1, "capacity": 5, "flow": 3}]
        });

        let (status, body) = call(&app, Method::PUT, "/graph", Some(document)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["flowsReset"], 1);

        let (status, body) = call(
            &app,
            Method::POST,
            "/run",
            Some(json!({"algorithm": "fordFulkerson"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["value"], 5);

        let (status, body) = call(&app, Method::POST, "/apply", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], 5);

        let (_, body) = call(&app, Method::GET, "/graph", None).await;
        assert_eq!(body["data"]["edges"][0]["flow"], 5);

        let (status, _) = call(&app, Method::POST, "/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&app, Method::GET, "/graph", None).await;
        assert_eq!(body["data"]["edges"][0]["flow"], 0);
    }

    #[tokio::test]
    async fn test_config_roundtrip() {
        let app = demo_app();
        let (status, body) = call(
            &app,
            Method::PUT,
            "/config",
            Some(json!({"algorithm": "dfs", "tickMs": 100})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tickMs"], 100);

        let (status, _) = call(&app, Method::PUT, "/config", Some(json!({"tickMs": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&app, Method::GET, "/config", None).await;
        assert_eq!(body["data"]["algorithm"], "dfs");
    }
}
