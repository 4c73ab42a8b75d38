#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use proeduc_admin::auth::session::Session;
use proeduc_admin::ApiClient;

pub const ADMIN_EMAIL: &str = "root@proeduc.test";
pub const ADMIN_PASSWORD: &str = "s3cret!";
const JWT_SECRET: &[u8] = b"mock-backend-secret";

/// One request as seen by the mock backend
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub school_id: Option<String>,
}

#[derive(Default)]
pub struct MockState {
    pub token: String,
    pub admins: Vec<Value>,
    pub schools: Vec<Value>,
    pub trashed_schools: Vec<Value>,
    pub groups: Vec<Value>,
    pub students: Vec<Value>,
    pub webhooks: Vec<Value>,
    pub requests: Vec<Recorded>,
    pub bodies: Vec<(String, Value)>,
    /// Collections that answer 500
    pub failing: HashSet<&'static str>,
    /// Send list endpoints as bare arrays instead of envelopes
    pub bare_lists: bool,
}

impl MockState {
    fn collection(&mut self, name: &str) -> &mut Vec<Value> {
        match name {
            "admins" => &mut self.admins,
            "schools" => &mut self.schools,
            "groups" => &mut self.groups,
            "students" => &mut self.students,
            _ => &mut self.webhooks,
        }
    }
}

#[derive(Clone, Default)]
pub struct Mock {
    inner: Arc<Mutex<MockState>>,
}

impl Mock {
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state().requests.clone()
    }

    pub fn last_body(&self, path: &str) -> Option<Value> {
        self.state()
            .bodies
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, b)| b.clone())
    }
}

pub struct MockBackend {
    pub port: u16,
    pub base_url: String,
    pub mock: Mock,
}

impl MockBackend {
    /// Client with an in-memory session already holding a valid token
    pub fn signed_in_client(&self) -> ApiClient {
        let session = Session::in_memory();
        session
            .set_token(Some(&self.mock.state().token))
            .expect("in-memory session");
        ApiClient::new(&self.base_url, session).expect("client")
    }

    pub fn anonymous_client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Session::in_memory()).expect("client")
    }
}

#[derive(serde::Serialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// HS256 token whose `exp` is `ttl_secs` from now (negative for expired)
pub fn mint_token(ttl_secs: i64) -> String {
    let claims = Claims {
        sub: ADMIN_EMAIL.to_string(),
        exp: unix_now() + ttl_secs,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET),
    )
    .expect("mint token")
}

fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

pub fn seed(state: &mut MockState) {
    state.groups = vec![
        json!({"id": "g1", "name": "Rede Norte", "createdAt": "2024-01-05T10:00:00Z", "active": true,
               "groupAdmin": [{"id": "ga1", "admin": {"id": "a1", "name": "Ana"}}],
               "groupSchool": [{"id": "gs1", "school": {"id": "s1", "name": "Escola Alfa"}},
                               {"id": "gs2", "school": {"id": "s2", "name": "Escola Beta"}}]}),
        json!({"id": "g2", "name": "Rede Sul", "createdAt": "2024-02-10T10:00:00Z", "active": 0,
               "groupAdmin": [], "groupSchool": []}),
    ];
    state.admins = vec![
        json!({"id": "a1", "name": "Ana", "email": "ana@proeduc.test", "status": "active",
               "createdAt": "2024-01-10T12:00:00Z", "groups": [{"id": "g1", "name": "Rede Norte"}]}),
        json!({"id": "a2", "name": "Bruno", "email": "bruno@proeduc.test", "status": "pending",
               "createdAt": "2024-03-01T12:00:00Z", "groups": []}),
        json!({"id": "a3", "name": "Carla", "email": "carla@proeduc.test", "status": "banned",
               "createdAt": "2024-05-20T12:00:00Z", "groups": []}),
    ];
    state.schools = vec![
        json!({"id": "s1", "name": "Escola Alfa", "createdAt": "2024-01-01", "asaasToken": "tok-1",
               "asaasHomologationMode": false, "studentCount": 120, "teacherCount": 8,
               "entryOverdueCount": 3, "entryPendingCount": 5, "entryReceivedCount": 40,
               "groups": [{"id": "g1", "name": "Rede Norte"}], "admins": [], "employees": []}),
        json!({"id": "s2", "name": "Escola Beta", "createdAt": "2024-02-01", "asaasToken": "",
               "asaasHomologationMode": false, "studentCount": "80", "teacherCount": "5",
               "entryOverdueCount": 0, "entryPendingCount": 2, "entryReceivedCount": 10,
               "groups": [{"id": "g1", "name": "Rede Norte"}], "admins": [], "employees": []}),
    ];
    state.students = (1..=23)
        .map(|n| {
            let status = match n % 3 {
                0 => "Cancelado",
                1 => "Ativo",
                _ => "Pendente",
            };
            json!({"id": format!("st{}", n), "name": format!("Aluno {:02}", n),
                   "email": format!("aluno{}@escola.test", n), "schoolId": "s1", "status": status})
        })
        .collect();
    state.webhooks = vec![
        json!({"id": "wh1", "name": "Cobranças", "url": "https://api.proeduc.test/hooks", "email": "fin@escola.test",
               "enabled": false, "interrupted": true, "events": ["PAYMENT_RECEIVED"], "apiVersion": "3"}),
    ];
}

pub async fn spawn_backend() -> Result<MockBackend> {
    let mock = Mock::default();
    {
        let mut state = mock.state();
        state.token = mint_token(3600);
        seed(&mut state);
    }

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;

    let app = router(mock.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let backend = MockBackend { port, base_url, mock };
    wait_ready(&backend.base_url, Duration::from_secs(5)).await?;
    Ok(backend)
}

async fn wait_ready(base_url: &str, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::new();
    let deadline = Instant::now() + timeout;
    loop {
        if Instant::now() > deadline {
            break;
        }
        if let Ok(resp) = client.get(format!("{}/health", base_url)).send().await {
            if resp.status() == StatusCode::OK {
                return Ok(());
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    anyhow::bail!("mock backend did not become ready on {} within {:?}", base_url, timeout)
}

fn router(mock: Mock) -> Router {
    Router::new()
        .route("/sign-in", get(me).post(sign_in))
        .route("/sign-up", axum::routing::post(sign_up))
        .route("/admins", get(list_admins).post(create_admin))
        .route("/admins/:id", get(show_admin).put(update_admin).delete(delete_admin))
        .route("/schools", get(list_schools).post(create_school))
        .route("/schools/:id", get(show_school).put(update_school).delete(delete_school))
        .route("/schools/:id/recover", put(recover_school))
        .route("/group", get(list_groups).post(create_group))
        .route("/group/:id", get(show_group).put(update_group).delete(delete_group))
        .route("/students", get(list_students))
        .route("/students/:id", axum::routing::delete(delete_student))
        .route("/webhooks/asaas", get(list_webhooks))
        .route("/webhooks/asaas/all", get(all_webhooks))
        .route("/webhooks/asaas/:id", put(enable_webhook))
        .layer(middleware::from_fn_with_state(mock.clone(), record_and_authorize))
        .route("/health", get(|| async { "ok" }))
        .with_state(mock)
}

async fn record_and_authorize(State(mock): State<Mock>, request: Request, next: Next) -> Response {
    let recorded = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Recorded {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            authorization: header("authorization"),
            school_id: header("school-id"),
        }
    };

    let public = matches!(
        (recorded.method.as_str(), recorded.path.as_str()),
        ("POST", "/sign-in") | ("POST", "/sign-up")
    );
    let authorized = {
        let mut state = mock.state();
        state.requests.push(recorded.clone());
        recorded.authorization.as_deref() == Some(format!("Bearer {}", state.token).as_str())
    };

    if !public && !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthorized"}))).into_response();
    }
    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"message": message}))).into_response()
}

fn failing(mock: &Mock, name: &'static str) -> Option<Response> {
    mock.state()
        .failing
        .contains(name)
        .then(|| error(StatusCode::INTERNAL_SERVER_ERROR, "Erro interno"))
}

fn record_body(mock: &Mock, path: String, body: &Value) {
    mock.state().bodies.push((path, body.clone()));
}

fn find(mock: &Mock, collection: &str, id: &str) -> Option<Value> {
    mock.state()
        .collection(collection)
        .iter()
        .find(|v| v["id"] == id)
        .cloned()
}

fn remove(mock: &Mock, collection: &str, id: &str) -> Option<Value> {
    let mut state = mock.state();
    let items = state.collection(collection);
    let pos = items.iter().position(|v| v["id"] == id)?;
    Some(items.remove(pos))
}

/// Copy the body's scalar fields onto the record; ID arrays become `{id, name}`
/// relation objects under `relations[key]`
fn merge(mock: &Mock, collection: &str, id: &str, body: &Value, relations: &[(&str, &str, &str)]) -> Option<Value> {
    let mut state = mock.state();
    let mut resolved = Vec::new();
    for (key, target, source) in relations {
        if let Some(ids) = body.get(*key) {
            resolved.push((*target, relation_refs(&mut state, source, ids)));
        }
    }

    let record = state.collection(collection).iter_mut().find(|v| v["id"] == id)?;
    if let (Some(record), Some(fields)) = (record.as_object_mut(), body.as_object()) {
        for (k, v) in fields {
            let is_relation = relations.iter().any(|(key, _, _)| *key == k.as_str());
            if !is_relation && k != "password" && k != "passwordConfirmation" {
                record.insert(k.clone(), v.clone());
            }
        }
        for (target, items) in resolved {
            record.insert(target.to_string(), Value::Array(items));
        }
    }
    Some(record.clone())
}

fn relation_refs(state: &mut MockState, source: &str, ids: &Value) -> Vec<Value> {
    let Some(ids) = ids.as_array() else {
        return Vec::new();
    };
    ids.iter()
        .map(|id| {
            let name = state
                .collection(source)
                .iter()
                .find(|v| v["id"] == *id)
                .map(|v| v["name"].clone())
                .unwrap_or(Value::Null);
            json!({"id": id, "name": name})
        })
        .collect()
}

async fn sign_in(State(mock): State<Mock>, Json(body): Json<Value>) -> Response {
    if body["email"] == ADMIN_EMAIL && body["password"] == ADMIN_PASSWORD {
        let token = mock.state().token.clone();
        return Json(json!({"data": {"accessToken": token}})).into_response();
    }
    if body["email"] == "short@proeduc.test" {
        return Json(json!({"token": "abc"})).into_response();
    }
    error(StatusCode::BAD_REQUEST, "Credenciais inválidas")
}

async fn sign_up(State(mock): State<Mock>, Json(body): Json<Value>) -> Response {
    record_body(&mock, "/sign-up".to_string(), &body);
    let token = mock.state().token.clone();
    Json(json!({"token": token})).into_response()
}

async fn me() -> Json<Value> {
    Json(json!({"user": {"email": ADMIN_EMAIL, "role": "SUPER_ADMIN"}, "schools": [{"id": "s1"}]}))
}

async fn list_admins(State(mock): State<Mock>) -> Response {
    if let Some(resp) = failing(&mock, "admins") {
        return resp;
    }
    let state = mock.state();
    if state.bare_lists {
        return Json(Value::Array(state.admins.clone())).into_response();
    }
    Json(json!({"admins": state.admins, "count": state.admins.len()})).into_response()
}

async fn show_admin(State(mock): State<Mock>, Path(id): Path<String>) -> Response {
    match find(&mock, "admins", &id) {
        Some(admin) => Json(admin).into_response(),
        None => error(StatusCode::NOT_FOUND, "Admin not found"),
    }
}

async fn create_admin(State(mock): State<Mock>, Json(body): Json<Value>) -> Response {
    record_body(&mock, "/admins".to_string(), &body);
    let mut state = mock.state();
    if state.admins.iter().any(|a| a["email"] == body["email"]) {
        return error(StatusCode::BAD_REQUEST, "E-mail already in use");
    }
    let admin = json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "name": body["name"],
        "email": body["email"],
        "status": "pending",
        "createdAt": "2024-06-01T00:00:00Z",
        "groups": [],
    });
    state.admins.push(admin.clone());
    (StatusCode::CREATED, Json(admin)).into_response()
}

async fn update_admin(State(mock): State<Mock>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    record_body(&mock, format!("/admins/{}", id), &body);
    match merge(&mock, "admins", &id, &body, &[("groups", "groups", "groups")]) {
        Some(admin) => Json(admin).into_response(),
        None => error(StatusCode::NOT_FOUND, "Admin not found"),
    }
}

async fn delete_admin(State(mock): State<Mock>, Path(id): Path<String>) -> Response {
    match remove(&mock, "admins", &id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error(StatusCode::NOT_FOUND, "Admin not found"),
    }
}

async fn list_schools(State(mock): State<Mock>, Query(params): Query<HashMap<String, String>>) -> Response {
    if let Some(resp) = failing(&mock, "schools") {
        return resp;
    }
    let state = mock.state();
    let schools: Vec<Value> = match params.get("search") {
        Some(needle) => state
            .schools
            .iter()
            .filter(|s| s["name"].as_str().is_some_and(|n| n.contains(needle.as_str())))
            .cloned()
            .collect(),
        None => state.schools.clone(),
    };
    if state.bare_lists {
        return Json(Value::Array(schools)).into_response();
    }
    let total = schools.len().to_string();
    Json(json!({"schools": schools, "page": 1, "perPage": "50", "total": total, "totalPages": 1})).into_response()
}

async fn show_school(State(mock): State<Mock>, Path(id): Path<String>) -> Response {
    match find(&mock, "schools", &id) {
        Some(school) => Json(school).into_response(),
        None => error(StatusCode::NOT_FOUND, "Escola não encontrada"),
    }
}

async fn create_school(State(mock): State<Mock>, Json(body): Json<Value>) -> Response {
    record_body(&mock, "/schools".to_string(), &body);
    let school = json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "name": body["name"],
        "asaasToken": body["asaasToken"],
        "asaasHomologationMode": body["asaasHomologationMode"],
        "createdAt": "2024-06-01T00:00:00Z",
        "categories": body["categories"],
        "materials": body["defaultMaterials"],
    });
    mock.state().schools.push(school.clone());
    (StatusCode::CREATED, Json(school)).into_response()
}

async fn update_school(State(mock): State<Mock>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    record_body(&mock, format!("/schools/{}", id), &body);
    let relations = [("groups", "groups", "groups"), ("admins", "admins", "admins"), ("employees", "employees", "admins")];
    match merge(&mock, "schools", &id, &body, &relations) {
        Some(school) => Json(school).into_response(),
        None => error(StatusCode::NOT_FOUND, "Escola não encontrada"),
    }
}

async fn delete_school(State(mock): State<Mock>, Path(id): Path<String>) -> Response {
    match remove(&mock, "schools", &id) {
        Some(school) => {
            mock.state().trashed_schools.push(school);
            StatusCode::NO_CONTENT.into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Escola não encontrada"),
    }
}

async fn recover_school(State(mock): State<Mock>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    record_body(&mock, format!("/schools/{}/recover", id), &body);
    let mut state = mock.state();
    match state.trashed_schools.iter().position(|s| s["id"] == id) {
        Some(pos) => {
            let school = state.trashed_schools.remove(pos);
            state.schools.push(school);
            StatusCode::NO_CONTENT.into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Escola não encontrada"),
    }
}

async fn list_groups(State(mock): State<Mock>) -> Response {
    if let Some(resp) = failing(&mock, "groups") {
        return resp;
    }
    Json(Value::Array(mock.state().groups.clone())).into_response()
}

async fn show_group(State(mock): State<Mock>, Path(id): Path<String>) -> Response {
    match find(&mock, "groups", &id) {
        Some(group) => Json(group).into_response(),
        None => error(StatusCode::NOT_FOUND, "Grupo não encontrado"),
    }
}

async fn create_group(State(mock): State<Mock>, Json(body): Json<Value>) -> Response {
    record_body(&mock, "/group".to_string(), &body);
    let group = json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "name": body["name"],
        "active": true,
        "createdAt": "2024-06-01T00:00:00Z",
        "groupAdmin": [],
        "groupSchool": [],
    });
    mock.state().groups.push(group.clone());
    (StatusCode::CREATED, Json(group)).into_response()
}

async fn update_group(State(mock): State<Mock>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    record_body(&mock, format!("/group/{}", id), &body);
    let Some(mut group) = merge(&mock, "groups", &id, &body, &[("admins", "admins", "admins"), ("schools", "schools", "schools")]) else {
        return error(StatusCode::NOT_FOUND, "Grupo não encontrado");
    };
    // the real backend answers with relation rows rather than plain refs
    let wrap = |key: &str, inner: &str| -> Option<Value> {
        group.get(key).and_then(Value::as_array).map(|items| {
            Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(n, item)| json!({"id": format!("rel{}", n), inner: item}))
                    .collect(),
            )
        })
    };
    let admins = wrap("admins", "admin");
    let schools = wrap("schools", "school");
    if let Some(obj) = group.as_object_mut() {
        if let Some(admins) = admins {
            obj.insert("groupAdmin".to_string(), admins);
        }
        if let Some(schools) = schools {
            obj.insert("groupSchool".to_string(), schools);
        }
    }
    let mut state = mock.state();
    if let Some(slot) = state.groups.iter_mut().find(|g| g["id"] == id) {
        *slot = group.clone();
    }
    Json(group).into_response()
}

async fn delete_group(State(mock): State<Mock>, Path(id): Path<String>) -> Response {
    match remove(&mock, "groups", &id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error(StatusCode::NOT_FOUND, "Grupo não encontrado"),
    }
}

async fn list_students(State(mock): State<Mock>, Query(params): Query<HashMap<String, String>>) -> Response {
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page: usize = params.get("perPage").and_then(|p| p.parse().ok()).unwrap_or(10);
    let state = mock.state();
    let matched: Vec<Value> = state
        .students
        .iter()
        .filter(|s| {
            params
                .get("search")
                .map_or(true, |q| s["name"].as_str().is_some_and(|n| n.to_lowercase().contains(&q.to_lowercase())))
        })
        .filter(|s| params.get("status").map_or(true, |st| s["status"] == st.as_str()))
        .cloned()
        .collect();
    let rows: Vec<Value> = matched
        .iter()
        .skip(page.saturating_sub(1) * per_page)
        .take(per_page)
        .cloned()
        .collect();
    Json(json!({"students": rows, "count": matched.len()})).into_response()
}

async fn delete_student(State(mock): State<Mock>, Path(id): Path<String>) -> Response {
    match remove(&mock, "students", &id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error(StatusCode::NOT_FOUND, "Aluno não encontrado"),
    }
}

async fn list_webhooks(State(mock): State<Mock>) -> Json<Value> {
    let state = mock.state();
    Json(json!({
        "hasMore": false,
        "totalCount": state.webhooks.len(),
        "limit": 10,
        "offset": 0,
        "data": state.webhooks,
    }))
}

async fn all_webhooks(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let mut items = vec![
        json!({"ok": true, "schoolId": "s1", "schoolName": "Escola Alfa", "status": "ACTIVE", "count": 1,
               "webhooks": [{"id": "wh1", "name": "Cobranças", "email": "fin@escola.test", "enabled": true,
                             "interrupted": false, "eventsCount": 3, "url": "https://api.proeduc.test/hooks"}]}),
        json!({"ok": false, "schoolId": "s2", "schoolName": "Escola Beta", "status": "UNKNOWN", "count": 0,
               "webhooks": [], "errorStatus": 401, "error": {"message": "invalid api key"}}),
    ];
    if let Some(status) = params.get("status") {
        items.retain(|i| i["status"] == status.as_str());
    }
    Json(json!({
        "totalSchools": 2,
        "processed": 2,
        "ok": 1,
        "failed": 1,
        "summary": {"ACTIVE": 1, "UNKNOWN": 1},
        "items": items,
    }))
}

async fn enable_webhook(State(mock): State<Mock>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    record_body(&mock, format!("/webhooks/asaas/{}", id), &body);
    let mut state = mock.state();
    match state.webhooks.iter_mut().find(|w| w["id"] == id) {
        Some(webhook) => {
            webhook["enabled"] = json!(true);
            webhook["interrupted"] = json!(false);
            Json(webhook.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Webhook não encontrado"),
    }
}
