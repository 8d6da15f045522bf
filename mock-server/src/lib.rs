use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Password accepted by `/Login` for any user.
pub const PASSWORD: &str = "manager";

pub const SESSION_COOKIE: &str = "B1SESSION";
pub const ROUTE_COOKIE: &str = "ROUTEID";

const ODATA_JSON: &str = "application/json;odata.metadata=minimal;charset=utf-8";

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Login {
    #[serde(rename = "CompanyDB")]
    pub company_db: String,
    pub user_name: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub item_code: String,
    pub item_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AttachmentLine {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    #[serde(rename = "AbsoluteEntry")]
    pub absolute_entry: usize,
    #[serde(rename = "Attachments2_Lines")]
    pub lines: Vec<AttachmentLine>,
}

#[derive(Default)]
pub struct Store {
    sessions: HashSet<String>,
    items: Vec<Item>,
    attachments: Vec<Attachment>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/b1s/v1/Login", post(login))
        .route("/b1s/v1/Logout", post(logout))
        .route("/b1s/v1/Items", get(list_items).post(create_item))
        .route("/b1s/v1/Attachments2", post(upload_attachment))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = json!({"error": {"code": status.as_u16(), "message": {"lang": "en-us", "value": message}}});
    (status, [(header::CONTENT_TYPE, ODATA_JSON)], body.to_string()).into_response()
}

/// Find a cookie by name across every `Cookie` header.
fn cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

async fn authorize(db: &Db, headers: &HeaderMap) -> Result<String, Response> {
    let session = cookie(headers, SESSION_COOKIE)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Invalid session."))?;
    if db.read().await.sessions.contains(session) {
        Ok(session.to_string())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "Invalid session or session already timeout."))
    }
}

async fn login(State(db): State<Db>, Json(input): Json<Login>) -> Response {
    if input.password != PASSWORD || input.user_name.is_empty() {
        log::info!("rejected login for {} on {}", input.user_name, input.company_db);
        return error(StatusCode::UNAUTHORIZED, "Fail to get DB Credentials.");
    }
    let session = Uuid::new_v4().to_string();
    db.write().await.sessions.insert(session.clone());
    log::info!("session {session} opened for {} on {}", input.user_name, input.company_db);

    let body = json!({"SessionId": session, "Version": "1000190", "SessionTimeout": 30});
    let cookies = AppendHeaders([
        (header::SET_COOKIE, format!("{SESSION_COOKIE}={session}; path=/b1s/v1; HttpOnly")),
        (header::SET_COOKIE, format!("{ROUTE_COOKIE}=.node1; path=/b1s")),
    ]);
    (StatusCode::OK, [(header::CONTENT_TYPE, ODATA_JSON)], cookies, body.to_string()).into_response()
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Response {
    match authorize(&db, &headers).await {
        Ok(session) => {
            db.write().await.sessions.remove(&session);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(response) => response,
    }
}

async fn list_items(State(db): State<Db>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&db, &headers).await {
        return response;
    }
    let items = db.read().await.items.clone();
    Json(json!({"value": items})).into_response()
}

async fn create_item(State(db): State<Db>, headers: HeaderMap, Json(item): Json<Item>) -> Response {
    if let Err(response) = authorize(&db, &headers).await {
        return response;
    }
    let mut store = db.write().await;
    if store.items.iter().any(|existing| existing.item_code == item.item_code) {
        return error(StatusCode::BAD_REQUEST, "This entry already exists in the following tables");
    }
    store.items.push(item.clone());
    (StatusCode::CREATED, [(header::CONTENT_TYPE, ODATA_JSON)], serde_json::to_string(&item).unwrap_or_default())
        .into_response()
}

async fn upload_attachment(
    State(db): State<Db>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(response) = authorize(&db, &headers).await {
        return response;
    }

    let mut lines = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return error(StatusCode::BAD_REQUEST, &e.body_text()),
        };
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => return error(StatusCode::BAD_REQUEST, &e.body_text()),
        };
        lines.push(AttachmentLine {
            file_name,
            content_type,
            size: data.len(),
        });
    }
    if lines.is_empty() {
        return error(StatusCode::BAD_REQUEST, "No attachment lines.");
    }

    let mut store = db.write().await;
    let attachment = Attachment {
        absolute_entry: store.attachments.len() + 1,
        lines,
    };
    store.attachments.push(attachment.clone());
    (StatusCode::CREATED, Json(attachment)).into_response()
}
