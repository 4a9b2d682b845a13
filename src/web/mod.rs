use crate::{chat::ChatStore, config, error, reports::ReportStore, session, util};
use actix_session::{config::CookieContentSecurity, storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
  cookie::Key, get, http::Method, middleware, post, web, App, HttpRequest, HttpResponse, HttpServer, Result,
};
use error_chain::bail;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

pub mod auth;
mod mvc;

pub type Config = web::Data<config::Config>;
pub type Reports = web::Data<ReportStore>;
pub type Chat = web::Data<ChatStore>;

#[get("/")]
async fn sv_index(config: Config) -> HttpResponse {
  util::redirect(session::HOME_VIEW, &config)
}

#[get("/views/{uri:.*}")]
async fn sv_views(
  uri: web::Path<String>,
  req: HttpRequest,
  reports: Reports,
  chat: Chat,
  config: Config,
  session: Session,
) -> Result<HttpResponse, error::Error> {
  let t0 = std::time::Instant::now();
  let uri = util::strip_slashes(uri.into_inner());

  let query = web::Query::<HashMap<String, String>>::from_query(req.query_string())
    .map(|q| q.into_inner())
    .unwrap_or_default();

  let session_store = auth::restore(&session, &config);
  let conversation = auth::conversation_id(&session);

  let res = match mvc::model(uri, query, reports, chat, config.clone(), session_store.state(), conversation).await? {
    mvc::Page::Html(markup) => HttpResponse::Ok()
      .content_type("text/html; charset=utf-8")
      .body(markup.into_string()),
    mvc::Page::Redirect(path) => util::redirect(&path, &config),
  };

  log::debug!("profiling: {:?}", t0.elapsed());
  Ok(res)
}

#[post("/rpc/{uri:.+}")]
async fn sv_rpc(
  uri: web::Path<String>,
  payload: web::Payload,
  reports: Reports,
  chat: Chat,
  config: Config,
  session: Session,
) -> Result<HttpResponse, error::Error> {
  let t0 = std::time::Instant::now();
  let uri = util::strip_slashes(uri.into_inner());

  let session_store = auth::restore(&session, &config);
  if !session_store.is_authenticated() && !(uri == "/auth/login" || uri == "/auth/register") {
    return Ok(HttpResponse::Unauthorized().finish());
  };

  // parse into untyped
  let post_data = serde_json::from_slice::<JsonValue>(util::read_payload(payload, &config).await?.as_ref())?;

  let res = mvc::controller(uri, post_data, reports, chat, config, session_store, session)
    .await
    .map(|res| HttpResponse::Ok().json(res));

  log::debug!("profiling: {:?}", t0.elapsed());
  res
}

pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
  SessionMiddleware::builder(CookieSessionStore::default(), key)
    .cookie_name("crimeguard".into())
    .cookie_content_security(CookieContentSecurity::Signed)
    .cookie_secure(false)
    .build()
}

/// Routes shared by the server and the tests.
pub fn routes(cfg: &mut web::ServiceConfig, static_dir: &str) {
  cfg
    .service(sv_index)
    .service(sv_views)
    .service(sv_rpc)
    .service(actix_files::Files::new("/static", static_dir))
    .default_service(web::to(sv_default));
}

// 404 for GET requests, 405 for everything else
async fn sv_default(req: HttpRequest) -> HttpResponse {
  if req.method() == Method::GET {
    HttpResponse::NotFound().finish()
  } else {
    HttpResponse::MethodNotAllowed().finish()
  }
}

#[actix_rt::main]
pub async fn init(config: config::Config) -> error::Result<()> {
  let reports = web::Data::new(ReportStore::seeded());
  let chat = web::Data::new(ChatStore::new(config.demo.reply_delay()));
  let key = Key::from(config.web.secret_key.as_bytes());

  log::info!("listening on {}", config.server.bind_addr);

  let server = HttpServer::new({
    let config = config.clone();
    move || {
      App::new()
        .app_data(web::Data::new(config.to_owned()))
        .app_data(reports.clone())
        .app_data(chat.clone())
        .wrap(session_middleware(key.clone()))
        .wrap(middleware::Logger::default())
        .wrap(middleware::DefaultHeaders::new().add(("x-content-type-options", "nosniff")))
        .configure(|cfg| routes(cfg, &config.server.static_dir))
    }
  });
  if config.server.bind_addr.starts_with("unix:/") {
    #[cfg(unix)]
    {
      let path = match config.server.bind_addr.strip_prefix("unix:") {
        Some(path) => path,
        None => bail!("invalid unix socket address"),
      };
      server.bind_uds(path)?.run().await?;
    }
    #[cfg(not(unix))]
    bail!("Unix sockets are not available for this target");
  } else {
    server.bind(config.server.bind_addr)?.run().await?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::test_config;
  use actix_web::{
    cookie::Cookie,
    dev::ServiceResponse,
    http::{header, StatusCode},
    test,
  };
  use serde_json::json;

  macro_rules! app {
    ($config:expr) => {{
      let config: config::Config = $config;
      let reports = web::Data::new(ReportStore::seeded());
      let chat = web::Data::new(ChatStore::new(config.demo.reply_delay()));
      test::init_service(
        App::new()
          .app_data(web::Data::new(config.clone()))
          .app_data(reports)
          .app_data(chat)
          .wrap(session_middleware(Key::generate()))
          .configure(|cfg| routes(cfg, &config.server.static_dir)),
      )
      .await
    }};
  }

  fn location(res: &ServiceResponse) -> String {
    res
      .headers()
      .get(header::LOCATION)
      .and_then(|v| v.to_str().ok())
      .unwrap_or_default()
      .to_string()
  }

  fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res
      .response()
      .cookies()
      .find(|c| c.name() == "crimeguard")
      .map(|c| c.into_owned())
  }

  macro_rules! login {
    ($app:expr, $email:expr, $role:expr) => {{
      let req = rpc("auth/login", json!({ "email": $email, "password": "password", "role": $role })).to_request();
      let res = test::call_service(&$app, req).await;
      assert_eq!(res.status(), StatusCode::OK);
      session_cookie(&res).expect("session cookie")
    }};
  }

  macro_rules! page {
    ($app:expr, $uri:expr, $cookie:expr) => {{
      let req = test::TestRequest::get().uri($uri).cookie($cookie.clone()).to_request();
      let res = test::call_service(&$app, req).await;
      assert_eq!(res.status(), StatusCode::OK, "{}", $uri);
      String::from_utf8(test::read_body(res).await.to_vec()).unwrap()
    }};
  }

  fn rpc(path: &str, body: JsonValue) -> test::TestRequest {
    let config = test_config();
    let mut body = body;
    body["cors_h"] = json!(util::gen_cors_hash(util::get_timestamp(), &config));
    test::TestRequest::post().uri(&format!("/rpc/{}", path)).set_json(body)
  }

  #[actix_rt::test]
  async fn index_redirects_home() {
    let app = app!(test_config());
    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/views/home");
  }

  #[actix_rt::test]
  async fn public_pages_render_without_session() {
    let app = app!(test_config());
    for page in &["home", "login", "register"] {
      let req = test::TestRequest::get().uri(&format!("/views/{}", page)).to_request();
      let res = test::call_service(&app, req).await;
      assert_eq!(res.status(), StatusCode::OK, "{}", page);
    }
  }

  #[actix_rt::test]
  async fn protected_pages_redirect_to_login() {
    let app = app!(test_config());
    for page in &["dashboard", "report", "map", "chat", "my-reports", "report/1"] {
      let req = test::TestRequest::get().uri(&format!("/views/{}", page)).to_request();
      let res = test::call_service(&app, req).await;
      assert_eq!(res.status(), StatusCode::FOUND, "{}", page);
      assert_eq!(location(&res), "/views/login");
    }
  }

  #[actix_rt::test]
  async fn unknown_view_redirects_home() {
    let app = app!(test_config());
    let req = test::TestRequest::get().uri("/views/analytics").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/views/home");
  }

  #[actix_rt::test]
  async fn rpc_requires_session() {
    let app = app!(test_config());
    let req = rpc("report/status", json!({ "id": "1", "status": "resolved" })).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
  }

  #[actix_rt::test]
  async fn rpc_rejects_missing_token() {
    let app = app!(test_config());
    let req = test::TestRequest::post()
      .uri("/rpc/auth/login")
      .set_json(json!({ "email": "user@example.com", "password": "x", "role": "user" }))
      .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }

  #[actix_rt::test]
  async fn bad_login_reports_invalid_credentials() {
    let app = app!(test_config());
    let req = rpc(
      "auth/login",
      json!({ "email": "user@example.com", "password": "x", "role": "admin" }),
    )
    .to_request();
    let res: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(res["result"], 101);
    assert_eq!(res["message"], "Invalid credentials");
  }

  #[actix_rt::test]
  async fn login_then_browse_and_logout() {
    let app = app!(test_config());

    let req = rpc(
      "auth/login",
      json!({ "email": "admin@example.com", "password": "password", "role": "admin" }),
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).expect("session cookie");
    let body: JsonValue = test::read_body_json(res).await;
    assert_eq!(body["result"], 0);
    assert_eq!(body["redirect"], "/views/dashboard");

    let req = test::TestRequest::get().uri("/views/dashboard").cookie(cookie.clone()).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let html = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    assert!(html.contains("Admin Dashboard"));
    assert!(html.contains("User Management"));

    // logged in users skip the login form
    let req = test::TestRequest::get().uri("/views/login").cookie(cookie.clone()).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(location(&res), "/views/dashboard");

    let req = rpc("auth/logout", json!({})).cookie(cookie).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let mut req = test::TestRequest::get().uri("/views/dashboard");
    if let Some(cookie) = session_cookie(&res) {
      req = req.cookie(cookie);
    }
    let res = test::call_service(&app, req.to_request()).await;
    assert_eq!(location(&res), "/views/login");
  }

  #[actix_rt::test]
  async fn register_then_file_a_report() {
    let app = app!(test_config());

    let req = rpc(
      "auth/register",
      json!({
        "name": "Jane Roe",
        "email": "jane@example.com",
        "password": "pw",
        "confirm_password": "pw",
        "role": "user"
      }),
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    let cookie = session_cookie(&res).expect("session cookie");

    let req = rpc(
      "report/add",
      json!({
        "title": "Bike stolen",
        "description": "Taken from the rack",
        "type": "theft",
        "address": "1 Library Way",
        "images": ["https://example.com/bike.jpg"]
      }),
    )
    .cookie(cookie.clone())
    .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["result"], 0);

    let req = test::TestRequest::get().uri("/views/my-reports").cookie(cookie).to_request();
    let res = test::call_service(&app, req).await;
    let html = String::from_utf8(test::read_body(res).await.to_vec()).unwrap();
    assert!(html.contains("Bike stolen"));
    assert!(!html.contains("Online fraud attempt"));
  }

  #[actix_rt::test]
  async fn register_rejects_mismatched_passwords() {
    let app = app!(test_config());
    let req = rpc(
      "auth/register",
      json!({
        "name": "Jane Roe",
        "email": "jane@example.com",
        "password": "pw",
        "confirm_password": "other",
        "role": "police"
      }),
    )
    .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["result"], 103);
  }

  #[actix_rt::test]
  async fn my_reports_lists_only_own_reports() {
    let app = app!(test_config());

    let cookie = login!(app, "user@example.com", "user");
    let html = page!(app, "/views/my-reports", cookie);
    assert!(html.contains("Online fraud attempt"));
    assert!(html.contains("Showing 4 of 4 reports"));

    let cookie = login!(app, "admin@example.com", "admin");
    let html = page!(app, "/views/my-reports", cookie);
    assert!(html.contains("No reports found"));
  }

  #[actix_rt::test]
  async fn staff_update_status_and_verification() {
    let app = app!(test_config());
    let cookie = login!(app, "police@example.com", "police");

    let req = rpc("report/status", json!({ "id": "2", "status": "resolved" }))
      .cookie(cookie.clone())
      .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["result"], 0);

    let req = rpc("report/verify", json!({ "id": "2", "status": "fake", "reason": "Duplicate of an older report" }))
      .cookie(cookie.clone())
      .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["result"], 0);

    // unknown ids are ignored
    let req = rpc("report/status", json!({ "id": "missing", "status": "resolved" }))
      .cookie(cookie.clone())
      .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["result"], 0);

    let html = page!(app, "/views/report/2", cookie);
    assert!(html.contains("status-resolved"));
    assert!(html.contains("verification-fake"));
    assert!(html.contains("Duplicate of an older report"));
  }

  #[actix_rt::test]
  async fn report_rejects_non_http_images() {
    let app = app!(test_config());
    let cookie = login!(app, "user@example.com", "user");

    let req = rpc(
      "report/add",
      json!({
        "title": "Graffiti",
        "description": "Fresh tags on the bridge",
        "type": "vandalism",
        "address": "Bridge St",
        "images": ["ftp://example.com/tag.jpg"]
      }),
    )
    .cookie(cookie)
    .to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["result"], 102);
  }

  #[actix_rt::test]
  async fn unknown_rpc_is_not_found() {
    let app = app!(test_config());
    let cookie = login!(app, "admin@example.com", "admin");
    let req = rpc("report/delete", json!({ "id": "1" })).cookie(cookie).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
  }

  #[actix_rt::test]
  async fn chat_message_gets_a_scripted_reply() {
    let app = app!(test_config());
    let cookie = login!(app, "user@example.com", "user");

    let req = rpc("chat/send", json!({ "content": "Someone took my bike" }))
      .cookie(cookie)
      .to_request();
    let res = test::call_service(&app, req).await;
    let cookie = session_cookie(&res).expect("conversation cookie");
    let body: JsonValue = test::read_body_json(res).await;
    assert_eq!(body["result"], 0);

    let html = page!(app, "/views/chat", cookie);
    assert!(html.contains("Someone took my bike"));
    assert!(html.contains("http-equiv=\"refresh\""));

    actix_rt::time::sleep(std::time::Duration::from_millis(150)).await;

    let html = page!(app, "/views/chat", cookie);
    assert!(!html.contains("http-equiv=\"refresh\""));
    assert!(crate::chat::BOT_REPLIES
      .iter()
      .any(|reply| html.contains(reply.split('\'').next().unwrap())));

    let req = rpc("chat/clear", json!({})).cookie(cookie.clone()).to_request();
    let body: JsonValue = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["result"], 0);

    let html = page!(app, "/views/chat", cookie);
    assert!(!html.contains("Someone took my bike"));
  }

  #[actix_rt::test]
  async fn empty_chat_message_is_rejected() {
    let app = app!(test_config());
    let cookie = login!(app, "user@example.com", "user");
    let req = rpc("chat/send", json!({ "content": "   " })).cookie(cookie).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }
}
