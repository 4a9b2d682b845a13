use crate::{
  error::{Error, ErrorKind, Result, ResultExt},
  schema::{CrimeType, Location, ReportDraft, ReportStatus, Role, Sender, VerificationStatus},
  session,
  util,
  web::{
    auth::{self, WebSession},
    Chat, Config, Reports,
  },
};
use actix_session::Session;
use error_chain::bail;
use lazy_static::lazy_static;
use path_tree::PathTree;
use rand::seq::SliceRandom;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{from_value as from_json, json, Value as JsonValue};

#[repr(u8)]
enum Opcode {
  Success = 0,
  //InternalError = 100,
  InvalidLogin = 101,
  InvalidRequest = 102,
  PasswordMismatch = 103,
}

/// Stand-ins for uploaded evidence.
const SAMPLE_PHOTOS: [&str; 3] = [
  "https://images.pexels.com/photos/164558/pexels-photo-164558.jpeg",
  "https://images.pexels.com/photos/712513/pexels-photo-712513.jpeg",
  "https://images.pexels.com/photos/33870/pexels-photo.jpg",
];

// every address geocodes here
const MOCK_LATITUDE: f64 = 40.7128;
const MOCK_LONGITUDE: f64 = -74.0060;

pub async fn main(
  uri: String,
  mut post_data: JsonValue,
  reports: Reports,
  chat: Chat,
  config: Config,
  session_store: WebSession,
  session: Session,
) -> Result<JsonValue> {
  // check cors hash
  {
    let cors_h = match post_data.get("cors_h").and_then(JsonValue::as_str) {
      Some(cors_h) => cors_h,
      None => bail!(ErrorKind::InvalidRequest),
    };
    if !util::check_cors_hash(cors_h, &config) {
      bail!(ErrorKind::InvalidRequest);
    }
  }
  if let Some(data) = post_data.as_object_mut() {
    data.remove("cors_h");
  }

  lazy_static! {
    static ref PATH_TREE: PathTree::<&'static str> = {
      let mut tmp = PathTree::<&str>::new();
      for path in vec![
        "/auth/login",
        "/auth/register",
        "/auth/logout",
        "/report/add",
        "/report/status",
        "/report/verify",
        "/chat/send",
        "/chat/clear",
      ] {
        tmp.insert(path, path);
      }
      tmp
    };
  };

  let ctr = Controller {
    reports,
    chat,
    config,
    post_data,
    session_store,
    session,
  };

  let res = match PATH_TREE.find(uri.as_str()) {
    Some((path, _)) => match *path {
      "/auth/login" => ctr.auth_login().await?,
      "/auth/register" => ctr.auth_register().await?,
      "/auth/logout" => ctr.auth_logout()?,
      "/report/add" => ctr.report_add()?,
      "/report/status" => ctr.report_status()?,
      "/report/verify" => ctr.report_verify()?,
      "/chat/send" => ctr.chat_send()?,
      "/chat/clear" => ctr.chat_clear()?,
      _ => bail!(ErrorKind::RouteNotFound),
    },
    None => bail!(ErrorKind::RouteNotFound),
  };
  Ok(res)
}

struct Controller {
  reports: Reports,
  chat: Chat,
  config: Config,
  post_data: JsonValue,
  session_store: WebSession,
  session: Session,
}

impl Controller {
  fn request<T: DeserializeOwned>(&mut self) -> Result<T> {
    from_json(self.post_data.take()).chain_err(|| ErrorKind::InvalidRequest)
  }

  fn redirect(&self, path: &str) -> String {
    format!("{}{}", self.config.web.root_url, path)
  }

  ///auth/login
  async fn auth_login(mut self) -> Result<JsonValue> {
    #[derive(Deserialize)]
    struct Request {
      email: String,
      password: String,
      role: Role,
    }
    let request: Request = self.request()?;
    match auth::login(
      &mut self.session_store,
      request.email.trim(),
      &request.password,
      request.role,
    )
    .await
    {
      Ok(_) => {}
      Err(Error(ErrorKind::InvalidLogin, _)) => {
        return Ok(json!({
          "result": Opcode::InvalidLogin as u8,
          "message": ErrorKind::InvalidLogin.to_string()
        }))
      }
      Err(e) => bail!(e),
    };
    Ok(json!({
      "result": Opcode::Success as u8,
      "redirect": self.redirect(session::DASHBOARD_VIEW)
    }))
  }

  ///auth/register
  async fn auth_register(mut self) -> Result<JsonValue> {
    #[derive(Deserialize)]
    struct Request {
      name: String,
      email: String,
      password: String,
      confirm_password: String,
      role: Role,
    }
    let request: Request = self.request()?;
    if request.password != request.confirm_password {
      return Ok(json!({
        "result": Opcode::PasswordMismatch as u8,
        "message": "Passwords do not match"
      }));
    }
    if request.name.trim().is_empty() || request.email.trim().is_empty() {
      bail!(ErrorKind::InvalidRequest);
    }

    auth::register(
      &mut self.session_store,
      request.name.trim(),
      request.email.trim(),
      &request.password,
      request.role,
    )
    .await?;
    Ok(json!({
      "result": Opcode::Success as u8,
      "redirect": self.redirect(session::DASHBOARD_VIEW)
    }))
  }

  ///auth/logout
  fn auth_logout(mut self) -> Result<JsonValue> {
    auth::logout(&mut self.session_store, &self.chat, &self.session);
    Ok(json!({
      "result": Opcode::Success as u8,
      "redirect": self.redirect(session::LOGIN_VIEW)
    }))
  }

  ///report/add
  fn report_add(mut self) -> Result<JsonValue> {
    #[derive(Deserialize)]
    struct Request {
      title: String,
      description: String,
      #[serde(rename = "type")]
      crime_type: CrimeType,
      address: String,
      #[serde(default)]
      images: Vec<String>,
      #[serde(default)]
      sample_photo: bool,
    }
    lazy_static! {
      static ref REG_URL: Regex = Regex::new(r"^https?://\S+$").unwrap();
    }

    let request: Request = self.request()?;
    let (title, description, address) = (
      request.title.trim(),
      request.description.trim(),
      request.address.trim(),
    );
    if title.is_empty() || description.is_empty() || address.is_empty() {
      return Ok(json!({
        "result": Opcode::InvalidRequest as u8,
        "message": "Title, description and location are required"
      }));
    }

    let mut images: Vec<String> = request
      .images
      .iter()
      .map(|image| image.trim())
      .filter(|image| !image.is_empty())
      .map(String::from)
      .collect();
    if !images.iter().all(|image| REG_URL.is_match(image)) {
      return Ok(json!({
        "result": Opcode::InvalidRequest as u8,
        "message": "Photos must be http(s) links"
      }));
    }
    if request.sample_photo {
      if let Some(photo) = SAMPLE_PHOTOS.choose(&mut rand::thread_rng()) {
        images.push(photo.to_string());
      }
    }

    let reported_by = match self.session_store.user() {
      Some(user) => user.id.clone(),
      None => bail!(ErrorKind::Unauthorized),
    };

    let report = self.reports.add_report(ReportDraft {
      title: title.to_string(),
      description: description.to_string(),
      location: Location {
        address: address.to_string(),
        latitude: MOCK_LATITUDE,
        longitude: MOCK_LONGITUDE,
      },
      crime_type: request.crime_type,
      images,
      reported_by,
      verification_status: None,
      verification_reason: None,
    });

    Ok(json!({
      "result": Opcode::Success as u8,
      "id": report.id,
      "redirect": self.redirect("views/report?submitted=1")
    }))
  }

  ///report/status
  fn report_status(mut self) -> Result<JsonValue> {
    #[derive(Deserialize)]
    struct Request {
      id: String,
      status: ReportStatus,
    }
    let request: Request = self.request()?;
    if !self.reports.update_report_status(&request.id, request.status) {
      log::debug!("status update for unknown report {}", request.id);
    }
    Ok(json!({ "result": Opcode::Success as u8 }))
  }

  ///report/verify
  fn report_verify(mut self) -> Result<JsonValue> {
    #[derive(Deserialize)]
    struct Request {
      id: String,
      status: VerificationStatus,
      #[serde(default)]
      reason: Option<String>,
    }
    let request: Request = self.request()?;
    if !self
      .reports
      .update_verification_status(&request.id, request.status, request.reason)
    {
      log::debug!("verification update for unknown report {}", request.id);
    }
    Ok(json!({ "result": Opcode::Success as u8 }))
  }

  ///chat/send
  fn chat_send(mut self) -> Result<JsonValue> {
    #[derive(Deserialize)]
    struct Request {
      content: String,
    }
    let request: Request = self.request()?;
    let content = request.content.trim();
    if content.is_empty() {
      bail!(ErrorKind::InvalidRequest);
    }

    let conversation = auth::ensure_conversation(&self.session)?;
    let message = self.chat.add_message(&conversation, content, Sender::User);
    Ok(json!({ "result": Opcode::Success as u8, "id": message.id }))
  }

  ///chat/clear
  fn chat_clear(self) -> Result<JsonValue> {
    if let Some(conversation) = auth::conversation_id(&self.session) {
      self.chat.clear_messages(&conversation);
    }
    Ok(json!({ "result": Opcode::Success as u8 }))
  }
}
