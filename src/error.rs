use actix_web::{http::StatusCode, HttpResponse};
use error_chain::error_chain;

error_chain! {
  foreign_links {
    SerdeJsonError(serde_json::error::Error);
    UrlEncodeError(serde_urlencoded::ser::Error);
    IoError(std::io::Error);
    TomlError(toml::de::Error);
    FromUtf8Error(std::string::FromUtf8Error);
    PayloadError(actix_web::error::PayloadError);
    SessionInsertError(actix_session::SessionInsertError);
    SessionGetError(actix_session::SessionGetError);
  }

  errors {
    InvalidLogin {
      description("invalid credentials")
      display("Invalid credentials")
    }
    InvalidRequest
    Unauthorized
    RouteNotFound
  }
}

pub fn display(error: &Error) -> String {
  match error.kind() {
    ErrorKind::RouteNotFound => "".to_string(),
    _ => {
      let mut msg = "Error:\n".to_string();
      error
        .iter()
        .enumerate()
        .for_each(|(index, error)| msg.push_str(&format!("└> {} - {}\n", index, error)));

      if let Some(backtrace) = error.backtrace() {
        msg.push_str(&format!("\n\n{:?}", backtrace));
      }
      log::error!("{}", msg);
      msg
    }
  }
}

impl actix_web::ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self.kind() {
      ErrorKind::RouteNotFound => StatusCode::NOT_FOUND,
      ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
      ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    match self.kind() {
      ErrorKind::RouteNotFound => HttpResponse::NotFound().body(display(self)),
      ErrorKind::Unauthorized => HttpResponse::Unauthorized().finish(),
      ErrorKind::InvalidRequest => HttpResponse::BadRequest().body({
        #[cfg(debug_assertions)]
        {
          display(self)
        }
        #[cfg(not(debug_assertions))]
        {
          "".to_string()
        }
      }),
      _ => HttpResponse::InternalServerError().body(display(self)),
    }
  }
}
