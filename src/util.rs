use crate::{config::Config, error::Result};
use actix_web::{http::header, web, HttpResponse};
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use error_chain::bail;
use futures::StreamExt;
use hex_slice::AsHex;
use rand::prelude::*;
use sha2::{Digest, Sha256};
use std::time::SystemTime;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

pub fn get_timestamp() -> u64 {
  SystemTime::now()
    .duration_since(SystemTime::UNIX_EPOCH)
    .map(|d| d.as_secs())
    .unwrap_or(0)
}

/// Short base-36 identifier for users, reports and chat messages.
pub fn gen_id() -> String {
  let mut rng = rand::thread_rng();
  (0..ID_LEN)
    .map(|_| *ID_ALPHABET.choose(&mut rng).unwrap_or(&b'0') as char)
    .collect()
}

pub fn gen_ssid() -> String {
  let mut data = [0u8; 32];
  rand::thread_rng().fill_bytes(&mut data);
  format!("{:02x}", data.plain_hex(false))
}

pub fn gen_cors_hash(timestamp: u64, config: &Config) -> String {
  format!(
    "{:x},{}",
    Sha256::digest(format!("{}{}", config.web.secret_key, timestamp).as_bytes()),
    timestamp
  )
}

pub fn check_cors_hash(hash: &str, config: &Config) -> bool {
  let tokens: Vec<&str> = hash.split(',').collect();
  if tokens.len() != 2 {
    return false;
  }
  let timestamp = match tokens[1].parse::<u64>() {
    Ok(t) => t,
    Err(_) => return false,
  };
  gen_cors_hash(timestamp, config) == hash && timestamp <= get_timestamp()
}

pub fn strip_slashes(uri: String) -> String {
  format!("/{}", uri.trim_matches('/'))
}

pub fn redirect(path: &str, config: &Config) -> HttpResponse {
  HttpResponse::Found()
    .insert_header((header::LOCATION, format!("{}{}", config.web.root_url, path)))
    .finish()
}

pub async fn read_payload(mut payload: web::Payload, config: &Config) -> Result<BytesMut> {
  let mut body = BytesMut::new();
  while let Some(chunk) = payload.next().await {
    let chunk = chunk?;
    if (body.len() + chunk.len()) > config.server.max_payload_size {
      bail!("payload overflow");
    }
    body.extend_from_slice(&chunk);
  }
  Ok(body)
}

/// `?a=1&b=2`, or an empty string when there is nothing to encode.
pub fn query_string(pairs: &[(&str, String)]) -> Result<String> {
  if pairs.is_empty() {
    return Ok(String::new());
  }
  Ok(format!("?{}", serde_urlencoded::to_string(pairs)?))
}

pub fn format_timestamp(timestamp: &DateTime<Utc>, fmt: &str) -> String {
  timestamp.format(fmt).to_string()
}
