mod chat;
mod cli;
mod config;
mod error;
mod nav;
mod query;
mod reports;
mod schema;
mod session;
mod storage;
mod util;
mod web;

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("actix_web=info,crimeguard=info")).init();

  let res = (|| -> error::Result<_> {
    let config = cli::load(config::load()?)?;

    web::init(config)?;

    Ok(())
  })();

  if let Err(e) = res {
    error::display(&e);
    std::process::exit(1);
  }
}
