use crate::{config::Config, error::Result, session::DEMO_DIRECTORY};
use clap::{clap_app, crate_version};
use std::process::exit;

/// Handles the informational subcommands, which exit, and applies
/// `serve` overrides to the loaded config.
pub fn load(mut config: Config) -> Result<Config> {
  let matches = clap_app!(crimeguard =>
    (version: crate_version!())
    (about: "Community crime reporting portal")
    (@subcommand serve =>
      (about: "start the http server (default)")
      (@arg bind: -b --bind +takes_value "override server.bind_addr")
    )
    (@subcommand accounts =>
      (about: "list the demo accounts accepted by the login form")
    )
    (@subcommand config =>
      (about: "print the effective configuration")
    )
  )
  .get_matches();

  match matches.subcommand() {
    /*** accounts ***/
    ("accounts", Some(_)) => {
      println!("{:<8} {:<22} {}", "ROLE", "EMAIL", "NAME");
      for user in DEMO_DIRECTORY.iter() {
        println!("{:<8} {:<22} {}", user.role.as_ref(), user.email, user.name);
      }
      println!("\nany password is accepted");
      exit(0);
    }

    /*** config ***/
    ("config", Some(_)) => {
      print!("{}", describe(&config));
      exit(0);
    }

    /*** serve ***/
    ("serve", Some(command)) => {
      if let Some(bind) = command.value_of("bind") {
        config.server.bind_addr = bind.to_string();
      }
    }

    _ => (),
  };
  Ok(config)
}

// secret_key is never printed
fn describe(config: &Config) -> String {
  format!(
    "[server]\nbind_addr = {:?}\nmax_payload_size = {}\nstatic_dir = {:?}\n\n\
     [web]\nroot_url = {:?}\nsecret_key = <{} bytes>\n\n\
     [demo]\nauth_latency_ms = {}\nreply_delay_ms = {}\n",
    config.server.bind_addr,
    config.server.max_payload_size,
    config.server.static_dir,
    config.web.root_url,
    config.web.secret_key.len(),
    config.demo.auth_latency_ms,
    config.demo.reply_delay_ms,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::test_config;

  #[test]
  fn describe_hides_the_secret() {
    let config = test_config();
    let text = describe(&config);
    assert!(text.contains("secret_key = <64 bytes>"));
    assert!(!text.contains(&config.web.secret_key));
    assert!(text.contains("reply_delay_ms = 20"));
  }
}
