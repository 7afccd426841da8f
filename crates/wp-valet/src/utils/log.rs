/// Token styling helpers.
///
/// The `t` module stands for "tokens". Use these helpers to style
/// specific values inside info messages consistently across the CLI.
pub mod t {
  use std::fmt::Display;

  use owo_colors::OwoColorize as _;

  pub fn path(p: impl Display) -> String {
    format!("{}", p.to_string().cyan())
  }

  pub fn slug(slug: impl Display) -> String {
    format!("{}", slug.to_string().magenta())
  }

  pub fn url(url: impl Display) -> String {
    format!("{}", url.to_string().blue().underline())
  }

  pub fn cmd(cmd: impl Display) -> String {
    format!("{}", cmd.to_string().bold())
  }

  pub fn ok(s: impl Display) -> String {
    format!("{}", s.to_string().green())
  }

  pub fn warn(s: impl Display) -> String {
    format!("{}", s.to_string().yellow())
  }

  pub fn err(s: impl Display) -> String {
    format!("{}", s.to_string().red())
  }
}

// Progress output for the person running the command. Diagnostics go through the
// `log` facade instead and only show up with --debug or RUST_LOG.
// info = neutral, success/warn/error = full-line tint.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
  Info,
  Success,
  Warn,
  Error,
}

#[doc(hidden)]
pub fn emit(level: LogLevel, text: String) {
  match level {
    LogLevel::Info | LogLevel::Success => anstream::println!("{}", text),
    LogLevel::Warn | LogLevel::Error => anstream::eprintln!("{}", text),
  }
}

/// Initialize the `log` backend. `debug` forces the debug level; otherwise
/// `RUST_LOG` wins and warnings are the floor.
pub fn init_logger(debug: bool) {
  let env = env_logger::Env::default().default_filter_or(if debug { "debug" } else { "warn" });
  let mut builder = env_logger::Builder::from_env(env);
  if debug {
    builder.filter_module("wp_valet", log::LevelFilter::Debug);
  }
  let _ = builder.format_timestamp_secs().try_init();
}

#[macro_export]
macro_rules! log_info {
  ($fmt:literal $(, $args:expr )* $(,)?) => {{
    $crate::utils::log::emit(
      $crate::utils::log::LogLevel::Info,
      format!($fmt $(, $args )*)
    );
  }};
}

#[macro_export]
macro_rules! log_success {
  ($fmt:literal $(, $args:expr )* $(,)?) => {{
    $crate::utils::log::emit(
      $crate::utils::log::LogLevel::Success,
      $crate::utils::log::t::ok(format!($fmt $(, $args )*))
    );
  }};
}

#[macro_export]
macro_rules! log_warn {
  ($fmt:literal $(, $args:expr )* $(,)?) => {{
    $crate::utils::log::emit(
      $crate::utils::log::LogLevel::Warn,
      $crate::utils::log::t::warn(format!($fmt $(, $args )*))
    );
  }};
}

#[macro_export]
macro_rules! log_error {
  ($fmt:literal $(, $args:expr )* $(,)?) => {{
    $crate::utils::log::emit(
      $crate::utils::log::LogLevel::Error,
      $crate::utils::log::t::err(format!($fmt $(, $args )*))
    );
  }};
}
