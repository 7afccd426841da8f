#![allow(dead_code)]
use std::fs;
use std::io::{BufRead as _, BufReader, Write as _};
use std::net::TcpListener;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use anyhow::Result;
use assert_cmd::Command;
use tempfile::{Builder, TempDir};
use zip::write::SimpleFileOptions;

/// Stand-in for WP-CLI. Logs its argv, fakes the files later steps look for and
/// fails on the subcommand named in `FAKE_WP_FAIL` (e.g. `db create`).
const FAKE_WP: &str = r#"#!/bin/sh
echo "wp $*" >> "$WP_VALET_TEST_LOG"
if [ "$1 $2" = "$FAKE_WP_FAIL" ]; then
  echo "Error: fake failure in $1 $2" >&2
  exit 1
fi
case "$1 $2" in
  "core download") mkdir -p wp-content/plugins ;;
  "core config") echo "<?php // wp-config" > wp-config.php ;;
esac
exit 0
"#;

/// Stand-in for Valet. `FAKE_VALET_FAIL=1` makes every command fail.
const FAKE_VALET: &str = r#"#!/bin/sh
echo "valet $*" >> "$WP_VALET_TEST_LOG"
if [ -n "$FAKE_VALET_FAIL" ]; then
  echo "Valet is not running."
  exit 1
fi
case "$1" in
  domain) echo "test" ;;
  secure) echo "The [$2.test] site has been secured with a fresh TLS certificate." ;;
esac
exit 0
"#;

#[derive(Debug)]
pub struct TestEnv {
  temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = Builder::new()
      .prefix("wp-valet-test-")
      .tempdir()
      .expect("temp dir");
    let env = Self { temp };
    for dir in [env.work_dir(), env.bin_dir(), env.config_home(), env.cache_home()] {
      fs::create_dir_all(dir).expect("create test dirs");
    }
    write_script(&env.bin_dir().join("wp"), FAKE_WP).expect("fake wp");
    write_script(&env.bin_dir().join("valet"), FAKE_VALET).expect("fake valet");
    env
  }

  /// Directory the binary runs in; sites land below it.
  pub fn work_dir(&self) -> PathBuf {
    self.temp.path().join("work")
  }

  pub fn bin_dir(&self) -> PathBuf {
    self.temp.path().join("bin")
  }

  pub fn config_home(&self) -> PathBuf {
    self.temp.path().join("config")
  }

  pub fn cache_home(&self) -> PathBuf {
    self.temp.path().join("cache")
  }

  pub fn log_path(&self) -> PathBuf {
    self.temp.path().join("calls.log")
  }

  pub fn bin_cmd(&self) -> Result<Command> {
    let mut cmd = Command::cargo_bin("wp-valet")?;
    let path = match std::env::var("PATH") {
      Ok(existing) if !existing.is_empty() => format!("{}:{existing}", self.bin_dir().display()),
      _ => self.bin_dir().display().to_string(),
    };
    cmd.current_dir(self.work_dir());
    cmd.env("PATH", path);
    cmd.env("XDG_CONFIG_HOME", self.config_home());
    cmd.env("XDG_CACHE_HOME", self.cache_home());
    cmd.env("WP_VALET_TEST_LOG", self.log_path());
    cmd.env_remove("WP_VALET_WP");
    cmd.env_remove("WP_VALET_VALET");
    cmd.env_remove("FAKE_WP_FAIL");
    cmd.env_remove("FAKE_VALET_FAIL");
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_PROXY", "127.0.0.1");
    Ok(cmd)
  }

  /// Every fake tool invocation so far, one `wp ...` / `valet ...` line each.
  pub fn calls(&self) -> Vec<String> {
    fs::read_to_string(self.log_path())
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  pub fn write_global_config(&self, body: &str) -> Result<()> {
    let dir = self.config_home().join("wp-valet");
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("wp-valet.toml"), body)?;
    Ok(())
  }

  /// Put a plugin archive for `version` into the download cache.
  pub fn seed_sqlite_cache(&self, version: &str) -> Result<PathBuf> {
    let path = self
      .cache_home()
      .join("wp-valet")
      .join("valet-command")
      .join(format!("sqlite-integration.{version}.zip"));
    fs::create_dir_all(path.parent().expect("cache parent"))?;
    write_plugin_zip(&path)?;
    Ok(path)
  }
}

/// Serve canned `(path, body)` responses with status 200 on a loopback port,
/// 404 for anything else. Returns the base URL.
pub fn serve_http(routes: Vec<(String, Vec<u8>)>) -> Result<String> {
  let listener = TcpListener::bind("127.0.0.1:0")?;
  let base = format!("http://{}", listener.local_addr()?);
  std::thread::spawn(move || {
    for stream in listener.incoming() {
      let Ok(mut stream) = stream else { break };
      let Ok(read_half) = stream.try_clone() else { continue };
      let mut reader = BufReader::new(read_half);
      let mut request_line = String::new();
      let _ = reader.read_line(&mut request_line);
      let mut line = String::new();
      loop {
        line.clear();
        let n = reader.read_line(&mut line).unwrap_or(0);
        if n == 0 || line == "\r\n" {
          break;
        }
      }
      let path = request_line.split_whitespace().nth(1).unwrap_or("/");
      let found = routes.iter().find(|(p, _)| p == path);
      let (status, body) = match found {
        Some((_, body)) => ("200 OK", body.as_slice()),
        None => ("404 Not Found", &[][..]),
      };
      let head = format!(
        "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
      );
      let _ = stream.write_all(head.as_bytes());
      let _ = stream.write_all(body);
    }
  });
  Ok(base)
}

pub fn write_plugin_zip(dest: &Path) -> Result<()> {
  let mut zip = zip::ZipWriter::new(fs::File::create(dest)?);
  let opts = SimpleFileOptions::default();
  zip.start_file("sqlite-database-integration/load.php", opts)?;
  zip.write_all(b"<?php // sqlite integration")?;
  zip.start_file("sqlite-database-integration/db.copy", opts)?;
  zip.write_all(b"<?php // drop-in for {SQLITE_PLUGIN}")?;
  zip.finish()?;
  Ok(())
}

fn write_script(path: &Path, body: &str) -> Result<()> {
  fs::write(path, body)?;
  #[cfg(unix)]
  fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
  Ok(())
}
