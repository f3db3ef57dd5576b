use super::load::{default_config_path, resolve_config_path, system_config_path};
use super::schema::*;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

fn valid_settings() -> Settings {
    Settings {
        credentials: Credentials {
            api_key: "key".to_string(),
            shared_secret: "secret".to_string(),
        },
        ..Settings::default()
    }
}

#[test]
fn resolve_config_path_prefers_explicit_env_var() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("MINIDLNA_SCROBBLE_CONFIG_PATH", "/tmp/scrobble-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        PathBuf::from("/tmp/scrobble-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_existing_xdg_file() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let app_dir = dir.path().join("minidlna-scrobble");
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(app_dir.join("config.toml"), "").unwrap();

    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", dir.path().to_str().unwrap());
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(default_config_path().unwrap(), app_dir.join("config.toml"));
}

#[test]
fn default_config_path_falls_back_to_etc_when_user_file_missing() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", dir.path().to_str().unwrap());

    assert_eq!(default_config_path().unwrap(), system_config_path());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
log_file = "/srv/minidlna/minidlna.log"
db_file = "/srv/minidlna/files.db"

[credentials]
api_key = "abc"
shared_secret = "shh"

[watcher]
magic_marker = "upnphttp.c:2000"

[remote]
timeout_secs = 3

[session]
cache_dir = "/srv/cache"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MINIDLNA_SCROBBLE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("MINIDLNA_SCROBBLE__LOG_FILE");

    let s = Settings::load().unwrap();
    assert_eq!(s.log_file, PathBuf::from("/srv/minidlna/minidlna.log"));
    assert_eq!(s.db_file, PathBuf::from("/srv/minidlna/files.db"));
    assert_eq!(s.credentials.api_key, "abc");
    assert_eq!(s.credentials.shared_secret, "shh");
    assert_eq!(s.watcher.magic_marker, "upnphttp.c:2000");
    assert_eq!(s.remote.timeout_secs, 3);
    assert_eq!(s.remote.api_url, RemoteSettings::default().api_url);
    assert_eq!(s.session.cache_dir, Some(PathBuf::from("/srv/cache")));
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(&cfg_path, "log_file = \"/var/log/a.log\"\n").unwrap();

    let _g1 = EnvGuard::set("MINIDLNA_SCROBBLE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("MINIDLNA_SCROBBLE__LOG_FILE", "/var/log/b.log");

    let s = Settings::load().unwrap();
    assert_eq!(s.log_file, PathBuf::from("/var/log/b.log"));
}

#[test]
fn validate_rejects_relative_paths_and_missing_credentials() {
    assert!(valid_settings().validate().is_ok());

    let s = Settings {
        log_file: PathBuf::from("minidlna.log"),
        ..valid_settings()
    };
    assert!(s.validate().unwrap_err().contains("log_file"));

    let s = Settings {
        db_file: PathBuf::from("files.db"),
        ..valid_settings()
    };
    assert!(s.validate().unwrap_err().contains("db_file"));

    let s = Settings {
        credentials: Credentials::default(),
        ..valid_settings()
    };
    assert!(s.validate().unwrap_err().contains("api_key"));

    let mut s = valid_settings();
    s.remote.timeout_secs = 0;
    assert!(s.validate().is_err());
}

#[test]
fn credentials_debug_hides_shared_secret() {
    let rendered = format!("{:?}", valid_settings().credentials);
    assert!(rendered.contains("key"));
    assert!(!rendered.contains("secret\""));
    assert!(rendered.contains("<redacted>"));
}
