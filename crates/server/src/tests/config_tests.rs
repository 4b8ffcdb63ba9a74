use super::{load_settings_from, Settings};

use std::{
    collections::HashMap,
    env, fs,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    let dir = env::temp_dir().join(format!("trellis_config_test_{suffix}_{n}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("server.toml");
    fs::write(&path, contents).expect("write config");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_file_keeps_defaults() {
    let settings = load_settings_from(&env::temp_dir().join("trellis_missing/server.toml"), no_env);
    assert_eq!(settings, Settings::default());
}

#[test]
fn file_values_override_defaults() {
    let path = temp_config(
        "bind_addr = \"0.0.0.0:9000\"\nmax_message_bytes = 2048\npage_title = \"Demo\"\n",
    );
    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.server_bind, "0.0.0.0:9000");
    assert_eq!(settings.max_message_bytes, 2048);
    assert_eq!(settings.page_title, "Demo");
    assert_eq!(settings.log_filter, "info");

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let path = temp_config("bind_addr = \"0.0.0.0:9000\"\nlog_filter = \"warn\"\n");
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SERVER_BIND", "127.0.0.1:1"),
        ("APP__BIND_ADDR", "127.0.0.1:2"),
        ("APP__LOG_FILTER", "debug,engine=trace"),
        ("APP__MAX_MESSAGE_BYTES", "not-a-number"),
    ]);
    let settings = load_settings_from(&path, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.server_bind, "127.0.0.1:2");
    assert_eq!(settings.log_filter, "debug,engine=trace");
    assert_eq!(settings.max_message_bytes, Settings::default().max_message_bytes);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn malformed_file_is_ignored() {
    let path = temp_config("this is = = not toml");
    assert_eq!(load_settings_from(&path, no_env), Settings::default());
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}
