use crate::util::parse_bool_str;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::IsTerminal;

const DEFAULT_LOG_PATH: &str = "/tmp/nexus-debug.log";
const DEBUG_PAYLOAD_ENV: &str = "NEXUS_DEBUG_PAYLOAD";
const LOG_PATH_ENV: &str = "NEXUS_LOG_PATH";
const LOG_FILTER_ENV: &str = "NEXUS_LOG";

/// Installs the process logger.
///
/// While stderr is a terminal the TUI owns the screen, so records go to a
/// file instead (`NEXUS_LOG_PATH`, falling back to `/tmp/nexus-debug.log`).
pub fn init_logging() {
    let env = env_logger::Env::new()
        .filter_or(LOG_FILTER_ENV, "warn")
        .write_style_or("NEXUS_LOG_STYLE", "never");
    let mut builder = env_logger::Builder::from_env(env);

    if let Some(path) = resolve_log_path() {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(error) => {
                eprintln!("nexus: cannot open log file '{path}': {error}");
            }
        }
    }

    let _ = builder.try_init();
}

pub fn debug_payload_enabled() -> bool {
    std::env::var(DEBUG_PAYLOAD_ENV)
        .ok()
        .and_then(|v| parse_bool_str(&v))
        .unwrap_or(false)
}

pub fn emit_debug_payload(request_url: &str, payload: &Value) {
    let formatted_payload = serde_json::to_string_pretty(payload)
        .unwrap_or_else(|_| "<payload serialization error>".to_string());
    log::info!(
        target: "nexus::api",
        "payload_request url={request_url}\npayload:\n{formatted_payload}"
    );
}

pub fn emit_sse_parse_error(json_data: &str, parse_error: &serde_json::Error) {
    log::warn!(
        target: "nexus::api",
        "sse_parse_failed error={parse_error}\ndata:\n{json_data}"
    );
}

fn resolve_log_path() -> Option<String> {
    std::env::var(LOG_PATH_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            if std::io::stderr().is_terminal() {
                Some(DEFAULT_LOG_PATH.to_string())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_payload_enabled_accepts_true_variants() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        std::env::set_var(DEBUG_PAYLOAD_ENV, "1");
        assert!(debug_payload_enabled());
        std::env::set_var(DEBUG_PAYLOAD_ENV, "TRUE");
        assert!(debug_payload_enabled());
        std::env::set_var(DEBUG_PAYLOAD_ENV, "no");
        assert!(!debug_payload_enabled());
        std::env::remove_var(DEBUG_PAYLOAD_ENV);
    }

    #[test]
    fn test_resolve_log_path_prefers_explicit_path() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nexus.log");
        std::env::set_var(LOG_PATH_ENV, path.to_string_lossy().to_string());
        assert_eq!(
            resolve_log_path().as_deref(),
            Some(path.to_string_lossy().as_ref())
        );
        std::env::remove_var(LOG_PATH_ENV);
    }

    #[test]
    fn test_blank_log_path_is_ignored() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        std::env::set_var(LOG_PATH_ENV, "   ");
        let resolved = resolve_log_path();
        assert_ne!(resolved.as_deref(), Some("   "));
        std::env::remove_var(LOG_PATH_ENV);
    }
}
