use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Base path for the bridge log; unset means no file logging.
pub const LOG_ENV_VAR: &str = "STORE_BRIDGE_LOG";

/// Per-process log file for `base`: `<dir>/<stem>-<pid>.log`.
///
/// Every bridge process embedded in the same page host writes its own file,
/// so inbound/outbound traces from different processes never interleave.
pub fn log_file_path(base: &Path, pid: u32) -> PathBuf {
    let stem = base
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("storebridge");
    base.with_file_name(format!("{stem}-{pid}.log"))
}

/// Sends bridge traces to the per-process file derived from
/// `STORE_BRIDGE_LOG`. Does nothing when the variable is unset.
pub fn init_tracing() {
    let Some(base) = std::env::var_os(LOG_ENV_VAR) else {
        return;
    };
    let path = log_file_path(Path::new(&base), std::process::id());

    let file = match std::fs::File::create(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("storebridge: cannot open log {}: {err}", path.display());
            return;
        }
    };

    let sync_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    // The host page may own the global subscriber already.
    let _ = tracing_subscriber::registry()
        .with(default_filter())
        .with(sync_layer)
        .try_init();
}

/// Sends bridge traces to stderr, stamped in RFC 3339 UTC.
pub fn init_stderr_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .try_init();
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
