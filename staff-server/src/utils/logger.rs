//! Logging Infrastructure
//!
//! Console output (pretty or JSON) plus, when a log directory is configured,
//! two daily-rolling files:
//! - `app/`      everything except the `security` target
//! - `security/` login, token and access-denied events only
//!
//! `RUST_LOG` overrides the configured level when set.

use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{FilterExt, filter_fn};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Security events are emitted on this target by `security_log!`
pub const SECURITY_TARGET: &str = "security";

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,staff_server={level},{SECURITY_TARGET}={level},tower_http={level}"
        ))
    })
}

/// Initialize the logging system
///
/// # Examples
/// ```no_run
/// // Development (console only)
/// staff_server::init_logger("debug", false, None)?;
///
/// // Production (JSON console + files)
/// staff_server::init_logger("info", true, Some("./logs"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let mut layers: Vec<BoxedLayer> = Vec::new();

    let console = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_filter(env_filter(level))
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_filter(env_filter(level))
            .boxed()
    };
    layers.push(console);

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_dir = log_dir.join("app");
        let security_dir = log_dir.join("security");
        fs::create_dir_all(&app_dir)?;
        fs::create_dir_all(&security_dir)?;

        let app_log = RollingFileAppender::new(Rotation::DAILY, app_dir, "app");
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(
                    filter_fn(|meta| meta.target() != SECURITY_TARGET).and(env_filter(level)),
                )
                .boxed(),
        );

        // 安全日志永久保留
        let security_log = RollingFileAppender::new(Rotation::DAILY, security_dir, "security");
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(security_log))
                .with_filter(
                    filter_fn(|meta| meta.target() == SECURITY_TARGET).and(env_filter(level)),
                )
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}
