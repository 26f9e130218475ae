//! Structured logging utilities.
//!
//! Subscriber setup plus the timing helper and macros used while the server
//! assembles its collaborators.

use std::time::Instant;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set. Returns an error if a subscriber
/// is already installed.
pub fn init_tracing(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;
    }

    Ok(())
}

/// Operation timer for measuring and logging execution duration.
///
/// ```rust,ignore
/// use roomgate_api::logging::OpTimer;
///
/// let timer = OpTimer::new("server", "router");
/// // ... build the router ...
/// timer.finish();
/// ```
#[derive(Debug)]
pub struct OpTimer {
    /// Component being timed (e.g., "server", "directory").
    component: String,
    /// Operation being performed (e.g., "signing", "router").
    operation: String,
    start: Instant,
}

impl OpTimer {
    /// Creates a new operation timer and logs the start.
    #[must_use]
    pub fn new(component: impl Into<String>, operation: impl Into<String>) -> Self {
        let component = component.into();
        let operation = operation.into();

        tracing::debug!(
            component = %component,
            operation = %operation,
            "Operation started"
        );

        Self {
            component,
            operation,
            start: Instant::now(),
        }
    }

    /// Finishes the timer and logs the duration.
    pub fn finish(self) {
        let duration_ms = self.start.elapsed().as_millis();

        tracing::info!(
            component = %self.component,
            operation = %self.operation,
            duration_ms = duration_ms,
            "Operation completed"
        );
    }

    /// Finishes the timer, logging at `error` with the failure when `result`
    /// is an error.
    pub fn finish_with_result<T, E: std::fmt::Display>(self, result: &Result<T, E>) {
        let duration_ms = self.start.elapsed().as_millis();

        match result {
            Ok(_) => {
                tracing::info!(
                    component = %self.component,
                    operation = %self.operation,
                    duration_ms = duration_ms,
                    "Operation completed successfully"
                );
            }
            Err(e) => {
                tracing::error!(
                    component = %self.component,
                    operation = %self.operation,
                    duration_ms = duration_ms,
                    error = %e,
                    "Operation failed"
                );
            }
        }
    }
}

/// Macro for logging initialization steps with consistent formatting.
///
/// ```rust,ignore
/// log_init_step!(1, 4, "Signing Authority", "HS256, 200 day lifetime");
/// ```
#[macro_export]
macro_rules! log_init_step {
    ($step:expr, $total:expr, $name:expr, $detail:expr) => {
        tracing::info!(
            step = $step,
            total = $total,
            "[{}/{}] {} - {}",
            $step,
            $total,
            $name,
            $detail
        );
    };
    ($step:expr, $total:expr, $name:expr) => {
        tracing::info!(step = $step, total = $total, "[{}/{}] {}", $step, $total, $name);
    };
}

/// Macro for logging warnings during initialization.
#[macro_export]
macro_rules! log_init_warning {
    ($msg:expr) => {
        tracing::warn!("⚠️  {}", $msg);
    };
    ($msg:expr, $($arg:tt)*) => {
        tracing::warn!("⚠️  {}", format!($msg, $($arg)*));
    };
}

/// Macro for logging startup banners.
#[macro_export]
macro_rules! log_banner {
    ($title:expr) => {
        tracing::info!("═══════════════════════════════════════════════════");
        tracing::info!("  {}", $title);
        tracing::info!("═══════════════════════════════════════════════════");
    };
    ($title:expr, $subtitle:expr) => {
        tracing::info!("═══════════════════════════════════════════════════");
        tracing::info!("  {}", $title);
        tracing::info!("  {}", $subtitle);
        tracing::info!("═══════════════════════════════════════════════════");
    };
}
