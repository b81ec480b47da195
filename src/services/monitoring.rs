// Monitoring with optional Sentry integration
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
///
/// The Sentry layer is always attached; it is inert until a client is bound.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer())
        .init();
}

/// Start Sentry error reporting when a DSN is configured
///
/// The returned guard flushes pending events on drop and must live as long as `main`.
pub fn init_sentry(dsn: Option<&str>) -> Option<sentry::ClientInitGuard> {
    let dsn = match dsn?.parse::<sentry::types::Dsn>() {
        Ok(dsn) => dsn,
        Err(e) => {
            warn!(error = %e, "Invalid SENTRY_DSN, error reporting disabled");
            return None;
        }
    };
    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(dsn),
        release: sentry::release_name!(),
        ..Default::default()
    });
    if guard.is_enabled() {
        info!("Sentry error reporting enabled");
        Some(guard)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_dsn_means_no_client() {
        assert!(init_sentry(None).is_none());
        assert!(init_sentry(Some("not a dsn")).is_none());
    }
}
