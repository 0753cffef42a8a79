//! Global subscriber installation.

use std::sync::Once;

use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Output shape of the log stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Pretty lines on stderr, `debug` for distdiff crates
    Development,
    /// One JSON object per line on stderr, `info` for distdiff crates
    Production,
    /// No output; tests install a capture layer with `init_test_capture`
    Test,
}

impl Profile {
    /// Filter used when `RUST_LOG` is unset
    pub fn default_directive(self) -> &'static str {
        match self {
            Profile::Development => "distdiff=debug",
            Profile::Production | Profile::Test => "distdiff=info",
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

static INSTALLED: Once = Once::new();

/// Install the global subscriber for `profile`.
///
/// Only the first call in a process has an effect. If another subscriber is
/// already installed (a test harness, an embedding application) it is kept.
///
/// ```
/// use distdiff_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INSTALLED.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(profile.filter());
        let installed = match profile {
            Profile::Development => builder.try_init().is_ok(),
            Profile::Production => builder.json().try_init().is_ok(),
            Profile::Test => tracing_subscriber::registry().try_init().is_ok(),
        };
        if !installed {
            tracing::debug!(?profile, "subscriber already installed, keeping it");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        for _ in 0..3 {
            init(Profile::Test);
        }
    }

    #[test]
    fn test_development_is_more_verbose_than_production() {
        assert!(Profile::Development.default_directive().ends_with("debug"));
        assert!(Profile::Production.default_directive().ends_with("info"));
    }
}
