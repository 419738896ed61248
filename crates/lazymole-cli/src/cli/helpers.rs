use super::CliError;
use anyhow::Context;
use lazymole_core::modules::solver::{Readiness, SolverSettings};
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub(super) fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when the CLI is driven in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(clap::Args, Debug, Clone)]
pub(super) struct SolverFlags {
    /// Seconds to wait before acknowledging the solver's startup pause
    #[arg(long, default_value_t = 20.0)]
    pub(super) settle_secs: f64,

    /// Acknowledge as soon as this text appears on the solver's stdout
    #[arg(long)]
    pub(super) prompt: Option<String>,

    /// Kill the solver after this many seconds
    #[arg(long, default_value_t = 21_600, conflicts_with = "no_timeout")]
    pub(super) timeout_secs: u64,

    /// Wait for the solver indefinitely
    #[arg(long)]
    pub(super) no_timeout: bool,
}

impl SolverFlags {
    pub(super) fn into_settings(self) -> Result<SolverSettings, CliError> {
        let settle = Duration::try_from_secs_f64(self.settle_secs).map_err(|_| {
            CliError::Usage(format!(
                "Invalid settle delay '{}'; expected a non-negative number of seconds.",
                self.settle_secs
            ))
        })?;
        let readiness = match self.prompt {
            Some(marker) => Readiness::Prompt {
                marker,
                max_wait: settle,
            },
            None => Readiness::FixedDelay(settle),
        };

        Ok(SolverSettings {
            readiness,
            timeout: (!self.no_timeout).then(|| Duration::from_secs(self.timeout_secs)),
            ..SolverSettings::default()
        })
    }
}

pub(super) fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::SolverFlags;
    use crate::cli::CliError;
    use lazymole_core::modules::solver::Readiness;
    use std::time::Duration;

    fn flags() -> SolverFlags {
        SolverFlags {
            settle_secs: 20.0,
            prompt: None,
            timeout_secs: 60,
            no_timeout: false,
        }
    }

    #[test]
    fn default_flags_use_fixed_settle_delay() {
        let settings = flags().into_settings().expect("valid flags");
        assert_eq!(
            settings.readiness,
            Readiness::FixedDelay(Duration::from_secs(20))
        );
        assert_eq!(settings.timeout, Some(Duration::from_secs(60)));
        assert_eq!(settings.acknowledgement, "\n");
    }

    #[test]
    fn prompt_flag_bounds_wait_by_settle_delay() {
        let settings = SolverFlags {
            prompt: Some("Press enter".to_string()),
            settle_secs: 5.0,
            no_timeout: true,
            ..flags()
        }
        .into_settings()
        .expect("valid flags");

        assert_eq!(
            settings.readiness,
            Readiness::Prompt {
                marker: "Press enter".to_string(),
                max_wait: Duration::from_secs(5),
            }
        );
        assert_eq!(settings.timeout, None);
    }

    #[test]
    fn unrepresentable_settle_delays_are_usage_errors() {
        for settle_secs in [-1.0, f64::NAN, f64::INFINITY, 1.0e20] {
            let result = SolverFlags {
                settle_secs,
                ..flags()
            }
            .into_settings();
            assert!(
                matches!(result, Err(CliError::Usage(_))),
                "{settle_secs} should be rejected"
            );
        }
    }

    #[test]
    fn largest_timeout_is_accepted() {
        let settings = SolverFlags {
            timeout_secs: u64::MAX,
            ..flags()
        }
        .into_settings()
        .expect("valid flags");
        assert_eq!(settings.timeout, Some(Duration::from_secs(u64::MAX)));
    }
}
