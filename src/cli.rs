//! Command-line surface of the `judgment-monitor` binary.

use clap::Parser;
use std::convert::Infallible;
use std::path::PathBuf;

use crate::poller::RunPlan;

/// Count used when `--test` is given without a number.
pub const DEFAULT_TEST_COUNT: usize = 5;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "judgment-monitor",
    version,
    about = "Notify newly published labor-commission decisions"
)]
pub struct Args {
    /// Dry run: send the N newest decisions regardless of history, then exit.
    #[arg(
        long,
        value_name = "N",
        num_args = 0..=1,
        default_missing_value = "",
        value_parser = test_count
    )]
    pub test: Option<usize>,

    /// Settings file (TOML). Defaults to $MONITOR_CONFIG_PATH or config/monitor.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn plan(&self, ci: bool) -> RunPlan {
        match self.test {
            Some(n) => RunPlan::test(n),
            None => RunPlan::production(ci),
        }
    }
}

/// A missing or non-numeric count means the default.
fn test_count(raw: &str) -> Result<usize, Infallible> {
    Ok(raw.trim().parse().unwrap_or(DEFAULT_TEST_COUNT))
}

/// True when running under a CI runner, which forces a single cycle.
pub fn ci_marker_present() -> bool {
    std::env::var_os("GITHUB_ACTIONS").is_some()
        || std::env::var("CI")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::Mode;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("judgment-monitor").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn no_flag_is_production_with_count_one() {
        let plan = parse(&[]).plan(false);
        assert_eq!(plan.mode, Mode::Production);
        assert_eq!(plan.count, 1);
        assert!(!plan.runs_once());
        assert!(parse(&[]).plan(true).runs_once());
    }

    #[test]
    fn bare_test_flag_defaults_to_five() {
        let plan = parse(&["--test"]).plan(false);
        assert_eq!(plan.mode, Mode::Test);
        assert_eq!(plan.count, DEFAULT_TEST_COUNT);
    }

    #[test]
    fn test_flag_takes_a_count() {
        assert_eq!(parse(&["--test", "7"]).plan(false).count, 7);
        let a = parse(&["--test", "--config", "x.toml"]);
        assert_eq!(a.test, Some(DEFAULT_TEST_COUNT));
        assert_eq!(a.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn non_numeric_count_falls_back_to_default() {
        assert_eq!(parse(&["--test", "abc"]).test, Some(DEFAULT_TEST_COUNT));
        assert_eq!(parse(&["--test", "0"]).plan(false).count, 1);
    }
}
