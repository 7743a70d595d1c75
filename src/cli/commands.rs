//! Command definitions for the Pomodoro Timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::daemon::ticker::DEFAULT_TICK_INTERVAL_MS;
use crate::types::IntervalType;

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro Timer CLI - a single countdown cycling work and break intervals
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro",
    version,
    about = "Single-timer Pomodoro countdown",
    long_about = "A Pomodoro countdown with three fixed intervals: a 25 minute task timer,\n\
                  a 5 minute short break and a 20 minute long break.\n\
                  Run `pomodoro daemon` once, then control it with the other commands.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path of the daemon's Unix socket
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the countdown, or cancel it if one is running
    Toggle,

    /// Choose the interval for the next countdown
    Select {
        /// Interval to select
        #[arg(value_enum)]
        interval: IntervalArg,
    },

    /// Show current timer status
    Status,

    /// List the available intervals
    Items,

    /// Run the daemon in the foreground
    Daemon(DaemonArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Interval Argument
// ============================================================================

/// Interval names accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalArg {
    /// 25 minute task timer
    Work,
    /// 5 minute short break
    ShortBreak,
    /// 20 minute long break
    LongBreak,
}

impl From<IntervalArg> for IntervalType {
    fn from(arg: IntervalArg) -> Self {
        match arg {
            IntervalArg::Work => IntervalType::TaskTimer,
            IntervalArg::ShortBreak => IntervalType::ShortBreak,
            IntervalArg::LongBreak => IntervalType::LongBreak,
        }
    }
}

// ============================================================================
// Daemon Command Arguments
// ============================================================================

/// Arguments for the daemon command
#[derive(Args, Debug, Clone)]
pub struct DaemonArgs {
    /// Tick cadence in milliseconds (10-1000)
    #[arg(
        long,
        default_value_t = DEFAULT_TICK_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(10..=1000)
    )]
    pub tick_ms: u64,

    /// File holding the scheduled reminder
    #[arg(long, value_name = "PATH")]
    pub schedule_file: Option<PathBuf>,
}

impl Default for DaemonArgs {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_INTERVAL_MS,
            schedule_file: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["pomodoro"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
            assert!(cli.socket.is_none());
        }

        #[test]
        fn test_parse_short_verbose_flag() {
            let cli = Cli::parse_from(["pomodoro", "-v"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_global_socket_after_subcommand() {
            let cli = Cli::parse_from(["pomodoro", "status", "--socket", "/tmp/p.sock"]);
            assert!(matches!(cli.command, Some(Commands::Status)));
            assert_eq!(cli.socket, Some(PathBuf::from("/tmp/p.sock")));
        }

        #[test]
        fn test_parse_toggle_command() {
            let cli = Cli::parse_from(["pomodoro", "toggle"]);
            assert!(matches!(cli.command, Some(Commands::Toggle)));
        }

        #[test]
        fn test_parse_items_command() {
            let cli = Cli::parse_from(["pomodoro", "items"]);
            assert!(matches!(cli.command, Some(Commands::Items)));
        }

        #[test]
        fn test_parse_completions_zsh() {
            let cli = Cli::parse_from(["pomodoro", "completions", "zsh"]);
            match cli.command {
                Some(Commands::Completions { shell }) => {
                    assert_eq!(shell, clap_complete::Shell::Zsh);
                }
                _ => panic!("Expected Completions command"),
            }
        }
    }

    // ------------------------------------------------------------------------
    // Select Command Tests
    // ------------------------------------------------------------------------

    mod select_tests {
        use super::*;

        #[test]
        fn test_parse_select_each_interval() {
            let cases = [
                ("work", IntervalType::TaskTimer),
                ("short-break", IntervalType::ShortBreak),
                ("long-break", IntervalType::LongBreak),
            ];

            for (arg, expected) in cases {
                let cli = Cli::parse_from(["pomodoro", "select", arg]);
                match cli.command {
                    Some(Commands::Select { interval }) => {
                        assert_eq!(IntervalType::from(interval), expected);
                    }
                    _ => panic!("Expected Select command for {}", arg),
                }
            }
        }

        #[test]
        fn test_parse_select_unknown_interval() {
            let result = Cli::try_parse_from(["pomodoro", "select", "nap"]);
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_select_requires_interval() {
            let result = Cli::try_parse_from(["pomodoro", "select"]);
            assert!(result.is_err());
        }
    }

    // ------------------------------------------------------------------------
    // Daemon Command Tests
    // ------------------------------------------------------------------------

    mod daemon_args_tests {
        use super::*;

        #[test]
        fn test_parse_daemon_defaults() {
            let cli = Cli::parse_from(["pomodoro", "daemon"]);
            match cli.command {
                Some(Commands::Daemon(args)) => {
                    assert_eq!(args.tick_ms, 100);
                    assert!(args.schedule_file.is_none());
                }
                _ => panic!("Expected Daemon command"),
            }
        }

        #[test]
        fn test_parse_daemon_with_options() {
            let cli = Cli::parse_from([
                "pomodoro",
                "daemon",
                "--tick-ms",
                "250",
                "--schedule-file",
                "/tmp/s.json",
            ]);
            match cli.command {
                Some(Commands::Daemon(args)) => {
                    assert_eq!(args.tick_ms, 250);
                    assert_eq!(args.schedule_file, Some(PathBuf::from("/tmp/s.json")));
                }
                _ => panic!("Expected Daemon command"),
            }
        }

        #[test]
        fn test_parse_daemon_tick_out_of_range() {
            assert!(Cli::try_parse_from(["pomodoro", "daemon", "--tick-ms", "5"]).is_err());
            assert!(Cli::try_parse_from(["pomodoro", "daemon", "--tick-ms", "1001"]).is_err());
        }

        #[test]
        fn test_daemon_args_default() {
            let args = DaemonArgs::default();
            assert_eq!(args.tick_ms, 100);
        }

        #[test]
        fn test_parsed_default_matches_default_impl() {
            let cli = Cli::parse_from(["pomodoro", "daemon"]);
            match cli.command {
                Some(Commands::Daemon(args)) => {
                    assert_eq!(args.tick_ms, DaemonArgs::default().tick_ms);
                }
                _ => panic!("Expected Daemon command"),
            }
        }
    }
}
