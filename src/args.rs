//! Command-line argument parsing.
//!
//! A small hand-rolled parser: the daemon has one mode of operation and a
//! handful of flags, so a structured enum keeps `main` to a dispatch.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon with these settings.
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        /// Evaluate exactly once regardless of the configured heartbeat.
        once: bool,
    },
    /// Display help information and exit.
    ShowHelp,
    /// Display version information and exit.
    ShowVersion,
    /// Show help due to unknown arguments and exit with failure.
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse the process arguments.
    pub fn from_env() -> Self {
        Self::from_args(std::env::args().skip(1).collect())
    }

    fn from_args(args: Vec<String>) -> Self {
        let mut debug_enabled = false;
        let mut once = false;
        let mut config_dir = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-h" | "--help" => {
                    return Self {
                        action: CliAction::ShowHelp,
                    };
                }
                "-V" | "--version" => {
                    return Self {
                        action: CliAction::ShowVersion,
                    };
                }
                "-d" | "--debug" => debug_enabled = true,
                "-o" | "--once" => once = true,
                "-c" | "--config" => match iter.next() {
                    Some(dir) => config_dir = Some(dir.clone()),
                    None => {
                        return Self {
                            action: CliAction::ShowHelpDueToError,
                        };
                    }
                },
                _ => {
                    return Self {
                        action: CliAction::ShowHelpDueToError,
                    };
                }
            }
        }

        Self {
            action: CliAction::Run {
                debug_enabled,
                config_dir,
                once,
            },
        }
    }
}

/// Print usage information.
pub fn display_help() {
    println!("sunphases v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Publishes sun phase times for an observer position and raises");
    println!("time-window notifications. Deltas are written to stdout; logs to stderr.");
    println!();
    println!("Usage: sunphases [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <DIR>  Use configuration from DIR instead of the default");
    println!("  -o, --once          Evaluate once and exit, ignoring the heartbeat");
    println!("  -d, --debug         Enable detailed logging");
    println!("  -h, --help          Print this help");
    println!("  -V, --version       Print version");
}

/// Print version information.
pub fn display_version_info() {
    println!("sunphases v{}", env!("CARGO_PKG_VERSION"));
}
