//! CLI entry point: parse arguments and dispatch to the daemon.

use anyhow::Result;

use sunphases::Sunphases;
use sunphases::args::{self, CliAction, ParsedArgs};
use sunphases::constants::EXIT_FAILURE;

fn main() -> Result<()> {
    let parsed = ParsedArgs::from_env();

    match parsed.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
            once,
        } => {
            let mut app = Sunphases::new(debug_enabled).with_config_dir(config_dir);
            if once {
                app = app.once();
            }
            app.run()
        }
    }
}
