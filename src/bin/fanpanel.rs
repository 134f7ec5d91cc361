use clap::Parser;
use eyre::Result;

use fanpanel::cli::CliOpts;

fn main() -> Result<()> {
    let opts = CliOpts::parse();

    fanpanel::init(opts.log_target())?;

    if !opts.is_interactive() {
        fanpanel::banner();
    }

    fanpanel::cli(opts)
}
