mod app;
mod cli;

use anyhow::Result;
use clap::Parser;

use app::App;
use cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let watch = cli.args.watch;
    let mut app = App::new(cli.args)?;

    if watch {
        app.run_watch()
    } else {
        app.run_once()
    }
}
