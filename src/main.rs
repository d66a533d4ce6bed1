use std::io::Write;

use clap::Parser;

use cuba_sdk::app::{App, Cli};
use cuba_sdk::config::log_path;
use cuba_sdk::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(&log_path(), cli.log_json)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let app = App::open()?;
            let mut stdout = std::io::stdout().lock();
            app.run(cli.command, &mut stdout).await?;
            stdout.flush()?;
            Ok::<_, anyhow::Error>(())
        })
}
