use clap::Parser;
use color_eyre::Result;
use tailscale_exporter::{
    init_errors,
    init_logging,
    version,
    App,
    Args,
    Command,
    Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();

    if let Some(Command::Version) = args.command {
        println!("tailscale-exporter {}", version());
        return Ok(());
    }

    let config = Config::new(&args)?;
    init_logging(config.verbose)?;
    App::new(config).run().await
}
