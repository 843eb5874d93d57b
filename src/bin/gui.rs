use clap::Parser;
use std::error::Error;
use tracing::info;

use digit_pad::config::{ServiceArgs, init_tracing};
use digit_pad::gui_app::run_iced_app;
use digit_pad::recognition::RecognitionClient;

#[derive(Parser, Debug)]
#[command(
    name = "pad_gui",
    about = "Draw or upload a digit and classify it with the recognition service",
    version
)]
struct Cli {
    #[command(flatten)]
    service: ServiceArgs,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.service.log_level);

    let config = cli.service.to_config()?;
    let client = RecognitionClient::new(&config)?;
    info!(endpoint = client.endpoint(), "Digit Pad - starting GUI");

    run_iced_app(client)?;
    Ok(())
}
