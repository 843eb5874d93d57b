use bytesize::ByteSize;
use clap::Parser;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::info;

use digit_pad::config::{ServiceArgs, init_tracing};
use digit_pad::recognition::RecognitionClient;

#[derive(Parser, Debug)]
#[command(
    name = "pad_cli",
    about = "Send an image to the digit recognition service and print the result",
    version
)]
struct Cli {
    /// Image file to analyze (sent as-is)
    #[arg(short = 'i', long = "image")]
    image: PathBuf,

    /// Where to write the annotated image returned by the service
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    #[command(flatten)]
    service: ServiceArgs,
}

async fn write_bytes(path: &Path, contents: &[u8]) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.service.log_level);

    let config = cli.service.to_config()?;
    let client = RecognitionClient::new(&config)?;

    let image = tokio::fs::read(&cli.image)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", cli.image.display()))?;
    info!(
        path = %cli.image.display(),
        size = %ByteSize::b(image.len() as u64),
        endpoint = client.endpoint(),
        "submitting image"
    );

    let result = client.analyze(image).await?;
    println!("{}", result.value);

    if let Some(out) = &cli.out {
        write_bytes(out, &result.image).await?;
        info!(path = %out.display(), "annotated image written");
    }

    Ok(())
}
