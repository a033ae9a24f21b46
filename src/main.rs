use anyhow::Context;
use clap::Parser;
use handnotes::cli::{Cli, Command, ExtractArgs};
use handnotes::config::{Config, EngineConfig};
use handnotes::decode::decode_file;
use handnotes::engines::EngineRegistry;
use handnotes::export::{Exporter, PdfOptions};
use handnotes::pipeline::{BatchPipeline, ExtractOptions};
use handnotes::session::Session;
use handnotes::server;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Serve(args) => {
            let config = Config::from(args);

            tracing::info!("Starting handnotes v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("Binding to {}:{}", config.host, config.port);

            server::run(config).await
        }
        Command::Extract(args) => tokio::task::spawn_blocking(move || extract(args)).await?,
    }
}

/// OCR the given files in order and write one export file
fn extract(args: ExtractArgs) -> anyhow::Result<()> {
    let engine_config = EngineConfig::from(args.engine);
    let registry = EngineRegistry::new(&engine_config)?;
    let exporter = Exporter::new(&PdfOptions::from(args.export))?;
    let pipeline = BatchPipeline::new(registry.default_engine());

    let images = args
        .images
        .iter()
        .enumerate()
        .map(|(i, path)| decode_file(path).map_err(|e| e.at_image(i + 1)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut session = Session::new(args.language);
    let options = ExtractOptions {
        language: Some(args.language),
        preprocessing: args.preprocess,
    };

    let bar = ProgressBar::new(images.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} images {msg}")
            .context("invalid progress template")?
            .progress_chars("#>-"),
    );

    let result = pipeline.extract(&mut session, images, &options, |done, _| {
        bar.set_position(done as u64);
    });
    bar.finish_and_clear();

    let Some(result) = result? else {
        anyhow::bail!("no images to extract");
    };

    let export = exporter.export(&result.full_text, args.format)?;
    let output = args.output.unwrap_or_else(|| export.file_name.into());
    std::fs::write(&output, &export.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Wrote {} ({} image(s), {} bytes)",
        output.display(),
        result.sections.len(),
        export.bytes.len()
    );

    Ok(())
}
