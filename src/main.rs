//! Photostudio - AI photo editing CLI.

use std::path::Path;
use std::process;

use clap::Parser;

use photostudio::cli::Cli;
use photostudio::config::{self, Config};
use photostudio::context::ServiceContext;
use photostudio::error::EditError;
use photostudio::model::{resolve_model, validate_model};
use photostudio::output::{output_extension, resolve_output_path, save_image, validate_format};
use photostudio::session::{user_message, EditSession};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", user_message(&e));
        process::exit(1);
    }
}

/// Log to stderr; `--verbose` turns on debug events for this crate.
fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_module("photostudio", log::LevelFilter::Debug);
    }
    builder.init();
}

async fn run(cli: Cli) -> Result<(), EditError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path)?;

    // Resolve model and validate parameters
    let requested = cli.model.as_deref().unwrap_or(&config.defaults.model);
    let model = resolve_model(requested);
    validate_model(&model).map_err(EditError::InvalidInputKind)?;
    let format = cli.format.as_deref().or(config.defaults.format.as_deref());
    if let Some(format) = format {
        validate_format(format).map_err(EditError::InvalidInputKind)?;
    }
    tracing::debug!(%model, requested, "resolved model");

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("PHOTOSTUDIO_REPLAY").ok();
    let is_recording = std::env::var("PHOTOSTUDIO_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        tracing::debug!(cassette = %cassette_path, "replaying");
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        tracing::debug!("recording mode enabled");
        let (ctx, session) = ServiceContext::recording(&config)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&config)?, None)
    };

    // Resolve instruction and load the source image
    let prompt = cli.resolve_prompt()?;
    let session = EditSession::new();
    let source = session.load(Path::new(&cli.image))?;

    // Edit
    let result = session.submit(ctx.editor.as_ref(), &model, &prompt).await;

    // Finish recording if active, failed edits included
    drop(ctx);
    if let Some(recording) = recording_session {
        match recording.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => tracing::warn!("failed to save cassette: {e}"),
        }
    }

    let result = result?;

    if let Some(ref image) = result.image {
        let ext = output_extension(&image.mime_type, format);
        let output_path = resolve_output_path(cli.output.as_deref(), &source.preview, ext);
        save_image(&image.data, &image.mime_type, format, &output_path)?;
        eprintln!("Saved: {}", output_path.display());
    }
    if let Some(ref text) = result.text {
        println!("{text}");
    }

    Ok(())
}
