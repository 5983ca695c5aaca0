//! The `tarjama translate` command for translating screenshots from disk.

use anyhow::Context;
use clap::{Args, ValueEnum};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tarjama_core::config::LimitsConfig;
use tarjama_core::{
    image, Config, OutputFormat as CoreOutputFormat, OutputWriter, Provider, Session,
    SessionError, TranslationResult, UploadedImage,
};

use super::theme;

/// Arguments for the `translate` command.
#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Screenshot files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Vision provider
    #[arg(short, long, value_enum, default_value = "openai")]
    pub provider: ProviderArg,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_key: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_key: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Model name, overriding the configured one
    #[arg(long)]
    pub model: Option<String>,
}

/// Providers selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProviderArg {
    /// OpenAI chat completions
    Openai,
    /// Google Gemini
    Gemini,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Openai => Provider::OpenAi,
            ProviderArg::Gemini => Provider::Gemini,
        }
    }
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Numbered plain-text blocks
    Text,
    /// Single JSON array
    Json,
    /// One JSON object per line
    Jsonl,
    /// Standalone HTML page
    Html,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => CoreOutputFormat::Text,
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
            OutputFormat::Html => CoreOutputFormat::Html,
        }
    }
}

/// Execute the translate command.
pub async fn execute(args: TranslateArgs, config: &Config) -> anyhow::Result<()> {
    let provider = Provider::from(args.provider);

    let mut session = Session::new();
    session.select_provider(provider);
    if let Some(key) = args.openai_key.as_deref() {
        session.set_credential(Provider::OpenAi, key.trim());
    }
    if let Some(key) = args.gemini_key.as_deref() {
        session.set_credential(Provider::Gemini, key.trim());
    }

    session.upload(load_images(&args.inputs, &config.limits));
    if session.images().is_empty() {
        return Err(SessionError::NoImages.into());
    }

    if session.active_credential().is_empty() && console::Term::stderr().is_term() {
        if let Some(key) = theme::prompt_for_key(provider)? {
            session.set_credential(provider, key);
        }
    }

    let translator = provider.build(&config.providers, args.model.as_deref());
    let progress = create_progress_bar(session.images().len() as u64);

    let outcome = session
        .translate(translator.as_ref(), |p| {
            progress.set_position(p.completed as u64);
            progress.set_message(p.status());
        })
        .await;

    let results = match outcome {
        Ok(results) => {
            progress.finish_and_clear();
            results
        }
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        }
    };

    let format = CoreOutputFormat::from(args.format);
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            write_results(BufWriter::new(file), format, results)?;
            tracing::info!("Results written to {}", path.display());
        }
        None => write_results(std::io::stdout().lock(), format, results)?,
    }

    print_summary(results);
    Ok(())
}

/// Collect readable images from every input, in argument order.
///
/// Files that fail validation are logged and skipped.
fn load_images(inputs: &[PathBuf], limits: &LimitsConfig) -> Vec<UploadedImage> {
    let mut images = Vec::new();
    for input in inputs {
        let paths = image::discover(input, &limits.supported_formats);
        if paths.is_empty() {
            tracing::warn!("No supported images found at {}", input.display());
        }

        for path in paths {
            match UploadedImage::from_path(&path, limits) {
                Ok(image) => images.push(image),
                Err(e) => tracing::error!("Skipping {}: {e}", path.display()),
            }
        }
    }
    images
}

fn write_results<W: Write>(
    writer: W,
    format: CoreOutputFormat,
    results: &[TranslationResult],
) -> anyhow::Result<()> {
    let mut writer = OutputWriter::new(writer, format, true);
    writer.write_all(results)?;
    writer.flush()?;
    Ok(())
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("starting...");
    pb
}

fn print_summary(results: &[TranslationResult]) {
    let failed = results.iter().filter(|r| !r.is_ok()).count();
    let succeeded = results.len() - failed;

    let green = Style::new().for_stderr().green();
    let red = Style::new().for_stderr().red();

    eprintln!();
    eprintln!("  {} {succeeded} translated", green.apply_to("✓"));
    if failed > 0 {
        eprintln!("  {} {failed} failed", red.apply_to("✗"));
    }
}
