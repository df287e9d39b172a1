//! CLI tool for extracting PowerPoint components as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use ppt_clipboard::{ClipboardClient, ClipboardConfig};
use ppt_core::{MediaStorage, MediaStore, ProcessedPresentation, StoredMedia};
use ppt_pptx::{ParseOptions, PowerPointProcessor};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extract slides and their positioned components from .pptx files or
/// clipboard fragments.
#[derive(Parser, Debug)]
#[command(name = "ppt-extract")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file(s) (.pptx)
    #[arg(required_unless_present = "clipboard_url")]
    input: Vec<PathBuf>,

    /// Fetch and parse a clipboard fragment from this URL
    #[arg(long)]
    clipboard_url: Option<String>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Reference media by container path instead of inlining it
    #[arg(long)]
    no_media: bool,

    /// Include non-placeholder shapes from slide layouts and masters
    #[arg(long)]
    include_layout: bool,

    /// Include slide backgrounds as components
    #[arg(long)]
    include_background: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Leaves media in the container and records its part path.
struct PathReferenceStore;

impl MediaStore for PathReferenceStore {
    fn store(&self, path: &str, _mime_type: &str, _bytes: &[u8]) -> ppt_core::Result<StoredMedia> {
        Ok(StoredMedia {
            url: path.to_string(),
            storage: MediaStorage::Reference,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let options = parse_options(&args);

    if let Some(url) = &args.clipboard_url {
        let client = ClipboardClient::with_options(ClipboardConfig::default(), options.clone())
            .context("Failed to set up clipboard client")?;
        let presentation = client
            .process_url(url)
            .await
            .with_context(|| format!("Failed to process clipboard data from {}", url))?;
        emit(&presentation, Path::new("clipboard"), &args)?;
    }

    let processor = PowerPointProcessor::new(options);
    for input_path in &args.input {
        log::info!("Processing: {}", input_path.display());

        match process_file(&processor, input_path) {
            Ok(presentation) => {
                log::info!(
                    "  Found {} slides, {} components",
                    presentation.slides.len(),
                    presentation.total_components
                );
                emit(&presentation, input_path, &args)?;
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    Ok(())
}

fn parse_options(args: &Args) -> ParseOptions {
    let mut options = ParseOptions::new()
        .with_layout_elements(args.include_layout)
        .with_background(args.include_background);
    if args.no_media {
        options = options.with_media_store(Arc::new(PathReferenceStore));
    }
    options
}

/// Process a single PowerPoint file.
fn process_file(processor: &PowerPointProcessor, input_path: &Path) -> Result<ProcessedPresentation> {
    let bytes = std::fs::read(input_path).with_context(|| format!("Failed to open {}", input_path.display()))?;
    let presentation = processor
        .process(&bytes)
        .with_context(|| format!("Failed to parse {}", input_path.display()))?;
    Ok(presentation)
}

fn emit(presentation: &ProcessedPresentation, source: &Path, args: &Args) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(presentation)
    } else {
        serde_json::to_string(presentation)
    }
    .context("Failed to serialize output")?;

    if args.print {
        println!("{}", json);
        return Ok(());
    }
    let output_path = get_output_path(source, args.output.as_ref())?;
    write_output(&output_path, &json)?;
    log::info!("Written to: {}", output_path.display());
    Ok(())
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.json", stem);

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => match input_path.parent() {
            Some(parent) => parent.join(output_filename),
            None => PathBuf::from(output_filename),
        },
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_uses_json_extension() {
        let path = get_output_path(Path::new("decks/q3.pptx"), None).unwrap();
        assert_eq!(path, PathBuf::from("decks/q3.json"));
    }

    #[test]
    fn test_args_require_input_or_url() {
        assert!(Args::try_parse_from(["ppt-extract"]).is_err());
        let args = Args::try_parse_from(["ppt-extract", "--clipboard-url", "https://office.com/x"]).unwrap();
        assert!(args.input.is_empty());
        let args = Args::try_parse_from(["ppt-extract", "a.pptx", "--no-media", "--include-layout"]).unwrap();
        assert!(args.no_media && args.include_layout && !args.include_background);
    }

    #[test]
    fn test_path_reference_store() {
        let stored = PathReferenceStore.store("ppt/media/image1.png", "image/png", &[1, 2]).unwrap();
        assert_eq!(stored.url, "ppt/media/image1.png");
        assert_eq!(stored.storage, MediaStorage::Reference);
    }
}
