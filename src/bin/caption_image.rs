use anyhow::{Context, Result, anyhow};
use clap::Parser;
use petmeme::caption::Compositor;
use petmeme::caption::font::FontSource;
use petmeme::codec;
use petmeme::config::setup_logging;
use std::fs;
use std::path::PathBuf;

/// Stamp a meme caption onto an image.
///
/// Minimal UX:
///   caption_image cat.jpg "I HAVE NO REGRETS" cat_meme.jpg
#[derive(Parser, Debug)]
#[command(name = "caption_image")]
#[command(about = "Stamp a white, black-outlined meme caption onto the bottom of an image")]
struct Args {
    /// Source image (PNG or JPEG)
    input: PathBuf,

    /// Caption text, `\n` starts a new line
    caption: String,

    /// Output file, the extension picks PNG or JPEG.
    /// Defaults to `meme_<input file name>` next to the input.
    output: Option<PathBuf>,

    /// Font file tried before the system fonts
    #[arg(long, env = "PETMEME_FONT")]
    font: Option<PathBuf>,

    /// Face index when `--font` is a collection
    #[arg(long, default_value_t = 0)]
    font_index: u32,

    /// Keep the caption's case instead of upper-casing it
    #[arg(long)]
    keep_case: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _ = setup_logging(args.debug);

    let output = match &args.output {
        Some(output) => output.clone(),
        None => {
            let name = args
                .input
                .file_name()
                .ok_or_else(|| anyhow!("{} has no file name", args.input.display()))?;
            args.input
                .with_file_name(format!("meme_{}", name.to_string_lossy()))
        }
    };

    let image_bytes = fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let mut image = codec::decode(&image_bytes)?;

    let caption = if args.keep_case {
        args.caption.replace("\\n", "\n")
    } else {
        args.caption.replace("\\n", "\n").to_uppercase()
    };

    let compositor =
        Compositor::from_sources(&FontSource::cascade(args.font.as_deref(), args.font_index));
    let layout = compositor.compose(&mut image, &caption);
    eprintln!(
        "Font: {} at {}px, {} lines{}",
        compositor.font().name(),
        layout.font_size,
        layout.lines.len(),
        if layout.fits { "" } else { " (overflows)" }
    );

    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    codec::write_image(&image, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    eprintln!("Saved: {}", output.display());
    Ok(())
}
