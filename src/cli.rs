//! CLI parser
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_IMAGE_MODEL, DEFAULT_RATE_LIMIT_DELAY_SECS, DEFAULT_TEXT_MODEL,
    DEFAULT_TRANSFORM_MODEL, GENERATED_DIR, INPUT_DIR_V2, MASS_PRODUCED_DIR, OUTPUT_DIR,
    PERSONAS_FILE, STYLES_FILE, TRANSFORM_PROMPTS_FILE,
};

#[derive(Parser, Debug)]
#[command(name = "petmeme", about = "Pet meme batch jobs")]
/// CLI Options
pub struct CliOptions {
    #[clap(long, global = true, help = "Enable debug logging", env = "PETMEME_DEBUG")]
    /// Enable debug logging. Env: PETMEME_DEBUG
    pub debug: bool,

    #[clap(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    /// API key for the generative language API.
    /// Env: GEMINI_API_KEY
    pub api_key: Option<String>,

    #[clap(long, global = true, default_value = DEFAULT_API_BASE, env = "PETMEME_API_BASE")]
    /// Base URL of the generative language API.
    /// Env: PETMEME_API_BASE
    pub api_base: String,

    #[clap(long, global = true, default_value = DEFAULT_TEXT_MODEL)]
    /// Model used for captions, personas, styles and pet descriptions
    pub text_model: String,

    #[clap(long, global = true, default_value = DEFAULT_TRANSFORM_MODEL)]
    /// Model used to write image transformation prompts
    pub transform_model: String,

    #[clap(long, global = true, default_value = DEFAULT_IMAGE_MODEL)]
    /// Text-to-image model
    pub image_model: String,

    #[clap(
        long,
        global = true,
        default_value_t = DEFAULT_RATE_LIMIT_DELAY_SECS,
        env = "PETMEME_RATE_LIMIT_DELAY"
    )]
    /// Seconds to pause after each generated image, `0` disables.
    /// Env: PETMEME_RATE_LIMIT_DELAY
    pub rate_limit_delay_secs: u64,

    #[clap(long, global = true, env = "PETMEME_FONT")]
    /// TrueType/OpenType font for captions, tried before the system fonts.
    /// Env: PETMEME_FONT
    pub font: Option<PathBuf>,

    #[clap(long, global = true, default_value_t = 0)]
    /// Face index when `--font` is a collection
    pub font_index: u32,

    #[command(subcommand)]
    /// The job to run
    pub command: Command,
}

/// Which stock photo set to download
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum PhotoSet {
    /// Scrape photo pages for their `og:image` (human-like pets)
    #[default]
    Pages,
    /// Fixed image URLs (plain pets)
    Direct,
}

/// Flavour of persona list to ask for
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum PersonaFlavour {
    /// Pets doing human things
    #[default]
    Human,
    /// General meme moods
    Classic,
}

/// Batch jobs
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download stock pet photos
    Fetch {
        #[arg(long, value_enum, default_value_t = PhotoSet::Pages)]
        /// Which photo set to download
        set: PhotoSet,
        #[arg(long)]
        /// Output directory, defaults to the set's usual directory
        out_dir: Option<PathBuf>,
    },
    /// Generate meme personas
    Personas {
        #[arg(long, value_enum, default_value_t = PersonaFlavour::Human)]
        /// Persona flavour
        flavour: PersonaFlavour,
        #[arg(long, default_value = PERSONAS_FILE)]
        /// Where to write the persona list
        out: PathBuf,
    },
    /// Generate image prompt templates
    Styles {
        #[arg(long, default_value = STYLES_FILE)]
        /// Where to write the template list
        out: PathBuf,
    },
    /// Describe each input image as an image generation prompt
    TransformPrompts {
        #[arg(long, default_value = INPUT_DIR_V2)]
        /// Input image directory
        input_dir: PathBuf,
        #[arg(long, default_value = TRANSFORM_PROMPTS_FILE)]
        /// Where to write the prompts
        out: PathBuf,
    },
    /// Generate images from the transformation prompts
    Generate {
        #[arg(long, default_value = TRANSFORM_PROMPTS_FILE)]
        /// Transformation prompts file
        prompts: PathBuf,
        #[arg(long, default_value = GENERATED_DIR)]
        /// Output directory
        out_dir: PathBuf,
    },
    /// Caption input images in the style of each persona
    Memes {
        #[arg(long, default_value = INPUT_DIR_V2)]
        /// Input image directory
        input_dir: PathBuf,
        #[arg(long, default_value = PERSONAS_FILE)]
        /// Persona list
        personas: PathBuf,
        #[arg(long, default_value = OUTPUT_DIR)]
        /// Output directory
        out_dir: PathBuf,
        #[arg(long, default_value_t = 5)]
        /// Maximum number of memes to make
        limit: usize,
    },
    /// Caption every generated image
    Assemble {
        #[arg(long, default_value = GENERATED_DIR)]
        /// Input image directory
        input_dir: PathBuf,
        #[arg(long, default_value = OUTPUT_DIR)]
        /// Output directory
        out_dir: PathBuf,
    },
    /// Describe, restyle, generate and caption every input image
    Pipeline {
        #[arg(long, default_value = INPUT_DIR_V2)]
        /// Input image directory
        input_dir: PathBuf,
        #[arg(long, default_value = STYLES_FILE)]
        /// Style template list
        styles: PathBuf,
        #[arg(long, default_value = MASS_PRODUCED_DIR)]
        /// Output directory
        out_dir: PathBuf,
        #[arg(long, default_value_t = 3)]
        /// Styles applied to each input image
        styles_per_image: usize,
    },
    /// List the models available to the API key
    Models,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pipeline_with_globals_after_subcommand() {
        let cli = CliOptions::parse_from([
            "petmeme",
            "pipeline",
            "--styles-per-image",
            "1",
            "--rate-limit-delay-secs",
            "0",
        ]);
        assert_eq!(cli.rate_limit_delay_secs, 0);
        assert!(matches!(
            cli.command,
            Command::Pipeline {
                styles_per_image: 1,
                ref styles,
                ..
            } if styles == &PathBuf::from(STYLES_FILE)
        ));
    }

    #[test]
    fn fetch_defaults_to_pages() {
        let cli = CliOptions::parse_from(["petmeme", "fetch"]);
        assert!(matches!(
            cli.command,
            Command::Fetch {
                set: PhotoSet::Pages,
                out_dir: None
            }
        ));
    }
}
