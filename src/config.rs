//! Config handling

use std::path::PathBuf;
use std::time::Duration;

use tracing::log::LevelFilter;
use url::Url;

use crate::caption::font::FontSource;
use crate::cli::CliOptions;
use crate::error::MemeError;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Runtime configuration, built once at startup and handed to every job.
#[derive(Clone, Debug)]
pub struct Config {
    /// API key for the generative language API, if one was supplied
    pub api_key: Option<String>,
    /// Base URL the model endpoints hang off
    pub api_base: Url,
    /// Model for captions, personas, styles and pet descriptions
    pub text_model: String,
    /// Model for image transformation prompts
    pub transform_model: String,
    /// Text-to-image model
    pub image_model: String,
    /// Pause after each successfully generated image
    pub rate_limit_delay: Duration,
    /// User supplied font file, tried before the system fonts
    pub font: Option<PathBuf>,
    /// Face index inside `font` when it's a collection
    pub font_index: u32,
}

impl Config {
    /// Builds the config from parsed CLI options.
    pub fn from_cli(cli: &CliOptions) -> Result<Self, MemeError> {
        let api_base = Url::parse(&cli.api_base).map_err(|err| {
            MemeError::MissingInput(format!("valid API base URL ({}): {err}", cli.api_base))
        })?;
        let api_key = cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        Ok(Self {
            api_key,
            api_base,
            text_model: cli.text_model.clone(),
            transform_model: cli.transform_model.clone(),
            image_model: cli.image_model.clone(),
            rate_limit_delay: Duration::from_secs(cli.rate_limit_delay_secs),
            font: cli.font.clone(),
            font_index: cli.font_index,
        })
    }

    /// Ordered font lookup strategies: the configured font, then the system fonts,
    /// then the built-in face.
    pub fn font_sources(&self) -> Vec<FontSource> {
        FontSource::cascade(self.font.as_deref(), self.font_index)
    }
}
