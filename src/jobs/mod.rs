//! Batch jobs, one per subcommand. Each runs to completion sequentially:
//! per-item remote or decode failures are logged and skipped, missing inputs
//! abort the job.

pub mod images;
pub mod memes;
pub mod photos;
pub mod writing;

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::caption::Compositor;
use crate::cli::Command;
use crate::config::Config;
use crate::constants::IMAGE_EXTENSIONS;
use crate::error::MemeError;
use crate::remote::GeminiClient;

/// Runs the job selected on the command line.
pub async fn run(command: &Command, config: &Config) -> Result<(), MemeError> {
    match command {
        Command::Fetch { set, out_dir } => photos::fetch(*set, out_dir.as_deref()).await,
        Command::Personas { flavour, out } => {
            writing::personas(&GeminiClient::new(config)?, *flavour, out).await
        }
        Command::Styles { out } => writing::styles(&GeminiClient::new(config)?, out).await,
        Command::TransformPrompts { input_dir, out } => {
            writing::transform_prompts(&GeminiClient::new(config)?, input_dir, out).await
        }
        Command::Generate { prompts, out_dir } => {
            images::generate(
                &GeminiClient::new(config)?,
                prompts,
                out_dir,
                config.rate_limit_delay,
            )
            .await
        }
        Command::Memes {
            input_dir,
            personas,
            out_dir,
            limit,
        } => {
            let client = GeminiClient::new(config)?;
            memes::persona_memes(
                &client,
                &compositor(config),
                input_dir,
                personas,
                out_dir,
                *limit,
            )
            .await
        }
        Command::Assemble { input_dir, out_dir } => {
            let client = GeminiClient::new(config)?;
            memes::assemble(&client, &compositor(config), input_dir, out_dir).await
        }
        Command::Pipeline {
            input_dir,
            styles,
            out_dir,
            styles_per_image,
        } => {
            let client = GeminiClient::new(config)?;
            let job = memes::Pipeline {
                input_dir: input_dir.as_path(),
                styles: styles.as_path(),
                out_dir: out_dir.as_path(),
                styles_per_image: *styles_per_image,
                rate_limit_delay: config.rate_limit_delay,
            };
            job.run(&client, &compositor(config)).await
        }
        Command::Models => {
            let models = GeminiClient::new(config)?.list_models().await?;
            info!("{} models available", models.len());
            for model in models {
                println!("{model}");
            }
            Ok(())
        }
    }
}

fn compositor(config: &Config) -> Compositor {
    let compositor = Compositor::from_sources(&config.font_sources());
    info!("Caption font: {}", compositor.font().name());
    compositor
}

/// Sorted file names of the images in `dir`.
pub fn list_images(dir: &Path) -> Result<Vec<String>, MemeError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(MemeError::MissingInput(dir.display().to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            debug!("Ignoring non UTF-8 file name {:?}", entry.file_name());
            continue;
        };
        if is_image_name(&name) {
            images.push(name);
        }
    }
    images.sort();
    Ok(images)
}

fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Logs a per-item failure and carries on, fatal errors are handed back.
pub(crate) fn skip_or_abort(item: &str, err: MemeError) -> Result<(), MemeError> {
    if err.is_fatal() {
        return Err(err);
    }
    warn!("Skipping {}: {}", item, err);
    Ok(())
}

/// Waits out the image API rate limit.
pub(crate) async fn pause(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    debug!("Sleeping {}s for the rate limit", delay.as_secs_f32());
    tokio::time::sleep(delay).await;
}
