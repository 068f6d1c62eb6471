//! `fetch`: download the stock pet photos.

use std::path::{Path, PathBuf};

use tracing::info;

use super::skip_or_abort;
use crate::cli::PhotoSet;
use crate::constants::{INPUT_DIR, INPUT_DIR_V2, PHOTO_PAGES, PHOTO_URLS};
use crate::error::MemeError;
use crate::fetch::{download, page_image_url};

/// Directory a photo set lands in unless overridden.
pub fn default_dir(set: PhotoSet) -> &'static str {
    match set {
        PhotoSet::Pages => INPUT_DIR_V2,
        PhotoSet::Direct => INPUT_DIR,
    }
}

/// Downloads every photo in `set`, skipping the ones that fail.
pub async fn fetch(set: PhotoSet, out_dir: Option<&Path>) -> Result<(), MemeError> {
    let out_dir = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(default_dir(set)));
    std::fs::create_dir_all(&out_dir)?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("petmeme/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let sources = match set {
        PhotoSet::Pages => &PHOTO_PAGES,
        PhotoSet::Direct => &PHOTO_URLS,
    };

    info!("Fetching {} pet photos into {}", sources.len(), out_dir.display());
    let mut saved = 0;
    for (url, file_name) in sources {
        info!("Processing {}...", file_name);
        let path = out_dir.join(file_name);
        let result = match set {
            PhotoSet::Pages => match page_image_url(&client, url).await {
                Ok(image_url) => download(&client, &image_url, &path).await,
                Err(err) => Err(err),
            },
            PhotoSet::Direct => download(&client, url, &path).await,
        };
        match result {
            Ok(bytes) => {
                info!("Downloaded: {} ({} bytes)", file_name, bytes);
                saved += 1;
            }
            Err(err) => skip_or_abort(file_name, err)?,
        }
    }
    info!(
        "Done! {}/{} images saved to '{}'",
        saved,
        sources.len(),
        out_dir.display()
    );
    Ok(())
}
