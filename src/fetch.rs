//! Stock photo downloads, either straight from an image URL or by scraping a
//! photo page for its `og:image`.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::MemeError;

#[allow(clippy::expect_used)]
static OG_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta\s+property="og:image"\s+content="([^"]+)""#)
        .expect("Failed to compile og:image regex")
});

/// Finds the `og:image` URL in a page, decoding HTML entities (`&amp;` and friends).
pub fn extract_og_image(html: &str) -> Option<String> {
    OG_IMAGE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|url| html_escape::decode_html_entities(url.as_str()).into_owned())
        .filter(|url| !url.trim().is_empty())
}

/// Fetches a photo page and returns its `og:image` URL.
pub async fn page_image_url(client: &reqwest::Client, page_url: &str) -> Result<String, MemeError> {
    let html = client
        .get(page_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    extract_og_image(&html)
        .ok_or_else(|| MemeError::remote("og:image", format!("no og:image in {page_url}")))
}

/// Downloads `url` to `path`, returning the number of bytes written.
pub async fn download(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
) -> Result<usize, MemeError> {
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    debug!("Downloaded {} bytes from {}", bytes.len(), url);
    std::fs::write(path, &bytes)?;
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn og_image_is_found_and_unescaped() {
        let html = r#"<html><head>
            <meta property="og:title" content="A dog reading">
            <meta property="og:image" content="https://images.unsplash.com/photo-1?crop=entropy&amp;w=1200&amp;q=60" />
            </head></html>"#;
        assert_eq!(
            extract_og_image(html).as_deref(),
            Some("https://images.unsplash.com/photo-1?crop=entropy&w=1200&q=60")
        );
    }

    #[test]
    fn missing_og_image() {
        assert_eq!(extract_og_image("<html><head></head></html>"), None);
        assert_eq!(
            extract_og_image(r#"<meta property="og:image" content="  ">"#),
            None
        );
    }

    #[tokio::test]
    async fn unreachable_page_is_remote_failure() {
        let client = reqwest::Client::new();
        assert!(matches!(
            page_image_url(&client, "http://127.0.0.1:9/photos/abc").await,
            Err(MemeError::RemoteCallFailed { .. })
        ));
    }

    #[tokio::test]
    async fn failed_download_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cat_base.jpg");
        let client = reqwest::Client::new();
        assert!(
            download(&client, "http://127.0.0.1:9/cat.jpg", &path)
                .await
                .is_err()
        );
        assert!(!path.exists());
    }
}
