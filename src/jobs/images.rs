//! `generate`: turn transformation prompts into new images.

use std::path::Path;
use std::time::Duration;

use tracing::info;

use super::{pause, skip_or_abort};
use crate::error::MemeError;
use crate::records::{TransformPrompt, read_records};
use crate::remote::GeminiClient;

/// Name a generated image is saved under.
pub fn generated_name(original_image: &str) -> String {
    format!("gen_{original_image}")
}

/// Generates one image per transformation prompt, pausing after each success.
pub async fn generate(
    client: &GeminiClient,
    prompts_path: &Path,
    out_dir: &Path,
    rate_limit_delay: Duration,
) -> Result<(), MemeError> {
    let prompts: Vec<TransformPrompt> = read_records(prompts_path)?;
    info!(
        "Found {} prompts. Generating transformed images...",
        prompts.len()
    );
    std::fs::create_dir_all(out_dir)?;

    let mut generated = 0;
    for prompt in &prompts {
        info!("Generating image for {}...", prompt.original_image);
        match client.generate_image(&prompt.transform_prompt).await {
            Ok(bytes) => {
                let name = generated_name(&prompt.original_image);
                std::fs::write(out_dir.join(&name), bytes)?;
                info!("Saved {}", name);
                generated += 1;
                pause(rate_limit_delay).await;
            }
            Err(err) => skip_or_abort(&prompt.original_image, err)?,
        }
    }
    info!(
        "Generation complete! {}/{} images generated.",
        generated,
        prompts.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::tests::offline_config;
    use crate::records::write_records;

    #[test]
    fn generated_names_keep_the_original() {
        assert_eq!(generated_name("dog_reading.jpg"), "gen_dog_reading.jpg");
    }

    #[tokio::test]
    async fn failures_are_counted_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prompts_path = dir.path().join("transform_prompts_v2.json");
        write_records(
            &prompts_path,
            &[TransformPrompt {
                original_image: "cat_glasses_head.jpg".to_string(),
                transform_prompt: "A tabby cat in horn-rimmed glasses grading essays".to_string(),
            }],
        )
        .expect("write prompts");
        let out_dir = dir.path().join("generated_images_v2");

        let client = GeminiClient::new(&offline_config()).expect("client");
        generate(&client, &prompts_path, &out_dir, Duration::ZERO)
            .await
            .expect("job runs");
        assert!(out_dir.is_dir());
        assert_eq!(std::fs::read_dir(&out_dir).expect("read dir").count(), 0);
    }

    #[tokio::test]
    async fn missing_prompts_file_aborts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = GeminiClient::new(&offline_config()).expect("client");
        let result = generate(
            &client,
            &dir.path().join("transform_prompts_v2.json"),
            &dir.path().join("out"),
            Duration::ZERO,
        )
        .await;
        assert!(matches!(result, Err(MemeError::MissingInput(_))));
    }
}
