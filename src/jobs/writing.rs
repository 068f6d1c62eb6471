//! Jobs that ask the text model to write things down: personas, style
//! templates and per-image transformation prompts.

use std::path::Path;

use tracing::{info, warn};

use super::{list_images, skip_or_abort};
use crate::cli::PersonaFlavour;
use crate::error::MemeError;
use crate::prompts::{persona_instructions, style_instructions, transform_instructions};
use crate::records::{
    Persona, Record, StyleTemplate, TransformPrompt, parse_string_array, write_records,
};
use crate::remote::{GeminiClient, InlineImage};

/// `personas`: writes a list of meme personas.
pub async fn personas(
    client: &GeminiClient,
    flavour: PersonaFlavour,
    out: &Path,
) -> Result<(), MemeError> {
    info!("Generating {:?} meme personas...", flavour);
    let reply = client
        .generate_text(client.text_model(), &persona_instructions(flavour), None)
        .await?;
    let personas: Vec<Persona> = keep_valid(parse_string_array(&reply)?.into_iter().map(Persona));
    write_records(out, &personas)?;
    info!("Saved {} personas to {}", personas.len(), out.display());
    Ok(())
}

/// `styles`: writes image prompt templates, dropping any without the pet placeholder.
pub async fn styles(client: &GeminiClient, out: &Path) -> Result<(), MemeError> {
    info!("Generating meme style templates...");
    let reply = client
        .generate_text(client.text_model(), &style_instructions(), None)
        .await?;
    let styles: Vec<StyleTemplate> =
        keep_valid(parse_string_array(&reply)?.into_iter().map(StyleTemplate));
    write_records(out, &styles)?;
    info!("Saved {} style templates to {}", styles.len(), out.display());
    Ok(())
}

/// `transform-prompts`: asks the vision model how to restyle each input image.
pub async fn transform_prompts(
    client: &GeminiClient,
    input_dir: &Path,
    out: &Path,
) -> Result<(), MemeError> {
    let images = list_images(input_dir)?;
    if images.is_empty() {
        info!("No input images found in {}", input_dir.display());
        return Ok(());
    }

    let mut prompts = Vec::with_capacity(images.len());
    for file_name in &images {
        info!("Analyzing {}...", file_name);
        let photo = InlineImage::new(std::fs::read(input_dir.join(file_name))?);
        match client
            .generate_text(client.transform_model(), transform_instructions(), Some(&photo))
            .await
        {
            Ok(prompt) => {
                info!("Generated prompt: {}", prompt);
                prompts.push(TransformPrompt {
                    original_image: file_name.clone(),
                    transform_prompt: prompt,
                });
            }
            Err(err) => skip_or_abort(file_name, err)?,
        }
    }

    write_records(out, &prompts)?;
    info!(
        "Saved {}/{} transformation prompts to {}",
        prompts.len(),
        images.len(),
        out.display()
    );
    Ok(())
}

/// Drops records that fail validation, logging each one.
fn keep_valid<T: Record>(records: impl Iterator<Item = T>) -> Vec<T> {
    records
        .filter(|record| match record.validate() {
            Ok(()) => true,
            Err(reason) => {
                warn!("Dropping generated entry: {}", reason);
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::tests::{offline_config, write_png};
    use crate::records::read_records;

    #[test]
    fn invalid_templates_are_dropped() {
        let styles = keep_valid(
            [
                "A watercolour of {pet_description} at the beach.",
                "A photo of a dog.",
                "A cute 8-bit pixel art character of {pet_description} holding a sword.",
            ]
            .into_iter()
            .map(|style| StyleTemplate(style.to_string())),
        );
        assert_eq!(styles.len(), 2);
        assert!(styles.iter().all(|style| style.0.contains("{pet_description}")));
    }

    #[tokio::test]
    async fn failed_calls_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input_dir = dir.path().join("input_images_v2");
        std::fs::create_dir(&input_dir).expect("mkdir");
        write_png(&input_dir.join("cat_sunglasses.png"), 8, 8);
        let out = dir.path().join("transform_prompts_v2.json");

        let client = GeminiClient::new(&offline_config()).expect("client");
        transform_prompts(&client, &input_dir, &out)
            .await
            .expect("job runs");
        assert!(
            read_records::<TransformPrompt>(&out)
                .expect("read back")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn missing_input_dir_aborts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = GeminiClient::new(&offline_config()).expect("client");
        let result = transform_prompts(
            &client,
            &dir.path().join("nope"),
            &dir.path().join("transform_prompts_v2.json"),
        )
        .await;
        assert!(matches!(result, Err(MemeError::MissingInput(_))));
    }

    #[tokio::test]
    async fn unreachable_api_fails_personas() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("prompts_v2.json");
        let client = GeminiClient::new(&offline_config()).expect("client");
        assert!(matches!(
            personas(&client, PersonaFlavour::Human, &out).await,
            Err(MemeError::RemoteCallFailed { .. })
        ));
        assert!(!out.exists());
    }
}
