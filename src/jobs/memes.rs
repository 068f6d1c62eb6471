//! Jobs that end in a captioned meme on disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use super::{list_images, pause, skip_or_abort};
use crate::caption::Compositor;
use crate::codec;
use crate::error::MemeError;
use crate::prompts::{caption_instructions, clean_caption, describe_instructions};
use crate::records::{Persona, StyleTemplate, read_records};
use crate::remote::{GeminiClient, InlineImage};

/// Pet name used for mass produced memes: the file stem up to the first `_`.
pub fn pet_name(file_name: &str) -> &str {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);
    stem.split('_').next().unwrap_or(stem)
}

/// Asks the vision model for a caption and tidies it up.
async fn caption_for(
    client: &GeminiClient,
    image: &InlineImage,
    persona: Option<&Persona>,
) -> Result<String, MemeError> {
    let raw = client
        .generate_text(client.text_model(), &caption_instructions(persona), Some(image))
        .await?;
    let caption = clean_caption(&raw);
    if caption.is_empty() {
        return Err(MemeError::remote("generateContent", "caption was empty"));
    }
    info!("Caption: {}", caption);
    Ok(caption)
}

/// Decodes `bytes`, stamps `caption` on it and writes it to `out`.
pub fn stamp(
    compositor: &Compositor,
    bytes: &[u8],
    caption: &str,
    out: &Path,
) -> Result<(), MemeError> {
    let mut image = codec::decode(bytes)?;
    let layout = compositor.compose(&mut image, caption);
    debug!(
        "{}: {} lines at {}px after {} attempts",
        out.display(),
        layout.lines.len(),
        layout.font_size,
        layout.attempts
    );
    codec::write_image(&image, out)?;
    info!("Created meme: {}", out.display());
    Ok(())
}

/// Captions the image at `source` and writes the meme to `out`.
async fn caption_file(
    client: &GeminiClient,
    compositor: &Compositor,
    source: &Path,
    persona: Option<&Persona>,
    out: &Path,
) -> Result<(), MemeError> {
    let image = InlineImage::new(std::fs::read(source)?);
    let caption = caption_for(client, &image, persona).await?;
    stamp(compositor, &image.bytes, &caption, out)
}

/// `memes`: pairs sorted input images with personas and captions each one in
/// its persona's voice.
pub async fn persona_memes(
    client: &GeminiClient,
    compositor: &Compositor,
    input_dir: &Path,
    personas_path: &Path,
    out_dir: &Path,
    limit: usize,
) -> Result<(), MemeError> {
    let images = list_images(input_dir)?;
    let personas: Vec<Persona> = read_records(personas_path)?;
    if images.is_empty() {
        info!("No input images found in {}", input_dir.display());
        return Ok(());
    }
    std::fs::create_dir_all(out_dir)?;

    let count = limit.min(personas.len()).min(images.len());
    info!("Creating {} persona memes", count);
    for (index, (file_name, persona)) in images.iter().zip(&personas).take(count).enumerate() {
        info!("Processing {} with persona: {}", file_name, persona);
        let out = out_dir.join(format!("meme_v2_{}_{}", index + 1, file_name));
        let source = input_dir.join(file_name);
        if let Err(err) = caption_file(client, compositor, &source, Some(persona), &out).await {
            skip_or_abort(file_name, err)?;
        }
    }
    Ok(())
}

/// `assemble`: captions every generated image.
pub async fn assemble(
    client: &GeminiClient,
    compositor: &Compositor,
    input_dir: &Path,
    out_dir: &Path,
) -> Result<(), MemeError> {
    let images = list_images(input_dir)?;
    if images.is_empty() {
        info!("No generated images found in {}", input_dir.display());
        return Ok(());
    }
    std::fs::create_dir_all(out_dir)?;

    for file_name in &images {
        info!("Processing {}...", file_name);
        let out = out_dir.join(format!("meme_{file_name}"));
        let source = input_dir.join(file_name);
        if let Err(err) = caption_file(client, compositor, &source, None, &out).await {
            skip_or_abort(file_name, err)?;
        }
    }
    Ok(())
}

/// `pipeline`: describe each pet, restyle it with the first few style
/// templates, then caption every generated image.
#[derive(Debug)]
pub struct Pipeline<'a> {
    /// Directory of pet photos
    pub input_dir: &'a Path,
    /// Style template file
    pub styles: &'a Path,
    /// Where the memes go
    pub out_dir: &'a Path,
    /// How many styles to apply to each photo
    pub styles_per_image: usize,
    /// Pause after each generated image
    pub rate_limit_delay: Duration,
}

impl Pipeline<'_> {
    /// File a mass produced meme is written to.
    pub fn output_path(&self, file_name: &str, style_index: usize) -> PathBuf {
        self.out_dir.join(format!(
            "{}_meme_style_{}.jpg",
            pet_name(file_name),
            style_index
        ))
    }

    /// Runs the whole pipeline over every input photo.
    pub async fn run(
        &self,
        client: &GeminiClient,
        compositor: &Compositor,
    ) -> Result<(), MemeError> {
        let images = list_images(self.input_dir)?;
        let styles: Vec<StyleTemplate> = read_records(self.styles)?;
        if images.is_empty() {
            info!("No input images found in {}", self.input_dir.display());
            return Ok(());
        }
        std::fs::create_dir_all(self.out_dir)?;
        info!("Running mass production pipeline over {} images", images.len());

        for file_name in &images {
            info!("--- Processing {} ---", file_name);
            let photo = InlineImage::new(std::fs::read(self.input_dir.join(file_name))?);
            let description = match client
                .generate_text(client.text_model(), describe_instructions(), Some(&photo))
                .await
            {
                Ok(description) => description,
                Err(err) => {
                    skip_or_abort(file_name, err)?;
                    continue;
                }
            };
            info!("Description: {}", description);

            for (index, style) in styles.iter().take(self.styles_per_image).enumerate() {
                if let Err(err) = self
                    .one_style(client, compositor, file_name, &description, index, style)
                    .await
                {
                    skip_or_abort(&format!("{file_name} style {index}"), err)?;
                }
            }
        }
        Ok(())
    }

    async fn one_style(
        &self,
        client: &GeminiClient,
        compositor: &Compositor,
        file_name: &str,
        description: &str,
        index: usize,
        style: &StyleTemplate,
    ) -> Result<(), MemeError> {
        let prompt = style.render(description);
        info!("Generating image for prompt: {}...", preview(&prompt));
        let generated = InlineImage::new(client.generate_image(&prompt).await?);
        pause(self.rate_limit_delay).await;
        let caption = caption_for(client, &generated, None).await?;
        stamp(
            compositor,
            &generated.bytes,
            &caption,
            &self.output_path(file_name, index),
        )
    }
}

/// First 50 characters of a prompt, for progress lines.
fn preview(prompt: &str) -> String {
    prompt.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::font::CaptionFont;
    use crate::jobs::tests::{offline_config, write_png};
    use crate::records::write_records;

    #[test]
    fn pet_names() {
        assert_eq!(pet_name("dog_reading.jpg"), "dog");
        assert_eq!(pet_name("cat.png"), "cat");
        assert_eq!(pet_name("hamster_base_2.jpeg"), "hamster");
    }

    #[test]
    fn pipeline_output_names() {
        let pipeline = Pipeline {
            input_dir: Path::new("input_images_v2"),
            styles: Path::new("meme_styles.json"),
            out_dir: Path::new("mass_produced_memes"),
            styles_per_image: 3,
            rate_limit_delay: Duration::ZERO,
        };
        assert_eq!(
            pipeline.output_path("cat_sunglasses.jpg", 2),
            Path::new("mass_produced_memes").join("cat_meme_style_2.jpg")
        );
    }

    #[test]
    fn stamp_writes_a_captioned_jpeg() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("gen_dog_reading.png");
        write_png(&source, 320, 240);
        let out = dir.path().join("meme_gen_dog_reading.jpg");

        let compositor = Compositor::new(CaptionFont::Builtin);
        let bytes = std::fs::read(&source).expect("read");
        stamp(&compositor, &bytes, "WHEN THE BOOK HAS NO TREATS", &out).expect("stamp");

        let written = codec::read_image(&out).expect("decode output");
        assert_eq!(written.dimensions(), (320, 240));
    }

    #[test]
    fn stamp_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let compositor = Compositor::new(CaptionFont::Builtin);
        assert!(matches!(
            stamp(&compositor, b"not an image", "HI", &dir.path().join("x.jpg")),
            Err(MemeError::DecodeFailed(_))
        ));
    }

    #[tokio::test]
    async fn persona_memes_skip_failed_captions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input_dir = dir.path().join("input_images_v2");
        std::fs::create_dir(&input_dir).expect("mkdir");
        write_png(&input_dir.join("dog_reading.png"), 16, 16);
        let personas = dir.path().join("prompts_v2.json");
        write_records(&personas, &[Persona("The Suspicious Dog".to_string())])
            .expect("write personas");
        let out_dir = dir.path().join("output_memes_v2");

        let client = GeminiClient::new(&offline_config()).expect("client");
        let compositor = Compositor::new(CaptionFont::Builtin);
        persona_memes(&client, &compositor, &input_dir, &personas, &out_dir, 5)
            .await
            .expect("job runs");
        assert_eq!(std::fs::read_dir(&out_dir).expect("read dir").count(), 0);
    }

    #[tokio::test]
    async fn pipeline_needs_styles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input_dir = dir.path().join("input_images_v2");
        std::fs::create_dir(&input_dir).expect("mkdir");
        let pipeline = Pipeline {
            input_dir: &input_dir,
            styles: &dir.path().join("meme_styles.json"),
            out_dir: &dir.path().join("mass_produced_memes"),
            styles_per_image: 3,
            rate_limit_delay: Duration::ZERO,
        };
        let client = GeminiClient::new(&offline_config()).expect("client");
        let compositor = Compositor::new(CaptionFont::Builtin);
        assert!(matches!(
            pipeline.run(&client, &compositor).await,
            Err(MemeError::MissingInput(_))
        ));
    }
}
