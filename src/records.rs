//! Typed JSON records for the files passed between jobs.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::constants::PET_DESCRIPTION_PLACEHOLDER;
use crate::error::MemeError;

/// Something read back from a JSON array on disk that can be sanity checked.
pub trait Record: Serialize + DeserializeOwned {
    /// Returns a reason when the record is unusable.
    fn validate(&self) -> Result<(), String>;
}

/// A meme persona, eg "The Corporate Cat in a Tie".
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Persona(pub String);

impl Record for Persona {
    fn validate(&self) -> Result<(), String> {
        if self.0.trim().is_empty() {
            return Err("persona is empty".to_string());
        }
        Ok(())
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An image prompt template with a `{pet_description}` placeholder.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleTemplate(pub String);

impl StyleTemplate {
    /// Substitutes the pet description into the template.
    pub fn render(&self, pet_description: &str) -> String {
        self.0
            .replace(PET_DESCRIPTION_PLACEHOLDER, pet_description.trim())
    }
}

impl Record for StyleTemplate {
    fn validate(&self) -> Result<(), String> {
        if !self.0.contains(PET_DESCRIPTION_PLACEHOLDER) {
            return Err(format!(
                "template is missing {PET_DESCRIPTION_PLACEHOLDER}: {}",
                self.0
            ));
        }
        Ok(())
    }
}

/// How to transform one input image.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransformPrompt {
    /// File name of the source image, inside the input directory
    pub original_image: String,
    /// Prompt for the image model
    pub transform_prompt: String,
}

impl Record for TransformPrompt {
    fn validate(&self) -> Result<(), String> {
        if self.original_image.trim().is_empty() {
            return Err("original_image is empty".to_string());
        }
        if self.original_image.contains(['/', '\\']) {
            return Err(format!(
                "original_image must be a bare file name: {}",
                self.original_image
            ));
        }
        if self.transform_prompt.trim().is_empty() {
            return Err(format!(
                "transform_prompt for {} is empty",
                self.original_image
            ));
        }
        Ok(())
    }
}

/// Reads a JSON array of records, validating each one.
pub fn read_records<T: Record>(path: &Path) -> Result<Vec<T>, MemeError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(MemeError::MissingInput(path.display().to_string()));
        }
        Err(err) => return Err(err.into()),
    };
    let records: Vec<T> = serde_json::from_str(&raw)
        .map_err(|err| MemeError::invalid_record(path, err.to_string()))?;
    for (index, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|message| MemeError::invalid_record(path, format!("#{index}: {message}")))?;
    }
    Ok(records)
}

/// Writes records as a pretty JSON array, replacing the file.
pub fn write_records<T: Record>(path: &Path, records: &[T]) -> Result<(), MemeError> {
    let json = serde_json::to_string_pretty(records)
        .map_err(|err| MemeError::invalid_record(path, err.to_string()))?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
}

/// Parses a model reply that should be a JSON array of strings, tolerating
/// Markdown code fences around it.
pub fn parse_string_array(text: &str) -> Result<Vec<String>, MemeError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    serde_json::from_str(cleaned.trim()).map_err(|err| {
        MemeError::invalid_record(
            Path::new("model output"),
            format!("expected a JSON array of strings: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_model_output() {
        let text = "```json\n[\"The Overly Dramatic Cat\", \"The Suspicious Dog\"]\n```\n";
        assert_eq!(
            parse_string_array(text).expect("parse"),
            vec!["The Overly Dramatic Cat", "The Suspicious Dog"]
        );
        assert!(parse_string_array("Sure! Here are some personas:").is_err());
        assert!(parse_string_array("[1, 2]").is_err());
    }

    #[test]
    fn style_template_rendering() {
        let style = StyleTemplate(
            "A dramatic oil painting of {pet_description} dressed as a general.".to_string(),
        );
        assert!(style.validate().is_ok());
        assert_eq!(
            style.render(" a fluffy grey tabby cat\n"),
            "A dramatic oil painting of a fluffy grey tabby cat dressed as a general."
        );
        assert!(
            StyleTemplate("A photo of a dog.".to_string())
                .validate()
                .is_err()
        );
    }

    #[test]
    fn transform_prompts_round_trip_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("transform_prompts_v2.json");
        let prompts = vec![TransformPrompt {
            original_image: "dog_reading.jpg".to_string(),
            transform_prompt: "A golden retriever DJing at a rooftop party, cinematic 3D render"
                .to_string(),
        }];
        write_records(&path, &prompts).expect("write");
        let raw = std::fs::read_to_string(&path).expect("read raw");
        assert!(raw.contains("\"original_image\": \"dog_reading.jpg\""));
        assert_eq!(
            read_records::<TransformPrompt>(&path).expect("read"),
            prompts
        );
    }

    #[test]
    fn schema_mismatch_is_invalid_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("transform_prompts_v2.json");
        std::fs::write(&path, r#"[{"original_image": "cat.jpg"}]"#).expect("write");
        assert!(matches!(
            read_records::<TransformPrompt>(&path),
            Err(MemeError::InvalidRecord { .. })
        ));

        std::fs::write(
            &path,
            r#"[{"original_image": "../cat.jpg", "transform_prompt": "x"}]"#,
        )
        .expect("write");
        assert!(matches!(
            read_records::<TransformPrompt>(&path),
            Err(MemeError::InvalidRecord { .. })
        ));

        std::fs::write(&path, r#"["fine", "  "]"#).expect("write");
        assert!(matches!(
            read_records::<Persona>(&path),
            Err(MemeError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn missing_file_is_missing_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            read_records::<Persona>(&dir.path().join("prompts_v2.json")),
            Err(MemeError::MissingInput(_))
        ));
    }
}
