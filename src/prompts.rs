//! Instructions sent to the text model.

use crate::cli::PersonaFlavour;
use crate::constants::{PET_DESCRIPTION_PLACEHOLDER, TEMPLATE_COUNT};
use crate::records::Persona;

/// Asks for a list of meme personas.
pub fn persona_instructions(flavour: PersonaFlavour) -> String {
    match flavour {
        PersonaFlavour::Human => format!(
            "Generate {TEMPLATE_COUNT} distinct, funny meme personas specifically for pets acting like humans. \
             The personas should describe a pet doing a human activity or wearing human clothes. \
             Examples: 'The Coffee Shop Screenwriter Dog', 'The Corporate Cat in a Tie', 'The Gym Rat Hamster'. \
             Return the output as a JSON array of strings. Do not include markdown formatting."
        ),
        PersonaFlavour::Classic => format!(
            "Generate {TEMPLATE_COUNT} distinct, creative, and funny meme personas or styles for pet memes. \
             For example: 'The Overly Dramatic Cat', 'The Suspicious Dog'. \
             Return the output as a JSON array of strings. Do not include markdown formatting."
        ),
    }
}

/// Asks for image prompt templates carrying the pet description placeholder.
pub fn style_instructions() -> String {
    format!(
        "Generate {TEMPLATE_COUNT} diverse and creative image generation prompt templates for creating pet memes. \
         Each template must include the placeholder '{PET_DESCRIPTION_PLACEHOLDER}'. \
         The styles should range from realistic/human-like to various art styles. \
         The templates must describe the visuals only: no text, captions or words written in the image. \
         The images should be clean, text-free visuals that can be used as a meme background later. \
         Examples: \
         - 'A hyper-realistic photo of {PET_DESCRIPTION_PLACEHOLDER} wearing a business suit and working at a laptop in a modern office.' \
         - 'A cute 8-bit pixel art character of {PET_DESCRIPTION_PLACEHOLDER} holding a sword.' \
         - 'A dramatic oil painting of {PET_DESCRIPTION_PLACEHOLDER} dressed as a Napoleonic general.' \
         Return the output as a JSON array of strings. Do not include markdown formatting."
    )
}

/// Asks the vision model to turn a pet photo into an image generation prompt.
pub fn transform_instructions() -> &'static str {
    "Look at this pet. I want to generate a new image of this exact type of pet acting like a human. \
     Create a detailed image generation prompt for a text-to-image model. \
     The prompt should describe: \
     1. The pet's key features (breed, color, markings) from the image. \
     2. A funny, human-like activity or outfit (e.g., wearing a suit, DJing, reading, cooking). \
     3. An art style (e.g., 'A cinematic 3D render', 'A high quality photo', 'A Pixar-style character'). \
     Format the output as a SINGLE paragraph string. Do not use quotes or markdown."
}

/// Asks the vision model for a one sentence description of the pet.
pub fn describe_instructions() -> &'static str {
    "Describe this pet in detail (breed, color, markings, expression) in one sentence. \
     Do NOT mention the background, just the pet."
}

/// Asks the vision model for a caption, optionally in the voice of a persona.
pub fn caption_instructions(persona: Option<&Persona>) -> String {
    match persona {
        Some(persona) => format!(
            "Look at this image. Write a short, funny meme caption in the style of: '{persona}'. \
             The caption should be punchy, relatable, and suitable for a large thumbnail. \
             Return ONLY the caption text (UPPERCASE is better for memes), nothing else. No quotes."
        ),
        None => "Look at this image. Write a short, funny meme caption for it. \
                 The caption should be punchy, relatable, and suitable for a large thumbnail. \
                 It should relate to the specific visual style or action in the image. \
                 Return ONLY the caption text (UPPERCASE is usually better), nothing else. No quotes."
            .to_string(),
    }
}

/// Tidies a caption from the model: drops wrapping quotes and upper-cases it.
pub fn clean_caption(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\u{201c}' || c == '\u{201d}')
        .trim()
        .to_uppercase()
}
