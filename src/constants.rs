//! Shared constants for directory names, endpoints and model defaults
//!

/// Base URL for the generative language API
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/";

/// Text/vision model used for captions, personas and descriptions
pub const DEFAULT_TEXT_MODEL: &str = "gemini-flash-latest";

/// Vision model used to write image transformation prompts
pub const DEFAULT_TRANSFORM_MODEL: &str = "gemini-2.0-flash-exp";

/// Text-to-image model
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

/// Seconds to wait after each generated image, to stay under the image API quota.
pub const DEFAULT_RATE_LIMIT_DELAY_SECS: u64 = 30;

/// Where `fetch --set direct` puts the unmodified pet photos
pub const INPUT_DIR: &str = "input_images";

/// Where `fetch --set pages` puts the human-like pet photos
pub const INPUT_DIR_V2: &str = "input_images_v2";

/// Transformed images from the image model
pub const GENERATED_DIR: &str = "generated_images_v2";

/// Captioned memes
pub const OUTPUT_DIR: &str = "output_memes_v2";

/// Output of the mass production pipeline
pub const MASS_PRODUCED_DIR: &str = "mass_produced_memes";

/// Meme personas, a JSON array of strings
pub const PERSONAS_FILE: &str = "prompts_v2.json";

/// Image prompt templates, a JSON array of strings with a `{pet_description}` placeholder
pub const STYLES_FILE: &str = "meme_styles.json";

/// Per-image transformation prompts
pub const TRANSFORM_PROMPTS_FILE: &str = "transform_prompts_v2.json";

/// Placeholder substituted into style templates
pub const PET_DESCRIPTION_PLACEHOLDER: &str = "{pet_description}";

/// File extensions treated as input images
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Number of personas/styles asked for in one go
pub const TEMPLATE_COUNT: usize = 10;

/// Stock photo pages scraped for their `og:image`, and the file name to save them as.
pub const PHOTO_PAGES: [(&str, &str); 5] = [
    ("https://unsplash.com/photos/xW1oQ53w3iY", "dog_reading.jpg"),
    ("https://unsplash.com/photos/vH_L6A-o5y8", "cat_sunglasses.jpg"),
    ("https://unsplash.com/photos/C0YFv-xM8pM", "cat_glasses_head.jpg"),
    ("https://unsplash.com/photos/bY4-x8J5z8c", "cat_glasses_look.jpg"),
    ("https://unsplash.com/photos/N04FIfHhv_k", "dog_sunglasses_2.jpg"),
];

/// Direct stock photo URLs, used as plain bases for transformation.
pub const PHOTO_URLS: [(&str, &str); 5] = [
    (
        "https://images.unsplash.com/photo-1514888286974-6c03e2ca1dba?q=80&w=2043&auto=format&fit=crop",
        "cat_base.jpg",
    ),
    (
        "https://images.unsplash.com/photo-1543466835-00a7907e9de1?q=80&w=1974&auto=format&fit=crop",
        "dog_base.jpg",
    ),
    (
        "https://images.unsplash.com/photo-1518020382113-a7e8fc38eac9?q=80&w=2000&auto=format&fit=crop",
        "pug_base.jpg",
    ),
    (
        "https://images.unsplash.com/photo-1425082661705-1834bfd09dca?q=80&w=2076&auto=format&fit=crop",
        "hamster_base.jpg",
    ),
    (
        "https://images.unsplash.com/photo-1517849845537-4d257902454a?q=80&w=1935&auto=format&fit=crop",
        "dog_chow.jpg",
    ),
];

/// Font files probed, in order, before falling back to the built-in bitmap face.
/// The second field is the face index inside a collection.
pub const SYSTEM_FONTS: [(&str, u32); 5] = [
    ("/System/Library/Fonts/Helvetica.ttc", 1),
    ("Arial.ttf", 0),
    ("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf", 0),
    ("/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf", 0),
    ("C:\\Windows\\Fonts\\arialbd.ttf", 0),
];

#[cfg(test)]
/// Caption used across the compositor tests
pub const TEST_CAPTION: &str = "THE GYM RAT HAMSTER IS JUDGING YOUR SQUAT FORM RIGHT NOW";
