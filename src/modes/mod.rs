mod compose;
mod level;
mod mode;

pub use compose::{compose_caption_prompt, compose_image_prompt, normalize_context};
pub use level::IntensityLevel;
pub use mode::{GenerationMode, ModeProfile};
