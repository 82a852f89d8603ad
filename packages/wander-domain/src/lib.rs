pub mod language;
pub mod normalize;
pub mod records;

pub use language::{InvalidLanguageCode, LanguageCode, detect_language};
pub use normalize::{NormalizedText, normalize};
pub use records::{Coordinates, Destination, Tag};
