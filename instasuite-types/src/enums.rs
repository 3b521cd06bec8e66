use serde::{Deserialize, Serialize};

/// Media type tag as reported by the platform.
///
/// Unknown tags are kept verbatim so a new media kind never breaks decoding
/// of a whole feed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MediaType {
    Image,
    Video,
    CarouselAlbum,
    Other(String),
}

impl MediaType {
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Image => "IMAGE",
            MediaType::Video => "VIDEO",
            MediaType::CarouselAlbum => "CAROUSEL_ALBUM",
            MediaType::Other(tag) => tag,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "IMAGE" => MediaType::Image,
            "VIDEO" => MediaType::Video,
            "CAROUSEL_ALBUM" => MediaType::CarouselAlbum,
            _ => MediaType::Other(s.to_string()),
        }
    }

    /// Short label for list badges
    pub fn label(&self) -> &str {
        match self {
            MediaType::Image => "Image",
            MediaType::Video => "Video",
            MediaType::CarouselAlbum => "Album",
            MediaType::Other(tag) => tag,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaType::Video)
    }
}

impl From<String> for MediaType {
    fn from(s: String) -> Self {
        MediaType::parse(&s)
    }
}

impl From<MediaType> for String {
    fn from(media_type: MediaType) -> Self {
        media_type.as_str().to_string()
    }
}
