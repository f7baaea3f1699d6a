use unicode_segmentation::UnicodeSegmentation;

const MAX_CHAR_LENGTH: usize = 256;

/// Free-form place query handed to the weather provider ("Paris", "London, UK", "48.85,2.35").
/// Anything non-empty goes; it is escaped wherever it gets rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberLocation(String);

impl SubscriberLocation {
    pub fn parse(location: String) -> Result<SubscriberLocation, String> {
        let location = location.trim().to_string();
        let is_empty = location.is_empty();
        let is_too_long = location.graphemes(true).count() > MAX_CHAR_LENGTH;

        if is_empty || is_too_long {
            return Err(format!("{} is not a valid location", location));
        }

        Ok(Self(location))
    }
}

impl AsRef<str> for SubscriberLocation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
