use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Blog category.
///
/// The well-known labels are the ones offered by the editor; any other
/// non-blank label is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    WebDevelopment,
    DigitalMarketing,
    Blogging,
    Photography,
    Cooking,
    Lifestyle,
    Travel,
    PersonalGrowth,
    Sports,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 9] = [
        Category::WebDevelopment,
        Category::DigitalMarketing,
        Category::Blogging,
        Category::Photography,
        Category::Cooking,
        Category::Lifestyle,
        Category::Travel,
        Category::PersonalGrowth,
        Category::Sports,
    ];

    /// Parse a user-supplied label. Returns `None` for blank input.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        let known = Self::KNOWN
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .cloned();

        Some(known.unwrap_or_else(|| Category::Other(label.to_string())))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::WebDevelopment => "Web Development",
            Category::DigitalMarketing => "Digital Marketing",
            Category::Blogging => "Blogging",
            Category::Photography => "Photography",
            Category::Cooking => "Cooking",
            Category::Lifestyle => "Lifestyle",
            Category::Travel => "Travel",
            Category::PersonalGrowth => "Personal Growth",
            Category::Sports => "Sports",
            Category::Other(label) => label,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Rows coming back from the store are trusted to be non-blank.
impl From<String> for Category {
    fn from(label: String) -> Self {
        Category::parse(&label).unwrap_or(Category::Other(label))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Category::parse(&label)
            .ok_or_else(|| serde::de::Error::custom("category must not be blank"))
    }
}
