use serde::{Deserialize, Serialize};

/// A sight extracted from one day of an itinerary, handed to photo tagging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attraction {
    /// Synthetic identifier scoped to its day, e.g. `day2_attr3`
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Attraction {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }

    /// Placeholder records are produced when a day names no attractions
    pub fn is_placeholder(&self) -> bool {
        self.id.contains("_default")
    }
}
