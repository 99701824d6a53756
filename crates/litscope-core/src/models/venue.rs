use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueType {
    Journal,
    Conference,
    PreprintServer,
    Book,
    #[default]
    Other,
}

impl std::fmt::Display for VenueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use VenueType::*;
        let s = match self {
            Journal => "journal",
            Conference => "conference",
            PreprintServer => "preprint_server",
            Book => "book",
            Other => "other",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub venue_type: VenueType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issn_print: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issn_electronic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl Venue {
    pub fn new(name: impl Into<String>, venue_type: VenueType) -> Self {
        Self {
            name: name.into(),
            venue_type,
            ..Default::default()
        }
    }
}
