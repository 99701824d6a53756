use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub full_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

impl Author {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    pub fn with_orcid(mut self, orcid: impl Into<String>) -> Self {
        self.orcid = Some(orcid.into());
        self
    }

    pub fn with_affiliation(mut self, affiliation: impl Into<String>) -> Self {
        self.affiliation = Some(affiliation.into());
        self
    }

    /// Family name as written: the part before the comma for "Last, First",
    /// otherwise the final word.
    pub fn last_name(&self) -> Option<&str> {
        let name = self.full_name.trim();
        if name.is_empty() {
            return None;
        }
        if let Some((last, _)) = name.split_once(',') {
            let last = last.trim();
            return (!last.is_empty()).then_some(last);
        }
        name.split_whitespace().last()
    }

    /// ORCID without URL prefix, uppercased check digit.
    pub fn orcid_key(&self) -> Option<String> {
        let raw = self.orcid.as_deref()?.trim();
        let bare = raw
            .trim_start_matches("https://orcid.org/")
            .trim_start_matches("http://orcid.org/")
            .trim();
        (!bare.is_empty()).then(|| bare.to_ascii_uppercase())
    }
}
