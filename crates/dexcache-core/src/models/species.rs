use serde::{Deserialize, Serialize};

use super::pokemon::NamedResource;

/// Genus shown when the catalog has no entry in the configured language.
pub const GENUS_PLACEHOLDER: &str = "Unknown";

/// Description shown when the catalog has no entry in the configured language.
pub const DESCRIPTION_PLACEHOLDER: &str = "No description available.";

/// Raw `GET /pokemon-species/{id}` response.
#[derive(Debug, Deserialize)]
pub struct SpeciesResponse {
    pub id: u32,
    pub name: String,
    pub evolution_chain: Option<ApiResourceRef>,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    pub genera: Vec<GenusEntry>,
    pub habitat: Option<NamedResource>,
    #[serde(default)]
    pub is_legendary: bool,
    #[serde(default)]
    pub is_mythical: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApiResourceRef {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct GenusEntry {
    pub genus: String,
    pub language: NamedResource,
}

impl SpeciesResponse {
    /// Build locale-filtered species metadata, substituting placeholders for
    /// text missing in `language`.
    pub fn to_species_info(&self, language: &str) -> SpeciesInfo {
        let genus = self
            .genera
            .iter()
            .find(|g| g.language.name == language)
            .map(|g| g.genus.clone())
            .unwrap_or_else(|| GENUS_PLACEHOLDER.to_string());

        let description = self
            .flavor_text_entries
            .iter()
            .find(|f| f.language.name == language)
            .map(|f| clean_flavor_text(&f.flavor_text))
            .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string());

        SpeciesInfo {
            genus,
            description,
            habitat: self.habitat.as_ref().map(|h| h.name.clone()),
            is_legendary: self.is_legendary,
            is_mythical: self.is_mythical,
        }
    }

    pub fn evolution_chain_url(&self) -> Option<&str> {
        self.evolution_chain.as_ref().map(|c| c.url.as_str())
    }
}

/// Flavor text arrives with hard line breaks and form feeds from the games.
fn clean_flavor_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SpeciesInfo {
    pub genus: String,
    pub description: String,
    pub habitat: Option<String>,
    pub is_legendary: bool,
    pub is_mythical: bool,
}
