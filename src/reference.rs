use serde::Deserialize;
use tracing::debug;

/// One entry of the static id catalog. Names carry their ids inline, e.g.
/// "Player Props (ID: 1000)", matching the upstream reference file.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRef {
    pub category_name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

/// Static category/subcategory labels. Consumed only to annotate the
/// category hint in progress output; the core never validates against it.
#[derive(Debug, Default)]
pub struct ReferenceCatalog {
    entries: Vec<CategoryRef>,
}

impl ReferenceCatalog {
    /// Best-effort load: a missing or malformed file is an empty catalog,
    /// never an error.
    pub fn load(path: &str) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => Self::parse(&bytes).unwrap_or_else(|e| {
                debug!("Reference catalog {path} unusable: {e}");
                Self::default()
            }),
            Err(e) => {
                debug!("Reference catalog {path} not loaded: {e}");
                Self::default()
            }
        }
    }

    pub fn parse(bytes: &[u8]) -> serde_json::Result<Self> {
        let entries: Vec<CategoryRef> = serde_json::from_slice(bytes)?;
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn label_for_category(&self, category_id: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|e| embedded_id(&e.category_name) == Some(category_id))
            .map(|e| display_label(&e.category_name).to_string())
    }

    pub fn label_for_subcategory(&self, subcategory_id: &str) -> Option<String> {
        self.entries
            .iter()
            .flat_map(|e| e.subcategories.iter())
            .find(|s| embedded_id(s) == Some(subcategory_id))
            .map(|s| display_label(s).to_string())
    }
}

/// "Player Props (ID: 1000)" → "1000".
fn embedded_id(text: &str) -> Option<&str> {
    let start = text.find("ID: ")? + 4;
    let rest = &text[start..];
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if end == 0 {
        None
    } else {
        Some(&rest[..end])
    }
}

/// "Player Props (ID: 1000)" → "Player Props".
fn display_label(text: &str) -> &str {
    text.split(" (ID:").next().unwrap_or(text).trim()
}
