use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub answer_html: Option<String>,
    pub citations: Vec<Citation>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_error: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into())
    }

    fn new(role: Role, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            answer_html: None,
            citations: Vec::new(),
            created_at: Utc::now(),
            is_error: false,
        }
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(from = "CitationPayload", into = "FlatCitation")]
pub struct Citation {
    pub id: String,
    /// Reference to the source document, usually its title or file name.
    pub document: String,
    pub title: String,
    pub quote: Option<String>,
    pub link: Option<String>,
    pub category: Option<String>,
    pub section: Option<String>,
    pub year: Option<i32>,
}

impl Citation {
    pub fn new(document: impl Into<String>, title: impl Into<String>) -> Self {
        let document = document.into();
        Self {
            id: citation_id(&document, None),
            document,
            title: title.into(),
            quote: None,
            link: None,
            category: None,
            section: None,
            year: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_quote(mut self, quote: impl Into<String>) -> Self {
        self.quote = Some(quote.into());
        self
    }
}

// The chat backend emits either a flat citation or `{document: {title, category, section, year}}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CitationPayload {
    Flat(FlatCitation),
    Nested { document: NestedDocument },
}

#[derive(Serialize, Deserialize)]
struct FlatCitation {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    document: Option<String>,
    title: String,
    #[serde(default)]
    quote: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    year: Option<i32>,
}

#[derive(Deserialize)]
struct NestedDocument {
    title: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    year: Option<i32>,
}

impl From<CitationPayload> for Citation {
    fn from(payload: CitationPayload) -> Self {
        match payload {
            CitationPayload::Flat(flat) => {
                let document = flat.document.unwrap_or_else(|| flat.title.clone());
                let section = flat.section.filter(|s| !s.trim().is_empty());
                Citation {
                    id: flat
                        .id
                        .unwrap_or_else(|| citation_id(&document, section.as_deref())),
                    document,
                    title: flat.title,
                    quote: flat.quote,
                    link: flat.link,
                    category: flat.category,
                    section,
                    year: flat.year,
                }
            }
            CitationPayload::Nested { document } => {
                let section = document.section.filter(|s| !s.trim().is_empty());
                Citation {
                    id: citation_id(&document.title, section.as_deref()),
                    document: document.title.clone(),
                    title: document.title,
                    quote: None,
                    link: None,
                    category: document.category,
                    section,
                    year: document.year,
                }
            }
        }
    }
}

impl From<Citation> for FlatCitation {
    fn from(citation: Citation) -> Self {
        FlatCitation {
            id: Some(citation.id),
            document: Some(citation.document),
            title: citation.title,
            quote: citation.quote,
            link: citation.link,
            category: citation.category,
            section: citation.section,
            year: citation.year,
        }
    }
}

fn citation_id(document: &str, section: Option<&str>) -> String {
    match section {
        Some(section) => format!("{}#{}", slugify(document), slugify(section)),
        None => slugify(document),
    }
}

/// Lowercase, ascii-alphanumeric words joined by `-`.
pub fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "sizeMB", default)]
    pub size_mb: f64,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    BoardCommitteeProceedings,
    BylawsGovernance,
    ExternalAdvocacy,
    PolicyPositions,
    Resolutions,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::BoardCommitteeProceedings,
        Category::BylawsGovernance,
        Category::ExternalAdvocacy,
        Category::PolicyPositions,
        Category::Resolutions,
    ];

    /// Name the backend indexes documents under.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BoardCommitteeProceedings => "Board & Committee Proceedings",
            Category::BylawsGovernance => "Bylaws & Governance Policies",
            // two spaces, matching the backend's index name
            Category::ExternalAdvocacy => "External Advocacy &  Communications",
            Category::PolicyPositions => "Policy & Position Statements",
            Category::Resolutions => "Resolutions",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::ExternalAdvocacy => "External Advocacy & Communications",
            other => other.as_str(),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        Category::ALL
            .into_iter()
            .find(|c| c.display_name().eq_ignore_ascii_case(&normalized))
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_backend_citation_is_normalized() {
        let raw = r#"{"document": {"title": "Bylaws 2021", "category": "Bylaws & Governance Policies", "section": "Article IV, Section 2", "year": 2021}}"#;
        let citation: Citation = serde_json::from_str(raw).unwrap();

        assert_eq!(citation.title, "Bylaws 2021");
        assert_eq!(citation.document, "Bylaws 2021");
        assert_eq!(citation.id, "bylaws-2021#article-iv-section-2");
        assert_eq!(citation.year, Some(2021));
        assert!(citation.quote.is_none());
    }

    #[test]
    fn flat_citation_keeps_its_id() {
        let raw = r#"{"id": "c-7", "document": "doc-7", "title": "Resolution 7", "quote": "be it resolved"}"#;
        let citation: Citation = serde_json::from_str(raw).unwrap();

        assert_eq!(citation.id, "c-7");
        assert_eq!(citation.document, "doc-7");
        assert_eq!(citation.quote.as_deref(), Some("be it resolved"));
    }

    #[test]
    fn empty_section_does_not_change_the_id() {
        let raw = r#"{"document": {"title": "Minutes", "section": "  "}}"#;
        let citation: Citation = serde_json::from_str(raw).unwrap();

        assert_eq!(citation.id, "minutes");
        assert!(citation.section.is_none());
    }

    #[test]
    fn document_info_uses_wire_field_names() {
        let raw = r#"{"id": "d1", "name": "policy.pdf", "sizeMB": 1.5, "type": "pdf", "status": "processed"}"#;
        let doc: DocumentInfo = serde_json::from_str(raw).unwrap();

        assert_eq!(doc.size_mb, 1.5);
        assert_eq!(doc.doc_type, "pdf");
    }

    #[test]
    fn category_parsing_tolerates_spacing_and_case() {
        assert_eq!(
            Category::from_str("external advocacy & communications"),
            Some(Category::ExternalAdvocacy)
        );
        assert_eq!(
            Category::from_str("External Advocacy &  Communications"),
            Some(Category::ExternalAdvocacy)
        );
        assert_eq!(Category::from_str("Recipes"), None);
    }

    #[test]
    fn slugify_drops_punctuation() {
        assert_eq!(slugify("Policy & Position Statements"), "policy-position-statements");
        assert_eq!(slugify("  "), "");
    }
}
