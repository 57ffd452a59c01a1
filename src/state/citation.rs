use crate::types::{slugify, Citation};

/// Maps a citation to the URL of its source document.
pub trait CitationResolver {
    fn resolve(&self, citation: &Citation) -> Option<String>;
}

/// Uses the citation's own link when present, otherwise guesses a path from
/// the slugified document name. This is a heuristic until the backend exposes
/// a document lookup.
#[derive(Debug, Clone)]
pub struct SlugResolver {
    base_url: String,
}

impl SlugResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl CitationResolver for SlugResolver {
    fn resolve(&self, citation: &Citation) -> Option<String> {
        if let Some(link) = citation.link.as_deref().filter(|l| !l.trim().is_empty()) {
            return Some(link.to_string());
        }

        let slug = slugify(&citation.document);
        if slug.is_empty() {
            return None;
        }

        match citation.category.as_deref().map(slugify).filter(|c| !c.is_empty()) {
            Some(category) => Some(format!("{}/documents/{}/{}.pdf", self.base_url, category, slug)),
            None => Some(format!("{}/documents/{}.pdf", self.base_url, slug)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_link_wins() {
        let mut citation = Citation::new("Bylaws", "Bylaws");
        citation.link = Some("https://files.example.org/bylaws.pdf".into());

        let resolver = SlugResolver::new("http://localhost:8000/");
        assert_eq!(
            resolver.resolve(&citation).as_deref(),
            Some("https://files.example.org/bylaws.pdf")
        );
    }

    #[test]
    fn category_becomes_a_path_segment() {
        let mut citation = Citation::new("Resolution 2019-04", "Resolution 2019-04");
        citation.category = Some("Resolutions".into());

        let resolver = SlugResolver::new("http://localhost:8000");
        assert_eq!(
            resolver.resolve(&citation).as_deref(),
            Some("http://localhost:8000/documents/resolutions/resolution-2019-04.pdf")
        );
    }

    #[test]
    fn unnamed_document_is_unresolvable() {
        let citation = Citation::new("???", "???");
        assert_eq!(SlugResolver::new("http://x").resolve(&citation), None);
    }
}
