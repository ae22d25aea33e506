//! Product knowledge appended to the agent's instructions.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Knowledge files, in the order they appear in the prompt.
pub const KNOWLEDGE_FILES: [&str; 3] = ["export.md", "dashboard.md", "permissions.md"];

const HEADER: &str = "## KNOWLEDGE BASE";

const USAGE_GUIDELINES: &str = "
### Usage Guidelines
- Reference this knowledge when answering user questions
- Incorporate relevant details into your responses
- Prioritize this information over general knowledge when applicable
- Be specific and accurate when citing information from these documents
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeDoc {
    pub path: PathBuf,
    pub content: String,
}

impl KnowledgeDoc {
    /// First line with leading and trailing `#` and spaces removed.
    pub fn title(&self) -> &str {
        self.content
            .lines()
            .next()
            .unwrap_or_default()
            .trim_matches(|c| c == '#' || c == ' ')
    }

    fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    docs: Vec<KnowledgeDoc>,
}

impl KnowledgeBase {
    /// Read every knowledge file under `dir`. Missing or unreadable files
    /// count as empty.
    pub fn load(dir: &Path) -> Self {
        let docs = KNOWLEDGE_FILES
            .iter()
            .map(|name| {
                let path = dir.join(name);
                let content = match std::fs::read_to_string(&path) {
                    Ok(content) => {
                        debug!(path = %path.display(), bytes = content.len(), "Loaded knowledge file");
                        content
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
                    Err(e) => {
                        warn!(path = %path.display(), "Ignoring unreadable knowledge file: {}", e);
                        String::new()
                    }
                };
                KnowledgeDoc { path, content }
            })
            .collect();
        Self { docs }
    }

    pub fn docs(&self) -> &[KnowledgeDoc] {
        &self.docs
    }

    /// Render for inclusion in a prompt. Blank files are left out.
    pub fn format(&self) -> String {
        let mut sections = vec![HEADER.to_string(), USAGE_GUIDELINES.to_string()];
        sections.extend(
            self.docs
                .iter()
                .filter(|doc| !doc.is_blank())
                .map(|doc| format!("### {}\n\n{}", doc.title(), doc.content)),
        );
        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_missing_dir_yields_header_only() {
        let dir = TempDir::new().unwrap();
        let kb = KnowledgeBase::load(&dir.path().join("nope"));

        assert_eq!(kb.docs().len(), 3);
        assert!(kb.docs().iter().all(|d| d.content.is_empty()));
        assert_eq!(kb.format(), format!("{}\n\n{}", HEADER, USAGE_GUIDELINES));
    }

    #[test]
    fn test_format_orders_sections_and_skips_blank() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("permissions.md"), "# Permissions Guide\nAdmins only.").unwrap();
        std::fs::write(dir.path().join("export.md"), "## Exporting Data \nUse CSV.").unwrap();
        std::fs::write(dir.path().join("dashboard.md"), "  \n\n").unwrap();

        let formatted = KnowledgeBase::load(dir.path()).format();

        let expected = [
            HEADER.to_string(),
            USAGE_GUIDELINES.to_string(),
            "### Exporting Data\n\n## Exporting Data \nUse CSV.".to_string(),
            "### Permissions Guide\n\n# Permissions Guide\nAdmins only.".to_string(),
        ]
        .join("\n\n");
        assert_eq!(formatted, expected);
    }

    #[test]
    fn test_title_strips_hashes_and_spaces() {
        let doc = KnowledgeDoc {
            path: PathBuf::from("x.md"),
            content: "### Widgets ##\nbody".to_string(),
        };
        assert_eq!(doc.title(), "Widgets");
    }
}
