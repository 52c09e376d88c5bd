use crate::error::{ConciergeError, Result};
use crate::llm::tools::{LlmTool, ToolArguments, ToolDescriptor, ToolName};
use async_trait::async_trait;
use serde_json::json;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const MAX_MATCHING_LINES: usize = 10;

/// The winery's business information, read once at startup.
#[derive(Debug)]
pub struct KnowledgeDocument {
    content: String,
    source: PathBuf,
}

impl KnowledgeDocument {
    /// Read the document from disk.
    ///
    /// A missing, unreadable, or blank file is a configuration error: the concierge
    /// must not start without it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConciergeError::ConfigError(format!(
                "cannot read knowledge document {}: {}",
                path.display(),
                e
            ))
        })?;

        let document = Self::from_text(content, path)?;
        info!(
            path = %path.display(),
            bytes = document.len(),
            "Loaded knowledge document"
        );
        Ok(document)
    }

    pub fn from_text(content: impl Into<String>, source: impl Into<PathBuf>) -> Result<Self> {
        let content = content.into();
        let source = source.into();

        if content.trim().is_empty() {
            return Err(ConciergeError::ConfigError(format!(
                "knowledge document {} is empty",
                source.display()
            )));
        }

        Ok(Self { content, source })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Up to ten lines containing `query`, case-insensitively.
    ///
    /// A blank query, or one no line contains, yields the whole document so the model
    /// always has the business context to work from.
    pub fn lookup(&self, query: &str) -> Cow<'_, str> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Cow::Borrowed(&self.content);
        }

        let matching: Vec<&str> = self
            .content
            .lines()
            .filter(|line| line.to_lowercase().contains(&query))
            .take(MAX_MATCHING_LINES)
            .collect();

        if matching.is_empty() {
            Cow::Borrowed(&self.content)
        } else {
            Cow::Owned(matching.join("\n"))
        }
    }
}

/// Tool exposing the knowledge document to the reasoning component.
#[derive(Clone)]
pub struct KnowledgeLookupTool {
    document: Arc<KnowledgeDocument>,
}

impl KnowledgeLookupTool {
    pub fn new(document: Arc<KnowledgeDocument>) -> Self {
        Self { document }
    }
}

#[async_trait]
impl LlmTool for KnowledgeLookupTool {
    fn name(&self) -> ToolName {
        ToolName::KnowledgeLookup
    }

    async fn run(&self, args: &ToolArguments) -> Result<String> {
        let query = args.get("query").map(String::as_str).unwrap_or("");
        let text = self.document.lookup(query);
        debug!(query = query, bytes = text.len(), "Knowledge lookup");
        Ok(text.into_owned())
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::function(
            self.name(),
            "Get information about the winery: our wines and prices, tasting notes, tasting room hours, reservations, events and experiences. Leave the query empty to get everything.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Optional keyword to narrow the lookup, e.g. 'Cabernet' or 'hours'"
                    }
                },
                "required": []
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const WINE_LIST: &str = "Napa Valley Premium Winery\n\
        Estate Chardonnay 2022 - $38\n\
        Reserve Cabernet Sauvignon 2019 - $125\n\
        Pinot Noir 2021 - $54\n\
        Tasting room hours: 10am - 6pm daily";

    fn document() -> Arc<KnowledgeDocument> {
        Arc::new(KnowledgeDocument::from_text(WINE_LIST, "wine_business_info.txt").unwrap())
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", WINE_LIST).unwrap();

        let doc = KnowledgeDocument::load(file.path()).unwrap();

        assert_eq!(doc.content(), WINE_LIST);
        assert_eq!(doc.source(), file.path());
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = KnowledgeDocument::load(dir.path().join("missing.txt"));

        assert!(matches!(result, Err(ConciergeError::ConfigError(_))));
    }

    #[test]
    fn test_load_blank_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "   \n\n").unwrap();

        let result = KnowledgeDocument::load(file.path());

        match result {
            Err(ConciergeError::ConfigError(msg)) => assert!(msg.contains("empty")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_blank_query_returns_everything() {
        let doc = document();
        assert_eq!(doc.lookup("  "), WINE_LIST);
    }

    #[test]
    fn test_lookup_filters_case_insensitively() {
        let doc = document();
        assert_eq!(doc.lookup("CABERNET"), "Reserve Cabernet Sauvignon 2019 - $125");
    }

    #[test]
    fn test_lookup_caps_matching_lines() {
        let text: String = (0..20).map(|i| format!("Merlot vintage {}\n", i)).collect();
        let doc = KnowledgeDocument::from_text(text, "merlot.txt").unwrap();

        assert_eq!(doc.lookup("merlot").lines().count(), MAX_MATCHING_LINES);
    }

    #[test]
    fn test_lookup_without_match_returns_everything() {
        let doc = document();
        assert_eq!(doc.lookup("What's your most expensive wine?"), WINE_LIST);
    }

    #[tokio::test]
    async fn test_tool_run() {
        let tool = KnowledgeLookupTool::new(document());
        let mut args = ToolArguments::new();
        args.insert("query".to_string(), "hours".to_string());

        let text = tool.run(&args).await.unwrap();

        assert_eq!(text, "Tasting room hours: 10am - 6pm daily");
    }

    #[tokio::test]
    async fn test_tool_run_without_query() {
        let tool = KnowledgeLookupTool::new(document());
        let text = tool.run(&ToolArguments::new()).await.unwrap();
        assert_eq!(text, WINE_LIST);
    }

    #[test]
    fn test_descriptor() {
        let tool = KnowledgeLookupTool::new(document());
        let descriptor = tool.descriptor();

        assert_eq!(descriptor.function.name, "knowledge_lookup");
        assert!(descriptor.function.parameters["properties"]["query"].is_object());
    }
}
