//! Semantic search retrieval with presigned document links.
//!
//! A query runs against one of the search services, and the matching stage
//! files are then listed with presigned URLs. Hits are joined to the
//! listing on relative path so every cited document carries a link.

use crate::types::{DocumentRef, RetrievedContext};
use assist_core::config::{SearchConfig, SearchServiceConfig};
use assist_core::AppResult;
use assist_platform::{PlatformClient, SearchRequest};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const CHUNK_COLUMN: &str = "CHUNK";
const PATH_COLUMN: &str = "RELATIVE_PATH";

/// Which search service to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Transcripts,
    Faq,
}

impl SearchSource {
    pub fn service_config<'a>(&self, config: &'a SearchConfig) -> &'a SearchServiceConfig {
        match self {
            Self::Transcripts => &config.transcripts,
            Self::Faq => &config.faq,
        }
    }
}

/// A retrieved passage and the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub path: String,
}

/// Numbered context blocks embedded into the answer prompt.
pub fn format_context(chunks: &[Chunk]) -> String {
    let mut context = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let n = i + 1;
        context.push_str(&format!(
            "\n###\nBeginning of Document {n}\nDocument Name: {}\nContent: {}\nEnd of Document {n}\n####\n",
            chunk.path, chunk.text
        ));
    }
    context.replace('\'', "")
}

/// Statement listing stage files under `path_filter` with presigned URLs.
pub fn presigned_url_sql(stage_ref: &str, service: &SearchServiceConfig) -> String {
    format!(
        "SELECT get_presigned_URL({stage}, RELATIVE_PATH, {expiry}) AS URL_LINK, RELATIVE_PATH \
         FROM directory({stage}) WHERE RELATIVE_PATH LIKE '%{filter}%'",
        stage = stage_ref,
        expiry = service.url_expiry_seconds,
        filter = service.path_filter,
    )
}

/// Lower-case the directory prefix of a stage path.
///
/// The search index stores paths with a lower-case prefix while the
/// directory listing keeps the stage's original case.
pub fn normalize_path(path: &str, path_filter: &str) -> String {
    let prefix = format!("{}/", path_filter);
    match path.strip_prefix(&prefix) {
        Some(rest) => format!("{}/{}", path_filter.to_lowercase(), rest),
        None => path.to_string(),
    }
}

/// Restore the upper-case directory prefix for display.
pub fn display_path(path: &str, path_filter: &str) -> String {
    let prefix = format!("{}/", path_filter.to_lowercase());
    match path.strip_prefix(&prefix) {
        Some(rest) => format!("{}/{}", path_filter, rest),
        None => path.to_string(),
    }
}

/// Inner join of hits and URLs on relative path, keeping hit order and
/// dropping repeated documents.
pub fn join_documents(chunks: &[Chunk], urls: &HashMap<String, String>) -> Vec<DocumentRef> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .filter_map(|chunk| {
            let url = urls.get(&chunk.path)?;
            seen.insert(chunk.path.clone()).then(|| DocumentRef {
                path: chunk.path.clone(),
                url: url.clone(),
            })
        })
        .collect()
}

/// Run a search and resolve the cited documents.
pub async fn retrieve(
    platform: &PlatformClient,
    search: &SearchConfig,
    stage_ref: &str,
    source: SearchSource,
    question: &str,
) -> AppResult<RetrievedContext> {
    let service = source.service_config(search);
    let request = SearchRequest::new(question, &[CHUNK_COLUMN, PATH_COLUMN], service.limit);

    let hits = platform.search(&service.service, &request).await?;
    let chunks: Vec<Chunk> = hits
        .iter()
        .filter_map(|hit| {
            Some(Chunk {
                text: hit.get(CHUNK_COLUMN)?,
                path: hit.get(PATH_COLUMN)?,
            })
        })
        .collect();
    tracing::debug!("{} returned {} chunks", service.service, chunks.len());

    if chunks.is_empty() {
        return Ok(RetrievedContext::default());
    }

    let listing = platform
        .execute(&presigned_url_sql(stage_ref, service), &[])
        .await?;

    let mut urls = HashMap::new();
    for row in 0..listing.len() {
        if let (Some(url), Some(path)) = (listing.value(row, "URL_LINK"), listing.value(row, PATH_COLUMN)) {
            urls.entry(normalize_path(path, &service.path_filter))
                .or_insert_with(|| url.to_string());
        }
    }

    let mut documents = join_documents(&chunks, &urls);
    if source == SearchSource::Transcripts {
        for doc in &mut documents {
            doc.path = display_path(&doc.path, &service.path_filter);
        }
    }
    tracing::debug!("Resolved {} documents", documents.len());

    Ok(RetrievedContext {
        context: format_context(&chunks),
        documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, path: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            path: path.to_string(),
        }
    }

    #[test]
    fn test_format_context_numbers_blocks_and_strips_quotes() {
        let context = format_context(&[
            chunk("Member's claim was delayed", "call_recordings/a.json"),
            chunk("Second", "call_recordings/b.json"),
        ]);

        assert!(context.contains("Beginning of Document 1\nDocument Name: call_recordings/a.json\nContent: Members claim was delayed\nEnd of Document 1"));
        assert!(context.contains("Beginning of Document 2"));
        assert!(!context.contains('\''));
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_normalize_and_display_path() {
        assert_eq!(
            normalize_path("CALL_RECORDINGS/x.json", "CALL_RECORDINGS"),
            "call_recordings/x.json"
        );
        assert_eq!(normalize_path("FAQ/plan.pdf", "FAQ"), "faq/plan.pdf");
        assert_eq!(normalize_path("OTHER/x", "FAQ"), "OTHER/x");
        assert_eq!(
            display_path("call_recordings/x.json", "CALL_RECORDINGS"),
            "CALL_RECORDINGS/x.json"
        );
    }

    #[test]
    fn test_join_documents_is_inner_and_deduplicated() {
        let chunks = vec![
            chunk("a1", "faq/a.pdf"),
            chunk("b", "faq/b.pdf"),
            chunk("a2", "faq/a.pdf"),
            chunk("c", "faq/c.pdf"),
        ];
        let urls = HashMap::from([
            ("faq/a.pdf".to_string(), "https://u/a".to_string()),
            ("faq/c.pdf".to_string(), "https://u/c".to_string()),
        ]);

        let docs = join_documents(&chunks, &urls);
        assert_eq!(
            docs,
            vec![
                DocumentRef {
                    path: "faq/a.pdf".to_string(),
                    url: "https://u/a".to_string()
                },
                DocumentRef {
                    path: "faq/c.pdf".to_string(),
                    url: "https://u/c".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_presigned_url_sql() {
        let config = SearchConfig::default();
        let sql = presigned_url_sql("@DB.S.STAGE", &config.transcripts);
        assert_eq!(
            sql,
            "SELECT get_presigned_URL(@DB.S.STAGE, RELATIVE_PATH, 360) AS URL_LINK, RELATIVE_PATH FROM directory(@DB.S.STAGE) WHERE RELATIVE_PATH LIKE '%CALL_RECORDINGS%'"
        );
    }
}
