//! Turns fetched repositories into embeddable documents.
//!
//! Each repository yields one overview document plus one document per README
//! chunk. Document ids are stable across re-ingestion so upserts replace the
//! previous version of the same chunk.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use xxhash_rust::xxh3::xxh3_128;

use crate::github::client::GitHubRepo;

pub const CHUNK_SIZE: usize = 1000;
const TOP_LANGUAGES: usize = 5;

static HTML_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[(.*?)\]\(.*?\)").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(.*?)\]\(.*?\)").unwrap());
static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static CODE_FENCE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"```\w*\n").unwrap());
static PARAGRAPH_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// A document ready for embedding.
#[derive(Debug, Clone, Serialize)]
pub struct GithubDocument {
    pub id: String,
    pub text: String,
    pub metadata: Value,
}

/// 32 hex digits derived from `"<repo>_<type>_<index>"`.
pub fn document_id(repo_name: &str, doc_type: &str, index: usize) -> String {
    format!("{:032x}", xxh3_128(format!("{repo_name}_{doc_type}_{index}").as_bytes()))
}

pub fn build_documents(repos: &[GitHubRepo]) -> Vec<GithubDocument> {
    repos
        .iter()
        .flat_map(|repo| {
            std::iter::once(overview_document(repo)).chain(readme_documents(repo))
        })
        .collect()
}

pub fn overview_document(repo: &GitHubRepo) -> GithubDocument {
    let language_breakdown = language_breakdown(repo);

    let mut lines = vec![format!("Repository: {}", repo.name)];
    if let Some(description) = &repo.description {
        lines.push(format!("Description: {description}"));
    }
    if let Some(language) = &repo.language {
        lines.push(format!("Primary Language: {language}"));
    }
    if !language_breakdown.is_empty() {
        lines.push(format!("Languages: {}", language_breakdown.join(", ")));
    }
    if !repo.topics.is_empty() {
        lines.push(format!("Topics: {}", repo.topics.join(", ")));
    }
    lines.push(format!("Stars: {}, Forks: {}", repo.stars, repo.forks));
    if let Some(license) = &repo.license {
        lines.push(format!("License: {license}"));
    }
    if let Some(homepage) = &repo.homepage {
        lines.push(format!("Homepage: {homepage}"));
    }

    let mut language_names: Vec<&String> = repo.languages.keys().collect();
    language_names.sort();

    GithubDocument {
        id: document_id(&repo.name, "overview", 0),
        text: lines.join("\n"),
        metadata: json!({
            "type": "overview",
            "repo_name": repo.name,
            "repo_url": repo.url,
            "language": repo.language,
            "languages": language_names,
            "topics": repo.topics,
            "stars": repo.stars,
            "forks": repo.forks,
            "is_fork": repo.is_fork,
            "is_archived": repo.is_archived,
            "created_at": repo.created_at,
            "updated_at": repo.updated_at,
        }),
    }
}

/// Top languages by byte count, formatted as `"Rust (82.5%)"`.
fn language_breakdown(repo: &GitHubRepo) -> Vec<String> {
    let total: u64 = repo.languages.values().sum();
    if total == 0 {
        return vec![];
    }

    let mut languages: Vec<(&String, &u64)> = repo.languages.iter().collect();
    languages.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    languages
        .into_iter()
        .take(TOP_LANGUAGES)
        .map(|(name, bytes)| format!("{name} ({:.1}%)", *bytes as f64 / total as f64 * 100.0))
        .collect()
}

pub fn readme_documents(repo: &GitHubRepo) -> Vec<GithubDocument> {
    let Some(readme) = repo.readme.as_deref() else {
        return vec![];
    };

    let chunks = chunk_text(&clean_readme(readme), CHUNK_SIZE);
    let total_chunks = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| GithubDocument {
            id: document_id(&repo.name, "readme", i),
            text: format!("README from {}:\n\n{chunk}", repo.name),
            metadata: json!({
                "type": "readme",
                "repo_name": repo.name,
                "repo_url": repo.url,
                "language": repo.language,
                "topics": repo.topics,
                "stars": repo.stars,
                "chunk_index": i,
                "total_chunks": total_chunks,
            }),
        })
        .collect()
}

/// Strips markup from a README while keeping its readable text.
pub fn clean_readme(readme: &str) -> String {
    let text = HTML_COMMENT_RE.replace_all(readme, "");
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");
    let text = IMAGE_RE.replace_all(&text, "$1");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = HTML_TAG_RE.replace_all(&text, "");
    let text = CODE_FENCE_OPEN_RE.replace_all(&text, "\nCode:\n");
    text.replace("```", "").trim().to_string()
}

/// Splits text into chunks of at most `chunk_size` characters along paragraph
/// boundaries. Paragraphs longer than a chunk are split at sentence ends; a
/// single sentence longer than a chunk is kept whole.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for para in PARAGRAPH_BREAK_RE.split(text) {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }

        if char_len(para) > chunk_size {
            flush(&mut chunks, &mut current);
            for sentence in split_sentences(para) {
                if char_len(&current) + char_len(sentence) + 1 > chunk_size {
                    flush(&mut chunks, &mut current);
                }
                current.push_str(sentence);
                current.push(' ');
            }
            continue;
        }

        if char_len(&current) + char_len(para) + 2 > chunk_size {
            flush(&mut chunks, &mut current);
        }
        current.push_str(para);
        current.push_str("\n\n");
    }

    flush(&mut chunks, &mut current);
    chunks
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Splits after `.`, `!` or `?` when followed by whitespace.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            sentences.push(&text[start..i]);
            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = j + next.len_utf8();
                chars.next();
            }
            start = end;
            prev = None;
            continue;
        }
        prev = Some(c);
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn repo(name: &str) -> GitHubRepo {
        GitHubRepo {
            name: name.to_string(),
            url: format!("https://github.com/octo/{name}"),
            ..Default::default()
        }
    }

    #[test]
    fn test_document_id_is_stable_32_hex() {
        let a = document_id("api", "readme", 0);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, document_id("api", "readme", 0));
        assert_ne!(a, document_id("api", "readme", 1));
    }

    #[test]
    fn test_overview_omits_absent_fields() {
        let doc = overview_document(&repo("bare"));
        assert_eq!(doc.text, "Repository: bare\nStars: 0, Forks: 0");
        assert_eq!(doc.metadata["type"], "overview");
    }

    #[test]
    fn test_overview_language_percentages() {
        let mut r = repo("full");
        r.description = Some("A web service".to_string());
        r.language = Some("Rust".to_string());
        r.languages = HashMap::from([
            ("Rust".to_string(), 750),
            ("Shell".to_string(), 50),
            ("Python".to_string(), 200),
        ]);
        r.topics = vec!["axum".to_string(), "api".to_string()];
        r.license = Some("MIT License".to_string());

        let doc = overview_document(&r);
        assert!(doc.text.contains("Description: A web service"));
        assert!(doc.text.contains("Languages: Rust (75.0%), Python (20.0%), Shell (5.0%)"));
        assert!(doc.text.contains("Topics: axum, api"));
        assert!(doc.text.contains("License: MIT License"));
    }

    #[test]
    fn test_clean_readme() {
        let raw = "# Title\n<!-- hidden\ncomment -->\n\n\n\n![logo](img.png) See [docs](https://x.io).\n<b>bold</b>\n```rust\nfn main() {}\n```";
        let cleaned = clean_readme(raw);
        assert!(!cleaned.contains("hidden"));
        assert!(!cleaned.contains("\n\n\n"));
        assert!(cleaned.contains("logo See docs."));
        assert!(cleaned.contains("bold"));
        assert!(!cleaned.contains("<b>"));
        assert!(cleaned.contains("Code:\nfn main() {}"));
        assert!(!cleaned.contains("```"));
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(chunk_text("hello", 1000), vec!["hello"]);
        assert!(chunk_text("", 1000).is_empty());
    }

    #[test]
    fn test_chunks_respect_paragraphs_and_size() {
        let para = "word ".repeat(50);
        let text = vec![para.trim(); 10].join("\n\n");
        let chunks = chunk_text(&text, 1000);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 1000);
        }
    }

    #[test]
    fn test_long_paragraph_splits_at_sentences() {
        let sentence = format!("{}end.", "abc ".repeat(20));
        let para = vec![sentence.as_str(); 30].join(" ");
        let chunks = chunk_text(&para, 300);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.ends_with("end."));
            assert!(char_len(chunk) <= 300);
        }
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("One. Two!  Three? four"),
            vec!["One.", "Two!", "Three?", "four"]
        );
        assert_eq!(split_sentences("v1.2 is out"), vec!["v1.2 is out"]);
    }

    #[test]
    fn test_readme_documents_prefix_and_metadata() {
        let mut r = repo("api");
        r.readme = Some("Fast API server.".to_string());
        let docs = readme_documents(&r);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "README from api:\n\nFast API server.");
        assert_eq!(docs[0].metadata["chunk_index"], 0);
        assert_eq!(docs[0].metadata["total_chunks"], 1);

        let all = build_documents(&[r, repo("empty")]);
        assert_eq!(all.len(), 3);
    }
}
