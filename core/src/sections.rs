//! Section extraction for header-delimited planning documents
//!
//! A document is split on second-level headers (`## Title`). Everything else,
//! including `#` titles and `###` sub-headers, is body text. Extraction never
//! fails.

use std::collections::BTreeMap;

use serde::Serialize;

/// Header → body mapping for one document.
///
/// Bodies are trimmed and never empty: a header with nothing under it is not
/// recorded at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionMap {
    entries: BTreeMap<String, String>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document into its sections.
    pub fn parse(document: &str) -> Self {
        let mut map = Self::new();
        let mut current: Option<&str> = None;
        let mut body: Vec<&str> = Vec::new();

        for line in document.lines() {
            if let Some(title) = section_title(line) {
                if let Some(header) = current {
                    map.insert(header, &body.join("\n"));
                }
                current = Some(title);
                body.clear();
            } else if current.is_some() {
                body.push(line);
            }
        }

        if let Some(header) = current {
            map.insert(header, &body.join("\n"));
        }

        map
    }

    /// Insert a section; empty bodies are dropped and later headers replace
    /// earlier ones.
    pub fn insert(&mut self, header: &str, body: &str) {
        let header = header.trim();
        let body = body.trim();
        if header.is_empty() || body.is_empty() {
            return;
        }
        self.entries.insert(header.to_string(), body.to_string());
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.entries.get(header).map(String::as_str)
    }

    pub fn contains(&self, header: &str) -> bool {
        self.entries.contains_key(header)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(header, body)| (header.as_str(), body.as_str()))
    }

    /// All headers and bodies joined into one searchable blob.
    pub fn concatenated(&self) -> String {
        let mut out = String::new();
        for (header, body) in self.iter() {
            out.push_str(header);
            out.push('\n');
            out.push_str(body);
            out.push('\n');
        }
        out
    }
}

/// Title of a `## ` header line, if the line is one.
fn section_title(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("##")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let title = rest.trim();
    (!title.is_empty()).then_some(title)
}
