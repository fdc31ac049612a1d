use std::path::Path;
use tracing::{info, warn};

use crate::error::Result;

/// One find/replace rule from the glossary CSV.
#[derive(Debug, Clone)]
pub struct GlossaryEntry {
    pub find: String,
    pub replace: String,
    pub case_insensitive: bool,
}

/// Domain glossary loaded from a headerless `find,replace,flags` CSV.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
}

impl Glossary {
    /// Load the glossary. A missing file yields an empty glossary, not an
    /// error: the pipeline works without domain terms.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Glossary file {} not found, continuing without it", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut entries = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut fields = line.splitn(3, ',');
            let find = fields.next().unwrap_or("").trim().to_string();
            let replace = fields.next().unwrap_or("").trim().to_string();
            let flags = fields.next().unwrap_or("").trim().to_lowercase();
            if find.is_empty() {
                continue;
            }
            entries.push(GlossaryEntry {
                find,
                replace,
                case_insensitive: flags.contains('i'),
            });
        }

        info!("Loaded {} glossary entries from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.entries
    }

    /// Short all-uppercase entries (2-6 chars) usable as protected acronyms.
    /// Longer or mixed-case terms (e.g. product names) are excluded to avoid
    /// flooding the translator with placeholders.
    pub fn acronyms(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.find.as_str())
            .filter(|term| (2..=6).contains(&term.len()) && is_all_uppercase(term))
            .map(|term| term.to_string())
            .collect()
    }
}

fn is_all_uppercase(term: &str) -> bool {
    let mut has_alpha = false;
    for c in term.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    has_alpha
}
