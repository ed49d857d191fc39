use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Minimum number of lexicon hits for text to count as Spanish
pub const DEFAULT_MATCH_THRESHOLD: usize = 3;

/// Substring lexicon used to guess whether a title/description pair is Spanish.
///
/// This is containment matching, not tokenization: short entries such as `el`
/// match inside longer words. It is a cheap pre-filter, not a language detector.
#[derive(Debug, Clone)]
pub struct SpanishLexicon {
    entries: Vec<String>,
    threshold: usize,
}

impl SpanishLexicon {
    /// Create a lexicon with the built-in entries
    pub fn new() -> Self {
        let mut lexicon = Self {
            entries: Vec::new(),
            threshold: DEFAULT_MATCH_THRESHOLD,
        };
        lexicon.load_default_entries();
        lexicon
    }

    /// Load extra entries from a file, one per line; `#` starts a comment
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let mut lexicon = Self::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            lexicon.add_entry(line);
        }
        info!(
            "📚 Loaded Spanish lexicon from {} ({} entries)",
            path.as_ref().display(),
            lexicon.len()
        );
        Ok(lexicon)
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Add an entry, ignoring duplicates
    pub fn add_entry(&mut self, entry: &str) {
        let entry = entry.to_lowercase();
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lexicon entries contained in the lowercased `title description`
    pub fn count_matches(&self, title: &str, description: &str) -> usize {
        let text = format!("{} {}", title, description).to_lowercase();
        self.entries
            .iter()
            .filter(|entry| text.contains(entry.as_str()))
            .count()
    }

    pub fn is_likely_spanish(&self, title: &str, description: &str) -> bool {
        self.count_matches(title, description) >= self.threshold
    }

    fn load_default_entries(&mut self) {
        // Function words and very common vocabulary
        let common = [
            "el", "la", "los", "las", "de", "del", "en", "es", "por", "para", "que", "con",
            "como", "cómo", "más", "pero", "si", "tu", "tú", "vida", "éxito", "motivación",
            "ser", "estar", "hacer", "poder", "tiempo", "día", "mejor", "nunca", "siempre",
            "todo", "nada",
        ];

        // Motivation vocabulary
        let niche = [
            "superación", "mentalidad", "disciplina", "hábitos", "metas", "sueños", "triunfo",
            "fracaso", "esfuerzo", "perseverancia",
        ];

        // Inflectional endings
        let suffixes = ["ción", "mente", "ando", "iendo", "ado", "ido"];

        for entry in common.iter().chain(niche.iter()).chain(suffixes.iter()) {
            self.add_entry(entry);
        }
    }
}

impl Default for SpanishLexicon {
    fn default() -> Self {
        Self::new()
    }
}
