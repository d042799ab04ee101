//! Detection rule set.
//!
//! Rules are loaded once from configuration, normalized, and passed to the
//! classifier at construction time. They are read-only during a run.

use std::collections::HashSet;

/// Normalized detection rules.
///
/// All entries are lowercased at construction. Empty keywords are dropped so
/// they cannot match every message; extensions are guaranteed to carry the
/// leading dot.
#[derive(Debug, Clone, Default)]
pub struct DetectionRules {
    keywords: Vec<String>,
    whitelist_domains: HashSet<String>,
    dangerous_extensions: HashSet<String>,
}

impl DetectionRules {
    /// Builds a rule set from raw configuration lists.
    pub fn new<K, W, E>(keywords: K, whitelist_domains: W, dangerous_extensions: E) -> Self
    where
        K: IntoIterator<Item = String>,
        W: IntoIterator<Item = String>,
        E: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let keywords = keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .filter(|k| seen.insert(k.clone()))
            .collect();

        let whitelist_domains = whitelist_domains
            .into_iter()
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        let dangerous_extensions = dangerous_extensions
            .into_iter()
            .map(|e| {
                let e = e.trim().to_lowercase();
                if e.starts_with('.') {
                    e
                } else {
                    format!(".{}", e)
                }
            })
            .filter(|e| e.len() > 1)
            .collect();

        Self {
            keywords,
            whitelist_domains,
            dangerous_extensions,
        }
    }

    /// Lowercased keywords, in configuration order.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns whether a sender domain is whitelisted (exact match).
    pub fn is_whitelisted(&self, sender_domain: &str) -> bool {
        !sender_domain.is_empty()
            && self
                .whitelist_domains
                .contains(&sender_domain.to_lowercase())
    }

    /// Returns whether an extension (including the leading dot) is dangerous.
    pub fn is_dangerous_extension(&self, extension: &str) -> bool {
        self.dangerous_extensions
            .contains(&extension.to_lowercase())
    }
}
