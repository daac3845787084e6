// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Case-variant replacement rule
//!
//! A rule is a fixed set of literal `(pattern, replacement)` pairs. Each
//! casing of the target word is its own pair, so `"Yale"`, `"YALE"` and
//! `"yale"` map to `"Fale"`, `"FALE"` and `"fale"` while `"YaLe"` is left
//! alone.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while building a [`ReplacementRule`]
#[derive(Debug, Error)]
pub enum RuleError {
    /// A pattern was the empty string
    #[error("Replacement pattern cannot be empty")]
    EmptyPattern,

    /// The same pattern was listed twice
    #[error("Duplicate replacement pattern: {0}")]
    DuplicatePattern(String),

    /// The combined matcher could not be compiled
    #[error("Failed to compile replacement matcher: {0}")]
    Matcher(#[from] regex::Error),
}

/// Immutable set of literal replacements applied to text payloads
#[derive(Debug, Clone)]
pub struct ReplacementRule {
    pairs: Vec<(String, String)>,
    lookup: HashMap<String, String>,
    matcher: Option<Regex>,
}

impl ReplacementRule {
    /// Build a rule from explicit `(pattern, replacement)` pairs
    ///
    /// Patterns are matched literally. When two patterns can start at the
    /// same position the longer one wins.
    pub fn new<I, P, R>(pairs: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<String>,
        R: Into<String>,
    {
        let pairs: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(p, r)| (p.into(), r.into()))
            .collect();

        let mut lookup = HashMap::with_capacity(pairs.len());
        for (pattern, replacement) in &pairs {
            if pattern.is_empty() {
                return Err(RuleError::EmptyPattern);
            }
            if lookup
                .insert(pattern.clone(), replacement.clone())
                .is_some()
            {
                return Err(RuleError::DuplicatePattern(pattern.clone()));
            }
        }

        // Alternation is leftmost-first, so listing longer patterns first
        // yields longest-match at each position.
        let mut ordered: Vec<&str> = pairs.iter().map(|(p, _)| p.as_str()).collect();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()));
        let alternation = ordered
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");

        let matcher = if alternation.is_empty() {
            None
        } else {
            Some(Regex::new(&alternation)?)
        };

        Ok(Self {
            pairs,
            lookup,
            matcher,
        })
    }

    /// Derive the tracked casings of one word pair
    ///
    /// Produces the pair as written, the upper-case pair and the lower-case
    /// pair. Casings that coincide are collapsed.
    pub fn case_variants(target: &str, replacement: &str) -> Result<Self, RuleError> {
        let candidates = [
            (target.to_string(), replacement.to_string()),
            (target.to_uppercase(), replacement.to_uppercase()),
            (target.to_lowercase(), replacement.to_lowercase()),
        ];

        let mut pairs: Vec<(String, String)> = Vec::with_capacity(candidates.len());
        for (pattern, replacement) in candidates {
            if !pairs.iter().any(|(p, _)| *p == pattern) {
                pairs.push((pattern, replacement));
            }
        }

        Self::new(pairs)
    }

    /// Apply the rule to a text payload
    ///
    /// Returns the input borrowed, byte-identical, when nothing matched.
    pub fn rewrite_text<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let Some(matcher) = &self.matcher else {
            return Cow::Borrowed(text);
        };
        if text.is_empty() {
            return Cow::Borrowed(text);
        }

        matcher.replace_all(text, |caps: &Captures<'_>| {
            let found = &caps[0];
            self.lookup
                .get(found)
                .cloned()
                .unwrap_or_else(|| found.to_string())
        })
    }

    /// The configured pairs, in declaration order
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}
