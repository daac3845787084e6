// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTML text rewriting
//!
//! Parses a page with the same lenient HTML5 parser browsers use, rewrites
//! the payload of every visible text node and serializes the tree again.
//! Attribute values, comments, tag names and anything under a skipped
//! element (`<script>`, `<style>`, ...) come out exactly as they went in.

use ego_tree::{NodeId, NodeRef};
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use scraper::{Html, Node, Selector};
use std::borrow::Cow;
use std::collections::HashSet;

use super::config::RewriteConfig;
use super::rule::{ReplacementRule, RuleError};

/// Element names whose subtree is never rewritten by default
pub const DEFAULT_SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Set of element names whose entire subtree is left untouched
#[derive(Debug, Clone)]
pub struct SkipSet {
    tags: HashSet<String>,
}

impl SkipSet {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|t| t.as_ref().trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Whether an element with this local name starts a skipped subtree
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for SkipSet {
    fn default() -> Self {
        Self::new(DEFAULT_SKIP_TAGS)
    }
}

/// Output of [`Rewriter::rewrite_document`]
#[derive(Debug, Clone, PartialEq)]
pub struct RewrittenPage {
    /// Serialized HTML after rewriting
    pub html: String,
    /// Text of the first `<title>` element, trimmed, after rewriting
    pub title: Option<String>,
}

/// Stateless HTML text rewriter
///
/// Holds only the immutable rule and skip-set, so one instance can be
/// shared across any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct Rewriter {
    rule: ReplacementRule,
    skip: SkipSet,
}

impl Rewriter {
    pub fn new(rule: ReplacementRule, skip: SkipSet) -> Self {
        Self { rule, skip }
    }

    /// Build the rewriter described by the process configuration
    pub fn from_config(config: &RewriteConfig) -> Result<Self, RuleError> {
        let rule = ReplacementRule::case_variants(&config.target, &config.replacement)?;
        Ok(Self::new(rule, SkipSet::new(&config.skip_tags)))
    }

    pub fn rule(&self) -> &ReplacementRule {
        &self.rule
    }

    pub fn skip_set(&self) -> &SkipSet {
        &self.skip
    }

    /// Rewrite the visible text of an HTML document
    ///
    /// Never fails: malformed markup is recovered the way a browser would.
    pub fn rewrite(&self, html: &str) -> String {
        let mut document = Html::parse_document(html);
        self.apply(&mut document);
        to_html(&document)
    }

    /// Rewrite a document and report its (rewritten) title
    pub fn rewrite_document(&self, html: &str) -> RewrittenPage {
        let mut document = Html::parse_document(html);
        self.apply(&mut document);

        RewrittenPage {
            title: extract_title(&document),
            html: to_html(&document),
        }
    }

    fn apply(&self, document: &mut Html) {
        let edits = self.collect_edits(document.tree.root());

        for (id, rewritten) in edits {
            if let Some(mut node) = document.tree.get_mut(id) {
                if let Node::Text(text) = node.value() {
                    text.text.clear();
                    text.text.push_slice(rewritten.as_str());
                }
            }
        }
    }

    /// Pre-order walk that records the new payload of every text node that
    /// changes. Skipped subtrees are never entered.
    fn collect_edits(&self, root: NodeRef<'_, Node>) -> Vec<(NodeId, String)> {
        let mut edits = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            match node.value() {
                Node::Element(element) => {
                    if self.skip.contains(element.name()) {
                        continue;
                    }
                    push_children(&mut stack, node);
                }
                Node::Text(text) => {
                    if let Cow::Owned(rewritten) = self.rule.rewrite_text(&text.text) {
                        edits.push((node.id(), rewritten));
                    }
                }
                Node::Document | Node::Fragment => push_children(&mut stack, node),
                Node::Comment(_) | Node::Doctype(_) | Node::ProcessingInstruction(_) => {}
            }
        }

        edits
    }
}

// Reversed so the stack pops children in document order.
fn push_children<'a>(stack: &mut Vec<NodeRef<'a, Node>>, node: NodeRef<'a, Node>) {
    let start = stack.len();
    stack.extend(node.children());
    stack[start..].reverse();
}

/// Serialize with scripting enabled, matching how the parser read the page.
/// `<noscript>` contents were parsed as raw text and must be written back
/// unescaped.
fn to_html(document: &Html) -> String {
    let opts = SerializeOpts {
        scripting_enabled: true,
        traversal_scope: TraversalScope::IncludeNode,
        create_missing_parent: false,
    };

    let mut buf = Vec::new();
    if serialize(&mut buf, document, opts).is_err() {
        return document.html();
    }

    String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}
