//! Template engine: parsing, FNV-1a fingerprinting, binding-discipline
//! argument resolution, pipe transforms, and format specifiers (§4.1).
//!
//! [`TemplateEngine::render`] is the single entry point the rest of the
//! crate calls: it strips leading `[tag]` segments, looks up (or parses and
//! caches) the remaining content template, binds arguments, and renders the
//! final message plus its bound properties.

pub mod cache;
pub mod fingerprint;
pub mod format_spec;
pub mod parser;
pub mod plan;
pub mod transforms;

pub use cache::TemplateCache;
pub use parser::{ParsedTemplate, Placeholder, Segment, Xform};
pub use plan::{Arg, Binding};

use crate::record::Property;

/// The result of rendering one log call's template against its arguments.
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    /// Tags stripped from the leading `[tag]...` segments of the raw template.
    pub tags: Vec<String>,
    /// The content template with tags removed — what gets fingerprinted,
    /// cached, and exposed as `@mt` in formatters.
    pub content_template: String,
    pub fingerprint: String,
    pub message: String,
    pub properties: Vec<Property>,
    pub binding: Binding,
    pub warnings: Vec<String>,
}

/// Owns the parsed-template cache and renders log calls against it.
pub struct TemplateEngine {
    cache: TemplateCache,
}

impl TemplateEngine {
    pub fn new(cache_capacity: usize) -> Self {
        Self { cache: TemplateCache::new(cache_capacity) }
    }

    /// Render `raw_template` (as passed by the caller, tags and all) against
    /// `args`, per the binding discipline of §4.1.
    pub fn render(&self, raw_template: &str, args: &[Arg]) -> RenderedTemplate {
        let (tags, content_template) = parser::strip_leading_tags(raw_template);
        let parsed = self.cache.get_or_parse(content_template);
        let fp = fingerprint::fingerprint(content_template);

        let (message, properties, binding, binding_warning) = plan::render(&parsed, args);

        let mut warnings = parsed.warnings.clone();
        if let Some(w) = binding_warning {
            warnings.push(w);
        }

        RenderedTemplate {
            tags,
            content_template: content_template.to_string(),
            fingerprint: fp,
            message,
            properties,
            binding,
            warnings,
        }
    }

    pub fn resize_cache(&self, new_capacity: usize) {
        self.cache.resize(new_capacity);
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(1024)
    }
}
