//! Deterministic last-resort article builder.
//!
//! Used when every rewrite provider fails. Pure and total: any input string,
//! including the empty one, yields a record with every field populated.

use chrono::{DateTime, Utc};

use crate::pipeline::types::{
    ArticleRecord, EXCERPT_MAX, META_DESCRIPTION_MAX, META_TITLE_MAX, normalize_whitespace,
    truncate_chars,
};

/// Bengali full stop (dari), the sentence terminator of the source text.
pub const SENTENCE_TERMINATOR: char = '।';

/// Title used when the input has no usable first sentence.
pub const DEFAULT_TITLE: &str = "আজকের সংবাদ";

/// Neutral closing line appended to fallback bodies.
pub const DISCLAIMER: &str = "উল্লেখ্য, সংশ্লিষ্ট ঘটনাটি স্থানীয়ভাবে আলোচনার সৃষ্টি করেছে।";

/// Keywords used when nothing better is known.
pub const DEFAULT_KEYWORDS: [&str; 4] = [
    "বাংলাদেশ",
    "আজকের খবর",
    "সর্বশেষ সংবাদ",
    "স্থানীয় সংবাদ",
];

const SLUG_PREFIX: &str = "news-";

/// Build a minimally valid article from raw text.
pub fn fallback_article(raw_text: &str, now: DateTime<Utc>) -> ArticleRecord {
    let clean = normalize_whitespace(raw_text);

    let first_sentence = clean
        .split(SENTENCE_TERMINATOR)
        .next()
        .unwrap_or_default()
        .trim();
    let title = if first_sentence.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        first_sentence.to_string()
    };

    let content = if clean.is_empty() {
        DISCLAIMER.to_string()
    } else {
        format!("{clean}\n\n{DISCLAIMER}")
    };

    // Empty input leaves nothing to summarise; the title stands in.
    let summary_source = if clean.is_empty() { &title } else { &clean };

    ArticleRecord {
        meta_title: truncate_chars(&title, META_TITLE_MAX),
        meta_description: truncate_chars(summary_source, META_DESCRIPTION_MAX),
        meta_keywords: default_keywords(),
        slug: fallback_slug(now),
        excerpt: truncate_chars(summary_source, EXCERPT_MAX),
        title,
        content,
    }
}

/// `news-<unix millis>` slug.
pub fn fallback_slug(now: DateTime<Utc>) -> String {
    format!("{SLUG_PREFIX}{}", now.timestamp_millis())
}

pub fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}
