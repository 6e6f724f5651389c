//! Keyword classifier mapping article text to a content category.
//!
//! Categories are evaluated in declared order and the first one with any
//! keyword present (literal, case-sensitive substring) wins. Tokenizing
//! Bengali reliably is out of reach, so there is no stemming.

use tracing::debug;

/// Label used when no category matches.
pub const DEFAULT_CATEGORY: &str = "বাংলাদেশ";

/// A content category and its trigger keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub label: String,
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// First keyword of this category found in `text`.
    pub fn matched_keyword(&self, text: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| text.contains(k.as_str()))
            .map(String::as_str)
    }
}

/// Ordered keyword classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    categories: Vec<Category>,
    default_label: String,
}

impl Classifier {
    /// Classifier with the newsroom's category set.
    pub fn default_categories() -> Self {
        let categories = vec![
            Category::new(
                "রাজনীতি",
                &["বিএনপি", "আওয়ামী", "নির্বাচন", "মন্ত্রী", "সংসদ", "রাজনীতি"],
            ),
            Category::new(
                "অপরাধ",
                &["খুন", "মামলা", "গ্রেপ্তার", "পুলিশ", "র\u{200d}্যাব"],
            ),
            Category::new("খেলা", &["খেলা", "ম্যাচ", "ক্রিকেট", "ফুটবল"]),
            Category::new("চাকরি", &["নিয়োগ", "চাকরি", "পরীক্ষা"]),
            Category::new("বিনোদন", &["চলচ্চিত্র", "নাটক", "অভিনেতা", "গান"]),
            Category::new("বাণিজ্য", &["বাজার", "দাম", "ব্যবসা", "অর্থনীতি"]),
            Category::new("জীবনযাপন", &["স্বাস্থ্য", "শিক্ষা", "জীবনযাপন"]),
            Category::new("বিশ্ব", &["আন্তর্জাতিক", "বিদেশ", "বিশ্ব"]),
            Category::new("মতামত", &["মতামত", "বিশ্লেষণ"]),
        ];

        Self {
            categories,
            default_label: DEFAULT_CATEGORY.into(),
        }
    }

    /// Classifier over arbitrary categories (for testing and custom sets).
    pub fn new(categories: Vec<Category>, default_label: &str) -> Self {
        Self {
            categories,
            default_label: default_label.into(),
        }
    }

    /// Categories in priority order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Label of the first category whose keywords appear in `text`.
    pub fn classify(&self, text: &str) -> &str {
        for category in &self.categories {
            if let Some(keyword) = category.matched_keyword(text) {
                debug!(
                    category = %category.label,
                    keyword = %keyword,
                    "Text matched category keyword"
                );
                return &category.label;
            }
        }

        debug!(category = %self.default_label, "No category keyword matched");
        &self.default_label
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::default_categories()
    }
}
