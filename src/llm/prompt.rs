//! Rewrite prompt construction.

/// Editorial instructions sent ahead of the raw news text.
const REWRITE_INSTRUCTIONS: &str = "তুমি একজন অভিজ্ঞ **বাংলা** নিউজ এডিটর।

⚠️ বাধ্যতামূলক নির্দেশনা:
- আউটপুট ১০০% বাংলায় হবে
- কোনো ইংরেজি শব্দ ব্যবহার করা যাবে না
- নিউজ স্টাইল হবে নিরপেক্ষ ও পেশাদার

কাঁচা নিউজটি নতুনভাবে রিরাইট করো:
- লেখা বড় করো
- ভাষা উন্নত করো
- plagiarism-safe
- তথ্য পরিবর্তন করা যাবে না

শুধু নিচের JSON দেবে:

";

/// Output shape the model must return, mirroring `ArticleRecord`.
const OUTPUT_SCHEMA: &str = r#"{
 "title": "",
 "content": "",
 "meta_title": "",
 "meta_description": "",
 "meta_keywords": [],
 "slug": "",
 "excerpt": ""
}"#;

/// Build the rewrite prompt, embedding the raw text verbatim.
pub fn build_rewrite_prompt(raw_text: &str) -> String {
    let mut prompt = String::with_capacity(
        REWRITE_INSTRUCTIONS.len() + OUTPUT_SCHEMA.len() + raw_text.len() + 32,
    );
    prompt.push_str(REWRITE_INSTRUCTIONS);
    prompt.push_str(OUTPUT_SCHEMA);
    prompt.push_str("\n\nনিউজ:\n");
    prompt.push_str(raw_text);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_text_verbatim_at_the_end() {
        let raw = "  পুলিশ আজ {একজনকে} গ্রেপ্তার করেছে।\n";
        let prompt = build_rewrite_prompt(raw);
        assert!(prompt.ends_with(raw));
    }

    #[test]
    fn prompt_lists_every_article_field() {
        let prompt = build_rewrite_prompt("x");
        for field in [
            "\"title\"",
            "\"content\"",
            "\"meta_title\"",
            "\"meta_description\"",
            "\"meta_keywords\"",
            "\"slug\"",
            "\"excerpt\"",
        ] {
            assert!(prompt.contains(field), "missing {field}");
        }
    }
}
