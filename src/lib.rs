//! News relay: Telegram submissions rewritten for SEO and posted to WordPress.

pub mod app;
pub mod channels;
pub mod cms;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
