//! News rewrite-and-publish pipeline.
//!
//! Every accepted submission flows through:
//! 1. `SeoGenerator::generate()` — provider chain, terminated by `fallback_article()`
//! 2. `Classifier::classify()` — ordered keyword rules, no LLM
//! 3. `DuplicateGuard` and `PublishGateway` in `cms` — the only side effects
//!
//! `RequestHandler` ties the steps together and sends the acknowledgment.

pub mod classifier;
pub mod extract;
pub mod fallback;
pub mod handler;
pub mod orchestrator;
pub mod types;

pub use handler::{HandleOutcome, HandlerDeps, RequestHandler};
pub use orchestrator::{ScriptPolicy, SeoGenerator};
