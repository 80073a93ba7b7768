//! Orchestration of the bot: building the chain from fetched posts and
//! publishing generated ones.
//!
//! The handlers are the only code that talks to collaborators (blog clients,
//! analyzer, store). Retry and fallback policies live here, never in the chain.

/// Fetch → analyze → train → save.
pub mod build;

/// Load → generate (bounded retries) → publish.
pub mod post;

/// Rebuild-if-expired, then post.
pub mod run;

pub use build::{BuildOptions, build_chain};
pub use post::{MAX_ATTEMPTS, PostOptions, generate_and_post, generate_text, load_chain};
pub use run::{is_expired, run};
