//! Pipeline and pagination tests against a mock backend.
//!
//! - `harness.rs`    - Mock backend, recording collaborators, client setup
//! - `pipeline.rs`   - URL resolution, headers, bodies
//! - `retry.rs`      - 401 handling: single retry, forced logout
//! - `errors.rs`     - Status classification carrying the response
//! - `account.rs`    - Account deletion ordering
//! - `content.rs`    - Profile, contributions, topic summaries
//! - `pagination.rs` - Single-flight fetching and termination

mod content;
pub(crate) mod harness;
mod pipeline;
