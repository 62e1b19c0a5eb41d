//! Authenticated access to the Hear Ye backend.
//!
//! - [`ApiClient::request`]: the authenticated request pipeline with a
//!   single silent re-authentication on 401
//! - [`RequestError`]: status classification carrying the failed response
//! - [`IncrementalList`]: cursor-driven, single-flight page accumulation
//! - [`JsonPageFetcher`]: adapts list endpoints to the page contract
//! - [`ApiClient::personal_details`] and friends: profile, contribution
//!   history and topic summaries, empty on failure

mod account;
mod client;
mod content;
mod error;
mod fetcher;
mod pagination;

pub use client::{ApiClient, Body, RequestOptions};
pub use content::{
    daily_contributions, DailyContribution, PersonalDetails, TopicSummary, VotedTopic,
};
pub use error::{ApiErrorKind, ApiResponse, RequestError, RequestResult};
pub use fetcher::JsonPageFetcher;
pub use pagination::{page_fn, FnPageFetcher, IncrementalList, Page, PageFetcher};

pub use reqwest::Method;

#[cfg(test)]
mod tests;
