//! Topic, voting and registration commands.

use super::district::DistrictCode;
use super::Context;
use crate::output::{self, OutputFormat};
use anyhow::{Context as _, Result};
use hearye_api::{IncrementalList, JsonPageFetcher, Method, PageFetcher, RequestOptions};
use hearye_auth::Modal;
use hearye_storage::StorageKeys;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

const TOPICS_PATH: &str = "content/topic/";
const VOTE_PATH: &str = "voting/vote/";
const FINISH_REGISTRATION_PATH: &str = "users/v1/finish-registration/";

const INVALID_DISTRICT_TITLE: &str = "Invalid district";
const INVALID_DISTRICT_MESSAGE: &str =
    "The backend rejected this district. If your state was just redrawn, you may need to wait.";

/// Send an arbitrary request through the authenticated pipeline.
pub async fn request(
    ctx: &Context,
    method: &str,
    path: &str,
    body: Option<&str>,
    anonymous: bool,
) -> Result<()> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method '{}'", method))?;

    let mut options = RequestOptions::new();
    if anonymous {
        options = options.anonymous();
    }
    if let Some(body) = body {
        // JSON when it parses, otherwise sent verbatim
        options = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => options.json(&value)?,
            Err(_) => options.text(body),
        };
    }

    let response = ctx.client.request(path, method, options).await?;
    let status = response.status();
    let text = response.text().await?;

    match ctx.format {
        OutputFormat::Text => {
            eprintln!("HTTP {}", status);
            match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                Err(_) => println!("{}", text),
            }
        }
        OutputFormat::Json => {
            let body = serde_json::from_str::<serde_json::Value>(&text)
                .unwrap_or(serde_json::Value::String(text));
            println!("{}", json!({ "status": status.as_u16(), "body": body }));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Topic {
    pub id: i64,
    #[serde(default)]
    pub title: String,
}

/// Load up to `pages` pages of topics, stopping early once the list runs out.
pub(crate) async fn load_topics(ctx: &Context, pages: usize) -> IncrementalList<Topic> {
    let fetcher: Arc<dyn PageFetcher<Topic>> = Arc::new(JsonPageFetcher::new(ctx.client.clone()));
    let list = IncrementalList::new(TOPICS_PATH, fetcher);
    list.settled().await;

    for _ in 1..pages {
        if !list.fetch_more() {
            break;
        }
        list.settled().await;
    }
    list
}

/// List topics, loading up to `pages` pages.
pub async fn topics(ctx: &Context, pages: usize) -> Result<()> {
    let list = load_topics(ctx, pages).await;

    let topics = list.items();
    output::print(&topics, &ctx.format, |topics| {
        if topics.is_empty() {
            println!("No topics.");
        }
        for topic in topics {
            println!("  {:>6}  {}", topic.id, topic.title);
        }
        if !list.is_exhausted() {
            println!("  ... more available (use --pages)");
        }
    });
    Ok(())
}

/// Show one topic with its summary.
pub async fn topic(ctx: &Context, id: i64) -> Result<()> {
    let Some(summary) = ctx.client.topic_summary(id).await else {
        output::print_error(&format!("No summary available for topic {}", id), &ctx.format);
        return Ok(());
    };

    output::print(&summary, &ctx.format, |summary| {
        output::print_heading(&summary.title);
        if summary.content.is_empty() {
            println!("No summary yet.");
        } else {
            println!("{}", strip_tags(&summary.content));
        }
    });
    Ok(())
}

/// Drop markup from an HTML summary for terminal display.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cast a vote on a topic.
pub async fn vote(ctx: &Context, topic: i64, vote: i64) -> Result<()> {
    ctx.client
        .post(VOTE_PATH, &json!({ "topic": topic, "vote": vote }))
        .await?;
    output::print_success(&format!("Vote recorded for topic {}", topic), &ctx.format);
    Ok(())
}

/// Record the user's district and finish registration.
pub async fn register_district(ctx: &Context, raw: &str) -> Result<()> {
    let district = DistrictCode::parse(raw)?;
    ctx.storage().set_object(StorageKeys::DISTRICT, &district)?;

    let result = ctx
        .client
        .post(
            FINISH_REGISTRATION_PATH,
            &json!({ "state": district.state, "district": district.district }),
        )
        .await;

    match result {
        Ok(_) => {
            ctx.session.navigator().dismiss_modal(Modal::SelectDistrict);
            output::print_success(&format!("District set to {}", district.code()), &ctx.format);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, district = %district.code(), "Registration rejected");
            ctx.session
                .alerter()
                .alert(INVALID_DISTRICT_TITLE, INVALID_DISTRICT_MESSAGE);
            Err(e.into())
        }
    }
}
