//! Profile, contribution history and topic summaries.
//!
//! These reads never fail: a rejected request or an unexpected body is
//! logged and the caller gets an empty result, so screens render blank
//! instead of erroring.

use crate::{ApiClient, RequestResult};
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use url::Url;

const PERSONAL_PATH: &str = "users/personal/";
const CONTRIBUTIONS_PATH: &str = "users/contribution/";
const DAY_DETAIL_PATH: &str = "users/contribution/day-detail/";
const TOPIC_PATH: &str = "content/topic/";

/// The signed-in user's account details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDetails {
    /// When the account was created, RFC 3339.
    #[serde(default)]
    pub joined: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A topic the user voted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotedTopic {
    pub id: i64,
    #[serde(default)]
    pub vote: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created: Option<String>,
}

/// Votes cast on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyContribution {
    pub date: NaiveDate,
    pub count: usize,
}

/// A topic with its rendered summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// Summary body as HTML; empty when the topic has none.
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Bucket vote timestamps into per-day counts in `tz`, oldest day first.
pub fn daily_contributions<Tz: TimeZone>(
    timestamps: &[DateTime<Utc>],
    tz: &Tz,
) -> Vec<DailyContribution> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for ts in timestamps {
        *days.entry(ts.with_timezone(tz).date_naive()).or_default() += 1;
    }
    days.into_iter()
        .map(|(date, count)| DailyContribution { date, count })
        .collect()
}

impl ApiClient {
    /// Details of the signed-in user; `None` when they cannot be loaded.
    pub async fn personal_details(&self) -> Option<PersonalDetails> {
        self.get_json(PERSONAL_PATH)
            .await
            .map_err(|e| warn!(error = %e, "Could not load personal details"))
            .ok()
    }

    /// Timestamps of every vote cast between `start` and `end`.
    pub async fn contributions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<DateTime<Utc>> {
        let result = self.resolve_url(CONTRIBUTIONS_PATH).map(|mut url| {
            url.query_pairs_mut()
                .append_pair("start", &start.to_rfc3339_opts(SecondsFormat::Millis, true))
                .append_pair("end", &end.to_rfc3339_opts(SecondsFormat::Millis, true));
            url
        });
        match result {
            Ok(url) => self.get_json_or_empty(url, "contributions").await,
            Err(e) => {
                warn!(error = %e, "Could not build contributions URL");
                Vec::new()
            }
        }
    }

    /// Topics voted on during the day beginning at `day_start`.
    pub async fn day_contributions<Tz: TimeZone>(&self, day_start: DateTime<Tz>) -> Vec<VotedTopic>
    where
        Tz::Offset: std::fmt::Display,
    {
        let result = self.resolve_url(DAY_DETAIL_PATH).map(|mut url| {
            url.query_pairs_mut().append_pair(
                "date",
                &day_start.to_rfc3339_opts(SecondsFormat::Secs, false),
            );
            url
        });
        match result {
            Ok(url) => self.get_json_or_empty(url, "day contributions").await,
            Err(e) => {
                warn!(error = %e, "Could not build day detail URL");
                Vec::new()
            }
        }
    }

    /// A topic with its summary; `None` when it cannot be loaded.
    pub async fn topic_summary(&self, topic: i64) -> Option<TopicSummary> {
        let path = format!("{}{}/?include_summary", TOPIC_PATH, topic);
        self.get_json(&path)
            .await
            .map_err(|e| warn!(topic, error = %e, "Could not load topic summary"))
            .ok()
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> RequestResult<T> {
        Ok(self.get(path).await?.json().await?)
    }

    async fn get_json_or_empty<T: DeserializeOwned>(&self, url: Url, what: &str) -> Vec<T> {
        self.get_json(url.as_str())
            .await
            .map_err(|e| warn!(error = %e, "Could not load {}", what))
            .unwrap_or_default()
    }
}
