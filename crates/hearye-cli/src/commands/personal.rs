//! Profile and contribution history.

use super::Context;
use crate::output;
use anyhow::{Context as _, Result};
use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use hearye_api::daily_contributions;

/// Show the signed-in user's details.
pub async fn profile(ctx: &Context) -> Result<()> {
    let Some(details) = ctx.client.personal_details().await else {
        output::print_error("Could not load your profile", &ctx.format);
        return Ok(());
    };

    output::print(&details, &ctx.format, |details| {
        output::print_heading("Profile");
        if let Some(joined) = &details.joined {
            output::print_row("Joined", joined);
        }
        for (key, value) in &details.extra {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            output::print_row(key, &value);
        }
    });
    Ok(())
}

/// Midnight at the start of `date` in `tz`.
pub(crate) fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .with_context(|| format!("{} has no local midnight", date))
}

/// The window `[today - days, tomorrow)` in `tz`, as UTC instants.
pub(crate) fn contribution_window<Tz: TimeZone>(
    tz: &Tz,
    today: NaiveDate,
    days: u64,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let first = today
        .checked_sub_days(Days::new(days))
        .context("contribution window starts before the calendar does")?;
    let after = today
        .checked_add_days(Days::new(1))
        .context("contribution window ends after the calendar does")?;
    Ok((
        start_of_day(tz, first)?.with_timezone(&Utc),
        start_of_day(tz, after)?.with_timezone(&Utc),
    ))
}

/// Per-day vote counts for the last `days` days, or with `date`, the topics
/// voted on that day.
pub async fn contributions(ctx: &Context, days: u64, date: Option<NaiveDate>) -> Result<()> {
    if let Some(date) = date {
        let topics = ctx.client.day_contributions(start_of_day(&Local, date)?).await;
        output::print(&topics, &ctx.format, |topics| {
            output::print_heading(&format!("Votes on {}", date));
            if topics.is_empty() {
                println!("No votes.");
            }
            for topic in topics {
                let vote = topic.vote.map(|v| v.to_string()).unwrap_or_default();
                println!("  {:>6}  {:>3}  {}", topic.id, vote, topic.title);
            }
        });
        return Ok(());
    }

    let (start, end) = contribution_window(&Local, Local::now().date_naive(), days)?;
    let votes = ctx.client.contributions(start, end).await;
    let daily = daily_contributions(&votes, &Local);

    output::print(&daily, &ctx.format, |daily| {
        output::print_heading(&format!("Contributions, last {} days", days));
        if daily.is_empty() {
            println!("No votes.");
        }
        for day in daily {
            output::print_row(&day.date.to_string(), &day.count.to_string());
        }
    });
    Ok(())
}
