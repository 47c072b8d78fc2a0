use super::ui;
use crate::core::{NewsArticle, NewsSource};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;

const TITLE_LENGTH: usize = 50;
const DESCRIPTION_LENGTH: usize = 100;

pub async fn run(source: &(dyn NewsSource + Send + Sync), query: &str, count: usize) -> Result<()> {
    let pb = ui::new_spinner("Fetching news");
    let articles = source.fetch_news(query, count).await;
    pb.finish_and_clear();

    let articles = match articles {
        Ok(articles) => articles,
        Err(e) => {
            println!(
                "{}\n{}",
                ui::style_text("Failed to load news", ui::StyleType::Error),
                ui::style_text(
                    "The news API may be temporarily unavailable. Please try again later.",
                    ui::StyleType::Subtle
                )
            );
            return Err(e);
        }
    };

    if articles.is_empty() {
        println!("No news available for {query}.");
        return Ok(());
    }

    println!(
        "{}\n\n{}",
        ui::style_text(&format!("News: {query}"), ui::StyleType::Title),
        display_as_table(&articles, Utc::now())
    );
    Ok(())
}

/// Renders a publication time relative to `now`, e.g. "3 hours ago".
fn time_ago(published: &str, now: DateTime<Utc>) -> String {
    let Ok(published_at) = DateTime::parse_from_rfc3339(published) else {
        return published.to_string();
    };
    let elapsed = now.signed_duration_since(published_at.with_timezone(&Utc));
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };
    if elapsed.num_days() > 0 {
        plural(elapsed.num_days(), "day")
    } else if elapsed.num_hours() > 0 {
        plural(elapsed.num_hours(), "hour")
    } else if elapsed.num_minutes() > 0 {
        plural(elapsed.num_minutes(), "minute")
    } else {
        "just now".to_string()
    }
}

pub fn display_as_table(articles: &[NewsArticle], now: DateTime<Utc>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Title"),
        ui::header_cell("Provider"),
        ui::header_cell("Published"),
        ui::header_cell("Summary"),
    ]);

    for article in articles {
        let published = article
            .published_at
            .as_deref()
            .map_or(String::new(), |p| time_ago(p, now));
        table.add_row(vec![
            Cell::new(format!(
                "{}\n{}",
                ui::truncate(&article.title, TITLE_LENGTH),
                ui::style_text(&article.url, ui::StyleType::Subtle)
            )),
            Cell::new(&article.provider),
            Cell::new(published),
            Cell::new(ui::truncate(&article.description, DESCRIPTION_LENGTH)),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-02T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_time_ago() {
        assert_eq!(time_ago("2024-03-02T11:59:30Z", now()), "just now");
        assert_eq!(time_ago("2024-03-02T11:59:00Z", now()), "1 minute ago");
        assert_eq!(time_ago("2024-03-02T09:00:00.0000000Z", now()), "3 hours ago");
        assert_eq!(time_ago("2024-02-28T12:00:00+00:00", now()), "3 days ago");
        assert_eq!(time_ago("yesterday", now()), "yesterday");
    }

    #[test]
    fn test_display_truncates_long_text() {
        let article = NewsArticle {
            title: "A".repeat(60),
            url: "https://news.example.com/1".to_string(),
            description: "B".repeat(120),
            provider: "Example News".to_string(),
            thumbnail_url: None,
            published_at: Some("2024-03-01T12:00:00Z".to_string()),
        };

        let output = display_as_table(&[article], now());
        assert!(output.contains(&format!("{}...", "A".repeat(50))));
        assert!(!output.contains(&"A".repeat(51)));
        assert!(output.contains("Example News"));
        assert!(output.contains("1 day ago"));
    }
}
