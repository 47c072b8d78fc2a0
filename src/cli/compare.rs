use super::{coin, ui};
use crate::core::history::{self, AlignedSeries, ChartMode};
use crate::core::{
    CoinDetails, CoinDetailsSource, CoinListSource, CurrencyCatalog, HistorySource, TimePeriod,
};
use anyhow::Result;
use chrono::DateTime;
use comfy_table::{Cell, CellAlignment};
use tracing::debug;

pub struct CompareArgs<'a> {
    pub first: &'a str,
    pub second: &'a str,
    pub period: TimePeriod,
    pub mode: ChartMode,
    pub coin_limit: usize,
}

pub async fn run<S>(source: &S, args: CompareArgs<'_>) -> Result<()>
where
    S: CoinListSource + CoinDetailsSource + HistorySource,
{
    let pb = ui::new_spinner("Fetching coins");
    let coins = source
        .fetch_coins(args.coin_limit)
        .await
        .inspect_err(|_| pb.finish_and_clear())?;
    let catalog = CurrencyCatalog::new(coins, Vec::new());
    // Coins outside the listed top N can still be compared by id
    let first = catalog
        .find_id(args.first)
        .unwrap_or_else(|| args.first.to_string());
    let second = catalog
        .find_id(args.second)
        .unwrap_or_else(|| args.second.to_string());
    debug!(%first, %second, period = %args.period, "Comparing coins");

    pb.set_message("Fetching coin details and history");
    let (details_a, details_b, history_a, history_b) = futures::join!(
        source.fetch_coin(&first),
        source.fetch_coin(&second),
        source.fetch_history(&first, args.period),
        source.fetch_history(&second, args.period),
    );
    pb.finish_and_clear();

    let (details_a, details_b) = (details_a?, details_b?);
    let aligned = history::align(&history_a?, &history_b?, args.mode)?;

    println!(
        "{} vs {} ({})\n\n{}",
        ui::style_text(&details_a.name, ui::StyleType::Title),
        ui::style_text(&details_b.name, ui::StyleType::Title),
        args.period,
        display_metrics(&details_a, &details_b),
    );
    ui::print_separator();
    println!(
        "{}",
        display_series(&aligned, &details_a, &details_b, args.period, args.mode)
    );
    Ok(())
}

pub fn display_metrics(first: &CoinDetails, second: &CoinDetails) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Metric"),
        ui::header_cell(&first.name),
        ui::header_cell(&second.name),
    ]);
    for ((metric, a), (_, b)) in coin::metric_rows(first)
        .into_iter()
        .zip(coin::metric_rows(second))
    {
        table.add_row(vec![Cell::new(metric), Cell::new(a), Cell::new(b)]);
    }
    table.to_string()
}

fn format_label(timestamp: i64, period: TimePeriod) -> String {
    let format = if period.is_intraday() {
        "%Y-%m-%d %H:%M"
    } else {
        "%Y-%m-%d"
    };
    DateTime::from_timestamp(timestamp, 0)
        .map_or_else(|| timestamp.to_string(), |dt| dt.format(format).to_string())
}

fn value_cell(value: f64, mode: ChartMode) -> Cell {
    if value.is_nan() {
        return ui::na_cell(false);
    }
    match mode {
        ChartMode::Absolute => Cell::new(format!("$ {}", ui::format_price(value)))
            .set_alignment(CellAlignment::Right),
        ChartMode::Percentage => ui::change_cell(value),
    }
}

pub fn display_series(
    aligned: &AlignedSeries,
    first: &CoinDetails,
    second: &CoinDetails,
    period: TimePeriod,
    mode: ChartMode,
) -> String {
    if aligned.is_empty() {
        return ui::style_text("No price history available", ui::StyleType::Subtle);
    }

    let title = match mode {
        ChartMode::Absolute => "Price Comparison ($)",
        ChartMode::Percentage => "ROI Comparison (%)",
    };
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell(&first.symbol),
        ui::header_cell(&second.symbol),
    ]);
    for ((timestamp, a), b) in aligned
        .labels
        .iter()
        .zip(&aligned.series_a)
        .zip(&aligned.series_b)
    {
        table.add_row(vec![
            Cell::new(format_label(*timestamp, period)),
            value_cell(*a, mode),
            value_cell(*b, mode),
        ]);
    }

    format!(
        "{}\n{}",
        ui::style_text(title, ui::StyleType::TotalLabel),
        table
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::coin::tests::details;

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1_700_000_000, TimePeriod::SevenDays), "2023-11-14");
        assert_eq!(
            format_label(1_700_000_000, TimePeriod::ThreeHours),
            "2023-11-14 22:13"
        );
    }

    #[test]
    fn test_display_series_in_percentage_mode() {
        let aligned = AlignedSeries {
            labels: vec![1_700_000_000, 1_700_086_400],
            series_a: vec![0.0, 12.5],
            series_b: vec![0.0, -3.25],
        };
        let output = display_series(
            &aligned,
            &details("btc", "Bitcoin", "50000"),
            &details("eth", "Ethereum", "2500"),
            TimePeriod::SevenDays,
            ChartMode::Percentage,
        );
        assert!(output.contains("ROI Comparison (%)"));
        assert!(output.contains("BTC"));
        assert!(output.contains("ETH"));
        assert!(output.contains("2023-11-15"));
        assert!(output.contains("12.50%"));
        assert!(output.contains("-3.25%"));
    }

    #[test]
    fn test_display_series_marks_gaps() {
        let aligned = AlignedSeries {
            labels: vec![1_700_000_000],
            series_a: vec![f64::NAN],
            series_b: vec![2500.0],
        };
        let output = display_series(
            &aligned,
            &details("btc", "Bitcoin", "50000"),
            &details("eth", "Ethereum", "2500"),
            TimePeriod::OneYear,
            ChartMode::Absolute,
        );
        assert!(output.contains("Price Comparison ($)"));
        assert!(output.contains("N/A"));
        assert!(output.contains("$ 2500.00"));
    }

    #[test]
    fn test_display_series_shows_sub_cent_prices() {
        let aligned = AlignedSeries {
            labels: vec![1_700_000_000, 1_700_086_400],
            series_a: vec![0.00001234, 0.00001301],
            series_b: vec![2500.0, 2510.0],
        };
        let output = display_series(
            &aligned,
            &details("shib", "Shiba Inu", "0.00001301"),
            &details("eth", "Ethereum", "2500"),
            TimePeriod::SevenDays,
            ChartMode::Absolute,
        );
        assert!(output.contains("$ 0.00001234"));
        assert!(output.contains("$ 0.00001301"));
        assert!(!output.contains("$ 0.00 "));
    }

    #[test]
    fn test_display_metrics_side_by_side() {
        let output = display_metrics(
            &details("btc", "Bitcoin", "50000"),
            &details("eth", "Ethereum", "2500"),
        );
        assert!(output.contains("Bitcoin"));
        assert!(output.contains("Ethereum"));
        assert!(output.contains("$ 50K"));
        assert!(output.contains("$ 2.5K"));
        assert!(output.contains("All Time High"));
    }
}
