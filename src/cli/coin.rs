use super::ui;
use crate::core::{CoinDetails, CoinDetailsSource};
use anyhow::Result;
use comfy_table::Cell;

pub async fn run(source: &(dyn CoinDetailsSource + Send + Sync), coin_id: &str) -> Result<()> {
    let pb = ui::new_spinner("Fetching coin details");
    let details = source.fetch_coin(coin_id).await;
    pb.finish_and_clear();

    let details = details?;
    println!(
        "{} ({})\n\n{}",
        ui::style_text(&details.name, ui::StyleType::Title),
        details.symbol,
        display_as_table(&details)
    );
    Ok(())
}

/// Display rows shared by the details and comparison views.
pub(crate) fn metric_rows(details: &CoinDetails) -> Vec<(&'static str, String)> {
    let money = |raw: Option<&str>| {
        ui::parse_number(raw).map_or("-".to_string(), |v| format!("$ {}", ui::compact_number(v)))
    };
    let count = |n: Option<u64>| n.map_or("-".to_string(), |n| n.to_string());
    vec![
        ("Price", money(Some(details.price.as_str()))),
        ("Market Cap", money(details.market_cap.as_deref())),
        ("24h Volume", money(details.volume_24h.as_deref())),
        ("All Time High", money(details.all_time_high.as_deref())),
        ("Number of Markets", count(details.number_of_markets)),
        ("Number of Exchanges", count(details.number_of_exchanges)),
    ]
}

pub fn display_as_table(details: &CoinDetails) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);
    for (metric, value) in metric_rows(details) {
        table.add_row(vec![Cell::new(metric), Cell::new(value)]);
    }
    table.to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn details(id: &str, name: &str, price: &str) -> CoinDetails {
        CoinDetails {
            id: id.to_string(),
            symbol: id.to_uppercase(),
            name: name.to_string(),
            price: price.to_string(),
            market_cap: Some("950000000000".to_string()),
            volume_24h: None,
            all_time_high: Some("69000".to_string()),
            number_of_markets: Some(9000),
            number_of_exchanges: None,
            color: None,
        }
    }

    #[test]
    fn test_metric_rows() {
        let rows = metric_rows(&details("btc", "Bitcoin", "50000"));
        assert_eq!(rows[0], ("Price", "$ 50K".to_string()));
        assert_eq!(rows[1], ("Market Cap", "$ 950B".to_string()));
        assert_eq!(rows[2], ("24h Volume", "-".to_string()));
        assert_eq!(rows[3], ("All Time High", "$ 69K".to_string()));
        assert_eq!(rows[4], ("Number of Markets", "9000".to_string()));
        assert_eq!(rows[5], ("Number of Exchanges", "-".to_string()));
    }
}
