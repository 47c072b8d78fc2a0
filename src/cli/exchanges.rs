use super::ui;
use crate::core::{Exchange, ExchangeSource};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

pub async fn run(source: &(dyn ExchangeSource + Send + Sync), limit: usize) -> Result<()> {
    let pb = ui::new_spinner("Fetching exchanges");
    let exchanges = source.fetch_exchanges(limit).await;
    pb.finish_and_clear();

    let exchanges = match exchanges {
        Ok(exchanges) => exchanges,
        Err(e) => {
            println!(
                "{}\n{}",
                ui::style_text("Failed to load exchanges", ui::StyleType::Error),
                ui::style_text(
                    "The exchanges API may be temporarily unavailable. Please try again later.",
                    ui::StyleType::Subtle
                )
            );
            return Err(e);
        }
    };

    if exchanges.is_empty() {
        println!("No exchanges data available.");
        return Ok(());
    }

    println!(
        "{}\n\n{}",
        ui::style_text("Exchanges", ui::StyleType::Title),
        display_as_table(&exchanges)
    );
    Ok(())
}

pub fn display_as_table(exchanges: &[Exchange]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Exchange"),
        ui::header_cell("24h Trade Volume"),
        ui::header_cell("Markets"),
        ui::header_cell("Market Share"),
    ]);

    for exchange in exchanges {
        table.add_row(vec![
            Cell::new(exchange.rank).set_alignment(CellAlignment::Right),
            Cell::new(&exchange.name),
            ui::format_optional_cell(ui::parse_number(exchange.volume_24h.as_deref()), |v| {
                format!("$ {}", ui::compact_number(v))
            }),
            ui::format_optional_cell(exchange.number_of_markets, |m| {
                ui::compact_number(m as f64)
            }),
            ui::format_optional_cell(ui::parse_number(exchange.market_share.as_deref()), |s| {
                format!("{}%", ui::compact_number(s))
            }),
        ]);
    }

    table.to_string()
}
