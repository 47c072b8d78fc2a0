use super::ui;
use crate::core::{Coin, CoinListSource};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

pub async fn run(source: &(dyn CoinListSource + Send + Sync), limit: usize) -> Result<()> {
    let pb = ui::new_spinner("Fetching coins");
    let coins = source.fetch_coins(limit).await;
    pb.finish_and_clear();

    let coins = coins?;
    if coins.is_empty() {
        println!("No coins available.");
        return Ok(());
    }

    println!(
        "{}\n\n{}",
        ui::style_text("Cryptocurrencies", ui::StyleType::Title),
        display_as_table(&coins)
    );
    Ok(())
}

pub fn display_as_table(coins: &[Coin]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Name"),
        ui::header_cell("Symbol"),
        ui::header_cell("Price ($)"),
        ui::header_cell("Market Cap"),
        ui::header_cell("24h Change"),
    ]);

    for coin in coins {
        let rank = coin.rank.map_or(String::new(), |r| r.to_string());
        let change = ui::parse_number(coin.change.as_deref());
        table.add_row(vec![
            Cell::new(rank).set_alignment(CellAlignment::Right),
            Cell::new(&coin.name),
            Cell::new(&coin.symbol),
            ui::format_optional_cell(ui::parse_number(coin.price.as_deref()), ui::format_price),
            ui::format_optional_cell(ui::parse_number(coin.market_cap.as_deref()), |m| {
                ui::compact_number(m)
            }),
            change.map_or(ui::na_cell(false), ui::change_cell),
        ]);
    }

    table.to_string()
}
