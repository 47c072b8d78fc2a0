use super::ui;
use crate::core::{
    CoinListSource, ConversionOutcome, ConversionRequest, Converter, CurrencyCatalog,
    PriceLookupSource, ReferenceCurrencySource,
};
use anyhow::{Result, bail};
use tracing::debug;

pub struct ConvertArgs<'a> {
    pub amount: f64,
    pub from: &'a str,
    pub to: &'a str,
    pub swap: bool,
    pub coin_limit: usize,
}

/// Loads both currency lists, resolves the pair and prints the result.
///
/// Conversion failures (unsupported pairs, bad prices, failed lookups) are
/// shown to the user rather than returned as errors.
pub async fn run<S>(source: S, args: ConvertArgs<'_>) -> Result<()>
where
    S: CoinListSource + ReferenceCurrencySource + PriceLookupSource,
{
    if !args.amount.is_finite() || args.amount < 0.0 {
        bail!("Amount must be a non-negative number, got {}", args.amount);
    }

    let pb = ui::new_spinner("Fetching currencies");
    let lists = futures::try_join!(
        source.fetch_coins(args.coin_limit),
        source.fetch_reference_currencies(),
    );
    let (coins, fiats) = lists.inspect_err(|_| pb.finish_and_clear())?;
    let catalog = CurrencyCatalog::new(coins, fiats);

    // Unmatched input is passed through and reported as an unsupported pair
    let from = catalog.find_id(args.from).unwrap_or_else(|| args.from.to_string());
    let to = catalog.find_id(args.to).unwrap_or_else(|| args.to.to_string());
    debug!(%from, %to, amount = args.amount, "Resolved conversion pair");

    let converter = Converter::new(source, ConversionRequest::new(args.amount, &from, &to));
    if args.swap {
        converter.swap();
    }

    pb.set_message("Converting");
    let outcome = converter.refresh(&catalog).await;
    pb.finish_and_clear();

    println!(
        "{}\n\n{}",
        ui::style_text("Cryptocurrency Converter", ui::StyleType::Title),
        display_outcome(&converter.request(), &outcome, &catalog)
    );
    Ok(())
}

fn label(catalog: &CurrencyCatalog, id: &str) -> String {
    let symbol = catalog.symbol(id);
    if symbol.is_empty() {
        id.to_string()
    } else {
        symbol.to_string()
    }
}

pub fn display_outcome(
    request: &ConversionRequest,
    outcome: &ConversionOutcome,
    catalog: &CurrencyCatalog,
) -> String {
    let from = label(catalog, &request.from);
    let to = label(catalog, &request.to);
    match outcome {
        ConversionOutcome::Pending => ui::style_text("Loading...", ui::StyleType::Subtle),
        ConversionOutcome::Ready(conversion) => format!(
            "{}\n{}",
            ui::style_text(
                &format!(
                    "{} {} ≈ {} {:.6} {}",
                    request.amount,
                    from,
                    catalog.sign(&request.to),
                    conversion.converted_amount,
                    to
                ),
                ui::StyleType::TotalValue
            ),
            ui::style_text(
                &format!("1 {} = {:.6} {}", from, conversion.rate, to),
                ui::StyleType::Subtle
            ),
        ),
        ConversionOutcome::Failed(e) => ui::style_text(
            &format!("Cannot convert {from} to {to}: {e}"),
            ui::StyleType::Error,
        ),
    }
}
