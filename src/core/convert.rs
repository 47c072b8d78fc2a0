//! Resolves a from/to currency pair into an exchange rate.
//!
//! A pair of two coins is priced from the coin list alone. A pair mixing a
//! coin and a fiat currency needs exactly one remote lookup: the coin priced
//! in the fiat currency, inverted when converting from fiat. Fiat to fiat is
//! not supported since there is no cross-fiat rate source.

use crate::core::currency::{CurrencyCatalog, CurrencyKind};
use crate::core::error::QuoteError;
use crate::core::price::PriceLookupSource;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

impl ConversionRequest {
    pub fn new(amount: f64, from: &str, to: &str) -> Self {
        Self {
            amount,
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub rate: f64,
    pub converted_amount: f64,
}

impl Conversion {
    fn new(amount: f64, rate: f64) -> Self {
        Self {
            rate,
            converted_amount: amount * rate,
        }
    }
}

/// The latest known state of a conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    /// A lookup for the current request is in flight.
    Pending,
    Ready(Conversion),
    Failed(QuoteError),
}

/// What is needed to price a pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PricePlan {
    /// Both prices were already known; no lookup is required.
    Direct(f64),
    /// Price `coin` in `reference`, inverting the result when converting from fiat.
    Lookup {
        coin: String,
        reference: String,
        invert: bool,
    },
}

pub fn parse_price(raw: &str) -> Result<f64, QuoteError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| QuoteError::InvalidPrice(raw.to_string()))
}

fn listed_coin_price(catalog: &CurrencyCatalog, id: &str) -> Result<f64, QuoteError> {
    let raw = catalog
        .coin(id)
        .and_then(|c| c.price.as_deref())
        .ok_or_else(|| QuoteError::InvalidPrice(String::new()))?;
    let price = parse_price(raw)?;
    if price == 0.0 {
        return Err(QuoteError::InvalidPrice(raw.to_string()));
    }
    Ok(price)
}

/// Decides how to price `from` in units of `to`.
pub fn plan(from: &str, to: &str, catalog: &CurrencyCatalog) -> Result<PricePlan, QuoteError> {
    match (catalog.classify(from), catalog.classify(to)) {
        (CurrencyKind::Crypto, CurrencyKind::Crypto) => {
            let from_price = listed_coin_price(catalog, from)?;
            let to_price = listed_coin_price(catalog, to)?;
            Ok(PricePlan::Direct(from_price / to_price))
        }
        (CurrencyKind::Crypto, CurrencyKind::Fiat) => Ok(PricePlan::Lookup {
            coin: from.to_string(),
            reference: to.to_string(),
            invert: false,
        }),
        (CurrencyKind::Fiat, CurrencyKind::Crypto) => Ok(PricePlan::Lookup {
            coin: to.to_string(),
            reference: from.to_string(),
            invert: true,
        }),
        _ => Err(QuoteError::UnsupportedPair {
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}

/// Turns a looked-up coin price into a rate.
pub fn rate_from_lookup(raw: &str, invert: bool) -> Result<f64, QuoteError> {
    let price = parse_price(raw)?;
    if !invert {
        return Ok(price);
    }
    if price == 0.0 {
        return Err(QuoteError::DivisionByZero);
    }
    Ok(1.0 / price)
}

/// Prices a single request, issuing at most one lookup.
///
/// Negative and non-finite amounts are rejected before any lookup.
#[instrument(skip(catalog, lookup), fields(from = %request.from, to = %request.to))]
pub async fn resolve(
    request: &ConversionRequest,
    catalog: &CurrencyCatalog,
    lookup: &(dyn PriceLookupSource + Send + Sync),
) -> Result<Conversion, QuoteError> {
    if !request.amount.is_finite() || request.amount < 0.0 {
        return Err(QuoteError::InvalidAmount(request.amount));
    }
    let rate = match plan(&request.from, &request.to, catalog)? {
        PricePlan::Direct(rate) => rate,
        PricePlan::Lookup {
            coin,
            reference,
            invert,
        } => {
            debug!(%coin, %reference, "Looking up coin price in reference currency");
            let raw = lookup.fetch_price(&coin, &reference).await?;
            rate_from_lookup(&raw, invert)?
        }
    };
    Ok(Conversion::new(request.amount, rate))
}

/// Identifies the request a resolution was started for.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    pub request: ConversionRequest,
}

struct ConverterState {
    generation: u64,
    request: ConversionRequest,
    outcome: ConversionOutcome,
}

/// Holds the current conversion request and its latest outcome.
///
/// Every edit bumps a generation counter. A resolution commits its result only
/// while its ticket's generation is still current, so a late response for a
/// superseded request is dropped instead of overwriting newer state.
pub struct Converter<L: PriceLookupSource> {
    lookup: L,
    state: Mutex<ConverterState>,
}

impl<L: PriceLookupSource> Converter<L> {
    pub fn new(lookup: L, request: ConversionRequest) -> Self {
        Self {
            lookup,
            state: Mutex::new(ConverterState {
                generation: 0,
                request,
                outcome: ConversionOutcome::Pending,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ConverterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request(&self) -> ConversionRequest {
        self.state().request.clone()
    }

    pub fn outcome(&self) -> ConversionOutcome {
        self.state().outcome.clone()
    }

    fn update(&self, edit: impl FnOnce(&mut ConversionRequest)) -> Ticket {
        let mut state = self.state();
        edit(&mut state.request);
        state.generation += 1;
        state.outcome = ConversionOutcome::Pending;
        Ticket {
            generation: state.generation,
            request: state.request.clone(),
        }
    }

    pub fn set_amount(&self, amount: f64) -> Ticket {
        self.update(|r| r.amount = amount)
    }

    pub fn set_from(&self, from: &str) -> Ticket {
        self.update(|r| r.from = from.to_string())
    }

    pub fn set_to(&self, to: &str) -> Ticket {
        self.update(|r| r.to = to.to_string())
    }

    /// Exchanges both sides. The result is resolved afresh like any other edit.
    pub fn swap(&self) -> Ticket {
        self.update(|r| std::mem::swap(&mut r.from, &mut r.to))
    }

    /// A ticket for the current request without changing it.
    pub fn begin(&self) -> Ticket {
        let state = self.state();
        Ticket {
            generation: state.generation,
            request: state.request.clone(),
        }
    }

    /// Commits `result` if `ticket` is still current. Returns whether it was applied.
    pub fn complete(&self, ticket: &Ticket, result: Result<Conversion, QuoteError>) -> bool {
        let mut state = self.state();
        if state.generation != ticket.generation {
            debug!(
                stale = ticket.generation,
                current = state.generation,
                "Discarding result for superseded conversion request"
            );
            return false;
        }
        state.outcome = match result {
            Ok(conversion) => ConversionOutcome::Ready(conversion),
            Err(e) => ConversionOutcome::Failed(e),
        };
        true
    }

    /// Resolves the ticket's request and commits the result if still current.
    pub async fn run(&self, ticket: Ticket, catalog: &CurrencyCatalog) -> bool {
        let result = resolve(&ticket.request, catalog, &self.lookup).await;
        self.complete(&ticket, result)
    }

    /// Resolves the current request and returns the resulting outcome.
    pub async fn refresh(&self, catalog: &CurrencyCatalog) -> ConversionOutcome {
        let ticket = self.begin();
        self.run(ticket, catalog).await;
        self.outcome()
    }
}
