//! Portfolio positions priced against the stock listing.

use std::collections::{BTreeMap, HashMap};

use tradewire_protocol::Stock;

/// One priced position.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
    /// `price * quantity`.
    pub value: f64,
}

/// Joins a symbol → quantity portfolio with the current listing.
///
/// Rows come out sorted by symbol. A position whose symbol isn't in the
/// listing is left out: there's no price to show for it.
pub fn join_holdings(portfolio: &BTreeMap<String, i32>, stocks: &[Stock]) -> Vec<Holding> {
    let by_symbol: HashMap<&str, &Stock> =
        stocks.iter().map(|s| (s.symbol.as_str(), s)).collect();

    portfolio
        .iter()
        .filter_map(|(symbol, &quantity)| {
            let stock = by_symbol.get(symbol.as_str())?;
            Some(Holding {
                symbol: symbol.clone(),
                name: stock.name.clone(),
                quantity,
                price: stock.price,
                value: stock.price * f64::from(quantity),
            })
        })
        .collect()
}

/// Sum of every holding's value.
pub fn portfolio_value(holdings: &[Holding]) -> f64 {
    holdings.iter().map(|h| h.value).sum()
}
