//! Price-bearing publisher built on [`Notifier`].
//!
//! A [`Stock`] exposes its price through a setter; subscribers registered
//! with [`Stock::subscribe_price_changed`] receive a [`PriceChangedArgs`]
//! payload each time the price actually changes.
//!
//! Prices are exact [`Decimal`]s, so a rise of exactly the alert threshold
//! never alerts.

use std::sync::{Mutex, PoisonError};

use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::callback::Callback;
use crate::config::NotifierConfig;
use crate::error::CastResult;
use crate::notifier::{ChangeHandler, Notifier, NotifierId, ValueChanged};

/// Payload of a price change.
pub type PriceChangedArgs = ValueChanged<Decimal>;

impl ValueChanged<Decimal> {
    /// Price before the change.
    #[must_use]
    pub const fn last_price(&self) -> Decimal {
        self.previous
    }

    /// Price after the change.
    #[must_use]
    pub const fn new_price(&self) -> Decimal {
        self.current
    }

    /// `(new - last) / last`, or `None` when the last price was zero or the
    /// result does not fit a [`Decimal`].
    #[must_use]
    pub fn relative_change(&self) -> Option<Decimal> {
        self.current
            .checked_sub(self.previous)?
            .checked_div(self.previous)
    }
}

/// A traded symbol with a watched price.
#[derive(Debug)]
pub struct Stock {
    symbol: String,
    price: Notifier<Decimal>,
}

impl Stock {
    /// Creates a stock priced at zero.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let price = Notifier::with_config(Decimal::ZERO, NotifierConfig::named(format!("{symbol}.price")));
        Self { symbol, price }
    }

    /// Ticker symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Id carried as `source` by every price payload.
    #[must_use]
    pub fn id(&self) -> NotifierId {
        self.price.id()
    }

    /// Current price.
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price.get()
    }

    /// Sets the price, notifying subscribers if it changed.
    ///
    /// Returns whether subscribers were notified.
    pub fn set_price(&self, price: Decimal) -> CastResult<bool> {
        self.price.set(price)
    }

    /// Appends `handler` to the price-changed list.
    pub fn subscribe_price_changed(&self, handler: ChangeHandler<Decimal>) {
        self.price.subscribe(handler);
    }

    /// Removes the last occurrence of `handler`; no-op if absent.
    pub fn unsubscribe_price_changed(&self, handler: &ChangeHandler<Decimal>) {
        self.price.unsubscribe(handler);
    }

    /// Number of registered price handlers, duplicates included.
    #[must_use]
    pub fn price_subscriber_count(&self) -> usize {
        self.price.subscriber_count()
    }
}

/// A recorded price alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    /// Stock that moved.
    pub source: NotifierId,
    /// Price before the rise.
    pub last_price: Decimal,
    /// Price after the rise.
    pub new_price: Decimal,
    /// `(new_price - last_price) / last_price`.
    pub relative_change: Decimal,
}

/// Records an alert whenever a price rises by more than `threshold`
/// (relative, e.g. `0.1` for 10%).
#[derive(Debug)]
pub struct PriceAlerts {
    threshold: Decimal,
    alerts: Mutex<Vec<PriceAlert>>,
}

impl PriceAlerts {
    /// Creates an empty alert log. A rise of exactly `threshold` does not alert.
    #[must_use]
    pub fn new(threshold: Decimal) -> Self {
        Self {
            threshold,
            alerts: Mutex::new(Vec::new()),
        }
    }

    /// Handler method; bind it with [`Callback::bound`] or use [`PriceAlerts::handler`].
    pub fn on_price_changed(&self, e: &PriceChangedArgs) {
        let Some(change) = e.relative_change() else {
            return;
        };
        if change > self.threshold {
            info!(
                "alert: price increase of {:.1}% ({} -> {})",
                (change * Decimal::ONE_HUNDRED).round_dp(1),
                e.last_price(),
                e.new_price()
            );
            self.alerts
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(PriceAlert {
                    source: e.source,
                    last_price: e.last_price(),
                    new_price: e.new_price(),
                    relative_change: change,
                });
        }
    }

    /// Builds a handler bound to this alert log.
    #[must_use]
    pub fn handler(self: &std::sync::Arc<Self>) -> ChangeHandler<Decimal> {
        Callback::bound(self, Self::on_price_changed)
    }

    /// Alerts recorded so far.
    #[must_use]
    pub fn alerts(&self) -> Vec<PriceAlert> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
