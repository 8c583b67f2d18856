//! # kyrocast - typed multicast callbacks and change notification
//!
//! kyrocast provides an immutable, combinable list of callback targets, a
//! synchronous fail-fast dispatcher for such lists, and notifiers that
//! dispatch a payload whenever a watched value changes.
//!
//! ## Core Concepts
//!
//! - **Callback**: a target bound to a fixed `(&A) -> R` signature, compared by identity
//! - **CallbackList**: an ordered, persistent list of callbacks; combine/remove return new lists
//! - **Dispatcher**: invokes a snapshot of a list in order, stopping at the first failure
//! - **Notifier**: owns a watched value and dispatches `ValueChanged` when it changes
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use kyrocast::{Decimal, PriceAlerts, Stock};
//!
//! let stock = Stock::new("THPW");
//! stock.set_price(Decimal::new(2710, 2))?;
//!
//! let alerts = Arc::new(PriceAlerts::new(Decimal::new(1, 1)));
//! stock.subscribe_price_changed(alerts.handler());
//! stock.set_price(Decimal::new(3159, 2))?;
//!
//! assert_eq!(alerts.alerts().len(), 1);
//! # Ok::<(), kyrocast::CastError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod callback;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod list;
pub mod notifier;
pub mod progress;
pub mod stock;
pub mod transform;

// Re-export primary types at crate root for convenience
pub use callback::{Callback, TargetKey};
pub use config::{DispatcherConfig, NotifierConfig};
pub use dispatcher::{invoke, invoke_all, CancellationToken, Dispatcher};
pub use error::{CastError, CastResult, ConfigError, DispatchError, TargetError};
pub use list::{CallbackList, Snapshot};
pub use notifier::{ChangeHandler, Notifier, NotifierId, NotifierState, ValueChanged};
pub use progress::{run_with_progress, ProgressReporter};
pub use stock::{PriceAlert, PriceAlerts, PriceChangedArgs, Stock};
pub use rust_decimal::Decimal;
pub use transform::{
    apply_in_place, negate, negate_transformer, square, square_transformer, try_apply_in_place,
    Transformer,
};
