//! # Domain Models
//!
//! Typed values the query layer works with.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Entity`] | NLU extraction category and its service tag |
//! | [`Aggregate`] | Statistic requested by a value query |
//! | [`DailyValue`] | One trading day of open/high/low/close |
//! | [`Symbol`] | Validated ticker symbol |
//! | [`TradingDate`] | Calendar day |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Construction validates every invariant, so a value that exists is usable:
//!
//! ```rust
//! use stockask_core::{DailyValue, TradingDate, ValidationError};
//!
//! let day = TradingDate::parse("2015-01-02")?;
//! assert!(DailyValue::new(day, 111.39, 111.44, 107.35, 109.33).is_ok());
//! assert_eq!(
//!     DailyValue::new(day, 1.0, 1.0, 2.0, 1.0),
//!     Err(ValidationError::InvalidPriceRange)
//! );
//! # Ok::<(), ValidationError>(())
//! ```

mod aggregate;
mod daily_value;
mod entity;
mod symbol;
mod timestamp;
mod trading_date;

pub use aggregate::{Aggregate, AggregateValue};
pub use daily_value::{sort_by_date, DailyValue};
pub use entity::Entity;
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
pub use trading_date::TradingDate;
