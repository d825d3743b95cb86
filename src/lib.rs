//! # FIT → Parquet
//!
//! A streaming converter from the FIT activity-recording container format
//! (the typed, length-prefixed binary message stream produced by fitness and
//! sports devices) to Apache Parquet tables suitable for analytics.
//!
//! ## Features
//!
//! - **Single-pass pipeline**: decode, classify, and columnar-encode in one
//!   forward pass over the message stream
//! - **Configurable columns**: each of the 17 output columns is switched by
//!   configuration; disabled columns cost nothing
//! - **Type resolution**: integer-vs-scaled-float ambiguity resolved per
//!   value, with a universal string rendering alongside
//! - **Identity denormalization**: manufacturer, product, and creation time
//!   from the stream's `file_id` message stamped onto every row
//! - **Developer fields**: dynamically described fields expand into rows
//!   like standard ones
//!
//! ## Quick Start
//!
//! ```no_run
//! use fit_parquet::{Config, FitTransformer};
//!
//! let mut transformer = FitTransformer::new(Config::default());
//! let stats = transformer.convert("activity.fit", "activity.parquet")?;
//!
//! println!("{}", stats.summary());
//! # Ok::<(), fit_parquet::Error>(())
//! ```
//!
//! ## Configuration
//!
//! A configuration snapshot is a flat `key : value` mapping: one boolean key
//! per candidate column, `exclude_empty_values`, `exclude_timestamp_values`,
//! and `epoch_format` (`UNIX` for Unix epoch seconds, anything else for raw
//! device-relative seconds).
//!
//! ```no_run
//! use fit_parquet::{Config, FitTransformer};
//!
//! let config = Config::from_file("parquet_config.yml")?;
//! let mut transformer = FitTransformer::new(config);
//! transformer.convert("ride.fit", "ride.parquet")?;
//!
//! // Re-read the file later without restarting:
//! transformer.reload(Config::from_file("parquet_config.yml")?);
//! # Ok::<(), fit_parquet::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, Error>`. A file that fails the FIT
//! integrity check is rejected before any output is written:
//!
//! ```no_run
//! use fit_parquet::{Config, Error, FitTransformer};
//!
//! let mut transformer = FitTransformer::new(Config::default());
//! match transformer.convert("broken.fit", "broken.parquet") {
//!     Ok(stats) => println!("{}", stats.summary()),
//!     Err(Error::Integrity(path)) => eprintln!("corrupt FIT file: {}", path),
//!     Err(err) => eprintln!("error: {}", err),
//! }
//! ```

// Public API modules
pub mod config;
pub mod error;
pub mod transformer;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use transformer::{ConversionStats, FitTransformer};

// Internal modules (public but not part of the high-level API)
pub mod columns;
pub mod emitter;
pub mod fit;
pub mod formats;
pub mod schema;
