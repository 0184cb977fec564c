//! Loading, column-role resolution and aggregation for rockfall observation CSVs.
//!
//! source → [`Loader`] → [`Dataset`] → [`Resolver`] → [`RoleMapping`] →
//! [`Dataset::filter_selection`] → [`Summary`] / [`export`].

pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod load;
pub mod resolve;
pub mod summary;
pub mod table;

pub use config::Config;
pub use error::DataError;
pub use fetch::Source;
pub use load::{DatasetCache, LoadOptions, Loader, TextEncoding};
pub use resolve::{Matcher, Month, Resolver, Role, RoleMapping, Rule};
pub use summary::Summary;
pub use table::{CollisionPolicy, Dataset, Selection, Value};
