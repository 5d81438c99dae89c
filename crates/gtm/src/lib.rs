//! Chroma GTM - record viewer for hosted vector-database collections
//!
//! Pages whole collections out of a hosted Chroma database, caches them per
//! session, and derives filtered, normalized views with summary counts and
//! breakdowns for the terminal front end.

pub mod auth;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod normalize;
pub mod pager;
pub mod record;
pub mod schema;
pub mod session;
pub mod stats;

pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use session::{CollectionView, ViewerSession};
