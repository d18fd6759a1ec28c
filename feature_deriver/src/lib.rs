//! Rolling-window features over daily price bars.
//!
//! For every bar, [`derive`] computes the trailing high/low over the last `W`
//! bars, the days elapsed since that extreme was last attained, the close's
//! percentage distance from it, and the same extremes and distances over the
//! `F` bars that follow. Values that cannot be computed are `None`.

pub mod derive;
pub mod enriched;
pub mod table;
pub mod window;

pub use derive::{DeriveError, FeatureTable, derive, derive_with};
pub use enriched::EnrichedBar;
pub use table::{Column, TableError};
pub use window::WindowSpec;
