//! Discovery source implementations.
//!
//! Each source knows one marketplace's search page: where it lives and how
//! to read item identifiers out of it.

pub mod aliexpress;
pub mod domeggook;
pub mod gmarket;

pub use aliexpress::AliexpressSearch;
pub use domeggook::{DomeggookListing, ListingSummary};
pub use gmarket::GmarketSearch;

use crate::discovery::DiscoverySource;
use crate::models::Platform;

/// Source for a marketplace.
pub fn source_for(platform: Platform) -> &'static dyn DiscoverySource {
    match platform {
        Platform::Gmarket => &GmarketSearch,
        Platform::Domeggook => &DomeggookListing,
        Platform::Aliexpress => &AliexpressSearch,
    }
}
