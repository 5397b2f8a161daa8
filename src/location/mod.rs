//! Location resolution
//!
//! ```text
//! "pune"
//!   │
//!   ├─► Gazetteer (case-insensitive exact name) ──► Maharashtra (local)
//!   │
//!   └─► Geocoder (one call, no retry)
//!         ├─► address.state | province | region ──► region (remote)
//!         ├─► no hits ──► LocationNotFound
//!         └─► failure ──► Error sentinel
//! ```

pub mod gazetteer;
pub mod geocoder;
pub mod resolver;
pub mod zoom;

pub use gazetteer::Gazetteer;
pub use geocoder::{Address, GeocodeHit, Geocoder, NominatimClient};
pub use resolver::{
    LocationResolver, NavigationResolution, NavigationTarget, RegionResolution,
    ResolutionSource, ResolverSettings,
};
pub use zoom::zoom_level;
