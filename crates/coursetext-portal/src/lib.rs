//! Portal rescanning layer.
//!
//! After the pipeline's HTML is placed in a host container, the host may
//! replace that subtree on its own schedule. [`PortalLayer`] scans the
//! container for markers right after injection and again after each delay in
//! its rescan schedule, publishing the located overlays wholesale every time.
//! New inputs or teardown cancel every pending rescan first.

mod host;
mod layer;
mod overlay;

pub use crate::host::{InMemoryHost, MarkerHost};
pub use crate::layer::PortalLayer;
pub use crate::overlay::{GlossaryOverlay, Overlays};
