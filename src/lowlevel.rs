//! Low-level building blocks for custom matching loops.
//!
//! These expose the compiled template plan and the correlation kernels behind
//! [`Matcher`](crate::Matcher), for callers that want to score individual
//! placements or drive a scan themselves.

pub use crate::candidate::Peak;
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::ZnccRayon;
pub use crate::kernel::scalar::ZnccScalar;
pub use crate::kernel::Kernel;
pub use crate::template::TemplatePlan;
