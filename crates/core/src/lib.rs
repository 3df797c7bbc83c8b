// lurker: session-driven traversal engine for unattended forum engagement.
//
// The engine authenticates a session, enumerates a bounded set of topics,
// visits each one in an isolated page, probabilistically likes it, and
// accumulates an ordered result set. Everything browser-specific sits
// behind the capability traits in `surface`; drivers live outside this
// crate.

pub mod engine;
pub mod error;
pub mod model;
pub mod policy;
pub mod session;
pub mod surface;
pub mod visitor;

/// Default bound on a single page navigation, in milliseconds.
pub const DEFAULT_NAV_TIMEOUT_MS: u64 = 30_000;

/// Default post-navigation delay, in milliseconds. Serves both as render
/// settling and as pacing between visits so the run does not hammer the
/// forum.
pub const DEFAULT_SETTLE_MS: u64 = 3_000;

pub use engine::{EngineConfig, TraversalEngine};
pub use error::{SurfaceError, SurfaceResult};
pub use model::{Credentials, RunSummary, TopicReference, VisitOutcome, VisitStatus};
pub use policy::{EngageOutcome, EngagementPolicy};
pub use session::SessionManager;
pub use surface::{BrowserSurface, ElementSurface, PageSurface};
pub use visitor::TopicVisitor;
