//! Application services for the StudySwap exchange engine.
//!
//! [`MatchLifecycle`] owns every match state transition; [`NotificationFanout`]
//! multicasts live notifications to per-user subscriber channels;
//! [`NotificationDispatcher`] persists notifications and feeds the fanout and
//! the mail collaborator. All persistence goes through the
//! [`studyswap_core::store`] boundary traits.

pub mod discovery;
pub mod dispatch;
pub mod fanout;
pub mod lifecycle;
pub mod trust;

pub use discovery::MatchDiscovery;
pub use dispatch::{MailError, Mailer, NotificationDispatcher};
pub use fanout::{NotificationFanout, NotificationStream};
pub use lifecycle::MatchLifecycle;
pub use trust::TrustLedger;
