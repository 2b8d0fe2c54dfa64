//! Event handler capability trait.

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;

/// One feature's eligibility filter and side-effecting action.
///
/// Handlers are registered on the router in order and are expected to be
/// largely independent; every eligible handler runs once per event. A
/// failing `handle` is caught and logged by the router and never prevents
/// later handlers from running.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handler name for logs.
    fn name(&self) -> &'static str;

    /// Cheap eligibility check; must not have side effects.
    fn can_handle(&self, event: &Event) -> bool;

    /// Processes the event.
    async fn handle(&self, event: &Event) -> Result<(), HandlerError>;
}
