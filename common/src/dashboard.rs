use crate::fleet::{AgentPatch, AgentRecord};

/// One inbound message on the dashboard push feed. The server sends a full
/// snapshot once per connection, partial patches afterwards, and may
/// broadcast other payloads (alerts) the viewer does not handle
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardMessage {
    /// Full fleet snapshot. Replaces everything the viewer knows
    Init(Vec<AgentRecord>),
    /// Patches for existing records
    Update(Vec<AgentPatch>),
    /// Well-formed envelope with a tag the viewer does not handle
    Unknown,
}
