use common::fleet::{AgentPatch, AgentRecord, AgentStatus};
use std::collections::HashMap;

/// In-memory fleet state keyed by agent ID. Exactly one record exists per
/// ID; records enter through a full snapshot and leave when a later
/// snapshot omits them. Patches never create records
pub(crate) struct FleetStore {
    agents: HashMap<String, AgentRecord>,
}

impl FleetStore {
    pub(crate) fn new() -> Self {
        FleetStore {
            agents: HashMap::new(),
        }
    }

    /// Discard the current fleet and install a full snapshot.
    /// A duplicate ID within one snapshot resolves to the last entry
    pub(crate) fn replace_all(&mut self, records: Vec<AgentRecord>) {
        self.agents.clear();
        for record in records {
            self.agents.insert(record.id.clone(), record);
        }
    }

    /// Apply partial updates to existing records. Each patch overwrites only
    /// the fields it carries. A patch whose ID matches nothing is dropped
    pub(crate) fn merge_partial(&mut self, patches: &[AgentPatch]) {
        for patch in patches {
            let record = match self.agents.get_mut(&patch.id) {
                Some(result) => result,
                None => continue,
            };

            if let Some(status) = patch.status {
                record.status = status;
            }
            if let Some(metrics) = &patch.metrics {
                record.metrics = Some(metrics.clone());
            }
            if let Some(traffic) = &patch.traffic {
                record.traffic = Some(traffic.clone());
            }
        }
    }

    /// Cloned view of the fleet ordered by ID
    pub(crate) fn snapshot(&self) -> Vec<AgentRecord> {
        let mut records: Vec<AgentRecord> = self.agents.values().cloned().collect();
        records.sort_by(|first, second| first.id.cmp(&second.id));
        records
    }

    pub(crate) fn len(&self) -> usize {
        self.agents.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of agents currently reporting online
    pub(crate) fn online_count(&self) -> usize {
        self.agents
            .values()
            .filter(|record| record.status == AgentStatus::Online)
            .count()
    }
}
