use super::error::SocketError;
use common::dashboard::DashboardMessage;
use common::fleet::AgentPatch;
use log::warn;
use serde::Deserialize;
use serde_json::Value;

/// Wire shape of every feed payload: a tag plus loosely structured data
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

/// Decode one inbound feed frame into a `DashboardMessage`. Anything that
/// does not match the protocol is rejected here, before it can touch the
/// fleet store
pub(crate) fn parse_message(raw: &str) -> Result<DashboardMessage, SocketError> {
    let envelope_result = serde_json::from_str::<Envelope>(raw);
    let envelope = match envelope_result {
        Ok(result) => result,
        Err(err) => {
            warn!("[viewer] Could not decode feed envelope: {err:?}");
            return Err(SocketError::BadEnvelope);
        }
    };

    match envelope.kind.as_str() {
        "init" => {
            let records_result = serde_json::from_value(envelope.data);
            let records = match records_result {
                Ok(result) => result,
                Err(err) => {
                    warn!("[viewer] Could not decode fleet snapshot: {err:?}");
                    return Err(SocketError::BadSnapshot);
                }
            };
            Ok(DashboardMessage::Init(records))
        }
        "update" => Ok(DashboardMessage::Update(parse_patches(envelope.data))),
        _ => Ok(DashboardMessage::Unknown),
    }
}

/// Update entries decode one at a time. A malformed entry is dropped
/// without discarding the rest of the batch
fn parse_patches(data: Value) -> Vec<AgentPatch> {
    let entries = match data {
        Value::Array(result) => result,
        _ => {
            warn!("[viewer] Update payload was not a list");
            return Vec::new();
        }
    };

    let mut patches = Vec::new();
    for entry in entries {
        match serde_json::from_value::<AgentPatch>(entry) {
            Ok(result) => patches.push(result),
            Err(err) => warn!("[viewer] Dropping malformed agent patch: {err:?}"),
        }
    }
    patches
}
