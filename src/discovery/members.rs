//! Membership document parsing.
//!
//! The snapshot is written by an external agent and is treated as
//! untrusted: the document shape is checked step by step and any rejection
//! means "no usable members" rather than a hard error.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::discovery::error::ParseFailure;

/// Liveness of a cluster member as reported by the gossip agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Alive,
    Other,
}

impl From<Option<&str>> for MemberStatus {
    fn from(status: Option<&str>) -> Self {
        match status {
            Some("alive") => MemberStatus::Alive,
            _ => MemberStatus::Other,
        }
    }
}

/// One cluster member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub name: String,
    pub status: MemberStatus,
    pub tags: HashMap<String, String>,
}

impl MemberRecord {
    pub fn is_alive(&self) -> bool {
        self.status == MemberStatus::Alive
    }
}

#[derive(Debug, Deserialize)]
struct RawMember {
    name: String,
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    tags: Option<Value>,
}

impl From<RawMember> for MemberRecord {
    fn from(raw: RawMember) -> Self {
        let tags = decode_tags(&raw.name, raw.tags);
        Self {
            status: MemberStatus::from(raw.status.as_ref().and_then(Value::as_str)),
            name: raw.name,
            tags,
        }
    }
}

/// Keep the string-valued tags; anything else is dropped on its own.
fn decode_tags(member: &str, tags: Option<Value>) -> HashMap<String, String> {
    let entries = match tags {
        None | Some(Value::Null) => return HashMap::new(),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            tracing::debug!(member = %member, tags = %other, "Ignoring non-object tags");
            return HashMap::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|(tag, value)| match value {
            Value::String(value) => Some((tag, value)),
            other => {
                tracing::debug!(member = %member, tag = %tag, value = %other, "Ignoring non-string tag value");
                None
            }
        })
        .collect()
}

/// Decode a raw snapshot into member records.
///
/// Entries of the `members` list that cannot be decoded are dropped; the
/// document as a whole is only rejected when its outer shape is wrong.
pub fn parse_members(raw: &[u8]) -> Result<Vec<MemberRecord>, ParseFailure> {
    let document: Value = serde_json::from_slice(raw)?;

    let Value::Object(mut root) = document else {
        return Err(ParseFailure::NotAnObject);
    };
    let Some(members) = root.remove("members") else {
        return Err(ParseFailure::MissingMembers);
    };
    let Value::Array(entries) = members else {
        return Err(ParseFailure::MembersNotAList);
    };

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<RawMember>(entry) {
            Ok(member) => records.push(member.into()),
            Err(e) => tracing::debug!(index, error = %e, "Skipping undecodable member entry"),
        }
    }
    Ok(records)
}
