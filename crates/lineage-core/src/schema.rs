//! JSON document format and version handling for lineage snapshots.
//!
//! Only parent and spouse references are stored. Children and the reciprocal
//! spouse are rebuilt on load through the normal mutation rules, so a snapshot
//! that violates an invariant is rejected instead of loaded half-way.

use crate::error::{LineageError, Result};
use crate::lineage::Lineage;
use crate::person::{Gender, PersonId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CURRENT_VERSION: &str = "1.0.0";

/// On-disk snapshot of a whole lineage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageDocument {
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub next_id: u64,
    pub persons: Vec<PersonRecord>,
}

/// One person with outgoing parent and spouse references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: PersonId,
    pub name: String,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_ids: Vec<PersonId>,
    /// Written only on the lower-id side of a couple.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse_id: Option<PersonId>,
}

impl LineageDocument {
    pub fn from_lineage(lineage: &Lineage) -> Self {
        let persons = lineage
            .all_persons()
            .into_iter()
            .map(|p| PersonRecord {
                id: p.id(),
                name: p.name().to_string(),
                gender: p.gender(),
                parent_ids: p.parents().collect(),
                spouse_id: p.spouse().filter(|s| p.id() < *s),
            })
            .collect();
        Self {
            version: CURRENT_VERSION.to_string(),
            saved_at: Utc::now(),
            next_id: lineage.next_id().get(),
            persons,
        }
    }

    /// Rebuild a lineage, re-validating every invariant.
    pub fn into_lineage(self) -> Result<Lineage> {
        validate_version(&self)?;
        if self.next_id == u64::MAX {
            return Err(LineageError::CorruptData(format!(
                "next ID {} leaves no room for new persons",
                self.next_id
            )));
        }
        let mut lineage = Lineage::with_next_id(self.next_id);

        // Shells first so forward references resolve.
        for record in &self.persons {
            lineage.insert_loaded(record.id, &record.name, record.gender)?;
        }

        for record in &self.persons {
            if record.parent_ids.len() > 2 {
                return Err(LineageError::CorruptData(format!(
                    "{} lists {} parents",
                    record.id,
                    record.parent_ids.len()
                )));
            }
            for parent in &record.parent_ids {
                lineage
                    .add_parent(record.id, *parent)
                    .map_err(|e| corrupt(record.id, e))?;
            }
        }

        for record in &self.persons {
            let Some(spouse) = record.spouse_id else {
                continue;
            };
            let already_linked = lineage
                .find_person_by_id(record.id)
                .is_some_and(|p| p.spouse() == Some(spouse));
            if !already_linked {
                lineage
                    .add_spouse(record.id, spouse)
                    .map_err(|e| corrupt(record.id, e))?;
            }
        }

        Ok(lineage)
    }
}

fn corrupt(id: PersonId, err: LineageError) -> LineageError {
    let detail = match err {
        LineageError::InvalidRelation(msg) | LineageError::NotFound(msg) => msg,
        other => other.to_string(),
    };
    warn!(%id, %detail, "rejecting snapshot record");
    LineageError::CorruptData(format!("record {id}: {detail}"))
}

/// Validate a document's schema version.
pub fn validate_version(doc: &LineageDocument) -> Result<()> {
    if doc.version != CURRENT_VERSION {
        return Err(LineageError::CorruptData(format!(
            "version mismatch: expected {}, found {}",
            CURRENT_VERSION, doc.version
        )));
    }
    Ok(())
}

/// Serialize a lineage to a pretty-printed JSON string.
pub fn to_json(lineage: &Lineage) -> Result<String> {
    serde_json::to_string_pretty(&LineageDocument::from_lineage(lineage))
        .map_err(|e| LineageError::CorruptData(format!("failed to serialize lineage: {e}")))
}

/// Deserialize and validate a lineage from a JSON string.
pub fn from_json(json: &str) -> Result<Lineage> {
    let doc: LineageDocument = serde_json::from_str(json)
        .map_err(|e| LineageError::CorruptData(format!("failed to parse lineage JSON: {e}")))?;
    doc.into_lineage()
}
