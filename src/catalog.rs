use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::{Error, Expert, Result};

/// Loads the expert pool from a JSON array, rejecting entries without an id and duplicate ids.
pub fn load_catalog(path: &Path) -> Result<Vec<Expert>> {
    let data = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let experts = parse_catalog(&data)?;
    info!(path = %path.display(), experts = experts.len(), "expert catalog loaded");
    Ok(experts)
}

pub fn parse_catalog(data: &str) -> Result<Vec<Expert>> {
    let entries: Vec<Value> = serde_json::from_str(data)?;
    let mut seen = HashSet::new();
    let mut experts = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let has_id = entry
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.trim().is_empty());
        if !has_id {
            return Err(Error::MissingExpertId { index });
        }
        let expert: Expert = serde_json::from_value(entry)?;
        if !seen.insert(expert.id.clone()) {
            return Err(Error::DuplicateExpertId(expert.id));
        }
        experts.push(expert);
    }
    Ok(experts)
}

pub fn find_expert<'a>(experts: &'a [Expert], expert_id: &str) -> Result<&'a Expert> {
    experts
        .iter()
        .find(|expert| expert.id == expert_id)
        .ok_or_else(|| Error::UnknownExpert(expert_id.to_string()))
}
