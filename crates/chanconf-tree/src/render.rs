//! JSON rendering for inspection.
//!
//! Versions render as decimal strings, payloads are decoded through the
//! schema registry, and placeholders render as `null`. Values whose key is
//! not registered for their scope render as a hex string.

use crate::error::Result;
use crate::payload::ValuePayload;
use crate::schema::{self, Scope};
use crate::tree::{Config, ConfigGroup, ConfigPolicy, ConfigValue};
use crate::update::ConfigUpdate;
use serde_json::{json, Map, Value};

/// Render a full config snapshot.
pub fn config_to_json(config: &Config) -> Result<Value> {
    Ok(json!({
        "channel_id": config.channel_id,
        "channel_group": group_to_json(&config.channel_group, &mut Vec::new())?,
        "sequence": config.sequence.to_string(),
    }))
}

/// Render a config update.
pub fn update_to_json(update: &ConfigUpdate) -> Result<Value> {
    let isolated: Map<String, Value> = update
        .isolated_data
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(hex::encode(v))))
        .collect();
    Ok(json!({
        "channel_id": update.channel_id,
        "isolated_data": isolated,
        "read_set": group_to_json(&update.read_set, &mut Vec::new())?,
        "write_set": group_to_json(&update.write_set, &mut Vec::new())?,
    }))
}

/// Render a group found at `path` below the root.
pub fn group_to_json(group: &ConfigGroup, path: &mut Vec<String>) -> Result<Value> {
    let scope = Scope::of(path.as_slice());

    let mut groups = Map::new();
    for (name, child) in &group.groups {
        path.push(name.clone());
        let rendered = group_to_json(child, path);
        path.pop();
        groups.insert(name.clone(), rendered?);
    }

    let mut values = Map::new();
    for (key, value) in &group.values {
        values.insert(key.clone(), value_to_json(scope, key, value)?);
    }

    let policies: Map<String, Value> = group
        .policies
        .iter()
        .map(|(key, policy)| (key.clone(), policy_to_json(policy)))
        .collect();

    Ok(json!({
        "groups": groups,
        "mod_policy": group.mod_policy,
        "policies": policies,
        "values": values,
        "version": group.version.to_string(),
    }))
}

fn value_to_json(scope: Option<Scope>, key: &str, value: &ConfigValue) -> Result<Value> {
    let rendered = match scope.and_then(|s| schema::value_kind(s, key)) {
        Some(kind) => match ValuePayload::decode(kind, &value.value)? {
            Some(payload) => payload.to_json()?,
            None => Value::Null,
        },
        None if value.value.is_empty() => Value::Null,
        None => Value::String(hex::encode(&value.value)),
    };
    Ok(json!({
        "mod_policy": value.mod_policy,
        "value": rendered,
        "version": value.version.to_string(),
    }))
}

fn policy_to_json(policy: &ConfigPolicy) -> Value {
    json!({
        "mod_policy": policy.mod_policy,
        "policy": policy.policy.as_ref().map_or(Value::Null, |p| p.to_json()),
        "version": policy.version.to_string(),
    })
}
