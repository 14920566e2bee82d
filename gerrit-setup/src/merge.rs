use horizon_admin_client::ClientRecord;
use serde_json::Value;

/// Merge the desired attributes into an existing record.
///
/// Desired values win. Keys only present in the existing record are kept. Nested objects are
/// merged recursively, everything else (including arrays) gets replaced.
pub fn merge(existing: &mut ClientRecord, desired: &ClientRecord) {
    for (key, value) in desired {
        if let (Some(Value::Object(target)), Value::Object(source)) = (existing.get_mut(key), value)
        {
            merge(target, source);
            continue;
        }
        existing.insert(key.clone(), value.clone());
    }
}

/// Like [`merge`], but returns a new record.
pub fn merged(existing: &ClientRecord, desired: &ClientRecord) -> ClientRecord {
    let mut result = existing.clone();
    merge(&mut result, desired);
    result
}
