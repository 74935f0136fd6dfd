//! Folder and collection registries.
//!
//! Find-or-create over the document's folder or collection list, keyed by
//! exact name. The lists are mutated in place so items processed later in
//! the same run see entries created earlier. Safe only under the pipeline's
//! strictly sequential item scan; parallel callers would need their own
//! mutual exclusion.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use crate::models::{Collection, Folder};

/// A registry entry that can be looked up by name and created lazily.
pub(crate) trait NamedEntry {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn named(name: &str) -> Self;
}

impl NamedEntry for Folder {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        Folder::name(self)
    }

    fn named(name: &str) -> Self {
        Self {
            id: new_id(),
            name: Some(Some(name.to_string())),
            revision_date: Some(Some(now_timestamp())),
            extra: serde_json::Map::new(),
        }
    }
}

impl NamedEntry for Collection {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        Collection::name(self)
    }

    fn named(name: &str) -> Self {
        Self {
            id: new_id(),
            name: Some(Some(name.to_string())),
            revision_date: Some(Some(now_timestamp())),
            extra: serde_json::Map::new(),
        }
    }
}

/// Returns the id of the entry named `name`, creating and appending it when
/// no existing entry matches (exact, case-sensitive comparison).
pub(crate) fn find_or_create<T: NamedEntry>(entries: &mut Vec<T>, name: &str) -> String {
    if let Some(entry) = entries.iter().find(|e| e.name() == name) {
        return entry.id().to_string();
    }

    let entry = T::named(name);
    let id = entry.id().to_string();
    entries.push(entry);
    id
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
