use crate::snapshot::GroupedSnapshot;
use layerview_types::Application;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone)]
struct Slot {
    /// Insertion sequence; kept when a record is replaced.
    seq: u64,
    app: Arc<Application>,
}

/// Latest record per application name.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    records: HashMap<String, Slot>,
    next_seq: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `app`, replacing any record with the same name wholesale.
    /// Returns true if a previous record was replaced.
    pub fn upsert(&mut self, app: Application) -> bool {
        let name = app.name().to_string();
        let app = Arc::new(app);
        match self.records.get_mut(&name) {
            Some(slot) => {
                slot.app = app;
                trace!(app = %name, "replaced record");
                true
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.records.insert(name, Slot { seq, app });
                false
            }
        }
    }

    /// Removes the record for `name`. Absent names are a no-op.
    /// Returns true if a record was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.records.remove(name).is_some()
    }

    /// Replaces the entire contents with `apps`.
    pub fn replace_all<I>(&mut self, apps: I)
    where
        I: IntoIterator<Item = Application>,
    {
        self.records.clear();
        self.next_seq = 0;
        for app in apps {
            self.upsert(app);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Application>> {
        self.records.get(name).map(|slot| Arc::clone(&slot.app))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// An independent copy of the contents, grouped by category.
    ///
    /// Within a category, applications appear in insertion order.
    pub fn snapshot_grouped(&self) -> GroupedSnapshot {
        let mut slots: Vec<&Slot> = self.records.values().collect();
        slots.sort_unstable_by_key(|slot| slot.seq);

        let mut groups: BTreeMap<String, Vec<Arc<Application>>> = BTreeMap::new();
        for slot in slots {
            groups
                .entry(slot.app.category().to_string())
                .or_default()
                .push(Arc::clone(&slot.app));
        }
        GroupedSnapshot::from_groups(groups)
    }
}
