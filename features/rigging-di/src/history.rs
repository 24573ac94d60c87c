use crate::{key::Key, provider::Cleanup};

/// Ordered record of successful productions
///
/// Entries are appended as productions complete, so dependencies always
/// precede their dependents. Teardown walks the record backwards.
#[derive(Debug, Default)]
pub struct ProvideHistory {
    entries: Vec<HistoryEntry>,
}

#[derive(Debug)]
struct HistoryEntry {
    key: Key,
    cleanup: Option<Cleanup>,
}

impl ProvideHistory {
    pub(crate) fn add(&mut self, key: Key, cleanup: Option<Cleanup>) {
        self.entries.push(HistoryEntry { key, cleanup });
    }

    /// Produced Keys in production order, one entry per production
    pub fn keys(&self) -> Vec<Key> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the record, returning cleanups in teardown order
    pub(crate) fn drain_reverse(&mut self) -> Vec<(Key, Cleanup)> {
        self.entries
            .drain(..)
            .rev()
            .filter_map(|entry| Some((entry.key, entry.cleanup?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{key::ProviderKind, types::TypeInfo};

    fn key<T: 'static>() -> Key {
        Key::new(TypeInfo::of::<T>(), None, ProviderKind::Constructor)
    }

    #[test]
    fn drains_newest_first_and_skips_plain_entries() {
        let mut history = ProvideHistory::default();
        history.add(key::<u8>(), Some(Cleanup::new(|| ())));
        history.add(key::<u16>(), None);
        history.add(key::<u32>(), Some(Cleanup::new(|| ())));

        assert_eq!(history.keys(), vec![key::<u8>(), key::<u16>(), key::<u32>()]);

        let order: Vec<Key> = history.drain_reverse().into_iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec![key::<u32>(), key::<u8>()]);
        assert!(history.is_empty());
        assert!(history.drain_reverse().is_empty());
    }
}
