//! Live event pulls and the one-shot event catalog.

use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::{debug, warn};
use volplay_core::{CatalogEntry, Result, SequenceEvent, SequenceHandle};
use volplay_media::SequenceSource;

/// Events crossed during one tick; almost always zero or one.
pub type EventBatch = SmallVec<[SequenceEvent; 4]>;

/// Drain the events the decode cursor crossed since the previous pull, in
/// the order the source reports them.
pub fn pull_events(source: &mut dyn SequenceSource, handle: SequenceHandle) -> Result<EventBatch> {
    let count = source.pull_new_events(handle)?;
    let mut batch = EventBatch::new();
    for index in 0..count {
        let event = SequenceEvent::from(source.event(handle, index)?);
        if let Some(previous) = batch.last() {
            if event.frame < previous.frame {
                debug!(
                    "Event at frame {} pulled after frame {}",
                    event.frame, previous.frame
                );
            }
        }
        batch.push(event);
    }
    Ok(batch)
}

/// Every named event of a sequence, sorted for listing, plus a name lookup.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    entries: Vec<CatalogEntry>,
    frames_by_name: HashMap<String, u32>,
}

impl EventCatalog {
    /// Build from entries in file order. When a name repeats, the first
    /// registration wins the lookup.
    pub fn new(mut entries: Vec<CatalogEntry>) -> Self {
        let mut frames_by_name = HashMap::with_capacity(entries.len());
        for entry in &entries {
            if frames_by_name.contains_key(&entry.name) {
                warn!("Duplicate event name {} at frame {}", entry.name, entry.frame);
                continue;
            }
            frames_by_name.insert(entry.name.clone(), entry.frame);
        }
        sort_by_frame(&mut entries);
        Self {
            entries,
            frames_by_name,
        }
    }

    pub fn load(source: &dyn SequenceSource, handle: SequenceHandle) -> Result<Self> {
        Ok(Self::new(source.event_catalog(handle)?))
    }

    /// Entries in non-decreasing frame order; ties keep file order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn frame_of(&self, name: &str) -> Option<u32> {
        self.frames_by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stable insertion sort on frame index.
fn sort_by_frame(entries: &mut [CatalogEntry]) {
    for i in 1..entries.len() {
        let mut j = i;
        while j > 0 && entries[j - 1].frame > entries[j].frame {
            entries.swap(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sort_keeps_tie_order() {
        let catalog = EventCatalog::new(vec![
            CatalogEntry::new(30, "c"),
            CatalogEntry::new(10, "a1"),
            CatalogEntry::new(20, "b"),
            CatalogEntry::new(10, "a2"),
        ]);
        let names: Vec<_> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a1", "a2", "b", "c"]);
    }

    #[test]
    fn test_first_registration_wins() {
        let catalog = EventCatalog::new(vec![
            CatalogEntry::new(50, "hit"),
            CatalogEntry::new(5, "hit"),
        ]);
        assert_eq!(catalog.frame_of("hit"), Some(50));
        assert_eq!(catalog.frame_of("miss"), None);
        assert_eq!(catalog.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_catalog_sort_is_stable(frames in proptest::collection::vec(0u32..20, 0..60)) {
            let entries: Vec<_> = frames
                .iter()
                .enumerate()
                .map(|(i, &frame)| CatalogEntry::new(frame, i.to_string()))
                .collect();
            let catalog = EventCatalog::new(entries);
            for pair in catalog.entries().windows(2) {
                prop_assert!(pair[0].frame <= pair[1].frame);
                if pair[0].frame == pair[1].frame {
                    let a: usize = pair[0].name.parse().unwrap();
                    let b: usize = pair[1].name.parse().unwrap();
                    prop_assert!(a < b);
                }
            }
        }
    }
}
