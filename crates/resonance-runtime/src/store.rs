//! Category store: the engine's only mutable shared state.
//!
//! Readers take a cheap snapshot (an `Arc` of the category list plus the
//! generation it was taken at) and rank/test against it without holding any
//! lock. Writers go through [`CategoryStore::commit_update`] or
//! [`CategoryStore::commit_create`], which compare the caller's generation
//! with the current one under the write lock. A mismatch means another commit
//! landed since the snapshot was taken, and the caller must search again.
//!
//! Categories are appended, updated in place, and never removed.

use resonance_core::error::{ResonanceError, Result};
use resonance_core::types::{Category, CategoryIndex, CategoryRecord};
use std::sync::{Arc, RwLock};

/// Read-only view of the store at one generation.
#[derive(Debug)]
pub struct StoreSnapshot<W> {
    generation: u64,
    categories: Arc<Vec<Category<W>>>,
}

impl<W> Clone for StoreSnapshot<W> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            categories: Arc::clone(&self.categories),
        }
    }
}

impl<W> StoreSnapshot<W> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Categories in creation order.
    pub fn categories(&self) -> &[Category<W>] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, index: CategoryIndex) -> Option<&Category<W>> {
        position_of(&self.categories, index).map(|pos| &self.categories[pos])
    }
}

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    pub index: CategoryIndex,
    pub sample_count: u64,
    /// Logical sequence number assigned to the committed input.
    pub sequence: u64,
    pub created: bool,
}

/// Outcome of an optimistic commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(Committed),
    /// The snapshot was superseded; nothing was written.
    Stale,
}

struct StoreState<W> {
    generation: u64,
    next_index: CategoryIndex,
    sequence: u64,
    categories: Arc<Vec<Category<W>>>,
}

/// Append-mostly, concurrency-safe category collection.
pub struct CategoryStore<W> {
    state: RwLock<StoreState<W>>,
    capacity: usize,
}

fn position_of<W>(categories: &[Category<W>], index: CategoryIndex) -> Option<usize> {
    categories.binary_search_by_key(&index, |c| c.index).ok()
}

impl<W: Clone> CategoryStore<W> {
    /// Create an empty store holding at most `capacity` categories.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: RwLock::new(StoreState {
                generation: 0,
                next_index: CategoryIndex(0),
                sequence: 0,
                categories: Arc::new(Vec::new()),
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Take a read-only snapshot.
    pub fn snapshot(&self) -> Result<StoreSnapshot<W>> {
        let state = self.state.read().map_err(ResonanceError::poisoned)?;
        Ok(StoreSnapshot {
            generation: state.generation,
            categories: Arc::clone(&state.categories),
        })
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.snapshot()?.len())
    }

    /// Number of inputs committed so far.
    pub fn sequence(&self) -> Result<u64> {
        Ok(self.state.read().map_err(ResonanceError::poisoned)?.sequence)
    }

    /// Apply `update` to category `index` if the store is still at `generation`.
    ///
    /// `update` runs under the write lock against the current weight.
    pub fn commit_update<F>(&self, generation: u64, index: CategoryIndex, update: F) -> Result<CommitOutcome>
    where
        F: FnOnce(&W) -> W,
    {
        let mut state = self.state.write().map_err(ResonanceError::poisoned)?;
        if state.generation != generation {
            return Ok(CommitOutcome::Stale);
        }
        let position = position_of(&state.categories, index)
            .ok_or(ResonanceError::UnknownCategory(index))?;

        let sequence = state.sequence;
        let categories = Arc::make_mut(&mut state.categories);
        let category = &mut categories[position];
        category.weight = update(&category.weight);
        category.sample_count += 1;
        let sample_count = category.sample_count;

        state.sequence += 1;
        state.generation += 1;

        Ok(CommitOutcome::Committed(Committed {
            index,
            sample_count,
            sequence,
            created: false,
        }))
    }

    /// Append a category with `weight` if the store is still at `generation`.
    pub fn commit_create(&self, generation: u64, weight: W) -> Result<CommitOutcome> {
        let mut state = self.state.write().map_err(ResonanceError::poisoned)?;
        if state.generation != generation {
            return Ok(CommitOutcome::Stale);
        }
        if state.categories.len() >= self.capacity {
            return Err(ResonanceError::CapacityExceeded {
                limit: self.capacity,
            });
        }

        let index = state.next_index;
        let sequence = state.sequence;
        Arc::make_mut(&mut state.categories).push(Category {
            index,
            weight,
            sample_count: 1,
            created_at_seq: sequence,
        });

        state.next_index = index.next();
        state.sequence += 1;
        state.generation += 1;

        Ok(CommitOutcome::Committed(Committed {
            index,
            sample_count: 1,
            sequence,
            created: true,
        }))
    }

    /// Ordered `(index, weight, sample_count)` rows for persistence.
    pub fn export(&self) -> Result<Vec<CategoryRecord<W>>> {
        Ok(self
            .snapshot()?
            .categories()
            .iter()
            .map(CategoryRecord::from)
            .collect())
    }

    /// Append previously exported rows.
    ///
    /// The store need not be empty. Indices must be strictly increasing and
    /// greater than every index already in the store. Nothing is written
    /// unless every row is valid.
    pub fn import(&self, records: Vec<CategoryRecord<W>>) -> Result<usize> {
        let mut state = self.state.write().map_err(ResonanceError::poisoned)?;

        let mut floor = state.categories.last().map(|c| c.index);
        for record in &records {
            if let Some(prev) = floor {
                if record.index <= prev {
                    return Err(ResonanceError::invalid_import(format!(
                        "index {} does not follow {}",
                        record.index, prev
                    )));
                }
            }
            if record.sample_count == 0 {
                return Err(ResonanceError::invalid_import(format!(
                    "category {} has zero samples",
                    record.index
                )));
            }
            if record.created_at_seq == u64::MAX {
                return Err(ResonanceError::invalid_import(format!(
                    "category {} has no sequence number left after it",
                    record.index
                )));
            }
            floor = Some(record.index);
        }
        if state.categories.len() + records.len() > self.capacity {
            return Err(ResonanceError::CapacityExceeded {
                limit: self.capacity,
            });
        }

        let imported = records.len();
        let max_seq = records.iter().map(|r| r.created_at_seq + 1).max().unwrap_or(0);
        if let Some(prev) = floor {
            state.next_index = state.next_index.max(prev.next());
        }
        state.sequence = state.sequence.max(max_seq);
        Arc::make_mut(&mut state.categories).extend(records.into_iter().map(Category::from));
        state.generation += 1;

        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed(outcome: CommitOutcome) -> Committed {
        match outcome {
            CommitOutcome::Committed(c) => c,
            CommitOutcome::Stale => panic!("unexpected stale commit"),
        }
    }

    #[test]
    fn create_assigns_increasing_indices() {
        let store: CategoryStore<f64> = CategoryStore::new(10);
        let a = committed(store.commit_create(0, 1.0).unwrap());
        let b = committed(store.commit_create(1, 2.0).unwrap());
        assert_eq!(a.index, CategoryIndex(0));
        assert_eq!(b.index, CategoryIndex(1));
        assert_eq!((a.sequence, b.sequence), (0, 1));
        assert!(a.created && b.created);
    }

    #[test]
    fn stale_generation_writes_nothing() {
        let store: CategoryStore<f64> = CategoryStore::new(10);
        let snap = store.snapshot().unwrap();
        committed(store.commit_create(snap.generation(), 1.0).unwrap());

        // A second writer working from the same snapshot loses the race.
        assert_eq!(store.commit_create(snap.generation(), 9.0).unwrap(), CommitOutcome::Stale);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn update_increments_samples_and_rewrites_weight() {
        let store: CategoryStore<f64> = CategoryStore::new(10);
        committed(store.commit_create(0, 1.0).unwrap());
        let c = committed(store.commit_update(1, CategoryIndex(0), |w| w + 0.5).unwrap());
        assert_eq!(c.sample_count, 2);
        assert!(!c.created);
        assert_eq!(store.snapshot().unwrap().get(CategoryIndex(0)).unwrap().weight, 1.5);
    }

    #[test]
    fn snapshots_are_isolated_from_later_commits() {
        let store: CategoryStore<f64> = CategoryStore::new(10);
        committed(store.commit_create(0, 1.0).unwrap());
        let before = store.snapshot().unwrap();
        committed(store.commit_update(1, CategoryIndex(0), |_| 7.0).unwrap());
        assert_eq!(before.get(CategoryIndex(0)).unwrap().weight, 1.0);
        assert_eq!(store.snapshot().unwrap().get(CategoryIndex(0)).unwrap().weight, 7.0);
    }

    #[test]
    fn create_at_capacity_fails() {
        let store: CategoryStore<f64> = CategoryStore::new(1);
        committed(store.commit_create(0, 1.0).unwrap());
        assert!(matches!(
            store.commit_create(1, 2.0),
            Err(ResonanceError::CapacityExceeded { limit: 1 })
        ));
    }

    #[test]
    fn import_rejects_non_increasing_indices() {
        let store: CategoryStore<f64> = CategoryStore::new(10);
        let rows = vec![
            CategoryRecord { index: CategoryIndex(0), weight: 1.0, sample_count: 1, created_at_seq: 0 },
            CategoryRecord { index: CategoryIndex(0), weight: 2.0, sample_count: 1, created_at_seq: 1 },
        ];
        assert!(matches!(store.import(rows), Err(ResonanceError::InvalidImport(_))));
        assert_eq!(store.len().unwrap(), 0, "failed import must not write");
    }

    #[test]
    fn import_continues_numbering_after_last_index() {
        let store: CategoryStore<f64> = CategoryStore::new(10);
        let rows = vec![
            CategoryRecord { index: CategoryIndex(0), weight: 1.0, sample_count: 3, created_at_seq: 0 },
            CategoryRecord { index: CategoryIndex(4), weight: 2.0, sample_count: 1, created_at_seq: 6 },
        ];
        assert_eq!(store.import(rows).unwrap(), 2);
        let gen = store.snapshot().unwrap().generation();
        let next = committed(store.commit_create(gen, 3.0).unwrap());
        assert_eq!(next.index, CategoryIndex(5));
        assert_eq!(next.sequence, 7);
    }

    #[test]
    fn import_rejects_exhausted_sequence() {
        let store: CategoryStore<f64> = CategoryStore::new(10);
        let rows = vec![CategoryRecord {
            index: CategoryIndex(0),
            weight: 1.0,
            sample_count: 1,
            created_at_seq: u64::MAX,
        }];
        assert!(matches!(store.import(rows), Err(ResonanceError::InvalidImport(_))));
        assert_eq!(store.len().unwrap(), 0);
        assert_eq!(store.sequence().unwrap(), 0);
    }

    #[test]
    fn import_appends_after_existing_categories() {
        let store: CategoryStore<f64> = CategoryStore::new(10);
        committed(store.commit_create(0, 1.0).unwrap());
        let rows = vec![CategoryRecord { index: CategoryIndex(3), weight: 2.0, sample_count: 2, created_at_seq: 4 }];
        assert_eq!(store.import(rows).unwrap(), 1);
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.categories().iter().map(|c| c.index.0).collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(store.sequence().unwrap(), 5);
    }

    #[test]
    fn export_preserves_order() {
        let store: CategoryStore<f64> = CategoryStore::new(10);
        committed(store.commit_create(0, 1.0).unwrap());
        committed(store.commit_create(1, 2.0).unwrap());
        let rows = store.export().unwrap();
        assert_eq!(rows.iter().map(|r| r.index.0).collect::<Vec<_>>(), vec![0, 1]);
    }
}
