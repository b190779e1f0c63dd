//! Program store abstraction.
//!
//! The EPG builder only ever looks programs up by id, creates them, and
//! applies partial updates. [`MemoryStore`] keeps everything in a map and
//! journals every write, which is what tests and `--dry-run` use; the SQLite
//! backend lives in [`crate::database`].

use std::collections::HashMap;

use epg_protocol::{Program, ProgramId, ProgramPatch};
use thiserror::Error;

/// Store failure. The builder logs these and carries on.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Program not found: {0}")]
    NotFound(ProgramId),

    #[error("Program already exists: {0}")]
    AlreadyExists(ProgramId),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Keyed program store the builder writes into.
pub trait ProgramStore: Send + 'static {
    /// Look up an existing program.
    fn get(&self, id: ProgramId) -> Result<Option<Program>, StoreError>;

    /// Create a program record.
    fn add(&mut self, program: Program) -> Result<(), StoreError>;

    /// Apply a partial update to an existing program.
    fn update(&mut self, id: ProgramId, patch: ProgramPatch) -> Result<(), StoreError>;
}

/// A write observed by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    Add(Program),
    Update(ProgramId, ProgramPatch),
}

/// In-memory store with a write journal.
#[derive(Debug, Default)]
pub struct MemoryStore {
    programs: HashMap<ProgramId, Program>,
    writes: Vec<StoreWrite>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a program without journaling it.
    pub fn insert(&mut self, program: Program) {
        self.programs.insert(program.id, program);
    }

    pub fn program(&self, id: ProgramId) -> Option<&Program> {
        self.programs.get(&id)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Every successful add/update, in order.
    pub fn writes(&self) -> &[StoreWrite] {
        &self.writes
    }

    /// Updates issued for one program, in order.
    pub fn updates_for(&self, id: ProgramId) -> Vec<&ProgramPatch> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                StoreWrite::Update(target, patch) if *target == id => Some(patch),
                _ => None,
            })
            .collect()
    }
}

impl ProgramStore for MemoryStore {
    fn get(&self, id: ProgramId) -> Result<Option<Program>, StoreError> {
        Ok(self.programs.get(&id).cloned())
    }

    fn add(&mut self, program: Program) -> Result<(), StoreError> {
        if self.programs.contains_key(&program.id) {
            return Err(StoreError::AlreadyExists(program.id));
        }
        self.writes.push(StoreWrite::Add(program.clone()));
        self.programs.insert(program.id, program);
        Ok(())
    }

    fn update(&mut self, id: ProgramId, patch: ProgramPatch) -> Result<(), StoreError> {
        let program = self.programs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        program.apply(patch.clone());
        self.writes.push(StoreWrite::Update(id, patch));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epg_protocol::ProgramSchedule;

    fn program(eid: u16) -> Program {
        Program::new(
            1,
            2,
            eid,
            ProgramSchedule {
                start_at: 1000,
                duration: 60_000,
                is_free: true,
                is_present_following: false,
            },
        )
    }

    #[test]
    fn test_add_get_update() {
        let mut store = MemoryStore::new();
        let p = program(3);
        let id = p.id;

        store.add(p.clone()).unwrap();
        assert_eq!(store.get(id).unwrap(), Some(p));

        store
            .update(
                id,
                ProgramPatch::ShortEvent {
                    name: "News".to_string(),
                    description: String::new(),
                },
            )
            .unwrap();
        assert_eq!(store.program(id).unwrap().name.as_deref(), Some("News"));
        assert_eq!(store.writes().len(), 2);
        assert_eq!(store.updates_for(id).len(), 1);
    }

    #[test]
    fn test_duplicate_add_and_missing_update() {
        let mut store = MemoryStore::new();
        store.add(program(3)).unwrap();

        assert!(matches!(
            store.add(program(3)),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(matches!(
            store.update(ProgramId::new(9, 9, 9), ProgramPatch::Genres(vec![])),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.writes().len(), 1);
    }

    #[test]
    fn test_seeded_programs_are_not_journaled() {
        let mut store = MemoryStore::new();
        store.insert(program(5));
        assert_eq!(store.len(), 1);
        assert!(store.writes().is_empty());
    }
}
