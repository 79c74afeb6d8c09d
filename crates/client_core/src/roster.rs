use shared::domain::{Student, StudentId};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Inserted,
    /// The id was already present; the existing row was overwritten in place.
    Replaced,
}

/// Ordered rows backing the table, most recent first. At most one row per id.
///
/// Rows only change through the commands below, and callers only invoke them
/// for confirmed outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterCache {
    rows: Vec<Student>,
}

impl RosterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the cache keeping the given order. Later duplicates of an id are
    /// dropped.
    pub fn from_rows(rows: impl IntoIterator<Item = Student>) -> Self {
        let mut cache = Self::new();
        for row in rows {
            if cache.contains(row.id()) {
                warn!("roster: skipping duplicate row id={} while seeding", row.id());
                continue;
            }
            cache.rows.push(row);
        }
        cache
    }

    pub fn prepend(&mut self, record: Student) -> ApplyOutcome {
        match self.position(record.id()) {
            Some(index) => {
                warn!(
                    "roster: duplicate record id={} received; replacing existing row",
                    record.id()
                );
                self.rows[index] = record;
                ApplyOutcome::Replaced
            }
            None => {
                self.rows.insert(0, record);
                ApplyOutcome::Inserted
            }
        }
    }

    /// Overwrites the row with the same id, keeping its position. Returns
    /// `false` when no such row exists.
    pub fn replace_by_id(&mut self, record: Student) -> bool {
        match self.position(record.id()) {
            Some(index) => {
                self.rows[index] = record;
                true
            }
            None => false,
        }
    }

    pub fn remove_by_id(&mut self, id: &StudentId) -> Option<Student> {
        self.position(id).map(|index| self.rows.remove(index))
    }

    pub fn get(&self, id: &StudentId) -> Option<&Student> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn contains(&self, id: &StudentId) -> bool {
        self.position(id).is_some()
    }

    pub fn rows(&self) -> &[Student] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn position(&self, id: &StudentId) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }
}

#[cfg(test)]
#[path = "tests/roster_tests.rs"]
mod tests;
