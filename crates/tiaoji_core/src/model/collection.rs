//! Ordered school collection, the unit of persistence.
//!
//! # Invariants
//! - Record order is insertion order and is the persisted order.
//! - `last_assigned_id` never decreases while the collection is alive, so
//!   deleted ids are not handed out again.

use crate::model::school::{School, SchoolId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    records: Vec<School>,
    last_assigned_id: SchoolId,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps loaded records; the id high-water mark starts at the largest id.
    pub fn from_records(records: Vec<School>) -> Self {
        let last_assigned_id = records.iter().map(|school| school.id).max().unwrap_or(0);
        Self {
            records,
            last_assigned_id,
        }
    }

    pub fn records(&self) -> &[School] {
        &self.records
    }

    pub fn into_records(self) -> Vec<School> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: SchoolId) -> Option<&School> {
        self.records.iter().find(|school| school.id == id)
    }

    pub fn contains(&self, id: SchoolId) -> bool {
        self.get(id).is_some()
    }

    pub fn last_assigned_id(&self) -> SchoolId {
        self.last_assigned_id
    }

    /// Id the next created record will receive.
    ///
    /// Saturates at `SchoolId::MAX`; the service rejects an id that is not
    /// above the high-water mark, so a saturated id is never stored.
    pub fn next_id(&self) -> SchoolId {
        self.last_assigned_id.saturating_add(1)
    }

    /// Carries a high-water mark over from an earlier snapshot.
    pub(crate) fn raise_high_water(&mut self, id: SchoolId) {
        self.last_assigned_id = self.last_assigned_id.max(id);
    }

    pub(crate) fn push(&mut self, school: School) {
        self.last_assigned_id = self.last_assigned_id.max(school.id);
        self.records.push(school);
    }

    /// Removes records at the given indices, highest index first.
    pub(crate) fn remove_indices(&mut self, mut indices: Vec<usize>) -> usize {
        indices.sort_unstable();
        indices.dedup();
        for index in indices.iter().rev() {
            self.records.remove(*index);
        }
        indices.len()
    }

    /// Drops every record but keeps the id high-water mark.
    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::Collection;
    use crate::model::school::{NewSchool, School};

    fn school(id: u64, name: &str) -> School {
        NewSchool::new(name).into_school(id, "2024-03-01 10:00:00")
    }

    #[test]
    fn from_records_tracks_largest_id() {
        let collection = Collection::from_records(vec![school(4, "a"), school(2, "b")]);
        assert_eq!(collection.last_assigned_id(), 4);
        assert_eq!(collection.next_id(), 5);
    }

    #[test]
    fn remove_indices_is_order_independent() {
        let mut forward = Collection::from_records(vec![
            school(1, "a"),
            school(2, "b"),
            school(3, "c"),
            school(4, "d"),
        ]);
        let mut backward = forward.clone();

        assert_eq!(forward.remove_indices(vec![0, 2]), 2);
        assert_eq!(backward.remove_indices(vec![2, 0]), 2);
        assert_eq!(forward, backward);
        assert_eq!(
            forward
                .records()
                .iter()
                .map(|s| s.id)
                .collect::<Vec<_>>(),
            vec![2, 4]
        );
    }

    #[test]
    fn raise_high_water_never_lowers_the_mark() {
        let mut collection = Collection::from_records(vec![school(3, "a")]);
        collection.raise_high_water(9);
        assert_eq!(collection.next_id(), 10);
        collection.raise_high_water(4);
        assert_eq!(collection.next_id(), 10);
    }

    #[test]
    fn next_id_saturates_at_max() {
        let collection = Collection::from_records(vec![school(u64::MAX, "a")]);
        assert_eq!(collection.next_id(), u64::MAX);
    }

    #[test]
    fn clear_keeps_high_water_mark() {
        let mut collection = Collection::from_records(vec![school(7, "a")]);
        collection.clear();
        assert!(collection.is_empty());
        assert_eq!(collection.next_id(), 8);
    }
}
