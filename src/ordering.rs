//! Position-based mutation of ordered child lists.
//!
//! The order of items is their index in the list; no separate order field is kept.

use std::collections::HashSet;

use thiserror::Error;

/// Items with a stable identifier, independent of their position
pub trait Identified {
    fn id(&self) -> &str;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderingError {
    #[error("no item with id `{0}`")]
    NotFound(String),
    #[error("position {position} is out of range for a list of {len} items")]
    OutOfRange { position: usize, len: usize },
}

pub fn position_of<T: Identified>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Remove every item whose id is listed and return them in list order.
///
/// All ids are resolved before anything is removed: an unknown id fails the whole
/// batch and leaves the list untouched. Repeated ids are removed once.
pub fn delete_batch<T, S>(items: &mut Vec<T>, ids: &[S]) -> Result<Vec<T>, OrderingError>
where
    T: Identified,
    S: AsRef<str>,
{
    let mut selected: HashSet<&str> = HashSet::new();
    for id in ids {
        let id = id.as_ref();
        if position_of(items, id).is_none() {
            return Err(OrderingError::NotFound(id.to_string()));
        }
        selected.insert(id);
    }

    let (removed, kept): (Vec<T>, Vec<T>) = items
        .drain(..)
        .partition(|item| selected.contains(item.id()));
    *items = kept;
    Ok(removed)
}

/// Relocate the item at `old` so that it ends up at index `new`.
///
/// The item is removed first and then inserted into the shrunk list, so this is a
/// single-element move, not a swap.
pub fn move_item<T>(items: &mut Vec<T>, old: usize, new: usize) -> Result<(), OrderingError> {
    let len = items.len();
    if old >= len {
        return Err(OrderingError::OutOfRange { position: old, len });
    }
    if new >= len {
        return Err(OrderingError::OutOfRange { position: new, len });
    }

    let moved = items.remove(old);
    items.insert(new, moved);
    Ok(())
}

/// Move the identified item one slot towards the front. Returns false at the first slot.
pub fn move_up<T: Identified>(items: &mut [T], id: &str) -> Result<bool, OrderingError> {
    let position =
        position_of(items, id).ok_or_else(|| OrderingError::NotFound(id.to_string()))?;
    if position == 0 {
        return Ok(false);
    }
    items.swap(position - 1, position);
    Ok(true)
}

/// Move the identified item one slot towards the back. Returns false at the last slot.
pub fn move_down<T: Identified>(items: &mut [T], id: &str) -> Result<bool, OrderingError> {
    let position =
        position_of(items, id).ok_or_else(|| OrderingError::NotFound(id.to_string()))?;
    if position + 1 >= items.len() {
        return Ok(false);
    }
    items.swap(position, position + 1);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
    struct Item(&'static str);

    impl Identified for Item {
        fn id(&self) -> &str {
            self.0
        }
    }

    fn items(ids: &[&'static str]) -> Vec<Item> {
        ids.iter().map(|id| Item(*id)).collect()
    }

    fn ids(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|item| item.0).collect()
    }

    #[test]
    fn test_move_last_to_front() {
        let mut list = items(&["A", "B", "C", "D"]);
        move_item(&mut list, 3, 0).unwrap();
        assert_eq!(ids(&list), vec!["D", "A", "B", "C"]);
    }

    #[test]
    fn test_move_front_to_back() {
        let mut list = items(&["A", "B", "C", "D"]);
        move_item(&mut list, 0, 3).unwrap();
        assert_eq!(ids(&list), vec!["B", "C", "D", "A"]);
    }

    #[test]
    fn test_move_to_same_position_is_identity() {
        let mut list = items(&["A", "B", "C"]);
        move_item(&mut list, 1, 1).unwrap();
        assert_eq!(ids(&list), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_move_preserves_elements() {
        let original = items(&["A", "B", "C", "D", "E"]);
        for old in 0..original.len() {
            for new in 0..original.len() {
                let mut list = original.clone();
                move_item(&mut list, old, new).unwrap();

                assert_eq!(list[new], original[old]);
                let mut sorted = list.clone();
                sorted.sort();
                let mut expected = original.clone();
                expected.sort();
                assert_eq!(sorted, expected, "move {} -> {}", old, new);

                // Every other element keeps its relative order
                let others: Vec<&Item> = list.iter().filter(|i| **i != original[old]).collect();
                let original_others: Vec<&Item> =
                    original.iter().filter(|i| **i != original[old]).collect();
                assert_eq!(others, original_others);
            }
        }
    }

    #[test]
    fn test_move_out_of_range() {
        let mut list = items(&["A", "B"]);
        assert_eq!(
            move_item(&mut list, 2, 0),
            Err(OrderingError::OutOfRange { position: 2, len: 2 })
        );
        assert_eq!(
            move_item(&mut list, 0, 2),
            Err(OrderingError::OutOfRange { position: 2, len: 2 })
        );
        assert_eq!(ids(&list), vec!["A", "B"]);
    }

    #[test]
    fn test_delete_batch() {
        let mut list = items(&["a", "x", "b", "y", "c"]);
        let removed = delete_batch(&mut list, &["y", "x"]).unwrap();
        assert_eq!(ids(&list), vec!["a", "b", "c"]);
        assert_eq!(ids(&removed), vec!["x", "y"]);
    }

    #[test]
    fn test_delete_batch_unknown_id_leaves_list_untouched() {
        let mut list = items(&["a", "x", "b", "y", "c"]);
        let result = delete_batch(&mut list, &["x", "nope"]);
        assert_eq!(result, Err(OrderingError::NotFound("nope".to_string())));
        assert_eq!(ids(&list), vec!["a", "x", "b", "y", "c"]);
    }

    #[test]
    fn test_delete_batch_repeated_id() {
        let mut list = items(&["a", "b"]);
        let removed = delete_batch(&mut list, &["a", "a"]).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(ids(&list), vec!["b"]);
    }

    #[test]
    fn test_delete_batch_empty_selection() {
        let mut list = items(&["a", "b"]);
        let removed = delete_batch::<_, &str>(&mut list, &[]).unwrap();
        assert!(removed.is_empty());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_move_up_and_down() {
        let mut list = items(&["A", "B", "C"]);
        assert_eq!(move_up(&mut list, "C"), Ok(true));
        assert_eq!(ids(&list), vec!["A", "C", "B"]);
        assert_eq!(move_down(&mut list, "A"), Ok(true));
        assert_eq!(ids(&list), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_move_up_down_at_edges() {
        let mut list = items(&["A", "B"]);
        assert_eq!(move_up(&mut list, "A"), Ok(false));
        assert_eq!(move_down(&mut list, "B"), Ok(false));
        assert_eq!(ids(&list), vec!["A", "B"]);
        assert_eq!(
            move_up(&mut list, "Z"),
            Err(OrderingError::NotFound("Z".to_string()))
        );
    }
}
