//! Ordered container with lazy removal
//!
//! Every registry in the engine (bodies, colliders, update and render
//! subscribers, type groups) is a `SceneList`. Removal normally only sets a
//! tombstone; the entry is physically excised by the next `sweep`, so a
//! callback running while a list is being walked can safely ask for removals.

/// Insertion-ordered list with a tombstone per entry.
#[derive(Debug, Clone)]
pub struct SceneList<T> {
    items: Vec<T>,
    dead: Vec<bool>,
}

impl<T> Default for SceneList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SceneList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            dead: Vec::new(),
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.dead.push(false);
    }

    /// Tombstone every live entry matching `pred`. Returns how many were flagged.
    pub fn kill_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let mut flagged = 0;
        for (item, dead) in self.items.iter().zip(self.dead.iter_mut()) {
            if !*dead && pred(item) {
                *dead = true;
                flagged += 1;
            }
        }
        flagged
    }

    /// Remove matching entries right away, keeping the order of the rest.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        let keep: Vec<bool> = self.items.iter().map(|item| !pred(item)).collect();
        let mut items_keep = keep.iter().copied();
        let mut dead_keep = keep.iter().copied();
        self.items.retain(|_| items_keep.next().unwrap_or(true));
        self.dead.retain(|_| dead_keep.next().unwrap_or(true));
        before - self.items.len()
    }

    /// Excise every tombstoned entry in one pass, preserving survivor order.
    pub fn sweep(&mut self) -> usize {
        let before = self.items.len();
        let mut flags = self.dead.iter().copied();
        self.items.retain(|_| !flags.next().unwrap_or(false));
        self.dead.retain(|dead| !dead);
        before - self.items.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.dead.iter().filter(|dead| !**dead).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries still physically stored, tombstoned ones included.
    pub fn stored_len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        match self.dead.get(index) {
            Some(false) => self.items.get(index),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        match self.dead.get(index) {
            Some(false) => self.items.get_mut(index),
            _ => None,
        }
    }

    /// Live entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items
            .iter()
            .zip(self.dead.iter())
            .filter(|(_, dead)| !**dead)
            .map(|(item, _)| item)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items
            .iter_mut()
            .zip(self.dead.iter())
            .filter(|(_, dead)| !**dead)
            .map(|(item, _)| item)
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|it| it == item)
    }
}

impl<T: Clone> SceneList<T> {
    /// Copy of the live entries, for walks that may mutate the list.
    pub fn snapshot(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_is_lazy_until_sweep() {
        let mut list = SceneList::new();
        for i in 0..5 {
            list.push(i);
        }

        assert_eq!(list.kill_where(|v| v % 2 == 1), 2);
        assert_eq!(list.len(), 3);
        assert_eq!(list.stored_len(), 5);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0, 2, 4]);

        assert_eq!(list.sweep(), 2);
        assert_eq!(list.stored_len(), 3);
        assert_eq!(list.get(1), Some(&2));
    }

    #[test]
    fn test_kill_twice_counts_once() {
        let mut list = SceneList::new();
        list.push("a");
        assert_eq!(list.kill_where(|s| *s == "a"), 1);
        assert_eq!(list.kill_where(|s| *s == "a"), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_where_is_eager_and_keeps_tombstones_aligned() {
        let mut list = SceneList::new();
        for i in 0..4 {
            list.push(i);
        }
        list.kill_where(|v| *v == 3);
        assert_eq!(list.remove_where(|v| *v == 1), 1);
        assert_eq!(list.stored_len(), 3);
        // 3 is still tombstoned after the shift
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(list.get(2), None);
    }

    #[test]
    fn test_sweep_preserves_order() {
        let mut list = SceneList::new();
        for c in ['a', 'b', 'c', 'd', 'e'] {
            list.push(c);
        }
        list.kill_where(|c| *c == 'a' || *c == 'd');
        list.sweep();
        assert_eq!(list.snapshot(), vec!['b', 'c', 'e']);
    }

    #[test]
    fn test_get_skips_dead() {
        let mut list = SceneList::new();
        list.push(10);
        list.kill_where(|_| true);
        assert!(list.get(0).is_none());
        assert!(list.get_mut(0).is_none());
        assert!(!list.contains(&10));
    }
}
