use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// Node in a persistent binary search tree. Never mutated after creation.
#[derive(Debug)]
struct SetNode<T> {
    value: T,
    left: Option<Rc<SetNode<T>>>,
    right: Option<Rc<SetNode<T>>>,
}

/// Immutable ordered set with structural sharing.
///
/// `insert` returns a new set and leaves `self` untouched. Only the nodes on
/// the path from the root to the new leaf are copied; every other subtree is
/// shared between the old and new versions, so snapshots are cheap to keep.
/// The tree is not rebalanced.
pub struct PersistentSet<T> {
    root: Option<Rc<SetNode<T>>>,
    len: usize,
}

impl<T> Clone for PersistentSet<T> {
    fn clone(&self) -> Self {
        PersistentSet {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<T> Default for PersistentSet<T> {
    fn default() -> Self {
        PersistentSet { root: None, len: 0 }
    }
}

impl<T: Ord + Clone> PersistentSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// True when both sets share the same root node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns a set that also contains `value`.
    ///
    /// If `value` is already present the returned set shares its root with
    /// `self` (see [`PersistentSet::ptr_eq`]).
    pub fn insert(&self, value: T) -> Self {
        match &self.root {
            None => PersistentSet {
                root: Some(Rc::new(SetNode {
                    value,
                    left: None,
                    right: None,
                })),
                len: 1,
            },
            Some(root) => {
                let new_root = Self::insert_recursive(root, value);
                if Rc::ptr_eq(&new_root, root) {
                    self.clone()
                } else {
                    PersistentSet {
                        root: Some(new_root),
                        len: self.len + 1,
                    }
                }
            }
        }
    }

    fn insert_recursive(node: &Rc<SetNode<T>>, value: T) -> Rc<SetNode<T>> {
        match value.cmp(&node.value) {
            Ordering::Equal => Rc::clone(node),
            Ordering::Less => {
                let new_left = match &node.left {
                    None => Rc::new(SetNode {
                        value,
                        left: None,
                        right: None,
                    }),
                    Some(left) => {
                        let new_left = Self::insert_recursive(left, value);
                        if Rc::ptr_eq(&new_left, left) {
                            return Rc::clone(node);
                        }
                        new_left
                    }
                };
                Rc::new(SetNode {
                    value: node.value.clone(),
                    left: Some(new_left),
                    right: node.right.clone(),
                })
            }
            Ordering::Greater => {
                let new_right = match &node.right {
                    None => Rc::new(SetNode {
                        value,
                        left: None,
                        right: None,
                    }),
                    Some(right) => {
                        let new_right = Self::insert_recursive(right, value);
                        if Rc::ptr_eq(&new_right, right) {
                            return Rc::clone(node);
                        }
                        new_right
                    }
                };
                Rc::new(SetNode {
                    value: node.value.clone(),
                    left: node.left.clone(),
                    right: Some(new_right),
                })
            }
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        let mut cursor = &self.root;
        while let Some(node) = cursor {
            match value.cmp(&node.value) {
                Ordering::Equal => return true,
                Ordering::Less => cursor = &node.left,
                Ordering::Greater => cursor = &node.right,
            }
        }
        false
    }

    /// Values in ascending order.
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len);
        Self::collect_recursive(&self.root, &mut out);
        out
    }

    fn collect_recursive(node: &Option<Rc<SetNode<T>>>, out: &mut Vec<T>) {
        if let Some(n) = node {
            Self::collect_recursive(&n.left, out);
            out.push(n.value.clone());
            Self::collect_recursive(&n.right, out);
        }
    }
}

impl<T: Ord + Clone + fmt::Debug> fmt::Debug for PersistentSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.to_vec()).finish()
    }
}
