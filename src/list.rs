use std::fmt;

use crate::value::Value;

/// Index of the sentinel node. It never holds a value and closes the ring: its `next` is the
/// head of the list and its `prev` is the tail.
const ROOT: usize = 0;

/// A circular doubly-linked list rooted at a sentinel node, backing list-typed keys.
///
/// Nodes live in a single vector and link to each other by index, so pushing on either end is
/// O(1) and never moves existing elements.
#[derive(Clone)]
pub struct List {
    nodes: Vec<Node>,
}

#[derive(Clone)]
struct Node {
    value: Option<Value>,
    prev: usize,
    next: usize,
}

impl List {
    pub fn new() -> List {
        List {
            nodes: vec![Node {
                value: None,
                prev: ROOT,
                next: ROOT,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts `value` at the front of the list.
    pub fn prepend(&mut self, value: Value) {
        self.insert_after(ROOT, value);
    }

    /// Inserts `value` at the back of the list.
    pub fn append(&mut self, value: Value) {
        let tail = self.nodes[ROOT].prev;
        self.insert_after(tail, value);
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.nodes[ROOT].next,
        }
    }

    /// Linearizes the list, front to back.
    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().cloned().collect()
    }

    fn insert_after(&mut self, at: usize, value: Value) {
        let index = self.nodes.len();
        let next = self.nodes[at].next;

        self.nodes.push(Node {
            value: Some(value),
            prev: at,
            next,
        });
        self.nodes[at].next = index;
        self.nodes[next].prev = index;
    }
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut list = List::new();
        for value in iter {
            list.append(value);
        }
        list
    }
}

pub struct Iter<'a> {
    list: &'a List,
    cursor: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == ROOT {
            return None;
        }

        let node = &self.list.nodes[self.cursor];
        self.cursor = node.next;
        node.value.as_ref()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn bulk(s: &'static str) -> Value {
        Value::Bulk(Bytes::from(s))
    }

    #[test]
    fn empty() {
        let list = List::new();

        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.to_vec().is_empty());
    }

    #[test]
    fn prepend_reverses_insertion_order() {
        let mut list = List::new();
        list.prepend(bulk("a"));
        list.prepend(bulk("b"));
        list.prepend(bulk("c"));

        assert_eq!(list.len(), 3);
        assert_eq!(list.to_vec(), vec![bulk("c"), bulk("b"), bulk("a")]);
    }

    #[test]
    fn append_keeps_insertion_order() {
        let mut list = List::new();
        list.append(bulk("a"));
        list.append(bulk("b"));

        assert_eq!(list.to_vec(), vec![bulk("a"), bulk("b")]);
    }

    #[test]
    fn mixed_ends() {
        let mut list = List::new();
        list.append(bulk("b"));
        list.prepend(bulk("a"));
        list.append(bulk("c"));
        list.prepend(Value::Integer(0));

        assert_eq!(
            list.to_vec(),
            vec![Value::Integer(0), bulk("a"), bulk("b"), bulk("c")]
        );
    }

    #[test]
    fn equality_ignores_node_layout() {
        let mut front = List::new();
        front.prepend(bulk("b"));
        front.prepend(bulk("a"));

        let back: List = vec![bulk("a"), bulk("b")].into_iter().collect();

        assert_eq!(front, back);
    }
}
