//! Doubly linked list stored in an arena (to hold samples ordered by
//! their parameter).  Nodes are never removed, so a [`Witness`] stays
//! valid as long as the list lives; insertion next to a witness and
//! access to its neighbours are O(1).

/// Index of a node of a [`Chain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Witness(usize);

#[derive(Debug, Clone)]
struct Node<T> {
    item: T,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Chain<T> {
    nodes: Vec<Node<T>>,
    head: Option<usize>,
    tail: Option<usize>, // None ⇔ head = None
}

impl<T> Default for Chain<T> {
    fn default() -> Self { Chain::new() }
}

impl<T> Chain<T> {
    /// Return a new empty chain.
    pub fn new() -> Self {
        Chain { nodes: Vec::new(),  head: None,  tail: None }
    }

    pub fn is_empty(&self) -> bool { self.head.is_none() }

    pub fn len(&self) -> usize { self.nodes.len() }

    /// Push `item` at the end of the chain and return a witness to it.
    pub fn push_back(&mut self, item: T) -> Witness {
        let i = self.nodes.len();
        self.nodes.push(Node { item, prev: self.tail, next: None });
        match self.tail {
            None => self.head = Some(i), // Was empty
            Some(t) => self.nodes[t].next = Some(i),
        }
        self.tail = Some(i);
        Witness(i)
    }

    /// Insert `item` right after the node `w` and return a witness to
    /// the new node.
    pub fn insert_after(&mut self, w: Witness, item: T) -> Witness {
        let i = self.nodes.len();
        let next = self.nodes[w.0].next;
        self.nodes.push(Node { item, prev: Some(w.0), next });
        match next {
            None => self.tail = Some(i),
            Some(n) => self.nodes[n].prev = Some(i),
        }
        self.nodes[w.0].next = Some(i);
        Witness(i)
    }

    /// The node following `w`, if any.
    #[inline]
    pub fn next(&self, w: Witness) -> Option<Witness> {
        self.nodes[w.0].next.map(Witness)
    }

    /// The node preceding `w`, if any.
    #[inline]
    pub fn prev(&self, w: Witness) -> Option<Witness> {
        self.nodes[w.0].prev.map(Witness)
    }

    #[inline]
    pub fn get(&self, w: Witness) -> &T { &self.nodes[w.0].item }

    #[inline]
    pub fn get_mut(&mut self, w: Witness) -> &mut T {
        &mut self.nodes[w.0].item
    }

    /// Iterate on the items in list order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { chain: self,  front: self.head,  back: self.tail }
    }
}

pub struct Iter<'a, T> {
    chain: &'a Chain<T>,
    // Both None once the two ends have met.
    front: Option<usize>,
    back: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        let i = self.front?;
        let node = &self.chain.nodes[i];
        if self.back == Some(i) {
            self.front = None;
            self.back = None;
        } else {
            self.front = node.next;
        }
        Some(&node.item)
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        let i = self.back?;
        let node = &self.chain.nodes[i];
        if self.front == Some(i) {
            self.front = None;
            self.back = None;
        } else {
            self.back = node.prev;
        }
        Some(&node.item)
    }
}


#[cfg(test)]
mod test {
    use super::Chain;

    #[test]
    fn basic() {
        let mut l = Chain::new();
        assert!(l.is_empty());
        l.push_back("a");
        l.push_back("b");
        let c = l.push_back("c");
        assert_eq!(*l.get(c), "c");
        assert_eq!(l.iter().next(), Some(&"a"));
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn insert_after() {
        let mut l = Chain::new();
        let a = l.push_back("a");
        l.push_back("b");
        let d = l.insert_after(a, "d");
        l.insert_after(d, "e");
        *l.get_mut(a) = "c";
        let v: Vec<_> = l.iter().collect();
        assert_eq!(v, vec![&"c", &"d", &"e", &"b"]);
    }

    #[test]
    fn insert_at_end() {
        let mut l = Chain::new();
        let a = l.push_back(1);
        let b = l.insert_after(a, 2);
        l.insert_after(b, 3);
        l.push_back(4);
        let v: Vec<_> = l.iter().copied().collect();
        assert_eq!(v, vec![1, 2, 3, 4]);
    }

    #[test]
    fn neighbours() {
        let mut l = Chain::new();
        let a = l.push_back(1);
        let c = l.push_back(3);
        let b = l.insert_after(a, 2);
        assert_eq!(l.next(a), Some(b));
        assert_eq!(l.next(b), Some(c));
        assert_eq!(l.prev(c), Some(b));
        assert_eq!(l.prev(b), Some(a));
        assert_eq!((l.prev(a), l.next(c)), (None, None));
        let d = l.insert_after(c, 4);
        assert_eq!(l.prev(d), Some(c));
    }

    #[test]
    fn iterate_from_both_ends() {
        let mut l = Chain::new();
        let a = l.push_back(1);
        l.push_back(4);
        let b = l.insert_after(a, 2);
        l.insert_after(b, 3);
        let v: Vec<_> = l.iter().rev().copied().collect();
        assert_eq!(v, vec![4, 3, 2, 1]);
        let mut it = l.iter();
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next_back(), Some(&4));
        assert_eq!(it.next_back(), Some(&3));
        assert_eq!(it.next(), Some(&2));
        assert_eq!((it.next(), it.next_back()), (None, None));
    }
}
