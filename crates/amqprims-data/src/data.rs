use std::ops::{Deref, DerefMut};

use bytes::Bytes;

use crate::atom::{Atom, DataType, Node};

/// A typed data stream with a read/write cursor.
///
/// The cursor sits either before the first node of a level (after
/// [`rewind`](Data::rewind) or [`enter`](Data::enter)) or on a node. `next`
/// moves forward among siblings, `enter`/`exit` descend into and climb out of
/// containers, and every `put_*` writes at the position after the cursor,
/// overwriting whatever node was there, and leaves the cursor on the written
/// node.
#[derive(Debug, Clone, Default)]
pub struct Data {
    nodes: Vec<Node>,
    parents: Vec<usize>,
    current: Option<usize>,
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Data {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rewound stream over existing nodes.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            parents: Vec::new(),
            current: None,
        }
    }

    /// Top-level nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop all content and rewind.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.rewind();
    }

    /// Move the cursor back before the first top-level node.
    pub fn rewind(&mut self) {
        self.parents.clear();
        self.current = None;
    }

    /// Borrow the stream through a guard that rewinds now and again when dropped.
    pub fn scoped(&mut self) -> Rewound<'_> {
        self.rewind();
        Rewound { data: self }
    }

    /// Advance to the next sibling. Returns false, without moving, at the end
    /// of the current level.
    pub fn next(&mut self) -> bool {
        let candidate = self.current.map_or(0, |current| current + 1);
        if candidate < self.level().len() {
            self.current = Some(candidate);
            true
        } else {
            false
        }
    }

    /// Step back to the previous sibling.
    pub fn prev(&mut self) -> bool {
        match self.current {
            Some(current) if current > 0 => {
                self.current = Some(current - 1);
                true
            }
            _ => false,
        }
    }

    /// Descend into the current container. The cursor is left before its
    /// first child.
    pub fn enter(&mut self) -> bool {
        match self.current {
            Some(current) if self.data_type().is_some_and(DataType::is_container) => {
                self.parents.push(current);
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Climb back to the container that was entered last, leaving the cursor on it.
    pub fn exit(&mut self) -> bool {
        match self.parents.pop() {
            Some(parent) => {
                self.current = Some(parent);
                true
            }
            None => false,
        }
    }

    /// The node under the cursor.
    pub fn current(&self) -> Option<&Node> {
        self.current.and_then(|current| self.level().get(current))
    }

    /// Type tag of the node under the cursor.
    pub fn data_type(&self) -> Option<DataType> {
        self.current().map(Node::data_type)
    }

    pub fn atom(&self) -> Option<&Atom> {
        self.current().and_then(Node::as_atom)
    }

    fn level(&self) -> &[Node] {
        let mut level: &[Node] = &self.nodes;
        for &index in &self.parents {
            level = level.get(index).and_then(Node::children).unwrap_or(&[]);
        }
        level
    }

    fn level_mut(&mut self) -> Option<&mut Vec<Node>> {
        let mut level = &mut self.nodes;
        for &index in &self.parents {
            level = level.get_mut(index)?.children_mut()?;
        }
        Some(level)
    }

    /// Write a node after the cursor and move onto it.
    pub fn put_node(&mut self, node: Node) {
        let position = self.current.map_or(0, |current| current + 1);
        let Some(level) = self.level_mut() else {
            return;
        };
        if position < level.len() {
            level[position] = node;
        } else {
            level.push(node);
        }
        self.current = Some(position);
    }

    pub fn put_atom(&mut self, atom: Atom) {
        self.put_node(Node::Atom(atom));
    }

    /// Write an empty map. Follow with [`enter`](Data::enter) to fill it.
    pub fn put_map(&mut self) {
        self.put_node(Node::Map(Vec::new()));
    }

    /// Write an empty list. Follow with [`enter`](Data::enter) to fill it.
    pub fn put_list(&mut self) {
        self.put_node(Node::List(Vec::new()));
    }

    pub fn put_null(&mut self) {
        self.put_atom(Atom::Null);
    }

    pub fn put_bool(&mut self, value: bool) {
        self.put_atom(Atom::Bool(value));
    }

    pub fn put_ubyte(&mut self, value: u8) {
        self.put_atom(Atom::UByte(value));
    }

    pub fn put_byte(&mut self, value: i8) {
        self.put_atom(Atom::Byte(value));
    }

    pub fn put_ushort(&mut self, value: u16) {
        self.put_atom(Atom::UShort(value));
    }

    pub fn put_short(&mut self, value: i16) {
        self.put_atom(Atom::Short(value));
    }

    pub fn put_uint(&mut self, value: u32) {
        self.put_atom(Atom::UInt(value));
    }

    pub fn put_int(&mut self, value: i32) {
        self.put_atom(Atom::Int(value));
    }

    pub fn put_char(&mut self, value: char) {
        self.put_atom(Atom::Char(value));
    }

    pub fn put_ulong(&mut self, value: u64) {
        self.put_atom(Atom::ULong(value));
    }

    pub fn put_long(&mut self, value: i64) {
        self.put_atom(Atom::Long(value));
    }

    pub fn put_timestamp(&mut self, millis: i64) {
        self.put_atom(Atom::Timestamp(millis));
    }

    pub fn put_float(&mut self, value: f32) {
        self.put_atom(Atom::Float(value));
    }

    pub fn put_double(&mut self, value: f64) {
        self.put_atom(Atom::Double(value));
    }

    pub fn put_uuid(&mut self, value: [u8; 16]) {
        self.put_atom(Atom::Uuid(value));
    }

    pub fn put_binary(&mut self, value: impl Into<Bytes>) {
        self.put_atom(Atom::Binary(value.into()));
    }

    pub fn put_string(&mut self, value: impl Into<String>) {
        self.put_atom(Atom::String(value.into()));
    }

    pub fn put_symbol(&mut self, value: impl Into<String>) {
        self.put_atom(Atom::Symbol(value.into()));
    }

    /// Number of children (keys and values) of the current map, 0 otherwise.
    pub fn get_map(&self) -> usize {
        match self.current() {
            Some(Node::Map(children)) => children.len(),
            _ => 0,
        }
    }

    /// Number of elements of the current list, 0 otherwise.
    pub fn get_list(&self) -> usize {
        match self.current() {
            Some(Node::List(children)) => children.len(),
            _ => 0,
        }
    }

    pub fn get_bool(&self) -> Option<bool> {
        match self.atom()? {
            Atom::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_ubyte(&self) -> Option<u8> {
        match self.atom()? {
            Atom::UByte(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_byte(&self) -> Option<i8> {
        match self.atom()? {
            Atom::Byte(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_ushort(&self) -> Option<u16> {
        match self.atom()? {
            Atom::UShort(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_short(&self) -> Option<i16> {
        match self.atom()? {
            Atom::Short(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_uint(&self) -> Option<u32> {
        match self.atom()? {
            Atom::UInt(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_int(&self) -> Option<i32> {
        match self.atom()? {
            Atom::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_ulong(&self) -> Option<u64> {
        match self.atom()? {
            Atom::ULong(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_long(&self) -> Option<i64> {
        match self.atom()? {
            Atom::Long(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_float(&self) -> Option<f32> {
        match self.atom()? {
            Atom::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_double(&self) -> Option<f64> {
        match self.atom()? {
            Atom::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_binary(&self) -> Option<&Bytes> {
        match self.atom()? {
            Atom::Binary(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_string(&self) -> Option<&str> {
        match self.atom()? {
            Atom::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn get_symbol(&self) -> Option<&str> {
        match self.atom()? {
            Atom::Symbol(value) => Some(value),
            _ => None,
        }
    }
}

/// Exclusive access to a [`Data`] stream that is rewound when released.
pub struct Rewound<'a> {
    data: &'a mut Data,
}

impl Deref for Rewound<'_> {
    type Target = Data;

    fn deref(&self) -> &Data {
        self.data
    }
}

impl DerefMut for Rewound<'_> {
    fn deref_mut(&mut self) -> &mut Data {
        self.data
    }
}

impl Drop for Rewound<'_> {
    fn drop(&mut self) {
        self.data.rewind();
    }
}
