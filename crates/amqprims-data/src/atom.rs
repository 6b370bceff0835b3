use bytes::Bytes;

/// Type tag of a node in a [`Data`](crate::Data) stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Null,
    Bool,
    UByte,
    Byte,
    UShort,
    Short,
    UInt,
    Int,
    Char,
    ULong,
    Long,
    Timestamp,
    Float,
    Double,
    Uuid,
    Binary,
    String,
    Symbol,
    List,
    Map,
    /// A described value, kept as its raw encoding.
    Described,
    /// An array, kept as its raw encoding.
    Array,
}

impl DataType {
    /// Lowercase AMQP type name.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Null => "null",
            DataType::Bool => "boolean",
            DataType::UByte => "ubyte",
            DataType::Byte => "byte",
            DataType::UShort => "ushort",
            DataType::Short => "short",
            DataType::UInt => "uint",
            DataType::Int => "int",
            DataType::Char => "char",
            DataType::ULong => "ulong",
            DataType::Long => "long",
            DataType::Timestamp => "timestamp",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::Uuid => "uuid",
            DataType::Binary => "binary",
            DataType::String => "string",
            DataType::Symbol => "symbol",
            DataType::List => "list",
            DataType::Map => "map",
            DataType::Described => "described",
            DataType::Array => "array",
        }
    }

    /// Returns true for types that hold child nodes.
    pub fn is_container(self) -> bool {
        matches!(self, DataType::List | DataType::Map)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single non-container value.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Null,
    Bool(bool),
    UByte(u8),
    Byte(i8),
    UShort(u16),
    Short(i16),
    UInt(u32),
    Int(i32),
    Char(char),
    ULong(u64),
    Long(i64),
    /// Milliseconds since the unix epoch.
    Timestamp(i64),
    Float(f32),
    Double(f64),
    Uuid([u8; 16]),
    Binary(Bytes),
    String(String),
    Symbol(String),
    /// Raw encoding of a described value, constructor included.
    Described(Bytes),
    /// Raw encoding of an array, constructor included.
    Array(Bytes),
}

impl Atom {
    pub fn data_type(&self) -> DataType {
        match self {
            Atom::Null => DataType::Null,
            Atom::Bool(_) => DataType::Bool,
            Atom::UByte(_) => DataType::UByte,
            Atom::Byte(_) => DataType::Byte,
            Atom::UShort(_) => DataType::UShort,
            Atom::Short(_) => DataType::Short,
            Atom::UInt(_) => DataType::UInt,
            Atom::Int(_) => DataType::Int,
            Atom::Char(_) => DataType::Char,
            Atom::ULong(_) => DataType::ULong,
            Atom::Long(_) => DataType::Long,
            Atom::Timestamp(_) => DataType::Timestamp,
            Atom::Float(_) => DataType::Float,
            Atom::Double(_) => DataType::Double,
            Atom::Uuid(_) => DataType::Uuid,
            Atom::Binary(_) => DataType::Binary,
            Atom::String(_) => DataType::String,
            Atom::Symbol(_) => DataType::Symbol,
            Atom::Described(_) => DataType::Described,
            Atom::Array(_) => DataType::Array,
        }
    }
}

/// A node in the data tree.
///
/// Map children alternate key, value, key, value, so a map with `n` entries
/// has `2n` children.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Atom(Atom),
    List(Vec<Node>),
    Map(Vec<Node>),
}

impl Node {
    pub fn data_type(&self) -> DataType {
        match self {
            Node::Atom(atom) => atom.data_type(),
            Node::List(_) => DataType::List,
            Node::Map(_) => DataType::Map,
        }
    }

    /// Child nodes of a container, `None` for atoms.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::List(children) | Node::Map(children) => Some(children),
            Node::Atom(_) => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::List(children) | Node::Map(children) => Some(children),
            Node::Atom(_) => None,
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Node::Atom(atom) => Some(atom),
            _ => None,
        }
    }
}

impl From<Atom> for Node {
    fn from(atom: Atom) -> Self {
        Node::Atom(atom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_types() {
        assert!(DataType::Map.is_container());
        assert!(DataType::List.is_container());
        assert!(!DataType::Symbol.is_container());
        assert!(!DataType::Binary.is_container());
        assert!(!DataType::Array.is_container());
    }

    #[test]
    fn atom_reports_its_tag() {
        assert_eq!(Atom::Symbol("k".into()).data_type(), DataType::Symbol);
        assert_eq!(Atom::String("k".into()).data_type(), DataType::String);
        assert_eq!(Atom::Binary(Bytes::new()).data_type(), DataType::Binary);
        assert_eq!(Node::Map(Vec::new()).data_type(), DataType::Map);
    }

    #[test]
    fn type_names() {
        assert_eq!(DataType::Int.to_string(), "int");
        assert_eq!(DataType::Bool.name(), "boolean");
        assert_eq!(DataType::Symbol.name(), "symbol");
    }

    #[test]
    fn atoms_have_no_children() {
        assert!(Node::Atom(Atom::Null).children().is_none());
        let map = Node::Map(vec![Atom::Symbol("k".into()).into(), Atom::Int(1).into()]);
        assert_eq!(map.children().map(<[Node]>::len), Some(2));
    }
}
