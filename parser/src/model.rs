// Descriptor tree for a single .proto file.
// - Every mapping that the generator walks keeps insertion order (IndexMap),
//   except fields, which are ordered by field number (BTreeMap).
// - Type references are resolved at load time; a tree handed out by the
//   loader never contains a dangling reference.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;

use crate::ParseError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaFile {
    /// File name as it was loaded (e.g. `person.proto`).
    pub name: String,
    pub syntax: Syntax,
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub messages: IndexMap<String, Message>,
    pub enums: IndexMap<String, Enum>,
    pub services: IndexMap<String, Service>,
}

impl SchemaFile {
    pub fn package_name(&self) -> &str {
        self.package.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    #[default]
    Proto2,
    Proto3,
}

impl Syntax {
    pub fn as_str(self) -> &'static str {
        match self {
            Syntax::Proto2 => "proto2",
            Syntax::Proto3 => "proto3",
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------- Message & Fields ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    pub name: String,
    pub full_name: String,
    pub fields: BTreeMap<u32, Field>,
    pub nested_messages: IndexMap<String, Message>,
    pub nested_enums: IndexMap<String, Enum>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub number: u32,
    pub label: Label,
    pub ty: FieldType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Label {
    #[default]
    Optional,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    Message(TypeRef),
    Enum(TypeRef),
    /// proto2 group: the field kind is `group`, the body lives in a nested message.
    Group(TypeRef),
}

impl FieldType {
    /// The descriptor kind of this field type.
    pub fn kind(&self) -> ScalarType {
        match self {
            FieldType::Scalar(st) => *st,
            FieldType::Message(_) => ScalarType::Message,
            FieldType::Enum(_) => ScalarType::Enum,
            FieldType::Group(_) => ScalarType::Group,
        }
    }
}

/// Reference to a message or enum declared somewhere in the loaded files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Local (unqualified) name of the referenced type.
    pub name: String,
    /// Fully-qualified protobuf name, without a leading dot.
    pub full_name: String,
}

impl TypeRef {
    pub fn from_full_name(full_name: &str) -> Self {
        let name = full_name.rsplit('.').next().unwrap_or(full_name);
        TypeRef {
            name: name.to_string(),
            full_name: full_name.to_string(),
        }
    }
}

/// The 18 descriptor field kinds, numbered as in `FieldDescriptorProto.Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    String = 9,
    Group = 10,
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl ScalarType {
    pub const ALL: [ScalarType; 18] = [
        ScalarType::Double,
        ScalarType::Float,
        ScalarType::Int64,
        ScalarType::Uint64,
        ScalarType::Int32,
        ScalarType::Fixed64,
        ScalarType::Fixed32,
        ScalarType::Bool,
        ScalarType::String,
        ScalarType::Group,
        ScalarType::Message,
        ScalarType::Bytes,
        ScalarType::Uint32,
        ScalarType::Enum,
        ScalarType::Sfixed32,
        ScalarType::Sfixed64,
        ScalarType::Sint32,
        ScalarType::Sint64,
    ];

    pub fn index(self) -> i32 {
        self as i32
    }

    /// Maps a .proto scalar keyword (`int32`, `string`, ...) to its kind.
    pub fn from_keyword(s: &str) -> Option<ScalarType> {
        let st = match s {
            "double" => ScalarType::Double,
            "float" => ScalarType::Float,
            "int32" => ScalarType::Int32,
            "int64" => ScalarType::Int64,
            "uint32" => ScalarType::Uint32,
            "uint64" => ScalarType::Uint64,
            "sint32" => ScalarType::Sint32,
            "sint64" => ScalarType::Sint64,
            "fixed32" => ScalarType::Fixed32,
            "fixed64" => ScalarType::Fixed64,
            "sfixed32" => ScalarType::Sfixed32,
            "sfixed64" => ScalarType::Sfixed64,
            "bool" => ScalarType::Bool,
            "string" => ScalarType::String,
            "bytes" => ScalarType::Bytes,
            _ => return None,
        };
        Some(st)
    }
}

impl TryFrom<i32> for ScalarType {
    type Error = ParseError;

    fn try_from(index: i32) -> Result<Self, Self::Error> {
        ScalarType::ALL
            .iter()
            .copied()
            .find(|st| st.index() == index)
            .ok_or(ParseError::UnknownKind(index))
    }
}

// ---------------- Enum ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Enum {
    pub name: String,
    pub full_name: String,
    /// Value name -> number, in declaration order.
    pub values: IndexMap<String, i32>,
}

// ---------------- Service ----------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Service {
    pub name: String,
    pub full_name: String,
    pub methods: IndexMap<String, Method>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub input: TypeRef,
    pub output: TypeRef,
    pub client_streaming: bool,
    pub server_streaming: bool,
}
