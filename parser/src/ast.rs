// Unresolved syntax tree produced straight from the pest pairs.
// Type names are kept as written; `resolve` turns them into TypeRefs.

use crate::{Label, ScalarType, Syntax};

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct RawFile {
    pub name: String,
    pub syntax: Syntax,
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub messages: Vec<RawMessage>,
    pub enums: Vec<RawEnum>,
    pub services: Vec<RawService>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct RawMessage {
    pub name: String,
    pub fields: Vec<RawField>,
    pub messages: Vec<RawMessage>,
    pub enums: Vec<RawEnum>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawField {
    pub name: String,
    pub number: u32,
    pub label: Label,
    pub ty: RawType,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RawType {
    Scalar(ScalarType),
    /// Message or enum reference, as written (may start with `.`).
    Named(String),
    /// Group field; the name is the nested message declared by the group.
    Group(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct RawEnum {
    pub name: String,
    pub values: Vec<(String, i32)>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct RawService {
    pub name: String,
    pub methods: Vec<RawMethod>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct RawMethod {
    pub name: String,
    pub input: String,
    pub output: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
}
