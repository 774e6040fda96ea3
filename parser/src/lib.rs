mod ast;
mod loader;
mod model;
mod resolve;
mod well_known;

use pest::Parser as _;
use pest::iterators::Pair;
use pest_derive::Parser;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use ast::{RawEnum, RawField, RawFile, RawMessage, RawMethod, RawService, RawType};
pub use loader::Loader;
pub use model::*;

#[derive(Parser)]
#[grammar = "resources/proto.pest"] // Path relative to src/
pub struct ProtoParser;

/// Largest field number protobuf accepts.
pub const MAX_FIELD_NUMBER: i64 = 536_870_911;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Pest(Box<pest::error::Error<Rule>>),
    #[error("{0}")]
    Message(&'static str),
    #[error("unsupported syntax `{0}`, expected proto2 or proto3")]
    UnsupportedSyntax(String),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("type `{name}` is not defined (referenced from `{scope}`)")]
    UnresolvedType { name: String, scope: String },
    #[error("field number {number} is used twice in message `{message}`")]
    DuplicateFieldNumber { message: String, number: u32 },
    #[error("import `{import}` not found (imported by {from})")]
    ImportNotFound { import: String, from: String },
    #[error("unknown field kind {0}")]
    UnknownKind(i32),
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(e: pest::error::Error<Rule>) -> Self {
        Self::Pest(Box::new(e))
    }
}

/// Parse a .proto file (and whatever it imports from its own directory or the
/// bundled well-known types) into a descriptor tree.
pub fn parse_proto_file<P: AsRef<Path>>(path: P) -> Result<SchemaFile, ParseError> {
    Loader::default().load(path)
}

/// Parse a self-contained .proto source. References to types from other files
/// fail with [`ParseError::UnresolvedType`] unless they are well-known types.
pub fn parse_proto_str(name: &str, content: &str) -> Result<SchemaFile, ParseError> {
    let raw = parse_raw(name, content)?;
    let mut symbols = resolve::SymbolTable::default();
    symbols.register_file(&raw);
    for import in &raw.imports {
        if let Some(source) = well_known::source(import) {
            symbols.register_file(&parse_raw(import, source)?);
        }
    }
    resolve::build_schema(raw, &symbols)
}

pub(crate) fn read_raw_file(path: &Path) -> Result<RawFile, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_raw(&name, &content)
}

pub(crate) fn parse_raw(name: &str, content: &str) -> Result<RawFile, ParseError> {
    let mut pairs = ProtoParser::parse(Rule::proto, content)?;
    let proto_pair = pairs
        .next()
        .ok_or(ParseError::Message("expected proto root"))?;
    let file = parse_proto(name, proto_pair)?;
    debug!(
        file = name,
        messages = file.messages.len(),
        enums = file.enums.len(),
        services = file.services.len(),
        "parsed proto source"
    );
    Ok(file)
}

fn parse_proto(name: &str, pair: Pair<Rule>) -> Result<RawFile, ParseError> {
    let mut file = RawFile {
        name: name.to_string(),
        ..RawFile::default()
    };

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::syntax => {
                // syntax = { kw_syntax ~ "=" ~ str_lit ~ ";" }
                let value = first_string(inner).unwrap_or_default();
                file.syntax = match value.as_str() {
                    "proto2" => Syntax::Proto2,
                    "proto3" => Syntax::Proto3,
                    _ => return Err(ParseError::UnsupportedSyntax(value)),
                };
            }
            Rule::edition => {
                let value = first_string(inner).unwrap_or_default();
                return Err(ParseError::UnsupportedSyntax(format!("edition {value}")));
            }
            Rule::import => {
                if let Some(path) = first_string(inner) {
                    file.imports.push(path);
                }
            }
            Rule::package => {
                // package = { kw_package ~ full_ident ~ ";" }
                file.package = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::full_ident)
                    .map(|p| p.as_str().to_string());
            }
            Rule::message_def => file.messages.push(parse_message_def(inner)?),
            Rule::enum_def => file.enums.push(parse_enum_def(inner)?),
            Rule::service_def => file.services.push(parse_service_def(inner)),
            _ => {}
        }
    }

    Ok(file)
}

fn first_string(pair: Pair<Rule>) -> Option<String> {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::str_lit)
        .map(|p| unquote(p.as_str()))
}

fn unquote(lit: &str) -> String {
    let inner = &lit[1..lit.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------- Message ----------------

fn parse_message_def(block: Pair<Rule>) -> Result<RawMessage, ParseError> {
    // message_def = { kw_message ~ ident ~ message_body }
    let mut message = RawMessage::default();
    for p in block.into_inner() {
        match p.as_rule() {
            Rule::ident => message.name = p.as_str().to_string(),
            Rule::message_body => parse_message_body(p, &mut message)?,
            _ => {}
        }
    }
    Ok(message)
}

fn parse_message_body(body: Pair<Rule>, message: &mut RawMessage) -> Result<(), ParseError> {
    for elem in body.into_inner() {
        match elem.as_rule() {
            Rule::field => message.fields.push(parse_field(elem)?),
            Rule::map_field => parse_map_field(elem, message)?,
            Rule::group_field => parse_group_field(elem, message)?,
            Rule::oneof_def => {
                // Oneof members are plain fields of the enclosing message.
                for member in elem.into_inner() {
                    match member.as_rule() {
                        Rule::field => message.fields.push(parse_field(member)?),
                        Rule::group_field => parse_group_field(member, message)?,
                        _ => {}
                    }
                }
            }
            Rule::message_def => message.messages.push(parse_message_def(elem)?),
            Rule::enum_def => message.enums.push(parse_enum_def(elem)?),
            // options, reserved ranges, extension ranges and extend blocks
            _ => {}
        }
    }
    Ok(())
}

fn parse_field(pair: Pair<Rule>) -> Result<RawField, ParseError> {
    // field = { label? ~ type_name ~ ident ~ "=" ~ int_lit ~ field_options? ~ ";" }
    let mut label = Label::Optional;
    let mut ty: Option<RawType> = None;
    let mut name: Option<String> = None;
    let mut number: Option<u32> = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::label => label = parse_label(p.as_str()),
            Rule::type_name => ty = Some(parse_type_name(p.as_str())),
            Rule::ident => name = Some(p.as_str().to_string()),
            Rule::int_lit => number = Some(parse_field_number(p.as_str())?),
            _ => {}
        }
    }

    match (ty, name, number) {
        (Some(ty), Some(name), Some(number)) => Ok(RawField {
            name,
            number,
            label,
            ty,
        }),
        _ => Err(ParseError::Message("malformed field")),
    }
}

fn parse_map_field(pair: Pair<Rule>, message: &mut RawMessage) -> Result<(), ParseError> {
    // map_field = { kw_map ~ "<" ~ type_name ~ "," ~ type_name ~ ">" ~ ident ~ "=" ~ int_lit ... }
    let mut types: Vec<RawType> = Vec::with_capacity(2);
    let mut name: Option<String> = None;
    let mut number: Option<u32> = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::type_name => types.push(parse_type_name(p.as_str())),
            Rule::ident => name = Some(p.as_str().to_string()),
            Rule::int_lit => number = Some(parse_field_number(p.as_str())?),
            _ => {}
        }
    }

    let (Some(name), Some(number), [key, value]) = (name, number, types.as_slice()) else {
        return Err(ParseError::Message("malformed map field"));
    };

    // Same shape protoc gives map fields: a repeated reference to a
    // synthesized `<Name>Entry { key = 1; value = 2; }` nested message.
    let entry_name = map_entry_name(&name);
    message.messages.push(RawMessage {
        name: entry_name.clone(),
        fields: vec![
            RawField {
                name: "key".to_string(),
                number: 1,
                label: Label::Optional,
                ty: key.clone(),
            },
            RawField {
                name: "value".to_string(),
                number: 2,
                label: Label::Optional,
                ty: value.clone(),
            },
        ],
        ..RawMessage::default()
    });
    message.fields.push(RawField {
        name,
        number,
        label: Label::Repeated,
        ty: RawType::Named(entry_name),
    });
    Ok(())
}

fn parse_group_field(pair: Pair<Rule>, message: &mut RawMessage) -> Result<(), ParseError> {
    // group_field = { label? ~ kw_group ~ ident ~ "=" ~ int_lit ~ field_options? ~ message_body }
    let mut label = Label::Optional;
    let mut number: Option<u32> = None;
    let mut group = RawMessage::default();

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::label => label = parse_label(p.as_str()),
            Rule::ident => group.name = p.as_str().to_string(),
            Rule::int_lit => number = Some(parse_field_number(p.as_str())?),
            Rule::message_body => parse_message_body(p, &mut group)?,
            _ => {}
        }
    }

    let number = number.ok_or(ParseError::Message("malformed group field"))?;
    message.fields.push(RawField {
        name: group.name.to_lowercase(),
        number,
        label,
        ty: RawType::Group(group.name.clone()),
    });
    message.messages.push(group);
    Ok(())
}

fn map_entry_name(field_name: &str) -> String {
    let mut out = String::with_capacity(field_name.len() + 5);
    let mut upper_next = true;
    for c in field_name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out.push_str("Entry");
    out
}

fn parse_label(s: &str) -> Label {
    match s {
        "required" => Label::Required,
        "repeated" => Label::Repeated,
        _ => Label::Optional,
    }
}

fn parse_type_name(s: &str) -> RawType {
    match ScalarType::from_keyword(s) {
        Some(st) => RawType::Scalar(st),
        None => RawType::Named(s.to_string()),
    }
}

fn parse_field_number(s: &str) -> Result<u32, ParseError> {
    let n = parse_integer_value(s)?;
    if !(1..=MAX_FIELD_NUMBER).contains(&n) {
        return Err(ParseError::InvalidNumber(s.to_string()));
    }
    u32::try_from(n).map_err(|_| ParseError::InvalidNumber(s.to_string()))
}

fn parse_integer_value(s: &str) -> Result<i64, ParseError> {
    // int_lit = dec|hex|oct with optional minus
    let (neg, rest) = match s.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, s),
    };
    let parsed = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)
    } else if rest.starts_with('0') && rest.len() > 1 {
        i64::from_str_radix(&rest[1..], 8)
    } else {
        rest.parse::<i64>()
    };
    let val = parsed.map_err(|_| ParseError::InvalidNumber(s.to_string()))?;
    Ok(if neg { -val } else { val })
}

// ---------------- Enum ----------------

fn parse_enum_def(block: Pair<Rule>) -> Result<RawEnum, ParseError> {
    // enum_def = { kw_enum ~ ident ~ "{" ~ (option_statement | reserved | enum_value)* ~ "}" }
    let mut en = RawEnum::default();

    for p in block.into_inner() {
        match p.as_rule() {
            Rule::ident => en.name = p.as_str().to_string(),
            Rule::enum_value => {
                let mut value_name: Option<String> = None;
                let mut number: Option<i32> = None;
                for ev in p.into_inner() {
                    match ev.as_rule() {
                        Rule::ident => value_name = Some(ev.as_str().to_string()),
                        Rule::int_lit => {
                            let n = parse_integer_value(ev.as_str())?;
                            number = Some(
                                i32::try_from(n)
                                    .map_err(|_| ParseError::InvalidNumber(ev.as_str().to_string()))?,
                            );
                        }
                        _ => {}
                    }
                }
                if let (Some(vn), Some(num)) = (value_name, number) {
                    en.values.push((vn, num));
                }
            }
            _ => {}
        }
    }

    Ok(en)
}

// ---------------- Service ----------------

fn parse_service_def(block: Pair<Rule>) -> RawService {
    // service_def = { kw_service ~ ident ~ "{" ~ (option_statement | rpc)* ~ "}" }
    let mut service = RawService::default();
    for p in block.into_inner() {
        match p.as_rule() {
            Rule::ident => service.name = p.as_str().to_string(),
            Rule::rpc => service.methods.push(parse_rpc(p)),
            _ => {}
        }
    }
    service
}

fn parse_rpc(pair: Pair<Rule>) -> RawMethod {
    let mut method = RawMethod::default();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::ident => method.name = p.as_str().to_string(),
            Rule::rpc_input => {
                let (streaming, ty) = parse_rpc_type(p);
                method.client_streaming = streaming;
                method.input = ty;
            }
            Rule::rpc_output => {
                let (streaming, ty) = parse_rpc_type(p);
                method.server_streaming = streaming;
                method.output = ty;
            }
            _ => {}
        }
    }
    method
}

fn parse_rpc_type(pair: Pair<Rule>) -> (bool, String) {
    let mut streaming = false;
    let mut ty = String::new();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::stream => streaming = true,
            Rule::type_name => ty = p.as_str().to_string(),
            _ => {}
        }
    }
    (streaming, ty)
}
