// Name resolution: turns the raw tree of one file into a SchemaFile, using a
// symbol table built from that file and everything it imports.

use std::collections::HashMap;

use tracing::trace;

use crate::ast::{RawEnum, RawFile, RawMessage, RawService, RawType};
use crate::{Enum, Field, FieldType, Message, Method, ParseError, SchemaFile, Service, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SymbolKind {
    Message,
    Enum,
}

/// Fully-qualified type name -> kind, across all loaded files.
#[derive(Debug, Default)]
pub(crate) struct SymbolTable {
    symbols: HashMap<String, SymbolKind>,
}

impl SymbolTable {
    pub fn register_file(&mut self, file: &RawFile) {
        let scope = file.package.clone().unwrap_or_default();
        for m in &file.messages {
            self.register_message(&scope, m);
        }
        for e in &file.enums {
            self.symbols.insert(qualify(&scope, &e.name), SymbolKind::Enum);
        }
    }

    fn register_message(&mut self, scope: &str, message: &RawMessage) {
        let full_name = qualify(scope, &message.name);
        for nested in &message.messages {
            self.register_message(&full_name, nested);
        }
        for e in &message.enums {
            self.symbols
                .insert(qualify(&full_name, &e.name), SymbolKind::Enum);
        }
        self.symbols.insert(full_name, SymbolKind::Message);
    }

    /// Protobuf scoping: try `scope.name`, then strip one scope component at a
    /// time down to the root. A leading `.` means the name is already absolute.
    pub fn lookup(
        &self,
        scope: &str,
        name: &str,
        accept: impl Fn(SymbolKind) -> bool,
    ) -> Option<(String, SymbolKind)> {
        if let Some(absolute) = name.strip_prefix('.') {
            return self
                .symbols
                .get(absolute)
                .copied()
                .filter(|kind| accept(*kind))
                .map(|kind| (absolute.to_string(), kind));
        }

        let mut scope = scope;
        loop {
            let candidate = qualify(scope, name);
            if let Some(kind) = self.symbols.get(&candidate).copied()
                && accept(kind)
            {
                return Some((candidate, kind));
            }
            if scope.is_empty() {
                return None;
            }
            scope = match scope.rfind('.') {
                Some(idx) => &scope[..idx],
                None => "",
            };
        }
    }
}

pub(crate) fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

pub(crate) fn build_schema(file: RawFile, symbols: &SymbolTable) -> Result<SchemaFile, ParseError> {
    let scope = file.package.clone().unwrap_or_default();
    let mut schema = SchemaFile {
        name: file.name,
        syntax: file.syntax,
        package: file.package,
        imports: file.imports,
        ..SchemaFile::default()
    };

    for raw in file.messages {
        let message = build_message(raw, &scope, symbols)?;
        schema.messages.insert(message.name.clone(), message);
    }
    for raw in file.enums {
        let en = build_enum(raw, &scope);
        schema.enums.insert(en.name.clone(), en);
    }
    for raw in file.services {
        let service = build_service(raw, &scope, symbols)?;
        schema.services.insert(service.name.clone(), service);
    }

    Ok(schema)
}

fn build_message(
    raw: RawMessage,
    scope: &str,
    symbols: &SymbolTable,
) -> Result<Message, ParseError> {
    let full_name = qualify(scope, &raw.name);
    let mut message = Message {
        name: raw.name,
        full_name: full_name.clone(),
        ..Message::default()
    };

    for nested in raw.messages {
        let m = build_message(nested, &full_name, symbols)?;
        message.nested_messages.insert(m.name.clone(), m);
    }
    for nested in raw.enums {
        let e = build_enum(nested, &full_name);
        message.nested_enums.insert(e.name.clone(), e);
    }

    for field in raw.fields {
        let ty = match field.ty {
            RawType::Scalar(st) => FieldType::Scalar(st),
            RawType::Group(group) => {
                FieldType::Group(TypeRef::from_full_name(&qualify(&full_name, &group)))
            }
            RawType::Named(name) => {
                let (resolved, kind) = symbols.lookup(&full_name, &name, |_| true).ok_or_else(
                    || ParseError::UnresolvedType {
                        name: name.clone(),
                        scope: full_name.clone(),
                    },
                )?;
                trace!(field = %field.name, from = %name, to = %resolved, "resolved field type");
                let type_ref = TypeRef::from_full_name(&resolved);
                match kind {
                    SymbolKind::Message => FieldType::Message(type_ref),
                    SymbolKind::Enum => FieldType::Enum(type_ref),
                }
            }
        };

        if message.fields.contains_key(&field.number) {
            return Err(ParseError::DuplicateFieldNumber {
                message: full_name,
                number: field.number,
            });
        }
        message.fields.insert(
            field.number,
            Field {
                name: field.name,
                number: field.number,
                label: field.label,
                ty,
            },
        );
    }

    Ok(message)
}

fn build_enum(raw: RawEnum, scope: &str) -> Enum {
    Enum {
        full_name: qualify(scope, &raw.name),
        name: raw.name,
        values: raw.values.into_iter().collect(),
    }
}

fn build_service(
    raw: RawService,
    scope: &str,
    symbols: &SymbolTable,
) -> Result<Service, ParseError> {
    let full_name = qualify(scope, &raw.name);
    let mut service = Service {
        name: raw.name,
        full_name: full_name.clone(),
        ..Service::default()
    };

    let resolve_message = |name: &str| -> Result<TypeRef, ParseError> {
        symbols
            .lookup(&full_name, name, |kind| kind == SymbolKind::Message)
            .map(|(resolved, _)| TypeRef::from_full_name(&resolved))
            .ok_or_else(|| ParseError::UnresolvedType {
                name: name.to_string(),
                scope: full_name.clone(),
            })
    };

    for method in raw.methods {
        let resolved = Method {
            input: resolve_message(&method.input)?,
            output: resolve_message(&method.output)?,
            name: method.name,
            client_streaming: method.client_streaming,
            server_streaming: method.server_streaming,
        };
        service.methods.insert(resolved.name.clone(), resolved);
    }

    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, SymbolKind)]) -> SymbolTable {
        SymbolTable {
            symbols: entries
                .iter()
                .map(|(name, kind)| (name.to_string(), *kind))
                .collect(),
        }
    }

    #[test]
    fn innermost_scope_wins() {
        let symbols = table(&[
            ("pkg.Foo", SymbolKind::Message),
            ("pkg.Outer.Foo", SymbolKind::Enum),
        ]);
        let (name, kind) = symbols.lookup("pkg.Outer", "Foo", |_| true).unwrap();
        assert_eq!(name, "pkg.Outer.Foo");
        assert_eq!(kind, SymbolKind::Enum);

        let (name, _) = symbols.lookup("pkg.Other", "Foo", |_| true).unwrap();
        assert_eq!(name, "pkg.Foo");
    }

    #[test]
    fn filter_skips_symbols_of_the_wrong_kind() {
        let symbols = table(&[
            ("pkg.Foo", SymbolKind::Message),
            ("pkg.Svc.Foo", SymbolKind::Enum),
        ]);
        let (name, _) = symbols
            .lookup("pkg.Svc", "Foo", |k| k == SymbolKind::Message)
            .unwrap();
        assert_eq!(name, "pkg.Foo");
    }

    #[test]
    fn absolute_names_bypass_scoping() {
        let symbols = table(&[("Foo", SymbolKind::Message), ("pkg.Foo", SymbolKind::Message)]);
        let (name, _) = symbols.lookup("pkg", ".Foo", |_| true).unwrap();
        assert_eq!(name, "Foo");
        assert!(symbols.lookup("pkg", ".Bar", |_| true).is_none());
    }

    #[test]
    fn qualify_without_scope_is_the_bare_name() {
        assert_eq!(qualify("", "Foo"), "Foo");
        assert_eq!(qualify("a.b", "Foo"), "a.b.Foo");
    }
}
