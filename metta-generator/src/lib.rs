//! Translates a protobuf descriptor tree into MeTTa declarations: one type,
//! one constructor and one accessor per field for every message, the type and
//! values of every nested enum, and one function type per service method.

mod fn_type;

use std::path::Path;

use parser::{Enum, Field, FieldType, Message, ScalarType, SchemaFile, Service, parse_proto_file};
use thiserror::Error;
use tracing::{debug, trace};

pub use fn_type::{FnType, Param};

const HEADER_RULE: &str = ";;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;;";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("parse error: {0}")]
    Parse(#[from] parser::ParseError),
}

/// Run-scoped translation options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Prepended to every emitted symbol. Empty means "use the package name".
    pub prefix: String,
    /// Emit constructor types as nested single-argument arrows.
    pub curried: bool,
}

impl Options {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_curried(mut self, curried: bool) -> Self {
        self.curried = curried;
        self
    }
}

/// Load a .proto file and translate it.
pub fn generate_metta_from_proto<P: AsRef<Path>>(
    proto_path: P,
    options: &Options,
) -> Result<String, GenerateError> {
    let file = parse_proto_file(proto_path)?;
    Ok(generate_metta(&file, options))
}

/// Translate an already loaded descriptor tree.
pub fn generate_metta(file: &SchemaFile, options: &Options) -> String {
    Generator::new(file, options).description_to_metta()
}

/// Renders one schema file. The prefix and mode are fixed at construction.
#[derive(Debug)]
pub struct Generator<'a> {
    file: &'a SchemaFile,
    prefix: String,
    curried: bool,
}

impl<'a> Generator<'a> {
    pub fn new(file: &'a SchemaFile, options: &Options) -> Self {
        let prefix = if options.prefix.is_empty() {
            file.package_name().to_string()
        } else {
            options.prefix.clone()
        };
        Generator {
            file,
            prefix,
            curried: options.curried,
        }
    }

    /// The effective prefix: the explicit one, else the package, else empty.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<prefix>.<name>`. Nested types get the run prefix too, not their
    /// parent's name.
    fn qualify(&self, name: &str) -> String {
        format!("{}.{}", self.prefix, name)
    }

    /// Whole-file rendering: header, then messages, then services.
    /// Top-level enums are not rendered.
    pub fn description_to_metta(&self) -> String {
        let file = self.file;
        let mut out = String::new();

        out.push_str(HEADER_RULE);
        out.push('\n');
        out.push_str(";; MeTTa representation, generated by protobuf-metta\n");
        out.push_str(";;\n");
        out.push_str(&format!(";; Protobuf file: {}\n", file.name));
        out.push_str(&format!(";; Protobuf syntax: {}\n", file.syntax));
        if !file.package_name().is_empty() {
            out.push_str(&format!(";; Protobuf package: {}\n", file.package_name()));
        }
        if !self.prefix.is_empty() {
            out.push_str(&format!(";; Prefix: {}\n", self.prefix));
        }
        out.push_str(HEADER_RULE);
        out.push_str("\n\n");

        out.push_str(&banner("Message Types"));
        for (name, message) in &file.messages {
            out.push_str(&banner(name));
            out.push_str(&self.message_to_metta(message));
        }

        if !file.enums.is_empty() {
            debug!(
                count = file.enums.len(),
                "skipping top-level enums, only nested enums are rendered"
            );
        }

        out.push_str(&banner("Services"));
        for (name, service) in &file.services {
            out.push_str(&banner(name));
            out.push_str(&self.service_to_metta(service));
        }

        out
    }

    /// MeTTa type name of a field: qualified for message and enum references,
    /// the scalar table entry otherwise.
    pub fn field_type_name(&self, field: &Field) -> String {
        match &field.ty {
            FieldType::Message(r) | FieldType::Enum(r) => self.qualify(&r.name),
            FieldType::Scalar(_) | FieldType::Group(_) => {
                scalar_type_name(field.ty.kind()).to_string()
            }
        }
    }

    /// Example, for `enum Week { SUN = 0; MON = 1; }` in package `example`:
    ///
    /// ```text
    /// ;; Define example.Week enum type
    /// (: example.Week Type)
    ///
    /// ;; Define example.Week enum values
    /// (: example.Week.SUN example.Week)
    /// (: example.Week.MON example.Week)
    /// ```
    ///
    /// Enum numbers are not rendered.
    pub fn enum_to_metta(&self, en: &Enum) -> String {
        debug!(name = %en.full_name, values = en.values.len(), "rendering enum");
        let mut s = String::new();

        let type_name = self.qualify(&en.name);
        s.push_str(&format!(";; Define {type_name} enum type\n"));
        s.push_str(&format!("(: {type_name} Type)\n\n"));

        s.push_str(&format!(";; Define {type_name} enum values\n"));
        for value in en.values.keys() {
            s.push_str(&format!("(: {type_name}.{value} {type_name})\n"));
        }
        s.push('\n');
        s
    }

    /// Type declaration, nested messages, nested enums, constructor, then one
    /// accessor per field. The constructor comment reads "constructor". Some
    /// previously generated .metta files spell it "constuctor", so output
    /// differs from those in that one word.
    ///
    /// For `message Name { string forename = 1; string surname = 2; }` in
    /// package `example` (uncurried):
    ///
    /// ```text
    /// ;; Define example.Name type
    /// (: example.Name Type)
    ///
    /// ;; Define example.Name constructor
    /// (: example.MkName
    ///    (->
    ///     String ; forename
    ///     String ; surname
    ///     example.Name))
    ///
    /// ;; Define example.Name access functions
    ///
    /// ;; Define example.Name.forename
    /// (: example.Name.forename (-> example.Name String))
    /// (= (example.Name.forename
    ///     (example.MkName
    ///      $forename
    ///      $surname)) $forename)
    /// ```
    pub fn message_to_metta(&self, message: &Message) -> String {
        debug!(
            name = %message.full_name,
            fields = message.fields.len(),
            nested_messages = message.nested_messages.len(),
            nested_enums = message.nested_enums.len(),
            "rendering message"
        );
        let mut s = String::new();

        let type_name = self.qualify(&message.name);
        s.push_str(&format!(";; Define {type_name} type\n"));
        s.push_str(&format!("(: {type_name} Type)\n\n"));

        for nested in message.nested_messages.values() {
            s.push_str(&self.message_to_metta(nested));
        }
        for nested in message.nested_enums.values() {
            s.push_str(&self.enum_to_metta(nested));
        }

        // Constructor
        let ctor_name = self.constructor_name(message);
        s.push_str(&format!(";; Define {type_name} constructor\n"));
        s.push_str(&format!("(: {ctor_name}\n"));
        self.constructor_type(message)
            .render_block(&mut s, self.curried);
        s.push_str(")\n\n");

        // Access functions
        let bound: Vec<String> = message
            .fields
            .values()
            .map(|f| format!("     ${}", f.name))
            .collect();
        let bound = bound.join("\n");

        s.push_str(&format!(";; Define {type_name} access functions\n\n"));
        for field in message.fields.values() {
            let fn_name = format!("{type_name}.{}", field.name);
            let field_type = self.field_type_name(field);
            trace!(accessor = %fn_name, ty = %field_type, "rendering accessor");
            s.push_str(&format!(";; Define {fn_name}\n"));
            s.push_str(&format!("(: {fn_name} (-> {type_name} {field_type}))\n"));
            s.push_str(&format!("(= ({fn_name}\n"));
            s.push_str(&format!("    ({ctor_name}\n"));
            s.push_str(&bound);
            s.push_str(&format!(")) ${})\n\n", field.name));
        }

        s
    }

    /// `<prefix>.Mk<name>`.
    pub fn constructor_name(&self, message: &Message) -> String {
        self.qualify(&format!("Mk{}", message.name))
    }

    /// Function type of the constructor, over the fields in field-number order.
    pub fn constructor_type(&self, message: &Message) -> FnType {
        let params: Vec<Param> = message
            .fields
            .values()
            .map(|f| Param::new(self.field_type_name(f), f.name.as_str()))
            .collect();
        FnType::build(params, self.qualify(&message.name), self.curried)
    }

    /// One function type per method, in declaration order:
    ///
    /// ```text
    /// ;; Define example.salute service method
    /// (: example.salute (-> example.Person example.Greet))
    /// ```
    pub fn service_to_metta(&self, service: &Service) -> String {
        debug!(name = %service.full_name, methods = service.methods.len(), "rendering service");
        let mut s = String::new();
        for (name, method) in &service.methods {
            let method_name = self.qualify(name);
            let input = self.qualify(&method.input.name);
            let output = self.qualify(&method.output.name);
            s.push_str(&format!(";; Define {method_name} service method\n"));
            s.push_str(&format!("(: {method_name} (-> {input} {output}))\n\n"));
        }
        s
    }
}

/// Fixed MeTTa names for the 18 descriptor kinds.
pub fn scalar_type_name(kind: ScalarType) -> &'static str {
    match kind {
        ScalarType::Double => "Double",
        ScalarType::Float => "Float",
        ScalarType::Int64 => "Int64",
        ScalarType::Uint64 => "UInt64",
        ScalarType::Int32 => "Int32",
        ScalarType::Fixed64 => "Fixed64",
        ScalarType::Fixed32 => "Fixed32",
        ScalarType::Bool => "Bool",
        ScalarType::String => "String",
        ScalarType::Group => "Group",
        ScalarType::Message => "Message",
        ScalarType::Bytes => "Bytes",
        ScalarType::Uint32 => "UInt32",
        ScalarType::Enum => "Enum",
        ScalarType::Sfixed32 => "SFixed32",
        ScalarType::Sfixed64 => "SFixed64",
        ScalarType::Sint32 => "SInt32",
        ScalarType::Sint64 => "SInt64",
    }
}

fn banner(title: &str) -> String {
    let rule = ";".repeat(title.len() + 6);
    format!("{rule}\n;; {title} ;;\n{rule}\n\n")
}
