use metta_generator::{Generator, Options, generate_metta, generate_metta_from_proto};
use parser::parse_proto_file;
use pretty_assertions::assert_eq;

const EXAMPLE: &str = "tests/resources/example.proto";

#[test]
fn uncurried_output_matches_golden_file() {
    let out = generate_metta_from_proto(EXAMPLE, &Options::default()).expect("generation should succeed");
    assert_eq!(out, include_str!("resources/example.metta"));
}

#[test]
fn curried_constructors() {
    let out = generate_metta_from_proto(EXAMPLE, &Options::default().with_curried(true)).unwrap();

    assert!(out.contains(
        "(: example.MkName\n   (-> String ; forename\n   (-> String ; surname\n    example.Name)))\n"
    ));
    assert!(out.contains(
        "(: example.MkPerson\n\
         \x20  (-> example.Name ; name\n\
         \x20  (-> Int32 ; age\n\
         \x20  (-> example.Role ; role\n\
         \x20  (-> example.Contact ; contact\n\
         \x20   example.Person)))))\n"
    ));
    // Single-field constructors have the same shape in both modes.
    assert!(out.contains("(: example.MkGreet\n   (-> String ; text\n    example.Greet))\n"));
    // Accessors do not depend on the mode.
    assert!(out.contains("(: example.Person.role (-> example.Person example.Role))"));
}

#[test]
fn top_level_enums_are_not_emitted() {
    let out = generate_metta_from_proto(EXAMPLE, &Options::default()).unwrap();
    assert!(!out.contains("Week"));
    assert!(!out.contains("SUN"));
}

#[test]
fn services_list_methods_in_declaration_order() {
    let out = generate_metta_from_proto(EXAMPLE, &Options::default()).unwrap();
    let salute = out
        .find("(: example.salute (-> example.Person example.Greet))")
        .expect("salute missing");
    let wish = out
        .find("(: example.wish (-> example.Person example.Greet))")
        .expect("wish missing");
    assert!(salute < wish);
    assert!(out.find(";; Services ;;").unwrap() < salute);
}

#[test]
fn explicit_prefix_replaces_package_everywhere() {
    let file = parse_proto_file(EXAMPLE).unwrap();
    let out = generate_metta(&file, &Options::default().with_prefix("kb.v1"));
    assert!(out.contains(";; Protobuf package: example\n;; Prefix: kb.v1\n"));
    assert!(out.contains("(: kb.v1.MkName\n"));
    assert!(out.contains("(: kb.v1.salute (-> kb.v1.Person kb.v1.Greet))"));
    assert!(!out.contains("(: example."));
}

#[test]
fn translation_is_deterministic() {
    let file = parse_proto_file(EXAMPLE).unwrap();
    for options in [Options::default(), Options::default().with_curried(true)] {
        assert_eq!(generate_metta(&file, &options), generate_metta(&file, &options));
    }
}

#[test]
fn accessor_equations_match_constructor_arity() {
    let file = parse_proto_file(EXAMPLE).unwrap();
    for curried in [false, true] {
        let generator = Generator::new(&file, &Options::default().with_curried(curried));
        for message in file.messages.values() {
            let ctor = generator.constructor_type(message);
            assert_eq!(ctor.arity(), message.fields.len());

            let expected_vars: Vec<String> =
                message.fields.values().map(|f| format!("${}", f.name)).collect();
            let params = ctor.params();
            let ctor_labels: Vec<&str> = params.iter().map(|p| p.label.as_str()).collect();
            let field_names: Vec<&str> = message.fields.values().map(|f| f.name.as_str()).collect();
            assert_eq!(ctor_labels, field_names);

            let rendered = generator.message_to_metta(message);
            let ctor_name = generator.constructor_name(message);
            for field in message.fields.values() {
                let head = format!("(= ({}.{}.{}\n", generator.prefix(), message.name, field.name);
                let start = rendered.find(&head).expect("accessor equation missing");
                let equation = &rendered[start..];
                let end = equation.find(")) $").unwrap();
                let vars: Vec<&str> = equation[..end]
                    .lines()
                    .skip(2)
                    .map(str::trim)
                    .collect();
                assert_eq!(vars, expected_vars, "{ctor_name} / {}", field.name);
                assert!(equation[end..].starts_with(&format!(")) ${})", field.name)));
            }
        }
    }
}
