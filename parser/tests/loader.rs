use std::fs;

use parser::{FieldType, Label, Loader, ParseError, ScalarType, parse_proto_file};

#[test]
fn parses_order_proto_model() {
    let model = parse_proto_file("tests/resources/order.proto").expect("parse failed");
    assert_eq!(model.name, "order.proto");
    assert_eq!(model.package.as_deref(), Some("me.alekseinovikov.proto"));

    let order = &model.messages["Order"];
    let f = |n: &str| order.fields.values().find(|f| f.name == n).unwrap();
    assert_eq!(f("id").number, 1);
    assert_eq!(f("id").ty, FieldType::Scalar(ScalarType::Int32));
    assert_eq!(f("name").number, 2);
    assert!(matches!(&f("items").ty, FieldType::Message(r) if r.name == "OrderItem"));
    assert!(matches!(
        &f("shipping_address").ty,
        FieldType::Message(r) if r.full_name == "me.alekseinovikov.proto.Order.Address"
    ));
    assert!(matches!(&f("status").ty, FieldType::Enum(r) if r.name == "Status"));

    let status = &order.nested_enums["Status"];
    let values: Vec<(&str, i32)> = status.values.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    assert_eq!(values, vec![("NEW", 0), ("PAID", 1), ("SHIPPED", 2)]);

    let item = &model.messages["OrderItem"];
    let kinds: Vec<(&str, ScalarType)> = item
        .fields
        .values()
        .map(|f| (f.name.as_str(), f.ty.kind()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("name", ScalarType::String),
            ("count", ScalarType::Int64),
            ("type", ScalarType::Enum),
            ("price_decimal", ScalarType::Double),
            ("price_cents", ScalarType::Int64),
        ]
    );

    // Top-level enums stay in the tree even though the generator skips them.
    assert!(model.enums.contains_key("OrderItemType"));
}

#[test]
fn imports_resolve_relative_to_the_loaded_file() {
    let cart = parse_proto_file("tests/resources/shop/cart.proto").expect("load failed");
    assert_eq!(
        cart.imports,
        vec!["common/money.proto", "google/protobuf/timestamp.proto"]
    );
    // Only the requested file's definitions are part of the result.
    assert_eq!(cart.messages.keys().collect::<Vec<_>>(), vec!["Cart"]);

    let fields = &cart.messages["Cart"].fields;
    assert!(matches!(&fields[&2].ty, FieldType::Message(r) if r.full_name == "shop.common.Money"));
    assert!(matches!(
        &fields[&3].ty,
        FieldType::Message(r) if r.full_name == "google.protobuf.Timestamp"
    ));
    assert_eq!(cart.services["CartService"].methods["Get"].input.name, "Cart");
}

#[test]
fn include_paths_are_searched_first() {
    let dir = tempfile::tempdir().unwrap();
    let include = dir.path().join("include");
    fs::create_dir_all(include.join("lib")).unwrap();
    fs::write(
        include.join("lib/point.proto"),
        "syntax = \"proto3\"; package lib; message Point { double x = 1; double y = 2; }",
    )
    .unwrap();

    let src_dir = dir.path().join("src");
    fs::create_dir_all(&src_dir).unwrap();
    fs::write(
        src_dir.join("shape.proto"),
        r#"
            syntax = "proto3";
            package shapes;
            import "lib/point.proto";
            message Polygon { repeated lib.Point vertices = 1; }
        "#,
    )
    .unwrap();

    let loader = Loader::new([&include]);
    assert_eq!(loader.include_paths(), &[include.clone()]);
    let shape = loader.load(src_dir.join("shape.proto")).expect("load failed");
    let field = &shape.messages["Polygon"].fields[&1];
    assert_eq!(field.label, Label::Repeated);
    assert!(matches!(&field.ty, FieldType::Message(r) if r.full_name == "lib.Point"));

    // Without the include path the import cannot be found.
    let result = Loader::default().load(src_dir.join("shape.proto"));
    assert!(matches!(
        result,
        Err(ParseError::ImportNotFound { ref import, ref from })
            if import == "lib/point.proto" && from == "shape.proto"
    ));
}

#[test]
fn transitive_imports_resolve_next_to_their_importer() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(
        sub.join("c.proto"),
        "syntax = \"proto3\"; package deep; message Leaf { int32 v = 1; }",
    )
    .unwrap();
    fs::write(
        sub.join("b.proto"),
        "syntax = \"proto3\"; package mid; import \"c.proto\"; message Branch { deep.Leaf leaf = 1; }",
    )
    .unwrap();
    fs::write(
        dir.path().join("a.proto"),
        "syntax = \"proto3\"; package top; import \"sub/b.proto\"; message Root { mid.Branch branch = 1; }",
    )
    .unwrap();

    let root = parse_proto_file(dir.path().join("a.proto")).expect("load failed");
    assert!(matches!(
        &root.messages["Root"].fields[&1].ty,
        FieldType::Message(r) if r.full_name == "mid.Branch"
    ));
}

#[test]
fn syntax_errors_in_imports_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.proto"), "message {").unwrap();
    fs::write(
        dir.path().join("main.proto"),
        "syntax = \"proto3\"; import \"broken.proto\"; message A {}",
    )
    .unwrap();

    let result = parse_proto_file(dir.path().join("main.proto"));
    assert!(matches!(result, Err(ParseError::Pest(_))));
}
