// Bundled sources for the google/protobuf well-known types, so schemas that
// import them load without a protobuf installation on the include path.
// Only the type shapes matter here; options and comments are dropped.

const ANY: &str = r#"
syntax = "proto3";
package google.protobuf;
message Any {
  string type_url = 1;
  bytes value = 2;
}
"#;

const DURATION: &str = r#"
syntax = "proto3";
package google.protobuf;
message Duration {
  int64 seconds = 1;
  int32 nanos = 2;
}
"#;

const EMPTY: &str = r#"
syntax = "proto3";
package google.protobuf;
message Empty {}
"#;

const FIELD_MASK: &str = r#"
syntax = "proto3";
package google.protobuf;
message FieldMask {
  repeated string paths = 1;
}
"#;

const STRUCT: &str = r#"
syntax = "proto3";
package google.protobuf;
message Struct {
  map<string, Value> fields = 1;
}
message Value {
  oneof kind {
    NullValue null_value = 1;
    double number_value = 2;
    string string_value = 3;
    bool bool_value = 4;
    Struct struct_value = 5;
    ListValue list_value = 6;
  }
}
enum NullValue {
  NULL_VALUE = 0;
}
message ListValue {
  repeated Value values = 1;
}
"#;

const TIMESTAMP: &str = r#"
syntax = "proto3";
package google.protobuf;
message Timestamp {
  int64 seconds = 1;
  int32 nanos = 2;
}
"#;

const WRAPPERS: &str = r#"
syntax = "proto3";
package google.protobuf;
message DoubleValue { double value = 1; }
message FloatValue { float value = 1; }
message Int64Value { int64 value = 1; }
message UInt64Value { uint64 value = 1; }
message Int32Value { int32 value = 1; }
message UInt32Value { uint32 value = 1; }
message BoolValue { bool value = 1; }
message StringValue { string value = 1; }
message BytesValue { bytes value = 1; }
"#;

pub(crate) fn source(import: &str) -> Option<&'static str> {
    let source = match import {
        "google/protobuf/any.proto" => ANY,
        "google/protobuf/duration.proto" => DURATION,
        "google/protobuf/empty.proto" => EMPTY,
        "google/protobuf/field_mask.proto" => FIELD_MASK,
        "google/protobuf/struct.proto" => STRUCT,
        "google/protobuf/timestamp.proto" => TIMESTAMP,
        "google/protobuf/wrappers.proto" => WRAPPERS,
        _ => return None,
    };
    Some(source)
}
