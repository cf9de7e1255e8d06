//! Structural schemas for raw records and the interpreter that checks them.
//!
//! Each entity kind has one statically declared [`Schema`]. Validation walks
//! an untyped `serde_json::Value` against it before any typed conversion, so
//! failures name the exact field path instead of a serde position.

use serde_json::Value;

use crate::error::{CoreError, SchemaError, SyntaxError};
use crate::model::edge::{EdgeStatus, PropertyType};
use crate::model::location::{LocationType, Urgency};
use crate::model::system::OperatorType;
use crate::raw::{
    EntityKind, RawComponent, RawComponentInstance, RawDeclaration, RawEdge, RawEntity,
    RawLocation, RawNail, RawOperator, RawProject, RawQuery, RawRecord, RawSystem, RawSystemEdge,
};

/// Shape of a single field value.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    String,
    Number,
    /// Unsigned 32-bit integer.
    Integer,
    Bool,
    Enum(&'static [&'static str]),
    Object(&'static Schema),
    Array(&'static Schema),
    /// Object whose values are all booleans.
    BoolMap,
}

impl FieldType {
    fn describe(&self) -> &'static str {
        match self {
            FieldType::String | FieldType::Enum(_) => "a string",
            FieldType::Number => "a number",
            FieldType::Integer => "an unsigned 32-bit integer",
            FieldType::Bool => "a boolean",
            FieldType::Object(_) | FieldType::BoolMap => "an object",
            FieldType::Array(_) => "an array",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

impl Field {
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
        }
    }
}

/// Declared fields of one raw record kind. Undeclared fields are rejected.
#[derive(Debug)]
pub struct Schema {
    pub kind: EntityKind,
    pub fields: &'static [Field],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

use FieldType::{Array, Bool, BoolMap, Integer, Number, Object};

pub static LOCATION: Schema = Schema {
    kind: EntityKind::Location,
    fields: &[
        Field::required("name", FieldType::String),
        Field::required("nickname", FieldType::String),
        Field::required("invariant", FieldType::String),
        Field::required("type", FieldType::Enum(LocationType::NAMES)),
        Field::required("urgency", FieldType::Enum(Urgency::NAMES)),
        Field::required("x", Number),
        Field::required("y", Number),
        Field::required("color", FieldType::String),
        Field::required("nicknameX", Number),
        Field::required("nicknameY", Number),
        Field::required("invariantX", Number),
        Field::required("invariantY", Number),
    ],
};

pub static NAIL: Schema = Schema {
    kind: EntityKind::Nail,
    fields: &[
        Field::required("x", Number),
        Field::required("y", Number),
        Field::required("propertyType", FieldType::Enum(PropertyType::NAMES)),
        Field::required("propertyX", Number),
        Field::required("propertyY", Number),
    ],
};

pub static EDGE: Schema = Schema {
    kind: EntityKind::Edge,
    fields: &[
        Field::required("id", FieldType::String),
        Field::required("group", FieldType::String),
        Field::required("sourceLocation", FieldType::String),
        Field::required("targetLocation", FieldType::String),
        Field::required("status", FieldType::Enum(EdgeStatus::NAMES)),
        Field::optional("select", FieldType::String),
        Field::required("guard", FieldType::String),
        Field::required("update", FieldType::String),
        Field::required("sync", FieldType::String),
        Field::required("isLocked", Bool),
        Field::required("nails", Array(&NAIL)),
    ],
};

pub static COMPONENT: Schema = Schema {
    kind: EntityKind::Component,
    fields: &[
        Field::required("name", FieldType::String),
        Field::required("declarations", FieldType::String),
        Field::required("locations", Array(&LOCATION)),
        Field::required("edges", Array(&EDGE)),
        Field::required("description", FieldType::String),
        Field::required("x", Number),
        Field::required("y", Number),
        Field::required("width", Number),
        Field::required("height", Number),
        Field::required("color", FieldType::String),
        Field::required("includeInPeriodicCheck", Bool),
    ],
};

pub static COMPONENT_INSTANCE: Schema = Schema {
    kind: EntityKind::ComponentInstance,
    fields: &[
        Field::required("id", Integer),
        Field::required("componentName", FieldType::String),
        Field::required("x", Number),
        Field::required("y", Number),
    ],
};

pub static OPERATOR: Schema = Schema {
    kind: EntityKind::Operator,
    fields: &[
        Field::required("id", Integer),
        Field::required("type", FieldType::Enum(OperatorType::NAMES)),
        Field::required("x", Number),
        Field::required("y", Number),
    ],
};

pub static SYSTEM_EDGE: Schema = Schema {
    kind: EntityKind::SystemEdge,
    fields: &[
        Field::required("parent", Integer),
        Field::required("child", Integer),
    ],
};

pub static SYSTEM: Schema = Schema {
    kind: EntityKind::System,
    fields: &[
        Field::required("name", FieldType::String),
        Field::required("description", FieldType::String),
        Field::required("x", Number),
        Field::required("y", Number),
        Field::required("width", Number),
        Field::required("height", Number),
        Field::required("color", FieldType::String),
        Field::required("componentInstances", Array(&COMPONENT_INSTANCE)),
        Field::required("operators", Array(&OPERATOR)),
        Field::required("edges", Array(&SYSTEM_EDGE)),
    ],
};

pub static QUERY: Schema = Schema {
    kind: EntityKind::Query,
    fields: &[
        Field::required("query", FieldType::String),
        Field::required("comment", FieldType::String),
        Field::required("isPeriodic", Bool),
        Field::required("ignoredInputs", BoolMap),
        Field::required("ignoredOutputs", BoolMap),
        Field::required("backend", Integer),
    ],
};

pub static DECLARATION: Schema = Schema {
    kind: EntityKind::Declaration,
    fields: &[
        Field::required("name", FieldType::String),
        Field::required("declarations", FieldType::String),
    ],
};

pub static PROJECT: Schema = Schema {
    kind: EntityKind::Project,
    fields: &[
        Field::required("name", FieldType::String),
        Field::required("globalDeclarations", Object(&DECLARATION)),
        Field::required("components", Array(&COMPONENT)),
        Field::required("systems", Array(&SYSTEM)),
        Field::required("queries", Array(&QUERY)),
    ],
};

/// Look up the schema declared for a kind.
pub fn schema_for(kind: EntityKind) -> &'static Schema {
    match kind {
        EntityKind::Project => &PROJECT,
        EntityKind::Component => &COMPONENT,
        EntityKind::Location => &LOCATION,
        EntityKind::Edge => &EDGE,
        EntityKind::Nail => &NAIL,
        EntityKind::System => &SYSTEM,
        EntityKind::ComponentInstance => &COMPONENT_INSTANCE,
        EntityKind::Operator => &OPERATOR,
        EntityKind::SystemEdge => &SYSTEM_EDGE,
        EntityKind::Query => &QUERY,
        EntityKind::Declaration => &DECLARATION,
    }
}

/// Check an untyped value against the schema of `kind`.
pub fn check(kind: EntityKind, value: &Value) -> Result<(), SchemaError> {
    check_object(schema_for(kind), value, "")
}

/// Parse and validate a JSON document of the given kind.
pub fn validate(kind: EntityKind, json: &str) -> Result<RawRecord, CoreError> {
    match kind {
        EntityKind::Project => parse::<RawProject>(json).map(RawEntity::into_record),
        EntityKind::Component => parse::<RawComponent>(json).map(RawEntity::into_record),
        EntityKind::Location => parse::<RawLocation>(json).map(RawEntity::into_record),
        EntityKind::Edge => parse::<RawEdge>(json).map(RawEntity::into_record),
        EntityKind::Nail => parse::<RawNail>(json).map(RawEntity::into_record),
        EntityKind::System => parse::<RawSystem>(json).map(RawEntity::into_record),
        EntityKind::ComponentInstance => {
            parse::<RawComponentInstance>(json).map(RawEntity::into_record)
        }
        EntityKind::Operator => parse::<RawOperator>(json).map(RawEntity::into_record),
        EntityKind::SystemEdge => parse::<RawSystemEdge>(json).map(RawEntity::into_record),
        EntityKind::Query => parse::<RawQuery>(json).map(RawEntity::into_record),
        EntityKind::Declaration => parse::<RawDeclaration>(json).map(RawEntity::into_record),
    }
}

/// Parse and validate a JSON document into a typed raw record.
pub fn parse<R: RawEntity>(json: &str) -> Result<R, CoreError> {
    let value: Value = serde_json::from_str(json).map_err(SyntaxError::from)?;
    parse_value(value)
}

/// Validate an already parsed value into a typed raw record.
pub fn parse_value<R: RawEntity>(value: Value) -> Result<R, CoreError> {
    check(R::KIND, &value)?;
    convert(value, "")
}

/// Parse and validate a JSON array whose elements are all of kind `R`.
pub fn parse_list<R: RawEntity>(json: &str) -> Result<Vec<R>, CoreError> {
    let value: Value = serde_json::from_str(json).map_err(SyntaxError::from)?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(SchemaError::WrongType {
                path: String::new(),
                expected: "an array",
                found: json_type(&other),
            }
            .into())
        }
    };

    let schema = schema_for(R::KIND);
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let path = format!("[{index}]");
            check_object(schema, &item, &path)?;
            convert(item, &path)
        })
        .collect()
}

/// Serialize a raw record to pretty-printed JSON.
pub fn serialize<R: RawEntity>(raw: &R) -> Result<String, CoreError> {
    serde_json::to_string_pretty(raw).map_err(|e| CoreError::Serialize(e.to_string()))
}

/// Serialize a list of raw records as a JSON array.
pub fn serialize_list<R: RawEntity>(raws: &[R]) -> Result<String, CoreError> {
    serde_json::to_string_pretty(raws).map_err(|e| CoreError::Serialize(e.to_string()))
}

/// Serialize a record of any kind.
pub fn serialize_record(record: &RawRecord) -> Result<String, CoreError> {
    let value = record
        .to_value()
        .map_err(|e| CoreError::Serialize(e.to_string()))?;
    serde_json::to_string_pretty(&value).map_err(|e| CoreError::Serialize(e.to_string()))
}

fn convert<R: RawEntity>(value: Value, path: &str) -> Result<R, CoreError> {
    serde_json::from_value(value).map_err(|e| {
        SchemaError::Conversion {
            path: path.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn check_object(schema: &Schema, value: &Value, path: &str) -> Result<(), SchemaError> {
    let object = value.as_object().ok_or_else(|| SchemaError::WrongType {
        path: path.to_string(),
        expected: "an object",
        found: json_type(value),
    })?;

    for field in schema.fields {
        let field_path = join(path, field.name);
        match object.get(field.name) {
            Some(field_value) => check_field(&field.ty, field_value, &field_path)?,
            None if field.required => {
                return Err(SchemaError::MissingField { path: field_path });
            }
            None => {}
        }
    }

    if let Some(unknown) = object.keys().find(|key| schema.field(key).is_none()) {
        return Err(SchemaError::UnknownField {
            path: join(path, unknown),
        });
    }

    Ok(())
}

fn check_field(ty: &FieldType, value: &Value, path: &str) -> Result<(), SchemaError> {
    let wrong_type = || SchemaError::WrongType {
        path: path.to_string(),
        expected: ty.describe(),
        found: json_type(value),
    };

    match ty {
        FieldType::String => value.as_str().map(|_| ()).ok_or_else(wrong_type),
        FieldType::Number => {
            if value.is_number() {
                Ok(())
            } else {
                Err(wrong_type())
            }
        }
        FieldType::Integer => match value.as_u64() {
            Some(n) if u32::try_from(n).is_ok() => Ok(()),
            _ => Err(wrong_type()),
        },
        FieldType::Bool => value.as_bool().map(|_| ()).ok_or_else(wrong_type),
        FieldType::Enum(allowed) => {
            let text = value.as_str().ok_or_else(wrong_type)?;
            if allowed.contains(&text) {
                Ok(())
            } else {
                Err(SchemaError::InvalidEnumValue {
                    path: path.to_string(),
                    value: text.to_string(),
                    allowed: *allowed,
                })
            }
        }
        FieldType::Object(schema) => check_object(schema, value, path),
        FieldType::Array(schema) => {
            let items = value.as_array().ok_or_else(wrong_type)?;
            for (index, item) in items.iter().enumerate() {
                check_object(schema, item, &format!("{path}[{index}]"))?;
            }
            Ok(())
        }
        FieldType::BoolMap => {
            let entries = value.as_object().ok_or_else(wrong_type)?;
            for (key, entry) in entries {
                if !entry.is_boolean() {
                    return Err(SchemaError::WrongType {
                        path: join(path, key),
                        expected: "a boolean",
                        found: json_type(entry),
                    });
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn location_json() -> Value {
        json!({
            "name": "L5",
            "nickname": "n",
            "invariant": "i",
            "type": "INITIAL",
            "urgency": "NORMAL",
            "x": 140,
            "y": 100,
            "color": "7",
            "nicknameX": 30,
            "nicknameY": -10,
            "invariantX": 10,
            "invariantY": 10
        })
    }

    fn schema_error(result: Result<RawRecord, CoreError>) -> SchemaError {
        match result {
            Err(CoreError::Schema(err)) => err,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_location_accepted() {
        let record = validate(EntityKind::Location, &location_json().to_string()).unwrap();
        let RawRecord::Location(raw) = record else {
            panic!("expected a location record");
        };
        assert_eq!(raw.id, "L5");
        assert_eq!(raw.kind, LocationType::Initial);
        assert_eq!(raw.x, 140.0);
        assert_eq!(raw.invariant_x, 10.0);
    }

    const L5: &str = r#"{"name":"L5", "nickname":"n", "invariant":"i", "type":"INITIAL",
        "urgency":"NORMAL", "x":140, "y":100, "color":"7", "nicknameX":30, "nicknameY":-10,
        "invariantX":10, "invariantY":10}"#;

    #[test]
    fn test_location_document_as_written() {
        let raw: RawLocation = parse(L5).unwrap();
        assert_eq!(raw.id, "L5");
        assert_eq!(raw.nickname, "n");
        assert_eq!(raw.invariant, "i");
        assert_eq!(raw.color, "7");
        assert_eq!((raw.nickname_x, raw.nickname_y), (30.0, -10.0));

        let without_invariant_x = L5.replace(r#""invariantX":10, "#, "");
        let err = parse::<RawLocation>(&without_invariant_x).unwrap_err();
        assert_eq!(
            err.as_schema(),
            Some(&SchemaError::MissingField {
                path: "invariantX".to_string()
            })
        );
    }

    #[test]
    fn test_location_id_key_rejected() {
        let mut value = location_json();
        let name = value.as_object_mut().unwrap().remove("name").unwrap();
        value["id"] = name;

        let err = schema_error(validate(EntityKind::Location, &value.to_string()));
        assert_eq!(
            err,
            SchemaError::MissingField {
                path: "name".to_string()
            }
        );
    }

    #[test]
    fn test_missing_field_named() {
        let mut value = location_json();
        value.as_object_mut().unwrap().remove("invariantX");

        let err = schema_error(validate(EntityKind::Location, &value.to_string()));
        assert_eq!(
            err,
            SchemaError::MissingField {
                path: "invariantX".to_string()
            }
        );
    }

    #[test]
    fn test_enum_typo_rejected() {
        let mut value = location_json();
        value["type"] = json!("INTIAL");

        let err = schema_error(validate(EntityKind::Location, &value.to_string()));
        assert_eq!(err.path(), "type");
        assert!(matches!(err, SchemaError::InvalidEnumValue { ref value, .. } if value == "INTIAL"));
    }

    #[test]
    fn test_syntax_error_distinct_from_schema_error() {
        let err = validate(EntityKind::Location, "{\"id\": \"L5\",").unwrap_err();
        assert!(err.is_syntax());
        assert!(err.as_schema().is_none());
    }

    #[test]
    fn test_wrong_type_and_unknown_field() {
        let mut value = location_json();
        value["x"] = json!("140");
        let err = schema_error(validate(EntityKind::Location, &value.to_string()));
        assert_eq!(
            err,
            SchemaError::WrongType {
                path: "x".to_string(),
                expected: "a number",
                found: "a string"
            }
        );

        let mut value = location_json();
        value["label"] = json!("extra");
        let err = schema_error(validate(EntityKind::Location, &value.to_string()));
        assert_eq!(
            err,
            SchemaError::UnknownField {
                path: "label".to_string()
            }
        );
    }

    #[test]
    fn test_nested_path_reported() {
        let mut bad_location = location_json();
        bad_location["urgency"] = json!("LAZY");
        let component = json!({
            "name": "Admin",
            "declarations": "clock z;",
            "locations": [location_json(), bad_location],
            "edges": [],
            "description": "",
            "x": 0, "y": 0, "width": 450, "height": 600,
            "color": "5",
            "includeInPeriodicCheck": false
        });

        let err = schema_error(validate(EntityKind::Component, &component.to_string()));
        assert_eq!(err.path(), "locations[1].urgency");
    }

    #[test]
    fn test_integer_fields_must_be_unsigned() {
        let err = schema_error(validate(
            EntityKind::SystemEdge,
            r#"{"parent": -1, "child": 2}"#,
        ));
        assert_eq!(err.path(), "parent");

        let err = schema_error(validate(
            EntityKind::SystemEdge,
            r#"{"parent": 1.5, "child": 2}"#,
        ));
        assert_eq!(err.path(), "parent");
    }

    #[test]
    fn test_bool_map_values_checked() {
        let query = json!({
            "query": "refinement: A <= B",
            "comment": "",
            "isPeriodic": false,
            "ignoredInputs": {"grant": true, "pub": "yes"},
            "ignoredOutputs": {},
            "backend": 0
        });
        let err = schema_error(validate(EntityKind::Query, &query.to_string()));
        assert_eq!(err.path(), "ignoredInputs.pub");
    }

    #[test]
    fn test_serialize_then_validate_is_identity() {
        let record = validate(EntityKind::Location, &location_json().to_string()).unwrap();
        let json = serialize_record(&record).unwrap();
        let again = validate(EntityKind::Location, &json).unwrap();
        assert_eq!(again, record);
    }

    #[test]
    fn test_whole_coordinates_written_as_integers() {
        let mut raw: RawLocation = parse(L5).unwrap();
        raw.invariant_y = 12.5;
        let json = serialize(&raw).unwrap();

        assert!(json.contains("\"x\": 140,"));
        assert!(json.contains("\"nicknameY\": -10,"));
        assert!(json.contains("\"invariantY\": 12.5"));
        assert!(!json.contains("140.0"));
        assert_eq!(parse::<RawLocation>(&json).unwrap(), raw);
    }

    #[test]
    fn test_parse_list_paths_are_indexed() {
        let json = r#"[{"parent": 0, "child": 1}, {"parent": 0}]"#;
        let err = parse_list::<RawSystemEdge>(json).unwrap_err();
        assert_eq!(err.as_schema().map(SchemaError::path), Some("[1].child"));

        let edges = parse_list::<RawSystemEdge>(r#"[{"parent": 0, "child": 1}]"#).unwrap();
        assert_eq!(edges, vec![RawSystemEdge { parent: 0, child: 1 }]);
    }

    #[test]
    fn test_every_enum_name_deserializes() {
        for name in LocationType::NAMES {
            assert!(serde_json::from_value::<LocationType>(json!(name)).is_ok());
        }
        for name in Urgency::NAMES {
            assert!(serde_json::from_value::<Urgency>(json!(name)).is_ok());
        }
        for name in OperatorType::NAMES {
            assert!(serde_json::from_value::<OperatorType>(json!(name)).is_ok());
        }
        for name in EdgeStatus::NAMES {
            assert!(serde_json::from_value::<EdgeStatus>(json!(name)).is_ok());
        }
        for name in PropertyType::NAMES {
            assert!(serde_json::from_value::<PropertyType>(json!(name)).is_ok());
        }
    }

    #[test]
    fn test_every_kind_has_its_schema() {
        for kind in EntityKind::ALL {
            assert_eq!(schema_for(kind).kind, kind);
        }
    }
}
