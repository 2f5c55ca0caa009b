use crate::definition::{ArrayKind, FieldDefinition, FieldType, MessageDefinition, PrimitiveType};
use crate::error::SchemaError;
use crate::format::SchemaFormat;

/// Wire-level shape of one non-constant field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WireType {
    Primitive(PrimitiveType),
    /// Index into [`CompiledSchema::messages`].
    Message(usize),
}

#[derive(Clone, Debug)]
pub(crate) struct CompiledField {
    pub name: String,
    pub ty: WireType,
    pub array: Option<ArrayKind>,
}

#[derive(Clone, Debug)]
pub(crate) struct CompiledMessage {
    pub fields: Vec<CompiledField>,
}

/// Definitions with every complex type resolved to an index and every
/// constant dropped. Message 0 is the root.
///
/// Compilation happens once per channel, so a schema naming a type it
/// never defines is rejected at registration instead of on every
/// message.
#[derive(Clone, Debug)]
pub(crate) struct CompiledSchema {
    pub definitions: Vec<MessageDefinition>,
    pub messages: Vec<CompiledMessage>,
}

/// ROS 2 schemas may reference these without spelling them out.
const ROS2_BUILTINS: [&str; 2] = ["builtin_interfaces/Time", "builtin_interfaces/Duration"];

impl CompiledSchema {
    pub fn compile(
        mut definitions: Vec<MessageDefinition>,
        root_name: &str,
        format: SchemaFormat,
    ) -> Result<Self, SchemaError> {
        if let Some(root) = definitions.first_mut() {
            if root.name.is_none() && !root_name.is_empty() {
                root.name = Some(crate::definition::normalize_type_name(root_name));
            }
        }

        if format == SchemaFormat::Ros2 {
            add_missing_builtins(&mut definitions);
        }

        let mut messages = Vec::with_capacity(definitions.len());
        for def in &definitions {
            let mut fields = Vec::with_capacity(def.fields.len());
            for field in def.fields.iter().filter(|f| !f.is_constant()) {
                fields.push(CompiledField {
                    name: field.name.clone(),
                    ty: resolve_field(&definitions, def, field)?,
                    array: field.array,
                });
            }
            messages.push(CompiledMessage { fields });
        }

        Ok(Self {
            definitions,
            messages,
        })
    }
}

fn add_missing_builtins(definitions: &mut Vec<MessageDefinition>) {
    for name in ROS2_BUILTINS {
        let referenced = definitions.iter().any(|d| {
            d.fields
                .iter()
                .any(|f| matches!(&f.field_type, FieldType::Complex(t) if t == name))
        });
        let defined = definitions.iter().any(|d| d.name.as_deref() == Some(name));
        if referenced && !defined {
            definitions.push(MessageDefinition {
                name: Some(name.to_string()),
                fields: vec![
                    builtin_field("sec", PrimitiveType::Int32),
                    builtin_field("nanosec", PrimitiveType::Uint32),
                ],
            });
        }
    }
}

fn builtin_field(name: &str, ty: PrimitiveType) -> FieldDefinition {
    FieldDefinition {
        name: name.to_string(),
        field_type: FieldType::Primitive(ty),
        array: None,
        constant: None,
    }
}

fn resolve_field(
    definitions: &[MessageDefinition],
    parent: &MessageDefinition,
    field: &FieldDefinition,
) -> Result<WireType, SchemaError> {
    match &field.field_type {
        FieldType::Primitive(p) => Ok(WireType::Primitive(*p)),
        FieldType::Complex(type_name) => find_definition(definitions, type_name, parent)
            .map(WireType::Message)
            .ok_or_else(|| SchemaError::UnresolvedType {
                type_name: type_name.clone(),
            }),
    }
}

/// Look a type name up the way ROS tooling does: exact name first, then
/// the `Header` shorthand, then the parent's own package, then a unique
/// `/Name` suffix match.
fn find_definition(
    definitions: &[MessageDefinition],
    type_name: &str,
    parent: &MessageDefinition,
) -> Option<usize> {
    let by_name = |name: &str| {
        definitions
            .iter()
            .position(|d| d.name.as_deref() == Some(name))
    };

    if let Some(index) = by_name(type_name) {
        return Some(index);
    }
    if type_name == "Header" {
        if let Some(index) = by_name("std_msgs/Header") {
            return Some(index);
        }
    }
    if !type_name.contains('/') {
        let package = parent
            .name
            .as_deref()
            .and_then(|n| n.split_once('/'))
            .map(|(pkg, _)| pkg);
        if let Some(index) = package.and_then(|pkg| by_name(&format!("{pkg}/{type_name}"))) {
            return Some(index);
        }
    }

    let suffix = format!("/{type_name}");
    let mut matches = definitions
        .iter()
        .enumerate()
        .filter(|(_, d)| d.name.as_deref().is_some_and(|n| n.ends_with(&suffix)));
    match (matches.next(), matches.next()) {
        (Some((index, _)), None) => Some(index),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::parse_definitions;

    fn compile(text: &str, root: &str, format: SchemaFormat) -> Result<CompiledSchema, SchemaError> {
        CompiledSchema::compile(parse_definitions(text, format).unwrap(), root, format)
    }

    #[test]
    fn constants_are_not_compiled() {
        let schema = compile("uint8 A=1\nuint8 mode", "pkg/Mode", SchemaFormat::Ros1).unwrap();
        assert_eq!(schema.messages[0].fields.len(), 1);
        assert_eq!(schema.messages[0].fields[0].name, "mode");
    }

    #[test]
    fn root_takes_schema_name() {
        let schema = compile("int32 a", "pkg/msg/Thing", SchemaFormat::Ros2).unwrap();
        assert_eq!(schema.definitions[0].name.as_deref(), Some("pkg/Thing"));
    }

    #[test]
    fn header_shorthand_resolves() {
        let text = "Header header\n===\nMSG: std_msgs/Header\nuint32 seq\ntime stamp\nstring frame_id";
        let schema = compile(text, "pkg/Stamped", SchemaFormat::Ros1).unwrap();
        assert_eq!(schema.messages[0].fields[0].ty, WireType::Message(1));
    }

    #[test]
    fn same_package_resolves() {
        let text = "Inner a\n===\nMSG: pkg/Inner\nint8 x";
        let schema = compile(text, "pkg/Outer", SchemaFormat::Ros1).unwrap();
        assert_eq!(schema.messages[0].fields[0].ty, WireType::Message(1));
    }

    #[test]
    fn unique_suffix_resolves() {
        let text = "Point p\n===\nMSG: geometry_msgs/Point\nfloat64 x";
        let schema = compile(text, "", SchemaFormat::Ros1).unwrap();
        assert_eq!(schema.messages[0].fields[0].ty, WireType::Message(1));
    }

    #[test]
    fn missing_type_rejected() {
        let err = compile("pkg/Missing m", "pkg/Root", SchemaFormat::Ros1).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedType { type_name } if type_name == "pkg/Missing"));
    }

    #[test]
    fn ros2_builtin_time_synthesized() {
        let schema = compile("builtin_interfaces/Time stamp", "pkg/T", SchemaFormat::Ros2).unwrap();
        assert_eq!(schema.messages.len(), 2);
        let names: Vec<_> = schema.messages[1].fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["sec", "nanosec"]);
    }
}
