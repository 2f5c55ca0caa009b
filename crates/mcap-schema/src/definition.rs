use crate::error::SchemaError;
use crate::format::SchemaFormat;

/// Fixed-layout field types understood by both dialects.
///
/// `Time` and `Duration` only exist in ROS 1 text; ROS 2 spells them as
/// the `builtin_interfaces` message types instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveType {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    String,
    Time,
    Duration,
}

impl PrimitiveType {
    /// Parse a primitive type name in the given dialect.
    ///
    /// `byte` is signed in ROS 1 and an octet in ROS 2; `char` is an
    /// unsigned byte in both.
    #[must_use]
    pub fn parse(name: &str, format: SchemaFormat) -> Option<Self> {
        let ty = match name {
            "bool" => Self::Bool,
            "int8" => Self::Int8,
            "uint8" | "char" => Self::Uint8,
            "byte" => match format {
                SchemaFormat::Ros1 => Self::Int8,
                SchemaFormat::Ros2 => Self::Uint8,
            },
            "int16" => Self::Int16,
            "uint16" => Self::Uint16,
            "int32" => Self::Int32,
            "uint32" => Self::Uint32,
            "int64" => Self::Int64,
            "uint64" => Self::Uint64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "string" => Self::String,
            "time" if format == SchemaFormat::Ros1 => Self::Time,
            "duration" if format == SchemaFormat::Ros1 => Self::Duration,
            _ => return None,
        };
        Some(ty)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Primitive(PrimitiveType),
    /// Another message type, by (normalized) name. Resolved against the
    /// definitions of the same schema when the decoder is built.
    Complex(String),
}

/// Array shape of a field. Bounded sequences (`T[<=N]`) are dynamic on
/// the wire and parse as [`ArrayKind::Dynamic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayKind {
    Dynamic,
    Fixed(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub field_type: FieldType,
    pub array: Option<ArrayKind>,
    /// Constant value text. Constants are part of the definition but
    /// never appear in a serialized message.
    pub constant: Option<String>,
}

impl FieldDefinition {
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.constant.is_some()
    }
}

/// One message type from a schema. The first definition of a schema is
/// the root and usually has no name of its own.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageDefinition {
    pub name: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

/// Parse a `.msg`-style schema text into its definitions.
///
/// ```text
///   Header header               ← root definition
///   geometry_msgs/Point[] pts
///   uint8 MODE_FAST=1           ← constant
///   ======================      ← separator
///   MSG: geometry_msgs/Point    ← dependent definition
///   float64 x
/// ```
///
/// # Errors
///
/// [`SchemaError::InvalidDefinition`] with the 1-based line number of
/// the first line that cannot be parsed.
pub fn parse_definitions(
    text: &str,
    format: SchemaFormat,
) -> Result<Vec<MessageDefinition>, SchemaError> {
    let mut definitions = Vec::new();
    let mut current = MessageDefinition::default();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with("==") {
            definitions.push(std::mem::take(&mut current));
            continue;
        }

        if let Some(name) = line.strip_prefix("MSG:") {
            current.name = Some(normalize_type_name(name.trim()));
            continue;
        }

        if !definitions.is_empty() && current.name.is_none() {
            return Err(SchemaError::InvalidDefinition {
                line: line_no,
                reason: "dependent definition has no MSG: line".to_string(),
            });
        }

        let field = parse_field(line, format).map_err(|reason| SchemaError::InvalidDefinition {
            line: line_no,
            reason,
        })?;
        current.fields.push(field);
    }
    definitions.push(current);

    // A trailing separator leaves an empty, unnamed definition behind.
    let mut index = 0;
    definitions.retain(|def| {
        index += 1;
        index == 1 || def.name.is_some() || !def.fields.is_empty()
    });

    Ok(definitions)
}

/// `pkg/msg/Type` (ROS 2 long form) and `pkg/Type` name the same type.
#[must_use]
pub fn normalize_type_name(name: &str) -> String {
    name.replacen("/msg/", "/", 1)
}

fn parse_field(line: &str, format: SchemaFormat) -> Result<FieldDefinition, String> {
    let (type_text, rest) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("missing field name after {line:?}"))?;
    let rest = rest.trim_start();
    let (field_type, array) = parse_type(type_text, format)?;

    if let Some((name, value)) = rest.split_once('=') {
        let name = name.trim();
        if is_identifier(name) {
            if array.is_some() {
                return Err(format!("constant {name} cannot be an array"));
            }
            // String constants run to end of line, '#' included.
            let value = match field_type {
                FieldType::Primitive(PrimitiveType::String) => value.trim(),
                _ => strip_comment(value).trim(),
            };
            return Ok(FieldDefinition {
                name: name.to_string(),
                field_type,
                array: None,
                constant: Some(value.to_string()),
            });
        }
    }

    // Anything after the name is a ROS 2 default value.
    let name = strip_comment(rest)
        .split_whitespace()
        .next()
        .ok_or_else(|| format!("missing field name after {type_text:?}"))?;
    if !is_identifier(name) {
        return Err(format!("invalid field name {name:?}"));
    }

    Ok(FieldDefinition {
        name: name.to_string(),
        field_type,
        array,
        constant: None,
    })
}

fn parse_type(
    text: &str,
    format: SchemaFormat,
) -> Result<(FieldType, Option<ArrayKind>), String> {
    let (base, array) = match text.find('[') {
        Some(open) => {
            let inner = text[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| format!("unterminated array type {text:?}"))?;
            let array = if let Some(bound) = inner.strip_prefix("<=") {
                bound
                    .parse::<usize>()
                    .map_err(|_| format!("invalid array bound in {text:?}"))?;
                ArrayKind::Dynamic
            } else if inner.is_empty() {
                ArrayKind::Dynamic
            } else {
                ArrayKind::Fixed(
                    inner
                        .parse()
                        .map_err(|_| format!("invalid array length in {text:?}"))?,
                )
            };
            (&text[..open], Some(array))
        }
        None => (text, None),
    };

    // Bounded strings: string<=N
    let base = base.split_once("<=").map_or(base, |(b, _)| b);

    if let Some(primitive) = PrimitiveType::parse(base, format) {
        return Ok((FieldType::Primitive(primitive), array));
    }

    let valid = !base.is_empty()
        && base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '/');
    if !valid {
        return Err(format!("invalid type name {base:?}"));
    }
    Ok((FieldType::Complex(normalize_type_name(base)), array))
}

fn strip_comment(text: &str) -> &str {
    text.split_once('#').map_or(text, |(before, _)| before)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
