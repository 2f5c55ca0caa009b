use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// Schema dialects a channel may declare.
///
/// The set is closed: a channel naming anything else is rejected when
/// it is registered, not when its first message arrives.
///
/// ```text
/// ┌──────┬─────────┬────────────────────────────────────────┐
/// │ Tag  │ Variant │ Message encoding                       │
/// ├──────┼─────────┼────────────────────────────────────────┤
/// │ ros1 │ Ros1    │ packed little-endian, u32 prefixes     │
/// │ ros2 │ Ros2    │ CDR with encapsulation header, aligned │
/// └──────┴─────────┴────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemaFormat {
    Ros1,
    Ros2,
}

impl SchemaFormat {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Ros1 => "ros1",
            Self::Ros2 => "ros2",
        }
    }
}

impl FromStr for SchemaFormat {
    type Err = SchemaError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "ros1" => Ok(Self::Ros1),
            "ros2" => Ok(Self::Ros2),
            other => Err(SchemaError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_parse() {
        assert_eq!("ros1".parse::<SchemaFormat>().unwrap(), SchemaFormat::Ros1);
        assert_eq!("ros2".parse::<SchemaFormat>().unwrap(), SchemaFormat::Ros2);
    }

    #[test]
    fn unknown_tag_rejected() {
        let err = "protobuf".parse::<SchemaFormat>().unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedFormat { format } if format == "protobuf"));
    }

    #[test]
    fn tags_are_case_sensitive() {
        assert!("ROS1".parse::<SchemaFormat>().is_err());
    }
}
