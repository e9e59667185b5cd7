use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// The wire/storage spelling is the literal, used by both serde and SQLite.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ComplaintStatus {
    New => "NEW",
    MaskingFailed => "MASKING_FAILED",
    Analyzed => "ANALYZED",
    Resolved => "RESOLVED",
});

str_enum!(RagStatus {
    Ok => "OK",
    Unavailable => "UNAVAILABLE",
    Error => "ERROR",
});

str_enum!(LlmStatus {
    Ok => "OK",
    TemplateFallback => "TEMPLATE_FALLBACK",
    Error => "ERROR",
});
