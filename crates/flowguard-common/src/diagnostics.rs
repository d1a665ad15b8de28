//! Message keys for validation failures.
//!
//! The engine never renders prose while it validates. Every failure is stored
//! as a `MessageKey` next to the path and the expected descriptor; turning a
//! key into text is left to whoever consumes the session. Each key still
//! carries a stable numeric code, a symbolic name and a default English
//! template so that the assertion boundary can produce a readable error.
//!
//! Templates use `{0}` for the rendered expected type.

use serde::Serialize;

/// Identifies why a value failed to satisfy a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKey {
    ExpectVoid,
    ExpectNull,
    ExpectBoolean,
    ExpectNumber,
    ExpectString,
    ExpectSymbol,
    ExpectFunction,
    ExpectArray,
    ExpectTuple,
    ExpectObject,
    ExpectEmpty,
    /// Value differs from a literal descriptor.
    ExpectExactValue,
    /// Value is not an instance of the expected class.
    ExpectInstanceOf,
    /// Value is not the captured `this` instance or constructor.
    ExpectThis,
    /// A function value carries a signature that is not compatible.
    IncompatibleSignature,
    /// No member of a union accepted the value.
    NoUnionMatch,
    /// A required property is absent.
    MissingProperty,
    /// An exact object carries a property it does not declare.
    UnknownProperty,
    /// More arguments were supplied than the signature declares.
    UnexpectedArgument,
}

impl MessageKey {
    /// Stable numeric code for this key.
    pub const fn code(self) -> u32 {
        match self {
            Self::ExpectVoid => 1001,
            Self::ExpectNull => 1002,
            Self::ExpectBoolean => 1003,
            Self::ExpectNumber => 1004,
            Self::ExpectString => 1005,
            Self::ExpectSymbol => 1006,
            Self::ExpectFunction => 1007,
            Self::ExpectArray => 1008,
            Self::ExpectTuple => 1009,
            Self::ExpectObject => 1010,
            Self::ExpectEmpty => 1011,
            Self::ExpectExactValue => 1012,
            Self::ExpectInstanceOf => 1013,
            Self::ExpectThis => 1014,
            Self::IncompatibleSignature => 1015,
            Self::NoUnionMatch => 1016,
            Self::MissingProperty => 1017,
            Self::UnknownProperty => 1018,
            Self::UnexpectedArgument => 1019,
        }
    }

    /// Symbolic name, stable across releases.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ExpectVoid => "ERR_EXPECT_VOID",
            Self::ExpectNull => "ERR_EXPECT_NULL",
            Self::ExpectBoolean => "ERR_EXPECT_BOOLEAN",
            Self::ExpectNumber => "ERR_EXPECT_NUMBER",
            Self::ExpectString => "ERR_EXPECT_STRING",
            Self::ExpectSymbol => "ERR_EXPECT_SYMBOL",
            Self::ExpectFunction => "ERR_EXPECT_FUNCTION",
            Self::ExpectArray => "ERR_EXPECT_ARRAY",
            Self::ExpectTuple => "ERR_EXPECT_TUPLE",
            Self::ExpectObject => "ERR_EXPECT_OBJECT",
            Self::ExpectEmpty => "ERR_EXPECT_EMPTY",
            Self::ExpectExactValue => "ERR_EXPECT_EXACT_VALUE",
            Self::ExpectInstanceOf => "ERR_EXPECT_INSTANCEOF",
            Self::ExpectThis => "ERR_EXPECT_THIS",
            Self::IncompatibleSignature => "ERR_INCOMPATIBLE_SIGNATURE",
            Self::NoUnionMatch => "ERR_NO_UNION",
            Self::MissingProperty => "ERR_MISSING_PROPERTY",
            Self::UnknownProperty => "ERR_UNKNOWN_PROPERTY",
            Self::UnexpectedArgument => "ERR_UNEXPECTED_ARGUMENT",
        }
    }

    /// Default English template. `{0}` is the expected type.
    pub const fn template(self) -> &'static str {
        match self {
            Self::ExpectVoid => "must be undefined",
            Self::ExpectNull => "must be null",
            Self::ExpectBoolean => "must be true or false",
            Self::ExpectNumber => "must be a number",
            Self::ExpectString => "must be a string",
            Self::ExpectSymbol => "must be a symbol",
            Self::ExpectFunction => "must be a function",
            Self::ExpectArray => "must be an array",
            Self::ExpectTuple => "must be a tuple of type {0}",
            Self::ExpectObject => "must be an object",
            Self::ExpectEmpty => "must not be present",
            Self::ExpectExactValue => "must be exactly {0}",
            Self::ExpectInstanceOf => "must be an instance of {0}",
            Self::ExpectThis => "must be exactly {0}",
            Self::IncompatibleSignature => "must be a function compatible with {0}",
            Self::NoUnionMatch => "must be one of: {0}",
            Self::MissingProperty => "is missing",
            Self::UnknownProperty => "is not a known property of {0}",
            Self::UnexpectedArgument => "is not an expected argument",
        }
    }
}

/// Format a message template by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_substitutes_placeholders() {
        let text = format_message(MessageKey::ExpectExactValue.template(), &["\"hi\""]);
        assert_eq!(text, "must be exactly \"hi\"");
    }

    #[test]
    fn test_templates_without_placeholders_are_unchanged() {
        let text = format_message(MessageKey::ExpectString.template(), &["string"]);
        assert_eq!(text, "must be a string");
    }

    #[test]
    fn test_key_serializes_as_variant_name() {
        let json = serde_json::to_string(&MessageKey::NoUnionMatch).expect("serialize");
        assert_eq!(json, "\"NoUnionMatch\"");
        assert_eq!(MessageKey::NoUnionMatch.name(), "ERR_NO_UNION");
    }
}
