//! CustomAttribute-specific types and data structures.
//!
//! These records describe an already applied custom attribute in decoded form: the attribute
//! class, the constructor arguments and the named field/property arguments. Binary
//! serialization is left to the emission backend.

use std::{fmt, sync::Arc};

/// Full name of the attribute that controls how other attributes may be applied
pub const ATTRIBUTE_USAGE: &str = "System.AttributeUsageAttribute";
/// Named argument of [`ATTRIBUTE_USAGE`] that permits repeated application
pub const ALLOW_MULTIPLE: &str = "AllowMultiple";

/// A reference-counted pointer to a `CustomAttributeValue`
pub type CustomAttributeValueRc = Arc<CustomAttributeValue>;
/// A vector that holds a list of `CustomAttributeValue` instances for storage on parent objects
pub type CustomAttributeValueList = Vec<CustomAttributeValueRc>;

/// Represents a decoded custom attribute value with arguments and named arguments
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttributeValue {
    /// Full name of the attribute class, e.g. `System.ObsoleteAttribute`
    pub attribute_type: String,
    /// Fixed arguments from the constructor signature
    pub fixed_args: Vec<CustomAttributeArgument>,
    /// Named arguments (fields and properties)
    pub named_args: Vec<CustomAttributeNamedArgument>,
}

impl CustomAttributeValue {
    /// An attribute value without any arguments
    pub fn new(attribute_type: impl Into<String>) -> Self {
        CustomAttributeValue {
            attribute_type: attribute_type.into(),
            fixed_args: Vec::new(),
            named_args: Vec::new(),
        }
    }

    /// Append a constructor argument
    #[must_use]
    pub fn with_fixed(mut self, arg: CustomAttributeArgument) -> Self {
        self.fixed_args.push(arg);
        self
    }

    /// Append a named property argument
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: CustomAttributeArgument) -> Self {
        self.named_args.push(CustomAttributeNamedArgument {
            is_field: false,
            name: name.into(),
            arg_type: value.type_name().to_string(),
            value,
        });
        self
    }

    /// Look up a named argument by name
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&CustomAttributeArgument> {
        self.named_args
            .iter()
            .find(|arg| arg.name == name)
            .map(|arg| &arg.value)
    }

    /// This value is an `AttributeUsage` declaration that sets `AllowMultiple = true`
    #[must_use]
    pub fn is_allow_multiple_usage(&self) -> bool {
        self.attribute_type == ATTRIBUTE_USAGE
            && matches!(self.named(ALLOW_MULTIPLE), Some(CustomAttributeArgument::Bool(true)))
    }
}

impl fmt::Display for CustomAttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}(", self.attribute_type)?;
        let mut first = true;
        for arg in &self.fixed_args {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
            first = false;
        }
        for arg in &self.named_args {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{} = {}", arg.name, arg.value)?;
            first = false;
        }
        f.write_str(")]")
    }
}

/// Represents a single custom attribute argument value
#[derive(Debug, Clone, PartialEq)]
pub enum CustomAttributeArgument {
    /// Boolean value
    Bool(bool),
    /// Character value (16-bit Unicode)
    Char(char),
    /// Signed 8-bit integer
    I1(i8),
    /// Unsigned 8-bit integer
    U1(u8),
    /// Signed 16-bit integer
    I2(i16),
    /// Unsigned 16-bit integer
    U2(u16),
    /// Signed 32-bit integer
    I4(i32),
    /// Unsigned 32-bit integer
    U4(u32),
    /// Signed 64-bit integer
    I8(i64),
    /// Unsigned 64-bit integer
    U8(u64),
    /// 32-bit floating point
    R4(f32),
    /// 64-bit floating point
    R8(f64),
    /// UTF-8 string
    String(String),
    /// Type reference (as string)
    Type(String),
    /// Array of arguments
    Array(Vec<CustomAttributeArgument>),
    /// Enum value (enum type name + underlying value)
    Enum(String, Box<CustomAttributeArgument>),
}

impl CustomAttributeArgument {
    /// ILAsm-style name of the argument type
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            CustomAttributeArgument::Bool(_) => "bool",
            CustomAttributeArgument::Char(_) => "char",
            CustomAttributeArgument::I1(_) => "int8",
            CustomAttributeArgument::U1(_) => "uint8",
            CustomAttributeArgument::I2(_) => "int16",
            CustomAttributeArgument::U2(_) => "uint16",
            CustomAttributeArgument::I4(_) => "int32",
            CustomAttributeArgument::U4(_) => "uint32",
            CustomAttributeArgument::I8(_) => "int64",
            CustomAttributeArgument::U8(_) => "uint64",
            CustomAttributeArgument::R4(_) => "float32",
            CustomAttributeArgument::R8(_) => "float64",
            CustomAttributeArgument::String(_) => "string",
            CustomAttributeArgument::Type(_) => "type",
            CustomAttributeArgument::Array(_) => "array",
            CustomAttributeArgument::Enum(name, _) => name,
        }
    }
}

impl fmt::Display for CustomAttributeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomAttributeArgument::Bool(v) => write!(f, "{}", v),
            CustomAttributeArgument::Char(v) => write!(f, "'{}'", v),
            CustomAttributeArgument::I1(v) => write!(f, "{}", v),
            CustomAttributeArgument::U1(v) => write!(f, "{}", v),
            CustomAttributeArgument::I2(v) => write!(f, "{}", v),
            CustomAttributeArgument::U2(v) => write!(f, "{}", v),
            CustomAttributeArgument::I4(v) => write!(f, "{}", v),
            CustomAttributeArgument::U4(v) => write!(f, "{}", v),
            CustomAttributeArgument::I8(v) => write!(f, "{}", v),
            CustomAttributeArgument::U8(v) => write!(f, "{}", v),
            CustomAttributeArgument::R4(v) => write!(f, "{}", v),
            CustomAttributeArgument::R8(v) => write!(f, "{}", v),
            CustomAttributeArgument::String(v) => write!(f, "\"{}\"", v),
            CustomAttributeArgument::Type(v) => write!(f, "typeof({})", v),
            CustomAttributeArgument::Array(items) => {
                f.write_str("{")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("}")
            }
            CustomAttributeArgument::Enum(name, value) => write!(f, "({}){}", name, value),
        }
    }
}

/// Represents a named argument (field or property) in a custom attribute
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAttributeNamedArgument {
    /// Whether this is a field (true) or property (false)
    pub is_field: bool,
    /// Name of the field or property
    pub name: String,
    /// Type of the argument
    pub arg_type: String,
    /// Value of the argument
    pub value: CustomAttributeArgument,
}
