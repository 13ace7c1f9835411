use std::fmt;

use crate::metadata::token::Token;

/// Represents a type as it appears in signatures
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TypeSignature {
    #[default]
    /// Not defined
    Unknown,
    /// void
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// signed integer, sized to executing platform
    I,
    /// unsigned integer, sized to executing platform
    U,
    /// System.String
    String,
    /// System.Object
    Object,
    /// CIL Class, by token of the referenced type
    Class(Token),
    /// CIL value-type, by token of the referenced type
    ValueType(Token),
    /// Single dimension array
    SzArray(Box<TypeSignature>),
    /// A pointer to a type
    Ptr(Box<TypeSignature>),
    /// Type by reference
    ByRef(Box<TypeSignature>),
    /// Generic type parameter, by position
    GenericParamType(u32),
    /// Generic method parameter, by position
    GenericParamMethod(u32),
}

impl TypeSignature {
    /// Check if this signature is `void`
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeSignature::Void)
    }

    /// Check if this signature is a by-reference type
    #[must_use]
    pub fn is_by_ref(&self) -> bool {
        matches!(self, TypeSignature::ByRef(_))
    }

    /// Build a single dimension array of this type
    #[must_use]
    pub fn sz_array(self) -> Self {
        TypeSignature::SzArray(Box::new(self))
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Unknown => f.write_str("?"),
            TypeSignature::Void => f.write_str("void"),
            TypeSignature::Boolean => f.write_str("bool"),
            TypeSignature::Char => f.write_str("char"),
            TypeSignature::I1 => f.write_str("int8"),
            TypeSignature::U1 => f.write_str("uint8"),
            TypeSignature::I2 => f.write_str("int16"),
            TypeSignature::U2 => f.write_str("uint16"),
            TypeSignature::I4 => f.write_str("int32"),
            TypeSignature::U4 => f.write_str("uint32"),
            TypeSignature::I8 => f.write_str("int64"),
            TypeSignature::U8 => f.write_str("uint64"),
            TypeSignature::R4 => f.write_str("float32"),
            TypeSignature::R8 => f.write_str("float64"),
            TypeSignature::I => f.write_str("native int"),
            TypeSignature::U => f.write_str("native uint"),
            TypeSignature::String => f.write_str("string"),
            TypeSignature::Object => f.write_str("object"),
            TypeSignature::Class(token) => write!(f, "class[{}]", token),
            TypeSignature::ValueType(token) => write!(f, "valuetype[{}]", token),
            TypeSignature::SzArray(base) => write!(f, "{}[]", base),
            TypeSignature::Ptr(base) => write!(f, "{}*", base),
            TypeSignature::ByRef(base) => write!(f, "{}&", base),
            TypeSignature::GenericParamType(index) => write!(f, "!{}", index),
            TypeSignature::GenericParamMethod(index) => write!(f, "!!{}", index),
        }
    }
}

/// Parameter or return value of a method signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureParameter {
    /// Parameter is passed by reference
    pub by_ref: bool,
    /// The type of the parameter
    pub base: TypeSignature,
}

impl SignatureParameter {
    /// Create a by-value parameter of the given type
    #[must_use]
    pub fn new(base: TypeSignature) -> Self {
        SignatureParameter {
            by_ref: false,
            base,
        }
    }

    /// Create a by-reference parameter of the given type
    #[must_use]
    pub fn by_ref(base: TypeSignature) -> Self {
        SignatureParameter {
            by_ref: true,
            base,
        }
    }
}

impl From<TypeSignature> for SignatureParameter {
    fn from(base: TypeSignature) -> Self {
        SignatureParameter::new(base)
    }
}

impl fmt::Display for SignatureParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.by_ref {
            write!(f, "{}&", self.base)
        } else {
            write!(f, "{}", self.base)
        }
    }
}

/// Represents a method signature (II.23.2.1)
///
/// `Display` renders only the parameter list, e.g. `(int32, string)`, so that a member name
/// followed by its signature reads like a call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureMethod {
    /// Used to encode the keyword instance in the calling convention, see §II.15.3
    pub has_this: bool,
    /// The return type of this `Method`
    pub return_type: SignatureParameter,
    /// The parameters of this `Method`
    pub params: Vec<SignatureParameter>,
}

impl SignatureMethod {
    /// Create an instance method signature
    #[must_use]
    pub fn instance(return_type: TypeSignature, params: Vec<TypeSignature>) -> Self {
        SignatureMethod {
            has_this: true,
            return_type: SignatureParameter::new(return_type),
            params: params.into_iter().map(SignatureParameter::new).collect(),
        }
    }

    /// Create a static method signature
    #[must_use]
    pub fn new_static(return_type: TypeSignature, params: Vec<TypeSignature>) -> Self {
        SignatureMethod {
            has_this: false,
            ..Self::instance(return_type, params)
        }
    }

    /// Exact structural equality of return type and parameters.
    ///
    /// The calling convention is not compared; static and instance methods with the same
    /// shape collide just like they do in metadata.
    #[must_use]
    pub fn matches(&self, other: &SignatureMethod) -> bool {
        self.return_type == other.return_type && self.params == other.params
    }

    /// Check if the parameter types equal the given list exactly
    #[must_use]
    pub fn params_match(&self, params: &[SignatureParameter]) -> bool {
        self.params == params
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")
    }
}

/// Field signature (II.23.2.4)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureField {
    /// The type of this field
    pub base: TypeSignature,
}

impl SignatureField {
    /// Create a field signature of the given type
    #[must_use]
    pub fn new(base: TypeSignature) -> Self {
        SignatureField { base }
    }
}

impl fmt::Display for SignatureField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " : {}", self.base)
    }
}

/// Property signature (II.23.2.5)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureProperty {
    /// Indicates the passing of a 'this' pointer
    pub has_this: bool,
    /// The type of this property
    pub base: TypeSignature,
    /// The index parameters of this property
    pub params: Vec<SignatureParameter>,
}

impl SignatureProperty {
    /// Structural equality of property type and index parameters
    #[must_use]
    pub fn matches(&self, other: &SignatureProperty) -> bool {
        self.base == other.base && self.params == other.params
    }
}

impl fmt::Display for SignatureProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.params.is_empty() {
            f.write_str("[")?;
            for (index, param) in self.params.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", param)?;
            }
            f.write_str("]")?;
        }
        write!(f, " : {}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_signature_display() {
        assert_eq!(TypeSignature::I4.to_string(), "int32");
        assert_eq!(TypeSignature::String.sz_array().to_string(), "string[]");
        assert_eq!(
            TypeSignature::ByRef(Box::new(TypeSignature::Object)).to_string(),
            "object&"
        );
        assert_eq!(
            TypeSignature::Class(Token::new(0x02000004)).to_string(),
            "class[0x02000004]"
        );
    }

    #[test]
    fn test_method_signature_matches_ignores_calling_convention() {
        let instance = SignatureMethod::instance(TypeSignature::Void, vec![TypeSignature::I4]);
        let stat = SignatureMethod::new_static(TypeSignature::Void, vec![TypeSignature::I4]);
        assert!(instance.matches(&stat));
        assert_ne!(instance, stat);
    }

    #[test]
    fn test_method_signature_return_type_matters() {
        let a = SignatureMethod::instance(TypeSignature::Void, vec![]);
        let b = SignatureMethod::instance(TypeSignature::I4, vec![]);
        assert!(!a.matches(&b));
    }

    #[test]
    fn test_by_ref_parameter_differs() {
        let by_val = SignatureMethod::instance(TypeSignature::Void, vec![TypeSignature::I4]);
        let mut by_ref = by_val.clone();
        by_ref.params[0] = SignatureParameter::by_ref(TypeSignature::I4);
        assert!(!by_val.matches(&by_ref));
        assert_eq!(by_ref.to_string(), "(int32&)");
    }

    #[test]
    fn test_property_signature_display() {
        let sig = SignatureProperty {
            has_this: true,
            base: TypeSignature::String,
            params: vec![SignatureParameter::new(TypeSignature::I4)],
        };
        assert_eq!(sig.to_string(), "[int32] : string");
    }
}
