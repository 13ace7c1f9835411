//! Custom attribute values of host types.
//!
//! Custom attributes are kept in decoded form: the attribute class name, the constructor
//! arguments and named field/property values. The only attribute the model itself interprets
//! is `System.AttributeUsageAttribute`, whose `AllowMultiple` named argument decides whether an
//! attribute class may be applied more than once to the same target.
//!
//! # Examples
//!
//! ```rust
//! use dotweave::metadata::customattributes::{CustomAttributeArgument, CustomAttributeValue};
//!
//! let usage = CustomAttributeValue::new("System.AttributeUsageAttribute")
//!     .with_fixed(CustomAttributeArgument::I4(0x7fff))
//!     .with_property("AllowMultiple", CustomAttributeArgument::Bool(true));
//!
//! assert!(usage.is_allow_multiple_usage());
//! assert_eq!(
//!     usage.to_string(),
//!     "[System.AttributeUsageAttribute(32767, AllowMultiple = true)]"
//! );
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.3 - Custom Attributes

mod types;

pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_lookup() {
        let value = CustomAttributeValue::new("System.ObsoleteAttribute")
            .with_fixed(CustomAttributeArgument::String("use Other".into()))
            .with_property("IsError", CustomAttributeArgument::Bool(false));

        assert_eq!(
            value.named("IsError"),
            Some(&CustomAttributeArgument::Bool(false))
        );
        assert!(value.named("Missing").is_none());
        assert_eq!(value.named_args[0].arg_type, "bool");
        assert!(!value.is_allow_multiple_usage());
    }

    #[test]
    fn test_usage_without_allow_multiple() {
        let value = CustomAttributeValue::new(ATTRIBUTE_USAGE)
            .with_property(ALLOW_MULTIPLE, CustomAttributeArgument::Bool(false));
        assert!(!value.is_allow_multiple_usage());
    }

    #[test]
    fn test_argument_display() {
        let arg = CustomAttributeArgument::Array(vec![
            CustomAttributeArgument::I4(1),
            CustomAttributeArgument::Enum(
                "System.AttributeTargets".into(),
                Box::new(CustomAttributeArgument::I4(4)),
            ),
        ]);
        assert_eq!(arg.to_string(), "{1, (System.AttributeTargets)4}");
    }
}
