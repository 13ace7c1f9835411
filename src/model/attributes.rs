//! Staged custom attribute declarations.
//!
//! Attributes added through a [`crate::model::TypeModel`] are kept as
//! [`CustomAttributeDeclaration`]s until emission. Whether an attribute type may be applied
//! more than once is decided by the `AttributeUsage` of the attribute type or, failing that,
//! of its nearest ancestor declaring one.

use crate::{
    metadata::{
        customattributes::{
            CustomAttributeArgument, CustomAttributeNamedArgument, CustomAttributeValue,
            CustomAttributeValueList, ATTRIBUTE_USAGE,
        },
        typesystem::CilTypeRc,
    },
    model::{ConstructorId, EventId, FieldId, MethodId, PropertyId},
    Error::InvalidArgument,
    Result,
};

/// A custom attribute waiting to be emitted
#[derive(Debug, Clone)]
pub struct CustomAttributeDeclaration {
    /// The attribute class
    pub attribute_type: CilTypeRc,
    /// Constructor arguments
    pub constructor_args: Vec<CustomAttributeArgument>,
    /// Named field and property arguments
    pub named_args: Vec<CustomAttributeNamedArgument>,
}

impl CustomAttributeDeclaration {
    /// Declare an attribute of the given class without arguments
    #[must_use]
    pub fn new(attribute_type: &CilTypeRc) -> Self {
        CustomAttributeDeclaration {
            attribute_type: attribute_type.clone(),
            constructor_args: Vec::new(),
            named_args: Vec::new(),
        }
    }

    /// Append a constructor argument
    #[must_use]
    pub fn with_arg(mut self, arg: CustomAttributeArgument) -> Self {
        self.constructor_args.push(arg);
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

    /// The attribute type may be applied several times to the same target
    #[must_use]
    pub fn allows_multiple(&self) -> bool {
        std::iter::once(self.attribute_type.clone())
            .chain(self.attribute_type.ancestors())
            .find_map(|level| {
                level
                    .custom_attributes
                    .iter()
                    .find(|value| value.attribute_type == ATTRIBUTE_USAGE)
                    .map(|usage| usage.is_allow_multiple_usage())
            })
            .unwrap_or(false)
    }

    /// The declaration as a decoded attribute value
    #[must_use]
    pub fn to_value(&self) -> CustomAttributeValue {
        CustomAttributeValue {
            attribute_type: self.attribute_type.fullname(),
            fixed_args: self.constructor_args.clone(),
            named_args: self.named_args.clone(),
        }
    }
}

/// The member (or the type itself) a custom attribute is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeTarget {
    /// The modeled type
    Type,
    /// A field
    Field(FieldId),
    /// A constructor
    Constructor(ConstructorId),
    /// A method
    Method(MethodId),
    /// A property
    Property(PropertyId),
    /// An event
    Event(EventId),
}

/// The staged attribute declarations of one target
#[derive(Debug, Clone, Default)]
pub struct AttributeContainer {
    declarations: Vec<CustomAttributeDeclaration>,
}

impl AttributeContainer {
    /// Stage `declaration`; `existing` are the attributes the target already carries
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidArgument`] if the attribute type is already applied and
    /// does not allow multiple usages.
    pub(crate) fn add(
        &mut self,
        declaration: CustomAttributeDeclaration,
        existing: &CustomAttributeValueList,
    ) -> Result<()> {
        if !declaration.allows_multiple() {
            let name = declaration.attribute_type.fullname();
            let duplicate = self
                .declarations
                .iter()
                .any(|staged| staged.attribute_type.token == declaration.attribute_type.token)
                || existing.iter().any(|value| value.attribute_type == name);
            if duplicate {
                return Err(InvalidArgument(format!(
                    "Attribute '{}' does not allow multiple usages",
                    name
                )));
            }
        }
        self.declarations.push(declaration);
        Ok(())
    }

    /// Iterate over the staged declarations, in order of addition
    pub fn iter(&self) -> impl Iterator<Item = &CustomAttributeDeclaration> {
        self.declarations.iter()
    }

    /// Number of staged declarations
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// No declaration was staged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
