//! Configuration of the deferred type model
//!
//! This module provides the knobs controlling which members of an existing type are visible to
//! a [`crate::model::TypeModel`], how deep hierarchy walks may go, and which collaborators the
//! model consults for overload resolution and original interface mappings.

use std::sync::Arc;

use crate::{
    metadata::{
        members::{Event, Field, FieldAttributes, Property},
        method::{Method, MethodAccessFlags},
        typesystem::{HostInterfaceMapProvider, InterfaceMapProvider},
    },
    model::{ExactSignatureResolver, OverloadResolver},
};

/// Configuration for snapshot capture and hierarchy walks
///
/// Members that are public, protected or protected-internal are always visible to a derived
/// type and are always captured. Private and internal members are captured only on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelConfig {
    /// Capture private (and compiler-controlled) members of the existing type
    pub include_private: bool,

    /// Capture internal and private-protected members of the existing type
    pub include_assembly: bool,

    /// Maximum number of levels walked up a type hierarchy (default: 64)
    pub max_hierarchy_depth: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            include_private: false,
            include_assembly: true,
            max_hierarchy_depth: 64,
        }
    }
}

impl ModelConfig {
    /// Capture only members visible from another assembly
    #[must_use]
    pub fn public_only() -> Self {
        Self {
            include_private: false,
            include_assembly: false,
            max_hierarchy_depth: 64,
        }
    }

    /// Capture every member, private ones included
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            include_private: true,
            include_assembly: true,
            max_hierarchy_depth: 256,
        }
    }
}

/// Policy deciding which members of an existing type are captured by a snapshot
pub trait MemberFilter: Send + Sync {
    /// Capture this method or constructor
    fn include_method(&self, method: &Method) -> bool;

    /// Capture this field
    fn include_field(&self, field: &Field) -> bool;

    /// Capture this property; by default if any accessor is captured
    fn include_property(&self, property: &Property) -> bool {
        property
            .accessors()
            .any(|accessor| self.include_method(accessor))
    }

    /// Capture this event; by default if its `add` accessor is captured
    fn include_event(&self, event: &Event) -> bool {
        self.include_method(&event.adder)
    }
}

/// The default [`MemberFilter`], driven by the visibility switches of a [`ModelConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityMemberFilter {
    config: ModelConfig,
}

impl VisibilityMemberFilter {
    /// Create a filter from the given configuration
    #[must_use]
    pub fn new(config: ModelConfig) -> Self {
        VisibilityMemberFilter { config }
    }

    fn include_access(&self, private: bool, assembly: bool) -> bool {
        if private {
            self.config.include_private
        } else if assembly {
            self.config.include_assembly
        } else {
            true
        }
    }
}

impl MemberFilter for VisibilityMemberFilter {
    fn include_method(&self, method: &Method) -> bool {
        let access = method.flags_access;
        self.include_access(
            access.is_private(),
            access == MethodAccessFlags::ASSEM || access == MethodAccessFlags::FAM_AND_ASSEM,
        )
    }

    fn include_field(&self, field: &Field) -> bool {
        let access = field.access();
        self.include_access(
            field.is_private(),
            access == FieldAttributes::ASSEMBLY || access == FieldAttributes::FAM_AND_ASSEM,
        )
    }
}

/// Configuration plus the collaborators a [`crate::model::TypeModel`] consults
///
/// # Examples
///
/// ```rust
/// use dotweave::{ModelConfig, ModelOptions};
///
/// let options = ModelOptions::default().with_config(ModelConfig::public_only());
/// assert!(!options.config.include_assembly);
/// ```
#[derive(Clone)]
pub struct ModelOptions {
    /// Capture and hierarchy settings
    pub config: ModelConfig,
    /// Which existing members are captured
    pub member_filter: Arc<dyn MemberFilter>,
    /// Final disambiguation of queries with an explicit parameter list
    pub overload_resolver: Arc<dyn OverloadResolver>,
    /// Original interface mappings of the existing type
    pub interface_maps: Arc<dyn InterfaceMapProvider>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        let config = ModelConfig::default();
        Self {
            config,
            member_filter: Arc::new(VisibilityMemberFilter::new(config)),
            overload_resolver: Arc::new(ExactSignatureResolver),
            interface_maps: Arc::new(HostInterfaceMapProvider::new(config.max_hierarchy_depth)),
        }
    }
}

impl ModelOptions {
    /// Replace the configuration; the built-in member filter and interface-map provider are
    /// rebuilt from it
    #[must_use]
    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self.member_filter = Arc::new(VisibilityMemberFilter::new(config));
        self.interface_maps = Arc::new(HostInterfaceMapProvider::new(config.max_hierarchy_depth));
        self
    }

    /// Replace the member filter
    #[must_use]
    pub fn with_member_filter(mut self, filter: Arc<dyn MemberFilter>) -> Self {
        self.member_filter = filter;
        self
    }

    /// Replace the overload resolver
    #[must_use]
    pub fn with_overload_resolver(mut self, resolver: Arc<dyn OverloadResolver>) -> Self {
        self.overload_resolver = resolver;
        self
    }

    /// Replace the interface-map provider
    #[must_use]
    pub fn with_interface_maps(mut self, provider: Arc<dyn InterfaceMapProvider>) -> Self {
        self.interface_maps = provider;
        self
    }
}

impl std::fmt::Debug for ModelOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelOptions")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
