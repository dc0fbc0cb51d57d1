//! Reflection-like property access over caller-defined object types.

use crate::value::Value;

/// A dynamic object exposing properties by name at runtime.
///
/// This is the seam for script-object style targets: the engine never sees
/// the concrete type, only named property lookups. Lookups are exact-case;
/// the adapter layer performs the case-insensitive fallback scan using
/// [`DynamicObject::property_names`].
pub trait DynamicObject: std::fmt::Debug + Send + Sync {
    /// Look up a property by exact name.
    fn property(&self, name: &str) -> Option<PropertyView<'_>>;

    /// The names of all properties, used for case-insensitive fallback and
    /// wildcard enumeration.
    fn property_names(&self) -> Vec<&str>;
}

/// The value of one dynamic property: a nested object, a list of objects,
/// or a plain value tree.
#[derive(Debug, Clone)]
pub enum PropertyView<'a> {
    Object(&'a dyn DynamicObject),
    Objects(Vec<&'a dyn DynamicObject>),
    Value(&'a Value),
}

/// Look up a property with the resolver-wide case-sensitivity flag applied.
pub fn lookup<'a>(
    object: &'a dyn DynamicObject,
    name: &str,
    case_sensitive: bool,
) -> Option<PropertyView<'a>> {
    if let Some(view) = object.property(name) {
        return Some(view);
    }
    if case_sensitive {
        return None;
    }
    let actual = object
        .property_names()
        .into_iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(name))?;
    object.property(actual)
}
