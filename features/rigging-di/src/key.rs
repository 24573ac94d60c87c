use std::fmt;

use crate::types::TypeInfo;

/// The shape of provider owning a [Key]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProviderKind {
    Constructor,
    Interface,
    Group,
    Embed,
}

impl ProviderKind {
    /// Order in which kinds are tried when a parameter is matched to a provider
    pub const LOOKUP_SEQUENCE: [ProviderKind; 4] = [
        ProviderKind::Constructor,
        ProviderKind::Interface,
        ProviderKind::Group,
        ProviderKind::Embed,
    ];
}

/// Identity of a bound value
///
/// Keys differing only by kind are distinct: an interface alias and its
/// backing constructor coexist in the same graph.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Key {
    pub info: TypeInfo,
    pub name: Option<String>,
    pub kind: ProviderKind,
}

impl Key {
    pub fn new(info: TypeInfo, name: Option<String>, kind: ProviderKind) -> Self {
        Key { info, name, kind }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Renders `name:type`, or just `type` when unnamed
///
/// The colon only separates a present name, so unnamed Keys read like plain
/// type names in errors and in the container's `Debug` output.
impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}:{}", self.info),
            None => write!(f, "{}", self.info),
        }
    }
}

/// One input a provider needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// The required Type
    pub info: TypeInfo,
    /// Name of the required Key, if any
    pub name: Option<String>,
    /// If it is optional or required
    pub optional: bool,
    /// If it stands for a parameter bag whose fields are resolved one by one
    pub embed: bool,
}

impl Parameter {
    pub fn required(info: TypeInfo) -> Self {
        Parameter {
            info,
            name: None,
            optional: false,
            embed: false,
        }
    }

    pub fn optional(info: TypeInfo) -> Self {
        Parameter {
            optional: true,
            ..Parameter::required(info)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The Key this parameter points at for a given provider kind
    pub fn key(&self, kind: ProviderKind) -> Key {
        Key::new(self.info, self.name.clone(), kind)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}:{}", self.info),
            None => write!(f, "{}", self.info),
        }
    }
}

/// Ordered dependencies of a provider
pub type ParameterList = Vec<Parameter>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_name_then_type() {
        let named = Key::new(TypeInfo::of::<i32>(), Some("a".into()), ProviderKind::Constructor);
        let unnamed = Key::new(TypeInfo::of::<i32>(), None, ProviderKind::Constructor);

        assert_eq!(named.to_string(), "a:i32");
        assert_eq!(unnamed.to_string(), "i32");
    }

    #[test]
    fn kind_distinguishes_keys() {
        let ctor = Key::new(TypeInfo::of::<String>(), None, ProviderKind::Constructor);
        let alias = Key::new(TypeInfo::of::<String>(), None, ProviderKind::Interface);
        assert_ne!(ctor, alias);
        assert_eq!(ctor, Parameter::required(TypeInfo::of::<String>()).key(ProviderKind::Constructor));
    }
}
