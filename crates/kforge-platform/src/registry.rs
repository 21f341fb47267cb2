//! Platform registry: name → platform, in registration order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};
use crate::k210::{K210Settings, K210};
use crate::platform::Platform;
use crate::qemu::{Qemu, QemuSettings};

/// Settings for the builtin backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSettings {
    #[serde(default)]
    pub qemu: QemuSettings,
    #[serde(default)]
    pub k210: K210Settings,
}

/// Registered platforms. Populated at startup, read-only afterwards.
#[derive(Default)]
pub struct PlatformRegistry {
    platforms: Vec<Box<dyn Platform>>,
}

impl PlatformRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The builtin backends: `qemu` first (the default), then `k210`.
    pub fn builtin(settings: &PlatformSettings) -> Self {
        Self {
            platforms: vec![
                Box::new(Qemu::new(settings.qemu.clone())),
                Box::new(K210::new(settings.k210.clone())),
            ],
        }
    }

    /// Register a platform, replacing any platform with the same name in place.
    pub fn register(&mut self, platform: Box<dyn Platform>) -> Result<()> {
        if platform.name().is_empty() {
            return Err(PlatformError::EmptyName);
        }
        match self.platforms.iter_mut().find(|p| p.name() == platform.name()) {
            Some(existing) => *existing = platform,
            None => self.platforms.push(platform),
        }
        Ok(())
    }

    /// Look up a platform by name.
    pub fn lookup(&self, name: &str) -> Result<&dyn Platform> {
        self.platforms
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
            .ok_or_else(|| PlatformError::UnknownPlatform {
                name: name.to_string(),
                available: self.names().into_iter().map(String::from).collect(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.platforms.iter().any(|p| p.name() == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.platforms.iter().map(|p| p.name()).collect()
    }

    /// Registered platforms in registration order.
    pub fn list(&self) -> impl Iterator<Item = &dyn Platform> {
        self.platforms.iter().map(|p| p.as_ref())
    }

    /// The first registered platform.
    pub fn default_platform(&self) -> Option<&dyn Platform> {
        self.platforms.first().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl fmt::Debug for PlatformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformRegistry")
            .field("platforms", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Named(&'static str, &'static str);

    impl Platform for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            self.1
        }
    }

    #[test]
    fn builtin_order_and_default() {
        let registry = PlatformRegistry::builtin(&PlatformSettings::default());
        assert_eq!(registry.names(), ["qemu", "k210"]);
        assert_eq!(registry.default_platform().unwrap().name(), "qemu");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_lookup_is_an_error() {
        let registry = PlatformRegistry::builtin(&PlatformSettings::default());
        match registry.lookup("nope") {
            Err(PlatformError::UnknownPlatform { name, available }) => {
                assert_eq!(name, "nope");
                assert_eq!(available, ["qemu", "k210"]);
            }
            other => panic!("expected UnknownPlatform, got {other:?}"),
        }
    }

    #[test]
    fn register_overwrites_in_place() {
        let mut registry = PlatformRegistry::new();
        assert!(registry.is_empty());
        registry.register(Box::new(Named("a", "first"))).unwrap();
        registry.register(Box::new(Named("b", ""))).unwrap();
        registry.register(Box::new(Named("a", "second"))).unwrap();

        assert_eq!(registry.names(), ["a", "b"]);
        assert_eq!(registry.lookup("a").unwrap().description(), "second");
        assert!(registry.contains("b"));
        assert_eq!(registry.list().count(), 2);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut registry = PlatformRegistry::new();
        assert!(matches!(
            registry.register(Box::new(Named("", ""))),
            Err(PlatformError::EmptyName)
        ));
        assert!(registry.default_platform().is_none());
    }
}
