//! Special material types (paper, slides, ...) keyed by factory key.

use crate::models::{Contribution, Material};

/// Creates and removes the special material of one kind. The material's id is the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialFactory {
    pub key: &'static str,
    pub title: &'static str,
    /// Whether a creation form is shown before the material is created
    pub needs_creation_page: bool,
}

impl MaterialFactory {
    pub const fn new(key: &'static str, title: &'static str, needs_creation_page: bool) -> Self {
        MaterialFactory {
            key,
            title,
            needs_creation_page,
        }
    }

    /// Returns the id of the contribution's material of this kind, creating it if missing
    pub fn create(&self, contribution: &mut Contribution, description: &str) -> String {
        if let Some(existing) = contribution.material_of_kind(self.key) {
            return existing.id.clone();
        }
        let mut material = Material::new(self.key, self.title, Some(self.key));
        material.description = description.to_string();
        contribution.materials.push(material);
        contribution.notify_modification();
        self.key.to_string()
    }

    pub fn remove(&self, contribution: &mut Contribution) -> Option<Material> {
        let id = contribution.material_of_kind(self.key)?.id.clone();
        contribution.remove_material(&id)
    }
}

/// Lookup table from factory key to factory, built once at startup
#[derive(Debug, Clone)]
pub struct MaterialRegistry {
    factories: Vec<MaterialFactory>,
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        MaterialRegistry::new(vec![
            MaterialFactory::new("paper", "Paper", true),
            MaterialFactory::new("slides", "Slides", true),
            MaterialFactory::new("poster", "Poster", true),
            MaterialFactory::new("minutes", "Minutes", false),
            MaterialFactory::new("video", "Video", true),
        ])
    }
}

impl MaterialRegistry {
    pub fn new(factories: Vec<MaterialFactory>) -> Self {
        MaterialRegistry { factories }
    }

    pub fn get(&self, key: &str) -> Option<&MaterialFactory> {
        self.factories.iter().find(|f| f.key == key)
    }

    pub fn factories(&self) -> &[MaterialFactory] {
        &self.factories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_is_idempotent() {
        let registry = MaterialRegistry::default();
        let slides = registry.get("slides").unwrap();
        let mut contribution = Contribution::new("c1", "Talk");

        let first = slides.create(&mut contribution, "");
        let second = slides.create(&mut contribution, "");

        assert_eq!(first, "slides");
        assert_eq!(first, second);
        assert_eq!(contribution.materials.len(), 1);
        assert_eq!(contribution.materials[0].kind.as_deref(), Some("slides"));
    }

    #[test]
    fn test_remove_only_touches_own_kind() {
        let registry = MaterialRegistry::default();
        let mut contribution = Contribution::new("c1", "Talk");
        registry.get("paper").unwrap().create(&mut contribution, "");
        let extra = contribution.add_material("Extra", "");

        assert!(registry.get("slides").unwrap().remove(&mut contribution).is_none());
        assert!(registry.get("paper").unwrap().remove(&mut contribution).is_some());
        assert_eq!(contribution.materials.len(), 1);
        assert_eq!(contribution.materials[0].id, extra);
    }

    #[test]
    fn test_unknown_key() {
        assert!(MaterialRegistry::default().get("podcast").is_none());
        assert!(!MaterialRegistry::default().get("minutes").unwrap().needs_creation_page);
    }
}
