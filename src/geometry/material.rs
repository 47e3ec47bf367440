use std::collections::HashMap;

/// Index of a material registered with a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// Surface material of a body.
///
/// Friction and restitution are optional; when both materials of a pair set
/// a value and no contact material is registered for the pair, the values are
/// multiplied.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub friction: Option<f32>,
    pub restitution: Option<f32>,
}

impl Material {
    /// Creates a material that defers to contact materials
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            friction: None,
            restitution: None,
        }
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction.clamp(0.0, 1.0));
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = Some(restitution.clamp(0.0, 1.0));
        self
    }
}

/// Contact parameters used when two materials touch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactMaterial {
    /// Coulomb friction coefficient
    pub friction: f32,
    /// Restitution (bounciness)
    pub restitution: f32,
    /// Stiffness of the normal contact constraint
    pub contact_equation_stiffness: f32,
    /// Number of steps over which normal penetration is relaxed
    pub contact_equation_relaxation: f32,
    /// Stiffness of the friction constraint
    pub friction_equation_stiffness: f32,
    /// Number of steps over which friction is relaxed
    pub friction_equation_relaxation: f32,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self {
            friction: 0.3,
            restitution: 0.0,
            contact_equation_stiffness: 1e7,
            contact_equation_relaxation: 3.0,
            friction_equation_stiffness: 1e7,
            friction_equation_relaxation: 3.0,
        }
    }
}

impl ContactMaterial {
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction,
            restitution,
            ..Self::default()
        }
    }
}

/// Unordered material pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MaterialPair(MaterialId, MaterialId);

impl MaterialPair {
    fn new(a: MaterialId, b: MaterialId) -> Self {
        if a.0 <= b.0 {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }
}

/// Registry of materials and their pairwise contact parameters
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    materials: Vec<Material>,
    contacts: HashMap<MaterialPair, ContactMaterial>,
    default_contact: ContactMaterial,
}

impl MaterialTable {
    pub fn add(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        id
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    pub fn find(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|m| m.name == name)
            .map(|i| MaterialId(i as u32))
    }

    /// Registers contact parameters for a pair (order does not matter)
    pub fn add_contact(&mut self, a: MaterialId, b: MaterialId, contact: ContactMaterial) {
        self.contacts.insert(MaterialPair::new(a, b), contact);
    }

    pub fn default_contact(&self) -> &ContactMaterial {
        &self.default_contact
    }

    pub fn default_contact_mut(&mut self) -> &mut ContactMaterial {
        &mut self.default_contact
    }

    /// Resolves the contact parameters for two (optional) body materials
    pub fn resolve(&self, a: Option<MaterialId>, b: Option<MaterialId>) -> ContactMaterial {
        let (Some(a), Some(b)) = (a, b) else {
            return self.default_contact;
        };

        if let Some(contact) = self.contacts.get(&MaterialPair::new(a, b)) {
            return *contact;
        }

        let mut contact = self.default_contact;
        if let (Some(ma), Some(mb)) = (self.get(a), self.get(b)) {
            if let (Some(fa), Some(fb)) = (ma.friction, mb.friction) {
                contact.friction = fa * fb;
            }
            if let (Some(ra), Some(rb)) = (ma.restitution, mb.restitution) {
                contact.restitution = ra * rb;
            }
        }
        contact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_lookup_is_symmetric() {
        let mut table = MaterialTable::default();
        let concrete = table.add(Material::new("concrete"));
        let plastic = table.add(Material::new("plastic"));
        table.add_contact(concrete, plastic, ContactMaterial::new(0.1, 0.6));

        let ab = table.resolve(Some(concrete), Some(plastic));
        let ba = table.resolve(Some(plastic), Some(concrete));
        assert_eq!(ab, ba);
        assert_eq!(ab.friction, 0.1);
        assert_eq!(ab.restitution, 0.6);
    }

    #[test]
    fn test_fallback_to_default() {
        let mut table = MaterialTable::default();
        table.default_contact_mut().contact_equation_stiffness = 1e9;
        let wood = table.add(Material::new("wood"));

        let contact = table.resolve(Some(wood), None);
        assert_eq!(contact.contact_equation_stiffness, 1e9);
        assert_eq!(contact.friction, 0.3);
    }

    #[test]
    fn test_material_values_multiply() {
        let mut table = MaterialTable::default();
        let a = table.add(Material::new("a").with_friction(0.5).with_restitution(0.5));
        let b = table.add(Material::new("b").with_friction(0.4).with_restitution(1.0));

        let contact = table.resolve(Some(a), Some(b));
        assert!((contact.friction - 0.2).abs() < 1e-6);
        assert!((contact.restitution - 0.5).abs() < 1e-6);
        assert_eq!(table.find("b"), Some(b));
    }
}
