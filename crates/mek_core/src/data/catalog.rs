//! Equipment catalog.

use serde::{Deserialize, Serialize};

use super::equipment_data::EquipmentData;
use crate::error::{GameError, Result};

const STANDARD_EQUIPMENT: &str = include_str!("standard_equipment.ron");

/// A set of equipment definitions looked up by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentCatalog {
    items: Vec<EquipmentData>,
}

impl EquipmentCatalog {
    /// The standard catalog embedded in the crate.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if the embedded data is malformed.
    pub fn standard() -> Result<Self> {
        Self::from_ron("standard_equipment.ron", STANDARD_EQUIPMENT)
    }

    /// Parse a catalog from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if the text does not parse or
    /// contains duplicate ids.
    pub fn from_ron(source_name: &str, text: &str) -> Result<Self> {
        let catalog: Self = ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;

        let mut ids: Vec<&str> = catalog.items.iter().map(|item| item.id.as_str()).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(GameError::DataParseError {
                source_name: source_name.to_string(),
                message: format!("duplicate equipment id '{}'", pair[0]),
            });
        }

        tracing::debug!(source = source_name, items = catalog.items.len(), "Loaded equipment catalog");
        Ok(catalog)
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EquipmentData> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Look up an item by id, cloning it for mounting.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for an unknown id.
    pub fn require(&self, id: &str) -> Result<EquipmentData> {
        self.get(id)
            .cloned()
            .ok_or_else(|| GameError::InvalidArgument(format!("unknown equipment id '{id}'")))
    }

    /// All items in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &EquipmentData> {
        self.items.iter()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{EquipmentKind, MiscKind};
    use crate::math::Fixed;

    #[test]
    fn test_standard_catalog_parses() {
        let catalog = EquipmentCatalog::standard().unwrap();
        assert!(catalog.len() >= 19);

        let laser = catalog.get("medium_laser").unwrap();
        let stats = laser.weapon().unwrap();
        assert_eq!(stats.damage, 5);
        assert_eq!(stats.heat, 3);
        assert_eq!(laser.tonnage, Fixed::ONE);

        let ppc = catalog.get("ppc").unwrap().weapon().unwrap();
        assert_eq!(ppc.min_range, 3);

        assert_eq!(
            catalog.get("jump_jet").unwrap().kind,
            EquipmentKind::Misc(MiscKind::JumpJet)
        );
    }

    #[test]
    fn test_every_ammo_weapon_has_ammo() {
        let catalog = EquipmentCatalog::standard().unwrap();
        for item in catalog.iter() {
            if let Some(ammo_type) = item.weapon().and_then(|w| w.ammo_type.as_ref()) {
                assert!(
                    catalog
                        .iter()
                        .any(|bin| bin.ammo().is_some_and(|a| &a.ammo_type == ammo_type)),
                    "{} has no ammo bin",
                    item.id
                );
            }
        }
    }

    #[test]
    fn test_require_unknown() {
        let catalog = EquipmentCatalog::standard().unwrap();
        assert!(matches!(
            catalog.require("gauss_rifle"),
            Err(GameError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let text = r#"EquipmentCatalog(items: [
            EquipmentData(id: "hs", name: "A", tonnage: 0, slots: 1, kind: Misc(HeatSink)),
            EquipmentData(id: "hs", name: "B", tonnage: 0, slots: 1, kind: Misc(HeatSink)),
        ])"#;
        let result = EquipmentCatalog::from_ron("dupes", text);
        assert!(matches!(result, Err(GameError::DataParseError { .. })));
    }
}
