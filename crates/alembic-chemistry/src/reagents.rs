//! Reagent definitions and registry

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Offset between Celsius and Kelvin
pub const KELVIN_OFFSET: f64 = 273.15;

/// Stable handle into the reagent registry
///
/// Handles are dense indices assigned at registration time. Handle 0 is the
/// `EMPTY` sentinel that unknown ids and names resolve to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReagentId(pub u16);

impl ReagentId {
    pub const EMPTY: ReagentId = ReagentId(0);
    pub const WATER: ReagentId = ReagentId(1);
    pub const OXYGEN: ReagentId = ReagentId(2);
    pub const NITROGEN: ReagentId = ReagentId(3);
    pub const HYDROGEN: ReagentId = ReagentId(4);
    pub const SULFUR: ReagentId = ReagentId(5);
    pub const SULFUR_DIOXIDE: ReagentId = ReagentId(6);
    pub const CARBON: ReagentId = ReagentId(7);
    pub const CARBON_DIOXIDE: ReagentId = ReagentId(8);
    pub const METHANE: ReagentId = ReagentId(9);
    pub const SODIUM_CHLORIDE: ReagentId = ReagentId(10);
    pub const SODIUM: ReagentId = ReagentId(11);
    pub const CHLORINE: ReagentId = ReagentId(12);
    pub const SODIUM_HYDROXIDE: ReagentId = ReagentId(13);
    pub const IRON: ReagentId = ReagentId(14);
    pub const IRON_OXIDE: ReagentId = ReagentId(15);

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

/// Physical state of a reagent at some temperature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReagentState {
    /// Below the melting point
    Solid,
    /// Between melting and boiling point
    Liquid,
    /// At or above the boiling point
    Gas,
}

/// Immutable physical properties of a reagent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReagentDef {
    pub name: String,
    /// Temperature at which this melts (Celsius)
    pub melting_point: f32,
    /// Temperature at which this boils (Celsius)
    pub boiling_point: f32,
    /// Molar heat capacity in J/(mol·K)
    pub heat_capacity: f32,
}

impl ReagentDef {
    pub fn new(name: &str, melting_point: f32, boiling_point: f32, heat_capacity: f32) -> Self {
        Self {
            name: name.to_string(),
            melting_point,
            boiling_point,
            heat_capacity,
        }
    }

    /// State of this reagent in a mixture at `temperature` (Celsius)
    pub fn state_at(&self, temperature: f32) -> ReagentState {
        if temperature >= self.boiling_point {
            ReagentState::Gas
        } else if temperature >= self.melting_point {
            ReagentState::Liquid
        } else {
            ReagentState::Solid
        }
    }
}

impl Default for ReagentDef {
    fn default() -> Self {
        Self {
            name: "empty".to_string(),
            melting_point: 0.0,
            boiling_point: 0.0,
            heat_capacity: 0.0,
        }
    }
}

/// Registry of all reagents
#[derive(Debug)]
pub struct Reagents {
    reagents: Vec<ReagentDef>,
    by_name: AHashMap<String, ReagentId>,
}

impl Reagents {
    /// Registry pre-populated with the built-in catalog
    pub fn new() -> Self {
        let mut reagents = Self::empty();
        reagents.register_defaults();
        reagents
    }

    /// Registry holding only the `EMPTY` sentinel
    pub fn empty() -> Self {
        let sentinel = ReagentDef::default();
        let mut by_name = AHashMap::new();
        by_name.insert(sentinel.name.clone(), ReagentId::EMPTY);
        Self {
            reagents: vec![sentinel],
            by_name,
        }
    }

    fn register_defaults(&mut self) {
        // Order must match the ReagentId constants
        self.register(ReagentDef::new("water", 0.0, 100.0, 75.3));
        self.register(ReagentDef::new("oxygen", -218.8, -183.0, 29.37));
        self.register(ReagentDef::new("nitrogen", -210.0, -195.8, 29.12));
        self.register(ReagentDef::new("hydrogen", -259.1, -252.9, 28.84));
        self.register(ReagentDef::new("sulfur", 115.2, 444.6, 22.6));
        self.register(ReagentDef::new("sulfur_dioxide", -72.0, -10.0, 39.9));
        self.register(ReagentDef::new("carbon", 3550.0, 4827.0, 8.5));
        // Sublimes at atmospheric pressure, so it is never liquid here
        self.register(ReagentDef::new("carbon_dioxide", -78.5, -78.5, 37.1));
        self.register(ReagentDef::new("methane", -182.5, -161.5, 35.7));
        self.register(ReagentDef::new("sodium_chloride", 801.0, 1465.0, 50.5));
        self.register(ReagentDef::new("sodium", 97.8, 883.0, 28.2));
        self.register(ReagentDef::new("chlorine", -101.5, -34.0, 33.9));
        self.register(ReagentDef::new("sodium_hydroxide", 323.0, 1388.0, 59.5));
        self.register(ReagentDef::new("iron", 1538.0, 2862.0, 25.1));
        self.register(ReagentDef::new("iron_oxide", 1565.0, 3414.0, 103.9));
    }

    /// Register a reagent and return its handle
    ///
    /// A name that is already registered keeps its original definition. Once
    /// every handle is taken the registration is refused and `EMPTY` returned.
    pub fn register(&mut self, def: ReagentDef) -> ReagentId {
        if let Some(&existing) = self.by_name.get(&def.name) {
            log::warn!(
                "Reagent '{}' already registered as {:?}, keeping the existing definition",
                def.name,
                existing
            );
            return existing;
        }

        let Ok(index) = u16::try_from(self.reagents.len()) else {
            log::warn!("Reagent catalog is full, not registering '{}'", def.name);
            return ReagentId::EMPTY;
        };
        let id = ReagentId(index);
        self.by_name.insert(def.name.clone(), id);
        self.reagents.push(def);
        id
    }

    /// Definition for `id`, or the `EMPTY` sentinel for unknown handles
    pub fn get(&self, id: ReagentId) -> &ReagentDef {
        self.reagents
            .get(id.0 as usize)
            .unwrap_or(&self.reagents[0])
    }

    /// Whether `id` names a registered reagent other than the sentinel
    pub fn contains(&self, id: ReagentId) -> bool {
        !id.is_empty() && (id.0 as usize) < self.reagents.len()
    }

    /// Handle for `name`, or `EMPTY` if nothing is registered under it
    pub fn lookup(&self, name: &str) -> ReagentId {
        self.find(name).unwrap_or(ReagentId::EMPTY)
    }

    pub fn find(&self, name: &str) -> Option<ReagentId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: ReagentId) -> &str {
        &self.get(id).name
    }

    pub fn len(&self) -> usize {
        self.reagents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reagents.len() <= 1
    }

    /// All registered reagents except the sentinel
    pub fn iter(&self) -> impl Iterator<Item = (ReagentId, &ReagentDef)> {
        self.reagents
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, def)| (ReagentId(i as u16), def))
    }
}

impl Default for Reagents {
    fn default() -> Self {
        Self::new()
    }
}
