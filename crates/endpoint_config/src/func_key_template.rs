//! Function key templates.
//!
//! A function key template maps phone key positions to key definitions. A
//! user's effective keys come from two templates: the shared (public)
//! template the user is attached to, and the user's own private template
//! layered on top of it. The layering is a one level merge: a position
//! defined in the upper template replaces the whole key at that position.
//!
//! # Examples
//!
//! ```rust
//! use endpoint_config::{FuncKeyDestination, FuncKeyMapping, FuncKeyTemplate};
//!
//! let public = FuncKeyTemplate::from_keys([
//!     (1, FuncKeyMapping::new(FuncKeyDestination::Custom { exten: "*10".into() })),
//!     (2, FuncKeyMapping::new(FuncKeyDestination::User { user_id: 7 })),
//! ]);
//! let private = FuncKeyTemplate::from_keys([
//!     (2, FuncKeyMapping::new(FuncKeyDestination::User { user_id: 8 })),
//! ]);
//!
//! let merged = public.merge(&private);
//! assert_eq!(merged.positions().collect::<Vec<_>>(), vec![1, 2]);
//! assert_eq!(
//!     merged.get(2).map(|key| &key.destination),
//!     Some(&FuncKeyDestination::User { user_id: 8 })
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(test)]
#[path = "func_key_template_tests.rs"]
mod tests;

/// What pressing a function key does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FuncKeyDestination {
    User { user_id: u64 },
    Group { group_id: u64 },
    Queue { queue_id: u64 },
    Conference { conference_id: u64 },
    Paging { paging_id: u64 },
    ParkPosition { parking_lot_id: u64, position: u32 },
    Custom { exten: String },
    Service { service: String },
    Forward {
        forward: String,
        #[serde(default)]
        exten: Option<String>,
    },
    Transfer { transfer: String },
    Agent { agent_id: u64, action: String },
    BsFilter { filter_member_id: u64 },
}

/// One key definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncKeyMapping {
    #[serde(default)]
    pub label: Option<String>,

    /// Busy lamp field supervision.
    #[serde(default = "FuncKeyMapping::default_true")]
    pub blf: bool,

    /// Whether the key was inherited from a public template.
    #[serde(default = "FuncKeyMapping::default_true")]
    pub inherited: bool,

    pub destination: FuncKeyDestination,
}

impl FuncKeyMapping {
    fn default_true() -> bool {
        true
    }

    pub fn new(destination: FuncKeyDestination) -> Self {
        Self {
            label: None,
            blf: true,
            inherited: true,
            destination,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A set of function keys indexed by position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncKeyTemplate {
    #[serde(default)]
    pub id: Option<u64>,

    #[serde(default)]
    pub name: Option<String>,

    /// Private templates belong to a single user.
    #[serde(default)]
    pub private: bool,

    #[serde(default, with = "positions")]
    pub keys: BTreeMap<u32, FuncKeyMapping>,
}

impl FuncKeyTemplate {
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = (u32, FuncKeyMapping)>,
    {
        Self {
            keys: keys.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn get(&self, position: u32) -> Option<&FuncKeyMapping> {
        self.keys.get(&position)
    }

    pub fn positions(&self) -> impl Iterator<Item = u32> + '_ {
        self.keys.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Layers `other` on top of this template.
    ///
    /// The result holds every position of `self`; each position defined in
    /// `other` replaces the whole key. Neither operand is modified and the
    /// result carries no template identity.
    pub fn merge(&self, other: &FuncKeyTemplate) -> FuncKeyTemplate {
        let mut keys = self.keys.clone();
        keys.extend(
            other
                .keys
                .iter()
                .map(|(position, key)| (*position, key.clone())),
        );
        FuncKeyTemplate {
            keys,
            ..FuncKeyTemplate::default()
        }
    }
}

/// Effective keys of a user: the private template over the public one.
///
/// A missing template behaves as an empty one.
pub fn user_func_keys(
    public: Option<&FuncKeyTemplate>,
    private: Option<&FuncKeyTemplate>,
) -> FuncKeyTemplate {
    let empty = FuncKeyTemplate::default();
    public
        .unwrap_or(&empty)
        .merge(private.unwrap_or(&empty))
}

/// Position maps use string keys so they survive TOML tables.
mod positions {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    use super::FuncKeyMapping;

    pub fn serialize<S>(
        keys: &BTreeMap<u32, FuncKeyMapping>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let by_name: BTreeMap<String, &FuncKeyMapping> = keys
            .iter()
            .map(|(position, key)| (position.to_string(), key))
            .collect();
        by_name.serialize(serializer)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<u32, FuncKeyMapping>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let by_name = BTreeMap::<String, FuncKeyMapping>::deserialize(deserializer)?;
        by_name
            .into_iter()
            .map(|(position, key)| {
                position
                    .parse::<u32>()
                    .map(|position| (position, key))
                    .map_err(|_| {
                        D::Error::custom(format!("invalid func key position '{position}'"))
                    })
            })
            .collect()
    }
}
