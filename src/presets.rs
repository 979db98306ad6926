//! Named parameter presets persisted as JSON.
//!
//! Hosts keep a bank of tuned strikes per installation ("front wall crawl",
//! "finale barrage") and recall them by name on trigger cues.

use crate::bolt::BoltParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One named parameter set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub params: BoltParams,
}

/// A bank of presets for a particular installation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetBank {
    pub name: String,
    pub presets: Vec<Preset>,
}

impl PresetBank {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            presets: Vec::new(),
        }
    }

    pub fn add(&mut self, name: impl Into<String>, params: BoltParams) {
        self.presets.push(Preset {
            name: name.into(),
            params,
        });
    }

    /// Find a preset by name (first match)
    pub fn get(&self, name: &str) -> Option<&BoltParams> {
        self.presets.iter().find(|p| p.name == name).map(|p| &p.params)
    }

    /// Save the bank to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load a bank from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&json).map_err(|e| e.to_string())
    }
}

impl Default for PresetBank {
    fn default() -> Self {
        Self::new("untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::{MidpointParams, PhysicalParams, RrtParams};

    #[test]
    fn test_json_round_trip() {
        let mut bank = PresetBank::new("test-wall");
        bank.add("crawl", BoltParams::Midpoint(MidpointParams::default()));
        bank.add("strike", BoltParams::Physical(PhysicalParams::default()));
        bank.add(
            "searcher",
            BoltParams::Rrt(RrtParams {
                goal_bias: 0.25,
                ..RrtParams::default()
            }),
        );

        let json = serde_json::to_string_pretty(&bank).unwrap();
        let restored: PresetBank = serde_json::from_str(&json).unwrap();
        assert_eq!(bank, restored);
    }

    #[test]
    fn test_lookup_by_name() {
        let mut bank = PresetBank::new("bank");
        bank.add("a", BoltParams::Midpoint(MidpointParams::default()));
        assert!(bank.get("a").is_some());
        assert!(bank.get("missing").is_none());
    }

    #[test]
    fn test_algorithm_tag_in_json() {
        let mut bank = PresetBank::new("bank");
        bank.add("strike", BoltParams::Physical(PhysicalParams::default()));
        let json = serde_json::to_string(&bank).unwrap();
        assert!(json.contains("\"algorithm\":\"Physical\""));
    }
}
