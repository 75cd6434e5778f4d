// src/config.rs

use crate::collector::EeCollector;
use crate::error::Result;
use crate::find_replace::FindReplaceData;
use crate::geometry::Units;
use crate::kicad_types::KicadType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const MAX_HISTORY: usize = 10;

/// Persisted editor preferences used by the collectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Hit-test threshold in internal units.
    pub hit_threshold: i32,
    pub units: Units,
    /// Last find / replace criteria.
    pub find: FindReplaceData,
    pub find_history: Vec<String>,
    pub replace_history: Vec<String>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        EditorSettings {
            hit_threshold: 10,
            units: Units::Mils,
            find: FindReplaceData::default(),
            find_history: Vec::new(),
            replace_history: Vec::new(),
        }
    }
}

impl EditorSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Remember `criteria` as the last search and record its strings in
    /// the histories.
    pub fn remember_search(&mut self, criteria: &FindReplaceData) {
        push_history(&mut self.find_history, &criteria.find_string);
        push_history(&mut self.replace_history, &criteria.replace_string);
        self.find = criteria.clone();
    }

    /// A hit-test collector using the configured threshold.
    pub fn ee_collector(&self, scan_types: &[KicadType]) -> EeCollector {
        EeCollector::new(scan_types).with_threshold(self.hit_threshold)
    }
}

/// Most recent first, no duplicates, at most `MAX_HISTORY` entries.
fn push_history(history: &mut Vec<String>, entry: &str) {
    if entry.is_empty() {
        return;
    }
    history.retain(|e| e != entry);
    history.insert(0, entry.to_string());
    history.truncate(MAX_HISTORY);
}
