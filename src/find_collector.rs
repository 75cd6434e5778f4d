// src/find_collector.rs

use crate::collector::Collector;
use crate::error::Result;
use crate::find_replace::{FindReplaceData, TextMatcher};
use crate::geometry::{Point, Units};
use crate::items::SchItem;
use crate::kicad_types::{ALL_ITEMS, KicadType, SearchResult};
use crate::schematic::{Inspector, ItemId, Schematic};
use crate::sheet_path::SheetPath;
use log::{debug, trace, warn};
use std::ops::Deref;

/// Where a found item sits: its position, the human readable path of the
/// sheet it was found in and, for child items, the owning item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FindCollectorData {
    position: Point,
    sheet_path: String,
    parent: Option<ItemId>,
}

impl FindCollectorData {
    pub fn new(position: Point, sheet_path: &str, parent: Option<ItemId>) -> Self {
        FindCollectorData {
            position,
            sheet_path: sheet_path.to_string(),
            parent,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn sheet_path(&self) -> &str {
        &self.sheet_path
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindPhase {
    /// No search performed yet.
    Idle,
    Collecting,
    /// Results are available and the index moves over them.
    Navigating,
}

/// Collects every item of a schematic (or one sheet) matching find criteria
/// and walks through the matches.
#[derive(Debug, Clone)]
pub struct SchFindCollector {
    base: Collector,
    data: Vec<FindCollectorData>,
    find_replace_data: FindReplaceData,
    matcher: Option<TextMatcher>,
    /// Human readable path of the sheet being walked while collecting.
    current_sheet_path: Option<String>,
    sheet_paths: Vec<SheetPath>,
    found_index: isize,
    /// The schematic changed; search again even if the criteria did not.
    force_search: bool,
    lib_hash: u64,
    phase: FindPhase,
}

impl Default for SchFindCollector {
    fn default() -> Self {
        Self::new(ALL_ITEMS)
    }
}

impl Deref for SchFindCollector {
    type Target = Collector;

    fn deref(&self) -> &Collector {
        &self.base
    }
}

impl SchFindCollector {
    pub fn new(scan_types: &[KicadType]) -> Self {
        SchFindCollector {
            base: Collector::new(scan_types),
            data: Vec::new(),
            find_replace_data: FindReplaceData::default(),
            matcher: None,
            current_sheet_path: None,
            sheet_paths: Vec::new(),
            found_index: 0,
            force_search: false,
            lib_hash: 0,
            phase: FindPhase::Idle,
        }
    }

    pub fn empty(&mut self) {
        self.found_index = 0;
        self.base.empty();
        self.data.clear();
        self.sheet_paths.clear();
    }

    pub fn phase(&self) -> FindPhase {
        self.phase
    }

    pub fn find_replace_data(&self) -> &FindReplaceData {
        &self.find_replace_data
    }

    pub fn sheet_paths(&self) -> &[SheetPath] {
        &self.sheet_paths
    }

    pub fn set_force_search(&mut self, force: bool) {
        self.force_search = force;
    }

    pub fn lib_hash(&self) -> u64 {
        self.lib_hash
    }

    pub fn set_lib_hash(&mut self, hash: u64) {
        self.lib_hash = hash;
    }

    pub fn found_index(&self) -> isize {
        self.found_index
    }

    /// Out of range indices reset to 0.
    pub fn set_found_index(&mut self, index: isize) {
        self.found_index = if self.valid_index(index) { index } else { 0 };
    }

    pub fn increment_index(&mut self) {
        self.found_index += 1;
    }

    fn valid_index(&self, index: isize) -> bool {
        index >= 0 && (index as usize) < self.data.len()
    }

    /// Update the replace string without invalidating the results.
    pub fn set_replace_string(&mut self, replace: &str) {
        self.find_replace_data.replace_string = replace.to_string();
        if let Ok(matcher) = self.find_replace_data.matcher() {
            self.matcher = Some(matcher);
        }
    }

    /// True when `criteria` (or the libraries, stamped by `lib_hash`) would
    /// give different results than the ones held.
    pub fn is_search_required(&self, criteria: &FindReplaceData, lib_hash: u64) -> bool {
        self.phase == FindPhase::Idle
            || self.find_replace_data.changes_compare(criteria)
            || self.force_search
            || self.find_replace_data.is_wrapping() != criteria.is_wrapping()
            || self.lib_hash != lib_hash
    }

    /// True when the index has moved off the list and wrapping is off.
    pub fn passed_end(&self) -> bool {
        if self.count() == 0 {
            return true;
        }
        let flags = &self.find_replace_data.flags;
        if flags.wrap {
            return false;
        }
        if flags.search_down {
            self.found_index >= self.count() as isize
        } else {
            self.found_index < 0
        }
    }

    /// Move to the next match in the search direction.
    pub fn update_index(&mut self) {
        let count = self.count() as isize;
        let flags = self.find_replace_data.flags;
        if flags.search_down {
            if self.found_index < count {
                self.found_index += 1;
            }
            if self.found_index >= count && flags.wrap {
                self.found_index = 0;
            }
        } else {
            if self.found_index >= 0 {
                self.found_index -= 1;
            }
            if self.found_index < 0 && flags.wrap {
                self.found_index = (count - 1).max(0);
            }
        }
    }

    /// Data of the match at `index`, empty data when out of range.
    pub fn get_find_data(&self, index: usize) -> FindCollectorData {
        self.data.get(index).cloned().unwrap_or_default()
    }

    /// Match at the current index.
    pub fn current(&self) -> Option<ItemId> {
        if self.valid_index(self.found_index) {
            self.get(self.found_index as usize)
        } else {
            None
        }
    }

    /// Match at the current index with its data.
    pub fn current_with_data(&self) -> Option<(ItemId, &FindCollectorData)> {
        let id = self.current()?;
        Some((id, &self.data[self.found_index as usize]))
    }

    /// Description of the current match, empty when there is none.
    pub fn text(&self, schematic: &Schematic, units: Units) -> String {
        let Some((id, data)) = self.current_with_data() else {
            return String::new();
        };
        let item = schematic.describe(id, units);
        match data.parent {
            Some(parent) => format!(
                "Child item {} of parent item {} found in sheet {}",
                item,
                schematic.describe(parent, units),
                data.sheet_path
            ),
            None => format!("Item {} found in sheet {}", item, data.sheet_path),
        }
    }

    /// Collect the items matching `criteria` on the sheet `scope`, or on
    /// every sheet of the hierarchy when `scope` is `None`.
    pub fn collect(
        &mut self,
        schematic: &Schematic,
        criteria: &FindReplaceData,
        scope: Option<&SheetPath>,
    ) -> Result<()> {
        self.empty();
        self.phase = FindPhase::Collecting;
        self.find_replace_data = criteria.clone();

        let matcher = match criteria.matcher() {
            Ok(matcher) => matcher,
            Err(e) => {
                self.phase = FindPhase::Idle;
                self.matcher = None;
                return Err(e);
            }
        };
        self.matcher = Some(matcher);

        let paths = match scope {
            Some(path) => vec![path.clone()],
            None => schematic.sheet_list(),
        };
        let scan_types = self.scan_types().to_vec();

        for path in &paths {
            let Some(screen) = path.last_screen(schematic) else {
                warn!("Sheet path {:?} has no screen, skipping", path.sheets());
                continue;
            };
            self.current_sheet_path = Some(path.human_readable(schematic));
            schematic.visit(screen, &scan_types, self);
            if scope.is_none() {
                self.sheet_paths.push(path.clone());
            }
        }
        self.current_sheet_path = None;

        self.lib_hash = schematic.lib_hash();
        self.force_search = false;
        self.found_index = if criteria.flags.search_down {
            0
        } else {
            (self.count() as isize - 1).max(0)
        };
        self.phase = FindPhase::Navigating;
        debug!(
            "Found {} match(es) for '{}' in {} sheet(s)",
            self.count(),
            criteria.find_string,
            paths.len()
        );
        Ok(())
    }

    /// Run the search state machine: collect again when needed, otherwise
    /// move to the next match. `current_sheet` limits the search when the
    /// criteria ask for the current sheet only.
    pub fn find_next(
        &mut self,
        schematic: &Schematic,
        criteria: &FindReplaceData,
        current_sheet: Option<&SheetPath>,
    ) -> Result<Option<ItemId>> {
        if self.is_search_required(criteria, schematic.lib_hash()) {
            let scope = current_sheet.filter(|_| criteria.flags.current_sheet_only);
            self.collect(schematic, criteria, scope)?;
        } else {
            self.find_replace_data = criteria.clone();
            self.set_replace_string(&criteria.replace_string);
            self.update_index();
        }

        if self.passed_end() {
            return Ok(None);
        }
        Ok(self.current())
    }

    /// Replace the find string in the current match. The match is dropped
    /// from the results when it no longer matches afterwards (the index is
    /// re-validated, out of range → 0), otherwise the index moves past it.
    pub fn replace_item(&mut self, schematic: &mut Schematic, scope: Option<&SheetPath>) -> bool {
        if self.passed_end() || !self.valid_index(self.found_index) {
            return false;
        }
        let Some(matcher) = self.matcher.clone() else {
            return false;
        };
        let index = self.found_index as usize;
        let Some(id) = self.get(index) else {
            return false;
        };

        if let Some(scope) = scope {
            if self.data[index].sheet_path != scope.human_readable(schematic) {
                debug!("Current match is outside of sheet {:?}", scope.sheets());
                return false;
            }
        }

        if !schematic.replace_text(id, &matcher) {
            return false;
        }
        self.set_force_search(true);

        if schematic.item_matches(id, &matcher) {
            self.increment_index();
        } else {
            self.base.remove(index);
            self.data.remove(index);
            let current = self.found_index;
            self.set_found_index(current);
        }
        true
    }

    /// Replace every match once, in result order. Returns the number of
    /// items changed.
    pub fn replace_all(&mut self, schematic: &mut Schematic, scope: Option<&SheetPath>) -> usize {
        let pending = self.items().to_vec();
        let mut replaced = 0;
        for id in pending {
            let Some(index) = self.items().iter().position(|i| *i == id) else {
                continue;
            };
            self.found_index = index as isize;
            if self.replace_item(schematic, scope) {
                replaced += 1;
            }
        }
        debug!("Replaced {} match(es)", replaced);
        replaced
    }

    fn push_match(&mut self, id: ItemId, data: FindCollectorData) {
        self.base.append(id);
        self.data.push(data);
    }
}

impl Inspector for SchFindCollector {
    fn inspect(&mut self, schematic: &Schematic, id: ItemId) -> SearchResult {
        let (Some(node), Some(matcher)) = (schematic.get(id), self.matcher.as_ref()) else {
            return SearchResult::Continue;
        };
        let sheet_path = self.current_sheet_path.clone().unwrap_or_default();

        let mut found = Vec::new();
        match &node.item {
            SchItem::Component(comp) => {
                if matcher.search_all_pins() {
                    for (pin_id, pin) in schematic.component_pins(id) {
                        if pin.matches(matcher) {
                            let pos = comp.position + comp.transform.apply(pin.position);
                            found.push((pin_id, FindCollectorData::new(pos, &sheet_path, Some(id))));
                        }
                    }
                }
            }
            item => {
                if schematic.item_matches(id, matcher) {
                    let parent = match item {
                        SchItem::Field(_) | SchItem::SheetPin(_) => node.parent(),
                        _ => None,
                    };
                    found.push((id, FindCollectorData::new(item.position(), &sheet_path, parent)));
                }
            }
        }

        for (match_id, data) in found {
            trace!("Matched {:?} in {}", match_id, data.sheet_path);
            self.push_match(match_id, data);
        }
        SearchResult::Continue
    }
}
