// src/collector.rs

use crate::geometry::Point;
use crate::items::{LineLayer, SchItem};
use crate::kicad_types::{ALL_ITEMS, KicadType, SearchResult, active_types};
use crate::schematic::{Inspector, ItemId, Schematic};
use log::{debug, trace};
use std::ops::{Deref, DerefMut};

/// Ordered list of item handles gathered by a traversal. The collector does
/// not own the items; re-collect after the document changes.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    list: Vec<ItemId>,
    scan_types: Vec<KicadType>,
    ref_pos: Point,
}

impl Collector {
    pub fn new(scan_types: &[KicadType]) -> Self {
        Collector {
            list: Vec::new(),
            scan_types: active_types(scan_types).to_vec(),
            ref_pos: Point::ZERO,
        }
    }

    pub fn count(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn empty(&mut self) {
        self.list.clear();
    }

    pub fn append(&mut self, id: ItemId) {
        self.list.push(id);
    }

    pub fn remove(&mut self, index: usize) -> Option<ItemId> {
        (index < self.list.len()).then(|| self.list.remove(index))
    }

    pub fn remove_item(&mut self, id: ItemId) {
        self.list.retain(|i| *i != id);
    }

    pub fn has_item(&self, id: ItemId) -> bool {
        self.list.contains(&id)
    }

    /// Item at `index`, `None` when out of range.
    pub fn get(&self, index: usize) -> Option<ItemId> {
        self.list.get(index).copied()
    }

    pub fn items(&self) -> &[ItemId] {
        &self.list
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.list.iter().copied()
    }

    pub fn count_type(&self, schematic: &Schematic, kind: KicadType) -> usize {
        self.iter()
            .filter(|id| schematic.kind(*id) == Some(kind))
            .count()
    }

    pub fn scan_types(&self) -> &[KicadType] {
        &self.scan_types
    }

    pub fn set_scan_types(&mut self, scan_types: &[KicadType]) {
        self.scan_types = active_types(scan_types).to_vec();
    }

    pub fn ref_pos(&self) -> Point {
        self.ref_pos
    }

    pub fn set_ref_pos(&mut self, pos: Point) {
        self.ref_pos = pos;
    }
}

/// Hit-test collector: gathers the items under a point.
#[derive(Debug, Clone)]
pub struct EeCollector {
    base: Collector,
    /// Symbol unit filter for library items, 0 accepts all.
    pub unit: i32,
    /// Body style filter for library items, 0 accepts all.
    pub body_style: i32,
    /// Hit-test threshold in internal units.
    pub threshold: i32,
    /// Title of the disambiguation menu, if one is needed.
    pub menu_title: String,
    pub menu_cancelled: bool,
}

impl Default for EeCollector {
    fn default() -> Self {
        Self::new(ALL_ITEMS)
    }
}

impl Deref for EeCollector {
    type Target = Collector;

    fn deref(&self) -> &Collector {
        &self.base
    }
}

impl DerefMut for EeCollector {
    fn deref_mut(&mut self) -> &mut Collector {
        &mut self.base
    }
}

impl EeCollector {
    pub fn new(scan_types: &[KicadType]) -> Self {
        EeCollector {
            base: Collector::new(scan_types),
            unit: 0,
            body_style: 0,
            threshold: 0,
            menu_title: String::new(),
            menu_cancelled: false,
        }
    }

    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Collect the items of `filter` types under `pos`, below `root`.
    /// Earlier types in `filter` come first in the result.
    pub fn collect(
        &mut self,
        schematic: &Schematic,
        root: ItemId,
        filter: &[KicadType],
        pos: Point,
        unit: i32,
        body_style: i32,
    ) {
        self.base.empty();
        self.base.set_scan_types(filter);
        self.base.set_ref_pos(pos);
        self.unit = unit;
        self.body_style = body_style;
        self.menu_cancelled = false;

        let scan_types = self.base.scan_types().to_vec();
        schematic.visit(root, &scan_types, self);
        debug!(
            "Collected {} item(s) at ({}, {}) for {} type(s)",
            self.count(),
            pos.x,
            pos.y,
            scan_types.len()
        );
    }

    /// More than one candidate remains; the caller has to let the user choose.
    pub fn needs_disambiguation(&self) -> bool {
        self.count() > 1
    }

    pub fn set_menu_cancelled(&mut self, cancelled: bool) {
        self.menu_cancelled = cancelled;
    }

    /// True when the two collected items form the corner of two segments.
    pub fn is_corner(&self, schematic: &Schematic) -> bool {
        if self.count() != 2 {
            return false;
        }
        let (Some(first), Some(second)) = (
            self.get(0).and_then(|id| schematic.item(id)),
            self.get(1).and_then(|id| schematic.item(id)),
        ) else {
            return false;
        };

        match (first, second) {
            (SchItem::Line(a), SchItem::Line(b)) => a.layer == b.layer,
            (SchItem::Line(_), SchItem::BusEntry(_)) => true,
            (SchItem::BusEntry(_), SchItem::Line(_)) => true,
            _ => false,
        }
    }

    /// A draggable junction is made of:
    /// - three or more wire end points,
    /// - one or more wire end points and one wire mid point,
    /// - two or more wire mid points crossing at a junction.
    pub fn is_draggable_junction(&self, schematic: &Schematic) -> bool {
        let mut wire_ends = 0;
        let mut wire_mids = 0;
        let mut junctions = 0;

        for id in self.iter() {
            match schematic.item(id) {
                Some(SchItem::Junction(_)) => junctions += 1,
                Some(SchItem::Line(line)) if line.layer == LineLayer::Wire => {
                    if line.is_end_point(self.ref_pos()) {
                        wire_ends += 1;
                    } else {
                        wire_mids += 1;
                    }
                }
                _ => return false,
            }
        }

        wire_ends >= 3 || (wire_ends >= 1 && wire_mids == 1) || (wire_mids >= 2 && junctions == 1)
    }
}

impl Inspector for EeCollector {
    fn inspect(&mut self, schematic: &Schematic, id: ItemId) -> SearchResult {
        let Some(item) = schematic.item(id) else {
            return SearchResult::Continue;
        };

        if let Some((unit, body_style)) = item.unit_and_body_style() {
            if self.unit != 0 && unit != 0 && unit != self.unit {
                return SearchResult::Continue;
            }
            if self.body_style != 0 && body_style != 0 && body_style != self.body_style {
                return SearchResult::Continue;
            }
        }

        if schematic.hit_test(id, self.ref_pos(), self.threshold) {
            trace!("Hit {} {:?}", item.kind(), id);
            self.base.append(id);
        }
        SearchResult::Continue
    }
}

/// Gathers every item of the requested types, without hit testing.
#[derive(Debug, Clone, Default)]
pub struct EeTypeCollector {
    base: Collector,
}

impl Deref for EeTypeCollector {
    type Target = Collector;

    fn deref(&self) -> &Collector {
        &self.base
    }
}

impl DerefMut for EeTypeCollector {
    fn deref_mut(&mut self) -> &mut Collector {
        &mut self.base
    }
}

impl EeTypeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(&mut self, schematic: &Schematic, root: ItemId, scan_types: &[KicadType]) {
        self.base.empty();
        self.base.set_scan_types(scan_types);
        let scan_types = self.base.scan_types().to_vec();
        schematic.visit(root, &scan_types, self);
        debug!("Collected {} item(s) by type", self.count());
    }
}

impl Inspector for EeTypeCollector {
    fn inspect(&mut self, _schematic: &Schematic, id: ItemId) -> SearchResult {
        self.base.append(id);
        SearchResult::Continue
    }
}
