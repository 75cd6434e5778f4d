// src/lib.rs

pub mod collector;
pub mod config;
pub mod error;
pub mod find_collector;
pub mod find_replace;
pub mod geometry;
pub mod items;
pub mod kicad_types;
pub mod pin;
pub mod schematic;
pub mod sheet_path;

use crate::collector::EeCollector;
use crate::geometry::Point;
use crate::kicad_types::KicadType;
use crate::schematic::{ItemId, Schematic};
use log::debug;

/// Locate the item under `pos` on `screen`. When several items are hit the
/// first one in `filter` priority order wins; the collector is returned so
/// the caller can offer a choice instead.
pub fn locate_item(
    schematic: &Schematic,
    screen: ItemId,
    filter: &[KicadType],
    pos: Point,
    threshold: i32,
) -> (Option<ItemId>, EeCollector) {
    let mut collector = EeCollector::new(filter).with_threshold(threshold);
    collector.collect(schematic, screen, filter, pos, 0, 0);

    if collector.needs_disambiguation() {
        collector.menu_title = format!("Clarify Selection ({} items)", collector.count());
        debug!("{}", collector.menu_title);
    }
    (collector.get(0), collector)
}
