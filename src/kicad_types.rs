// src/kicad_types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag carried by every item of the document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KicadType {
    /// Terminates a filter list; anything after it is ignored.
    Eot,
    /// Matches every item type.
    LocateAny,
    Screen,
    Sheet,
    SheetPin,
    Component,
    Field,
    Line,
    Junction,
    NoConnect,
    BusWireEntry,
    BusBusEntry,
    Text,
    Label,
    GlobalLabel,
    HierLabel,
    Marker,
    LibPart,
    LibPin,
    LibRectangle,
    LibText,
}

impl KicadType {
    pub fn is_lib_item(self) -> bool {
        matches!(
            self,
            KicadType::LibPin | KicadType::LibRectangle | KicadType::LibText
        )
    }

    pub fn is_bus_entry(self) -> bool {
        matches!(self, KicadType::BusWireEntry | KicadType::BusBusEntry)
    }

    pub fn name(self) -> &'static str {
        match self {
            KicadType::Eot => "EOT",
            KicadType::LocateAny => "LOCATE_ANY",
            KicadType::Screen => "SCH_SCREEN",
            KicadType::Sheet => "SCH_SHEET",
            KicadType::SheetPin => "SCH_SHEET_PIN",
            KicadType::Component => "SCH_COMPONENT",
            KicadType::Field => "SCH_FIELD",
            KicadType::Line => "SCH_LINE",
            KicadType::Junction => "SCH_JUNCTION",
            KicadType::NoConnect => "SCH_NO_CONNECT",
            KicadType::BusWireEntry => "SCH_BUS_WIRE_ENTRY",
            KicadType::BusBusEntry => "SCH_BUS_BUS_ENTRY",
            KicadType::Text => "SCH_TEXT",
            KicadType::Label => "SCH_LABEL",
            KicadType::GlobalLabel => "SCH_GLOBAL_LABEL",
            KicadType::HierLabel => "SCH_HIER_LABEL",
            KicadType::Marker => "SCH_MARKER",
            KicadType::LibPart => "LIB_PART",
            KicadType::LibPin => "LIB_PIN",
            KicadType::LibRectangle => "LIB_RECTANGLE",
            KicadType::LibText => "LIB_TEXT",
        }
    }
}

impl fmt::Display for KicadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned by an inspector to keep walking or stop the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    Continue,
    Quit,
}

/// The usable part of a filter list: everything before the first `Eot`.
pub fn active_types(filter: &[KicadType]) -> &[KicadType] {
    let end = filter
        .iter()
        .position(|t| *t == KicadType::Eot)
        .unwrap_or(filter.len());
    &filter[..end]
}

/// True if `kind` is accepted by `filter`.
pub fn type_in_filter(kind: KicadType, filter: &[KicadType]) -> bool {
    active_types(filter)
        .iter()
        .any(|t| *t == KicadType::LocateAny || *t == kind)
}

// --- Predefined filter lists ---

pub const ALL_ITEMS: &[KicadType] = &[KicadType::LocateAny];

pub const EDITABLE_ITEMS: &[KicadType] = &[
    KicadType::Text,
    KicadType::Label,
    KicadType::GlobalLabel,
    KicadType::HierLabel,
    KicadType::Field,
    KicadType::Component,
    KicadType::SheetPin,
    KicadType::Sheet,
    KicadType::Line,
];

pub const ROTATABLE_ITEMS: &[KicadType] = &[
    KicadType::Text,
    KicadType::Label,
    KicadType::GlobalLabel,
    KicadType::HierLabel,
    KicadType::Field,
    KicadType::Component,
    KicadType::Sheet,
    KicadType::BusBusEntry,
    KicadType::BusWireEntry,
    KicadType::Line,
];

pub const COMPONENTS_ONLY: &[KicadType] = &[KicadType::Component];

pub const SHEETS_ONLY: &[KicadType] = &[KicadType::Sheet];

pub const SHEETS_AND_SHEET_LABELS: &[KicadType] = &[KicadType::SheetPin, KicadType::Sheet];

/// Items drawn inside a library symbol.
pub const LIB_ITEMS: &[KicadType] = &[
    KicadType::LibPin,
    KicadType::LibText,
    KicadType::LibRectangle,
];
