// src/items.rs

use crate::geometry::{Point, Rect, Transform, Units, test_segment_hit, text_box};
use crate::kicad_types::KicadType;
use crate::pin::LibPin;
use crate::schematic::ItemId;

pub const DEFAULT_LINE_WIDTH: i32 = 6;
pub const DEFAULT_BUS_WIDTH: i32 = 12;
pub const DEFAULT_TEXT_SIZE: i32 = 50;
pub const JUNCTION_SIZE: i32 = 40;
pub const NO_CONNECT_SIZE: i32 = 48;
pub const MARKER_SIZE: i32 = 50;

// --- Sheet level items ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineLayer {
    Wire,
    Bus,
    Notes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchLine {
    pub start: Point,
    pub end: Point,
    pub layer: LineLayer,
}

impl SchLine {
    pub fn wire(start: Point, end: Point) -> Self {
        SchLine {
            start,
            end,
            layer: LineLayer::Wire,
        }
    }

    pub fn bus(start: Point, end: Point) -> Self {
        SchLine {
            start,
            end,
            layer: LineLayer::Bus,
        }
    }

    pub fn is_end_point(&self, p: Point) -> bool {
        self.start == p || self.end == p
    }

    pub fn pen_width(&self) -> i32 {
        match self.layer {
            LineLayer::Bus => DEFAULT_BUS_WIDTH,
            _ => DEFAULT_LINE_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEntryKind {
    WireToBus,
    BusToBus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusEntry {
    pub position: Point,
    pub size: Point,
    pub kind: BusEntryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Text,
    Label,
    GlobalLabel,
    HierLabel,
}

/// Free text and the three kinds of net labels.
#[derive(Debug, Clone, PartialEq)]
pub struct SchText {
    pub kind: TextKind,
    pub text: String,
    pub position: Point,
    pub text_size: i32,
}

impl SchText {
    pub fn new(kind: TextKind, text: &str, position: Point) -> Self {
        SchText {
            kind,
            text: text.to_string(),
            position,
            text_size: DEFAULT_TEXT_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Point,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Screen {
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub file_name: String,
    pub position: Point,
    pub size: Point,
    /// Screen drawn inside this sheet. Several sheets may share a screen.
    pub screen: ItemId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetPin {
    pub name: String,
    pub position: Point,
    pub text_size: i32,
}

impl SheetPin {
    pub fn new(name: &str, position: Point) -> Self {
        SheetPin {
            name: name.to_string(),
            position,
            text_size: DEFAULT_TEXT_SIZE,
        }
    }
}

/// A placed library symbol. Its fields are child items.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub lib_name: String,
    pub position: Point,
    pub transform: Transform,
    pub unit: i32,
    pub body_style: i32,
}

impl Component {
    pub fn new(lib_name: &str, position: Point) -> Self {
        Component {
            lib_name: lib_name.to_string(),
            position,
            transform: Transform::default(),
            unit: 1,
            body_style: 1,
        }
    }
}

pub const REFERENCE_FIELD: usize = 0;
pub const VALUE_FIELD: usize = 1;
pub const FOOTPRINT_FIELD: usize = 2;
pub const DATASHEET_FIELD: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: usize,
    pub name: String,
    pub text: String,
    /// Absolute sheet position.
    pub position: Point,
    pub text_size: i32,
}

impl Field {
    pub fn new(id: usize, text: &str, position: Point) -> Self {
        let name = match id {
            REFERENCE_FIELD => "Reference".to_string(),
            VALUE_FIELD => "Value".to_string(),
            FOOTPRINT_FIELD => "Footprint".to_string(),
            DATASHEET_FIELD => "Datasheet".to_string(),
            n => format!("Field{}", n),
        };
        Field {
            id,
            name,
            text: text.to_string(),
            position,
            text_size: DEFAULT_TEXT_SIZE,
        }
    }
}

// --- Library items ---

#[derive(Debug, Clone, PartialEq)]
pub struct LibPart {
    pub name: String,
    pub unit_count: i32,
    pub has_body_style: bool,
}

impl LibPart {
    pub fn new(name: &str) -> Self {
        LibPart {
            name: name.to_string(),
            unit_count: 1,
            has_body_style: false,
        }
    }

    /// Unit letter appended to references of multi-unit symbols (1 → "A").
    pub fn sub_reference(unit: i32) -> String {
        if unit < 1 {
            return String::new();
        }
        let mut n = unit - 1;
        let mut out = Vec::new();
        loop {
            out.push((b'A' + (n % 26) as u8) as char);
            n = n / 26 - 1;
            if n < 0 {
                break;
            }
        }
        out.iter().rev().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibRectangle {
    pub start: Point,
    pub end: Point,
    pub width: i32,
    pub unit: i32,
    pub body_style: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibText {
    pub text: String,
    pub position: Point,
    pub text_size: i32,
    pub unit: i32,
    pub body_style: i32,
}

// --- Tagged item ---

#[derive(Debug, Clone, PartialEq)]
pub enum SchItem {
    Screen(Screen),
    Sheet(Sheet),
    SheetPin(SheetPin),
    Component(Component),
    Field(Field),
    Line(SchLine),
    Junction(Point),
    NoConnect(Point),
    BusEntry(BusEntry),
    Text(SchText),
    Marker(Marker),
    LibPart(LibPart),
    LibPin(LibPin),
    LibRectangle(LibRectangle),
    LibText(LibText),
}

impl SchItem {
    pub fn kind(&self) -> KicadType {
        match self {
            SchItem::Screen(_) => KicadType::Screen,
            SchItem::Sheet(_) => KicadType::Sheet,
            SchItem::SheetPin(_) => KicadType::SheetPin,
            SchItem::Component(_) => KicadType::Component,
            SchItem::Field(_) => KicadType::Field,
            SchItem::Line(_) => KicadType::Line,
            SchItem::Junction(_) => KicadType::Junction,
            SchItem::NoConnect(_) => KicadType::NoConnect,
            SchItem::BusEntry(entry) => match entry.kind {
                BusEntryKind::WireToBus => KicadType::BusWireEntry,
                BusEntryKind::BusToBus => KicadType::BusBusEntry,
            },
            SchItem::Text(text) => match text.kind {
                TextKind::Text => KicadType::Text,
                TextKind::Label => KicadType::Label,
                TextKind::GlobalLabel => KicadType::GlobalLabel,
                TextKind::HierLabel => KicadType::HierLabel,
            },
            SchItem::Marker(_) => KicadType::Marker,
            SchItem::LibPart(_) => KicadType::LibPart,
            SchItem::LibPin(_) => KicadType::LibPin,
            SchItem::LibRectangle(_) => KicadType::LibRectangle,
            SchItem::LibText(_) => KicadType::LibText,
        }
    }

    /// Items living inside a library symbol rather than on a sheet.
    pub fn is_library_item(&self) -> bool {
        self.kind().is_lib_item() || self.kind() == KicadType::LibPart
    }

    pub fn position(&self) -> Point {
        match self {
            SchItem::Screen(_) | SchItem::LibPart(_) => Point::ZERO,
            SchItem::Sheet(sheet) => sheet.position,
            SchItem::SheetPin(pin) => pin.position,
            SchItem::Component(comp) => comp.position,
            SchItem::Field(field) => field.position,
            SchItem::Line(line) => line.start,
            SchItem::Junction(p) | SchItem::NoConnect(p) => *p,
            SchItem::BusEntry(entry) => entry.position,
            SchItem::Text(text) => text.position,
            SchItem::Marker(marker) => marker.position,
            SchItem::LibPin(pin) => pin.position,
            SchItem::LibRectangle(rect) => rect.start,
            SchItem::LibText(text) => text.position,
        }
    }

    /// Unit and body style of a library item, `None` for sheet items.
    pub fn unit_and_body_style(&self) -> Option<(i32, i32)> {
        match self {
            SchItem::LibPin(pin) => Some((pin.unit, pin.body_style)),
            SchItem::LibRectangle(rect) => Some((rect.unit, rect.body_style)),
            SchItem::LibText(text) => Some((text.unit, text.body_style)),
            _ => None,
        }
    }

    /// Extent of the item. Library items are placed with the default
    /// symbol transform. Components report only their anchor here; the
    /// document resolves their body from the library.
    pub fn bounding_box(&self) -> Rect {
        let lib = Transform::default();
        match self {
            SchItem::Screen(_) | SchItem::LibPart(_) => Rect::default(),
            SchItem::Sheet(sheet) => Rect::new(sheet.position, sheet.size),
            SchItem::SheetPin(pin) => text_box(pin.position, &pin.name, pin.text_size),
            SchItem::Component(comp) => Rect::at(comp.position),
            SchItem::Field(field) => text_box(field.position, &field.text, field.text_size),
            SchItem::Line(line) => {
                Rect::from_corners(line.start, line.end).inflate(line.pen_width() / 2)
            }
            SchItem::Junction(p) => Rect::at(*p).inflate(JUNCTION_SIZE / 2),
            SchItem::NoConnect(p) => {
                Rect::at(*p).inflate((DEFAULT_LINE_WIDTH + NO_CONNECT_SIZE) / 2)
            }
            SchItem::BusEntry(entry) => {
                Rect::from_corners(entry.position, entry.position + entry.size)
            }
            SchItem::Text(text) => text_box(text.position, &text.text, text.text_size),
            SchItem::Marker(marker) => Rect::from_corners(
                marker.position,
                marker.position + Point::new(MARKER_SIZE, -MARKER_SIZE),
            ),
            SchItem::LibPin(pin) => pin.bounding_box(&lib),
            SchItem::LibRectangle(rect) => {
                Rect::from_corners(lib.apply(rect.start), lib.apply(rect.end))
            }
            SchItem::LibText(text) => text_box(lib.apply(text.position), &text.text, text.text_size),
        }
    }

    /// Hit test at `pos` with `accuracy` in internal units. Components are
    /// tested by the document, which knows their library body.
    pub fn hit_test(&self, pos: Point, accuracy: i32) -> bool {
        let accuracy = accuracy.max(0);
        match self {
            SchItem::Screen(_) | SchItem::LibPart(_) => false,
            SchItem::Line(line) => {
                test_segment_hit(pos, line.start, line.end, accuracy + line.pen_width() / 2)
            }
            SchItem::BusEntry(entry) => test_segment_hit(
                pos,
                entry.position,
                entry.position + entry.size,
                accuracy + DEFAULT_LINE_WIDTH / 2,
            ),
            SchItem::NoConnect(p) => {
                let delta = (DEFAULT_LINE_WIDTH + NO_CONNECT_SIZE) / 2 + accuracy;
                let dist = (*p - pos).abs();
                dist.x <= delta && dist.y <= delta
            }
            SchItem::LibPin(pin) => pin.hit_test(pos, accuracy, &Transform::default()),
            SchItem::LibRectangle(rect) => {
                // Only the outline is selectable.
                let lib = Transform::default();
                let (a, c) = (lib.apply(rect.start), lib.apply(rect.end));
                let (b, d) = (Point::new(c.x, a.y), Point::new(a.x, c.y));
                let accuracy = accuracy + rect.width.max(DEFAULT_LINE_WIDTH) / 2;
                [(a, b), (b, c), (c, d), (d, a)]
                    .iter()
                    .any(|(s, e)| test_segment_hit(pos, *s, *e, accuracy))
            }
            _ => self.bounding_box().inflate(accuracy).contains(pos),
        }
    }

    /// Short description used in selection menus and find results.
    pub fn select_menu_text(&self, units: Units) -> String {
        match self {
            SchItem::Screen(screen) => format!("Screen {}", screen.file_name),
            SchItem::Sheet(sheet) => format!("Hierarchical Sheet {}", sheet.name),
            SchItem::SheetPin(pin) => format!("Hierarchical Sheet Pin {}", pin.name),
            SchItem::Component(comp) => format!("Symbol {}", comp.lib_name),
            SchItem::Field(field) => format!("Field {} {}", field.name, field.text),
            SchItem::Line(line) => {
                let what = match line.layer {
                    LineLayer::Wire => "Wire",
                    LineLayer::Bus => "Bus",
                    LineLayer::Notes => "Graphic Line",
                };
                format!(
                    "{} from {} to {}",
                    what,
                    units.format_point(line.start),
                    units.format_point(line.end)
                )
            }
            SchItem::Junction(p) => format!("Junction at {}", units.format_point(*p)),
            SchItem::NoConnect(p) => format!("No Connect at {}", units.format_point(*p)),
            SchItem::BusEntry(entry) => match entry.kind {
                BusEntryKind::WireToBus => "Bus to Wire Entry".to_string(),
                BusEntryKind::BusToBus => "Bus to Bus Entry".to_string(),
            },
            SchItem::Text(text) => {
                let what = match text.kind {
                    TextKind::Text => "Graphic Text",
                    TextKind::Label => "Label",
                    TextKind::GlobalLabel => "Global Label",
                    TextKind::HierLabel => "Hierarchical Label",
                };
                format!("{} {}", what, text.text)
            }
            SchItem::Marker(marker) => format!("ERC Marker: {}", marker.message),
            SchItem::LibPart(part) => format!("Symbol {}", part.name),
            SchItem::LibPin(pin) => pin.select_menu_text(),
            SchItem::LibRectangle(rect) => format!(
                "Rectangle from {} to {}",
                units.format_point(rect.start),
                units.format_point(rect.end)
            ),
            SchItem::LibText(text) => format!("Graphic Text {}", text.text),
        }
    }
}
