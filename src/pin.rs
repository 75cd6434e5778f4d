// src/pin.rs

use crate::error::{Error, Result};
use crate::find_replace::TextMatcher;
use crate::geometry::{Point, Rect, Transform};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// Circle diameter drawn at the active end of pins.
pub const TARGET_PIN_RADIUS: i32 = 12;

pub const DEFAULT_PIN_LENGTH: i32 = 300;
pub const DEFAULT_PIN_TEXT_SIZE: i32 = 50;

// --- Electrical type ---

/// Electrical role of a pin, used by ERC and netlisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectricalType {
    Input,
    Output,
    Bidirectional,
    Tristate,
    Passive,
    #[default]
    Unspecified,
    PowerIn,
    PowerOut,
    OpenCollector,
    OpenEmitter,
    NoConnect,
}

impl ElectricalType {
    pub const ALL: [ElectricalType; 11] = [
        ElectricalType::Input,
        ElectricalType::Output,
        ElectricalType::Bidirectional,
        ElectricalType::Tristate,
        ElectricalType::Passive,
        ElectricalType::Unspecified,
        ElectricalType::PowerIn,
        ElectricalType::PowerOut,
        ElectricalType::OpenCollector,
        ElectricalType::OpenEmitter,
        ElectricalType::NoConnect,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Locale invariant name, as written in netlists.
    pub fn canonical_name(self) -> &'static str {
        CANONICAL_TYPE_NAMES[self.index()]
    }

    /// Name shown to the user.
    pub fn display_name(self) -> &'static str {
        TYPE_DISPLAY_NAMES[self.index()]
    }
}

const CANONICAL_TYPE_NAMES: [&str; 11] = [
    "input",
    "output",
    "BiDi",
    "3state",
    "passive",
    "unspc",
    "power_in",
    "power_out",
    "openCol",
    "openEm",
    "NotConnected",
];

const TYPE_DISPLAY_NAMES: [&str; 11] = [
    "Input",
    "Output",
    "Bidirectional",
    "Tri-state",
    "Passive",
    "Unspecified",
    "Power input",
    "Power output",
    "Open collector",
    "Open emitter",
    "Not connected",
];

const UNKNOWN_TYPE_NAME: &str = "???";

impl FromStr for ElectricalType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CANONICAL_TYPE_NAMES
            .iter()
            .position(|name| *name == s)
            .and_then(ElectricalType::from_index)
            .ok_or_else(|| Error::ParseError(format!("Unknown pin electrical type '{}'", s)))
    }
}

impl fmt::Display for ElectricalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Canonical name for an electrical type index, `"???"` when out of range.
pub fn canonical_electrical_type_name(index: usize) -> &'static str {
    CANONICAL_TYPE_NAMES
        .get(index)
        .copied()
        .unwrap_or(UNKNOWN_TYPE_NAME)
}

/// Display name for an electrical type index, `"???"` when out of range.
pub fn electrical_type_name(index: usize) -> &'static str {
    TYPE_DISPLAY_NAMES
        .get(index)
        .copied()
        .unwrap_or(UNKNOWN_TYPE_NAME)
}

pub fn electrical_type_names() -> Vec<&'static str> {
    TYPE_DISPLAY_NAMES.to_vec()
}

// --- Orientation ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinOrientation {
    #[default]
    Right,
    Left,
    Up,
    Down,
}

const ORIENTATIONS: [PinOrientation; 4] = [
    PinOrientation::Right,
    PinOrientation::Left,
    PinOrientation::Up,
    PinOrientation::Down,
];

impl PinOrientation {
    pub fn code(self) -> char {
        match self {
            PinOrientation::Right => 'R',
            PinOrientation::Left => 'L',
            PinOrientation::Up => 'U',
            PinOrientation::Down => 'D',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        ORIENTATIONS.iter().copied().find(|o| o.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            PinOrientation::Right => "Right",
            PinOrientation::Left => "Left",
            PinOrientation::Up => "Up",
            PinOrientation::Down => "Down",
        }
    }

    /// Direction from the pin position towards its end, library Y axis up.
    pub fn direction(self) -> Point {
        match self {
            PinOrientation::Right => Point::new(1, 0),
            PinOrientation::Left => Point::new(-1, 0),
            PinOrientation::Up => Point::new(0, 1),
            PinOrientation::Down => Point::new(0, -1),
        }
    }

    fn rotated_ccw(self) -> Self {
        match self {
            PinOrientation::Right => PinOrientation::Up,
            PinOrientation::Up => PinOrientation::Left,
            PinOrientation::Left => PinOrientation::Down,
            PinOrientation::Down => PinOrientation::Right,
        }
    }

    fn rotated_cw(self) -> Self {
        match self {
            PinOrientation::Right => PinOrientation::Down,
            PinOrientation::Down => PinOrientation::Left,
            PinOrientation::Left => PinOrientation::Up,
            PinOrientation::Up => PinOrientation::Right,
        }
    }
}

pub fn orientation_names() -> Vec<&'static str> {
    ORIENTATIONS.iter().map(|o| o.name()).collect()
}

/// Orientation code at `index`; `'R'` when the index is out of range.
pub fn orientation_code(index: usize) -> char {
    ORIENTATIONS
        .get(index)
        .copied()
        .unwrap_or_default()
        .code()
}

pub fn orientation_code_index(code: char) -> Option<usize> {
    ORIENTATIONS.iter().position(|o| o.code() == code)
}

// --- Shape ---

/// Bitmask of the decorations drawn on a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PinShape(pub u32);

impl PinShape {
    pub const NONE: PinShape = PinShape(0);
    pub const INVERT: PinShape = PinShape(0x01);
    pub const CLOCK: PinShape = PinShape(0x02);
    pub const LOWLEVEL_IN: PinShape = PinShape(0x04);
    pub const LOWLEVEL_OUT: PinShape = PinShape(0x08);
    /// Inverted clock as drawn in Eastern Block conventions.
    pub const CLOCK_FALL: PinShape = PinShape(0x10);
    pub const NONLOGIC: PinShape = PinShape(0x20);

    pub fn contains(self, other: PinShape) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn name(self) -> &'static str {
        style_code_index(self)
            .map(|i| PIN_STYLES[i].1)
            .unwrap_or("Line")
    }
}

impl BitOr for PinShape {
    type Output = PinShape;

    fn bitor(self, rhs: PinShape) -> PinShape {
        PinShape(self.0 | rhs.0)
    }
}

impl BitOrAssign for PinShape {
    fn bitor_assign(&mut self, rhs: PinShape) {
        self.0 |= rhs.0;
    }
}

const PIN_STYLES: [(PinShape, &str); 9] = [
    (PinShape::NONE, "Line"),
    (PinShape::INVERT, "Inverted"),
    (PinShape::CLOCK, "Clock"),
    (PinShape(0x01 | 0x02), "Inverted clock"),
    (PinShape::LOWLEVEL_IN, "Input low"),
    (PinShape(0x04 | 0x02), "Clock low"),
    (PinShape::LOWLEVEL_OUT, "Output low"),
    (PinShape::CLOCK_FALL, "Falling edge clock"),
    (PinShape::NONLOGIC, "NonLogic"),
];

pub fn style_names() -> Vec<&'static str> {
    PIN_STYLES.iter().map(|(_, name)| *name).collect()
}

/// Style code at `index`; `PinShape::NONE` when the index is out of range.
pub fn style_code(index: usize) -> PinShape {
    PIN_STYLES
        .get(index)
        .map(|(code, _)| *code)
        .unwrap_or(PinShape::NONE)
}

pub fn style_code_index(code: PinShape) -> Option<usize> {
    PIN_STYLES.iter().position(|(c, _)| *c == code)
}

// --- Pin number ---

/// Pin number packed as 4 ASCII bytes ("12" is stored as `b"12\0\0"`).
/// Packing is little endian: the last character is the most significant
/// byte. Shorter numbers sort before longer ones, but numbers of the same
/// length compare from their last character ("12" > "21"), so the order is
/// not numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PinNumber(u32);

impl PinNumber {
    pub fn new(number: &str) -> Self {
        let mut bytes = [0u8; 4];
        for (slot, c) in bytes.iter_mut().zip(number.chars()) {
            *slot = if c.is_ascii() { c as u8 } else { b'?' };
        }
        PinNumber(u32::from_le_bytes(bytes))
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn as_string(self) -> String {
        self.0
            .to_le_bytes()
            .iter()
            .take_while(|b| **b != 0)
            .map(|b| *b as char)
            .collect()
    }
}

impl fmt::Display for PinNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

// --- Pin ---

/// A terminal of a library symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct LibPin {
    pub position: Point,
    pub length: i32,
    pub orientation: PinOrientation,
    pub shape: PinShape,
    /// Line width, 0 uses the default pen.
    pub width: i32,
    pub electrical_type: ElectricalType,
    pub visible: bool,
    pub name: String,
    number: PinNumber,
    pub name_text_size: i32,
    pub number_text_size: i32,
    /// Unit the pin belongs to, 0 when common to all units.
    pub unit: i32,
    /// Body style (De Morgan conversion), 0 when common to all.
    pub body_style: i32,
    pub(crate) edit_marked: bool,
}

impl Default for LibPin {
    fn default() -> Self {
        LibPin {
            position: Point::ZERO,
            length: DEFAULT_PIN_LENGTH,
            orientation: PinOrientation::Right,
            shape: PinShape::NONE,
            width: 0,
            electrical_type: ElectricalType::Unspecified,
            visible: true,
            name: "~".to_string(),
            number: PinNumber::default(),
            name_text_size: DEFAULT_PIN_TEXT_SIZE,
            number_text_size: DEFAULT_PIN_TEXT_SIZE,
            unit: 0,
            body_style: 0,
            edit_marked: false,
        }
    }
}

impl LibPin {
    pub fn new(name: &str, number: &str, position: Point) -> Self {
        LibPin {
            name: name.to_string(),
            number: PinNumber::new(number),
            position,
            ..Default::default()
        }
    }

    pub fn number(&self) -> PinNumber {
        self.number
    }

    pub fn number_string(&self) -> String {
        self.number.as_string()
    }

    pub fn set_number(&mut self, number: &str) {
        self.number = PinNumber::new(number);
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Hidden power input pins connect implicitly to the net named after them.
    pub fn is_power_connection(&self) -> bool {
        !self.visible && self.electrical_type == ElectricalType::PowerIn
    }

    pub fn canonical_electrical_type_name(&self) -> &'static str {
        self.electrical_type.canonical_name()
    }

    pub fn electrical_type_name(&self) -> &'static str {
        self.electrical_type.display_name()
    }

    /// End of the pin away from the connection point, in library coordinates.
    pub fn pin_end_point(&self) -> Point {
        self.position + self.orientation.direction() * self.length
    }

    /// Orientation of the pin once `transform` (rotation, mirror) is applied.
    pub fn pin_draw_orient(&self, transform: &Transform) -> PinOrientation {
        // Result is in sheet directions, where Y points down.
        let end = transform.apply(self.orientation.direction());
        if end.x == 0 {
            if end.y > 0 {
                PinOrientation::Down
            } else {
                PinOrientation::Up
            }
        } else if end.x < 0 {
            PinOrientation::Left
        } else {
            PinOrientation::Right
        }
    }

    pub fn bounding_box(&self, transform: &Transform) -> Rect {
        let begin = transform.apply(self.position);
        let end = transform.apply(self.pin_end_point());
        Rect::from_corners(begin, end).inflate(TARGET_PIN_RADIUS / 2)
    }

    pub fn hit_test(&self, pos: Point, threshold: i32, transform: &Transform) -> bool {
        self.bounding_box(transform)
            .inflate(threshold.max(0))
            .contains(pos)
    }

    /// Cycle the orientation counter clockwise without moving the pin.
    pub fn rotate(&mut self) {
        self.orientation = self.orientation.rotated_ccw();
    }

    /// Rotate the pin by 90 degrees around `center`.
    pub fn rotate_about(&mut self, center: Point, ccw: bool) {
        let rel = self.position - center;
        if ccw {
            self.position = center + Point::new(-rel.y, rel.x);
            self.orientation = self.orientation.rotated_ccw();
        } else {
            self.position = center + Point::new(rel.y, -rel.x);
            self.orientation = self.orientation.rotated_cw();
        }
    }

    pub fn mirror_horizontal(&mut self, center: Point) {
        self.position.x = 2 * center.x - self.position.x;
        self.orientation = match self.orientation {
            PinOrientation::Right => PinOrientation::Left,
            PinOrientation::Left => PinOrientation::Right,
            other => other,
        };
    }

    pub fn mirror_vertical(&mut self, center: Point) {
        self.position.y = 2 * center.y - self.position.y;
        self.orientation = match self.orientation {
            PinOrientation::Up => PinOrientation::Down,
            PinOrientation::Down => PinOrientation::Up,
            other => other,
        };
    }

    pub fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    pub fn offset(&mut self, delta: Point) {
        self.position += delta;
    }

    /// Pins are found by name or number, and only when the search asks for pins.
    pub fn matches(&self, matcher: &TextMatcher) -> bool {
        matcher.search_all_pins()
            && (matcher.is_match(&self.name) || matcher.is_match(&self.number_string()))
    }

    /// Sort order: number, name (case insensitive), X, then Y.
    pub fn compare(&self, other: &LibPin) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.name.to_lowercase().cmp(&other.name.to_lowercase()))
            .then_with(|| self.position.x.cmp(&other.position.x))
            .then_with(|| self.position.y.cmp(&other.position.y))
    }

    pub fn select_menu_text(&self) -> String {
        format!(
            "Pin {} [{}, {}, {}]",
            self.number_string(),
            self.name,
            self.electrical_type_name(),
            self.shape.name()
        )
    }
}
