#![allow(dead_code)]

use eeschema_collectors::geometry::Point;
use eeschema_collectors::items::*;
use eeschema_collectors::pin::{ElectricalType, LibPin, PinOrientation};
use eeschema_collectors::schematic::{ItemId, Schematic};

pub struct Fixture {
    pub schematic: Schematic,
    pub wire_a: ItemId,
    pub wire_b: ItemId,
    pub junction: ItemId,
    pub label: ItemId,
    pub opamp: ItemId,
    pub u1: ItemId,
    pub power_sheet: ItemId,
    pub power_screen: ItemId,
    pub sheet_pin: ItemId,
    pub vcc_label: ItemId,
    pub r1: ItemId,
    pub pin_in: ItemId,
    pub pin_out: ItemId,
}

pub fn pin(name: &str, number: &str, x: i32, y: i32, orientation: PinOrientation, unit: i32) -> LibPin {
    let mut pin = LibPin::new(name, number, Point::new(x, y));
    pin.orientation = orientation;
    pin.unit = unit;
    pin
}

/// Root sheet with two wires, a junction, a label, an opamp (U1) and a
/// "Power" sub-sheet holding a VCC global label and a resistor (R1).
pub fn build() -> Fixture {
    let mut schematic = Schematic::new();
    let root = schematic.root_screen();

    // --- Library ---
    let opamp = schematic.add_lib_part(LibPart {
        name: "OPAMP".to_string(),
        unit_count: 2,
        has_body_style: false,
    });
    let pin_in = schematic
        .add(opamp, SchItem::LibPin(pin("IN+", "3", -300, 100, PinOrientation::Right, 1)))
        .unwrap();
    let pin_out = schematic
        .add(opamp, SchItem::LibPin(pin("OUT", "1", 300, 0, PinOrientation::Left, 1)))
        .unwrap();
    let mut vplus = pin("V+", "8", 0, 300, PinOrientation::Down, 0);
    vplus.visible = false;
    vplus.electrical_type = ElectricalType::PowerIn;
    schematic.add(opamp, SchItem::LibPin(vplus)).unwrap();
    schematic
        .add(
            opamp,
            SchItem::LibRectangle(LibRectangle {
                start: Point::new(-200, 200),
                end: Point::new(200, -200),
                width: 0,
                unit: 0,
                body_style: 0,
            }),
        )
        .unwrap();

    let resistor = schematic.add_lib_part(LibPart::new("R"));
    schematic
        .add(resistor, SchItem::LibPin(pin("~", "1", 0, 150, PinOrientation::Down, 0)))
        .unwrap();
    schematic
        .add(resistor, SchItem::LibPin(pin("~", "2", 0, -150, PinOrientation::Up, 0)))
        .unwrap();

    // --- Root sheet ---
    let wire_a = schematic
        .add(root, SchItem::Line(SchLine::wire(Point::new(0, 0), Point::new(1000, 0))))
        .unwrap();
    let wire_b = schematic
        .add(root, SchItem::Line(SchLine::wire(Point::new(1000, 0), Point::new(1000, 1000))))
        .unwrap();
    let junction = schematic.add(root, SchItem::Junction(Point::new(500, 0))).unwrap();
    let label = schematic
        .add(root, SchItem::Text(SchText::new(TextKind::Label, "NET_A", Point::new(200, -10))))
        .unwrap();
    let u1 = schematic
        .add_component(root, Component::new("OPAMP", Point::new(2000, 2000)), "U1", "LM358")
        .unwrap();

    let (power_sheet, power_screen) = schematic
        .add_sheet(root, "Power", "power.sch", Point::new(4000, 0), Point::new(1000, 1000))
        .unwrap();
    let sheet_pin = schematic
        .add(power_sheet, SchItem::SheetPin(SheetPin::new("VIN", Point::new(4000, 500))))
        .unwrap();

    // --- Power sheet ---
    let vcc_label = schematic
        .add(
            power_screen,
            SchItem::Text(SchText::new(TextKind::GlobalLabel, "VCC", Point::new(100, 100))),
        )
        .unwrap();
    let r1 = schematic
        .add_component(power_screen, Component::new("R", Point::new(500, 500)), "R1", "10k")
        .unwrap();

    Fixture {
        schematic,
        wire_a,
        wire_b,
        junction,
        label,
        opamp,
        u1,
        power_sheet,
        power_screen,
        sheet_pin,
        vcc_label,
        r1,
        pin_in,
        pin_out,
    }
}
