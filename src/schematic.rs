// src/schematic.rs

use crate::error::{Error, Result};
use crate::find_replace::TextMatcher;
use crate::geometry::{Point, Rect, Units};
use crate::items::*;
use crate::kicad_types::{KicadType, SearchResult, active_types};
use crate::pin::{ElectricalType, LibPin, PinOrientation, PinShape};
use crate::sheet_path::SheetPath;
use log::{debug, warn};

/// Handle to an item of a [`Schematic`]. Ids are never reused, so a handle
/// to a removed item simply resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(usize);

#[derive(Debug, Clone)]
pub struct Node {
    pub item: SchItem,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
}

impl Node {
    pub fn kind(&self) -> KicadType {
        self.item.kind()
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub fn children(&self) -> &[ItemId] {
        &self.children
    }
}

/// Examines items handed out by [`Schematic::visit`].
pub trait Inspector {
    fn inspect(&mut self, schematic: &Schematic, id: ItemId) -> SearchResult;
}

/// Attribute change applied to a pin and, except for the number, to every
/// pin marked by [`Schematic::enable_pin_edit_mode`].
#[derive(Debug, Clone, PartialEq)]
pub enum PinEdit {
    Name(String),
    Number(String),
    NameTextSize(i32),
    NumberTextSize(i32),
    Orientation(PinOrientation),
    Shape(PinShape),
    ElectricalType(ElectricalType),
    Length(i32),
    Visible(bool),
}

impl PinEdit {
    fn apply(&self, pin: &mut LibPin) {
        match self {
            PinEdit::Name(name) => pin.name = name.clone(),
            PinEdit::Number(number) => pin.set_number(number),
            PinEdit::NameTextSize(size) => pin.name_text_size = *size,
            PinEdit::NumberTextSize(size) => pin.number_text_size = *size,
            PinEdit::Orientation(orientation) => pin.orientation = *orientation,
            PinEdit::Shape(shape) => pin.shape = *shape,
            PinEdit::ElectricalType(kind) => pin.electrical_type = *kind,
            PinEdit::Length(length) => pin.length = *length,
            PinEdit::Visible(visible) => pin.visible = *visible,
        }
    }

    fn is_shared(&self) -> bool {
        !matches!(self, PinEdit::Number(_))
    }
}

/// The document tree: sheets, their screens, the items drawn on them and
/// the library symbols placed components refer to.
#[derive(Debug, Clone)]
pub struct Schematic {
    nodes: Vec<Option<Node>>,
    root_sheet: ItemId,
    root_screen: ItemId,
    lib_parts: Vec<ItemId>,
    lib_hash: u64,
}

impl Default for Schematic {
    fn default() -> Self {
        Self::new()
    }
}

impl Schematic {
    pub fn new() -> Self {
        let mut schematic = Schematic {
            nodes: Vec::new(),
            root_sheet: ItemId(0),
            root_screen: ItemId(0),
            lib_parts: Vec::new(),
            lib_hash: 0,
        };
        let screen = schematic.insert(
            None,
            SchItem::Screen(Screen {
                file_name: "root.sch".to_string(),
            }),
        );
        let sheet = schematic.insert(
            None,
            SchItem::Sheet(Sheet {
                name: String::new(),
                file_name: "root.sch".to_string(),
                position: Point::ZERO,
                size: Point::ZERO,
                screen,
            }),
        );
        schematic.root_screen = screen;
        schematic.root_sheet = sheet;
        schematic
    }

    pub fn root_sheet(&self) -> ItemId {
        self.root_sheet
    }

    pub fn root_screen(&self) -> ItemId {
        self.root_screen
    }

    /// Version stamp of the symbol libraries; changes on every library edit.
    pub fn lib_hash(&self) -> u64 {
        self.lib_hash
    }

    pub fn lib_parts(&self) -> &[ItemId] {
        &self.lib_parts
    }

    pub fn get(&self, id: ItemId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(|n| n.as_ref())
    }

    pub fn item(&self, id: ItemId) -> Option<&SchItem> {
        self.get(id).map(|n| &n.item)
    }

    /// Mutable access to an item. Touching a library item invalidates
    /// anything computed from the libraries.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut SchItem> {
        let is_lib = self.item(id)?.is_library_item();
        if is_lib {
            self.bump_lib_hash();
        }
        self.nodes
            .get_mut(id.0)
            .and_then(|n| n.as_mut())
            .map(|n| &mut n.item)
    }

    pub fn kind(&self, id: ItemId) -> Option<KicadType> {
        self.item(id).map(SchItem::kind)
    }

    fn bump_lib_hash(&mut self) {
        self.lib_hash = self.lib_hash.wrapping_add(1);
    }

    fn insert(&mut self, parent: Option<ItemId>, item: SchItem) -> ItemId {
        let id = ItemId(self.nodes.len());
        self.nodes.push(Some(Node {
            item,
            parent,
            children: Vec::new(),
        }));
        if let Some(parent) = parent {
            if let Some(Some(node)) = self.nodes.get_mut(parent.0) {
                node.children.push(id);
            }
        }
        id
    }

    /// Add `item` as the last child of `parent`.
    pub fn add(&mut self, parent: ItemId, item: SchItem) -> Result<ItemId> {
        let parent_kind = self
            .kind(parent)
            .ok_or_else(|| Error::MissingData(format!("Parent item {:?} does not exist", parent)))?;
        let kind = item.kind();

        let allowed = match parent_kind {
            KicadType::Screen => matches!(
                kind,
                KicadType::Sheet
                    | KicadType::Component
                    | KicadType::Line
                    | KicadType::Junction
                    | KicadType::NoConnect
                    | KicadType::BusWireEntry
                    | KicadType::BusBusEntry
                    | KicadType::Text
                    | KicadType::Label
                    | KicadType::GlobalLabel
                    | KicadType::HierLabel
                    | KicadType::Marker
            ),
            KicadType::Component => kind == KicadType::Field,
            KicadType::Sheet => kind == KicadType::SheetPin,
            KicadType::LibPart => kind.is_lib_item(),
            _ => false,
        };
        if !allowed {
            return Err(Error::Unsupported(format!(
                "{} cannot contain {}",
                parent_kind, kind
            )));
        }

        if let SchItem::Sheet(sheet) = &item {
            if self.kind(sheet.screen) != Some(KicadType::Screen) {
                return Err(Error::MissingData(format!(
                    "Sheet '{}' refers to a missing screen",
                    sheet.name
                )));
            }
        }

        if parent_kind == KicadType::LibPart {
            self.bump_lib_hash();
        }
        Ok(self.insert(Some(parent), item))
    }

    /// Create a sub-sheet on `screen` together with its own new screen.
    pub fn add_sheet(
        &mut self,
        screen: ItemId,
        name: &str,
        file_name: &str,
        position: Point,
        size: Point,
    ) -> Result<(ItemId, ItemId)> {
        if self.kind(screen) != Some(KicadType::Screen) {
            return Err(Error::MissingData(format!(
                "Item {:?} is not a screen",
                screen
            )));
        }
        let sub_screen = self.insert(
            None,
            SchItem::Screen(Screen {
                file_name: file_name.to_string(),
            }),
        );
        let sheet = self.add(
            screen,
            SchItem::Sheet(Sheet {
                name: name.to_string(),
                file_name: file_name.to_string(),
                position,
                size,
                screen: sub_screen,
            }),
        )?;
        Ok((sheet, sub_screen))
    }

    /// Place a component with reference and value fields.
    pub fn add_component(
        &mut self,
        screen: ItemId,
        component: Component,
        reference: &str,
        value: &str,
    ) -> Result<ItemId> {
        let pos = component.position;
        let id = self.add(screen, SchItem::Component(component))?;
        self.add(
            id,
            SchItem::Field(Field::new(REFERENCE_FIELD, reference, pos + Point::new(0, -100))),
        )?;
        self.add(
            id,
            SchItem::Field(Field::new(VALUE_FIELD, value, pos + Point::new(0, 100))),
        )?;
        Ok(id)
    }

    pub fn add_lib_part(&mut self, part: LibPart) -> ItemId {
        let id = self.insert(None, SchItem::LibPart(part));
        self.lib_parts.push(id);
        self.bump_lib_hash();
        id
    }

    pub fn lib_part_by_name(&self, name: &str) -> Option<ItemId> {
        self.lib_parts.iter().copied().find(|id| {
            matches!(self.item(*id), Some(SchItem::LibPart(part)) if part.name == name)
        })
    }

    /// Library symbol a component was placed from.
    pub fn component_part(&self, component: ItemId) -> Option<ItemId> {
        match self.item(component)? {
            SchItem::Component(comp) => self.lib_part_by_name(&comp.lib_name),
            _ => None,
        }
    }

    /// Library pins drawn for the component's unit and body style.
    pub fn component_pins(&self, component: ItemId) -> Vec<(ItemId, &LibPin)> {
        let Some(SchItem::Component(comp)) = self.item(component) else {
            return Vec::new();
        };
        let Some(part) = self.component_part(component).and_then(|id| self.get(id)) else {
            return Vec::new();
        };
        part.children
            .iter()
            .filter_map(|id| match self.item(*id) {
                Some(SchItem::LibPin(pin))
                    if (pin.unit == 0 || pin.unit == comp.unit)
                        && (pin.body_style == 0 || pin.body_style == comp.body_style) =>
                {
                    Some((*id, pin))
                }
                _ => None,
            })
            .collect()
    }

    pub fn field(&self, component: ItemId, field_id: usize) -> Option<&Field> {
        self.get(component)?
            .children
            .iter()
            .find_map(|id| match self.item(*id) {
                Some(SchItem::Field(field)) if field.id == field_id => Some(field),
                _ => None,
            })
    }

    /// Reference of a component, with the unit letter for multi-unit symbols.
    pub fn component_reference(&self, component: ItemId) -> Option<String> {
        let Some(SchItem::Component(comp)) = self.item(component) else {
            return None;
        };
        let mut reference = self.field(component, REFERENCE_FIELD)?.text.clone();
        if let Some(SchItem::LibPart(part)) = self.component_part(component).and_then(|id| self.item(id)) {
            if part.unit_count > 1 {
                reference.push_str(&LibPart::sub_reference(comp.unit));
            }
        }
        Some(reference)
    }

    /// Remove an item and everything below it. The roots cannot be removed.
    pub fn remove(&mut self, id: ItemId) -> Option<SchItem> {
        if id == self.root_sheet || id == self.root_screen {
            warn!("Refusing to remove the root sheet or screen");
            return None;
        }
        let node = self.nodes.get_mut(id.0)?.take()?;
        if let Some(parent) = node.parent {
            if let Some(Some(parent_node)) = self.nodes.get_mut(parent.0) {
                parent_node.children.retain(|c| *c != id);
            }
        }
        let mut lib_changed = node.item.is_library_item();
        let mut stack = node.children.clone();
        while let Some(child) = stack.pop() {
            if let Some(child_node) = self.nodes.get_mut(child.0).and_then(|n| n.take()) {
                lib_changed |= child_node.item.is_library_item();
                stack.extend(child_node.children);
            }
        }
        self.lib_parts.retain(|p| *p != id);
        if lib_changed {
            self.bump_lib_hash();
        }
        Some(node.item)
    }

    /// Descendants of `root` in document (pre-) order, `root` excluded.
    pub fn descendants(&self, root: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let Some(node) = self.get(root) else {
            return out;
        };
        let mut stack: Vec<ItemId> = node.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                out.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Hand every descendant of `root` whose type is in `filter` to
    /// `inspector`. Types are visited in filter order, so earlier types take
    /// priority; within a type the order is document order.
    pub fn visit(
        &self,
        root: ItemId,
        filter: &[KicadType],
        inspector: &mut dyn Inspector,
    ) -> SearchResult {
        let items = self.descendants(root);
        for wanted in active_types(filter) {
            for id in &items {
                let Some(kind) = self.kind(*id) else {
                    continue;
                };
                if (*wanted == KicadType::LocateAny || *wanted == kind)
                    && inspector.inspect(self, *id) == SearchResult::Quit
                {
                    return SearchResult::Quit;
                }
            }
        }
        SearchResult::Continue
    }

    /// Body of a placed component: its library items transformed onto the sheet.
    pub fn component_bounding_box(&self, component: ItemId) -> Option<Rect> {
        let Some(SchItem::Component(comp)) = self.item(component) else {
            return None;
        };
        let part = self.component_part(component).and_then(|id| self.get(id));
        let mut bbox: Option<Rect> = None;
        for child in part.map(|p| p.children.as_slice()).unwrap_or_default() {
            let local = match self.item(*child) {
                Some(SchItem::LibPin(pin))
                    if (pin.unit == 0 || pin.unit == comp.unit)
                        && (pin.body_style == 0 || pin.body_style == comp.body_style) =>
                {
                    pin.bounding_box(&comp.transform)
                }
                Some(SchItem::LibRectangle(rect))
                    if (rect.unit == 0 || rect.unit == comp.unit)
                        && (rect.body_style == 0 || rect.body_style == comp.body_style) =>
                {
                    Rect::from_corners(comp.transform.apply(rect.start), comp.transform.apply(rect.end))
                }
                _ => continue,
            };
            let placed = Rect::new(local.origin + comp.position, local.size);
            bbox = Some(match bbox {
                Some(b) => b.merge(&placed),
                None => placed,
            });
        }
        Some(bbox.unwrap_or_else(|| Rect::at(comp.position).inflate(DEFAULT_TEXT_SIZE)))
    }

    pub fn hit_test(&self, id: ItemId, pos: Point, accuracy: i32) -> bool {
        match self.item(id) {
            Some(SchItem::Component(_)) => self
                .component_bounding_box(id)
                .is_some_and(|b| b.inflate(accuracy.max(0)).contains(pos)),
            Some(item) => item.hit_test(pos, accuracy),
            None => false,
        }
    }

    /// Menu text of an item, naming components by reference.
    pub fn describe(&self, id: ItemId, units: Units) -> String {
        match self.item(id) {
            Some(SchItem::Component(comp)) => {
                let reference = self.component_reference(id).unwrap_or_default();
                format!("Symbol {}, {}", reference, comp.lib_name)
            }
            Some(item) => item.select_menu_text(units),
            None => String::new(),
        }
    }

    /// Text match of a single item against the search criteria.
    pub fn item_matches(&self, id: ItemId, matcher: &TextMatcher) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        match &node.item {
            SchItem::Text(text) => matcher.is_match(&text.text),
            SchItem::Field(field) => {
                if !matcher.search_all_fields()
                    && field.id != REFERENCE_FIELD
                    && field.id != VALUE_FIELD
                {
                    return false;
                }
                if field.id == REFERENCE_FIELD {
                    let text = node
                        .parent
                        .and_then(|p| self.component_reference(p))
                        .unwrap_or_else(|| field.text.clone());
                    matcher.is_match(&text)
                } else {
                    matcher.is_match(&field.text)
                }
            }
            SchItem::Sheet(sheet) => {
                matcher.is_match(&sheet.name) || matcher.is_match(&sheet.file_name)
            }
            SchItem::SheetPin(pin) => matcher.is_match(&pin.name),
            SchItem::Marker(marker) => matcher.is_match(&marker.message),
            SchItem::LibPin(pin) => pin.matches(matcher),
            SchItem::LibText(text) => matcher.is_match(&text.text),
            _ => false,
        }
    }

    /// Replace the first match in the item's text. Returns false when the
    /// item has no replaceable text or nothing matched.
    pub fn replace_text(&mut self, id: ItemId, matcher: &TextMatcher) -> bool {
        let target: Option<&mut String> = match self.nodes.get_mut(id.0).and_then(|n| n.as_mut()) {
            Some(node) => match &mut node.item {
                SchItem::Text(text) => Some(&mut text.text),
                SchItem::Field(field) => {
                    if field.id == REFERENCE_FIELD && !matcher.replace_references() {
                        None
                    } else {
                        Some(&mut field.text)
                    }
                }
                SchItem::Sheet(sheet) => {
                    if matcher.is_match(&sheet.name) {
                        Some(&mut sheet.name)
                    } else {
                        Some(&mut sheet.file_name)
                    }
                }
                SchItem::SheetPin(pin) => Some(&mut pin.name),
                _ => None,
            },
            None => None,
        };
        let Some(text) = target else {
            return false;
        };
        match matcher.replace(text.as_str()) {
            Some(replaced) => {
                debug!("Replaced '{}' with '{}'", text, replaced);
                *text = replaced;
                true
            }
            None => false,
        }
    }

    /// Every sheet path of the hierarchy, depth first, starting at the root.
    pub fn sheet_list(&self) -> Vec<SheetPath> {
        let mut out = Vec::new();
        let root = SheetPath::new(self.root_sheet);
        let mut visiting = vec![self.root_screen];
        self.collect_sheet_paths(root, &mut visiting, &mut out);
        out
    }

    fn collect_sheet_paths(
        &self,
        path: SheetPath,
        visiting: &mut Vec<ItemId>,
        out: &mut Vec<SheetPath>,
    ) {
        let screen = path.last_screen(self);
        out.push(path.clone());
        let Some(screen) = screen.and_then(|s| self.get(s)) else {
            return;
        };
        for child in &screen.children {
            let Some(SchItem::Sheet(sheet)) = self.item(*child) else {
                continue;
            };
            if visiting.contains(&sheet.screen) {
                warn!(
                    "Sheet '{}' recursively includes its own screen, skipping",
                    sheet.name
                );
                continue;
            }
            visiting.push(sheet.screen);
            let mut sub_path = path.clone();
            sub_path.push(*child);
            self.collect_sheet_paths(sub_path, visiting, out);
            visiting.pop();
        }
    }

    /// Mark (or unmark) the pins of the same part that share this pin's
    /// position and orientation, so later edits apply to all of them.
    pub fn enable_pin_edit_mode(&mut self, pin: ItemId, enable: bool, pin_by_pin: bool) -> Result<()> {
        let (position, orientation, parent) = match self.get(pin) {
            Some(Node {
                item: SchItem::LibPin(p),
                parent,
                ..
            }) => (p.position, p.orientation, *parent),
            _ => return Err(Error::MissingData(format!("Item {:?} is not a pin", pin))),
        };
        let Some(siblings) = parent.and_then(|p| self.get(p)).map(|p| p.children.clone()) else {
            return Ok(());
        };
        for sibling in siblings.into_iter().filter(|s| *s != pin) {
            if let Some(Some(Node {
                item: SchItem::LibPin(other),
                ..
            })) = self.nodes.get_mut(sibling.0)
            {
                other.edit_marked = enable
                    && !pin_by_pin
                    && other.position == position
                    && other.orientation == orientation;
            }
        }
        Ok(())
    }

    /// Apply `edit` to `pin` and to the pins marked for editing with it.
    /// Returns the number of pins changed.
    pub fn edit_pin(&mut self, pin: ItemId, edit: PinEdit) -> Result<usize> {
        let parent = match self.get(pin) {
            Some(node) if node.kind() == KicadType::LibPin => node.parent,
            _ => return Err(Error::MissingData(format!("Item {:?} is not a pin", pin))),
        };
        let mut targets = vec![pin];
        if edit.is_shared() {
            if let Some(parent) = parent.and_then(|p| self.get(p)) {
                targets.extend(parent.children.iter().copied().filter(|id| {
                    *id != pin
                        && matches!(self.item(*id), Some(SchItem::LibPin(p)) if p.edit_marked)
                }));
            }
        }
        for id in &targets {
            if let Some(SchItem::LibPin(p)) = self.item_mut(*id) {
                edit.apply(p);
            }
        }
        Ok(targets.len())
    }
}
