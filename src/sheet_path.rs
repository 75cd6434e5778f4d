// src/sheet_path.rs

use crate::items::SchItem;
use crate::schematic::{ItemId, Schematic};

/// Chain of sheets from the root sheet down to the sheet being shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetPath {
    sheets: Vec<ItemId>,
}

impl SheetPath {
    pub fn new(root_sheet: ItemId) -> Self {
        SheetPath {
            sheets: vec![root_sheet],
        }
    }

    pub fn push(&mut self, sheet: ItemId) {
        self.sheets.push(sheet);
    }

    pub fn sheets(&self) -> &[ItemId] {
        &self.sheets
    }

    pub fn last(&self) -> Option<ItemId> {
        self.sheets.last().copied()
    }

    /// Screen holding the items of the last sheet.
    pub fn last_screen(&self, schematic: &Schematic) -> Option<ItemId> {
        match schematic.item(self.last()?)? {
            SchItem::Sheet(sheet) => Some(sheet.screen),
            _ => None,
        }
    }

    /// `/` for the root, `/Power/Regulator/` for nested sheets.
    pub fn human_readable(&self, schematic: &Schematic) -> String {
        let mut out = String::from("/");
        for id in self.sheets.iter().skip(1) {
            if let Some(SchItem::Sheet(sheet)) = schematic.item(*id) {
                out.push_str(&sheet.name);
                out.push('/');
            }
        }
        out
    }
}
