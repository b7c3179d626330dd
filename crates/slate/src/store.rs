//! In-memory sheet repository
//!
//! An explicitly constructed store instance; hosts create one and pass it
//! to whatever handles requests. Tests construct a fresh store each, so
//! nothing leaks between them.

use std::collections::HashMap;

use slate_core::{Error, Result};
use slate_formula::Sheet;

/// Keyed collection of sheets
#[derive(Debug, Default)]
pub struct SheetStore {
    sheets: HashMap<String, Sheet>,
}

impl SheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new sheet; its id must not already be taken
    pub fn create(&mut self, sheet: Sheet) -> Result<()> {
        let id = sheet.id().to_string();
        if self.sheets.contains_key(&id) {
            return Err(Error::DuplicateSheet(id));
        }
        self.sheets.insert(id, sheet);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&Sheet> {
        self.sheets
            .get(id)
            .ok_or_else(|| Error::SheetNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Sheet> {
        self.sheets
            .get_mut(id)
            .ok_or_else(|| Error::SheetNotFound(id.to_string()))
    }

    /// Replace a sheet wholesale, keyed by its own id
    pub fn update(&mut self, sheet: Sheet) -> Result<()> {
        let id = sheet.id().to_string();
        if !self.sheets.contains_key(&id) {
            return Err(Error::SheetNotFound(id));
        }
        self.sheets.insert(id, sheet);
        Ok(())
    }

    /// Remove a sheet, returning it
    pub fn remove(&mut self, id: &str) -> Result<Sheet> {
        self.sheets
            .remove(id)
            .ok_or_else(|| Error::SheetNotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Iterate over all sheets in storage order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.values()
    }
}
