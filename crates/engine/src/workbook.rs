use crate::sheet::Sheet;

/// Ordered, named collection of sheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Sheet by exact name, falling back to a case-insensitive match.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.position(name).map(|i| &self.sheets[i])
    }

    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    /// Named sheet, or the first one when no name is given.
    pub fn resolve(&self, name: Option<&str>) -> Option<&Sheet> {
        match name {
            Some(n) => self.sheet(n),
            None => self.first_sheet(),
        }
    }

    /// Swap in a replacement for the sheet with the same name, or append it.
    pub fn replace(&mut self, sheet: Sheet) {
        match self.position(&sheet.name) {
            Some(i) => self.sheets[i] = sheet,
            None => self.sheets.push(sheet),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| s.name == name)
            .or_else(|| {
                let wanted = name.trim().to_lowercase();
                self.sheets.iter().position(|s| s.name.to_lowercase() == wanted)
            })
    }
}
