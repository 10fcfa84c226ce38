//! Group node in the gathering hierarchy.
//!
//! A group either owns wells (a *well group*, i.e. a leaf) or owns child
//! groups, never both. The root of every chain is the field group.

use rv_core::Real;

pub const FIELD_GROUP: &str = "FIELD";

#[derive(Clone, Debug)]
pub struct Group {
    pub name: String,
    pub insert_index: usize,
    /// None for the field root.
    pub parent: Option<String>,
    /// Fractional uptime (0-1) applied when accumulating volumes.
    pub efficiency_factor: Real,
    pub wells: Vec<String>,
    pub groups: Vec<String>,
}

impl Group {
    pub fn new(name: impl Into<String>, insert_index: usize, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            insert_index,
            parent: parent.map(str::to_owned),
            efficiency_factor: 1.0,
            wells: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// A well group holds wells directly and has no child groups.
    pub fn is_well_group(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn is_field(&self) -> bool {
        self.parent.is_none()
    }
}
