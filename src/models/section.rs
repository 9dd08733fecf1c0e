use dominant_tiles::Section;
use std::fmt;

/// Column and row of a section in the section grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId {
    pub column: u32,
    pub row: u32,
}

impl From<&Section> for SectionId {
    fn from(section: &Section) -> Self {
        Self {
            column: section.column,
            row: section.row,
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}
