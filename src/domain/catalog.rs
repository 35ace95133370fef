//! The fixed thematic catalog the selection tracker walks through.
//!
//! Each entry is a verse reference plus the theme it was chosen for. The
//! catalog carries no commentary: commentary always comes from the
//! commentary provider.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::VerseReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    Mercy,
    Patience,
    Gratitude,
    Prayer,
    Family,
    Knowledge,
    Trust,
    Charity,
    Guidance,
    Hope,
}

impl Theme {
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Mercy => "Mercy",
            Theme::Patience => "Patience",
            Theme::Gratitude => "Gratitude",
            Theme::Prayer => "Prayer",
            Theme::Family => "Family",
            Theme::Knowledge => "Knowledge",
            Theme::Trust => "Trust in Allah",
            Theme::Charity => "Charity",
            Theme::Guidance => "Guidance",
            Theme::Hope => "Hope",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub chapter: u16,
    pub verse: u16,
    pub theme: Theme,
}

impl CatalogEntry {
    const fn new(chapter: u16, verse: u16, theme: Theme) -> Self {
        Self {
            chapter,
            verse,
            theme,
        }
    }

    pub fn reference(&self) -> Result<VerseReference> {
        VerseReference::new(self.chapter, self.verse)
    }
}

/// Default catalog: ten themes, ten verses each.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry::new(39, 53, Theme::Mercy),
    CatalogEntry::new(7, 156, Theme::Mercy),
    CatalogEntry::new(21, 107, Theme::Mercy),
    CatalogEntry::new(6, 54, Theme::Mercy),
    CatalogEntry::new(11, 90, Theme::Mercy),
    CatalogEntry::new(2, 218, Theme::Mercy),
    CatalogEntry::new(33, 43, Theme::Mercy),
    CatalogEntry::new(17, 82, Theme::Mercy),
    CatalogEntry::new(30, 21, Theme::Mercy),
    CatalogEntry::new(16, 64, Theme::Mercy),
    CatalogEntry::new(2, 153, Theme::Patience),
    CatalogEntry::new(2, 155, Theme::Patience),
    CatalogEntry::new(39, 10, Theme::Patience),
    CatalogEntry::new(3, 200, Theme::Patience),
    CatalogEntry::new(16, 126, Theme::Patience),
    CatalogEntry::new(103, 3, Theme::Patience),
    CatalogEntry::new(11, 115, Theme::Patience),
    CatalogEntry::new(40, 55, Theme::Patience),
    CatalogEntry::new(46, 35, Theme::Patience),
    CatalogEntry::new(70, 5, Theme::Patience),
    CatalogEntry::new(14, 7, Theme::Gratitude),
    CatalogEntry::new(2, 152, Theme::Gratitude),
    CatalogEntry::new(16, 18, Theme::Gratitude),
    CatalogEntry::new(27, 40, Theme::Gratitude),
    CatalogEntry::new(31, 12, Theme::Gratitude),
    CatalogEntry::new(39, 66, Theme::Gratitude),
    CatalogEntry::new(76, 3, Theme::Gratitude),
    CatalogEntry::new(3, 123, Theme::Gratitude),
    CatalogEntry::new(56, 70, Theme::Gratitude),
    CatalogEntry::new(16, 78, Theme::Gratitude),
    CatalogEntry::new(2, 45, Theme::Prayer),
    CatalogEntry::new(20, 14, Theme::Prayer),
    CatalogEntry::new(29, 45, Theme::Prayer),
    CatalogEntry::new(11, 114, Theme::Prayer),
    CatalogEntry::new(17, 78, Theme::Prayer),
    CatalogEntry::new(2, 238, Theme::Prayer),
    CatalogEntry::new(70, 23, Theme::Prayer),
    CatalogEntry::new(107, 5, Theme::Prayer),
    CatalogEntry::new(4, 103, Theme::Prayer),
    CatalogEntry::new(50, 40, Theme::Prayer),
    CatalogEntry::new(17, 23, Theme::Family),
    CatalogEntry::new(31, 14, Theme::Family),
    CatalogEntry::new(4, 1, Theme::Family),
    CatalogEntry::new(30, 21, Theme::Family),
    CatalogEntry::new(66, 6, Theme::Family),
    CatalogEntry::new(25, 74, Theme::Family),
    CatalogEntry::new(13, 21, Theme::Family),
    CatalogEntry::new(24, 32, Theme::Family),
    CatalogEntry::new(2, 233, Theme::Family),
    CatalogEntry::new(46, 15, Theme::Family),
    CatalogEntry::new(20, 114, Theme::Knowledge),
    CatalogEntry::new(96, 1, Theme::Knowledge),
    CatalogEntry::new(39, 9, Theme::Knowledge),
    CatalogEntry::new(58, 11, Theme::Knowledge),
    CatalogEntry::new(35, 28, Theme::Knowledge),
    CatalogEntry::new(16, 43, Theme::Knowledge),
    CatalogEntry::new(17, 36, Theme::Knowledge),
    CatalogEntry::new(4, 113, Theme::Knowledge),
    CatalogEntry::new(2, 269, Theme::Knowledge),
    CatalogEntry::new(55, 4, Theme::Knowledge),
    CatalogEntry::new(65, 3, Theme::Trust),
    CatalogEntry::new(3, 159, Theme::Trust),
    CatalogEntry::new(8, 49, Theme::Trust),
    CatalogEntry::new(9, 51, Theme::Trust),
    CatalogEntry::new(11, 123, Theme::Trust),
    CatalogEntry::new(12, 67, Theme::Trust),
    CatalogEntry::new(14, 11, Theme::Trust),
    CatalogEntry::new(25, 58, Theme::Trust),
    CatalogEntry::new(33, 3, Theme::Trust),
    CatalogEntry::new(39, 38, Theme::Trust),
    CatalogEntry::new(2, 261, Theme::Charity),
    CatalogEntry::new(2, 274, Theme::Charity),
    CatalogEntry::new(57, 18, Theme::Charity),
    CatalogEntry::new(9, 103, Theme::Charity),
    CatalogEntry::new(64, 16, Theme::Charity),
    CatalogEntry::new(2, 267, Theme::Charity),
    CatalogEntry::new(2, 271, Theme::Charity),
    CatalogEntry::new(3, 92, Theme::Charity),
    CatalogEntry::new(63, 10, Theme::Charity),
    CatalogEntry::new(30, 39, Theme::Charity),
    CatalogEntry::new(1, 6, Theme::Guidance),
    CatalogEntry::new(2, 2, Theme::Guidance),
    CatalogEntry::new(17, 9, Theme::Guidance),
    CatalogEntry::new(6, 90, Theme::Guidance),
    CatalogEntry::new(16, 36, Theme::Guidance),
    CatalogEntry::new(28, 56, Theme::Guidance),
    CatalogEntry::new(42, 52, Theme::Guidance),
    CatalogEntry::new(5, 16, Theme::Guidance),
    CatalogEntry::new(76, 3, Theme::Guidance),
    CatalogEntry::new(7, 43, Theme::Guidance),
    CatalogEntry::new(12, 87, Theme::Hope),
    CatalogEntry::new(94, 5, Theme::Hope),
    CatalogEntry::new(2, 214, Theme::Hope),
    CatalogEntry::new(11, 9, Theme::Hope),
    CatalogEntry::new(40, 60, Theme::Hope),
    CatalogEntry::new(3, 139, Theme::Hope),
    CatalogEntry::new(65, 2, Theme::Hope),
    CatalogEntry::new(29, 5, Theme::Hope),
    CatalogEntry::new(18, 110, Theme::Hope),
    CatalogEntry::new(33, 47, Theme::Hope),
];
