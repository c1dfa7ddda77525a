//! Item Entity
//!
//! Represents a shelf-placeable entity: a book spine or a decor piece.
//! An item is either in the holding tray (`Unplaced`) or on one of a
//! fixed set of shelves at a fractional horizontal position.

use super::entity::Entity;
use super::spine::color_for_key;

/// Opaque, store-assigned document identifier
pub type ItemId = String;

/// Number of shelf slots in the default layout
pub const SHELF_COUNT: u8 = 3;

/// Index of one shelf slot, guaranteed in `0..SHELF_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShelfIndex(u8);

impl ShelfIndex {
    /// Returns `None` for indices outside the fixed shelf set
    pub fn new(index: u8) -> Option<Self> {
        (index < SHELF_COUNT).then_some(Self(index))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All valid shelves, top to bottom
    pub fn all() -> impl Iterator<Item = ShelfIndex> {
        (0..SHELF_COUNT).map(ShelfIndex)
    }
}

/// Where an item currently lives
///
/// `position` is a horizontal fraction in `[0,1]` across the shelf. It is
/// only meaningful relative to other items on the same shelf; ties are
/// legal and resolved by sort order alone. `None` marks legacy documents
/// written before positions existed; they sort after positioned items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Unplaced,
    Placed {
        shelf: ShelfIndex,
        position: Option<f64>,
    },
}

impl Placement {
    pub fn is_unplaced(&self) -> bool {
        matches!(self, Placement::Unplaced)
    }

    pub fn shelf(&self) -> Option<ShelfIndex> {
        match self {
            Placement::Placed { shelf, .. } => Some(*shelf),
            Placement::Unplaced => None,
        }
    }

    pub fn position(&self) -> Option<f64> {
        match self {
            Placement::Placed { position, .. } => *position,
            Placement::Unplaced => None,
        }
    }
}

/// Decor subtype, a closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorKind {
    Plant,
    Candle,
    Bookend,
}

impl DecorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecorKind::Plant => "plant",
            DecorKind::Candle => "candle",
            DecorKind::Bookend => "bookend",
        }
    }

    /// Unknown tags are rejected at the store-read boundary, so this
    /// returns `None` instead of defaulting.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "plant" => Some(DecorKind::Plant),
            "candle" => Some(DecorKind::Candle),
            "bookend" => Some(DecorKind::Bookend),
            _ => None,
        }
    }

    /// Highest asset variant that exists for this subtype
    pub fn max_variant(&self) -> u8 {
        match self {
            DecorKind::Plant => 5,
            DecorKind::Candle => 4,
            DecorKind::Bookend => 1,
        }
    }

    /// Clamp a requested variant into `[1, max_variant]`.
    /// Absent or unparseable requests default to 1.
    pub fn clamp_variant(&self, requested: Option<i64>) -> u8 {
        let v = requested.unwrap_or(1).clamp(1, self.max_variant() as i64);
        v as u8
    }

    /// Asset selected by the (already clamped) variant
    pub fn asset_path(&self, variant: u8) -> String {
        match self {
            DecorKind::Plant => format!("/decor/plant-{}.png", variant),
            DecorKind::Candle => format!("/decor/candle-{}.png", variant),
            DecorKind::Bookend => format!("/decor/bookends-{}.png", variant),
        }
    }
}

/// Variant data for the two item families
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Book {
        /// Cover image; the color tint is the fallback when absent
        thumbnail_url: Option<String>,
        /// Positive page count drives spine thickness when present
        page_count: Option<u32>,
        authors: Vec<String>,
        /// Catalog identifier of the source volume, if imported
        external_id: Option<String>,
    },
    Decor {
        kind: DecorKind,
        /// Always within `[1, kind.max_variant()]`
        variant: u8,
    },
}

impl ItemKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ItemKind::Book { .. } => "book",
            ItemKind::Decor { .. } => "decor",
        }
    }

    pub fn is_decor(&self) -> bool {
        matches!(self, ItemKind::Decor { .. })
    }
}

/// One shelf-placeable entity
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Empty until the store assigns one on first write
    pub id: ItemId,
    pub kind: ItemKind,
    /// Spine label; falls back to `title` at read time
    pub label: String,
    /// Full title; falls back to `label` at read time
    pub title: String,
    /// Fallback tint, `hsl(...)` or hex
    pub color: String,
    pub placement: Placement,
    /// Store-managed, millisecond timestamps
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl Item {
    /// A plain book with an explicit color, used for starter seeding
    pub fn seed_book(id: &str, label: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: ItemKind::Book {
                thumbnail_url: None,
                page_count: None,
                authors: Vec::new(),
                external_id: None,
            },
            label: label.to_string(),
            title: label.to_string(),
            color: color.to_string(),
            placement: Placement::Unplaced,
            created_at: None,
            updated_at: None,
        }
    }

    /// A decor piece; the requested variant is clamped to the known
    /// asset range for the subtype.
    pub fn decor(kind: DecorKind, requested_variant: i64) -> Self {
        let variant = kind.clamp_variant(Some(requested_variant));
        Self {
            id: String::new(),
            kind: ItemKind::Decor { kind, variant },
            label: kind.as_str().to_string(),
            title: kind.as_str().to_string(),
            color: color_for_key(kind.as_str()),
            placement: Placement::Unplaced,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}
