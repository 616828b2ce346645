use serde::{Deserialize, Serialize};

/// A single item price row as submitted by the browser.
///
/// Every field travels as a string. Absent fields deserialize to the empty
/// string so the validator treats missing and blank values the same way.
/// Unknown payload fields (such as a client-computed `key`) are ignored; the
/// server always re-derives the key itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemRow {
    pub item_number: String,
    pub country: String,
    pub new_price: String,
    pub product_lifecycle: String,
    pub activation_date: String,
}

impl ItemRow {
    /// Derived row key: the country code concatenated with the item number,
    /// or the empty string when either part is blank.
    pub fn key(&self) -> String {
        let country = self.country.trim();
        let item = self.item_number.trim();
        if country.is_empty() || item.is_empty() {
            return String::new();
        }
        format!("{}{}", country, item)
    }

    /// A row where every field is empty or whitespace. The editor always
    /// keeps one (possibly untouched) row in the table, so blank rows are
    /// skipped rather than rejected.
    pub fn is_blank(&self) -> bool {
        self.item_number.trim().is_empty()
            && self.country.trim().is_empty()
            && self.new_price.trim().is_empty()
            && self.product_lifecycle.trim().is_empty()
            && self.activation_date.trim().is_empty()
    }
}

/// Country codes the price sheet accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Country {
    Nor,
    Sve,
    Fin,
}

impl Country {
    pub const ALL: [Country; 3] = [Country::Nor, Country::Sve, Country::Fin];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NOR" => Some(Country::Nor),
            "SVE" => Some(Country::Sve),
            "FIN" => Some(Country::Fin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Nor => "NOR",
            Country::Sve => "SVE",
            Country::Fin => "FIN",
        }
    }
}

/// Product lifecycle stages. The field is optional on a row, but a non-empty
/// value must be one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Za,
    Zi,
    Zd,
    Zp,
    Zc,
}

impl Lifecycle {
    pub const ALL: [Lifecycle; 5] = [
        Lifecycle::Za,
        Lifecycle::Zi,
        Lifecycle::Zd,
        Lifecycle::Zp,
        Lifecycle::Zc,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ZA" => Some(Lifecycle::Za),
            "ZI" => Some(Lifecycle::Zi),
            "ZD" => Some(Lifecycle::Zd),
            "ZP" => Some(Lifecycle::Zp),
            "ZC" => Some(Lifecycle::Zc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Za => "ZA",
            Lifecycle::Zi => "ZI",
            Lifecycle::Zd => "ZD",
            Lifecycle::Zp => "ZP",
            Lifecycle::Zc => "ZC",
        }
    }
}
