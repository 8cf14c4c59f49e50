//! Vehicle catalog
//!
//! Hardcoded showroom records plus the pure derivations the model grid
//! needs: filter by category, then order by price, popularity or recency.

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------
//  Data Model
// ---------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "Luxury SUV")]
    Luxury,
    #[serde(rename = "Off-Road SUV")]
    OffRoad,
    #[serde(rename = "Crossover SUV")]
    Crossover,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Luxury, Self::OffRoad, Self::Crossover];

    pub fn label(self) -> &'static str {
        match self {
            Self::Luxury => "Luxury SUV",
            Self::OffRoad => "Off-Road SUV",
            Self::Crossover => "Crossover SUV",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Luxury => "luxury",
            Self::OffRoad => "off-road",
            Self::Crossover => "crossover",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Specs {
    pub engine: &'static str,
    pub power: &'static str,
    pub transmission: &'static str,
    pub seats: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub tagline: &'static str,
    /// Display string, e.g. `₦18,500,000`.
    pub price: &'static str,
    pub image: &'static str,
    pub category: Category,
    pub specs: Specs,
}

impl CatalogEntry {
    /// Numeric price with currency formatting stripped; 0 when unparseable.
    pub fn price_value(&self) -> u64 {
        parse_price(self.price)
    }
}

/// Strip `₦` and thousands separators, then parse the leading integer.
pub fn parse_price(display: &str) -> u64 {
    let cleaned: String = display
        .chars()
        .filter(|c| *c != '₦' && *c != ',')
        .collect();
    let digits: String = cleaned
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

// ---------------------------------------------------------------
//  Static Dataset
// ---------------------------------------------------------------

pub static FEATURED_MODELS: &[CatalogEntry] = &[
    CatalogEntry {
        id: "g80",
        name: "INNOSON G80",
        tagline: "The Commander of Roads",
        price: "₦18,500,000",
        image: "https://images.unsplash.com/photo-1609521263047-f8f205293f24?q=80&w=2670&auto=format&fit=crop",
        category: Category::Luxury,
        specs: Specs {
            engine: "Powerful Engine",
            power: "High Performance",
            transmission: "Automatic",
            seats: 7,
        },
    },
    CatalogEntry {
        id: "g40",
        name: "INNOSON G40",
        tagline: "Born for the Wild",
        price: "₦12,800,000",
        image: "https://images.unsplash.com/photo-1533473359331-0135ef1b58bf?q=80&w=2670&auto=format&fit=crop",
        category: Category::OffRoad,
        specs: Specs {
            engine: "Robust Engine",
            power: "Strong Performance",
            transmission: "Manual/Automatic",
            seats: 5,
        },
    },
    CatalogEntry {
        id: "g5t",
        name: "INNOSON G5T",
        tagline: "Urban Sophistication",
        price: "₦9,950,000",
        image: "https://images.unsplash.com/photo-1549399542-7e3f8b79c341?q=80&w=2574&auto=format&fit=crop",
        category: Category::Crossover,
        specs: Specs {
            engine: "Efficient Engine",
            power: "Balanced Performance",
            transmission: "Automatic",
            seats: 5,
        },
    },
];

// ---------------------------------------------------------------
//  Filter / Sort
// ---------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, entry: &CatalogEntry) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => entry.category == category,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(category) => category.label(),
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        filter.label().to_string()
    }
}

impl FromStr for CategoryFilter {
    type Err = Error;

    /// Accepts display labels ("Off-Road SUV") and slugs ("off-road").
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_lowercase();
        if needle.is_empty() || needle == "all" {
            return Ok(Self::All);
        }
        Category::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase() == needle || c.slug() == needle)
            .map(Self::Only)
            .ok_or_else(|| Error::UnknownFilter(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Default,
    Price,
    Popularity,
    Newest,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Price => "price",
            Self::Popularity => "popularity",
            Self::Newest => "newest",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "default" => Ok(Self::Default),
            "price" => Ok(Self::Price),
            "popularity" => Ok(Self::Popularity),
            "newest" => Ok(Self::Newest),
            _ => Err(Error::UnknownSort(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------
//  Catalog
// ---------------------------------------------------------------

/// Read-only view over a slice of entries. Position in the slice is the
/// popularity rank (first is most popular).
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    entries: &'static [CatalogEntry],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(FEATURED_MODELS)
    }
}

impl Catalog {
    pub fn new(entries: &'static [CatalogEntry]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [CatalogEntry] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&'static CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&'static CatalogEntry> {
        self.get(id).ok_or_else(|| Error::UnknownModel(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn rank(&self, id: &str) -> usize {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .unwrap_or(usize::MAX)
    }

    /// Filter, then order. Ties keep filtered order.
    pub fn view(&self, filter: CategoryFilter, sort: SortOrder) -> Vec<&'static CatalogEntry> {
        let mut selected: Vec<&'static CatalogEntry> =
            self.entries.iter().filter(|e| filter.matches(e)).collect();

        match sort {
            SortOrder::Default => {}
            SortOrder::Price => selected.sort_by_key(|e| e.price_value()),
            SortOrder::Popularity => selected.sort_by_key(|e| self.rank(e.id)),
            SortOrder::Newest => selected.reverse(),
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static UNSORTED: &[CatalogEntry] = &[
        CatalogEntry {
            id: "a",
            name: "A",
            tagline: "",
            price: "₦30,000,000",
            image: "",
            category: Category::Luxury,
            specs: Specs { engine: "", power: "", transmission: "", seats: 5 },
        },
        CatalogEntry {
            id: "b",
            name: "B",
            tagline: "",
            price: "Call for price",
            image: "",
            category: Category::OffRoad,
            specs: Specs { engine: "", power: "", transmission: "", seats: 5 },
        },
        CatalogEntry {
            id: "c",
            name: "C",
            tagline: "",
            price: "₦1,250,000",
            image: "",
            category: Category::Luxury,
            specs: Specs { engine: "", power: "", transmission: "", seats: 7 },
        },
    ];

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("₦18,500,000"), 18_500_000);
        assert_eq!(parse_price(" ₦9,950,000 "), 9_950_000);
        assert_eq!(parse_price("Call for price"), 0);
        assert_eq!(parse_price(""), 0);
    }

    #[test]
    fn test_filter_only_returns_matching_category() {
        let catalog = Catalog::default();
        for category in Category::ALL {
            let view = catalog.view(CategoryFilter::Only(category), SortOrder::Default);
            assert!(!view.is_empty());
            assert!(view.iter().all(|e| e.category == category));
        }

        let custom = Catalog::new(UNSORTED);
        let luxury = custom.view(CategoryFilter::Only(Category::Luxury), SortOrder::Default);
        let ids: Vec<_> = luxury.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_all_filter_keeps_everything() {
        let catalog = Catalog::default();
        assert_eq!(catalog.view(CategoryFilter::All, SortOrder::Default).len(), catalog.len());
    }

    #[test]
    fn test_price_sort_non_decreasing() {
        for catalog in [Catalog::default(), Catalog::new(UNSORTED)] {
            let prices: Vec<u64> = catalog
                .view(CategoryFilter::All, SortOrder::Price)
                .iter()
                .map(|e| e.price_value())
                .collect();
            assert!(prices.windows(2).all(|w| w[0] <= w[1]), "{prices:?}");
        }

        let ids: Vec<_> = Catalog::new(UNSORTED)
            .view(CategoryFilter::All, SortOrder::Price)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_popularity_and_newest() {
        let catalog = Catalog::default();
        let popular: Vec<_> = catalog
            .view(CategoryFilter::All, SortOrder::Popularity)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(popular, vec!["g80", "g40", "g5t"]);

        let newest: Vec<_> = catalog
            .view(CategoryFilter::All, SortOrder::Newest)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(newest, vec!["g5t", "g40", "g80"]);
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("All".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "Off-Road SUV".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::OffRoad)
        );
        assert_eq!(
            "crossover".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Crossover)
        );
        assert!("Sedan".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("PRICE".parse::<SortOrder>().unwrap(), SortOrder::Price);
        assert_eq!("".parse::<SortOrder>().unwrap(), SortOrder::Default);
        assert_eq!(
            "fastest".parse::<SortOrder>(),
            Err(Error::UnknownSort("fastest".to_string()))
        );
    }

    #[test]
    fn test_lookup() {
        let catalog = Catalog::default();
        assert_eq!(catalog.require("g40").unwrap().name, "INNOSON G40");
        assert!(catalog.contains("g5t"));
        assert_eq!(
            catalog.require("g99").unwrap_err(),
            Error::UnknownModel("g99".to_string())
        );
    }

    #[test]
    fn test_entry_serializes_category_label() {
        let json = serde_json::to_value(&FEATURED_MODELS[1]).unwrap();
        assert_eq!(json["category"], "Off-Road SUV");
        assert_eq!(json["specs"]["seats"], 5);
    }
}
