pub mod loader;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use compact_str::CompactString;

use crate::error::{Result, TreemapError};

/// Attribute selector over a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Listing identifier (`Property_ID`)
    Id,
    /// Property type: Apartment, Villa, House, ... (`Type`)
    Kind,
    /// City (`Location`)
    Location,
    /// Derived price bucket label (`Price_Range`)
    PriceBucket,
    /// Listing price in dollars (`Price`)
    Price,
    /// Floor area in square feet (`Area_SqFt`)
    Area,
    /// Derived price per square foot (`Price_Per_SqFt`)
    PricePerArea,
}

/// Whether a field partitions records or can be summed into a weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Categorical,
    Numeric,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Id,
        Field::Kind,
        Field::Location,
        Field::PriceBucket,
        Field::Price,
        Field::Area,
        Field::PricePerArea,
    ];

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Id | Field::Kind | Field::Location | Field::PriceBucket => {
                FieldKind::Categorical
            }
            Field::Price | Field::Area | Field::PricePerArea => FieldKind::Numeric,
        }
    }

    /// Column name used by the listing CSV.
    pub fn column(self) -> &'static str {
        match self {
            Field::Id => "Property_ID",
            Field::Kind => "Type",
            Field::Location => "Location",
            Field::PriceBucket => "Price_Range",
            Field::Price => "Price",
            Field::Area => "Area_SqFt",
            Field::PricePerArea => "Price_Per_SqFt",
        }
    }

    pub fn ensure_categorical(self) -> Result<Self> {
        match self.kind() {
            FieldKind::Categorical => Ok(self),
            FieldKind::Numeric => Err(self.not_categorical()),
        }
    }

    pub fn ensure_numeric(self) -> Result<Self> {
        match self.kind() {
            FieldKind::Numeric => Ok(self),
            FieldKind::Categorical => Err(self.not_numeric()),
        }
    }

    fn not_categorical(self) -> TreemapError {
        TreemapError::invalid_field(self.column(), "numeric field cannot be used as a grouping key")
    }

    fn not_numeric(self) -> TreemapError {
        TreemapError::invalid_field(self.column(), "categorical field cannot be used as a weight")
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Field {
    type Err = TreemapError;

    fn from_str(name: &str) -> Result<Self> {
        let field = match name.trim().to_ascii_lowercase().as_str() {
            "property_id" | "id" => Field::Id,
            "type" | "kind" | "property_type" => Field::Kind,
            "location" | "city" => Field::Location,
            "price_range" | "price_bucket" => Field::PriceBucket,
            "price" => Field::Price,
            "area_sqft" | "area" => Field::Area,
            "price_per_sqft" | "price_per_area" => Field::PricePerArea,
            _ => return Err(TreemapError::invalid_field(name, "no such field on a listing")),
        };
        Ok(field)
    }
}

/// Price bucket boundaries. Buckets are right-inclusive: `(edges[i], edges[i + 1]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBins {
    edges: Vec<f64>,
    labels: Vec<CompactString>,
}

impl PriceBins {
    pub fn new(edges: Vec<f64>, labels: Vec<CompactString>) -> Result<Self> {
        if edges.len() < 2 || labels.len() + 1 != edges.len() {
            return Err(TreemapError::invalid_field(
                Field::PriceBucket.column(),
                format!("{} edges cannot label {} buckets", edges.len(), labels.len()),
            ));
        }
        if edges.iter().any(|e| e.is_nan()) || edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TreemapError::invalid_field(
                Field::PriceBucket.column(),
                "bucket edges must be strictly increasing",
            ));
        }
        Ok(Self { edges, labels })
    }

    /// `count` buckets of `width` dollars starting at zero, plus an open bucket above.
    pub fn fixed_width(width: f64, count: usize) -> Result<Self> {
        if !(width.is_finite() && width > 0.0) || count == 0 {
            return Err(TreemapError::invalid_field(
                Field::PriceBucket.column(),
                format!("cannot build {count} buckets of width {width}"),
            ));
        }

        let mut edges: Vec<f64> = (0..=count).map(|i| i as f64 * width).collect();
        edges.push(f64::INFINITY);

        let mut labels = Vec::with_capacity(count + 1);
        labels.push(CompactString::from(format!("<{}", edge_label(width))));
        for pair in edges[1..=count].windows(2) {
            labels.push(CompactString::from(format!(
                "{}-{}",
                edge_label(pair[0]),
                edge_label(pair[1])
            )));
        }
        labels.push(CompactString::from(format!(">{}", edge_label(edges[count]))));

        Self::new(edges, labels)
    }

    /// Bucket label for a price. Prices outside the edges clamp to the outer buckets.
    pub fn label_for(&self, price: f64) -> &str {
        let idx = self
            .edges
            .windows(2)
            .position(|w| price <= w[1])
            .unwrap_or(self.labels.len() - 1);
        self.labels[idx].as_str()
    }

    pub fn labels(&self) -> &[CompactString] {
        &self.labels
    }
}

impl Default for PriceBins {
    fn default() -> Self {
        Self {
            edges: vec![0.0, 500_000.0, 1_000_000.0, 2_000_000.0, f64::INFINITY],
            labels: ["<$500K", "$500K-$1M", "$1M-$2M", ">$2M"]
                .into_iter()
                .map(CompactString::from)
                .collect(),
        }
    }
}

fn default_bins() -> &'static PriceBins {
    static BINS: OnceLock<PriceBins> = OnceLock::new();
    BINS.get_or_init(PriceBins::default)
}

fn edge_label(value: f64) -> String {
    let (scaled, suffix) = if value >= 1_000_000.0 {
        (value / 1_000_000.0, "M")
    } else if value >= 1_000.0 {
        (value / 1_000.0, "K")
    } else {
        (value, "")
    };
    let text = format!("{scaled:.1}");
    format!("${}{}", text.trim_end_matches(".0"), suffix)
}

/// One property listing. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: CompactString,
    pub kind: CompactString,
    pub location: CompactString,
    pub price: f64,
    pub area: f64,
    /// Derived: `price / area` (0 when the area is zero)
    pub price_per_area: f64,
    /// Derived from `price` by the bins the record was built with
    pub price_bucket: CompactString,
}

impl Record {
    pub fn new(id: &str, kind: &str, location: &str, price: f64, area: f64) -> Self {
        Self::with_bins(id, kind, location, price, area, default_bins())
    }

    pub fn with_bins(
        id: &str,
        kind: &str,
        location: &str,
        price: f64,
        area: f64,
        bins: &PriceBins,
    ) -> Self {
        let price_per_area = if area > 0.0 { price / area } else { 0.0 };
        Self {
            id: CompactString::new(id),
            kind: CompactString::new(kind),
            location: CompactString::new(location),
            price,
            area,
            price_per_area,
            price_bucket: CompactString::new(bins.label_for(price)),
        }
    }

    /// Categorical value of `field`.
    pub fn key(&self, field: Field) -> Result<&str> {
        match field {
            Field::Id => Ok(&self.id),
            Field::Kind => Ok(&self.kind),
            Field::Location => Ok(&self.location),
            Field::PriceBucket => Ok(&self.price_bucket),
            Field::Price | Field::Area | Field::PricePerArea => {
                Err(field.not_categorical())
            }
        }
    }

    /// Numeric value of `field`.
    pub fn value(&self, field: Field) -> Result<f64> {
        match field {
            Field::Price => Ok(self.price),
            Field::Area => Ok(self.area),
            Field::PricePerArea => Ok(self.price_per_area),
            Field::Id | Field::Kind | Field::Location | Field::PriceBucket => {
                Err(field.not_numeric())
            }
        }
    }
}
