use crate::layout::LayoutItem;

/// What a treemap's weights measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightUnit {
    /// Number of listings
    Count,
    /// Dollar total
    Currency,
}

/// Format a weight for display.
pub fn format_weight(weight: f64, unit: WeightUnit) -> String {
    match unit {
        WeightUnit::Count => {
            let n = weight.round() as u64;
            if n == 1 {
                "1 property".to_string()
            } else {
                format!("{n} properties")
            }
        }
        WeightUnit::Currency => format_currency(weight),
    }
}

/// Dollars in short form: `$1.2B`, `$34.5M`, `$850K`, `$420`.
pub fn format_currency(value: f64) -> String {
    const K: f64 = 1_000.0;
    const M: f64 = 1_000.0 * K;
    const B: f64 = 1_000.0 * M;

    if value >= B {
        format!("${:.1}B", value / B)
    } else if value >= M {
        format!("${:.1}M", value / M)
    } else if value >= K {
        format!("${:.0}K", value / K)
    } else {
        format!("${:.0}", value)
    }
}

/// Multi-line label: name, weight, and share of the parent group.
pub fn item_label(item: &LayoutItem, unit: WeightUnit) -> String {
    let name = item.key().unwrap_or("All");
    let weight = format_weight(item.weight, unit);
    if item.path.is_empty() {
        return format!("{name}\n{weight}");
    }
    format!("{name}\n{weight}\n{:.1}% of parent", item.share * 100.0)
}

/// Full path for tooltips, e.g. `Villa / $1M-$2M / Dallas`.
pub fn item_path(item: &LayoutItem) -> String {
    if item.path.is_empty() {
        return "All".to_string();
    }
    item.path
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}
