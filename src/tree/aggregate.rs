use std::collections::BTreeMap;

use compact_str::CompactString;

use super::GroupNode;
use crate::dataset::{Field, Record};
use crate::error::{Result, TreemapError};

/// Group `records` by `keys` (outermost first) into a weighted tree.
///
/// Leaves weigh the number of records in their group, or the sum of `weight`
/// over them when a weight field is given. Every parent weighs the sum of its
/// children, and children are sorted by descending weight with ties broken by
/// ascending key, which is the order the squarified layout expects.
pub fn aggregate(records: &[Record], keys: &[Field], weight: Option<Field>) -> Result<GroupNode> {
    if records.is_empty() {
        return Err(TreemapError::EmptyInput);
    }
    for &key in keys {
        key.ensure_categorical()?;
    }
    if let Some(field) = weight {
        field.ensure_numeric()?;
    }

    let members: Vec<&Record> = records.iter().collect();
    let root = build_group(&members, Vec::new(), keys, weight)?;

    tracing::debug!(
        "Aggregated {} records by [{}] into {} groups (weight={:.2}, by {})",
        records.len(),
        keys.iter().map(|k| k.column()).collect::<Vec<_>>().join(", "),
        root.leaf_count(),
        root.weight,
        weight.map_or("count", |f| f.column()),
    );

    Ok(root)
}

/// Same as [`aggregate`], selecting fields by column name (`"Type"`, `"Price"`, ...).
pub fn aggregate_by_names(
    records: &[Record],
    keys: &[&str],
    weight: Option<&str>,
) -> Result<GroupNode> {
    let keys = keys
        .iter()
        .map(|name| name.parse::<Field>())
        .collect::<Result<Vec<_>>>()?;
    let weight = weight.map(str::parse::<Field>).transpose()?;
    aggregate(records, &keys, weight)
}

fn build_group<'a>(
    records: &[&'a Record],
    path: Vec<CompactString>,
    keys: &[Field],
    weight: Option<Field>,
) -> Result<GroupNode> {
    let Some((&key, rest)) = keys.split_first() else {
        return Ok(GroupNode::leaf(path, leaf_weight(records, weight)?));
    };

    // BTreeMap keeps groups in lexical order; the stable sort below only
    // reorders by weight, so equal weights stay lexical.
    let mut groups: BTreeMap<&'a str, Vec<&'a Record>> = BTreeMap::new();
    for &record in records {
        groups.entry(record.key(key)?).or_default().push(record);
    }

    let mut children = groups
        .into_iter()
        .map(|(value, members)| {
            let mut child_path = path.clone();
            child_path.push(CompactString::new(value));
            build_group(&members, child_path, rest, weight)
        })
        .collect::<Result<Vec<_>>>()?;
    sort_children_by_weight(&mut children);

    let group = GroupNode::branch(path, children);
    if group.weight.is_infinite() {
        tracing::warn!(
            "Weight of group {:?} overflows f64; layout will use relative weights",
            group.path
        );
    }
    Ok(group)
}

fn leaf_weight(records: &[&Record], weight: Option<Field>) -> Result<f64> {
    let Some(field) = weight else {
        return Ok(records.len() as f64);
    };

    let mut total = 0.0;
    for record in records {
        let value = record.value(field)?;
        if value.is_finite() && value >= 0.0 {
            total += value;
        } else {
            tracing::warn!(
                "Listing {} has {} = {}, counting it as zero",
                record.id,
                field,
                value
            );
        }
    }
    if total.is_infinite() {
        tracing::warn!(
            "{} over {} listings overflows f64, clamping to f64::MAX",
            field,
            records.len()
        );
        total = f64::MAX;
    }
    Ok(total)
}

/// Descending weight; the sort is stable so ties keep their incoming order.
fn sort_children_by_weight(children: &mut [GroupNode]) {
    children.sort_by(|a, b| b.weight.total_cmp(&a.weight));
}
