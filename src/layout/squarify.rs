use super::Rect;

/// Squarified subdivision of `bounds` (Bruls, Huizing & van Wijk 2000).
///
/// `areas` should already be scaled so they sum to `bounds.area()` and be
/// sorted largest first. Returns one rectangle per area, in input order.
/// The last strip takes whatever is left of `bounds`, so the output tiles it
/// exactly even when the areas carry rounding error.
pub fn squarify(areas: &[f64], bounds: Rect) -> Vec<Rect> {
    let mut result = Vec::with_capacity(areas.len());
    let mut free = bounds;
    let mut start = 0;

    while start < areas.len() {
        if free.is_degenerate() {
            tracing::trace!(
                "Squarify: no room left for {} items in {:?}",
                areas.len() - start,
                free
            );
            result.extend(areas[start..].iter().map(|_| free.collapsed()));
            break;
        }

        let side = free.w.min(free.h);
        let end = close_strip(areas, start, side);
        free = place_strip(&areas[start..end], free, end == areas.len(), &mut result);
        start = end;
    }

    result
}

/// Grow a strip from `start` while the worst aspect ratio keeps improving (or
/// holds). Returns the exclusive end of the strip.
fn close_strip(areas: &[f64], start: usize, side: f64) -> usize {
    let mut end = start + 1;
    let mut sum = areas[start];
    let mut worst = worst_aspect_ratio(&areas[start..end], sum, side);

    while end < areas.len() {
        let next_sum = sum + areas[end];
        let next_worst = worst_aspect_ratio(&areas[start..=end], next_sum, side);
        if next_worst > worst {
            break;
        }
        sum = next_sum;
        worst = next_worst;
        end += 1;
    }

    end
}

/// Lay `row` out across the shorter side of `free` and return what remains.
fn place_strip(row: &[f64], free: Rect, is_last: bool, out: &mut Vec<Rect>) -> Rect {
    let sum: f64 = row.iter().sum();

    // A wide rectangle gets a column on its left, a tall one a row on its top.
    let column = free.w >= free.h;
    let (side, long) = if column {
        (free.h, free.w)
    } else {
        (free.w, free.h)
    };
    let thickness = if is_last {
        long
    } else {
        (sum / side).min(long)
    };

    let mut offset = 0.0;
    for (i, &area) in row.iter().enumerate() {
        let length = if i + 1 == row.len() {
            (side - offset).max(0.0)
        } else if thickness > 0.0 {
            area / thickness
        } else {
            0.0
        };

        out.push(if column {
            Rect::new(free.x, free.y + offset, thickness, length)
        } else {
            Rect::new(free.x + offset, free.y, length, thickness)
        });
        offset += length;
    }

    if column {
        Rect::new(free.x + thickness, free.y, free.w - thickness, free.h)
    } else {
        Rect::new(free.x, free.y + thickness, free.w, free.h - thickness)
    }
}

/// Worst (largest) aspect ratio of `row` laid out along a side of length `side`.
pub fn worst_aspect_ratio(row: &[f64], sum: f64, side: f64) -> f64 {
    if row.is_empty() || sum <= 0.0 || side <= 0.0 {
        return f64::MAX;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    let max_r = row.iter().copied().fold(0.0, f64::max);
    let min_r = row.iter().copied().fold(f64::INFINITY, f64::min);
    let a = (side_sq * max_r) / sum_sq;
    let b = sum_sq / (side_sq * min_r);
    a.max(b)
}
