use crate::layout::LayoutItem;

/// RGBA color with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl AppColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a lighter version (for nested groups).
    pub fn lighten(self, amount: f32) -> Self {
        Self {
            r: (self.r + amount).min(1.0),
            g: (self.g + amount).min(1.0),
            b: (self.b + amount).min(1.0),
            a: self.a,
        }
    }

    /// Create a darker version (for frame borders).
    pub fn darken(self, amount: f32) -> Self {
        Self {
            r: (self.r - amount).max(0.0),
            g: (self.g - amount).max(0.0),
            b: (self.b - amount).max(0.0),
            a: self.a,
        }
    }

    /// `#rrggbb` for SVG/HTML renderers.
    pub fn to_hex(self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

/// Neutral fill for the root and for items without a top-level key.
pub const ROOT_COLOR: AppColor = AppColor::new(0.50, 0.50, 0.55);

/// Fill color for everything under one top-level group.
/// Hue comes from the key's hash, so the same key gets the same color in every view.
pub fn group_color(top_key: &str) -> AppColor {
    hsv_to_rgb(hash01(top_key), 0.62, 0.88)
}

/// Fill color for a layout item: its top-level group's color, lightened with depth.
pub fn item_color(item: &LayoutItem) -> AppColor {
    let Some(top) = item.top_key() else {
        return ROOT_COLOR;
    };
    let fade = (item.depth().saturating_sub(1) as f32 * 0.08).min(0.32);
    let base = group_color(top).lighten(fade);
    if item.is_group {
        base.darken(0.15)
    } else {
        base
    }
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> AppColor {
    let h6 = (h * 6.0).rem_euclid(6.0);
    let i = h6.floor() as i32;
    let f = h6 - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    AppColor { r, g, b, a: 1.0 }
}

/// FNV-1a folded to 0..1.
fn hash01(s: &str) -> f32 {
    let mut h: u32 = 2166136261;
    for &b in s.as_bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(16777619);
    }
    ((h >> 8) as f32) / ((u32::MAX >> 8) as f32)
}
