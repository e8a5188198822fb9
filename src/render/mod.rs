//! Drawing hints for a renderer: fill colors and label text for layout items.
//! Nothing here draws or writes files.

pub mod colors;
pub mod labels;

pub use self::colors::{group_color, item_color, AppColor};
pub use self::labels::{format_weight, item_label, item_path, WeightUnit};
