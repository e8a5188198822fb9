/// Diagnostic tool to verify the listings → hierarchy → layout pipeline
use std::path::PathBuf;

use anyhow::{bail, Context};
use parcelview_rs::dataset::loader::load_records;
use parcelview_rs::layout::LayoutConfig;
use parcelview_rs::render::{item_color, item_label, item_path};
use parcelview_rs::{PriceBins, Rect, View, ViewLayout};
use rayon::prelude::*;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("parcelview_rs=debug".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(csv_path) = args.next().map(PathBuf::from) else {
        bail!("usage: debug-layout <listings.csv> [width] [height]");
    };
    let width: f64 = match args.next() {
        Some(w) => w.parse().with_context(|| format!("bad width `{w}`"))?,
        None => 1600.0,
    };
    let height: f64 = match args.next() {
        Some(h) => h.parse().with_context(|| format!("bad height `{h}`"))?,
        None => 900.0,
    };

    println!("=== DIAGNOSTIC: Listings → Hierarchy → Layout ===");
    println!("Input: {}", csv_path.display());

    let records = load_records(&csv_path, &PriceBins::default())
        .with_context(|| format!("failed to load {}", csv_path.display()))?;
    println!("\n[1] Loaded {} listings", records.len());

    let bounds = Rect::new(0.0, 0.0, width, height);
    let config = LayoutConfig::default();

    // Views are independent; lay them all out at once
    let views: Vec<ViewLayout> = View::ALL
        .par_iter()
        .map(|view| view.build(&records, bounds, &config))
        .collect::<parcelview_rs::Result<_>>()?;

    for (i, built) in views.iter().enumerate() {
        report(i + 2, built);
    }

    Ok(())
}

fn report(step: usize, built: &ViewLayout) {
    let layout = &built.layout;
    let unit = built.view.unit();

    println!("\n[{}] {} ({})", step, built.view.title(), built.view.slug());
    println!(
        "    Groups: {} leaves, {} levels, root weight {:.2}",
        built.root.leaf_count(),
        built.root.height(),
        built.root.weight
    );
    println!(
        "    Coverage: {:.1}%   Worst aspect ratio: {:.2}",
        layout.coverage() * 100.0,
        layout.worst_aspect_ratio()
    );

    let mut largest: Vec<_> = layout.leaves().collect();
    largest.sort_by(|a, b| b.rect.area().total_cmp(&a.rect.area()));

    println!("    Top 10 rectangles by area:");
    for (i, item) in largest.iter().take(10).enumerate() {
        println!(
            "    [{}] '{}' - {:.1}x{:.1} at ({:.1}, {:.1}) {} - {}",
            i,
            item_path(item),
            item.rect.w,
            item.rect.h,
            item.rect.x,
            item.rect.y,
            item_color(item).to_hex(),
            item_label(item, unit).replace('\n', " | ")
        );
    }

    let empty = layout.leaves().filter(|i| i.rect.area() <= 0.0).count();
    if empty > 0 {
        println!("    ✗ WARNING: {} leaves have zero area", empty);
    }
}
