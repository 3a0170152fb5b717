#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::pedantic)]

use chainmap::{ChainedHashMap, MapConfig, ResizePolicy};
use log::info;
use plotters::prelude::*;
use rand::{Rng, distr::Alphanumeric};

// Key/value pairs of the manual smoke run
const FIXTURE: [(&str, &str); 12] = [
    ("apple", "red"),
    ("banana", "yellow"),
    ("carrot", "orange"),
    ("dog", "brown"),
    ("elephant", "gray"),
    ("frog", "green"),
    ("grape", "purple"),
    ("hat", "black"),
    ("ice cream", "white"),
    ("jacket", "blue"),
    ("kite", "pink"),
    ("lion", "golden"),
];

// Random keys used for the chain length histogram
const RANDOM_KEYS: usize = 10_000;

const POLICIES: [(&str, ResizePolicy); 2] =
    [("Preserve slots", ResizePolicy::PreserveSlots), ("Rehash", ResizePolicy::Rehash)];

const DEFAULT_OUTPUT: &str = "chain_lengths.png";

// Replays the manual smoke scenario: fill, overwrite, grow, overwrite again
fn smoke_run() -> Result<(), Box<dyn std::error::Error>> {
    let mut map = ChainedHashMap::new();
    map.set_load_factor(0.75)?;

    for (key, value) in FIXTURE {
        map.set(key.to_string(), value.to_string());
    }

    // overwrite keys
    map.set("ice cream".to_string(), "whitish-cream".to_string());
    map.set("hat".to_string(), "blue-black".to_string());
    map.set("frog".to_string(), "dark-green".to_string());

    // entry number 13 grows the table
    map.set("moon".to_string(), "silver".to_string());
    info!("capacity after 13th key: {}", map.capacity());

    // overwrite keys again after growth
    map.set("apple".to_string(), "light-green".to_string());
    map.set("dog".to_string(), "black and white".to_string());
    map.set("jacket".to_string(), "blue and white".to_string());

    println!("{}", map.len());
    println!("{:?}", map.entries());
    Ok(())
}

// Share of buckets (in percent) for every chain length 0..=max
fn chain_length_shares(lengths: &[usize], max: usize) -> Vec<(usize, f64)> {
    let mut counts = vec![0usize; max + 1];
    for &len in lengths {
        counts[len] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(len, count)| (len, count as f64 * 100.0 / lengths.len() as f64))
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    smoke_run()?;

    let output = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let mut rng = rand::rng();
    let keys: Vec<String> = (0..RANDOM_KEYS)
        .map(|_| {
            let len = rng.random_range(4..16);
            (&mut rng).sample_iter(&Alphanumeric).take(len).map(char::from).collect()
        })
        .collect();

    let mut histograms = Vec::with_capacity(POLICIES.len());
    for (name, policy) in POLICIES {
        let mut map = MapConfig::new().resize_policy(policy).build::<String, usize>()?;
        for (i, key) in keys.iter().enumerate() {
            map.set(key.clone(), i);
        }

        let lengths = map.chain_lengths();
        let longest = lengths.iter().copied().max().unwrap_or(0);
        let empty = lengths.iter().filter(|&&len| len == 0).count();
        println!(
            "{name}: {} entries, {} buckets, {empty} empty, longest chain {longest}",
            map.len(),
            map.capacity()
        );
        histograms.push((name, lengths, longest));
    }

    let max_len = histograms.iter().map(|(_, _, longest)| *longest).max().unwrap_or(0);
    let series: Vec<(&str, Vec<(usize, f64)>)> = histograms
        .iter()
        .map(|(name, lengths, _)| (*name, chain_length_shares(lengths, max_len)))
        .collect();

    let font_family = "sans-serif";
    let colors = [
        RGBColor(220, 50, 50), // Bright red
        RGBColor(50, 90, 220), // Bright blue
    ];
    let line_width = 2;
    let marker_size = 4;
    let text_size = 16;
    let title_size = 35;

    let root = BitMapBackend::new(&output, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_share = series
        .iter()
        .flat_map(|(_, points)| points.iter().map(|(_, share)| *share))
        .fold(0.0, f64::max) *
        1.1; // Add 10% margin

    let mut chart = ChartBuilder::on(&root)
        .caption("Chain Length Distribution After Growth", (font_family, title_size))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .right_y_label_area_size(10)
        .build_cartesian_2d(0..max_len + 1, 0.0..max_share)?;

    chart
        .configure_mesh()
        .x_desc("Chain Length")
        .y_desc("Buckets (%)")
        .axis_desc_style((font_family, text_size))
        .draw()?;

    for (idx, (name, points)) in series.iter().enumerate() {
        let color = &colors[idx % colors.len()];
        let line_style = ShapeStyle::from(color).stroke_width(line_width);

        chart
            .draw_series(LineSeries::new(points.iter().copied(), line_style))?
            .label(*name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series(
            points.iter().map(|&(len, share)| Circle::new((len, share), marker_size, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    println!("Generated chain length plot: {output}");

    Ok(())
}
