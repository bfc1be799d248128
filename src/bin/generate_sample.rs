//! Writes a synthetic listings file and a matching price model so the app can
//! run offline:
//!
//! ```text
//! cargo run --bin generate_sample
//! VEHICLES_DATA_SOURCE=vehicles_sample.csv cargo run
//! ```

use std::fs::File;
use std::io::Write;

use anyhow::Context;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use serde_json::json;

const LISTINGS_PATH: &str = "vehicles_sample.csv";
const BUNDLE_PATH: &str = "model_bundle.json.gz";
const N_LISTINGS: usize = 2_000;

/// Raw model labels as they appear in listings, with the label the cleaner
/// produces for them.
const MODELS: [(&str, &str); 10] = [
    ("ford f-150", "Ford f-150"),
    ("ford escape", "Ford escape"),
    ("chevrolet silverado 1500", "Chevrolet silverado 1500"),
    ("chevrolet malibu", "Chevrolet malibu"),
    ("toyota camry", "Toyota camry"),
    ("toyota tacoma", "Toyota tacoma"),
    ("honda civic", "Honda civic"),
    ("honda accord", "Honda accord"),
    ("nissan altima", "Nissan altima"),
    ("jeep wrangler", "Jeep wrangler"),
];
const CONDITIONS: [&str; 6] = ["new", "like new", "excellent", "good", "fair", "salvage"];
const FUELS: [&str; 4] = ["gas", "diesel", "hybrid", "electric"];
const TRANSMISSIONS: [&str; 3] = ["automatic", "manual", "other"];
const TYPES: [&str; 6] = ["sedan", "SUV", "pickup", "truck", "coupe", "wagon"];
const COLORS: [&str; 6] = ["white", "black", "silver", "red", "blue", "grey"];

// Price model used both to generate prices and to write the bundle.
// Coefficients follow the default feature order:
// model_year, model, condition, fuel, odometer, transmission, type.
const INTERCEPT: f64 = -1_600_000.0;
const COEFFICIENTS: [f64; 7] = [805.0, 150.0, -450.0, 900.0, -0.06, -700.0, 300.0];

/// Deterministic listing generator state (splitmix64), so every run writes the
/// same sample.
struct ListingRng(u64);

impl ListingRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Normal sample via the Marsaglia polar method.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        loop {
            let u = 2.0 * self.uniform() - 1.0;
            let v = 2.0 * self.uniform() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                return mean + std_dev * u * (-2.0 * s.ln() / s).sqrt();
            }
        }
    }

    fn index(&mut self, len: usize) -> usize {
        ((self.uniform() * len as f64) as usize).min(len - 1)
    }

    fn pick<T: Copy>(&mut self, options: &[T]) -> T {
        options[self.index(options.len())]
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }
}

/// One CSV row; `None` fields are written empty.
#[derive(Serialize)]
struct Listing {
    price: f64,
    model_year: Option<i32>,
    model: &'static str,
    condition: &'static str,
    cylinders: Option<u32>,
    fuel: &'static str,
    odometer: Option<u32>,
    transmission: &'static str,
    #[serde(rename = "type")]
    vehicle_type: &'static str,
    paint_color: Option<&'static str>,
    is_4wd: Option<u8>,
    date_posted: String,
    days_listed: u32,
}

/// Position of `label` in the sorted vocabulary, as the encoder assigns it.
fn code(vocabulary: &[&str], label: &str) -> f64 {
    let mut sorted = vocabulary.to_vec();
    sorted.sort_unstable();
    sorted.iter().position(|&l| l == label).unwrap_or(0) as f64
}

fn sorted(vocabulary: &[&str]) -> Vec<String> {
    let mut classes: Vec<String> = vocabulary.iter().map(|s| s.to_string()).collect();
    classes.sort();
    classes
}

fn generate_listing(rng: &mut ListingRng, model_labels: &[&str]) -> Listing {
    let model = rng.index(MODELS.len());
    let condition = rng.pick(&CONDITIONS);
    let fuel = rng.pick(&FUELS);
    let transmission = rng.pick(&TRANSMISSIONS);
    let vehicle_type = rng.pick(&TYPES);

    let year_posted = 2018 + rng.index(2) as i32;
    let month_posted = 1 + rng.index(12) as u32;
    let day_posted = 1 + rng.index(28) as u32;
    let model_year = year_posted - rng.index(20) as i32;
    let age = f64::from(year_posted - model_year).max(0.5);
    let odometer = rng.normal(age * 15_000.0, 8_000.0).clamp(0.0, 400_000.0).round() as u32;

    let row = [
        f64::from(model_year),
        code(model_labels, MODELS[model].1),
        code(&CONDITIONS, condition),
        code(&FUELS, fuel),
        f64::from(odometer),
        code(&TRANSMISSIONS, transmission),
        code(&TYPES, vehicle_type),
    ];
    let price: f64 = INTERCEPT
        + row.iter().zip(COEFFICIENTS).map(|(x, c)| x * c).sum::<f64>()
        + rng.normal(0.0, 1_500.0);

    Listing {
        price: price.max(500.0).round(),
        model_year: (!rng.chance(0.05)).then_some(model_year),
        model: MODELS[model].0,
        condition,
        cylinders: (!rng.chance(0.1)).then(|| rng.pick(&[4, 6, 8])),
        fuel,
        odometer: (!rng.chance(0.1)).then_some(odometer),
        transmission,
        vehicle_type,
        paint_color: (!rng.chance(0.15)).then(|| rng.pick(&COLORS)),
        is_4wd: rng.chance(0.5).then_some(1),
        date_posted: format!("{year_posted}-{month_posted:02}-{day_posted:02}"),
        days_listed: rng.index(100) as u32,
    }
}

fn main() -> anyhow::Result<()> {
    let mut rng = ListingRng(42);
    let model_labels: Vec<&str> = MODELS.iter().map(|(_, label)| *label).collect();

    // Listings
    let mut writer = csv::Writer::from_path(LISTINGS_PATH)
        .with_context(|| format!("Failed to create {LISTINGS_PATH}"))?;
    for _ in 0..N_LISTINGS {
        writer.serialize(generate_listing(&mut rng, &model_labels))?;
    }
    writer.flush()?;

    // Model bundle
    let bundle = json!({
        "regressor": {
            "kind": "linear",
            "intercept": INTERCEPT,
            "coefficients": COEFFICIENTS,
        },
        "encoder_model": { "classes": sorted(&model_labels) },
        "encoder_condition": { "classes": sorted(&CONDITIONS) },
        "encoder_fuel": { "classes": sorted(&FUELS) },
        "encoder_transmission": { "classes": sorted(&TRANSMISSIONS) },
        "encoder_type": { "classes": sorted(&TYPES) },
    });
    let file = File::create(BUNDLE_PATH).with_context(|| format!("Failed to create {BUNDLE_PATH}"))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(serde_json::to_string(&bundle)?.as_bytes())?;
    encoder.finish()?;

    println!("Wrote {N_LISTINGS} listings to {LISTINGS_PATH} and a price model to {BUNDLE_PATH}");
    Ok(())
}
