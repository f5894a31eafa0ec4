use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

/// Rectangular stand-ins for the five boroughs: (name, lon_min, lat_min, lon_max, lat_max).
const BOROUGHS: [(&str, f64, f64, f64, f64); 5] = [
    ("Staten Island", -74.25, 40.50, -74.05, 40.65),
    ("Brooklyn", -74.05, 40.57, -73.85, 40.70),
    ("Manhattan", -74.02, 40.70, -73.93, 40.88),
    ("Queens", -73.93, 40.70, -73.70, 40.80),
    ("Bronx", -73.93, 40.80, -73.76, 40.90),
];

const NEIGHBOURHOODS: [[&str; 3]; 5] = [
    ["St. George", "Tottenville", "Great Kills"],
    ["Williamsburg", "Bushwick", "Park Slope"],
    ["Harlem", "Midtown", "East Village"],
    ["Astoria", "Flushing", "Long Island City"],
    ["Mott Haven", "Fordham", "Riverdale"],
];

const ROOM_TYPES: [&str; 4] = ["Entire home/apt", "Private room", "Shared room", "Hotel room"];

const ROWS: usize = 1500;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn index(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// `1060` → `"$1,060"`, the way prices appear in the published dump.
fn dollars(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::from("$");
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

struct Row {
    id: i64,
    name: String,
    borough: String,
    neighbourhood: String,
    lat: Option<f64>,
    long: Option<f64>,
    room_type: String,
    year: Option<i64>,
    price: String,
    review: Option<i64>,
}

fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    (0..ROWS)
        .map(|i| {
            let b = rng.index(BOROUGHS.len());
            let (name, lon_min, lat_min, lon_max, lat_max) = BOROUGHS[b];
            let neighbourhood = NEIGHBOURHOODS[b][rng.index(3)];
            let room_type = ROOM_TYPES[rng.index(ROOM_TYPES.len())];

            // Deliberate dirt: misspelled boroughs, unpriced rows, points in
            // the water, missing reviews and coordinates.
            let borough = match name {
                "Brooklyn" if rng.chance(0.05) => "brookln".to_string(),
                "Manhattan" if rng.chance(0.05) => "manhatan".to_string(),
                _ => name.to_string(),
            };
            let price = if rng.chance(0.02) {
                "N/A".to_string()
            } else {
                let base = if name == "Manhattan" { 250.0 } else { 50.0 };
                dollars(rng.range(base, 1200.0) as u64)
            };
            let (long, lat) = if rng.chance(0.02) {
                (None, None)
            } else if rng.chance(0.02) {
                (Some(rng.range(-73.60, -73.40)), Some(rng.range(40.50, 40.90)))
            } else {
                (
                    Some(rng.range(lon_min, lon_max)),
                    Some(rng.range(lat_min, lat_max)),
                )
            };
            let review = if rng.chance(0.03) {
                None
            } else {
                Some(1 + rng.index(5) as i64)
            };
            let year = if rng.chance(0.01) {
                None
            } else {
                Some(2003 + rng.index(20) as i64)
            };

            Row {
                id: 1_000_000 + i as i64,
                name: format!("{room_type} in {neighbourhood}"),
                borough,
                neighbourhood: neighbourhood.to_string(),
                lat,
                long,
                room_type: room_type.to_string(),
                year,
                price,
                review,
            }
        })
        .collect()
}

fn write_parquet(rows: &[Row], path: &str) {
    let text = |f: fn(&Row) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let float = |f: fn(&Row) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let int = |f: fn(&Row) -> Option<i64>| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("NAME", DataType::Utf8, false),
        Field::new("neighbourhood group", DataType::Utf8, false),
        Field::new("neighbourhood", DataType::Utf8, false),
        Field::new("lat", DataType::Float64, true),
        Field::new("long", DataType::Float64, true),
        Field::new("room type", DataType::Utf8, false),
        Field::new("Construction year", DataType::Int64, true),
        Field::new("price", DataType::Utf8, false),
        Field::new("review rate number", DataType::Int64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.id).collect::<Vec<_>>())) as ArrayRef,
            text(|r| r.name.as_str()),
            text(|r| r.borough.as_str()),
            text(|r| r.neighbourhood.as_str()),
            float(|r| r.lat),
            float(|r| r.long),
            text(|r| r.room_type.as_str()),
            int(|r| r.year),
            text(|r| r.price.as_str()),
            int(|r| r.review),
        ],
    )
    .expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn write_csv(rows: &[Row], path: &str) {
    let cell = |v: Option<String>| v.unwrap_or_default();
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .expect("Failed to create output file");
    writer
        .write_record([
            "id",
            "NAME",
            "neighbourhood group",
            "neighbourhood",
            "lat",
            "long",
            "room type",
            "Construction year",
            "price",
            "review rate number",
        ])
        .expect("Failed to write header");
    for r in rows {
        writer
            .write_record([
                r.id.to_string(),
                r.name.clone(),
                r.borough.clone(),
                r.neighbourhood.clone(),
                cell(r.lat.map(|v| format!("{v:.5}"))),
                cell(r.long.map(|v| format!("{v:.5}"))),
                r.room_type.clone(),
                cell(r.year.map(|v| v.to_string())),
                r.price.clone(),
                cell(r.review.map(|v| v.to_string())),
            ])
            .expect("Failed to write row");
    }
    // A truncated row, dropped during normalization.
    writer
        .write_record(["9999999", "truncated"])
        .expect("Failed to write row");
    writer.flush().expect("Failed to flush CSV");
}

fn write_boroughs(path: &str) {
    let features: Vec<_> = BOROUGHS
        .iter()
        .enumerate()
        .map(|(i, &(name, x0, y0, x1, y1))| {
            json!({
                "type": "Feature",
                "properties": { "boro_code": (i + 1).to_string(), "boro_name": name },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]]]
                }
            })
        })
        .collect();
    let collection = json!({ "type": "FeatureCollection", "features": features });
    let text = serde_json::to_string_pretty(&collection).expect("Failed to encode GeoJSON");
    std::fs::write(path, text).expect("Failed to write GeoJSON");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    write_parquet(&rows, "sample_listings.parquet");
    write_csv(&rows, "sample_listings.csv");
    write_boroughs("sample_boroughs.geojson");

    println!(
        "Wrote {} listings to sample_listings.parquet and sample_listings.csv, \
         {} boroughs to sample_boroughs.geojson",
        rows.len(),
        BOROUGHS.len()
    );
}
