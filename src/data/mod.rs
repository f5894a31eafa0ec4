/// Data layer: loading, cleaning, aggregating and filtering listings.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<RawListing> (every cell as text)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  trim, fix borough spelling, parse numbers
///   └───────────┘        → NormalizedData { rated, mapped, catalog }
///        │
///        ├───────────────────────┐
///        ▼                       ▼
///   ┌──────────┐           ┌───────────┐
///   │  filter   │ indices   │ aggregate  │  mean review per
///   └──────────┘ ────────▶ └───────────┘  (borough, neighbourhood)
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
