/// Data layer: measurement types, loading, reshaping and filtering.
///
/// Architecture:
/// ```text
///  .csv / .parquet  (wide: lambda, radius (nm), Fe, Fe2O3, Fe3O4)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse → Vec<WideRow> → melt → normalise %
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ MeasurementSet │  Vec<Measurement> (long form)
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  radius bound, per-radius curves
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
