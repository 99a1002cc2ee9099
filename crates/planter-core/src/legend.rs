use serde::Serialize;

use crate::plant::PlantRecord;
use crate::schema::{
  ActivityKind,
  Category
};

pub const FALLBACK_COLOR: &str = "grey";
pub const FALLBACK_RANK: u16 = 999;

/// Display attributes shared by every
/// segment with the same label.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize
)]
pub struct LegendEntry {
  pub label: &'static str,
  pub color: &'static str,
  pub rank:  u16
}

const fn entry(
  label: &'static str,
  color: &'static str,
  rank: u16
) -> LegendEntry {
  LegendEntry {
    label,
    color,
    rank
  }
}

const SOW: LegendEntry =
  entry("Sow", "blue", 1);
const CUT: LegendEntry =
  entry("Cut", "darkblue", 2);
const SOFTWOOD: LegendEntry = entry(
  "Softwood Cutting",
  "limegreen",
  3
);
const SEMI_RIPE: LegendEntry = entry(
  "Semi-ripe Cutting",
  "olivedrab",
  4
);
const HARDWOOD: LegendEntry = entry(
  "Hardwood Cutting",
  "saddlebrown",
  5
);
const PLANT: LegendEntry =
  entry("Plant", "purple", 6);
const DIVISION: LegendEntry =
  entry("Division", "darkgreen", 7);
const PLANT_OUT: LegendEntry =
  entry("Plant Out", "orange", 8);
const FLOWER: LegendEntry =
  entry("Flower", "red", 9);

/// Cutting sub-types in the order they
/// are checked against the free-text
/// attribute.
const CUTTING_SUBTYPES: [(
  &str,
  LegendEntry
); 3] = [
  ("softwood", SOFTWOOD),
  ("semi-ripe", SEMI_RIPE),
  ("hardwood", HARDWOOD)
];

const TABLE: [(
  Category,
  ActivityKind,
  LegendEntry
); 13] = [
  (
    Category::AnnualSeed,
    ActivityKind::Sow,
    SOW
  ),
  (
    Category::AnnualSeed,
    ActivityKind::PlantOut,
    PLANT_OUT
  ),
  (
    Category::AnnualSeed,
    ActivityKind::Flower,
    FLOWER
  ),
  (
    Category::PerennialSeed,
    ActivityKind::Sow,
    SOW
  ),
  (
    Category::PerennialSeed,
    ActivityKind::PlantOut,
    PLANT_OUT
  ),
  (
    Category::PerennialSeed,
    ActivityKind::Flower,
    FLOWER
  ),
  (
    Category::Cutting,
    ActivityKind::Cut,
    CUT
  ),
  (
    Category::Cutting,
    ActivityKind::PlantOut,
    PLANT_OUT
  ),
  (
    Category::Cutting,
    ActivityKind::Flower,
    FLOWER
  ),
  (
    Category::Division,
    ActivityKind::Division,
    DIVISION
  ),
  (
    Category::Division,
    ActivityKind::Flower,
    FLOWER
  ),
  (
    Category::Bulb,
    ActivityKind::Plant,
    PLANT
  ),
  (
    Category::Bulb,
    ActivityKind::Flower,
    FLOWER
  )
];

/// Color and legend label of one activity
/// on one row. Pure; unmapped pairs fall
/// back to a neutral color labelled with
/// the activity name.
#[must_use]
pub fn resolve(
  category: Category,
  kind: ActivityKind,
  plant: &PlantRecord
) -> LegendEntry {
  if category == Category::Cutting
    && kind == ActivityKind::Cut
    && let Some(subtype) =
      cutting_subtype(plant.cutting_type())
  {
    return subtype;
  }

  lookup(category, kind)
}

#[must_use]
pub fn lookup(
  category: Category,
  kind: ActivityKind
) -> LegendEntry {
  TABLE
    .iter()
    .find(|(cat, act, _)| {
      *cat == category && *act == kind
    })
    .map(|(_, _, found)| *found)
    .unwrap_or_else(|| {
      tracing::trace!(
        ?category,
        ?kind,
        "unmapped activity; using \
         fallback legend"
      );
      entry(
        kind.label(),
        FALLBACK_COLOR,
        FALLBACK_RANK
      )
    })
}

fn cutting_subtype(
  raw: Option<&str>
) -> Option<LegendEntry> {
  let lower = raw?.to_lowercase();
  CUTTING_SUBTYPES
    .iter()
    .find(|(needle, _)| {
      lower.contains(*needle)
    })
    .map(|(_, found)| *found)
}
