use std::fmt;

use clap::ValueEnum;
use serde::{
  Deserialize,
  Serialize
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  ValueEnum
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
  AnnualSeed,
  PerennialSeed,
  Cutting,
  Division,
  Bulb
}

impl Category {
  pub const ALL: [Category; 5] = [
    Category::AnnualSeed,
    Category::PerennialSeed,
    Category::Cutting,
    Category::Division,
    Category::Bulb
  ];

  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      | Category::AnnualSeed => {
        "Annuals From Seed"
      }
      | Category::PerennialSeed => {
        "Perennials From Seed"
      }
      | Category::Cutting => {
        "Perennials & Shrubs From \
         Cuttings"
      }
      | Category::Division => {
        "Perennials by Division"
      }
      | Category::Bulb => {
        "Bulbs Corms & Tubers"
      }
    }
  }

  #[must_use]
  pub fn file_name(
    self
  ) -> &'static str {
    match self {
      | Category::AnnualSeed => {
        "Annuals_by_Seed.csv"
      }
      | Category::PerennialSeed => {
        "Perennials_by_Seed.csv"
      }
      | Category::Cutting => {
        "Perennials_Shrubs_by_Cutting.csv"
      }
      | Category::Division => {
        "Perennials_by_Division.csv"
      }
      | Category::Bulb => {
        "Bulbs_Corms_Tubers.csv"
      }
    }
  }

  #[must_use]
  pub fn slug(self) -> &'static str {
    match self {
      | Category::AnnualSeed => {
        "annual-seed"
      }
      | Category::PerennialSeed => {
        "perennial-seed"
      }
      | Category::Cutting => "cutting",
      | Category::Division => "division",
      | Category::Bulb => "bulb"
    }
  }

  #[must_use]
  pub fn schema(
    self
  ) -> &'static ActivitySchema {
    ActivitySchema::for_category(self)
  }
}

impl fmt::Display for Category {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize
)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
  Sow,
  Cut,
  Plant,
  Division,
  PlantOut,
  Flower
}

impl ActivityKind {
  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      | ActivityKind::Sow => "Sow",
      | ActivityKind::Cut => "Cut",
      | ActivityKind::Plant => "Plant",
      | ActivityKind::Division => {
        "Division"
      }
      | ActivityKind::PlantOut => {
        "Plant Out"
      }
      | ActivityKind::Flower => "Flower"
    }
  }

  #[must_use]
  pub fn class(self) -> ActivityClass {
    match self {
      | ActivityKind::Sow
      | ActivityKind::Cut
      | ActivityKind::Plant
      | ActivityKind::Division => {
        ActivityClass::Primary
      }
      | ActivityKind::PlantOut => {
        ActivityClass::PlantOut
      }
      | ActivityKind::Flower => {
        ActivityClass::Flower
      }
    }
  }
}

impl fmt::Display for ActivityKind {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// The three toggles a user can flip.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize
)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityClass {
  Primary,
  PlantOut,
  Flower
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySpec {
  pub kind:        ActivityKind,
  pub start_field: &'static str,
  pub end_field:   &'static str
}

const fn spec(
  kind: ActivityKind,
  start_field: &'static str,
  end_field: &'static str
) -> ActivitySpec {
  ActivitySpec {
    kind,
    start_field,
    end_field
  }
}

const PLANT_OUT: ActivitySpec = spec(
  ActivityKind::PlantOut,
  "Plant Out Start",
  "Plant Out End"
);

const FLOWER: ActivitySpec = spec(
  ActivityKind::Flower,
  "Flower Start",
  "Flower End"
);

const SEED_ACTIVITIES: [ActivitySpec;
  3] = [
  spec(
    ActivityKind::Sow,
    "Sow Start",
    "Sow End"
  ),
  PLANT_OUT,
  FLOWER
];

const CUTTING_ACTIVITIES: [ActivitySpec;
  3] = [
  spec(
    ActivityKind::Cut,
    "Cut Start",
    "Cut End"
  ),
  PLANT_OUT,
  FLOWER
];

const DIVISION_ACTIVITIES: [ActivitySpec;
  2] = [
  spec(
    ActivityKind::Division,
    "Division Start",
    "Division End"
  ),
  FLOWER
];

const BULB_ACTIVITIES: [ActivitySpec;
  2] = [
  spec(
    ActivityKind::Plant,
    "Plant Start",
    "Plant End"
  ),
  FLOWER
];

/// Ordered activities of one category.
/// The first entry is the primary
/// activity.
#[derive(Debug, PartialEq, Eq)]
pub struct ActivitySchema {
  pub category:   Category,
  pub activities: &'static [ActivitySpec]
}

static ANNUAL_SEED_SCHEMA: ActivitySchema =
  ActivitySchema {
    category:   Category::AnnualSeed,
    activities: &SEED_ACTIVITIES
  };

static PERENNIAL_SEED_SCHEMA:
  ActivitySchema = ActivitySchema {
  category:   Category::PerennialSeed,
  activities: &SEED_ACTIVITIES
};

static CUTTING_SCHEMA: ActivitySchema =
  ActivitySchema {
    category:   Category::Cutting,
    activities: &CUTTING_ACTIVITIES
  };

static DIVISION_SCHEMA: ActivitySchema =
  ActivitySchema {
    category:   Category::Division,
    activities: &DIVISION_ACTIVITIES
  };

static BULB_SCHEMA: ActivitySchema =
  ActivitySchema {
    category:   Category::Bulb,
    activities: &BULB_ACTIVITIES
  };

impl ActivitySchema {
  #[must_use]
  pub fn for_category(
    category: Category
  ) -> &'static ActivitySchema {
    match category {
      | Category::AnnualSeed => {
        &ANNUAL_SEED_SCHEMA
      }
      | Category::PerennialSeed => {
        &PERENNIAL_SEED_SCHEMA
      }
      | Category::Cutting => {
        &CUTTING_SCHEMA
      }
      | Category::Division => {
        &DIVISION_SCHEMA
      }
      | Category::Bulb => &BULB_SCHEMA
    }
  }

  #[must_use]
  pub fn primary(&self) -> &ActivitySpec {
    &self.activities[0]
  }

  /// Number of parallel lanes a row
  /// needs on the chart.
  #[must_use]
  pub fn lane_count(&self) -> usize {
    self.activities.len()
  }

  #[must_use]
  pub fn get(
    &self,
    kind: ActivityKind
  ) -> Option<&ActivitySpec> {
    self
      .activities
      .iter()
      .find(|spec| spec.kind == kind)
  }

  pub fn iter(
    &self
  ) -> impl Iterator<Item = &ActivitySpec>
  {
    self.activities.iter()
  }
}
