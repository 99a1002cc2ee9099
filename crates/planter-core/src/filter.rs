use std::collections::BTreeSet;

use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  trace,
  warn
};

use crate::plant::PlantRecord;
use crate::schema::{
  ActivityClass,
  ActivitySchema,
  ActivitySpec
};

/// Which activity classes take part in
/// month filtering and get drawn.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize
)]
pub struct ActivityToggles {
  pub primary:   bool,
  pub plant_out: bool,
  pub flower:    bool
}

impl ActivityToggles {
  #[must_use]
  pub fn all() -> Self {
    Self {
      primary:   true,
      plant_out: true,
      flower:    true
    }
  }

  #[must_use]
  pub fn enabled(
    &self,
    class: ActivityClass
  ) -> bool {
    match class {
      | ActivityClass::Primary => {
        self.primary
      }
      | ActivityClass::PlantOut => {
        self.plant_out
      }
      | ActivityClass::Flower => {
        self.flower
      }
    }
  }

  #[must_use]
  pub fn any(&self) -> bool {
    self.primary
      || self.plant_out
      || self.flower
  }
}

/// Snapshot of the user's selection for
/// one evaluation.
#[derive(
  Debug,
  Clone,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize
)]
pub struct FilterState {
  pub query:       String,
  /// `None` selects every month.
  pub month:       Option<u32>,
  pub activities:  ActivityToggles,
  pub light_types: BTreeSet<String>
}

impl FilterState {
  /// Sentinel month number meaning "all
  /// months".
  pub const ALL_MONTHS: u32 = 0;

  #[must_use]
  pub fn with_month_number(
    mut self,
    month: u32
  ) -> Self {
    self.month =
      if month == Self::ALL_MONTHS {
        None
      } else {
        Some(month)
      };
    self
  }
}

#[derive(Debug, Clone)]
pub enum Pred {
  NameContains(String),
  ActiveIn {
    spec:  ActivitySpec,
    month: u32
  },
  LightIn(BTreeSet<String>)
}

#[derive(Debug, Clone)]
enum Expr {
  True,
  Pred(Pred),
  And(Vec<Expr>),
  Or(Vec<Expr>)
}

/// Row predicate compiled from a
/// [`FilterState`] against one category
/// schema.
#[derive(Debug, Clone)]
pub struct Filter {
  expr: Expr
}

impl Default for Filter {
  fn default() -> Self {
    Self {
      expr: Expr::True
    }
  }
}

impl Filter {
  #[tracing::instrument(skip_all, fields(category = ?schema.category))]
  pub fn compile(
    schema: &ActivitySchema,
    state: &FilterState
  ) -> Self {
    let mut nodes = Vec::new();

    if !state.query.is_empty() {
      nodes.push(Expr::Pred(
        Pred::NameContains(
          state.query.to_lowercase()
        )
      ));
    }

    match state.month {
      | None
      | Some(FilterState::ALL_MONTHS) => {}
      | Some(month)
        if !(1..=12).contains(&month) =>
      {
        warn!(
          month,
          "month out of range; no row \
           can match"
        );
        nodes.push(Expr::Or(Vec::new()));
      }
      | Some(month)
        if !state.activities.any() =>
      {
        debug!(
          month,
          "no activity toggle enabled; \
           month filter bypassed"
        );
      }
      | Some(month) => {
        let alternatives: Vec<Expr> =
          schema
            .iter()
            .filter(|spec| {
              state
                .activities
                .enabled(spec.kind.class())
            })
            .map(|spec| {
              Expr::Pred(Pred::ActiveIn {
                spec: *spec,
                month
              })
            })
            .collect();

        if alternatives.is_empty() {
          debug!(
            month,
            "enabled activities absent \
             from schema; nothing matches"
          );
        }
        nodes
          .push(Expr::Or(alternatives));
      }
    }

    let lights: BTreeSet<String> = state
      .light_types
      .iter()
      .map(|light| {
        light.trim().to_string()
      })
      .filter(|light| !light.is_empty())
      .collect();
    if !lights.is_empty() {
      nodes.push(Expr::Pred(
        Pred::LightIn(lights)
      ));
    }

    let expr = if nodes.is_empty() {
      Expr::True
    } else {
      Expr::And(nodes)
    };
    debug!(?expr, "compiled row filter");

    Self {
      expr
    }
  }

  #[must_use]
  pub fn matches(
    &self,
    plant: &PlantRecord
  ) -> bool {
    eval_expr(&self.expr, plant)
  }

  /// Keeps the matching rows in input
  /// order.
  #[tracing::instrument(skip_all, fields(rows = rows.len()))]
  pub fn select<'a>(
    &self,
    rows: &'a [PlantRecord]
  ) -> Vec<&'a PlantRecord> {
    let selected: Vec<&PlantRecord> =
      rows
        .iter()
        .filter(|plant| {
          self.matches(plant)
        })
        .collect();
    debug!(
      selected = selected.len(),
      "rows selected"
    );
    selected
  }
}

#[must_use]
pub fn select_rows<'a>(
  rows: &'a [PlantRecord],
  schema: &ActivitySchema,
  state: &FilterState
) -> Vec<&'a PlantRecord> {
  Filter::compile(schema, state)
    .select(rows)
}

/// Distinct light values in first-seen
/// order.
#[must_use]
pub fn available_light_types(
  rows: &[PlantRecord]
) -> Vec<String> {
  let mut seen = BTreeSet::new();
  rows
    .iter()
    .filter_map(|plant| plant.light())
    .filter(|light| seen.insert(*light))
    .map(str::to_string)
    .collect()
}

fn eval_expr(
  expr: &Expr,
  plant: &PlantRecord
) -> bool {
  match expr {
    | Expr::True => true,
    | Expr::Pred(pred) => {
      eval_pred(pred, plant)
    }
    | Expr::And(nodes) => {
      nodes
        .iter()
        .all(|node| eval_expr(node, plant))
    }
    | Expr::Or(nodes) => {
      nodes
        .iter()
        .any(|node| eval_expr(node, plant))
    }
  }
}

fn eval_pred(
  pred: &Pred,
  plant: &PlantRecord
) -> bool {
  let ok = match pred {
    | Pred::NameContains(needle) => {
      plant
        .name
        .to_lowercase()
        .contains(needle.as_str())
    }
    | Pred::ActiveIn {
      spec,
      month
    } => {
      plant
        .month_range(spec)
        .map(|range| range.contains(*month))
        .unwrap_or(false)
    }
    | Pred::LightIn(lights) => {
      plant
        .light()
        .map(|light| lights.contains(light))
        .unwrap_or(false)
    }
  };

  trace!(pred = ?pred, row = plant.row, name = %plant.name, ok, "filter predicate evaluation");
  ok
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::Category;

  fn cutting(
    row: usize,
    name: &str,
    cut: (&str, &str),
    flower: (&str, &str),
    light: &str
  ) -> PlantRecord {
    PlantRecord::new(
      row,
      name.to_string(),
      Category::Cutting
    )
    .with_field("Cut Start", cut.0)
    .with_field("Cut End", cut.1)
    .with_field("Flower Start", flower.0)
    .with_field("Flower End", flower.1)
    .with_field("Light", light)
  }

  fn sample() -> Vec<PlantRecord> {
    vec![
      cutting(
        0,
        "Climbing Rose",
        ("Jun", "Aug"),
        ("Jun", "Sep"),
        "Full Sun"
      ),
      cutting(
        1,
        "Lavender",
        ("Mar", "May"),
        ("Jul", "Aug"),
        "Full Sun"
      ),
      cutting(
        2,
        "Holly",
        ("Oct", "Mar"),
        ("May", "Jun"),
        "Partial Shade"
      ),
      cutting(
        3,
        "Mystery",
        ("Later", "Soon"),
        ("", ""),
        ""
      ),
    ]
  }

  fn names(
    rows: &[&PlantRecord]
  ) -> Vec<String> {
    rows
      .iter()
      .map(|plant| plant.name.clone())
      .collect()
  }

  #[test]
  fn text_filter_is_case_insensitive_substring()
   {
    let rows = sample();
    let state = FilterState {
      query: "ROSE".to_string(),
      ..FilterState::default()
    };
    let out = select_rows(
      &rows,
      Category::Cutting.schema(),
      &state
    );
    assert_eq!(names(&out), vec![
      "Climbing Rose"
    ]);
  }

  #[test]
  fn all_months_bypasses_activity_filter()
   {
    let rows = sample();
    let state = FilterState::default()
      .with_month_number(
        FilterState::ALL_MONTHS
      );
    let out = select_rows(
      &rows,
      Category::Cutting.schema(),
      &state
    );
    assert_eq!(out.len(), rows.len());
  }

  #[test]
  fn month_without_toggles_is_bypassed()
  {
    let rows = sample();
    let state = FilterState::default()
      .with_month_number(12);
    let out = select_rows(
      &rows,
      Category::Cutting.schema(),
      &state
    );
    assert_eq!(out.len(), rows.len());
  }

  #[test]
  fn enabled_activities_are_disjunctive()
  {
    let rows = sample();
    let schema = Category::Cutting.schema();

    let primary_only = FilterState {
      activities: ActivityToggles {
        primary: true,
        ..ActivityToggles::default()
      },
      ..FilterState::default()
    }
    .with_month_number(12);
    assert_eq!(
      names(&select_rows(
        &rows,
        schema,
        &primary_only
      )),
      vec!["Holly"]
    );

    let primary_or_flower = FilterState {
      activities: ActivityToggles {
        primary: true,
        flower: true,
        ..ActivityToggles::default()
      },
      ..FilterState::default()
    }
    .with_month_number(7);
    assert_eq!(
      names(&select_rows(
        &rows,
        schema,
        &primary_or_flower
      )),
      vec!["Climbing Rose", "Lavender"]
    );
  }

  #[test]
  fn unresolvable_ranges_never_match_a_month()
   {
    let rows = sample();
    let state = FilterState {
      activities: ActivityToggles::all(),
      ..FilterState::default()
    }
    .with_month_number(6);
    let out = select_rows(
      &rows,
      Category::Cutting.schema(),
      &state
    );
    assert!(
      !names(&out)
        .contains(&"Mystery".to_string())
    );
  }

  #[test]
  fn light_filter_requires_membership() {
    let rows = sample();
    let state = FilterState {
      light_types: BTreeSet::from([
        " Partial Shade ".to_string()
      ]),
      ..FilterState::default()
    };
    let out = select_rows(
      &rows,
      Category::Cutting.schema(),
      &state
    );
    assert_eq!(names(&out), vec!["Holly"]);
  }

  #[test]
  fn filters_combine_conjunctively() {
    let rows = sample();
    let state = FilterState {
      query: "l".to_string(),
      activities: ActivityToggles {
        primary: true,
        ..ActivityToggles::default()
      },
      light_types: BTreeSet::from([
        "Full Sun".to_string()
      ]),
      ..FilterState::default()
    }
    .with_month_number(4);
    let out = select_rows(
      &rows,
      Category::Cutting.schema(),
      &state
    );
    assert_eq!(names(&out), vec![
      "Lavender"
    ]);
  }

  #[test]
  fn toggle_missing_from_schema_matches_nothing()
   {
    let rows = vec![
      PlantRecord::new(
        0,
        "Hosta".to_string(),
        Category::Division
      )
      .with_field("Division Start", "Mar")
      .with_field("Division End", "Apr"),
      PlantRecord::new(
        1,
        "Iris".to_string(),
        Category::Division
      )
      .with_field("Division Start", "Sep")
      .with_field("Division End", "Oct"),
    ];
    let state = FilterState {
      activities: ActivityToggles {
        plant_out: true,
        ..ActivityToggles::default()
      },
      ..FilterState::default()
    }
    .with_month_number(6);
    let out = select_rows(
      &rows,
      Category::Division.schema(),
      &state
    );
    assert!(out.is_empty());
  }

  #[test]
  fn raw_zero_month_means_all_months() {
    let rows = sample();
    let state: FilterState =
      serde_json::from_str(
        r#"{
          "query": "",
          "month": 0,
          "activities": {
            "primary": true,
            "plant_out": true,
            "flower": true
          },
          "light_types": []
        }"#
      )
      .unwrap();
    assert_eq!(state.month, Some(0));

    let out = select_rows(
      &rows,
      Category::Cutting.schema(),
      &state
    );
    assert_eq!(out.len(), rows.len());
  }

  #[test]
  fn out_of_range_month_matches_nothing() {
    let rows = sample();
    let state = FilterState {
      month: Some(13),
      activities: ActivityToggles::all(),
      ..FilterState::default()
    };
    let out = select_rows(
      &rows,
      Category::Cutting.schema(),
      &state
    );
    assert!(out.is_empty());
  }

  #[test]
  fn selection_is_idempotent() {
    let rows = sample();
    let schema = Category::Cutting.schema();
    let state = FilterState {
      query: "o".to_string(),
      activities: ActivityToggles::all(),
      ..FilterState::default()
    }
    .with_month_number(6);

    let first =
      select_rows(&rows, schema, &state);
    let second =
      select_rows(&rows, schema, &state);
    assert_eq!(first, second);
  }

  #[test]
  fn light_types_keep_first_seen_order() {
    let rows = sample();
    assert_eq!(
      available_light_types(&rows),
      vec!["Full Sun", "Partial Shade"]
    );
  }
}
