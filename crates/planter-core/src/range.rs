use serde::Serialize;

use crate::calendar::{
  YEAR_END_DAY,
  month_boundary,
  month_end_day,
  month_number_of
};

const RANGE_SEPARATORS: [char; 2] =
  ['-', '–'];

/// Inclusive span on the day-of-year
/// axis. `start <= end` always holds.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize
)]
pub struct DayInterval {
  pub start: u32,
  pub end:   u32
}

impl DayInterval {
  #[must_use]
  pub fn new(
    start: u32,
    end: u32
  ) -> Option<Self> {
    (start <= end).then_some(Self {
      start,
      end
    })
  }

  /// Inclusive day count.
  #[must_use]
  pub fn len(&self) -> u32 {
    (self.end + 1)
      .saturating_sub(self.start)
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.end < self.start
  }

  #[must_use]
  pub fn contains(
    &self,
    day: u32
  ) -> bool {
    self.start <= day && day <= self.end
  }

  #[must_use]
  pub fn overlaps(
    &self,
    other: &DayInterval
  ) -> bool {
    self.start <= other.end
      && other.start <= self.end
  }
}

/// Activity window expressed in month
/// numbers. `start > end` marks a range
/// that runs through December into the
/// next year.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize
)]
pub struct MonthRange {
  start: u32,
  end:   u32
}

impl MonthRange {
  #[must_use]
  pub fn new(
    start: u32,
    end: u32
  ) -> Option<Self> {
    if (1..=12).contains(&start)
      && (1..=12).contains(&end)
    {
      Some(Self {
        start,
        end
      })
    } else {
      None
    }
  }

  /// Builds a range from the raw start and
  /// end cells of a row. A cell may itself
  /// hold a span such as `Mar-Apr`; the
  /// start cell contributes its first
  /// token and the end cell its last.
  #[must_use]
  pub fn from_cells(
    start_cell: &str,
    end_cell: &str
  ) -> Option<Self> {
    let start_token = start_cell
      .split(RANGE_SEPARATORS)
      .next()?
      .trim();
    let end_token = end_cell
      .rsplit(RANGE_SEPARATORS)
      .next()?
      .trim();

    Self::new(
      month_number_of(start_token)?,
      month_number_of(end_token)?
    )
  }

  #[must_use]
  pub fn start(&self) -> u32 {
    self.start
  }

  #[must_use]
  pub fn end(&self) -> u32 {
    self.end
  }

  #[must_use]
  pub fn is_wrap(&self) -> bool {
    self.start > self.end
  }

  /// Boundary-inclusive month test.
  #[must_use]
  pub fn contains(
    &self,
    month: u32
  ) -> bool {
    if self.is_wrap() {
      month >= self.start
        || month <= self.end
    } else {
      self.start <= month
        && month <= self.end
    }
  }

  /// Day of year on which the range
  /// closes.
  #[must_use]
  pub fn end_day(
    &self,
    year: i32
  ) -> Option<u32> {
    month_end_day(self.end, year)
  }

  /// Projects the range onto the day
  /// axis. Wrapping ranges come back as
  /// two segments, the late-year one
  /// first.
  #[must_use]
  pub fn intervals(
    &self,
    year: i32
  ) -> Vec<DayInterval> {
    let Some(first_day) =
      month_boundary(self.start, year)
    else {
      return vec![];
    };
    let Some(last_day) =
      self.end_day(year)
    else {
      return vec![];
    };

    if self.is_wrap() {
      [
        DayInterval::new(
          first_day,
          YEAR_END_DAY
        ),
        DayInterval::new(1, last_day)
      ]
      .into_iter()
      .flatten()
      .collect()
    } else {
      DayInterval::new(
        first_day, last_day
      )
      .into_iter()
      .collect()
    }
  }
}

/// Month containment over possibly absent
/// range ends. Absent or out-of-range ends
/// never contain anything.
#[must_use]
pub fn month_contains(
  start: Option<u32>,
  end: Option<u32>,
  query: u32
) -> bool {
  match (start, end) {
    | (Some(start), Some(end)) => {
      MonthRange::new(start, end)
        .map(|range| range.contains(query))
        .unwrap_or(false)
    }
    | _ => false
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::calendar::day_of_year;

  #[test]
  fn plain_range_boundaries_are_inclusive()
  {
    for start in 1..=12 {
      for end in start..=12 {
        for query in 1..=12 {
          assert_eq!(
            month_contains(
              Some(start),
              Some(end),
              query
            ),
            start <= query
              && query <= end,
            "{start}..{end} @ {query}"
          );
        }
      }
    }
  }

  #[test]
  fn wrap_range_spans_year_end() {
    let (oct, mar) = (Some(10), Some(3));
    assert!(month_contains(oct, mar, 12));
    assert!(!month_contains(oct, mar, 6));
    assert!(month_contains(oct, mar, 10));
    assert!(month_contains(oct, mar, 3));
    assert!(month_contains(oct, mar, 1));
    assert!(!month_contains(oct, mar, 9));
    assert!(!month_contains(oct, mar, 4));
  }

  #[test]
  fn absent_ends_never_match() {
    assert!(!month_contains(
      None,
      Some(5),
      5
    ));
    assert!(!month_contains(
      Some(5),
      None,
      5
    ));
    assert!(!month_contains(
      Some(0),
      Some(5),
      3
    ));
  }

  #[test]
  fn plain_range_is_one_interval() {
    let range =
      MonthRange::new(3, 5).unwrap();
    assert_eq!(
      range.intervals(2025),
      vec![DayInterval {
        start: day_of_year(3, 1, 2025)
          .unwrap(),
        end:   day_of_year(5, 31, 2025)
          .unwrap()
      }]
    );
  }

  #[test]
  fn wrap_range_splits_at_year_end() {
    let range =
      MonthRange::new(10, 2).unwrap();
    assert!(range.is_wrap());

    let parts = range.intervals(2025);
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0], DayInterval {
      start: day_of_year(10, 1, 2025)
        .unwrap(),
      end:   365
    });
    assert_eq!(parts[1], DayInterval {
      start: 1,
      end:   day_of_year(2, 28, 2025)
        .unwrap()
    });

    let leap = range.intervals(2024);
    assert_eq!(leap[1].end, 60);
  }

  #[test]
  fn wrap_split_partitions_months() {
    for year in [2024, 2025] {
      for start in 2..=12 {
        for end in 1..start {
          let range =
            MonthRange::new(start, end)
              .unwrap();
          let parts = range.intervals(year);
          assert_eq!(parts.len(), 2);
          assert!(
            !parts[0].overlaps(&parts[1])
          );

          for query in 1..=12 {
            let month_days = DayInterval {
              start: month_boundary(
                query, year
              )
              .unwrap(),
              end:   month_end_day(
                query, year
              )
              .unwrap()
            };
            let covered = parts
              .iter()
              .any(|part| {
                part.overlaps(&month_days)
              });
            assert_eq!(
              covered,
              range.contains(query),
              "{start}..{end} @ {query}"
            );
          }
        }
      }
    }
  }

  #[test]
  fn cells_accept_spans_and_both_dialects()
  {
    assert_eq!(
      MonthRange::from_cells(
        "Mar-Apr", "May"
      ),
      MonthRange::new(3, 5)
    );
    assert_eq!(
      MonthRange::from_cells(
        "October", "Jan - February"
      ),
      MonthRange::new(10, 2)
    );
    assert_eq!(
      MonthRange::from_cells(
        " Jun ", "Aug–Sep"
      ),
      MonthRange::new(6, 9)
    );
  }

  #[test]
  fn unresolvable_cells_are_absent() {
    assert_eq!(
      MonthRange::from_cells(
        "Spring", "May"
      ),
      None
    );
    assert_eq!(
      MonthRange::from_cells("", "May"),
      None
    );
    assert_eq!(
      MonthRange::from_cells(
        "mar", "may"
      ),
      None
    );
  }

  #[test]
  fn interval_length_is_inclusive() {
    let interval =
      DayInterval::new(60, 90).unwrap();
    assert_eq!(interval.len(), 31);
    assert!(interval.contains(60));
    assert!(interval.contains(90));
    assert!(!interval.contains(91));
    assert!(
      DayInterval::new(91, 90).is_none()
    );
    assert!(!interval.is_empty());

    let inverted = DayInterval {
      start: 91,
      end:   90
    };
    assert!(inverted.is_empty());
    assert_eq!(inverted.len(), 0);
  }
}
