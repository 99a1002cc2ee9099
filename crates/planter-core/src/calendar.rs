use anyhow::anyhow;
use chrono::{
  DateTime,
  Datelike,
  NaiveDate,
  Utc
};
use chrono_tz::Tz;

const TIMEZONE_ENV_VAR: &str =
  "PLANTER_TIMEZONE";
pub const DEFAULT_TIMEZONE: &str =
  "Europe/London";

/// Last day used for the first half of a
/// range that wraps past December.
pub const YEAR_END_DAY: u32 = 365;

/// Closing sentinel of the day axis.
pub const AXIS_END_DAY: u32 = 366;

const MONTH_ABBRS: [&str; 12] = [
  "Jan", "Feb", "Mar", "Apr", "May",
  "Jun", "Jul", "Aug", "Sep", "Oct",
  "Nov", "Dec"
];

const MONTH_NAMES: [&str; 12] = [
  "January",
  "February",
  "March",
  "April",
  "May",
  "June",
  "July",
  "August",
  "September",
  "October",
  "November",
  "December"
];

/// Resolves a month token as it appears in
/// source data. Both the three letter
/// abbreviation and the full name are
/// accepted; matching is case-sensitive.
#[must_use]
pub fn month_number_of(
  token: &str
) -> Option<u32> {
  MONTH_ABBRS
    .iter()
    .position(|abbr| *abbr == token)
    .or_else(|| {
      MONTH_NAMES
        .iter()
        .position(|name| *name == token)
    })
    .map(|idx| idx as u32 + 1)
}

#[must_use]
pub fn month_name(
  month: u32
) -> Option<&'static str> {
  month_index(month)
    .map(|idx| MONTH_NAMES[idx])
}

#[must_use]
pub fn month_abbr(
  month: u32
) -> Option<&'static str> {
  month_index(month)
    .map(|idx| MONTH_ABBRS[idx])
}

fn month_index(
  month: u32
) -> Option<usize> {
  if (1..=12).contains(&month) {
    Some(month as usize - 1)
  } else {
    None
  }
}

#[must_use]
pub fn day_of_year(
  month: u32,
  day: u32,
  year: i32
) -> Option<u32> {
  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .map(|date| date.ordinal())
}

#[must_use]
pub fn last_day_of(
  month: u32,
  year: i32
) -> Option<u32> {
  month_index(month)?;
  let (next_year, next_month) =
    if month == 12 {
      (year + 1, 1)
    } else {
      (year, month + 1)
    };
  NaiveDate::from_ymd_opt(
    next_year, next_month, 1
  )?
  .pred_opt()
  .map(|date| date.day())
}

/// Day of year of the last day of
/// `month`.
#[must_use]
pub fn month_end_day(
  month: u32,
  year: i32
) -> Option<u32> {
  day_of_year(
    month,
    last_day_of(month, year)?,
    year
  )
}

#[must_use]
pub fn month_midpoint(
  month: u32,
  year: i32
) -> Option<u32> {
  day_of_year(month, 15, year)
}

#[must_use]
pub fn month_boundary(
  month: u32,
  year: i32
) -> Option<u32> {
  day_of_year(month, 1, year)
}

#[must_use]
pub fn month_midpoints(
  year: i32
) -> Vec<u32> {
  (1..=12)
    .filter_map(|month| {
      month_midpoint(month, year)
    })
    .collect()
}

/// First day of every month followed by
/// the closing sentinel.
#[must_use]
pub fn month_boundaries(
  year: i32
) -> Vec<u32> {
  let mut out: Vec<u32> = (1..=12)
    .filter_map(|month| {
      month_boundary(month, year)
    })
    .collect();
  out.push(AXIS_END_DAY);
  out
}

/// Parses a month picked by a user.
/// `all` and `0` select every month and
/// map to `None`.
#[tracing::instrument]
pub fn parse_month_selection(
  input: &str
) -> anyhow::Result<Option<u32>> {
  let lower =
    input.trim().to_ascii_lowercase();

  if lower == "all" || lower == "0" {
    return Ok(None);
  }

  if let Ok(number) =
    lower.parse::<u32>()
  {
    return month_index(number)
      .map(|_| Some(number))
      .ok_or_else(|| {
        anyhow!(
          "month number out of range: \
           {number}"
        )
      });
  }

  parse_month_name(&lower)
    .map(Some)
    .ok_or_else(|| {
      anyhow!(
        "unrecognized month: {input} \
         (expected all, 1-12, or a \
         month name)"
      )
    })
}

fn parse_month_name(
  token: &str
) -> Option<u32> {
  match token {
    | "january" | "jan" => Some(1),
    | "february" | "feb" => Some(2),
    | "march" | "mar" => Some(3),
    | "april" | "apr" => Some(4),
    | "may" => Some(5),
    | "june" | "jun" => Some(6),
    | "july" | "jul" => Some(7),
    | "august" | "aug" => Some(8),
    | "september" | "sep" | "sept" => {
      Some(9)
    }
    | "october" | "oct" => Some(10),
    | "november" | "nov" => Some(11),
    | "december" | "dec" => Some(12),
    | _ => None
  }
}

/// Timezone used to decide which year is
/// "current". The environment wins over
/// the configured id.
pub fn resolve_timezone(
  configured: Option<&str>
) -> Tz {
  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) = parse_timezone(
      &raw,
      TIMEZONE_ENV_VAR
    )
  {
    return tz;
  }

  if let Some(raw) = configured
    && let Some(tz) =
      parse_timezone(raw, "config")
  {
    return tz;
  }

  parse_timezone(
    DEFAULT_TIMEZONE,
    "DEFAULT_TIMEZONE"
  )
  .unwrap_or_else(|| {
    tracing::error!(
      "failed to parse fallback \
       timezone; using UTC"
    );
    chrono_tz::UTC
  })
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "resolved calendar timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

#[must_use]
pub fn reference_year(
  now: DateTime<Utc>,
  tz: &Tz
) -> i32 {
  now.with_timezone(tz).year()
}
