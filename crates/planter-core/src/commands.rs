use anyhow::{Context, anyhow};
use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::calendar::{reference_year, resolve_timezone};
use crate::cli::{Command, FilterArgs};
use crate::config::Config;
use crate::datastore::{DataStore, SourceError};
use crate::details::find_by_name;
use crate::filter::{available_light_types, select_rows};
use crate::plant::PlantRecord;
use crate::render::Renderer;
use crate::schema::Category;
use crate::timeline::{assemble, sort_rows};

pub const NO_MATCHES: &str = "No plants match your current filters. Try adjusting your selections.";

pub fn dispatch(
    store: &mut DataStore,
    cfg: &Config,
    renderer: &Renderer,
    command: Option<Command>,
) -> anyhow::Result<()> {
    let year = effective_year(cfg);
    let command = command.unwrap_or_else(|| Command::Chart(FilterArgs::default()));

    debug!(?command, year, "dispatching command");

    match command {
        Command::Chart(args) => cmd_chart(store, cfg, renderer, &args, year),
        Command::List(args) => cmd_list(store, cfg, renderer, &args, year),
        Command::Info { name, category, json } => cmd_info(store, renderer, &name, category, json),
        Command::Lights { category } => cmd_lights(store, renderer, category.unwrap_or_else(|| cfg.category())),
        Command::Categories => renderer.print_categories(|category| store.path_for(category).is_file()),
    }
}

/// Pinned `calendar.year`, otherwise the current year in the resolved
/// timezone.
pub fn effective_year(cfg: &Config) -> i32 {
    cfg.calendar.year.unwrap_or_else(|| {
        let tz = resolve_timezone(cfg.calendar.timezone.as_deref());
        reference_year(Utc::now(), &tz)
    })
}

fn load_category(store: &mut DataStore, category: Category) -> anyhow::Result<&[PlantRecord]> {
    store
        .load(category)
        .with_context(|| format!("failed to load plants for {}", category.label()))
}

#[instrument(skip(store, cfg, renderer, args))]
fn cmd_chart(
    store: &mut DataStore,
    cfg: &Config,
    renderer: &Renderer,
    args: &FilterArgs,
    year: i32,
) -> anyhow::Result<()> {
    let category = args.category(cfg);
    let state = args.filter_state()?;
    let schema = category.schema();
    let rows = load_category(store, category)?;

    let selected = select_rows(rows, schema, &state);
    let timeline = assemble(&selected, schema, &args.timeline_options(cfg, year));
    info!(
        category = %category,
        rows = timeline.rows.len(),
        segments = timeline.segments.len(),
        "chart ready"
    );

    if args.json {
        return renderer.print_json(&timeline);
    }
    if timeline.is_empty() {
        return renderer.print_notice(NO_MATCHES);
    }
    renderer.print_chart(&timeline)
}

#[instrument(skip(store, cfg, renderer, args))]
fn cmd_list(
    store: &mut DataStore,
    cfg: &Config,
    renderer: &Renderer,
    args: &FilterArgs,
    year: i32,
) -> anyhow::Result<()> {
    let category = args.category(cfg);
    let state = args.filter_state()?;
    let schema = category.schema();
    let rows = load_category(store, category)?;

    let mut selected = select_rows(rows, schema, &state);
    let options = args.timeline_options(cfg, year);
    sort_rows(&mut selected, schema, options.sort, year);

    if args.json {
        return renderer.print_json(&selected);
    }
    if selected.is_empty() {
        return renderer.print_notice(NO_MATCHES);
    }
    renderer.print_plant_table(&selected, schema)
}

/// Looks in `category` when given, otherwise in every category whose data
/// file exists.
#[instrument(skip(store, renderer))]
fn cmd_info(
    store: &mut DataStore,
    renderer: &Renderer,
    name: &str,
    category: Option<Category>,
    json: bool,
) -> anyhow::Result<()> {
    let implicit = category.is_none();
    let candidates: Vec<Category> = match category {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };

    for category in candidates {
        let rows = match store.load(category) {
            Ok(rows) => rows,
            Err(SourceError::NotFound { path, .. }) if implicit => {
                debug!(path = %path.display(), "skipping category without data file");
                continue;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to load plants for {}", category.label()));
            }
        };

        if let Some(plant) = find_by_name(rows, name) {
            if json {
                return renderer.print_json(plant);
            }
            return renderer.print_details(plant);
        }
    }

    Err(anyhow!("no plant named '{name}'"))
}

#[instrument(skip(store, renderer))]
fn cmd_lights(store: &mut DataStore, renderer: &Renderer, category: Category) -> anyhow::Result<()> {
    let rows = load_category(store, category)?;
    let lights = available_light_types(rows);
    renderer.print_lines(&lights)
}
