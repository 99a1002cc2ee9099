use serde::Serialize;

use crate::plant::PlantRecord;
use crate::schema::Category;

pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailFields {
    Range { min: &'static str, max: &'static str },
    Single(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailSpec {
    pub label: &'static str,
    pub fields: DetailFields,
    pub unit: &'static str,
}

const fn range(label: &'static str, min: &'static str, max: &'static str, unit: &'static str) -> DetailSpec {
    DetailSpec {
        label,
        fields: DetailFields::Range { min, max },
        unit,
    }
}

const fn single(label: &'static str, field: &'static str, unit: &'static str) -> DetailSpec {
    DetailSpec {
        label,
        fields: DetailFields::Single(field),
        unit,
    }
}

const GERMINATION: [DetailSpec; 2] = [
    range(
        "Germination Temperature Range",
        "Germ Temp Min (°C)",
        "Germ Temp Max (°C)",
        "°C",
    ),
    range("Germination Days Range", "Germ Days Min", "Germ Days Max", " days"),
];

const ROOTING: [DetailSpec; 2] = [
    range(
        "Root Temperature Range",
        "Root Temp Min (°C)",
        "Root Temp Max (°C)",
        "°C",
    ),
    range("Days to Root", "Root Days Min", "Root Days Max", " days"),
];

const GROWTH: [DetailSpec; 8] = [
    single("Height", "Height (cm)", " cm"),
    single("Spread", "Spread (cm)", " cm"),
    single("Spacing", "Spacing (cm)", " cm"),
    single("Light", "Light", ""),
    single("Water Need", "Water Need", ""),
    single("Pollinator Friendly", "Pollinator Friendly", ""),
    single("How to Overwinter", "How to Overwinter", ""),
    single("Notes", "Notes", ""),
];

/// Detail rows shown for a plant of `category`, in display order.
pub fn detail_schema(category: Category) -> Vec<DetailSpec> {
    let lead: &[DetailSpec] = match category {
        Category::AnnualSeed | Category::PerennialSeed => &GERMINATION,
        Category::Cutting => &ROOTING,
        Category::Division | Category::Bulb => &[],
    };
    lead.iter().chain(GROWTH.iter()).copied().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailLine {
    pub label: &'static str,
    pub value: String,
}

#[tracing::instrument(skip(plant), fields(row = plant.row, name = %plant.name))]
pub fn detail_lines(plant: &PlantRecord) -> Vec<DetailLine> {
    detail_schema(plant.category)
        .into_iter()
        .map(|spec| DetailLine {
            label: spec.label,
            value: format_detail(plant, &spec).unwrap_or_else(|| PLACEHOLDER.to_string()),
        })
        .collect()
}

fn format_detail(plant: &PlantRecord, spec: &DetailSpec) -> Option<String> {
    match spec.fields {
        DetailFields::Range { min, max } => {
            let min = plant.field(min)?;
            let max = plant.field(max)?;
            Some(format!("{min}–{max}{}", spec.unit))
        }
        DetailFields::Single(field) => plant.field(field).map(|value| format!("{value}{}", spec.unit)),
    }
}

/// Case-insensitive lookup by display name. The first matching row wins.
pub fn find_by_name<'a>(rows: &'a [PlantRecord], name: &str) -> Option<&'a PlantRecord> {
    let wanted = name.trim().to_lowercase();
    rows.iter().find(|plant| plant.name.to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_details_lead_with_germination() {
        let labels: Vec<&str> = detail_schema(Category::AnnualSeed)
            .iter()
            .map(|spec| spec.label)
            .collect();
        assert_eq!(labels[0], "Germination Temperature Range");
        assert_eq!(labels.len(), 10);
        assert_eq!(detail_schema(Category::Bulb).len(), 8);
        assert_eq!(detail_schema(Category::Cutting)[1].label, "Days to Root");
    }

    #[test]
    fn formats_ranges_singles_and_placeholders() {
        let plant = PlantRecord::new(0, "Cosmos".to_string(), Category::AnnualSeed)
            .with_field("Germ Temp Min (°C)", "18")
            .with_field("Germ Temp Max (°C)", "21")
            .with_field("Germ Days Min", "7")
            .with_field("Height (cm)", "90")
            .with_field("Light", "Full Sun");

        let lines = detail_lines(&plant);
        let value = |label: &str| {
            lines
                .iter()
                .find(|line| line.label == label)
                .map(|line| line.value.clone())
                .unwrap()
        };

        assert_eq!(value("Germination Temperature Range"), "18–21°C");
        assert_eq!(value("Germination Days Range"), PLACEHOLDER);
        assert_eq!(value("Height"), "90 cm");
        assert_eq!(value("Light"), "Full Sun");
        assert_eq!(value("Notes"), PLACEHOLDER);
        assert_eq!(lines.len(), 10);
    }

    #[test]
    fn lookup_returns_first_duplicate() {
        let rows = vec![
            PlantRecord::new(0, "Iris".to_string(), Category::Bulb).with_field("Notes", "first"),
            PlantRecord::new(1, "Iris".to_string(), Category::Bulb).with_field("Notes", "second"),
        ];
        let found = find_by_name(&rows, " iris ").unwrap();
        assert_eq!(found.row, 0);
        assert!(find_by_name(&rows, "Tulip").is_none());
    }
}
