use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::plant::{NAME_FIELD, PlantRecord};
use crate::schema::Category;

/// The row source for a category could not be loaded. This aborts the
/// current evaluation; no partial row set is ever returned or cached.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("data directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("no data file for {category} at {}", .path.display())]
    NotFound { category: Category, path: PathBuf },

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no 'Common Name' column", .path.display())]
    MissingNameColumn { path: PathBuf },
}

/// Directory of per-category CSV files with a per-category row cache.
#[derive(Debug)]
pub struct DataStore {
    pub data_dir: PathBuf,
    cache: HashMap<Category, Vec<PlantRecord>>,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir), fields(dir = %data_dir.display()))]
    pub fn open(data_dir: &Path) -> Result<Self, SourceError> {
        if !data_dir.is_dir() {
            return Err(SourceError::MissingDirectory(data_dir.to_path_buf()));
        }

        info!(data_dir = %data_dir.display(), "opened plant data directory");
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            cache: HashMap::new(),
        })
    }

    pub fn path_for(&self, category: Category) -> PathBuf {
        self.data_dir.join(category.file_name())
    }

    /// Rows of `category`, read on first use and cached afterwards.
    #[tracing::instrument(skip(self))]
    pub fn load(&mut self, category: Category) -> Result<&[PlantRecord], SourceError> {
        let path = self.path_for(category);
        match self.cache.entry(category) {
            Entry::Occupied(cached) => {
                debug!(rows = cached.get().len(), "category served from cache");
                Ok(cached.into_mut().as_slice())
            }
            Entry::Vacant(slot) => {
                let rows = read_category_file(&path, category)?;
                info!(
                    file = %path.display(),
                    rows = rows.len(),
                    "loaded category rows"
                );
                Ok(slot.insert(rows).as_slice())
            }
        }
    }

    pub fn invalidate(&mut self, category: Category) {
        self.cache.remove(&category);
    }
}

fn read_category_file(path: &Path, category: Category) -> Result<Vec<PlantRecord>, SourceError> {
    if !path.is_file() {
        return Err(SourceError::NotFound {
            category,
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|err| SourceError::Read {
        path: path.to_path_buf(),
        source: csv::Error::from(err),
    })?;
    parse_records(file, category, path)
}

/// Parses one category table. Headers and cells are trimmed and rows without
/// a display name are dropped.
pub fn parse_records<R: Read>(reader: R, category: Category, path: &Path) -> Result<Vec<PlantRecord>, SourceError> {
    let read_err = |source: csv::Error| SourceError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(read_err)?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let name_idx = headers
        .iter()
        .position(|header| header == NAME_FIELD)
        .ok_or_else(|| SourceError::MissingNameColumn {
            path: path.to_path_buf(),
        })?;

    let mut rows = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(read_err)?;

        let name = record.get(name_idx).unwrap_or_default().trim();
        if name.is_empty() {
            debug!(row, "dropping row without a display name");
            continue;
        }

        let fields: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.clone(), value.trim().to_string()))
            .collect();

        rows.push(PlantRecord {
            row,
            name: name.to_string(),
            category,
            fields,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BULBS: &str = "\
Common Name , Plant Start,Plant End,Flower Start,Flower End,Light
Tulip,Oct,Dec,Apr,May, Full Sun
,Sep,Oct,Feb,Mar,Full Sun
  Crocus ,September,October,Feb,Mar,
";

    #[test]
    fn trims_headers_and_drops_nameless_rows() {
        let rows = parse_records(BULBS.as_bytes(), Category::Bulb, Path::new("bulbs.csv")).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Tulip");
        assert_eq!(rows[0].row, 0);
        assert_eq!(rows[0].light(), Some("Full Sun"));
        assert_eq!(rows[1].name, "Crocus");
        assert_eq!(rows[1].row, 2);
        assert_eq!(rows[1].light(), None);
        assert_eq!(rows[1].field("Plant Start"), Some("September"));
    }

    #[test]
    fn missing_name_column_is_a_source_error() {
        let err = parse_records(
            "Name,Plant Start\nTulip,Oct\n".as_bytes(),
            Category::Bulb,
            Path::new("bulbs.csv"),
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::MissingNameColumn { .. }));
    }

    #[test]
    fn missing_directory_is_rejected() {
        let err = DataStore::open(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, SourceError::MissingDirectory(_)));
    }
}
