//! Postal code lookup backed by GeoNames postal-code tables.
//!
//! Each country lives in `<dir>/<CC>.txt`, a tab-separated file with the
//! columns country code, postal code, place name, three admin name/code
//! pairs, latitude, longitude and accuracy. A postal code listed on several
//! rows resolves to the mean of their coordinates.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use geo::Coord;
use log::{info, warn};
use summit_core::{PostalCodeResolver, StartPoint, is_valid_location};
use thiserror::Error;

const POSTAL_CODE_COLUMN: usize = 1;
const LATITUDE_COLUMN: usize = 9;
const LONGITUDE_COLUMN: usize = 10;

/// Errors raised by [`GeoNamesPostalResolver`].
#[derive(Debug, Error)]
pub enum PostalLookupError {
    /// The table directory could not be opened.
    #[error("failed to open postal code directory {path}")]
    OpenDirectory {
        /// Configured directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// No table exists for the requested country.
    #[error("no postal code table for country {country:?}")]
    UnknownCountry {
        /// Normalised country code.
        country: String,
    },
    /// A table exists but could not be read.
    #[error("failed to read postal code table {file}")]
    ReadTable {
        /// Table file name.
        file: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

type PostalTable = HashMap<String, StartPoint>;

/// Resolves postal codes from GeoNames tables in a local directory.
///
/// Tables are parsed on first use per country and cached for the lifetime of
/// the resolver. File access goes through a `cap-std` directory handle, so
/// lookups cannot escape the configured directory.
#[derive(Debug)]
pub struct GeoNamesPostalResolver {
    dir: Dir,
    tables: RwLock<HashMap<String, Arc<PostalTable>>>,
}

impl GeoNamesPostalResolver {
    /// Open the table directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PostalLookupError::OpenDirectory`] when the directory cannot
    /// be opened.
    pub fn open(path: &Utf8Path) -> Result<Self, PostalLookupError> {
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(|source| {
            PostalLookupError::OpenDirectory {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Self::from_dir(dir))
    }

    /// Use an already opened directory handle.
    #[must_use]
    pub fn from_dir(dir: Dir) -> Self {
        Self {
            dir,
            tables: RwLock::new(HashMap::new()),
        }
    }

    fn table(&self, country: &str) -> Result<Arc<PostalTable>, PostalLookupError> {
        let cached = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(country)
            .cloned();
        if let Some(table) = cached {
            return Ok(table);
        }
        let table = Arc::new(self.load_table(country)?);
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(country.to_owned(), Arc::clone(&table));
        Ok(table)
    }

    fn load_table(&self, country: &str) -> Result<PostalTable, PostalLookupError> {
        if country.is_empty() || !country.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(PostalLookupError::UnknownCountry {
                country: country.to_owned(),
            });
        }
        let file = format!("{country}.txt");
        let contents = self.dir.read_to_string(&file).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                PostalLookupError::UnknownCountry {
                    country: country.to_owned(),
                }
            } else {
                PostalLookupError::ReadTable {
                    file: file.clone(),
                    source,
                }
            }
        })?;
        let (table, malformed) = parse_table(&contents);
        if malformed > 0 {
            warn!("Skipped {malformed} malformed rows in {file}");
        }
        info!("Loaded {} postal codes for {country}", table.len());
        Ok(table)
    }
}

impl PostalCodeResolver for GeoNamesPostalResolver {
    type Error = PostalLookupError;

    fn resolve(&self, country: &str, postal_code: &str) -> Result<Option<StartPoint>, Self::Error> {
        let country = country.trim().to_ascii_uppercase();
        let table = self.table(&country)?;
        Ok(table.get(&normalise_code(postal_code)).copied())
    }
}

fn normalise_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[derive(Default)]
struct CoordMean {
    lat: f64,
    lon: f64,
    rows: u32,
}

impl CoordMean {
    #[expect(clippy::float_arithmetic, reason = "running coordinate sums")]
    fn add(&mut self, location: Coord<f64>) {
        self.lat += location.y;
        self.lon += location.x;
        self.rows += 1;
    }

    #[expect(clippy::float_arithmetic, reason = "mean of coordinate sums")]
    fn mean(&self) -> StartPoint {
        let rows = f64::from(self.rows);
        StartPoint::new(self.lat / rows, self.lon / rows)
    }
}

/// Parse a table, returning postal codes and the number of skipped rows.
fn parse_table(contents: &str) -> (PostalTable, usize) {
    let mut sums: HashMap<String, CoordMean> = HashMap::new();
    let mut malformed = 0;
    for line in contents.lines().filter(|line| !line.trim().is_empty()) {
        match parse_row(line) {
            Some((code, location)) => sums.entry(code).or_default().add(location),
            None => malformed += 1,
        }
    }
    let table = sums
        .into_iter()
        .map(|(code, sum)| (code, sum.mean()))
        .collect();
    (table, malformed)
}

fn parse_row(line: &str) -> Option<(String, Coord<f64>)> {
    let fields: Vec<&str> = line.split('\t').collect();
    let code = normalise_code(fields.get(POSTAL_CODE_COLUMN)?);
    let lat = fields.get(LATITUDE_COLUMN)?.trim().parse().ok()?;
    let lon = fields.get(LONGITUDE_COLUMN)?.trim().parse().ok()?;
    let location = Coord { x: lon, y: lat };
    (!code.is_empty() && is_valid_location(location)).then_some((code, location))
}
