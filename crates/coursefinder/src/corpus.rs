//! Course catalog loading
//!
//! The catalog is a delimited file with a header row. `Title` is required;
//! `Link`, `Duration`, `Lessons` and `Description` are optional and fall back
//! to fixed placeholders when absent or blank. Rows are identified by their
//! position, which never changes after load.

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CourseFinderError, Result};

pub const DEFAULT_LINK: &str = "#";
pub const DEFAULT_DURATION: &str = "N/A";
pub const DEFAULT_LESSONS: &str = "N/A";
pub const DEFAULT_DESCRIPTION: &str = "No description available";

const TITLE_COLUMN: &str = "Title";
const LINK_COLUMN: &str = "Link";
const DURATION_COLUMN: &str = "Duration";
const LESSONS_COLUMN: &str = "Lessons";
const DESCRIPTION_COLUMN: &str = "Description";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
  pub title: String,
  pub link: Option<String>,
  pub duration: Option<String>,
  pub lessons: Option<String>,
  pub description: Option<String>,
}

impl Course {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), link: None, duration: None, lessons: None, description: None }
  }

  pub fn with_link(mut self, link: impl Into<String>) -> Self {
    let link: String = link.into();
    self.link = optional_field(Some(&link));
    self
  }

  pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
    let duration: String = duration.into();
    self.duration = optional_field(Some(&duration));
    self
  }

  pub fn with_lessons(mut self, lessons: impl Into<String>) -> Self {
    let lessons: String = lessons.into();
    self.lessons = optional_field(Some(&lessons));
    self
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    let description: String = description.into();
    self.description = optional_field(Some(&description));
    self
  }

  pub fn link(&self) -> &str {
    self.link.as_deref().unwrap_or(DEFAULT_LINK)
  }

  pub fn duration(&self) -> &str {
    self.duration.as_deref().unwrap_or(DEFAULT_DURATION)
  }

  pub fn lessons(&self) -> &str {
    self.lessons.as_deref().unwrap_or(DEFAULT_LESSONS)
  }

  pub fn description(&self) -> &str {
    self.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
  }
}

/// Column positions resolved from the header row
struct Columns {
  title: usize,
  link: Option<usize>,
  duration: Option<usize>,
  lessons: Option<usize>,
  description: Option<usize>,
}

impl Columns {
  fn resolve(headers: &StringRecord) -> Option<Self> {
    let find = |name: &str| {
      headers.iter().position(|header| header.trim_start_matches('\u{feff}').trim() == name)
    };

    Some(Self {
      title: find(TITLE_COLUMN)?,
      link: find(LINK_COLUMN),
      duration: find(DURATION_COLUMN),
      lessons: find(LESSONS_COLUMN),
      description: find(DESCRIPTION_COLUMN),
    })
  }

  fn course(&self, record: &StringRecord) -> Option<Course> {
    let cell = |index: Option<usize>| optional_field(index.and_then(|i| record.get(i)));

    let title = cell(Some(self.title))?;
    Some(Course {
      title,
      link: cell(self.link),
      duration: cell(self.duration),
      lessons: cell(self.lessons),
      description: cell(self.description),
    })
  }
}

/// Read-only, position-indexed course catalog
#[derive(Debug, Clone, Default)]
pub struct Corpus {
  source: Option<PathBuf>,
  courses: Vec<Course>,
}

impl Corpus {
  /// Load a catalog file; `.tsv` files are tab separated, anything else comma separated
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let file = File::open(path)
      .map_err(|e| CourseFinderError::corpus_load(path, format!("cannot open file: {e}")))?;

    let mut corpus = Self::from_reader(file, delimiter_for(path), path)?;
    corpus.source = Some(path.to_path_buf());

    info!(path = %path.display(), courses = corpus.len(), "loaded course catalog");
    Ok(corpus)
  }

  /// Parse a catalog from any reader; `origin` only labels errors
  pub fn from_reader<R: Read>(reader: R, delimiter: u8, origin: &Path) -> Result<Self> {
    let mut reader = ReaderBuilder::new().delimiter(delimiter).from_reader(reader);

    let headers = reader
      .headers()
      .map_err(|e| CourseFinderError::corpus_load(origin, format!("unreadable header row: {e}")))?
      .clone();
    let columns = Columns::resolve(&headers).ok_or_else(|| {
      CourseFinderError::corpus_load(origin, format!("missing required '{TITLE_COLUMN}' column"))
    })?;
    debug!(headers = ?headers, "resolved catalog columns");

    let mut courses = Vec::new();
    for (row, record) in reader.records().enumerate() {
      let record = record
        .map_err(|e| CourseFinderError::corpus_load(origin, format!("malformed row: {e}")))?;

      let course = columns.course(&record).ok_or_else(|| {
        CourseFinderError::corpus_load(origin, format!("row {} has an empty Title", row + 1))
      })?;
      courses.push(course);
    }

    Ok(Self { source: None, courses })
  }

  pub fn from_courses(courses: Vec<Course>) -> Self {
    Self { source: None, courses }
  }

  /// File the catalog was loaded from, if any
  pub fn source(&self) -> Option<&Path> {
    self.source.as_deref()
  }

  pub fn titles(&self) -> Vec<String> {
    self.courses.iter().map(|course| course.title.clone()).collect()
  }

  pub fn get(&self, index: usize) -> Option<&Course> {
    self.courses.get(index)
  }

  pub fn len(&self) -> usize {
    self.courses.len()
  }

  pub fn is_empty(&self) -> bool {
    self.courses.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Course> {
    self.courses.iter()
  }
}

fn delimiter_for(path: &Path) -> u8 {
  match path.extension().and_then(|ext| ext.to_str()) {
    Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
    _ => b',',
  }
}

/// Blank cells count as missing
fn optional_field(value: Option<&str>) -> Option<String> {
  value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
