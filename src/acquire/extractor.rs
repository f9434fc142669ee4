//! Schema-agnostic statistics table extraction
//!
//! Finds the statistics table by shape rather than by any sport-specific
//! selector, takes its header row as the key set and turns every well-formed
//! data row into a [`StatRecord`]. No column count or column name is assumed.

use crate::acquire::landmarks::LandmarkDetector;
use crate::output::{StatFields, StatRecord};
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Which table section a row sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Head,
    Body,
    Foot,
}

/// One row of a table, with its cells in order
struct Row<'a> {
    section: Section,
    cells: Vec<ElementRef<'a>>,
    has_header_cells: bool,
}

/// A table reduced to a header and the rows that fit it
struct TableShape<'a> {
    headers: Vec<String>,
    rows: Vec<Row<'a>>,
    dropped: usize,
}

impl TableShape<'_> {
    fn width(&self) -> usize {
        self.headers.len()
    }
}

/// Extracts [`StatRecord`]s from a page known to contain a table
#[derive(Clone)]
pub struct TableExtractor {
    landmarks: Arc<dyn LandmarkDetector>,
    row_selector: Selector,
    link_selector: Selector,
}

impl std::fmt::Debug for TableExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableExtractor").finish_non_exhaustive()
    }
}

impl TableExtractor {
    pub fn new(landmarks: Arc<dyn LandmarkDetector>) -> Result<Self, ConfigError> {
        let parse = |selector: &str| {
            Selector::parse(selector)
                .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
        };

        Ok(Self {
            landmarks,
            row_selector: parse("tr")?,
            link_selector: parse("a[href]")?,
        })
    }

    /// Parses `content` and extracts its statistics records
    pub fn extract(&self, content: &str) -> Vec<StatRecord> {
        let document = Html::parse_document(content);
        self.extract_document(&document)
    }

    /// Extracts statistics records from a parsed page
    ///
    /// Every returned record has the same keys, in page column order. Rows
    /// whose cell count differs from the header are dropped with a warning.
    pub fn extract_document(&self, document: &Html) -> Vec<StatRecord> {
        let table = self
            .landmarks
            .candidate_tables(document)
            .into_iter()
            .filter_map(|table| self.shape(table))
            .max_by_key(|shape| (shape.rows.len(), shape.width()));

        let Some(table) = table else {
            tracing::debug!("No table with a usable header row");
            return Vec::new();
        };

        if table.dropped > 0 {
            tracing::warn!(
                dropped = table.dropped,
                columns = table.width(),
                "Dropped rows whose cell count does not match the header"
            );
        }

        let id_column = self.identifier_column(&table);
        tracing::debug!(
            columns = table.width(),
            rows = table.rows.len(),
            id_column,
            "Selected statistics table"
        );

        let mut records = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let name = self.entity_name(row, id_column);
            if name.is_empty() {
                tracing::warn!("Dropping row with an empty entity name");
                continue;
            }

            let fields = table
                .headers
                .iter()
                .cloned()
                .zip(row.cells.iter().map(|cell| cell_text(*cell)))
                .collect::<StatFields>();

            records.push(StatRecord::new(name, fields));
        }

        records
    }

    /// Reduces a table to its header and matching data rows
    fn shape<'a>(&self, table: ElementRef<'a>) -> Option<TableShape<'a>> {
        let rows = table
            .select(&self.row_selector)
            .filter(|row| owning_table(*row).map(|t| t.id()) == Some(table.id()))
            .map(|row| {
                let cells = row
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .collect::<Vec<_>>();
                let has_header_cells = cells.iter().any(|c| c.value().name() == "th");
                Row {
                    section: section_of(row),
                    cells,
                    has_header_cells,
                }
            })
            .filter(|row| !row.cells.is_empty())
            .collect::<Vec<_>>();

        let header_index = rows
            .iter()
            .rposition(|row| row.section == Section::Head)
            .or_else(|| rows.iter().position(|row| row.has_header_cells))
            .or(if rows.is_empty() { None } else { Some(0) })?;

        let headers = disambiguate_headers(
            rows[header_index]
                .cells
                .iter()
                .map(|cell| cell_text(*cell))
                .collect(),
        );
        if headers.len() < 2 {
            return None;
        }

        let mut dropped = 0;
        let data_rows = rows
            .into_iter()
            .skip(header_index + 1)
            .filter(|row| row.section == Section::Body)
            .filter(|row| {
                let fits = row.cells.len() == headers.len();
                if !fits {
                    dropped += 1;
                }
                fits
            })
            .collect::<Vec<_>>();

        Some(TableShape {
            headers,
            rows: data_rows,
            dropped,
        })
    }

    /// Picks the column that names the entity
    ///
    /// Preference: the column most often holding a link, then a column whose
    /// header names an identifier, then the first mostly non-numeric column.
    fn identifier_column(&self, table: &TableShape<'_>) -> usize {
        let mut link_counts: HashMap<usize, usize> = HashMap::new();
        for row in &table.rows {
            for (index, cell) in row.cells.iter().enumerate() {
                if cell.select(&self.link_selector).next().is_some() {
                    *link_counts.entry(index).or_default() += 1;
                }
            }
        }

        if let Some((index, _)) = link_counts
            .into_iter()
            .max_by_key(|(index, count)| (*count, std::cmp::Reverse(*index)))
        {
            return index;
        }

        if let Some(index) = table
            .headers
            .iter()
            .position(|header| self.landmarks.is_identifier_header(header))
        {
            return index;
        }

        (0..table.width())
            .find(|&column| {
                let texts = table
                    .rows
                    .iter()
                    .map(|row| cell_text(row.cells[column]))
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>();
                let textual = texts.iter().filter(|text| !looks_numeric(text)).count();
                !texts.is_empty() && textual * 2 > texts.len()
            })
            .unwrap_or(0)
    }

    /// Entity name for a row: the first linked cell, else the identifier column
    fn entity_name(&self, row: &Row<'_>, id_column: usize) -> String {
        row.cells
            .iter()
            .find(|cell| cell.select(&self.link_selector).next().is_some())
            .or_else(|| row.cells.get(id_column))
            .map(|cell| cell_text(*cell))
            .unwrap_or_default()
    }
}

/// Nearest enclosing `<table>` of an element
fn owning_table(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

fn section_of(row: ElementRef<'_>) -> Section {
    for ancestor in row.ancestors().filter_map(ElementRef::wrap) {
        match ancestor.value().name() {
            "thead" => return Section::Head,
            "tfoot" => return Section::Foot,
            "tbody" | "table" => return Section::Body,
            _ => {}
        }
    }
    Section::Body
}

/// Cell text with whitespace collapsed
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Makes header texts unique, naming empty headers by position
///
/// A repeated header gets the first free ` (k)` suffix, so generated names
/// never collide with literal headers of the same table.
fn disambiguate_headers(raw: Vec<String>) -> Vec<String> {
    let mut emitted: HashSet<String> = HashSet::new();

    raw.into_iter()
        .enumerate()
        .map(|(index, text)| {
            let base = if text.is_empty() {
                format!("Column {}", index + 1)
            } else {
                text
            };

            let mut name = base.clone();
            let mut k = 2;
            while emitted.contains(&name) {
                name = format!("{} ({})", base, k);
                k += 1;
            }

            emitted.insert(name.clone());
            name
        })
        .collect()
}

fn looks_numeric(text: &str) -> bool {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '%' | ':' | '-' | '+' | '/'))
        .collect();
    !stripped.is_empty() && stripped.parse::<f64>().is_ok()
}
