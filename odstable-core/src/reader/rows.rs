//! Row iteration with skip-lines / header / row-limit policy

use tracing::{debug, trace};

use super::cell::{ResolvedCell, is_padding, resolve_cell_value};
use super::xml::{Element, OdsNames};
use crate::error::Result;
use crate::inference::ColumnObservations;

/// What to do with a non-empty row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Keep,
    Discard,
    /// End the walk; later rows are never read
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyState {
    /// Discarding rows until `remaining` reaches zero, then apply `then_limit`
    Skipping {
        remaining: usize,
        then_limit: Option<usize>,
    },
    /// Keeping at most `n` more data rows
    CountingDown(usize),
    Unbounded,
}

impl PolicyState {
    pub fn new(skip_lines: usize, row_limit: Option<usize>) -> Self {
        if skip_lines > 0 {
            PolicyState::Skipping {
                remaining: skip_lines,
                then_limit: row_limit,
            }
        } else {
            Self::limited(row_limit)
        }
    }

    fn limited(row_limit: Option<usize>) -> Self {
        match row_limit {
            Some(n) => PolicyState::CountingDown(n),
            None => PolicyState::Unbounded,
        }
    }

    /// The header row is never skipped and never counts against the limit
    pub fn transition(self, is_header: bool) -> (Self, RowAction) {
        match self {
            PolicyState::Skipping { .. } if is_header => (self, RowAction::Keep),
            PolicyState::Skipping {
                remaining,
                then_limit,
            } => {
                let next = if remaining > 1 {
                    PolicyState::Skipping {
                        remaining: remaining - 1,
                        then_limit,
                    }
                } else {
                    Self::limited(then_limit)
                };
                (next, RowAction::Discard)
            }
            PolicyState::CountingDown(0) => (self, RowAction::Stop),
            PolicyState::CountingDown(_) if is_header => (self, RowAction::Keep),
            PolicyState::CountingDown(n) => (PolicyState::CountingDown(n - 1), RowAction::Keep),
            PolicyState::Unbounded => (self, RowAction::Keep),
        }
    }
}

/// Tracks the policy state plus whether the header row has been retained yet
#[derive(Debug, Clone)]
pub struct RowPolicy {
    state: PolicyState,
    header: bool,
    retained_any: bool,
}

impl RowPolicy {
    pub fn new(skip_lines: usize, header: bool, row_limit: Option<usize>) -> Self {
        Self {
            state: PolicyState::new(skip_lines, row_limit),
            header,
            retained_any: false,
        }
    }

    pub fn state(&self) -> PolicyState {
        self.state
    }

    /// Decide the fate of the next non-empty row
    pub fn next_row(&mut self) -> RowAction {
        let is_header = self.header && !self.retained_any;
        let (next, action) = self.state.transition(is_header);
        self.state = next;
        if action == RowAction::Keep {
            self.retained_any = true;
        }
        action
    }
}

/// One retained row; `number` is its 1-based position among the sheet's rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub number: usize,
    pub cells: Vec<ResolvedCell>,
}

impl ParsedRow {
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.value.as_str())
    }

    pub fn into_values(self) -> Vec<String> {
        self.cells.into_iter().map(|c| c.value).collect()
    }
}

/// Retained rows (header first when requested) and the per-column type observations
#[derive(Debug, Clone)]
pub struct WalkedRows {
    pub header: bool,
    pub rows: Vec<ParsedRow>,
    pub observations: ColumnObservations,
}

impl WalkedRows {
    /// Rows after the header row
    pub fn data_rows(&self) -> &[ParsedRow] {
        if self.header {
            self.rows.get(1..).unwrap_or(&[])
        } else {
            &self.rows
        }
    }
}

/// Non-padding cells of a row
fn logical_cells<'a>(row: &'a Element, names: &'a OdsNames) -> Vec<&'a Element> {
    row.descendants(&names.table_cell)
        .filter(|cell| !is_padding(cell, names))
        .collect()
}

/// First stage: walk the rows and resolve the values of every retained row
pub fn extract_rows(
    sheet: &Element,
    names: &OdsNames,
    policy: &mut RowPolicy,
) -> Result<Vec<ParsedRow>> {
    let mut rows = Vec::new();

    for (index, row) in sheet.descendants(&names.table_row).enumerate() {
        let number = index + 1;
        let cells = logical_cells(row, names);
        if cells.is_empty() {
            trace!("Row {number} is empty after padding removal");
            continue;
        }

        match policy.next_row() {
            RowAction::Stop => {
                debug!("Row limit reached at row {number}");
                break;
            }
            RowAction::Discard => {
                trace!("Skipping row {number}");
                continue;
            }
            RowAction::Keep => {}
        }

        let cells = cells
            .into_iter()
            .map(|cell| resolve_cell_value(cell, names))
            .collect::<Result<Vec<_>>>()?;
        rows.push(ParsedRow { number, cells });
    }

    Ok(rows)
}

/// Both stages: row extraction, then column type observation over the data rows
pub fn walk_rows(
    sheet: &Element,
    names: &OdsNames,
    skip_lines: usize,
    header: bool,
    row_limit: Option<usize>,
) -> Result<WalkedRows> {
    let mut policy = RowPolicy::new(skip_lines, header, row_limit);
    let rows = extract_rows(sheet, names, &mut policy)?;

    let mut walked = WalkedRows {
        header,
        rows,
        observations: ColumnObservations::default(),
    };
    walked.observations = ColumnObservations::observe(walked.data_rows())?;

    debug!(
        "Walked {} rows ({} columns observed)",
        walked.rows.len(),
        walked.observations.len()
    );
    Ok(walked)
}
