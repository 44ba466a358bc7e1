//! Ragged accumulation tables and their rectangular materialization.
//!
//! Block readers fill a [`RaggedTable`] one record at a time. Once a block
//! is finished it is projected onto its declared schema as a
//! [`RectangularTable`], which also offers columnar and polars views.

use crate::error::{EpsError, Result};
use crate::schema::TableSchema;
use crate::time::parse_table_time;
use polars::prelude::*;
use tracing::debug;

/// A table cell; `None` is the missing marker
pub type Cell = Option<String>;

/// Field-keyed columns that grow record by record.
///
/// After [`close_record`](Self::close_record) every column holds exactly
/// `records()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaggedTable {
    columns: Vec<(String, Vec<Cell>)>,
    records: usize,
}

impl RaggedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the current record and open an empty one
    pub fn start_record(&mut self) {
        self.close_record();
        self.records += 1;
    }

    /// Set a field of the open record.
    ///
    /// A second value for the same field is appended, space-separated.
    /// Returns `false` when no record is open.
    pub fn set(&mut self, field: &str, value: &str) -> bool {
        if self.records == 0 {
            return false;
        }
        let records = self.records;

        let column = match self.columns.iter().position(|(name, _)| name == field) {
            Some(index) => &mut self.columns[index].1,
            None => {
                self.columns.push((field.to_string(), Vec::new()));
                let last = self.columns.len() - 1;
                &mut self.columns[last].1
            }
        };

        if column.len() == records {
            if let Some(cell) = column.last_mut() {
                *cell = match cell.take() {
                    Some(existing) if !existing.is_empty() => Some(format!("{} {}", existing, value)),
                    _ => Some(value.to_string()),
                };
            }
        } else {
            column.resize(records - 1, None);
            column.push(Some(value.to_string()));
        }
        true
    }

    /// Pad every column to the record count
    pub fn close_record(&mut self) {
        for (_, cells) in &mut self.columns {
            cells.resize(self.records, None);
        }
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    pub fn is_uniform(&self) -> bool {
        self.columns.iter().all(|(_, cells)| cells.len() == self.records)
    }

    pub fn column(&self, field: &str) -> Option<&[Cell]> {
        self.columns
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, cells)| cells.as_slice())
    }

    /// Value of a field in the open (last) record
    pub fn current(&self, field: &str) -> Option<&str> {
        let cells = self.column(field)?;
        if cells.len() != self.records {
            return None;
        }
        cells.last()?.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }
}

/// Fixed-schema table with row-major cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RectangularTable {
    schema: TableSchema,
    rows: Vec<Vec<Cell>>,
}

impl RectangularTable {
    pub fn empty(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Project a finished ragged table onto `schema`.
    ///
    /// Declared columns that never appeared become all-missing. Fields the
    /// schema does not declare are dropped.
    pub fn materialize(schema: TableSchema, ragged: &RaggedTable) -> Result<Self> {
        for (name, cells) in &ragged.columns {
            if cells.len() != ragged.records {
                return Err(EpsError::RaggedColumns {
                    table: schema.name().to_string(),
                    column: name.clone(),
                    expected: ragged.records,
                    found: cells.len(),
                });
            }
        }

        for field in ragged.fields() {
            if schema.column_index(field).is_none() {
                debug!("Dropping undeclared field '{}' from {}", field, schema);
            }
        }

        let projected: Vec<Option<&[Cell]>> = schema
            .columns()
            .iter()
            .map(|column| ragged.column(column))
            .collect();

        let rows = (0..ragged.records)
            .map(|row| {
                projected
                    .iter()
                    .map(|cells| cells.and_then(|cells| cells[row].clone()))
                    .collect()
            })
            .collect();

        Ok(Self { schema, rows })
    }

    /// Build from rows that already follow the schema's column order
    pub fn from_rows(schema: TableSchema, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let width = schema.columns().len();
        for row in &rows {
            if row.len() != width {
                return Err(EpsError::RaggedColumns {
                    table: schema.name().to_string(),
                    column: "<row>".to_string(),
                    expected: width,
                    found: row.len(),
                });
            }
        }
        Ok(Self { schema, rows })
    }

    pub fn schema(&self) -> TableSchema {
        self.schema
    }

    pub fn name(&self) -> &'static str {
        self.schema.name()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.schema.columns()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(|row| row.as_slice())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.schema.column_index(column)?;
        self.rows.get(row)?.get(index)?.as_deref()
    }

    /// Columnar view of one column
    pub fn column(&self, column: &str) -> Option<Vec<Option<&str>>> {
        let index = self.schema.column_index(column)?;
        Some(self.rows.iter().map(|row| row[index].as_deref()).collect())
    }

    /// Labeled view; time columns become millisecond datetimes
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let time_columns = self.schema.time_columns();
        let mut columns = Vec::with_capacity(self.columns().len());

        for (index, name) in self.columns().iter().enumerate() {
            if time_columns.contains(name) {
                let millis = self
                    .rows
                    .iter()
                    .map(|row| {
                        row[index]
                            .as_deref()
                            .map(|cell| parse_table_time(cell).map(|t| t.and_utc().timestamp_millis()))
                            .transpose()
                    })
                    .collect::<Result<Vec<Option<i64>>>>()?;
                let series = Series::new((*name).into(), millis)
                    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
                columns.push(Column::from(series));
            } else {
                let values: Vec<Option<String>> =
                    self.rows.iter().map(|row| row[index].clone()).collect();
                columns.push(Column::new((*name).into(), values));
            }
        }

        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::BlockKind;

    #[test]
    fn test_padding_invariant_after_every_close() {
        let mut table = RaggedTable::new();
        let updates: &[&[(&str, &str)]] = &[
            &[("Data_bus", "A"), ("Data_bus_rate_warning", "1")],
            &[("Data_bus", "B")],
            &[("Data_bus", "C"), ("Data_bus_rate_limit", "9")],
            &[],
        ];

        for fields in updates {
            table.start_record();
            for (field, value) in *fields {
                assert!(table.set(field, value));
            }
            table.close_record();
            assert!(table.is_uniform());
        }

        assert_eq!(table.records(), 4);
        assert_eq!(
            table.column("Data_bus_rate_warning").unwrap(),
            &[Some("1".to_string()), None, None, None]
        );
        assert_eq!(
            table.column("Data_bus_rate_limit").unwrap(),
            &[None, None, Some("9".to_string()), None]
        );
    }

    #[test]
    fn test_repeated_field_is_appended() {
        let mut table = RaggedTable::new();
        table.start_record();
        table.set("Mode_transitions", "A B");
        table.set("Mode_transitions", "C");
        assert_eq!(table.current("Mode_transitions"), Some("A B C"));
        assert_eq!(table.records(), 1);
    }

    #[test]
    fn test_set_without_open_record() {
        let mut table = RaggedTable::new();
        assert!(!table.set("Area", "X"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_materialize_column_order_is_schema_order() {
        let schema = TableSchema::Block(BlockKind::Area);

        let mut first = RaggedTable::new();
        first.start_record();
        first.set("Area", "A1");
        first.set("Area_lighting_angle", "30");
        first.close_record();

        let mut second = RaggedTable::new();
        second.start_record();
        second.set("Area_lighting_duration", "10");
        second.set("Area", "A2");
        second.close_record();

        let a = RectangularTable::materialize(schema, &first).unwrap();
        let b = RectangularTable::materialize(schema, &second).unwrap();

        assert_eq!(a.columns(), b.columns());
        assert_eq!(a.columns(), BlockKind::Area.columns());
        assert_eq!(a.get(0, "Area_orientation"), None);
        assert_eq!(b.get(0, "Area"), Some("A2"));
        assert_eq!(b.row(0).unwrap().len(), 4);
    }

    #[test]
    fn test_materialize_rejects_ragged_columns() {
        let mut table = RaggedTable::new();
        table.start_record();
        table.set("Area", "A1");
        table.start_record();
        table.set("Area", "A2");
        table.close_record();
        // simulate an upstream padding defect
        table.columns[0].1.pop();

        let err = RectangularTable::materialize(TableSchema::Block(BlockKind::Area), &table)
            .unwrap_err();
        assert!(matches!(err, EpsError::RaggedColumns { expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_to_dataframe_types() {
        let rows = vec![vec![
            Some("001_00:00:00".to_string()),
            Some("2024-01-02T00:00:00".to_string()),
            Some("ECLIPSE_START".to_string()),
            None,
            None,
            Some("1".to_string()),
            None,
        ]];
        let table = RectangularTable::from_rows(TableSchema::EvfEvents, rows).unwrap();
        let df = table.to_dataframe().unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 7);
        assert_eq!(
            df.column("time").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(df.column("event").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("experiment").unwrap().null_count(), 1);
    }

    #[test]
    fn test_from_rows_checks_width() {
        let rows = vec![vec![Some("x".to_string())]];
        assert!(RectangularTable::from_rows(TableSchema::ItlEvents, rows).is_err());
    }
}
