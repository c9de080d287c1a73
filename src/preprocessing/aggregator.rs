//! Per-client aggregation of transaction rows
//!
//! Rows are folded left to right. The accumulator holds the running sums of
//! the client currently being read; when the client key changes the
//! accumulator is emitted as a finished row and a fresh one starts. This
//! needs no lookahead and keeps one accumulator alive at a time, but it
//! relies on every client's rows being contiguous in the input.
//!
//! [`AggregationMode::Grouped`] lifts that precondition by merging the
//! contiguous blocks of a client into the row of its first appearance.

use super::{is_numeric_dtype, required_series};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

const AGGREGATION_STAGE: &str = "client aggregation";

/// How transaction rows are collapsed into client rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// One output row per contiguous block of equal IDs
    #[default]
    Contiguous,
    /// One output row per distinct ID, in order of first appearance
    Grouped,
}

/// A finished client row: the key, its per-column sums and how many rows fed it
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRow {
    pub client: Option<String>,
    pub sums: Vec<f64>,
    pub rows: usize,
}

impl ClientRow {
    fn merge(&mut self, other: ClientRow) {
        for (total, value) in self.sums.iter_mut().zip(other.sums) {
            *total += value;
        }
        self.rows += other.rows;
    }
}

/// Running totals for the client currently being folded
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    client: Option<String>,
    sums: Vec<f64>,
    rows: usize,
}

impl Accumulator {
    /// Zeroed accumulator for a new client
    pub fn start(client: Option<String>, width: usize) -> Self {
        Self {
            client,
            sums: vec![0.0; width],
            rows: 0,
        }
    }

    pub fn client(&self) -> Option<&str> {
        self.client.as_deref()
    }

    /// Add one row. Missing values contribute nothing.
    pub fn absorb(self, values: &[Option<f64>]) -> Self {
        let sums = self
            .sums
            .iter()
            .zip(values)
            .map(|(total, value)| total + value.unwrap_or(0.0))
            .collect();
        Self {
            client: self.client,
            sums,
            rows: self.rows + 1,
        }
    }

    pub fn finish(self) -> ClientRow {
        ClientRow {
            client: self.client,
            sums: self.sums,
            rows: self.rows,
        }
    }
}

/// Lazy sequence of finished client rows over `(client, values)` rows.
///
/// A row is emitted as soon as the next input row carries a different
/// client, and the last one when the input is exhausted.
#[derive(Debug)]
pub struct ClientRows<I> {
    rows: I,
    width: usize,
    current: Option<Accumulator>,
}

impl<I> ClientRows<I>
where
    I: Iterator<Item = (Option<String>, Vec<Option<f64>>)>,
{
    pub fn new(rows: I, width: usize) -> Self {
        Self {
            rows,
            width,
            current: None,
        }
    }
}

impl<I> Iterator for ClientRows<I>
where
    I: Iterator<Item = (Option<String>, Vec<Option<f64>>)>,
{
    type Item = ClientRow;

    fn next(&mut self) -> Option<ClientRow> {
        loop {
            let Some((client, values)) = self.rows.next() else {
                return self.current.take().map(Accumulator::finish);
            };

            match self.current.take() {
                Some(acc) if acc.client == client => {
                    self.current = Some(acc.absorb(&values));
                }
                Some(done) => {
                    self.current = Some(Accumulator::start(client, self.width).absorb(&values));
                    return Some(done.finish());
                }
                None => {
                    self.current = Some(Accumulator::start(client, self.width).absorb(&values));
                }
            }
        }
    }
}

/// Collapses transaction rows into one summed row per client
#[derive(Debug, Clone)]
pub struct ClientAggregator {
    id_column: String,
    mode: AggregationMode,
    numeric_columns: Vec<String>,
    client_rows: usize,
    split_clients: usize,
}

impl ClientAggregator {
    pub fn new(id_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
            mode: AggregationMode::Contiguous,
            numeric_columns: Vec::new(),
            client_rows: 0,
            split_clients: 0,
        }
    }

    /// Builder method to set the aggregation mode
    pub fn with_mode(mut self, mode: AggregationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Numeric columns summed by the last transform
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    /// Number of output rows of the last transform
    pub fn client_rows(&self) -> usize {
        self.client_rows
    }

    /// Clients whose rows were not contiguous in the last input
    pub fn split_clients(&self) -> usize {
        self.split_clients
    }

    /// Sum every numeric column per client.
    ///
    /// The output holds the ID column followed by the numeric columns as
    /// `Float64`; every other column is dropped.
    pub fn transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        let ids = required_series(df, &self.id_column, AGGREGATION_STAGE)?.cast(&DataType::String)?;
        let ids: Vec<Option<String>> = ids
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();

        self.numeric_columns.clear();
        let mut values: Vec<Vec<Option<f64>>> = Vec::new();
        for col in df.get_columns() {
            if col.name().as_str() == self.id_column || !is_numeric_dtype(col.dtype()) {
                continue;
            }
            let series = col.as_materialized_series().cast(&DataType::Float64)?;
            values.push(series.f64()?.into_iter().collect());
            self.numeric_columns.push(col.name().to_string());
        }

        let width = values.len();
        let rows = ids.into_iter().enumerate().map(|(i, client)| {
            let row: Vec<Option<f64>> = values.iter().map(|col| col[i]).collect();
            (client, row)
        });
        let blocks = ClientRows::new(rows, width);

        self.split_clients = 0;
        let clients = match self.mode {
            AggregationMode::Contiguous => self.collect_contiguous(blocks),
            AggregationMode::Grouped => Self::collect_grouped(blocks),
        };
        self.client_rows = clients.len();

        debug!(
            clients = clients.len(),
            numeric_columns = width,
            mode = ?self.mode,
            "Aggregated client rows"
        );
        self.build_frame(clients)
    }

    fn collect_contiguous(&mut self, blocks: impl Iterator<Item = ClientRow>) -> Vec<ClientRow> {
        let mut seen = HashSet::new();
        let mut split = HashSet::new();
        let clients: Vec<ClientRow> = blocks
            .inspect(|row| {
                if !seen.insert(row.client.clone()) {
                    split.insert(row.client.clone());
                }
            })
            .collect();

        self.split_clients = split.len();
        if self.split_clients > 0 {
            warn!(
                split_clients = self.split_clients,
                "Client rows are not contiguous; some clients span several output rows"
            );
        }
        clients
    }

    fn collect_grouped(blocks: impl Iterator<Item = ClientRow>) -> Vec<ClientRow> {
        let mut index: HashMap<Option<String>, usize> = HashMap::new();
        let mut clients: Vec<ClientRow> = Vec::new();
        for block in blocks {
            match index.get(&block.client) {
                Some(&i) => clients[i].merge(block),
                None => {
                    index.insert(block.client.clone(), clients.len());
                    clients.push(block);
                }
            }
        }
        clients
    }

    fn build_frame(&self, clients: Vec<ClientRow>) -> Result<DataFrame> {
        let mut sums: Vec<Vec<f64>> = vec![Vec::with_capacity(clients.len()); self.numeric_columns.len()];
        let mut ids: Vec<Option<String>> = Vec::with_capacity(clients.len());
        for client in clients {
            for (col, value) in sums.iter_mut().zip(client.sums) {
                col.push(value);
            }
            ids.push(client.client);
        }

        let mut columns: Vec<Column> = Vec::with_capacity(self.numeric_columns.len() + 1);
        columns.push(Column::new(self.id_column.as_str().into(), ids));
        for (name, col) in self.numeric_columns.iter().zip(sums) {
            columns.push(Column::new(name.as_str().into(), col));
        }
        Ok(DataFrame::new(columns)?)
    }
}
