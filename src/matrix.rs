//! Dense node × feature 0/1 table with name lookups.

use crate::error::{Error, Result};
use crate::similarity::FeatureSet;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    node_names: Vec<String>,
    feature_names: Vec<String>,
    /// Row-major indicator cells, `node_count * feature_count` long.
    cells: Vec<bool>,
}

impl FeatureMatrix {
    /// Builds the indicator matrix of `entities` over `[0, universe_size)`.
    /// Nodes are named `node_<i>` and features `feature_<j>` until renamed.
    pub fn from_feature_sets(entities: &[FeatureSet], universe_size: usize) -> Result<Self> {
        let mut cells = vec![false; entities.len() * universe_size];
        for (row, entity) in entities.iter().enumerate() {
            for &feature in entity {
                if feature >= universe_size {
                    return Err(Error::MalformedMatrix(format!(
                        "feature {feature} of node {row} outside universe of {universe_size}"
                    )));
                }
                cells[row * universe_size + feature] = true;
            }
        }
        Ok(Self {
            node_names: default_names("node", entities.len()),
            feature_names: default_names("feature", universe_size),
            cells,
        })
    }

    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self> {
        let feature_count = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(rows.len() * feature_count);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != feature_count {
                return Err(Error::MalformedMatrix(format!(
                    "row {i} has {} columns, expected {feature_count}",
                    row.len()
                )));
            }
            cells.extend_from_slice(row);
        }
        Ok(Self {
            node_names: default_names("node", rows.len()),
            feature_names: default_names("feature", feature_count),
            cells,
        })
    }

    pub fn with_node_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.node_count() {
            return Err(Error::MalformedMatrix(format!(
                "{} node names for {} rows",
                names.len(),
                self.node_count()
            )));
        }
        self.node_names = names;
        Ok(self)
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.feature_count() {
            return Err(Error::MalformedMatrix(format!(
                "{} feature names for {} columns",
                names.len(),
                self.feature_count()
            )));
        }
        self.feature_names = names;
        Ok(self)
    }

    pub fn node_count(&self) -> usize {
        self.node_names.len()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.node_count(), self.feature_count())
    }

    pub fn contains_node(&self, node: usize) -> bool {
        node < self.node_count()
    }

    pub fn row(&self, node: usize) -> Result<&[bool]> {
        if !self.contains_node(node) {
            return Err(Error::NodeNotFound(node));
        }
        let width = self.feature_count();
        Ok(&self.cells[node * width..(node + 1) * width])
    }

    /// Columns set to 1 in `node`'s row.
    pub fn features_of(&self, node: usize) -> Result<FeatureSet> {
        Ok(self
            .row(node)?
            .iter()
            .enumerate()
            .filter_map(|(j, &held)| held.then_some(j))
            .collect())
    }

    pub fn row_sums(&self) -> Vec<usize> {
        let width = self.feature_count();
        if width == 0 {
            return vec![0; self.node_count()];
        }
        self.cells
            .chunks(width)
            .map(|row| row.iter().filter(|&&held| held).count())
            .collect()
    }

    pub fn node_name(&self, node: usize) -> Result<&str> {
        self.node_names
            .get(node)
            .map(String::as_str)
            .ok_or(Error::NodeNotFound(node))
    }

    pub fn node_names(&self) -> &[String] {
        &self.node_names
    }

    pub fn node_index(&self, name: &str) -> Result<usize> {
        self.node_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::UnknownNodeName(name.to_string()))
    }

    pub fn feature_name(&self, feature: usize) -> Result<&str> {
        self.feature_names
            .get(feature)
            .map(String::as_str)
            .ok_or(Error::FeatureNotFound(feature))
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Reads a `;`-delimited, headerless table of `0`/`1` cells.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let row = record
                .iter()
                .map(|cell| match cell.trim() {
                    "0" => Ok(false),
                    "1" => Ok(true),
                    other => Err(Error::MalformedMatrix(format!(
                        "row {i}: expected 0 or 1, found {other:?}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::read_csv(File::open(path)?)
    }

    /// Writes the matrix as `;`-delimited `0`/`1` cells without a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_writer(writer);

        for node in 0..self.node_count() {
            writer.write_record(self.row(node)?.iter().map(|&held| if held { "1" } else { "0" }))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_csv(BufWriter::new(File::create(path)?))
    }
}

fn default_names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}_{i}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[usize]) -> FeatureSet {
        items.iter().copied().collect()
    }

    #[test]
    fn test_from_feature_sets() {
        let matrix = FeatureMatrix::from_feature_sets(&[set(&[0, 2]), set(&[1, 2, 3])], 5).unwrap();

        assert_eq!(matrix.shape(), (2, 5));
        assert_eq!(matrix.row(0).unwrap(), &[true, false, true, false, false]);
        assert_eq!(matrix.features_of(1).unwrap(), set(&[1, 2, 3]));
        assert_eq!(matrix.row_sums(), vec![2, 3]);
        assert!(matches!(matrix.features_of(2), Err(Error::NodeNotFound(2))));
    }

    #[test]
    fn test_feature_outside_universe() {
        assert!(matches!(
            FeatureMatrix::from_feature_sets(&[set(&[5])], 5),
            Err(Error::MalformedMatrix(_))
        ));
    }

    #[test]
    fn test_write_format() {
        let matrix = FeatureMatrix::from_feature_sets(&[set(&[0]), set(&[1, 2])], 3).unwrap();
        let mut out = Vec::new();
        matrix.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1;0;0\n0;1;1\n");
    }

    #[test]
    fn test_read_rejects_bad_cells() {
        let err = FeatureMatrix::read_csv("1;0\n0;2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedMatrix(_)));

        let ragged = FeatureMatrix::read_csv("1;0\n0\n".as_bytes());
        assert!(ragged.is_err());
    }

    #[test]
    fn test_read_from_file() {
        let matrix = FeatureMatrix::from_feature_sets(&[set(&[1, 3]), set(&[0])], 4).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kids.csv");

        matrix.write_to_path(&path).unwrap();
        let loaded = FeatureMatrix::read_from_path(&path).unwrap();
        assert_eq!(loaded, matrix);
    }

    #[test]
    fn test_names() {
        let matrix = FeatureMatrix::from_feature_sets(&[set(&[0]), set(&[1])], 2)
            .unwrap()
            .with_node_names(vec!["Ana".into(), "Luka".into()])
            .unwrap()
            .with_feature_names(vec!["Bluey".into(), "Pingu".into()])
            .unwrap();

        assert_eq!(matrix.node_index("Luka").unwrap(), 1);
        assert_eq!(matrix.node_name(0).unwrap(), "Ana");
        assert_eq!(matrix.feature_name(1).unwrap(), "Pingu");
        assert!(matches!(matrix.feature_name(2), Err(Error::FeatureNotFound(2))));
        assert!(matches!(matrix.node_index("Eva"), Err(Error::UnknownNodeName(_))));
        assert!(matrix.clone().with_node_names(vec!["x".into()]).is_err());
    }
}
