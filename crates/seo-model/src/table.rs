use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Owned, projected tabular result ready to be written out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Consecutive pages of at most `size` rows, used for previews.
    pub fn pages(&self, size: usize) -> std::slice::Chunks<'_, Vec<Value>> {
        self.rows.chunks(size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_keep_the_remainder() {
        let mut table = Table::new(vec!["address".into()]);
        for idx in 0..23 {
            table.push_row(vec![Value::Number(f64::from(idx))]);
        }
        let sizes: Vec<usize> = table.pages(10).map(<[Vec<Value>]>::len).collect();
        assert_eq!(sizes, vec![10, 10, 3]);
        assert_eq!(Table::default().pages(10).count(), 0);
    }
}
