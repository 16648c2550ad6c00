//! Output shapes for tabular API responses.
//!
//! Each shape lays out the same rows differently, keyed by column name in
//! [`TableRow::COLUMNS`] order and by each row's index label.

use serde_json::{Map, Value};

use crate::models::TableRow;

/// Record layout selected by the request's `type` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputShape {
    /// `{column: {index: value}}`
    Dict,
    /// `{column: [values]}`
    #[default]
    List,
    /// Same layout as `List`.
    Series,
    /// `{"index": [..], "columns": [..], "data": [[..]]}`
    Split,
    /// `[{column: value}]`
    Records,
    /// `{index: {column: value}}`
    Index,
}

impl OutputShape {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "dict" => Some(Self::Dict),
            "list" => Some(Self::List),
            "series" => Some(Self::Series),
            "split" => Some(Self::Split),
            "records" => Some(Self::Records),
            "index" => Some(Self::Index),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dict => "dict",
            Self::List => "list",
            Self::Series => "series",
            Self::Split => "split",
            Self::Records => "records",
            Self::Index => "index",
        }
    }

    /// Lay out `rows` in this shape.
    pub fn render<R: TableRow>(&self, rows: &[&R]) -> Value {
        match self {
            Self::List | Self::Series => {
                let mut columns: Vec<Vec<Value>> =
                    vec![Vec::with_capacity(rows.len()); R::COLUMNS.len()];
                for row in rows {
                    for (column, value) in columns.iter_mut().zip(row.values()) {
                        column.push(value);
                    }
                }
                Value::Object(
                    R::COLUMNS
                        .iter()
                        .zip(columns)
                        .map(|(name, values)| (name.to_string(), Value::Array(values)))
                        .collect(),
                )
            }
            Self::Dict => {
                let mut columns: Vec<Map<String, Value>> = vec![Map::new(); R::COLUMNS.len()];
                for row in rows {
                    let index = row.index().to_string();
                    for (column, value) in columns.iter_mut().zip(row.values()) {
                        column.insert(index.clone(), value);
                    }
                }
                Value::Object(
                    R::COLUMNS
                        .iter()
                        .zip(columns)
                        .map(|(name, values)| (name.to_string(), Value::Object(values)))
                        .collect(),
                )
            }
            Self::Split => serde_json::json!({
                "index": rows.iter().map(|r| r.index()).collect::<Vec<_>>(),
                "columns": R::COLUMNS,
                "data": rows.iter().map(|r| r.values()).collect::<Vec<_>>(),
            }),
            Self::Records => Value::Array(
                rows.iter()
                    .map(|r| Value::Object(row_object(*r)))
                    .collect(),
            ),
            Self::Index => Value::Object(
                rows.iter()
                    .map(|r| (r.index().to_string(), Value::Object(row_object(*r))))
                    .collect(),
            ),
        }
    }
}

fn row_object<R: TableRow>(row: &R) -> Map<String, Value> {
    R::COLUMNS
        .iter()
        .map(|name| name.to_string())
        .zip(row.values())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Point {
        index: usize,
        x: i64,
        label: &'static str,
    }

    impl TableRow for Point {
        const COLUMNS: &'static [&'static str] = &["x", "label"];

        fn index(&self) -> usize {
            self.index
        }

        fn values(&self) -> Vec<Value> {
            vec![json!(self.x), json!(self.label)]
        }
    }

    fn points() -> Vec<Point> {
        vec![
            Point { index: 3, x: 1, label: "a" },
            Point { index: 7, x: 2, label: "b" },
        ]
    }

    fn render(shape: OutputShape) -> Value {
        let points = points();
        let rows: Vec<&Point> = points.iter().collect();
        shape.render(&rows)
    }

    #[test]
    fn test_list_shape() {
        assert_eq!(render(OutputShape::List), json!({"x": [1, 2], "label": ["a", "b"]}));
        assert_eq!(render(OutputShape::Series), render(OutputShape::List));
    }

    #[test]
    fn test_list_preserves_column_order() {
        let value = render(OutputShape::List);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["x", "label"]);
    }

    #[test]
    fn test_dict_shape() {
        assert_eq!(
            render(OutputShape::Dict),
            json!({"x": {"3": 1, "7": 2}, "label": {"3": "a", "7": "b"}})
        );
    }

    #[test]
    fn test_split_shape() {
        assert_eq!(
            render(OutputShape::Split),
            json!({"index": [3, 7], "columns": ["x", "label"], "data": [[1, "a"], [2, "b"]]})
        );
    }

    #[test]
    fn test_records_and_index_shapes() {
        assert_eq!(
            render(OutputShape::Records),
            json!([{"x": 1, "label": "a"}, {"x": 2, "label": "b"}])
        );
        assert_eq!(
            render(OutputShape::Index),
            json!({"3": {"x": 1, "label": "a"}, "7": {"x": 2, "label": "b"}})
        );
    }

    #[test]
    fn test_empty_list_keeps_columns() {
        let rows: Vec<&Point> = Vec::new();
        assert_eq!(OutputShape::List.render(&rows), json!({"x": [], "label": []}));
    }

    #[test]
    fn test_parse_names() {
        for shape in [
            OutputShape::Dict,
            OutputShape::List,
            OutputShape::Series,
            OutputShape::Split,
            OutputShape::Records,
            OutputShape::Index,
        ] {
            assert_eq!(OutputShape::parse(shape.as_str()), Some(shape));
        }
        assert_eq!(OutputShape::parse("tight"), None);
    }
}
