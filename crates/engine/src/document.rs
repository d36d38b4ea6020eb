// Canonical document types
//
// On the wire a document is plain JSON:
//   { "constants": [ {..}, .. ], "formulas": [ {..}, .. ],
//     "tables": [ { "name": "..", <scalar fields>.., "table": [ {..}, .. ] }, .. ] }
//
// The writer validates that shape into `CanonicalDocument`; the reader produces
// a `Document` keyed by worksheet name whose values are table categories.

use serde_json::{Map, Value};

use crate::error::{ConvertError, Result};

/// One row of a flat list or table: field name to decoded value.
pub type Record = Map<String, Value>;

/// Category name to category value, in insertion order.
pub type Document = Map<String, Value>;

pub const CONSTANTS_KEY: &str = "constants";
pub const FORMULAS_KEY: &str = "formulas";
pub const TABLES_KEY: &str = "tables";

/// Reserved field of a table category holding its rows.
pub const TABLE_KEY: &str = "table";
/// Field of a table category used as its worksheet title.
pub const NAME_KEY: &str = "name";

/// A category with scalar fields plus one table body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCategory {
    /// Every field except `table`, in the category's iteration order.
    pub fields: Map<String, Value>,
    pub table: Vec<Record>,
}

impl TableCategory {
    pub fn name(&self) -> Option<&str> {
        self.fields.get(NAME_KEY).and_then(Value::as_str)
    }

    /// Validate one element of `tables`. `index` is only used in error messages.
    pub fn from_value(value: &Value, index: usize) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            ConvertError::schema(format!("`{TABLES_KEY}[{index}]` must be an object"))
        })?;

        match map.get(NAME_KEY) {
            Some(Value::String(_)) => {}
            Some(_) => {
                return Err(ConvertError::schema(format!(
                    "`{TABLES_KEY}[{index}].{NAME_KEY}` must be a string"
                )))
            }
            None => {
                return Err(ConvertError::schema(format!(
                    "`{TABLES_KEY}[{index}]` is missing `{NAME_KEY}`"
                )))
            }
        }

        let mut fields = Map::new();
        let mut table = Vec::new();
        for (key, v) in map {
            if key == TABLE_KEY {
                let context = format!("{TABLES_KEY}[{index}].{TABLE_KEY}");
                table = records_from_value(v, &context)?;
            } else {
                fields.insert(key.clone(), v.clone());
            }
        }

        Ok(Self { fields, table })
    }

    /// `{ fields.., "table": [..] }` with `table` last.
    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert(
            TABLE_KEY.to_string(),
            Value::Array(self.table.iter().cloned().map(Value::Object).collect()),
        );
        Value::Object(map)
    }
}

/// Tagged category variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Category {
    /// "constants" and "formulas": an ordered list of records.
    FlatList(Vec<Record>),
    Table(TableCategory),
}

/// The writer's validated input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalDocument {
    pub constants: Vec<Record>,
    pub formulas: Vec<Record>,
    /// Order is authoritative for worksheet order.
    pub tables: Vec<TableCategory>,
}

impl CanonicalDocument {
    /// Validate a JSON document. Exactly the keys `constants`, `formulas` and
    /// `tables` must be present at the top level.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| ConvertError::schema("document must be a JSON object"))?;

        if let Some(extra) = map
            .keys()
            .find(|k| ![CONSTANTS_KEY, FORMULAS_KEY, TABLES_KEY].contains(&k.as_str()))
        {
            return Err(ConvertError::schema(format!("unexpected top-level key `{extra}`")));
        }

        let constants = records_from_value(required(map, CONSTANTS_KEY)?, CONSTANTS_KEY)?;
        let formulas = records_from_value(required(map, FORMULAS_KEY)?, FORMULAS_KEY)?;

        let tables = match required(map, TABLES_KEY)? {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| TableCategory::from_value(item, i))
                .collect::<Result<Vec<_>>>()?,
            _ => return Err(ConvertError::schema(format!("`{TABLES_KEY}` must be an array"))),
        };

        Ok(Self { constants, formulas, tables })
    }

    /// Consume the document into `(category name, category)` pairs in
    /// workbook order: constants, formulas, then every table.
    pub fn into_categories(self) -> Vec<(String, Category)> {
        let mut categories = Vec::with_capacity(self.tables.len() + 2);
        categories.push((CONSTANTS_KEY.to_string(), Category::FlatList(self.constants)));
        categories.push((FORMULAS_KEY.to_string(), Category::FlatList(self.formulas)));
        for table in self.tables {
            let name = table.name().unwrap_or_default().to_string();
            categories.push((name, Category::Table(table)));
        }
        categories
    }
}

fn required<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    map.get(key)
        .ok_or_else(|| ConvertError::schema(format!("missing required key `{key}`")))
}

fn records_from_value(value: &Value, context: &str) -> Result<Vec<Record>> {
    let items = value
        .as_array()
        .ok_or_else(|| ConvertError::schema(format!("`{context}` must be an array")))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_object()
                .cloned()
                .ok_or_else(|| ConvertError::schema(format!("`{context}[{i}]` must be an object")))
        })
        .collect()
}
