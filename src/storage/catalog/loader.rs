use crate::common::{Error, Result};
use crate::storage::catalog::Catalog;
use crate::storage::disk::HeapFile;
use crate::types::{Column, DataType, Schema};
use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::Arc;

lazy_static! {
    static ref TABLE_LINE: Regex =
        Regex::new(r"^\s*(?P<name>\w+)\s*\((?P<columns>.*)\)\s*$").unwrap();
}

/// Loads a catalog description file: UTF-8, one table per line, shaped as
/// `name(colName type [pk], colName type, ...)` with `type` one of `int`
/// or `string` (case-insensitive). Each table's data lives next to the
/// description file as `<name>.dat`. Returns the names of the loaded
/// tables in file order.
pub fn load_schema(catalog: &Catalog, path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut loaded = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (name, schema, primary_key) = parse_table_line(line)
            .map_err(|err| Error::InvalidInput(format!("line {}: {err}", line_no + 1)))?;

        let data_path = base_dir.join(format!("{name}.dat"));
        let file = Arc::new(HeapFile::open(&data_path, Arc::new(schema))?);
        info!("loaded table {name} (id {}) from {:?}", file.id(), data_path);
        catalog.add_table(file, &name, &primary_key);
        loaded.push(name);
    }
    Ok(loaded)
}

fn parse_table_line(line: &str) -> Result<(String, Schema, String)> {
    let captures = TABLE_LINE
        .captures(line)
        .ok_or_else(|| Error::InvalidInput(format!("malformed table description: {line}")))?;
    let name = captures["name"].to_string();

    let mut columns = Vec::new();
    let mut primary_key = String::new();
    for column_def in captures["columns"].split(',') {
        let tokens: Vec<&str> = column_def.split_whitespace().collect();
        match tokens.as_slice() {
            [col_name, col_type] => {
                columns.push(Column::new(col_name, parse_type(col_type)?));
            }
            [col_name, col_type, pk] if pk.eq_ignore_ascii_case("pk") => {
                columns.push(Column::new(col_name, parse_type(col_type)?));
                primary_key = col_name.to_string();
            }
            _ => {
                return Result::from(Error::InvalidInput(format!(
                    "malformed column description: {}",
                    column_def.trim()
                )))
            }
        }
    }

    Ok((name, Schema::new(columns)?, primary_key))
}

fn parse_type(token: &str) -> Result<DataType> {
    match token.to_ascii_lowercase().as_str() {
        "int" => Ok(DataType::Int),
        "string" => Ok(DataType::Text),
        other => crate::errinput!("unknown column type: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_catalog(dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("catalog.txt");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_two_tables() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(
            &dir,
            "users(id int pk, name string)\norders(id int pk, user_id int, item string)\n",
        );

        let catalog = Catalog::new();
        let loaded = load_schema(&catalog, &path).unwrap();
        assert_eq!(loaded, vec!["users".to_string(), "orders".to_string()]);

        let users = catalog.table_id("users").unwrap();
        let schema = catalog.schema(users).unwrap();
        assert_eq!(schema.col_count(), 2);
        assert_eq!(schema.column_name(0), "id");
        assert_eq!(schema.field_type(1), DataType::Text);
        assert_eq!(catalog.primary_key(users).unwrap(), "id");

        // The data files appear next to the description file.
        assert!(dir.path().join("users.dat").exists());
        assert!(dir.path().join("orders.dat").exists());
    }

    #[test]
    fn test_types_are_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(&dir, "t(a INT, b String)\n");

        let catalog = Catalog::new();
        load_schema(&catalog, &path).unwrap();

        let schema = catalog.schema(catalog.table_id("t").unwrap()).unwrap();
        assert_eq!(schema.field_type(0), DataType::Int);
        assert_eq!(schema.field_type(1), DataType::Text);
    }

    #[test]
    fn test_parse_errors() {
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::new();

        let missing_paren = write_catalog(&dir, "users id int\n");
        assert!(matches!(
            load_schema(&catalog, &missing_paren),
            Err(Error::InvalidInput(_))
        ));

        let bad_type = write_catalog(&dir, "users(id float)\n");
        assert!(matches!(
            load_schema(&catalog, &bad_type),
            Err(Error::InvalidInput(_))
        ));

        let junk_token = write_catalog(&dir, "users(id int primary)\n");
        assert!(matches!(
            load_schema(&catalog, &junk_token),
            Err(Error::InvalidInput(_))
        ));
    }
}
