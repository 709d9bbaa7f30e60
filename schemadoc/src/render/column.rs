// Cell-level formatting shared by every markdown table

use crate::catalog::{ColumnRow, KeyFlag, Nullability};

/// One markdown table row, `|a|b|c|` plus newline.
pub fn table_row<S: AsRef<str>>(cells: &[S]) -> String {
    let mut row = String::from("|");
    for cell in cells {
        row.push_str(cell.as_ref());
        row.push('|');
    }
    row.push('\n');
    row
}

/// Free text placed inside a table cell. Pipes would split the cell and
/// newlines would end the row.
pub fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
}

pub fn null_symbol(image_dir: &str, nullable: Nullability) -> String {
    match nullable {
        Nullability::Yes => format!("![Yes]({image_dir}/checked.png \"Allows NULL\")"),
        Nullability::No => format!("![No]({image_dir}/unchecked.png \"Not NULL\")"),
    }
}

/// Icon for a key flag; a column without key gets an empty cell.
pub fn key_symbol(image_dir: &str, key: KeyFlag) -> String {
    match key {
        KeyFlag::None => String::new(),
        KeyFlag::Primary => format!("![PRI]({image_dir}/pri_key.png \"Primary Key\")"),
        KeyFlag::Unique => format!("![UNI]({image_dir}/uni_key.png \"Unique Key\")"),
        KeyFlag::Indexed => format!("![MUL]({image_dir}/mul_key.png \"Index\")"),
    }
}

/// Display text of a column default.
///
/// A true SQL NULL reads `*null*` on a nullable column and `*not set*`
/// otherwise; an empty string default reads `*empty*`; anything else is
/// shown as stored.
pub fn column_default(default: Option<&str>, nullable: Nullability) -> String {
    match default {
        None if nullable.is_nullable() => "*null*".to_string(),
        None => "*not set*".to_string(),
        Some("") => "*empty*".to_string(),
        Some(value) => escape_cell(value),
    }
}

/// Foreign-key rule as displayed; `NO ACTION` behaves as `RESTRICT`.
pub fn constraint_rule(rule: &str) -> String {
    rule.replace("NO ACTION", "RESTRICT")
}

pub fn column_header() -> String {
    let mut header = table_row(&["Field", "Type", "Null", "Key", "Default", "Comment"]);
    header.push_str(&table_row(&["-----", "----", "-", ":-:", "-------", "-------"]));
    header
}

pub fn column_row(image_dir: &str, column: &ColumnRow) -> String {
    table_row(&[
        format!("`{}`", escape_cell(&column.field)),
        escape_cell(&column.type_text),
        null_symbol(image_dir, column.nullable),
        key_symbol(image_dir, column.key),
        column_default(column.default.as_deref(), column.nullable),
        escape_cell(column.comment.trim()),
    ])
}
