//! Structural information recovered from an OData `$metadata` (CSDL) document.
//!
//! All functions here are pure: they take the XML text and never touch the
//! network.

use crate::error::{FmODataError, FmODataResult};
use crate::models::Table;
use roxmltree::Document;

/// Attribute-value prefix FileMaker uses to expose scripts
pub const SCRIPT_NAME_PREFIX: &str = "Script.";

/// Name of the `EntityType` describing the given table.
///
/// FileMaker names the entity type after its table with a trailing
/// underscore (`Projects` -> `Projects_`).
pub fn entity_type_name(table: &str) -> String {
    format!("{}_", table)
}

fn parse(metadata_xml: &str) -> FmODataResult<Document<'_>> {
    Document::parse(metadata_xml)
        .map_err(|e| FmODataError::parse_error(format!("Failed to parse metadata XML: {}", e)))
}

/// Every `EntitySet` as a table, in document order
pub fn extract_tables(metadata_xml: &str) -> FmODataResult<Vec<Table>> {
    let doc = parse(metadata_xml)?;

    let tables: Vec<Table> = doc
        .descendants()
        .filter(|node| node.has_tag_name("EntitySet"))
        .filter_map(|node| node.attribute("Name"))
        .map(Table::entity_set)
        .collect();

    log::debug!("Parsed {} tables from metadata", tables.len());
    Ok(tables)
}

/// Script names exposed as `Name="Script.<identifier>"`, deduplicated and sorted
pub fn extract_scripts(metadata_xml: &str) -> FmODataResult<Vec<String>> {
    let doc = parse(metadata_xml)?;

    let mut scripts: Vec<String> = doc
        .descendants()
        .filter(|node| node.is_element())
        .filter_map(|node| node.attribute("Name"))
        .filter_map(script_identifier)
        .map(str::to_string)
        .collect();

    scripts.sort();
    scripts.dedup();

    log::debug!("Parsed {} scripts from metadata", scripts.len());
    Ok(scripts)
}

fn script_identifier(name: &str) -> Option<&str> {
    let identifier = name.strip_prefix(SCRIPT_NAME_PREFIX)?;
    let mut chars = identifier.chars();
    let first = chars.next()?;
    if !(first.is_alphabetic() || first == '_') {
        return None;
    }
    chars
        .all(|c| c.is_alphanumeric() || c == '_')
        .then_some(identifier)
}

/// Property names of the table's entity type, sorted.
///
/// An unknown table yields an empty list.
pub fn extract_fields(metadata_xml: &str, table: &str) -> FmODataResult<Vec<String>> {
    let doc = parse(metadata_xml)?;
    let type_name = entity_type_name(table);

    let Some(entity_type) = doc
        .descendants()
        .find(|node| {
            node.has_tag_name("EntityType") && node.attribute("Name") == Some(type_name.as_str())
        })
    else {
        log::debug!("No entity type {} in metadata", type_name);
        return Ok(Vec::new());
    };

    let mut fields: Vec<String> = entity_type
        .descendants()
        .filter(|node| node.has_tag_name("Property"))
        .filter_map(|node| node.attribute("Name"))
        .map(str::to_string)
        .collect();
    fields.sort();

    Ok(fields)
}
