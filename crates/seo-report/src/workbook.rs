//! SpreadsheetML 2003 workbook.
//!
//! Each bundle sheet becomes one `Worksheet`; the first row holds the column
//! names. Missing cells are written as empty `<Cell/>` elements so the
//! distinction between missing and empty text survives a round trip.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use seo_model::{OutputBundle, Sheet, Table, Value};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{ReportError, Result};

pub const WORKBOOK_FILE: &str = "audit_report.xml";

const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";
const OFFICE_NS: &str = "urn:schemas-microsoft-com:office:office";
const HEADER_STYLE: &str = "header";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Writes the bundle atomically: a temporary sibling is renamed into place,
/// so on failure no partial workbook is left at `path`.
pub fn write_workbook(bundle: &OutputBundle, path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|source| ReportError::io(parent, source))?;

    let temp = NamedTempFile::new_in(parent).map_err(|source| ReportError::io(parent, source))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        write_xml(&mut writer, bundle).map_err(|source| ReportError::io(path, source))?;
        writer.flush().map_err(|source| ReportError::io(path, source))?;
    }
    temp.persist(path)
        .map_err(|err| ReportError::io(path, err.error))?;

    info!(
        path = %path.display(),
        sheet_count = bundle.sheets.len(),
        "workbook written"
    );
    Ok(())
}

fn write_xml<W: Write>(out: W, bundle: &OutputBundle) -> std::io::Result<()> {
    let mut xml = Writer::new_with_indent(out, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("Workbook");
    root.push_attribute(("xmlns", SPREADSHEET_NS));
    root.push_attribute(("xmlns:o", OFFICE_NS));
    root.push_attribute(("xmlns:ss", SPREADSHEET_NS));
    xml.write_event(Event::Start(root))?;

    xml.write_event(Event::Start(BytesStart::new("Styles")))?;
    let mut style = BytesStart::new("Style");
    style.push_attribute(("ss:ID", HEADER_STYLE));
    xml.write_event(Event::Start(style))?;
    let mut font = BytesStart::new("Font");
    font.push_attribute(("ss:Bold", "1"));
    xml.write_event(Event::Empty(font))?;
    xml.write_event(Event::End(BytesEnd::new("Style")))?;
    xml.write_event(Event::End(BytesEnd::new("Styles")))?;

    for sheet in &bundle.sheets {
        write_sheet(&mut xml, sheet)?;
    }

    xml.write_event(Event::End(BytesEnd::new("Workbook")))?;
    Ok(())
}

fn write_sheet<W: Write>(xml: &mut Writer<W>, sheet: &Sheet) -> std::io::Result<()> {
    let mut worksheet = BytesStart::new("Worksheet");
    worksheet.push_attribute(("ss:Name", sheet.name.as_str()));
    xml.write_event(Event::Start(worksheet))?;
    xml.write_event(Event::Start(BytesStart::new("Table")))?;

    let mut header = BytesStart::new("Row");
    header.push_attribute(("ss:StyleID", HEADER_STYLE));
    xml.write_event(Event::Start(header))?;
    for column in &sheet.table.columns {
        write_data_cell(xml, "String", column)?;
    }
    xml.write_event(Event::End(BytesEnd::new("Row")))?;

    for row in &sheet.table.rows {
        xml.write_event(Event::Start(BytesStart::new("Row")))?;
        for value in row {
            match value {
                Value::Missing => xml.write_event(Event::Empty(BytesStart::new("Cell")))?,
                Value::Text(text) => write_data_cell(xml, "String", text)?,
                Value::Number(_) => write_data_cell(xml, "Number", &value.to_string())?,
                Value::Timestamp(ts) => {
                    write_data_cell(xml, "DateTime", &ts.format(DATETIME_FORMAT).to_string())?;
                }
            }
        }
        xml.write_event(Event::End(BytesEnd::new("Row")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("Table")))?;
    xml.write_event(Event::End(BytesEnd::new("Worksheet")))?;
    Ok(())
}

fn write_data_cell<W: Write>(xml: &mut Writer<W>, kind: &str, text: &str) -> std::io::Result<()> {
    xml.write_event(Event::Start(BytesStart::new("Cell")))?;
    let mut data = BytesStart::new("Data");
    data.push_attribute(("ss:Type", kind));
    xml.write_event(Event::Start(data))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new("Data")))?;
    xml.write_event(Event::End(BytesEnd::new("Cell")))?;
    Ok(())
}

/// Reads a workbook written by [`write_workbook`].
pub fn read_workbook(path: &Path) -> Result<OutputBundle> {
    if !path.is_file() {
        return Err(ReportError::MissingArtifact {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path).map_err(|source| ReportError::io(path, source))?;
    parse_workbook(&contents, path)
}

#[derive(Debug, Default)]
struct SheetBuffer {
    name: String,
    rows: Vec<Vec<Value>>,
}

#[derive(Debug)]
struct DataBuffer {
    kind: String,
    text: String,
}

fn parse_workbook(contents: &str, path: &Path) -> Result<OutputBundle> {
    let mut reader = Reader::from_str(contents);
    let mut bundle = OutputBundle::default();
    let mut sheet: Option<SheetBuffer> = None;
    let mut row: Option<Vec<Value>> = None;
    let mut cell: Option<Value> = None;
    let mut data: Option<DataBuffer> = None;

    loop {
        let event = reader.read_event().map_err(|source| ReportError::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        match event {
            Event::Start(start) => match start.name().as_ref() {
                b"Worksheet" => {
                    sheet = Some(SheetBuffer {
                        name: attribute(&start, "ss:Name", path)?
                            .ok_or_else(|| ReportError::invalid(path, "worksheet without a name"))?,
                        rows: Vec::new(),
                    });
                }
                b"Row" => row = Some(Vec::new()),
                b"Cell" => cell = Some(Value::Missing),
                b"Data" => {
                    data = Some(DataBuffer {
                        kind: attribute(&start, "ss:Type", path)?.unwrap_or_else(|| "String".into()),
                        text: String::new(),
                    });
                }
                _ => {}
            },
            Event::Empty(empty) => {
                if empty.name().as_ref() == b"Cell"
                    && let Some(row) = row.as_mut()
                {
                    row.push(Value::Missing);
                }
            }
            Event::Text(text) => {
                if let Some(data) = data.as_mut() {
                    let raw = String::from_utf8_lossy(&text);
                    let unescaped = quick_xml::escape::unescape(&raw)
                        .map_err(|err| ReportError::invalid(path, err))?;
                    data.text.push_str(&unescaped);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(data) = data.as_mut() {
                    data.text.push(resolve_reference(&reference, path)?);
                }
            }
            Event::End(end) => match end.name().as_ref() {
                b"Data" => {
                    if let Some(data) = data.take() {
                        cell = Some(typed_value(&data, path)?);
                    }
                }
                b"Cell" => {
                    if let (Some(row), Some(value)) = (row.as_mut(), cell.take()) {
                        row.push(value);
                    }
                }
                b"Row" => {
                    if let (Some(sheet), Some(row)) = (sheet.as_mut(), row.take()) {
                        sheet.rows.push(row);
                    }
                }
                b"Worksheet" => {
                    if let Some(buffer) = sheet.take() {
                        bundle.sheets.push(finish_sheet(buffer, path)?);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(bundle)
}

fn attribute(start: &BytesStart<'_>, name: &str, path: &Path) -> Result<Option<String>> {
    let Some(attr) = start
        .try_get_attribute(name)
        .map_err(|err| ReportError::invalid(path, err))?
    else {
        return Ok(None);
    };
    let raw = String::from_utf8_lossy(&attr.value);
    let value = quick_xml::escape::unescape(&raw).map_err(|err| ReportError::invalid(path, err))?;
    Ok(Some(value.into_owned()))
}

fn resolve_reference(reference: &quick_xml::events::BytesRef<'_>, path: &Path) -> Result<char> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|err| ReportError::invalid(path, err))?
    {
        return Ok(ch);
    }
    let name = String::from_utf8_lossy(reference);
    match name.as_ref() {
        "amp" => Ok('&'),
        "lt" => Ok('<'),
        "gt" => Ok('>'),
        "quot" => Ok('"'),
        "apos" => Ok('\''),
        other => Err(ReportError::invalid(path, format!("unknown entity &{other};"))),
    }
}

fn typed_value(data: &DataBuffer, path: &Path) -> Result<Value> {
    match data.kind.as_str() {
        "Number" => data
            .text
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| ReportError::invalid(path, format!("bad number '{}'", data.text))),
        "DateTime" => NaiveDateTime::parse_from_str(data.text.trim(), DATETIME_FORMAT)
            .map(Value::Timestamp)
            .map_err(|_| ReportError::invalid(path, format!("bad date '{}'", data.text))),
        _ => Ok(Value::Text(data.text.clone())),
    }
}

fn finish_sheet(buffer: SheetBuffer, path: &Path) -> Result<Sheet> {
    let mut rows = buffer.rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| ReportError::invalid(path, format!("sheet '{}' has no header", buffer.name)))?;
    let columns: Vec<String> = header.iter().map(ToString::to_string).collect();

    let mut table = Table::new(columns);
    let width = table.columns.len();
    for mut row in rows {
        if row.len() > width {
            return Err(ReportError::invalid(
                path,
                format!("sheet '{}' has a row wider than its header", buffer.name),
            ));
        }
        row.resize(width, Value::Missing);
        table.push_row(row);
    }
    Ok(Sheet::new(buffer.name, table))
}
