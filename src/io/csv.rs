use csv::{ReaderBuilder, Writer};
use std::borrow::Cow;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::dataset::{Column, ColumnSet, OrderRecord, OrderTable};
use crate::error::{Error, Result};
use crate::features::{parse_numeric, parse_timestamp};

/// Store one raw cell into the matching field of a record
///
/// Returns `false` when a non-empty cell could not be coerced; the field is
/// left missing in that case.
fn assign_cell(record: &mut OrderRecord, column: Column, raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return true;
    }

    let text = || Some(raw.to_string());
    let whole = |v: f64| if v.fract() == 0.0 { Some(v as i64) } else { None };

    match column {
        Column::OrderId => record.order_id = text(),
        Column::Category => record.category = text(),
        Column::Subcategory => record.subcategory = text(),
        Column::DeliveryService => record.delivery_service = text(),
        Column::OrderDate => record.order_date = parse_timestamp(raw),
        Column::DeliveryForecast => record.delivery_forecast = parse_timestamp(raw),
        Column::DeliveryDate => record.delivery_date = parse_timestamp(raw),
        Column::Subtotal => record.subtotal = parse_numeric(raw),
        Column::Discount => record.discount = parse_numeric(raw),
        Column::Total => record.total = parse_numeric(raw),
        Column::FreightPrice => record.freight_price = parse_numeric(raw),
        Column::ProductPrice => record.product_price = parse_numeric(raw),
        Column::IsConfirmed => record.is_confirmed = parse_numeric(raw),
        Column::FreightShare => record.freight_share = parse_numeric(raw),
        Column::DiscountAbs => record.discount_abs = parse_numeric(raw),
        Column::DeliveryDelayDays => {
            record.delivery_delay_days = parse_numeric(raw).and_then(whole)
        }
        Column::DeliveryLeadTime => {
            record.delivery_lead_time = parse_numeric(raw).and_then(whole)
        }
        Column::IsLate => record.is_late = parse_numeric(raw).and_then(whole),
    }

    record.is_present(column)
}

/// Read an orders table from any CSV source with a header row
///
/// Headers are matched to known columns case-insensitively; other columns
/// are ignored. Cells that cannot be coerced become missing values in their
/// own record only. Invalid UTF-8 is decoded lossily and counted as a bad
/// cell rather than failing the load.
pub fn read_orders_from_reader<R: Read>(reader: R) -> Result<OrderTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mapping: Vec<Option<Column>> = rdr
        .byte_headers()
        .map_err(Error::Csv)?
        .iter()
        .map(String::from_utf8_lossy)
        .map(|h| match h.parse::<Column>() {
            Ok(column) => Some(column),
            Err(_) => {
                log::debug!("Ignoring unknown column '{}'", h);
                None
            }
        })
        .collect();

    let columns: ColumnSet = mapping.iter().flatten().copied().collect();
    if columns.is_empty() {
        return Err(Error::EmptyData(
            "CSV header contains no known order columns".into(),
        ));
    }

    let mut records = Vec::new();
    let mut bad_cells = 0usize;

    for result in rdr.byte_records() {
        let row = result.map_err(Error::Csv)?;
        let mut record = OrderRecord::default();
        for (column, raw) in mapping.iter().zip(row.iter()) {
            if let Some(column) = column {
                let text = String::from_utf8_lossy(raw);
                let valid = matches!(text, Cow::Borrowed(_));
                if !assign_cell(&mut record, *column, &text) || !valid {
                    bad_cells += 1;
                }
            }
        }
        records.push(record);
    }

    if bad_cells > 0 {
        log::warn!("{} cells could not be parsed and were treated as missing", bad_cells);
    }
    log::info!("Loaded {} orders with {} known columns", records.len(), columns.len());

    Ok(OrderTable::new(columns, records))
}

/// Read an orders table from a CSV file
///
/// A file that cannot be opened is an `Error::Io` naming the path.
pub fn read_orders<P: AsRef<Path>>(path: P) -> Result<OrderTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    read_orders_from_reader(file)
}

/// Write a header and string rows to a CSV file
pub(crate) fn write_rows<P, W>(path: P, header: &[&str], rows: W) -> Result<()>
where
    P: AsRef<Path>,
    W: IntoIterator<Item = Vec<String>>,
{
    let file = File::create(path.as_ref()).map_err(Error::Io)?;
    write_rows_to(file, header, rows)
}

pub(crate) fn write_rows_to<T, W>(writer: T, header: &[&str], rows: W) -> Result<()>
where
    T: Write,
    W: IntoIterator<Item = Vec<String>>,
{
    let mut wtr = Writer::from_writer(writer);

    wtr.write_record(header).map_err(Error::Csv)?;
    for row in rows {
        wtr.write_record(&row).map_err(Error::Csv)?;
    }

    wtr.flush().map_err(Error::Io)?;
    Ok(())
}

/// Format an optional float for a CSV cell, empty when missing
pub(crate) fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
