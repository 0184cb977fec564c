use crate::table::{Dataset, Value};
use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Builder, Int64Builder, StringBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{io::Write, sync::Arc};

/// Column type from the cells it holds: all integers → Int64, all numbers →
/// Float64, anything textual → Utf8. Missing cells do not vote.
fn infer_dtype<'a>(values: impl Iterator<Item = &'a Value>) -> DataType {
    let mut dtype = DataType::Int64;
    for v in values {
        match v {
            Value::Int(_) | Value::Missing => {}
            Value::Float(_) => dtype = DataType::Float64,
            Value::Text(_) => return DataType::Utf8,
        }
    }
    dtype
}

pub fn arrow_schema(ds: &Dataset) -> Schema {
    let fields: Vec<Field> = ds
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let dtype = infer_dtype(ds.rows().map(|r| &r[i]));
            Field::new(name, dtype, true)
        })
        .collect();
    Schema::new(fields)
}

pub fn to_record_batch(ds: &Dataset) -> Result<RecordBatch> {
    let schema = Arc::new(arrow_schema(ds));
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(ds.columns().len());

    for (i, field) in schema.fields().iter().enumerate() {
        let cells = ds.rows().map(|r| &r[i]);
        let array: ArrayRef = match field.data_type() {
            DataType::Int64 => {
                let mut b = Int64Builder::with_capacity(ds.len());
                for v in cells {
                    b.append_option(match v {
                        Value::Int(x) => Some(*x),
                        _ => None,
                    });
                }
                Arc::new(b.finish())
            }
            DataType::Float64 => {
                let mut b = Float64Builder::with_capacity(ds.len());
                for v in cells {
                    b.append_option(v.as_f64());
                }
                Arc::new(b.finish())
            }
            _ => {
                let mut b = StringBuilder::new();
                for v in cells {
                    if v.is_missing() {
                        b.append_null();
                    } else {
                        b.append_value(v.to_string());
                    }
                }
                Arc::new(b.finish())
            }
        };
        arrays.push(array);
    }

    RecordBatch::try_new(schema, arrays).context("building export record batch")
}

/// Write `ds` as a single Snappy-compressed row group. Returns rows written.
pub fn write_parquet<W: Write + Send>(ds: &Dataset, writer: W) -> Result<usize> {
    let batch = to_record_batch(ds)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(writer, batch.schema(), Some(props))
        .context("creating parquet writer")?;
    writer.write(&batch).context("writing batch to parquet")?;
    writer.close().context("closing parquet writer")?;
    Ok(batch.num_rows())
}
