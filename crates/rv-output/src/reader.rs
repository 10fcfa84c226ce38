//! Incremental re-reading of summary output files.
//!
//! The framed record layout lets a consumer pick up a growing stream from
//! any record boundary without re-parsing the file head, which is what
//! interactive plotting tools do while a run is still producing steps.

use std::fs;
use std::path::Path;

use crate::stream::{TAG_MINISTEP, TAG_PARAMS, TAG_SEQHDR};
use crate::types::{MiniStep, SummarySpecification};
use crate::{OutputError, OutputResult};

#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    SeqHdr(u32),
    MiniStep(u32),
    Params(Vec<f32>),
}

pub fn read_specification(path: &Path) -> OutputResult<SummarySpecification> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Decode every framed record in a parameter stream file.
pub fn read_records(path: &Path) -> OutputResult<Vec<Record>> {
    let bytes = fs::read(path)?;
    let mut records = Vec::new();
    let mut at = 0usize;

    while at < bytes.len() {
        let (tag, payload) = next_frame(&bytes, &mut at)?;
        let record = match tag {
            TAG_SEQHDR => Record::SeqHdr(payload_u32(payload)?),
            TAG_MINISTEP => Record::MiniStep(payload_u32(payload)?),
            TAG_PARAMS => {
                if payload.len() % 4 != 0 {
                    return Err(OutputError::InvalidRecord {
                        message: format!("params payload of {} bytes", payload.len()),
                    });
                }
                let values = payload
                    .chunks_exact(4)
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect();
                Record::Params(values)
            }
            other => {
                return Err(OutputError::InvalidRecord {
                    message: format!("unknown record tag {other}"),
                })
            }
        };
        records.push(record);
    }

    Ok(records)
}

/// Reassemble mini-steps from a parameter stream file.
pub fn read_ministeps(path: &Path) -> OutputResult<Vec<MiniStep>> {
    let mut out: Vec<MiniStep> = Vec::new();
    let mut seq = 0u32;
    let mut pending_id: Option<u32> = None;

    for record in read_records(path)? {
        match record {
            Record::SeqHdr(s) => seq = s,
            Record::MiniStep(id) => pending_id = Some(id),
            Record::Params(values) => {
                let Some(id) = pending_id.take() else {
                    return Err(OutputError::InvalidRecord {
                        message: "params record without mini-step header".to_owned(),
                    });
                };
                out.push(MiniStep {
                    id,
                    seq,
                    params: values,
                });
            }
        }
    }

    Ok(out)
}

fn next_frame<'a>(bytes: &'a [u8], at: &mut usize) -> OutputResult<(u32, &'a [u8])> {
    let header = bytes.get(*at..*at + 8).ok_or_else(|| OutputError::InvalidRecord {
        message: "truncated record header".to_owned(),
    })?;
    let tag = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;

    let start = *at + 8;
    let payload = bytes
        .get(start..start + len)
        .ok_or_else(|| OutputError::InvalidRecord {
            message: "truncated record payload".to_owned(),
        })?;
    *at = start + len;
    Ok((tag, payload))
}

fn payload_u32(payload: &[u8]) -> OutputResult<u32> {
    let bytes: [u8; 4] = payload.try_into().map_err(|_| OutputError::InvalidRecord {
        message: format!("expected 4-byte payload, got {}", payload.len()),
    })?;
    Ok(u32::from_le_bytes(bytes))
}
