//! Buffered mini-step writer.
//!
//! Lifecycle: nothing touches the filesystem until the first flush, which
//! writes the specification file and opens the parameter stream. Separate
//! (per-report-step) mode rolls to a new stream file whenever the report
//! step advances; unified mode appends to a single file for the whole run.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::types::{MiniStep, SummarySpecification};
use crate::OutputResult;

pub(crate) const TAG_SEQHDR: u32 = 1;
pub(crate) const TAG_MINISTEP: u32 = 2;
pub(crate) const TAG_PARAMS: u32 = 3;

pub struct SummaryWriter {
    out_dir: PathBuf,
    base_name: String,
    unified: bool,
    spec: SummarySpecification,
    spec_written: bool,
    /// Slot buffer: the first `num_unwritten` entries are pending output,
    /// the rest are reusable allocations from earlier flushes.
    unwritten: Vec<MiniStep>,
    num_unwritten: usize,
    next_id: u32,
    last_seq: Option<u32>,
    stream: Option<BufWriter<File>>,
    /// Report step of the open stream file in separate mode.
    stream_seq: Option<u32>,
    /// Last SEQHDR written to the open stream.
    header_seq: Option<u32>,
}

impl SummaryWriter {
    pub fn new(
        out_dir: impl Into<PathBuf>,
        base_name: impl Into<String>,
        unified: bool,
        spec: SummarySpecification,
    ) -> Self {
        Self {
            out_dir: out_dir.into(),
            base_name: base_name.into(),
            unified,
            spec,
            spec_written: false,
            unwritten: Vec::new(),
            num_unwritten: 0,
            next_id: 0,
            last_seq: None,
            stream: None,
            stream_seq: None,
            header_seq: None,
        }
    }

    pub fn specification_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.rsmspec.json", self.base_name))
    }

    fn stream_path(&self, seq: u32) -> PathBuf {
        if self.unified {
            self.out_dir.join(format!("{}.ursmry", self.base_name))
        } else {
            self.out_dir.join(format!("{}.s{seq:04}", self.base_name))
        }
    }

    /// Claim the buffer slot for the next mini-step of report step `seq`,
    /// zero-filled to the parameter count. Report steps must arrive in
    /// non-decreasing order.
    pub fn next_mini_step(&mut self, seq: u32) -> &mut MiniStep {
        assert!(
            self.last_seq.is_none_or(|last| seq >= last),
            "report step went backwards: {seq} after {:?}",
            self.last_seq
        );
        self.last_seq = Some(seq);

        let width = self.spec.params.len();
        if self.num_unwritten == self.unwritten.len() {
            self.unwritten.push(MiniStep::default());
        }
        let slot = &mut self.unwritten[self.num_unwritten];
        self.num_unwritten += 1;

        slot.id = self.next_id;
        self.next_id += 1;
        slot.seq = seq;
        slot.params.clear();
        slot.params.resize(width, 0.0);
        slot
    }

    pub fn pending(&self) -> usize {
        self.num_unwritten
    }

    /// Write all buffered mini-steps and make the stream durable. A flush
    /// with nothing buffered does not touch the filesystem.
    pub fn flush(&mut self) -> OutputResult<()> {
        if self.num_unwritten == 0 {
            return Ok(());
        }

        if !self.spec_written {
            fs::create_dir_all(&self.out_dir)?;
            let json = serde_json::to_string_pretty(&self.spec)?;
            fs::write(self.specification_path(), json)?;
            self.spec_written = true;
            tracing::debug!(path = %self.specification_path().display(), "wrote specification");
        }

        // Buffer slots are claimed in step order, but keep the contract
        // explicit for readers of the stream.
        self.unwritten[..self.num_unwritten].sort_by_key(|m| (m.seq, m.id));

        for i in 0..self.num_unwritten {
            let (seq, id) = (self.unwritten[i].seq, self.unwritten[i].id);
            self.ensure_stream(seq)?;

            let need_header = self.header_seq != Some(seq);
            self.header_seq = Some(seq);

            let mut payload = Vec::with_capacity(self.unwritten[i].params.len() * 4);
            for v in &self.unwritten[i].params {
                payload.extend_from_slice(&v.to_le_bytes());
            }

            if let Some(stream) = self.stream.as_mut() {
                if need_header {
                    write_record(stream, TAG_SEQHDR, &seq.to_le_bytes())?;
                }
                write_record(stream, TAG_MINISTEP, &id.to_le_bytes())?;
                write_record(stream, TAG_PARAMS, &payload)?;
            }
        }

        if let Some(stream) = self.stream.as_mut() {
            stream.flush()?;
            stream.get_ref().sync_all()?;
        }

        tracing::debug!(count = self.num_unwritten, "flushed mini-steps");
        self.num_unwritten = 0;
        Ok(())
    }

    fn ensure_stream(&mut self, seq: u32) -> OutputResult<()> {
        let roll = match (self.unified, self.stream_seq) {
            (true, _) => self.stream.is_none(),
            (false, Some(open)) => open != seq,
            (false, None) => true,
        };
        if !roll {
            return Ok(());
        }

        if let Some(mut old) = self.stream.take() {
            old.flush()?;
            old.get_ref().sync_all()?;
        }

        let path = self.stream_path(seq);
        let file = File::create(&path)?;
        tracing::debug!(path = %path.display(), "opened parameter stream");
        self.stream = Some(BufWriter::new(file));
        self.stream_seq = Some(seq);
        self.header_seq = None;
        Ok(())
    }
}

pub(crate) fn write_record(
    out: &mut impl Write,
    tag: u32,
    payload: &[u8],
) -> OutputResult<()> {
    out.write_all(&tag.to_le_bytes())?;
    out.write_all(&(payload.len() as u32).to_le_bytes())?;
    out.write_all(payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParamSpec;
    use rv_core::UnitSystem;

    fn spec(n: usize) -> SummarySpecification {
        SummarySpecification {
            start_time: "2025-01-01T00:00:00Z".to_owned(),
            unit_convention: UnitSystem::Metric,
            grid_dims: [1, 1, 1],
            params: (0..n)
                .map(|i| ParamSpec {
                    keyword: format!("KW{i}"),
                    wgname: None,
                    number: 0,
                    unit: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn slots_are_reused_between_flushes() {
        let dir = std::env::temp_dir().join("rv_output_slots");
        let _ = std::fs::remove_dir_all(&dir);
        let mut w = SummaryWriter::new(&dir, "CASE", true, spec(2));

        let m = w.next_mini_step(1);
        m.params[0] = 1.0;
        assert_eq!(w.pending(), 1);
        w.flush().unwrap();
        assert_eq!(w.pending(), 0);

        // The reclaimed slot comes back zeroed with a fresh id.
        let m = w.next_mini_step(1);
        assert_eq!(m.id, 1);
        assert_eq!(m.params, vec![0.0, 0.0]);
        assert_eq!(w.unwritten.len(), 1);
    }

    #[test]
    fn empty_flush_touches_nothing() {
        let dir = std::env::temp_dir().join("rv_output_empty");
        let _ = std::fs::remove_dir_all(&dir);
        let mut w = SummaryWriter::new(&dir, "CASE", true, spec(1));
        w.flush().unwrap();
        assert!(!w.specification_path().exists());
    }

    #[test]
    #[should_panic(expected = "report step went backwards")]
    fn decreasing_report_step_asserts() {
        let dir = std::env::temp_dir().join("rv_output_order");
        let mut w = SummaryWriter::new(&dir, "CASE", true, spec(1));
        w.next_mini_step(3);
        w.next_mini_step(2);
    }
}
