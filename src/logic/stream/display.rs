//! Display / Reporting
//!
//! Pure formatting cho một row: fields chính, label của từng predictor,
//! ground truth và running accuracy (nếu có).

use std::io::{self, Write};
use crossterm::style::Stylize;

use crate::logic::dataset::LabeledRecord;
use crate::logic::model::TrafficClass;

/// One predictor's verdict for the row being rendered
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict<'a> {
    pub predictor: &'a str,
    pub label: TrafficClass,
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderStyle {
    pub color: bool,
    /// "\r\n" while the terminal is in raw mode
    pub newline: &'static str,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self { color: false, newline: "\n" }
    }
}

pub struct Renderer<W: Write> {
    out: W,
    style: RenderStyle,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, style: RenderStyle) -> Self {
        Self { out, style }
    }

    /// One block per record
    pub fn render(&mut self, item: &LabeledRecord, verdicts: &[Verdict<'_>]) -> io::Result<()> {
        let r = &item.record;
        let nl = self.style.newline;

        write!(
            self.out,
            "#{:<7} t={:<12.6} {} -> {} {} len={}{}",
            r.sequence_no, r.time, r.source, r.destination, r.protocol, r.length, nl
        )?;
        if !r.info.is_empty() {
            write!(self.out, "    {}{}", r.info, nl)?;
        }

        for verdict in verdicts {
            let label = self.label(verdict.label);
            match verdict.accuracy {
                Some(acc) => write!(
                    self.out,
                    "    {:<10} {}  (accuracy {:.2}%){}",
                    verdict.predictor,
                    label,
                    acc * 100.0,
                    nl
                )?,
                None => write!(self.out, "    {:<10} {}{}", verdict.predictor, label, nl)?,
            }
        }

        if let Some(truth) = item.label {
            write!(self.out, "    {:<10} {}{}", "actual", self.label(truth), nl)?;
        }

        self.out.flush()
    }

    fn label(&self, class: TrafficClass) -> String {
        if self.style.color {
            class.display_name().with(class.color()).bold().to_string()
        } else {
            class.display_name().to_string()
        }
    }
}
