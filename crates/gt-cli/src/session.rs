//! Interactive session: one command per input line.
//!
//! The session remembers the last successful prediction. A rejected
//! submission reports its issues and leaves the remembered prediction as it
//! was.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use gt_model::Prediction;
use gt_report::PatientIdentity;
use tracing::debug;

use crate::app::App;
use crate::cli::{parse_adjustment, parse_assignment};
use crate::commands::{
    export_report, report_format, validation_failure, write_analytics, write_explanation,
    write_prediction, write_recommendation,
};
use crate::summary::render_validation;

pub const PROMPT: &str = "glucotrack> ";

const HELP: &str = "\
Commands:
  predict NAME=VALUE ...   predict risk, e.g. predict Glucose=150 BMI=28 ...
  show                     show the current prediction
  recommend                lifestyle recommendations for the current prediction
  analytics [NAME=VALUE]   compare with the dataset; values re-predict with changes
  explain                  global importance and attribution of the current prediction
  export PATH              write a report (.json for JSON, otherwise PDF)
  help                     show this help
  quit                     leave the session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<'a> {
    app: &'a App,
    current: Option<Prediction>,
}

impl<'a> Session<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app, current: None }
    }

    pub fn current(&self) -> Option<&Prediction> {
        self.current.as_ref()
    }

    /// Run one command line.
    pub fn handle(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Flow::Continue);
        };
        let args: Vec<&str> = words.collect();
        debug!(command, arguments = args.len(), "session command");
        match command {
            "predict" => self.predict(&args, out)?,
            "show" => write_prediction(out, self.require()?)?,
            "recommend" => write_recommendation(out, self.require()?)?,
            "analytics" => {
                let adjustments = args
                    .iter()
                    .map(|arg| parse_adjustment(arg).map_err(|message| anyhow!(message)))
                    .collect::<Result<Vec<_>>>()?;
                write_analytics(self.app, out, self.require()?, &adjustments)?;
            }
            "explain" => write_explanation(self.app, out, self.current.as_ref())?,
            "export" => {
                let [path] = args.as_slice() else {
                    bail!("usage: export PATH");
                };
                let path = Path::new(path);
                let written = export_report(
                    self.app,
                    self.require()?,
                    PatientIdentity::default(),
                    path,
                    report_format(path, None),
                )?;
                writeln!(out, "Report written to {}", written.display())?;
            }
            "help" => writeln!(out, "{HELP}")?,
            "quit" | "exit" => return Ok(Flow::Quit),
            other => bail!("unknown command `{other}`; type `help` for a list"),
        }
        Ok(Flow::Continue)
    }

    fn predict(&mut self, args: &[&str], out: &mut impl Write) -> Result<()> {
        let assignments = args
            .iter()
            .map(|arg| parse_assignment(arg).map_err(|message| anyhow!(message)))
            .collect::<Result<Vec<_>>>()?;
        let prediction = self.app.predict(&assignments)?;
        write_prediction(out, &prediction)?;
        self.current = Some(prediction);
        Ok(())
    }

    fn require(&self) -> Result<&Prediction> {
        self.current
            .as_ref()
            .ok_or_else(|| anyhow!("no prediction yet; run `predict` first"))
    }
}

/// Read commands from `input` until `quit` or end of input.
pub fn run_session(app: &App, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    writeln!(out, "GlucoTrack session. Type `help` for commands.")?;
    let mut session = Session::new(app);
    prompt(out)?;
    for line in input.lines() {
        let line = line.context("read session input")?;
        match session.handle(&line, out) {
            Ok(Flow::Quit) => return Ok(()),
            Ok(Flow::Continue) => {}
            Err(error) => report(out, &error)?,
        }
        prompt(out)?;
    }
    writeln!(out)?;
    Ok(())
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "{PROMPT}")?;
    out.flush()
}

fn report(out: &mut impl Write, error: &anyhow::Error) -> io::Result<()> {
    match validation_failure(error) {
        Some(validation) => writeln!(out, "{}", render_validation(validation)),
        None => writeln!(out, "error: {error:#}"),
    }
}
