//! The interactive recorder loop.
//!
//! One action word per line, mapping 1:1 to the session controller's
//! operations. Staging an annotated event prompts for a description on the
//! next line; a blank line submits without one, the cancel token discards
//! the staged event entirely. Guard violations print a message and the loop
//! continues.

use std::io::{BufRead, Lines, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;

use tsr_core::{
    AnnotatedKind, Event, EventKind, MetadataField, ProcessMetadata, Session, SessionError,
    export_csv, export_filename, format_ms,
};

use crate::ticker::Ticker;

/// Token that discards a staged annotated event at the description prompt.
const CANCEL_TOKEN: &str = ":cancel";

/// Settings for one recorder run.
#[derive(Debug)]
pub struct RunOptions {
    /// Initial metadata (prefilled from CLI flags, editable via `set`).
    pub metadata: ProcessMetadata,
    /// Directory export files are written into.
    pub export_dir: PathBuf,
    /// Redraw the elapsed display on a background ticker. Interactive
    /// terminals only; scripted runs leave it off.
    pub live_clock: bool,
}

/// Runs the recorder until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(input: R, output: W, options: RunOptions) -> Result<()> {
    Recorder::new(output, options).run(input)
}

/// One recorder action word.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Start,
    DowntimeStart,
    DowntimeEnd,
    OperatorTask,
    PalletComplete,
    Stop,
    Reset,
    Export,
    Status,
    ShowLog,
    Set(MetadataField, String),
    Help,
    Quit,
}

impl Action {
    /// Parses a trimmed, non-empty input line. The error is the message to
    /// show the operator.
    fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.splitn(3, ' ');
        let word = parts.next().unwrap_or("");
        match word {
            "start" => Ok(Self::Start),
            "downtime" => Ok(Self::DowntimeStart),
            "downtime-end" | "end" => Ok(Self::DowntimeEnd),
            "task" => Ok(Self::OperatorTask),
            "pallet" => Ok(Self::PalletComplete),
            "stop" => Ok(Self::Stop),
            "reset" => Ok(Self::Reset),
            "export" => Ok(Self::Export),
            "status" => Ok(Self::Status),
            "log" => Ok(Self::ShowLog),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            "set" => {
                let field = parts
                    .next()
                    .ok_or("usage: set <field> <value>")?
                    .parse::<MetadataField>()
                    .map_err(|e| e.to_string())?;
                let value = parts.next().unwrap_or("").to_string();
                Ok(Self::Set(field, value))
            }
            _ => Err(format!("unknown action: {word} (try 'help')")),
        }
    }
}

struct Recorder<W: Write> {
    session: Session,
    metadata: ProcessMetadata,
    export_dir: PathBuf,
    live_clock: bool,
    ticker: Option<Ticker>,
    out: W,
}

impl<W: Write> Recorder<W> {
    fn new(out: W, options: RunOptions) -> Self {
        Self {
            session: Session::new(),
            metadata: options.metadata,
            export_dir: options.export_dir,
            live_clock: options.live_clock,
            ticker: None,
            out,
        }
    }

    fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        writeln!(
            self.out,
            "Time study recorder. Type 'help' for actions, 'quit' to exit."
        )?;

        let mut lines = input.lines();
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            let Some(line) = lines.next() else { break };
            let line = line.context("failed to read input")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match Action::parse(line) {
                Ok(Action::Quit) => break,
                Ok(action) => self.dispatch(action, &mut lines)?,
                Err(message) => writeln!(self.out, "  ! {message}")?,
            }
        }

        self.ticker.take();
        Ok(())
    }

    fn dispatch<R: BufRead>(&mut self, action: Action, lines: &mut Lines<R>) -> Result<()> {
        match action {
            Action::Start => {
                report(&mut self.out, self.session.start(Utc::now()))?;
                self.sync_ticker();
            }
            Action::Stop => {
                report(&mut self.out, self.session.stop(Utc::now()))?;
                self.sync_ticker();
            }
            Action::Reset => {
                self.session.reset();
                self.sync_ticker();
                writeln!(self.out, "  session cleared")?;
            }
            Action::DowntimeEnd => {
                report(&mut self.out, self.session.log_downtime_end(Utc::now()))?;
            }
            Action::PalletComplete => {
                report(&mut self.out, self.session.log_pallet_complete(Utc::now()))?;
            }
            Action::DowntimeStart => self.stage_annotated(AnnotatedKind::DowntimeStart, lines)?,
            Action::OperatorTask => self.stage_annotated(AnnotatedKind::OperatorTask, lines)?,
            Action::Status => self.print_status()?,
            Action::ShowLog => self.print_log()?,
            Action::Set(field, value) => {
                self.metadata.set(field, value);
                writeln!(self.out, "  {field} updated")?;
            }
            Action::Export => match self.export() {
                Ok(path) => writeln!(
                    self.out,
                    "  exported {} events to {}",
                    self.session.events().len(),
                    path.display()
                )?,
                Err(err) => writeln!(self.out, "  ! export failed: {err:#}")?,
            },
            Action::Help => self.print_help()?,
            Action::Quit => {}
        }
        Ok(())
    }

    /// Stages an annotated event, then resolves it from the next input line.
    fn stage_annotated<R: BufRead>(
        &mut self,
        kind: AnnotatedKind,
        lines: &mut Lines<R>,
    ) -> Result<()> {
        if let Err(err) = self.session.stage(kind, Utc::now()) {
            writeln!(self.out, "  ! {err}")?;
            return Ok(());
        }

        write!(
            self.out,
            "  description for {} (blank for none, '{CANCEL_TOKEN}' to discard): ",
            kind.label()
        )?;
        self.out.flush()?;

        // End of input counts as cancel: a script that stops mid-annotation
        // must leave no partial state behind.
        let Some(line) = lines.next() else {
            self.session.cancel_annotation()?;
            writeln!(self.out, "  canceled, nothing logged")?;
            return Ok(());
        };
        let line = line.context("failed to read description")?;
        let text = line.trim();

        if text == CANCEL_TOKEN {
            self.session.cancel_annotation()?;
            writeln!(self.out, "  canceled, nothing logged")?;
        } else {
            report(&mut self.out, self.session.submit_annotation(text))?;
        }
        Ok(())
    }

    fn print_status(&mut self) -> Result<()> {
        let state = if self.session.is_running() {
            "running"
        } else {
            "stopped"
        };
        writeln!(
            self.out,
            "  clock {state}  elapsed {}  pallets {}",
            format_ms(self.session.elapsed_ms(Utc::now())),
            self.session.pallet_count()
        )?;
        Ok(())
    }

    fn print_log(&mut self) -> Result<()> {
        if self.session.events().is_empty() {
            writeln!(self.out, "  no events logged")?;
            return Ok(());
        }
        for event in self.session.events() {
            writeln!(
                self.out,
                "  {}  {}",
                format_ms(event.duration_ms),
                render_kind(&event.kind)
            )?;
        }
        Ok(())
    }

    fn print_help(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "  start         start the stopwatch\n  \
               downtime      log a downtime start (asks for a description)\n  \
               downtime-end  log a downtime end\n  \
               task          log an operator task (asks for a description)\n  \
               pallet        log a completed pallet\n  \
               stop          stop the stopwatch\n  \
               reset         wipe the session\n  \
               status        show clock state and pallet count\n  \
               log           show the event log\n  \
               set           set a metadata field, e.g. set line Line 4\n  \
               export        write the session CSV\n  \
               quit          exit"
        )?;
        Ok(())
    }

    /// Writes the session CSV into the export directory.
    fn export(&self) -> Result<PathBuf> {
        let now = Utc::now();
        let csv = export_csv(&self.metadata, self.session.events(), now)?;
        let path = self.export_dir.join(export_filename(now.date_naive()));
        std::fs::write(&path, csv)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Keeps the tick source tied 1:1 to the Running state: cancel whatever
    /// is live, then spawn a fresh one only if the clock is running. At most
    /// one ticker exists at any time.
    fn sync_ticker(&mut self) {
        self.ticker.take();
        if !(self.live_clock && self.session.is_running()) {
            return;
        }

        let base_ms = self.session.elapsed_ms(Utc::now());
        let origin = Instant::now();
        self.ticker = Some(Ticker::spawn(move || {
            let elapsed =
                base_ms + u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX);
            // The display goes to stderr so piped stdout stays clean.
            let mut err = std::io::stderr();
            let _ = write!(err, "\r  {} ", format_ms(elapsed));
            let _ = err.flush();
        }));
    }
}

/// Prints the outcome of a logging action.
fn report<W: Write>(
    out: &mut W,
    result: Result<&Event, SessionError>,
) -> std::io::Result<()> {
    match result {
        Ok(event) => writeln!(
            out,
            "  logged {}  (+{})",
            render_kind(&event.kind),
            format_ms(event.duration_ms)
        ),
        Err(err) => writeln!(out, "  ! {err}"),
    }
}

/// Log-display rendering: the event label with its annotation, and the
/// sequence number for pallet completions.
fn render_kind(kind: &EventKind) -> String {
    match kind.pallet_sequence() {
        Some(sequence) => format!("{kind} #{sequence}"),
        None => kind.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_word_actions() {
        assert_eq!(Action::parse("start"), Ok(Action::Start));
        assert_eq!(Action::parse("downtime"), Ok(Action::DowntimeStart));
        assert_eq!(Action::parse("downtime-end"), Ok(Action::DowntimeEnd));
        assert_eq!(Action::parse("end"), Ok(Action::DowntimeEnd));
        assert_eq!(Action::parse("pallet"), Ok(Action::PalletComplete));
        assert_eq!(Action::parse("exit"), Ok(Action::Quit));
    }

    #[test]
    fn parse_set_with_spaced_value() {
        assert_eq!(
            Action::parse("set process-name Night shift bagging"),
            Ok(Action::Set(
                MetadataField::ProcessName,
                "Night shift bagging".to_string()
            ))
        );
    }

    #[test]
    fn parse_set_without_value_sets_empty() {
        assert_eq!(
            Action::parse("set line"),
            Ok(Action::Set(MetadataField::Line, String::new()))
        );
    }

    #[test]
    fn parse_rejects_unknown_words() {
        let err = Action::parse("launch").unwrap_err();
        assert!(err.contains("unknown action: launch"));

        let err = Action::parse("set shift day").unwrap_err();
        assert!(err.contains("unknown metadata field"));
    }

    #[test]
    fn render_includes_pallet_sequence() {
        let kind = EventKind::PalletComplete { sequence: 2 };
        assert_eq!(render_kind(&kind), "Pallet Complete #2");
        assert_eq!(render_kind(&EventKind::DowntimeEnd), "Downtime End");
    }
}
