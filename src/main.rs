use std::path::PathBuf;

use anyhow::{bail, Context};
use rubrica::Submission;
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage: rubrica [-t|--trace] <HTML> <CSS> <NAME>

Grades an HTML page and its stylesheet and prints the score with feedback.

Arguments:
  <HTML>  the student's page
  <CSS>   the student's stylesheet
  <NAME>  the student's full name as it should appear on the page

Options:
  -t, --trace  log parsing and grading to stderr (filter with RUST_LOG)
  -h, --help   print this message
";

struct Args {
    pub html: PathBuf,
    pub css: PathBuf,
    pub student_name: String,
    pub trace: bool,
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args()? {
        Some(args) => args,
        None => {
            print!("{}", USAGE);
            return Ok(());
        }
    };
    if args.trace {
        tracing_subscriber::fmt()
            .with_span_events(FmtSpan::ACTIVE)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .init();
        info!("Logger initialized");
    }

    let submission = Submission::load(&args.html, &args.css)?;
    let report = submission.grade(&args.student_name);
    info!(total = report.total(), "Graded submission");
    print!("{}", report);
    Ok(())
}

/// `None` when help was asked for
fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut pargs = pico_args::Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        return Ok(None);
    }
    let trace = pargs.contains(["-t", "--trace"]);
    let args = Args {
        html: pargs.free_from_str().context("missing <HTML> path")?,
        css: pargs.free_from_str().context("missing <CSS> path")?,
        student_name: pargs.free_from_str().context("missing <NAME>")?,
        trace,
    };
    let rest = pargs.finish();
    if !rest.is_empty() {
        bail!("unexpected arguments: {:?}\n\n{}", rest, USAGE);
    }
    Ok(Some(args))
}
