//! Prompt loop for the `interactive` command

use colored::*;
use std::io::{BufRead, Write};
use tracing::warn;

use crate::display;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::search::CourseSearch;

pub const PROMPT: &str = "What course are you looking for? (e.g., Python, Machine Learning)";
pub const TRY_AGAIN: &str = "Something went wrong while searching. Please try again.";

fn is_exit(line: &str) -> bool {
  line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit")
}

/// Answer one query per input line until EOF, `quit` or `exit`
///
/// Results go to `out`. A query that fails to embed prints a retry notice to
/// `err` and the loop moves on; any other error ends the session.
pub fn run<P, R, W, E>(search: &mut CourseSearch<P>, top_k: usize, input: R, out: &mut W, err: &mut E) -> Result<()>
where
  P: EmbeddingProvider,
  R: BufRead,
  W: Write,
  E: Write,
{
  let mut lines = input.lines();

  loop {
    write!(out, "{} ", PROMPT.cyan().bold())?;
    out.flush()?;

    let Some(line) = lines.next() else {
      writeln!(out)?;
      break;
    };
    let line = line?;
    let query = line.trim();

    if query.is_empty() {
      continue;
    }
    if is_exit(query) {
      break;
    }

    match search.search(query, top_k) {
      Ok(results) => writeln!(out, "{}", display::render_pretty(&results, query))?,
      Err(e) if e.is_query_scoped() => {
        warn!(error = %e, "query failed");
        writeln!(err, "{}", TRY_AGAIN.red())?;
      }
      Err(e) => return Err(e),
    }
  }

  Ok(())
}
