//! Display formatting utilities for CLI output

use clap::ValueEnum;
use colored::*;
use serde::Serialize;

use crate::corpus::Corpus;
use crate::search::Recommendation;

const WRAP_WIDTH: usize = 80;
const DETAIL_INDENT: &str = "   ";
const DESCRIPTION_LABEL: &str = "Description:";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Pretty,
  Json,
}

/// Flattened result with placeholders already applied
#[derive(Debug, Serialize)]
struct ResultCard<'a> {
  rank: usize,
  index: usize,
  title: &'a str,
  link: &'a str,
  duration: &'a str,
  lessons: &'a str,
  description: &'a str,
  score: f32,
}

impl<'a> ResultCard<'a> {
  fn new(rank: usize, recommendation: &Recommendation<'a>) -> Self {
    let course = recommendation.course;
    Self {
      rank,
      index: recommendation.index,
      title: &course.title,
      link: course.link(),
      duration: course.duration(),
      lessons: course.lessons(),
      description: course.description(),
      score: recommendation.score,
    }
  }
}

/// Scores are always shown with two decimals
pub fn format_score(score: f32) -> String {
  format!("{score:.2}")
}

/// Render results in the requested format
pub fn render_results(
  results: &[Recommendation<'_>],
  query: &str,
  format: OutputFormat,
) -> serde_json::Result<String> {
  match format {
    OutputFormat::Pretty => Ok(render_pretty(results, query)),
    OutputFormat::Json => render_json(results),
  }
}

pub fn render_json(results: &[Recommendation<'_>]) -> serde_json::Result<String> {
  let cards: Vec<ResultCard<'_>> =
    results.iter().enumerate().map(|(i, r)| ResultCard::new(i + 1, r)).collect();
  serde_json::to_string_pretty(&cards)
}

pub fn render_pretty(results: &[Recommendation<'_>], query: &str) -> String {
  if results.is_empty() {
    return format!("No courses found for: {}\n", query.yellow());
  }

  let mut out = format!("{}\n\n", "Top Course Recommendations:".bold());
  for (i, result) in results.iter().enumerate() {
    out.push_str(&render_card(i + 1, result));
    out.push('\n');
  }
  out
}

/// One course card
pub fn render_card(rank: usize, result: &Recommendation<'_>) -> String {
  let course = result.course;
  let mut card = format!("{}. {}\n", rank, course.title.blue().bold());

  card.push_str(&detail("Link", &course.link().underline().to_string()));
  card.push_str(&detail("Duration", course.duration()));
  card.push_str(&detail("Lessons", course.lessons()));

  // Continuation lines line up under the first word of the description
  let label = DESCRIPTION_LABEL.bold();
  let hanging = DETAIL_INDENT.len() + DESCRIPTION_LABEL.len() + 1;
  let description = wrap_text(course.description(), WRAP_WIDTH - hanging);
  match description.split_first() {
    Some((first, rest)) => {
      card.push_str(&format!("{DETAIL_INDENT}{label} {first}\n"));
      for line in rest {
        card.push_str(&format!("{:hanging$}{line}\n", ""));
      }
    }
    None => card.push_str(&format!("{DETAIL_INDENT}{label}\n")),
  }

  card.push_str(&detail("Relevance Score", &format_score(result.score).green().to_string()));
  card
}

fn detail(label: &str, value: &str) -> String {
  format!("{DETAIL_INDENT}{} {}\n", format!("{label}:").bold(), value)
}

/// Catalog listing for the `courses` command
pub fn render_catalog(corpus: &Corpus) -> String {
  if corpus.is_empty() {
    return "The course catalog is empty.\n".to_string();
  }

  let width = corpus.len().to_string().len();
  corpus
    .iter()
    .enumerate()
    .map(|(index, course)| format!("{:>width$}  {}\n", index, course.title))
    .collect()
}

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let words: Vec<&str> = paragraph.split_whitespace().collect();
    let mut current_line = String::new();

    for word in words {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.len() + 1 + word.len() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(current_line);
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}
