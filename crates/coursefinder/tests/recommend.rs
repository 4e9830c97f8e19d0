use coursefinder::{recommend, Corpus, CourseFinderError, CourseSearch, EmbeddingProvider, HashEmbedder};
use std::io::Write;

fn titles(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_python_query_ranks_python_course_first() {
  let mut embedder = HashEmbedder::default();
  let corpus = titles(&["Intro to Python", "Advanced Machine Learning", "Cooking Basics"]);

  let matches = recommend(&mut embedder, "Python programming", &corpus, 2).unwrap();

  assert_eq!(matches.len(), 2);
  assert_eq!(matches[0].index, 0);
  assert!((matches[0].score - 0.5).abs() < 1e-5);
  assert!(matches[0].score >= matches[1].score);
}

#[test]
fn test_top_k_larger_than_corpus() {
  let mut embedder = HashEmbedder::default();
  let corpus = titles(&["Intro to Python", "Cooking Basics"]);

  let matches = recommend(&mut embedder, "python", &corpus, 10).unwrap();
  assert_eq!(matches.len(), 2);

  let mut indices: Vec<usize> = matches.iter().map(|m| m.index).collect();
  indices.sort_unstable();
  assert_eq!(indices, vec![0, 1]);
}

#[test]
fn test_identical_title_scores_one() {
  let mut embedder = HashEmbedder::default();
  let corpus = titles(&["Cooking Basics", "Intro to Python"]);

  let matches = recommend(&mut embedder, "Intro to Python", &corpus, 1).unwrap();
  assert_eq!(matches[0].index, 1);
  assert!((matches[0].score - 1.0).abs() < 1e-5);
}

#[test]
fn test_scores_stay_in_cosine_range() {
  let mut embedder = HashEmbedder::default();
  let corpus = titles(&["Intro to Python", "Advanced Machine Learning", "Cooking Basics", "Data Science with R"]);

  let matches = recommend(&mut embedder, "learning python for data science", &corpus, 4).unwrap();
  assert!(matches.iter().all(|m| (-1.0..=1.0).contains(&m.score)));
  assert!(matches.windows(2).all(|pair| pair[0].score >= pair[1].score));
}

#[test]
fn test_empty_corpus_and_invalid_top_k() {
  let mut embedder = HashEmbedder::default();

  assert!(recommend(&mut embedder, "anything", &[], 5).unwrap().is_empty());

  let err = recommend(&mut embedder, "python", &titles(&["Intro to Python"]), 0).unwrap_err();
  assert!(matches!(err, CourseFinderError::InvalidArgument { .. }));
}

#[test]
fn test_empty_query_scores_zero_in_corpus_order() {
  let mut embedder = HashEmbedder::default();
  let corpus = titles(&["Intro to Python", "Advanced Machine Learning", "Cooking Basics"]);

  let matches = recommend(&mut embedder, "", &corpus, 3).unwrap();

  let order: Vec<usize> = matches.iter().map(|m| m.index).collect();
  assert_eq!(order, vec![0, 1, 2]);
  assert!(matches.iter().all(|m| m.score == 0.0));
}

#[test]
fn test_embeddings_are_deterministic() {
  let mut embedder = HashEmbedder::default();
  let first = embedder.encode("Advanced Machine Learning").unwrap();
  let second = embedder.encode("Advanced Machine Learning").unwrap();
  assert_eq!(first, second);
}

#[test]
fn test_search_over_loaded_catalog() {
  let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
  write!(file, "Title\tLessons\nIntro to Python\t12\nCooking Basics\t\n").unwrap();
  file.flush().unwrap();

  let corpus = Corpus::load(file.path()).unwrap();
  assert_eq!(corpus.source(), Some(file.path()));

  let mut search = CourseSearch::new(corpus, HashEmbedder::default()).unwrap();
  let results = search.search("cooking", 1).unwrap();

  assert_eq!(results.len(), 1);
  assert_eq!(results[0].index, 1);
  assert_eq!(results[0].course.title, "Cooking Basics");
  assert_eq!(results[0].course.lessons(), "N/A");
}
