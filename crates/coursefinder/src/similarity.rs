/// Calculate cosine similarity between two embeddings
///
/// Mismatched lengths and zero-magnitude vectors score 0.0. Sums are taken
/// in f64 so large finite components cannot overflow into NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() {
    return 0.0;
  }

  let dot_product: f64 = a.iter().zip(b.iter()).map(|(&x, &y)| f64::from(x) * f64::from(y)).sum();
  let magnitude_a = norm(a);
  let magnitude_b = norm(b);

  if magnitude_a == 0.0 || magnitude_b == 0.0 {
    return 0.0;
  }

  let score = dot_product / (magnitude_a * magnitude_b);
  if score.is_finite() {
    score.clamp(-1.0, 1.0) as f32
  } else {
    0.0
  }
}

/// Scale a vector to unit length; zero vectors come back unchanged
pub fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
  let magnitude = norm(&vector);
  if magnitude > f64::from(f32::EPSILON) {
    for value in vector.iter_mut() {
      *value = (f64::from(*value) / magnitude) as f32;
    }
  }
  vector
}

/// L2 norm
fn norm(vector: &[f32]) -> f64 {
  vector.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt()
}
