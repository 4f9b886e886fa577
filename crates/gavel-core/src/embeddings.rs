/// Cosine similarity of two embedding vectors, in [-1, 1].
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> anyhow::Result<f64> {
    if a.is_empty() || b.is_empty() {
        anyhow::bail!("cannot compute similarity of an empty embedding");
    }
    if a.len() != b.len() {
        anyhow::bail!(
            "embedding dimension mismatch: {} vs {} (are both texts embedded with the same model?)",
            a.len(),
            b.len()
        );
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        anyhow::bail!("cannot compute similarity of a zero-magnitude embedding");
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
