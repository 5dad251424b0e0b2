//! Paragraph-aligned chunking of transcript text.

use tracing::debug;

/// Group paragraphs into newline-joined chunks of at most `max_chars`
/// characters.
///
/// Paragraphs are never split or reordered. A chunk is closed as soon as the
/// next paragraph plus its separator would not fit; a paragraph longer than
/// the budget on its own becomes a single oversized chunk.
pub fn chunk_paragraphs<S: AsRef<str>>(paragraphs: &[S], max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    // Characters in `buffer`, counting one separator per paragraph.
    let mut current = 0;

    for para in paragraphs {
        let para = para.as_ref();
        let len = para.chars().count();

        if current + len + 1 > max_chars && !buffer.is_empty() {
            chunks.push(buffer.join("\n"));
            buffer.clear();
            current = 0;
        }

        buffer.push(para);
        current += len + 1;
    }

    if !buffer.is_empty() {
        chunks.push(buffer.join("\n"));
    }

    debug!(
        paragraphs = paragraphs.len(),
        chunks = chunks.len(),
        max_chars,
        "chunked transcript"
    );
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let paragraphs: [&str; 0] = [];
        assert!(chunk_paragraphs(&paragraphs, 3500).is_empty());
    }

    #[test]
    fn short_paragraphs_share_a_chunk() {
        let chunks = chunk_paragraphs(&["short1", "short2", "short3"], 3500);
        assert_eq!(chunks, vec!["short1\nshort2\nshort3"]);
    }

    #[test]
    fn paragraphs_that_do_not_fit_start_new_chunks() {
        let a = "a".repeat(2000);
        let b = "b".repeat(2000);
        let chunks = chunk_paragraphs(&[a.clone(), b.clone()], 3500);
        assert_eq!(chunks, vec![a, b]);
    }

    #[test]
    fn oversized_paragraph_is_kept_whole() {
        let big = "x".repeat(5000);
        let chunks = chunk_paragraphs(&["intro".to_string(), big.clone(), "outro".to_string()], 3500);
        assert_eq!(chunks, vec!["intro".to_string(), big, "outro".to_string()]);
    }

    #[test]
    fn budget_counts_characters_not_bytes() {
        // 4 chars, 8 bytes each.
        let chunks = chunk_paragraphs(&["éééé", "éééé"], 10);
        assert_eq!(chunks, vec!["éééé\néééé"]);
    }

    #[test]
    fn chunks_round_trip_and_respect_budget() {
        let paragraphs: Vec<String> = (0..60)
            .map(|i| format!("P{i} {}", "word ".repeat((i * 37) % 90)))
            .collect();

        for budget in [1, 50, 200, 499, 3500] {
            let chunks = chunk_paragraphs(&paragraphs, budget);

            let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split('\n')).collect();
            let expected: Vec<&str> = paragraphs.iter().map(String::as_str).collect();
            assert_eq!(rejoined, expected, "budget {budget}");

            for chunk in &chunks {
                let single = !chunk.contains('\n');
                assert!(char_len(chunk) <= budget || single, "budget {budget}: {chunk:?}");
            }
        }
    }
}
