pub fn chunk_vec<T: Clone>(items: &[T], chunk_size: usize) -> Vec<Vec<T>> {
    if chunk_size == 0 {
        return Vec::new();
    }

    items
        .chunks(chunk_size)
        .map(|chunk| chunk.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_even_chunks_with_remainder() {
        let chunks = chunk_vec(&[1, 2, 3, 4, 5], 2);
        assert_eq!(chunks, vec![vec![1, 2], vec![3, 4], vec![5]]);
    }

    #[test]
    fn zero_chunk_size_yields_nothing() {
        let chunks = chunk_vec(&[1, 2, 3], 0);
        assert!(chunks.is_empty());
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunks: Vec<Vec<i32>> = chunk_vec(&[], 10);
        assert!(chunks.is_empty());
    }
}
