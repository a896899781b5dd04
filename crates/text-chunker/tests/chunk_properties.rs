use docqa_chunker::{chunk, normalize_text, reassemble, Chunker, ChunkerConfig};
use proptest::prelude::*;

fn config_strategy() -> impl Strategy<Value = (usize, usize)> {
    (1usize..64).prop_flat_map(|target| (Just(target), 0..target))
}

fn text_strategy() -> impl Strategy<Value = String> {
    // Mix ASCII, Hebrew and table separators so multi-byte chars hit window edges.
    proptest::collection::vec(
        prop_oneof![
            Just('a'),
            Just('Z'),
            Just(' '),
            Just('\n'),
            Just('|'),
            Just('ש'),
            Just('ם'),
            Just('é'),
        ],
        0..400,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn adjacent_chunks_share_overlap((target, overlap) in config_strategy(), text in text_strategy()) {
        let windows = chunk(&text, target, overlap).unwrap();
        for pair in windows.windows(2) {
            let left: Vec<char> = pair[0].chars().collect();
            let right: Vec<char> = pair[1].chars().collect();
            prop_assert_eq!(left.len(), target);
            prop_assert!(right.len() > overlap);
            prop_assert_eq!(&left[target - overlap..], &right[..overlap]);
        }
    }

    #[test]
    fn reassembly_is_lossless((target, overlap) in config_strategy(), text in text_strategy()) {
        let windows = chunk(&text, target, overlap).unwrap();
        prop_assert_eq!(reassemble(&windows, overlap), text);
    }

    #[test]
    fn chunks_are_never_empty((target, overlap) in config_strategy(), text in text_strategy()) {
        let windows = chunk(&text, target, overlap).unwrap();
        prop_assert_eq!(windows.is_empty(), text.is_empty());
        prop_assert!(windows.iter().all(|w| !w.is_empty()));
        prop_assert!(windows.iter().all(|w| w.chars().count() <= target));
    }

    #[test]
    fn normalization_is_idempotent(text in text_strategy()) {
        let once = normalize_text(&text);
        prop_assert_eq!(normalize_text(&once), once.clone());
        prop_assert!(once.lines().all(|line| !line.trim().is_empty()));
    }
}

#[test]
fn document_chunks_round_trip_through_ids() {
    let chunker = Chunker::new(ChunkerConfig::new(5, 2)).unwrap();
    let text = "Clinic hours | Sunday | 08:00-16:00";
    let chunks = chunker.chunk_document("hours.html", text);
    let windows: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(reassemble(&windows, 2), text);
    for (expected, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.chunk_id, expected);
    }
}
