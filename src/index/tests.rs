use super::*;
use std::collections::HashSet;

fn three_vectors() -> Vec<Vec<f32>> {
    vec![
        vec![0.0, 0.0, 1.0],
        vec![0.5, 0.5, 0.0],
        vec![1.0, 0.0, 0.0],
    ]
}

#[test]
fn exact_match_is_top_result_with_zero_distance() {
    let index = FlatIndex::build(three_vectors()).expect("should build index");

    let hits = index.search(&[0.5, 0.5, 0.0], 1).expect("should search");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 1);
    assert!(hits[0].distance.abs() < f32::EPSILON);
}

#[test]
fn distances_are_squared_euclidean() {
    let index = FlatIndex::build(vec![vec![3.0, 4.0]]).expect("should build index");

    let hits = index.search(&[0.0, 0.0], 1).expect("should search");

    assert!((hits[0].distance - 25.0).abs() < 1e-5);
}

#[test]
fn k_larger_than_index_is_invalid() {
    let index = FlatIndex::build(three_vectors()).expect("should build index");

    assert!(matches!(
        index.search(&[0.0, 0.0, 0.0], 4),
        Err(RagError::InvalidArgument(_))
    ));
    assert!(matches!(
        index.search(&[0.0, 0.0, 0.0], 0),
        Err(RagError::InvalidArgument(_))
    ));
}

#[test]
fn valid_k_returns_distinct_sorted_ids() {
    let index = FlatIndex::build(three_vectors()).expect("should build index");

    for k in 1..=index.len() {
        let hits = index.search(&[0.9, 0.1, 0.0], k).expect("should search");

        assert_eq!(hits.len(), k);
        let ids = hits.iter().map(|h| h.id).collect::<HashSet<_>>();
        assert_eq!(ids.len(), k);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }
}

#[test]
fn ties_are_broken_by_lower_row_id() {
    let index = FlatIndex::build(vec![
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![-1.0, 0.0],
        vec![0.0, -1.0],
    ])
    .expect("should build index");

    let hits = index.search(&[0.0, 0.0], 4).expect("should search");

    assert_eq!(hits.iter().map(|h| h.id).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
}

#[test]
fn build_rejects_mismatched_dimensions() {
    let result = FlatIndex::build(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0]]);

    match result {
        Err(RagError::DimensionMismatch {
            expected,
            found,
            row,
        }) => {
            assert_eq!(expected, 2);
            assert_eq!(found, 1);
            assert_eq!(row, 2);
        }
        other => panic!("expected DimensionMismatch, got {:?}", other),
    }
}

#[test]
fn build_rejects_empty_input() {
    assert!(matches!(
        FlatIndex::build(Vec::new()),
        Err(RagError::InvalidArgument(_))
    ));
    assert!(matches!(
        FlatIndex::build(vec![Vec::new()]),
        Err(RagError::InvalidArgument(_))
    ));
}

#[test]
fn search_rejects_query_with_wrong_dimension() {
    let index = FlatIndex::build(three_vectors()).expect("should build index");
    assert!(matches!(
        index.search(&[1.0, 0.0], 1),
        Err(RagError::DimensionMismatch { .. })
    ));
}

#[test]
fn append_extends_index() {
    let mut index = FlatIndex::build(three_vectors()).expect("should build index");

    let row = index.append(vec![0.0, 1.0, 0.0]).expect("should append");
    assert_eq!(row, 3);
    assert_eq!(index.len(), 4);
    assert_eq!(index.dimension(), 3);
    assert!(!index.is_empty());

    let hits = index.search(&[0.0, 1.0, 0.0], 1).expect("should search");
    assert_eq!(hits[0].id, 3);

    assert!(matches!(
        index.append(vec![1.0]),
        Err(RagError::DimensionMismatch { row: 4, .. })
    ));
}
