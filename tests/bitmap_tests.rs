//! Tests for BitmapIndex
//!
//! These tests verify:
//! - Full builds from a table scan
//! - Incremental maintenance equivalence (build-then vs insert-as-you-go)
//! - Bit-string rendering against the row count at query time
//! - Raw posting-set access

use std::collections::BTreeSet;

use foliodb::{BitmapIndex, Tuple};

// =============================================================================
// Helper Functions
// =============================================================================

fn rows(data: &[(&str, &str)]) -> Vec<Tuple> {
    data.iter()
        .map(|(id, major)| vec![id.to_string(), major.to_string()])
        .collect()
}

const MAJORS: &[(&str, &str)] = &[
    ("1", "CS"),
    ("2", "BI"),
    ("3", "CS"),
    ("4", "DMET"),
    ("5", "BI"),
];

// =============================================================================
// Build Tests
// =============================================================================

#[test]
fn test_build_collects_positions_per_value() {
    let mut index = BitmapIndex::new("student", "major");
    index.build(&rows(MAJORS), 1);

    assert_eq!(
        index.raw_set("CS").unwrap(),
        &BTreeSet::from([0usize, 2])
    );
    assert_eq!(
        index.raw_set("BI").unwrap(),
        &BTreeSet::from([1usize, 4])
    );
    assert_eq!(index.raw_set("DMET").unwrap(), &BTreeSet::from([3usize]));
    assert_eq!(index.distinct_values(), 3);
}

#[test]
fn test_build_replaces_previous_contents() {
    let mut index = BitmapIndex::new("student", "major");
    index.build(&rows(MAJORS), 1);
    index.build(&rows(&[("9", "LAW")]), 1);

    assert!(index.raw_set("CS").is_none());
    assert_eq!(index.raw_set("LAW").unwrap(), &BTreeSet::from([0usize]));
    assert_eq!(index.distinct_values(), 1);
}

#[test]
fn test_build_skips_short_tuples() {
    let mut index = BitmapIndex::new("t", "c");
    let mut data = rows(&[("1", "CS")]);
    data.push(vec!["2".to_string()]); // missing the indexed field
    index.build(&data, 1);

    assert_eq!(index.raw_set("CS").unwrap(), &BTreeSet::from([0usize]));
    assert_eq!(index.distinct_values(), 1);
}

// =============================================================================
// Maintenance Equivalence Tests
// =============================================================================

#[test]
fn test_build_equals_incremental_maintenance() {
    let data = rows(MAJORS);

    let mut built = BitmapIndex::new("student", "major");
    built.build(&data, 1);

    let mut maintained = BitmapIndex::new("student", "major");
    for (g, tuple) in data.iter().enumerate() {
        maintained.insert_one(&tuple[1], g);
    }

    for value in ["CS", "BI", "DMET"] {
        assert_eq!(built.raw_set(value), maintained.raw_set(value));
    }
    assert_eq!(built.distinct_values(), maintained.distinct_values());
}

#[test]
fn test_insert_one_is_idempotent_per_position() {
    let mut index = BitmapIndex::new("t", "c");
    index.insert_one("CS", 3);
    index.insert_one("CS", 3);

    assert_eq!(index.raw_set("CS").unwrap(), &BTreeSet::from([3usize]));
}

// =============================================================================
// Bit-String Rendering Tests
// =============================================================================

#[test]
fn test_bits_for_value_round_trip() {
    let mut index = BitmapIndex::new("student", "major");
    index.build(&rows(MAJORS), 1);

    assert_eq!(index.bits_for_value("CS", 5), "10100");
    assert_eq!(index.bits_for_value("BI", 5), "01001");
    assert_eq!(index.bits_for_value("DMET", 5), "00010");
}

#[test]
fn test_bits_for_unseen_value_is_all_zero() {
    let mut index = BitmapIndex::new("student", "major");
    index.build(&rows(MAJORS), 1);

    assert_eq!(index.bits_for_value("LAW", 5), "00000");
}

#[test]
fn test_bits_length_reflects_query_time_row_count() {
    let mut index = BitmapIndex::new("student", "major");
    index.build(&rows(&[("1", "CS"), ("2", "BI"), ("3", "CS")]), 1);

    // Two rows inserted since the build: bits past the indexed range are 0.
    assert_eq!(index.bits_for_value("CS", 5), "10100");
    // Shorter render truncates.
    assert_eq!(index.bits_for_value("CS", 2), "10");
}

#[test]
fn test_ones_match_raw_set_cardinality() {
    let mut index = BitmapIndex::new("student", "major");
    index.build(&rows(MAJORS), 1);

    for value in ["CS", "BI", "DMET"] {
        let bits = index.bits_for_value(value, 5);
        let ones = bits.chars().filter(|&c| c == '1').count();
        assert_eq!(ones, index.raw_set(value).unwrap().len());
        for (i, c) in bits.chars().enumerate() {
            assert_eq!(c == '1', index.raw_set(value).unwrap().contains(&i));
        }
    }
}
