use exan_rs::encoding::{
    COLOR_FALLBACK, DEVIATION, EncodeError, MEDIAN_POINT_SIZE, category_ranks,
    encode_categorical, to_color, to_size,
};

fn sample_columns() -> Vec<Vec<f64>> {
    vec![
        vec![42.0],
        vec![0.0, 10.0],
        vec![-3.5, 7.25, 0.0, 1e6, -1e-3],
        (0..100).map(|i| (i as f64 * 0.37).sin() * 50.0).collect(),
        vec![1.0, 1.0, 2.0, 2.0, 3.0],
    ]
}

#[test]
fn color_keeps_length_and_range() {
    for col in sample_columns() {
        let c = to_color(&col).unwrap();
        assert_eq!(c.len(), col.len());
        // u8 is bounded by construction; the extremes must actually be reached
        if col.iter().any(|v| *v != col[0]) {
            assert_eq!(*c.iter().min().unwrap(), 0);
            assert_eq!(*c.iter().max().unwrap(), 255);
        }
    }
}

#[test]
fn size_keeps_length_and_bounds() {
    for col in sample_columns() {
        let s = to_size(&col).unwrap();
        assert_eq!(s.len(), col.len());
        for v in s {
            assert!(v >= MEDIAN_POINT_SIZE - DEVIATION - 1e-9);
            assert!(v <= MEDIAN_POINT_SIZE + DEVIATION + 1e-9);
        }
    }
}

#[test]
fn constant_columns_use_fallbacks() {
    assert_eq!(to_color(&[5.0, 5.0, 5.0]).unwrap(), vec![128, 128, 128]);
    assert_eq!(to_size(&[5.0, 5.0, 5.0]).unwrap(), vec![10.0, 10.0, 10.0]);
    assert_eq!(COLOR_FALLBACK, 128);
}

#[test]
fn two_point_color_spans_palette() {
    assert_eq!(to_color(&[0.0, 10.0]).unwrap(), vec![0, 255]);
}

#[test]
fn size_is_symmetric_about_the_median() {
    let s = to_size(&[0.0, 5.0, 10.0]).unwrap();
    assert!(s[0] < 10.0);
    assert_eq!(s[1], 10.0);
    assert!(s[2] > 10.0);
    assert!(((10.0 - s[0]) - (s[2] - 10.0)).abs() < 1e-12);
    assert_eq!(s, vec![5.0, 10.0, 15.0]);
}

#[test]
fn categorical_labels_rank_by_sorted_order() {
    let labels = ["b", "a", "c"];
    let ranks = category_ranks(&labels);
    assert_eq!(ranks["a"], 1);
    assert_eq!(ranks["b"], 2);
    assert_eq!(ranks["c"], 3);
    let encoded = encode_categorical(&labels);
    assert_eq!(encoded, vec![2.0, 1.0, 3.0]);
    assert_eq!(to_color(&encoded).unwrap(), vec![128, 0, 255]);
}

#[test]
fn encoding_is_not_the_identity() {
    let col = vec![2.0, 1.0, 3.0];
    let colors: Vec<f64> = to_color(&col).unwrap().into_iter().map(f64::from).collect();
    assert_ne!(colors, col);
    assert_ne!(to_size(&col).unwrap(), col);
}

#[test]
fn empty_columns_are_rejected() {
    assert_eq!(to_color(&[]), Err(EncodeError::EmptyInput));
    assert_eq!(to_size(&[]), Err(EncodeError::EmptyInput));
}
