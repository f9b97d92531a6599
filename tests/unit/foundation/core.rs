use super::*;

#[test]
fn rect_edges_are_exclusive() {
    let r = Rect::new(-2, 3, 4, 5);
    assert_eq!(r.right(), 2);
    assert_eq!(r.bottom(), 8);
    assert!(!r.is_empty());
    assert!(Rect::new(0, 0, 0, 7).is_empty());
}

#[test]
fn point_offset_rounds_ties_to_even() {
    let origin = Rect::new(10, -5, 1, 1);
    assert_eq!(Point::new(12.5, -5.0).offset_from(origin), (2, 0));
    assert_eq!(Point::new(13.5, -3.5).offset_from(origin), (4, 2));
    assert_eq!(Point::new(9.5, -6.5).offset_from(origin), (0, -2));
    assert_eq!(Point::new(10.49, -4.51).offset_from(origin), (0, 0));
    assert_eq!(
        Point::new(2.5, 0.5).offset_from(Rect::new(0, 0, 1, 1)),
        (2, 0)
    );
}

#[test]
fn point_offset_saturates_huge_coordinates() {
    let origin = Rect::new(0, 0, 1, 1);
    assert_eq!(Point::new(1e19, -1e19).offset_from(origin), (i64::MAX, i64::MIN));
}

#[test]
fn trim_box_dimensions() {
    let b = TrimBox::new(1, 2, 5, 3);
    assert_eq!(b.width(), 4);
    assert_eq!(b.height(), 1);
    assert_eq!(TrimBox::full(6, 7), TrimBox::new(0, 0, 6, 7));
}
