use super::*;
use time::macros::datetime;

#[test]
fn text_and_type_values_are_case_folded() {
    assert_eq!(
        Value::from("Admin").to_comparable().unwrap(),
        Value::Text("admin".to_string())
    );
    assert_eq!(
        Value::type_name("User").to_comparable().unwrap(),
        Value::Text("user".to_string())
    );
}

#[test]
fn content_reference_prefers_id_over_path() {
    let reference = ContentRef {
        id: Some(ContentId(42)),
        path: Some("/Root/IMS".to_string()),
    };

    assert_eq!(
        Value::Content(reference).to_comparable().unwrap(),
        Value::Int(42)
    );
    assert_eq!(
        Value::Content(ContentRef::by_path("/Root/IMS"))
            .to_comparable()
            .unwrap(),
        Value::Text("/root/ims".to_string())
    );
}

#[test]
fn empty_content_reference_is_unresolvable() {
    let err = Value::Content(ContentRef::default())
        .to_comparable()
        .unwrap_err();

    assert!(matches!(err, QueryError::UnresolvableReference));
}

#[test]
fn list_values_fold_every_item() {
    let list = Value::from(vec!["A", "b"]);

    assert_eq!(
        list.to_comparable().unwrap(),
        Value::List(vec![
            Value::Text("a".to_string()),
            Value::Text("b".to_string())
        ])
    );
}

#[test]
fn numeric_ordering_widens_across_int_and_float() {
    assert_eq!(
        Value::Int(2).partial_cmp_value(&Value::Float(2.5)),
        Some(Ordering::Less)
    );
    assert_eq!(
        Value::Float(3.0).partial_cmp_value(&Value::Int(3)),
        Some(Ordering::Equal)
    );
    assert_eq!(Value::Int(1).partial_cmp_value(&Value::from("1")), None);
}

#[test]
fn date_values_order_chronologically() {
    let early = Value::from(datetime!(2020-01-01 0:00));
    let late = Value::from(datetime!(2021-06-30 12:30));

    assert_eq!(early.partial_cmp_value(&late), Some(Ordering::Less));
}
