use mdxtree::ident::{parse_identifier, KeySegment, NameSegment, Quoting, Segment};
use mdxtree::Identifier;

/// Rendered text re-parses to the same segment sequence.
fn assert_round_trip(ident: &Identifier) {
    let text = ident.to_string();
    let reparsed = parse_identifier(&text).unwrap();
    assert_eq!(&reparsed, ident, "round trip of '{}'", text);
    assert_eq!(reparsed.to_string(), text);
}

#[test]
fn test_round_trip_each_quoting_kind() {
    assert_round_trip(&Identifier::of_quoted(["Store", "USA"]));
    assert_round_trip(&Identifier::new(vec![
        NameSegment::quoted("Store").into(),
        NameSegment::unquoted("Children").into(),
    ]));
    assert_round_trip(&Identifier::new(vec![
        NameSegment::quoted("Store").into(),
        KeySegment::quoted("45").into(),
    ]));
}

#[test]
fn test_round_trip_compound_key() {
    assert_round_trip(&Identifier::new(vec![
        NameSegment::quoted("Store").into(),
        KeySegment::new(vec![NameSegment::quoted("WA"), NameSegment::quoted("USA")]).into(),
        NameSegment::quoted("City").into(),
    ]));
}

#[test]
fn test_round_trip_names_with_brackets() {
    // ']' inside a segment name escapes by doubling
    assert_round_trip(&Identifier::quoted("odd ] name"));
    assert_round_trip(&Identifier::quoted("]]"));
    assert_round_trip(&Identifier::new(vec![
        NameSegment::quoted("a]b").into(),
        KeySegment::new(vec![NameSegment::quoted("k]ey")]).into(),
    ]));
}

#[test]
fn test_round_trip_names_with_ampersand_and_dot() {
    // '&' and '.' inside a quoted name are plain characters
    assert_round_trip(&Identifier::quoted("AT&T"));
    assert_round_trip(&Identifier::quoted("v1.2"));
}

#[test]
fn test_text_level_round_trip() {
    for text in [
        "[Store].[USA].[WA]",
        "[Store].&[45]",
        "[Store].&[WA]&[USA]",
        "[Store].Children",
        "Measures.MEMBERS",
        "[Store].&foo&[1]&bar.[City]",
        "[a]]b].[c]",
    ] {
        let parsed = parse_identifier(text).unwrap();
        assert_eq!(parsed.to_string(), text, "text round trip of '{}'", text);
    }
}

#[test]
fn test_key_quoting_reported() {
    let parsed = parse_identifier("[Store].&[45]").unwrap();
    assert_eq!(parsed.segments()[0].quoting(), Quoting::Quoted);
    assert_eq!(parsed.segments()[1].quoting(), Quoting::Key);
    assert!(matches!(parsed.segments()[1], Segment::Key(_)));
}
