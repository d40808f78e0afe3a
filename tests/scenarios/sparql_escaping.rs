//! Test: SPARQL Escaping - hostile values stay data

use crate::helpers::*;
use oxrdf::{Literal, NamedNode};
use rdf_etl::mapping::default_mappings;
use rdf_etl::sparql::{arg, vocab, GraphUpdate, TriplePattern, TripleStore};
use rdf_etl::steps::{adms_validation, convert_to_adms2, remove_unsupported_data};

const SUBJECT: &str = "http://example.com/solution";

const HOSTILE: &[&str] = &[
    "plain",
    "\"quoted\" and \\\"escaped\\\"",
    "line\nbreak\r\nand\ttab",
    "\" } ; DROP ALL ; INSERT DATA { <http://evil> <http://evil> \"",
    "'single' '''triple''' \"\"\"triple\"\"\"",
    "trailing backslash \\",
    "José ñ 🚀",
];

fn title_insert(value: &str) -> GraphUpdate {
    GraphUpdate::with_graph(sink()).insert(TriplePattern::new(
        NamedNode::new(SUBJECT).unwrap(),
        NamedNode::new(vocab::DCT_TITLE).unwrap(),
        Literal::new_simple_literal(value),
    ))
}

/// Every hostile literal parses as a single insert and reads back unchanged
#[tokio::test]
async fn test_literals_round_trip_through_store() {
    let triple_store = MemoryTripleStore::new();

    for value in HOSTILE {
        let text = title_insert(value).to_string();

        let parsed = spargebra::Update::parse(&text, None)
            .unwrap_or_else(|e| panic!("{:?} produced invalid SPARQL: {}\n{}", value, e, text));
        assert_eq!(parsed.operations.len(), 1, "{:?}", value);

        triple_store.update(&text).await.unwrap();
        let stored = triple_store.literal_values(&sink(), SUBJECT, vocab::DCT_TITLE);
        assert!(stored.contains(&value.to_string()), "{:?} not in {:?}", value, stored);
    }

    assert_eq!(
        triple_store.literal_values(&sink(), SUBJECT, vocab::DCT_TITLE).len(),
        HOSTILE.len()
    );
    assert_eq!(triple_store.triple_count(&sink()), HOSTILE.len());
}

#[test]
fn test_hostile_iris_are_rejected() {
    for value in [
        "http://adms-sink> } ; DROP ALL ; {",
        "http://example.com/a b",
        "http://example.com/\"quote\"",
        "http://example.com/{bad}",
        "relative/path",
        "",
    ] {
        assert!(arg::named_node(value).is_err(), "{:?} accepted", value);
    }
}

/// The text of every built-in update and query is valid SPARQL
#[test]
fn test_builtin_queries_parse() {
    let supported = default_mappings()
        .iter()
        .map(|mapping| NamedNode::new(mapping.rdf_type.as_str()).unwrap())
        .collect();
    let removal = remove_unsupported_data::removal_update(sink(), supported).to_string();
    spargebra::Update::parse(&removal, None).unwrap();
    let removal = remove_unsupported_data::removal_update(sink(), Vec::new()).to_string();
    spargebra::Update::parse(&removal, None).unwrap();

    for rule in convert_to_adms2::RULES {
        let text = rule.to_update(&sink()).to_string();
        spargebra::Update::parse(&text, None)
            .unwrap_or_else(|e| panic!("{:?}: {}\n{}", rule, e, text));
    }

    for rule in adms_validation::RULES {
        let text = rule.to_query(&sink()).to_string();
        spargebra::Query::parse(&text, None)
            .unwrap_or_else(|e| panic!("{:?}: {}\n{}", rule, e, text));
    }
}
