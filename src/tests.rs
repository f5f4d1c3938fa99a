#[cfg(test)]
use crate::*;

use crate::remap::window;

fn mention(tokens: &[(usize, &str)]) -> Mention {
    tokens
        .iter()
        .map(|(position, word)| Token::new(*word, *position))
        .collect()
}

fn example_comparison() -> ComparisonAnnotation {
    ComparisonAnnotation::new(PredicateType::Ranked)
        .with_direction(PredicateDirection::Superior)
        .with_predicate(mention(&[(4, "bigger")]))
        .with_argument(Role::Entity1, mention(&[(2, "X")]))
        .with_argument(Role::Entity2, mention(&[(7, "Y")]))
}

fn example_annotation() -> SentenceAnnotation {
    let mut annotation = SentenceAnnotation::new("id")
        .with_comparative(true)
        .with_sentence("The X is bigger than Y")
        .with_source("src");
    annotation.add_comparison(example_comparison());
    annotation
}

const EXAMPLE_LINE: &str =
    "id\t1\t[ranked_--_SUPERIOR; [2_X]; [7_Y]; []; []; 4_bigger]\tThe X is bigger than Y\tsrc\t ";

/// Yields its data, then fails every read like a vanished device would
struct FailingReader {
    data: std::io::Cursor<Vec<u8>>,
}

impl FailingReader {
    fn new(data: &[u8]) -> std::io::BufReader<Self> {
        std::io::BufReader::new(Self {
            data: std::io::Cursor::new(data.to_vec()),
        })
    }
}

impl std::io::Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = std::io::Read::read(&mut self.data, buf)?;
        if n == 0 && !buf.is_empty() {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone"))
        } else {
            Ok(n)
        }
    }
}

// ---------------------------------- canonical schema --------------------------------------

#[test]
fn serialize_example_line() {
    assert_eq!(format!("{}\n", example_annotation()), format!("{}\n", EXAMPLE_LINE));
}

#[test]
fn parse_example_line() -> Result<(), CorpusError> {
    let annotation: SentenceAnnotation = EXAMPLE_LINE.parse()?;
    assert_eq!(annotation.id(), "id");
    assert!(annotation.is_comparative());
    assert_eq!(annotation.sentence(), "The X is bigger than Y");
    assert_eq!(annotation.source(), "src");
    assert_eq!(annotation.errors(), "");
    assert_eq!(annotation.len(), 1);
    let comparison = &annotation.comparisons()[0];
    assert_eq!(comparison.comparison_type(), PredicateType::Ranked);
    assert_eq!(comparison.direction(), PredicateDirection::Superior);
    assert_eq!(comparison.entity_types(), ('-', '-'));
    assert_eq!(comparison.predicate_text(), "bigger");
    assert_eq!(comparison.entity1(), &[mention(&[(2, "X")])]);
    assert_eq!(comparison.entity2(), &[mention(&[(7, "Y")])]);
    assert!(comparison.aspect().is_empty());
    assert!(comparison.sentiment().is_empty());
    Ok(())
}

#[test]
fn roundtrip_line() -> Result<(), CorpusError> {
    let mut annotation = example_annotation();
    let mut second = ComparisonAnnotation::new(PredicateType::Equative)
        .with_predicate(mention(&[(5, "than")]))
        .with_argument(Role::Aspect, mention(&[(1, "The"), (2, "X")]))
        .with_argument(Role::Aspect, mention(&[(7, "Y")]))
        .with_argument(Role::Sentiment, mention(&[(3, "is")]));
    second.set_entity_types('P', '-');
    second.set_direction(PredicateDirection::Inferior);
    annotation.add_comparison(second);
    annotation.add_error("something went wrong");

    let parsed: SentenceAnnotation = annotation.to_string().parse()?;
    assert_eq!(parsed, annotation);
    assert_eq!(parsed.to_string(), annotation.to_string());
    Ok(())
}

#[test]
fn roundtrip_bracket_tokens() -> Result<(), CorpusError> {
    let comparison = ComparisonAnnotation::new(PredicateType::Ranked)
        .with_predicate(mention(&[(3, "]")]))
        .with_argument(Role::Entity1, mention(&[(5, "]")]))
        .with_argument(Role::Entity2, mention(&[(1, "[")]));
    let line = comparison.to_string();
    let parsed: ComparisonAnnotation = line.parse()?;
    assert_eq!(parsed.predicate(), &mention(&[(3, "]")]));
    assert_eq!(parsed.entity1(), &[mention(&[(5, "]")])]);
    assert_eq!(parsed.entity2(), &[mention(&[(1, "[")])]);
    assert_eq!(parsed, comparison);
    Ok(())
}

#[test]
fn entity_type_count_mismatch() -> Result<(), CorpusError> {
    let comparison: ComparisonAnnotation = "[ranked_P_>; [2_X]; [6_Y]; []; []; 4_bigger]".parse()?;
    assert!(comparison.check_entity_types("P").is_some());
    let comparison: ComparisonAnnotation = "[ranked_PO_>; [2_X]; []; []; []; 4_bigger]".parse()?;
    assert!(comparison.check_entity_types("PO").is_some());
    let comparison: ComparisonAnnotation = "[ranked_--_>; [2_X]; [6_Y]; []; []; 4_bigger]".parse()?;
    assert_eq!(comparison.check_entity_types("--"), None);
    assert_eq!(comparison.check_entity_types("PO"), None);
    let comparison: ComparisonAnnotation = "[superlative_P_+; [2_X]; []; []; []; 4_best]".parse()?;
    assert_eq!(comparison.check_entity_types("P"), None);
    assert_eq!(comparison.check_entity_types("P-"), None);
    Ok(())
}

#[test]
fn parse_legacy_layout_without_sentiment() -> Result<(), CorpusError> {
    let comparison: ComparisonAnnotation = "[ranked_--_>; [2_X]; [7_Y]; [3_is]; 4_bigger]".parse()?;
    assert_eq!(comparison.direction(), PredicateDirection::Superior);
    assert_eq!(comparison.aspect(), &[mention(&[(3, "is")])]);
    assert!(comparison.sentiment().is_empty());
    assert_eq!(comparison.predicate(), &mention(&[(4, "bigger")]));
    Ok(())
}

#[test]
fn parse_single_entity_type_code() -> Result<(), CorpusError> {
    let comparison: ComparisonAnnotation = "[superlative_P_+; [2_X]; []; []; []; 4_best]".parse()?;
    assert_eq!(comparison.comparison_type(), PredicateType::Superlative);
    assert_eq!(comparison.entity_types(), ('P', '-'));
    Ok(())
}

#[test]
fn parse_type_case_insensitive() -> Result<(), CorpusError> {
    let comparison: ComparisonAnnotation = "[Ranked_--_<; []; []; []; []; 1_worse]".parse()?;
    assert_eq!(comparison.comparison_type(), PredicateType::Ranked);
    assert_eq!(comparison.direction(), PredicateDirection::Inferior);
    Ok(())
}

#[test]
fn parse_comparison_errors() {
    assert!("[ranked_--_>; [2_X]; 4_bigger]".parse::<ComparisonAnnotation>().is_err());
    assert!("[unknown_--_>; []; []; []; []; 4_bigger]".parse::<ComparisonAnnotation>().is_err());
    assert!("[ranked_--_>; [X]; []; []; []; 4_bigger]".parse::<ComparisonAnnotation>().is_err());
}

#[test]
fn parse_line_skips_malformed_fields() -> Result<(), CorpusError> {
    let line = "id\t1\t[ranked; [2_X]]\t\t[ranked_--_>; [2_X]; []; []; []; 4_bigger]\tThe X is bigger\tsrc\t ";
    let mut stats = Statistics::new();
    let annotation = SentenceAnnotation::parse(line, DuplicatePolicy::Collapse, &mut stats)?;
    assert_eq!(annotation.len(), 1);
    assert_eq!(stats.malformed, 1);
    Ok(())
}

#[test]
fn parse_line_too_short() {
    let mut stats = Statistics::new();
    let result = SentenceAnnotation::parse("id\t1\tsentence\tsrc", DuplicatePolicy::Collapse, &mut stats);
    assert!(matches!(result, Err(CorpusError::MalformedLine(..))));
}

#[test]
fn parse_line_comments_go_to_error_log() -> Result<(), CorpusError> {
    let annotation: SentenceAnnotation = "id\t0\tNo comparison here\tsrc\tchecked by hand".parse()?;
    assert!(!annotation.is_comparative());
    assert!(annotation.is_empty());
    assert_eq!(annotation.errors(), "checked by hand");
    Ok(())
}

#[test]
fn error_log_appends() {
    let mut annotation = SentenceAnnotation::new("x");
    annotation.add_error("first");
    annotation.add_error("  ");
    annotation.add_error("second");
    assert_eq!(annotation.errors(), "first ; second");
}

#[test]
fn token_parse() -> Result<(), CorpusError> {
    let token: Token = "3_foo_bar".parse()?;
    assert_eq!(token.position(), 3);
    assert_eq!(token.word(), "foo_bar");
    assert_eq!(token.to_string(), "3_foo_bar");
    assert!("x_foo".parse::<Token>().is_err());
    assert!("foo".parse::<Token>().is_err());
    assert!("0_foo".parse::<Token>().is_err());
    Ok(())
}

#[test]
fn direction_decode() {
    assert_eq!(PredicateDirection::decode(">"), PredicateDirection::Superior);
    assert_eq!(PredicateDirection::decode("+"), PredicateDirection::Superior);
    assert_eq!(PredicateDirection::decode("<"), PredicateDirection::Inferior);
    assert_eq!(PredicateDirection::decode("-"), PredicateDirection::Inferior);
    assert_eq!(PredicateDirection::decode("inferior"), PredicateDirection::Inferior);
    assert_eq!(PredicateDirection::decode("SUPERIOR"), PredicateDirection::Superior);
    assert_eq!(PredicateDirection::decode("UNDEFINED"), PredicateDirection::Undefined);
    assert_eq!(PredicateDirection::decode(""), PredicateDirection::Undefined);
}

#[test]
fn comparisons_ordered_and_collapsed() {
    let mut annotation = SentenceAnnotation::new("x");
    assert!(annotation.add_comparison(example_comparison()));
    assert!(annotation.add_comparison(
        ComparisonAnnotation::new(PredicateType::Difference).with_predicate(mention(&[(2, "X")]))
    ));
    let duplicate = ComparisonAnnotation::new(PredicateType::Equative).with_predicate(mention(&[(4, "bigger")]));
    assert!(!annotation.add_comparison(duplicate));
    assert_eq!(annotation.len(), 2);
    assert_eq!(annotation.comparisons()[0].first_predicate_position(), Some(2));
    assert_eq!(annotation.comparisons()[1].comparison_type(), PredicateType::Ranked);
}

#[test]
fn comparisons_kept_with_keep_policy() {
    let mut annotation = SentenceAnnotation::new("x").with_policy(DuplicatePolicy::Keep);
    annotation.add_comparison(example_comparison());
    let duplicate = ComparisonAnnotation::new(PredicateType::Equative).with_predicate(mention(&[(4, "bigger")]));
    assert!(annotation.add_comparison(duplicate));
    assert_eq!(annotation.len(), 2);
    assert_eq!(annotation.comparisons()[0].comparison_type(), PredicateType::Ranked);
    assert_eq!(annotation.comparisons()[1].comparison_type(), PredicateType::Equative);
    assert_eq!(annotation.dedup_by_predicate_position(), 1);
    assert_eq!(annotation.comparisons()[0].comparison_type(), PredicateType::Ranked);
}

#[test]
fn arguments_in_role_order() {
    let comparison = example_comparison()
        .with_argument(Role::Sentiment, mention(&[(1, "The")]))
        .with_argument(Role::Aspect, mention(&[(3, "is")]));
    let words: Vec<String> = comparison.arguments().iter().map(|m| m.text()).collect();
    assert_eq!(words, vec!["X", "Y", "is", "The"]);
}

#[test]
fn role_accessors_only_touch_one_role() {
    let mut comparison = example_comparison();
    let removed = comparison.remove_role(Role::Entity1);
    assert_eq!(removed, vec![mention(&[(2, "X")])]);
    assert!(comparison.entity1().is_empty());
    assert_eq!(comparison.entity2().len(), 1);
    comparison.set_role(Role::Aspect, vec![mention(&[(5, "than")])]);
    assert_eq!(comparison.aspect().len(), 1);
    assert_eq!(comparison.entity2().len(), 1);
}

#[test]
fn reorder_entities() {
    let mut comparison = ComparisonAnnotation::new(PredicateType::Ranked)
        .with_direction(PredicateDirection::Inferior)
        .with_predicate(mention(&[(4, "worse")]))
        .with_argument(Role::Entity1, mention(&[(6, "Y")]))
        .with_argument(Role::Entity2, mention(&[(2, "X")]));
    assert!(comparison.reorder_by_surface());
    assert_eq!(comparison.entity1(), &[mention(&[(2, "X")])]);
    assert!(!comparison.reorder_by_surface());
    assert!(comparison.reorder_by_preference());
    assert_eq!(comparison.entity1(), &[mention(&[(6, "Y")])]);

    let mut equative = ComparisonAnnotation::new(PredicateType::Equative)
        .with_direction(PredicateDirection::Inferior)
        .with_argument(Role::Entity1, mention(&[(6, "Y")]))
        .with_argument(Role::Entity2, mention(&[(2, "X")]));
    assert!(!equative.reorder_by_preference());
}

#[test]
fn annotation_to_json() -> Result<(), CorpusError> {
    let json = example_annotation().to_json_string(true)?;
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["id"], "id");
    assert_eq!(value["comparisons"][0]["type"], "ranked");
    assert_eq!(value["comparisons"][0]["direction"], "SUPERIOR");
    assert_eq!(value["comparisons"][0]["predicate"][0]["position"], 4);
    Ok(())
}

// ---------------------------------- alignment --------------------------------------

fn example_tokens() -> Vec<TokenSpan> {
    RegexTokenizer::default().tokenize("The X is bigger than Y.")
}

#[test]
fn regex_tokenizer() {
    let tokens = example_tokens();
    let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(words, vec!["The", "X", "is", "bigger", "than", "Y", "."]);
    assert_eq!(tokens[3], TokenSpan::new(9, 15, "bigger"));
}

#[test]
fn regex_tokenizer_char_offsets() {
    let tokens = RegexTokenizer::default().tokenize("Ähm, größer");
    assert_eq!(tokens[0], TokenSpan::new(0, 3, "Ähm"));
    assert_eq!(tokens[1], TokenSpan::new(3, 4, ","));
    assert_eq!(tokens[2], TokenSpan::new(5, 11, "größer"));
}

#[test]
fn whitespace_tokenizer() {
    let tokens = WhitespaceTokenizer.tokenize("a  bc");
    assert_eq!(tokens, vec![TokenSpan::new(0, 1, "a"), TokenSpan::new(3, 5, "bc")]);
}

#[test]
fn align_exact() {
    let tokens = example_tokens();
    assert_eq!(align(9, 15, 0, &tokens), Some(mention(&[(4, "bigger")])));
    assert_eq!(align(19, 25, 10, &tokens), Some(mention(&[(4, "bigger")])));
    assert_eq!(
        align(4, 15, 0, &tokens),
        Some(mention(&[(2, "X"), (3, "is"), (4, "bigger")]))
    );
}

#[test]
fn align_partial_tokens_fail() {
    let tokens = example_tokens();
    assert_eq!(align(9, 14, 0, &tokens), None);
    assert_eq!(align(10, 15, 0, &tokens), None);
    assert_eq!(align(9, 15, 1, &tokens), None);
    assert_eq!(align(9, 5, 0, &tokens), None);
}

#[test]
fn align_word_sequences() {
    let tokens = ["The", "X", "is", "better", "than", "x", "is"];
    assert_eq!(
        align_words(&tokens, &["x", "is"], false),
        Some(mention(&[(2, "X"), (3, "is")]))
    );
    assert_eq!(
        align_words(&tokens, &["x", "is"], true),
        Some(mention(&[(6, "x"), (7, "is")]))
    );
    assert_eq!(align_words(&tokens, &["worse"], false), None);
    let empty: [&str; 0] = [];
    assert_eq!(align_words(&tokens, &empty, false), None);
}

#[test]
fn sentence_resolution() {
    let sentences = [TextSpan::new(0, 10), TextSpan::new(11, 20)];
    assert_eq!(find_sentence(&sentences, 12, 15, SentenceResolution::Enclosing), Some(1));
    assert_eq!(find_sentence(&sentences, 0, 10, SentenceResolution::Enclosing), Some(0));
    assert_eq!(find_sentence(&sentences, 8, 12, SentenceResolution::Enclosing), None);
    assert_eq!(find_sentence(&sentences, 9, 10, SentenceResolution::FirstAndLast), Some(0));
    assert_eq!(find_sentence(&sentences, 10, 11, SentenceResolution::FirstAndLast), None);
    assert_eq!(find_sentence(&sentences, 30, 32, SentenceResolution::FirstAndLast), None);
}

#[test]
fn punctuation_splitter() {
    let spans = PunctuationSplitter.split("One. Two!  Three");
    assert_eq!(spans, vec![TextSpan::new(0, 4), TextSpan::new(5, 9), TextSpan::new(11, 16)]);
    assert!(PunctuationSplitter.split("   ").is_empty());
}

#[test]
fn char_slices() {
    assert_eq!(char_slice("größer", 2, 4), Some("öß"));
    assert_eq!(char_slice("abc", 1, 3), Some("bc"));
    assert_eq!(char_slice("abc", 2, 4), None);
}

// ---------------------------------- coreference --------------------------------------

#[test]
fn coreference_both_directions() -> Result<(), CorpusError> {
    let graph = MentionGraph::from_nodes([
        MentionNode::new("a", "Mention", TextSpan::new(0, 4)).with_text("Sony"),
        MentionNode::new("b", "Mention", TextSpan::new(16, 18))
            .with_text("It")
            .with_slot(REFERS_TO, "a"),
        MentionNode::new("c", "Mention", TextSpan::new(30, 32))
            .with_text("it")
            .with_slot(REFERS_TO, "b"),
    ])?;
    let a = graph.resolve_id("a").unwrap();
    let b = graph.resolve_id("b").unwrap();
    let c = graph.resolve_id("c").unwrap();
    assert_eq!(graph.coreferent(a), vec![b, c]);
    assert_eq!(graph.coreferent(c), vec![b, a]);
    assert_eq!(graph.resolve_in_sentence(a, &TextSpan::new(25, 40), true)?, c);
    assert!(graph.resolve_in_sentence(a, &TextSpan::new(25, 40), false).is_err());
    assert_eq!(graph.resolve_in_sentence(a, &TextSpan::new(0, 10), false)?, a);
    Ok(())
}

#[test]
fn coreference_cycles_and_forward_references() -> Result<(), CorpusError> {
    let graph = MentionGraph::from_nodes([
        MentionNode::new("a", "Mention", TextSpan::new(0, 1)).with_slot(REFERS_TO, "b"),
        MentionNode::new("b", "Mention", TextSpan::new(2, 3)).with_slot(REFERS_TO, "a"),
    ])?;
    let a = graph.resolve_id("a").unwrap();
    let b = graph.resolve_id("b").unwrap();
    assert_eq!(graph.coreferent(a), vec![b]);
    assert_eq!(graph.coreferent(b), vec![a]);
    Ok(())
}

#[test]
fn mention_graph_duplicate_id() {
    let result = MentionGraph::from_nodes([
        MentionNode::new("a", "Mention", TextSpan::new(0, 1)),
        MentionNode::new("a", "Mention", TextSpan::new(2, 3)),
    ]);
    assert!(result.is_err());
}

#[test]
fn mention_graph_from_json() -> Result<(), CorpusError> {
    let json = r#"{
        "mentions": [
            { "id": "m1", "type": "Mention", "spans": [ { "begin": 4, "end": 5 } ], "text": "X" },
            { "id": "c1", "type": "Comparison", "spans": [ { "begin": 9, "end": 15 } ], "text": "bigger",
              "string_slots": { "Same": "false" }, "slots": { "More": "m1" } }
        ]
    }"#;
    let graph = MentionGraph::from_json_str(json)?;
    assert_eq!(graph.len(), 2);
    let c1 = graph.resolve_id("c1").unwrap();
    assert_eq!(graph.slot(c1, "More"), graph.resolve_id("m1"));
    assert_eq!(graph.slot(c1, "Less"), None);
    assert_eq!(graph.node("c1")?.covering_span(), Some(TextSpan::new(9, 15)));
    assert!(graph.node("nope").is_err());
    Ok(())
}

// ---------------------------------- remapping --------------------------------------

fn split_words(sentence: &str) -> Vec<&str> {
    sentence.split(' ').collect()
}

#[test]
fn literal_substitution() {
    let mut stats = Statistics::new();
    let plan = RemapPlan::identity(&split_words("a = b"), &mut stats);
    assert_eq!(plan.sentence_text(), "a eq b");
    assert_eq!(plan.position(2), Some(2));
    assert_eq!(plan.replacement(2), Some("eq"));
    assert_eq!(
        plan.remap_mention(&mention(&[(2, "=")]), &mut stats),
        mention(&[(2, "eq")])
    );
}

#[test]
fn merge_repairs_deleted_mention() {
    let mut stats = Statistics::new();
    let labels = [None, Some("product"), Some("product"), None, None];
    let plan = RemapBuilder::new(&split_words("A Sony X is great"))
        .merge_entities(&labels)
        .build(&mut stats);
    assert_eq!(plan.sentence_text(), "A PRODUCT is great");
    assert_eq!(plan.position(2), Some(2));
    assert_eq!(plan.position(3), None);
    assert_eq!(plan.position(4), Some(3));
    assert_eq!(stats.merged_tokens, 1);
    assert_eq!(stats.entities, 1);

    let repaired = plan.remap_mention(&mention(&[(3, "X")]), &mut stats);
    assert_eq!(repaired, mention(&[(2, "PRODUCT")]));
    assert_eq!(stats.repaired, 1);

    let shortened = plan.remap_mention(&mention(&[(2, "Sony"), (3, "X"), (4, "is")]), &mut stats);
    assert_eq!(shortened, mention(&[(2, "PRODUCT"), (3, "is")]));
}

#[test]
fn merge_keeps_outside_and_distinct_labels() {
    let mut stats = Statistics::new();
    let labels = [Some("O"), Some("ORG"), Some("PER"), Some("PER"), Some("O")];
    let plan = RemapBuilder::new(&split_words("a b c d e"))
        .merge_entities(&labels)
        .build(&mut stats);
    assert_eq!(plan.sentence_text(), "a ORG PER e");
    assert_eq!(stats.entities, 2);
    assert_eq!(stats.merged_tokens, 1);
}

#[test]
fn apply_plan_to_annotation() {
    let mut stats = Statistics::new();
    let mut annotation = SentenceAnnotation::new("s1")
        .with_comparative(true)
        .with_sentence("A Sony X is great")
        .with_source("src");
    annotation.add_comparison(
        ComparisonAnnotation::new(PredicateType::Superlative)
            .with_predicate(mention(&[(5, "great")]))
            .with_argument(Role::Entity1, mention(&[(3, "X")])),
    );
    let labels = [None, Some("product"), Some("product"), None, None];
    let plan = RemapBuilder::new(&split_words(annotation.sentence()))
        .merge_entities(&labels)
        .build(&mut stats);
    let result = plan.apply(&annotation, &mut stats);
    assert_eq!(result.id(), "s1");
    assert_eq!(result.source(), "src");
    assert!(result.is_comparative());
    assert_eq!(result.sentence(), "A PRODUCT is great");
    let comparison = &result.comparisons()[0];
    assert_eq!(comparison.predicate(), &mention(&[(4, "great")]));
    assert_eq!(comparison.entity1(), &[mention(&[(2, "PRODUCT")])]);
}

#[test]
fn truncation_window_budget() {
    assert_eq!(window(10, 10, 5, 20), (8, 12));
    assert_eq!(window(1, 1, 5, 20), (1, 5));
    assert_eq!(window(20, 20, 5, 20), (16, 20));
    assert_eq!(window(2, 15, 5, 20), (2, 6));
    assert_eq!(window(18, 19, 6, 20), (15, 20));
    for (lo, hi) in [(1, 3), (5, 9), (17, 20), (10, 11)] {
        let (start, end) = window(lo, hi, 8, 20);
        assert_eq!(end - start + 1, 8);
        assert!(start <= lo && hi <= end);
        assert!(start >= 1 && end <= 20);
    }
}

fn long_sentence(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("w{}", i)).collect()
}

#[test]
fn truncate_long_sentence() {
    let mut stats = Statistics::new();
    let words = long_sentence(20);
    let mut annotation = SentenceAnnotation::new("long");
    annotation.add_comparison(
        ComparisonAnnotation::new(PredicateType::Ranked).with_predicate(mention(&[(10, "w10")])),
    );
    let plan = RemapBuilder::new(&words).truncate(5, &annotation).build(&mut stats);
    assert_eq!(plan.live_count(), 5);
    assert_eq!(plan.sentence_text(), "w8 w9 w10 w11 w12");
    assert_eq!(plan.position(7), None);
    assert_eq!(plan.position(8), Some(1));
    assert_eq!(plan.position(10), Some(3));
    assert_eq!(plan.position(99), None);
    assert_eq!(stats.long_sentences, 1);

    let result = plan.apply(&annotation, &mut stats);
    assert_eq!(result.comparisons()[0].predicate(), &mention(&[(3, "w10")]));
}

#[test]
fn truncate_without_references() {
    let mut stats = Statistics::new();
    let plan = RemapBuilder::new(&long_sentence(10))
        .truncate(4, &SentenceAnnotation::default())
        .build(&mut stats);
    assert_eq!(plan.sentence_text(), "w1 w2 w3 w4");
}

#[test]
fn truncate_short_sentence_untouched() {
    let mut stats = Statistics::new();
    let plan = RemapBuilder::new(&long_sentence(10))
        .truncate(10, &SentenceAnnotation::default())
        .build(&mut stats);
    assert_eq!(plan.live_count(), 10);
    assert_eq!(stats.long_sentences, 0);
}

#[test]
fn truncate_counts_live_tokens_after_merge() {
    let mut stats = Statistics::new();
    let words = long_sentence(8);
    let labels = [None, Some("P"), Some("P"), Some("P"), None, None, None, None];
    let plan = RemapBuilder::new(&words)
        .merge_entities(&labels)
        .truncate(6, &SentenceAnnotation::default())
        .build(&mut stats);
    assert_eq!(plan.live_count(), 6);
    assert_eq!(stats.long_sentences, 0);
}

#[test]
fn remap_is_monotone() {
    let mut stats = Statistics::new();
    let words = long_sentence(30);
    let labels: Vec<Option<&str>> = (1..=30)
        .map(|i| if i % 7 == 0 || i % 7 == 1 { Some("E") } else { None })
        .collect();
    let mut annotation = SentenceAnnotation::new("m");
    annotation.add_comparison(
        ComparisonAnnotation::new(PredicateType::Ranked).with_predicate(mention(&[(15, "w15")])),
    );
    let plan = RemapBuilder::new(&words)
        .merge_entities(&labels)
        .truncate(12, &annotation)
        .build(&mut stats);
    let live: Vec<usize> = (1..=30).filter_map(|p| plan.position(p)).collect();
    assert_eq!(live, (1..=12).collect::<Vec<_>>());
}

#[test]
fn remap_repairs_positions_beyond_sentence() {
    let mut stats = Statistics::new();
    let labels = [Some("P"), Some("P"), None];
    let plan = RemapBuilder::new(&split_words("a b c")).merge_entities(&labels).build(&mut stats);
    let mut annotation = SentenceAnnotation::new("x");
    annotation.add_comparison(
        ComparisonAnnotation::new(PredicateType::Ranked)
            .with_predicate(mention(&[(3, "c")]))
            .with_argument(Role::Aspect, mention(&[(9, "z")])),
    );
    let result = plan.apply(&annotation, &mut stats);
    assert_eq!(result.len(), 1);
    assert_eq!(result.comparisons()[0].predicate(), &mention(&[(2, "c")]));
    assert_eq!(result.comparisons()[0].aspect(), &[mention(&[(2, "c")])]);
}

#[test]
fn remap_drops_lost_predicate() {
    let mut stats = Statistics::new();
    let empty: [&str; 0] = [];
    let plan = RemapPlan::identity(&empty, &mut stats);
    let mut annotation = SentenceAnnotation::new("x");
    annotation.add_comparison(
        ComparisonAnnotation::new(PredicateType::Ranked).with_predicate(mention(&[(1, "gone")])),
    );
    let result = plan.apply(&annotation, &mut stats);
    assert!(result.is_empty());
    assert_eq!(stats.predicates_not_found, 1);
    assert!(result.errors().contains("predicate 'gone' lost by remapping"));
}

// ---------------------------------- collaborators --------------------------------------

#[test]
fn heuristic_labeler() {
    let labels = HeuristicLabeler.labels(&["I", "like", "the", "Sony", "Bravia", "a", "lot"]);
    let expected: Vec<Option<String>> = vec![
        None,
        None,
        None,
        Some(PRODUCT_LABEL.to_string()),
        Some(PRODUCT_LABEL.to_string()),
        None,
        None,
    ];
    assert_eq!(labels, expected);
    let labels = HeuristicLabeler.labels(&["buy", "philips", "or", "KDL40"]);
    assert_eq!(labels[1].as_deref(), Some(PRODUCT_LABEL));
    assert_eq!(labels[2], None);
    assert_eq!(labels[3].as_deref(), Some(PRODUCT_LABEL));
}

// ---------------------------------- adapters --------------------------------------

#[test]
fn format_names() -> Result<(), CorpusError> {
    assert_eq!(Format::try_from("Knowtator")?, Format::Jdpa);
    assert_eq!(Format::try_from("liu")?, Format::Liu);
    assert_eq!(Format::Usage.to_string(), "usage");
    assert!(Format::try_from("conll").is_err());
    Ok(())
}

#[test]
fn document_names() {
    assert_eq!(document_name("data/cam/doc12.txt.knowtator.xml"), "doc12");
    assert_eq!(document_name("doc"), "doc");
}

#[test]
fn jdpa_convert_document() -> Result<(), CorpusError> {
    let text = "The X is bigger than Y.";
    let graph = MentionGraph::from_nodes([
        MentionNode::new("m1", "Mention", TextSpan::new(4, 5)).with_text("X"),
        MentionNode::new("m2", "Mention", TextSpan::new(21, 22)).with_text("Y"),
        MentionNode::new("c1", "Comparison", TextSpan::new(9, 15))
            .with_text("bigger")
            .with_slot("More", "m1")
            .with_slot("Less", "m2"),
    ])?;
    let document = JdpaDocument::new("doc", text, graph);
    let mut stats = Statistics::new();
    let result = JdpaAdapter::new(Config::default()).convert_document(&document, &mut stats);
    assert_eq!(result.len(), 1);
    assert_eq!(
        result[0].to_string(),
        "doc-0\t1\t[ranked_--_UNDEFINED; [2_X]; [6_Y]; []; []; 4_bigger]\tThe X is bigger than Y .\tdoc\t "
    );
    assert_eq!(stats.sentences, 1);
    assert_eq!(stats.types.get("ranked"), Some(&1));
    Ok(())
}

fn coref_document() -> Result<JdpaDocument, CorpusError> {
    let text = "Sony makes TVs. It is better than Samsung.";
    let graph = MentionGraph::from_nodes([
        MentionNode::new("s", "Mention", TextSpan::new(0, 4)).with_text("Sony"),
        MentionNode::new("it", "Mention", TextSpan::new(16, 18))
            .with_text("It")
            .with_slot(REFERS_TO, "s"),
        MentionNode::new("sam", "Mention", TextSpan::new(34, 41)).with_text("Samsung"),
        MentionNode::new("c", "Comparison", TextSpan::new(22, 28))
            .with_text("better")
            .with_slot("More", "s")
            .with_slot("Less", "sam"),
    ])?;
    Ok(JdpaDocument::new("doc", text, graph))
}

#[test]
fn jdpa_coreference_fallback() -> Result<(), CorpusError> {
    let document = coref_document()?;
    let mut stats = Statistics::new();
    let result = JdpaAdapter::new(Config::default()).convert_document(&document, &mut stats);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id(), "doc-1");
    assert_eq!(result[0].sentence(), "It is better than Samsung .");
    let comparison = &result[0].comparisons()[0];
    assert_eq!(comparison.predicate(), &mention(&[(3, "better")]));
    assert_eq!(comparison.entity1(), &[mention(&[(1, "It")])]);
    assert_eq!(comparison.entity2(), &[mention(&[(5, "Samsung")])]);
    assert_eq!(stats.arguments_not_found, 0);
    Ok(())
}

#[test]
fn jdpa_without_coreference() -> Result<(), CorpusError> {
    let document = coref_document()?;
    let mut stats = Statistics::new();
    let adapter = JdpaAdapter::new(Config::default().with_use_coref(false));
    let result = adapter.convert_document(&document, &mut stats);
    assert_eq!(result.len(), 1);
    let comparison = &result[0].comparisons()[0];
    assert!(comparison.entity1().is_empty());
    assert_eq!(comparison.entity2().len(), 1);
    assert_eq!(stats.arguments_not_found, 1);
    assert!(result[0].errors().contains("not in same sentence"));
    Ok(())
}

#[test]
fn jdpa_equative_reordering() -> Result<(), CorpusError> {
    let text = "X is as good as Y.";
    let graph = MentionGraph::from_nodes([
        MentionNode::new("x", "Mention", TextSpan::new(0, 1)).with_text("X"),
        MentionNode::new("y", "Mention", TextSpan::new(16, 17)).with_text("Y"),
        MentionNode::new("c", "Comparison", TextSpan::new(5, 15))
            .with_text("as good as")
            .with_string_slot("Same", "true")
            .with_slot("More", "y")
            .with_slot("Less", "x"),
    ])?;
    let document = JdpaDocument::new("eq", text, graph);
    let mut stats = Statistics::new();
    let result = JdpaAdapter::new(Config::default()).convert_document(&document, &mut stats);
    let comparison = &result[0].comparisons()[0];
    assert_eq!(comparison.comparison_type(), PredicateType::Equative);
    assert_eq!(comparison.predicate(), &mention(&[(3, "as"), (4, "good"), (5, "as")]));
    assert_eq!(comparison.entity1(), &[mention(&[(1, "X")])]);
    assert_eq!(comparison.entity2(), &[mention(&[(6, "Y")])]);

    let result = JdpaAdapter::new(Config::default().with_reorder_equatives(false))
        .convert_document(&document, &mut stats);
    assert_eq!(result[0].comparisons()[0].entity1(), &[mention(&[(6, "Y")])]);
    Ok(())
}

#[test]
fn jdpa_predicate_outside_sentences() -> Result<(), CorpusError> {
    let text = "Sony makes TVs. It is better than Samsung.";
    let graph = MentionGraph::from_nodes([
        MentionNode::new("c", "Comparison", TextSpan::new(13, 18)).with_text("s. It")
    ])?;
    let document = JdpaDocument::new("doc", text, graph);
    let mut stats = Statistics::new();
    let result = JdpaAdapter::new(Config::default()).convert_document(&document, &mut stats);
    assert!(result.is_empty());
    assert_eq!(stats.predicates_not_found, 1);
    Ok(())
}

#[test]
fn jdpa_unaligned_predicate_keeps_sentence() -> Result<(), CorpusError> {
    let text = "The X is bigger than Y.";
    let graph = MentionGraph::from_nodes([
        MentionNode::new("c1", "Comparison", TextSpan::new(10, 14)).with_text("igge")
    ])?;
    let document = JdpaDocument::new("doc", text, graph);
    let mut stats = Statistics::new();
    let result = JdpaAdapter::new(Config::default()).convert_document(&document, &mut stats);
    assert_eq!(result.len(), 1);
    assert!(result[0].is_comparative());
    assert!(result[0].is_empty());
    assert!(result[0].errors().contains("could not be mapped to tokens"));
    assert_eq!(stats.predicates_not_found, 1);
    Ok(())
}

const LIU_TEXT: &str = "*****
Header of the file
*****
This is a plain sentence.
<cs-1>
The Canon camera is better than the Nikon.
</cs-1>
1_Canon camera 2_Nikon (better)
Another plain one.
";

#[test]
fn liu_convert() {
    let mut stats = Statistics::new();
    let result = LiuAdapter::new(Config::default()).convert_str(LIU_TEXT, "test", &mut stats);
    assert_eq!(result.len(), 1);
    assert_eq!(
        result[0].to_string(),
        "1\t1\t[ranked_--_UNDEFINED; [2_Canon 3_camera]; [8_Nikon]; []; []; 5_better]\tThe Canon camera is better than the Nikon .\ttest\t "
    );
    assert_eq!(stats.sentences, 3);
    assert_eq!(stats.types.get("cs-1"), Some(&1));
}

#[test]
fn liu_split_predicate() {
    let text = "<cs-1>\nThe Canon is better and cheaper than the Nikon.\n</cs-1>\n1_Canon 2_Nikon (better,cheaper)\n";
    let mut stats = Statistics::new();
    let result = LiuAdapter::new(Config::default()).convert_str(text, "test", &mut stats);
    assert_eq!(result.len(), 1);
    let comparisons = result[0].comparisons();
    assert_eq!(comparisons.len(), 2);
    assert_eq!(comparisons[0].predicate(), &mention(&[(4, "better")]));
    assert_eq!(comparisons[1].predicate(), &mention(&[(6, "cheaper")]));
    assert_eq!(comparisons[1].entity1(), &[mention(&[(2, "Canon")])]);
    assert_eq!(comparisons[1].entity2(), &[mention(&[(9, "Nikon")])]);
    assert!(result[0].errors().contains("Split predicate: better,cheaper"));
}

#[test]
fn liu_unaligned_predicate() {
    let text = "<cs-1>\nThe Canon is better than the Nikon.\n</cs-1>\n1_Canon 2_Nikon (fancier)\n";
    let mut stats = Statistics::new();
    let result = LiuAdapter::new(Config::default()).convert_str(text, "test", &mut stats);
    assert!(result.is_empty());
    assert_eq!(stats.predicates_not_found, 1);
}

#[test]
fn liu_type4_and_eof() {
    let text = "<cs-4>\nThey differ a lot.\n</cs-4>\n<cs-2>\nBoth are equally good.\n";
    let mut stats = Statistics::new();
    let result = LiuAdapter::new(Config::default()).convert_str(text, "test", &mut stats);
    assert!(result.is_empty());
    assert_eq!(stats.malformed, 1);

    let mut stats = Statistics::new();
    let result = LiuAdapter::new(Config::default().with_use_type4(true)).convert_str(text, "test", &mut stats);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id(), "1");
    assert_eq!(result[0].comparisons()[0].comparison_type(), PredicateType::Difference);
}

#[test]
fn liu_read_error_keeps_finished_blocks() -> Result<(), CorpusError> {
    let text = "<cs-1>\nThe Canon is better than the Nikon.\n</cs-1>\n1_Canon 2_Nikon (better)\nPlain";
    let mut stats = Statistics::new();
    let mut next_id = 1;
    let mut result = Vec::new();
    LiuAdapter::new(Config::default()).convert_reader(
        FailingReader::new(text.as_bytes()),
        "test",
        &mut next_id,
        &mut stats,
        &mut |annotation: SentenceAnnotation, _: &mut Statistics| {
            result.push(annotation);
            Ok(())
        },
    )?;
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id(), "1");
    assert_eq!(next_id, 2);
    assert_eq!(stats.errors, 1);
    Ok(())
}

#[test]
fn liu_annotation_line() -> Result<(), CorpusError> {
    let adapter = LiuAdapter::new(Config::default());
    let content = adapter.parse_annotation_line("1_this player 2_ipod 3_sound quality (better)")?;
    assert_eq!(content.predicate, "better");
    assert_eq!(content.entity1, vec!["this player"]);
    assert_eq!(content.entity2, vec!["ipod"]);
    assert_eq!(content.aspect, vec!["sound quality"]);
    assert!(adapter.parse_annotation_line("1_this 2_that").is_err());
    Ok(())
}

const USAGE_REVIEWS: &str = "r1\tproduct\tTitle.\tThe screen is bright.\n";
const USAGE_PHRASES: &str = "aspect\tr1\t11\t17\tscreen\ta1\nsubjective\tr1\t21\t27\tbright\ts1\n";
const USAGE_RELATIONS: &str = "TARG-SUBJ\tr1\ta1\ts1\tscreen\tbright\nPART-OF\tr1\ta1\ts1\tscreen\tbright\n";

#[test]
fn usage_convert() -> Result<(), CorpusError> {
    let mut stats = Statistics::new();
    let tables = UsageTables::from_readers(
        USAGE_REVIEWS.as_bytes(),
        USAGE_PHRASES.as_bytes(),
        USAGE_RELATIONS.as_bytes(),
        &mut stats,
    );
    assert_eq!(tables.reviews()[0].text, "Title. The screen is bright.");
    assert_eq!(tables.relations("r1").len(), 1);

    let result = UsageAdapter::new(Config::default()).convert_tables(&tables, &mut stats);
    assert_eq!(result.len(), 1);
    assert_eq!(
        result[0].to_string(),
        "r1-1\t1\t[undefined_--_UNDEFINED; [4_bright]; []; []; []; 2_screen]\tThe screen is bright .\tr1\t "
    );
    assert_eq!(stats.types.get("TARG-SUBJ"), Some(&1));

    let result = UsageAdapter::new(Config::default().with_subjective_head(true)).convert_tables(&tables, &mut stats);
    let comparison = &result[0].comparisons()[0];
    assert_eq!(comparison.predicate(), &mention(&[(4, "bright")]));
    assert_eq!(comparison.entity1(), &[mention(&[(2, "screen")])]);
    Ok(())
}

#[test]
fn usage_text_mismatch() -> Result<(), CorpusError> {
    let mut stats = Statistics::new();
    let phrases = "aspect\tr1\t11\t17\tscreens\ta1\nsubjective\tr1\t21\t27\tbright\ts1\n";
    let tables = UsageTables::from_readers(
        USAGE_REVIEWS.as_bytes(),
        phrases.as_bytes(),
        USAGE_RELATIONS.as_bytes(),
        &mut stats,
    );
    let result = UsageAdapter::new(Config::default()).convert_tables(&tables, &mut stats);
    assert_eq!(stats.predicates_not_found, 1);
    assert!(result.iter().all(|annotation| annotation.is_empty()));
    Ok(())
}

#[test]
fn usage_different_sentences() -> Result<(), CorpusError> {
    let mut stats = Statistics::new();
    let phrases = "aspect\tr1\t0\t5\tTitle\ta1\nsubjective\tr1\t21\t27\tbright\ts1\n";
    let tables = UsageTables::from_readers(
        USAGE_REVIEWS.as_bytes(),
        phrases.as_bytes(),
        USAGE_RELATIONS.as_bytes(),
        &mut stats,
    );
    let result = UsageAdapter::new(Config::default()).convert_tables(&tables, &mut stats);
    assert!(result.is_empty());
    assert_eq!(stats.arguments_not_found, 1);
    Ok(())
}

#[test]
fn usage_unreadable_records_are_skipped() {
    let mut stats = Statistics::new();
    let reviews = b"r0\tproduct\tBad \xff title.\tText.\nr1\tproduct\tTitle.\tThe screen is bright.\n";
    let tables = UsageTables::from_readers(
        &reviews[..],
        USAGE_PHRASES.as_bytes(),
        FailingReader::new(b"TARG-SUBJ\tr1\ta1\ts1\tscreen\tbright\n"),
        &mut stats,
    );
    assert_eq!(tables.reviews().len(), 1);
    assert_eq!(tables.reviews()[0].id, "r1");
    assert_eq!(stats.malformed, 1);
    assert_eq!(tables.relations("r1").len(), 1);
    assert_eq!(stats.errors, 1);
}

const IMS_SENTENCES: &str = "s1\tThe X is bigger than Y\ns2\tNothing here\n";
const IMS_ANNOTATIONS: &str = "s1\t1\t[ranked_--_SUPERIOR; [2_X]; [6_Y]; []; []; 4_bigger]\t[difference_--_UNDEFINED; []; []; []; []; 2_X]\tx\tsrc\t \n\
s2\t0\tNothing here\tsrc\t \n\
s3\t1\t[ranked_--_SUPERIOR; []; []; []; []; 1_a]\ta\tsrc\t \n";

/// Runs the IMS annotation reader and collects what it emits
fn ims_annotations<R: std::io::BufRead>(
    adapter: &ImsAdapter,
    reader: R,
    sentences: &std::collections::HashMap<String, String>,
    stats: &mut Statistics,
) -> Result<Vec<SentenceAnnotation>, CorpusError> {
    let mut result = Vec::new();
    adapter.convert_reader(reader, "annotations", sentences, stats, &mut |annotation: SentenceAnnotation,
                                                                           _: &mut Statistics| {
        result.push(annotation);
        Ok(())
    })?;
    Ok(result)
}

#[test]
fn ims_convert() -> Result<(), CorpusError> {
    let mut stats = Statistics::new();
    let adapter = ImsAdapter::new(Config::default());
    let sentences = adapter.read_sentences(IMS_SENTENCES.as_bytes(), "sentences", &mut stats);
    let result = ims_annotations(&adapter, IMS_ANNOTATIONS.as_bytes(), &sentences, &mut stats)?;
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].len(), 2);
    assert_eq!(result[0].sentence(), "The X is bigger than Y");
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.errors, 1);
    Ok(())
}

#[test]
fn ims_only_positive() -> Result<(), CorpusError> {
    let mut stats = Statistics::new();
    let adapter = ImsAdapter::new(Config::default().with_only_positive(true));
    let sentences = adapter.read_sentences(IMS_SENTENCES.as_bytes(), "sentences", &mut stats);
    let result = ims_annotations(&adapter, IMS_ANNOTATIONS.as_bytes(), &sentences, &mut stats)?;
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].len(), 1);
    assert_eq!(result[0].comparisons()[0].comparison_type(), PredicateType::Ranked);
    assert_eq!(stats.filtered, 1);

    let equative: ComparisonAnnotation = "[equative_--_UNDEFINED; []; []; []; []; 3_as]".parse()?;
    assert!(adapter.keep_comparison(&equative));
    let adapter = ImsAdapter::new(Config::default().with_only_positive(true).with_use_equative(false));
    assert!(!adapter.keep_comparison(&equative));
    let inferior: ComparisonAnnotation = "[ranked_--_<; []; []; []; []; 3_worse]".parse()?;
    assert!(!adapter.keep_comparison(&inferior));
    Ok(())
}

#[test]
fn ims_invalid_utf8_line_is_converted() -> Result<(), CorpusError> {
    let mut stats = Statistics::new();
    let adapter = ImsAdapter::new(Config::default());
    let sentences = adapter.read_sentences(
        "s1\tThe X is bigger than Y\ns2\tThe C is better than D\ns3\tA beats B\n".as_bytes(),
        "sentences",
        &mut stats,
    );
    let annotations = b"s1\t1\t[ranked_--_SUPERIOR; [2_X]; [6_Y]; []; []; 4_bigger]\tx\tsrc\t \n\
s2\t1\t[ranked_--_SUPERIOR; [2_C\xff]; [6_D]; []; []; 4_better]\tx\tsrc\t \n\
s3\t1\t[ranked_--_SUPERIOR; [1_A]; [3_B]; []; []; 2_beats]\tx\tsrc\t \n";
    let result = ims_annotations(&adapter, &annotations[..], &sentences, &mut stats)?;
    assert_eq!(result.len(), 3);
    assert_eq!(result[1].comparisons()[0].entity1(), &[mention(&[(2, "C\u{FFFD}")])]);
    assert_eq!(result[2].id(), "s3");
    assert_eq!(stats.errors, 0);
    Ok(())
}

#[test]
fn ims_read_error_keeps_earlier_lines() -> Result<(), CorpusError> {
    let mut stats = Statistics::new();
    let adapter = ImsAdapter::new(Config::default());
    let sentences = adapter.read_sentences(FailingReader::new(IMS_SENTENCES.as_bytes()), "sentences", &mut stats);
    assert_eq!(sentences.len(), 2);
    assert_eq!(stats.errors, 1);
    let annotations = "s1\t1\t[ranked_--_SUPERIOR; [2_X]; [6_Y]; []; []; 4_bigger]\tx\tsrc\t \n";
    let result = ims_annotations(&adapter, FailingReader::new(annotations.as_bytes()), &sentences, &mut stats)?;
    assert_eq!(result.len(), 1);
    assert_eq!(stats.errors, 2);
    Ok(())
}

// ---------------------------------- normalization --------------------------------------

struct AdjectiveTagger;

impl PosTagger for AdjectiveTagger {
    fn tags(&self, words: &[&str]) -> Vec<String> {
        words
            .iter()
            .map(|w| if *w == "expensive" { "JJ".to_string() } else { "NN".to_string() })
            .collect()
    }
}

#[test]
fn split_as_as_predicate() {
    let mut stats = Statistics::new();
    let words = split_words("X is as good as Y");
    let mut comparison = ComparisonAnnotation::new(PredicateType::Equative)
        .with_predicate(mention(&[(3, "as"), (4, "good"), (5, "as")]));
    let normalizer = PredicateNormalizer::new();
    normalizer.split_predicate(&mut comparison, &words, &mut stats);
    assert_eq!(comparison.predicate(), &mention(&[(3, "as")]));
    assert_eq!(comparison.sentiment(), &[mention(&[(4, "good")])]);
    assert_eq!(stats.split_predicates, 1);
    assert_eq!(stats.added_sentiment, 1);

    assert!(normalizer.exchange_predicate(&mut comparison, &mut stats));
    assert_eq!(comparison.predicate(), &mention(&[(4, "good")]));
    assert_eq!(stats.exchanged.get("as"), Some(&1));
    assert!(!normalizer.exchange_predicate(&mut comparison, &mut stats));
}

#[test]
fn split_as_with_following_aspect() {
    let mut stats = Statistics::new();
    let mut comparison = ComparisonAnnotation::new(PredicateType::Equative)
        .with_predicate(mention(&[(3, "as")]))
        .with_argument(Role::Aspect, mention(&[(4, "fast")]));
    PredicateNormalizer::new().split_predicate(&mut comparison, &split_words("X is as fast as Y"), &mut stats);
    assert!(comparison.aspect().is_empty());
    assert_eq!(comparison.sentiment(), &[mention(&[(4, "fast")])]);
}

#[test]
fn split_as_with_preceding_aspect() {
    let mut stats = Statistics::new();
    let mut comparison = ComparisonAnnotation::new(PredicateType::Equative)
        .with_predicate(mention(&[(7, "as")]))
        .with_argument(Role::Aspect, mention(&[(6, "solution")]));
    PredicateNormalizer::new().split_predicate(&mut comparison, &split_words("X is as a good solution as Y"), &mut stats);
    assert_eq!(comparison.predicate(), &mention(&[(3, "as")]));
    assert_eq!(comparison.sentiment(), &[mention(&[(6, "solution")])]);
    assert!(comparison.aspect().is_empty());
}

#[test]
fn split_aspect_overlapping_predicate() {
    let mut stats = Statistics::new();
    let mut comparison = ComparisonAnnotation::new(PredicateType::Ranked)
        .with_predicate(mention(&[(2, "greater")]))
        .with_argument(Role::Aspect, mention(&[(2, "greater"), (3, "choice")]));
    let normalizer = PredicateNormalizer::new();
    normalizer.split_predicate(&mut comparison, &split_words("a greater choice"), &mut stats);
    assert_eq!(comparison.aspect(), &[mention(&[(3, "choice")])]);

    let mut comparison = ComparisonAnnotation::new(PredicateType::Ranked)
        .with_predicate(mention(&[(2, "greater")]))
        .with_argument(Role::Aspect, mention(&[(2, "greater")]));
    normalizer.split_predicate(&mut comparison, &split_words("a greater choice"), &mut stats);
    assert!(comparison.aspect().is_empty());
}

#[test]
fn split_degree_adjective_needs_tagger() {
    let mut stats = Statistics::new();
    let words = split_words("X is more expensive than Y");
    let comparison = ComparisonAnnotation::new(PredicateType::Ranked)
        .with_predicate(mention(&[(3, "more")]))
        .with_argument(Role::Aspect, mention(&[(4, "expensive")]));

    let mut untagged = comparison.clone();
    PredicateNormalizer::new().split_predicate(&mut untagged, &words, &mut stats);
    assert_eq!(untagged.aspect().len(), 1);

    let mut tagged = comparison.clone();
    PredicateNormalizer::new()
        .with_tagger(AdjectiveTagger)
        .split_predicate(&mut tagged, &words, &mut stats);
    assert!(tagged.aspect().is_empty());
    assert_eq!(tagged.sentiment(), &[mention(&[(4, "expensive")])]);
}

#[test]
fn normalize_with_merging() -> Result<(), CorpusError> {
    let mut stats = Statistics::new();
    let mut annotation = SentenceAnnotation::new("n1").with_comparative(true);
    annotation.add_comparison(
        ComparisonAnnotation::new(PredicateType::Ranked)
            .with_predicate(mention(&[(2, "like")]))
            .with_argument(Role::Entity1, mention(&[(5, "Bravia")])),
    );
    let normalizer = Normalizer::new(Config::default().with_merge_entities(true));
    let (sentence, result) = normalizer.normalize("I like the Sony Bravia a lot", Some(&annotation), &mut stats);
    assert_eq!(sentence, "I like the PRODUCT a lot");
    let result = result.unwrap();
    assert_eq!(result.comparisons()[0].entity1(), &[mention(&[(4, "PRODUCT")])]);
    assert_eq!(stats.repaired, 1);
    Ok(())
}

#[test]
fn normalize_entity_order() {
    let mut stats = Statistics::new();
    let mut annotation = SentenceAnnotation::new("n2").with_comparative(true);
    annotation.add_comparison(
        ComparisonAnnotation::new(PredicateType::Ranked)
            .with_predicate(mention(&[(3, "better")]))
            .with_argument(Role::Entity1, mention(&[(5, "Y")]))
            .with_argument(Role::Entity2, mention(&[(1, "X")])),
    );
    let normalizer = Normalizer::new(Config::default().with_entity_order(EntityOrder::Surface));
    let (_, result) = normalizer.normalize("X is better than Y", Some(&annotation), &mut stats);
    assert_eq!(result.unwrap().comparisons()[0].entity1(), &[mention(&[(1, "X")])]);
    assert_eq!(stats.reordered, 1);
}

#[test]
fn normalize_sentence_only() {
    let mut stats = Statistics::new();
    let normalizer = Normalizer::new(Config::default().with_token_limit(3));
    let (sentence, result) = normalizer.normalize("a = b c d", None, &mut stats);
    assert_eq!(sentence, "a eq b");
    assert!(result.is_none());
    assert_eq!(stats.long_sentences, 1);
}

#[test]
fn normalize_corpus_passes_through() -> Result<(), CorpusError> {
    let sentences = "The X is bigger than Y\nShort one\n";
    let annotations = "1\t1\t[ranked_--_SUPERIOR; [2_X]; [6_Y]; []; []; 4_bigger]\tThe X is bigger than Y\tsrc\t \n\
2\t0\tShort one\tsrc\t \n";
    let reader = CorpusReader::new(sentences.as_bytes(), Some(annotations.as_bytes()));
    let mut writer = CorpusWriter::new(Vec::new(), Some(Vec::new()), DataFormat::Canonical);
    let mut stats = Statistics::new();
    Normalizer::new(Config::default()).normalize_corpus(reader, &mut writer, &mut stats)?;
    let (sentences_out, annotations_out) = writer.into_inner();
    assert_eq!(String::from_utf8(sentences_out).unwrap(), sentences);
    assert_eq!(String::from_utf8(annotations_out.unwrap()).unwrap(), annotations);
    assert_eq!(stats.sentences, 2);
    assert_eq!(stats.comparative_sentences, 1);
    assert_eq!(stats.comparisons, 1);
    Ok(())
}

#[test]
fn normalize_corpus_keeps_files_aligned_on_bad_lines() -> Result<(), CorpusError> {
    let reader = CorpusReader::new("a b\n".as_bytes(), Some("broken\tline\n".as_bytes()));
    let mut writer = CorpusWriter::new(Vec::new(), Some(Vec::new()), DataFormat::Canonical);
    let mut stats = Statistics::new();
    Normalizer::new(Config::default()).normalize_corpus(reader, &mut writer, &mut stats)?;
    let (_, annotations_out) = writer.into_inner();
    let output = String::from_utf8(annotations_out.unwrap()).unwrap();
    assert!(output.starts_with("broken\t0\ta b\t\t"));
    assert_eq!(output.lines().count(), 1);
    assert_eq!(stats.malformed, 1);
    Ok(())
}

#[test]
fn normalize_corpus_read_error_keeps_files_aligned() -> Result<(), CorpusError> {
    let reader = CorpusReader::new(
        FailingReader::new(b"a b\nc d\n"),
        Some(FailingReader::new(b"1\t0\ta b\tsrc\t \n2\t0\tc d\tsrc\t \n3\t0\te\tsrc\t \n")),
    );
    let mut writer = CorpusWriter::new(Vec::new(), Some(Vec::new()), DataFormat::Canonical);
    let mut stats = Statistics::new();
    Normalizer::new(Config::default()).normalize_corpus(reader, &mut writer, &mut stats)?;
    let (sentences_out, annotations_out) = writer.into_inner();
    let sentences = String::from_utf8(sentences_out).unwrap();
    let annotations = String::from_utf8(annotations_out.unwrap()).unwrap();
    assert_eq!(sentences.lines().collect::<Vec<_>>(), vec!["a b", "c d", ""]);
    assert_eq!(annotations.lines().count(), 3);
    assert!(annotations.lines().nth(2).unwrap().starts_with("\t0\t"));
    assert_eq!(stats.sentences, 3);
    assert_eq!(stats.errors, 1);
    Ok(())
}

// ---------------------------------- corpus output --------------------------------------

#[test]
fn write_json_lines() -> Result<(), CorpusError> {
    let mut writer = CorpusWriter::new(Vec::new(), Some(Vec::new()), DataFormat::Json { compact: true });
    let mut stats = Statistics::new();
    writer.write_all([example_annotation(), example_annotation()].iter(), &mut stats)?;
    let (sentences, annotations) = writer.into_inner();
    assert_eq!(String::from_utf8(sentences).unwrap().lines().count(), 2);
    let annotations = String::from_utf8(annotations.unwrap()).unwrap();
    for line in annotations.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["sentence"], "The X is bigger than Y");
    }
    assert_eq!(stats.comparisons, 2);
    Ok(())
}

#[test]
fn lossy_lines_replace_invalid_utf8() {
    let lines: Vec<String> = lossy_lines(&b"one\r\ntw\xffo\nthree"[..]).map(|l| l.unwrap()).collect();
    assert_eq!(lines, vec!["one", "tw\u{FFFD}o", "three"]);
}

#[test]
fn lossy_lines_end_after_read_error() {
    let mut lines = lossy_lines(FailingReader::new(b"a\nb"));
    assert_eq!(lines.next().unwrap().unwrap(), "a");
    assert!(lines.next().unwrap().is_err());
    assert!(lines.next().is_none());
}

#[test]
fn corpus_reader_stops_at_shorter_file() {
    let reader = CorpusReader::new("a\nb\nc\n".as_bytes(), Some("1\n2\n".as_bytes()));
    let records: Vec<CorpusRecord> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].line, 2);
    assert_eq!(records[1].sentence, "b");
    assert_eq!(records[1].annotation.as_deref(), Some("2"));
}

// ---------------------------------- validation --------------------------------------

#[cfg(feature = "validation")]
#[test]
fn validate_annotations() {
    let annotation = example_annotation();
    let words = split_words("The X is bigger than Y");
    let problems = validation::validate(&annotation, &words);
    assert_eq!(problems.len(), 1);
    assert!(matches!(problems[0], CorpusError::ArgumentNotFound(..)));

    let words = split_words("The X is bigger than a Y");
    assert!(validation::validate(&annotation, &words).is_empty());

    let mut wrong = SentenceAnnotation::new("w");
    wrong.add_comparison(ComparisonAnnotation::new(PredicateType::Ranked).with_predicate(mention(&[(1, "bigger")])));
    let problems = validation::validate(&wrong, &words);
    assert!(matches!(problems[0], CorpusError::PredicateNotFound(..)));

    let mut stats = Statistics::new();
    assert!(!validation::report(&wrong, &problems, &mut stats));
    assert_eq!(stats.validation_failures, 1);
}

#[cfg(feature = "validation")]
#[test]
fn validate_corpus_counts_unreadable_lines() {
    let reader = CorpusReader::new(
        FailingReader::new(b"The X is bigger than a Y\n"),
        Some(FailingReader::new(format!("{}\n", EXAMPLE_LINE).as_bytes())),
    );
    let mut stats = Statistics::new();
    let invalid = validation::validate_corpus(reader, &Config::default(), &mut stats);
    assert_eq!(invalid, 1);
    assert_eq!(stats.sentences, 2);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.comparisons, 1);
}

// ---------------------------------- configuration & statistics --------------------------------------

#[test]
fn config_from_json() {
    let config: Config =
        serde_json::from_str(r#"{ "token_limit": 20, "merge_entities": true, "entity_order": "surface" }"#).unwrap();
    assert_eq!(config.token_limit(), 20);
    assert!(config.merge_entities());
    assert_eq!(config.entity_order(), EntityOrder::Surface);
    assert!(config.use_coref());
    assert_eq!(config.duplicate_policy(), DuplicatePolicy::Collapse);
    assert_eq!(Config::default().token_limit(), DEFAULT_TOKEN_LIMIT);
}

#[test]
fn statistics_summary() -> Result<(), CorpusError> {
    let mut stats = Statistics::new();
    stats.comparisons = 3;
    stats.count_type("ranked");
    stats.count_type("ranked");
    stats.count_exchange("more");
    stats.finish();
    let summary = stats.to_string();
    assert!(summary.contains("comparisons written: 3"));
    assert!(summary.contains("type ranked: 2"));
    assert!(summary.contains("exchanged predicate 'more': 1"));
    let json = stats.to_json_string(true)?;
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["types"]["ranked"], 2);
    Ok(())
}
