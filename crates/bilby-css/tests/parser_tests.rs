//! Integration tests for the component-tree parser.

use bilby_css::parser::{
    ComponentTag, ComponentTree, Extra, parse_list_of_component_values, parse_stylesheet,
};
use bilby_css::tokenizer::{Token, TokenTag, Tokenizer};

/// Collect the tags of every component in order.
fn tags(tree: &ComponentTree) -> Vec<ComponentTag> {
    (0..tree.len()).map(|i| tree.tag(i)).collect()
}

/// Verify the skip-encoding invariants over the whole tree:
/// every container's subtree is well-nested and the root's `next_sibling`
/// is the tree length.
fn assert_skip_invariants(tree: &ComponentTree) {
    for i in 0..tree.len() {
        let end = tree.next_sibling(i);
        assert!(end > i, "next_sibling must advance (component {i})");
        assert!(end <= tree.len(), "next_sibling exceeds tree (component {i})");
        let mut child = i + 1;
        while child < end {
            let child_end = tree.next_sibling(child);
            assert!(
                child_end <= end,
                "descendant {child} of {i} escapes its container"
            );
            child = child_end;
        }
    }
    if !tree.is_empty() {
        assert_eq!(tree.next_sibling(0), tree.len());
    }
}

#[test]
fn test_empty_stylesheet() {
    let tree = parse_stylesheet("");
    assert_eq!(tags(&tree), vec![ComponentTag::RuleList]);
    assert_eq!(tree.next_sibling(0), 1);
}

#[test]
fn test_simple_rule() {
    let tree = parse_stylesheet("a{}");
    assert_eq!(
        tags(&tree),
        vec![
            ComponentTag::RuleList,
            ComponentTag::QualifiedRule,
            ComponentTag::TokenIdent,
            ComponentTag::SimpleBlockCurly,
        ]
    );
    // The rule's extra names its body block.
    assert_eq!(tree.extra(1), Extra::Index(3));
    assert_eq!(tree.next_sibling(1), 4);
    assert_skip_invariants(&tree);
}

#[test]
fn test_stylesheet_component_sequence() {
    // An at-rule without a block, an at-rule with one, a qualified rule
    // with a function in its body, and a truncated trailing rule.
    let source = "@charset \"utf-8\"; @new-rule {} root { print(we, can, parse, this!) } broken";
    let tree = parse_stylesheet(source);

    use ComponentTag::{
        AtRule, Function, QualifiedRule, RuleList, SimpleBlockCurly, TokenComma, TokenDelim,
        TokenIdent, TokenString, TokenWhitespace,
    };
    assert_eq!(
        tags(&tree),
        vec![
            RuleList,         // 0
            AtRule,           // 1  @charset
            TokenWhitespace,  // 2
            TokenString,      // 3  "utf-8"
            AtRule,           // 4  @new-rule
            TokenWhitespace,  // 5
            SimpleBlockCurly, // 6
            QualifiedRule,    // 7  root { ... }
            TokenIdent,       // 8  root
            TokenWhitespace,  // 9
            SimpleBlockCurly, // 10
            TokenWhitespace,  // 11
            Function,         // 12 print(
            TokenIdent,       // 13 we
            TokenComma,       // 14
            TokenWhitespace,  // 15
            TokenIdent,       // 16 can
            TokenComma,       // 17
            TokenWhitespace,  // 18
            TokenIdent,       // 19 parse
            TokenComma,       // 20
            TokenWhitespace,  // 21
            TokenIdent,       // 22 this
            TokenDelim,       // 23 !
            TokenWhitespace,  // 24
        ]
    );
    assert_eq!(tree.len(), 25);

    // The final `broken` token started a qualified rule that hit EOF
    // before its block; it disappears from the tree.
    assert_eq!(tree.extra(23).codepoint(), Some('!'));
    assert_eq!(tree.extra(1), Extra::None); // block-less at-rule
    assert_eq!(tree.extra(4), Extra::Index(6));
    assert_eq!(tree.extra(7), Extra::Index(10));
    assert_skip_invariants(&tree);
}

#[test]
fn test_qualified_rule_truncated_at_eof() {
    // A qualified rule that never reaches its block is discarded and the
    // tree is truncated back to where the rule began.
    let before = parse_stylesheet("a{}");
    let after = parse_stylesheet("a{} broken with no block");
    assert_eq!(before.len(), after.len());
    assert_eq!(tags(&before), tags(&after));
    assert_skip_invariants(&after);
}

#[test]
fn test_lone_truncated_rule_leaves_only_the_rule_list() {
    let tree = parse_stylesheet("broken");
    assert_eq!(tags(&tree), vec![ComponentTag::RuleList]);
    assert_eq!(tree.next_sibling(0), 1);
}

#[test]
fn test_cdo_cdc_ignored_at_top_level() {
    let tree = parse_stylesheet("<!-- a{} -->");
    assert_eq!(
        tags(&tree),
        vec![
            ComponentTag::RuleList,
            ComponentTag::QualifiedRule,
            ComponentTag::TokenIdent,
            ComponentTag::SimpleBlockCurly,
        ]
    );
    assert_skip_invariants(&tree);
}

#[test]
fn test_at_rule_ends_at_semicolon() {
    let tree = parse_stylesheet("@import url(x.css); a{}");
    assert_eq!(tree.tag(1), ComponentTag::AtRule);
    // Children of the at-rule: whitespace + url. The semicolon is
    // structural and does not appear.
    let children: Vec<_> = tree.children(1).map(|i| tree.tag(i)).collect();
    assert_eq!(
        children,
        vec![ComponentTag::TokenWhitespace, ComponentTag::TokenUrl]
    );
    assert_skip_invariants(&tree);
}

#[test]
fn test_nested_blocks() {
    let tree = parse_list_of_component_values("{[({})]}");
    assert_eq!(
        tags(&tree),
        vec![
            ComponentTag::ComponentValueList,
            ComponentTag::SimpleBlockCurly,
            ComponentTag::SimpleBlockBracket,
            ComponentTag::SimpleBlockParen,
            ComponentTag::SimpleBlockCurly,
        ]
    );
    assert_eq!(tree.next_sibling(1), 5);
    assert_eq!(tree.next_sibling(2), 5);
    assert_skip_invariants(&tree);
}

#[test]
fn test_deep_nesting_does_not_overflow_the_native_stack() {
    // The parser is an explicit stack machine; pathological nesting depth
    // must not recurse natively.
    let depth: u32 = 20_000;
    let mut source = String::new();
    for _ in 0..depth {
        source.push('(');
    }
    let tree = parse_list_of_component_values(&source);
    assert_eq!(tree.len(), depth + 1);
    assert_skip_invariants(&tree);
}

#[test]
fn test_numeric_payloads_are_preserved() {
    let tree = parse_list_of_component_values("12 3.5 40% 7px");
    let mut integers = 0;
    let mut numbers = 0;
    let mut percentages = 0;
    let mut dimensions = 0;
    for i in 0..tree.len() {
        match tree.tag(i) {
            ComponentTag::TokenInteger => {
                assert_eq!(tree.extra(i).integer(), Some(12));
                integers += 1;
            }
            ComponentTag::TokenNumber => {
                assert_eq!(tree.extra(i).number(), Some(3.5));
                numbers += 1;
            }
            ComponentTag::TokenPercentage => {
                assert_eq!(tree.extra(i).number(), Some(40.0));
                percentages += 1;
            }
            ComponentTag::TokenDimension => {
                assert_eq!(tree.extra(i).number(), Some(7.0));
                dimensions += 1;
            }
            _ => {}
        }
    }
    assert_eq!((integers, numbers, percentages, dimensions), (1, 1, 1, 1));
}

#[test]
fn test_declaration_block_preserves_colons_and_semicolons() {
    let tree = parse_stylesheet("a { color: red; width: 10px }");
    let body = tree.extra(1).index().expect("rule has a body");
    let inner: Vec<_> = tree.children(body).map(|i| tree.tag(i)).collect();
    assert!(inner.contains(&ComponentTag::TokenColon));
    assert!(inner.contains(&ComponentTag::TokenSemicolon));
    assert_skip_invariants(&tree);
}

/// Tokenize a string, dropping whitespace, comments, and EOF.
fn significant_tokens(source: &str) -> Vec<TokenTag> {
    let mut tokenizer = Tokenizer::new(source);
    let mut tokens: Vec<Token> = Vec::new();
    loop {
        let token = tokenizer.next_token();
        if token.is_eof() {
            break;
        }
        if !token.is_space() {
            tokens.push(token);
        }
    }
    tokens.into_iter().map(|t| t.tag).collect()
}

#[test]
fn test_serialization_round_trips_significant_tokens() {
    let source = "@namespace svg url(http://www.w3.org/2000/svg);\n\
                  a.cls#id { color: #aabbcc; width: calc(1px) }\n\
                  @media screen { b { x: 1 } }";
    let tree = parse_stylesheet(source);
    let serialized = tree.serialize();
    assert_eq!(
        significant_tokens(source),
        significant_tokens(&serialized),
        "re-tokenizing the serialization must preserve significant tokens"
    );
}

#[test]
fn test_serialization_round_trip_of_component_values() {
    let source = "1px solid rgb(10, 20, 30) url(x.png)";
    let tree = parse_list_of_component_values(source);
    let serialized = tree.serialize();
    assert_eq!(significant_tokens(source), significant_tokens(&serialized));
}
