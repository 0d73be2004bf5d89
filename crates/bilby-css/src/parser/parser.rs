//! CSS parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
//!
//! "The input to the parsing stage is a stream of tokens from the
//! tokenization stage."
//!
//! The parser is a stack machine: each of the spec's "consume a ..."
//! algorithms becomes a frame kind, and the recursion of the spec prose
//! becomes an explicit frame stack. CSS nests without bound (`((((...))))`),
//! so the machine never recurses natively; the driver loop dispatches on the
//! top frame until only the root remains.

use crate::tokenizer::{Token, TokenTag, Tokenizer};

use super::component::{Component, ComponentIndex, ComponentTag, ComponentTree, Extra};

/// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
///
/// "To parse a stylesheet from input... Consume a list of rules from input,
/// with the top-level flag set."
///
/// Never fails: parse errors are recovered from or truncate the offending
/// rule, per the spec's error handling rules.
#[must_use]
pub fn parse_stylesheet(source: &str) -> ComponentTree {
    let mut parser = ComponentTreeParser::new(source);
    parser.open_root(ComponentTag::RuleList, FrameKind::ListOfRules { top_level: true });
    parser.run()
}

/// [§ 5.3.10 Parse a list of component values](https://www.w3.org/TR/css-syntax-3/#parse-list-of-component-values)
///
/// "Repeatedly consume a component value from input until an <EOF-token> is
/// returned, appending the returned values into a list."
#[must_use]
pub fn parse_list_of_component_values(source: &str) -> ComponentTree {
    let mut parser = ComponentTreeParser::new(source);
    parser.open_root(ComponentTag::ComponentValueList, FrameKind::ListOfComponentValues);
    parser.run()
}

/// What a stack frame is in the middle of consuming.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FrameKind {
    /// The sentinel below everything; never consumed.
    Root,
    /// [§ 5.4.1](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    ListOfRules {
        /// "with the top-level flag set" — controls CDO/CDC handling.
        top_level: bool,
    },
    /// [§ 5.4.9](https://www.w3.org/TR/css-syntax-3/#consume-list-of-component-values)
    ListOfComponentValues,
    /// [§ 5.4.3](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    QualifiedRule,
    /// [§ 5.4.2](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    AtRule,
    /// [§ 5.4.8](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    SimpleBlock {
        /// The token tag that closes this block.
        closing: TokenTag,
        /// Whether this block is the body of the rule frame beneath it, in
        /// which case closing the block also closes the rule.
        in_a_rule: bool,
    },
    /// [§ 5.4.9](https://www.w3.org/TR/css-syntax-3/#consume-function)
    Function,
}

/// A frame of the parse stack: the component it is building, the size of
/// that component's subtree so far, and what it is consuming.
#[derive(Debug, Clone, Copy)]
struct Frame {
    index: ComponentIndex,
    skip: ComponentIndex,
    kind: FrameKind,
}

/// The component-tree parser: a tokenizer, a pushback slot, the tree under
/// construction, and the frame stack.
struct ComponentTreeParser<'a> {
    tokenizer: Tokenizer<'a>,
    /// "Reconsume the current input token." — one token of pushback.
    reconsumed: Option<Token>,
    tree: ComponentTree,
    stack: Vec<Frame>,
}

impl<'a> ComponentTreeParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            tokenizer: Tokenizer::new(source),
            reconsumed: None,
            tree: ComponentTree::new(source.to_owned()),
            stack: vec![Frame {
                index: 0,
                skip: 0,
                kind: FrameKind::Root,
            }],
        }
    }

    /// Append the goal container and open its frame.
    fn open_root(&mut self, tag: ComponentTag, kind: FrameKind) {
        self.push_container(tag, 0, Extra::None, kind);
    }

    /// The driver loop: dispatch on the top frame until only the root
    /// sentinel remains. Each consumer reads tokens until it either pops its
    /// frame or pushes a child frame and returns here.
    fn run(mut self) -> ComponentTree {
        while self.stack.len() > 1 {
            let kind = self.top().kind;
            match kind {
                FrameKind::Root => unreachable!("root frame is never dispatched"),
                FrameKind::ListOfRules { top_level } => self.consume_list_of_rules(top_level),
                FrameKind::ListOfComponentValues => self.consume_list_of_component_values(),
                FrameKind::QualifiedRule => self.consume_qualified_rule(),
                FrameKind::AtRule => self.consume_at_rule(),
                FrameKind::SimpleBlock { closing, in_a_rule } => {
                    self.consume_simple_block(closing, in_a_rule);
                }
                FrameKind::Function => self.consume_function(),
            }
        }
        self.tree
    }

    /// [§ 5.4.1 Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    fn consume_list_of_rules(&mut self, top_level: bool) {
        loop {
            let token = self.next();
            match token.tag {
                // "<whitespace-token>" — "Do nothing."
                TokenTag::Whitespace | TokenTag::Comment => {}

                // "<EOF-token>" — "Return the list of rules."
                TokenTag::Eof => {
                    self.pop();
                    return;
                }

                // "<CDO-token>, <CDC-token>" — "If the top-level flag is set,
                // do nothing."
                TokenTag::Cdo | TokenTag::Cdc if top_level => {}

                // "<at-keyword-token>" — "Reconsume the current input token.
                // Consume an at-rule, and append the returned value."
                TokenTag::AtKeyword => {
                    self.push_container(
                        ComponentTag::AtRule,
                        token.location,
                        Extra::None,
                        FrameKind::AtRule,
                    );
                    return;
                }

                // "anything else" — "Reconsume the current input token.
                // Consume a qualified rule. If anything is returned, append it."
                _ => {
                    self.reconsume(token);
                    self.push_container(
                        ComponentTag::QualifiedRule,
                        token.location,
                        Extra::None,
                        FrameKind::QualifiedRule,
                    );
                    return;
                }
            }
        }
    }

    /// [§ 5.4.9 Consume a list of component values](https://www.w3.org/TR/css-syntax-3/#consume-list-of-component-values)
    fn consume_list_of_component_values(&mut self) {
        loop {
            let token = self.next();
            if token.tag == TokenTag::Eof {
                self.pop();
                return;
            }
            if self.handle_component_value(token) {
                return;
            }
        }
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    fn consume_at_rule(&mut self) {
        loop {
            let token = self.next();
            match token.tag {
                // "<semicolon-token>" — "Return the at-rule."
                TokenTag::Semicolon => {
                    self.pop();
                    return;
                }

                // "<EOF-token>" — "This is a parse error. Return the at-rule."
                TokenTag::Eof => {
                    self.reconsume(token);
                    self.pop();
                    return;
                }

                // "<{-token>" — "Consume a simple block and assign it to the
                // at-rule's block. Return the at-rule."
                TokenTag::LeftCurly => {
                    self.open_rule_body(token.location);
                    return;
                }

                // "anything else" — "Reconsume... Consume a component value.
                // Append the returned value to the at-rule's prelude."
                _ => {
                    if self.handle_component_value(token) {
                        return;
                    }
                }
            }
        }
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    fn consume_qualified_rule(&mut self) {
        loop {
            let token = self.next();
            match token.tag {
                // "<EOF-token>" — "This is a parse error. Return nothing."
                // The partially built rule is discarded: the tree is
                // truncated back to the rule's own index.
                TokenTag::Eof => {
                    self.reconsume(token);
                    if let Some(frame) = self.stack.pop() {
                        self.tree.components_mut().truncate(frame.index as usize);
                    }
                    return;
                }

                // "<{-token>" — "Consume a simple block and assign it to the
                // qualified rule's block. Return the qualified rule."
                TokenTag::LeftCurly => {
                    self.open_rule_body(token.location);
                    return;
                }

                // "anything else" — prelude component value.
                _ => {
                    if self.handle_component_value(token) {
                        return;
                    }
                }
            }
        }
    }

    /// [§ 5.4.8 Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    fn consume_simple_block(&mut self, closing: TokenTag, in_a_rule: bool) {
        loop {
            let token = self.next();
            // "ending token" — "Return the block."
            if token.tag == closing {
                self.pop();
                if in_a_rule {
                    self.pop();
                }
                return;
            }
            match token.tag {
                // "<EOF-token>" — "This is a parse error. Return the block."
                TokenTag::Eof => {
                    self.reconsume(token);
                    self.pop();
                    if in_a_rule {
                        self.pop();
                    }
                    return;
                }
                _ => {
                    if self.handle_component_value(token) {
                        return;
                    }
                }
            }
        }
    }

    /// [§ 5.4.9 Consume a function](https://www.w3.org/TR/css-syntax-3/#consume-function)
    fn consume_function(&mut self) {
        loop {
            let token = self.next();
            match token.tag {
                // "<)-token>" — "Return the function."
                TokenTag::RightParen => {
                    self.pop();
                    return;
                }
                // "<EOF-token>" — "This is a parse error. Return the function."
                TokenTag::Eof => {
                    self.reconsume(token);
                    self.pop();
                    return;
                }
                _ => {
                    if self.handle_component_value(token) {
                        return;
                    }
                }
            }
        }
    }

    /// [§ 5.4.7 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    ///
    /// Opens a child frame for blocks and functions (returns `true`: the
    /// caller must yield to the driver) or appends a preserved-token leaf
    /// (returns `false`: the caller continues).
    fn handle_component_value(&mut self, token: Token) -> bool {
        let leaf = match token.tag {
            // "<{-token>, <[-token>, <(-token>" — "Consume a simple block."
            TokenTag::LeftCurly => {
                self.push_container(
                    ComponentTag::SimpleBlockCurly,
                    token.location,
                    Extra::None,
                    FrameKind::SimpleBlock {
                        closing: TokenTag::RightCurly,
                        in_a_rule: false,
                    },
                );
                return true;
            }
            TokenTag::LeftBracket => {
                self.push_container(
                    ComponentTag::SimpleBlockBracket,
                    token.location,
                    Extra::None,
                    FrameKind::SimpleBlock {
                        closing: TokenTag::RightBracket,
                        in_a_rule: false,
                    },
                );
                return true;
            }
            TokenTag::LeftParen => {
                self.push_container(
                    ComponentTag::SimpleBlockParen,
                    token.location,
                    Extra::None,
                    FrameKind::SimpleBlock {
                        closing: TokenTag::RightParen,
                        in_a_rule: false,
                    },
                );
                return true;
            }

            // "<function-token>" — "Consume a function."
            TokenTag::Function => {
                self.push_container(
                    ComponentTag::Function,
                    token.location,
                    Extra::None,
                    FrameKind::Function,
                );
                return true;
            }

            // Preserved tokens.
            TokenTag::Ident => (ComponentTag::TokenIdent, Extra::None),
            TokenTag::AtKeyword => (ComponentTag::TokenAtKeyword, Extra::None),
            TokenTag::HashId => (ComponentTag::TokenHashId, Extra::None),
            TokenTag::HashUnrestricted => (ComponentTag::TokenHashUnrestricted, Extra::None),
            TokenTag::String => (ComponentTag::TokenString, Extra::None),
            TokenTag::BadString => (ComponentTag::TokenBadString, Extra::None),
            TokenTag::Url => (ComponentTag::TokenUrl, Extra::None),
            TokenTag::BadUrl => (ComponentTag::TokenBadUrl, Extra::None),
            TokenTag::Delim(c) => (ComponentTag::TokenDelim, Extra::Codepoint(c)),
            TokenTag::Integer(i) => (ComponentTag::TokenInteger, Extra::Integer(i)),
            TokenTag::Number(n) => (ComponentTag::TokenNumber, Extra::Number(n)),
            TokenTag::Percentage(p) => (ComponentTag::TokenPercentage, Extra::Number(p)),
            TokenTag::Dimension { number, unit } => {
                (ComponentTag::TokenDimension, Extra::Dimension { number, unit })
            }
            TokenTag::Whitespace => (ComponentTag::TokenWhitespace, Extra::None),
            TokenTag::Comment => (ComponentTag::TokenComment, Extra::None),
            TokenTag::Cdo => (ComponentTag::TokenCdo, Extra::None),
            TokenTag::Cdc => (ComponentTag::TokenCdc, Extra::None),
            TokenTag::Colon => (ComponentTag::TokenColon, Extra::None),
            TokenTag::Semicolon => (ComponentTag::TokenSemicolon, Extra::None),
            TokenTag::Comma => (ComponentTag::TokenComma, Extra::None),

            // An unmatched closing token is a parse error; it is preserved
            // as a delimiter so the surrounding value survives.
            TokenTag::RightCurly => (ComponentTag::TokenDelim, Extra::Codepoint('}')),
            TokenTag::RightBracket => (ComponentTag::TokenDelim, Extra::Codepoint(']')),
            TokenTag::RightParen => (ComponentTag::TokenDelim, Extra::Codepoint(')')),

            TokenTag::Eof => unreachable!("EOF is handled by every consumer"),
        };
        self.append_leaf(leaf.0, token.location, leaf.1);
        false
    }

    /// Open a `{}` block as the body of the rule on top of the stack.
    ///
    /// The rule's `extra` is pointed at the block so consumers can find the
    /// prelude/body split in O(1); closing the block also closes the rule.
    fn open_rule_body(&mut self, location: crate::tokenizer::Location) {
        let rule_index = self.top().index;
        let block_index = self.tree.len();
        self.tree.components_mut()[rule_index as usize].extra = Extra::Index(block_index);
        self.push_container(
            ComponentTag::SimpleBlockCurly,
            location,
            Extra::None,
            FrameKind::SimpleBlock {
                closing: TokenTag::RightCurly,
                in_a_rule: true,
            },
        );
    }

    /// Append a container component and push its frame.
    fn push_container(
        &mut self,
        tag: ComponentTag,
        location: crate::tokenizer::Location,
        extra: Extra,
        kind: FrameKind,
    ) {
        let index = self.tree.len();
        self.tree.components_mut().push(Component {
            tag,
            location,
            next_sibling: 0, // fixed up on pop
            extra,
        });
        self.stack.push(Frame {
            index,
            skip: 1,
            kind,
        });
    }

    /// Append a leaf component under the top frame.
    fn append_leaf(&mut self, tag: ComponentTag, location: crate::tokenizer::Location, extra: Extra) {
        let index = self.tree.len();
        self.tree.components_mut().push(Component {
            tag,
            location,
            next_sibling: index + 1,
            extra,
        });
        self.top_mut().skip += 1;
    }

    /// Pop the top frame, fixing up its container's skip pointer and folding
    /// its subtree size into the parent.
    fn pop(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        self.tree.components_mut()[frame.index as usize].next_sibling = frame.index + frame.skip;
        self.top_mut().skip += frame.skip;
    }

    fn top(&self) -> &Frame {
        self.stack.last().expect("stack always holds the root frame")
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.stack
            .last_mut()
            .expect("stack always holds the root frame")
    }

    /// The next input token, honoring one-token pushback.
    fn next(&mut self) -> Token {
        self.reconsumed
            .take()
            .unwrap_or_else(|| self.tokenizer.next_token())
    }

    /// "Reconsume the current input token."
    fn reconsume(&mut self, token: Token) {
        self.reconsumed = Some(token);
    }
}
