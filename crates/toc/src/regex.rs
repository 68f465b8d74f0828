// regular expressions over an arbitrary alphabet, compiled to NFAs
// grammar:
// <union>  ::= <concat> { '∪' <concat> }
// <concat> ::= <repeat> { ['⋅'] <repeat> }      (juxtaposition means concatenation)
// <repeat> ::= <atom> [ '*' ]
// <atom>   ::= <symbol> | '∅' | 'ε' | '(' <union> ')'
//
// compilation is infix -> postfix (shunting-yard with an explicit '⋅' inserted
// between juxtaposed operands), then a stack machine over NFAs

use log::{debug, trace};
use thiserror::Error;

use crate::{alphabet::Alphabet, nfa::Nfa};

pub const LEFT_PARENTHESIS: char = '(';
pub const RIGHT_PARENTHESIS: char = ')';
pub const KLEENE_STAR: char = '*';
pub const CONCATENATION: char = '⋅';
pub const UNION: char = '∪';
pub const EMPTY_SET: char = '∅';
pub const EMPTY_WORD: char = 'ε';

pub const RESERVED_SYMBOLS: [char; 7] = [
    LEFT_PARENTHESIS,
    RIGHT_PARENTHESIS,
    KLEENE_STAR,
    CONCATENATION,
    UNION,
    EMPTY_SET,
    EMPTY_WORD,
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegexError {
    #[error("alphabet contains the reserved symbol '{0}'")]
    ReservedSymbolInAlphabet(char),
    #[error("character '{0}' is neither in the alphabet nor a reserved symbol")]
    UnknownCharacter(char),
    #[error("mismatched parentheses")]
    MismatchedParentheses,
    #[error("operator '{0}' is missing an operand")]
    MissingOperand(char),
    #[error("malformed regex")]
    Malformed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Token {
    Symbol(char),
    EmptySet,
    EmptyWord,
    Union,
    Concatenation,
    Star,
    LeftParenthesis,
    RightParenthesis,
}

impl Token {
    fn from_char(c: char) -> Token {
        match c {
            LEFT_PARENTHESIS => Token::LeftParenthesis,
            RIGHT_PARENTHESIS => Token::RightParenthesis,
            KLEENE_STAR => Token::Star,
            CONCATENATION => Token::Concatenation,
            UNION => Token::Union,
            EMPTY_SET => Token::EmptySet,
            EMPTY_WORD => Token::EmptyWord,
            x => Token::Symbol(x),
        }
    }

    fn to_char(self) -> char {
        match self {
            Token::Symbol(x) => x,
            Token::EmptySet => EMPTY_SET,
            Token::EmptyWord => EMPTY_WORD,
            Token::Union => UNION,
            Token::Concatenation => CONCATENATION,
            Token::Star => KLEENE_STAR,
            Token::LeftParenthesis => LEFT_PARENTHESIS,
            Token::RightParenthesis => RIGHT_PARENTHESIS,
        }
    }

    // binary operators only, '*' goes straight to the output
    fn precedence(self) -> Option<u8> {
        match self {
            Token::Concatenation => Some(2),
            Token::Union => Some(1),
            _ => None,
        }
    }

    // can this token end an operand?
    fn ends_operand(self) -> bool {
        matches!(
            self,
            Token::Symbol(_) | Token::EmptySet | Token::EmptyWord | Token::Star | Token::RightParenthesis
        )
    }

    // can this token start an operand?
    fn starts_operand(self) -> bool {
        matches!(
            self,
            Token::Symbol(_) | Token::EmptySet | Token::EmptyWord | Token::LeftParenthesis
        )
    }
}

/// A validated regular expression. Every character of the expression is either
/// reserved or part of the alphabet, and the alphabet contains no reserved symbol.
#[derive(Debug, Clone)]
pub struct RegularExpression {
    alphabet: Alphabet,
    expression: String,
}

impl RegularExpression {
    pub fn new(alphabet: impl Into<Alphabet>, expression: impl Into<String>) -> Result<Self, RegexError> {
        let alphabet = alphabet.into();
        let expression = expression.into();

        if let Some(symbol) = alphabet.iter().find(|x| RESERVED_SYMBOLS.contains(x)) {
            return Err(RegexError::ReservedSymbolInAlphabet(symbol));
        }

        if let Some(c) = expression
            .chars()
            .find(|x| !RESERVED_SYMBOLS.contains(x) && !alphabet.contains(*x))
        {
            return Err(RegexError::UnknownCharacter(c));
        }

        Ok(RegularExpression { alphabet, expression })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    // tokens with explicit concatenation operators inserted
    pub(crate) fn tokens(&self) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::with_capacity(self.expression.len() * 2);
        for token in self.expression.chars().map(Token::from_char) {
            if let Some(previous) = tokens.last() {
                if previous.ends_operand() && token.starts_operand() {
                    tokens.push(Token::Concatenation);
                }
            }
            tokens.push(token);
        }
        tokens
    }

    pub(crate) fn postfix_tokens(&self) -> Result<Vec<Token>, RegexError> {
        let mut output: Vec<Token> = Vec::new();
        let mut operators: Vec<Token> = Vec::new();

        for token in self.tokens() {
            match token {
                Token::Symbol(_) | Token::EmptySet | Token::EmptyWord | Token::Star => output.push(token),
                Token::LeftParenthesis => operators.push(token),
                Token::RightParenthesis => loop {
                    match operators.pop() {
                        Some(Token::LeftParenthesis) => break,
                        Some(operator) => output.push(operator),
                        None => return Err(RegexError::MismatchedParentheses),
                    }
                },
                Token::Union | Token::Concatenation => {
                    let precedence = token.precedence();
                    while let Some(top) = operators.last().copied() {
                        // '(' has no precedence and stops the loop
                        if top.precedence().is_some() && top.precedence() >= precedence {
                            output.push(top);
                            operators.pop();
                        } else {
                            break;
                        }
                    }
                    operators.push(token);
                }
            }
        }

        while let Some(operator) = operators.pop() {
            if operator == Token::LeftParenthesis {
                return Err(RegexError::MismatchedParentheses);
            }
            output.push(operator);
        }

        Ok(output)
    }

    /// The expression in postfix notation, with implicit concatenations spelled out.
    pub fn postfix(&self) -> Result<String, RegexError> {
        Ok(self.postfix_tokens()?.into_iter().map(Token::to_char).collect())
    }

    pub fn derive_automaton(&self) -> Result<Nfa, RegexError> {
        let postfix = self.postfix_tokens()?;
        trace!(
            "postfix of '{}': {}",
            self.expression,
            postfix.iter().map(|x| x.to_char()).collect::<String>()
        );

        let mut stack: Vec<Nfa> = Vec::new();
        for token in postfix {
            let nfa = match token {
                Token::Symbol(c) => Nfa::symbol(self.alphabet.clone(), c),
                Token::EmptySet => Nfa::empty_set(self.alphabet.clone()),
                Token::EmptyWord => Nfa::empty_word(self.alphabet.clone()),
                Token::Star => {
                    let operand = stack.pop().ok_or(RegexError::MissingOperand(KLEENE_STAR))?;
                    operand.repeating()
                }
                Token::Union | Token::Concatenation => {
                    let missing = RegexError::MissingOperand(token.to_char());
                    let right = stack.pop().ok_or(missing.clone())?;
                    let left = stack.pop().ok_or(missing)?;
                    if token == Token::Union {
                        left.union_with(&right)
                    } else {
                        left.concat_with(&right)
                    }
                }
                // never emitted by the postfix conversion
                Token::LeftParenthesis | Token::RightParenthesis => return Err(RegexError::MismatchedParentheses),
            };
            stack.push(nfa);
        }

        let nfa = stack.pop().ok_or(RegexError::Malformed)?;
        if !stack.is_empty() {
            return Err(RegexError::Malformed);
        }

        debug!("compiled '{}' to an NFA with {} states", self.expression, nfa.num_states());
        Ok(nfa)
    }
}
