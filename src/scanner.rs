// A lexeme is the raw sequence of characters that forms a meaningful unit;
// a token pairs a lexeme with its type and source line.

use crate::error::Reporter;
use crate::token::{Token, TokenType, KEYWORDS};

pub struct Scanner<'r> {
    // The source is held as chars so `start` and `current` are character
    // indices; multi-byte text inside strings or comments cannot
    // desynchronise the cursor.
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: i32,
    reporter: &'r mut Reporter,
}

impl<'r> Scanner<'r> {
    pub fn new(source: &str, reporter: &'r mut Reporter) -> Self {
        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            reporter,
        }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(Token::new(TokenType::Eof, "", self.line));
        self.tokens
    }

    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            // single char
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            '-' => self.add_token(TokenType::Minus),
            '+' => self.add_token(TokenType::Plus),
            ';' => self.add_token(TokenType::Semicolon),
            '*' => self.add_token(TokenType::Star),

            // can be double char
            '!' => {
                if self.r#match('=') {
                    self.add_token(TokenType::BangEqual);
                } else {
                    self.add_token(TokenType::Bang);
                }
            }
            '=' => {
                if self.r#match('=') {
                    self.add_token(TokenType::EqualEqual);
                } else {
                    self.add_token(TokenType::Equal);
                }
            }
            '<' => {
                if self.r#match('=') {
                    self.add_token(TokenType::LessEqual);
                } else {
                    self.add_token(TokenType::Less);
                }
            }
            '>' => {
                if self.r#match('=') {
                    self.add_token(TokenType::GreaterEqual);
                } else {
                    self.add_token(TokenType::Greater);
                }
            }

            // a second slash starts a comment that runs to end of line
            '/' => {
                if self.r#match('/') {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }

            // whitespace produces no token
            ' ' | '\t' | '\r' => (),

            '\n' => {
                self.line += 1;
            }

            '"' => self.string(),

            c => {
                if c.is_ascii_digit() {
                    self.number();
                } else if c.is_alphabetic() || c == '_' {
                    self.identifier();
                } else {
                    self.reporter
                        .lex_error(self.line, Some(self.current), "Unexpected character");
                }
            }
        }
    }

    // Consume characters until the closing quote. Strings may span lines;
    // there is no escape processing.
    fn string(&mut self) {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.reporter
                .lex_error(self.line, Some(self.start + 1), "Unterminated string");
            return;
        }

        // the closing "
        self.advance();

        // trim the surrounding quotes
        let literal: String = self.source[(self.start + 1)..(self.current - 1)]
            .iter()
            .collect();

        self.add_token(TokenType::String { literal });
    }

    // One or more digits, optionally a dot followed by one or more digits.
    // `12.` stays two tokens so the dot can become a method call someday.
    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            // consume the .
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let literal: f64 = text.parse().expect("a scanned number forms a valid float");

        self.add_token(TokenType::Number { literal });
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();
        let token_type = KEYWORDS
            .get(text.as_str())
            .cloned()
            .unwrap_or(TokenType::Identifier);

        self.add_token(token_type);
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    // like advance but does not consume
    fn peek(&self) -> char {
        self.source.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.source.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn add_token(&mut self, token_type: TokenType) {
        let text: String = self.source[self.start..self.current].iter().collect();
        self.tokens.push(Token::new(token_type, &text, self.line));
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    // consume the current character only if it is the one we are looking for
    fn r#match(&mut self, expected: char) -> bool {
        if self.is_at_end() {
            return false;
        }

        if self.source[self.current] != expected {
            return false;
        }

        self.current += 1;
        true
    }
}
