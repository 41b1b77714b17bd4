//! # Preprocessor
//!
//! Turns raw source text into the macro-expanded token stream the parser
//! consumes. Supports object-like and function-like macros (with `#`, `##`
//! and `__VA_ARGS__`), `#undef` and conditional inclusion. Every output token
//! records whether it was written in the file, inside a macro argument, or
//! produced by a replacement list, so diagnostics can be mapped back to the
//! invocation site.
//!
//! `#include` and other directives without an effect on the token stream are
//! skipped.

use std::collections::VecDeque;

use cdom_diagnostics::Diagnostic;
use chumsky::span::SimpleSpan;
use index_vec::IndexVec;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::lexer::{lex, TokenKind};
use crate::token::{ExpansionId, MacroDefinition, MacroExpansion, Token, TokenOrigin};
use crate::Language;

type HideSet = SmallVec<[SmolStr; 2]>;

#[derive(Debug, Clone)]
struct PpToken {
    token: Token,
    /// Macros that may not be re-expanded from this token
    hide: HideSet,
}

impl PpToken {
    fn new(token: Token) -> Self {
        Self {
            token,
            hide: HideSet::new(),
        }
    }
}

/// Result of preprocessing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessedUnit {
    /// Expanded tokens, terminated by a single `EndOfInput`
    pub tokens: Vec<Token>,
    pub expansions: IndexVec<ExpansionId, MacroExpansion>,
    /// Every `#define` in order of appearance
    pub macros: Vec<MacroDefinition>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy)]
struct Conditional {
    parent_active: bool,
    taking: bool,
    any_taken: bool,
    seen_else: bool,
    span: SimpleSpan<usize>,
}

/// Preprocess `text` for the given dialect
pub fn preprocess(text: &str, file_path: &str, language: Language) -> PreprocessedUnit {
    let _span = tracing::trace_span!("preprocess", file = file_path).entered();
    let mut preprocessor = Preprocessor::new(language);
    preprocessor.run(text);
    preprocessor.finish(text.len(), file_path)
}

struct Preprocessor {
    language: Language,
    macros: FxHashMap<SmolStr, MacroDefinition>,
    definitions: Vec<MacroDefinition>,
    expansions: IndexVec<ExpansionId, MacroExpansion>,
    conditionals: Vec<Conditional>,
    output: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl Preprocessor {
    fn new(language: Language) -> Self {
        let mut preprocessor = Self {
            language,
            macros: FxHashMap::default(),
            definitions: Vec::new(),
            expansions: IndexVec::new(),
            conditionals: Vec::new(),
            output: Vec::new(),
            diagnostics: Vec::new(),
        };
        preprocessor.predefine("__STDC__", TokenKind::Integer, "1");
        match language {
            Language::C => preprocessor.predefine("__STDC_VERSION__", TokenKind::Integer, "199901L"),
            Language::Cpp => preprocessor.predefine("__cplusplus", TokenKind::Integer, "201103L"),
        }
        preprocessor
    }

    fn predefine(&mut self, name: &str, kind: TokenKind, value: &str) {
        let definition = MacroDefinition {
            name: name.into(),
            name_span: SimpleSpan::from(0..0),
            parameters: None,
            variadic: false,
            replacement: vec![(kind, value.into())],
        };
        self.macros.insert(definition.name.clone(), definition);
    }

    fn is_active(&self) -> bool {
        self.conditionals.last().is_none_or(|c| c.taking)
    }

    /// Lex with the dialect's keyword set; `::` splits into two colons in C.
    fn dialect_tokens(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        for (kind, range) in lex(text) {
            let slice = &text[range.clone()];
            match kind.for_dialect(self.language) {
                Some(kind) => tokens.push(Token::new(kind, slice, SimpleSpan::from(range))),
                None => {
                    for offset in [range.start, range.start + 1] {
                        tokens.push(Token::new(
                            TokenKind::Colon,
                            ":",
                            SimpleSpan::from(offset..offset + 1),
                        ));
                    }
                }
            }
        }
        tokens
    }

    fn run(&mut self, text: &str) {
        let raw = self.dialect_tokens(text);
        let mut chunk = Vec::new();
        let mut at_line_start = true;
        let mut i = 0;
        while i < raw.len() {
            let token = &raw[i];
            if token.kind == TokenKind::Newline {
                at_line_start = true;
                i += 1;
                continue;
            }
            if at_line_start && token.kind == TokenKind::Hash {
                let end = raw[i..]
                    .iter()
                    .position(|t| t.kind == TokenKind::Newline)
                    .map_or(raw.len(), |p| i + p);
                let pending = std::mem::take(&mut chunk);
                self.flush(pending);
                self.directive(&raw[i..end]);
                i = end;
                continue;
            }
            at_line_start = false;
            if self.is_active() {
                chunk.push(PpToken::new(token.clone()));
            }
            i += 1;
        }
        self.flush(chunk);

        if let Some(open) = self.conditionals.last() {
            self.diagnostics.push(Diagnostic::invalid_directive(
                "Unterminated conditional directive".to_string(),
                open.span,
            ));
        }
    }

    fn flush(&mut self, chunk: Vec<PpToken>) {
        if chunk.is_empty() {
            return;
        }
        let expanded = self.expand(chunk);
        self.output.extend(expanded.into_iter().map(|t| t.token));
    }

    fn finish(mut self, len: usize, file_path: &str) -> PreprocessedUnit {
        self.output.push(Token::new(
            TokenKind::EndOfInput,
            "",
            SimpleSpan::from(len..len),
        ));
        PreprocessedUnit {
            tokens: self.output,
            expansions: self.expansions,
            macros: self.definitions,
            diagnostics: self
                .diagnostics
                .into_iter()
                .map(|d| d.with_file(file_path))
                .collect(),
        }
    }

    // ---------------------------------------------------------------------
    // Directives
    // ---------------------------------------------------------------------

    fn directive(&mut self, line: &[Token]) {
        let Some(name) = line.get(1) else {
            return;
        };
        let span = SimpleSpan::from(line[0].span.start..line[line.len() - 1].span.end);
        let rest = &line[2..];
        match name.text.as_str() {
            "ifdef" | "ifndef" => {
                let defined = rest
                    .first()
                    .is_some_and(|t| self.macros.contains_key(&t.text));
                let wanted = (name.text == "ifdef") == defined;
                self.push_conditional(|_| wanted, span);
            }
            "if" => {
                let rest = rest.to_vec();
                self.push_conditional(|pp| pp.evaluate_condition(&rest, span), span);
            }
            "elif" => {
                let rest = rest.to_vec();
                let Some(top) = self.conditionals.last().copied() else {
                    self.unbalanced("#elif", span);
                    return;
                };
                let taking = top.parent_active
                    && !top.any_taken
                    && !top.seen_else
                    && self.evaluate_condition(&rest, span);
                if let Some(top) = self.conditionals.last_mut() {
                    top.taking = taking;
                    top.any_taken |= taking;
                }
            }
            "else" => match self.conditionals.last_mut() {
                Some(top) => {
                    top.taking = top.parent_active && !top.any_taken && !top.seen_else;
                    top.any_taken = true;
                    top.seen_else = true;
                }
                None => self.unbalanced("#else", span),
            },
            "endif" => {
                if self.conditionals.pop().is_none() {
                    self.unbalanced("#endif", span);
                }
            }
            _ if !self.is_active() => {}
            "define" => self.define(rest, span),
            "undef" => match rest.first() {
                Some(t) if t.kind.is_identifier_like() => {
                    tracing::debug!(name = %t.text, "undef");
                    self.macros.remove(&t.text);
                }
                _ => self.diagnostics.push(Diagnostic::invalid_directive(
                    "Macro name missing in #undef".to_string(),
                    span,
                )),
            },
            "include" | "include_next" | "import" | "pragma" | "error" | "warning" | "line"
            | "ident" => {
                tracing::debug!(directive = %name.text, "skipping directive");
            }
            other => self.diagnostics.push(Diagnostic::invalid_directive(
                format!("Invalid preprocessing directive '#{other}'"),
                span,
            )),
        }
    }

    fn push_conditional(&mut self, condition: impl FnOnce(&mut Self) -> bool, span: SimpleSpan<usize>) {
        let parent_active = self.is_active();
        let taking = parent_active && condition(self);
        self.conditionals.push(Conditional {
            parent_active,
            taking,
            any_taken: taking,
            seen_else: false,
            span,
        });
    }

    fn unbalanced(&mut self, directive: &str, span: SimpleSpan<usize>) {
        self.diagnostics.push(Diagnostic::invalid_directive(
            format!("{directive} without #if"),
            span,
        ));
    }

    fn define(&mut self, tokens: &[Token], span: SimpleSpan<usize>) {
        let Some(name) = tokens.first().filter(|t| t.kind.is_identifier_like()) else {
            self.diagnostics.push(Diagnostic::invalid_directive(
                "Macro name missing in #define".to_string(),
                span,
            ));
            return;
        };

        let mut body_start = 1;
        let mut parameters = None;
        let mut variadic = false;
        if let Some(paren) = tokens.get(1) {
            // Only a parenthesis glued to the name starts a parameter list
            if paren.kind == TokenKind::LParen && paren.span.start == name.span.end {
                let mut names = Vec::new();
                let mut j = 2;
                loop {
                    match tokens.get(j) {
                        Some(t) if t.kind == TokenKind::RParen => {
                            j += 1;
                            break;
                        }
                        Some(t) if t.kind == TokenKind::Ellipsis => variadic = true,
                        Some(t) if t.kind == TokenKind::Comma => {}
                        Some(t) if t.kind.is_identifier_like() => names.push(t.text.clone()),
                        _ => {
                            self.diagnostics.push(Diagnostic::invalid_directive(
                                format!("Malformed parameter list for macro '{}'", name.text),
                                span,
                            ));
                            return;
                        }
                    }
                    j += 1;
                }
                parameters = Some(names);
                body_start = j;
            }
        }

        let definition = MacroDefinition {
            name: name.text.clone(),
            name_span: name.span,
            parameters,
            variadic,
            replacement: tokens[body_start..]
                .iter()
                .map(|t| (t.kind, t.text.clone()))
                .collect(),
        };
        tracing::debug!(name = %definition.name, function_like = definition.is_function_like(), "define");
        self.definitions.push(definition.clone());
        self.macros.insert(definition.name.clone(), definition);
    }

    // ---------------------------------------------------------------------
    // Expansion
    // ---------------------------------------------------------------------

    fn expand(&mut self, input: Vec<PpToken>) -> Vec<PpToken> {
        let mut queue: VecDeque<PpToken> = input.into();
        let mut out = Vec::with_capacity(queue.len());
        while let Some(token) = queue.pop_front() {
            let definition = if token.token.kind.is_identifier_like()
                && !token.hide.contains(&token.token.text)
            {
                self.macros.get(&token.token.text).cloned()
            } else {
                None
            };
            let Some(definition) = definition else {
                out.push(token);
                continue;
            };

            let replacement = if definition.is_function_like() {
                if queue.front().map(|t| t.token.kind) != Some(TokenKind::LParen) {
                    out.push(token);
                    continue;
                }
                let Some(invocation) = take_invocation(&mut queue) else {
                    self.diagnostics.push(Diagnostic::invalid_directive(
                        format!("Unterminated invocation of macro '{}'", definition.name),
                        token.token.span,
                    ));
                    out.push(token);
                    continue;
                };
                let arguments = match self.group_arguments(&definition, invocation.arguments) {
                    Ok(arguments) => arguments,
                    Err(message) => {
                        self.diagnostics.push(Diagnostic::invalid_directive(
                            message,
                            SimpleSpan::from(token.token.span.start..invocation.close.end),
                        ));
                        out.push(token);
                        continue;
                    }
                };
                let id = self.register(
                    &definition,
                    &token,
                    SimpleSpan::from(token.token.span.start..invocation.close.end),
                    Some(SimpleSpan::from(invocation.open.end..invocation.close.start)),
                );
                self.substitute(&definition, arguments, &token, id)
            } else {
                let id = self.register(&definition, &token, token.token.span, None);
                self.substitute(&definition, Vec::new(), &token, id)
            };

            for t in replacement.into_iter().rev() {
                queue.push_front(t);
            }
        }
        out
    }

    fn register(
        &mut self,
        definition: &MacroDefinition,
        name: &PpToken,
        invocation_span: SimpleSpan<usize>,
        arguments_span: Option<SimpleSpan<usize>>,
    ) -> ExpansionId {
        self.expansions.push(MacroExpansion {
            macro_name: definition.name.clone(),
            name_span: name.token.span,
            invocation_span,
            arguments_span,
            parent: name.token.origin.expansion(),
        })
    }

    /// Checks the argument count and folds variadic arguments into one slot.
    fn group_arguments(
        &self,
        definition: &MacroDefinition,
        mut arguments: Vec<Vec<PpToken>>,
    ) -> Result<Vec<Vec<PpToken>>, String> {
        let expected = definition.parameters.as_ref().map_or(0, Vec::len);
        if expected == 0 && arguments.len() == 1 && arguments[0].is_empty() {
            arguments.clear();
        }
        if definition.variadic {
            if arguments.len() < expected {
                return Err(format!(
                    "Macro '{}' requires at least {expected} arguments",
                    definition.name
                ));
            }
            let rest = arguments.split_off(expected);
            let mut joined = Vec::new();
            for (i, argument) in rest.into_iter().enumerate() {
                if i > 0 {
                    let span = argument
                        .first()
                        .map_or(SimpleSpan::from(0..0), |t| t.token.span);
                    joined.push(PpToken::new(Token::new(TokenKind::Comma, ",", span)));
                }
                joined.extend(argument);
            }
            arguments.push(joined);
        } else if arguments.len() != expected {
            return Err(format!(
                "Macro '{}' expects {expected} arguments, {} given",
                definition.name,
                arguments.len()
            ));
        }
        Ok(arguments)
    }

    fn substitute(
        &mut self,
        definition: &MacroDefinition,
        arguments: Vec<Vec<PpToken>>,
        name: &PpToken,
        id: ExpansionId,
    ) -> Vec<PpToken> {
        let invocation_span = self.expansions[id].invocation_span;
        let arguments: Vec<Vec<PpToken>> = arguments
            .into_iter()
            .map(|argument| {
                argument
                    .into_iter()
                    .map(|mut t| {
                        if t.token.origin == TokenOrigin::Source {
                            t.token.origin = TokenOrigin::MacroArgument(id);
                        }
                        t
                    })
                    .collect()
            })
            .collect();
        let mut expanded: Vec<Option<Vec<PpToken>>> = vec![None; arguments.len()];
        let body_token = |kind: TokenKind, text: &SmolStr| {
            PpToken::new(
                Token::new(kind, text.clone(), invocation_span)
                    .with_origin(TokenOrigin::MacroBody(id)),
            )
        };

        let body = &definition.replacement;
        let mut out: Vec<PpToken> = Vec::new();
        let mut i = 0;
        while i < body.len() {
            let (kind, text) = &body[i];
            let next = body.get(i + 1);

            if *kind == TokenKind::Hash && definition.is_function_like() {
                if let Some(slot) = next.and_then(|(k, t)| definition.argument_slot(*k, t)) {
                    let literal = stringify(&arguments[slot]);
                    out.push(body_token(TokenKind::String, &literal));
                    i += 2;
                    continue;
                }
            }

            if *kind == TokenKind::HashHash && !out.is_empty() {
                if let Some((next_kind, next_text)) = next {
                    let rhs = match definition.argument_slot(*next_kind, next_text) {
                        Some(slot) => arguments[slot].clone(),
                        None => vec![body_token(*next_kind, next_text)],
                    };
                    self.paste(&mut out, rhs, id, invocation_span);
                    i += 2;
                    continue;
                }
            }

            if let Some(slot) = definition.argument_slot(*kind, text) {
                let pasted = next.is_some_and(|(k, _)| *k == TokenKind::HashHash);
                if pasted {
                    out.extend(arguments[slot].iter().cloned());
                } else {
                    if expanded[slot].is_none() {
                        expanded[slot] = Some(self.expand(arguments[slot].clone()));
                    }
                    if let Some(tokens) = &expanded[slot] {
                        out.extend(tokens.iter().cloned());
                    }
                }
                i += 1;
                continue;
            }

            out.push(body_token(*kind, text));
            i += 1;
        }

        for t in &mut out {
            for hidden in name.hide.iter().chain(std::iter::once(&definition.name)) {
                if !t.hide.contains(hidden) {
                    t.hide.push(hidden.clone());
                }
            }
        }
        out
    }

    fn paste(
        &mut self,
        out: &mut Vec<PpToken>,
        rhs: Vec<PpToken>,
        id: ExpansionId,
        span: SimpleSpan<usize>,
    ) {
        let mut rhs = rhs.into_iter();
        let Some(first) = rhs.next() else {
            return;
        };
        match out.pop() {
            None => out.push(first),
            Some(lhs) => {
                let text = format!("{}{}", lhs.token.text, first.token.text);
                match self.relex_single(&text) {
                    Some(kind) => out.push(PpToken {
                        token: Token::new(kind, text, span).with_origin(TokenOrigin::MacroBody(id)),
                        hide: lhs.hide,
                    }),
                    None => {
                        self.diagnostics.push(Diagnostic::invalid_directive(
                            format!("Pasting '{}' and '{}' does not give a valid token", lhs.token.text, first.token.text),
                            span,
                        ));
                        out.push(lhs);
                        out.push(first);
                    }
                }
            }
        }
        out.extend(rhs);
    }

    fn relex_single(&self, text: &str) -> Option<TokenKind> {
        match lex(text).as_slice() {
            [(kind, range)] if *range == (0..text.len()) => kind.for_dialect(self.language),
            _ => None,
        }
    }

    // ---------------------------------------------------------------------
    // Conditional expressions
    // ---------------------------------------------------------------------

    fn evaluate_condition(&mut self, tokens: &[Token], span: SimpleSpan<usize>) -> bool {
        let mut resolved = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if token.text != "defined" {
                resolved.push(PpToken::new(token.clone()));
                i += 1;
                continue;
            }
            let (name, consumed) = match (tokens.get(i + 1), tokens.get(i + 2), tokens.get(i + 3)) {
                (Some(open), Some(name), Some(close))
                    if open.kind == TokenKind::LParen && close.kind == TokenKind::RParen =>
                {
                    (Some(name), 4)
                }
                (Some(name), _, _) if name.kind.is_identifier_like() => (Some(name), 2),
                _ => (None, 1),
            };
            let value = name.is_some_and(|n| self.macros.contains_key(&n.text));
            resolved.push(PpToken::new(Token::new(
                TokenKind::Integer,
                if value { "1" } else { "0" },
                token.span,
            )));
            i += consumed;
        }

        let expanded: Vec<Token> = self.expand(resolved).into_iter().map(|t| t.token).collect();
        match ConditionEvaluator::new(&expanded).evaluate() {
            Ok(value) => value != 0,
            Err(message) => {
                self.diagnostics
                    .push(Diagnostic::invalid_directive(message, span));
                false
            }
        }
    }
}

struct Invocation {
    open: SimpleSpan<usize>,
    close: SimpleSpan<usize>,
    arguments: Vec<Vec<PpToken>>,
}

/// Removes `( ... )` from the front of the queue, split at top-level commas.
/// Leaves the queue untouched when the parenthesis is never closed.
fn take_invocation(queue: &mut VecDeque<PpToken>) -> Option<Invocation> {
    let mut depth = 0usize;
    let mut close_index = None;
    for (index, t) in queue.iter().enumerate() {
        match t.token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    close_index = Some(index);
                    break;
                }
            }
            _ => {}
        }
    }
    let close_index = close_index?;

    let mut drained: Vec<PpToken> = queue.drain(..=close_index).collect();
    let close = drained.pop()?.token.span;
    let open = drained.first()?.token.span;

    let mut arguments = vec![Vec::new()];
    let mut depth = 0usize;
    for t in drained.into_iter().skip(1) {
        match t.token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => {
                arguments.push(Vec::new());
                continue;
            }
            _ => {}
        }
        if let Some(current) = arguments.last_mut() {
            current.push(t);
        }
    }
    Some(Invocation {
        open,
        close,
        arguments,
    })
}

fn stringify(tokens: &[PpToken]) -> SmolStr {
    let mut text = String::from("\"");
    let mut previous_end = None;
    for t in tokens {
        if previous_end.is_some_and(|end| end < t.token.span.start) {
            text.push(' ');
        }
        let quoted = matches!(
            t.token.kind,
            TokenKind::String | TokenKind::WideString | TokenKind::Char | TokenKind::WideChar
        );
        for c in t.token.text.chars() {
            if quoted && (c == '"' || c == '\\') {
                text.push('\\');
            }
            text.push(c);
        }
        previous_end = Some(t.token.span.end);
    }
    text.push('"');
    text.into()
}

/// Integer constant expressions of `#if` / `#elif`
struct ConditionEvaluator<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> ConditionEvaluator<'a> {
    const fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn evaluate(mut self) -> Result<i64, String> {
        if self.tokens.is_empty() {
            return Err("#if with no expression".to_string());
        }
        let value = self.conditional()?;
        match self.tokens.get(self.pos) {
            None => Ok(value),
            Some(t) => Err(format!("Unexpected '{}' in #if expression", t.text)),
        }
    }

    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), String> {
        if self.peek() == Some(kind) {
            self.pos += 1;
            Ok(())
        } else {
            Err(format!("Expected '{what}' in #if expression"))
        }
    }

    fn conditional(&mut self) -> Result<i64, String> {
        let condition = self.binary(1)?;
        if self.peek() != Some(TokenKind::Question) {
            return Ok(condition);
        }
        self.pos += 1;
        let positive = self.conditional()?;
        self.expect(TokenKind::Colon, ":")?;
        let negative = self.conditional()?;
        Ok(if condition != 0 { positive } else { negative })
    }

    const fn precedence(kind: TokenKind) -> Option<u8> {
        Some(match kind {
            TokenKind::OrOr => 1,
            TokenKind::AndAnd => 2,
            TokenKind::BitOr => 3,
            TokenKind::Xor => 4,
            TokenKind::Amper => 5,
            TokenKind::EqualEqual | TokenKind::NotEqual => 6,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEqual | TokenKind::GtEqual => 7,
            TokenKind::ShiftLeft | TokenKind::ShiftRight => 8,
            TokenKind::Plus | TokenKind::Minus => 9,
            TokenKind::Star | TokenKind::Divide | TokenKind::Percent => 10,
            _ => return None,
        })
    }

    fn binary(&mut self, min_precedence: u8) -> Result<i64, String> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek() {
            let Some(precedence) = Self::precedence(op) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            let rhs = self.binary(precedence + 1)?;
            lhs = match op {
                TokenKind::OrOr => i64::from(lhs != 0 || rhs != 0),
                TokenKind::AndAnd => i64::from(lhs != 0 && rhs != 0),
                TokenKind::BitOr => lhs | rhs,
                TokenKind::Xor => lhs ^ rhs,
                TokenKind::Amper => lhs & rhs,
                TokenKind::EqualEqual => i64::from(lhs == rhs),
                TokenKind::NotEqual => i64::from(lhs != rhs),
                TokenKind::Lt => i64::from(lhs < rhs),
                TokenKind::Gt => i64::from(lhs > rhs),
                TokenKind::LtEqual => i64::from(lhs <= rhs),
                TokenKind::GtEqual => i64::from(lhs >= rhs),
                TokenKind::ShiftLeft => lhs.wrapping_shl(rhs as u32),
                TokenKind::ShiftRight => lhs.wrapping_shr(rhs as u32),
                TokenKind::Plus => lhs.wrapping_add(rhs),
                TokenKind::Minus => lhs.wrapping_sub(rhs),
                TokenKind::Star => lhs.wrapping_mul(rhs),
                TokenKind::Divide | TokenKind::Percent if rhs == 0 => {
                    return Err("Division by zero in #if expression".to_string());
                }
                TokenKind::Divide => lhs.wrapping_div(rhs),
                _ => lhs.wrapping_rem(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<i64, String> {
        let Some(token) = self.tokens.get(self.pos) else {
            return Err("Unexpected end of #if expression".to_string());
        };
        self.pos += 1;
        match token.kind {
            TokenKind::Not => Ok(i64::from(self.unary()? == 0)),
            TokenKind::Minus => Ok(self.unary()?.wrapping_neg()),
            TokenKind::Plus => self.unary(),
            TokenKind::BitComplement => Ok(!self.unary()?),
            TokenKind::LParen => {
                let value = self.conditional()?;
                self.expect(TokenKind::RParen, ")")?;
                Ok(value)
            }
            TokenKind::Integer => parse_integer(&token.text)
                .ok_or_else(|| format!("Invalid integer '{}' in #if expression", token.text)),
            TokenKind::Char | TokenKind::WideChar => Ok(char_value(&token.text)),
            TokenKind::True => Ok(1),
            // Identifiers left after expansion evaluate to zero
            kind if kind.is_identifier_like() => Ok(0),
            _ => Err(format!("Unexpected '{}' in #if expression", token.text)),
        }
    }
}

/// Value of an integer literal, suffixes ignored
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()
    } else {
        digits.parse().ok()
    }
}

/// Value of a character literal such as `'a'` or `'\n'`
pub(crate) fn char_value(text: &str) -> i64 {
    let inner = text
        .trim_start_matches('L')
        .trim_start_matches('\'')
        .trim_end_matches('\'');
    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
        (Some('\\'), Some(escaped)) => match escaped {
            'n' => 10,
            't' => 9,
            'r' => 13,
            '0' => 0,
            other => other as i64,
        },
        (Some(c), _) => c as i64,
        (None, _) => 0,
    }
}
