//! Block extraction: finds every `struct Name { ... }` and `service Name { ... }` in raw IDL text.
//!
//! Headers are located with a pattern match; bodies are delimited by a character scanner that
//! skips braces inside double-quoted string literals (HTTP paths such as `"/user/{id}"`).

use crate::ast::{SkipKind, Skipped};
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::Peekable;
use std::ops::Range;
use std::str::CharIndices;

// Whitespace is the ASCII set `[ \t\n\f\r]`, not Unicode `\s`.
static STRUCT_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"struct[ \t\n\f\r]+([[:word:]]+)[ \t\n\f\r]+\{")
        .expect("valid struct header pattern")
});

static SERVICE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"service[ \t\n\f\r]+([[:word:]]+)[ \t\n\f\r]+\{")
        .expect("valid service header pattern")
});

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlockKind {
    Struct,
    Service,
}

impl BlockKind {
    fn header(self) -> &'static Regex {
        match self {
            BlockKind::Struct => &*STRUCT_HEADER,
            BlockKind::Service => &*SERVICE_HEADER,
        }
    }
}

/// How the end of a block body is found.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum BlockNesting {
    /// The body ends at the first closing brace. Nested constructs truncate the block and an
    /// empty body is not a block.
    #[default]
    Flat,
    /// The body ends at the brace that balances the opening one. Empty bodies are accepted.
    Balanced,
}

/// A named block and its raw body text.
#[derive(Debug, PartialEq, Clone)]
pub struct Block<'a> {
    pub kind: BlockKind,
    pub name: &'a str,
    pub body: &'a str,
    /// Byte offset of `body` within the source.
    pub body_offset: usize,
    /// Byte range of the whole block, keyword through closing brace.
    pub span: Range<usize>,
}

/// Extracts all blocks of `kind` in source order. Blocks never overlap.
pub fn extract_blocks(source: &str, kind: BlockKind, nesting: BlockNesting) -> Vec<Block<'_>> {
    scan_blocks(source, kind, nesting, &mut Vec::new())
}

/// Like [`extract_blocks`], but records every header whose block is dropped in `skipped`.
///
/// A block is dropped when its body never closes, or when it is empty under
/// [`BlockNesting::Flat`]. The recorded span covers the header, keyword through opening brace.
pub fn scan_blocks<'a>(
    source: &'a str,
    kind: BlockKind,
    nesting: BlockNesting,
    skipped: &mut Vec<Skipped>,
) -> Vec<Block<'a>> {
    let mut blocks = Vec::new();
    let mut position = 0;

    while let Some(caps) = kind.header().captures_at(source, position) {
        // Both groups always participate in a header match.
        let (Some(header), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let body_start = header.end();
        let mut scanner = BodyScanner::new(&source[body_start..]);

        match scanner.find_close(nesting) {
            Some(close) if nesting == BlockNesting::Balanced || close > 0 => {
                let block = Block {
                    kind,
                    name: name.as_str(),
                    body: &source[body_start..body_start + close],
                    body_offset: body_start,
                    span: header.start()..body_start + close + 1,
                };
                trace!("extracted {:?} block `{}` at {:?}", kind, block.name, block.span);
                position = block.span.end;
                blocks.push(block);
            }
            _ => {
                let fragment = Skipped::new(SkipKind::Block, header.as_str(), header.range());
                debug!("{} at bytes {:?}", fragment, fragment.span);
                skipped.push(fragment);
                // Retry just past the keyword.
                position = header.start() + 1;
            }
        }
    }

    blocks
}

/// Character scanner over a block body, starting just after its opening brace.
struct BodyScanner<'a> {
    chars: Peekable<CharIndices<'a>>,
    depth: usize,
}

impl<'a> BodyScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            depth: 0,
        }
    }

    /// Returns the byte offset of the closing brace, or `None` if the input ends first.
    fn find_close(&mut self, nesting: BlockNesting) -> Option<usize> {
        while let Some((offset, c)) = self.advance() {
            match c {
                '"' => self.skip_string(),
                '{' if nesting == BlockNesting::Balanced => self.depth += 1,
                '}' if self.depth == 0 => return Some(offset),
                '}' => self.depth -= 1,
                _ => {}
            }
        }
        None
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    /// Consumes through the closing quote on the same line. A quote left open at the end of its
    /// line is an ordinary character and nothing is consumed.
    fn skip_string(&mut self) {
        let mut lookahead = self.chars.clone();
        while let Some((_, c)) = lookahead.next() {
            match c {
                '"' => {
                    self.chars = lookahead;
                    return;
                }
                '\n' => return,
                '\\' => {
                    lookahead.next_if(|&(_, escaped)| escaped != '\n');
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(source: &str, kind: BlockKind, nesting: BlockNesting) -> Vec<String> {
        extract_blocks(source, kind, nesting)
            .into_iter()
            .map(|b| b.name.to_string())
            .collect()
    }

    #[test]
    fn test_empty_source() {
        assert!(extract_blocks("", BlockKind::Struct, BlockNesting::Flat).is_empty());
        assert!(extract_blocks("", BlockKind::Service, BlockNesting::Balanced).is_empty());
    }

    #[test]
    fn test_blocks_in_source_order() {
        let source = "struct A { 1: i32 x }\nservice S { }\nstruct B { 1: string y }";
        assert_eq!(
            names(source, BlockKind::Struct, BlockNesting::Flat),
            vec!["A", "B"]
        );
        assert_eq!(
            names(source, BlockKind::Service, BlockNesting::Flat),
            vec!["S"]
        );
    }

    #[test]
    fn test_body_and_offsets() {
        let source = "struct User { 1: string name }";
        let blocks = extract_blocks(source, BlockKind::Struct, BlockNesting::Flat);
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.body, " 1: string name ");
        assert_eq!(&source[block.body_offset..block.body_offset + block.body.len()], block.body);
        assert_eq!(block.span, 0..source.len());
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert!(extract_blocks("Struct A { 1: i32 x }", BlockKind::Struct, BlockNesting::Flat)
            .is_empty());
        assert!(extract_blocks("SERVICE S { x }", BlockKind::Service, BlockNesting::Flat)
            .is_empty());
    }

    #[test]
    fn test_header_requires_whitespace_before_brace() {
        assert!(extract_blocks("struct A{ 1: i32 x }", BlockKind::Struct, BlockNesting::Flat)
            .is_empty());
    }

    #[test]
    fn test_flat_rejects_empty_body() {
        let source = "struct Empty {}\nstruct Full { 1: i32 x }";
        assert_eq!(
            names(source, BlockKind::Struct, BlockNesting::Flat),
            vec!["Full"]
        );
    }

    #[test]
    fn test_balanced_accepts_empty_body() {
        let source = "struct Empty {}\nstruct Full { 1: i32 x }";
        assert_eq!(
            names(source, BlockKind::Struct, BlockNesting::Balanced),
            vec!["Empty", "Full"]
        );
    }

    #[test]
    fn test_flat_truncates_at_inner_brace() {
        let source = "struct Outer { 1: i32 a, struct Inner { 1: i32 b } 2: i32 c }";
        let blocks = extract_blocks(source, BlockKind::Struct, BlockNesting::Flat);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "Outer");
        assert_eq!(blocks[0].body, " 1: i32 a, struct Inner { 1: i32 b ");
    }

    #[test]
    fn test_balanced_spans_inner_braces() {
        let source = "struct Outer { 1: i32 a, struct Inner { 1: i32 b } 2: i32 c }";
        let blocks = extract_blocks(source, BlockKind::Struct, BlockNesting::Balanced);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body, " 1: i32 a, struct Inner { 1: i32 b } 2: i32 c ");
    }

    #[test]
    fn test_braces_inside_strings_do_not_close() {
        let source = r#"service UserService { User getUser(1: i32 id) (api.get="/user/{id}"); }"#;
        for nesting in [BlockNesting::Flat, BlockNesting::Balanced] {
            let blocks = extract_blocks(source, BlockKind::Service, nesting);
            assert_eq!(blocks.len(), 1);
            assert!(blocks[0].body.ends_with(r#"(api.get="/user/{id}"); "#));
        }
    }

    #[test]
    fn test_unterminated_block_is_ignored() {
        let source = "struct Broken { 1: i32 x";
        assert!(extract_blocks(source, BlockKind::Struct, BlockNesting::Flat).is_empty());
        assert!(extract_blocks(source, BlockKind::Struct, BlockNesting::Balanced).is_empty());
    }

    #[test]
    fn test_dropped_blocks_are_recorded() {
        let source = "struct Empty {}\nstruct Broken { 1: i32 x";
        let mut skipped = Vec::new();
        let blocks = scan_blocks(source, BlockKind::Struct, BlockNesting::Flat, &mut skipped);
        assert!(blocks.is_empty());
        assert_eq!(
            skipped,
            vec![
                Skipped::new(SkipKind::Block, "struct Empty {", 0..14),
                Skipped::new(SkipKind::Block, "struct Broken {", 16..31),
            ]
        );
    }

    #[test]
    fn test_balanced_records_only_unterminated_blocks() {
        let source = "struct Empty {}\nstruct Broken { 1: i32 x";
        let mut skipped = Vec::new();
        let blocks = scan_blocks(source, BlockKind::Struct, BlockNesting::Balanced, &mut skipped);
        assert_eq!(blocks.len(), 1);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].text, "struct Broken {");
    }

    #[test]
    fn test_unclosed_quote_does_not_swallow_block() {
        let source = "service S { R a(1: P p) (api.get=\"/a); }\nservice T { x }";
        let mut skipped = Vec::new();
        let blocks = scan_blocks(source, BlockKind::Service, BlockNesting::Flat, &mut skipped);
        assert!(skipped.is_empty());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name, "S");
        assert_eq!(blocks[0].body, " R a(1: P p) (api.get=\"/a); ");
        assert_eq!(blocks[1].name, "T");
    }

    #[test]
    fn test_escaped_quote_stays_inside_string() {
        let source = r#"service S { R a(1: P p) (api.get="/a\"}"); }"#;
        let blocks = extract_blocks(source, BlockKind::Service, BlockNesting::Flat);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].body.ends_with(r#"(api.get="/a\"}"); "#));
    }

    #[test]
    fn test_header_whitespace_is_ascii() {
        let source = "struct\u{a0}A { 1: i32 x }\nstruct B\u{a0}{ 1: i32 y }";
        assert!(extract_blocks(source, BlockKind::Struct, BlockNesting::Flat).is_empty());
    }

    #[test]
    fn test_name_is_maximal_word_run() {
        let source = "struct User_V2 { 1: i32 x }";
        assert_eq!(
            names(source, BlockKind::Struct, BlockNesting::Flat),
            vec!["User_V2"]
        );
    }
}
