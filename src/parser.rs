use crate::ast::*;
use crate::lexer::{scan_blocks, Block, BlockKind, BlockNesting};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

// Whitespace in both patterns is the ASCII set `[ \t\n\f\r]`, not Unicode `\s`.

/// `<id>: [optional ]<type> <name>[,]`
static FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([0-9]+):[ \t\n\f\r]+(optional[ \t\n\f\r]+)?([[:word:]<> \t\n\f\r]+)[ \t\n\f\r]+([[:word:]]+),?",
    )
    .expect("valid field pattern")
});

/// `<Return> <name>(<id>: <Param> <param>) (api.<verb>="<path>")[;]`
static METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"([[:word:]]+)[ \t\n\f\r]+([[:word:]]+)\(([0-9]+):[ \t\n\f\r]+([[:word:]<>]+)[ \t\n\f\r]+([[:word:]]+)\)[ \t\n\f\r]*\(api\.([[:word:]]+)="([^"]+)"\);?"#,
    )
    .expect("valid method pattern")
});

/// Best-effort extractor for the flat IDL subset.
///
/// Unrecognized text never fails the parse. Each dropped fragment is recorded and can be read
/// back through [`Parser::skipped`].
#[derive(Debug)]
pub struct Parser<'a> {
    source_text: &'a str,
    nesting: BlockNesting,
    skipped: Vec<Skipped>,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Self {
        Self {
            source_text,
            nesting: BlockNesting::default(),
            skipped: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_nesting(mut self, nesting: BlockNesting) -> Self {
        self.nesting = nesting;
        self
    }

    /// IdlFile ::= { StructBlock } and, independently, { ServiceBlock }
    pub fn parse_file(&mut self) -> IdlFile {
        let structs = scan_blocks(
            self.source_text,
            BlockKind::Struct,
            self.nesting,
            &mut self.skipped,
        );
        let records = structs.iter().map(|block| self.parse_record(block)).collect();

        let services = scan_blocks(
            self.source_text,
            BlockKind::Service,
            self.nesting,
            &mut self.skipped,
        );
        let services = services.iter().map(|block| self.parse_service(block)).collect();
        IdlFile { records, services }
    }

    pub fn parse_record(&mut self, block: &Block<'_>) -> Record {
        Record {
            name: block.name.to_string(),
            fields: scan_fields(block.body, block.body_offset, &mut self.skipped),
        }
    }

    pub fn parse_service(&mut self, block: &Block<'_>) -> ServiceDef {
        ServiceDef {
            name: block.name.to_string(),
            methods: scan_methods(block.body, block.body_offset, &mut self.skipped),
        }
    }

    /// Fragments dropped so far, in the order they were found.
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<Skipped> {
        self.skipped
    }
}

/// Parses the fields of a record body, dropping anything that does not look like a field.
pub fn parse_fields(body: &str) -> Vec<Field> {
    scan_fields(body, 0, &mut Vec::new())
}

/// Parses the annotated methods of a service body. Method spans are relative to `body`.
pub fn parse_methods(body: &str) -> Vec<Method> {
    scan_methods(body, 0, &mut Vec::new())
}

fn scan_fields(body: &str, offset: usize, skipped: &mut Vec<Skipped>) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut matched = Vec::new();

    for caps in FIELD.captures_iter(body) {
        let (Some(whole), Some(id), Some(field_type), Some(name)) =
            (caps.get(0), caps.get(1), caps.get(3), caps.get(4))
        else {
            continue;
        };
        matched.push(whole.range());
        fields.push(Field {
            id: id.as_str().parse().unwrap_or(0),
            field_type: field_type.as_str().trim().to_string(),
            name: name.as_str().to_string(),
            optional: caps.get(2).is_some_and(|m| m.as_str().trim() == "optional"),
        });
    }

    record_gaps(body, offset, &matched, SkipKind::Field, skipped);
    fields
}

fn scan_methods(body: &str, offset: usize, skipped: &mut Vec<Skipped>) -> Vec<Method> {
    let mut methods = Vec::new();
    let mut matched = Vec::new();

    for caps in METHOD.captures_iter(body) {
        let (Some(whole), Some(return_type), Some(name), Some(param_type), Some(verb), Some(path)) = (
            caps.get(0),
            caps.get(1),
            caps.get(2),
            caps.get(4),
            caps.get(6),
            caps.get(7),
        ) else {
            continue;
        };
        matched.push(whole.range());
        methods.push(Method {
            name: name.as_str().to_string(),
            return_type: return_type.as_str().to_string(),
            param_type: param_type.as_str().to_string(),
            http_verb: verb.as_str().to_string(),
            http_path: path.as_str().to_string(),
            span: offset + whole.start()..offset + whole.end(),
        });
    }

    record_gaps(body, offset, &matched, SkipKind::Method, skipped);
    methods
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == ';'
}

/// Records every non-blank line of `body` that lies outside the `matched` ranges.
fn record_gaps(
    body: &str,
    offset: usize,
    matched: &[Range<usize>],
    kind: SkipKind,
    skipped: &mut Vec<Skipped>,
) {
    let mut cursor = 0;
    let ends = matched
        .iter()
        .map(|r| (r.start, r.end))
        .chain(std::iter::once((body.len(), body.len())));

    for (start, end) in ends {
        let mut line_start = cursor;
        for line in body[cursor..start].split_inclusive('\n') {
            let trimmed = line.trim_matches(is_separator);
            if !trimmed.is_empty() {
                let lead = line.len() - line.trim_start_matches(is_separator).len();
                let from = offset + line_start + lead;
                let fragment = Skipped::new(kind, trimmed, from..from + trimmed.len());
                debug!("{} at bytes {:?}", fragment, fragment.span);
                skipped.push(fragment);
            }
            line_start += line.len();
        }
        cursor = end;
    }
}
