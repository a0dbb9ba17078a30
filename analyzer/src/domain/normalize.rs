//! Request path normalization
//!
//! Rewrites a raw request into the template used as the grouping key. Four
//! stages run in a fixed order, each over the previous stage's output:
//!
//! | # | Stage          | Example                                      |
//! |---|----------------|----------------------------------------------|
//! | 1 | `QueryValues`  | `/a?x=1&y=abc` → `/a?x=:param&y=:param`      |
//! | 2 | `UuidSegments` | `/items/550e8400-…-446655440000` → `/items/:uuid` |
//! | 3 | `NumericSegments` | `/user/42/profile` → `/user/:id/profile`  |
//! | 4 | `NumericBeforeQuery` | `/user/42?x=:param` → `/user/:id?x=:param` |
//!
//! Query values go first so digits and hex inside them never reach the path
//! rules. Stage 4 catches a numeric segment abutting the query string, which
//! stage 3's `/`-or-end boundary does not see.
//!
//! Segment boundaries are checked without consuming the boundary character,
//! so `/1/2/3` is rewritten in a single pass and `normalize` is idempotent.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::core::constants::{PLACEHOLDER_ID, PLACEHOLDER_PARAM, PLACEHOLDER_UUID};

/// One rewrite pass of the normalizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationStage {
    /// `key=value` after `?` or `&` keeps the key, value becomes `:param`
    QueryValues,
    /// `/<8-4-4-4-12 hex>` followed by `/` or end becomes `/:uuid`
    UuidSegments,
    /// `/<digits>` followed by `/` or end becomes `/:id`
    NumericSegments,
    /// `/<digits>` followed by `?`, `&` or end becomes `/:id`
    NumericBeforeQuery,
}

/// Stages in execution order
pub const STAGES: [NormalizationStage; 4] = [
    NormalizationStage::QueryValues,
    NormalizationStage::UuidSegments,
    NormalizationStage::NumericSegments,
    NormalizationStage::NumericBeforeQuery,
];

fn query_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([?&][^?&=]*=)[^&]*").expect("valid query value regex"))
}

fn uuid_segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)/[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
            .expect("valid uuid segment regex")
    })
}

fn numeric_segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/[0-9]+").expect("valid numeric segment regex"))
}

impl NormalizationStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::QueryValues => "query_values",
            Self::UuidSegments => "uuid_segments",
            Self::NumericSegments => "numeric_segments",
            Self::NumericBeforeQuery => "numeric_before_query",
        }
    }

    /// Apply this stage alone
    pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        match self {
            Self::QueryValues => {
                query_value_re().replace_all(input, format!("${{1}}{}", PLACEHOLDER_PARAM))
            }
            Self::UuidSegments => {
                replace_segments(input, uuid_segment_re(), PLACEHOLDER_UUID, is_path_boundary)
            }
            Self::NumericSegments => {
                replace_segments(input, numeric_segment_re(), PLACEHOLDER_ID, is_path_boundary)
            }
            Self::NumericBeforeQuery => replace_segments(
                input,
                numeric_segment_re(),
                PLACEHOLDER_ID,
                is_query_boundary,
            ),
        }
    }
}

/// `/` or end of input
fn is_path_boundary(next: Option<char>) -> bool {
    matches!(next, None | Some('/'))
}

/// `?`, `&` or end of input
fn is_query_boundary(next: Option<char>) -> bool {
    matches!(next, None | Some('?') | Some('&'))
}

/// Replace every `/segment` match whose following character satisfies
/// `boundary` with `/placeholder`. The boundary character is left in place
/// so the next segment can match too.
fn replace_segments<'a>(
    input: &'a str,
    re: &Regex,
    placeholder: &str,
    boundary: fn(Option<char>) -> bool,
) -> Cow<'a, str> {
    let mut out: Option<String> = None;
    let mut last = 0;

    for m in re.find_iter(input) {
        if !boundary(input[m.end()..].chars().next()) {
            continue;
        }
        let buf = out.get_or_insert_with(|| String::with_capacity(input.len()));
        buf.push_str(&input[last..m.start()]);
        buf.push('/');
        buf.push_str(placeholder);
        last = m.end();
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&input[last..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(input),
    }
}

/// Rewrite a raw request into its normalized template
pub fn normalize(raw: &str) -> String {
    let mut current = raw.to_string();
    for stage in STAGES {
        if let Cow::Owned(rewritten) = stage.apply(&current) {
            current = rewritten;
        }
    }
    current
}

/// Output of one stage, for tracing a normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageStep {
    pub stage: NormalizationStage,
    pub output: String,
}

/// Normalize while recording the output after every stage
pub fn normalize_traced(raw: &str) -> Vec<StageStep> {
    let mut steps = Vec::with_capacity(STAGES.len());
    let mut current = raw.to_string();
    for stage in STAGES {
        current = stage.apply(&current).into_owned();
        steps.push(StageStep {
            stage,
            output: current.clone(),
        });
    }
    steps
}
