//! DSL parser and executor for adapter pipelines.
//!
//! Pipeline format (CMS Pipelines style):
//! ```text
//! PIPE MAP
//! | FILTER % 2 = 0
//! | TRANSFORM * 10
//! | REVERSE
//! ?
//! ```
//!
//! - `PIPE <source>` starts the pipeline, building a container from the input
//! - `| <stage>` continues to the next stage
//! - `?` on its own line marks the end of the pipeline
//!
//! Stage position rules:
//! - The first stage must be a source: SEQUENCE, SET, or MAP
//! - Sources cannot appear after the first stage
//! - Every stage after the source reads the previous stage's output, which is
//!   always a plain sequence
//!
//! Sources (one input entry per non-blank line):
//! - `SEQUENCE` - values in input order
//! - `SET` - ordered set of values, duplicates collapse
//! - `MAP` - `key value` pairs ordered by key, later keys overwrite
//!
//! Stages:
//! - `TRANSFORM op n` - apply integer arithmetic (`+ - * / %`) to each value
//! - `FILTER cmp v` - keep values where `value cmp v` (`= != < <= > >=`)
//! - `FILTER % m cmp v` - keep values where `value % m cmp v`
//! - `TAKE n` - keep the first n values
//! - `DROP n` / `SKIP n` - skip the first n values
//! - `REVERSE` - reverse native order (maps reverse by key)
//! - `KEYS` - keys of a map, elements of a sequence or set
//! - `VALUES` - values of a map, elements of a sequence or set
//! - Lines starting with `#` are comments
//!
//! Values are integers when they are written as a canonical `i64` (no sign
//! prefix or leading zeros), text otherwise. A FILTER operand may be quoted
//! (`FILTER = "two words"`) to force text.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::classify::{Container, ContainerKind, ReversibleView, kind_of};
use crate::error::PipelineError;
use crate::extract::Extract;
use crate::pipeline::Pipe;
use crate::stage::{Filter, Keys, Map, Reverse, Skip, Take, Values};
use crate::value::{ArithOp, CmpOp, Scalar};

/// Callback type for stage start events: `(stage_index, stage_name)`.
type StageStartCallback = Box<dyn Fn(usize, &str) + 'static>;
/// Callback type for stage complete events: `(stage_index, output_count)`.
type StageCompleteCallback = Box<dyn Fn(usize, usize) + 'static>;

/// Debug callback information for stage-by-stage execution.
#[derive(Default)]
pub struct DebugCallbacks {
    pub on_stage_start: Option<StageStartCallback>,
    pub on_stage_complete: Option<StageCompleteCallback>,
}

impl DebugCallbacks {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Debug information for a single pipeline stage execution.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugInfo {
    pub stage_name: String,
    /// Kind of the container the stage read (for a source, the kind it built).
    pub kind: ContainerKind,
    pub input_count: usize,
    pub output_count: usize,
    pub input_values: Option<Vec<Scalar>>,
    pub output_values: Option<Vec<Scalar>>,
}

impl DebugInfo {
    pub fn new(
        stage_name: String,
        kind: ContainerKind,
        input_count: usize,
        output_count: usize,
    ) -> Self {
        Self {
            stage_name,
            kind,
            input_count,
            output_count,
            input_values: None,
            output_values: None,
        }
    }

    pub fn with_values(
        stage_name: String,
        kind: ContainerKind,
        input_values: Vec<Scalar>,
        output_values: Vec<Scalar>,
    ) -> Self {
        Self {
            stage_name,
            kind,
            input_count: input_values.len(),
            output_count: output_values.len(),
            input_values: Some(input_values),
            output_values: Some(output_values),
        }
    }
}

/// Parsed pipeline command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// SEQUENCE - read input lines into a sequence
    Sequence,
    /// SET - read input lines into an ordered set
    Set,
    /// MAP - read `key value` input lines into an ordered map
    Map,
    /// TRANSFORM op n
    Transform { op: ArithOp, operand: i64 },
    /// FILTER [% m] cmp v
    Filter {
        modulus: Option<i64>,
        cmp: CmpOp,
        operand: Scalar,
    },
    /// TAKE n
    Take { n: usize },
    /// DROP n
    Drop { n: usize },
    /// REVERSE
    Reverse,
    /// KEYS
    Keys,
    /// VALUES
    Values,
}

impl Command {
    /// Can this stage be the first stage in a pipeline (source)?
    pub fn can_be_first(&self) -> bool {
        matches!(self, Command::Sequence | Command::Set | Command::Map)
    }

    /// Get the stage name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Sequence => "SEQUENCE",
            Command::Set => "SET",
            Command::Map => "MAP",
            Command::Transform { .. } => "TRANSFORM",
            Command::Filter { .. } => "FILTER",
            Command::Take { .. } => "TAKE",
            Command::Drop { .. } => "DROP",
            Command::Reverse => "REVERSE",
            Command::Keys => "KEYS",
            Command::Values => "VALUES",
        }
    }
}

/// A container built by a source stage, tagged with its runtime shape.
///
/// Each variant holds a different std collection, so applying a command
/// dispatches once on the variant and then runs the generic adapter for that
/// collection's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Sequence(Vec<Scalar>),
    Set(BTreeSet<Scalar>),
    Map(BTreeMap<Scalar, Scalar>),
}

impl Source {
    /// Build the container a source command describes from input text.
    pub fn read(cmd: &Command, input_text: &str) -> Result<Self, PipelineError> {
        let lines = input_lines(input_text);
        match cmd {
            Command::Sequence => Ok(Source::Sequence(
                lines.map(|(_, line)| Scalar::parse(line)).collect(),
            )),
            Command::Set => Ok(Source::Set(
                lines.map(|(_, line)| Scalar::parse(line)).collect(),
            )),
            Command::Map => {
                let mut map = BTreeMap::new();
                for (line_num, line) in lines {
                    let Some((key, value)) = line.split_once(char::is_whitespace) else {
                        return Err(PipelineError::Input {
                            line: line_num,
                            message: format!("expected 'key value', found '{line}'"),
                        });
                    };
                    map.insert(Scalar::parse(key), Scalar::parse(value));
                }
                Ok(Source::Map(map))
            }
            _ => Err(PipelineError::NotASource { stage: cmd.name() }),
        }
    }

    pub fn kind(&self) -> ContainerKind {
        match self {
            Source::Sequence(_) => kind_of::<Vec<Scalar>>(),
            Source::Set(_) => kind_of::<BTreeSet<Scalar>>(),
            Source::Map(_) => kind_of::<BTreeMap<Scalar, Scalar>>(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Source::Sequence(v) => v.len(),
            Source::Set(s) => s.len(),
            Source::Map(m) => m.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply one non-source command, producing the next stage's input.
    pub fn apply(&self, cmd: &Command) -> Result<Vec<Scalar>, PipelineError> {
        match self {
            Source::Sequence(v) => run_stage(v, cmd),
            Source::Set(s) => run_stage(s, cmd),
            Source::Map(m) => run_stage(m, cmd),
        }
    }

    /// Logical values in native order.
    pub fn values(&self) -> Vec<Scalar> {
        match self {
            Source::Sequence(v) => v.clone(),
            Source::Set(s) => s.pipe(Values),
            Source::Map(m) => m.pipe(Values),
        }
    }

    pub fn into_values(self) -> Vec<Scalar> {
        match self {
            Source::Sequence(v) => v,
            other => other.values(),
        }
    }
}

/// Non-blank input lines, trimmed, with 1-based line numbers.
fn input_lines(input_text: &str) -> impl Iterator<Item = (usize, &str)> {
    input_text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Run one command against any reversible container whose keys and values
/// are scalars.
fn run_stage<C, K>(container: &C, cmd: &Command) -> Result<Vec<Scalar>, PipelineError>
where
    C: Container<Kind = K> + ReversibleView + ?Sized,
    K: Extract<C, Key = Scalar, Value = Scalar>,
{
    let stage = cmd.name();
    match cmd {
        Command::Transform { op, operand } => container
            .pipe(Map(|value: &Scalar| transform(stage, *op, value, *operand)))
            .into_iter()
            .collect(),
        Command::Filter {
            modulus,
            cmp,
            operand,
        } => {
            let mut failure = None;
            let kept = container.pipe(Filter(|value: &Scalar| {
                match compare(stage, *modulus, *cmp, value, operand) {
                    Ok(keep) => keep,
                    Err(e) => {
                        failure.get_or_insert(e);
                        false
                    }
                }
            }));
            match failure {
                Some(e) => Err(e),
                None => Ok(kept),
            }
        }
        Command::Take { n } => Ok(container.pipe(Take(*n))),
        Command::Drop { n } => Ok(container.pipe(Skip(*n))),
        Command::Reverse => Ok(container.pipe(Reverse)),
        Command::Keys => Ok(container.pipe(Keys)),
        Command::Values => Ok(container.pipe(Values)),
        Command::Sequence | Command::Set | Command::Map => {
            Err(PipelineError::MisplacedSource { stage })
        }
    }
}

fn transform(
    stage: &'static str,
    op: ArithOp,
    value: &Scalar,
    operand: i64,
) -> Result<Scalar, PipelineError> {
    let Some(n) = value.as_int() else {
        return Err(PipelineError::Type {
            stage,
            message: format!("cannot apply {} to text value '{value}'", op.symbol()),
        });
    };
    op.eval(n, operand)
        .map(Scalar::from)
        .ok_or_else(|| PipelineError::Type {
            stage,
            message: format!(
                "{n} {} {operand} overflows or divides by zero",
                op.symbol()
            ),
        })
}

fn compare(
    stage: &'static str,
    modulus: Option<i64>,
    cmp: CmpOp,
    value: &Scalar,
    operand: &Scalar,
) -> Result<bool, PipelineError> {
    let lhs = match modulus {
        Some(m) => transform(stage, ArithOp::Rem, value, m)?,
        None => value.clone(),
    };
    match (&lhs, operand) {
        (Scalar::Int(a), Scalar::Int(b)) => Ok(cmp.holds(a, b)),
        (Scalar::Text(a), Scalar::Text(b)) => Ok(cmp.holds(a.as_str(), b.as_str())),
        _ => Err(PipelineError::Type {
            stage,
            message: format!(
                "cannot compare {} value '{lhs}' with {} '{operand}'",
                lhs.type_name(),
                operand.type_name()
            ),
        }),
    }
}

/// Parse DSL text into commands.
pub fn parse_commands(text: &str) -> Result<Vec<Command>, PipelineError> {
    let mut commands = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // "PIPE COMMAND" - extract command after PIPE
        let line = if line.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("PIPE ")) {
            line[5..].trim()
        } else if line.eq_ignore_ascii_case("PIPE") {
            continue;
        } else {
            line
        };

        // Continuation lines: "| COMMAND ..."
        let line = line.strip_prefix('|').unwrap_or(line).trim();

        // A trailing `?` token marks the end of the pipeline
        let line = match line.strip_suffix('?') {
            Some(head) if head.is_empty() || head.ends_with(char::is_whitespace) => head.trim_end(),
            _ => line,
        };

        if line.is_empty() {
            continue;
        }

        let cmd = parse_command(line).map_err(|message| PipelineError::Parse {
            line: line_num + 1,
            message,
        })?;
        commands.push(cmd);
    }

    Ok(commands)
}

/// Split off the first whitespace-delimited token.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.split_once(char::is_whitespace) {
        Some((token, rest)) => Some((token, rest.trim_start())),
        None => Some((s, "")),
    }
}

/// Parse a single command line.
fn parse_command(line: &str) -> Result<Command, String> {
    let (keyword, rest) = next_token(line).ok_or("Empty command")?;
    let keyword = keyword.to_uppercase();

    let no_args = |cmd: Command| {
        if rest.is_empty() {
            Ok(cmd)
        } else {
            Err(format!("{} takes no arguments", cmd.name()))
        }
    };

    match keyword.as_str() {
        "SEQUENCE" => no_args(Command::Sequence),
        "SET" => no_args(Command::Set),
        "MAP" => no_args(Command::Map),
        "TRANSFORM" => parse_transform(rest),
        "FILTER" => parse_filter(rest),
        "TAKE" => Ok(Command::Take {
            n: parse_count("TAKE", rest)?,
        }),
        "DROP" | "SKIP" => Ok(Command::Drop {
            n: parse_count("DROP", rest)?,
        }),
        "REVERSE" => no_args(Command::Reverse),
        "KEYS" => no_args(Command::Keys),
        "VALUES" => no_args(Command::Values),
        _ => Err(format!("Unknown command: {keyword}")),
    }
}

/// Parse the count argument of TAKE / DROP.
fn parse_count(stage: &str, rest: &str) -> Result<usize, String> {
    rest.trim()
        .parse()
        .map_err(|_| format!("{stage} requires a non-negative number"))
}

/// Parse TRANSFORM command.
/// Format: TRANSFORM op n
fn parse_transform(rest: &str) -> Result<Command, String> {
    let (symbol, rest) = next_token(rest).ok_or("TRANSFORM requires an operator")?;
    let op = ArithOp::from_symbol(symbol)
        .ok_or_else(|| format!("Unknown TRANSFORM operator '{symbol}'"))?;
    let operand: i64 = rest
        .trim()
        .parse()
        .map_err(|_| "TRANSFORM requires an integer operand")?;
    Ok(Command::Transform { op, operand })
}

/// Parse FILTER command.
/// Formats:
///   FILTER cmp v
///   FILTER % m cmp v
fn parse_filter(rest: &str) -> Result<Command, String> {
    let (first, after) = next_token(rest).ok_or("FILTER requires a comparison")?;

    let (modulus, rest) = if first == "%" {
        let (m, after) = next_token(after).ok_or("FILTER % requires a modulus")?;
        let m: i64 = m.parse().map_err(|_| "Invalid FILTER modulus")?;
        if m == 0 {
            return Err("FILTER modulus must not be zero".to_string());
        }
        (Some(m), after)
    } else {
        (None, rest)
    };

    let (symbol, operand) = next_token(rest).ok_or("FILTER requires a comparison")?;
    let cmp = CmpOp::from_symbol(symbol)
        .ok_or_else(|| format!("Unknown FILTER comparison '{symbol}'"))?;
    let operand = parse_operand(operand)?;

    Ok(Command::Filter {
        modulus,
        cmp,
        operand,
    })
}

/// Parse a FILTER operand: a quoted string is always text.
fn parse_operand(s: &str) -> Result<Scalar, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("FILTER requires a value to compare with".to_string());
    }
    if let Some(quoted) = s.strip_prefix('"') {
        return match quoted.find('"') {
            Some(end) if quoted[end + 1..].trim().is_empty() => {
                Ok(Scalar::Text(quoted[..end].to_string()))
            }
            Some(_) => Err("Unexpected text after quoted value".to_string()),
            None => Err("Unclosed quote".to_string()),
        };
    }
    Ok(Scalar::parse(s))
}

/// Check pipeline shape and split it into source and stages.
fn validate(commands: &[Command]) -> Result<(&Command, &[Command]), PipelineError> {
    let (first, rest) = commands.split_first().ok_or(PipelineError::Empty)?;

    // Need at least 2 stages (source and something to transform it)
    if rest.is_empty() {
        return Err(PipelineError::TooShort);
    }

    if !first.can_be_first() {
        return Err(PipelineError::NotASource {
            stage: first.name(),
        });
    }

    if let Some(misplaced) = rest.iter().find(|cmd| cmd.can_be_first()) {
        return Err(PipelineError::MisplacedSource {
            stage: misplaced.name(),
        });
    }

    Ok((first, rest))
}

/// Apply stage commands to a source, chaining each result into the next.
fn apply_commands(source: Source, commands: &[Command]) -> Result<Vec<Scalar>, PipelineError> {
    let mut current = source;

    for cmd in commands {
        let output = current.apply(cmd)?;
        debug!(
            stage = cmd.name(),
            kind = %current.kind(),
            input = current.len(),
            output = output.len(),
            "stage complete"
        );
        current = Source::Sequence(output);
    }

    Ok(current.into_values())
}

fn format_output(values: &[Scalar]) -> String {
    values
        .iter()
        .map(Scalar::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Execute a pipeline defined by DSL text on input text.
///
/// Returns (output_text, input_count, output_count) on success.
pub fn execute_pipeline(
    input_text: &str,
    pipeline_text: &str,
) -> Result<(String, usize, usize), PipelineError> {
    let commands = parse_commands(pipeline_text)?;
    let (first, remaining) = validate(&commands)?;

    let source = Source::read(first, input_text)?;
    let input_count = source.len();
    debug!(
        source = first.name(),
        kind = %source.kind(),
        entries = input_count,
        "source read"
    );

    let output = apply_commands(source, remaining)?;
    let output_count = output.len();

    Ok((format_output(&output), input_count, output_count))
}

/// Execute a pipeline with debug callbacks for stage-by-stage inspection.
///
/// Returns (output_text, input_count, output_count, debug_info) on success.
/// Value snapshots are only captured when callbacks are supplied.
pub fn execute_pipeline_debug(
    input_text: &str,
    pipeline_text: &str,
    debug: &Option<DebugCallbacks>,
) -> Result<(String, usize, usize, Vec<DebugInfo>), PipelineError> {
    let commands = parse_commands(pipeline_text)?;
    let (first, remaining) = validate(&commands)?;

    let notify_start = |idx: usize, name: &str| {
        if let Some(debug) = debug
            && let Some(on_start) = &debug.on_stage_start
        {
            on_start(idx, name);
        }
    };
    let notify_complete = |idx: usize, count: usize| {
        if let Some(debug) = debug
            && let Some(on_complete) = &debug.on_stage_complete
        {
            on_complete(idx, count);
        }
    };

    let mut debug_info: Vec<DebugInfo> = Vec::new();

    // Stage 0: the source
    notify_start(0, first.name());
    let mut current = Source::read(first, input_text)?;
    let input_count = current.len();
    notify_complete(0, input_count);
    debug_info.push(if debug.is_some() {
        DebugInfo::with_values(
            first.name().to_string(),
            current.kind(),
            vec![],
            current.values(),
        )
    } else {
        DebugInfo::new(first.name().to_string(), current.kind(), 0, input_count)
    });

    for (idx, cmd) in remaining.iter().enumerate() {
        let idx = idx + 1;
        notify_start(idx, cmd.name());

        let output = current.apply(cmd)?;
        notify_complete(idx, output.len());
        debug!(
            stage = cmd.name(),
            kind = %current.kind(),
            input = current.len(),
            output = output.len(),
            "stage complete"
        );

        debug_info.push(if debug.is_some() {
            DebugInfo::with_values(
                cmd.name().to_string(),
                current.kind(),
                current.values(),
                output.clone(),
            )
        } else {
            DebugInfo::new(
                cmd.name().to_string(),
                current.kind(),
                current.len(),
                output.len(),
            )
        });

        current = Source::Sequence(output);
    }

    let output = current.into_values();
    let output_count = output.len();
    Ok((format_output(&output), input_count, output_count, debug_info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;

    const NUMBERS: &str = "1\n2\n3\n4\n5\n";
    const DICTIONARY: &str = "first 0\nsecond 1\nthird 2\nfourth 3\nfifth 5\n";

    fn run(input: &str, pipeline: &str) -> String {
        execute_pipeline(input, pipeline).unwrap().0
    }

    // --- Parsing ---

    #[test]
    fn test_parse_transform() {
        let cmds = parse_commands("TRANSFORM * 2").unwrap();
        assert_eq!(
            cmds,
            vec![Command::Transform {
                op: ArithOp::Mul,
                operand: 2
            }]
        );
    }

    #[test]
    fn test_parse_filter_modulus() {
        let cmds = parse_commands("FILTER % 2 = 0").unwrap();
        assert_eq!(
            cmds,
            vec![Command::Filter {
                modulus: Some(2),
                cmp: CmpOp::Eq,
                operand: Scalar::Int(0)
            }]
        );
    }

    #[test]
    fn test_parse_filter_quoted() {
        let cmds = parse_commands("FILTER != \"two words\"").unwrap();
        assert_eq!(
            cmds,
            vec![Command::Filter {
                modulus: None,
                cmp: CmpOp::Ne,
                operand: Scalar::from("two words")
            }]
        );
    }

    #[test]
    fn test_parse_filter_errors() {
        assert!(parse_commands("FILTER % 0 = 1").is_err());
        assert!(parse_commands("FILTER ~ 3").is_err());
        assert!(parse_commands("FILTER =").is_err());
        assert!(parse_commands("FILTER = \"open").is_err());
    }

    #[test]
    fn test_parse_take_and_drop() {
        let cmds = parse_commands("TAKE 3\nDROP 2\nskip 1").unwrap();
        assert_eq!(
            cmds,
            vec![
                Command::Take { n: 3 },
                Command::Drop { n: 2 },
                Command::Drop { n: 1 }
            ]
        );
        assert!(parse_commands("TAKE -1").is_err());
        assert!(parse_commands("TAKE").is_err());
    }

    #[test]
    fn test_parse_pipe_syntax() {
        let text = "# doubled values\nPIPE MAP\n| TRANSFORM * 2\n| VALUES\n?\n";
        let cmds = parse_commands(text).unwrap();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[0], Command::Map);
        assert_eq!(cmds[2], Command::Values);
    }

    #[test]
    fn test_parse_end_marker_only_as_token() {
        let cmds = parse_commands("PIPE SEQUENCE\n| TAKE 2 ?\n| FILTER = what?").unwrap();
        assert_eq!(
            cmds,
            vec![
                Command::Sequence,
                Command::Take { n: 2 },
                Command::Filter {
                    modulus: None,
                    cmp: CmpOp::Eq,
                    operand: Scalar::from("what?")
                }
            ]
        );
    }

    #[test]
    fn test_execute_operand_ending_in_question_mark() {
        let (out, input_count, output_count) =
            execute_pipeline("what?\nwhat\n", "PIPE SEQUENCE\n| FILTER = what?").unwrap();
        assert_eq!(out, "what?");
        assert_eq!(input_count, 2);
        assert_eq!(output_count, 1);
    }

    #[test]
    fn test_parse_case_insensitive() {
        let cmds = parse_commands("pipe set\n| reverse\n| Keys").unwrap();
        assert_eq!(cmds, vec![Command::Set, Command::Reverse, Command::Keys]);
    }

    #[test]
    fn test_parse_unknown_command_reports_line() {
        let err = parse_commands("PIPE SEQUENCE\n\n| FROB 3").unwrap_err();
        assert_eq!(
            err,
            PipelineError::Parse {
                line: 3,
                message: "Unknown command: FROB".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_extra_arguments() {
        assert!(parse_commands("REVERSE 3").is_err());
        assert!(parse_commands("SET x").is_err());
    }

    // --- Structure ---

    #[test]
    fn test_empty_pipeline() {
        assert_eq!(
            execute_pipeline(NUMBERS, "# nothing\n").unwrap_err(),
            PipelineError::Empty
        );
    }

    #[test]
    fn test_source_only_is_too_short() {
        assert_eq!(
            execute_pipeline(NUMBERS, "PIPE SEQUENCE").unwrap_err(),
            PipelineError::TooShort
        );
    }

    #[test]
    fn test_pipeline_requires_source_first() {
        assert_eq!(
            execute_pipeline(NUMBERS, "PIPE TAKE 2\n| REVERSE").unwrap_err(),
            PipelineError::NotASource { stage: "TAKE" }
        );
    }

    #[test]
    fn test_source_cannot_be_in_middle() {
        assert_eq!(
            execute_pipeline(NUMBERS, "PIPE SEQUENCE\n| SET\n| TAKE 1").unwrap_err(),
            PipelineError::MisplacedSource { stage: "SET" }
        );
    }

    // --- Sources ---

    #[test]
    fn test_read_sequence_keeps_order_and_duplicates() {
        let source = Source::read(&Command::Sequence, "3\n1\n\n3\n").unwrap();
        assert_eq!(
            source,
            Source::Sequence(vec![Scalar::Int(3), Scalar::Int(1), Scalar::Int(3)])
        );
        assert_eq!(source.kind(), ContainerKind::Sequential);
    }

    #[test]
    fn test_read_set_sorts_and_dedups() {
        let source = Source::read(&Command::Set, "3\n1\n3\n").unwrap();
        assert_eq!(source.values(), vec![Scalar::Int(1), Scalar::Int(3)]);
        assert_eq!(source.kind(), ContainerKind::SetLike);
    }

    #[test]
    fn test_read_map_orders_by_key() {
        let source = Source::read(&Command::Map, DICTIONARY).unwrap();
        assert_eq!(source.kind(), ContainerKind::MapLike);
        assert_eq!(source.len(), 5);
        assert_eq!(
            source.values(),
            vec![5, 0, 3, 1, 2]
                .into_iter()
                .map(Scalar::Int)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_read_map_later_key_wins() {
        let source = Source::read(&Command::Map, "a 1\na 2\n").unwrap();
        assert_eq!(source.values(), vec![Scalar::Int(2)]);
    }

    #[test]
    fn test_read_map_keeps_leading_zero_keys_distinct() {
        let (out, input_count, output_count) =
            execute_pipeline("1 a\n01 b\n007 c\n", "PIPE MAP\n| KEYS").unwrap();
        assert_eq!(out, "1\n007\n01");
        assert_eq!(input_count, 3);
        assert_eq!(output_count, 3);
    }

    #[test]
    fn test_read_empty_input() {
        let source = Source::read(&Command::Set, "\n  \n").unwrap();
        assert!(source.is_empty());
        assert_eq!(source.len(), 0);
    }

    #[test]
    fn test_read_map_requires_pairs() {
        let err = Source::read(&Command::Map, "a 1\nlonely\n").unwrap_err();
        assert_eq!(
            err,
            PipelineError::Input {
                line: 2,
                message: "expected 'key value', found 'lonely'".to_string()
            }
        );
    }

    // --- Execution ---

    #[test]
    fn test_execute_sequence_transform() {
        let (out, input_count, output_count) =
            execute_pipeline(NUMBERS, "PIPE SEQUENCE\n| TRANSFORM * 2").unwrap();
        assert_eq!(out, "2\n4\n6\n8\n10");
        assert_eq!(input_count, 5);
        assert_eq!(output_count, 5);
    }

    #[test]
    fn test_execute_set_filter() {
        assert_eq!(run("5\n4\n3\n2\n1\n2\n", "PIPE SET\n| FILTER % 2 = 0"), "2\n4");
    }

    #[test]
    fn test_execute_map_stages() {
        assert_eq!(run(DICTIONARY, "PIPE MAP\n| TRANSFORM * 2"), "10\n0\n6\n2\n4");
        assert_eq!(run(DICTIONARY, "PIPE MAP\n| TAKE 3"), "5\n0\n3");
        assert_eq!(run(DICTIONARY, "PIPE MAP\n| DROP 3"), "1\n2");
        assert_eq!(
            run(DICTIONARY, "PIPE MAP\n| KEYS"),
            "fifth\nfirst\nfourth\nsecond\nthird"
        );
        assert_eq!(run(DICTIONARY, "PIPE MAP\n| VALUES"), "5\n0\n3\n1\n2");
        assert_eq!(run(DICTIONARY, "PIPE MAP\n| REVERSE"), "2\n1\n3\n0\n5");
    }

    #[test]
    fn test_execute_chain_keys_then_text_filter() {
        let out = run(DICTIONARY, "PIPE MAP\n| KEYS\n| FILTER >= \"s\"\n| REVERSE");
        assert_eq!(out, "third\nsecond");
    }

    #[test]
    fn test_execute_empty_input() {
        let (out, input_count, output_count) =
            execute_pipeline("", "PIPE MAP\n| KEYS").unwrap();
        assert_eq!(out, "");
        assert_eq!(input_count, 0);
        assert_eq!(output_count, 0);
    }

    #[test]
    fn test_transform_text_is_type_error() {
        let err = execute_pipeline(DICTIONARY, "PIPE MAP\n| KEYS\n| TRANSFORM + 1").unwrap_err();
        assert_eq!(
            err,
            PipelineError::Type {
                stage: "TRANSFORM",
                message: "cannot apply + to text value 'fifth'".to_string()
            }
        );
    }

    #[test]
    fn test_transform_divide_by_zero() {
        let err = execute_pipeline(NUMBERS, "PIPE SEQUENCE\n| TRANSFORM / 0").unwrap_err();
        assert!(matches!(err, PipelineError::Type { stage: "TRANSFORM", .. }));
    }

    #[test]
    fn test_filter_mixed_types_is_type_error() {
        let err = execute_pipeline("1\nabc\n", "PIPE SEQUENCE\n| FILTER > 0").unwrap_err();
        assert_eq!(
            err,
            PipelineError::Type {
                stage: "FILTER",
                message: "cannot compare text value 'abc' with integer '0'".to_string()
            }
        );
    }

    // --- Debug execution ---

    #[test]
    fn test_debug_info_new() {
        let info = DebugInfo::new("TAKE".to_string(), ContainerKind::MapLike, 5, 3);
        assert_eq!(info.stage_name, "TAKE");
        assert_eq!(info.input_count, 5);
        assert_eq!(info.output_count, 3);
        assert!(info.input_values.is_none());
        assert!(info.output_values.is_none());
    }

    #[test]
    fn test_execute_pipeline_debug_without_callbacks() {
        let (out, _, _, info) =
            execute_pipeline_debug(DICTIONARY, "PIPE MAP\n| TAKE 2\n| REVERSE", &None).unwrap();
        assert_eq!(out, "0\n5");
        assert_eq!(info.len(), 3);
        assert_eq!(info[0].stage_name, "MAP");
        assert_eq!(info[0].kind, ContainerKind::MapLike);
        assert_eq!(info[0].output_count, 5);
        assert_eq!(info[1].kind, ContainerKind::MapLike);
        assert_eq!(info[1].output_count, 2);
        assert_eq!(info[2].kind, ContainerKind::Sequential);
        assert!(info[2].output_values.is_none());
    }

    #[test]
    fn test_execute_pipeline_debug_with_callbacks() {
        let events: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let starts = Rc::clone(&events);
        let completes = Rc::clone(&events);
        let callbacks = DebugCallbacks {
            on_stage_start: Some(Box::new(move |idx: usize, name: &str| {
                starts.borrow_mut().push(format!("start {idx} {name}"));
            })),
            on_stage_complete: Some(Box::new(move |idx: usize, count: usize| {
                completes.borrow_mut().push(format!("done {idx} {count}"));
            })),
        };

        let (_, _, _, info) =
            execute_pipeline_debug(NUMBERS, "PIPE SET\n| DROP 3", &Some(callbacks)).unwrap();

        assert_eq!(
            *events.borrow(),
            vec!["start 0 SET", "done 0 5", "start 1 DROP", "done 1 2"]
        );
        assert_eq!(
            info[1].output_values,
            Some(vec![Scalar::Int(4), Scalar::Int(5)])
        );
        assert_eq!(info[1].input_values.as_ref().map(Vec::len), Some(5));
    }

    #[test]
    fn test_debug_matches_plain_execution() {
        let pipeline = "PIPE MAP\n| FILTER % 2 = 1\n| TRANSFORM + 100\n| REVERSE";
        let (plain, _, _) = execute_pipeline(DICTIONARY, pipeline).unwrap();
        let (debugged, _, _, _) =
            execute_pipeline_debug(DICTIONARY, pipeline, &Some(DebugCallbacks::new())).unwrap();
        assert_eq!(plain, debugged);
        assert_eq!(plain, "101\n103\n105");
    }

    // --- Pipeline files under specs/ ---

    fn run_spec(pipe: &str, data: &str) -> String {
        let spec_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("specs");
        let input = fs::read_to_string(spec_dir.join(data)).unwrap();
        let pipeline = fs::read_to_string(spec_dir.join(pipe)).unwrap();
        run(&input, &pipeline)
    }

    macro_rules! spec_test {
        ($name:ident, $pipe:expr, $data:expr, $expected:expr) => {
            #[test]
            fn $name() {
                assert_eq!(run_spec($pipe, $data), $expected);
            }
        };
    }

    spec_test!(spec_double_sequence, "double-sequence.pipe", "numbers.data", "2\n4\n6\n8\n10");
    spec_test!(spec_even_set, "even-set.pipe", "numbers.data", "2\n4");
    spec_test!(spec_double_map, "double-map.pipe", "dictionary.data", "10\n0\n6\n2\n4");
    spec_test!(spec_map_take, "map-take.pipe", "dictionary.data", "5\n0\n3");
    spec_test!(spec_map_drop, "map-drop.pipe", "dictionary.data", "1\n2");
    spec_test!(
        spec_map_keys,
        "map-keys.pipe",
        "dictionary.data",
        "fifth\nfirst\nfourth\nsecond\nthird"
    );
    spec_test!(spec_map_values, "map-values.pipe", "dictionary.data", "5\n0\n3\n1\n2");
    spec_test!(spec_map_reverse, "map-reverse.pipe", "dictionary.data", "2\n1\n3\n0\n5");
    spec_test!(spec_last_keys, "last-keys.pipe", "dictionary.data", "third\nsecond");
    spec_test!(spec_reverse_twice, "reverse-twice.pipe", "numbers.data", "1\n2\n3\n4\n5");
}
