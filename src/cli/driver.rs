use anyhow::{Context, Result};
use flowguard_solver::{
    DispatchOutcome, Dispatcher, IdentifierPath, TypeContext, TypeMismatch, Validation, Validator,
    Value,
};
use serde::Serialize;
use tracing::{debug, info_span};

use crate::cli::args::{CliArgs, ReportFormat};
use crate::cli::document::{Document, TypeBuilder, load_document};

/// One failure, rendered against the context that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: u32,
    pub name: &'static str,
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn from_session(ctx: &TypeContext, session: &Validation, first_only: bool) -> Vec<Self> {
        let limit = if first_only { 1 } else { usize::MAX };
        session
            .errors()
            .iter()
            .take(limit)
            .map(|error| {
                let mismatch = TypeMismatch::from_error(ctx, error);
                Diagnostic {
                    code: error.key.code(),
                    name: error.key.name(),
                    message: mismatch.message(),
                    path: mismatch.path,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateReport {
    pub candidate: usize,
    pub signature: String,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    Matched {
        candidate: usize,
        signature: String,
        returns: String,
    },
    NoMatch {
        rejected: Vec<CandidateReport>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallReport {
    pub call: usize,
    #[serde(flatten)]
    pub outcome: CallOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub check: usize,
    pub expected: String,
    pub passed: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// Generic name and the type recorded for it, in declaration order.
    pub recorded: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Declaration indices in the order candidates are tried.
    pub ranking: Vec<usize>,
    pub calls: Vec<CallReport>,
    pub checks: Vec<CheckReport>,
}

impl Report {
    pub fn has_failures(&self) -> bool {
        self.calls
            .iter()
            .any(|call| matches!(call.outcome, CallOutcome::NoMatch { .. }))
            || self.checks.iter().any(|check| !check.passed)
    }
}

pub fn run(args: &CliArgs) -> Result<Report> {
    let document = load_document(&args.input)?;
    run_document(&document, args.first_only)
}

/// Build every descriptor of `document` in a fresh context, then dispatch
/// its calls and run its checks.
pub fn run_document(document: &Document, first_only: bool) -> Result<Report> {
    let ctx = TypeContext::new();
    let mut builder = TypeBuilder::new(&ctx);
    builder.declare(document)?;

    let mut candidates = Vec::with_capacity(document.candidates.len());
    for (index, spec) in document.candidates.iter().enumerate() {
        let candidate = builder
            .signature(spec)
            .with_context(|| format!("in candidate {index}"))?;
        candidates.push(candidate);
    }
    let mut dispatcher = Dispatcher::new(&ctx, candidates)?;

    let mut report = Report {
        ranking: dispatcher.ranked().to_vec(),
        ..Report::default()
    };

    for (call, arguments) in document.calls.iter().enumerate() {
        let _span = info_span!("call", call).entered();
        let args = arguments
            .iter()
            .map(|arg| builder.value(arg))
            .collect::<Result<Vec<Value>>>()
            .with_context(|| format!("in call {call}"))?;
        let outcome = dispatch_call(&ctx, &mut dispatcher, &args, first_only);
        report.calls.push(CallReport { call, outcome });
    }

    let mut validator = Validator::new(&ctx);
    let root = IdentifierPath::root(ctx.intern_string("value"));
    for (check, spec) in document.checks.iter().enumerate() {
        let _span = info_span!("check", check).entered();
        let generics = builder.push_generics(&spec.generics)?;
        let built = builder.build(&spec.ty);
        builder.pop_generics(generics.len());
        let expected = built.with_context(|| format!("in check {check}"))?;
        let value = builder
            .value(&spec.value)
            .with_context(|| format!("in check {check}"))?;

        validator.begin_attempt();
        let mut session = Validation::new();
        let failed = validator.collect_errors(&mut session, &root, expected, &value);
        debug!(check, failed, "check finished");

        let recorded = generics
            .iter()
            .filter_map(|(name, slot)| {
                validator
                    .recorded(*slot)
                    .map(|ty| (name.clone(), ctx.format_type(ty)))
            })
            .collect();
        report.checks.push(CheckReport {
            check,
            expected: ctx.format_type(expected),
            passed: !failed,
            diagnostics: Diagnostic::from_session(&ctx, &session, first_only),
            recorded,
        });
    }

    Ok(report)
}

fn dispatch_call(
    ctx: &TypeContext,
    dispatcher: &mut Dispatcher<'_>,
    args: &[Value],
    first_only: bool,
) -> CallOutcome {
    match dispatcher.select(args) {
        DispatchOutcome::Matched {
            candidate,
            return_type,
        } => CallOutcome::Matched {
            candidate,
            signature: ctx.format_type(dispatcher.candidates()[candidate]),
            returns: ctx.format_type(return_type),
        },
        DispatchOutcome::NoMatch => {
            let rejected = dispatcher
                .diagnose(args)
                .into_iter()
                .map(|(candidate, session)| CandidateReport {
                    candidate,
                    signature: ctx.format_type(dispatcher.candidates()[candidate]),
                    diagnostics: Diagnostic::from_session(ctx, &session, first_only),
                })
                .collect();
            CallOutcome::NoMatch { rejected }
        }
    }
}

pub fn render(report: &Report, format: ReportFormat, show_ranking: bool) -> Result<String> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ReportFormat::Text => Ok(render_text(report, show_ranking)),
    }
}

fn render_text(report: &Report, show_ranking: bool) -> String {
    let mut out = String::new();
    if show_ranking {
        let order: Vec<String> = report.ranking.iter().map(|i| i.to_string()).collect();
        out.push_str(&format!("ranking: {}\n", order.join(", ")));
    }
    for call in &report.calls {
        match &call.outcome {
            CallOutcome::Matched {
                candidate,
                signature,
                returns,
            } => {
                out.push_str(&format!(
                    "call {}: candidate {candidate} `{signature}` returns {returns}\n",
                    call.call
                ));
            }
            CallOutcome::NoMatch { rejected } => {
                out.push_str(&format!("call {}: no matching candidate\n", call.call));
                for candidate in rejected {
                    out.push_str(&format!(
                        "  candidate {} `{}`\n",
                        candidate.candidate, candidate.signature
                    ));
                    push_diagnostics(&mut out, &candidate.diagnostics, "    ");
                }
            }
        }
    }
    for check in &report.checks {
        let status = if check.passed { "ok" } else { "failed" };
        out.push_str(&format!("check {}: {status} against {}", check.check, check.expected));
        if !check.recorded.is_empty() {
            let recorded: Vec<String> = check
                .recorded
                .iter()
                .map(|(name, ty)| format!("{name} = {ty}"))
                .collect();
            out.push_str(&format!(" ({})", recorded.join(", ")));
        }
        out.push('\n');
        push_diagnostics(&mut out, &check.diagnostics, "  ");
    }
    out
}

fn push_diagnostics(out: &mut String, diagnostics: &[Diagnostic], indent: &str) {
    for diagnostic in diagnostics {
        out.push_str(&format!(
            "{indent}{} {}: {} {}\n",
            diagnostic.name, diagnostic.code, diagnostic.path, diagnostic.message
        ));
    }
}

