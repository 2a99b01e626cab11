//! # Script Runner
//!
//! Replays a JSON list of steps against a dual document and reports the
//! outcome of each step.
//!
//! Steps address nodes through named bindings. The root block is always
//! bound as `root`; creation steps bind the new node under `bind`, search
//! steps bind their results as `bind.0`, `bind.1`, ... Scripts cannot bind
//! `root` or a `name.N` key themselves.
//!
//! ```json
//! { "steps": [
//!     { "op": "add_block", "name": "VirtualHost", "parameters": ["*:80"], "bind": "vhost" },
//!     { "op": "add_directive", "parent": "vhost", "name": "ServerName", "parameters": ["a.example"] },
//!     { "op": "find_directives", "name": "servername", "expect": 1 },
//!     { "op": "save", "message": "add vhost" },
//!     { "op": "unsaved_files", "expect": 0 }
//! ] }
//! ```
//!
//! The run stops at the first step that diverges, fails in a backend, or
//! returns an unexpected number of results.

use crate::config::{BackendKind, HarnessSettings};
use crate::error::HarnessError;
use dualparse_core::{
    ArenaBlock, BlockNode, DEFAULT_EXACT, DEFAULT_EXCLUDE, DirectiveParams, DualBlock, DualChild,
    DualError, DualNode, KeyedBlock, MatchPolicy, PassBlock,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Binding name of the root block.
pub const ROOT: &str = "root";

// =============================================================================
// SCRIPT FORMAT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(text: &str) -> Result<Self, HarnessError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let text = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

fn root() -> String {
    ROOT.to_string()
}

fn default_exclude() -> bool {
    DEFAULT_EXCLUDE
}

fn default_exact() -> bool {
    DEFAULT_EXACT
}

/// One operation of a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    AddBlock {
        #[serde(default = "root")]
        parent: String,
        name: String,
        #[serde(default)]
        parameters: Vec<String>,
        #[serde(default)]
        position: Option<usize>,
        #[serde(default)]
        bind: Option<String>,
    },
    AddDirective {
        #[serde(default = "root")]
        parent: String,
        name: String,
        #[serde(default)]
        parameters: Vec<String>,
        #[serde(default)]
        position: Option<usize>,
        #[serde(default)]
        bind: Option<String>,
    },
    AddComment {
        #[serde(default = "root")]
        parent: String,
        comment: String,
        #[serde(default)]
        position: Option<usize>,
        #[serde(default)]
        bind: Option<String>,
    },
    SetParameters {
        target: String,
        parameters: Vec<String>,
    },
    FindBlocks {
        #[serde(default = "root")]
        parent: String,
        name: String,
        #[serde(default = "default_exclude")]
        exclude: bool,
        #[serde(default)]
        expect: Option<usize>,
        #[serde(default)]
        bind: Option<String>,
    },
    FindDirectives {
        #[serde(default = "root")]
        parent: String,
        name: String,
        #[serde(default = "default_exclude")]
        exclude: bool,
        #[serde(default)]
        expect: Option<usize>,
        #[serde(default)]
        bind: Option<String>,
    },
    FindComments {
        #[serde(default = "root")]
        parent: String,
        comment: String,
        #[serde(default = "default_exact")]
        exact: bool,
        #[serde(default)]
        expect: Option<usize>,
        #[serde(default)]
        bind: Option<String>,
    },
    /// Delete `target` from `parent`. The binding is consumed once the delete succeeds.
    Delete {
        #[serde(default = "root")]
        parent: String,
        target: String,
    },
    Save {
        #[serde(default)]
        message: String,
    },
    UnsavedFiles {
        #[serde(default)]
        expect: Option<usize>,
    },
}

impl Step {
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::AddBlock { .. } => "add_block",
            Self::AddDirective { .. } => "add_directive",
            Self::AddComment { .. } => "add_comment",
            Self::SetParameters { .. } => "set_parameters",
            Self::FindBlocks { .. } => "find_blocks",
            Self::FindDirectives { .. } => "find_directives",
            Self::FindComments { .. } => "find_comments",
            Self::Delete { .. } => "delete",
            Self::Save { .. } => "save",
            Self::UnsavedFiles { .. } => "unsaved_files",
        }
    }

    /// Name the step binds its result under, if any.
    #[must_use]
    pub fn bind(&self) -> Option<&str> {
        match self {
            Self::AddBlock { bind, .. }
            | Self::AddDirective { bind, .. }
            | Self::AddComment { bind, .. }
            | Self::FindBlocks { bind, .. }
            | Self::FindDirectives { bind, .. }
            | Self::FindComments { bind, .. } => bind.as_deref(),
            Self::SetParameters { .. }
            | Self::Delete { .. }
            | Self::Save { .. }
            | Self::UnsavedFiles { .. } => None,
        }
    }
}

/// Check that `name` may be bound by a script step.
///
/// `root` and names of the form `name.N` belong to the runner.
fn check_bind_name(name: &str) -> Result<(), &'static str> {
    if name == ROOT {
        return Err("is reserved for the root block");
    }
    let search_result = name
        .rsplit_once('.')
        .is_some_and(|(_, n)| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    if search_result {
        return Err("is reserved for search results");
    }
    Ok(())
}

// =============================================================================
// REPORT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Ok,
    /// The backends disagreed.
    Diverged,
    /// A backend rejected the operation.
    BackendFailed,
    /// The result count differs from `expect`.
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub index: usize,
    pub op: String,
    pub status: StepStatus,
    /// Nodes created or found, files unsaved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub primary: BackendKind,
    pub secondary: BackendKind,
    pub match_policy: MatchPolicy,
    pub steps: Vec<StepReport>,
    /// All steps ran and none failed.
    pub passed: bool,
}

impl RunReport {
    fn new(settings: &HarnessSettings) -> Self {
        Self {
            primary: settings.primary,
            secondary: settings.secondary,
            match_policy: settings.match_policy,
            steps: Vec::new(),
            passed: false,
        }
    }

    /// The step that stopped the run, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&StepReport> {
        self.steps.iter().find(|step| step.status != StepStatus::Ok)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "primary={} secondary={} match_policy={:?}",
            self.primary, self.secondary, self.match_policy
        )?;
        for step in &self.steps {
            write!(f, "  [{:>3}] {:<16} {:?}", step.index, step.op, step.status)?;
            if let Some(count) = step.count {
                write!(f, " count={count}")?;
            }
            if let Some(detail) = &step.detail {
                write!(f, " {detail}")?;
            }
            writeln!(f)?;
        }
        write!(f, "{}", if self.passed { "PASSED" } else { "FAILED" })
    }
}

// =============================================================================
// RUNNER
// =============================================================================

/// Why a step did not complete.
enum Failure {
    UnknownBinding(String),
    BindingKind(String, &'static str),
    InvalidBinding(String, &'static str),
    Dual(DualError),
    Count { expected: usize, actual: usize },
}

impl From<DualError> for Failure {
    fn from(err: DualError) -> Self {
        Self::Dual(err)
    }
}

fn check_count(expect: Option<usize>, actual: usize) -> Result<Option<usize>, Failure> {
    match expect {
        Some(expected) if expected != actual => Err(Failure::Count { expected, actual }),
        _ => Ok(Some(actual)),
    }
}

struct Runner<P: BlockNode, S: BlockNode> {
    bindings: BTreeMap<String, DualChild<P, S>>,
}

impl<P: BlockNode, S: BlockNode> Runner<P, S> {
    fn new(settings: &HarnessSettings) -> Result<Self, DualError> {
        let mut params = DirectiveParams::new(ROOT);
        params.filepath.clone_from(&settings.filepath);
        let root = DualBlock::new(&params)?.with_policy(settings.match_policy);

        let mut bindings = BTreeMap::new();
        bindings.insert(ROOT.to_string(), DualChild::Block(root));
        Ok(Self { bindings })
    }

    fn block(&self, name: &str) -> Result<&DualBlock<P, S>, Failure> {
        match self.bindings.get(name) {
            Some(DualChild::Block(block)) => Ok(block),
            Some(_) => Err(Failure::BindingKind(name.to_string(), "block")),
            None => Err(Failure::UnknownBinding(name.to_string())),
        }
    }

    fn block_mut(&mut self, name: &str) -> Result<&mut DualBlock<P, S>, Failure> {
        match self.bindings.get_mut(name) {
            Some(DualChild::Block(block)) => Ok(block),
            Some(_) => Err(Failure::BindingKind(name.to_string(), "block")),
            None => Err(Failure::UnknownBinding(name.to_string())),
        }
    }

    fn bind(&mut self, name: Option<&String>, node: impl Into<DualChild<P, S>>) {
        if let Some(name) = name {
            self.bindings.insert(name.clone(), node.into());
        }
    }

    fn bind_all<N: Into<DualChild<P, S>>>(&mut self, name: Option<&String>, nodes: Vec<N>) {
        if let Some(name) = name {
            for (i, node) in nodes.into_iter().enumerate() {
                self.bindings.insert(format!("{name}.{i}"), node.into());
            }
        }
    }

    /// Execute one step and return its result count.
    fn execute(&mut self, step: &Step) -> Result<Option<usize>, Failure> {
        if let Some(name) = step.bind() {
            check_bind_name(name)
                .map_err(|reason| Failure::InvalidBinding(name.to_string(), reason))?;
        }
        match step {
            Step::AddBlock {
                parent,
                name,
                parameters,
                position,
                bind,
            } => {
                let node = self
                    .block_mut(parent)?
                    .add_child_block(name, parameters.clone(), *position)?;
                self.bind(bind.as_ref(), node);
                Ok(Some(1))
            }
            Step::AddDirective {
                parent,
                name,
                parameters,
                position,
                bind,
            } => {
                let node = self
                    .block_mut(parent)?
                    .add_child_directive(name, parameters.clone(), *position)?;
                self.bind(bind.as_ref(), node);
                Ok(Some(1))
            }
            Step::AddComment {
                parent,
                comment,
                position,
                bind,
            } => {
                let node = self.block_mut(parent)?.add_child_comment(comment, *position)?;
                self.bind(bind.as_ref(), node);
                Ok(Some(1))
            }
            Step::SetParameters { target, parameters } => {
                match self.bindings.get_mut(target) {
                    Some(DualChild::Block(node)) => node.set_parameters(parameters.clone())?,
                    Some(DualChild::Directive(node)) => node.set_parameters(parameters.clone())?,
                    Some(DualChild::Comment(_)) => {
                        return Err(Failure::BindingKind(target.clone(), "directive"));
                    }
                    None => return Err(Failure::UnknownBinding(target.clone())),
                }
                Ok(None)
            }
            Step::FindBlocks {
                parent,
                name,
                exclude,
                expect,
                bind,
            } => {
                let found = self.block(parent)?.find_blocks(name, *exclude)?;
                let count = check_count(*expect, found.len())?;
                self.bind_all(bind.as_ref(), found);
                Ok(count)
            }
            Step::FindDirectives {
                parent,
                name,
                exclude,
                expect,
                bind,
            } => {
                let found = self.block(parent)?.find_directives(name, *exclude)?;
                let count = check_count(*expect, found.len())?;
                self.bind_all(bind.as_ref(), found);
                Ok(count)
            }
            Step::FindComments {
                parent,
                comment,
                exact,
                expect,
                bind,
            } => {
                let found = self.block(parent)?.find_comments(comment, *exact)?;
                let count = check_count(*expect, found.len())?;
                self.bind_all(bind.as_ref(), found);
                Ok(count)
            }
            Step::Delete { parent, target } => {
                if parent == target {
                    return Err(Failure::InvalidBinding(
                        target.clone(),
                        "cannot be deleted from itself",
                    ));
                }
                self.block(parent)?;
                let child = self
                    .bindings
                    .get(target)
                    .cloned()
                    .ok_or_else(|| Failure::UnknownBinding(target.clone()))?;
                self.block_mut(parent)?.delete_child(child)?;
                // Dropped only once both backends deleted the node.
                self.bindings.remove(target);
                Ok(None)
            }
            Step::Save { message } => {
                self.block_mut(ROOT)?.save(message)?;
                Ok(None)
            }
            Step::UnsavedFiles { expect } => {
                let files = self.block(ROOT)?.unsaved_files()?;
                tracing::debug!(?files, "unsaved files");
                check_count(*expect, files.len())
            }
        }
    }
}

fn run_with<P: BlockNode, S: BlockNode>(
    script: &Script,
    settings: &HarnessSettings,
) -> Result<RunReport, HarnessError> {
    let mut report = RunReport::new(settings);
    let mut runner = Runner::<P, S>::new(settings).map_err(HarnessError::Root)?;

    for (index, step) in script.steps.iter().enumerate() {
        let op = step.op();
        let (status, count, detail) = match runner.execute(step) {
            Ok(count) => (StepStatus::Ok, count, None),
            Err(Failure::UnknownBinding(name)) => {
                return Err(HarnessError::UnknownBinding { index, name });
            }
            Err(Failure::BindingKind(name, expected)) => {
                return Err(HarnessError::BindingKind {
                    index,
                    name,
                    expected,
                });
            }
            Err(Failure::InvalidBinding(name, reason)) => {
                return Err(HarnessError::InvalidBinding {
                    index,
                    name,
                    reason,
                });
            }
            Err(Failure::Dual(err)) => {
                let status = if err.is_divergence() {
                    StepStatus::Diverged
                } else {
                    StepStatus::BackendFailed
                };
                (status, None, Some(err.to_string()))
            }
            Err(Failure::Count { expected, actual }) => (
                StepStatus::Unexpected,
                Some(actual),
                Some(format!("expected {expected} results")),
            ),
        };

        if status == StepStatus::Ok {
            tracing::debug!(index, op, ?count, "step ok");
        } else {
            tracing::warn!(index, op, ?status, detail = ?detail, "step failed, stopping run");
        }
        report.steps.push(StepReport {
            index,
            op: op.to_string(),
            status,
            count,
            detail,
        });
        if status != StepStatus::Ok {
            return Ok(report);
        }
    }

    report.passed = true;
    Ok(report)
}

/// Run `script` against the backend pair selected in `settings`.
///
/// Script mistakes (unknown bindings, wrong node variants) are errors. Step
/// failures are reported in the returned `RunReport`.
pub fn run(script: &Script, settings: &HarnessSettings) -> Result<RunReport, HarnessError> {
    use BackendKind::{Arena, Keyed, Pass};

    tracing::info!(
        primary = %settings.primary,
        secondary = %settings.secondary,
        steps = script.steps.len(),
        "starting run"
    );
    match (settings.primary, settings.secondary) {
        (Arena, Arena) => run_with::<ArenaBlock, ArenaBlock>(script, settings),
        (Arena, Keyed) => run_with::<ArenaBlock, KeyedBlock>(script, settings),
        (Arena, Pass) => run_with::<ArenaBlock, PassBlock>(script, settings),
        (Keyed, Arena) => run_with::<KeyedBlock, ArenaBlock>(script, settings),
        (Keyed, Keyed) => run_with::<KeyedBlock, KeyedBlock>(script, settings),
        (Keyed, Pass) => run_with::<KeyedBlock, PassBlock>(script, settings),
        (Pass, Arena) => run_with::<PassBlock, ArenaBlock>(script, settings),
        (Pass, Keyed) => run_with::<PassBlock, KeyedBlock>(script, settings),
        (Pass, Pass) => run_with::<PassBlock, PassBlock>(script, settings),
    }
}
