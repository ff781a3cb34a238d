//! End-to-end tests for the workspace pipeline using scripted data sources
//!
//! Each scripted source records the stages it was asked to run into a
//! shared call log, so tests can assert exactly what the orchestrator did.

use std::path::Path;
use std::sync::{Arc, Mutex};

use sourceline_core::{
    DataSource, Exporter, Parser, ProgressContext, Registry, SourceContext, SourceError,
    SourceMetadata, UpdateOutcome, Updater,
};
use sourceline_workspace::{ParseStatus, UpdateStatus, Workspace};

type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Clone)]
enum UpdateScript {
    Updated(&'static str, Vec<&'static str>),
    UpToDate,
    ManualOnly,
    Fail,
}

#[derive(Clone)]
struct Script {
    newest: Option<&'static str>,
    update: UpdateScript,
    integrate_ok: bool,
    parse: Result<(), &'static str>,
    panic_in_parse: bool,
    export_ok: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            newest: Some("1.0"),
            update: UpdateScript::UpToDate,
            integrate_ok: true,
            parse: Ok(()),
            panic_in_parse: false,
            export_ok: true,
        }
    }
}

struct Scripted {
    id: String,
    script: Script,
    calls: CallLog,
}

impl Scripted {
    fn record(&self, call: impl AsRef<str>) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.id, call.as_ref()));
    }
}

impl Updater for Scripted {
    fn newest_version(&self) -> Result<String, SourceError> {
        self.script
            .newest
            .map(str::to_string)
            .ok_or_else(|| SourceError::Upstream("unreachable".into()))
    }

    fn update(&self, _ctx: &SourceContext<'_>) -> UpdateOutcome {
        self.record("update");
        match &self.script.update {
            UpdateScript::Updated(version, files) => UpdateOutcome::Updated(SourceMetadata {
                version: Some(version.to_string()),
                source_file_names: files.iter().map(|f| f.to_string()).collect(),
                updated_at: None,
            }),
            UpdateScript::UpToDate => UpdateOutcome::UpToDate,
            UpdateScript::ManualOnly => UpdateOutcome::ManualOnly("license required".into()),
            UpdateScript::Fail => UpdateOutcome::Failed(SourceError::Upstream("503".into())),
        }
    }

    fn integrate(
        &self,
        _ctx: &SourceContext<'_>,
        version: &str,
    ) -> Result<SourceMetadata, SourceError> {
        self.record(format!("integrate {version}"));
        if self.script.integrate_ok {
            Ok(SourceMetadata::new(version, vec!["manual.tsv".into()]))
        } else {
            Err(SourceError::Data("no files".into()))
        }
    }
}

impl Parser for Scripted {
    fn parse(&self, _ctx: &SourceContext<'_>) -> Result<(), SourceError> {
        self.record("parse");
        if self.script.panic_in_parse {
            panic!("parser bug");
        }
        self.script
            .parse
            .map_err(|msg| SourceError::Data(msg.to_string()))
    }
}

struct ScriptedExporter {
    format: &'static str,
    ok: bool,
    id: String,
    calls: CallLog,
}

impl Exporter for ScriptedExporter {
    fn format(&self) -> &str {
        self.format
    }

    fn export(&self, _ctx: &SourceContext<'_>) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:export {}", self.id, self.format));
        self.ok
    }
}

struct ScriptedSource {
    inner: Scripted,
    rdf: ScriptedExporter,
    graph: ScriptedExporter,
}

impl DataSource for ScriptedSource {
    fn id(&self) -> &str {
        &self.inner.id
    }
    fn updater(&self) -> &dyn Updater {
        &self.inner
    }
    fn parser(&self) -> &dyn Parser {
        &self.inner
    }
    fn rdf_exporter(&self) -> &dyn Exporter {
        &self.rdf
    }
    fn graph_exporter(&self) -> &dyn Exporter {
        &self.graph
    }
}

fn register(registry: &mut Registry, id: &'static str, script: Script, calls: &CallLog) {
    let calls = calls.clone();
    registry.register(id, move || {
        let exporter = |format: &'static str| ScriptedExporter {
            format,
            ok: script.export_ok,
            id: id.to_string(),
            calls: calls.clone(),
        };
        Ok(Box::new(ScriptedSource {
            inner: Scripted {
                id: id.to_string(),
                script: script.clone(),
                calls: calls.clone(),
            },
            rdf: exporter("rdf"),
            graph: exporter("graph"),
        }) as Box<dyn DataSource>)
    });
}

fn write_config(root: &Path, ids: &[&str]) {
    std::fs::create_dir_all(root).unwrap();
    let json = serde_json::json!({ "version": 1, "data_source_ids": ids });
    std::fs::write(root.join("config.json"), json.to_string()).unwrap();
}

fn preset_metadata(root: &Path, id: &str, meta: &SourceMetadata) {
    let dir = root.join("sources").join(id);
    std::fs::create_dir_all(&dir).unwrap();
    meta.write_to(&dir).unwrap();
}

fn calls_of(calls: &CallLog) -> Vec<String> {
    calls.lock().unwrap().clone()
}

fn hidden() -> ProgressContext {
    ProgressContext::hidden()
}

#[test]
fn resolves_configured_sources_in_registry_order() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A", "B"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    for id in ["A", "B", "C"] {
        register(&mut registry, id, Script::default(), &calls);
    }

    let ws = Workspace::open(dir.path(), &registry).unwrap();
    let ids: Vec<_> = ws.sources().iter().map(|a| a.id()).collect();
    assert_eq!(ids, vec!["A", "B"]);
}

#[test]
fn instantiation_failure_excludes_only_that_source() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A", "B"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    registry.register("A", || Err(SourceError::Instantiate("bad plugin".into())));
    register(&mut registry, "B", Script::default(), &calls);

    let ws = Workspace::open(dir.path(), &registry).unwrap();
    let ids: Vec<_> = ws.sources().iter().map(|a| a.id()).collect();
    assert_eq!(ids, vec!["B"]);
}

#[test]
fn failed_update_still_parses_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    let script = Script {
        update: UpdateScript::Fail,
        ..Script::default()
    };
    register(&mut registry, "A", script, &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    let reports = ws.update_data_sources(&hidden());

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].update, UpdateStatus::UpdateFailed);
    assert_eq!(reports[0].parse, ParseStatus::Parsed);
    assert!(reports[0].export_rdf);
    assert_eq!(reports[0].export_graph, Some(true));
    assert_eq!(
        calls_of(&calls),
        vec!["A:update", "A:parse", "A:export rdf", "A:export graph"]
    );
}

#[test]
fn failed_parse_and_exports_do_not_abort_stages() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    let script = Script {
        parse: Err("truncated file"),
        export_ok: false,
        ..Script::default()
    };
    register(&mut registry, "A", script, &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    let reports = ws.update_data_sources(&hidden());
    let report = &reports[0];

    assert_eq!(report.parse, ParseStatus::ParseFailed);
    assert!(!report.export_rdf);
    assert_eq!(report.export_graph, Some(false));
    assert!(!report.all_succeeded());
    assert_eq!(calls_of(&calls).len(), 4);
}

#[test]
fn manual_only_keeps_version_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A"]);
    let before = SourceMetadata::new("2020-06-01", vec!["old.xml".into()]);
    preset_metadata(dir.path(), "A", &before);

    let calls = CallLog::default();
    let mut registry = Registry::new();
    let script = Script {
        update: UpdateScript::ManualOnly,
        ..Script::default()
    };
    register(&mut registry, "A", script, &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    let reports = ws.update_data_sources(&hidden());
    let report = &reports[0];

    assert_eq!(report.update, UpdateStatus::ManualOnly);
    assert_eq!(report.parse, ParseStatus::Parsed);
    assert_eq!(report.export_graph, Some(true));

    let after = SourceMetadata::read_from(&dir.path().join("sources/A")).unwrap();
    assert_eq!(after, before);
    assert_eq!(ws.sources()[0].metadata, before);
}

#[test]
fn successful_update_persists_metadata() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    let script = Script {
        update: UpdateScript::Updated("2.0", vec!["a.tsv", "b.tsv"]),
        ..Script::default()
    };
    register(&mut registry, "A", script, &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    let reports = ws.update_data_sources(&hidden());
    let report = &reports[0];
    assert_eq!(report.update, UpdateStatus::Updated);

    let persisted = SourceMetadata::read_from(&dir.path().join("sources/A")).unwrap();
    assert_eq!(persisted.version.as_deref(), Some("2.0"));
    assert_eq!(persisted.source_file_names, vec!["a.tsv", "b.tsv"]);
    assert!(persisted.updated_at.is_some());
    assert_eq!(persisted, ws.sources()[0].metadata);
}

#[test]
fn up_to_date_leaves_record_untouched() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A"]);
    let before = SourceMetadata::new("1.0", vec![]);
    preset_metadata(dir.path(), "A", &before);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    register(&mut registry, "A", Script::default(), &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    let reports = ws.update_data_sources(&hidden());
    let report = &reports[0];

    assert_eq!(report.update, UpdateStatus::UpToDate);
    let after = SourceMetadata::read_from(&dir.path().join("sources/A")).unwrap();
    assert_eq!(after, before);
}

#[test]
fn panicking_source_does_not_block_others() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A", "B"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    let broken = Script {
        panic_in_parse: true,
        ..Script::default()
    };
    register(&mut registry, "A", broken, &calls);
    register(&mut registry, "B", Script::default(), &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    let reports = ws.update_data_sources(&hidden());

    assert_eq!(reports[0].parse, ParseStatus::ParseFailed);
    assert_eq!(reports[0].export_graph, Some(true));
    assert!(reports[1].all_succeeded());
    assert_eq!(
        calls_of(&calls),
        vec![
            "A:update",
            "A:parse",
            "A:export rdf",
            "A:export graph",
            "B:update",
            "B:parse",
            "B:export rdf",
            "B:export graph",
        ]
    );
}

#[test]
fn integrate_without_version_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    register(&mut registry, "A", Script::default(), &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    assert!(ws.integrate_data_source(Some("A"), None, &hidden()).is_err());
    assert!(ws.integrate_data_source(None, Some("1.0"), &hidden()).is_err());
    assert!(ws.integrate_data_source(Some("A"), Some("  "), &hidden()).is_err());
    assert!(calls_of(&calls).is_empty());
}

#[test]
fn integrate_unknown_source_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    register(&mut registry, "A", Script::default(), &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    let result = ws.integrate_data_source(Some("Z"), Some("1.0"), &hidden());
    assert_eq!(result, Ok(None));
    assert!(calls_of(&calls).is_empty());
}

#[test]
fn integrate_runs_parse_and_rdf_export_only() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A", "B"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    register(&mut registry, "A", Script::default(), &calls);
    register(&mut registry, "B", Script::default(), &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    let report = ws
        .integrate_data_source(Some("B"), Some("2024-03"), &hidden())
        .unwrap()
        .unwrap();

    assert_eq!(report.update, UpdateStatus::Integrated);
    assert_eq!(report.export_graph, None);
    assert_eq!(
        calls_of(&calls),
        vec!["B:integrate 2024-03", "B:parse", "B:export rdf"]
    );

    let persisted = SourceMetadata::read_from(&dir.path().join("sources/B")).unwrap();
    assert_eq!(persisted.version.as_deref(), Some("2024-03"));
    assert_eq!(persisted.source_file_names, vec!["manual.tsv"]);
}

#[test]
fn integrate_records_version_as_given() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    register(&mut registry, "A", Script::default(), &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    ws.integrate_data_source(Some("A"), Some(" 2024-03 "), &hidden())
        .unwrap()
        .unwrap();

    assert_eq!(calls_of(&calls)[0], "A:integrate  2024-03 ");
    let persisted = SourceMetadata::read_from(&dir.path().join("sources/A")).unwrap();
    assert_eq!(persisted.version.as_deref(), Some(" 2024-03 "));
}

#[test]
fn integrate_uses_first_registered_match() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    register(&mut registry, "A", Script::default(), &calls);
    let failing = Script {
        integrate_ok: false,
        ..Script::default()
    };
    register(&mut registry, "A", failing, &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    assert_eq!(ws.sources().len(), 2);
    let report = ws
        .integrate_data_source(Some("A"), Some("5"), &hidden())
        .unwrap()
        .unwrap();

    assert_eq!(report.update, UpdateStatus::Integrated);
    assert_eq!(
        calls_of(&calls),
        vec!["A:integrate 5", "A:parse", "A:export rdf"]
    );
    assert_eq!(ws.sources()[0].metadata.version.as_deref(), Some("5"));
    assert_eq!(ws.sources()[1].metadata.version, None);
}

#[test]
fn failed_integration_still_parses() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    let script = Script {
        integrate_ok: false,
        ..Script::default()
    };
    register(&mut registry, "A", script, &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    let report = ws
        .integrate_data_source(Some("A"), Some("3"), &hidden())
        .unwrap()
        .unwrap();

    assert_eq!(report.update, UpdateStatus::IntegrateFailed);
    assert_eq!(report.parse, ParseStatus::Parsed);
    assert!(report.export_rdf);
    let persisted = SourceMetadata::read_from(&dir.path().join("sources/A")).unwrap();
    assert!(persisted.version.is_none());
}

#[test]
fn status_compares_against_upstream() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A", "B"]);
    preset_metadata(
        dir.path(),
        "A",
        &SourceMetadata::new("2021-01-01", vec!["a.csv".into()]),
    );
    preset_metadata(dir.path(), "B", &SourceMetadata::new("2021-01-01", vec![]));

    let calls = CallLog::default();
    let mut registry = Registry::new();
    let current = Script {
        newest: Some("2021-01-01"),
        ..Script::default()
    };
    let unreachable = Script {
        newest: None,
        ..Script::default()
    };
    register(&mut registry, "A", current, &calls);
    register(&mut registry, "B", unreachable, &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    let report = ws.check_state();

    assert!(report.rows[0].up_to_date);
    assert!(!report.rows[1].up_to_date);
    assert_eq!(report.rows[1].latest_version, None);
    assert_eq!(report.count_up_to_date(), 1);
    assert_eq!(report.summary_message(), "1/2 source data are up-to-date");
    let rendered = report.render();
    let row_b: Vec<&str> = rendered
        .lines()
        .map(|line| line.split(['│', '┆']).map(str::trim).collect::<Vec<_>>())
        .find(|cells| cells.get(1) == Some(&"B"))
        .unwrap();
    // leading border, then Source, Up to date, Version, Latest
    assert_eq!(row_b[3], "2021-01-01");
    assert_eq!(row_b[4], "-");
    assert!(sourceline_workspace::status::is_up_to_date(&ws.sources()[0]));
    assert!(!sourceline_workspace::status::is_up_to_date(&ws.sources()[1]));
    // status never runs pipeline stages
    assert!(calls_of(&calls).is_empty());
}

#[test]
fn status_creates_missing_records() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), &["A"]);
    let calls = CallLog::default();
    let mut registry = Registry::new();
    register(&mut registry, "A", Script::default(), &calls);

    let mut ws = Workspace::open(dir.path(), &registry).unwrap();
    let report = ws.check_state();

    assert!(!report.rows[0].up_to_date);
    assert!(dir.path().join("sources/A/metadata.json").exists());
    assert!(dir.path().join("sources/A/source").is_dir());
    assert!(dir.path().join("sources/A/processed").is_dir());
}
