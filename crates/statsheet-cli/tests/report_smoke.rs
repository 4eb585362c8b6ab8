use assert_cmd::Command;
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::tempdir;

const SCORES: &str = "\
method;score
a;1
a;2
a;3
b;4
b;5
b;6
c;7
c;8
c;9
";

fn write_scores(dir: &Path) -> String {
    let path = dir.join("scores.csv");
    fs::write(&path, SCORES).unwrap();
    path.to_string_lossy().into_owned()
}

fn statsheet() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("statsheet"));
    cmd.args(["--log-level", "error"]);
    cmd
}

fn document_xml(path: &Path) -> String {
    let file = fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut part = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

#[test]
fn anova_report_writes_docx() {
    let dir = tempdir().unwrap();
    let source = write_scores(dir.path());
    let out = dir.path().join("anova.docx");
    statsheet()
        .args(["--language", "en", "report", &source, "--test", "anova"])
        .args(["--param", "dependent=score", "--param", "factor=method"])
        .args(["--out", &out.to_string_lossy()])
        .assert()
        .success();

    let xml = document_xml(&out);
    assert!(xml.contains(">One-Way ANOVA<"));
    assert!(xml.contains(">Post-hoc Comparisons (Bonferroni)<"));
    assert!(xml.contains(">27.000<"));
}

#[test]
fn arabic_is_the_default_language() {
    let dir = tempdir().unwrap();
    let source = write_scores(dir.path());
    let out = dir.path().join("anova.docx");
    statsheet()
        .args(["report", &source, "--test", "anova"])
        .args(["--param", "dependent=score", "--param", "factor=method"])
        .args(["--out", &out.to_string_lossy()])
        .assert()
        .success();

    let xml = document_xml(&out);
    assert!(xml.contains("<w:bidi/>"));
    assert!(xml.contains(">تحليل التباين الأحادي<"));
}

#[test]
fn failure_still_renders_a_document() {
    let dir = tempdir().unwrap();
    let source = write_scores(dir.path());
    let out = dir.path().join("failed.docx");
    statsheet()
        .args(["--language", "en", "report", &source, "--test", "correlation"])
        .args(["--param", "variables=score,method"])
        .args(["--out", &out.to_string_lossy()])
        .assert()
        .success();

    let xml = document_xml(&out);
    assert!(xml.contains(">Correlation Analysis<"));
    assert!(xml.contains("is not numeric"));
    assert!(!xml.contains("<w:tbl>"));
}

#[test]
fn saved_analysis_renders_as_text() {
    let dir = tempdir().unwrap();
    let source = write_scores(dir.path());
    let analysis = dir.path().join("analysis.json");
    let report = dir.path().join("report.txt");
    statsheet()
        .args(["analyze", &source, "--test", "anova"])
        .args(["--param", "dependent=score", "--param", "factor=method"])
        .args(["--out", &analysis.to_string_lossy()])
        .assert()
        .success();
    statsheet()
        .args(["--language", "en", "render", &analysis.to_string_lossy()])
        .args(["--out", &report.to_string_lossy(), "--format", "text"])
        .assert()
        .success();

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.starts_with("One-Way ANOVA\n"));
    assert!(text.contains("| Between Groups |"));
    assert!(text.contains("F(2, 6) = 27.000"));
}

#[test]
fn render_rejects_foreign_json() {
    let dir = tempdir().unwrap();
    let bogus = dir.path().join("bogus.json");
    fs::write(&bogus, r#"{"hello": "world"}"#).unwrap();
    let out = dir.path().join("out.docx");
    statsheet()
        .args(["render", &bogus.to_string_lossy(), "--out", &out.to_string_lossy()])
        .assert()
        .code(3);
    assert!(!out.exists());
}

#[test]
fn render_rejects_inconsistent_contingency_table() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("smokers.csv");
    fs::write(&source, "gender,smoker\nM,yes\nM,no\nF,no\nF,no\nM,yes\nF,yes\n").unwrap();
    let analysis = dir.path().join("analysis.json");
    statsheet()
        .args(["analyze", &source.to_string_lossy(), "--test", "chi_square"])
        .args(["--param", "var1=gender", "--param", "var2=smoker"])
        .args(["--out", &analysis.to_string_lossy()])
        .assert()
        .success();

    let mut response: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&analysis).unwrap()).unwrap();
    assert_eq!(response["success"], true);
    response["result"]["observed"] = serde_json::json!([[1]]);
    fs::write(&analysis, serde_json::to_string(&response).unwrap()).unwrap();

    for format in ["text", "docx"] {
        let out = dir.path().join(format!("out.{format}"));
        let assert = statsheet()
            .args(["render", &analysis.to_string_lossy()])
            .args(["--out", &out.to_string_lossy(), "--format", format])
            .assert()
            .code(3);
        let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
        assert!(stderr.starts_with("validation error: "), "{stderr}");
        assert!(stderr.contains("observed has 1 entries, expected 2"), "{stderr}");
        assert!(!out.exists());
    }
}
