//! Reports directory in, context bundles and summary out, over a small
//! Maven-shaped project on disk.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use triage_core::summary::{write_json, ErrorSummary};
use triage_core::{
    BugKind, Confidence, ContextEngine, LocatorConfig, MemoryReporter, ReportSet, WindowConfig,
};

const TEST_CLASS: &str = "com.example.bank.test.junit.search.AtmLocationSearchTest";

const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="com.example.bank.test.junit.search.AtmLocationSearchTest" time="0.8" tests="2" errors="0" skipped="0" failures="1">
  <properties>
    <property name="java.version" value="17.0.2"/>
    <property name="sun.boot.library.path" value="/opt/jdk/lib"/>
  </properties>
  <testcase name="shouldListAll" classname="com.example.bank.test.junit.search.AtmLocationSearchTest" time="0.1"/>
  <testcase name="shouldFindNearbyAtms" classname="com.example.bank.test.junit.search.AtmLocationSearchTest" time="0.7">
    <failure message="expected: &lt;3&gt; but was: &lt;0&gt;" type="org.opentest4j.AssertionFailedError"><![CDATA[org.opentest4j.AssertionFailedError: expected: <3> but was: <0>
	at org.junit.jupiter.api.AssertionUtils.fail(AssertionUtils.java:55)
	at com.example.bank.service.AtmLocationService.findNearby(AtmLocationService.java:14)
	at com.example.bank.test.junit.search.AtmLocationSearchTest.shouldFindNearbyAtms(AtmLocationSearchTest.java:24)
]]></failure>
  </testcase>
</testsuite>
"#;

const TEST_SOURCE: &str = r#"package com.example.bank.test.junit.search;

import com.example.bank.model.AtmLocation;
import com.example.bank.service.AtmLocationService;
import org.junit.jupiter.api.Test;
import org.springframework.beans.factory.annotation.Autowired;
import org.springframework.boot.test.context.SpringBootTest;

import java.util.List;

import static org.junit.jupiter.api.Assertions.assertEquals;

@SpringBootTest(classes = {AtmLocationService.class})
public class AtmLocationSearchTest {

    @Autowired
    private AtmLocationService atmLocationService;

    @Test
    public void shouldFindNearbyAtms() {
        List<AtmLocation> atms = atmLocationService.findNearby("10001");
        assertEquals(3, atms.size());
    }
}
"#;

const SERVICE_SOURCE: &str = r#"package com.example.bank.service;

import com.example.bank.model.AtmLocation;
import java.util.ArrayList;
import java.util.Collections;
import java.util.List;

public class AtmLocationService {

    private final List<AtmLocation> locations = new ArrayList<>();

    public List<AtmLocation> findNearby(String zip) {
        int count = locations.size();
        if (count > 3) {
            return locations;
        }
        return Collections.emptyList();
    }
}
"#;

fn write(base: &Path, rel: &str, body: &str) -> PathBuf {
    let path = base.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, body).unwrap();
    path
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    write(
        base,
        &format!("bank/target/surefire-reports/TEST-{}.xml", TEST_CLASS),
        REPORT,
    );
    write(
        base,
        &format!("bank/target/surefire-reports/{}.txt", TEST_CLASS),
        "Tests run: 2, Failures: 1\nERROR shouldFindNearbyAtms\n",
    );
    write(
        base,
        "bank/src/test/java/com/example/bank/test/junit/search/AtmLocationSearchTest.java",
        TEST_SOURCE,
    );
    write(
        base,
        "bank/src/main/java/com/example/bank/service/AtmLocationService.java",
        SERVICE_SOURCE,
    );
    write(
        base,
        "bank/src/main/java/com/example/bank/service/BranchService.java",
        "package com.example.bank.service;\n\npublic class BranchService {}\n",
    );
    write(
        base,
        "bank/src/main/java/com/example/bank/model/AtmLocation.java",
        "package com.example.bank.model;\n\npublic class AtmLocation {}\n",
    );
    dir
}

fn engine(base: &Path, reporter: Arc<MemoryReporter>) -> ContextEngine {
    ContextEngine::new(LocatorConfig::rooted_at(base), WindowConfig::default(), reporter)
}

#[test]
fn atm_location_search_failure_is_reconstructed() {
    let dir = project();
    let reporter = Arc::new(MemoryReporter::new());

    let reports = ReportSet::load(
        dir.path().join("bank/target/surefire-reports"),
        reporter.as_ref(),
    )
    .unwrap();
    assert_eq!(reports.total_tests, 2);
    assert_eq!(reports.total_failures, 1);
    assert!(reports.suites[0].log_excerpt.is_some());
    assert!(!reports.suites[0].properties.contains_key("sun.boot.library.path"));

    let bundles = engine(dir.path(), reporter.clone()).reconstruct_all(&reports);
    assert_eq!(bundles.len(), 1);
    let bundle = &bundles[0];

    // test window
    assert!(bundle.test_source.found);
    assert_eq!(
        bundle.test_source.method_signature.as_deref(),
        Some("public void shouldFindNearbyAtms() {")
    );
    assert_eq!(bundle.test_source.context_start_line, Some(15));
    assert_eq!(bundle.test_source.context_end_line, Some(24));

    // the service under test appears exactly once
    let service_hits = bundle
        .related
        .iter()
        .filter(|r| r.file_name() == "AtmLocationService.java")
        .count();
    assert_eq!(service_hits, 1);

    // siblings in the production package and imported models are included
    let names: Vec<String> = bundle.related.iter().map(|r| r.file_name()).collect();
    assert!(names.contains(&"BranchService.java".to_string()));
    assert!(names.contains(&"AtmLocation.java".to_string()));

    // the threshold bug is flagged with high confidence
    let service = bundle
        .related
        .iter()
        .find(|r| r.file_name() == "AtmLocationService.java")
        .unwrap();
    let off_by_one: Vec<_> = service
        .annotations
        .iter()
        .filter(|a| a.kind == BugKind::OffByOne)
        .collect();
    assert_eq!(off_by_one.len(), 1);
    assert_eq!(off_by_one[0].line_number, 14);
    assert_eq!(off_by_one[0].confidence, Confidence::High);
    assert!(service
        .annotations
        .iter()
        .any(|a| a.kind == BugKind::EmptyReturn && a.line_number == 17));

    assert_eq!(bundle.location.as_ref().unwrap().file, "AssertionUtils.java");
    assert!(reporter.warnings().is_empty());
}

#[test]
fn related_paths_are_distinct() {
    let dir = project();
    let reporter = Arc::new(MemoryReporter::new());
    let reports = ReportSet::load(
        dir.path().join("bank/target/surefire-reports"),
        reporter.as_ref(),
    )
    .unwrap();

    let bundles = engine(dir.path(), reporter).reconstruct_all(&reports);
    let paths: Vec<PathBuf> = bundles[0]
        .related
        .iter()
        .map(|r| fs::canonicalize(&r.path).unwrap())
        .collect();
    let unique: HashSet<&PathBuf> = paths.iter().collect();
    assert_eq!(unique.len(), paths.len());
    assert!(bundles[0].related.iter().all(|r| r.path.is_file()));
}

#[test]
fn summary_document_is_written() {
    let dir = project();
    let reporter = Arc::new(MemoryReporter::new());
    let reports = ReportSet::load(
        dir.path().join("bank/target/surefire-reports"),
        reporter.as_ref(),
    )
    .unwrap();

    let engine = engine(dir.path(), reporter);
    let summary = ErrorSummary::build(&reports, engine.locator());
    let out = dir.path().join("output/error-summary.json");
    write_json(&out, &summary).unwrap();

    let loaded = ErrorSummary::load(&out).unwrap();
    assert_eq!(loaded.summary.total_tests, 2);
    assert_eq!(loaded.summary.success_rate_percent, 50.0);
    let failure = loaded.failures().next().unwrap();
    assert!(failure.test_source.found);
    assert_eq!(failure.assertion_details.as_ref().unwrap().expected, "3");
}

const SEARCH_REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="{class}" time="0.3" tests="1" errors="0" skipped="0" failures="1">
  <testcase name="shouldReturnAtms" classname="{class}" time="0.3">
    <failure message="expected: &lt;3&gt; but was: &lt;0&gt;" type="org.opentest4j.AssertionFailedError"><![CDATA[org.opentest4j.AssertionFailedError: expected: <3> but was: <0>
	at com.example.bank.service.AtmLocationService.search(AtmLocationService.java:42)
	at {class}.shouldReturnAtms({simple}.java:18)
]]></failure>
  </testcase>
</testsuite>
"#;

const SEARCH_SERVICE: &str = r#"package com.example.bank.service;

import java.util.Collections;
import java.util.List;

public class AtmLocationService {

    public List<String> search(String zip) {
        int count = lookup(zip).size();
        if (count > 3) {
            return lookup(zip);
        }
        return Collections.emptyList();
    }
}
"#;

/// Failing `shouldReturnAtms` in `test_class`, whose source never names the
/// service; the frame pointing into `AtmLocationService` is the only link.
fn search_project(test_class: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    let (package, simple) = test_class.rsplit_once('.').unwrap();
    let report = SEARCH_REPORT
        .replace("{class}", test_class)
        .replace("{simple}", simple);
    write(
        base,
        &format!("bank/target/surefire-reports/TEST-{}.xml", test_class),
        &report,
    );
    let test_source = format!(
        "package {package};\n\nimport org.junit.jupiter.api.Test;\n\npublic class {simple} {{\n\n    @Test\n    void shouldReturnAtms() {{\n        assertEquals(3, client.get(\"/atms?zip=10001\").size());\n    }}\n}}\n"
    );
    write(
        base,
        &format!("bank/src/test/java/{}.java", test_class.replace('.', "/")),
        &test_source,
    );
    write(
        base,
        "bank/src/main/java/com/example/bank/service/AtmLocationService.java",
        SEARCH_SERVICE,
    );
    dir
}

fn search_bundle(test_class: &str) -> triage_core::FailureContextBundle {
    let dir = search_project(test_class);
    let reporter = Arc::new(MemoryReporter::new());
    let reports = ReportSet::load(
        dir.path().join("bank/target/surefire-reports"),
        reporter.as_ref(),
    )
    .unwrap();
    let mut bundles = engine(dir.path(), reporter).reconstruct_all(&reports);
    assert_eq!(bundles.len(), 1);
    bundles.remove(0)
}

#[test]
fn should_return_atms_finds_service_once() {
    let bundle = search_bundle(TEST_CLASS);

    assert_eq!(bundle.failure.test_method, "shouldReturnAtms");
    assert!(bundle.test_source.found);
    assert_eq!(
        bundle.test_source.method_signature.as_deref(),
        Some("void shouldReturnAtms() {")
    );
    let service_hits = bundle
        .related
        .iter()
        .filter(|r| r.file_name() == "AtmLocationService.java")
        .count();
    assert_eq!(service_hits, 1);
    assert_eq!(bundle.location.as_ref().unwrap().file, "AtmLocationService.java");
    assert_eq!(bundle.location.as_ref().unwrap().line, 42);
}

#[test]
fn stack_trace_alone_finds_the_service() {
    // no import, no field, and no package variant reaching `service`
    let bundle = search_bundle("com.example.bank.web.AtmLocationSearchTest");

    let names: Vec<String> = bundle.related.iter().map(|r| r.file_name()).collect();
    assert_eq!(names, vec!["AtmLocationService.java".to_string()]);
    let service = &bundle.related[0];
    assert!(service
        .annotations
        .iter()
        .any(|a| a.kind == BugKind::OffByOne && a.confidence == Confidence::High));
}
