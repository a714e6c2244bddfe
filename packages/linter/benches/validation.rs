use std::fmt::Write;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fomod_editor::load;
use fomod_linter::{validate_bytes, validate_document};
use fomod_schema::Schema;

/// A configuration with `pages` steps of four groups of eight options each.
fn installer(pages: usize) -> String {
    let mut xml = String::from("<config>\n<moduleName>Bench</moduleName>\n<installSteps order=\"Explicit\">\n");
    for page in 0..pages {
        let _ = writeln!(xml, "<installStep name=\"Page {}\">", page);
        xml.push_str("<optionalFileGroups order=\"Explicit\">\n");
        for group in 0..4 {
            let _ = writeln!(xml, "<group name=\"Group {}\" type=\"SelectAny\">", group);
            xml.push_str("<plugins order=\"Explicit\">\n");
            for option in 0..8 {
                let _ = write!(
                    xml,
                    "<plugin name=\"Option {o}\"><description>Option {o}</description>\
                     <files><file source=\"data/{p}/{g}/{o}.esp\"/></files>\
                     <conditionFlags><flag name=\"f{p}_{g}\">{o}</flag></conditionFlags>\
                     <typeDescriptor><type name=\"Optional\"/></typeDescriptor></plugin>\n",
                    o = option,
                    p = page,
                    g = group
                );
            }
            xml.push_str("</plugins>\n</group>\n");
        }
        xml.push_str("</optionalFileGroups>\n</installStep>\n");
    }
    xml.push_str("</installSteps>\n</config>\n");
    xml
}

fn load_installer(c: &mut Criterion) {
    let schema = Arc::new(Schema::fomod());
    let source = installer(20);

    c.bench_function("load_installer", |b| {
        b.iter(|| load(Arc::clone(&schema), None, black_box(source.as_bytes())))
    });
}

/// Required files only, `files` entries long.
fn file_list(files: usize) -> String {
    let mut xml = String::from("<config><moduleName>Bench</moduleName><requiredInstallFiles>\n");
    for file in 0..files {
        let _ = writeln!(xml, "<file source=\"data/{f}.esp\" destination=\"{f}.esp\"/>", f = file);
    }
    xml.push_str("</requiredInstallFiles></config>\n");
    xml
}

fn load_file_list(c: &mut Criterion) {
    let schema = Arc::new(Schema::fomod());
    let source = file_list(2_000);

    c.bench_function("load_file_list", |b| {
        b.iter(|| load(Arc::clone(&schema), None, black_box(source.as_bytes())))
    });
}

fn validate_installer(c: &mut Criterion) {
    let schema = Arc::new(Schema::fomod());
    let source = installer(20);
    let doc = match load(Arc::clone(&schema), None, source.as_bytes()) {
        Ok((doc, _)) => doc,
        Err(err) => panic!("benchmark installer failed to load: {}", err),
    };

    c.bench_function("validate_installer", |b| {
        b.iter(|| validate_document(black_box(&doc)))
    });
}

fn strict_validation(c: &mut Criterion) {
    let schema = Arc::new(Schema::fomod());
    let source = installer(20);

    c.bench_function("strict_validation", |b| {
        b.iter(|| validate_bytes(Arc::clone(&schema), black_box(source.as_bytes())))
    });
}

criterion_group!(
    benches,
    load_installer,
    load_file_list,
    validate_installer,
    strict_validation
);
criterion_main!(benches);
