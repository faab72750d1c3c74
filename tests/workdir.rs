use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bionic_reader::builder::BookRenderer;
use bionic_reader::naming::ExportNaming;
use bionic_reader::progress::SilentReporter;
use bionic_reader::workdir::WorkingDirGuard;
use bionic_reader::{BionicConfig, BionicError, BionicPipeline, OutputDocument};
use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

// The working directory is process wide.
static CWD_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn guard_enters_and_restores() {
    let _lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let before = env::current_dir().expect("current dir");
    let dir = tempfile::tempdir().expect("temp dir");
    let export = dir.path().join("261016_export");

    {
        let guard = WorkingDirGuard::enter(&export).expect("enter export dir");
        assert!(export.is_dir());
        assert_eq!(guard.previous(), before.as_path());
        assert_eq!(
            env::current_dir().expect("current dir"),
            guard.current().to_path_buf()
        );
    }

    assert_eq!(env::current_dir().expect("current dir"), before);
}

#[test]
fn guard_restores_on_error_paths() {
    let _lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let before = env::current_dir().expect("current dir");
    let dir = tempfile::tempdir().expect("temp dir");

    let failing = || -> bionic_reader::Result<()> {
        let _guard = WorkingDirGuard::enter(dir.path().join("nested"))?;
        Err(BionicError::Logging("stage failed".into()))
    };

    assert!(failing().is_err());
    assert_eq!(env::current_dir().expect("current dir"), before);
}

#[test]
fn entering_a_file_fails_without_moving() {
    let _lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let before = env::current_dir().expect("current dir");
    let dir = tempfile::tempdir().expect("temp dir");
    let file = dir.path().join("occupied");
    std::fs::write(&file, b"not a directory").expect("write file");

    let result = WorkingDirGuard::enter(&file);
    assert!(matches!(result, Err(BionicError::WorkingDir { .. })));
    assert_eq!(env::current_dir().expect("current dir"), before);
}

/// Writes the paragraphs as plain text so the output location can be checked.
#[derive(Default)]
struct TextRenderer {
    paths: Vec<PathBuf>,
}

impl BookRenderer for TextRenderer {
    fn render(&mut self, document: &OutputDocument, path: &Path) -> bionic_reader::Result<()> {
        self.paths.push(path.to_path_buf());
        fs::write(path, document.paragraphs().join("\n")).expect("write book");
        Ok(())
    }
}

fn naming() -> ExportNaming {
    let date = NaiveDate::from_ymd_opt(2024, 3, 7).expect("valid date");
    ExportNaming::new(date, 42)
}

fn config(root: &Path, target: PathBuf) -> BionicConfig {
    let fonts = root.join("fonts");
    BionicConfig {
        target,
        export_dir: root.join("study").display().to_string(),
        font_regular: fonts.join("Regular.ttf"),
        font_bold: fonts.join("Bold.ttf"),
        font_italic: fonts.join("Italic.ttf"),
        font_bolditalic: fonts.join("BoldItalic.ttf"),
        log_dir: root.join("logs"),
    }
}

fn write_single_page_pdf(path: &Path, line: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(line)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("content encodes"),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => 1,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save source");
}

#[test]
fn run_writes_the_book_into_the_dated_export_dir() {
    let _lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let before = env::current_dir().expect("current dir");
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("source.pdf");
    write_single_page_pdf(&source, "Bionic reading helps.");

    let mut renderer = TextRenderer::default();
    let written = BionicPipeline::new(3)
        .run_with(
            &config(dir.path(), source),
            &naming(),
            &mut renderer,
            &mut SilentReporter,
        )
        .expect("run succeeds");

    assert_eq!(env::current_dir().expect("current dir"), before);
    assert_eq!(renderer.paths, vec![PathBuf::from("240307_Book_42.pdf")]);
    assert!(written.ends_with("240307_study/240307_Book_42.pdf"));
    assert_eq!(
        fs::read_to_string(&written).expect("read book"),
        " <b>Bio</b>nic <b>read</b>ing <b>hel</b>ps."
    );
}

#[test]
fn run_restores_the_directory_when_the_source_cannot_be_opened() {
    let _lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let before = env::current_dir().expect("current dir");
    let dir = tempfile::tempdir().expect("temp dir");

    let mut renderer = TextRenderer::default();
    let result = BionicPipeline::new(3).run_with(
        &config(dir.path(), dir.path().join("missing.pdf")),
        &naming(),
        &mut renderer,
        &mut SilentReporter,
    );

    assert!(matches!(result, Err(BionicError::SourceOpen { .. })));
    assert_eq!(env::current_dir().expect("current dir"), before);
    assert!(dir.path().join("240307_study").is_dir());
    assert!(renderer.paths.is_empty());
}

#[test]
fn run_checks_fonts_before_touching_the_export_dir() {
    let _lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let before = env::current_dir().expect("current dir");
    let dir = tempfile::tempdir().expect("temp dir");
    let source = dir.path().join("source.pdf");
    write_single_page_pdf(&source, "unused");

    let result = BionicPipeline::new(3).run(
        &config(dir.path(), source),
        &naming(),
        &mut SilentReporter,
    );

    assert!(matches!(result, Err(BionicError::Font { style: "regular", .. })));
    assert_eq!(env::current_dir().expect("current dir"), before);
    assert!(!dir.path().join("240307_study").exists());
}
