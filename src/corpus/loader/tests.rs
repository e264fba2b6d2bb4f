use super::*;
use std::fmt::Write as _;
use tempfile::TempDir;

/// One page of a generated PDF: its content stream and whether its resources define `/F1`
struct PdfPage {
    content: &'static str,
    with_font: bool,
}

/// Assemble a minimal PDF with a correct cross-reference table
fn build_pdf(pages: &[PdfPage]) -> Vec<u8> {
    let kids = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for (i, page) in pages.iter().enumerate() {
        let resources = if page.with_font {
            "<< /Font << /F1 3 0 R >> >>"
        } else {
            "<< >>"
        };
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources {} /Contents {} 0 R >>",
            resources,
            5 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            page.content.len(),
            page.content
        ));
    }

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        writeln!(pdf, "{} 0 obj\n{}\nendobj", i + 1, object).expect("write to string");
    }

    let xref = pdf.len();
    writeln!(pdf, "xref\n0 {}\n0000000000 65535 f ", objects.len() + 1)
        .expect("write to string");
    for offset in offsets {
        writeln!(pdf, "{:010} 00000 n ", offset).expect("write to string");
    }
    writeln!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF",
        objects.len() + 1,
        xref
    )
    .expect("write to string");

    pdf.into_bytes()
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "txt".to_string(), "md".to_string()]
}

#[test]
fn missing_directory_is_corpus_load_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let missing = temp_dir.path().join("papers");

    let result = load_documents(&missing, &default_extensions());
    assert!(matches!(result, Err(RagError::CorpusLoad { .. })));
}

#[test]
fn file_path_is_corpus_load_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let file = temp_dir.path().join("notes.txt");
    fs::write(&file, "not a directory").expect("should write file");

    let result = load_documents(&file, &default_extensions());
    assert!(matches!(result, Err(RagError::CorpusLoad { .. })));
}

#[test]
fn loads_recognised_files_sorted_by_name() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(temp_dir.path().join("b.txt"), "second document").expect("should write");
    fs::write(temp_dir.path().join("a.md"), "first document").expect("should write");
    fs::write(temp_dir.path().join("image.png"), [0_u8, 1, 2]).expect("should write");
    fs::create_dir(temp_dir.path().join("nested.txt")).expect("should create dir");

    let documents =
        load_documents(temp_dir.path(), &default_extensions()).expect("should load documents");

    assert_eq!(
        documents,
        vec![
            Document {
                name: "a.md".to_string(),
                text: "first document".to_string(),
            },
            Document {
                name: "b.txt".to_string(),
                text: "second document".to_string(),
            },
        ]
    );
}

#[test]
fn extension_matching_ignores_case_and_dots() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(temp_dir.path().join("GUIDE.TXT"), "upper case").expect("should write");

    let documents = load_documents(temp_dir.path(), &[".txt".to_string()])
        .expect("should load documents");

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].name, "GUIDE.TXT");
}

#[test]
fn corrupt_pdf_degrades_to_empty_text() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(temp_dir.path().join("broken.pdf"), b"%PDF-1.4 this is not a real pdf")
        .expect("should write");
    fs::write(temp_dir.path().join("ok.txt"), "kidney cysts").expect("should write");

    let documents =
        load_documents(temp_dir.path(), &default_extensions()).expect("should load documents");

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].name, "broken.pdf");
    assert!(documents[0].text.trim().is_empty());
    assert_eq!(documents[1].text, "kidney cysts");
}

#[test]
fn pdf_pages_are_extracted_in_order() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let pdf = build_pdf(&[
        PdfPage {
            content: "BT /F1 12 Tf 72 712 Td (Kidney cysts) Tj ET",
            with_font: true,
        },
        PdfPage {
            content: "BT /F1 12 Tf 72 712 Td (Dialysis options) Tj ET",
            with_font: true,
        },
    ]);
    fs::write(temp_dir.path().join("guide.pdf"), pdf).expect("should write");

    let documents =
        load_documents(temp_dir.path(), &default_extensions()).expect("should load documents");

    assert_eq!(documents.len(), 1);
    let text = &documents[0].text;
    let first = text.find("Kidney").expect("first page text");
    let second = text.find("Dialysis").expect("second page text");
    assert!(first < second);
}

#[test]
fn unreadable_pdf_page_keeps_other_pages() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    // The second page selects a font its resources never define
    let pdf = build_pdf(&[
        PdfPage {
            content: "BT /F1 12 Tf 72 712 Td (Kidney cysts) Tj ET",
            with_font: true,
        },
        PdfPage {
            content: "BT /F9 12 Tf 72 712 Td (Missing font) Tj ET",
            with_font: false,
        },
    ]);
    fs::write(temp_dir.path().join("mixed.pdf"), pdf).expect("should write");

    let documents =
        load_documents(temp_dir.path(), &default_extensions()).expect("should load documents");

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].name, "mixed.pdf");
    assert!(documents[0].text.contains("Kidney"));
}

#[test]
fn invalid_utf8_is_read_lossily() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(temp_dir.path().join("latin1.txt"), b"caf\xe9 kidney").expect("should write");

    let documents =
        load_documents(temp_dir.path(), &default_extensions()).expect("should load documents");

    assert_eq!(documents.len(), 1);
    assert!(documents[0].text.ends_with("kidney"));
}

#[test]
fn empty_directory_loads_no_documents() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let documents =
        load_documents(temp_dir.path(), &default_extensions()).expect("should load documents");
    assert!(documents.is_empty());
}
