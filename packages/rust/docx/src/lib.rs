//! `.docx` container support.
//!
//! Reads the body paragraphs of a Word document into the owned
//! [`Document`] model and writes model styling back into the original
//! package. Everything the model does not describe (tables, section
//! properties, styles) is carried through untouched by `docx-rs`.
//!
//! Only body-level paragraphs are modelled, through their direct runs and
//! the runs inside hyperlinks; text in tables or nested content is neither
//! classified nor highlighted.

use std::collections::HashMap;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use docx_rs::{
    DocumentChild, Docx, HyperlinkData, InsertChild, ParagraphChild, RunChild, ShdType, Shading, TableCellContent,
    TableChild, TableRowChild, Text,
};
use tracing::{debug, info, instrument};

use transcoder_shared::{Document, Paragraph, Result, Run, TranscoderError};

/// An opened Word document, kept alongside its model so styling can be
/// written back on save.
pub struct DocxPackage {
    docx: Docx,
    /// Index into `docx.document.children` of each modelled paragraph.
    slots: Vec<usize>,
}

impl std::fmt::Debug for DocxPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxPackage")
            .field("paragraphs", &self.slots.len())
            .finish_non_exhaustive()
    }
}

/// Open a `.docx` file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn open(path: &Path) -> Result<(Document, DocxPackage)> {
    let bytes = std::fs::read(path).map_err(|e| TranscoderError::io(path, e))?;
    let opened = read(&bytes)?;
    info!(paragraphs = opened.0.len(), "document loaded");
    Ok(opened)
}

/// Parse `.docx` bytes into the document model plus its package.
pub fn read(bytes: &[u8]) -> Result<(Document, DocxPackage)> {
    let mut docx = docx_rs::read_docx(bytes)
        .map_err(|e| TranscoderError::Document(format!("failed to read .docx: {e:?}")))?;

    let mut paragraphs = Vec::new();
    let mut slots = Vec::new();

    // rId -> target, as read from the document relationships.
    let links: HashMap<String, String> = docx
        .hyperlinks
        .iter()
        .map(|(id, path, _)| (id.clone(), path.clone()))
        .collect();

    // The reader keeps text unescaped but the writer emits it verbatim, so
    // every text node is re-escaped once it has been modelled.
    for (index, child) in docx.document.children.iter_mut().enumerate() {
        match child {
            DocumentChild::Paragraph(para) => {
                paragraphs.push(model_paragraph(para));
                slots.push(index);
                prepare_paragraph(&mut para.children, &links);
            }
            DocumentChild::Table(table) => prepare_table(table, &links),
            _ => {}
        }
    }

    debug!(paragraphs = paragraphs.len(), "modelled body paragraphs");
    Ok((Document::new(paragraphs), DocxPackage { docx, slots }))
}

impl DocxPackage {
    /// Write `document` into the package and save it to `path`.
    ///
    /// The file is packed in memory first, so a failure leaves nothing on disk.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn save(self, document: &Document, path: &Path) -> Result<()> {
        let mut buffer = Cursor::new(Vec::new());
        self.write(document, &mut buffer)?;

        std::fs::write(path, buffer.into_inner()).map_err(|e| TranscoderError::io(path, e))?;
        info!("document saved");
        Ok(())
    }

    /// Write `document` into the package and pack it into `writer`.
    pub fn write<W: Write + Seek>(self, document: &Document, writer: W) -> Result<()> {
        self.into_docx(document)?
            .build()
            .pack(writer)
            .map_err(|e| TranscoderError::Document(format!("failed to write .docx: {e}")))
    }

    /// Merge model styling into the original paragraphs and append any
    /// paragraphs the model gained since loading.
    fn into_docx(self, document: &Document) -> Result<Docx> {
        let Self { mut docx, slots } = self;
        let paragraphs = document.paragraphs();

        if paragraphs.len() < slots.len() {
            return Err(TranscoderError::validation(format!(
                "document has {} paragraphs but {} were loaded",
                paragraphs.len(),
                slots.len()
            )));
        }

        for (model, &slot) in paragraphs.iter().zip(&slots) {
            if let Some(DocumentChild::Paragraph(para)) = docx.document.children.get_mut(slot) {
                restyle_paragraph(para, model);
            }
        }

        for model in &paragraphs[slots.len()..] {
            docx = docx.add_paragraph(docx_paragraph(model));
        }

        Ok(docx)
    }
}

/// Plain text of one direct run.
fn run_text(run: &docx_rs::Run) -> String {
    let mut text = String::new();
    for child in &run.children {
        match child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Runs that make up a paragraph's visible text, in document order:
/// direct runs and runs nested in hyperlinks.
fn text_runs(children: &[ParagraphChild]) -> Vec<&docx_rs::Run> {
    let mut runs = Vec::new();
    for child in children {
        match child {
            ParagraphChild::Run(run) => runs.push(&**run),
            ParagraphChild::Hyperlink(link) => runs.extend(text_runs(&link.children)),
            _ => {}
        }
    }
    runs
}

fn text_runs_mut(children: &mut [ParagraphChild]) -> Vec<&mut docx_rs::Run> {
    let mut runs = Vec::new();
    for child in children {
        match child {
            ParagraphChild::Run(run) => runs.push(&mut **run),
            ParagraphChild::Hyperlink(link) => runs.extend(text_runs_mut(&mut link.children)),
            _ => {}
        }
    }
    runs
}

fn model_paragraph(para: &docx_rs::Paragraph) -> Paragraph {
    let runs = text_runs(&para.children)
        .into_iter()
        .map(|run| Run::new(run_text(run)))
        .collect();
    Paragraph::new(runs)
}

fn escape_run(run: &mut docx_rs::Run) {
    for child in &mut run.children {
        if let RunChild::Text(text) = child {
            *text = Text::new(text.text.as_str());
        }
    }
}

/// Re-escape text and restore external link targets, which the reader
/// leaves empty on the hyperlink itself.
fn prepare_paragraph(children: &mut [ParagraphChild], links: &HashMap<String, String>) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => escape_run(run),
            ParagraphChild::Hyperlink(link) => {
                if let HyperlinkData::External { rid, path } = &mut link.link {
                    if let Some(target) = links.get(rid.as_str()) {
                        *path = escape_attribute(target);
                    }
                }
                prepare_paragraph(&mut link.children, links);
            }
            ParagraphChild::Insert(insert) => {
                for inserted in &mut insert.children {
                    if let InsertChild::Run(run) = inserted {
                        escape_run(run);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Relationship targets are written into an attribute without escaping.
fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn prepare_table(table: &mut docx_rs::Table, links: &HashMap<String, String>) {
    for TableChild::TableRow(row) in &mut table.rows {
        for TableRowChild::TableCell(cell) in &mut row.cells {
            for content in &mut cell.children {
                match content {
                    TableCellContent::Paragraph(para) => {
                        prepare_paragraph(&mut para.children, links)
                    }
                    TableCellContent::Table(nested) => prepare_table(nested, links),
                    _ => {}
                }
            }
        }
    }
}

/// Copy fills from the model onto the matching runs.
///
/// Existing highlight marks are removed from every shaded run so colors
/// never stack.
fn restyle_paragraph(para: &mut docx_rs::Paragraph, model: &Paragraph) {
    for (run, model_run) in text_runs_mut(&mut para.children).into_iter().zip(model.runs()) {
        if let Some(fill) = &model_run.style().shading {
            run.run_property.highlight = None;
            run.run_property.shading = Some(solid_fill(fill));
        }
    }
}

fn docx_paragraph(model: &Paragraph) -> docx_rs::Paragraph {
    model
        .runs()
        .iter()
        .fold(docx_rs::Paragraph::new(), |para, model_run| {
            let mut run = docx_rs::Run::new().add_text(model_run.text());
            if model_run.style().bold {
                run = run.bold();
            }
            if let Some(fill) = &model_run.style().shading {
                run = run.shading(solid_fill(fill));
            }
            para.add_run(run)
        })
}

fn solid_fill(fill: &str) -> Shading {
    Shading::new().shd_type(ShdType::Clear).color("auto").fill(fill)
}
