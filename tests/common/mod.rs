// Shared helpers for integration tests
//
// Integration tests link against the library without `cfg(test)`, so the
// crate's own `test_utils` fixtures are not visible here. The PDF builder
// mirrors `build_pdf` there and uses the same dimension. The embedder differs
// on purpose: it scores a fixed vocabulary so tests can state exactly which
// chunk a question should reach.

#![allow(dead_code, reason = "each integration test binary uses a subset")]

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::cell::Cell;

use pdf_rag::Result;
use pdf_rag::completion::{ChatMessage, Completer};
use pdf_rag::embeddings::{Embedder, Embedding};

pub const TEST_DIMENSION: usize = 256;

/// Single-font PDF with one text line per page; empty strings make blank pages
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|text| {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 10.into()]),
                    Operation::new("Td", vec![50.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations }
                .encode()
                .expect("content stream encodes");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    let count = i64::try_from(kids.len()).expect("page count fits");
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("pdf serializes");
    bytes
}

/// Filler text of `len` characters with ` marker ` spliced in at `at`
pub fn filler_with_marker(len: usize, marker: &str, at: usize) -> String {
    let filler: String = "ledger entry ".chars().cycle().take(len).collect();
    let spliced = format!(" {} ", marker);
    let mut text: String = filler.chars().take(at).collect();
    text.push_str(&spliced);
    text.extend(filler.chars().skip(at + spliced.chars().count()));
    text
}

/// Vector with a 1.0 in each slot whose vocabulary word occurs in `text`
pub fn vocabulary_embedding(keywords: &[&str], text: &str) -> Embedding {
    let lower = text.to_lowercase();
    let mut vector = vec![0.0; TEST_DIMENSION];
    for (slot, keyword) in keywords.iter().enumerate() {
        if lower.contains(keyword) {
            vector[slot] = 1.0;
        }
    }
    vector
}

/// Embeds text by which words of a fixed vocabulary it mentions
pub struct VocabularyEmbedder {
    keywords: Vec<&'static str>,
    calls: Cell<usize>,
}

impl VocabularyEmbedder {
    pub fn new(keywords: &[&'static str]) -> Self {
        Self {
            keywords: keywords.to_vec(),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Embedder for VocabularyEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.calls.set(self.calls.get() + 1);
        Ok(texts
            .iter()
            .map(|text| vocabulary_embedding(&self.keywords, text))
            .collect())
    }
}

/// Echoes the user prompt back so tests can inspect what the model would see
pub struct EchoCompleter;

impl Completer for EchoCompleter {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        Ok(messages
            .last()
            .map(|message| message.content.clone())
            .unwrap_or_default())
    }
}
