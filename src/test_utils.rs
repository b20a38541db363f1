// Shared fixtures for unit tests: generated PDFs and deterministic model stand-ins
// tests/common carries the integration-test counterparts; keep `build_pdf` and
// `TEST_DIMENSION` in step with it.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use std::cell::{Cell, RefCell};

use crate::completion::{ChatMessage, Completer};
use crate::embeddings::{Embedder, Embedding};
use crate::{RagError, Result};

pub const TEST_DIMENSION: usize = 256;

/// Build a PDF with one page per entry; an empty entry produces a page without text
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
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for text in pages {
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
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content stream encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = i64::try_from(kids.len()).expect("page count fits");
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("pdf serializes");
    bytes
}

/// `len` characters of filler with `marker` placed at character offset `at`
pub fn text_with_marker(len: usize, marker: &str, at: usize) -> String {
    let filler: String = "ledger entry ".chars().cycle().take(len).collect();
    let mut text: String = filler.chars().take(at).collect();
    text.push_str(marker);
    text.extend(filler.chars().skip(at + marker.chars().count()));
    text
}

/// Bag-of-words embedder: lowercase alphanumeric tokens hashed into a fixed-size vector
#[derive(Debug, Default)]
pub struct KeywordEmbedder {
    calls: Cell<usize>,
    texts_seen: Cell<usize>,
}

impl KeywordEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn texts_seen(&self) -> usize {
        self.texts_seen.get()
    }
}

pub fn keyword_vector(text: &str) -> Embedding {
    let mut vector = vec![0.0; TEST_DIMENSION];
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
    {
        let hash = token
            .to_lowercase()
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
            });
        let slot = usize::try_from(hash % TEST_DIMENSION as u64).expect("slot fits usize");
        vector[slot] += 1.0;
    }
    vector
}

impl Embedder for KeywordEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.calls.set(self.calls.get() + 1);
        self.texts_seen.set(self.texts_seen.get() + texts.len());
        Ok(texts.iter().map(|text| keyword_vector(text)).collect())
    }
}

/// Embedder that always fails, standing in for an unreachable service
#[derive(Debug, Default)]
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Embedding>> {
        Err(RagError::EmbeddingService(
            "connection refused".to_string(),
        ))
    }
}

/// Completer that records every conversation and answers with a fixed reply
#[derive(Debug)]
pub struct RecordingCompleter {
    reply: String,
    pub conversations: RefCell<Vec<Vec<ChatMessage>>>,
}

impl RecordingCompleter {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            conversations: RefCell::new(Vec::new()),
        }
    }
}

impl Completer for RecordingCompleter {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.conversations.borrow_mut().push(messages.to_vec());
        Ok(self.reply.clone())
    }
}
