
use std::path::PathBuf;
use tracing::{debug, info};

use crate::completion::{AnswerComposer, Completer};
use crate::config::Config;
use crate::database::{QueryMatch, VectorStore};
use crate::embeddings::{Embedder, TextChunker};
use crate::indexer::{BatchReport, FileProgress, Indexer, UploadedFile};
use crate::retrieval::Retriever;
use crate::Result;

/// A line typed into the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ask(String),
    Add(PathBuf),
    Files,
    Clear,
    New,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ChatCommand {
    #[inline]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if !line.starts_with('/') {
            return Self::Ask(line.to_string());
        }

        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };

        match command {
            "/add" if !argument.is_empty() => Self::Add(PathBuf::from(argument)),
            "/files" => Self::Files,
            "/clear" => Self::Clear,
            "/new" => Self::New,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

/// A generated answer with the chunks it was grounded on
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<QueryMatch>,
}

/// One question and its answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

/// Documents indexed so far plus the running conversation
pub struct ChatSession<'a, E, C> {
    store: VectorStore,
    indexer: Indexer<&'a E>,
    retriever: Retriever<&'a E>,
    composer: AnswerComposer<&'a C>,
    history: Vec<Exchange>,
}

impl<'a, E: Embedder, C: Completer> ChatSession<'a, E, C> {
    #[inline]
    pub fn new(
        store: VectorStore,
        indexer: Indexer<&'a E>,
        retriever: Retriever<&'a E>,
        composer: AnswerComposer<&'a C>,
    ) -> Self {
        Self {
            store,
            indexer,
            retriever,
            composer,
            history: Vec::new(),
        }
    }

    /// Build a session with an empty store sized for the configured embedding model
    #[inline]
    pub fn from_config(embedder: &'a E, completer: &'a C, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            VectorStore::new(config.provider.embedding_dimension),
            Indexer::from_config(embedder, config)?,
            Retriever::from_config(embedder, config)?,
            AnswerComposer::new(completer),
        ))
    }

    /// Build a session with default chunking and retrieval around an existing store
    #[inline]
    pub fn with_store(store: VectorStore, embedder: &'a E, completer: &'a C) -> Self {
        let defaults = Config::default();
        Self::new(
            store,
            Indexer::new(embedder, TextChunker::default()),
            Retriever::new(embedder, defaults.retrieval.top_k),
            AnswerComposer::new(completer),
        )
    }

    #[inline]
    pub fn add_files<F>(&mut self, files: &[UploadedFile], on_progress: F) -> BatchReport
    where
        F: FnMut(FileProgress<'_>),
    {
        self.indexer
            .index_batch_with_progress(&mut self.store, files, on_progress)
    }

    /// Answer a question from the indexed documents
    ///
    /// A failed question leaves the store and the history as they were.
    #[inline]
    pub fn ask(&mut self, question: &str) -> Result<Answer> {
        let outcome = self.retriever.retrieve(&self.store, question)?;
        let text = self.composer.answer(&outcome, question)?;

        self.history.push(Exchange {
            question: question.to_string(),
            answer: text.clone(),
        });
        debug!("Conversation now has {} exchanges", self.history.len());

        Ok(Answer {
            text,
            sources: outcome.matches().to_vec(),
        })
    }

    /// Sources that have chunks in the store
    #[inline]
    pub fn files(&self) -> Vec<String> {
        self.store.sources()
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.store.count()
    }

    /// Remove every indexed document; returns the number of removed chunks
    #[inline]
    pub fn clear_documents(&mut self) -> usize {
        let removed = self.store.count();
        self.store.clear();
        removed
    }

    #[inline]
    pub fn new_conversation(&mut self) {
        info!("Discarding {} exchanges", self.history.len());
        self.history.clear();
    }

    #[inline]
    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    #[inline]
    pub fn store(&self) -> &VectorStore {
        &self.store
    }
}
