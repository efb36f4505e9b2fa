//! In-process test doubles for the provider traits

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{
    ChunkStore, EmbeddingProvider, HashingEmbedder, SpreadsheetDocument, SpreadsheetProvider,
    StoreMatch,
};
use crate::tools::A1Range;
use crate::types::{ChunkRecord, DocumentRef, SheetInfo};

struct DocumentState {
    file_id: String,
    title: String,
    sheets: Vec<SheetInfo>,
    grids: RwLock<HashMap<String, Vec<Vec<Value>>>>,
    failing_reads: RwLock<HashSet<String>>,
    bulk_reads: AtomicUsize,
}

/// Spreadsheet held in memory; clones share grids and counters
#[derive(Clone)]
pub struct MockDocument {
    state: Arc<DocumentState>,
}

impl MockDocument {
    pub fn new(file_id: &str, title: &str) -> Self {
        Self {
            state: Arc::new(DocumentState {
                file_id: file_id.to_string(),
                title: title.to_string(),
                sheets: Vec::new(),
                grids: RwLock::new(HashMap::new()),
                failing_reads: RwLock::new(HashSet::new()),
                bulk_reads: AtomicUsize::new(0),
            }),
        }
    }

    /// Append a sheet; only valid while building
    pub fn with_sheet(self, sheet: SheetInfo, grid: Vec<Vec<Value>>) -> Self {
        let mut state = Arc::try_unwrap(self.state)
            .unwrap_or_else(|_| panic!("with_sheet called on a shared MockDocument"));
        state.grids.get_mut().insert(sheet.title.clone(), grid);
        state.sheets.push(sheet);
        Self {
            state: Arc::new(state),
        }
    }

    /// Replace a sheet's grid
    pub fn set_grid(&self, sheet_title: &str, grid: Vec<Vec<Value>>) {
        self.state.grids.write().insert(sheet_title.to_string(), grid);
    }

    /// Make whole-sheet reads of a sheet fail, or succeed again
    pub fn set_read_failure(&self, sheet_title: &str, failing: bool) {
        let mut failing_reads = self.state.failing_reads.write();
        if failing {
            failing_reads.insert(sheet_title.to_string());
        } else {
            failing_reads.remove(sheet_title);
        }
    }

    /// Number of whole-sheet reads served
    pub fn bulk_reads(&self) -> usize {
        self.state.bulk_reads.load(Ordering::SeqCst)
    }

    fn grid(&self, sheet_title: &str) -> Result<Vec<Vec<Value>>> {
        self.state
            .grids
            .read()
            .get(sheet_title)
            .cloned()
            .ok_or_else(|| Error::provider(format!("No sheet named {}", sheet_title)))
    }
}

#[async_trait]
impl SpreadsheetDocument for MockDocument {
    fn file_id(&self) -> &str {
        &self.state.file_id
    }

    fn title(&self) -> &str {
        &self.state.title
    }

    fn sheets(&self) -> &[SheetInfo] {
        &self.state.sheets
    }

    async fn read_all_values(&self, sheet: &SheetInfo) -> Result<Vec<Vec<Value>>> {
        self.state.bulk_reads.fetch_add(1, Ordering::SeqCst);
        if self.state.failing_reads.read().contains(&sheet.title) {
            return Err(Error::provider("503 backend unavailable"));
        }
        self.grid(&sheet.title)
    }

    async fn read_range(&self, sheet_title: &str, range: &str) -> Result<Vec<Vec<Value>>> {
        let range = A1Range::parse(range)?;
        let grid = self.grid(sheet_title)?;

        let mut rows: Vec<Vec<Value>> = grid
            .iter()
            .skip(range.start.row_index)
            .take(range.rows())
            .map(|row| {
                row.iter()
                    .skip(range.start.col_index)
                    .take(range.cols())
                    .cloned()
                    .collect()
            })
            .collect();
        while rows.last().map_or(false, |r: &Vec<Value>| r.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn write_range(&self, sheet_title: &str, range: &str, values: Vec<Vec<Value>>) -> Result<()> {
        let range = A1Range::parse(range)?;
        let mut grids = self.state.grids.write();
        let grid = grids
            .get_mut(sheet_title)
            .ok_or_else(|| Error::provider(format!("No sheet named {}", sheet_title)))?;

        for (r, row) in values.into_iter().enumerate() {
            let row_index = range.start.row_index + r;
            if grid.len() <= row_index {
                grid.resize(row_index + 1, Vec::new());
            }
            for (c, value) in row.into_iter().enumerate() {
                let col_index = range.start.col_index + c;
                let cells = &mut grid[row_index];
                if cells.len() <= col_index {
                    cells.resize(col_index + 1, Value::Null);
                }
                cells[col_index] = value;
            }
        }
        Ok(())
    }
}

/// Drive of mock documents grouped by folder
#[derive(Default)]
pub struct MockProvider {
    folders: HashMap<String, Vec<DocumentRef>>,
    documents: HashMap<String, MockDocument>,
    failing: HashSet<String>,
    listing_failure: Option<String>,
    opened: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, folder_id: &str, document: MockDocument) -> Self {
        self.folders
            .entry(folder_id.to_string())
            .or_default()
            .push(DocumentRef::new(document.file_id(), document.title()));
        self.documents.insert(document.file_id().to_string(), document);
        self
    }

    /// List a document whose open always fails
    pub fn with_failing_document(mut self, folder_id: &str, file_id: &str, name: &str) -> Self {
        self.folders
            .entry(folder_id.to_string())
            .or_default()
            .push(DocumentRef::new(file_id, name));
        self.failing.insert(file_id.to_string());
        self
    }

    /// Make every folder listing fail with an authentication error
    pub fn with_listing_failure(mut self, message: &str) -> Self {
        self.listing_failure = Some(message.to_string());
        self
    }

    pub fn document(&self, file_id: &str) -> Option<&MockDocument> {
        self.documents.get(file_id)
    }

    /// File ids in the order they were opened
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl SpreadsheetProvider for MockProvider {
    async fn list_documents_in_folder(&self, folder_id: &str) -> Result<Vec<DocumentRef>> {
        if let Some(ref message) = self.listing_failure {
            return Err(Error::authentication(message.clone()));
        }
        Ok(self.folders.get(folder_id).cloned().unwrap_or_default())
    }

    async fn open(&self, file_id: &str) -> Result<Box<dyn SpreadsheetDocument>> {
        self.opened.lock().push(file_id.to_string());
        if self.failing.contains(file_id) {
            return Err(Error::provider(format!("Spreadsheet {} is unreadable", file_id)));
        }
        self.documents
            .get(file_id)
            .map(|d| Box::new(d.clone()) as Box<dyn SpreadsheetDocument>)
            .ok_or_else(|| Error::provider(format!("File not found: {}", file_id)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Hashing embedder that counts single-text embeddings
pub struct CountingEmbedder {
    inner: HashingEmbedder,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            inner: HashingEmbedder::new(dimensions),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Store that answers every query with the same matches
#[derive(Default)]
pub struct StaticStore {
    matches: Vec<StoreMatch>,
    queries: AtomicUsize,
    written: Mutex<Vec<ChunkRecord>>,
}

impl StaticStore {
    pub fn new(matches: Vec<StoreMatch>) -> Self {
        Self {
            matches,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<ChunkRecord> {
        self.written.lock().clone()
    }
}

#[async_trait]
impl ChunkStore for StaticStore {
    async fn upsert(&self, record: &ChunkRecord) -> Result<()> {
        self.written.lock().push(record.clone());
        Ok(())
    }

    async fn query(&self, _text: &str, top_k: usize) -> Result<Vec<StoreMatch>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.matches.iter().take(top_k).cloned().collect())
    }

    async fn delete_by_file(&self, _file_id: &str) -> Result<usize> {
        Ok(0)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.written.lock().len())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Store whose reads and writes always fail
pub struct FailingStore;

#[async_trait]
impl ChunkStore for FailingStore {
    async fn upsert(&self, _record: &ChunkRecord) -> Result<()> {
        Err(Error::store_write("store unavailable"))
    }

    async fn query(&self, _text: &str, _top_k: usize) -> Result<Vec<StoreMatch>> {
        Err(Error::store_query("store unavailable"))
    }

    async fn delete_by_file(&self, _file_id: &str) -> Result<usize> {
        Err(Error::store_write("store unavailable"))
    }

    async fn len(&self) -> Result<usize> {
        Err(Error::store_query("store unavailable"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
