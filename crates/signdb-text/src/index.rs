use anyhow::Result;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};

use signdb_core::traits::TextIndexer;
use signdb_core::types::{SearchHit, SourceKind, VariantEntry};

use crate::tantivy_utils::{build_schema, register_tokenizer};

const WRITER_MEMORY_BUDGET: usize = 50_000_000;

/// BM25 index over description variants, held entirely in RAM.
///
/// Documents are written by a single indexing thread so they land in one
/// segment in insertion order; equal-score hits therefore come back in a
/// stable order.
pub struct TantivyIndexer {
	index: Index,
	reader: IndexReader,
	id_field: Field,
	unit_id_field: Field,
	text_field: Field,
}

impl TantivyIndexer {
	pub fn new_in_ram() -> Result<Self, anyhow::Error> {
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		let id_field = schema.get_field("id")?;
		let unit_id_field = schema.get_field("unit_id")?;
		let text_field = schema.get_field("text")?;
		Ok(Self { index, reader, id_field, unit_id_field, text_field })
	}

	pub fn num_docs(&self) -> u64 {
		self.reader.searcher().num_docs()
	}
}

impl TextIndexer for TantivyIndexer {
	fn index(&self, entries: &[VariantEntry]) -> anyhow::Result<()> {
		let mut index_writer: IndexWriter = self.index.writer_with_num_threads(1, WRITER_MEMORY_BUDGET)?;
		for e in entries {
			let doc = doc!(
				self.id_field => e.id.clone(),
				self.unit_id_field => e.unit_id.to_string(),
				self.text_field => e.content.clone(),
			);
			index_writer.add_document(doc)?;
		}
		index_writer.commit()?;
		self.reader.reload()?;
		tracing::debug!(docs = entries.len(), "lexical index committed");
		Ok(())
	}

	fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>> {
		if k == 0 || query.trim().is_empty() {
			return Ok(Vec::new());
		}
		let searcher = self.reader.searcher();
		// TopDocs allocates for the full limit up front.
		let k = k.min(usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX));
		if k == 0 {
			return Ok(Vec::new());
		}
		let qp = QueryParser::for_index(&self.index, vec![self.text_field]);
		let (q, errors) = qp.parse_query_lenient(query);
		if !errors.is_empty() {
			tracing::warn!(query, errors = errors.len(), "query parsed leniently");
		}
		let top_docs = searcher.search(&q, &TopDocs::with_limit(k))?;
		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr)?;
			let id = doc
				.get_first(self.id_field)
				.and_then(|v| v.as_str())
				.ok_or_else(|| anyhow::anyhow!("indexed document without id"))?
				.to_string();
			hits.push(SearchHit { id, score, source: SourceKind::Text });
		}
		Ok(hits)
	}
}
