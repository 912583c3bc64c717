//! LanceDB-backed semantic index.
//!
//! Each index owns a private table in a temporary directory that lives as
//! long as the index does. The table is filled from one unit snapshot and
//! dropped with it; nothing is reopened across builds.
//!
//! Vectors are L2-normalized on insert and at query time, so the dot-product
//! distance LanceDB reports maps directly onto cosine similarity.

use anyhow::{anyhow, ensure, Result};
use arrow_array::types::Float32Type;
use arrow_array::{Array, FixedSizeListArray, Float32Array, Int32Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray};
use arrow_schema::{DataType, Field, Schema};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, DistanceType};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;
use tokio::runtime::Runtime;

use signdb_core::traits::VectorIndexer;
use signdb_core::types::{SearchHit, SourceKind, VariantEntry};

const TABLE_NAME: &str = "variants";

pub struct LanceVectorIndex {
	db: Connection,
	rt: Runtime,
	state: Mutex<State>,
	_dir: TempDir,
}

#[derive(Default)]
struct State {
	dim: Option<usize>,
	rows: usize,
}

impl LanceVectorIndex {
	pub fn new_temp() -> Result<Self> {
		let dir = tempfile::Builder::new().prefix("signdb-vectors").tempdir()?;
		let rt = tokio::runtime::Builder::new_multi_thread().worker_threads(2).enable_all().build()?;
		let uri = dir.path().to_string_lossy().to_string();
		let db = rt.block_on(async { connect(&uri).execute().await })?;
		tracing::debug!(uri, "vector table directory created");
		Ok(Self { db, rt, state: Mutex::new(State::default()), _dir: dir })
	}

	pub fn len(&self) -> usize { self.state().rows }

	pub fn is_empty(&self) -> bool { self.len() == 0 }

	fn state(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

fn build_arrow_schema(dim: usize) -> Result<Arc<Schema>> {
	let width = i32::try_from(dim).map_err(|_| anyhow!("embedding dimension {dim} too large"))?;
	Ok(Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("unit_id", DataType::Int64, false),
		Field::new("position", DataType::Int32, false),
		Field::new("content", DataType::Utf8, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), width), true),
	])))
}

fn to_record_batch(entries: &[VariantEntry], embeddings: &[Vec<f32>], dim: usize, first_position: usize) -> Result<RecordBatch> {
	let positions = (first_position..first_position + entries.len())
		.map(|p| i32::try_from(p).map_err(|_| anyhow!("vector table is full")))
		.collect::<Result<Vec<i32>>>()?;
	let vectors = embeddings.iter().map(|v| Some(normalized(v).into_iter().map(Some).collect::<Vec<_>>()));
	let batch = RecordBatch::try_new(build_arrow_schema(dim)?, vec![
		Arc::new(StringArray::from(entries.iter().map(|e| e.id.clone()).collect::<Vec<_>>())),
		Arc::new(Int64Array::from(entries.iter().map(|e| e.unit_id).collect::<Vec<_>>())),
		Arc::new(Int32Array::from(positions)),
		Arc::new(StringArray::from(entries.iter().map(|e| e.content.clone()).collect::<Vec<_>>())),
		Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors, i32::try_from(dim)?)),
	])?;
	Ok(batch)
}

impl VectorIndexer for LanceVectorIndex {
	fn index(&self, entries: &[VariantEntry], embeddings: &[Vec<f32>]) -> Result<()> {
		ensure!(entries.len() == embeddings.len(), "entries and embeddings length must match ({} vs {})", entries.len(), embeddings.len());
		if entries.is_empty() { return Ok(()); }
		let mut state = self.state();
		let dim = state.dim.unwrap_or(embeddings[0].len());
		ensure!(dim > 0, "embeddings must not be empty");
		for (entry, embedding) in entries.iter().zip(embeddings) {
			ensure!(embedding.len() == dim, "embedding for {} has {} dims, index has {}", entry.id, embedding.len(), dim);
		}

		let batch = to_record_batch(entries, embeddings, dim, state.rows)?;
		let schema = batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
		self.rt.block_on(async {
			if self.db.table_names().execute().await?.iter().any(|name| name == TABLE_NAME) {
				self.db.open_table(TABLE_NAME).execute().await?.add(reader).execute().await?;
			} else {
				self.db.create_table(TABLE_NAME, reader).execute().await?;
			}
			anyhow::Ok(())
		})?;
		state.dim = Some(dim);
		state.rows += entries.len();
		tracing::debug!(rows = state.rows, dim, "vector table loaded");
		Ok(())
	}

	fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
		let (dim, rows) = {
			let state = self.state();
			(state.dim, state.rows)
		};
		let Some(dim) = dim else { return Ok(Vec::new()) };
		if k == 0 || rows == 0 { return Ok(Vec::new()); }
		ensure!(query_vec.len() == dim, "query has {} dims, index has {}", query_vec.len(), dim);

		let query = normalized(query_vec);
		let batches: Vec<RecordBatch> = self.rt.block_on(async {
			let table = self.db.open_table(TABLE_NAME).execute().await?;
			let stream = table.vector_search(query)?.distance_type(DistanceType::Dot).limit(k.min(rows)).execute().await?;
			anyhow::Ok(stream.try_collect::<Vec<_>>().await?)
		})?;

		let mut ranked: Vec<(i32, SearchHit)> = Vec::with_capacity(k.min(rows));
		for batch in &batches {
			let ids = column::<StringArray>(batch, "id")?;
			let positions = column::<Int32Array>(batch, "position")?;
			let distances = column::<Float32Array>(batch, "_distance")?;
			for i in 0..batch.num_rows() {
				let hit = SearchHit { id: ids.value(i).to_string(), score: 1.0 - distances.value(i), source: SourceKind::Vector };
				ranked.push((positions.value(i), hit));
			}
		}
		// Equal similarities keep insertion order.
		ranked.sort_by(|a, b| b.1.score.total_cmp(&a.1.score).then(a.0.cmp(&b.0)));
		Ok(ranked.into_iter().map(|(_, hit)| hit).collect())
	}
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
	batch
		.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<T>())
		.ok_or_else(|| anyhow!("vector search result has no usable '{name}' column"))
}

fn normalized(v: &[f32]) -> Vec<f32> {
	let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
	if norm > 0.0 { v.iter().map(|x| x / norm).collect() } else { v.to_vec() }
}
