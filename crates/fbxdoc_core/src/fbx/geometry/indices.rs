use crate::fbx::{FbxError, Map, Result, hash_str};

/// Interleaved or planar vertex data to de-duplicate in place.
#[derive(Debug)]
pub struct VertexStream<'a> {
	/// One `vertex_size`-byte record per input vertex.
	pub data: &'a mut [u8],
	/// Bytes per vertex.
	pub vertex_size: usize,
}

/// Merge identical vertices across `streams` and write the index buffer.
///
/// `indices` receives one entry per input vertex. Every stream is compacted
/// so its first `n` records are the unique vertices, `n` being the returned
/// count. Two vertices are identical when every stream holds the same bytes
/// for both.
pub fn generate_indices(streams: &mut [VertexStream<'_>], indices: &mut [u32]) -> Result<usize> {
	let num_vertices = indices.len();
	let mut key_size = 0;
	for stream in streams.iter() {
		if stream.vertex_size == 0 {
			return Err(FbxError::ZeroVertexSize);
		}
		let available = stream.data.len() / stream.vertex_size;
		if available < num_vertices {
			return Err(FbxError::BadIndex {
				what: "vertex stream",
				index: num_vertices as i64,
				len: available,
			});
		}
		key_size += stream.vertex_size;
	}

	let mut unique: Map<Vec<u8>, u32> = Map::with_capacity(num_vertices);
	let mut key = Vec::with_capacity(key_size);
	let mut num_unique = 0_usize;
	for vertex in 0..num_vertices {
		key.clear();
		for stream in streams.iter() {
			let size = stream.vertex_size;
			key.extend_from_slice(&stream.data[vertex * size..(vertex + 1) * size]);
		}
		let (hash, _) = hash_str(&key);
		if let Some(&existing) = unique.find(hash, key.as_slice()) {
			indices[vertex] = existing;
			continue;
		}
		let slot = num_unique as u32;
		unique.insert(hash, key.clone(), slot);
		indices[vertex] = slot;
		if slot as usize != vertex {
			for stream in streams.iter_mut() {
				let size = stream.vertex_size;
				stream
					.data
					.copy_within(vertex * size..(vertex + 1) * size, num_unique * size);
			}
		}
		num_unique += 1;
	}
	log::trace!("generated indices: {num_vertices} vertices, {num_unique} unique");
	Ok(num_unique)
}
