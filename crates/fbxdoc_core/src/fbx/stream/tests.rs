use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::fbx::stream::BoundedRead;
use crate::fbx::{Endianness, ErrorKind, FbxError, InputStream, ProgressCallback, ProgressResult};

/// Reader that hands out at most `step` bytes per call.
struct Trickle {
	data: Vec<u8>,
	pos: usize,
	step: usize,
}

impl Read for Trickle {
	fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
		let take = self.step.min(out.len()).min(self.data.len() - self.pos);
		out[..take].copy_from_slice(&self.data[self.pos..self.pos + take]);
		self.pos += take;
		Ok(take)
	}
}

fn trickle(data: Vec<u8>, step: usize) -> Box<dyn Read> {
	Box::new(Trickle { data, pos: 0, step })
}

#[test]
fn memory_stream_reads_integers_in_both_orders() {
	let bytes = [1_u8, 0, 0, 0, 0, 0, 0, 2, 0xff];
	let mut stream = InputStream::from_memory(&bytes);
	assert_eq!(stream.read_u32(Endianness::Little).expect("u32"), 1);
	assert_eq!(stream.read_u32(Endianness::Big).expect("u32"), 2);
	assert_eq!(stream.position(), 8);
	assert_eq!(stream.read_u8().expect("u8"), 0xff);
	assert!(stream.is_eof().expect("eof check"));
}

#[test]
fn reader_stream_refills_across_chunks() {
	let data: Vec<u8> = (0..=255).collect();
	let mut stream = InputStream::from_reader(trickle(data, 7), 16);
	let first = stream.read_exact(100).expect("read 100").to_vec();
	assert_eq!(first[0], 0);
	assert_eq!(first[99], 99);
	stream.skip(50).expect("skip");
	assert_eq!(stream.position(), 150);
	assert_eq!(stream.read_u8().expect("byte"), 150);
	stream.seek_forward(255).expect("seek");
	assert_eq!(stream.read_u8().expect("last"), 255);
	assert!(stream.is_eof().expect("eof check"));
}

#[test]
fn short_read_reports_truncation_offset() {
	let bytes = [1_u8, 2, 3];
	let mut stream = InputStream::from_memory(&bytes);
	stream.read_u8().expect("first byte");
	let err = stream.read_u32(Endianness::Little).expect_err("truncated");
	assert!(matches!(err, FbxError::TruncatedFile { at: 1, need: 4 }));
	assert_eq!(err.kind(), ErrorKind::TruncatedFile);
}

#[test]
fn progress_callback_can_cancel() {
	let calls = Arc::new(AtomicUsize::new(0));
	let seen = Arc::clone(&calls);
	let callback = ProgressCallback::new(move |progress| {
		seen.fetch_add(1, Ordering::SeqCst);
		if progress.bytes_read >= 64 { ProgressResult::Cancel } else { ProgressResult::Continue }
	});

	let data = vec![0_u8; 1024];
	let mut stream = InputStream::from_reader(trickle(data, 16), 16).with_progress(Some(callback), 16, 0);
	let mut result = Ok(());
	for _ in 0..64 {
		result = stream.read_exact(16).map(|_| ());
		if result.is_err() {
			break;
		}
	}
	let err = result.expect_err("cancellation surfaces as an error");
	assert_eq!(err.kind(), ErrorKind::Cancelled);
	assert!(calls.load(Ordering::SeqCst) >= 1);
	assert!(stream.position() < 1024);
}

#[test]
fn bounded_read_stops_at_limit() {
	let data: Vec<u8> = (0..64).collect();
	let mut stream = InputStream::from_reader(trickle(data, 5), 8);
	stream.skip(4).expect("skip");
	let mut out = Vec::new();
	{
		let mut bounded = BoundedRead::new(&mut stream, 10);
		bounded.read_to_end(&mut out).expect("bounded read");
		assert_eq!(bounded.remaining(), 0);
	}
	assert_eq!(out, (4..14).collect::<Vec<u8>>());
	assert_eq!(stream.position(), 14);
}
