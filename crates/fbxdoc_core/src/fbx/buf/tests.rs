use crate::fbx::{Allocator, AllocatorOpts, Buf, BufMode, ErrorKind};

#[test]
fn ordered_buffer_is_a_stack() {
	let alloc = Allocator::default();
	let mut buf = Buf::new(&alloc, BufMode::Ordered);
	for i in 0..100_u32 {
		buf.push(i).expect("push");
	}
	assert_eq!(buf.len(), 100);
	assert_eq!(buf.last(), Some(&99));
	assert_eq!(buf.pop(), Some(99));
	assert_eq!(buf.pop_n(3), vec![96, 97, 98]);
	assert_eq!(buf.iter().copied().take(3).collect::<Vec<_>>(), vec![0, 1, 2]);
	assert_eq!(buf.into_vec().len(), 96);
}

#[test]
fn popped_chunks_are_retained_and_reused() {
	let alloc = Allocator::default();
	let mut buf = Buf::new(&alloc, BufMode::Ordered);
	for i in 0..17_u64 {
		buf.push(i).expect("push");
	}
	assert_eq!(buf.num_chunks(), 2);
	let allocations = alloc.stats().allocations;

	for _ in 0..100 {
		assert_eq!(buf.pop(), Some(16));
		assert_eq!(buf.num_spare_chunks(), 1);
		buf.push(16).expect("push again");
		assert_eq!(buf.num_spare_chunks(), 0);
	}
	assert_eq!(alloc.stats().allocations, allocations);
}

#[test]
fn pop_into_moves_between_buffers() {
	let alloc = Allocator::default();
	let mut stack = Buf::new(&alloc, BufMode::Ordered);
	let mut result = Buf::new(&alloc, BufMode::Unordered);
	stack.push("a").expect("push");
	stack.push("b").expect("push");

	assert!(stack.pop_into(&mut result).expect("move"));
	assert!(stack.pop_into(&mut result).expect("move"));
	assert!(!stack.pop_into(&mut result).expect("empty"));
	assert_eq!(result.iter().copied().collect::<Vec<_>>(), vec!["b", "a"]);
}

#[test]
fn unordered_buffer_rejects_pop_but_clears() {
	let alloc = Allocator::default();
	let mut buf = Buf::new(&alloc, BufMode::Unordered);
	buf.push(1_u8).expect("push");
	assert_eq!(buf.pop(), None);
	assert_eq!(buf.len(), 1);
	buf.clear();
	assert!(buf.is_empty());
	assert_eq!(buf.num_spare_chunks(), 1);
}

#[test]
fn huge_batches_get_their_own_chunk() {
	let alloc = Allocator::new(AllocatorOpts {
		huge_threshold: 1024,
		..AllocatorOpts::default()
	});
	let mut buf = Buf::new(&alloc, BufMode::Ordered);
	buf.push(0_u32).expect("push");
	buf.extend(0..512_u32).expect("huge extend");
	assert_eq!(buf.num_chunks(), 2);
	assert_eq!(buf.len(), 513);
	assert_eq!(alloc.stats().huge_allocations, 1);
}

#[test]
fn limits_propagate_from_push() {
	let alloc = Allocator::new(AllocatorOpts {
		memory_limit: 200,
		..AllocatorOpts::default()
	});
	let mut buf = Buf::new(&alloc, BufMode::Ordered);
	let mut result = Ok(());
	for i in 0..1000_u64 {
		result = buf.push(i);
		if result.is_err() {
			break;
		}
	}
	assert_eq!(result.expect_err("limit hit").kind(), ErrorKind::MemoryLimit);
}

#[test]
fn dropping_releases_accounting() {
	let alloc = Allocator::default();
	{
		let mut buf = Buf::new(&alloc, BufMode::Ordered);
		buf.extend(0..40_u32).expect("extend");
		assert!(alloc.stats().bytes > 0);
	}
	assert_eq!(alloc.stats().bytes, 0);
}
