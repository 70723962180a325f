// std
use std::{
	sync::{
		Arc, Barrier,
		atomic::{AtomicBool, Ordering},
	},
	thread,
};
// self
use drm_license_client::{
	headers::KeyRequestHeaders,
	request::{DEFAULT_CONTENT_TYPE, RequestHeaders},
};

const WRITERS: usize = 4;
const ROUNDS: usize = 500;

fn writer_name(writer: usize) -> String {
	format!("X-Writer-{writer}")
}

#[test]
fn snapshots_never_observe_torn_entries() {
	let store = KeyRequestHeaders::default();
	let done = Arc::new(AtomicBool::new(false));
	let barrier = Arc::new(Barrier::new(WRITERS + 1));
	let writers = (0..WRITERS)
		.map(|writer| {
			let store = store.clone();
			let barrier = barrier.clone();

			thread::spawn(move || {
				let name = writer_name(writer);

				barrier.wait();

				for round in 0..ROUNDS {
					store
						.set(&name, format!("{writer}:{round}"))
						.expect("Writer headers should be accepted.");

					if round % 3 == 0 {
						store.clear(&name).expect("Writer names should be valid.");
					}
				}

				store.set(&name, format!("{writer}:final")).expect("Final header should be accepted.");
			})
		})
		.collect::<Vec<_>>();
	let reader = {
		let store = store.clone();
		let done = done.clone();

		thread::spawn(move || {
			let mut observed = 0_usize;

			barrier.wait();

			loop {
				let snapshot = store.snapshot();

				assert!(snapshot.len() <= WRITERS);

				for (name, value) in &snapshot {
					let writer = value
						.split(':')
						.next()
						.and_then(|id| id.parse::<usize>().ok())
						.expect("Values should carry their writer id.");

					assert_eq!(name, &writer_name(writer), "Value {value} landed under {name}.");
				}

				let mut merged = RequestHeaders::key_request_defaults();

				store.merge_into(&mut merged);

				assert_eq!(merged.get("Content-Type"), Some(DEFAULT_CONTENT_TYPE));
				assert!(merged.len() <= WRITERS + 1);

				observed += 1;

				if done.load(Ordering::Acquire) {
					break;
				}
			}

			observed
		})
	};

	for writer in writers {
		writer.join().expect("Writer thread should not panic.");
	}

	done.store(true, Ordering::Release);

	let observed = reader.join().expect("Reader thread should not panic.");
	let final_state = store.snapshot();

	assert!(observed > 0);
	assert_eq!(final_state.len(), WRITERS);

	for writer in 0..WRITERS {
		assert_eq!(
			final_state.get(&writer_name(writer)).map(String::as_str),
			Some(format!("{writer}:final").as_str())
		);
	}
}

#[test]
fn clear_all_races_with_setters_without_corruption() {
	let store = KeyRequestHeaders::default();
	let setter = {
		let store = store.clone();

		thread::spawn(move || {
			for round in 0..ROUNDS {
				store.set("X-Round", round.to_string()).expect("Header should be accepted.");
			}
		})
	};

	for _ in 0..ROUNDS {
		store.clear_all();

		let snapshot = store.snapshot();

		assert!(snapshot.len() <= 1);

		if let Some(value) = snapshot.get("X-Round") {
			assert!(value.parse::<usize>().is_ok_and(|round| round < ROUNDS));
		}
	}

	setter.join().expect("Setter thread should not panic.");
}
