use crate::{decode_everything, oom_test};

#[test_log::test]
fn huge_tag_size() {
	oom_test(|| {
		// 256 MiB claimed, nothing there
		decode_everything(b"ID3\x04\x00\x00\x7F\x7F\x7F\x7F");
	});
}

#[test_log::test]
fn huge_frame_size() {
	oom_test(|| {
		decode_everything(b"ID3\x03\x00\x00\x00\x00\x00\x0ATIT2\xFF\xFF\xFF\xFF\x00\x00");
	});
}

#[test_log::test]
fn huge_extended_header() {
	oom_test(|| {
		decode_everything(b"ID3\x03\x00\x40\x00\x00\x00\x0A\xFF\xFF\xFF\xFF\x00\x00\x00\x00\x00\x00");
		decode_everything(b"ID3\x04\x00\x40\x00\x00\x00\x0A\x7F\x7F\x7F\x7F\x01\x00\x00\x00\x00\x00");
	});
}

#[test_log::test]
fn huge_compressed_size() {
	oom_test(|| {
		// Compressed TIT2 claiming 4 GiB once inflated
		decode_everything(
			b"ID3\x03\x00\x00\x00\x00\x00\x13TIT2\x00\x00\x00\x09\x00\x80\xFF\xFF\xFF\xFFx\x9c\x03\x00\x00",
		);
	});
}

#[test_log::test]
fn huge_index_list() {
	oom_test(|| {
		// ASPI claiming 65535 index points
		decode_everything(
			b"ID3\x04\x00\x00\x00\x00\x00\x19ASPI\x00\x00\x00\x0F\x00\x00\
			\x00\x00\x00\x00\x00\x00\x00\x00\xFF\xFF\x10\x00\x01\x00\x02",
		);
	});
}
