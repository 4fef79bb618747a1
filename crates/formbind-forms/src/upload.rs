//! Temporary storage for uploaded files
//!
//! When a form containing a file upload fails validation, the upload has to
//! survive until the form is resubmitted. [`SessionFileUploadTempStore`]
//! writes the file body into a configured directory and keeps its metadata
//! in the session.

use formbind_core::{Error, Request, Result, Session};
use rand::RngCore;
use serde_json::{Map, Value};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Setting naming the directory uploads are written to.
pub const TEMPDIR_SETTING: &str = "formbind.tempdir";

/// Session key holding upload metadata.
pub const TEMPSTORE_SESSION_KEY: &str = "formbind.tempstore";

const RANDID_KEY: &str = "randid";
const CHUNK_SIZE: usize = 10000;

/// An upload handed to the store.
pub struct UploadData<'a> {
	/// Metadata such as `filename`, `mimetype`, `size` and `uid`.
	pub metadata: Map<String, Value>,
	/// File body, if any.
	pub stream: Option<Box<dyn Read + 'a>>,
}

impl<'a> UploadData<'a> {
	pub fn new(metadata: Map<String, Value>) -> Self {
		Self {
			metadata,
			stream: None,
		}
	}

	pub fn with_stream(mut self, stream: impl Read + 'a) -> Self {
		self.stream = Some(Box::new(stream));
		self
	}
}

/// An upload read back from the store.
#[derive(Debug)]
pub struct StoredUpload {
	/// Metadata as stored, including `randid` when a body was written.
	pub metadata: Map<String, Value>,
	/// The stored body, when it is still on disk.
	pub file: Option<File>,
}

/// Upload store backed by a directory and the session.
pub struct SessionFileUploadTempStore {
	tempdir: PathBuf,
}

impl fmt::Debug for SessionFileUploadTempStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionFileUploadTempStore")
			.field("tempdir", &self.tempdir)
			.finish()
	}
}

impl SessionFileUploadTempStore {
	/// Create a store for `request`, reading the `formbind.tempdir` setting.
	pub fn new(request: &dyn Request) -> Result<Self> {
		let tempdir = request.setting(TEMPDIR_SETTING).ok_or_else(|| {
			Error::configuration(format!(
				"To use SessionFileUploadTempStore, you must set a \"{}\" key in your settings. \
				 It points to a directory which will temporarily hold uploaded files when form \
				 validation fails.",
				TEMPDIR_SETTING
			))
		})?;
		Ok(Self::with_tempdir(tempdir))
	}

	/// Create a store writing into `tempdir`.
	pub fn with_tempdir(tempdir: impl Into<PathBuf>) -> Self {
		Self {
			tempdir: tempdir.into(),
		}
	}

	pub fn tempdir(&self) -> &Path {
		&self.tempdir
	}

	/// URL previewing an upload. This store has none.
	pub fn preview_url(&self, _uid: &str) -> Option<String> {
		None
	}

	pub fn contains(&self, session: &dyn Session, name: &str) -> bool {
		session
			.data()
			.get(TEMPSTORE_SESSION_KEY)
			.and_then(Value::as_object)
			.is_some_and(|store| store.contains_key(name))
	}

	/// Store `data` under `name`, writing its stream to a fresh file.
	pub fn set(&self, session: &mut dyn Session, name: &str, data: UploadData<'_>) -> Result<()> {
		let UploadData {
			mut metadata,
			stream,
		} = data;

		if let Some(mut stream) = stream {
			let (randid, mut file) = self.create_file()?;
			if let Err(e) = copy_chunks(&mut stream, &mut file) {
				drop(file);
				let path = self.tempdir.join(&randid);
				if let Err(remove) = std::fs::remove_file(&path) {
					tracing::warn!(
						upload = name,
						path = %path.display(),
						error = %remove,
						"could not remove partial upload"
					);
				}
				return Err(e.into());
			}
			tracing::debug!(upload = name, randid = %randid, "stored upload body");
			metadata.insert(RANDID_KEY.to_string(), Value::String(randid));
		}

		let store = session
			.data_mut()
			.entry(TEMPSTORE_SESSION_KEY)
			.or_insert_with(|| Value::Object(Map::new()))
			.as_object_mut()
			.ok_or_else(|| Error::SessionData {
				key: TEMPSTORE_SESSION_KEY.to_string(),
				reason: "expected an object".to_string(),
			})?;
		store.insert(name.to_string(), Value::Object(metadata));
		session.changed();
		Ok(())
	}

	/// Read back the upload stored under `name`.
	///
	/// The body is reopened when one was written; a body that has since
	/// disappeared from disk yields metadata only.
	pub fn get(&self, session: &dyn Session, name: &str) -> Option<StoredUpload> {
		let metadata = session
			.data()
			.get(TEMPSTORE_SESSION_KEY)?
			.as_object()?
			.get(name)?
			.as_object()?
			.clone();

		let file = metadata
			.get(RANDID_KEY)
			.and_then(Value::as_str)
			.and_then(|randid| match File::open(self.tempdir.join(randid)) {
				Ok(file) => Some(file),
				Err(e) => {
					tracing::warn!(upload = name, randid, error = %e, "stored upload body missing");
					None
				}
			});

		Some(StoredUpload { metadata, file })
	}

	fn create_file(&self) -> Result<(String, File)> {
		loop {
			let randid = random_id();
			match OpenOptions::new()
				.write(true)
				.create_new(true)
				.open(self.tempdir.join(&randid))
			{
				Ok(file) => return Ok((randid, file)),
				Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
				Err(e) => return Err(e.into()),
			}
		}
	}
}

fn random_id() -> String {
	let mut bytes = [0u8; 20];
	rand::thread_rng().fill_bytes(&mut bytes);
	bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn copy_chunks(stream: &mut dyn Read, file: &mut File) -> io::Result<()> {
	let mut buffer = vec![0u8; CHUNK_SIZE];
	loop {
		let read = match stream.read(&mut buffer) {
			Ok(0) => break,
			Ok(read) => read,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e),
		};
		file.write_all(&buffer[..read])?;
	}
	file.flush()
}

#[cfg(test)]
mod tests {
	use super::*;
	use formbind_core::{MemorySession, RequestContext};
	use rstest::{fixture, rstest};
	use serde_json::json;
	use std::io::{Cursor, Read};
	use tempfile::TempDir;

	#[fixture]
	fn tempdir() -> TempDir {
		TempDir::new().unwrap()
	}

	fn metadata() -> Map<String, Value> {
		let mut metadata = Map::new();
		metadata.insert("filename".to_string(), json!("report.txt"));
		metadata.insert("mimetype".to_string(), json!("text/plain"));
		metadata
	}

	#[rstest]
	fn test_missing_tempdir_setting_is_fatal() {
		let request = RequestContext::new("http://example.com/");
		let err = SessionFileUploadTempStore::new(&request).unwrap_err();

		assert!(matches!(err, Error::ImproperlyConfigured(_)));
		assert!(err.to_string().contains("formbind.tempdir"));
	}

	#[rstest]
	fn test_tempdir_from_setting(tempdir: TempDir) {
		let request = RequestContext::new("http://example.com/")
			.with_setting(TEMPDIR_SETTING, tempdir.path().to_string_lossy());
		let store = SessionFileUploadTempStore::new(&request).unwrap();

		assert_eq!(store.tempdir(), tempdir.path());
		assert_eq!(store.preview_url("uid"), None);
	}

	#[rstest]
	fn test_set_and_get_with_body(tempdir: TempDir) {
		let store = SessionFileUploadTempStore::with_tempdir(tempdir.path());
		let mut session = MemorySession::new();
		let body = "x".repeat(CHUNK_SIZE * 2 + 17);

		store
			.set(
				&mut session,
				"upload",
				UploadData::new(metadata()).with_stream(Cursor::new(body.clone())),
			)
			.unwrap();

		assert!(session.is_changed());
		assert!(store.contains(&session, "upload"));

		let stored = store.get(&session, "upload").unwrap();
		let randid = stored.metadata.get("randid").and_then(Value::as_str).unwrap();
		assert_eq!(randid.len(), 40);
		assert_eq!(stored.metadata.get("filename"), Some(&json!("report.txt")));

		let mut contents = String::new();
		stored.file.unwrap().read_to_string(&mut contents).unwrap();
		assert_eq!(contents, body);
	}

	#[rstest]
	fn test_set_without_body(tempdir: TempDir) {
		let store = SessionFileUploadTempStore::with_tempdir(tempdir.path());
		let mut session = MemorySession::new();

		store
			.set(&mut session, "upload", UploadData::new(metadata()))
			.unwrap();

		let stored = store.get(&session, "upload").unwrap();
		assert!(stored.metadata.get("randid").is_none());
		assert!(stored.file.is_none());
		assert_eq!(std::fs::read_dir(tempdir.path()).unwrap().count(), 0);
	}

	#[rstest]
	fn test_missing_body_yields_metadata_only(tempdir: TempDir) {
		let store = SessionFileUploadTempStore::with_tempdir(tempdir.path());
		let mut session = MemorySession::new();
		store
			.set(
				&mut session,
				"upload",
				UploadData::new(metadata()).with_stream(Cursor::new(b"data".to_vec())),
			)
			.unwrap();

		let randid = store.get(&session, "upload").unwrap().metadata["randid"]
			.as_str()
			.unwrap()
			.to_string();
		std::fs::remove_file(tempdir.path().join(randid)).unwrap();

		let stored = store.get(&session, "upload").unwrap();
		assert!(stored.file.is_none());
		assert_eq!(stored.metadata.get("mimetype"), Some(&json!("text/plain")));
	}

	/// Yields `good` bytes, then fails.
	struct BrokenStream {
		good: usize,
	}

	impl Read for BrokenStream {
		fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
			if self.good == 0 {
				return Err(io::Error::other("connection reset"));
			}
			let read = self.good.min(buf.len());
			buf[..read].fill(b'x');
			self.good -= read;
			Ok(read)
		}
	}

	#[rstest]
	fn test_failed_copy_leaves_nothing_behind(tempdir: TempDir) {
		let store = SessionFileUploadTempStore::with_tempdir(tempdir.path());
		let mut session = MemorySession::new();

		let err = store
			.set(
				&mut session,
				"upload",
				UploadData::new(metadata()).with_stream(BrokenStream {
					good: CHUNK_SIZE + 5,
				}),
			)
			.unwrap_err();

		assert!(matches!(err, Error::Io(_)));
		assert_eq!(std::fs::read_dir(tempdir.path()).unwrap().count(), 0);
		assert!(!store.contains(&session, "upload"));
		assert!(!session.is_changed());
	}

	#[rstest]
	fn test_unknown_name(tempdir: TempDir) {
		let store = SessionFileUploadTempStore::with_tempdir(tempdir.path());
		let session = MemorySession::new();

		assert!(!store.contains(&session, "nope"));
		assert!(store.get(&session, "nope").is_none());
	}
}
