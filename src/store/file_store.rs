//! Loose-object store on the local filesystem
//!
//! Layout, relative to the repository's marker directory:
//! ```text
//! objects/
//!   <id[0..2]>/
//!     <id[2..40]>    zstd(<type> SP <len> NUL <content>)
//! ```
//!
//! Objects are written to a temporary file and renamed into place, so a
//! reader sees either nothing or a complete object. Two writers racing on
//! the same id produce identical bytes, so whichever rename lands last is
//! harmless. There is no in-process locking.

use crate::config::StoreConfig;
use crate::model::{IntoObjectId, ObjectId, ObjectKind};
use crate::repository::RepoLayout;
use crate::store::codec::{self, decode_header, encode_header, HeaderError, ObjectHeader};
use crate::store::object::Object;
use crate::store::stream::{ContentStream, ObjectDecoder};
use crate::{Error, Result};
use sha1::{Digest, Sha1};
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, trace};
use zstd::stream::read::Decoder;
use zstd::stream::write::Encoder;

const TEMP_PREFIX: &str = ".tmp-obj-";

/// A content-addressed object store rooted in a repository layout
#[derive(Clone, Debug)]
pub struct ObjectStore {
    layout: RepoLayout,
    objects: PathBuf,
    config: StoreConfig,
}

impl ObjectStore {
    /// Store over `layout` with default settings
    pub fn new(layout: RepoLayout) -> Self {
        Self::with_config(layout, StoreConfig::default())
    }

    pub fn with_config(layout: RepoLayout, config: StoreConfig) -> Self {
        let objects = layout.objects_dir();
        ObjectStore {
            layout,
            objects,
            config,
        }
    }

    /// Store over `layout`, reading settings from its config file
    pub fn open(layout: RepoLayout) -> Result<Self> {
        let config = StoreConfig::load(layout.config_file())?;
        Ok(Self::with_config(layout, config))
    }

    pub fn layout(&self) -> &RepoLayout {
        &self.layout
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Where the object with this id lives on disk
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        self.objects.join(id.prefix()).join(id.suffix())
    }

    /// Store content under the given type, returns its id
    ///
    /// Writing an object that already exists is a no-op.
    pub fn write(&self, kind: ObjectKind, content: &[u8]) -> Result<ObjectId> {
        let mut encoded = encode_header(&kind, content.len() as u64);
        encoded.extend_from_slice(content);
        let id = ObjectId::digest(&encoded);

        if self.object_path(&id).exists() {
            debug!(%id, "object already present");
            return Ok(id);
        }

        let dir = self.ensure_prefix_dir(&id)?;
        let mut tmp = self.temp_file(&dir)?;
        let tmp_path = tmp.path().to_path_buf();

        let compressed = zstd::encode_all(encoded.as_slice(), self.config.compression_level)
            .map_err(Error::storage(&tmp_path))?;
        tmp.write_all(&compressed)
            .map_err(Error::storage(&tmp_path))?;

        self.install(&id, tmp)?;
        debug!(
            %id,
            %kind,
            size = content.len(),
            compressed = compressed.len(),
            "object written"
        );
        Ok(id)
    }

    /// Store a blob, returns its id
    pub fn write_blob(&self, content: impl AsRef<[u8]>) -> Result<ObjectId> {
        self.write(ObjectKind::Blob, content.as_ref())
    }

    /// Store content pulled from `reader`, returns its id
    ///
    /// The header needs the final length, so the content is first spooled
    /// (in memory up to `spool_threshold`, on disk past it). The spool is
    /// then replayed once through the hasher and the compressor into a
    /// temporary file that gets renamed into place.
    pub fn write_stream<R: Read>(&self, kind: ObjectKind, mut reader: R) -> Result<ObjectId> {
        let mut spool = tempfile::spooled_tempfile(self.config.spool_threshold);
        let size = io::copy(&mut reader, &mut spool).map_err(Error::storage(&self.objects))?;
        spool
            .seek(SeekFrom::Start(0))
            .map_err(Error::storage(&self.objects))?;

        let tmp = self.temp_file(&self.objects)?;
        let tmp_path = tmp.path().to_path_buf();
        let encoder = Encoder::new(tmp, self.config.compression_level)
            .map_err(Error::storage(&tmp_path))?;

        let mut sink = HashingWriter::new(encoder);
        sink.write_all(&encode_header(&kind, size))
            .map_err(Error::storage(&tmp_path))?;
        io::copy(&mut spool, &mut sink).map_err(Error::storage(&tmp_path))?;

        let (encoder, hasher) = sink.into_parts();
        let tmp = encoder.finish().map_err(Error::storage(&tmp_path))?;
        let id = ObjectId::from_hasher(hasher);

        if self.object_path(&id).exists() {
            debug!(%id, "object already present");
            return Ok(id);
        }

        self.ensure_prefix_dir(&id)?;
        self.install(&id, tmp)?;
        debug!(%id, %kind, size, "object written from stream");
        Ok(id)
    }

    /// Read a whole object
    pub fn read(&self, id: impl IntoObjectId) -> Result<Object> {
        let id = id.into_object_id()?;
        let path = self.object_path(&id);

        let compressed = fs::read(&path).map_err(|e| missing_or_storage(e, &id, &path))?;
        let mut encoded = zstd::decode_all(compressed.as_slice())
            .map_err(|e| Error::corrupt(id, format!("decompression failed: {}", e)))?;

        let (header, header_len) = decode_header(&encoded).map_err(|e| Error::corrupt(id, e))?;
        let actual = (encoded.len() - header_len) as u64;
        if actual != header.size {
            return Err(Error::corrupt(
                id,
                format!(
                    "header declares {} content bytes, found {}",
                    header.size, actual
                ),
            ));
        }

        if self.config.verify_on_read {
            let computed = ObjectId::digest(&encoded);
            if computed != id {
                return Err(Error::corrupt(
                    id,
                    format!("content hashes to {}", computed),
                ));
            }
        }

        let content = encoded.split_off(header_len);
        trace!(%id, kind = %header.kind, size = header.size, "object read");
        Ok(Object {
            kind: header.kind,
            content,
        })
    }

    /// Read only the type and length of an object
    ///
    /// Decompresses just enough of the file to parse the header.
    pub fn read_header(&self, id: impl IntoObjectId) -> Result<ObjectHeader> {
        let id = id.into_object_id()?;
        let mut decoder = self.open_decoder(&id)?;
        let (header, _) = self.parse_header(&id, &mut decoder)?;
        Ok(header)
    }

    /// Open an object for streaming its content
    ///
    /// The returned stream holds the file open until it is released or
    /// dropped.
    pub fn open_stream(&self, id: impl IntoObjectId) -> Result<ContentStream> {
        let id = id.into_object_id()?;
        let mut decoder = self.open_decoder(&id)?;
        let (header, leftover) = self.parse_header(&id, &mut decoder)?;
        Ok(ContentStream::new(id, header, leftover, decoder))
    }

    /// Check if an object exists
    pub fn contains(&self, id: impl IntoObjectId) -> Result<bool> {
        let id = id.into_object_id()?;
        let path = self.object_path(&id);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage(&path)(e)),
        }
    }

    fn open_decoder(&self, id: &ObjectId) -> Result<ObjectDecoder> {
        let path = self.object_path(id);
        let file = File::open(&path).map_err(|e| missing_or_storage(e, id, &path))?;
        Decoder::new(file).map_err(Error::storage(&path))
    }

    fn parse_header(
        &self,
        id: &ObjectId,
        decoder: &mut ObjectDecoder,
    ) -> Result<(ObjectHeader, Vec<u8>)> {
        let (header, leftover) = codec::read_header(decoder, self.config.header_limit)
            .map_err(|e| match e {
                HeaderError::Io(source) if !is_decode_error(&source) => Error::Storage {
                    path: self.object_path(id),
                    source,
                },
                other => Error::corrupt(id, other),
            })?;
        trace!(%id, kind = %header.kind, size = header.size, "header parsed");
        Ok((header, leftover))
    }

    /// Create `objects/<prefix>`; another writer getting there first is fine
    fn ensure_prefix_dir(&self, id: &ObjectId) -> Result<PathBuf> {
        let dir = self.objects.join(id.prefix());
        match fs::create_dir(&dir) {
            Ok(()) => Ok(dir),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(dir),
            Err(e) => Err(Error::storage(&dir)(e)),
        }
    }

    fn temp_file(&self, dir: &Path) -> Result<NamedTempFile> {
        tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)
            .map_err(Error::storage(dir))
    }

    /// Rename a finished temporary file to the object's final path
    fn install(&self, id: &ObjectId, tmp: NamedTempFile) -> Result<()> {
        if self.config.fsync {
            tmp.as_file()
                .sync_all()
                .map_err(Error::storage(tmp.path()))?;
        }

        let path = self.object_path(id);
        match tmp.persist(&path) {
            Ok(_) => Ok(()),
            // the temporary file is removed when the error drops
            Err(_) if path.exists() => {
                debug!(%id, "object installed by a concurrent writer");
                Ok(())
            }
            Err(e) => Err(Error::storage(&path)(e.error)),
        }
    }
}

fn missing_or_storage(e: io::Error, id: &ObjectId, path: &Path) -> Error {
    match e.kind() {
        io::ErrorKind::NotFound => Error::NotFound(format!("object {}", id)),
        _ => Error::storage(path)(e),
    }
}

/// zstd reports bad frames as `Other`; a frame cut short shows up as EOF.
fn is_decode_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Other | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
    )
}

/// Forwards writes while hashing exactly the bytes that were accepted
struct HashingWriter<W> {
    inner: W,
    hasher: Sha1,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        HashingWriter {
            inner,
            hasher: Sha1::new(),
        }
    }

    fn into_parts(self) -> (W, Sha1) {
        (self.inner, self.hasher)
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
