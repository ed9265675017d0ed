//! Encoder for the crash-report container wire format

/// Builds a container blob (uncompressed) the way the crash reporter lays it out
///
/// Used by tests and by tooling that replays captured reports.
///
/// # Example
///
/// ```
/// use crashreport_ingest::container::ContainerBuilder;
///
/// let blob = ContainerBuilder::new("UE4CC-Windows-1234")
///     .file(0, "CrashContext.runtime-xml", b"<xml/>")
///     .file(1, "UE4Minidump.dmp", &[0x4d, 0x44, 0x4d, 0x50])
///     .build();
/// assert!(!blob.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
    directory_name: Vec<u8>,
    report_name: Vec<u8>,
    declared_blob_size: u32,
    declared_file_count: Option<u32>,
    files: Vec<(u32, Vec<u8>, Vec<u8>)>,
}

impl ContainerBuilder {
    /// Start a container for the given directory name
    pub fn new(directory_name: &str) -> Self {
        Self::new_raw(directory_name.as_bytes())
    }

    /// Start a container with an arbitrary directory-name byte string
    pub fn new_raw(directory_name: &[u8]) -> Self {
        Self {
            directory_name: directory_name.to_vec(),
            ..Self::default()
        }
    }

    /// Set the report file name
    pub fn report_name(mut self, name: &str) -> Self {
        self.report_name = name.as_bytes().to_vec();
        self
    }

    /// Set the declared blob size field
    pub fn declared_blob_size(mut self, size: u32) -> Self {
        self.declared_blob_size = size;
        self
    }

    /// Override the declared file count (defaults to the number of files added)
    pub fn declared_file_count(mut self, count: u32) -> Self {
        self.declared_file_count = Some(count);
        self
    }

    /// Append a file record
    pub fn file(self, index: u32, name: &str, data: &[u8]) -> Self {
        self.file_raw(index, name.as_bytes(), data)
    }

    /// Append a file record with an arbitrary name byte string
    pub fn file_raw(mut self, index: u32, name: &[u8], data: &[u8]) -> Self {
        self.files.push((index, name.to_vec(), data.to_vec()));
        self
    }

    /// Encode the container
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_bytes(&mut out, &self.directory_name);
        put_bytes(&mut out, &self.report_name);
        out.extend_from_slice(&self.declared_blob_size.to_le_bytes());
        let count = self
            .declared_file_count
            .unwrap_or(self.files.len() as u32);
        out.extend_from_slice(&count.to_le_bytes());
        for (index, name, data) in &self.files {
            out.extend_from_slice(&index.to_le_bytes());
            put_bytes(&mut out, name);
            put_bytes(&mut out, data);
        }
        out
    }
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}
