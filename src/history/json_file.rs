use async_trait::async_trait;
use fs2::FileExt;
use log::debug;
use std::fs::{ self, File, OpenOptions };
use std::io::{ ErrorKind, Read, Seek, SeekFrom, Write };
use std::path::{ Path, PathBuf };
use tokio::sync::Mutex;
use crate::history::{ HistoryError, HistoryStore };
use crate::models::chat::{ Conversation, MessageRecord };

/// The conversation log as a single JSON array on disk. Every append
/// rewrites the whole array while holding an exclusive lock on the file.
pub struct JsonFileHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileHistoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_records(raw: &str) -> Result<Vec<MessageRecord>, HistoryError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

fn append_record(path: &Path, record: &MessageRecord) -> Result<(), HistoryError> {
    let mut file = OpenOptions::new().read(true).write(true).create(true).open(path)?;
    file.lock_exclusive()?;
    let result = rewrite_with(&mut file, record);
    let unlocked = FileExt::unlock(&file);
    result?;
    unlocked?;
    Ok(())
}

fn rewrite_with(file: &mut File, record: &MessageRecord) -> Result<(), HistoryError> {
    let mut raw = String::new();
    file.read_to_string(&mut raw)?;
    let mut records = parse_records(&raw)?;
    records.push(record.clone());

    let json = serde_json::to_string_pretty(&records)?;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(json.as_bytes())?;
    file.sync_data()?;
    debug!("History file now holds {} records", records.len());
    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<MessageRecord>, HistoryError> {
    match fs::read_to_string(path) {
        Ok(raw) => parse_records(&raw),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistoryStore {
    async fn add_message(&self, record: &MessageRecord) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || append_record(&path, &record)).await?
    }

    async fn load(&self) -> Result<Conversation, HistoryError> {
        let path = self.path.clone();
        let messages = tokio::task::spawn_blocking(move || read_records(&path)).await??;
        Ok(Conversation { messages })
    }
}
