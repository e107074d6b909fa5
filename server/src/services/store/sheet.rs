use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{RegistrantStore, StoreError};
use crate::models::registrant::{NewRegistrant, Registrant};

pub const SHEET_HEADER: [&str; 9] = [
    "id",
    "submitted_at",
    "name",
    "organization",
    "phone",
    "email",
    "position",
    "work_area",
    "purpose",
];

const EMAIL_COLUMN: usize = 5;

/// Spreadsheet-style store: one CSV file, header row first, one appended row
/// per registrant. Appends are serialized through a lock that also covers
/// the duplicate lookup.
pub struct SheetRegistrantStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SheetRegistrantStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_rows(&self) -> Result<Vec<Vec<String>>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(parse_rows(&contents).into_iter().skip(1).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn lookup(&self, email: &str) -> Result<Option<Registrant>, StoreError> {
        self.read_rows()
            .await?
            .into_iter()
            .find(|row| row.get(EMAIL_COLUMN).map(String::as_str) == Some(email))
            .map(|row| row_to_registrant(&row))
            .transpose()
    }

    async fn ends_with_newline(&self, len: u64) -> Result<bool, StoreError> {
        let mut file = fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(len - 1)).await?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last).await?;
        Ok(last[0] == b'\n')
    }

    async fn append(&self, record: NewRegistrant) -> Result<Registrant, StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let len = match fs::metadata(&self.path).await {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        let is_new = len == 0;

        let stored = record.into_registrant(Uuid::new_v4(), Utc::now());

        let mut out = String::new();
        if is_new {
            tracing::info!(path = %self.path.display(), "Creating sheet with header row");
            out.push_str(&encode_row(SHEET_HEADER.iter().copied()));
        } else if !self.ends_with_newline(len).await? {
            // Hand-edited sheets may lose the final line break.
            out.push_str("\r\n");
        }
        out.push_str(&encode_row(registrant_to_row(&stored).iter().map(String::as_str)));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(out.as_bytes()).await?;
        file.flush().await?;

        Ok(stored)
    }
}

#[async_trait]
impl RegistrantStore for SheetRegistrantStore {
    fn backend(&self) -> &'static str {
        "sheet"
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Registrant>, StoreError> {
        let _guard = self.lock.lock().await;
        self.lookup(email).await
    }

    async fn insert(&self, record: NewRegistrant) -> Result<Registrant, StoreError> {
        let _guard = self.lock.lock().await;
        self.append(record).await
    }

    async fn submit(&self, record: NewRegistrant) -> Result<Registrant, StoreError> {
        let _guard = self.lock.lock().await;
        if self.lookup(&record.email).await?.is_some() {
            return Err(StoreError::DuplicateEmail);
        }
        self.append(record).await
    }
}

fn registrant_to_row(r: &Registrant) -> [String; 9] {
    [
        r.id.to_string(),
        r.created_at.to_rfc3339(),
        r.name.clone(),
        r.organization.clone(),
        r.phone.clone(),
        r.email.clone(),
        r.position.clone().unwrap_or_default(),
        r.work_area.clone().unwrap_or_default(),
        r.purpose.clone().unwrap_or_default(),
    ]
}

fn row_to_registrant(row: &[String]) -> Result<Registrant, StoreError> {
    if row.len() < SHEET_HEADER.len() {
        return Err(StoreError::Failure(format!(
            "sheet row has {} columns, expected {}",
            row.len(),
            SHEET_HEADER.len()
        )));
    }

    let id = Uuid::parse_str(&row[0])
        .map_err(|e| StoreError::Failure(format!("sheet row id '{}': {e}", row[0])))?;
    let created_at = DateTime::parse_from_rfc3339(&row[1])
        .map_err(|e| StoreError::Failure(format!("sheet row timestamp '{}': {e}", row[1])))?
        .with_timezone(&Utc);
    let optional = |v: &String| (!v.is_empty()).then(|| v.clone());

    Ok(Registrant {
        id,
        name: row[2].clone(),
        organization: row[3].clone(),
        phone: row[4].clone(),
        email: row[5].clone(),
        position: optional(&row[6]),
        work_area: optional(&row[7]),
        purpose: optional(&row[8]),
        created_at,
    })
}

fn encode_row<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut line = fields.map(encode_field).collect::<Vec<_>>().join(",");
    line.push_str("\r\n");
    line
}

fn encode_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Splits CSV text into rows, honoring quoted fields with embedded commas,
/// quotes and line breaks.
fn parse_rows(contents: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = contents.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => row.push(std::mem::take(&mut field)),
            ('\r', false) => {}
            ('\n', false) => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            (c, _) => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn record(email: &str) -> NewRegistrant {
        NewRegistrant {
            name: "Hong Gildong".into(),
            organization: "Ministry, Policy Office".into(),
            phone: "010-1234-5678".into(),
            email: email.into(),
            position: None,
            work_area: Some("Say \"hi\"".into()),
            purpose: Some("line one\nline two".into()),
        }
    }

    #[tokio::test]
    async fn test_first_submit_writes_header() {
        let dir = TempDir::new().unwrap();
        let store = SheetRegistrantStore::new(dir.path().join("nested/registrants.csv"));

        store.submit(record("hong@example.com")).await.unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let rows = parse_rows(&contents);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], SHEET_HEADER.map(String::from).to_vec());
        assert_eq!(rows[1][EMAIL_COLUMN], "hong@example.com");
    }

    #[tokio::test]
    async fn test_quoted_fields_read_back() {
        let dir = TempDir::new().unwrap();
        let store = SheetRegistrantStore::new(dir.path().join("registrants.csv"));

        let stored = store.submit(record("hong@example.com")).await.unwrap();
        let found = store
            .find_by_email("hong@example.com")
            .await
            .unwrap()
            .expect("row present");

        assert_eq!(found.id, stored.id);
        assert_eq!(found.organization, "Ministry, Policy Office");
        assert_eq!(found.work_area.as_deref(), Some("Say \"hi\""));
        assert_eq!(found.purpose.as_deref(), Some("line one\nline two"));
        assert_eq!(found.position, None);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let dir = TempDir::new().unwrap();
        let store = SheetRegistrantStore::new(dir.path().join("registrants.csv"));

        store.submit(record("hong@example.com")).await.unwrap();
        store.submit(record("kim@example.com")).await.unwrap();
        let err = store.submit(record("hong@example.com")).await.unwrap_err();

        assert!(matches!(err, StoreError::DuplicateEmail));
        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(parse_rows(&contents).len(), 3);
    }

    #[tokio::test]
    async fn test_append_after_missing_final_newline() {
        let dir = TempDir::new().unwrap();
        let store = SheetRegistrantStore::new(dir.path().join("registrants.csv"));

        store.submit(record("a@x.co")).await.unwrap();
        let contents = std::fs::read_to_string(store.path()).unwrap();
        std::fs::write(store.path(), contents.trim_end_matches("\r\n")).unwrap();

        store.submit(record("b@x.co")).await.unwrap();

        assert!(store.find_by_email("a@x.co").await.unwrap().is_some());
        let found = store.find_by_email("b@x.co").await.unwrap().expect("row present");
        assert_eq!(found.email, "b@x.co");
        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(parse_rows(&contents).len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_append_once() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SheetRegistrantStore::new(dir.path().join("registrants.csv")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.submit(record("hong@example.com")).await })
            })
            .collect();

        let mut stored = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => stored += 1,
                Err(e) => assert!(matches!(e, StoreError::DuplicateEmail)),
            }
        }

        assert_eq!(stored, 1);
        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(parse_rows(&contents).len(), 2);
    }

    #[tokio::test]
    async fn test_missing_sheet_has_no_rows() {
        let dir = TempDir::new().unwrap();
        let store = SheetRegistrantStore::new(dir.path().join("absent.csv"));
        assert!(store.find_by_email("a@b.co").await.unwrap().is_none());
    }

    #[test]
    fn test_parse_rows_handles_trailing_field_without_newline() {
        let rows = parse_rows("a,b\r\n\"c,d\",e");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c,d", "e"]]);
    }
}
