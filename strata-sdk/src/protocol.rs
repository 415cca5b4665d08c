pub const DEFAULT_PORT: u16 = 2956;

/// First message of every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Upload,
    Download,
}

impl Command {
    pub fn as_str(&self) -> &str {
        match self {
            Command::List => "list",
            Command::Upload => "upload",
            Command::Download => "download",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "list" => Some(Command::List),
            "upload" => Some(Command::Upload),
            "download" => Some(Command::Download),
            _ => None,
        }
    }
}

/// One file of an upload, keyed by its repository-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub project: String,
    pub message: String,
    pub files: Vec<UploadFile>,
}
